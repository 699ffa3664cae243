//! Peripheral drivers: ADC/LEDC bring-up, PWM outputs, the level bar,
//! buttons, the sample timer and pinned task spawning.

pub mod button;
pub mod hw_init;
pub mod hw_timer;
pub mod level_indicator;
pub mod pwm_output;
pub mod task_pin;
