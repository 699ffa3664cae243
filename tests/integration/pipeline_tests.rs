//! Sensor-to-actuator pipeline tests, from filtered ADC readings through
//! the command queue to the outputs. The threaded cases run the real task
//! loops against a leaked [`DeviceContext`].

use std::thread;
use std::time::{Duration, Instant};

use homectl::adapters::log_display::LogDisplay;
use homectl::adapters::time::Clock;
use homectl::app::controller::Controller;
use homectl::app::messages::{Action, ActuatorId, ButtonEvent, ControllerMsg};
use homectl::channels::{DeviceContext, EdgeOutcome};
use homectl::config::SystemConfig;
use homectl::drivers::hw_timer::PotSampleTimer;
use homectl::app::ports::AdcChannel;
use homectl::sensors::filter::SAMPLE_COUNT;
use homectl::sensors::{SharedAdc, photoresistor, potentiometer, temperature};
use homectl::tasks::{self, AmbientPoller, UiTask};

use crate::mock_hw::{MockAdc, MockIndicator, MockTimer, RecordingAdc, SharedOutput, outputs};

fn drain<O, T, L>(ctx: &DeviceContext, ctl: &mut Controller<'_, O, T, L>)
where
    O: homectl::app::ports::OutputChannel,
    T: homectl::app::ports::SampleTimer,
    L: homectl::app::ports::LevelIndicator,
{
    while let Ok(msg) = ctx.commands.try_receive() {
        ctl.handle(msg).unwrap();
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

// ── Sensor scaling ────────────────────────────────────────────

#[test]
fn sensor_readings_scale_to_percent() {
    let adc = SharedAdc::new(MockAdc { pot_mv: 825, temp_mv: 900, photo_mv: 1000, ..MockAdc::default() });
    assert_eq!(potentiometer::read_percent(&adc), Ok(75));
    assert_eq!(photoresistor::read_darkness(&adc), Ok(100));
    let t = temperature::read(&adc).unwrap();
    assert_eq!((t.celsius, t.percent), (40, 45));
}

#[test]
fn concurrent_bursts_never_interleave() {
    const BURSTS: usize = 50;
    let recorder = RecordingAdc::default();
    let log = recorder.log.clone();
    let adc = leak(SharedAdc::new(recorder));

    let workers: Vec<_> = [AdcChannel::Potentiometer, AdcChannel::Temperature]
        .into_iter()
        .map(|channel| {
            thread::spawn(move || {
                for _ in 0..BURSTS {
                    assert_eq!(adc.sample(channel), Ok(1000));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2 * BURSTS * SAMPLE_COUNT);
    for burst in log.chunks(SAMPLE_COUNT) {
        assert!(burst.iter().all(|c| *c == burst[0]), "interleaved burst: {burst:?}");
    }
    let pot_bursts = log.chunks(SAMPLE_COUNT).filter(|b| b[0] == AdcChannel::Potentiometer).count();
    assert_eq!(pot_bursts, BURSTS);
}

// ── Step-driven pipeline ──────────────────────────────────────

#[test]
fn ambient_poll_latches_every_actuator() {
    let ctx = DeviceContext::new(250);
    let mut ctl = Controller::new(
        &SystemConfig::default(),
        outputs(),
        MockTimer::default(),
        MockIndicator::default(),
        &ctx.status,
    );
    let adc = SharedAdc::new(MockAdc { temp_mv: 900, photo_mv: 1000, ..MockAdc::default() });

    AmbientPoller::new().step(&adc, &ctx);
    drain(&ctx, &mut ctl);

    for id in ActuatorId::ALL {
        assert!(ctl.actuator(id).is_latched(), "{id:?}");
    }
    assert_eq!(ctx.inside_temp.try_take(), Some(40));
}

#[test]
fn failed_conversions_post_nothing() {
    let ctx = DeviceContext::new(250);
    let adc = SharedAdc::new(MockAdc { fail: true, ..MockAdc::default() });
    AmbientPoller::new().step(&adc, &ctx);
    ctx.status.set_adjusting(true);
    assert!(!tasks::pot_step(&adc, &ctx));

    assert!(ctx.commands.try_receive().is_err());
    assert_eq!(ctx.inside_temp.try_take(), None);
}

#[test]
fn pot_samples_reach_session_target() {
    let ctx = DeviceContext::new(250);
    let mut ctl = Controller::new(
        &SystemConfig::default(),
        outputs(),
        MockTimer::default(),
        MockIndicator::default(),
        &ctx.status,
    );
    // 66 mV reads as 98 %, snapped to full scale.
    let adc = SharedAdc::new(MockAdc { pot_mv: 66, ..MockAdc::default() });

    assert!(!tasks::pot_step(&adc, &ctx));
    ctl.handle(ControllerMsg::Ui { actuator: ActuatorId::Vent, action: Action::Adjust }).unwrap();
    assert!(tasks::pot_step(&adc, &ctx));
    drain(&ctx, &mut ctl);

    assert_eq!(ctl.actuator(ActuatorId::Vent).output().last(), Some(180));
    assert_eq!(ctl.indicator().current(), 8);
}

// ── Threaded end-to-end ───────────────────────────────────────

fn spawn_controller(ctx: &'static DeviceContext) -> [SharedOutput; 3] {
    let outs = [SharedOutput::default(), SharedOutput::default(), SharedOutput::default()];
    let timer = PotSampleTimer::new(2_000, &ctx.pot_tick).unwrap();
    let ctl = Controller::new(
        &SystemConfig::default(),
        outs.clone(),
        timer,
        MockIndicator::default(),
        &ctx.status,
    );
    thread::spawn(move || tasks::run_controller(ctl, ctx));
    outs
}

#[test]
fn timer_driven_session_moves_vent() {
    let ctx = leak(DeviceContext::new(250));
    let adc = leak(SharedAdc::new(MockAdc { pot_mv: 0, ..MockAdc::default() }));
    let [_, vent, _] = spawn_controller(ctx);
    thread::spawn(move || tasks::run_pot(adc, ctx));

    assert!(ctx.post(ControllerMsg::Ui { actuator: ActuatorId::Vent, action: Action::Adjust }));
    assert!(wait_until(|| vent.last() == Some(180)));
    assert!(ctx.status.is_adjusting());

    assert!(ctx.post(ControllerMsg::Ui { actuator: ActuatorId::Vent, action: Action::Adjust }));
    assert!(wait_until(|| !ctx.status.is_adjusting()));
}

#[test]
fn button_presses_toggle_fan_through_ui_task() {
    let ctx = leak(DeviceContext::new(250));
    let [fan, _, _] = spawn_controller(ctx);
    thread::spawn(move || {
        let clock = Clock::new();
        tasks::run_ui(UiTask::new(LogDisplay::new()), ctx, &clock, 20)
    });

    // Home -> Fan -> action menu -> Toggle -> flip.
    let presses = [
        ButtonEvent::Select,
        ButtonEvent::Select,
        ButtonEvent::Down,
        ButtonEvent::Select,
        ButtonEvent::Down,
    ];
    for (i, button) in presses.into_iter().enumerate() {
        assert!(wait_until(|| ctx.buttons.is_empty()));
        let now_ms = 1_000 + 300 * i as u32;
        assert_eq!(ctx.on_button_edge(button, now_ms), EdgeOutcome::Accepted);
    }

    assert!(wait_until(|| !ctx.status.is_enabled(ActuatorId::Fan)));
    assert!(wait_until(|| fan.last() == Some(0)));
}

#[test]
fn bounced_edges_never_reach_ui() {
    let ctx = DeviceContext::new(250);
    assert_eq!(ctx.on_button_edge(ButtonEvent::Down, 5_000), EdgeOutcome::Accepted);
    assert_eq!(ctx.buttons.try_receive().ok(), Some(ButtonEvent::Down));
    assert_eq!(ctx.on_button_edge(ButtonEvent::Down, 5_100), EdgeOutcome::Bounced);
    assert!(ctx.buttons.try_receive().is_err());
}
