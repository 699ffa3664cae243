//! Trimmed-mean sampling filter.
//!
//! Takes [`SAMPLE_COUNT`] raw conversions of one signal, sorts them, drops
//! the [`TRIM`] lowest and highest, and averages what remains with integer
//! division. Single-conversion spikes on the ADC line never reach the
//! control logic.
//!
//! ```text
//!   raw:    [ 812  809 4095  811  810    0  813  808  811  810 ]
//!   sorted: [   0  808 | 809  810  810  811  811  812 | 813 4095 ]
//!                        └──────── mean = 810 ────────┘
//! ```

/// Conversions per filtered reading.
pub const SAMPLE_COUNT: usize = 10;

/// Samples discarded from each end of the sorted set.
pub const TRIM: usize = 2;

const KEPT: i32 = (SAMPLE_COUNT - 2 * TRIM) as i32;

/// Sort `samples` in place and return the mean of the middle values.
pub fn trimmed_mean(samples: &mut [i32; SAMPLE_COUNT]) -> i32 {
    samples.sort_unstable();
    let sum: i32 = samples[TRIM..SAMPLE_COUNT - TRIM].iter().sum();
    sum / KEPT
}

/// Collect [`SAMPLE_COUNT`] readings from `read` and filter them.
///
/// The first failed conversion aborts the whole reading.
pub fn read_trimmed<E>(mut read: impl FnMut() -> Result<i32, E>) -> Result<i32, E> {
    let mut samples = [0i32; SAMPLE_COUNT];
    for slot in &mut samples {
        *slot = read()?;
    }
    Ok(trimmed_mean(&mut samples))
}
