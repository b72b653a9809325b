//! Capture check.
//!
//! Fixed contract:
//!
//! ```text
//! catch_value     = (3*hp - 2*current_hp) * catch_rate * item_power * status_modifier / (3*hp)
//! shake_threshold = 65536 / (255 / catch_value)^0.1875
//! ```
//!
//! Four trials of `random_int(0, 65536)` follow; the capture succeeds only if
//! every trial lands at or below `round(shake_threshold)`.

use crate::env::RngOracle;
use crate::monster::Monster;

/// Number of shake trials per capture attempt.
pub const SHAKE_TRIALS: u32 = 4;
/// Inclusive upper bound of each trial roll.
pub const SHAKE_ROLL_MAX: u32 = 65536;
/// Status modifier applied when the target carries any status.
pub const STATUS_BONUS: f32 = 1.5;

/// Inputs to the capture formula.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureInput {
    pub hp: u32,
    pub current_hp: u32,
    pub catch_rate: u32,
    pub item_power: f32,
    pub status_modifier: f32,
}

impl CaptureInput {
    /// Reads HP, catch rate and status from the target.
    pub fn for_target(target: &Monster, item_power: f32) -> Self {
        Self {
            hp: target.hp(),
            current_hp: target.current_hp,
            catch_rate: target.catch_rate,
            item_power,
            status_modifier: status_modifier(target),
        }
    }
}

/// `1.5` if the target has any non-faint status, else `1.0`.
pub fn status_modifier(target: &Monster) -> f32 {
    if target.status.has_condition() {
        STATUS_BONUS
    } else {
        1.0
    }
}

/// Catch value before the shake transform.
pub fn catch_value(input: &CaptureInput) -> f64 {
    if input.hp == 0 {
        return 0.0;
    }
    let hp = f64::from(input.hp);
    let current = f64::from(input.current_hp.min(input.hp));
    (3.0 * hp - 2.0 * current)
        * f64::from(input.catch_rate)
        * f64::from(input.item_power)
        * f64::from(input.status_modifier)
        / (3.0 * hp)
}

/// Per-trial threshold; rolls at or below `round(threshold)` pass.
pub fn shake_threshold(input: &CaptureInput) -> f64 {
    let value = catch_value(input);
    if value <= 0.0 {
        return 0.0;
    }
    f64::from(SHAKE_ROLL_MAX) / (255.0 / value).powf(0.1875)
}

/// Closed-form probability that all four trials pass.
pub fn capture_probability(input: &CaptureInput) -> f64 {
    let threshold = shake_threshold(input).round();
    let outcomes = f64::from(SHAKE_ROLL_MAX) + 1.0;
    let per_trial = ((threshold + 1.0) / outcomes).clamp(0.0, 1.0);
    per_trial.powi(SHAKE_TRIALS as i32)
}

/// Result of a capture attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureResult {
    pub captured: bool,
    /// Successful shakes before the first failed trial (0..=4).
    pub shakes: u32,
}

/// Runs the four shake trials.
///
/// All four rolls are always drawn so the random stream advances by the same
/// amount regardless of outcome.
pub fn capture_check(input: &CaptureInput, rng: &mut dyn RngOracle) -> CaptureResult {
    let threshold = shake_threshold(input).round();
    let mut shakes = 0;
    let mut failed = false;
    for _ in 0..SHAKE_TRIALS {
        let roll = f64::from(rng.range(0, SHAKE_ROLL_MAX));
        if roll > threshold {
            failed = true;
        } else if !failed {
            shakes += 1;
        }
    }
    CaptureResult {
        captured: !failed,
        shakes,
    }
}
