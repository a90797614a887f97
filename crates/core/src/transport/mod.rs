//! Transport state and the numeric bounds every transport field lives in.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_TEMPO: f32 = 0.25;
pub const MAX_TEMPO: f32 = 4.0;
pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

/// Slack used when deciding whether the cursor has reached the end of the
/// score, so accumulated float error from fixed-size ticks still terminates.
pub const END_TOLERANCE: f32 = 1e-4;

/// High-level mode of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    Loading,
    Error,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Loading => "loading",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Clamps `value` into `[min, max]`. NaN collapses to `min`.
pub fn clamp_to(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

pub fn clamp_tempo(factor: f32) -> f32 {
    clamp_to(factor, MIN_TEMPO, MAX_TEMPO)
}

pub fn clamp_volume(level: f32) -> f32 {
    clamp_to(level, MIN_VOLUME, MAX_VOLUME)
}

/// Outcome of advancing the cursor by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Still inside the score.
    Within(f32),
    /// Ran past the end and wrapped around; carries the new position.
    Wrapped(f32),
    /// Ran past the end without looping.
    Finished,
}

/// Moves a cursor at `current` forward by `delta` inside a score of
/// `duration` seconds.
pub fn advance(current: f32, delta: f32, duration: f32, looping: bool) -> Advance {
    let next = current + delta.max(0.0);
    if next + END_TOLERANCE < duration {
        return Advance::Within(next);
    }
    if !looping {
        return Advance::Finished;
    }

    let overshoot = next - duration;
    if duration <= END_TOLERANCE || overshoot <= END_TOLERANCE {
        Advance::Wrapped(0.0)
    } else {
        Advance::Wrapped(overshoot % duration)
    }
}
