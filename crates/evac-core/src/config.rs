//! Run configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to the simulation builder.  Every field has a
//! default, so a config file only needs to name what it changes.

use crate::{CoreError, CoreResult, SimClock};

/// Walking speed assumed when no per-agent speed is supplied (m/s).
pub const DEFAULT_SPEED_MPS: f64 = 1.4;

/// Simulated seconds per tick.
pub const DEFAULT_TICK_DURATION_SECS: f64 = 60.0;

/// Ticks run after every agent has reached a terminal state.
pub const DEFAULT_GRACE_TICKS: u64 = 5;

/// Tick cap used when the caller does not pick one.
pub const DEFAULT_MAX_TICKS: u64 = 1_000;

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical snapshots.
    pub seed: u64,

    /// Simulated seconds per tick.  Must be finite and positive.
    pub tick_duration_secs: f64,

    /// Default agent speed in metres per second.  Must be finite and >= 0.
    pub speed_mps: f64,

    /// Extra ticks to run once every agent is Evacuated or Stranded.
    pub grace_ticks: u64,

    /// Upper bound on ticks for a full run.  Read by
    /// `EvacSim::run_configured`; `EvacSim::run` and `run_replicates` take
    /// their own cap instead.
    pub max_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:               0,
            tick_duration_secs: DEFAULT_TICK_DURATION_SECS,
            speed_mps:          DEFAULT_SPEED_MPS,
            grace_ticks:        DEFAULT_GRACE_TICKS,
            max_ticks:          DEFAULT_MAX_TICKS,
        }
    }
}

impl SimConfig {
    /// Reject values the tick loop cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_duration_secs.is_finite() && self.tick_duration_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_duration_secs must be finite and positive, got {}",
                self.tick_duration_secs
            )));
        }
        validate_speed(self.speed_mps)
    }

    /// Distance an agent moving at `speed_mps` covers in one tick.
    #[inline]
    pub fn movement_budget(&self, speed_mps: f64) -> f64 {
        speed_mps * self.tick_duration_secs
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_duration_secs)
    }
}

/// A speed must be finite and non-negative.
pub fn validate_speed(speed_mps: f64) -> CoreResult<()> {
    if speed_mps.is_finite() && speed_mps >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "speed must be finite and non-negative, got {speed_mps}"
        )))
    }
}
