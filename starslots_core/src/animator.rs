//! Spin animation as a step function.
//!
//! The animator never sleeps. Callers ask [`SpinAnimator::next_delay`] how
//! long to wait, then call [`SpinAnimator::tick`]. A tokio timer, a test
//! clock or a plain loop can all drive it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rng::ReelSource;
use crate::symbols::ReelOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// How long the reels roll before landing.
    pub spin_duration: Duration,
    /// Gap between rolling frames.
    pub tick_interval: Duration,
    /// Pause between landing and payout.
    pub settle_delay: Duration,
}

impl AnimationConfig {
    pub const DEFAULT_SPIN_MS: u64 = 2000;
    pub const DEFAULT_TICK_MS: u64 = 100;
    pub const DEFAULT_SETTLE_MS: u64 = 500;

    pub fn from_millis(spin_ms: u64, tick_ms: u64, settle_ms: u64) -> Self {
        Self {
            spin_duration: Duration::from_millis(spin_ms),
            tick_interval: Duration::from_millis(tick_ms),
            settle_delay: Duration::from_millis(settle_ms),
        }
    }

    /// One rolling frame and no waits.
    pub fn instant() -> Self {
        Self::from_millis(0, 0, 0)
    }

    /// Rolling frames before landing; always at least one.
    pub fn frames(&self) -> u32 {
        let tick = self.tick_interval.as_nanos();
        if tick == 0 {
            return 1;
        }
        let frames = self.spin_duration.as_nanos().div_ceil(tick);
        frames.clamp(1, u32::MAX as u128) as u32
    }

    pub fn total_duration(&self) -> Duration {
        self.tick_interval * self.frames() + self.settle_delay
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::from_millis(
            Self::DEFAULT_SPIN_MS,
            Self::DEFAULT_TICK_MS,
            Self::DEFAULT_SETTLE_MS,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    /// Transient reels; never scored.
    Spinning {
        frame: u32,
        frames: u32,
        reels: ReelOutcome,
    },
    /// The authoritative draw, shown while the settle delay runs.
    Landed { reels: ReelOutcome },
    /// Settle delay elapsed; `reels` is ready to resolve.
    Finished { reels: ReelOutcome },
}

impl AnimationState {
    pub fn reels(&self) -> ReelOutcome {
        match *self {
            AnimationState::Spinning { reels, .. }
            | AnimationState::Landed { reels }
            | AnimationState::Finished { reels } => reels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Rolling { next_frame: u32 },
    Landing,
    Settling { reels: ReelOutcome },
    Finished { reels: ReelOutcome },
}

#[derive(Debug, Clone)]
pub struct SpinAnimator {
    config: AnimationConfig,
    frames: u32,
    phase: Phase,
}

impl SpinAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            frames: config.frames(),
            phase: Phase::Rolling { next_frame: 1 },
        }
    }

    /// Wait before the next [`tick`](Self::tick), or `None` once finished.
    pub fn next_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::Rolling { .. } => Some(self.config.tick_interval),
            Phase::Landing => Some(Duration::ZERO),
            Phase::Settling { .. } => Some(self.config.settle_delay),
            Phase::Finished { .. } => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    pub fn tick<R: ReelSource + ?Sized>(&mut self, source: &mut R) -> AnimationState {
        match self.phase {
            Phase::Rolling { next_frame } => {
                let reels = source.draw();
                self.phase = if next_frame >= self.frames {
                    Phase::Landing
                } else {
                    Phase::Rolling {
                        next_frame: next_frame + 1,
                    }
                };
                AnimationState::Spinning {
                    frame: next_frame,
                    frames: self.frames,
                    reels,
                }
            }
            Phase::Landing => {
                let reels = source.draw();
                self.phase = Phase::Settling { reels };
                AnimationState::Landed { reels }
            }
            Phase::Settling { reels } | Phase::Finished { reels } => {
                self.phase = Phase::Finished { reels };
                AnimationState::Finished { reels }
            }
        }
    }
}
