//! Directional press handling for remote-style seeking.
//!
//! A short press jumps by a fixed increment. Holding past the threshold
//! enters scrub mode at the bottom of a speed ladder; further presses in the
//! scrub direction climb the ladder, presses the other way descend it, and
//! descending past the bottom leaves scrub mode and commits.

use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(300);
pub const DEFAULT_SPEED_LADDER: [f64; 5] = [2.0, 4.0, 8.0, 16.0, 32.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    Forward,
    Backward,
}

impl SeekDirection {
    pub fn sign(self) -> f64 {
        match self {
            SeekDirection::Forward => 1.0,
            SeekDirection::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongPressState {
    Idle,
    Pending {
        direction: SeekDirection,
        since: Instant,
    },
    /// `level` indexes the speed ladder.
    Scrubbing {
        direction: SeekDirection,
        level: usize,
    },
}

/// What the owner of the state machine should do in response to an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongPressAction {
    None,
    /// Released before the threshold: fixed increment jump.
    Jump(SeekDirection),
    BeginScrub {
        direction: SeekDirection,
        speed: f64,
    },
    SpeedChanged {
        speed: f64,
    },
    /// Scrub mode ended; seek to the scrubbed position.
    Commit,
}

#[derive(Debug, Clone)]
pub struct LongPressSeek {
    state: LongPressState,
    threshold: Duration,
    ladder: Vec<f64>,
}

impl Default for LongPressSeek {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS_THRESHOLD, DEFAULT_SPEED_LADDER.to_vec())
    }
}

impl LongPressSeek {
    /// An empty ladder falls back to the default one.
    pub fn new(threshold: Duration, ladder: Vec<f64>) -> Self {
        let ladder = if ladder.is_empty() {
            DEFAULT_SPEED_LADDER.to_vec()
        } else {
            ladder
        };
        Self {
            state: LongPressState::Idle,
            threshold,
            ladder,
        }
    }

    pub fn state(&self) -> LongPressState {
        self.state
    }

    pub fn is_scrubbing(&self) -> bool {
        matches!(self.state, LongPressState::Scrubbing { .. })
    }

    /// Current multiplier, signed by direction. `None` unless scrubbing.
    pub fn velocity(&self) -> Option<f64> {
        match self.state {
            LongPressState::Scrubbing { direction, level } => Some(self.ladder[level] * direction.sign()),
            _ => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        self.velocity().map(f64::abs)
    }

    pub fn press(&mut self, direction: SeekDirection, now: Instant) -> LongPressAction {
        match self.state {
            LongPressState::Idle | LongPressState::Pending { .. } => {
                self.state = LongPressState::Pending {
                    direction,
                    since: now,
                };
                LongPressAction::None
            }
            LongPressState::Scrubbing {
                direction: scrubbing,
                level,
            } if scrubbing == direction => {
                let top = self.ladder.len() - 1;
                if level >= top {
                    return LongPressAction::None;
                }
                self.state = LongPressState::Scrubbing {
                    direction,
                    level: level + 1,
                };
                LongPressAction::SpeedChanged {
                    speed: self.ladder[level + 1],
                }
            }
            LongPressState::Scrubbing {
                direction: scrubbing,
                level,
            } => {
                if level == 0 {
                    self.state = LongPressState::Idle;
                    return LongPressAction::Commit;
                }
                self.state = LongPressState::Scrubbing {
                    direction: scrubbing,
                    level: level - 1,
                };
                LongPressAction::SpeedChanged {
                    speed: self.ladder[level - 1],
                }
            }
        }
    }

    pub fn release(&mut self, now: Instant) -> LongPressAction {
        match self.state {
            LongPressState::Pending { direction, since } => {
                if now.saturating_duration_since(since) < self.threshold {
                    self.state = LongPressState::Idle;
                    LongPressAction::Jump(direction)
                } else {
                    self.enter_scrub(direction)
                }
            }
            // Scrub mode outlives the press that started it.
            LongPressState::Scrubbing { .. } | LongPressState::Idle => LongPressAction::None,
        }
    }

    /// Promote a held press into scrub mode once the threshold has passed.
    pub fn poll(&mut self, now: Instant) -> LongPressAction {
        match self.state {
            LongPressState::Pending { direction, since }
                if now.saturating_duration_since(since) >= self.threshold =>
            {
                self.enter_scrub(direction)
            }
            _ => LongPressAction::None,
        }
    }

    /// Signed seconds the scrub target moves over `elapsed`.
    pub fn tick(&self, elapsed: Duration) -> Option<f64> {
        self.velocity().map(|velocity| elapsed.as_secs_f64() * velocity)
    }

    /// Select / play-pause while scrubbing commits.
    pub fn confirm(&mut self) -> LongPressAction {
        if self.is_scrubbing() {
            self.state = LongPressState::Idle;
            LongPressAction::Commit
        } else {
            LongPressAction::None
        }
    }

    /// Drop back to idle without committing. Returns whether scrub mode was
    /// active.
    pub fn cancel(&mut self) -> bool {
        let was_scrubbing = self.is_scrubbing();
        self.state = LongPressState::Idle;
        was_scrubbing
    }

    fn enter_scrub(&mut self, direction: SeekDirection) -> LongPressAction {
        self.state = LongPressState::Scrubbing {
            direction,
            level: 0,
        };
        LongPressAction::BeginScrub {
            direction,
            speed: self.ladder[0],
        }
    }
}
