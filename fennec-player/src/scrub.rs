use std::time::Duration;

/// Damping applied to pan scrubbing in slow (fine) mode.
pub const SLOW_SCRUB_DAMPING: f64 = 0.1;

/// Preview position decoupled from the player's true position.
///
/// While scrubbing, input only moves the scrubbed position; the true
/// position changes on [`commit`](Self::commit) or when the player reports
/// one.
#[derive(Debug, Clone, Default)]
pub struct ScrubState {
    true_position: Duration,
    scrubbed_position: Duration,
    pre_scrub_position: Duration,
    is_scrubbing: bool,
    runtime: Option<Duration>,
    gesture_start: Option<Duration>,
}

impl ScrubState {
    pub fn new(runtime: Option<Duration>) -> Self {
        Self {
            runtime,
            ..Self::default()
        }
    }

    pub fn true_position(&self) -> Duration {
        self.true_position
    }

    /// The scrub target while scrubbing, otherwise the true position.
    pub fn scrubbed_position(&self) -> Duration {
        if self.is_scrubbing {
            self.scrubbed_position
        } else {
            self.true_position
        }
    }

    pub fn is_scrubbing(&self) -> bool {
        self.is_scrubbing
    }

    pub fn runtime(&self) -> Option<Duration> {
        self.runtime
    }

    pub fn set_runtime(&mut self, runtime: Option<Duration>) {
        self.runtime = runtime;
        self.true_position = self.clamped(self.true_position);
        self.scrubbed_position = self.clamped(self.scrubbed_position);
    }

    /// Position report from the player.
    pub fn report_position(&mut self, position: Duration) {
        self.true_position = self.clamped(position);
    }

    pub fn begin(&mut self) {
        if self.is_scrubbing {
            return;
        }
        self.is_scrubbing = true;
        self.scrubbed_position = self.true_position;
        self.pre_scrub_position = self.true_position;
        self.gesture_start = None;
    }

    /// Move the scrub target. Ignored unless scrubbing.
    pub fn set_scrubbed(&mut self, position: Duration) -> bool {
        if !self.is_scrubbing {
            return false;
        }
        self.scrubbed_position = self.clamped(position);
        true
    }

    /// Move the scrub target by a signed number of seconds.
    pub fn scrub_by(&mut self, seconds: f64) -> bool {
        if !self.is_scrubbing || seconds.is_nan() {
            return false;
        }
        let target = self.scrubbed_position.as_secs_f64() + seconds;
        self.scrubbed_position = self.clamp_secs(target);
        true
    }

    /// Start a pan gesture; translations are measured from here.
    pub fn begin_translation(&mut self) {
        self.begin();
        self.gesture_start = Some(self.scrubbed_position);
    }

    /// Map a pan translation across a track of `total_size` points onto the
    /// runtime. A full-width pan covers the whole runtime times `damping`.
    pub fn scrub_by_translation(&mut self, translation: f64, total_size: f64, damping: f64) -> bool {
        let Some(runtime) = self.runtime else {
            return false;
        };
        if !total_size.is_finite() || total_size <= 0.0 || translation.is_nan() || damping.is_nan() {
            return false;
        }
        if self.gesture_start.is_none() {
            self.begin_translation();
        }
        let start = self.gesture_start.unwrap_or(self.scrubbed_position);
        let target = start.as_secs_f64() + (translation / total_size) * runtime.as_secs_f64() * damping;
        self.scrubbed_position = self.clamp_secs(target);
        true
    }

    /// Finish scrubbing. Returns the position the player must seek to.
    pub fn commit(&mut self) -> Option<Duration> {
        if !self.is_scrubbing {
            return None;
        }
        self.is_scrubbing = false;
        self.gesture_start = None;
        self.true_position = self.scrubbed_position;
        Some(self.scrubbed_position)
    }

    /// Abandon scrubbing without seeking.
    pub fn cancel(&mut self) {
        self.is_scrubbing = false;
        self.gesture_start = None;
        self.scrubbed_position = self.pre_scrub_position;
    }

    /// Absolute target for a relative jump from the true position.
    pub fn jump_target(&self, seconds: f64) -> Duration {
        self.clamp_secs(self.true_position.as_secs_f64() + seconds)
    }

    /// `position` limited to the runtime.
    pub fn clamped(&self, position: Duration) -> Duration {
        match self.runtime {
            Some(runtime) => position.min(runtime),
            None => position,
        }
    }

    /// Negative targets clamp to zero; targets too large for a `Duration`
    /// saturate at the runtime.
    fn clamp_secs(&self, seconds: f64) -> Duration {
        match Duration::try_from_secs_f64(seconds.max(0.0)) {
            Ok(position) => self.clamped(position),
            Err(_) => self.runtime.unwrap_or(Duration::MAX),
        }
    }
}
