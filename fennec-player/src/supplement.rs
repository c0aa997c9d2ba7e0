//! Pan physics of the supplement drawer (chapters, episodes, info) that
//! slides up from below the player.
//!
//! Offsets are measured in points the drawer is raised above the bottom
//! edge. Translations follow screen coordinates: positive is downwards.

use std::time::Duration;

const COMPACT_MIN_OPEN: f64 = 300.0;
const COMPACT_OPEN_FRACTION: f64 = 0.6;
const REGULAR_OPEN: f64 = 200.0;
const DISMISSED: f64 = 50.0;
const COMPACT_MIN_TRANSLATION: f64 = 100.0;
const REGULAR_MIN_TRANSLATION: f64 = 50.0;
const VELOCITY_THRESHOLD: f64 = 1_000.0;
const OPEN_RESISTANCE: f64 = 0.7;
const DISMISSED_RESISTANCE: f64 = 0.5;
/// Lowest the drawer can be dragged, however hard the user pulls.
const FLOOR: f64 = 50.0;

const MIN_SETTLE: Duration = Duration::from_millis(200);
const MAX_SETTLE: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerLayout {
    /// Phone-sized containers: the drawer takes most of the height.
    Compact,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawerMetrics {
    pub layout: DrawerLayout,
    pub container_height: f64,
    pub edge_padding: f64,
}

impl Default for DrawerMetrics {
    fn default() -> Self {
        Self {
            layout: DrawerLayout::Regular,
            container_height: 0.0,
            edge_padding: 0.0,
        }
    }
}

impl DrawerMetrics {
    pub fn open_offset(&self) -> f64 {
        match self.layout {
            DrawerLayout::Compact => {
                (self.container_height * COMPACT_OPEN_FRACTION).max(COMPACT_MIN_OPEN) + self.edge_padding * 2.0
            }
            DrawerLayout::Regular => REGULAR_OPEN + self.edge_padding * 2.0,
        }
    }

    pub fn dismissed_offset(&self) -> f64 {
        DISMISSED + self.edge_padding * 2.0
    }

    pub fn minimum_translation(&self) -> f64 {
        match self.layout {
            DrawerLayout::Compact => COMPACT_MIN_TRANSLATION,
            DrawerLayout::Regular => REGULAR_MIN_TRANSLATION,
        }
    }
}

/// Where the drawer comes to rest after a pan, and how long to animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawerSettle {
    pub presented: bool,
    pub offset: f64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanStart {
    offset: f64,
    presented: bool,
}

#[derive(Debug, Clone)]
pub struct SupplementDrawer {
    metrics: DrawerMetrics,
    offset: f64,
    presented: bool,
    pan: Option<PanStart>,
}

impl SupplementDrawer {
    pub fn new(metrics: DrawerMetrics) -> Self {
        Self {
            metrics,
            offset: metrics.dismissed_offset(),
            presented: false,
            pan: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn metrics(&self) -> DrawerMetrics {
        self.metrics
    }

    /// Container size or layout changed; snap to the matching rest offset.
    pub fn resize(&mut self, metrics: DrawerMetrics) {
        self.metrics = metrics;
        if self.pan.is_none() {
            self.offset = self.rest_offset(self.presented);
        }
    }

    /// Present or dismiss without a gesture. Ignored mid-pan.
    pub fn set_presented(&mut self, presented: bool) {
        if self.pan.is_some() {
            return;
        }
        self.presented = presented;
        self.offset = self.rest_offset(presented);
    }

    pub fn begin_pan(&mut self) {
        self.pan = Some(PanStart {
            offset: self.offset,
            presented: self.presented,
        });
    }

    /// Follow the finger, resisting beyond the open and dismissed limits.
    pub fn pan_changed(&mut self, translation: f64) {
        let Some(start) = self.pan else {
            return;
        };

        let open = self.metrics.open_offset();
        let dismissed = self.metrics.dismissed_offset();
        let raw = start.offset - translation;
        if !(raw.is_finite() && open.is_finite() && dismissed.is_finite()) {
            return;
        }
        let clamped = raw.clamp(dismissed, open);

        self.offset = if raw > clamped {
            clamped + (raw - clamped).powf(OPEN_RESISTANCE)
        } else if raw < dismissed {
            (clamped - (dismissed - raw).powf(DISMISSED_RESISTANCE)).clamp(FLOOR.min(dismissed), dismissed)
        } else {
            clamped
        };

        self.presented = self.offset > self.metrics.minimum_translation() + dismissed;
    }

    /// Decide the resting state from distance or flick velocity.
    pub fn end_pan(&mut self, translation: f64, velocity: f64) -> DrawerSettle {
        let Some(start) = self.pan.take() else {
            return DrawerSettle {
                presented: self.presented,
                offset: self.offset,
                duration: MIN_SETTLE,
            };
        };

        let minimum = self.metrics.minimum_translation();
        if start.presented && (translation > minimum || velocity > VELOCITY_THRESHOLD) {
            self.presented = false;
        }
        if !start.presented && (translation < -minimum || velocity < -VELOCITY_THRESHOLD) {
            self.presented = true;
        }

        self.offset = self.rest_offset(self.presented);
        DrawerSettle {
            presented: self.presented,
            offset: self.offset,
            duration: settle_duration(translation, velocity),
        }
    }

    fn rest_offset(&self, presented: bool) -> f64 {
        if presented {
            self.metrics.open_offset()
        } else {
            self.metrics.dismissed_offset()
        }
    }
}

/// Faster flicks settle quicker, within fixed bounds.
fn settle_duration(translation: f64, velocity: f64) -> Duration {
    let seconds = translation.abs() / velocity.abs();
    if seconds.is_nan() {
        return MIN_SETTLE;
    }
    Duration::from_secs_f64(seconds.clamp(MIN_SETTLE.as_secs_f64(), MAX_SETTLE.as_secs_f64()))
}
