use serde::{Deserialize, Serialize};

/// Playback state of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Never played, or stopped
    Idle,
    /// Advancing toward a target
    Animating,
    /// Frozen mid-way; resumable
    Paused,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Animating => "animating",
            Self::Paused => "paused",
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Animating)
    }

    /// Check if the driver can be paused
    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Animating)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Direction of travel along the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction that moves progress `from` toward `to`; `None` when equal.
    #[inline]
    pub fn toward(from: f64, to: f64) -> Option<Self> {
        if to > from {
            Some(Self::Forward)
        } else if to < from {
            Some(Self::Backward)
        } else {
            None
        }
    }

    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Options for starting playback
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayOptions {
    /// Progress to jump to before playing (None = current progress)
    pub from: Option<f64>,
    /// Progress to play toward (None = previous target)
    pub to: Option<f64>,
    /// Wrap around at the target instead of stopping
    pub repeat_forever: bool,
}

impl PlayOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_from(mut self, from: f64) -> Self {
        self.from = Some(from);
        self
    }

    #[inline]
    pub fn with_to(mut self, to: f64) -> Self {
        self.to = Some(to);
        self
    }

    /// Loop until paused or stopped
    #[inline]
    pub fn repeat_forever(mut self) -> Self {
        self.repeat_forever = true;
        self
    }
}
