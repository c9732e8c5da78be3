//! Resolved timelines.
//!
//! A [`MotionData`] is what a motion tree becomes once resolved against an
//! initial value: an optional duration, a pure interpolation function and an
//! optional side-effect schedule queried by progress range.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::curve::EasingCurve;
use crate::duration::Duration;
use crate::resolve::sequential::Segments;
use crate::value::Animatable;

/// Action fired with the current value when its threshold is crossed.
pub type Action<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// `lerp(initial, progress) -> value`.
pub type Lerp<V> = Arc<dyn Fn(&V, f64) -> V + Send + Sync>;

/// Actions whose thresholds lie inside a progress range, in traversal order.
pub type SideEffects<V> = Arc<dyn Fn(RangeInclusive<f64>) -> Vec<Action<V>> + Send + Sync>;

/// Resolved timeline of a motion.
pub struct MotionData<V> {
    /// `None` when nothing in the tree fixes a duration.
    pub duration: Option<Duration>,
    lerp: Lerp<V>,
    side_effects: Option<SideEffects<V>>,
    segments: Option<Arc<Segments>>,
}

impl<V> Clone for MotionData<V> {
    fn clone(&self) -> Self {
        Self {
            duration: self.duration,
            lerp: Arc::clone(&self.lerp),
            side_effects: self.side_effects.clone(),
            segments: self.segments.clone(),
        }
    }
}

impl<V> fmt::Debug for MotionData<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionData")
            .field("duration", &self.duration)
            .field("side_effects", &self.side_effects.is_some())
            .field("segments", &self.segments.as_ref().map(|s| s.len()))
            .finish()
    }
}

impl<V: Animatable> MotionData<V> {
    pub fn new<F>(duration: Option<Duration>, lerp: F) -> Self
    where
        F: Fn(&V, f64) -> V + Send + Sync + 'static,
    {
        Self {
            duration,
            lerp: Arc::new(lerp),
            side_effects: None,
            segments: None,
        }
    }

    /// Timeline that never changes its input.
    pub fn identity(duration: Option<Duration>) -> Self {
        Self::new(duration, |initial: &V, _| initial.clone())
    }

    pub fn with_side_effects<F>(mut self, side_effects: F) -> Self
    where
        F: Fn(RangeInclusive<f64>) -> Vec<Action<V>> + Send + Sync + 'static,
    {
        self.side_effects = Some(Arc::new(side_effects));
        self
    }

    pub(crate) fn with_shared_side_effects(mut self, side_effects: Option<SideEffects<V>>) -> Self {
        self.side_effects = side_effects;
        self
    }

    pub(crate) fn with_segments(mut self, segments: Arc<Segments>) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Value at `progress`, starting from `initial`. Pure; extrapolates
    /// outside [0,1].
    #[inline]
    pub fn lerp(&self, initial: &V, progress: f64) -> V {
        (self.lerp)(initial, progress)
    }

    /// Actions whose thresholds are crossed within `range`.
    pub fn side_effects(&self, range: RangeInclusive<f64>) -> Vec<Action<V>> {
        match &self.side_effects {
            Some(side_effects) => side_effects(range),
            None => Vec::new(),
        }
    }

    #[inline]
    pub fn has_side_effects(&self) -> bool {
        self.side_effects.is_some()
    }

    pub(crate) fn shared_side_effects(&self) -> Option<SideEffects<V>> {
        self.side_effects.clone()
    }

    /// For sequences: the child playing at `progress` and its local progress.
    pub fn locate(&self, progress: f64) -> Option<(usize, f64)> {
        self.segments.as_ref().map(|s| s.locate(progress))
    }

    #[inline]
    pub fn absolute_seconds(&self) -> Option<f64> {
        self.duration.and_then(|d| d.absolute_seconds())
    }

    /// Re-map this timeline's progress through `curve`.
    pub(crate) fn eased(self, curve: EasingCurve) -> Self {
        let inner = self.clone();
        let mut eased = Self::new(self.duration, move |initial: &V, t| {
            inner.lerp(initial, curve.ease(t))
        });
        if let Some(side_effects) = self.side_effects {
            eased.side_effects = Some(Arc::new(move |range: RangeInclusive<f64>| {
                let a = curve.ease(*range.start());
                let b = curve.ease(*range.end());
                side_effects(a.min(b)..=a.max(b))
            }));
        }
        eased
    }
}
