//! Resolution of motion trees into [`MotionData`].
//!
//! Durations flow top-down (an outer duration overrides a node's own) and
//! bottom-up (combinators derive theirs from their children). A leaf with
//! no duration from either direction lasts one default unit. A curve on a
//! node eases that node's own progress; on a sequence it is realized by
//! re-timing the children (see [`sequential`]).

pub(crate) mod cycle;
pub(crate) mod leaf;
pub(crate) mod parallel;
pub(crate) mod sequential;

use crate::curve::EasingCurve;
use crate::data::MotionData;
use crate::duration::Duration;
use crate::motion::{Motion, MotionKind};
use crate::value::Animatable;

/// Tolerance shared by the resolution helpers.
pub(crate) const EPSILON: f64 = 1e-9;

/// Seconds an untimed leaf lasts when nothing else decides.
pub const DEFAULT_UNIT_SECS: f64 = 1.0;

impl<V: Animatable> Motion<V> {
    /// Resolve against `initial`. `outer` is a duration imposed by the
    /// caller and wins over the node's own.
    pub fn resolve(&self, initial: &V, outer: Option<Duration>) -> MotionData<V> {
        self.resolve_with_unit(initial, outer, DEFAULT_UNIT_SECS)
    }

    /// Like [`Motion::resolve`], with untimed leaves lasting `unit` seconds.
    pub fn resolve_with_unit(
        &self,
        initial: &V,
        outer: Option<Duration>,
        unit: f64,
    ) -> MotionData<V> {
        self.resolve_with(initial, outer, None, unit)
    }

    /// Resolve with `curve` standing in for the node's own curve.
    pub(crate) fn resolve_with(
        &self,
        initial: &V,
        outer: Option<Duration>,
        curve: Option<EasingCurve>,
        unit: f64,
    ) -> MotionData<V> {
        let duration = outer.or(self.own_duration());
        let untimed = || Some(duration.unwrap_or(Duration::Absolute(unit)));
        let curve = curve.or(self.own_curve()).filter(|c| !c.is_linear());
        let data = match self.kind() {
            MotionKind::Sequential(children) => {
                return sequential::resolve(children, initial, duration, curve, unit);
            }
            MotionKind::To(targets) => leaf::to(targets, untimed()),
            MotionKind::From(value, then) => leaf::from(value, then, duration, unit),
            MotionKind::Instant(value) => leaf::instant(value, duration),
            MotionKind::Wait => MotionData::identity(untimed()),
            MotionKind::SideEffect(action) => leaf::side_effect(action, duration),
            MotionKind::Steps(values) => leaf::steps(values, untimed()),
            MotionKind::Parallel(facets) => parallel::resolve(facets, initial, duration, unit),
            MotionKind::Repeat(child, count) => {
                cycle::repeat(child, *count, initial, duration, unit)
            }
            MotionKind::Autoreverse(child) => cycle::autoreverse(child, initial, duration, unit),
        };
        match curve {
            Some(curve) => data.eased(curve),
            None => data,
        }
    }
}

/// Local progress of a child occupying `[start, start + width]` of its
/// parent. Zero-width children switch from 0 to 1 when reached; one at the
/// very start counts as reached once progress moves past it.
#[inline]
pub(crate) fn local_progress(t: f64, start: f64, width: f64) -> f64 {
    if width > EPSILON {
        (t - start) / width
    } else if t < start || (t == start && start <= 0.0) {
        0.0
    } else {
        1.0
    }
}
