//! Declarative motion trees and the fluent builder API.
//!
//! A [`Motion`] is an immutable description of how a value evolves over
//! normalized progress. Leaves describe changes (`to`, `steps`, `instant`,
//! ...), combinators arrange children in time (`sequential`, `parallel`,
//! `repeat`, `autoreverse`). Builder methods consume and return the node.
//!
//! ```
//! use vizij_motion_core::{Duration, EasingCurve, Motion};
//!
//! let bounce = Motion::to(100.0)
//!     .secs(0.5)
//!     .curve(EasingCurve::EASE_OUT)
//!     .autoreverse()
//!     .repeat(3);
//! assert_eq!(bounce.declared_duration(), Some(Duration::secs(3.0)));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::curve::EasingCurve;
use crate::data::Action;
use crate::duration::Duration;
use crate::facet::Facet;
use crate::resolve::parallel;
use crate::resolve::sequential::{self, Claim};
use crate::value::Animatable;

/// Node variants.
#[derive(Clone)]
pub enum MotionKind<V: Animatable> {
    /// Equally spaced keyframes from the initial value through each target.
    To(Vec<V>),
    /// Replace the initial value seen by the nested motion.
    From(V, Box<Motion<V>>),
    /// Zero-length assignment.
    Instant(V),
    /// Hold the incoming value.
    Wait,
    /// Zero-length action fired when reached.
    SideEffect(Action<V>),
    /// Held values; the initial value occupies the first bucket.
    Steps(Vec<V>),
    Sequential(Vec<Motion<V>>),
    Parallel(Vec<Facet<V>>),
    Repeat(Box<Motion<V>>, usize),
    Autoreverse(Box<Motion<V>>),
}

impl<V: Animatable> MotionKind<V> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::To(_) => "to",
            Self::From(..) => "from",
            Self::Instant(_) => "instant",
            Self::Wait => "wait",
            Self::SideEffect(_) => "side_effect",
            Self::Steps(_) => "steps",
            Self::Sequential(_) => "sequential",
            Self::Parallel(_) => "parallel",
            Self::Repeat(..) => "repeat",
            Self::Autoreverse(_) => "autoreverse",
        }
    }
}

/// A node of a motion tree plus its own timing options.
#[derive(Clone)]
pub struct Motion<V: Animatable> {
    kind: MotionKind<V>,
    duration: Option<Duration>,
    curve: Option<EasingCurve>,
}

impl<V: Animatable> From<MotionKind<V>> for Motion<V> {
    fn from(kind: MotionKind<V>) -> Self {
        Self {
            kind,
            duration: None,
            curve: None,
        }
    }
}

impl<V: Animatable> Motion<V> {
    pub fn to(target: V) -> Self {
        MotionKind::To(vec![target]).into()
    }

    pub fn to_keyframes(targets: impl IntoIterator<Item = V>) -> Self {
        MotionKind::To(targets.into_iter().collect()).into()
    }

    /// Run `then` starting from `value` instead of the incoming value.
    pub fn from_value(value: V, then: Motion<V>) -> Self {
        MotionKind::From(value, Box::new(then)).into()
    }

    pub fn instant(value: V) -> Self {
        MotionKind::Instant(value).into()
    }

    /// Hold with no duration of its own.
    pub fn wait() -> Self {
        MotionKind::Wait.into()
    }

    pub fn wait_for(duration: Duration) -> Self {
        Self::wait().duration(duration)
    }

    pub fn side_effect<F>(action: F) -> Self
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        MotionKind::SideEffect(Arc::new(action)).into()
    }

    pub fn steps(values: impl IntoIterator<Item = V>) -> Self {
        MotionKind::Steps(values.into_iter().collect()).into()
    }

    pub fn sequential(children: impl IntoIterator<Item = Motion<V>>) -> Self {
        MotionKind::Sequential(children.into_iter().collect()).into()
    }

    pub fn parallel(facets: impl IntoIterator<Item = Facet<V>>) -> Self {
        MotionKind::Parallel(facets.into_iter().collect()).into()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn secs(self, seconds: f64) -> Self {
        self.duration(Duration::Absolute(seconds))
    }

    pub fn relative(self, fraction: f64) -> Self {
        self.duration(Duration::Relative(fraction))
    }

    pub fn curve(mut self, curve: EasingCurve) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn repeat(self, count: usize) -> Self {
        MotionKind::Repeat(Box::new(self), count).into()
    }

    /// Forward then backward; doubles the duration.
    pub fn autoreverse(self) -> Self {
        MotionKind::Autoreverse(Box::new(self)).into()
    }

    /// Play `next` after this motion. Appends to an untimed sequence instead
    /// of nesting it.
    pub fn then(self, next: Motion<V>) -> Self {
        match self {
            Motion {
                kind: MotionKind::Sequential(mut children),
                duration: None,
                curve: None,
            } => {
                children.push(next);
                Self::sequential(children)
            }
            other => Self::sequential([other, next]),
        }
    }

    #[inline]
    pub fn kind(&self) -> &MotionKind<V> {
        &self.kind
    }

    /// Duration set on this node, if any.
    #[inline]
    pub fn own_duration(&self) -> Option<Duration> {
        self.duration
    }

    #[inline]
    pub fn own_curve(&self) -> Option<EasingCurve> {
        self.curve
    }

    /// Duration this node asks for when no parent imposes one, as far as
    /// the tree's own timings decide it. Untimed leaves leave it open.
    pub fn declared_duration(&self) -> Option<Duration> {
        if let Some(duration) = self.duration {
            return Some(duration);
        }
        match &self.kind {
            MotionKind::To(_) | MotionKind::Steps(_) | MotionKind::Wait => None,
            MotionKind::Instant(_) | MotionKind::SideEffect(_) => Some(Duration::ZERO),
            MotionKind::From(_, then) => then.declared_duration(),
            MotionKind::Sequential(children) => {
                if children.is_empty() {
                    return Some(Duration::ZERO);
                }
                let claims: Vec<_> = children
                    .iter()
                    .map(|c| Claim::declared(c.declared_duration()))
                    .collect();
                sequential::allocate(&claims, None)
                    .total
                    .map(Duration::Absolute)
            }
            MotionKind::Parallel(facets) => {
                let declared: Vec<_> = facets.iter().map(Facet::declared_duration).collect();
                parallel::shared_span(&declared)
            }
            MotionKind::Repeat(child, count) => {
                if *count == 0 {
                    Some(Duration::ZERO)
                } else {
                    child.declared_duration().map(|d| d * *count as f64)
                }
            }
            MotionKind::Autoreverse(child) => child.declared_duration().map(|d| d * 2.0),
        }
    }

    /// Duration this node plays for when no parent imposes one, with each
    /// untimed leaf lasting `unit` seconds. Only trees timed purely in
    /// relative terms have none.
    pub fn natural_duration(&self, unit: f64) -> Option<Duration> {
        if let Some(duration) = self.duration {
            return Some(duration);
        }
        match &self.kind {
            MotionKind::To(_) | MotionKind::Steps(_) | MotionKind::Wait => {
                Some(Duration::Absolute(unit))
            }
            MotionKind::Instant(_) | MotionKind::SideEffect(_) => Some(Duration::ZERO),
            MotionKind::From(_, then) => then.natural_duration(unit),
            MotionKind::Sequential(children) => {
                if children.is_empty() {
                    return Some(Duration::ZERO);
                }
                let claims: Vec<_> = children.iter().map(|c| Claim::natural(c, unit)).collect();
                sequential::allocate(&claims, None)
                    .total
                    .map(Duration::Absolute)
            }
            MotionKind::Parallel(facets) => parallel::natural_span(facets, unit),
            MotionKind::Repeat(child, count) => {
                if *count == 0 {
                    Some(Duration::ZERO)
                } else {
                    child.natural_duration(unit).map(|d| d * *count as f64)
                }
            }
            MotionKind::Autoreverse(child) => child.natural_duration(unit).map(|d| d * 2.0),
        }
    }
}

impl<V: Animatable> fmt::Debug for Motion<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Motion");
        s.field("kind", &self.kind.name());
        if let Some(d) = self.duration {
            s.field("duration", &d);
        }
        if let Some(c) = self.curve {
            s.field("curve", &c);
        }
        match &self.kind {
            MotionKind::To(targets) => s.field("keyframes", &targets.len()),
            MotionKind::Steps(values) => s.field("steps", &values.len()),
            MotionKind::Sequential(children) => s.field("children", children),
            MotionKind::Parallel(facets) => s.field("facets", facets),
            MotionKind::From(_, child) | MotionKind::Autoreverse(child) => s.field("child", child),
            MotionKind::Repeat(child, count) => s.field("count", count).field("child", child),
            MotionKind::Instant(_) | MotionKind::Wait | MotionKind::SideEffect(_) => &mut s,
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn then_appends_to_plain_sequence() {
        let m = Motion::to(1.0).then(Motion::to(2.0)).then(Motion::to(3.0));
        match m.kind() {
            MotionKind::Sequential(children) => assert_eq!(children.len(), 3),
            other => panic!("unexpected {}", other.name()),
        }
        let timed = Motion::sequential([Motion::to(1.0)]).secs(2.0).then(Motion::to(0.0));
        match timed.kind() {
            MotionKind::Sequential(children) => assert_eq!(children.len(), 2),
            other => panic!("unexpected {}", other.name()),
        }
        // the untimed tail adds one unit after the 2s child
        assert_eq!(timed.declared_duration(), None);
        assert_eq!(timed.natural_duration(1.0), Some(Duration::secs(3.0)));
    }

    #[test]
    fn declared_duration_is_structural() {
        assert_eq!(Motion::to(1.0).declared_duration(), None);
        assert_eq!(Motion::instant(1.0).declared_duration(), Some(Duration::ZERO));
        assert_eq!(
            Motion::to(1.0).secs(2.0).repeat(3).declared_duration(),
            Some(Duration::secs(6.0))
        );
        assert_eq!(
            Motion::to(1.0).relative(0.25).autoreverse().declared_duration(),
            Some(Duration::relative(0.5))
        );
        assert_eq!(
            Motion::to(1.0).repeat(0).declared_duration(),
            Some(Duration::ZERO)
        );
        let seq = Motion::sequential([Motion::to(1.0).relative(0.25), Motion::to(2.0).secs(3.0)]);
        assert_eq!(seq.declared_duration(), Some(Duration::secs(4.0)));
    }

    #[test]
    fn natural_duration_counts_untimed_leaves() {
        assert_eq!(Motion::to(1.0).natural_duration(2.0), Some(Duration::secs(2.0)));
        assert_eq!(Motion::<f64>::wait().natural_duration(1.0), Some(Duration::secs(1.0)));
        assert_eq!(Motion::instant(1.0).natural_duration(1.0), Some(Duration::ZERO));
        let seq = Motion::sequential([Motion::to(1.0), Motion::to(2.0), Motion::to(3.0)]);
        assert_eq!(seq.declared_duration(), None);
        assert_eq!(seq.natural_duration(1.0), Some(Duration::secs(3.0)));
        assert_eq!(
            Motion::to(1.0).repeat(3).natural_duration(1.0),
            Some(Duration::secs(3.0))
        );
        assert_eq!(
            Motion::to(1.0).autoreverse().natural_duration(0.5),
            Some(Duration::secs(1.0))
        );
        // timed children keep their length next to untimed ones
        let mixed = Motion::sequential([Motion::to(1.0).secs(2.0), Motion::to(2.0)]);
        assert_eq!(mixed.natural_duration(1.0), Some(Duration::secs(3.0)));
        // nothing absolute to anchor relative shares to
        let relative = Motion::sequential([
            Motion::to(1.0).relative(0.5),
            Motion::wait().relative(0.5),
        ]);
        assert_eq!(relative.natural_duration(1.0), None);
    }
}
