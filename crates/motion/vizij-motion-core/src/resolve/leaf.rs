//! Leaf nodes: to, from, instant, side effect, steps.

use std::sync::Arc;

use crate::data::{Action, MotionData};
use crate::duration::Duration;
use crate::motion::Motion;
use crate::value::Animatable;

pub(crate) fn to<V: Animatable>(targets: &[V], duration: Option<Duration>) -> MotionData<V> {
    if targets.is_empty() {
        return MotionData::identity(duration);
    }
    let targets: Arc<[V]> = targets.into();
    MotionData::new(duration, move |initial: &V, t| keyframe(initial, &targets, t))
}

/// Keyframes `initial, targets[0], ..` equally spaced over [0,1]; the first
/// and last segments extrapolate.
fn keyframe<V: Animatable>(initial: &V, targets: &[V], t: f64) -> V {
    let segments = targets.len();
    let scaled = t * segments as f64;
    let index = (scaled.floor().max(0.0) as usize).min(segments - 1);
    let local = scaled - index as f64;
    let from = if index == 0 {
        initial
    } else {
        &targets[index - 1]
    };
    from.mix(&targets[index], local)
}

pub(crate) fn from<V: Animatable>(
    value: &V,
    then: &Motion<V>,
    duration: Option<Duration>,
    unit: f64,
) -> MotionData<V> {
    let data = then.resolve_with_unit(value, duration, unit);
    let side_effects = data.shared_side_effects();
    let value = value.clone();
    MotionData::new(data.duration, move |_: &V, t| data.lerp(&value, t))
        .with_shared_side_effects(side_effects)
}

pub(crate) fn instant<V: Animatable>(value: &V, duration: Option<Duration>) -> MotionData<V> {
    let value = value.clone();
    MotionData::new(
        Some(duration.unwrap_or(Duration::ZERO)),
        move |_: &V, _: f64| value.clone(),
    )
}

/// Fires when local progress reaches 1 from below.
pub(crate) fn side_effect<V: Animatable>(
    action: &Action<V>,
    duration: Option<Duration>,
) -> MotionData<V> {
    let action = Arc::clone(action);
    MotionData::identity(Some(duration.unwrap_or(Duration::ZERO))).with_side_effects(
        move |range| {
            if *range.start() < 1.0 && *range.end() >= 1.0 {
                vec![Arc::clone(&action)]
            } else {
                Vec::new()
            }
        },
    )
}

/// `N` values over `N + 1` equal buckets; the first bucket keeps the
/// initial value and `t >= 1` lands on the last value.
pub(crate) fn steps<V: Animatable>(values: &[V], duration: Option<Duration>) -> MotionData<V> {
    if values.is_empty() {
        return MotionData::identity(duration);
    }
    let values: Arc<[V]> = values.into();
    MotionData::new(duration, move |initial: &V, t| {
        let count = values.len();
        let bucket = if t >= 1.0 {
            count
        } else {
            ((t * (count + 1) as f64).floor().max(0.0) as usize).min(count)
        };
        match bucket {
            0 => initial.clone(),
            k => values[k - 1].clone(),
        }
    })
}
