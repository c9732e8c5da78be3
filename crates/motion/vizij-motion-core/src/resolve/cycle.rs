//! Repeat and autoreverse.

use std::ops::RangeInclusive;

use super::EPSILON;
use crate::data::{Action, MotionData};
use crate::duration::Duration;
use crate::motion::Motion;
use crate::value::Animatable;

/// Cycle index and local progress for parent progress `t`. Global `t = 1`
/// lands exactly on the end of the last cycle.
#[inline]
fn cycle_position(t: f64, count: usize) -> (usize, f64) {
    let n = count as f64;
    let mut scaled = t * n;
    // t = k / n must land on a cycle start despite rounding
    if (scaled - scaled.round()).abs() < EPSILON * n {
        scaled = scaled.round();
    }
    let last = count - 1;
    if t >= 1.0 {
        return (last, scaled - last as f64);
    }
    if t < 0.0 {
        return (0, scaled);
    }
    let index = (scaled.floor() as usize).min(last);
    (index, scaled - index as f64)
}

pub(crate) fn repeat<V: Animatable>(
    child: &Motion<V>,
    count: usize,
    initial: &V,
    duration: Option<Duration>,
    unit: f64,
) -> MotionData<V> {
    if count == 0 {
        return MotionData::identity(Some(Duration::ZERO));
    }
    let n = count as f64;
    let outer = duration
        .and_then(|d| d.absolute_seconds())
        .map(|s| Duration::Absolute(s / n));
    let data = child.resolve_with_unit(initial, outer, unit);
    let total = duration.or(data.duration.map(|d| d * n));
    let has_side_effects = data.has_side_effects();

    let lerp_data = data.clone();
    // every cycle restarts from the original initial value
    let repeated = MotionData::new(total, move |initial: &V, t| {
        let (_, local) = cycle_position(t, count);
        lerp_data.lerp(initial, local)
    });
    if !has_side_effects {
        return repeated;
    }
    repeated.with_side_effects(move |range: RangeInclusive<f64>| {
        let (a, b) = (*range.start() * n, *range.end() * n);
        let first = a.floor().clamp(0.0, n - 1.0) as usize;
        let last = b.floor().clamp(0.0, n - 1.0) as usize;
        let mut actions: Vec<Action<V>> = Vec::new();
        for index in first..=last {
            let offset = index as f64;
            let (lo, hi) = (a - offset, b - offset);
            if hi < 0.0 || lo > 1.0 {
                continue;
            }
            actions.extend(data.side_effects(lo.clamp(0.0, 1.0)..=hi.clamp(0.0, 1.0)));
        }
        actions
    })
}

pub(crate) fn autoreverse<V: Animatable>(
    child: &Motion<V>,
    initial: &V,
    duration: Option<Duration>,
    unit: f64,
) -> MotionData<V> {
    let outer = duration
        .and_then(|d| d.absolute_seconds())
        .map(|s| Duration::Absolute(s / 2.0));
    let data = child.resolve_with_unit(initial, outer, unit);
    let total = duration.or(data.duration.map(|d| d * 2.0));
    let has_side_effects = data.has_side_effects();

    let lerp_data = data.clone();
    let reversed = MotionData::new(total, move |initial: &V, t| {
        if t <= 0.5 {
            lerp_data.lerp(initial, 2.0 * t)
        } else {
            lerp_data.lerp(initial, 2.0 * (1.0 - t))
        }
    });
    if !has_side_effects {
        return reversed;
    }
    // The way out covers local [2a, 2b]; the way back runs the child
    // backwards over [2(1 - b), 2(1 - a)].
    reversed.with_side_effects(move |range: RangeInclusive<f64>| {
        let (a, b) = (*range.start(), *range.end());
        let mut actions = Vec::new();
        if a <= 0.5 {
            actions.extend(data.side_effects(2.0 * a..=2.0 * b.min(0.5)));
        }
        if b > 0.5 {
            let a = a.max(0.5);
            actions.extend(data.side_effects(2.0 * (1.0 - b)..=2.0 * (1.0 - a)));
        }
        actions
    })
}
