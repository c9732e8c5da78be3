//! Parallel facets sharing one timeline.

use std::ops::RangeInclusive;
use std::sync::Arc;

use super::EPSILON;
use crate::data::{Action, MotionData};
use crate::duration::Duration;
use crate::facet::{Facet, FacetData};
use crate::value::Animatable;

/// Duration a parallel asks for: the longest absolute facet. With no facets,
/// or only zero-length ones, the parallel is instantaneous.
pub(crate) fn shared_span(declared: &[Option<Duration>]) -> Option<Duration> {
    let longest = declared
        .iter()
        .filter_map(|d| d.and_then(|d| d.absolute_seconds()))
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
    match longest {
        Some(s) if s > EPSILON => Some(Duration::Absolute(s)),
        _ if declared.iter().all(|d| matches!(d, Some(d) if d.is_zero())) => Some(Duration::ZERO),
        _ => None,
    }
}

/// Duration a parallel plays for with `unit`-second leaves. Untimed facets
/// stretch over the longest timed one and only count when none is timed.
pub(crate) fn natural_span<V: Animatable>(facets: &[Facet<V>], unit: f64) -> Option<Duration> {
    let declared: Vec<_> = facets.iter().map(Facet::declared_duration).collect();
    if let Some(span) = shared_span(&declared) {
        return Some(span);
    }
    let natural: Vec<_> = facets.iter().map(|f| f.natural_duration(unit)).collect();
    shared_span(&natural)
}

/// Portion of the parallel a facet occupies (from 0) and the duration it is
/// resolved with.
fn span(declared: Option<Duration>, total: Option<f64>) -> (f64, Option<Duration>) {
    match (declared, total) {
        (Some(Duration::Absolute(s)), Some(t)) if t > EPSILON && s < t => {
            (s.max(0.0) / t, Some(Duration::Absolute(s.max(0.0))))
        }
        (Some(Duration::Relative(f)), Some(t)) => {
            let f = f.clamp(0.0, 1.0);
            (f, Some(Duration::Absolute(t * f)))
        }
        (Some(Duration::Relative(f)), None) => (f.clamp(0.0, 1.0), None),
        (_, Some(t)) => (1.0, Some(Duration::Absolute(t))),
        (_, None) => (1.0, None),
    }
}

/// Facet progress for parent progress `t`; facets shorter than the parent
/// hold their end value once done.
#[inline]
fn facet_progress(t: f64, span: f64) -> f64 {
    if span >= 1.0 {
        t
    } else if span <= EPSILON {
        if t > 0.0 {
            1.0
        } else {
            0.0
        }
    } else if t <= span {
        t / span
    } else {
        1.0
    }
}

struct Resolved<V> {
    span: f64,
    data: FacetData<V>,
}

pub(crate) fn resolve<V: Animatable>(
    facets: &[Facet<V>],
    initial: &V,
    duration: Option<Duration>,
    unit: f64,
) -> MotionData<V> {
    let declared: Vec<_> = facets.iter().map(Facet::declared_duration).collect();
    let shared = natural_span(facets, unit);
    let total = duration.or(shared).and_then(|d| d.absolute_seconds());

    let resolved: Arc<[Resolved<V>]> = facets
        .iter()
        .zip(&declared)
        .map(|(facet, declared)| {
            let (span, outer) = span(*declared, total);
            Resolved {
                span,
                data: facet.resolve(initial, outer, unit),
            }
        })
        .collect::<Vec<_>>()
        .into();
    let has_side_effects = resolved.iter().any(|r| r.data.side_effects.is_some());

    let lerp_facets = Arc::clone(&resolved);
    let data = MotionData::new(duration.or(shared), move |initial: &V, t| {
        let mut out = initial.clone();
        for facet in lerp_facets.iter() {
            (facet.data.apply)(initial, facet_progress(t, facet.span), &mut out);
        }
        out
    });
    if !has_side_effects {
        return data;
    }
    data.with_side_effects(move |range: RangeInclusive<f64>| {
        let (a, b) = (*range.start(), *range.end());
        let mut actions: Vec<Action<V>> = Vec::new();
        for facet in resolved.iter() {
            if let Some(side_effects) = &facet.data.side_effects {
                let lo = facet_progress(a, facet.span);
                let hi = facet_progress(b, facet.span);
                actions.extend(side_effects(lo..=hi));
            }
        }
        actions
    })
}
