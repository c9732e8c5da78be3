//! Sequences: duration negotiation between siblings, progress search and
//! side-effect range mapping.

use std::ops::RangeInclusive;
use std::sync::Arc;

use super::{local_progress, EPSILON};
use crate::curve::EasingCurve;
use crate::data::MotionData;
use crate::duration::Duration;
use crate::motion::Motion;
use crate::value::Animatable;

/// How a child asks for time inside a sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Claim {
    Absolute(f64),
    Relative(f64),
    /// No declared duration. Carries the child's natural length in seconds
    /// when it is known.
    Open(Option<f64>),
}

impl Claim {
    /// Claim of a structurally declared duration, natural length unknown.
    pub(crate) fn declared(duration: Option<Duration>) -> Self {
        match duration {
            Some(Duration::Absolute(s)) => Self::Absolute(s),
            Some(Duration::Relative(f)) => Self::Relative(f),
            None => Self::Open(None),
        }
    }

    /// Claim of a child about to be resolved with `unit`-second leaves.
    pub(crate) fn natural<V: Animatable>(child: &Motion<V>, unit: f64) -> Self {
        match child.declared_duration() {
            Some(declared) => Self::declared(Some(declared)),
            None => Self::Open(Some(
                child
                    .natural_duration(unit)
                    .and_then(|d| d.absolute_seconds())
                    .unwrap_or(unit),
            )),
        }
    }
}

/// Share of the sequence each child receives, plus the sequence total when
/// one can be derived.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Allocation {
    pub(crate) fractions: Vec<f64>,
    pub(crate) total: Option<f64>,
}

/// Split a sequence between children with mixed absolute, relative and
/// open claims.
///
/// Without an outer total, the total is `(absolute + open) / (1 - relative)`
/// over the children's natural lengths; it stays unknown when an open
/// child's length is unknown or only relative claims remain. With a total,
/// absolute children take `seconds / total`, relative children their
/// fraction and open children split the rest equally. Shares always end up
/// summing to 1; all-zero shares split equally.
pub(crate) fn allocate(claims: &[Claim], outer_total: Option<f64>) -> Allocation {
    let count = claims.len();
    if count == 0 {
        return Allocation {
            fractions: Vec::new(),
            total: Some(outer_total.unwrap_or(0.0)),
        };
    }

    let mut absolute_sum = 0.0;
    let mut relative_sum = 0.0;
    let mut open = 0usize;
    let mut open_secs = Some(0.0);
    for claim in claims {
        match *claim {
            Claim::Absolute(s) => absolute_sum += s.max(0.0),
            Claim::Relative(f) => relative_sum += f.max(0.0),
            Claim::Open(natural) => {
                open += 1;
                open_secs = open_secs.zip(natural).map(|(sum, s)| sum + s.max(0.0));
            }
        }
    }
    let relative_scale = if relative_sum > 1.0 {
        log::warn!("relative durations sum to {relative_sum}; scaled down to fill the sequence");
        relative_sum.recip()
    } else {
        1.0
    };
    let relative_sum = relative_sum * relative_scale;

    let total = match outer_total {
        Some(total) => Some(total.max(0.0)),
        None => open_secs.and_then(|open_secs| {
            let timed = absolute_sum + open_secs;
            if timed <= EPSILON {
                (relative_sum <= EPSILON).then_some(0.0)
            } else if relative_sum < 1.0 - EPSILON {
                Some(timed / (1.0 - relative_sum))
            } else {
                log::warn!("relative shares leave no room for {timed}s of timed children");
                None
            }
        }),
    };

    let used = relative_sum
        + match total {
            Some(t) if t > EPSILON => absolute_sum / t,
            _ => 0.0,
        };
    let open_share = if open > 0 {
        (1.0 - used).max(0.0) / open as f64
    } else {
        0.0
    };

    let mut fractions: Vec<f64> = claims
        .iter()
        .map(|claim| match *claim {
            Claim::Absolute(s) => match total {
                Some(t) if t > EPSILON => s.max(0.0) / t,
                _ => 0.0,
            },
            Claim::Relative(f) => f.max(0.0) * relative_scale,
            Claim::Open(_) => open_share,
        })
        .collect();
    let sum: f64 = fractions.iter().sum();
    if sum <= EPSILON {
        fractions.iter_mut().for_each(|f| *f = 1.0 / count as f64);
    } else if (sum - 1.0).abs() > EPSILON {
        fractions.iter_mut().for_each(|f| *f /= sum);
    }
    Allocation { fractions, total }
}

/// Child spans of a sequence in the parent's normalized time.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Segments {
    starts: Vec<f64>,
    widths: Vec<f64>,
}

impl Segments {
    pub(crate) fn from_widths(widths: Vec<f64>) -> Self {
        let mut starts = Vec::with_capacity(widths.len());
        let mut cursor = 0.0;
        for w in &widths {
            starts.push(cursor);
            cursor += w;
        }
        Self { starts, widths }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.widths.len()
    }

    #[inline]
    pub(crate) fn start(&self, index: usize) -> f64 {
        self.starts[index]
    }

    #[inline]
    pub(crate) fn width(&self, index: usize) -> f64 {
        self.widths[index]
    }

    /// Child playing at `t` and its local progress. Ties go to the later
    /// child; `t >= 1` belongs to the last one.
    pub(crate) fn locate(&self, t: f64) -> (usize, f64) {
        let Some(last) = self.len().checked_sub(1) else {
            return (0, t);
        };
        if t >= 1.0 {
            let w = self.widths[last];
            let local = if w > EPSILON { 1.0 + (t - 1.0) / w } else { 1.0 };
            return (last, local);
        }
        if t < 0.0 {
            let w = self.widths[0];
            return (0, if w > EPSILON { t / w } else { 0.0 });
        }
        let index = self
            .starts
            .partition_point(|&s| s <= t)
            .saturating_sub(1)
            .min(last);
        let w = self.widths[index];
        let local = if w > EPSILON {
            (t - self.starts[index]) / w
        } else {
            0.0
        };
        (index, local)
    }
}

/// Place child boundaries under a parent curve: each progress boundary is
/// turned into a curve parameter, and the curve piece between consecutive
/// parameters gives the child's time width and its easing.
fn retime(curve: &EasingCurve, fractions: &[f64]) -> (Vec<f64>, Vec<EasingCurve>) {
    let mut widths = Vec::with_capacity(fractions.len());
    let mut curves = Vec::with_capacity(fractions.len());
    let mut progress = 0.0;
    let mut param = 0.0;
    for (i, fraction) in fractions.iter().enumerate() {
        progress += fraction;
        let next = if i + 1 == fractions.len() {
            1.0
        } else {
            curve.parameter_at_progress(progress).max(param)
        };
        let (piece, width) = curve.split(param..=next);
        widths.push(width.max(0.0));
        curves.push(piece);
        param = next;
    }
    (widths, curves)
}

pub(crate) fn resolve<V: Animatable>(
    children: &[Motion<V>],
    initial: &V,
    duration: Option<Duration>,
    curve: Option<EasingCurve>,
    unit: f64,
) -> MotionData<V> {
    if children.is_empty() {
        log::debug!("empty sequence resolved as identity");
        return MotionData::identity(Some(duration.unwrap_or(Duration::ZERO)));
    }

    let claims: Vec<_> = children.iter().map(|c| Claim::natural(c, unit)).collect();
    let allocation = allocate(&claims, duration.and_then(|d| d.absolute_seconds()));
    let (widths, curves) = match curve {
        Some(curve) => retime(&curve, &allocation.fractions),
        None => (allocation.fractions.clone(), Vec::new()),
    };
    let segments = Arc::new(Segments::from_widths(widths));

    let mut resolved = Vec::with_capacity(children.len());
    let mut carried: Option<V> = None;
    for (i, child) in children.iter().enumerate() {
        let outer = allocation
            .total
            .map(|total| Duration::Absolute(total * segments.width(i)));
        let child_curve = curves.get(i).map(|piece| match child.own_curve() {
            Some(own) if !own.is_linear() => piece.midpoint(&own),
            _ => *piece,
        });
        let start = carried.as_ref().unwrap_or(initial);
        let data = child.resolve_with(start, outer, child_curve, unit);
        carried = Some(data.lerp(start, 1.0));
        resolved.push(data);
    }

    let reported = duration.or(allocation.total.map(Duration::Absolute));
    let has_side_effects = resolved.iter().any(MotionData::has_side_effects);
    let children: Arc<[MotionData<V>]> = resolved.into();

    let lerp_children = Arc::clone(&children);
    let lerp_segments = Arc::clone(&segments);
    let mut data = MotionData::new(reported, move |initial: &V, t| {
        let (index, local) = lerp_segments.locate(t);
        let carried = lerp_children[..index]
            .iter()
            .fold(None, |acc: Option<V>, child| {
                Some(child.lerp(acc.as_ref().unwrap_or(initial), 1.0))
            });
        lerp_children[index].lerp(carried.as_ref().unwrap_or(initial), local)
    });

    if has_side_effects {
        let segments = Arc::clone(&segments);
        data = data.with_side_effects(move |range: RangeInclusive<f64>| {
            let (a, b) = (*range.start(), *range.end());
            let mut actions = Vec::new();
            for (i, child) in children.iter().enumerate() {
                if !child.has_side_effects() {
                    continue;
                }
                let (start, width) = (segments.start(i), segments.width(i));
                let lo = local_progress(a, start, width);
                let hi = local_progress(b, start, width);
                if width > EPSILON {
                    if hi < 0.0 || lo > 1.0 {
                        continue;
                    }
                    actions.extend(child.side_effects(lo.max(0.0)..=hi.min(1.0)));
                } else if lo < hi {
                    actions.extend(child.side_effects(0.0..=1.0));
                }
            }
            actions
        });
    }
    data.with_segments(segments)
}
