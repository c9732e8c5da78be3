//! Parallel facets.
//!
//! A [`Facet`] binds a motion over one part of a composite value: a struct
//! field (via getter/setter key path), a `Vec` element, every `Vec` element,
//! or a map entry. Each facet carries its own value type, so facets are
//! type-erased behind closures that read the part from the composite initial
//! value and write the interpolated part back into the output.

use std::fmt;
use std::hash::Hash;
use std::ops::RangeInclusive;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::data::{Action, MotionData, SideEffects};
use crate::duration::Duration;
use crate::motion::Motion;
use crate::value::Animatable;

type Apply<V> = Arc<dyn Fn(&V, f64, &mut V) + Send + Sync>;
type Resolver<V> = Arc<dyn Fn(&V, Option<Duration>, f64) -> FacetData<V> + Send + Sync>;
type Natural = Arc<dyn Fn(f64) -> Option<Duration> + Send + Sync>;

/// A facet resolved against an initial composite value.
pub(crate) struct FacetData<V> {
    pub(crate) apply: Apply<V>,
    pub(crate) side_effects: Option<SideEffects<V>>,
}

impl<V: Animatable> FacetData<V> {
    fn inert() -> Self {
        Self {
            apply: Arc::new(|_: &V, _: f64, _: &mut V| {}),
            side_effects: None,
        }
    }
}

/// Motion over one part of a composite value.
pub struct Facet<V> {
    label: String,
    declared: Option<Duration>,
    natural: Natural,
    resolver: Resolver<V>,
}

impl<V> Clone for Facet<V> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            declared: self.declared,
            natural: Arc::clone(&self.natural),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<V> fmt::Debug for Facet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("label", &self.label)
            .field("declared", &self.declared)
            .finish()
    }
}

impl<V: Animatable> Facet<V> {
    /// Key-path facet: `get` reads the part, `set` writes it back.
    pub fn field<F, G, S>(label: impl Into<String>, get: G, set: S, motion: Motion<F>) -> Self
    where
        F: Animatable,
        G: Fn(&V) -> F + Send + Sync + 'static,
        S: Fn(&mut V, F) + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        let set = Arc::new(set);
        let declared = motion.declared_duration();
        let natural = natural_of(&motion);
        let resolver = move |initial: &V, outer: Option<Duration>, unit: f64| {
            let data = motion.resolve_with_unit(&get(initial), outer, unit);
            let side_effects = lift_side_effects(&data, {
                let get = Arc::clone(&get);
                move |v: &V| Some(get(v))
            });
            let get = Arc::clone(&get);
            let set = Arc::clone(&set);
            FacetData {
                apply: Arc::new(move |initial: &V, t, out: &mut V| {
                    set(out, data.lerp(&get(initial), t));
                }),
                side_effects,
            }
        };
        Self {
            label: label.into(),
            declared,
            natural,
            resolver: Arc::new(resolver),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Structural duration of the facet's motion.
    #[inline]
    pub fn declared_duration(&self) -> Option<Duration> {
        self.declared
    }

    /// Natural duration of the facet's motion with `unit`-second leaves.
    #[inline]
    pub fn natural_duration(&self, unit: f64) -> Option<Duration> {
        (self.natural)(unit)
    }

    pub(crate) fn resolve(
        &self,
        initial: &V,
        outer: Option<Duration>,
        unit: f64,
    ) -> FacetData<V> {
        (self.resolver)(initial, outer, unit)
    }
}

impl<T: Animatable> Facet<Vec<T>> {
    /// Element `index`; inert when the initial value is shorter.
    pub fn index(index: usize, motion: Motion<T>) -> Self {
        let declared = motion.declared_duration();
        let natural = natural_of(&motion);
        let resolver = move |initial: &Vec<T>, outer: Option<Duration>, unit: f64| {
            let Some(element) = initial.get(index) else {
                log::debug!("facet [{index}] missing from initial value; skipped");
                return FacetData::inert();
            };
            let data = motion.resolve_with_unit(element, outer, unit);
            let side_effects = lift_side_effects(&data, move |v: &Vec<T>| v.get(index).cloned());
            FacetData {
                apply: Arc::new(move |initial: &Vec<T>, t, out: &mut Vec<T>| {
                    if let (Some(from), Some(slot)) = (initial.get(index), out.get_mut(index)) {
                        *slot = data.lerp(from, t);
                    }
                }),
                side_effects,
            }
        };
        Self {
            label: format!("[{index}]"),
            declared,
            natural,
            resolver: Arc::new(resolver),
        }
    }

    /// The same motion applied to every element independently.
    pub fn each(motion: Motion<T>) -> Self {
        let declared = motion.declared_duration();
        let natural = natural_of(&motion);
        let resolver = move |initial: &Vec<T>, outer: Option<Duration>, unit: f64| {
            let elements: Arc<Vec<MotionData<T>>> =
                Arc::new(initial
                    .iter()
                    .map(|e| motion.resolve_with_unit(e, outer, unit))
                    .collect());
            let side_effects = elements
                .iter()
                .any(MotionData::has_side_effects)
                .then(|| {
                    let elements = Arc::clone(&elements);
                    Arc::new(move |range: RangeInclusive<f64>| {
                        let mut actions: Vec<Action<Vec<T>>> = Vec::new();
                        for (i, data) in elements.iter().enumerate() {
                            for action in data.side_effects(range.clone()) {
                                actions.push(Arc::new(move |v: &Vec<T>| {
                                    if let Some(element) = v.get(i) {
                                        action(element);
                                    }
                                }));
                            }
                        }
                        actions
                    }) as SideEffects<Vec<T>>
                });
            FacetData {
                apply: Arc::new(move |initial: &Vec<T>, t, out: &mut Vec<T>| {
                    for ((from, slot), data) in initial.iter().zip(out.iter_mut()).zip(elements.iter())
                    {
                        *slot = data.lerp(from, t);
                    }
                }),
                side_effects,
            }
        };
        Self {
            label: "[*]".to_string(),
            declared,
            natural,
            resolver: Arc::new(resolver),
        }
    }
}

impl<K, T> Facet<HashMap<K, T>>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    T: Animatable,
{
    /// Map entry `key`; inert when the key is absent from the initial value.
    pub fn key(key: K, motion: Motion<T>) -> Self {
        let declared = motion.declared_duration();
        let natural = natural_of(&motion);
        let label = format!("{key:?}");
        let resolver = move |initial: &HashMap<K, T>, outer: Option<Duration>, unit: f64| {
            let Some(entry) = initial.get(&key) else {
                log::debug!("facet {key:?} missing from initial value; skipped");
                return FacetData::inert();
            };
            let data = motion.resolve_with_unit(entry, outer, unit);
            let side_effects = lift_side_effects(&data, {
                let key = key.clone();
                move |v: &HashMap<K, T>| v.get(&key).cloned()
            });
            let key = key.clone();
            FacetData {
                apply: Arc::new(move |initial: &HashMap<K, T>, t, out: &mut HashMap<K, T>| {
                    if let (Some(from), Some(slot)) = (initial.get(&key), out.get_mut(&key)) {
                        *slot = data.lerp(from, t);
                    }
                }),
                side_effects,
            }
        };
        Self {
            label,
            declared,
            natural,
            resolver: Arc::new(resolver),
        }
    }
}

fn natural_of<F: Animatable>(motion: &Motion<F>) -> Natural {
    let motion = motion.clone();
    Arc::new(move |unit: f64| motion.natural_duration(unit))
}

/// Turn a part's side effects into composite ones that read the part from
/// the value they are fired with.
fn lift_side_effects<V, F, G>(data: &MotionData<F>, get: G) -> Option<SideEffects<V>>
where
    V: Animatable,
    F: Animatable,
    G: Fn(&V) -> Option<F> + Send + Sync + 'static,
{
    let inner = data.shared_side_effects()?;
    let get = Arc::new(get);
    Some(Arc::new(move |range: RangeInclusive<f64>| {
        inner(range)
            .into_iter()
            .map(|action| {
                let get = Arc::clone(&get);
                Arc::new(move |v: &V| {
                    if let Some(part) = get(v) {
                        action(&part);
                    }
                }) as Action<V>
            })
            .collect()
    }))
}
