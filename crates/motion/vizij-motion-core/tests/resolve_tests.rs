use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vizij_motion_core::{Duration, EasingCurve, Motion, Value};

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn counter() -> (Arc<AtomicUsize>, Motion<f64>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::side_effect(move |_: &f64| {
        h.fetch_add(1, Ordering::SeqCst);
    });
    (hits, motion)
}

fn fire(data: &vizij_motion_core::MotionData<f64>, a: f64, b: f64) -> usize {
    let actions = data.side_effects(a..=b);
    let value = data.lerp(&0.0, b);
    for action in &actions {
        action(&value);
    }
    actions.len()
}

#[test]
fn to_hits_both_endpoints_and_is_monotonic() {
    let data = Motion::to(100.0).resolve(&20.0, None);
    assert_eq!(data.lerp(&20.0, 0.0), 20.0);
    assert_eq!(data.lerp(&20.0, 1.0), 100.0);
    let mut last = 20.0;
    for i in 1..=10 {
        let v = data.lerp(&20.0, i as f64 / 10.0);
        assert!(v >= last);
        last = v;
    }
    // untimed leaves last one default unit
    assert_eq!(data.duration, Some(Duration::secs(1.0)));
}

#[test]
fn outer_duration_wins_over_own() {
    let data = Motion::to(1.0).secs(2.0).resolve(&0.0, Some(Duration::secs(5.0)));
    assert_eq!(data.duration, Some(Duration::secs(5.0)));
    let data = Motion::to(1.0).secs(2.0).resolve(&0.0, None);
    assert_eq!(data.absolute_seconds(), Some(2.0));
}

#[test]
fn sequence_of_absolute_children() {
    let seq = Motion::sequential([Motion::to(50.0).secs(1.0), Motion::to(100.0).secs(3.0)]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(4.0)));
    // boundary at d1 / total lands on the first child's end value
    assert_eq!(data.lerp(&0.0, 0.25), 50.0);
    assert!(approx(data.lerp(&0.0, 0.125), 25.0, 1e-9));
    assert!(approx(data.lerp(&0.0, 0.625), 75.0, 1e-9));
    assert_eq!(data.lerp(&0.0, 1.0), 100.0);
}

#[test]
fn sequence_threads_values_between_children() {
    let seq = Motion::sequential([
        Motion::to(10.0).secs(1.0),
        Motion::instant(50.0),
        Motion::to(0.0).secs(1.0),
    ]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(2.0)));
    assert_eq!(data.lerp(&0.0, 0.5), 50.0);
    assert!(approx(data.lerp(&0.0, 0.75), 25.0, 1e-9));
    assert_eq!(data.lerp(&0.0, 1.0), 0.0);
}

#[test]
fn mixed_relative_and_absolute_total() {
    let seq = Motion::sequential([Motion::to(1.0).relative(0.25), Motion::to(2.0).secs(3.0)]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(4.0)));
    assert_eq!(data.lerp(&0.0, 0.25), 1.0);
    assert_eq!(data.locate(0.125), Some((0, 0.5)));
}

#[test]
fn outer_duration_stretches_sequence() {
    let seq = Motion::sequential([Motion::to(1.0).secs(1.0), Motion::to(2.0)]);
    let data = seq.resolve(&0.0, Some(Duration::secs(4.0)));
    assert_eq!(data.duration, Some(Duration::secs(4.0)));
    // 1s of 4s, the unspecified child takes the rest
    assert_eq!(data.lerp(&0.0, 0.25), 1.0);
    assert_eq!(data.locate(0.625), Some((1, 0.5)));
}

#[test]
fn untimed_children_add_up() {
    let seq = Motion::sequential([Motion::to(1.0), Motion::to(2.0), Motion::to(3.0)]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(3.0)));
    assert!(approx(data.lerp(&0.0, 1.0 / 3.0), 1.0, 1e-9));
    assert!(approx(data.lerp(&0.0, 0.5), 1.5, 1e-9));
    assert_eq!(data.lerp(&0.0, 1.0), 3.0);

    let data = seq.resolve_with_unit(&0.0, None, 0.5);
    assert_eq!(data.duration, Some(Duration::secs(1.5)));

    // a timed child keeps its length next to untimed ones
    let mixed = Motion::sequential([Motion::to(1.0).secs(2.0), Motion::to(2.0)]);
    let data = mixed.resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(3.0)));
    assert!(approx(data.lerp(&0.0, 2.0 / 3.0), 1.0, 1e-9));
}

#[test]
fn untimed_repeat_and_autoreverse_scale_the_unit() {
    let data = Motion::to(100.0).repeat(3).resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(3.0)));
    let data = Motion::to(100.0).autoreverse().resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(2.0)));
    let nested = Motion::sequential([Motion::to(1.0), Motion::to(2.0)]).repeat(2);
    assert_eq!(
        nested.resolve(&0.0, None).duration,
        Some(Duration::secs(4.0))
    );
}

#[test]
fn empty_sequence_is_identity() {
    let data = Motion::<f64>::sequential([]).resolve(&3.0, None);
    assert_eq!(data.duration, Some(Duration::ZERO));
    assert_eq!(data.lerp(&3.0, 0.5), 3.0);
}

#[test]
fn wait_holds_the_carried_value() {
    let seq = Motion::to(10.0)
        .secs(1.0)
        .then(Motion::wait_for(Duration::secs(1.0)));
    let data = seq.resolve(&0.0, None);
    assert_eq!(data.lerp(&0.0, 0.75), 10.0);
}

#[test]
fn from_replaces_initial_value() {
    let data = Motion::from_value(10.0, Motion::to(20.0)).resolve(&-100.0, None);
    assert_eq!(data.lerp(&-100.0, 0.0), 10.0);
    assert_eq!(data.lerp(&-100.0, 0.5), 15.0);
}

#[test]
fn repeat_restarts_each_cycle() {
    let data = Motion::to(100.0).secs(1.0).repeat(3).resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(3.0)));
    assert!(approx(data.lerp(&0.0, 1.0 / 3.0), 0.0, 1e-9));
    assert!(approx(data.lerp(&0.0, 1.0 / 6.0), 50.0, 1e-9));
    assert!(approx(data.lerp(&0.0, 2.0 / 3.0), 0.0, 1e-9));
    assert_eq!(data.lerp(&0.0, 1.0), 100.0);

    let none = Motion::to(100.0).secs(1.0).repeat(0).resolve(&7.0, None);
    assert_eq!(none.duration, Some(Duration::ZERO));
    assert_eq!(none.lerp(&7.0, 0.5), 7.0);
}

#[test]
fn autoreverse_goes_out_and_back() {
    let data = Motion::to(100.0).secs(1.0).autoreverse().resolve(&0.0, None);
    assert_eq!(data.duration, Some(Duration::secs(2.0)));
    assert_eq!(data.lerp(&0.0, 0.25), 50.0);
    assert_eq!(data.lerp(&0.0, 0.5), 100.0);
    assert_eq!(data.lerp(&0.0, 0.75), 50.0);
    assert_eq!(data.lerp(&0.0, 1.0), 0.0);
}

#[test]
fn steps_hold_values() {
    let data = Motion::steps([10.0, 20.0, 30.0, 40.0]).resolve(&0.0, None);
    assert_eq!(data.lerp(&0.0, 0.1), 0.0);
    assert_eq!(data.lerp(&0.0, 0.3), 10.0);
    assert_eq!(data.lerp(&0.0, 0.8), 40.0);
    assert_eq!(data.lerp(&0.0, 1.0), 40.0);
}

#[test]
fn side_effect_fires_on_reaching_its_threshold() {
    let (hits, effect) = counter();
    let data = effect.resolve(&0.0, None);
    assert_eq!(fire(&data, 0.0, 0.5), 0);
    assert_eq!(fire(&data, 0.5, 1.0), 1);
    assert_eq!(fire(&data, 1.0, 1.0), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn side_effect_inside_sequence_fires_once_per_crossing() {
    let (hits, effect) = counter();
    let seq = Motion::sequential([
        Motion::to(1.0).secs(1.0),
        effect,
        Motion::to(2.0).secs(1.0),
    ]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(fire(&data, 0.0, 0.4), 0);
    assert_eq!(fire(&data, 0.4, 0.5), 1);
    assert_eq!(fire(&data, 0.5, 1.0), 0);
    // one large step skipping over the threshold still fires it
    assert_eq!(fire(&data, 0.0, 1.0), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn side_effects_fire_in_traversal_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let tag = |name: &'static str| {
        let order = Arc::clone(&order);
        Motion::side_effect(move |_: &f64| order.lock().unwrap().push(name))
    };
    let seq = Motion::sequential([
        tag("first"),
        Motion::to(1.0).secs(1.0),
        tag("second"),
        Motion::to(2.0).secs(1.0),
        tag("third"),
    ]);
    let data = seq.resolve(&0.0, None);
    assert_eq!(fire(&data, 0.0, 1.0), 3);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn repeat_and_autoreverse_replay_side_effects() {
    let (hits, effect) = counter();
    let data = Motion::to(1.0)
        .secs(1.0)
        .then(effect)
        .repeat(3)
        .resolve(&0.0, None);
    assert_eq!(fire(&data, 0.0, 1.0), 3);
    assert_eq!(fire(&data, 0.0, 0.5), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 4);

    let (hits, effect) = counter();
    let data = Motion::to(1.0)
        .secs(1.0)
        .then(effect)
        .autoreverse()
        .resolve(&0.0, None);
    assert_eq!(fire(&data, 0.0, 1.0), 2);
    // the same pass split at the turning point fires the same total
    assert_eq!(fire(&data, 0.0, 0.5) + fire(&data, 0.5, 1.0), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[test]
fn curve_on_leaf_eases_progress() {
    let data = Motion::to(100.0).curve(EasingCurve::EASE_IN).resolve(&0.0, None);
    let expected = 100.0 * EasingCurve::EASE_IN.evaluate(0.5);
    assert!(approx(data.lerp(&0.0, 0.5), expected, 1e-9));
    assert_eq!(data.lerp(&0.0, 1.0), 100.0);
}

#[test]
fn curve_on_sequence_matches_whole_motion_easing() {
    let seq = Motion::sequential([Motion::to(50.0), Motion::to(100.0)])
        .curve(EasingCurve::EASE_IN);
    let keyframes = Motion::to_keyframes([50.0, 100.0]).curve(EasingCurve::EASE_IN);
    let a = seq.resolve(&0.0, None);
    let b = keyframes.resolve(&0.0, None);
    for i in 0..=20 {
        let t = i as f64 / 20.0;
        assert!(
            approx(a.lerp(&0.0, t), b.lerp(&0.0, t), 1e-6),
            "t={t}: {} vs {}",
            a.lerp(&0.0, t),
            b.lerp(&0.0, t)
        );
    }
}

#[test]
fn resolution_is_deterministic() {
    let motion = Motion::sequential([
        Motion::to(3.0).secs(0.5).curve(EasingCurve::EASE),
        Motion::steps([1.0, 2.0]),
        Motion::to(0.0).relative(0.25).autoreverse(),
    ]);
    let a = motion.resolve(&1.0, None);
    let b = motion.resolve(&1.0, None);
    assert_eq!(a.duration, b.duration);
    for i in 0..=16 {
        let t = i as f64 / 16.0;
        assert_eq!(a.lerp(&1.0, t), b.lerp(&1.0, t));
    }
}

#[test]
fn dynamic_values_interpolate() {
    let data = Motion::to(Value::vec3(2.0, 4.0, 6.0)).resolve(&Value::vec3(0.0, 0.0, 0.0), None);
    assert_eq!(
        data.lerp(&Value::vec3(0.0, 0.0, 0.0), 0.5),
        Value::vec3(1.0, 2.0, 3.0)
    );
    let data = Motion::to(Value::Text("on".into())).resolve(&Value::Text("off".into()), None);
    assert_eq!(data.lerp(&Value::Text("off".into()), 0.9), Value::Text("off".into()));
    assert_eq!(data.lerp(&Value::Text("off".into()), 1.0), Value::Text("on".into()));
}
