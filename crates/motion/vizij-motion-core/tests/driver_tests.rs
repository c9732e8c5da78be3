use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vizij_motion_core::host::{run_frames, FrameLoop, ManualClock};
use vizij_motion_core::{
    Config, Direction, Driver, Duration, EasingCurve, Motion, PlayOptions, PlaybackState,
};

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn linear(secs: f64) -> Driver<f64> {
    Driver::new(Motion::to(100.0).secs(secs), 0.0)
}

fn completion_log() -> (Rc<RefCell<Vec<bool>>>, impl FnOnce(bool) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    (log, move |ok: bool| l.borrow_mut().push(ok))
}

#[test]
fn plays_to_the_end_and_completes() {
    let mut driver = linear(2.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new(), done);
    assert_eq!(driver.state(), PlaybackState::Animating);
    assert_eq!(driver.direction(), Some(Direction::Forward));

    driver.advance(0.5);
    assert!(approx(driver.progress(), 0.25, 1e-12));
    assert!(approx(driver.current_value(), 25.0, 1e-9));
    assert!(log.borrow().is_empty());

    driver.advance(10.0);
    assert_eq!(driver.progress(), 1.0);
    assert_eq!(driver.current_value(), 100.0);
    assert_eq!(driver.state(), PlaybackState::Idle);
    assert_eq!(*log.borrow(), vec![true]);

    // idle advances are no-ops
    driver.advance(1.0);
    assert_eq!(driver.progress(), 1.0);
}

#[test]
fn play_at_target_completes_synchronously() {
    let mut driver = linear(1.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new().with_from(1.0), done);
    assert!(!driver.is_animating());
    assert_eq!(*log.borrow(), vec![true]);
}

#[test]
fn zero_duration_completes_and_fires_immediately() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::sequential([
        Motion::instant(5.0),
        Motion::side_effect(move |v: &f64| {
            assert_eq!(*v, 5.0);
            h.fetch_add(1, Ordering::SeqCst);
        }),
    ]);
    let mut driver = Driver::new(motion, 0.0);
    assert_eq!(driver.duration_secs(), 0.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new(), done);
    assert!(!driver.is_animating());
    assert_eq!(driver.current_value(), 5.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(*log.borrow(), vec![true]);
}

#[test]
fn unspecified_duration_uses_config_default() {
    let config = Config {
        default_duration_secs: 4.0,
        ..Config::default()
    };
    let mut driver = Driver::with_config(Motion::to(1.0), 0.0, config);
    assert_eq!(driver.duration_secs(), 4.0);
    driver.play(PlayOptions::new());
    driver.advance(1.0);
    assert!(approx(driver.progress(), 0.25, 1e-12));

    driver.set_duration_override(Some(Duration::relative(0.5)));
    assert_eq!(driver.duration_secs(), 2.0);
}

#[test]
fn untimed_children_each_take_the_default() {
    let motion = Motion::sequential([Motion::to(1.0), Motion::to(2.0), Motion::to(3.0)]);
    let mut driver = Driver::new(motion.clone(), 0.0);
    assert_eq!(driver.duration_secs(), 3.0);
    driver.play(PlayOptions::new());
    driver.advance(1.0);
    assert!(driver.is_animating());
    assert!(approx(driver.progress(), 1.0 / 3.0, 1e-12));
    assert!(approx(driver.current_value(), 1.0, 1e-9));

    let config = Config {
        default_duration_secs: 0.5,
        ..Config::default()
    };
    let driver = Driver::with_config(motion, 0.0, config);
    assert_eq!(driver.duration_secs(), 1.5);

    assert_eq!(Driver::new(Motion::to(100.0).repeat(3), 0.0).duration_secs(), 3.0);
    assert_eq!(Driver::new(Motion::to(100.0).autoreverse(), 0.0).duration_secs(), 2.0);
}

#[test]
fn side_effects_fire_once_even_when_skipped_over() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::sequential([
        Motion::to(1.0).secs(1.0),
        Motion::side_effect(move |_: &f64| {
            h.fetch_add(1, Ordering::SeqCst);
        }),
        Motion::to(2.0).secs(1.0),
    ]);
    let mut driver = Driver::new(motion, 0.0);
    driver.play(PlayOptions::new());
    driver.advance(1.9);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    driver.advance(0.5);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!driver.is_animating());
}

#[test]
fn scrubbing_does_not_fire_side_effects() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::to(1.0).secs(1.0).then(Motion::side_effect(move |_: &f64| {
        h.fetch_add(1, Ordering::SeqCst);
    }));
    let mut driver = Driver::new(motion, 0.0);
    driver.set_progress(1.0);
    assert_eq!(driver.current_value(), 1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    driver.stop(0.0);
    driver.stop_firing(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn stop_is_idempotent_and_cancels_completion() {
    let mut driver = linear(1.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new(), done);
    driver.advance(0.3);
    driver.stop(0.0);
    driver.stop(0.0);
    assert_eq!(driver.progress(), 0.0);
    assert!(!driver.is_animating());
    assert_eq!(*log.borrow(), vec![false]);
}

#[test]
fn pause_cancels_and_toggle_resumes() {
    let mut driver = linear(1.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new(), done);
    driver.advance(0.25);
    driver.toggle();
    assert_eq!(driver.state(), PlaybackState::Paused);
    driver.advance(0.25);
    assert!(approx(driver.progress(), 0.25, 1e-12));
    driver.toggle();
    assert!(driver.is_animating());
    assert!(log.borrow().is_empty());

    driver.pause();
    assert_eq!(driver.state(), PlaybackState::Paused);
    assert_eq!(*log.borrow(), vec![false]);
    assert!(approx(driver.progress(), 0.25, 1e-12));
}

#[test]
fn new_play_supersedes_pending_completions() {
    let mut driver = linear(1.0);
    let (first, done_first) = completion_log();
    let (second, done_second) = completion_log();
    driver.play_then(PlayOptions::new(), done_first);
    driver.advance(0.5);
    driver.play_then(PlayOptions::new().with_to(0.0), done_second);
    assert_eq!(*first.borrow(), vec![false]);
    assert_eq!(driver.direction(), Some(Direction::Backward));
    driver.advance(1.0);
    assert_eq!(driver.progress(), 0.0);
    assert_eq!(*second.borrow(), vec![true]);
}

#[test]
fn reverse_flips_toward_the_other_end() {
    let mut driver = linear(1.0);
    // nothing to reverse yet
    driver.reverse(None);
    assert!(!driver.is_animating());
    assert_eq!(driver.progress(), 0.0);

    driver.play(PlayOptions::new());
    driver.advance(0.5);
    driver.reverse(None);
    assert_eq!(driver.target(), 0.0);
    assert_eq!(driver.direction(), Some(Direction::Backward));
    driver.advance(0.25);
    assert!(approx(driver.progress(), 0.25, 1e-12));

    driver.reverse(None);
    assert_eq!(driver.target(), 1.0);
    assert_eq!(driver.direction(), Some(Direction::Forward));
}

#[test]
fn reverse_after_backward_travel_heads_for_the_end() {
    let mut driver = linear(1.0);
    driver.play(PlayOptions::new().with_from(1.0).with_to(0.0));
    driver.advance(0.2);
    driver.pause();
    assert!(approx(driver.progress(), 0.8, 1e-12));
    driver.reverse(None);
    assert_eq!(driver.target(), 1.0);
    assert_eq!(driver.direction(), Some(Direction::Forward));

    // still sitting at 1 after turning backward: head back toward 0
    driver.stop(1.0);
    driver.play(PlayOptions::new().with_from(1.0).with_to(0.0));
    driver.reverse(None);
    assert_eq!(driver.target(), 0.0);
    assert_eq!(driver.direction(), Some(Direction::Backward));
}

#[test]
fn play_targets_are_clamped_to_the_timeline() {
    let mut driver = linear(1.0);
    driver.play(PlayOptions::new().with_to(2.0));
    assert_eq!(driver.target(), 1.0);
    driver.advance(5.0);
    assert_eq!(driver.progress(), 1.0);
    assert_eq!(driver.current_value(), 100.0);
    assert!(!driver.is_animating());

    driver.play(PlayOptions::new().with_to(-1.0));
    assert_eq!(driver.target(), 0.0);
    driver.advance(5.0);
    assert_eq!(driver.progress(), 0.0);
}

#[test]
fn repeat_forever_wraps_and_replays_effects() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::to(1.0).secs(1.0).then(Motion::side_effect(move |_: &f64| {
        h.fetch_add(1, Ordering::SeqCst);
    }));
    let mut driver = Driver::new(motion, 0.0);
    driver.play(PlayOptions::new().repeat_forever());
    driver.advance(0.75);
    driver.advance(0.5);
    assert!(driver.is_animating());
    assert!(approx(driver.progress(), 0.25, 1e-9));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    driver.advance(3.0);
    assert!(approx(driver.progress(), 0.25, 1e-9));
    assert_eq!(hits.load(Ordering::SeqCst), 4);

    driver.pause();
    assert!(!driver.is_repeating_forever());
}

#[test]
fn forever_cycles_beyond_the_cap_are_skipped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let motion = Motion::to(1.0).secs(1.0).then(Motion::side_effect(move |_: &f64| {
        h.fetch_add(1, Ordering::SeqCst);
    }));
    let config = Config {
        max_cycles_per_advance: 2,
        ..Config::default()
    };
    let mut driver = Driver::with_config(motion, 0.0, config);
    driver.play(PlayOptions::new().repeat_forever());
    driver.advance(10.5);
    // end of the first pass plus two replayed cycles
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(approx(driver.progress(), 0.5, 1e-9));
}

#[test]
fn observers_follow_value_changes() {
    let mut driver = linear(1.0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let subscription = driver.subscribe(move |v: &f64| s.borrow_mut().push(*v));
    assert_eq!(driver.observer_count(), 1);

    driver.play(PlayOptions::new());
    driver.advance(0.5);
    driver.set_progress(0.1);
    assert_eq!(seen.borrow().len(), 2);
    assert!(approx(seen.borrow()[0], 50.0, 1e-9));
    assert!(approx(seen.borrow()[1], 10.0, 1e-9));

    drop(subscription);
    assert_eq!(driver.observer_count(), 0);
    driver.advance(0.1);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn changing_inputs_invalidates_the_timeline() {
    let mut driver = linear(1.0);
    driver.set_progress(0.5);
    assert_eq!(driver.current_value(), 50.0);
    driver.set_initial(50.0);
    assert_eq!(driver.current_value(), 75.0);
    driver.set_motion(Motion::to(0.0).secs(1.0));
    assert_eq!(driver.current_value(), 25.0);
    driver.set_curve_override(Some(EasingCurve::EASE_IN));
    let eased = 50.0 * (1.0 - EasingCurve::EASE_IN.evaluate(0.5));
    assert!(approx(driver.current_value(), eased, 1e-9));
}

#[test]
fn frame_loop_drives_playback() {
    let mut driver = linear(1.0);
    let (log, done) = completion_log();
    driver.play_then(PlayOptions::new(), done);
    let mut frames = FrameLoop::new(ManualClock::new());
    let mut ticks = 0;
    while frames.frame(&mut driver) {
        frames.clock().advance(0.1);
        ticks += 1;
        assert!(ticks < 100);
    }
    assert_eq!(driver.progress(), 1.0);
    assert_eq!(*log.borrow(), vec![true]);

    driver.play(PlayOptions::new().with_from(0.0));
    assert_eq!(run_frames(&mut driver, 0.25, 100), 4);
    assert_eq!(driver.current_value(), 100.0);
}

#[test]
fn tick_takes_std_durations() {
    let mut driver = linear(2.0);
    driver.play(PlayOptions::new());
    driver.tick(std::time::Duration::from_millis(500));
    assert!(approx(driver.progress(), 0.25, 1e-12));
}
