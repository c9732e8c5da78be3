//! Playback of a motion over real time.
//!
//! A [`Driver`] owns a motion tree, the initial value it is resolved
//! against and the cached [`MotionData`]. Hosts call [`Driver::advance`]
//! once per frame while [`Driver::is_animating`] holds; everything else
//! (`play`, `reverse`, `pause`, `stop`, scrubbing) is a synchronous call on
//! the same thread.

mod observers;
mod state;

pub use observers::Subscription;
pub use state::{Direction, PlayOptions, PlaybackState};

use std::cell::OnceCell;
use std::fmt;
use std::ops::RangeInclusive;

use observers::Observers;

use crate::config::Config;
use crate::curve::EasingCurve;
use crate::data::{Action, MotionData};
use crate::duration::Duration;
use crate::motion::Motion;
use crate::value::Animatable;

type Completion = Box<dyn FnOnce(bool)>;

#[inline]
fn ordered(a: f64, b: f64) -> RangeInclusive<f64> {
    a.min(b)..=a.max(b)
}

/// Endpoint a forever-repeat wraps back to when it reaches `target`.
#[inline]
fn cycle_origin(target: f64) -> f64 {
    if target >= 0.5 {
        0.0
    } else {
        1.0
    }
}

/// Stateful playback controller.
pub struct Driver<V: Animatable> {
    motion: Motion<V>,
    initial: V,
    duration_override: Option<Duration>,
    curve_override: Option<EasingCurve>,
    config: Config,
    timeline: OnceCell<MotionData<V>>,

    progress: f64,
    target: f64,
    state: PlaybackState,
    direction: Option<Direction>,
    repeat_forever: bool,
    played: bool,

    completions: Vec<Completion>,
    observers: Observers<V>,
}

impl<V: Animatable> Driver<V> {
    pub fn new(motion: Motion<V>, initial: V) -> Self {
        Self::with_config(motion, initial, Config::default())
    }

    pub fn with_config(motion: Motion<V>, initial: V, config: Config) -> Self {
        Self {
            motion,
            initial,
            duration_override: None,
            curve_override: None,
            config,
            timeline: OnceCell::new(),
            progress: 0.0,
            target: 1.0,
            state: PlaybackState::Idle,
            direction: None,
            repeat_forever: false,
            played: false,
            completions: Vec::new(),
            observers: Observers::default(),
        }
    }

    // --- accessors ---

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Direction of the most recent travel, if any.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[inline]
    pub fn is_repeating_forever(&self) -> bool {
        self.repeat_forever
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn motion(&self) -> &Motion<V> {
        &self.motion
    }

    #[inline]
    pub fn initial(&self) -> &V {
        &self.initial
    }

    /// Resolved timeline, computed on first use and cached until the motion,
    /// the initial value or an override changes.
    pub fn timeline(&self) -> &MotionData<V> {
        self.timeline.get_or_init(|| {
            let data = self.motion.resolve_with(
                &self.initial,
                self.duration_override,
                self.curve_override,
                self.config.default_duration_secs,
            );
            log::debug!(
                "resolved {} timeline ({:?})",
                self.motion.kind().name(),
                data.duration
            );
            data
        })
    }

    /// Playback length in seconds. Untimed leaves last
    /// `Config::default_duration_secs`, which also scales relative totals
    /// and stands in when a tree is timed only in relative terms.
    pub fn duration_secs(&self) -> f64 {
        let default = self.config.default_duration_secs;
        match self.timeline().duration {
            Some(Duration::Absolute(s)) => s.max(0.0),
            Some(Duration::Relative(f)) => f.max(0.0) * default,
            None => default,
        }
    }

    /// Value at the current progress.
    pub fn current_value(&self) -> V {
        self.timeline().lerp(&self.initial, self.progress)
    }

    // --- construction inputs ---

    pub fn set_motion(&mut self, motion: Motion<V>) {
        self.motion = motion;
        self.invalidate();
    }

    pub fn set_initial(&mut self, initial: V) {
        self.initial = initial;
        self.invalidate();
    }

    /// Duration imposed on the whole motion, replacing its own.
    pub fn set_duration_override(&mut self, duration: Option<Duration>) {
        self.duration_override = duration;
        self.invalidate();
    }

    /// Curve applied to the whole motion in place of its own.
    pub fn set_curve_override(&mut self, curve: Option<EasingCurve>) {
        self.curve_override = curve;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        if self.timeline.take().is_some() {
            log::debug!("timeline invalidated");
        }
    }

    // --- observers ---

    /// Observe every value change caused by `advance`, scrubbing, jumps and
    /// stops. The observer lives until the returned token is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&V) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // --- transitions ---

    pub fn play(&mut self, options: PlayOptions) {
        self.start(options, None);
    }

    /// Like [`play`](Self::play); `completion` runs once with `true` when the
    /// target is reached, or `false` when interrupted or superseded.
    pub fn play_then<F>(&mut self, options: PlayOptions, completion: F)
    where
        F: FnOnce(bool) + 'static,
    {
        self.start(options, Some(Box::new(completion)));
    }

    /// Head for the opposite end from the one last travelled toward.
    pub fn reverse(&mut self, from: Option<f64>) {
        self.reverse_with(from, None);
    }

    pub fn reverse_then<F>(&mut self, from: Option<f64>, completion: F)
    where
        F: FnOnce(bool) + 'static,
    {
        self.reverse_with(from, Some(Box::new(completion)));
    }

    /// Suspend or resume without touching the target, pending completions
    /// or the forever flag. From idle this plays toward the current target.
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Animating => {
                self.state = PlaybackState::Paused;
                log::debug!("toggled to paused at {:.4}", self.progress);
            }
            PlaybackState::Paused => {
                if !self.repeat_forever && self.reached() {
                    self.finish(true);
                } else {
                    self.direction = Direction::toward(self.progress, self.target)
                        .or(self.direction);
                    self.state = PlaybackState::Animating;
                    log::debug!("toggled to animating toward {:.4}", self.target);
                }
            }
            PlaybackState::Idle => self.play(PlayOptions::default()),
        }
    }

    /// Freeze at the current progress. Cancels forever-repeat; pending
    /// completions run with `false`.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Idle {
            log::trace!("pause while idle; ignored");
            return;
        }
        self.state = PlaybackState::Paused;
        self.repeat_forever = false;
        log::debug!("paused at {:.4}", self.progress);
        self.complete(false);
    }

    /// Jump to `at` and stop. Side effects between the old progress and `at`
    /// are not fired; see [`stop_firing`](Self::stop_firing).
    pub fn stop(&mut self, at: f64) {
        self.halt(at, false);
    }

    /// Jump to `at` and stop, firing side effects crossed on the way.
    pub fn stop_firing(&mut self, at: f64) {
        self.halt(at, true);
    }

    /// Scrub to `progress` without firing side effects. Playback state is
    /// unchanged.
    pub fn set_progress(&mut self, progress: f64) {
        if !progress.is_finite() {
            log::warn!("ignoring non-finite progress {progress}");
            return;
        }
        self.progress = progress;
        self.publish(Vec::new());
    }

    /// Per-frame entry point: move `elapsed_secs` of playback toward the
    /// target, fire every side effect in the crossed range with the new
    /// value, notify observers and complete when the target is reached.
    pub fn advance(&mut self, elapsed_secs: f64) {
        if !self.state.is_animating() {
            log::trace!("advance while {}; ignored", self.state.name());
            return;
        }
        if !(elapsed_secs > 0.0) || !elapsed_secs.is_finite() {
            return;
        }
        let duration = self.duration_secs();
        let travel = if duration > self.config.progress_epsilon {
            elapsed_secs / duration
        } else {
            f64::INFINITY
        };
        if self.repeat_forever && travel.is_infinite() {
            log::warn!("forever-repeat of a zero-length motion; finishing instead");
            self.repeat_forever = false;
        }

        let previous = self.progress;
        let mut actions = Vec::new();
        if self.repeat_forever {
            self.wrap_forward(travel, &mut actions);
        } else {
            let next = match self.direction {
                Some(Direction::Backward) => (previous - travel).max(self.target),
                _ => (previous + travel).min(self.target),
            };
            self.progress = next;
            actions.extend(self.timeline().side_effects(ordered(previous, next)));
        }
        log::trace!(
            "advanced {:.4} -> {:.4} ({} side effects)",
            previous,
            self.progress,
            actions.len()
        );
        self.publish(actions);

        if !self.repeat_forever && self.reached() {
            self.progress = self.target;
            self.finish(true);
        }
    }

    /// [`advance`](Self::advance) by a frame delta.
    #[inline]
    pub fn tick(&mut self, elapsed: std::time::Duration) {
        self.advance(elapsed.as_secs_f64());
    }

    // --- internals ---

    fn start(&mut self, options: PlayOptions, completion: Option<Completion>) {
        self.supersede();
        self.played = true;
        let previous = self.progress;
        if let Some(from) = options.from.filter(|p| p.is_finite()) {
            self.progress = from;
        }
        if let Some(to) = options.to.filter(|p| p.is_finite()) {
            if !(0.0..=1.0).contains(&to) {
                log::warn!("play target {to} outside [0, 1]; clamped");
            }
            self.target = to.clamp(0.0, 1.0);
        }
        self.repeat_forever = options.repeat_forever;
        self.completions.extend(completion);

        if self.duration_secs() <= self.config.progress_epsilon {
            if self.repeat_forever {
                log::warn!("forever-repeat of a zero-length motion; playing once");
                self.repeat_forever = false;
            }
            let from = self.progress;
            self.direction = Direction::toward(from, self.target).or(self.direction);
            self.progress = self.target;
            let actions = self.timeline().side_effects(ordered(from, self.target));
            self.publish(actions);
            log::debug!("zero-length timeline; completed synchronously");
            self.finish(true);
            return;
        }

        if self.reached() {
            if !self.repeat_forever {
                if self.progress != previous {
                    self.publish(Vec::new());
                }
                log::debug!("already at target {:.4}; completed", self.target);
                self.finish(true);
                return;
            }
            self.progress = cycle_origin(self.target);
        }
        if self.progress != previous {
            self.publish(Vec::new());
        }
        self.direction = Direction::toward(self.progress, self.target);
        self.state = PlaybackState::Animating;
        log::debug!(
            "playing {:.4} -> {:.4}{}",
            self.progress,
            self.target,
            if self.repeat_forever { " (forever)" } else { "" }
        );
    }

    fn reverse_with(&mut self, from: Option<f64>, completion: Option<Completion>) {
        if !self.played && from.is_none() {
            log::debug!("reverse before any play; ignored");
            if let Some(completion) = completion {
                completion(false);
            }
            return;
        }
        let progress = from.unwrap_or(self.progress);
        // The flip goes to the end opposite the last travel, so a backward
        // run turns toward 1 from anywhere short of 1 itself.
        let toward_start = match self.direction {
            Some(Direction::Forward) => progress != 0.0,
            Some(Direction::Backward) => progress >= 1.0,
            None => progress >= 0.5,
        };
        let target = if toward_start { 0.0 } else { 1.0 };
        log::debug!("reversing toward {target}");
        let options = PlayOptions {
            from,
            to: Some(target),
            repeat_forever: false,
        };
        self.start(options, completion);
    }

    /// Forever playback: run to the target, wrap to the cycle origin and
    /// keep going. Whole cycles beyond the configured cap are skipped
    /// without replaying their side effects.
    fn wrap_forward(&mut self, travel: f64, actions: &mut Vec<Action<V>>) {
        let origin = cycle_origin(self.target);
        let span = (self.target - origin).abs();
        let sign = (self.target - origin).signum();
        let remaining = ((self.target - self.progress) * sign).max(0.0);
        if travel < remaining {
            let next = self.progress + sign * travel;
            actions.extend(self.timeline().side_effects(ordered(self.progress, next)));
            self.progress = next;
            return;
        }
        actions.extend(self.timeline().side_effects(ordered(self.progress, self.target)));
        let left = travel - remaining;
        let cycles = (left / span).floor();
        let cap = f64::from(self.config.max_cycles_per_advance);
        if cycles > cap {
            log::debug!("skipping {} whole cycles in one advance", cycles - cap);
        }
        for _ in 0..(cycles.min(cap) as u32) {
            actions.extend(self.timeline().side_effects(ordered(origin, self.target)));
        }
        let next = origin + sign * (left - cycles * span);
        actions.extend(self.timeline().side_effects(ordered(origin, next)));
        self.progress = next;
    }

    fn halt(&mut self, at: f64, fire: bool) {
        let previous = self.progress;
        if at.is_finite() {
            self.progress = at;
        } else {
            log::warn!("stop at non-finite progress {at}; staying at {previous:.4}");
        }
        self.state = PlaybackState::Idle;
        self.repeat_forever = false;
        let actions = if fire {
            self.timeline().side_effects(ordered(previous, self.progress))
        } else {
            Vec::new()
        };
        self.publish(actions);
        log::debug!("stopped at {:.4}", self.progress);
        self.complete(false);
    }

    #[inline]
    fn reached(&self) -> bool {
        (self.progress - self.target).abs() <= self.config.progress_epsilon
    }

    /// Fire `actions` with the current value, then notify observers.
    fn publish(&mut self, actions: Vec<Action<V>>) {
        let value = self.current_value();
        for action in &actions {
            action(&value);
        }
        self.observers.notify(&value);
    }

    fn finish(&mut self, success: bool) {
        self.state = PlaybackState::Idle;
        self.repeat_forever = false;
        log::debug!("finished at {:.4}", self.progress);
        self.complete(success);
    }

    fn supersede(&mut self) {
        if !self.completions.is_empty() {
            log::debug!("superseding {} pending completions", self.completions.len());
            self.complete(false);
        }
    }

    fn complete(&mut self, success: bool) {
        for completion in std::mem::take(&mut self.completions) {
            completion(success);
        }
    }
}

impl<V: Animatable> fmt::Debug for Driver<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("motion", &self.motion)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("target", &self.target)
            .field("direction", &self.direction)
            .field("repeat_forever", &self.repeat_forever)
            .field("pending_completions", &self.completions.len())
            .finish()
    }
}
