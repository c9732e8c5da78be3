//! Host-side plumbing: clocks and a frame loop that feeds elapsed time into
//! anything playable.

use std::cell::Cell;
use std::time::Instant;

use crate::driver::Driver;
use crate::value::Animatable;

/// What a frame loop needs from a player.
pub trait Playback {
    fn advance(&mut self, elapsed_secs: f64);
    fn is_animating(&self) -> bool;
    fn progress(&self) -> f64;
    fn set_progress(&mut self, progress: f64);
}

impl<V: Animatable> Playback for Driver<V> {
    #[inline]
    fn advance(&mut self, elapsed_secs: f64) {
        Driver::advance(self, elapsed_secs);
    }

    #[inline]
    fn is_animating(&self) -> bool {
        Driver::is_animating(self)
    }

    #[inline]
    fn progress(&self) -> f64 {
        Driver::progress(self)
    }

    #[inline]
    fn set_progress(&mut self, progress: f64) {
        Driver::set_progress(self, progress);
    }
}

/// Monotonic time source in seconds.
pub trait Clock {
    fn now_secs(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock moved by hand; for tests and fixed-step hosts.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}

/// Turns successive clock readings into `advance` calls. The first frame
/// after (re)starting only records the time.
#[derive(Debug)]
pub struct FrameLoop<C: Clock> {
    clock: C,
    last: Option<f64>,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, last: None }
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one frame. Returns whether the player is still animating; when
    /// it is not, the loop forgets its last reading.
    pub fn frame<P: Playback + ?Sized>(&mut self, playback: &mut P) -> bool {
        if !playback.is_animating() {
            self.last = None;
            return false;
        }
        let now = self.clock.now_secs();
        if let Some(last) = self.last {
            let elapsed = (now - last).max(0.0);
            if elapsed > 0.0 {
                playback.advance(elapsed);
            }
        }
        self.last = Some(now);
        let animating = playback.is_animating();
        if !animating {
            self.last = None;
        }
        animating
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Fixed-step loop: advance by `frame_secs` until playback stops or
/// `max_frames` is hit. Returns the number of frames run.
pub fn run_frames<P: Playback + ?Sized>(playback: &mut P, frame_secs: f64, max_frames: usize) -> usize {
    let mut frames = 0;
    while frames < max_frames && playback.is_animating() {
        playback.advance(frame_secs);
        frames += 1;
    }
    if frames == max_frames && playback.is_animating() {
        log::debug!("frame budget of {max_frames} exhausted at progress {:.4}", playback.progress());
    }
    frames
}
