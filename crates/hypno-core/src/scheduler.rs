//! Frame scheduling shared by both scenes.
//!
//! The host display owns the refresh cadence: the engine asks it for the next
//! frame (`FrameHost::request_frame`) and the host later calls back with the
//! token and a timestamp. A scene never runs more than one frame at a time and
//! nothing is scheduled while the clock is paused.

use std::collections::VecDeque;

use crate::clock::AnimationClock;

/// Identifies one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// A display surface that can call back once per refresh.
pub trait FrameHost {
    /// Ask for one callback on the next refresh.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a request. Cancelling an already-fired token is a no-op.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Simple host-side queue of frame requests.
///
/// The driving loop pops due tokens and feeds them to `SceneRunner::on_frame`.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: VecDeque<FrameToken>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest outstanding request.
    pub fn pop_due(&mut self) -> Option<FrameToken> {
        self.pending.pop_front()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FrameHost for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.pending.retain(|t| *t != token);
    }
}

/// Tracks the single outstanding frame request and the host timestamps
/// used to compute per-frame deltas.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<FrameToken>,
    last_timestamp: Option<f64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the next frame unless one is already outstanding.
    pub fn schedule<H: FrameHost>(&mut self, host: &mut H) {
        if self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
    }

    /// Validate a host callback. Returns the elapsed milliseconds since the
    /// previous accepted frame (0 for the first frame after a restart), or
    /// `None` if the token is stale or was cancelled.
    pub fn accept(&mut self, token: FrameToken, timestamp_ms: f64) -> Option<f64> {
        if self.pending != Some(token) {
            return None;
        }
        self.pending = None;
        let delta = match self.last_timestamp {
            Some(last) if timestamp_ms > last => timestamp_ms - last,
            _ => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);
        Some(delta)
    }

    /// Stop scheduling: withdraw the outstanding request and forget timing,
    /// so a later restart does not count the idle gap as animation time.
    pub fn cancel<H: FrameHost>(&mut self, host: &mut H) {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
        self.reset_timing();
    }

    pub fn reset_timing(&mut self) {
        self.last_timestamp = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }
}

/// Per-frame values handed to a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Animation time in seconds after this frame's tick.
    pub time: f64,
    /// Host milliseconds since the previous frame (0 while paused).
    pub delta_ms: f32,
    pub playing: bool,
    /// Number of frames rendered before this one.
    pub frame: u64,
}

/// One animated scene: state update then draw, once per frame.
pub trait Scene {
    fn update(&mut self, ctx: &FrameContext);

    fn render(&mut self, ctx: &FrameContext);

    /// Whether settings writes are waiting for the next frame.
    fn has_pending_changes(&self) -> bool {
        false
    }

    /// Release the raster surface and any listeners or audio handles.
    /// Called exactly once, on teardown.
    fn release(&mut self);
}

/// Drives a scene: clock tick, update, render, schedule next, until torn down.
pub struct SceneRunner<S: Scene> {
    scene: S,
    clock: AnimationClock,
    scheduler: FrameScheduler,
    frames: u64,
    torn_down: bool,
}

impl<S: Scene> SceneRunner<S> {
    pub fn new(scene: S) -> Self {
        Self::with_clock(scene, AnimationClock::new())
    }

    pub fn with_clock(scene: S, clock: AnimationClock) -> Self {
        Self {
            scene,
            clock,
            scheduler: FrameScheduler::new(),
            frames: 0,
            torn_down: false,
        }
    }

    /// Attach to the host and request the first frame. A paused runner
    /// renders that one still frame and then waits for `resume`.
    pub fn mount<H: FrameHost>(&mut self, host: &mut H) {
        if !self.torn_down {
            self.scheduler.schedule(host);
        }
    }

    pub fn pause<H: FrameHost>(&mut self, host: &mut H) {
        self.clock.pause();
        self.scheduler.cancel(host);
    }

    /// Resume from the current `t`; the next frame is requested immediately.
    pub fn resume<H: FrameHost>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        self.clock.resume();
        self.scheduler.schedule(host);
    }

    /// Flip play/pause. Returns the new playing state.
    pub fn toggle<H: FrameHost>(&mut self, host: &mut H) -> bool {
        if self.clock.is_playing() {
            self.pause(host);
        } else {
            self.resume(host);
        }
        self.clock.is_playing()
    }

    /// Stop scheduling without pausing the clock or tearing down.
    /// A later `resume` restarts from the current `t`.
    pub fn cancel<H: FrameHost>(&mut self, host: &mut H) {
        self.scheduler.cancel(host);
    }

    /// Render one frame even while paused (time does not advance).
    pub fn request_redraw<H: FrameHost>(&mut self, host: &mut H) {
        if !self.torn_down {
            self.scheduler.schedule(host);
        }
    }

    /// Call once per host refresh. While paused, queued settings writes
    /// get one still frame so they show up without waiting for `resume`.
    /// Returns `true` if a redraw was requested.
    pub fn poll_changes<H: FrameHost>(&mut self, host: &mut H) -> bool {
        if self.torn_down || self.clock.is_playing() || self.scheduler.is_scheduled() {
            return false;
        }
        if !self.scene.has_pending_changes() {
            return false;
        }
        self.scheduler.schedule(host);
        true
    }

    /// Host callback. Returns `true` if a frame was produced.
    pub fn on_frame<H: FrameHost>(&mut self, host: &mut H, token: FrameToken, timestamp_ms: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(delta_ms) = self.scheduler.accept(token, timestamp_ms) else {
            return false;
        };

        let playing = self.clock.is_playing();
        let time = self.clock.tick(delta_ms);
        let ctx = FrameContext {
            time,
            delta_ms: if playing { delta_ms as f32 } else { 0.0 },
            playing,
            frame: self.frames,
        };

        self.scene.update(&ctx);
        self.scene.render(&ctx);
        self.frames += 1;

        if playing {
            self.scheduler.schedule(host);
        } else {
            self.scheduler.reset_timing();
        }
        true
    }

    /// Cancel any pending frame and release the scene's resources.
    /// Safe to call more than once and before the first frame.
    pub fn teardown<H: FrameHost>(&mut self, host: &mut H) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel(host);
        self.scene.release();
        self.torn_down = true;
        log::debug!("scene torn down after {} frames at t={:.3}", self.frames, self.clock.time());
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl<S: Scene> Drop for SceneRunner<S> {
    fn drop(&mut self) {
        if !self.torn_down {
            self.scene.release();
            self.torn_down = true;
        }
    }
}
