//! Frame handoff between the renderer and the refresh worker
//!
//! The renderer draws into the [`ShadowBuffer`] owned by a [`RefreshChannel`] and marks
//! it dirty. On every tick the [`RefreshScheduler`] copies the dirty shadow into the
//! handoff frame and posts a [`RefreshCommand`]. Commands are not queued, a command
//! posted before the worker took the previous one replaces it. The frame the worker
//! picks up is always the latest one handed off.
//!
//! While a [`FrameHold`] is alive, snapshots are deferred, so a frame drawn in several
//! steps is never handed off half done.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use log::debug;

use crate::config::RefreshConfig;
use crate::framebuffer::{Area, ShadowBuffer};
use crate::il0398::BUFFER_LEN;
use crate::interface::delay_for;
use crate::traits::RefreshMode;

/// Request for one hardware refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshCommand {
    /// Use the full waveform regardless of the partial refresh count
    pub force_full_refresh: bool,
}

/// Power transitions handled by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerRequest {
    /// Show the latest frame with a full refresh, then enter deep sleep
    Sleep,
    /// Reset and reinitialize, then redraw with a full refresh
    Wake,
}

/// What a scheduler tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed since the last refresh
    Idle,
    /// Changes are pending, but the last refresh was too recent
    RateLimited,
    /// The frame is held by a UI update or render pass, retried on the next tick
    Held,
    /// A snapshot was handed off and the command posted
    Posted(RefreshCommand),
}

struct FrameState {
    shadow: ShadowBuffer,
    /// Latest snapshot of the shadow, read by the worker
    handoff: [u8; BUFFER_LEN],
    dirty: bool,
    force_full: bool,
    last_refresh: Option<Instant>,
    /// Number of live [`FrameHold`]s
    holds: u32,
}

/// Shared state between renderer, scheduler and worker
///
/// All fields are guarded by one blocking mutex, which is only held for copies.
/// `const` constructible, so it can live in a `static`.
pub struct RefreshChannel<M: RawMutex> {
    frame: Mutex<M, RefCell<FrameState>>,
    refresh: Signal<M, RefreshCommand>,
    power: Signal<M, PowerRequest>,
    completed: Signal<M, RefreshMode>,
}

impl<M: RawMutex> Default for RefreshChannel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> RefreshChannel<M> {
    pub const fn new() -> Self {
        RefreshChannel {
            frame: Mutex::new(RefCell::new(FrameState {
                shadow: ShadowBuffer::new(),
                handoff: [0xFF; BUFFER_LEN],
                dirty: false,
                force_full: false,
                last_refresh: None,
                holds: 0,
            })),
            refresh: Signal::new(),
            power: Signal::new(),
            completed: Signal::new(),
        }
    }

    /// Renderer flush: thresholds `pixels` of the inclusive `area` into the shadow
    pub fn flush_rgb565(&self, area: Area, pixels: &[u16]) {
        self.frame.lock(|frame| {
            let mut frame = frame.borrow_mut();
            frame.shadow.blit_rgb565(area, pixels);
            frame.dirty = true;
        });
    }

    /// Runs `f` on the shadow and marks it dirty
    pub fn draw<R>(&self, f: impl FnOnce(&mut ShadowBuffer) -> R) -> R {
        self.frame.lock(|frame| {
            let mut frame = frame.borrow_mut();
            let result = f(&mut frame.shadow);
            frame.dirty = true;
            result
        })
    }

    /// Keeps the scheduler from taking a snapshot until the returned guard is dropped
    ///
    /// Hold it across all flushes of one render pass and while mutating UI objects.
    pub fn hold(&self) -> FrameHold<'_, M> {
        self.frame.lock(|frame| frame.borrow_mut().holds += 1);
        FrameHold { channel: self }
    }

    pub fn is_held(&self) -> bool {
        self.frame.lock(|frame| frame.borrow().holds > 0)
    }

    pub fn is_dirty(&self) -> bool {
        self.frame.lock(|frame| frame.borrow().dirty)
    }

    /// The next refresh uses the full waveform and skips the rate limit
    pub fn request_full_refresh(&self) {
        self.frame.lock(|frame| {
            let mut frame = frame.borrow_mut();
            frame.force_full = true;
            frame.dirty = true;
        });
    }

    pub fn request_power(&self, request: PowerRequest) {
        self.power.signal(request);
    }

    /// Posts a command, replacing one the worker has not taken yet
    pub fn post(&self, command: RefreshCommand) {
        self.refresh.signal(command);
    }

    /// Waits until the worker finished a refresh
    pub async fn wait_refreshed(&self) -> RefreshMode {
        self.completed.wait().await
    }

    /// The mode of a refresh finished since the last call, if any
    pub fn try_take_refreshed(&self) -> Option<RefreshMode> {
        self.completed.try_take()
    }

    /// Copies the shadow into the handoff frame if it is dirty or `force` is set
    ///
    /// Nothing is copied while the frame is held, a forced request is then left dirty
    /// for the next tick. Non-forced snapshots closer than `min_interval` to the
    /// previous one are refused.
    fn snapshot(&self, now: Instant, config: &RefreshConfig, force: bool) -> TickOutcome {
        self.frame.lock(|frame| {
            let mut frame = frame.borrow_mut();
            let forced = force || frame.force_full;
            if !frame.dirty && !forced {
                return TickOutcome::Idle;
            }
            if frame.holds > 0 {
                frame.dirty = true;
                return TickOutcome::Held;
            }

            if !forced {
                if let Some(last) = frame.last_refresh {
                    if now.saturating_duration_since(last) < config.min_refresh_interval {
                        return TickOutcome::RateLimited;
                    }
                }
            }

            let FrameState { shadow, handoff, .. } = &mut *frame;
            handoff.copy_from_slice(shadow.buffer());

            let command = RefreshCommand {
                force_full_refresh: frame.force_full,
            };
            frame.dirty = false;
            frame.force_full = false;
            frame.last_refresh = Some(now);
            TickOutcome::Posted(command)
        })
    }

    /// Copies the latest handoff frame into `dst`
    pub(crate) fn copy_handoff(&self, dst: &mut [u8]) {
        self.frame.lock(|frame| {
            let frame = frame.borrow();
            let len = dst.len().min(BUFFER_LEN);
            dst[..len].copy_from_slice(&frame.handoff[..len]);
        });
    }

    /// Copies the shadow straight into `dst`, bypassing scheduler and rate limit
    pub(crate) fn copy_shadow(&self, dst: &mut [u8]) {
        self.frame.lock(|frame| {
            let mut frame = frame.borrow_mut();
            let len = dst.len().min(BUFFER_LEN);
            dst[..len].copy_from_slice(&frame.shadow.buffer()[..len]);
            frame.dirty = false;
        });
    }

    pub(crate) fn try_take_command(&self) -> Option<RefreshCommand> {
        self.refresh.try_take()
    }

    pub(crate) fn try_take_power(&self) -> Option<PowerRequest> {
        self.power.try_take()
    }

    pub(crate) async fn wait_command(&self) -> RefreshCommand {
        self.refresh.wait().await
    }

    pub(crate) async fn wait_power(&self) -> PowerRequest {
        self.power.wait().await
    }

    pub(crate) fn notify_refreshed(&self, mode: RefreshMode) {
        self.completed.signal(mode);
    }
}

/// Defers snapshots of a [`RefreshChannel`] while alive
pub struct FrameHold<'a, M: RawMutex> {
    channel: &'a RefreshChannel<M>,
}

impl<M: RawMutex> Drop for FrameHold<'_, M> {
    fn drop(&mut self) {
        self.channel
            .frame
            .lock(|frame| frame.borrow_mut().holds -= 1);
    }
}

/// Periodic producer of refresh commands
pub struct RefreshScheduler<'a, M: RawMutex> {
    channel: &'a RefreshChannel<M>,
    config: RefreshConfig,
}

impl<'a, M: RawMutex> RefreshScheduler<'a, M> {
    pub fn new(channel: &'a RefreshChannel<M>, config: RefreshConfig) -> Self {
        RefreshScheduler { channel, config }
    }

    /// Hands off the shadow and posts a command if it changed and the rate limit allows
    pub fn tick(&self, now: Instant) -> TickOutcome {
        let outcome = self.channel.snapshot(now, &self.config, false);
        self.publish(outcome)
    }

    /// Hands off the shadow immediately, even if it is clean or rate limited
    pub fn trigger(&self, now: Instant) -> TickOutcome {
        let outcome = self.channel.snapshot(now, &self.config, true);
        self.publish(outcome)
    }

    fn publish(&self, outcome: TickOutcome) -> TickOutcome {
        match outcome {
            TickOutcome::Posted(command) => {
                debug!("refresh posted, full: {}", command.force_full_refresh);
                self.channel.post(command);
            }
            TickOutcome::RateLimited => debug!("refresh deferred by rate limit"),
            TickOutcome::Held => debug!("refresh deferred, frame is held"),
            TickOutcome::Idle => {}
        }
        outcome
    }

    /// Ticks forever with the configured period
    pub async fn run<D: DelayNs>(&self, mut delay: D) -> ! {
        loop {
            delay_for(&mut delay, self.config.tick_period).await;
            self.tick(Instant::now());
        }
    }
}
