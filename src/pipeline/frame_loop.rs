//! Paced per-frame processing on a dedicated thread.
//!
//! One tick reads the current video frame into the loop's back buffer, runs
//! the active effect on it and publishes it to the [`Surface`]. Ticks are
//! paced at the display refresh rate; a tick that overruns its deadline causes
//! the missed ticks to be dropped rather than queued.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::effects::EffectParams;
use crate::error::CameraError;
use crate::pipeline::acquire::{acquire, RetryPolicy};
use crate::pipeline::selection::ActiveFilter;
use crate::pipeline::surface::Surface;
use crate::video::{Frame, Geometry, Scratch, StreamConstraints, VideoSource};

/// Lifecycle of a frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    /// Acquiring the stream
    Idle = 0,
    /// Processing frames
    Capturing,
    /// Stream closed, thread finished or finishing
    Stopped,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Capturing,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Capturing => f.write_str("capturing"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Preferred stream shape
    pub constraints: StreamConstraints,

    /// Ticks per second
    pub refresh_rate_hz: u32,

    /// Acquisition retry behaviour
    pub retry: RetryPolicy,

    /// Transient read failures in a row after which the loop gives up
    pub max_consecutive_read_errors: u32,

    /// Stop on its own after this many processed frames
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            refresh_rate_hz: 60,
            retry: RetryPolicy::default(),
            max_consecutive_read_errors: 30,
            max_frames: None,
        }
    }
}

/// Counters reported by a running or finished loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub read_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    state: AtomicU8,
    processed: AtomicU64,
    dropped: AtomicU64,
    read_errors: AtomicU64,
}

impl Counters {
    fn set_state(&self, state: LoopState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

/// Handle to a frame loop thread
///
/// Dropping the handle stops the loop and waits for the stream to close.
pub struct FrameLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    counters: Arc<Counters>,
    geometry: Geometry,
}

impl FrameLoop {
    /// Acquire a stream and start processing frames
    ///
    /// `factory` builds the video source on the loop thread, so the source
    /// itself never crosses threads. Blocks until acquisition has either
    /// succeeded or failed for good.
    pub fn start<F, S>(
        factory: F,
        config: LoopConfig,
        params: EffectParams,
        selection: Arc<ActiveFilter>,
        surface: Arc<Surface>,
    ) -> Result<Self, CameraError>
    where
        F: FnOnce() -> S + Send + 'static,
        S: VideoSource + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());
        let (ready_tx, ready_rx) = mpsc::channel();

        info!(refresh_rate_hz = config.refresh_rate_hz, "Starting frame loop");

        let thread_stop = Arc::clone(&stop_signal);
        let thread_counters = Arc::clone(&counters);
        let thread_handle = thread::Builder::new()
            .name("frame-loop".to_string())
            .spawn(move || {
                let mut source = factory();
                let acquired = acquire(&mut source, &config.constraints, &config.retry, &thread_stop);
                let geometry = match acquired {
                    Ok(geometry) => geometry,
                    Err(e) => {
                        source.close();
                        thread_counters.set_state(LoopState::Stopped);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                thread_counters.set_state(LoopState::Capturing);
                let _ = ready_tx.send(Ok(geometry));

                let worker = Worker {
                    config,
                    params,
                    selection,
                    surface,
                    counters: Arc::clone(&thread_counters),
                    stop_signal: thread_stop,
                };
                worker.run(&mut source, geometry);

                source.close();
                thread_counters.set_state(LoopState::Stopped);
                info!("Frame loop thread exiting");
            })
            .map_err(|e| CameraError::Aborted(format!("failed to spawn frame loop: {e}")))?;

        let mut frame_loop = Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            counters,
            geometry: Geometry::new(0, 0),
        };

        match ready_rx.recv() {
            Ok(Ok(geometry)) => {
                frame_loop.geometry = geometry;
                Ok(frame_loop)
            }
            Ok(Err(e)) => {
                frame_loop.join();
                Err(e)
            }
            Err(_) => {
                frame_loop.join();
                Err(CameraError::Aborted("frame loop exited during acquisition".to_string()))
            }
        }
    }

    /// Geometry the stream delivers
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.counters.state.load(Ordering::SeqCst))
    }

    pub fn stats(&self) -> LoopStats {
        LoopStats {
            frames_processed: self.counters.processed.load(Ordering::Relaxed),
            frames_dropped: self.counters.dropped.load(Ordering::Relaxed),
            read_errors: self.counters.read_errors.load(Ordering::Relaxed),
        }
    }

    /// Check if the loop thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!("Requesting frame loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait until the stream is closed
    pub fn stop(&mut self) -> LoopStats {
        self.request_stop();
        self.join();
        self.stats()
    }

    /// Wait for the loop to end on its own (frame budget, revoked stream)
    pub fn join(&mut self) -> LoopStats {
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("Frame loop thread panicked: {:?}", e);
                self.counters.set_state(LoopState::Stopped);
            }
        }
        self.stats()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("FrameLoop dropped, stopping loop");
            self.stop();
        }
    }
}

/// State owned by the loop thread
struct Worker {
    config: LoopConfig,
    params: EffectParams,
    selection: Arc<ActiveFilter>,
    surface: Arc<Surface>,
    counters: Arc<Counters>,
    stop_signal: Arc<AtomicBool>,
}

impl Worker {
    fn run<S: VideoSource + ?Sized>(&self, source: &mut S, geometry: Geometry) {
        let period = Duration::from_secs_f64(1.0 / self.config.refresh_rate_hz.max(1) as f64);
        let mut back = Frame::new_blank(geometry.width, geometry.height);
        let mut scratch = Scratch::new();
        let mut consecutive_errors = 0u32;
        let mut processed = 0u64;
        let mut deadline = Instant::now();

        while !self.stop_signal.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now < deadline {
                thread::sleep(deadline - now);
                continue;
            }

            match source.read_frame(&mut back) {
                Ok(()) => {
                    consecutive_errors = 0;
                    let rendered = self.selection.current();
                    rendered.kind.apply(&mut back, &self.params, &mut scratch);
                    self.surface.publish(&mut back, rendered);
                    processed += 1;
                    self.counters.processed.store(processed, Ordering::Relaxed);
                }
                Err(CameraError::Revoked) => {
                    warn!("Video stream revoked, stopping frame loop");
                    break;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    self.counters.read_errors.fetch_add(1, Ordering::Relaxed);
                    debug!(error = %e, consecutive_errors, "Frame read failed");

                    if consecutive_errors >= self.config.max_consecutive_read_errors.max(1) {
                        error!(error = %e, consecutive_errors, "Video stream stopped delivering frames");
                        break;
                    }
                }
            }

            if self.config.max_frames.is_some_and(|max| processed >= max) {
                debug!(processed, "Frame budget reached");
                break;
            }

            deadline += period;
            let now = Instant::now();
            if now > deadline {
                // Skip every tick whose slot has already passed
                let behind = (now - deadline).as_nanos() / period.as_nanos().max(1);
                let missed = behind as u64 + 1;
                self.counters.dropped.fetch_add(missed, Ordering::Relaxed);
                deadline += period * missed as u32;
            }
        }
    }
}
