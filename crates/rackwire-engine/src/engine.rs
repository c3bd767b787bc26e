//! The threaded engine: one rack, one lock, one stepping thread.
//!
//! [`Engine`] wraps a [`Rack`] in a `parking_lot::Mutex`. The engine thread
//! takes the lock, steps a batch of `frames_per_lock` frames, releases it,
//! and repeats. Every mutation entry point takes the same lock, so a module
//! or wire is either fully registered before a frame or not at all.
//!
//! ## VIP lock
//!
//! A mutex released and immediately re-acquired by a tight loop can starve
//! other waiters. Mutation calls therefore announce themselves on a VIP
//! counter before locking; the engine thread waits until the counter is zero
//! before it locks again.
//!
//! ## Pacing
//!
//! The thread tracks how far ahead of wall-clock time it has computed
//! (`ahead`, decremented at twice the elapsed time) and sleeps for one batch
//! whenever it is more than `ahead_max_secs` ahead.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use rackwire_core::{InputRef, Module, ModuleId, OutputRef, Rack, RackError, Wire, WireId};

use crate::{EngineConfig, Error};

/// Elapsed time counts double against the lead.
const AHEAD_FACTOR: f64 = 2.0;

/// Sleep between pause-flag checks while paused.
const PAUSE_POLL: Duration = Duration::from_millis(1);

struct Shared {
    rack: Mutex<Rack>,
    running: AtomicBool,
    paused: AtomicBool,
    frames: AtomicU64,
    vip: Mutex<usize>,
    vip_released: Condvar,
}

impl Shared {
    /// Locks the rack ahead of the engine thread's next acquisition.
    fn lock_vip(&self) -> MutexGuard<'_, Rack> {
        *self.vip.lock() += 1;
        let guard = self.rack.lock();
        let mut vip = self.vip.lock();
        *vip -= 1;
        if *vip == 0 {
            self.vip_released.notify_all();
        }
        guard
    }

    fn wait_for_vip(&self) {
        let mut vip = self.vip.lock();
        while *vip > 0 {
            self.vip_released.wait(&mut vip);
        }
    }
}

/// A rack stepped on its own thread, mutated from any other.
///
/// All methods take `&self`; the engine can be shared across threads in an
/// `Arc`. Dropping a started engine stops and joins its thread.
pub struct Engine {
    shared: Arc<Shared>,
    config: EngineConfig,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    /// Creates a stopped engine with an empty rack.
    ///
    /// Fails with [`Error::InvalidConfig`] if any config field is out of range.
    pub fn new(config: EngineConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let mut rack = Rack::new(config.sample_rate);
        rack.set_smoothing_config(config.smoothing);
        rack.set_power_meter(config.power_meter);
        Self {
            shared: Arc::new(Shared {
                rack: Mutex::new(rack),
                running: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                frames: AtomicU64::new(0),
                vip: Mutex::new(0),
                vip_released: Condvar::new(),
            }),
            config,
            thread: Mutex::new(None),
        }
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Spawns the engine thread.
    pub fn start(&self) -> crate::Result<()> {
        let mut thread = self.thread.lock();
        if thread.is_some() {
            return Err(Error::AlreadyRunning);
        }
        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let frames_per_lock = self.config.frames_per_lock.max(1);
        let ahead_max = self.config.ahead_max_secs;
        let handle = std::thread::Builder::new()
            .name("rackwire-engine".to_string())
            .spawn(move || run(&shared, frames_per_lock, ahead_max))
            .inspect_err(|_| self.shared.running.store(false, Ordering::Release))?;
        *thread = Some(handle);
        tracing::info!(
            sample_rate = self.sample_rate(),
            frames_per_lock,
            "engine started"
        );
        Ok(())
    }

    /// Stops and joins the engine thread. Does nothing if it is not running.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("engine thread panicked");
            }
            tracing::info!(frames = self.frame_count(), "engine stopped");
        }
    }

    /// True while the engine thread is alive.
    pub fn is_running(&self) -> bool {
        self.thread.lock().is_some()
    }

    /// Stops frame advancement at the next frame boundary. Nothing is
    /// unregistered.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        tracing::debug!("engine paused");
    }

    /// Resumes frame advancement.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        tracing::debug!("engine resumed");
    }

    /// True while paused.
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Steps `frames` frames on the calling thread, for offline rendering.
    ///
    /// Ignores the pause flag. Safe to call while the engine thread runs;
    /// both then share the frame budget.
    pub fn step_frames(&self, frames: usize) {
        let mut rack = self.shared.lock_vip();
        rack.step_frames(frames);
        self.shared
            .frames
            .store(rack.frame_count(), Ordering::Release);
    }

    /// Frames computed so far.
    pub fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }

    // --- Graph membership ---

    /// Registers a module.
    pub fn add_module(&self, module: Box<dyn Module>) -> ModuleId {
        self.shared.lock_vip().add_module(module)
    }

    /// Unregisters a module and hands it back once the engine let go of it.
    pub fn remove_module(&self, id: ModuleId) -> Result<Box<dyn Module>, RackError> {
        self.shared.lock_vip().remove_module(id)
    }

    /// Registers a wire.
    pub fn add_wire(&self, output: OutputRef, input: InputRef) -> Result<WireId, RackError> {
        self.shared.lock_vip().add_wire(output, input)
    }

    /// Unregisters a wire.
    pub fn remove_wire(&self, id: WireId) -> Result<Wire, RackError> {
        self.shared.lock_vip().remove_wire(id)
    }

    // --- Sample rate ---

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.shared.lock_vip().sample_rate()
    }

    /// Duration of one frame in seconds.
    pub fn sample_time(&self) -> f32 {
        self.shared.lock_vip().sample_time()
    }

    /// Changes the sample rate between two frames.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.shared.lock_vip().set_sample_rate(sample_rate);
        tracing::debug!(sample_rate, "sample rate changed");
    }

    // --- Params ---

    /// Reads a param.
    pub fn param(&self, module: ModuleId, param: usize) -> Result<f32, RackError> {
        self.shared.lock_vip().param(module, param)
    }

    /// Sets a param immediately.
    pub fn set_param(&self, module: ModuleId, param: usize, value: f32) -> Result<(), RackError> {
        self.shared.lock_vip().set_param(module, param, value)
    }

    /// Moves a param toward `value` over the configured smoothing time.
    pub fn set_param_smooth(
        &self,
        module: ModuleId,
        param: usize,
        value: f32,
    ) -> Result<(), RackError> {
        self.shared.lock_vip().set_param_smooth(module, param, value)
    }

    /// The value a param is heading to.
    pub fn smooth_param_target(&self, module: ModuleId, param: usize) -> Result<f32, RackError> {
        self.shared.lock_vip().smooth_param_target(module, param)
    }

    /// Restores a module's params to their defaults and resets its state.
    pub fn reset_module(&self, id: ModuleId) -> Result<(), RackError> {
        self.shared.lock_vip().reset_module(id)
    }

    /// Randomizes a module's params.
    pub fn randomize_module(&self, id: ModuleId) -> Result<(), RackError> {
        self.shared.lock_vip().randomize_module(id)
    }

    /// Bypasses or re-enables a module.
    pub fn set_bypass(&self, id: ModuleId, bypassed: bool) -> Result<(), RackError> {
        self.shared.lock_vip().set_bypass(id, bypassed)
    }

    // --- Reads ---

    /// Current value of an output.
    pub fn output_value(&self, output: OutputRef) -> Result<f32, RackError> {
        self.shared.lock_vip().output_value(output)
    }

    /// Current value of an input.
    pub fn input_value(&self, input: InputRef) -> Result<f32, RackError> {
        self.shared.lock_vip().input_value(input)
    }

    /// Current brightness of a light.
    pub fn light_value(&self, module: ModuleId, light: usize) -> Result<f32, RackError> {
        self.shared.lock_vip().light_value(module, light)
    }

    /// Smoothed step duration of a module in seconds.
    pub fn module_cpu_time(&self, id: ModuleId) -> Result<f32, RackError> {
        self.shared.lock_vip().module_cpu_time(id)
    }

    /// Runs `f` with shared access to the rack, under the graph lock.
    pub fn with_rack<R>(&self, f: impl FnOnce(&Rack) -> R) -> R {
        let rack = self.shared.lock_vip();
        f(&*rack)
    }

    /// Runs `f` with exclusive access to the rack, under the graph lock.
    ///
    /// Use this to group several mutations so no frame runs in between.
    pub fn with_rack_mut<R>(&self, f: impl FnOnce(&mut Rack) -> R) -> R {
        let mut rack = self.shared.lock_vip();
        let result = f(&mut *rack);
        self.shared
            .frames
            .store(rack.frame_count(), Ordering::Release);
        result
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("running", &self.shared.running.load(Ordering::Relaxed))
            .field("paused", &self.is_paused())
            .field("frames", &self.frame_count())
            .finish_non_exhaustive()
    }
}

fn run(shared: &Shared, frames_per_lock: usize, ahead_max: f64) {
    let mut ahead = 0.0_f64;
    let mut last = Instant::now();

    while shared.running.load(Ordering::Acquire) {
        if shared.paused.load(Ordering::Acquire) {
            std::thread::sleep(PAUSE_POLL);
            ahead = 0.0;
            last = Instant::now();
            continue;
        }

        shared.wait_for_vip();
        let (stepped, sample_time) = {
            let mut rack = shared.rack.lock();
            let mut stepped = 0;
            while stepped < frames_per_lock && !shared.paused.load(Ordering::Acquire) {
                rack.step();
                stepped += 1;
            }
            shared.frames.store(rack.frame_count(), Ordering::Release);
            (stepped, rack.sample_time())
        };

        let batch_time = stepped as f64 * f64::from(sample_time);
        ahead += batch_time;
        let now = Instant::now();
        ahead -= AHEAD_FACTOR * now.duration_since(last).as_secs_f64();
        last = now;
        ahead = ahead.max(0.0);
        if ahead > ahead_max
            && let Ok(pause) = Duration::try_from_secs_f64(batch_time)
        {
            std::thread::sleep(pause);
        }
    }
}
