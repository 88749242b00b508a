// extensions/tween.rs
//
// Tween engine — drives one tween run through its lifecycle on an external
// frame driver and clock.
//
// Usage:
//   let tween = Tweenable::new(clock, driver);
//   tween.start(TweenConfig::new(from, to, 250.0).on_step(|s| { .. Ok(()) }))?;
//   // the driver calls back once per frame until the run completes

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use crate::api::config::{CompleteFn, StepFn, TweenConfig};
use crate::api::types::{Millis, Snapshot, TweenStatus};
use crate::core::error::{ConfigError, TweenError};
use crate::core::frame::{FrameDriver, FrameHandle};
use crate::core::time::Clock;
use super::easing::{EasingTable, PropertyEasings};
use super::hooks::{dispatch, log_sink, ErrorSink, Hook, HookEvent, HookId, HookRegistry};
use super::interpolate::interpolate_snapshot;

/// Timing and callbacks of one run, from `start` until the next `start`.
struct TweenRun {
    /// Distinguishes runs so a callback returned mid-frame is not put back
    /// into a run that replaced its own.
    generation: u64,
    from: Snapshot,
    to: Snapshot,
    easings: PropertyEasings,
    duration: Millis,
    delay: Millis,
    started_at: Millis,
    paused_at: Option<Millis>,
    /// Total time spent paused. Only grows, and only on resume.
    paused_total: Millis,
    /// Last time fraction used. Never decreases, even if the clock does.
    fraction: f64,
    frame: Option<FrameHandle>,
    step: Option<StepFn>,
    complete: Option<CompleteFn>,
}

impl TweenRun {
    /// Time since interpolation began, with pauses and delay excluded.
    /// Clamped to [0, duration].
    fn elapsed(&self, now: Millis) -> Millis {
        let now = self.paused_at.unwrap_or(now);
        (now - self.started_at - self.paused_total - self.delay).clamp(0.0, self.duration)
    }

    /// Time fraction for a frame at `now`. Monotonic across calls.
    fn advance(&mut self, now: Millis) -> f64 {
        let waiting = now - self.started_at - self.paused_total < self.delay;
        let fraction = if waiting {
            0.0
        } else if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed(now) / self.duration).clamp(0.0, 1.0)
        };
        self.fraction = self.fraction.max(fraction);
        self.fraction
    }

    /// Drop caller callbacks; they may hold handles to the tween itself.
    fn release(&mut self) {
        self.step = None;
        self.complete = None;
    }
}

struct TweenState {
    status: TweenStatus,
    current: Snapshot,
    run: Option<TweenRun>,
    generations: u64,
    hooks: HookRegistry,
    easings: EasingTable,
    sink: ErrorSink,
    clock: Rc<dyn Clock>,
    driver: Rc<dyn FrameDriver>,
}

impl TweenState {
    fn require(&self, op: &'static str, allowed: impl Fn(TweenStatus) -> bool) -> Result<(), TweenError> {
        if allowed(self.status) {
            Ok(())
        } else {
            Err(TweenError::invalid_state(op, self.status))
        }
    }

    /// Build a run from `config` without touching any state.
    fn prepare(&self, config: TweenConfig, now: Millis) -> Result<TweenRun, ConfigError> {
        config.validate()?;
        let TweenConfig { from, to, duration, delay, easing, step, complete } = config;

        let mut start = Snapshot::new();
        for name in to.keys() {
            let value = from
                .get(name)
                .or_else(|| self.current.get(name))
                .ok_or_else(|| ConfigError::MissingStart(name.to_string()))?;
            start.set(name, value);
        }
        let easings = self.easings.resolve_spec(&easing, &to)?;

        Ok(TweenRun {
            generation: self.generations + 1,
            from: start,
            to,
            easings,
            duration,
            delay,
            started_at: now,
            paused_at: None,
            paused_total: 0.0,
            fraction: 0.0,
            frame: None,
            step,
            complete,
        })
    }
}

/// A tweenable value set: one engine instance, cheap to clone.
///
/// Clones share state, so callbacks can hold a clone to `get`, `pause` or
/// `stop` the tween that is calling them. All methods must be called on the
/// thread that created the tween.
///
/// Lifecycle misuse (for example `resume` while running) is reported as
/// [`TweenError::InvalidState`] and changes nothing.
#[derive(Clone)]
pub struct Tweenable {
    state: Rc<RefCell<TweenState>>,
}

impl Tweenable {
    pub fn new(clock: impl Clock + 'static, driver: Rc<dyn FrameDriver>) -> Self {
        Self {
            state: Rc::new(RefCell::new(TweenState {
                status: TweenStatus::Idle,
                current: Snapshot::new(),
                run: None,
                generations: 0,
                hooks: HookRegistry::new(),
                easings: EasingTable::new(),
                sink: log_sink(),
                clock: Rc::new(clock),
                driver,
            })),
        }
    }

    /// Replace the easing table names are resolved against.
    pub fn with_easing_table(self, table: EasingTable) -> Self {
        self.state.borrow_mut().easings = table;
        self
    }

    /// Register a named easing curve for later `start` calls.
    pub fn register_easing(&self, name: impl Into<String>, f: impl Fn(f64) -> f64 + 'static) {
        self.state.borrow_mut().easings.register(name, f);
    }

    /// Start a run.
    ///
    /// Allowed while idle or after a previous run ended. The configuration is
    /// fully validated and every easing resolved before anything changes; a
    /// zero duration without delay shows the end state at once and completes
    /// on the first frame.
    pub fn start(&self, config: TweenConfig) -> Result<(), TweenError> {
        let (snapshot, hooks, sink) = {
            let mut state = self.state.borrow_mut();
            state.require("start", |s| !s.is_active())?;
            let now = state.clock.now();
            let run = state.prepare(config, now)?;

            state.current = if run.duration <= 0.0 && run.delay <= 0.0 {
                run.to.clone()
            } else {
                run.from.clone()
            };
            log::debug!(
                "tween run {} started: {} properties over {}ms (delay {}ms)",
                run.generation,
                run.to.len(),
                run.duration,
                run.delay
            );
            state.generations = run.generation;
            state.run = Some(run);
            state.status = TweenStatus::Running;
            (state.current.clone(), state.hooks.listeners(HookEvent::Start), state.sink.clone())
        };

        self.request_frame();
        dispatch(HookEvent::Start, &hooks, &snapshot, &sink);
        Ok(())
    }

    /// Suspend a running tween. No frames run until `resume`.
    pub fn pause(&self) -> Result<(), TweenError> {
        let (frame, driver, snapshot, hooks, sink) = {
            let mut guard = self.state.borrow_mut();
            guard.require("pause", |s| s == TweenStatus::Running)?;
            let state = &mut *guard;
            let now = state.clock.now();
            let Some(run) = state.run.as_mut() else {
                return Err(TweenError::invalid_state("pause", state.status));
            };
            run.paused_at = Some(now);
            let frame = run.frame.take();
            state.status = TweenStatus::Paused;
            log::debug!("tween run {} paused at {:.1}ms", run.generation, run.elapsed(now));
            (
                frame,
                state.driver.clone(),
                state.current.clone(),
                state.hooks.listeners(HookEvent::Pause),
                state.sink.clone(),
            )
        };

        if let Some(handle) = frame {
            driver.cancel(handle);
        }
        dispatch(HookEvent::Pause, &hooks, &snapshot, &sink);
        Ok(())
    }

    /// Continue a paused tween from where it paused. The time spent paused is
    /// excluded from its elapsed time.
    pub fn resume(&self) -> Result<(), TweenError> {
        let (snapshot, hooks, sink) = {
            let mut guard = self.state.borrow_mut();
            guard.require("resume", |s| s == TweenStatus::Paused)?;
            let state = &mut *guard;
            let now = state.clock.now();
            let Some(run) = state.run.as_mut() else {
                return Err(TweenError::invalid_state("resume", state.status));
            };
            if let Some(paused_at) = run.paused_at.take() {
                run.paused_total += (now - paused_at).max(0.0);
            }
            state.status = TweenStatus::Running;
            log::debug!("tween run {} resumed, {:.1}ms paused in total", run.generation, run.paused_total);
            (state.current.clone(), state.hooks.listeners(HookEvent::Resume), state.sink.clone())
        };

        self.request_frame();
        dispatch(HookEvent::Resume, &hooks, &snapshot, &sink);
        Ok(())
    }

    /// Cancel a running or paused tween.
    ///
    /// With `goto_end` the values jump to the target state. The completion
    /// callback does not run either way.
    pub fn stop(&self, goto_end: bool) -> Result<(), TweenError> {
        let (frame, driver, snapshot, hooks, sink) = {
            let mut guard = self.state.borrow_mut();
            guard.require("stop", TweenStatus::is_active)?;
            let state = &mut *guard;
            let Some(run) = state.run.as_mut() else {
                return Err(TweenError::invalid_state("stop", state.status));
            };
            let frame = run.frame.take();
            run.release();
            // Freeze elapsed time
            if run.paused_at.is_none() {
                run.paused_at = Some(state.clock.now());
            }
            if goto_end {
                state.current = run.to.clone();
            }
            state.status = TweenStatus::Stopped;
            log::debug!("tween run {} stopped (goto_end: {})", run.generation, goto_end);
            (
                frame,
                state.driver.clone(),
                state.current.clone(),
                state.hooks.listeners(HookEvent::Stop),
                state.sink.clone(),
            )
        };

        if let Some(handle) = frame {
            driver.cancel(handle);
        }
        dispatch(HookEvent::Stop, &hooks, &snapshot, &sink);
        Ok(())
    }

    /// Copy of the current values.
    pub fn get(&self) -> Snapshot {
        self.state.borrow().current.clone()
    }

    /// Replace the current values. Only while no run is in flight; the values
    /// serve as start values for properties a later `from` leaves out.
    pub fn set(&self, values: Snapshot) -> Result<(), TweenError> {
        let mut state = self.state.borrow_mut();
        state.require("set", |s| !s.is_active())?;
        state.current = values;
        Ok(())
    }

    pub fn status(&self) -> TweenStatus {
        self.state.borrow().status
    }

    pub fn is_playing(&self) -> bool {
        self.status() == TweenStatus::Running
    }

    /// Time fraction of the last computed frame, in [0, 1].
    pub fn progress(&self) -> f64 {
        self.state.borrow().run.as_ref().map_or(0.0, |run| run.fraction)
    }

    /// Elapsed interpolation time of the current run, excluding delay and
    /// pauses, clamped to the duration.
    pub fn elapsed(&self) -> Millis {
        let state = self.state.borrow();
        match &state.run {
            Some(run) if state.status == TweenStatus::Completed => run.duration,
            Some(run) => run.elapsed(state.clock.now()),
            None => 0.0,
        }
    }

    /// Register `hook` for the event named `event`.
    pub fn hook_add(&self, event: &str, hook: Hook) -> Result<HookId, TweenError> {
        let event = event.parse::<HookEvent>()?;
        Ok(self.state.borrow_mut().hooks.add(event, hook))
    }

    /// Unregister `hook` from `event`. Returns whether it was registered.
    pub fn hook_remove(&self, event: &str, hook: &Hook) -> Result<bool, TweenError> {
        let event = event.parse::<HookEvent>()?;
        Ok(self.state.borrow_mut().hooks.remove(event, hook))
    }

    pub fn hook_remove_id(&self, id: HookId) -> bool {
        self.state.borrow_mut().hooks.remove_id(id)
    }

    /// Where hook failures are reported. Defaults to a `log::warn!` sink.
    pub fn set_error_sink(&self, sink: ErrorSink) {
        self.state.borrow_mut().sink = sink;
    }

    /// Ask the driver for the next frame. The frame holds only a weak
    /// reference, so a dropped tween never runs again.
    fn request_frame(&self) {
        let driver = self.state.borrow().driver.clone();
        let weak: Weak<RefCell<TweenState>> = Rc::downgrade(&self.state);
        let handle = driver.schedule(Box::new(move || match weak.upgrade() {
            Some(state) => Tweenable { state }.on_frame(),
            None => Ok(()),
        }));
        if let Some(run) = self.state.borrow_mut().run.as_mut() {
            run.frame = Some(handle);
        }
    }

    /// One frame: update values, request the next frame, then run hooks and
    /// callbacks. Errors from the caller's `step` or completion callback are
    /// returned to the driver.
    fn on_frame(&self) -> Result<(), TweenError> {
        let (snapshot, hooks, sink, mut step, complete, generation, finished) = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            if state.status != TweenStatus::Running {
                return Ok(());
            }
            let now = state.clock.now();
            let Some(run) = state.run.as_mut() else { return Ok(()) };
            run.frame = None;

            let fraction = run.advance(now);
            let finished = fraction >= 1.0;
            if finished {
                // Exact end values, whatever the easing returns at 1.0
                state.current = run.to.clone();
                state.status = TweenStatus::Completed;
                log::debug!("tween run {} completed", run.generation);
            } else {
                state.current = interpolate_snapshot(&run.from, &run.to, fraction, &run.easings);
            }
            log::trace!("tween run {} frame at {:.3}: {:?}", run.generation, fraction, state.current);

            let step = run.step.take();
            // The completion callback belongs to this run even if the step
            // callback restarts the tween.
            let complete = if finished { run.complete.take() } else { None };
            if finished {
                run.release();
            }
            (
                state.current.clone(),
                state.hooks.listeners(HookEvent::Step),
                state.sink.clone(),
                step,
                complete,
                run.generation,
                finished,
            )
        };

        if !finished {
            self.request_frame();
        }

        dispatch(HookEvent::Step, &hooks, &snapshot, &sink);

        if let Some(f) = step.as_mut() {
            let result = f(&snapshot);
            self.return_step(generation, step);
            result.map_err(TweenError::Step)?;
        }

        if finished {
            self.finish(complete, &snapshot)?;
        }
        Ok(())
    }

    /// Put the step callback back unless the run ended or was replaced while
    /// it ran.
    fn return_step(&self, generation: u64, step: Option<StepFn>) {
        let mut state = self.state.borrow_mut();
        let live = state.status.is_active();
        if let Some(run) = state.run.as_mut() {
            if live && run.generation == generation && run.step.is_none() {
                run.step = step;
            }
        }
    }

    /// Natural completion: complete hooks, then the completion callback.
    fn finish(&self, complete: Option<CompleteFn>, snapshot: &Snapshot) -> Result<(), TweenError> {
        let (hooks, sink) = {
            let state = self.state.borrow();
            (state.hooks.listeners(HookEvent::Complete), state.sink.clone())
        };

        dispatch(HookEvent::Complete, &hooks, snapshot, &sink);
        match complete {
            Some(f) => f(snapshot).map_err(TweenError::Complete),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Tweenable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Tweenable")
            .field("status", &state.status)
            .field("current", &state.current)
            .field("hooks", &state.hooks)
            .finish()
    }
}
