//! Frame scheduling.
//!
//! A [`FrameDriver`] invokes scheduled callbacks once per host animation
//! frame. The engine keeps at most one frame outstanding per tween and
//! cancels it on pause and on reaching a terminal status.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use crate::api::types::Millis;
use crate::core::error::TweenError;
use crate::core::time::ManualClock;

/// Default frame interval: 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Millis = 1000.0 / 60.0;

/// Outcome of one scheduled frame. Errors come from caller-supplied
/// callbacks and are handed back to whoever drives the frames.
pub type FrameResult = Result<(), TweenError>;

/// A one-shot frame callback.
pub type FrameCallback = Box<dyn FnOnce() -> FrameResult>;

/// Opaque handle identifying a scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Host service that calls a callback on the next animation frame.
///
/// `schedule` must not invoke the callback synchronously, and each scheduled
/// callback runs at most once. Cancelling a handle that already ran is a no-op.
pub trait FrameDriver {
    fn schedule(&self, frame: FrameCallback) -> FrameHandle;
    fn cancel(&self, handle: FrameHandle);
}

/// Pending frame callbacks, fired in scheduling order by [`FrameQueue::run_frame`].
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<BTreeMap<FrameHandle, FrameCallback>>,
    next_handle: Cell<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Fire every callback that was pending when the frame began.
    ///
    /// Callbacks scheduled while the frame runs wait for the next frame;
    /// callbacks cancelled while it runs are skipped. Every due callback runs
    /// even if an earlier one fails; the first failure is returned.
    pub fn run_frame(&self) -> Result<usize, TweenError> {
        let cutoff = self.next_handle.get();
        let mut ran = 0;
        let mut failure = None;

        loop {
            let due = {
                let mut pending = self.pending.borrow_mut();
                match pending.first_key_value() {
                    Some((handle, _)) if handle.0 < cutoff => pending.pop_first(),
                    _ => None,
                }
            };
            let Some((handle, frame)) = due else { break };

            ran += 1;
            if let Err(err) = frame() {
                if failure.is_none() {
                    failure = Some(err);
                } else {
                    log::warn!("frame {:?} failed: {}", handle, err);
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(ran),
        }
    }
}

impl FrameDriver for FrameQueue {
    fn schedule(&self, frame: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.pending.borrow_mut().insert(handle, frame);
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.pending.borrow_mut().remove(&handle);
    }
}

/// Deterministic frame driver: each frame advances a [`ManualClock`] by the
/// next interval, then fires the pending callbacks.
///
/// Intervals cycle, so a pattern such as `[16.0, 17.0, 18.0]` reproduces
/// host frame jitter.
pub struct ManualFrameDriver {
    queue: FrameQueue,
    clock: ManualClock,
    intervals: Vec<Millis>,
    cursor: Cell<usize>,
    frames: Cell<u64>,
}

impl ManualFrameDriver {
    /// 60 fps driver.
    pub fn new(clock: ManualClock) -> Self {
        Self::with_intervals(clock, vec![DEFAULT_FRAME_INTERVAL])
    }

    pub fn with_fps(clock: ManualClock, fps: f64) -> Self {
        Self::with_intervals(clock, vec![1000.0 / fps])
    }

    /// Cycle through `intervals` frame by frame. An empty list means 60 fps.
    pub fn with_intervals(clock: ManualClock, intervals: Vec<Millis>) -> Self {
        let intervals = if intervals.is_empty() {
            vec![DEFAULT_FRAME_INTERVAL]
        } else {
            intervals
        };
        Self {
            queue: FrameQueue::new(),
            clock,
            intervals,
            cursor: Cell::new(0),
            frames: Cell::new(0),
        }
    }

    /// Frames advanced so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.get()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    /// Advance the clock by one interval and run the frame.
    pub fn advance_frame(&self) -> Result<usize, TweenError> {
        let cursor = self.cursor.get();
        self.clock.advance(self.intervals[cursor]);
        self.cursor.set((cursor + 1) % self.intervals.len());
        self.frames.set(self.frames.get() + 1);
        self.queue.run_frame()
    }

    /// Advance frames until nothing is scheduled or `max_frames` ran.
    /// Returns the number of frames advanced.
    pub fn run_until_idle(&self, max_frames: u64) -> Result<u64, TweenError> {
        let mut advanced = 0;
        while !self.queue.is_idle() && advanced < max_frames {
            self.advance_frame()?;
            advanced += 1;
        }
        Ok(advanced)
    }
}

impl FrameDriver for ManualFrameDriver {
    fn schedule(&self, frame: FrameCallback) -> FrameHandle {
        self.queue.schedule(frame)
    }

    fn cancel(&self, handle: FrameHandle) {
        self.queue.cancel(handle);
    }
}

/// Drive `queue` in real time at `fps`, sleeping between frames, until it is
/// idle or `max_frames` ran. Pair it with a [`SystemClock`](crate::SystemClock).
pub fn run_realtime(queue: &FrameQueue, fps: f64, max_frames: u64) -> Result<u64, TweenError> {
    let interval = Duration::from_secs_f64(1.0 / fps.max(1.0));
    let mut frames = 0;

    while !queue.is_idle() && frames < max_frames {
        let frame_start = Instant::now();
        queue.run_frame()?;
        frames += 1;
        if let Some(rest) = interval.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use crate::core::time::Clock;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> FrameCallback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || {
            let c = c.clone();
            Box::new(move || {
                c.set(c.get() + 1);
                Ok(())
            }) as FrameCallback
        })
    }

    #[test]
    fn frames_run_once() {
        let queue = FrameQueue::new();
        let (count, make) = counter();
        queue.schedule(make());
        queue.schedule(make());

        assert_eq!(queue.run_frame().unwrap(), 2);
        assert_eq!(queue.run_frame().unwrap(), 0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn cancelled_frame_does_not_run() {
        let queue = FrameQueue::new();
        let (count, make) = counter();
        let handle = queue.schedule(make());
        queue.cancel(handle);

        assert!(queue.is_idle());
        queue.run_frame().unwrap();
        assert_eq!(count.get(), 0);
        // Cancelling again is harmless
        queue.cancel(handle);
    }

    #[test]
    fn frames_scheduled_during_a_frame_wait() {
        let queue = Rc::new(FrameQueue::new());
        let (count, make) = counter();
        let q = queue.clone();
        queue.schedule(Box::new(move || {
            q.schedule(make());
            Ok(())
        }));

        assert_eq!(queue.run_frame().unwrap(), 1);
        assert_eq!(count.get(), 0);
        assert_eq!(queue.pending_count(), 1);

        assert_eq!(queue.run_frame().unwrap(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn failure_is_returned_after_all_frames_run() {
        let queue = FrameQueue::new();
        let (count, make) = counter();
        queue.schedule(Box::new(|| Err(TweenError::Step("first".into()))));
        queue.schedule(make());

        let err = queue.run_frame().unwrap_err();
        assert!(matches!(err, TweenError::Step(_)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn manual_driver_cycles_intervals() {
        let clock = ManualClock::new();
        let driver = ManualFrameDriver::with_intervals(clock.clone(), vec![10.0, 20.0]);

        driver.advance_frame().unwrap();
        assert_eq!(clock.now(), 10.0);
        driver.advance_frame().unwrap();
        assert_eq!(clock.now(), 30.0);
        driver.advance_frame().unwrap();
        assert_eq!(clock.now(), 40.0);
        assert_eq!(driver.frame_count(), 3);
    }

    #[test]
    fn run_until_idle_respects_limit() {
        let driver = Rc::new(ManualFrameDriver::new(ManualClock::new()));
        // A callback that always reschedules itself never goes idle
        fn forever(driver: Rc<ManualFrameDriver>) -> FrameCallback {
            Box::new(move || {
                let d = driver.clone();
                driver.schedule(forever(d));
                Ok(())
            })
        }
        driver.schedule(forever(driver.clone()));

        assert_eq!(driver.run_until_idle(5).unwrap(), 5);
        assert_eq!(driver.pending_count(), 1);
    }

    #[test]
    fn realtime_loop_stops_when_idle() {
        let queue = FrameQueue::new();
        let (count, make) = counter();
        queue.schedule(make());

        let frames = run_realtime(&queue, 1000.0, 10).unwrap();
        assert_eq!(frames, 1);
        assert_eq!(count.get(), 1);
    }
}
