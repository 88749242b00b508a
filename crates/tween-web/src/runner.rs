use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Performance, Window};
use tween_engine::{Clock, FrameCallback, FrameDriver, FrameHandle, Millis};

/// A requested frame: the browser's request id, the engine callback and the
/// JS closure handed to `requestAnimationFrame`. Removing the entry frees all
/// three.
struct PendingFrame {
    id: i32,
    frame: FrameCallback,
    _closure: Closure<dyn FnMut(f64)>,
}

type PendingFrames = Rc<RefCell<HashMap<FrameHandle, PendingFrame>>>;

/// Frame driver backed by `requestAnimationFrame`.
///
/// Each scheduled callback is kept on the Rust side, keyed by its handle;
/// the JS closure only carries the handle. Failures returned by a frame are
/// logged, since the browser's frame loop has nowhere to return them.
pub struct AnimationFrameDriver {
    window: Window,
    pending: PendingFrames,
    next_handle: Cell<u64>,
}

impl AnimationFrameDriver {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))?;
        Ok(Self {
            window,
            pending: Rc::new(RefCell::new(HashMap::new())),
            next_handle: Cell::new(0),
        })
    }

    /// Number of frames waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameDriver for AnimationFrameDriver {
    fn schedule(&self, frame: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);

        let pending = Rc::downgrade(&self.pending);
        let fire = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            let Some(pending) = pending.upgrade() else { return };
            // Dropping the entry frees this closure once the call returns
            let entry = pending.borrow_mut().remove(&handle);
            if let Some(PendingFrame { frame, .. }) = entry {
                if let Err(err) = frame() {
                    log::error!("frame {:?} failed: {}", handle, err);
                }
            }
        });

        match self.window.request_animation_frame(fire.as_ref().unchecked_ref()) {
            Ok(id) => {
                let entry = PendingFrame { id, frame, _closure: fire };
                self.pending.borrow_mut().insert(handle, entry);
            }
            Err(err) => log::error!("requestAnimationFrame failed: {:?}", err),
        }
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        let entry = self.pending.borrow_mut().remove(&handle);
        if let Some(PendingFrame { id, .. }) = entry {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", err);
            }
        }
    }
}

/// Clock reading `performance.now()`, or `Date.now()` where the Performance
/// API is missing.
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        if performance.is_none() {
            log::warn!("performance.now() unavailable, falling back to Date.now()");
        }
        Self { performance }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Millis {
        match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }
}
