//! Time-driven value interpolation.
//!
//! A [`Tweenable`] moves a set of named numbers from one state to another
//! over a duration, stepping once per frame of an injected [`FrameDriver`]
//! and measuring time with an injected [`Clock`]. Runs can be paused,
//! resumed and stopped; paused time never counts towards progress.

pub mod api;
pub mod core;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{TweenConfig, TweenSpec, EasingNames, StepFn, CompleteFn, DEFAULT_DURATION};
pub use api::types::{Millis, PropertyName, Snapshot, TweenStatus};
pub use crate::core::error::{BoxError, ConfigError, TweenError};
pub use crate::core::frame::{
    FrameCallback, FrameDriver, FrameHandle, FrameQueue, FrameResult,
    ManualFrameDriver, run_realtime, DEFAULT_FRAME_INTERVAL,
};
pub use crate::core::time::{Clock, ManualClock, SystemClock};

pub use extensions::{
    Easing, EasingFn, Ease, EasingSpec, EasingTable, PropertyEasings, lerp,
    Hook, HookEvent, HookId, HookFailure, HookRegistry, ErrorSink, hook, log_sink,
    interpolate, interpolate_snapshot, interpolate_state,
    Tweenable,
};
