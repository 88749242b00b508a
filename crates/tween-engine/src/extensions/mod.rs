// extensions/mod.rs
//
// The tweening layers built on the core clock and frame driver:
// easing curves, property interpolation, hooks and the tween engine itself.

pub mod easing;
pub mod hooks;
pub mod interpolate;
pub mod tween;

pub use easing::{Easing, EasingFn, Ease, EasingSpec, EasingTable, PropertyEasings, lerp};
pub use hooks::{Hook, HookEvent, HookId, HookFailure, HookRegistry, ErrorSink, hook, log_sink};
pub use interpolate::{interpolate, interpolate_snapshot, interpolate_state};
pub use tween::Tweenable;
