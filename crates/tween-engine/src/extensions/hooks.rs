// extensions/hooks.rs
//
// Hook registry — ordered side-effect callbacks keyed by lifecycle event.
// Hooks are best-effort: a failing hook is reported and skipped, never
// allowed to stop the tween or the hooks after it.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use crate::api::types::Snapshot;
use crate::core::error::{BoxError, ConfigError};

/// A registered hook. Receives the tween's current snapshot.
pub type Hook = Rc<dyn Fn(&Snapshot) -> Result<(), BoxError>>;

/// Wrap a closure as a [`Hook`].
pub fn hook(f: impl Fn(&Snapshot) -> Result<(), BoxError> + 'static) -> Hook {
    Rc::new(f)
}

/// Lifecycle points at which hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookEvent {
    /// After `start` has set up a run.
    Start,
    /// Every frame, after values update and before the `step` callback.
    Step,
    Pause,
    Resume,
    /// After `stop`, with the final (possibly end-projected) values.
    Stop,
    /// On natural completion, before the completion callback.
    Complete,
}

impl HookEvent {
    pub fn name(self) -> &'static str {
        match self {
            HookEvent::Start => "start",
            HookEvent::Step => "step",
            HookEvent::Pause => "pause",
            HookEvent::Resume => "resume",
            HookEvent::Stop => "stop",
            HookEvent::Complete => "complete",
        }
    }
}

impl FromStr for HookEvent {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "start" => Ok(HookEvent::Start),
            "step" => Ok(HookEvent::Step),
            "pause" => Ok(HookEvent::Pause),
            "resume" => Ok(HookEvent::Resume),
            "stop" => Ok(HookEvent::Stop),
            "complete" => Ok(HookEvent::Complete),
            _ => Err(ConfigError::UnknownHookEvent(name.to_string())),
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub u64);

/// A hook that returned an error.
#[derive(Debug)]
pub struct HookFailure {
    pub event: HookEvent,
    pub hook: HookId,
    pub error: BoxError,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hook {} failed: {}", self.event, self.hook.0, self.error)
    }
}

/// Receives hook failures.
pub type ErrorSink = Rc<dyn Fn(&HookFailure)>;

/// Sink that logs failures at warn level.
pub fn log_sink() -> ErrorSink {
    Rc::new(|failure: &HookFailure| log::warn!("{}", failure))
}

/// Hooks grouped by event, kept in registration order.
#[derive(Default)]
pub struct HookRegistry {
    hooks: BTreeMap<HookEvent, Vec<(HookId, Hook)>>,
    next_id: u64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook for `event`. Returns a handle for later removal.
    pub fn add(&mut self, event: HookEvent, hook: Hook) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.entry(event).or_default().push((id, hook));
        id
    }

    /// Remove the first registration of `hook` (by identity) under `event`.
    pub fn remove(&mut self, event: HookEvent, hook: &Hook) -> bool {
        let Some(list) = self.hooks.get_mut(&event) else { return false };
        match list.iter().position(|(_, h)| std::ptr::addr_eq(Rc::as_ptr(h), Rc::as_ptr(hook))) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove a hook by handle, whatever its event.
    pub fn remove_id(&mut self, id: HookId) -> bool {
        for list in self.hooks.values_mut() {
            if let Some(index) = list.iter().position(|(h, _)| *h == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    /// Number of hooks registered for `event`.
    pub fn len(&self, event: HookEvent) -> usize {
        self.hooks.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    /// Copy of the hooks for `event`, so they can run without the registry
    /// borrowed (hooks may add or remove hooks).
    pub fn listeners(&self, event: HookEvent) -> Vec<(HookId, Hook)> {
        self.hooks.get(&event).cloned().unwrap_or_default()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self.hooks.iter().map(|(e, l)| (e.name(), l.len())).collect();
        f.debug_struct("HookRegistry").field("hooks", &counts).finish()
    }
}

/// Run `listeners` in order with `snapshot`. Failures go to `sink` and do not
/// stop later hooks. Returns the number of failures.
pub fn dispatch(event: HookEvent, listeners: &[(HookId, Hook)], snapshot: &Snapshot, sink: &ErrorSink) -> usize {
    let mut failures = 0;
    for (id, hook) in listeners {
        if let Err(error) = hook(snapshot) {
            failures += 1;
            sink(&HookFailure { event, hook: *id, error });
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Hook {
        let log = log.clone();
        hook(move |_| {
            log.borrow_mut().push(tag);
            Ok(())
        })
    }

    #[test]
    fn hooks_fire_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.add(HookEvent::Step, recorder(&log, "a"));
        registry.add(HookEvent::Step, recorder(&log, "b"));
        registry.add(HookEvent::Pause, recorder(&log, "p"));

        let sink = log_sink();
        dispatch(HookEvent::Step, &registry.listeners(HookEvent::Step), &Snapshot::new(), &sink);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn remove_by_identity_and_id() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        let a = recorder(&log, "a");
        let b = recorder(&log, "b");
        registry.add(HookEvent::Step, a.clone());
        let b_id = registry.add(HookEvent::Step, b.clone());

        assert!(registry.remove(HookEvent::Step, &a));
        assert!(!registry.remove(HookEvent::Step, &a));
        assert!(!registry.remove(HookEvent::Pause, &b));
        assert_eq!(registry.len(HookEvent::Step), 1);

        assert!(registry.remove_id(b_id));
        assert!(!registry.remove_id(b_id));
        assert!(registry.is_empty());
    }

    #[test]
    fn failing_hook_is_isolated_and_reported() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let reported = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();
        let bad = registry.add(HookEvent::Step, hook(|_| Err("bad hook".into())));
        registry.add(HookEvent::Step, recorder(&log, "after"));

        let r = reported.clone();
        let sink: ErrorSink = Rc::new(move |f: &HookFailure| r.borrow_mut().push((f.hook, f.to_string())));
        let failures = dispatch(HookEvent::Step, &registry.listeners(HookEvent::Step), &Snapshot::new(), &sink);

        assert_eq!(failures, 1);
        assert_eq!(*log.borrow(), vec!["after"]);
        assert_eq!(*reported.borrow(), vec![(bad, format!("step hook {} failed: bad hook", bad.0))]);
    }

    #[test]
    fn event_names_parse() {
        assert_eq!("step".parse::<HookEvent>().unwrap(), HookEvent::Step);
        assert_eq!(HookEvent::Complete.to_string(), "complete");
        assert!(matches!("tick".parse::<HookEvent>(), Err(ConfigError::UnknownHookEvent(_))));
    }
}
