use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use serde::{Deserialize, Serialize};

/// Milliseconds. Used for every timestamp and time span in the engine.
pub type Millis = f64;

/// Name of an animated property.
pub type PropertyName = String;

/// A set of named numeric property values.
///
/// Used for a tween's `from` and `to` states and for every snapshot handed
/// to callbacks and hooks. Iteration order is the property name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<PropertyName, f64>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a property, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Insert or overwrite a property value.
    pub fn set(&mut self, name: impl Into<PropertyName>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Builder form of [`Snapshot::set`].
    pub fn with(mut self, name: impl Into<PropertyName>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both snapshots name exactly the same properties.
    pub fn same_keys(&self, other: &Snapshot) -> bool {
        self.0.len() == other.0.len() && self.0.keys().all(|k| other.0.contains_key(k))
    }
}

impl<K: Into<PropertyName>> FromIterator<(K, f64)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Index<&str> for Snapshot {
    type Output = f64;

    /// Panics if the property is absent, like `BTreeMap` indexing.
    fn index(&self, name: &str) -> &f64 {
        &self.0[name]
    }
}

/// Lifecycle status of a tween.
///
/// `Running ⇄ Paused` is the only reversible transition; `Stopped` and
/// `Completed` end a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TweenStatus {
    /// No run has been started yet.
    #[default]
    Idle,
    /// Frames are being requested and stepped.
    Running,
    /// Suspended; no frame is outstanding.
    Paused,
    /// Cancelled with `stop`.
    Stopped,
    /// Reached the end of its duration.
    Completed,
}

impl TweenStatus {
    /// Running or paused: a run is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Stopped or completed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TweenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_collects_and_indexes() {
        let snap: Snapshot = [("x", 1.0), ("y", 2.5)].into_iter().collect();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap["y"], 2.5);
        assert_eq!(snap.get("z"), None);
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn same_keys_ignores_values() {
        let a = Snapshot::new().with("x", 0.0).with("y", 0.0);
        let b = Snapshot::new().with("y", 9.0).with("x", 3.0);
        let c = Snapshot::new().with("x", 0.0);
        assert!(a.same_keys(&b));
        assert!(!a.same_keys(&c));
        assert!(!c.same_keys(&a));
    }

    #[test]
    fn snapshot_serializes_as_plain_map() {
        let snap = Snapshot::new().with("v", 10.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"v":10.0}"#);
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn status_classification() {
        assert!(TweenStatus::Running.is_active());
        assert!(TweenStatus::Paused.is_active());
        assert!(!TweenStatus::Idle.is_active());
        assert!(TweenStatus::Stopped.is_terminal());
        assert!(TweenStatus::Completed.is_terminal());
        assert!(!TweenStatus::Paused.is_terminal());
        assert_eq!(TweenStatus::Paused.to_string(), "paused");
    }
}
