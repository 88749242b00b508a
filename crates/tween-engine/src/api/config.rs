use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::api::types::{Millis, PropertyName, Snapshot};
use crate::core::error::{BoxError, ConfigError};
use crate::extensions::easing::{Ease, EasingSpec};

/// Duration used when a tween description leaves it out.
pub const DEFAULT_DURATION: Millis = 500.0;

/// Per-frame callback. Receives the snapshot computed for the frame.
pub type StepFn = Box<dyn FnMut(&Snapshot) -> Result<(), BoxError>>;

/// Completion callback. Runs once, with the final snapshot.
pub type CompleteFn = Box<dyn FnOnce(&Snapshot) -> Result<(), BoxError>>;

/// Everything needed to start a tween.
///
/// The property set of `to` is the animated set. Entries missing from `from`
/// start at the engine's current value for that property.
pub struct TweenConfig {
    pub from: Snapshot,
    pub to: Snapshot,
    /// Length of the interpolation, in milliseconds.
    pub duration: Millis,
    /// Time before interpolation begins, in milliseconds.
    pub delay: Millis,
    pub easing: EasingSpec,
    pub(crate) step: Option<StepFn>,
    pub(crate) complete: Option<CompleteFn>,
}

impl TweenConfig {
    pub fn new(from: Snapshot, to: Snapshot, duration: Millis) -> Self {
        Self {
            from,
            to,
            duration,
            delay: 0.0,
            easing: EasingSpec::default(),
            step: None,
            complete: None,
        }
    }

    /// Build from a data-only description.
    pub fn from_spec(spec: TweenSpec) -> Self {
        let easing = match spec.easing {
            EasingNames::All(name) => EasingSpec::All(Ease::Named(name)),
            EasingNames::PerProperty(map) => {
                EasingSpec::PerProperty(map.into_iter().map(|(k, v)| (k, Ease::Named(v))).collect())
            }
        };
        Self {
            easing,
            delay: spec.delay,
            ..Self::new(spec.from, spec.to, spec.duration)
        }
    }

    /// Parse a JSON tween description.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_spec(TweenSpec::from_json(json)?))
    }

    // -- Builder methods --

    pub fn with_delay(mut self, delay: Millis) -> Self {
        self.delay = delay;
        self
    }

    /// Use one easing for every property.
    pub fn with_easing(mut self, easing: impl Into<EasingSpec>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Set the easing of one property. Other properties keep linear unless
    /// they get their own entry.
    pub fn with_property_easing(mut self, name: impl Into<PropertyName>, ease: impl Into<Ease>) -> Self {
        let mut map = match self.easing {
            EasingSpec::PerProperty(map) => map,
            EasingSpec::All(_) => BTreeMap::new(),
        };
        map.insert(name.into(), ease.into());
        self.easing = EasingSpec::PerProperty(map);
        self
    }

    pub fn on_step(mut self, f: impl FnMut(&Snapshot) -> Result<(), BoxError> + 'static) -> Self {
        self.step = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(&Snapshot) -> Result<(), BoxError> + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Checks that need no engine state: non-empty target, sane timing,
    /// finite values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.to.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay));
        }
        if let Some((name, _)) = self.from.iter().chain(self.to.iter()).find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFiniteValue(name.to_string()));
        }
        if let Some(name) = self.from.keys().find(|k| !self.to.contains(k)) {
            return Err(ConfigError::UnexpectedStart(name.to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for TweenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenConfig")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("step", &self.step.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// Data-only tween description, loadable from JSON.
///
/// ```json
/// { "from": { "x": 0 }, "to": { "x": 10 }, "duration": 250, "easing": "easeOutQuad" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    #[serde(default)]
    pub from: Snapshot,
    pub to: Snapshot,
    #[serde(default = "default_duration")]
    pub duration: Millis,
    #[serde(default)]
    pub delay: Millis,
    #[serde(default)]
    pub easing: EasingNames,
}

/// Easing names in a [`TweenSpec`]: one name, or a name per property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EasingNames {
    All(String),
    PerProperty(BTreeMap<PropertyName, String>),
}

impl Default for EasingNames {
    fn default() -> Self {
        EasingNames::All("linear".to_string())
    }
}

fn default_duration() -> Millis {
    DEFAULT_DURATION
}

impl TweenSpec {
    /// Parse a description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
