// extensions/easing.rs
//
// Easing curves and the name → curve table that tween configurations resolve
// against. Curves are pure: normalized time in, normalized progress out.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use crate::api::types::{PropertyName, Snapshot};
use crate::core::error::ConfigError;

/// Built-in easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    /// Overshoot then settle.
    BackIn,
    BackOut,
    BackInOut,
    /// Elastic spring.
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    /// Bouncy finish.
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    /// Apply the easing function to a normalized time value `t` in [0, 1].
    /// Returns the eased progress, typically in [0, 1] (Back and Elastic overshoot).
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => in_out(t, |t| t * t),

            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => in_out(t, |t| t.powi(3)),

            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, |t| t.powi(4)),

            Easing::QuintIn => t.powi(5),
            Easing::QuintOut => 1.0 - (1.0 - t).powi(5),
            Easing::QuintInOut => in_out(t, |t| t.powi(5)),

            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Easing::ExpoIn => expo_in(t),
            Easing::ExpoOut => 1.0 - expo_in(1.0 - t),
            Easing::ExpoInOut => in_out(t, expo_in),

            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::CircInOut => in_out(t, |t| 1.0 - (1.0 - t * t).sqrt()),

            Easing::BackIn => back_in(t),
            Easing::BackOut => 1.0 - back_in(1.0 - t),
            Easing::BackInOut => {
                const C1: f64 = 1.70158;
                const C2: f64 = C1 * 1.525;
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
                }
            }

            Easing::ElasticIn => 1.0 - elastic_out(1.0 - t),
            Easing::ElasticOut => elastic_out(t),
            Easing::ElasticInOut => in_out(t, |t| 1.0 - elastic_out(1.0 - t)),

            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => in_out(t, |t| 1.0 - bounce_out(1.0 - t)),
        }
    }

    /// Table name of the curve (`easeInOutQuad` style).
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::QuintIn => "easeInQuint",
            Easing::QuintOut => "easeOutQuint",
            Easing::QuintInOut => "easeInOutQuint",
            Easing::SineIn => "easeInSine",
            Easing::SineOut => "easeOutSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::CircIn => "easeInCirc",
            Easing::CircOut => "easeOutCirc",
            Easing::CircInOut => "easeInOutCirc",
            Easing::BackIn => "easeInBack",
            Easing::BackOut => "easeOutBack",
            Easing::BackInOut => "easeInOutBack",
            Easing::ElasticIn => "easeInElastic",
            Easing::ElasticOut => "easeOutElastic",
            Easing::ElasticInOut => "easeInOutElastic",
            Easing::BounceIn => "easeInBounce",
            Easing::BounceOut => "easeOutBounce",
            Easing::BounceInOut => "easeInOutBounce",
        }
    }
}

impl FromStr for Easing {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name() == name)
            .ok_or_else(|| ConfigError::UnknownEasing(name.to_string()))
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mirror an ease-in curve into an ease-in-out curve.
#[inline]
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 - 2.0 * t) / 2.0
    }
}

#[inline]
fn expo_in(t: f64) -> f64 {
    if t == 0.0 { 0.0 } else { 2.0_f64.powf(10.0 * t - 10.0) }
}

#[inline]
fn back_in(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    C3 * t * t * t - C1 * t * t
}

#[inline]
fn elastic_out(t: f64) -> f64 {
    const C4: f64 = (2.0 * PI) / 3.0;
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
    }
}

#[inline]
fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

// ── Resolved and unresolved easing references ───────────────────────────

/// A resolved easing: a built-in curve or a caller-supplied function.
#[derive(Clone)]
pub enum EasingFn {
    Builtin(Easing),
    Custom(Rc<dyn Fn(f64) -> f64>),
}

impl EasingFn {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        EasingFn::Custom(Rc::new(f))
    }

    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            EasingFn::Builtin(easing) => easing.apply(t),
            EasingFn::Custom(f) => f(t),
        }
    }
}

impl Default for EasingFn {
    fn default() -> Self {
        EasingFn::Builtin(Easing::Linear)
    }
}

impl fmt::Debug for EasingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingFn::Builtin(easing) => f.debug_tuple("Builtin").field(easing).finish(),
            EasingFn::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Easing> for EasingFn {
    fn from(easing: Easing) -> Self {
        EasingFn::Builtin(easing)
    }
}

/// An easing as written in a tween configuration: by table name or by value.
#[derive(Debug, Clone)]
pub enum Ease {
    Named(String),
    Func(EasingFn),
}

impl From<&str> for Ease {
    fn from(name: &str) -> Self {
        Ease::Named(name.to_string())
    }
}

impl From<String> for Ease {
    fn from(name: String) -> Self {
        Ease::Named(name)
    }
}

impl From<Easing> for Ease {
    fn from(easing: Easing) -> Self {
        Ease::Func(EasingFn::Builtin(easing))
    }
}

impl From<EasingFn> for Ease {
    fn from(f: EasingFn) -> Self {
        Ease::Func(f)
    }
}

/// Which easing each property of a tween uses.
#[derive(Debug, Clone)]
pub enum EasingSpec {
    /// One easing for every property.
    All(Ease),
    /// Per-property easings; unlisted properties are linear.
    PerProperty(BTreeMap<PropertyName, Ease>),
}

impl Default for EasingSpec {
    fn default() -> Self {
        EasingSpec::All(Ease::Func(EasingFn::default()))
    }
}

impl From<Ease> for EasingSpec {
    fn from(ease: Ease) -> Self {
        EasingSpec::All(ease)
    }
}

impl From<Easing> for EasingSpec {
    fn from(easing: Easing) -> Self {
        EasingSpec::All(easing.into())
    }
}

impl From<EasingFn> for EasingSpec {
    fn from(f: EasingFn) -> Self {
        EasingSpec::All(f.into())
    }
}

impl From<&str> for EasingSpec {
    fn from(name: &str) -> Self {
        EasingSpec::All(name.into())
    }
}

/// Easing resolved for every property of one tween.
#[derive(Debug, Clone, Default)]
pub struct PropertyEasings {
    default: EasingFn,
    overrides: BTreeMap<PropertyName, EasingFn>,
}

impl PropertyEasings {
    /// The same easing for every property.
    pub fn uniform(easing: impl Into<EasingFn>) -> Self {
        Self {
            default: easing.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> &EasingFn {
        self.overrides.get(name).unwrap_or(&self.default)
    }
}

// ── Easing table ────────────────────────────────────────────────────────

/// Name → easing lookup: every built-in plus registered custom curves.
/// Custom names shadow built-ins.
#[derive(Clone, Default)]
pub struct EasingTable {
    custom: HashMap<String, EasingFn>,
}

impl EasingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(f64) -> f64 + 'static) {
        self.custom.insert(name.into(), EasingFn::custom(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || name.parse::<Easing>().is_ok()
    }

    /// Look up a curve by name.
    pub fn lookup(&self, name: &str) -> Result<EasingFn, ConfigError> {
        match self.custom.get(name) {
            Some(f) => Ok(f.clone()),
            None => name.parse::<Easing>().map(EasingFn::Builtin),
        }
    }

    pub fn resolve(&self, ease: &Ease) -> Result<EasingFn, ConfigError> {
        match ease {
            Ease::Named(name) => self.lookup(name),
            Ease::Func(f) => Ok(f.clone()),
        }
    }

    /// Resolve `spec` for the properties of `target`.
    pub fn resolve_spec(&self, spec: &EasingSpec, target: &Snapshot) -> Result<PropertyEasings, ConfigError> {
        match spec {
            EasingSpec::All(ease) => Ok(PropertyEasings::uniform(self.resolve(ease)?)),
            EasingSpec::PerProperty(map) => {
                let mut overrides = BTreeMap::new();
                for (name, ease) in map {
                    if !target.contains(name) {
                        return Err(ConfigError::UnknownProperty(name.clone()));
                    }
                    overrides.insert(name.clone(), self.resolve(ease)?);
                }
                Ok(PropertyEasings {
                    default: EasingFn::default(),
                    overrides,
                })
            }
        }
    }
}

impl fmt::Debug for EasingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("EasingTable").field("custom", &names).finish()
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_curve_hits_its_endpoints() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{} at 0 was {}", easing, easing.apply(0.0));
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{} at 1 was {}", easing, easing.apply(1.0));
        }
    }

    #[test]
    fn linear_endpoints() {
        assert_eq!(Easing::Linear.apply(0.0), 0.0);
        assert_eq!(Easing::Linear.apply(1.0), 1.0);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn quad_out_faster_start() {
        // QuadOut should be > 0.5 at t=0.5 (faster start, slower end)
        let mid = Easing::QuadOut.apply(0.5);
        assert!(mid > 0.5, "QuadOut at 0.5 should be > 0.5, got {}", mid);
    }

    #[test]
    fn in_out_curves_are_symmetric() {
        for easing in [Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut, Easing::CircInOut] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-9, "{} midpoint", easing);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert!((a + b - 1.0).abs() < 1e-9, "{} not symmetric", easing);
        }
    }

    #[test]
    fn back_overshoots() {
        assert!(Easing::BackOut.apply(0.6) > 1.0, "BackOut should overshoot past 1");
        assert!(Easing::BackIn.apply(0.2) < 0.0, "BackIn should dip below 0");
    }

    #[test]
    fn names_round_trip() {
        for easing in Easing::ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
        assert!(matches!("wobble".parse::<Easing>(), Err(ConfigError::UnknownEasing(n)) if n == "wobble"));
    }

    #[test]
    fn table_custom_shadows_builtin() {
        let mut table = EasingTable::new();
        assert!(table.contains("linear"));
        assert!(!table.contains("step"));

        table.register("step", |t| if t < 1.0 { 0.0 } else { 1.0 });
        table.register("linear", |_| 0.25);

        assert_eq!(table.lookup("step").unwrap().apply(0.9), 0.0);
        assert_eq!(table.lookup("linear").unwrap().apply(0.9), 0.25);
        assert!(table.lookup("easeOutBounce").is_ok());
        assert!(table.lookup("nope").is_err());
    }

    #[test]
    fn per_property_spec_defaults_to_linear() {
        let table = EasingTable::new();
        let target = Snapshot::new().with("x", 1.0).with("y", 1.0);
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), Ease::from("easeInQuad"));
        let easings = table.resolve_spec(&EasingSpec::PerProperty(map), &target).unwrap();

        assert_eq!(easings.get("x").apply(0.5), 0.25);
        assert_eq!(easings.get("y").apply(0.5), 0.5);
    }

    #[test]
    fn per_property_spec_rejects_unknown_property() {
        let table = EasingTable::new();
        let target = Snapshot::new().with("x", 1.0);
        let mut map = BTreeMap::new();
        map.insert("z".to_string(), Ease::from(Easing::QuadIn));
        let err = table.resolve_spec(&EasingSpec::PerProperty(map), &target).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProperty(n) if n == "z"));
    }

    #[test]
    fn lerp_extrapolates_past_the_ends() {
        assert!((lerp(100.0, 200.0, 0.5) - 150.0).abs() < 0.001);
        assert!((lerp(0.0, 10.0, 1.2) - 12.0).abs() < 1e-9);
    }
}
