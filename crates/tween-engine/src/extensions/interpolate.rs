// extensions/interpolate.rs
//
// Property interpolation: one value, or a whole snapshot, at a time fraction.

use crate::api::types::Snapshot;
use crate::core::error::ConfigError;
use super::easing::{lerp, EasingFn, EasingSpec, EasingTable, PropertyEasings};

/// Value of one property at time fraction `fraction`.
///
/// `fraction` is elapsed / duration in [0, 1]; the easing maps it to a
/// progress fraction, which may leave [0, 1]. The result is not clamped.
#[inline]
pub fn interpolate(from: f64, to: f64, fraction: f64, ease: &EasingFn) -> f64 {
    lerp(from, to, ease.apply(fraction))
}

/// Interpolate every property of `to`. `from` must hold every key of `to`;
/// a missing start value is treated as already at its target.
pub fn interpolate_snapshot(from: &Snapshot, to: &Snapshot, fraction: f64, easings: &PropertyEasings) -> Snapshot {
    to.iter()
        .map(|(name, end)| {
            let start = from.get(name).unwrap_or(end);
            (name, interpolate(start, end, fraction, easings.get(name)))
        })
        .collect()
}

/// Compute a single tween frame without an engine.
///
/// Validates like [`Tweenable::start`](crate::Tweenable::start): `to` must be
/// non-empty, `from` must carry exactly the keys of `to`, and every easing
/// name must resolve in `table`.
pub fn interpolate_state(
    from: &Snapshot,
    to: &Snapshot,
    fraction: f64,
    easing: &EasingSpec,
    table: &EasingTable,
) -> Result<Snapshot, ConfigError> {
    if to.is_empty() {
        return Err(ConfigError::EmptyTarget);
    }
    if !from.same_keys(to) {
        if let Some(name) = to.keys().find(|k| !from.contains(k)) {
            return Err(ConfigError::MissingStart(name.to_string()));
        }
        if let Some(name) = from.keys().find(|k| !to.contains(k)) {
            return Err(ConfigError::UnexpectedStart(name.to_string()));
        }
    }
    let easings = table.resolve_spec(easing, to)?;
    Ok(interpolate_snapshot(from, to, fraction.clamp(0.0, 1.0), &easings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::extensions::easing::{Ease, Easing};

    #[test]
    fn linear_midpoint() {
        let v = interpolate(0.0, 10.0, 0.5, &EasingFn::default());
        assert!((v - 5.0).abs() < 1e-12);
    }

    #[test]
    fn overshoot_is_not_clamped() {
        let v = interpolate(0.0, 10.0, 0.6, &Easing::BackOut.into());
        assert!(v > 10.0, "expected overshoot past 10, got {}", v);
    }

    #[test]
    fn descending_range() {
        let v = interpolate(10.0, 0.0, 0.25, &EasingFn::default());
        assert!((v - 7.5).abs() < 1e-12);
    }

    #[test]
    fn snapshot_uses_per_property_easing() {
        let from = Snapshot::new().with("x", 0.0).with("y", 0.0);
        let to = Snapshot::new().with("x", 100.0).with("y", 100.0);
        let mut map = BTreeMap::new();
        map.insert("y".to_string(), Ease::from(Easing::QuadIn));

        let out = interpolate_state(&from, &to, 0.5, &EasingSpec::PerProperty(map), &EasingTable::new()).unwrap();
        assert!((out["x"] - 50.0).abs() < 1e-9);
        assert!((out["y"] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn custom_easing_by_value() {
        let from = Snapshot::new().with("v", 0.0);
        let to = Snapshot::new().with("v", 8.0);
        let spec = EasingSpec::from(EasingFn::custom(|t| t * t * t));

        let out = interpolate_state(&from, &to, 0.5, &spec, &EasingTable::new()).unwrap();
        assert!((out["v"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_keys_are_rejected() {
        let table = EasingTable::new();
        let spec = EasingSpec::default();
        let to = Snapshot::new().with("x", 1.0);

        let err = interpolate_state(&Snapshot::new(), &to, 0.5, &spec, &table).unwrap_err();
        assert!(matches!(err, ConfigError::MissingStart(n) if n == "x"));

        let from = Snapshot::new().with("x", 0.0).with("extra", 0.0);
        let err = interpolate_state(&from, &to, 0.5, &spec, &table).unwrap_err();
        assert!(matches!(err, ConfigError::UnexpectedStart(n) if n == "extra"));

        let err = interpolate_state(&from, &Snapshot::new(), 0.5, &spec, &table).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTarget));
    }

    #[test]
    fn unknown_easing_name_is_rejected() {
        let from = Snapshot::new().with("x", 0.0);
        let to = Snapshot::new().with("x", 1.0);
        let err = interpolate_state(&from, &to, 0.5, &EasingSpec::from("wobble"), &EasingTable::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEasing(_)));
    }
}
