//! # Effect Specification
//!
//! Parses the authored `KEY=value[ value2],...` string into an immutable
//! [`EffectSpec`]. Parsing finishes before anything is applied, so a bad
//! string never leaves a half-configured effect behind.
//!
//! | Key  | Meaning                         | Default     |
//! |------|---------------------------------|-------------|
//! | `T`  | `RAIN` or `SNOW`, must be first | required    |
//! | `B`  | base phase seconds              | `5 10`      |
//! | `C`  | change phase seconds            | `1 1`       |
//! | `G`  | gust phase seconds              | `0 2`       |
//! | `BV` | base wind x y                   | `0 0`       |
//! | `GV` | gust wind x y                   | `100 100`   |
//! | `W`  | base and gust weight            | `0.7 1.5`   |
//! | `D`  | base and gust drop target       | `300 300`   |
//! | `H`  | ceiling above the viewer        | `0` (none)  |

use std::fmt;
use std::str::FromStr;

use squall_shared::constants::{
    ATMOSPHERIC_RAIN_SPEED, ATMOSPHERIC_SNOW_SPEED, MAX_ATMOSPHERIC_PARTICLES,
};
use squall_shared::Vec3;

use crate::error::EffectSpecError;
use crate::gust::{GustExtremes, GustTiming};

/// Which full-sky precipitation an effect produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrecipitationKind {
    /// Falling streaks.
    Rain,
    /// Tumbling flakes.
    Snow,
}

impl PrecipitationKind {
    /// Downward speed contributed to the wind vector.
    #[must_use]
    pub const fn fall_speed(self) -> f32 {
        match self {
            Self::Rain => ATMOSPHERIC_RAIN_SPEED,
            Self::Snow => ATMOSPHERIC_SNOW_SPEED,
        }
    }

    /// Name of the primary material; fallbacks append `1`, `2`, ...
    #[must_use]
    pub const fn material_base(self) -> &'static str {
        match self {
            Self::Rain => "gfx/misc/raindrop",
            Self::Snow => "gfx/misc/snow",
        }
    }

    /// Name of the material in slot `index`.
    #[must_use]
    pub fn material_name(self, index: usize) -> String {
        if index == 0 {
            self.material_base().to_owned()
        } else {
            format!("{}{index}", self.material_base())
        }
    }
}

impl fmt::Display for PrecipitationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rain => f.write_str("rain"),
            Self::Snow => f.write_str("snow"),
        }
    }
}

/// A validated effect configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSpec {
    /// Precipitation kind.
    pub kind: PrecipitationKind,
    /// Phase duration ranges.
    pub timing: GustTiming,
    /// Base and gust wind, weights and drop targets.
    pub extremes: GustExtremes,
    /// Maximum spawn height above the viewer. Zero disables the ceiling.
    pub height_offset: f32,
}

impl EffectSpec {
    /// Default configuration for `kind`.
    #[must_use]
    pub fn new(kind: PrecipitationKind) -> Self {
        let fall = -kind.fall_speed();
        Self {
            kind,
            timing: GustTiming::default(),
            extremes: GustExtremes {
                base_wind: Vec3::new(0.0, 0.0, fall),
                gust_wind: Vec3::new(100.0, 100.0, fall),
                base_weight: 0.7,
                gust_weight: 1.5,
                base_drops: 300,
                gust_drops: 300,
            },
            height_offset: 0.0,
        }
    }

    /// Size of the drop array: the larger drop target, capped.
    #[must_use]
    pub fn num_drops(&self) -> i32 {
        let most = self.extremes.base_drops.max(self.extremes.gust_drops);
        most.min(i32::try_from(MAX_ATMOSPHERIC_PARTICLES).unwrap_or(i32::MAX))
    }

    /// Parses an effect string.
    ///
    /// Keys and the type value are case-insensitive. Tokens without `=`
    /// are skipped; unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// Fails when there is no `KEY=value` pair, the first pair is not a
    /// supported `T=` type, or a value is not a number.
    pub fn parse(text: &str) -> Result<Self, EffectSpecError> {
        let mut pairs = text
            .split(',')
            .filter_map(|token| token.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()));

        let (key, value) = pairs.next().ok_or(EffectSpecError::Empty)?;
        if !key.eq_ignore_ascii_case("T") {
            return Err(EffectSpecError::MissingType(key.to_owned()));
        }
        let kind = if value.eq_ignore_ascii_case("RAIN") {
            PrecipitationKind::Rain
        } else if value.eq_ignore_ascii_case("SNOW") {
            PrecipitationKind::Snow
        } else {
            return Err(EffectSpecError::UnsupportedType(value.to_owned()));
        };

        let mut spec = Self::new(kind);
        let mut base = (5.0, 10.0);
        let mut change = (1.0, 1.0);
        let mut gust = (0.0, 2.0);

        for (key, value) in pairs {
            let key_upper = key.to_ascii_uppercase();
            let target = match key_upper.as_str() {
                "B" => &mut base,
                "C" => &mut change,
                "G" => &mut gust,
                "BV" | "GV" | "W" | "D" | "H" => {
                    let pair = parse_pair(key, value)?;
                    spec.apply(&key_upper, pair);
                    continue;
                }
                _ => {
                    tracing::warn!("Unknown effect key '{}'", key);
                    continue;
                }
            };
            *target = parse_pair(key, value)?;
        }

        spec.timing = GustTiming {
            base_min_ms: seconds_to_ms(base.0),
            base_max_ms: seconds_to_ms(base.1),
            change_min_ms: seconds_to_ms(change.0),
            change_max_ms: seconds_to_ms(change.1),
            gust_min_ms: seconds_to_ms(gust.0),
            gust_max_ms: seconds_to_ms(gust.1),
        };
        Ok(spec)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn apply(&mut self, key: &str, (a, b): (f32, f32)) {
        if key == "H" {
            // Whole units; the second value wins when two are given.
            self.height_offset = b.trunc().max(0.0);
            return;
        }
        let e = &mut self.extremes;
        match key {
            "BV" => (e.base_wind.x, e.base_wind.y) = (a, b),
            "GV" => (e.gust_wind.x, e.gust_wind.y) = (a, b),
            "W" => (e.base_weight, e.gust_weight) = (a, b),
            "D" => (e.base_drops, e.gust_drops) = (a as i32, b as i32),
            _ => {}
        }
    }
}

impl FromStr for EffectSpec {
    type Err = EffectSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses `a` or `a b`. A single value fills both slots.
fn parse_pair(key: &str, value: &str) -> Result<(f32, f32), EffectSpecError> {
    let number = |text: &str| {
        text.parse::<f32>()
            .map_err(|_| EffectSpecError::InvalidNumber {
                key: key.to_owned(),
                value: value.to_owned(),
            })
    };
    match value.split_once(' ') {
        Some((first, second)) => Ok((number(first)?, number(second.trim())?)),
        None => {
            let v = number(value)?;
            Ok((v, v))
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_ms(seconds: f32) -> u32 {
    (seconds * 1000.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec: EffectSpec = "T=RAIN".parse().unwrap();
        assert_eq!(spec.kind, PrecipitationKind::Rain);
        assert_eq!(spec.timing, GustTiming::default());
        assert_eq!(spec.extremes.base_wind, Vec3::new(0.0, 0.0, -ATMOSPHERIC_RAIN_SPEED));
        assert_eq!(spec.extremes.gust_wind, Vec3::new(100.0, 100.0, -ATMOSPHERIC_RAIN_SPEED));
        assert_eq!(spec.num_drops(), 300);
        assert!(spec.height_offset.abs() < f32::EPSILON);
    }

    #[test]
    fn test_full_snow_string() {
        let spec = EffectSpec::parse(
            "t=snow,B=5 7,C=0.2,G=0.1 5,BV=15 25,GV=25 40,W=3 5,H=512,D=2000",
        )
        .unwrap();
        assert_eq!(spec.kind, PrecipitationKind::Snow);
        assert_eq!(spec.timing.base_min_ms, 5_000);
        assert_eq!(spec.timing.base_max_ms, 7_000);
        assert_eq!(spec.timing.change_min_ms, 200);
        assert_eq!(spec.timing.change_max_ms, 200);
        assert_eq!(spec.timing.gust_min_ms, 100);
        assert_eq!(spec.extremes.base_wind, Vec3::new(15.0, 25.0, -ATMOSPHERIC_SNOW_SPEED));
        assert_eq!(spec.extremes.gust_wind, Vec3::new(25.0, 40.0, -ATMOSPHERIC_SNOW_SPEED));
        assert!((spec.extremes.gust_weight - 5.0).abs() < f32::EPSILON);
        assert!((spec.height_offset - 512.0).abs() < f32::EPSILON);
        assert_eq!(spec.num_drops(), 2000);
    }

    #[test]
    fn test_drop_count_is_capped() {
        let spec = EffectSpec::parse("T=RAIN,D=1000 9000").unwrap();
        assert_eq!(spec.num_drops(), 4000);
    }

    #[test]
    fn test_negative_ceiling_is_ignored() {
        let spec = EffectSpec::parse("T=RAIN,H=-40").unwrap();
        assert!(spec.height_offset.abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_keys_and_bare_tokens_are_skipped() {
        let spec = EffectSpec::parse("T=RAIN,junk,X=1,D=50").unwrap();
        assert_eq!(spec.num_drops(), 50);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(EffectSpec::parse("FOO"), Err(EffectSpecError::Empty));
        assert_eq!(
            EffectSpec::parse("D=300,T=RAIN"),
            Err(EffectSpecError::MissingType("D".into()))
        );
        assert_eq!(
            EffectSpec::parse("T=HAIL"),
            Err(EffectSpecError::UnsupportedType("HAIL".into()))
        );
        assert!(matches!(
            EffectSpec::parse("T=SNOW,W=heavy"),
            Err(EffectSpecError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_material_names() {
        assert_eq!(PrecipitationKind::Rain.material_name(0), "gfx/misc/raindrop");
        assert_eq!(PrecipitationKind::Snow.material_name(3), "gfx/misc/snow3");
    }
}
