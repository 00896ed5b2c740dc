//! Startup settings for the weather system.
//!
//! Loaded once from TOML. Every field has a default so an empty file is a
//! valid configuration.
//!
//! ```toml
//! density = 0.5
//! paused = false
//! seed = 7
//!
//! [overrides]
//! enabled = true
//!
//! [overrides.maps]
//! "maps/mp_railgun" = "T=SNOW,B=5 10,C=0.5,G=0.3 2,BV=20 30,GV=25 40,W=3 5,D=2000"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WeatherResult;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Top-level weather settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Density multiplier. Below 1 scales the drop count, 0 or less hides
    /// the full-sky effect.
    pub density: f32,
    /// Freezes simulation while still rendering.
    pub paused: bool,
    /// Seed for the simulation RNG stream.
    pub seed: u64,
    /// Map-specific effect overrides.
    pub overrides: MapOverrides,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            density: 1.0,
            paused: false,
            seed: DEFAULT_SEED,
            overrides: MapOverrides::default(),
        }
    }
}

impl WeatherSettings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WeatherError::Settings`] if the text is not valid TOML
    /// or a field has the wrong type.
    pub fn from_toml_str(text: &str) -> WeatherResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Forces a specific effect on named maps, regardless of what the map
/// authored. Disabled by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOverrides {
    /// Master switch.
    pub enabled: bool,
    /// Map identifier to effect specification string.
    pub maps: BTreeMap<String, String>,
}

impl MapOverrides {
    /// Returns the forced effect for `map`, if any. Map names compare
    /// case-insensitively.
    #[must_use]
    pub fn lookup(&self, map: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.maps
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(map))
            .map(|(_, spec)| spec.as_str())
    }

    /// Picks the effect string to activate for `map`: the override when one
    /// applies, otherwise the map-authored string.
    #[must_use]
    pub fn select<'a>(&'a self, map: &str, authored: Option<&'a str>) -> Option<&'a str> {
        match self.lookup(map) {
            Some(forced) => {
                tracing::info!("Map '{}' weather forced by override", map);
                Some(forced)
            }
            None => authored,
        }
    }
}
