//! # Weather Error Types
//!
//! Errors returned by configuration parsing. Nothing here is ever raised
//! from the per-frame path.

use thiserror::Error;

/// Errors produced while parsing an effect specification string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectSpecError {
    /// The string contained no `KEY=value` pair at all.
    #[error("effect string has no KEY=value pairs")]
    Empty,

    /// The first pair was not `T=<type>`.
    #[error("atmospheric effect must start with a type, found key '{0}'")]
    MissingType(String),

    /// The type was neither `RAIN` nor `SNOW`.
    #[error("only effect types 'rain' and 'snow' are supported, found '{0}'")]
    UnsupportedType(String),

    /// A numeric value could not be parsed.
    #[error("invalid number '{value}' for key '{key}'")]
    InvalidNumber {
        /// The key being parsed.
        key: String,
        /// The offending value text.
        value: String,
    },
}

/// Errors that can occur while configuring the weather system.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The effect specification string was rejected.
    #[error("effect specification rejected: {0}")]
    EffectSpec(#[from] EffectSpecError),

    /// The settings file could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),
}

/// Result type for weather configuration.
pub type WeatherResult<T> = Result<T, WeatherError>;
