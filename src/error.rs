//! Error types shared across the crate.

use crate::calculator::Slot;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the local key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read `{key}` from {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{key}` to {path}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value under `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// User-visible notices raised by calculator actions.
///
/// None of these mutate state; the caller shows the message and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("slot {0} is empty")]
    EmptySlot(Slot),

    #[error("there is no valid result to save")]
    NothingToSave,

    #[error("unknown memory slot `{0}` (expected A-L)")]
    UnknownSlot(String),

    #[error("no history entry #{0}")]
    NoSuchEntry(usize),

    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// Failures of the unit converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("`{0}` is not a number")]
    InvalidValue(String),

    #[error("unknown unit `{0}`")]
    UnknownUnit(String),

    #[error("conversion failed: {0}")]
    Engine(String),
}

/// Failures while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot find the user configuration directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
