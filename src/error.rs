use thiserror::Error;

/// Rejected configuration values.
///
/// These are the only failures the animation core knows about; everything at
/// runtime is clamped or ignored instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_shapes must be at least 1")]
    ZeroCapacity,

    #[error("frame period must be a positive number of seconds, got {0}")]
    InvalidFramePeriod(f64),

    #[error("invalid spawn delay: {0}")]
    InvalidDelay(String),

    #[error("radius range {min}..={max} is empty or zero")]
    InvalidRadius { min: u16, max: u16 },

    #[error("host refresh rate must be at least 1 Hz")]
    InvalidRefreshRate,

    #[error("unknown key binding {binding:?} for {action}")]
    UnknownKey { action: &'static str, binding: String },

    #[error("key {key} is bound to both {first} and {second}")]
    DuplicateKey {
        key: String,
        first: &'static str,
        second: &'static str,
    },
}
