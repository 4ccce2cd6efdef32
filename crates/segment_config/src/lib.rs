//! # segment_config
//!
//! The option model for the deferred Segment client.
//!
//! This crate provides:
//!
//! - [`ConfigKey`]: the recognised option names and their wire spelling.
//! - [`OptionValue`]: dynamic values a host may supply for an option.
//! - [`ConfigPatch`]: an ordered set of option assignments (e.g. an injected
//!   config record).
//! - [`SegmentConfig`]: the typed, validated configuration record.
//! - [`ConfigModel`]: set/merge/validate with commit-on-success semantics.
//! - [`ConfigError`]: validation errors.

pub mod config;
pub mod error;
pub mod key;
pub mod model;
pub mod validate;
pub mod value;

pub use config::{DEFAULT_DEBUG_LEVEL, DEFAULT_METHODS, DEFAULT_TAG, SegmentConfig};
pub use error::ConfigError;
pub use key::ConfigKey;
pub use model::{ConfigModel, ConfigPatch};
pub use value::{
    Condition, ConditionFactory, Dependencies, InjectableCondition, LogFn, LogObject, LoggerRef,
    OptionValue, Predicate,
};
