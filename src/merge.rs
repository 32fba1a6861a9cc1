//! Merge strategies for template data
//!
//! Every layout in a stack contributes its data to one running context. How
//! a layout's keys combine with keys already in the context is decided by a
//! [`MergeStrategy`].

use std::fmt;

use serde_json::{Map, Value};

/// Key/value data attached to templates and passed to the renderer
pub type Data = Map<String, Value>;

/// Signature for a custom merge function: merge `source` into `target`
pub type MergeFn = fn(&mut Data, &Data);

/// How data from a later source combines with existing data
#[derive(Clone, Copy, Default)]
pub enum MergeStrategy {
    /// Recursively merge nested objects; the source wins on conflicts
    #[default]
    Deep,
    /// Replace top-level keys wholesale
    Shallow,
    /// Only fill keys the target doesn't have yet (recursively)
    KeepExisting,
    /// Caller-supplied function
    Custom(MergeFn),
}

impl MergeStrategy {
    /// Merge `source` into `target`
    pub fn merge(&self, target: &mut Data, source: &Data) {
        match self {
            Self::Deep => deep_merge(target, source),
            Self::Shallow => shallow_merge(target, source),
            Self::KeepExisting => keep_existing(target, source),
            Self::Custom(f) => f(target, source),
        }
    }
}

impl fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deep => f.write_str("Deep"),
            Self::Shallow => f.write_str("Shallow"),
            Self::KeepExisting => f.write_str("KeepExisting"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Recursively merge `source` into `target`, source values winning
pub fn deep_merge(target: &mut Data, source: &Data) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Copy top-level keys of `source` over `target`
pub fn shallow_merge(target: &mut Data, source: &Data) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

/// Fill in keys missing from `target`, descending into shared objects
pub fn keep_existing(target: &mut Data, source: &Data) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                keep_existing(existing, incoming);
            }
            (Some(_), _) => {}
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
