//! Layout resolution - walks layout references into an ordered stack

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::template::{LayoutRef, TemplateRegistry};

/// What to do when a layout chain revisits a name
///
/// A layout naming itself (directly, or through the default layout) always
/// ends the chain quietly under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Stop the chain before the repeated name
    #[default]
    Truncate,
    /// Fail with [`LayoutError::CircularLayout`]
    Error,
}

/// State carried through one resolution
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// Names in the order they were reached, starting layout first
    pub chain: Vec<String>,
    /// Set of names already on the chain (for cycle detection)
    pub visited: HashSet<String>,
}

impl ResolutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a layout is already on the chain
    pub fn is_visited(&self, name: &str) -> bool {
        self.visited.contains(name)
    }

    /// The most recently added layout
    pub fn previous(&self) -> Option<&str> {
        self.chain.last().map(String::as_str)
    }

    /// Add a layout to the chain
    pub fn visit(&mut self, name: &str) {
        self.visited.insert(name.to_string());
        self.chain.push(name.to_string());
    }

    /// Consume the context into fold order (outermost layout first)
    pub fn into_stack(self) -> Vec<String> {
        let mut stack = self.chain;
        stack.reverse();
        stack
    }
}

/// Resolve the stack of layouts for a starting reference
///
/// Follows each template's layout reference, applying `default_layout` where
/// a reference inherits. The walk stops quietly when a reference is
/// disabled, names a missing template, or repeats the previous name.
///
/// The returned stack is in fold order: the outermost layout comes first and
/// the starting layout last.
pub fn resolve_stack(
    start: &LayoutRef,
    registry: &TemplateRegistry,
    default_layout: Option<&str>,
    policy: CyclePolicy,
) -> Result<Vec<String>, LayoutError> {
    let mut ctx = ResolutionContext::new();
    let mut next = start.resolve(default_layout);

    while let Some(name) = next {
        if ctx.previous() == Some(name) {
            debug!(layout = name, "layout refers to itself, stopping");
            break;
        }

        if ctx.is_visited(name) {
            match policy {
                CyclePolicy::Truncate => {
                    debug!(layout = name, chain = ?ctx.chain, "circular layout chain, truncating");
                    break;
                }
                CyclePolicy::Error => {
                    let mut chain = ctx.chain;
                    chain.push(name.to_string());
                    return Err(LayoutError::circular(chain));
                }
            }
        }

        let Some(template) = registry.get(name) else {
            debug!(layout = name, "layout not registered, truncating stack");
            break;
        };

        ctx.visit(name);
        next = template.layout.resolve(default_layout);
    }

    Ok(ctx.into_stack())
}
