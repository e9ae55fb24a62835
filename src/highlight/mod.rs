//! Highlight rule engine
//!
//! This module provides the host-independent core:
//! - the ordered rule store
//! - pattern matching that resolves matches to whole-line decorations
//! - the engine that applies, retracts and reconciles decorations
//! - the full / highlighted-only view swap

mod engine;
mod host;
mod matcher;
mod rule;
mod style;
mod view;

#[cfg(test)]
pub mod testing;

pub use engine::{EngineOptions, HighlightEngine};
pub use host::{DecorationHandle, DocumentHost};
pub use matcher::LineMap;
pub use rule::{Rule, RuleStore};
pub use style::{Color, Span, Style};
pub use view::{LinePrefix, ViewMode};
