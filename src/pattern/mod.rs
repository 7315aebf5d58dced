//! URL-template engine
//!
//! This module implements the two leaf components of the gateway:
//! compiling a route template into an immutable [`UrlPattern`]
//! (path segments plus query bindings), and rendering a compiled
//! pattern back into a concrete relative URL from a variable map.
//!
//! Patterns are compiled once at startup and never mutated, so they
//! can be shared across concurrent requests without locking.

pub mod compiled;
pub mod render;

pub use compiled::{PathSegment, PatternError, QueryKey, UrlPattern, VariableName};
pub use render::VariableMap;
