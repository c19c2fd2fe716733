//! The editable model of a flux project: glyph classes, layout rules,
//! routines and the features that reference them.

pub mod classes;
pub mod computed;
pub mod error;
pub mod glyph_actions;
pub mod graph;
pub mod predicate;
pub mod project;
pub mod routine;
pub mod rule;
mod serde;
