//! Loads a UFO into a [`fluxdrasil::glyphs::GlyphSet`].

pub mod error;
pub mod source;
