//! Types shared by every part of flux: glyph names, feature tags and the
//! read-only view of a font's glyphs that rule derivation works against.

pub mod glyphs;
pub mod tags;
pub mod types;
