//! Reading procedure parameters.
//!
//! Parameters are user-entered strings. Anything missing or malformed is
//! logged and treated as "no rules" by the caller, never as an error.

use fluxdrasil::types::GlyphName;
use fluxir::{
    computed::{DerivationContext, Parameters},
    rule::GlyphRef,
};
use log::{debug, warn};
use regex::Regex;

/// A non-empty parameter.
pub(crate) fn text<'a>(params: &'a Parameters, key: &str) -> Option<&'a str> {
    let value = params
        .get(key)
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty());
    if value.is_none() {
        debug!("Parameter '{key}' is missing");
    }
    value
}

/// A regular expression parameter; None if missing or malformed.
pub(crate) fn regex(params: &Parameters, key: &str) -> Option<Regex> {
    compile(key, text(params, key)?)
}

pub(crate) fn compile(what: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Ignoring {what} pattern '{pattern}': {e}");
            None
        }
    }
}

/// A space separated list of glyph names and `@class` references.
pub(crate) fn glyph_refs(params: &Parameters, key: &str) -> Vec<GlyphRef> {
    params
        .get(key)
        .map(|v| v.split_whitespace().map(GlyphRef::from).collect())
        .unwrap_or_default()
}

/// A glyph list parameter, with classes expanded against the font.
///
/// Glyphs the font doesn't have are dropped.
pub(crate) fn glyphs(context: &DerivationContext, params: &Parameters, key: &str) -> Vec<GlyphName> {
    glyph_refs(params, key)
        .iter()
        .flat_map(|glyph| context.classes.expand(glyph, context.font))
        .collect()
}
