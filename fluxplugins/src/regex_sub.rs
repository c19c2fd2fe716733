//! Substitutions between glyphs whose names are related by a regex rewrite.

use fluxir::{
    computed::{DerivationContext, Parameters, Procedure},
    rule::{glyph_slot, GlyphRef, Rule, Substitution},
};
use log::trace;

use crate::params;

/// Parameters: `filter` selects glyphs, `match` and `replace` rewrite their
/// names (`$1` style replacement), `before` and `after` are optional space
/// separated glyphs or classes added as extra input slots.
pub struct RegexSubstitution;

impl Procedure for RegexSubstitution {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        let Some(filter) = params::regex(parameters, "filter") else {
            return Vec::new();
        };
        let Some(find) = params::regex(parameters, "match") else {
            return Vec::new();
        };
        let replace = parameters.get("replace").map(String::as_str).unwrap_or("");
        let before = params::glyph_refs(parameters, "before");
        let after = params::glyph_refs(parameters, "after");
        let as_slots = |refs: &[GlyphRef]| refs.iter().map(|r| vec![r.clone()]).collect::<Vec<_>>();

        let font = context.font;
        font.names()
            .iter()
            .filter(|g| filter.is_match(g.as_str()))
            .filter_map(|glyph| {
                let renamed = find.replace_all(glyph.as_str(), replace);
                if !font.contains(&renamed) {
                    trace!("{glyph} would become '{renamed}', which isn't in the font");
                    return None;
                }
                let mut input = as_slots(&before);
                input.push(glyph_slot(glyph.clone()));
                input.extend(as_slots(&after));
                Some(Substitution::new(input, vec![glyph_slot(&*renamed)]).into())
            })
            .collect()
    }
}
