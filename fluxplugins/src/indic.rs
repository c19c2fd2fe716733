//! Indic width-matched variants.
//!
//! A reordering I-matra sits before the consonant it belongs to, and a medial
//! ra after it. Both have variants of different widths, and the right one is
//! the variant whose ink is closest in width to the consonant.

use fluxdrasil::{glyphs::GlyphSource, types::GlyphName};
use fluxir::{
    computed::{DerivationContext, Parameters, Procedure},
    rule::{GlyphRef, Rule, Substitution},
};
use log::{debug, warn};

use crate::params;

/// Which side of the variant glyph the consonants are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// The consonant follows, as for the I-matra.
    After,
    /// The consonant precedes, as for medial ra.
    Before,
}

/// The index of the variant whose ink width is closest to `advance`.
///
/// Earlier variants win ties.
fn closest(advance: f64, widths: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, width) in widths.iter().enumerate() {
        let distance = (advance - width).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}

/// Group consonants by their closest variant, in variant order.
fn assign(
    font: &dyn GlyphSource,
    consonants: &[GlyphName],
    variants: &[GlyphName],
) -> Vec<(GlyphName, Vec<GlyphName>)> {
    let (variants, widths): (Vec<_>, Vec<_>) = variants
        .iter()
        .filter_map(|variant| {
            let Some(bounds) = font.metrics(variant.as_str()).and_then(|m| m.bounds) else {
                debug!("Variant {variant} has no outline, skipping it");
                return None;
            };
            Some((variant.clone(), bounds.width()))
        })
        .unzip();

    let mut groups: Vec<(GlyphName, Vec<GlyphName>)> =
        variants.into_iter().map(|v| (v, Vec::new())).collect();
    for consonant in consonants {
        let Some(metrics) = font.metrics(consonant.as_str()) else {
            debug!("No metrics for {consonant}, skipping it");
            continue;
        };
        if let Some(i) = closest(metrics.advance, &widths) {
            groups[i].1.push(consonant.clone());
        }
    }
    groups.retain(|(_, consonants)| !consonants.is_empty());
    groups
}

fn derive_variants(context: &DerivationContext, parameters: &Parameters, side: Side) -> Vec<Rule> {
    let Some(base) = params::glyphs(context, parameters, "base").into_iter().next() else {
        warn!("No base glyph to substitute");
        return Vec::new();
    };
    let consonants = params::glyphs(context, parameters, "consonants");
    let variants = params::glyphs(context, parameters, "variants");

    assign(context.font, &consonants, &variants)
        .into_iter()
        .map(|(variant, group)| {
            let around = vec![group.into_iter().map(GlyphRef::from).collect()];
            let mut sub = Substitution::single(base.clone(), variant);
            match side {
                Side::After => sub.postcontext = around,
                Side::Before => sub.precontext = around,
            }
            sub.into()
        })
        .collect()
}

/// Picks an I-matra variant for the following consonant.
///
/// Parameters: `consonants`, the `base` matra and its `variants`.
pub struct IMatra;

impl Procedure for IMatra {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        derive_variants(context, parameters, Side::After)
    }
}

/// Picks a medial ra variant for the preceding consonant.
///
/// Parameters as for [`IMatra`].
pub struct MedialRa;

impl Procedure for MedialRa {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        derive_variants(context, parameters, Side::Before)
    }
}
