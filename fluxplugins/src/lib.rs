//! Procedures that derive layout rules from the way a font names its glyphs.
//!
//! Each procedure is registered under a stable identifier; computed routines
//! store only that identifier and their parameters, so a project stays
//! portable as long as [`default_registry`] provides the same identifiers.

use fluxir::computed::ProcedureRegistry;

pub mod arabic;
pub mod indic;
pub mod name_based;
mod params;
pub mod regex_sub;

pub const NAME_BASED_FEATURE: &str = "NameBasedFeature";
pub const ARABIC_POSITIONAL: &str = "ArabicPositional";
pub const REGEX_SUBSTITUTION: &str = "RegexSubstitution";
pub const I_MATRA: &str = "IMatra";
pub const MEDIAL_RA: &str = "MedialRa";

/// A registry holding every procedure in this crate.
pub fn default_registry() -> ProcedureRegistry {
    let mut registry = ProcedureRegistry::new();
    registry.register(NAME_BASED_FEATURE, name_based::NameBasedFeature);
    registry.register(ARABIC_POSITIONAL, arabic::ArabicPositional);
    registry.register(REGEX_SUBSTITUTION, regex_sub::RegexSubstitution);
    registry.register(I_MATRA, indic::IMatra);
    registry.register(MEDIAL_RA, indic::MedialRa);
    registry
}
