//! Features implied by glyph name suffixes: `zero.zero`, `a.sc`, `f_f_i` ...

use fluxdrasil::{glyphs::GlyphSource, tags::Tag, types::GlyphName};
use fluxir::{
    computed::{ComputedRoutine, DerivationContext, Parameters, Procedure},
    graph::{GraphError, RoutineFeatureGraph, RoutineId},
    routine::Routine,
    rule::{glyph_slot, glyph_slots, Rule, Substitution},
};
use log::{debug, info, warn};
use regex::Regex;

use crate::{params, NAME_BASED_FEATURE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Derivation {
    /// `base -> base<suffix>`, optionally lower-casing the first letter of
    /// the base.
    Suffix { lowercase_first: bool },
    /// `a_b.liga -> a b`, plus the conventional `fi`, `fl`, `f_f`, ...
    Ligature,
}

/// A well-known name based feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// The `feature` parameter selecting this preset.
    pub key: &'static str,
    /// Name of the routine the installer creates.
    pub routine_name: &'static str,
    pub feature: Tag,
    /// Matched against the end of glyph names.
    pub pattern: &'static str,
    derivation: Derivation,
}

pub const SLASH_ZERO: Preset = Preset {
    key: "zero",
    routine_name: "SlashZero",
    feature: Tag::new(b"zero"),
    pattern: r"\.zero",
    derivation: Derivation::Suffix {
        lowercase_first: false,
    },
};

pub const SMALL_CAPS: Preset = Preset {
    key: "smcp",
    routine_name: "SmallCaps",
    feature: Tag::new(b"smcp"),
    pattern: r"\.sc",
    derivation: Derivation::Suffix {
        lowercase_first: true,
    },
};

pub const CAPS_TO_SMALL_CAPS: Preset = Preset {
    key: "c2sc",
    routine_name: "CapsToSmallCaps",
    feature: Tag::new(b"c2sc"),
    pattern: r"\.sc",
    derivation: Derivation::Suffix {
        lowercase_first: false,
    },
};

pub const STANDARD_LIGATURES: Preset = Preset {
    key: "liga",
    routine_name: "StandardLigatures",
    feature: Tag::new(b"liga"),
    pattern: r"\.liga|^fi|^fl|^f_f(_[il])?",
    derivation: Derivation::Ligature,
};

pub const PRESETS: [Preset; 4] = [SLASH_ZERO, SMALL_CAPS, CAPS_TO_SMALL_CAPS, STANDARD_LIGATURES];

impl Preset {
    pub fn by_key(key: &str) -> Option<Preset> {
        PRESETS.into_iter().find(|p| p.key == key)
    }

    fn regex(&self) -> Option<Regex> {
        suffix_regex(self.pattern)
    }

    /// Glyphs whose names this preset would derive rules from, in font order.
    pub fn matches(&self, font: &dyn GlyphSource) -> Vec<GlyphName> {
        let Some(re) = self.regex() else {
            return Vec::new();
        };
        font.names()
            .iter()
            .filter(|g| re.is_match(g.as_str()))
            .cloned()
            .collect()
    }

    /// A preset applies to a font that has at least one matching glyph.
    pub fn applicable(&self, font: &dyn GlyphSource) -> bool {
        !self.matches(font).is_empty()
    }

    pub fn rules(&self, font: &dyn GlyphSource) -> Vec<Rule> {
        let Some(re) = self.regex() else {
            return Vec::new();
        };
        match self.derivation {
            Derivation::Suffix { lowercase_first } => suffix_rules(font, &re, lowercase_first),
            Derivation::Ligature => ligature_rules(font, &re),
        }
    }

    /// Parameters of a computed routine that runs this preset.
    pub fn parameters(&self) -> Parameters {
        [("feature".to_string(), self.key.to_string())].into()
    }
}

/// Anchor a name pattern to the end of the glyph name.
fn suffix_regex(pattern: &str) -> Option<Regex> {
    params::compile("suffix", &format!("(?:{pattern})$"))
}

fn lowercase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `base -> suffixed` for every suffixed glyph whose base is also present.
fn suffix_rules(font: &dyn GlyphSource, re: &Regex, lowercase: bool) -> Vec<Rule> {
    font.names()
        .iter()
        .filter_map(|suffixed| {
            let found = re.find(suffixed.as_str())?;
            let stripped = &suffixed.as_str()[..found.start()];
            let base = if lowercase {
                lowercase_first(stripped)
            } else {
                stripped.to_string()
            };
            if !font.contains(&base) {
                debug!("No base glyph '{base}' for {suffixed}");
                return None;
            }
            Some(Substitution::single(base.as_str(), suffixed.clone()).into())
        })
        .collect()
}

/// The component glyphs of a ligature, going by its name.
fn ligature_components(ligature: &str) -> Vec<String> {
    if ligature == "fi" || ligature == "fl" {
        return ligature.chars().map(String::from).collect();
    }
    ligature
        .replace(".liga", "")
        .split('_')
        .map(str::to_string)
        .collect()
}

fn ligature_rules(font: &dyn GlyphSource, re: &Regex) -> Vec<Rule> {
    font.names()
        .iter()
        .filter(|g| re.is_match(g.as_str()))
        .filter_map(|ligature| {
            let components = ligature_components(ligature.as_str());
            if let Some(missing) = components.iter().find(|c| !font.contains(c)) {
                debug!("Not deriving {ligature}, there is no '{missing}'");
                return None;
            }
            Some(
                Substitution::new(
                    glyph_slots(components.iter().map(String::as_str)),
                    vec![glyph_slot(ligature.clone())],
                )
                .into(),
            )
        })
        .collect()
}

/// Derives suffix based substitutions.
///
/// Parameters: either `feature`, naming one of the [`PRESETS`], or a literal
/// `suffix` with an optional `lowercase_first` of `true`.
pub struct NameBasedFeature;

impl Procedure for NameBasedFeature {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        if let Some(key) = params::text(parameters, "feature") {
            let Some(preset) = Preset::by_key(key.trim()) else {
                warn!("No name based feature preset '{key}'");
                return Vec::new();
            };
            return preset.rules(context.font);
        }
        let Some(suffix) = params::text(parameters, "suffix") else {
            return Vec::new();
        };
        let Some(re) = suffix_regex(&regex::escape(suffix)) else {
            return Vec::new();
        };
        let lowercase = params::text(parameters, "lowercase_first") == Some("true");
        suffix_rules(context.font, &re, lowercase)
    }
}

/// Add a computed routine, in its feature, for every preset that applies.
///
/// Returns the new routines.
pub fn install_presets(
    graph: &mut RoutineFeatureGraph,
    font: &dyn GlyphSource,
) -> Result<Vec<RoutineId>, GraphError> {
    let mut installed = Vec::new();
    for preset in PRESETS {
        if !preset.applicable(font) {
            info!(
                "No glyphs match '{}', skipping {}",
                preset.pattern, preset.routine_name
            );
            continue;
        }
        let name = graph.unique_routine_name(preset.routine_name);
        let routine = Routine::computed(
            name,
            ComputedRoutine::new(NAME_BASED_FEATURE, preset.parameters()),
        );
        let id = graph.add_routine(routine)?;
        graph.add_to_feature(preset.feature, id)?;
        installed.push(id);
    }
    Ok(installed)
}
