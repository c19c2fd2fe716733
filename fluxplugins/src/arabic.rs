//! Arabic positional forms (init, medi, fina) and cursive attachment.
//!
//! Positional variants are found by naming convention: a pattern for each
//! form whose first capture group is the part of the name that marks the
//! form. Removing that part from a variant's name must give the name of the
//! isolated glyph it belongs to.

use std::fmt::{self, Display};

use fluxdrasil::{glyphs::GlyphSource, tags::Tag, types::GlyphName};
use fluxir::{
    classes::{GlyphClass, GlyphClassStore},
    computed::{ComputedRoutine, DerivationContext, Parameters, Procedure},
    graph::{GraphError, RoutineFeatureGraph, RoutineId},
    predicate::{NameComparator, Predicate},
    routine::Routine,
    rule::{Attachment, Rule, Substitution},
};
use indexmap::IndexMap;
use log::{debug, warn};
use regex::Regex;

use crate::{params, ARABIC_POSITIONAL};

const CURS: Tag = Tag::new(b"curs");
const ENTRY: &str = "entry";
const EXIT: &str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Init,
    Medi,
    Fina,
}

impl Form {
    pub const ALL: [Form; 3] = [Form::Init, Form::Medi, Form::Fina];

    /// The parameter, class and feature name of this form.
    pub fn key(&self) -> &'static str {
        match self {
            Form::Init => "init",
            Form::Medi => "medi",
            Form::Fina => "fina",
        }
    }

    pub fn feature(&self) -> Tag {
        match self {
            Form::Init => Tag::new(b"init"),
            Form::Medi => Tag::new(b"medi"),
            Form::Fina => Tag::new(b"fina"),
        }
    }

    pub fn routine_name(&self) -> &'static str {
        match self {
            Form::Init => "Init",
            Form::Medi => "Medi",
            Form::Fina => "Fina",
        }
    }

    fn from_key(key: &str) -> Option<Form> {
        Form::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// The name patterns identifying isolated glyphs and their positional forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalPatterns {
    pub isol: String,
    pub init: String,
    pub medi: String,
    pub fina: String,
}

impl PositionalPatterns {
    pub fn new(isol: &str, init: &str, medi: &str, fina: &str) -> Self {
        PositionalPatterns {
            isol: isol.to_string(),
            init: init.to_string(),
            medi: medi.to_string(),
            fina: fina.to_string(),
        }
    }

    /// Glyphs-style names: `beh-ar`, `beh-ar.init`, ...
    pub fn glyphs() -> Self {
        PositionalPatterns::new("-ar$", "-ar(.init)$", "-ar(.medi)$", "-ar(.fina)")
    }

    /// Qalmi-style names: `behu1`, `behi1`, ...
    pub fn qalmi() -> Self {
        PositionalPatterns::new("(u1)$", "(i1)$", "(m1)$", "(f1)$")
    }

    pub fn form(&self, form: Form) -> &str {
        match form {
            Form::Init => &self.init,
            Form::Medi => &self.medi,
            Form::Fina => &self.fina,
        }
    }

    fn from_parameters(parameters: &Parameters) -> Option<Self> {
        let get = |key| params::text(parameters, key).map(str::to_string);
        Some(PositionalPatterns {
            isol: get("isol")?,
            init: get("init")?,
            medi: get("medi")?,
            fina: get("fina")?,
        })
    }

    /// Parameters for a computed routine deriving `form`.
    pub fn parameters(&self, form: Form) -> Parameters {
        [
            ("isol", self.isol.as_str()),
            ("init", self.init.as_str()),
            ("medi", self.medi.as_str()),
            ("fina", self.fina.as_str()),
            ("form", form.key()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

/// Identify a known naming scheme in the font.
///
/// A scheme is recognised when each of its patterns matches more than one
/// glyph. Returns the scheme's name and patterns.
pub fn detect_naming_scheme(font: &dyn GlyphSource) -> Option<(&'static str, PositionalPatterns)> {
    [
        ("Glyphs", PositionalPatterns::glyphs()),
        ("Qalmi", PositionalPatterns::qalmi()),
    ]
    .into_iter()
    .find(|(_, patterns)| {
        [&patterns.isol, &patterns.init, &patterns.medi, &patterns.fina]
            .into_iter()
            .all(|pattern| match Regex::new(pattern) {
                Ok(re) => {
                    font.names()
                        .iter()
                        .filter(|g| re.is_match(g.as_str()))
                        .count()
                        > 1
                }
                Err(_) => false,
            })
    })
}

/// The name with the text of the first capture group removed.
///
/// None if the pattern doesn't match or captures nothing.
fn stripped(re: &Regex, name: &str) -> Option<String> {
    let group = re.captures(name)?.get(1)?;
    Some(name.replace(group.as_str(), ""))
}

struct CompiledPatterns {
    isol: Regex,
    init: Regex,
    medi: Regex,
    fina: Regex,
}

impl CompiledPatterns {
    fn new(patterns: &PositionalPatterns) -> Option<Self> {
        Some(CompiledPatterns {
            isol: params::compile("isol", &patterns.isol)?,
            init: params::compile("init", &patterns.init)?,
            medi: params::compile("medi", &patterns.medi)?,
            fina: params::compile("fina", &patterns.fina)?,
        })
    }

    fn form(&self, form: Form) -> &Regex {
        match form {
            Form::Init => &self.init,
            Form::Medi => &self.medi,
            Form::Fina => &self.fina,
        }
    }
}

/// Isolated glyphs paired with their positional variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionalForms {
    pub init: Vec<(GlyphName, GlyphName)>,
    pub medi: Vec<(GlyphName, GlyphName)>,
    pub fina: Vec<(GlyphName, GlyphName)>,
}

impl PositionalForms {
    pub fn pairs(&self, form: Form) -> &[(GlyphName, GlyphName)] {
        match form {
            Form::Init => &self.init,
            Form::Medi => &self.medi,
            Form::Fina => &self.fina,
        }
    }

    fn pairs_mut(&mut self, form: Form) -> &mut Vec<(GlyphName, GlyphName)> {
        match form {
            Form::Init => &mut self.init,
            Form::Medi => &mut self.medi,
            Form::Fina => &mut self.fina,
        }
    }

    /// One `isolated -> variant` substitution per pair.
    pub fn rules(&self, form: Form) -> Vec<Rule> {
        self.pairs(form)
            .iter()
            .map(|(isol, variant)| Substitution::single(isol.clone(), variant.clone()).into())
            .collect()
    }
}

/// Pair every isolated glyph with its positional variants.
///
/// Both glyphs and candidates are visited in font order and the first
/// candidate whose stripped name equals the isolated glyph's wins. Further
/// candidates are ambiguities; they are logged and otherwise ignored.
/// Returns None if a pattern is not a valid regular expression.
pub fn derive_forms(font: &dyn GlyphSource, patterns: &PositionalPatterns) -> Option<PositionalForms> {
    let compiled = CompiledPatterns::new(patterns)?;
    let names = font.names();
    let candidates: Vec<&GlyphName> = names
        .iter()
        .filter(|g| {
            let g = g.as_str();
            compiled.init.is_match(g) || compiled.medi.is_match(g) || compiled.fina.is_match(g)
        })
        .collect();

    let mut forms = PositionalForms::default();
    for glyph in names {
        let Some(found) = compiled.isol.captures(glyph.as_str()) else {
            continue;
        };
        let base = match found.get(1) {
            Some(group) => glyph.as_str().replace(group.as_str(), ""),
            None => glyph.to_string(),
        };
        for form in Form::ALL {
            let re = compiled.form(form);
            let mut matching = candidates
                .iter()
                .filter(|c| stripped(re, c.as_str()).as_deref() == Some(base.as_str()));
            let Some(variant) = matching.next() else {
                continue;
            };
            for other in matching {
                warn!(
                    "{glyph} has more than one {} form, using {variant} rather than {other}",
                    form.key()
                );
            }
            forms
                .pairs_mut(form)
                .push((glyph.clone(), (*variant).clone()));
        }
    }
    Some(forms)
}

/// Thresholds for deciding whether a derived class looks wrong.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plausibility {
    pub min_class_size: usize,
    /// Largest believable class, as a fraction of the font's glyph count.
    pub max_fraction: f64,
}

impl Default for Plausibility {
    fn default() -> Self {
        Plausibility {
            min_class_size: 10,
            max_fraction: 0.5,
        }
    }
}

/// A derived class that is suspiciously small or large.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlausibilityWarning {
    pub form: Form,
    pub pattern: String,
    pub count: usize,
}

impl Display for PlausibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pattern '{}' matched a surprising number of glyphs ({})",
            self.form.routine_name(),
            self.pattern,
            self.count
        )
    }
}

pub fn check_plausibility(
    forms: &PositionalForms,
    patterns: &PositionalPatterns,
    glyph_count: usize,
    limits: Plausibility,
) -> Vec<PlausibilityWarning> {
    let max = glyph_count as f64 * limits.max_fraction;
    Form::ALL
        .into_iter()
        .filter_map(|form| {
            let count = forms.pairs(form).len();
            (count < limits.min_class_size || count as f64 > max).then(|| PlausibilityWarning {
                form,
                pattern: patterns.form(form).to_string(),
                count,
            })
        })
        .collect()
}

/// Cursive attachment between every glyph's `entry` and `exit` anchors.
///
/// None if no glyph has either anchor.
pub fn cursive_attachment(font: &dyn GlyphSource) -> Option<Rule> {
    let mut entries = IndexMap::new();
    let mut exits = IndexMap::new();
    for glyph in font.names() {
        let anchors = font.anchors(glyph.as_str());
        if let Some(entry) = anchors.iter().find(|a| a.name == ENTRY) {
            entries.insert(glyph.clone(), entry.pos);
        }
        if let Some(exit) = anchors.iter().find(|a| a.name == EXIT) {
            exits.insert(glyph.clone(), exit.pos);
        }
    }
    if entries.is_empty() && exits.is_empty() {
        debug!("No {ENTRY} or {EXIT} anchors, no cursive attachment");
        return None;
    }
    Some(
        Attachment {
            base_anchor: ENTRY.into(),
            mark_anchor: EXIT.into(),
            bases: entries,
            marks: exits,
            ..Default::default()
        }
        .into(),
    )
}

/// Derives one positional form.
///
/// Parameters: `isol`, `init`, `medi`, `fina` patterns and the `form` to
/// derive.
pub struct ArabicPositional;

impl Procedure for ArabicPositional {
    fn derive(&self, context: &DerivationContext, parameters: &Parameters) -> Vec<Rule> {
        let Some(form) = params::text(parameters, "form") else {
            return Vec::new();
        };
        let Some(form) = Form::from_key(form.trim()) else {
            warn!("'{form}' is not a positional form");
            return Vec::new();
        };
        let Some(patterns) = PositionalPatterns::from_parameters(parameters) else {
            return Vec::new();
        };
        derive_forms(context.font, &patterns)
            .map(|forms| forms.rules(form))
            .unwrap_or_default()
    }
}

/// The result of examining a font for positional forms, to be reviewed
/// before anything is added to a project.
#[derive(Debug, Clone)]
pub struct ArabicPlan {
    pub patterns: PositionalPatterns,
    pub forms: PositionalForms,
    pub warnings: Vec<PlausibilityWarning>,
    /// The cursive attachment rule, if the font has entry or exit anchors.
    pub cursive: Option<Rule>,
}

/// What [`ArabicPlan::install`] added.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledArabic {
    pub routines: Vec<RoutineId>,
    pub cursive: Option<RoutineId>,
    pub classes: Vec<String>,
}

impl ArabicPlan {
    /// Derive everything, without touching a project.
    ///
    /// None if a pattern is malformed.
    pub fn prepare(
        font: &dyn GlyphSource,
        patterns: PositionalPatterns,
        limits: Plausibility,
    ) -> Option<ArabicPlan> {
        let forms = derive_forms(font, &patterns)?;
        let warnings = check_plausibility(&forms, &patterns, font.names().len(), limits);
        for warning in warnings.iter() {
            warn!("{warning}");
        }
        Some(ArabicPlan {
            patterns,
            forms,
            warnings,
            cursive: cursive_attachment(font),
        })
    }

    /// Add the positional routines, their features and classes, and if
    /// asked the cursive attachment routine.
    ///
    /// Classes named `init`, `medi` or `fina` that already exist are left
    /// alone.
    pub fn install(
        &self,
        graph: &mut RoutineFeatureGraph,
        classes: &mut GlyphClassStore,
        with_cursive: bool,
    ) -> Result<InstalledArabic, GraphError> {
        let mut installed = InstalledArabic {
            routines: Vec::new(),
            cursive: None,
            classes: Vec::new(),
        };
        for form in Form::ALL {
            let name = graph.unique_routine_name(form.routine_name());
            let routine = Routine::computed(
                name,
                ComputedRoutine::new(ARABIC_POSITIONAL, self.patterns.parameters(form)),
            );
            let id = graph.add_routine(routine)?;
            graph.add_to_feature(form.feature(), id)?;
            installed.routines.push(id);

            let class = GlyphClass::Automatic(vec![Predicate::name(
                NameComparator::Matches,
                self.patterns.form(form),
            )]);
            if classes.define(form.key(), class).is_ok() {
                installed.classes.push(form.key().to_string());
            } else {
                debug!("Keeping the existing @{} class", form.key());
            }
        }
        if let Some(rule) = self.cursive.as_ref().filter(|_| with_cursive) {
            let name = graph.unique_routine_name("CursiveAttachment");
            let id = graph.add_routine(Routine::manual(name, vec![rule.clone()]))?;
            graph.add_to_feature(CURS, id)?;
            installed.cursive = Some(id);
        }
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use fluxdrasil::glyphs::{GlyphInfo, GlyphSet};
    use pretty_assertions::assert_eq;

    use crate::default_registry;

    use super::*;

    fn rule_text(rules: &[Rule]) -> Vec<String> {
        rules.iter().map(Rule::to_string).collect()
    }

    #[test]
    fn one_rule_per_position() {
        let font = GlyphSet::from_names([
            "beh-ar",
            "beh-ar.init",
            "beh-ar.medi",
            "beh-ar.fina",
            "extra-ar.init",
        ]);
        let patterns = PositionalPatterns::new("-ar$", "-ar(.init)$", "-ar(.medi)$", "-ar(.fina)$");
        let forms = derive_forms(&font, &patterns).unwrap();

        assert_eq!(vec!["beh-ar -> beh-ar.init"], rule_text(&forms.rules(Form::Init)));
        assert_eq!(vec!["beh-ar -> beh-ar.medi"], rule_text(&forms.rules(Form::Medi)));
        assert_eq!(vec!["beh-ar -> beh-ar.fina"], rule_text(&forms.rules(Form::Fina)));
        let variants: Vec<_> = Form::ALL
            .into_iter()
            .flat_map(|form| forms.pairs(form).iter().map(|(_, v)| v.as_str()))
            .collect();
        assert!(!variants.contains(&"extra-ar.init"));
    }

    #[test]
    fn first_candidate_wins() {
        // "." in the pattern lets both candidates strip to "beh-ar"
        let font = GlyphSet::from_names(["beh-ar", "beh-arxinit", "beh-ar.init"]);
        let patterns = PositionalPatterns::new("-ar$", "-ar(.init)$", "-ar(.medi)$", "-ar(.fina)$");
        let forms = derive_forms(&font, &patterns).unwrap();
        let expected: Vec<(GlyphName, GlyphName)> = vec![("beh-ar".into(), "beh-arxinit".into())];
        assert_eq!(expected, forms.init);
    }

    #[test]
    fn qalmi_names() {
        let font = GlyphSet::from_names(["behu1", "behi1", "behm1", "behf1", "alefu1", "aleff1"]);
        let forms = derive_forms(&font, &PositionalPatterns::qalmi()).unwrap();
        assert_eq!(vec!["behu1 -> behi1"], rule_text(&forms.rules(Form::Init)));
        assert_eq!(
            vec!["behu1 -> behf1", "alefu1 -> aleff1"],
            rule_text(&forms.rules(Form::Fina))
        );
    }

    #[test]
    fn malformed_pattern_derives_nothing() {
        let font = GlyphSet::from_names(["beh-ar", "beh-ar.init"]);
        let patterns = PositionalPatterns::new("-ar$", "-ar(.init$", "-ar(.medi)$", "-ar(.fina)$");
        assert_eq!(None, derive_forms(&font, &patterns));
    }

    #[test]
    fn detect_schemes() {
        let glyphs = GlyphSet::from_names([
            "beh-ar", "beh-ar.init", "beh-ar.medi", "beh-ar.fina", "teh-ar", "teh-ar.init",
            "teh-ar.medi", "teh-ar.fina",
        ]);
        assert_eq!(
            Some(("Glyphs", PositionalPatterns::glyphs())),
            detect_naming_scheme(&glyphs)
        );
        let qalmi = GlyphSet::from_names([
            "behu1", "behi1", "behm1", "behf1", "tehu1", "tehi1", "tehm1", "tehf1",
        ]);
        assert_eq!(
            Some(("Qalmi", PositionalPatterns::qalmi())),
            detect_naming_scheme(&qalmi)
        );
        // one of each isn't enough to go on
        let sparse = GlyphSet::from_names(["beh-ar", "beh-ar.init", "beh-ar.medi", "beh-ar.fina"]);
        assert_eq!(None, detect_naming_scheme(&sparse));
    }

    #[test]
    fn plausibility() {
        let font = GlyphSet::from_names(["beh-ar", "beh-ar.init", "beh-ar.medi", "beh-ar.fina"]);
        let patterns = PositionalPatterns::glyphs();
        let forms = derive_forms(&font, &patterns).unwrap();
        let warnings = check_plausibility(&forms, &patterns, font.len(), Plausibility::default());
        assert_eq!(
            vec![Form::Init, Form::Medi, Form::Fina],
            warnings.iter().map(|w| w.form).collect::<Vec<_>>()
        );
        assert_eq!(
            "Init pattern '-ar(.init)$' matched a surprising number of glyphs (1)",
            warnings[0].to_string()
        );

        let relaxed = Plausibility {
            min_class_size: 1,
            max_fraction: 0.5,
        };
        assert!(check_plausibility(&forms, &patterns, font.len(), relaxed).is_empty());
        // 1 of 4 glyphs is fine, 1 of 1 is too many
        assert_eq!(3, check_plausibility(&forms, &patterns, 1, relaxed).len());
    }

    fn joining_font() -> GlyphSet {
        let mut font = GlyphSet::new();
        for name in ["beh-ar", "beh-ar.init", "beh-ar.medi", "beh-ar.fina", "alef-ar", "alef-ar.fina"] {
            let info = GlyphInfo::new(300.0);
            let info = if name.ends_with(".init") || name.ends_with(".medi") {
                info.with_anchor("exit", 0.0, 20.0)
            } else {
                info
            };
            let info = if name.ends_with(".medi") || name.ends_with(".fina") {
                info.with_anchor("entry", 300.0, 20.0)
            } else {
                info
            };
            font.insert(name, info);
        }
        font
    }

    #[test]
    fn cursive_attachment_collects_anchors() {
        let font = joining_font();
        let Some(Rule::Attachment(attachment)) = cursive_attachment(&font) else {
            panic!("expected an attachment rule");
        };
        assert_eq!("entry", attachment.base_anchor);
        let entries: Vec<_> = attachment.bases.keys().map(|g| g.as_str()).collect();
        assert_eq!(vec!["beh-ar.medi", "beh-ar.fina", "alef-ar.fina"], entries);
        let exits: Vec<_> = attachment.marks.keys().map(|g| g.as_str()).collect();
        assert_eq!(vec!["beh-ar.init", "beh-ar.medi"], exits);

        assert_eq!(None, cursive_attachment(&GlyphSet::from_names(["a"])));
    }

    #[test]
    fn install_positionals() {
        let font = joining_font();
        let mut graph = RoutineFeatureGraph::new();
        let mut classes = GlyphClassStore::new();
        classes
            .define("medi", GlyphClass::Manual(vec!["beh-ar.medi".into()]))
            .unwrap();

        let plan = ArabicPlan::prepare(&font, PositionalPatterns::glyphs(), Plausibility::default())
            .unwrap();
        assert_eq!(3, plan.warnings.len());
        let installed = plan.install(&mut graph, &mut classes, true).unwrap();

        assert_eq!(3, installed.routines.len());
        assert_eq!(vec!["init", "fina"], installed.classes);
        assert!(!classes.get("medi").unwrap().is_automatic());
        for (form, id) in Form::ALL.into_iter().zip(installed.routines.iter()) {
            assert_eq!(Some(&[*id][..]), graph.feature(form.feature()));
        }
        let cursive = installed.cursive.unwrap();
        assert_eq!(Some(&[cursive][..]), graph.feature(CURS));

        // the routines are computed, so they follow the font
        let registry = default_registry();
        let context = DerivationContext::new(&font, &classes);
        let fina = graph.routine(installed.routines[2]).unwrap();
        assert!(fina.is_computed());
        assert_eq!(
            vec!["beh-ar -> beh-ar.fina", "alef-ar -> alef-ar.fina"],
            rule_text(fina.rules(&registry, &context))
        );
        assert_eq!(
            Some(vec!["beh-ar.init".into()]),
            classes.resolve("init", &font)
        );
    }

    #[test]
    fn install_without_cursive() {
        let font = joining_font();
        let mut graph = RoutineFeatureGraph::new();
        let mut classes = GlyphClassStore::new();
        let plan = ArabicPlan::prepare(&font, PositionalPatterns::glyphs(), Plausibility::default())
            .unwrap();
        let installed = plan.install(&mut graph, &mut classes, false).unwrap();
        assert_eq!(None, installed.cursive);
        assert_eq!(None, graph.feature(CURS));
        assert_eq!(3, graph.len());
    }
}
