//! A project: glyph classes, routines, features and glyph actions for one font.
//!
//! Projects persist as a [`ProjectDocument`], written as YAML or, for files
//! ending `.json`, JSON. Routines are referenced by name in the document and
//! by [`RoutineId`] in memory; loading tolerates references to routines that
//! don't exist, dropping them and reporting a [`LoadWarning`].

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use fluxdrasil::{tags::parse_feature_tag, types::GlyphName};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    classes::{GlyphClass, GlyphClassStore},
    computed::{ComputedRoutine, Parameters},
    error::Error,
    glyph_actions::{GlyphAction, GlyphActions},
    graph::{unique_name, GraphError, RoutineFeatureGraph, RoutineId},
    predicate::Predicate,
    routine::{Routine, RoutineFlags, RoutineKind},
    rule::Rule,
};

/// Base name for routines that need a name only to be persisted.
const GENERATED_ROUTINE_NAME: &str = "Routine";

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// The font this project describes.
    pub source: PathBuf,
    /// Sample text for previewing the layout.
    pub debugging_text: String,
    pub classes: GlyphClassStore,
    pub graph: RoutineFeatureGraph,
    pub glyph_actions: GlyphActions,
}

impl Project {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Project {
            source: source.into(),
            debugging_text: String::new(),
            classes: Default::default(),
            graph: Default::default(),
            glyph_actions: Default::default(),
        }
    }

    /// Write the project to `path`.
    ///
    /// The source path is stored relative to the directory of `path` when it
    /// lies beneath it.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut doc = self.to_document();
        if let Some(dir) = path.parent() {
            if let Ok(relative) = self.source.strip_prefix(dir) {
                doc.source = relative.to_path_buf();
            }
        }
        let raw = if is_json(path) {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_yaml::to_string(&doc)?
        };
        fs::write(path, raw).map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a project from `path`, resolving its source against the
    /// directory `path` is in.
    pub fn load(path: &Path) -> Result<(Project, Vec<LoadWarning>), Error> {
        let raw = fs::read_to_string(path).map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut doc: ProjectDocument = if is_json(path) {
            serde_json::from_str(&raw)?
        } else {
            serde_yaml::from_str(&raw)?
        };
        if let Some(dir) = path.parent() {
            doc.source = dir.join(&doc.source);
        }
        Ok(Project::from_document(doc))
    }

    /// The persisted form of this project.
    ///
    /// Unnamed routines that something refers to are given a generated
    /// name, since the document refers to routines by name.
    pub fn to_document(&self) -> ProjectDocument {
        let names = persisted_names(&self.graph);
        let routine_name = |id: RoutineId| names.get(&id).cloned();

        let routines = self
            .graph
            .routines()
            .map(|(id, routine)| {
                let name = routine_name(id);
                let flags = routine.flags.bits();
                match routine.kind() {
                    RoutineKind::Manual(rules) => RoutineDocument::Manual {
                        name,
                        flags,
                        rules: rules
                            .iter()
                            .cloned()
                            .map(|rule| rule.map_routines(routine_name))
                            .collect(),
                    },
                    RoutineKind::Computed(computed) => RoutineDocument::Computed {
                        name,
                        flags,
                        procedure: computed.procedure().to_string(),
                        parameters: computed.parameters().clone(),
                    },
                    RoutineKind::Divider { comment } => RoutineDocument::Divider {
                        comment: comment.clone(),
                    },
                }
            })
            .collect();

        let features = self
            .graph
            .features()
            .map(|(tag, ids)| {
                (
                    tag.to_string(),
                    ids.iter().filter_map(|id| routine_name(*id)).collect(),
                )
            })
            .collect();

        ProjectDocument {
            source: self.source.clone(),
            debugging_text: self.debugging_text.clone(),
            classes: self
                .classes
                .iter()
                .map(|(name, class)| (name.to_string(), ClassDocument::from(class)))
                .collect(),
            routines,
            features,
            glyph_actions: self.glyph_actions.iter().cloned().collect(),
        }
    }

    /// Rebuild a project from its persisted form.
    ///
    /// Nothing short of a malformed document stops a load: references to
    /// routines that aren't there are dropped, clashing names are made
    /// unique, and each such repair is reported.
    pub fn from_document(doc: ProjectDocument) -> (Project, Vec<LoadWarning>) {
        let mut warnings = Vec::new();
        let mut project = Project::new(doc.source);
        project.debugging_text = doc.debugging_text;

        for (name, class) in doc.classes {
            for predicate in class.predicates.iter() {
                if let Some(reason) = predicate.invalid_reason() {
                    warnings.push(LoadWarning::MalformedPredicate {
                        class: name.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
            // names come from a map so are already unique
            let _ = project.classes.define(name, class.into());
        }

        // a repaired name must not take the name of a routine loaded later
        let doc_names: HashSet<String> = doc
            .routines
            .iter()
            .filter_map(RoutineDocument::name)
            .map(str::to_string)
            .collect();

        let mut by_name: HashMap<String, RoutineId> = HashMap::new();
        let mut pending_rules = Vec::new();
        for routine in doc.routines {
            let (routine, rules) = routine.into_routine();
            let name = routine.name().map(str::to_string);
            let routine = match &name {
                Some(name) if by_name.contains_key(name) => {
                    let graph = &project.graph;
                    let renamed = unique_name(name, |n| {
                        doc_names.contains(n) || graph.find_routine(n).is_some()
                    });
                    warnings.push(LoadWarning::DuplicateRoutineName {
                        name: name.clone(),
                        renamed: renamed.clone(),
                    });
                    rename(routine, renamed)
                }
                _ => routine,
            };
            let display_name = routine.name().unwrap_or_default().to_string();
            let id = match project.graph.add_routine(routine) {
                Ok(id) => id,
                Err(e) => {
                    warnings.push(LoadWarning::RejectedRoutine {
                        routine: display_name,
                        reason: e,
                    });
                    continue;
                }
            };
            if let Some(name) = name {
                by_name.entry(name).or_insert(id);
            }
            if let Some(rules) = rules {
                pending_rules.push((id, display_name, rules));
            }
        }

        // chaining rules may refer to routines defined after them
        for (id, routine_name, rules) in pending_rules {
            let rules: Vec<Rule> = rules
                .into_iter()
                .map(|rule| {
                    rule.map_routines(|target: String| {
                        let found = by_name.get(&target).copied();
                        if found.is_none() {
                            warnings.push(LoadWarning::DanglingChainingReference {
                                routine: routine_name.clone(),
                                target,
                            });
                        }
                        found
                    })
                })
                .collect();
            if let Some(existing) = project.graph.routine_mut(id).and_then(Routine::rules_mut) {
                *existing = rules;
            }
        }

        for (raw_tag, routine_names) in doc.features {
            let Ok(tag) = parse_feature_tag(&raw_tag) else {
                warnings.push(LoadWarning::InvalidFeatureTag(raw_tag));
                continue;
            };
            // an empty feature is still a feature
            let _ = project.graph.add_feature(tag);
            for routine in routine_names {
                let Some(id) = by_name.get(&routine).copied() else {
                    warnings.push(LoadWarning::DanglingFeatureReference {
                        feature: raw_tag.clone(),
                        routine,
                    });
                    continue;
                };
                if let Err(reason) = project.graph.add_to_feature(tag, id) {
                    warnings.push(LoadWarning::RejectedFeatureEntry {
                        feature: raw_tag.clone(),
                        routine,
                        reason,
                    });
                }
            }
        }

        project.glyph_actions = doc.glyph_actions.into_iter().collect();

        for warning in warnings.iter() {
            warn!("{warning}");
        }
        (project, warnings)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn rename(routine: Routine, name: String) -> Routine {
    let mut routine = routine;
    routine.set_name(Some(name));
    routine
}

/// The name each routine is written under.
fn persisted_names(graph: &RoutineFeatureGraph) -> HashMap<RoutineId, String> {
    let mut referenced: HashSet<RoutineId> = graph
        .features()
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();
    for (_, routine) in graph.routines() {
        if let RoutineKind::Manual(rules) = routine.kind() {
            for rule in rules {
                if let Rule::Chaining(chain) = rule {
                    referenced.extend(chain.lookups.iter().flatten().copied());
                }
            }
        }
    }

    let mut taken: HashSet<String> = graph
        .routines()
        .filter_map(|(_, r)| r.name())
        .map(str::to_string)
        .collect();
    let mut names = HashMap::new();
    for (id, routine) in graph.routines() {
        let name = match routine.name() {
            Some(name) => name.to_string(),
            None if routine.is_addressable() && referenced.contains(&id) => {
                let name = unique_name(GENERATED_ROUTINE_NAME, |n| taken.contains(n));
                debug!("Persisting unnamed {id} as '{name}'");
                taken.insert(name.clone());
                name
            }
            None => continue,
        };
        names.insert(id, name);
    }
    names
}

/// Something that was repaired while loading a project.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    MalformedPredicate { class: String, reason: String },
    DanglingFeatureReference { feature: String, routine: String },
    DanglingChainingReference { routine: String, target: String },
    InvalidFeatureTag(String),
    DuplicateRoutineName { name: String, renamed: String },
    RejectedRoutine { routine: String, reason: GraphError },
    RejectedFeatureEntry {
        feature: String,
        routine: String,
        reason: GraphError,
    },
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedPredicate { class, reason } => write!(
                f,
                "A predicate of @{class} matches nothing: {reason}"
            ),
            LoadWarning::DanglingFeatureReference { feature, routine } => write!(
                f,
                "Lost routine '{routine}' referenced in feature '{feature}'"
            ),
            LoadWarning::DanglingChainingReference { routine, target } => write!(
                f,
                "Lost routine '{target}' referenced by a chaining rule in '{routine}'"
            ),
            LoadWarning::InvalidFeatureTag(tag) => {
                write!(f, "Dropped feature '{tag}', it is not a valid feature tag")
            }
            LoadWarning::DuplicateRoutineName { name, renamed } => write!(
                f,
                "More than one routine is named '{name}', renamed a later one to '{renamed}'"
            ),
            LoadWarning::RejectedRoutine { routine, reason } => {
                write!(f, "Dropped routine '{routine}': {reason}")
            }
            LoadWarning::RejectedFeatureEntry {
                feature,
                routine,
                reason,
            } => write!(
                f,
                "Dropped '{routine}' from feature '{feature}': {reason}"
            ),
        }
    }
}

/// The persisted form of a [`Project`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    pub source: PathBuf,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub debugging_text: String,
    #[serde(default)]
    pub classes: IndexMap<String, ClassDocument>,
    #[serde(default)]
    pub routines: Vec<RoutineDocument>,
    /// Feature tag to routine names.
    #[serde(default)]
    pub features: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glyph_actions: Vec<GlyphAction>,
}

fn is_false(v: &bool) -> bool {
    !v
}

fn is_zero(v: &u16) -> bool {
    *v == 0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassDocument {
    #[serde(default, skip_serializing_if = "is_false")]
    pub automatic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<GlyphName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
}

impl From<&GlyphClass> for ClassDocument {
    fn from(class: &GlyphClass) -> Self {
        match class {
            GlyphClass::Manual(members) => ClassDocument {
                automatic: false,
                members: members.clone(),
                predicates: Vec::new(),
            },
            GlyphClass::Automatic(predicates) => ClassDocument {
                automatic: true,
                members: Vec::new(),
                predicates: predicates.clone(),
            },
        }
    }
}

impl From<ClassDocument> for GlyphClass {
    fn from(doc: ClassDocument) -> Self {
        if doc.automatic {
            GlyphClass::Automatic(doc.predicates)
        } else {
            GlyphClass::Manual(doc.members)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RoutineDocument {
    Manual {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "is_zero")]
        flags: u16,
        #[serde(default)]
        rules: Vec<Rule<String>>,
    },
    Computed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "is_zero")]
        flags: u16,
        procedure: String,
        #[serde(default)]
        parameters: Parameters,
    },
    Divider {
        #[serde(default)]
        comment: String,
    },
}

impl RoutineDocument {
    fn name(&self) -> Option<&str> {
        match self {
            RoutineDocument::Manual { name, .. } | RoutineDocument::Computed { name, .. } => {
                name.as_deref()
            }
            RoutineDocument::Divider { .. } => None,
        }
    }

    /// The routine, plus for manual routines the rules still naming routines.
    fn into_routine(self) -> (Routine, Option<Vec<Rule<String>>>) {
        fn named(name: Option<String>) -> Option<String> {
            name.filter(|n| !n.is_empty())
        }
        match self {
            RoutineDocument::Manual { name, flags, rules } => {
                let routine = match named(name) {
                    Some(name) => Routine::manual(name, Vec::new()),
                    None => Routine::anonymous(Vec::new()),
                };
                (
                    routine.with_flags(RoutineFlags::from_bits_truncate(flags)),
                    Some(rules),
                )
            }
            RoutineDocument::Computed {
                name,
                flags,
                procedure,
                parameters,
            } => {
                let computed = ComputedRoutine::new(procedure, parameters);
                let mut routine = Routine::computed(String::new(), computed);
                routine.set_name(named(name));
                (
                    routine.with_flags(RoutineFlags::from_bits_truncate(flags)),
                    None,
                )
            }
            RoutineDocument::Divider { comment } => (Routine::divider(comment), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use fluxdrasil::{
        glyphs::{Category, GlyphSet},
        tags::Tag,
    };
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::{
        predicate::NameComparator,
        rule::{glyph_slots, Chaining, Positioning, Substitution, ValueRecord},
    };

    use super::*;

    fn tag(s: &str) -> Tag {
        Tag::new_checked(s.as_bytes()).unwrap()
    }

    fn names(raw: &[&str]) -> Vec<GlyphName> {
        raw.iter().map(|n| GlyphName::new(n)).collect()
    }

    /// A project with one of each routine kind, shared routines and a
    /// chaining rule that refers forward.
    fn sample() -> Project {
        let mut project = Project::new("Font.ufo");
        project.debugging_text = "ببب".to_string();
        project
            .classes
            .define("caps", GlyphClass::Manual(names(&["A", "B"])))
            .unwrap();
        project
            .classes
            .define(
                "init",
                GlyphClass::Automatic(vec![
                    Predicate::name(NameComparator::Ends, ".init"),
                    Predicate::member_of("caps").or(),
                ]),
            )
            .unwrap();

        let graph = &mut project.graph;
        let divider = graph.add_routine(Routine::divider("Latin")).unwrap();
        let kern = graph
            .add_routine(
                Routine::manual(
                    "Kern",
                    vec![Positioning {
                        input: glyph_slots(["T", "o"]),
                        values: vec![ValueRecord::advance(-40), ValueRecord::default()],
                        ..Default::default()
                    }
                    .into()],
                )
                .with_flags(RoutineFlags::IGNORE_MARKS),
            )
            .unwrap();
        let init = graph
            .add_routine(Routine::computed(
                "Init",
                ComputedRoutine::new(
                    "ArabicPositional",
                    [
                        ("isol".to_string(), "-ar$".to_string()),
                        ("init".to_string(), "-ar(.init)$".to_string()),
                        ("form".to_string(), "init".to_string()),
                    ]
                    .into(),
                ),
            ))
            .unwrap();
        let target = graph
            .add_routine(Routine::anonymous(vec![
                Substitution::single("a", "a.alt").into()
            ]))
            .unwrap();
        let chain = graph
            .add_routine(Routine::manual(
                "Context",
                vec![Rule::Chaining(Chaining {
                    input: glyph_slots(["a"]),
                    lookups: vec![vec![target]],
                    precontext: vec![vec!["@caps".into()]],
                    ..Default::default()
                })],
            ))
            .unwrap();
        graph.move_routine(4, 1).unwrap();
        assert_eq!(&[divider, chain, kern, init, target], graph.routine_ids());

        graph.add_to_feature(tag("kern"), kern).unwrap();
        graph.add_to_feature(tag("calt"), chain).unwrap();
        graph.add_to_feature(tag("calt"), kern).unwrap();
        graph.add_to_feature(tag("init"), init).unwrap();

        project.glyph_actions = [GlyphAction::new("A").with_category(Category::Base)]
            .into_iter()
            .collect();
        project
    }

    fn round_trip_yaml(project: &Project) -> Project {
        let yml = serde_yaml::to_string(&project.to_document()).unwrap();
        let (loaded, warnings) = Project::from_document(serde_yaml::from_str(&yml).unwrap());
        assert_eq!(Vec::<LoadWarning>::new(), warnings);
        loaded
    }

    #[test]
    fn round_trip_preserves_everything() {
        let project = sample();
        let loaded = round_trip_yaml(&project);

        let routine_names: Vec<_> = loaded
            .graph
            .routines()
            .map(|(_, r)| r.name().unwrap_or("-"))
            .collect();
        assert_eq!(
            vec!["-", "Context", "Kern", "Init", "Routine"],
            routine_names
        );
        let feature_tags: Vec<_> = loaded.graph.features().map(|(t, _)| t).collect();
        assert_eq!(vec![tag("kern"), tag("calt"), tag("init")], feature_tags);
        assert_eq!(project.classes, loaded.classes);
        assert_eq!(project.glyph_actions, loaded.glyph_actions);
        assert_eq!(project.debugging_text, loaded.debugging_text);

        // a second trip is exact, the generated name now being stored
        assert_eq!(loaded.to_document(), round_trip_yaml(&loaded).to_document());
        assert_eq!(project.to_document(), loaded.to_document());
    }

    #[test]
    fn round_trip_keeps_references_and_parameters() {
        let project = sample();
        let loaded = round_trip_yaml(&project);
        let graph = &loaded.graph;

        let kern = graph.find_routine("Kern").unwrap();
        let context = graph.find_routine("Context").unwrap();
        assert_eq!(Some(&[context, kern][..]), graph.feature(tag("calt")));
        assert_eq!(
            RoutineFlags::IGNORE_MARKS,
            graph.routine(kern).unwrap().flags
        );

        let RoutineKind::Computed(computed) = graph
            .routine(graph.find_routine("Init").unwrap())
            .unwrap()
            .kind()
        else {
            panic!("Init should still be computed");
        };
        assert_eq!("ArabicPositional", computed.procedure());
        let keys: Vec<_> = computed.parameters().keys().map(String::as_str).collect();
        assert_eq!(vec!["isol", "init", "form"], keys);

        let RoutineKind::Manual(rules) = graph.routine(context).unwrap().kind() else {
            panic!("Context should be manual");
        };
        let Rule::Chaining(chain) = &rules[0] else {
            panic!("expected a chaining rule");
        };
        let target = graph.routine_ids()[4];
        assert_eq!(vec![vec![target]], chain.lookups);
    }

    #[test]
    fn dangling_references_are_dropped_with_warnings() {
        let doc: ProjectDocument = serde_yaml::from_str(
            r#"
source: Font.ufo
routines:
  - kind: manual
    name: Liga
    rules:
      - type: chaining
        input: [[f], [i]]
        lookups: [[Missing], []]
  - kind: manual
    name: Liga
features:
  liga: [Liga, Gone]
  toolong: [Liga]
"#,
        )
        .unwrap();
        let (project, warnings) = Project::from_document(doc);
        assert_eq!(
            vec![
                LoadWarning::DuplicateRoutineName {
                    name: "Liga".to_string(),
                    renamed: "Liga_2".to_string()
                },
                LoadWarning::DanglingChainingReference {
                    routine: "Liga".to_string(),
                    target: "Missing".to_string()
                },
                LoadWarning::DanglingFeatureReference {
                    feature: "liga".to_string(),
                    routine: "Gone".to_string()
                },
                LoadWarning::InvalidFeatureTag("toolong".to_string()),
            ],
            warnings
        );
        let liga = project.graph.find_routine("Liga").unwrap();
        assert_eq!(Some(&[liga][..]), project.graph.feature(tag("liga")));
        assert_eq!(2, project.graph.len());
    }

    #[test]
    fn renamed_duplicates_avoid_later_names() {
        let doc: ProjectDocument = serde_yaml::from_str(
            r#"
source: Font.ufo
routines:
  - kind: manual
    name: Liga
  - kind: manual
    name: Liga
  - kind: manual
    name: Liga_2
features:
  liga: [Liga_2]
"#,
        )
        .unwrap();
        let (project, warnings) = Project::from_document(doc);
        assert_eq!(
            vec![LoadWarning::DuplicateRoutineName {
                name: "Liga".to_string(),
                renamed: "Liga_3".to_string()
            }],
            warnings
        );
        let names: Vec<_> = project
            .graph
            .routines()
            .filter_map(|(_, r)| r.name())
            .collect();
        assert_eq!(vec!["Liga", "Liga_3", "Liga_2"], names);
        let liga_2 = project.graph.find_routine("Liga_2").unwrap();
        assert_eq!(Some(&[liga_2][..]), project.graph.feature(tag("liga")));
    }

    #[test]
    fn malformed_predicates_do_not_stop_a_load() {
        let doc: ProjectDocument = serde_yaml::from_str(
            r#"
source: Font.ufo
classes:
  odd:
    automatic: true
    predicates:
      - {kind: name, comparator: contains, value: a}
      - {kind: name, comparator: begins, value: b, combiner: or}
  caps:
    members: [A, B]
routines:
  - kind: manual
    name: Liga
"#,
        )
        .unwrap();
        let (project, warnings) = Project::from_document(doc.clone());
        assert_eq!(1, warnings.len());
        assert!(matches!(
            &warnings[0],
            LoadWarning::MalformedPredicate { class, .. } if class == "odd"
        ));
        assert_eq!(2, project.classes.len());
        assert_eq!(1, project.graph.len());

        let font = GlyphSet::from_names(["a", "b", "ba"]);
        assert_eq!(
            Some(vec![GlyphName::new("b"), GlyphName::new("ba")]),
            project.classes.resolve("odd", &font)
        );
        // kept as written
        assert_eq!(doc.classes, project.to_document().classes);
    }

    #[test]
    fn save_and_load_yaml_and_json() {
        let temp_dir = tempdir().unwrap();
        let mut project = sample();
        project.source = temp_dir.path().join("fonts").join("Font.ufo");

        for file in ["project.yml", "project.json"] {
            let path = temp_dir.path().join(file);
            project.save(&path).unwrap();
            let raw = fs::read_to_string(&path).unwrap();
            assert!(!raw.contains(temp_dir.path().to_str().unwrap()), "{raw}");

            let (loaded, warnings) = Project::load(&path).unwrap();
            assert!(warnings.is_empty());
            assert_eq!(project.source, loaded.source);
            assert_eq!(project.to_document(), round_trip_yaml(&loaded).to_document());
        }
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let result = Project::load(&temp_dir.path().join("nope.yml"));
        assert!(matches!(result, Err(Error::FileIo { .. })));
    }
}
