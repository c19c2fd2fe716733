//! Glyph classification criteria and their evaluation.
//!
//! A [`Predicate`] is one criterion plus a [`Combiner`] saying how its result
//! merges with everything before it. Lists of predicates fold strictly left to
//! right; there is no precedence between `and` and `or`.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display},
    str::FromStr,
};

use fluxdrasil::{
    glyphs::{Category, GlyphMetrics, GlyphSource, Metric},
    types::GlyphName,
};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{classes::GlyphClassStore, serde::PredicateSerdeRepr};

/// How a predicate's matches merge with the running result.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Combiner {
    #[default]
    And,
    Or,
}

impl Combiner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combiner::And => "and",
            Combiner::Or => "or",
        }
    }
}

impl FromStr for Combiner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Combiner::And),
            "or" => Ok(Combiner::Or),
            _ => Err(format!("Unknown combiner '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameComparator {
    Begins,
    Ends,
    /// The value is a regular expression searched for anywhere in the name.
    Matches,
}

impl NameComparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameComparator::Begins => "begins",
            NameComparator::Ends => "ends",
            NameComparator::Matches => "matches",
        }
    }
}

impl FromStr for NameComparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "begins" => Ok(NameComparator::Begins),
            "ends" => Ok(NameComparator::Ends),
            "matches" => Ok(NameComparator::Matches),
            _ => Err(format!("Unknown name comparator '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericComparator {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

impl NumericComparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericComparator::Less => "<",
            NumericComparator::LessOrEqual => "<=",
            NumericComparator::Equal => "=",
            NumericComparator::GreaterOrEqual => ">=",
            NumericComparator::Greater => ">",
        }
    }

    pub fn compare(&self, got: f64, expected: f64) -> bool {
        match self {
            NumericComparator::Less => got < expected,
            NumericComparator::LessOrEqual => got <= expected,
            NumericComparator::Equal => got == expected,
            NumericComparator::GreaterOrEqual => got >= expected,
            NumericComparator::Greater => got > expected,
        }
    }
}

impl FromStr for NumericComparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(NumericComparator::Less),
            "<=" => Ok(NumericComparator::LessOrEqual),
            "=" | "==" => Ok(NumericComparator::Equal),
            ">=" => Ok(NumericComparator::GreaterOrEqual),
            ">" => Ok(NumericComparator::Greater),
            _ => Err(format!("Unknown numeric comparator '{s}'")),
        }
    }
}

/// What a single predicate tests.
///
/// User-typed values (patterns, numbers) are kept as written; they are only
/// interpreted at evaluation time, where a malformed value matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Name {
        comparator: NameComparator,
        value: String,
    },
    Metric {
        metric: Metric,
        comparator: NumericComparator,
        value: String,
    },
    Category(Category),
    /// Membership of another glyph class, by name.
    MemberOf(String),
    /// The glyph has an anchor with this name.
    HasAnchor(String),
    /// A stored record that could not be understood, kept as written so it
    /// survives a save. Matches nothing.
    Invalid {
        kind: String,
        comparator: Option<String>,
        value: String,
        reason: String,
    },
}

impl Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Name { comparator, value } => {
                write!(f, "name {} '{value}'", comparator.as_str())
            }
            Criterion::Metric {
                metric,
                comparator,
                value,
            } => write!(f, "{metric} {} {value}", comparator.as_str()),
            Criterion::Category(category) => write!(f, "category is {category}"),
            Criterion::MemberOf(class) => write!(f, "member of @{class}"),
            Criterion::HasAnchor(anchor) => write!(f, "has anchor '{anchor}'"),
            Criterion::Invalid { reason, .. } => write!(f, "invalid ({reason})"),
        }
    }
}

/// One criterion and how it combines with the predicates before it.
///
/// The combiner of the first predicate in a list is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "PredicateSerdeRepr", into = "PredicateSerdeRepr")]
pub struct Predicate {
    pub criterion: Criterion,
    pub combiner: Combiner,
}

impl Predicate {
    pub fn new(criterion: Criterion) -> Self {
        Predicate {
            criterion,
            combiner: Combiner::And,
        }
    }

    pub fn name(comparator: NameComparator, value: impl Into<String>) -> Self {
        Predicate::new(Criterion::Name {
            comparator,
            value: value.into(),
        })
    }

    pub fn metric(metric: Metric, comparator: NumericComparator, value: impl Into<String>) -> Self {
        Predicate::new(Criterion::Metric {
            metric,
            comparator,
            value: value.into(),
        })
    }

    pub fn category(category: Category) -> Self {
        Predicate::new(Criterion::Category(category))
    }

    pub fn member_of(class: impl Into<String>) -> Self {
        Predicate::new(Criterion::MemberOf(class.into()))
    }

    pub fn has_anchor(anchor: impl Into<String>) -> Self {
        Predicate::new(Criterion::HasAnchor(anchor.into()))
    }

    /// Why this predicate can't be evaluated, if it was loaded malformed.
    pub fn invalid_reason(&self) -> Option<&str> {
        match &self.criterion {
            Criterion::Invalid { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn and(mut self) -> Self {
        self.combiner = Combiner::And;
        self
    }

    pub fn or(mut self) -> Self {
        self.combiner = Combiner::Or;
        self
    }
}

/// Evaluates predicates against a font.
///
/// An engine caches glyph metrics for its own lifetime only; make a new one
/// for each top-level evaluation so that font edits are always seen.
pub struct PredicateEngine<'a> {
    font: &'a dyn GlyphSource,
    classes: Option<&'a GlyphClassStore>,
    metrics: HashMap<GlyphName, Option<GlyphMetrics>>,
    // classes currently being resolved, to break membership cycles
    resolving: Vec<String>,
}

impl<'a> PredicateEngine<'a> {
    pub fn new(font: &'a dyn GlyphSource) -> Self {
        PredicateEngine {
            font,
            classes: None,
            metrics: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Allow `member` predicates to consult these classes.
    pub fn with_classes(mut self, classes: &'a GlyphClassStore) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn font(&self) -> &'a dyn GlyphSource {
        self.font
    }

    /// The subset of `candidates` matching `predicate`, in candidate order.
    ///
    /// The predicate's combiner plays no part here.
    pub fn evaluate(&mut self, predicate: &Predicate, candidates: &[GlyphName]) -> Vec<GlyphName> {
        let font = self.font;
        match &predicate.criterion {
            Criterion::Name { comparator, value } => match comparator {
                NameComparator::Begins => filter(candidates, |g| g.as_str().starts_with(value)),
                NameComparator::Ends => filter(candidates, |g| g.as_str().ends_with(value)),
                NameComparator::Matches => match Regex::new(value) {
                    Ok(re) => filter(candidates, |g| re.is_match(g.as_str())),
                    Err(e) => {
                        warn!("Pattern '{value}' is not a valid regular expression: {e}");
                        Vec::new()
                    }
                },
            },
            Criterion::Metric {
                metric,
                comparator,
                value,
            } => {
                let Ok(expected) = value.trim().parse::<i64>() else {
                    warn!("Unable to compare {metric} against non-integer '{value}'");
                    return Vec::new();
                };
                let expected = expected as f64;
                candidates
                    .iter()
                    .filter(|g| {
                        self.metrics_for(g)
                            .and_then(|m| m.get(*metric))
                            .map(|got| comparator.compare(got, expected))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            }
            Criterion::Category(category) => filter(candidates, |g| {
                font.category(g.as_str()) == Some(*category)
            }),
            Criterion::HasAnchor(anchor) => filter(candidates, |g| {
                font.anchors(g.as_str()).iter().any(|a| a.name == anchor.as_str())
            }),
            Criterion::MemberOf(class) => {
                let members: HashSet<GlyphName> = self
                    .resolve_class(class)
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                filter(candidates, |g| members.contains(g))
            }
            Criterion::Invalid { reason, .. } => {
                warn!("Skipping a malformed predicate: {reason}");
                Vec::new()
            }
        }
    }

    /// Fold an ordered list of predicates over the whole font.
    ///
    /// Every predicate is evaluated against the full glyph set and then
    /// intersected (`and`) or unioned (`or`) with the result so far. The
    /// result is in glyph order. An empty list matches every glyph.
    pub fn evaluate_all(&mut self, predicates: &[Predicate]) -> Vec<GlyphName> {
        let font = self.font;
        let all = font.names();
        let Some((first, rest)) = predicates.split_first() else {
            return all.to_vec();
        };
        let mut current: HashSet<GlyphName> = self.evaluate(first, all).into_iter().collect();
        for predicate in rest {
            let matched: HashSet<GlyphName> = self.evaluate(predicate, all).into_iter().collect();
            current = match predicate.combiner {
                Combiner::And => current.intersection(&matched).cloned().collect(),
                Combiner::Or => current.union(&matched).cloned().collect(),
            };
        }
        all.iter()
            .filter(|g| current.contains(g.as_str()))
            .cloned()
            .collect()
    }

    /// Resolve a glyph class through this engine, sharing its metrics cache.
    ///
    /// Classes that (directly or not) contain themselves resolve to nothing
    /// at the point the cycle closes. Returns None for unknown classes.
    pub fn resolve_class(&mut self, class: &str) -> Option<Vec<GlyphName>> {
        let Some(classes) = self.classes else {
            warn!("Membership of @{class} tested without any glyph classes available");
            return None;
        };
        if self.resolving.iter().any(|c| c == class) {
            warn!(
                "Glyph class @{class} refers to itself via {}",
                self.resolving.join(" -> ")
            );
            return None;
        }
        self.resolving.push(class.to_string());
        let members = classes.resolve_with(class, self);
        self.resolving.pop();
        if members.is_none() {
            debug!("Membership test against unknown class @{class}");
        }
        members
    }

    fn metrics_for(&mut self, glyph: &GlyphName) -> Option<GlyphMetrics> {
        let font = self.font;
        *self
            .metrics
            .entry(glyph.clone())
            .or_insert_with(|| font.metrics(glyph.as_str()))
    }
}

fn filter(candidates: &[GlyphName], mut keep: impl FnMut(&GlyphName) -> bool) -> Vec<GlyphName> {
    candidates.iter().filter(|g| keep(g)).cloned().collect()
}

/// Evaluate a predicate list against a font with a fresh engine.
pub fn evaluate_all(
    font: &dyn GlyphSource,
    classes: Option<&GlyphClassStore>,
    predicates: &[Predicate],
) -> Vec<GlyphName> {
    let mut engine = PredicateEngine::new(font);
    if let Some(classes) = classes {
        engine = engine.with_classes(classes);
    }
    engine.evaluate_all(predicates)
}
