//! Layout rules: the contents of a routine.
//!
//! Every rule matches a sequence of input slots, optionally constrained by
//! precontext and postcontext slots which are matched but not consumed. A
//! slot is a set of alternatives, each a glyph or a glyph class.
//!
//! Chaining rules refer to other routines. In memory that reference is a
//! [`RoutineId`]; the persisted form uses routine names instead, which is why
//! the rule types are generic over the reference type.

use std::fmt::{self, Display};

use fluxdrasil::types::GlyphName;
use indexmap::IndexMap;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{error::Error, graph::RoutineId};

/// One alternative within a slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum GlyphRef {
    Glyph(GlyphName),
    /// A glyph class, written `@name`.
    Class(SmolStr),
}

impl GlyphRef {
    pub fn glyph(&self) -> Option<&GlyphName> {
        match self {
            GlyphRef::Glyph(name) => Some(name),
            GlyphRef::Class(_) => None,
        }
    }
}

impl From<&str> for GlyphRef {
    fn from(value: &str) -> Self {
        match value.strip_prefix('@') {
            Some(class) => GlyphRef::Class(class.into()),
            None => GlyphRef::Glyph(value.into()),
        }
    }
}

impl From<GlyphName> for GlyphRef {
    fn from(value: GlyphName) -> Self {
        GlyphRef::Glyph(value)
    }
}

impl TryFrom<String> for GlyphRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "@" || trimmed.contains(char::is_whitespace) {
            return Err(Error::InvalidGlyphRef(value));
        }
        Ok(GlyphRef::from(trimmed))
    }
}

impl From<GlyphRef> for String {
    fn from(value: GlyphRef) -> Self {
        value.to_string()
    }
}

impl Display for GlyphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphRef::Glyph(name) => write!(f, "{name}"),
            GlyphRef::Class(class) => write!(f, "@{class}"),
        }
    }
}

/// A set of alternatives matched at one position.
pub type Slot = Vec<GlyphRef>;

/// A slot holding exactly one glyph.
pub fn glyph_slot(name: impl Into<GlyphName>) -> Slot {
    vec![GlyphRef::Glyph(name.into())]
}

/// One single-glyph slot per name.
pub fn glyph_slots<I, S>(names: I) -> Vec<Slot>
where
    I: IntoIterator<Item = S>,
    S: Into<GlyphName>,
{
    names.into_iter().map(glyph_slot).collect()
}

/// Adjustments applied to a positioned glyph, in font units.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRecord {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub x_placement: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub y_placement: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub x_advance: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub y_advance: i32,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

impl ValueRecord {
    pub fn advance(x_advance: i32) -> Self {
        ValueRecord {
            x_advance,
            ..Default::default()
        }
    }
}

impl Display for ValueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x:{} y:{} dx:{} dy:{})",
            self.x_placement, self.y_placement, self.x_advance, self.y_advance
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Substitution {
    pub input: Vec<Slot>,
    pub replacement: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precontext: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcontext: Vec<Slot>,
}

impl Substitution {
    pub fn new(input: Vec<Slot>, replacement: Vec<Slot>) -> Self {
        Substitution {
            input,
            replacement,
            ..Default::default()
        }
    }

    /// `from -> to`, one glyph for another.
    pub fn single(from: impl Into<GlyphName>, to: impl Into<GlyphName>) -> Self {
        Substitution::new(vec![glyph_slot(from)], vec![glyph_slot(to)])
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Positioning {
    pub input: Vec<Slot>,
    /// One value record per input slot.
    pub values: Vec<ValueRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precontext: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcontext: Vec<Slot>,
}

/// Attach marks to bases by matching up anchor positions.
///
/// For cursive attachment the "base" anchor is `entry` and the "mark" anchor
/// is `exit`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Attachment {
    pub base_anchor: SmolStr,
    pub mark_anchor: SmolStr,
    pub bases: IndexMap<GlyphName, Point>,
    pub marks: IndexMap<GlyphName, Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precontext: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcontext: Vec<Slot>,
}

/// Match a sequence and apply other routines at input positions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chaining<R = RoutineId> {
    pub input: Vec<Slot>,
    /// The routines to apply at each input position; same length as `input`.
    pub lookups: Vec<Vec<R>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precontext: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcontext: Vec<Slot>,
}

impl<R> Default for Chaining<R> {
    fn default() -> Self {
        Chaining {
            input: Vec::new(),
            lookups: Vec::new(),
            precontext: Vec::new(),
            postcontext: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule<R = RoutineId> {
    Substitution(Substitution),
    Positioning(Positioning),
    Attachment(Attachment),
    Chaining(Chaining<R>),
}

impl<R> Rule<R> {
    pub fn precontext(&self) -> &[Slot] {
        match self {
            Rule::Substitution(r) => &r.precontext,
            Rule::Positioning(r) => &r.precontext,
            Rule::Attachment(r) => &r.precontext,
            Rule::Chaining(r) => &r.precontext,
        }
    }

    pub fn postcontext(&self) -> &[Slot] {
        match self {
            Rule::Substitution(r) => &r.postcontext,
            Rule::Positioning(r) => &r.postcontext,
            Rule::Attachment(r) => &r.postcontext,
            Rule::Chaining(r) => &r.postcontext,
        }
    }

    /// Rewrite routine references, dropping those `f` maps to None.
    ///
    /// Only chaining rules hold routine references; other rules are moved
    /// through unchanged.
    pub fn map_routines<S>(self, mut f: impl FnMut(R) -> Option<S>) -> Rule<S> {
        match self {
            Rule::Substitution(r) => Rule::Substitution(r),
            Rule::Positioning(r) => Rule::Positioning(r),
            Rule::Attachment(r) => Rule::Attachment(r),
            Rule::Chaining(r) => Rule::Chaining(Chaining {
                input: r.input,
                lookups: r
                    .lookups
                    .into_iter()
                    .map(|at_pos| at_pos.into_iter().filter_map(&mut f).collect())
                    .collect(),
                precontext: r.precontext,
                postcontext: r.postcontext,
            }),
        }
    }
}

impl Rule {
    /// Remove every reference to `routine`.
    pub(crate) fn forget_routine(&mut self, routine: RoutineId) {
        if let Rule::Chaining(r) = self {
            for at_pos in r.lookups.iter_mut() {
                at_pos.retain(|id| *id != routine);
            }
        }
    }
}

impl From<Substitution> for Rule {
    fn from(value: Substitution) -> Self {
        Rule::Substitution(value)
    }
}

impl From<Positioning> for Rule {
    fn from(value: Positioning) -> Self {
        Rule::Positioning(value)
    }
}

impl From<Attachment> for Rule {
    fn from(value: Attachment) -> Self {
        Rule::Attachment(value)
    }
}

struct Slots<'a>(&'a [Slot]);

impl Display for Slots<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_slot(f, slot)?;
        }
        Ok(())
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, slot: &Slot) -> fmt::Result {
    match slot.as_slice() {
        [single] => write!(f, "{single}"),
        many => {
            f.write_str("[")?;
            for (i, g) in many.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{g}")?;
            }
            f.write_str("]")
        }
    }
}

fn write_context<R>(
    f: &mut fmt::Formatter<'_>,
    rule: &Rule<R>,
    input: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let pre = rule.precontext();
    let post = rule.postcontext();
    if !pre.is_empty() {
        write!(f, "{} ", Slots(pre))?;
    }
    input(f)?;
    if !post.is_empty() {
        write!(f, " {}", Slots(post))?;
    }
    Ok(())
}

impl<R: Display> Display for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contextual = !self.precontext().is_empty() || !self.postcontext().is_empty();
        let mark = if contextual { "'" } else { "" };
        match self {
            Rule::Substitution(sub) => {
                write_context(f, self, |f| {
                    for (i, slot) in sub.input.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write_slot(f, slot)?;
                        f.write_str(mark)?;
                    }
                    Ok(())
                })?;
                write!(f, " -> {}", Slots(&sub.replacement))
            }
            Rule::Positioning(pos) => write_context(f, self, |f| {
                for (i, slot) in pos.input.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_slot(f, slot)?;
                    f.write_str(mark)?;
                    if let Some(value) = pos.values.get(i) {
                        write!(f, " {value}")?;
                    }
                }
                Ok(())
            }),
            Rule::Attachment(att) => write!(
                f,
                "attach {} <- {} ({} bases, {} marks)",
                att.base_anchor,
                att.mark_anchor,
                att.bases.len(),
                att.marks.len()
            ),
            Rule::Chaining(chain) => write_context(f, self, |f| {
                for (i, slot) in chain.input.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_slot(f, slot)?;
                    f.write_str("'")?;
                    let lookups = chain.lookups.get(i).map(Vec::as_slice).unwrap_or_default();
                    for lookup in lookups {
                        write!(f, " ({lookup})")?;
                    }
                }
                Ok(())
            }),
        }
    }
}
