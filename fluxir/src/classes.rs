//! Named glyph classes.

use fluxdrasil::{glyphs::GlyphSource, types::GlyphName};
use indexmap::IndexMap;
use log::debug;

use crate::{
    error::Error,
    predicate::{Predicate, PredicateEngine},
    rule::GlyphRef,
};

/// A named set of glyphs.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphClass {
    /// An explicit member list.
    Manual(Vec<GlyphName>),
    /// Members are whatever the predicates match in the current font.
    ///
    /// Membership is never stored; it is recomputed every time the class is
    /// resolved, so it follows font edits.
    Automatic(Vec<Predicate>),
}

impl GlyphClass {
    pub fn is_automatic(&self) -> bool {
        matches!(self, GlyphClass::Automatic(_))
    }
}

/// All glyph classes of a project, in definition order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlyphClassStore {
    classes: IndexMap<String, GlyphClass>,
}

impl GlyphClassStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&GlyphClass> {
        self.classes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GlyphClass)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add a new class; names must be unique.
    pub fn define(&mut self, name: impl Into<String>, class: GlyphClass) -> Result<(), Error> {
        let name = name.into();
        if self.classes.contains_key(&name) {
            return Err(Error::DuplicateClass(name));
        }
        self.classes.insert(name, class);
        Ok(())
    }

    /// Replace the definition of an existing class, keeping its position.
    pub fn redefine(&mut self, name: &str, class: GlyphClass) -> Result<(), Error> {
        let existing = self
            .classes
            .get_mut(name)
            .ok_or_else(|| Error::UnknownClass(name.to_string()))?;
        *existing = class;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<GlyphClass> {
        self.classes.shift_remove(name)
    }

    /// Rename a class in place.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<(), Error> {
        let new = new.into();
        if old == new {
            return Ok(());
        }
        if self.classes.contains_key(&new) {
            return Err(Error::DuplicateClass(new));
        }
        let Some(idx) = self.classes.get_index_of(old) else {
            return Err(Error::UnknownClass(old.to_string()));
        };
        self.classes = std::mem::take(&mut self.classes)
            .into_iter()
            .enumerate()
            .map(|(i, (name, class))| if i == idx { (new.clone(), class) } else { (name, class) })
            .collect();
        Ok(())
    }

    /// Add the font's own groups as manual classes.
    ///
    /// Groups whose name is already taken are left alone. Returns the number
    /// of classes added.
    pub fn import_groups<I>(&mut self, groups: I) -> usize
    where
        I: IntoIterator<Item = (String, Vec<GlyphName>)>,
    {
        let mut added = 0;
        for (name, members) in groups {
            if self.classes.contains_key(&name) {
                debug!("Not importing group {name}, a class of that name exists");
                continue;
            }
            self.classes.insert(name, GlyphClass::Manual(members));
            added += 1;
        }
        added
    }

    /// The current members of a class, in order. None if there is no such class.
    ///
    /// Manual classes drop members the font doesn't have; automatic classes are
    /// evaluated afresh against the whole font.
    pub fn resolve(&self, name: &str, font: &dyn GlyphSource) -> Option<Vec<GlyphName>> {
        PredicateEngine::new(font)
            .with_classes(self)
            .resolve_class(name)
    }

    /// Every class, resolved against the font.
    pub fn resolve_all(&self, font: &dyn GlyphSource) -> IndexMap<String, Vec<GlyphName>> {
        self.classes
            .keys()
            .map(|name| (name.clone(), self.resolve(name, font).unwrap_or_default()))
            .collect()
    }

    /// The glyphs a rule slot entry stands for.
    pub fn expand(&self, glyph: &GlyphRef, font: &dyn GlyphSource) -> Vec<GlyphName> {
        match glyph {
            GlyphRef::Glyph(name) if font.contains(name.as_str()) => vec![name.clone()],
            GlyphRef::Glyph(_) => Vec::new(),
            GlyphRef::Class(class) => self.resolve(class, font).unwrap_or_default(),
        }
    }

    /// Used by the predicate engine, which tracks membership cycles.
    pub(crate) fn resolve_with(
        &self,
        name: &str,
        engine: &mut PredicateEngine,
    ) -> Option<Vec<GlyphName>> {
        match self.classes.get(name)? {
            GlyphClass::Manual(members) => {
                let font = engine.font();
                Some(
                    members
                        .iter()
                        .filter(|g| font.contains(g.as_str()))
                        .cloned()
                        .collect(),
                )
            }
            GlyphClass::Automatic(predicates) => Some(engine.evaluate_all(predicates)),
        }
    }
}

#[cfg(test)]
mod tests {
    use fluxdrasil::glyphs::{GlyphInfo, GlyphSet};
    use pretty_assertions::assert_eq;

    use crate::predicate::NameComparator;

    use super::*;

    fn names(raw: &[&str]) -> Vec<GlyphName> {
        raw.iter().map(|n| GlyphName::new(n)).collect()
    }

    fn store() -> GlyphClassStore {
        let mut classes = GlyphClassStore::new();
        classes
            .define("caps", GlyphClass::Manual(names(&["B", "A", "Q"])))
            .unwrap();
        classes
            .define(
                "smallcaps",
                GlyphClass::Automatic(vec![Predicate::name(NameComparator::Ends, ".sc")]),
            )
            .unwrap();
        classes
    }

    #[test]
    fn manual_keeps_order_and_drops_missing() {
        let font = GlyphSet::from_names(["A", "B", "A.sc"]);
        assert_eq!(Some(names(&["B", "A"])), store().resolve("caps", &font));
    }

    #[test]
    fn automatic_follows_the_font() {
        let mut font = GlyphSet::from_names(["A", "A.sc"]);
        let classes = store();
        let first = classes.resolve("smallcaps", &font);
        assert_eq!(first, classes.resolve("smallcaps", &font));
        assert_eq!(Some(names(&["A.sc"])), first);

        font.insert("B.sc", GlyphInfo::default());
        assert_eq!(
            Some(names(&["A.sc", "B.sc"])),
            classes.resolve("smallcaps", &font)
        );
    }

    #[test]
    fn unknown_class() {
        let font = GlyphSet::from_names(["A"]);
        assert_eq!(None, store().resolve("nope", &font));
    }

    #[test]
    fn names_are_unique() {
        let mut classes = store();
        assert!(matches!(
            classes.define("caps", GlyphClass::Manual(vec![])),
            Err(Error::DuplicateClass(_))
        ));
        assert!(matches!(
            classes.rename("caps", "smallcaps"),
            Err(Error::DuplicateClass(_))
        ));
    }

    #[test]
    fn rename_keeps_position() {
        let mut classes = store();
        classes.rename("caps", "capitals").unwrap();
        let order = classes.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(vec!["capitals", "smallcaps"], order);
        assert!(classes.get("caps").is_none());
    }

    #[test]
    fn import_skips_existing() {
        let mut classes = store();
        let added = classes.import_groups(vec![
            ("caps".to_string(), names(&["Z"])),
            ("public.kern1.O".to_string(), names(&["O", "Q"])),
        ]);
        assert_eq!(1, added);
        assert_eq!(
            Some(&GlyphClass::Manual(names(&["B", "A", "Q"]))),
            classes.get("caps")
        );
    }

    #[test]
    fn expand_glyph_refs() {
        let font = GlyphSet::from_names(["A", "B", "A.sc"]);
        let classes = store();
        assert_eq!(
            names(&["A.sc"]),
            classes.expand(&GlyphRef::Class("smallcaps".into()), &font)
        );
        assert_eq!(names(&["A"]), classes.expand(&GlyphRef::from("A"), &font));
        assert!(classes.expand(&GlyphRef::from("Z"), &font).is_empty());
    }
}
