//! Per-glyph overrides layered over the font.
//!
//! A project can change a glyph's advance or category, or add a glyph that
//! copies another, without touching the font source. The overrides are
//! applied by viewing the font through an [`ActionOverlay`].

use std::collections::HashSet;

use fluxdrasil::{
    glyphs::{Anchor, Category, Component, GlyphMetrics, GlyphSource},
    types::GlyphName,
};
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GlyphAction {
    pub glyph: GlyphName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Create `glyph` as a copy of this glyph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_from: Option<GlyphName>,
}

impl GlyphAction {
    pub fn new(glyph: impl Into<GlyphName>) -> Self {
        GlyphAction {
            glyph: glyph.into(),
            width: None,
            category: None,
            duplicate_from: None,
        }
    }

    pub fn with_width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn duplicating(mut self, source: impl Into<GlyphName>) -> Self {
        self.duplicate_from = Some(source.into());
        self
    }

    /// Whether applying this action would change anything about `font`.
    pub fn has_effect(&self, font: &dyn GlyphSource) -> bool {
        if self.duplicate_from.is_some() {
            return true;
        }
        let glyph = self.glyph.as_str();
        let width_changes = self.width.is_some_and(|width| {
            font.metrics(glyph)
                .map_or(true, |m| m.advance != width as f64)
        });
        let category_changes = self
            .category
            .is_some_and(|category| font.category(glyph) != Some(category));
        width_changes || category_changes
    }
}

/// The glyph actions of a project, one per glyph, in the order first set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlyphActions {
    actions: IndexMap<GlyphName, GlyphAction>,
}

impl GlyphActions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, glyph: &str) -> Option<&GlyphAction> {
        self.actions.get(glyph)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphAction> {
        self.actions.values()
    }

    /// Store an action, replacing any previous one for the same glyph.
    ///
    /// An action that would change nothing about `font` is not stored.
    /// Returns whether the action was stored.
    pub fn set(&mut self, action: GlyphAction, font: &dyn GlyphSource) -> bool {
        if !action.has_effect(font) {
            return false;
        }
        self.actions.insert(action.glyph.clone(), action);
        true
    }

    pub fn remove(&mut self, glyph: &str) -> Option<GlyphAction> {
        self.actions.shift_remove(glyph)
    }

    /// View `font` with every action applied.
    pub fn apply<'a>(&'a self, font: &'a dyn GlyphSource) -> ActionOverlay<'a> {
        ActionOverlay::new(font, self)
    }
}

impl FromIterator<GlyphAction> for GlyphActions {
    fn from_iter<T: IntoIterator<Item = GlyphAction>>(iter: T) -> Self {
        GlyphActions {
            actions: iter
                .into_iter()
                .map(|action| (action.glyph.clone(), action))
                .collect(),
        }
    }
}

/// A font with glyph actions applied.
pub struct ActionOverlay<'a> {
    font: &'a dyn GlyphSource,
    actions: &'a GlyphActions,
    names: Vec<GlyphName>,
}

impl<'a> ActionOverlay<'a> {
    fn new(font: &'a dyn GlyphSource, actions: &'a GlyphActions) -> Self {
        let mut names = font.names().to_vec();
        let mut seen: HashSet<GlyphName> = names.iter().cloned().collect();
        for action in actions.iter() {
            let Some(source) = &action.duplicate_from else {
                continue;
            };
            if !font.contains(source.as_str()) {
                warn!(
                    "Can't create {} as a copy of {source}, there is no such glyph",
                    action.glyph
                );
                continue;
            }
            if seen.insert(action.glyph.clone()) {
                names.push(action.glyph.clone());
            }
        }
        ActionOverlay {
            font,
            actions,
            names,
        }
    }

    /// The font glyph that supplies this glyph's outline-derived data.
    fn origin<'n>(&'n self, name: &'n str) -> Option<&'n str> {
        match self.actions.get(name) {
            Some(GlyphAction {
                duplicate_from: Some(source),
                ..
            }) if self.font.contains(source.as_str()) => Some(source.as_str()),
            _ if self.font.contains(name) => Some(name),
            _ => None,
        }
    }
}

impl GlyphSource for ActionOverlay<'_> {
    fn names(&self) -> &[GlyphName] {
        &self.names
    }

    fn contains(&self, name: &str) -> bool {
        self.origin(name).is_some()
    }

    fn metrics(&self, name: &str) -> Option<GlyphMetrics> {
        let mut metrics = self.font.metrics(self.origin(name)?)?;
        if let Some(width) = self.actions.get(name).and_then(|a| a.width) {
            metrics.advance = width as f64;
        }
        Some(metrics)
    }

    fn category(&self, name: &str) -> Option<Category> {
        let origin = self.origin(name)?;
        self.actions
            .get(name)
            .and_then(|a| a.category)
            .or_else(|| self.font.category(origin))
    }

    fn anchors(&self, name: &str) -> Vec<Anchor> {
        self.origin(name)
            .map(|origin| self.font.anchors(origin))
            .unwrap_or_default()
    }

    fn components(&self, name: &str) -> Vec<Component> {
        self.origin(name)
            .map(|origin| self.font.components(origin))
            .unwrap_or_default()
    }
}
