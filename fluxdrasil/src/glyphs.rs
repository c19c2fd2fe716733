//! A read-only view of a font's glyphs.
//!
//! Rule derivation and glyph classification never touch a font file directly;
//! they ask a [`GlyphSource`] for names, metrics, categories, anchors and
//! components. [`GlyphSet`] is the in-memory implementation that font loaders
//! populate and tests build by hand.

use std::{
    collections::HashMap,
    fmt::{self, Display},
    str::FromStr,
};

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::GlyphName;

/// The OpenType (GDEF) category of a glyph.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Base,
    Ligature,
    Mark,
    Component,
    #[default]
    Unassigned,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Base => "base",
            Category::Ligature => "ligature",
            Category::Mark => "mark",
            Category::Component => "component",
            Category::Unassigned => "unassigned",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Category::Base),
            "ligature" => Ok(Category::Ligature),
            "mark" => Ok(Category::Mark),
            "component" => Ok(Category::Component),
            "unassigned" => Ok(Category::Unassigned),
            _ => Err(format!("Unknown glyph category '{s}'")),
        }
    }
}

/// A named attachment point on a glyph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Anchor {
    pub name: SmolStr,
    pub pos: Point,
}

impl Anchor {
    pub fn new(name: impl Into<SmolStr>, x: f64, y: f64) -> Self {
        Anchor {
            name: name.into(),
            pos: Point::new(x, y),
        }
    }
}

/// A reference to another glyph, drawn with a transform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Component {
    pub base: GlyphName,
    pub transform: Affine,
}

/// The numeric attributes of a glyph that classification can compare against.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    #[serde(rename = "width")]
    Width,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "depth")]
    Depth,
    #[serde(rename = "xMin")]
    XMin,
    #[serde(rename = "xMax")]
    XMax,
    #[serde(rename = "yMin")]
    YMin,
    #[serde(rename = "yMax")]
    YMax,
    #[serde(rename = "lsb")]
    Lsb,
    #[serde(rename = "rsb")]
    Rsb,
    #[serde(rename = "rise")]
    Rise,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Width,
        Metric::Height,
        Metric::Depth,
        Metric::XMin,
        Metric::XMax,
        Metric::YMin,
        Metric::YMax,
        Metric::Lsb,
        Metric::Rsb,
        Metric::Rise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Width => "width",
            Metric::Height => "height",
            Metric::Depth => "depth",
            Metric::XMin => "xMin",
            Metric::XMax => "xMax",
            Metric::YMin => "yMin",
            Metric::YMax => "yMax",
            Metric::Lsb => "lsb",
            Metric::Rsb => "rsb",
            Metric::Rise => "rise",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Unknown metric '{s}'"))
    }
}

/// The metrics bag of a single glyph.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Advance width.
    pub advance: f64,
    /// Ink bounds; None for glyphs with no outline, e.g. space.
    pub bounds: Option<Rect>,
    /// Vertical offset between the entry and exit anchors, for cursive glyphs.
    pub rise: Option<f64>,
}

impl GlyphMetrics {
    /// Get one metric, or None if this glyph doesn't have it.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        let bounds = self.bounds;
        match metric {
            Metric::Width => Some(self.advance),
            Metric::Rise => self.rise,
            Metric::Height => bounds.map(|b| b.y1 - b.y0),
            Metric::Depth => bounds.map(|b| -b.y0),
            Metric::XMin | Metric::Lsb => bounds.map(|b| b.x0),
            Metric::XMax => bounds.map(|b| b.x1),
            Metric::YMin => bounds.map(|b| b.y0),
            Metric::YMax => bounds.map(|b| b.y1),
            Metric::Rsb => bounds.map(|b| self.advance - b.x1),
        }
    }
}

/// The vertical distance from the `entry` anchor to the `exit` anchor.
pub fn rise_from_anchors(anchors: &[Anchor]) -> Option<f64> {
    let find = |name: &str| anchors.iter().find(|a| a.name == name).map(|a| a.pos.y);
    Some(find("exit")? - find("entry")?)
}

/// Read access to the glyphs of a font.
///
/// Every method taking a name returns an empty or None result for names the
/// font doesn't contain.
pub trait GlyphSource {
    /// All glyph names, in glyph order.
    fn names(&self) -> &[GlyphName];

    fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| n.as_str() == name)
    }

    fn metrics(&self, name: &str) -> Option<GlyphMetrics>;

    fn category(&self, name: &str) -> Option<Category>;

    fn anchors(&self, name: &str) -> Vec<Anchor>;

    fn components(&self, name: &str) -> Vec<Component>;
}

/// Everything a [`GlyphSet`] knows about one glyph.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct GlyphInfo {
    pub metrics: GlyphMetrics,
    pub category: Category,
    pub anchors: Vec<Anchor>,
    pub components: Vec<Component>,
}

impl GlyphInfo {
    pub fn new(advance: f64) -> Self {
        GlyphInfo {
            metrics: GlyphMetrics {
                advance,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.metrics.bounds = Some(bounds);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_anchor(mut self, name: &str, x: f64, y: f64) -> Self {
        self.anchors.push(Anchor::new(name, x, y));
        self.metrics.rise = rise_from_anchors(&self.anchors);
        self
    }

    pub fn with_component(mut self, base: impl Into<GlyphName>, transform: Affine) -> Self {
        self.components.push(Component {
            base: base.into(),
            transform,
        });
        self
    }
}

/// An in-memory font: glyphs in glyph order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlyphSet {
    order: Vec<GlyphName>,
    glyphs: HashMap<GlyphName, GlyphInfo>,
}

impl GlyphSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// A set of glyphs that have nothing but a name and a zero advance.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<GlyphName>,
    {
        let mut set = GlyphSet::new();
        for name in names {
            set.insert(name, GlyphInfo::default());
        }
        set
    }

    /// Add a glyph, or replace the info of an existing one in place.
    pub fn insert(&mut self, name: impl Into<GlyphName>, info: GlyphInfo) {
        let name = name.into();
        if !self.glyphs.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.glyphs.insert(name, info);
    }

    pub fn get(&self, name: &str) -> Option<&GlyphInfo> {
        self.glyphs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GlyphInfo> {
        self.glyphs.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GlyphName, &GlyphInfo)> {
        self.order.iter().map(|name| (name, &self.glyphs[name]))
    }
}

impl GlyphSource for GlyphSet {
    fn names(&self) -> &[GlyphName] {
        &self.order
    }

    fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    fn metrics(&self, name: &str) -> Option<GlyphMetrics> {
        self.glyphs.get(name).map(|g| g.metrics)
    }

    fn category(&self, name: &str) -> Option<Category> {
        self.glyphs.get(name).map(|g| g.category)
    }

    fn anchors(&self, name: &str) -> Vec<Anchor> {
        self.glyphs
            .get(name)
            .map(|g| g.anchors.clone())
            .unwrap_or_default()
    }

    fn components(&self, name: &str) -> Vec<Component> {
        self.glyphs
            .get(name)
            .map(|g| g.components.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn metrics() -> GlyphMetrics {
        GlyphMetrics {
            advance: 600.0,
            bounds: Some(Rect::new(50.0, -200.0, 550.0, 700.0)),
            rise: None,
        }
    }

    #[rstest]
    #[case(Metric::Width, Some(600.0))]
    #[case(Metric::Height, Some(900.0))]
    #[case(Metric::Depth, Some(200.0))]
    #[case(Metric::XMin, Some(50.0))]
    #[case(Metric::XMax, Some(550.0))]
    #[case(Metric::YMin, Some(-200.0))]
    #[case(Metric::YMax, Some(700.0))]
    #[case(Metric::Lsb, Some(50.0))]
    #[case(Metric::Rsb, Some(50.0))]
    #[case(Metric::Rise, None)]
    fn metric_values(#[case] metric: Metric, #[case] expected: Option<f64>) {
        assert_eq!(expected, metrics().get(metric));
    }

    #[test]
    fn empty_glyph_only_has_width() {
        let metrics = GlyphMetrics {
            advance: 250.0,
            ..Default::default()
        };
        let present = Metric::ALL
            .into_iter()
            .filter(|m| metrics.get(*m).is_some())
            .collect::<Vec<_>>();
        assert_eq!(vec![Metric::Width], present);
    }

    #[test]
    fn rise_needs_both_anchors() {
        let info = GlyphInfo::new(300.0).with_anchor("entry", 300.0, 10.0);
        assert_eq!(None, info.metrics.rise);
        let info = info.with_anchor("exit", 0.0, 60.0);
        assert_eq!(Some(50.0), info.metrics.rise);
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Ok(metric), metric.as_str().parse());
        }
    }

    #[test]
    fn reinsert_keeps_order() {
        let mut set = GlyphSet::from_names(["a", "b", "c"]);
        set.insert("a", GlyphInfo::new(500.0));
        assert_eq!(set.names(), &["a", "b", "c"]);
        assert_eq!(Some(500.0), set.metrics("a").map(|m| m.advance));
        assert!(set.contains("b"));
        assert!(set.anchors("zzz").is_empty());
    }
}
