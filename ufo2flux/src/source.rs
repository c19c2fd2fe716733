//! Reading glyphs, categories and groups from a UFO.

use std::{collections::HashSet, path::Path};

use fluxdrasil::{
    glyphs::{Category, GlyphInfo, GlyphSet},
    types::GlyphName,
};
use indexmap::IndexMap;
use kurbo::{Affine, Point, Rect};
use log::{debug, warn};

use crate::error::Error;

static GLYPH_ORDER_KEY: &str = "public.glyphOrder";
static CATEGORIES_KEY: &str = "public.openTypeCategories";

/// Components nested deeper than this are assumed to be cyclic.
const MAX_COMPONENT_DEPTH: usize = 64;

/// The parts of a UFO flux works with.
#[derive(Debug, Clone, PartialEq)]
pub struct UfoSource {
    /// The default layer, in glyph order.
    pub glyphs: GlyphSet,
    /// `groups.plist`, to be imported as manual glyph classes.
    pub groups: IndexMap<String, Vec<GlyphName>>,
}

impl UfoSource {
    pub fn load(ufo_dir: &Path) -> Result<UfoSource, Error> {
        if !ufo_dir.is_dir() {
            return Err(Error::FileExpected(ufo_dir.to_path_buf()));
        }
        let font = norad::Font::load(ufo_dir).map_err(|e| Error::FontLoadError {
            path: ufo_dir.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(UfoSource::from_font(&font))
    }

    pub fn from_font(font: &norad::Font) -> UfoSource {
        let layer = font.default_layer();
        let categories = categories(font);

        let mut glyphs = GlyphSet::new();
        for name in glyph_order(font) {
            let Some(glyph) = layer.get_glyph(name.as_str()) else {
                continue;
            };
            let category = categories.get(&name).copied().unwrap_or_default();
            glyphs.insert(name, glyph_info(layer, glyph, category));
        }

        let groups = font
            .groups
            .iter()
            .map(|(name, members)| {
                (
                    name.to_string(),
                    members.iter().map(|m| GlyphName::new(m.as_str())).collect(),
                )
            })
            .collect();

        debug!("Loaded {} glyphs", glyphs.len());
        UfoSource { glyphs, groups }
    }
}

/// `public.glyphOrder` first, then any other glyphs of the default layer in
/// alphabetical order.
fn glyph_order(font: &norad::Font) -> Vec<GlyphName> {
    let layer = font.default_layer();
    let mut seen = HashSet::new();
    let mut order = Vec::new();

    let lib_order = font
        .lib
        .get(GLYPH_ORDER_KEY)
        .and_then(|val| val.as_array())
        .map(|names| names.iter().filter_map(|v| v.as_string()).collect::<Vec<_>>())
        .unwrap_or_default();
    for name in lib_order {
        if layer.get_glyph(name).is_none() {
            debug!("{GLYPH_ORDER_KEY} lists {name}, which has no glyph");
            continue;
        }
        if seen.insert(name.to_string()) {
            order.push(GlyphName::new(name));
        }
    }

    let mut rest: Vec<_> = layer
        .iter()
        .map(|g| g.name().as_str())
        .filter(|name| !seen.contains(*name))
        .collect();
    rest.sort();
    order.extend(rest.into_iter().map(GlyphName::new));
    order
}

fn categories(font: &norad::Font) -> IndexMap<GlyphName, Category> {
    let Some(categories) = font
        .lib
        .get(CATEGORIES_KEY)
        .and_then(|val| val.as_dictionary())
    else {
        return IndexMap::new();
    };
    categories
        .iter()
        .filter_map(|(glyph, category)| {
            let Some(category) = category.as_string() else {
                warn!("{CATEGORIES_KEY} has a non-string entry for {glyph}");
                return None;
            };
            match category.parse() {
                Ok(category) => Some((GlyphName::new(glyph), category)),
                Err(e) => {
                    warn!("{glyph}: {e}");
                    None
                }
            }
        })
        .collect()
}

fn glyph_info(layer: &norad::Layer, glyph: &norad::Glyph, category: Category) -> GlyphInfo {
    let mut info = GlyphInfo::new(glyph.width).with_category(category);
    if let Some(bounds) = bounds(layer, glyph, 0) {
        info = info.with_bounds(bounds);
    }
    for anchor in glyph.anchors.iter() {
        match &anchor.name {
            Some(name) => info = info.with_anchor(name.as_str(), anchor.x, anchor.y),
            None => debug!("Skipping an unnamed anchor in {}", glyph.name()),
        }
    }
    for component in glyph.components.iter() {
        info = info.with_component(component.base.as_str(), to_affine(&component.transform));
    }
    info
}

fn to_affine(transform: &norad::AffineTransform) -> Affine {
    Affine::new([
        transform.x_scale,
        transform.xy_scale,
        transform.yx_scale,
        transform.y_scale,
        transform.x_offset,
        transform.y_offset,
    ])
}

fn union(acc: Option<Rect>, rect: Rect) -> Option<Rect> {
    Some(match acc {
        Some(acc) => acc.union(rect),
        None => rect,
    })
}

/// The control box of the outline, components included.
///
/// None for glyphs with no outline at all.
fn bounds(layer: &norad::Layer, glyph: &norad::Glyph, depth: usize) -> Option<Rect> {
    if depth > MAX_COMPONENT_DEPTH {
        warn!("Components of {} nest too deeply, ignoring them", glyph.name());
        return None;
    }
    let mut result = glyph
        .contours
        .iter()
        .flat_map(|c| c.points.iter())
        .map(|p| Point::new(p.x, p.y))
        .fold(None, |acc, p| union(acc, Rect::from_points(p, p)));

    for component in glyph.components.iter() {
        let Some(base) = layer.get_glyph(component.base.as_str()) else {
            warn!(
                "{} uses {} as a component, but there is no such glyph",
                glyph.name(),
                component.base
            );
            continue;
        };
        if let Some(rect) = bounds(layer, base, depth + 1) {
            let rect = to_affine(&component.transform).transform_rect_bbox(rect);
            result = union(result, rect);
        }
    }
    result
}
