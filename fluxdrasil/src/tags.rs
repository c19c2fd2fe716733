//! OpenType feature tags and their registered descriptions.

pub use write_fonts::types::{InvalidTag, Tag};

/// Parse a feature tag as written by a user, e.g. `liga` or `ss01`.
///
/// Tags shorter than four bytes are padded with spaces.
pub fn parse_feature_tag(raw: &str) -> Result<Tag, InvalidTag> {
    Tag::new_checked(raw.trim().as_bytes())
}

/// The registered name of a feature, e.g. "Standard Ligatures" for `liga`.
pub fn feature_description(tag: Tag) -> Option<String> {
    let raw = tag.to_string();
    if let Some(n) = character_variant_number(&raw) {
        return Some(format!("Character variant {n}"));
    }
    FEATURE_DESCRIPTIONS
        .binary_search_by_key(&raw.as_str(), |(tag, _)| tag)
        .ok()
        .map(|idx| FEATURE_DESCRIPTIONS[idx].1.to_string())
}

fn character_variant_number(raw: &str) -> Option<u8> {
    let digits = raw.strip_prefix("cv")?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| (1..=99).contains(n))
}

// sorted by tag; cvXX are handled separately
static FEATURE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("aalt", "Access All Alternates"),
    ("abvf", "Above-base Forms"),
    ("abvm", "Above-base Mark Positioning"),
    ("abvs", "Above-base Substitutions"),
    ("afrc", "Alternative Fractions"),
    ("akhn", "Akhands"),
    ("blwf", "Below-base Forms"),
    ("blwm", "Below-base Mark Positioning"),
    ("blws", "Below-base Substitutions"),
    ("c2pc", "Petite Capitals From Capitals"),
    ("c2sc", "Small Capitals From Capitals"),
    ("calt", "Contextual Alternates"),
    ("case", "Case-Sensitive Forms"),
    ("ccmp", "Glyph Composition / Decomposition"),
    ("cfar", "Conjunct Form After Ro"),
    ("chws", "Contextual Half-width Spacing"),
    ("cjct", "Conjunct Forms"),
    ("clig", "Contextual Ligatures"),
    ("cpct", "Centered CJK Punctuation"),
    ("cpsp", "Capital Spacing"),
    ("cswh", "Contextual Swash"),
    ("curs", "Cursive Positioning"),
    ("dist", "Distances"),
    ("dlig", "Discretionary Ligatures"),
    ("dnom", "Denominators"),
    ("dtls", "Dotless Forms"),
    ("expt", "Expert Forms"),
    ("falt", "Final Glyph on Line Alternates"),
    ("fin2", "Terminal Forms #2"),
    ("fin3", "Terminal Forms #3"),
    ("fina", "Terminal Forms"),
    ("flac", "Flattened accent forms"),
    ("frac", "Fractions"),
    ("fwid", "Full Widths"),
    ("half", "Half Forms"),
    ("haln", "Halant Forms"),
    ("halt", "Alternate Half Widths"),
    ("hist", "Historical Forms"),
    ("hkna", "Horizontal Kana Alternates"),
    ("hlig", "Historical Ligatures"),
    ("hngl", "Hangul"),
    ("hojo", "Hojo Kanji Forms (JIS X 0212-1990 Kanji Forms)"),
    ("hwid", "Half Widths"),
    ("init", "Initial Forms"),
    ("isol", "Isolated Forms"),
    ("ital", "Italics"),
    ("jalt", "Justification Alternates"),
    ("jp04", "JIS2004 Forms"),
    ("jp78", "JIS78 Forms"),
    ("jp83", "JIS83 Forms"),
    ("jp90", "JIS90 Forms"),
    ("kern", "Kerning"),
    ("lfbd", "Left Bounds"),
    ("liga", "Standard Ligatures"),
    ("ljmo", "Leading Jamo Forms"),
    ("lnum", "Lining Figures"),
    ("locl", "Localized Forms"),
    ("ltra", "Left-to-right alternates"),
    ("ltrm", "Left-to-right mirrored forms"),
    ("mark", "Mark Positioning"),
    ("med2", "Medial Forms #2"),
    ("medi", "Medial Forms"),
    ("mgrk", "Mathematical Greek"),
    ("mkmk", "Mark to Mark Positioning"),
    ("mset", "Mark Positioning via Substitution"),
    ("nalt", "Alternate Annotation Forms"),
    ("nlck", "NLC Kanji Forms"),
    ("nukt", "Nukta Forms"),
    ("numr", "Numerators"),
    ("onum", "Oldstyle Figures"),
    ("opbd", "Optical Bounds"),
    ("ordn", "Ordinals"),
    ("ornm", "Ornaments"),
    ("palt", "Proportional Alternate Widths"),
    ("pcap", "Petite Capitals"),
    ("pkna", "Proportional Kana"),
    ("pnum", "Proportional Figures"),
    ("pref", "Pre-Base Forms"),
    ("pres", "Pre-base Substitutions"),
    ("pstf", "Post-base Forms"),
    ("psts", "Post-base Substitutions"),
    ("pwid", "Proportional Widths"),
    ("qwid", "Quarter Widths"),
    ("rand", "Randomize"),
    ("rclt", "Required Contextual Alternates"),
    ("rkrf", "Rakar Forms"),
    ("rlig", "Required Ligatures"),
    ("rphf", "Reph Forms"),
    ("rtbd", "Right Bounds"),
    ("rtla", "Right-to-left alternates"),
    ("rtlm", "Right-to-left mirrored forms"),
    ("ruby", "Ruby Notation Forms"),
    ("rvrn", "Required Variation Alternates"),
    ("salt", "Stylistic Alternates"),
    ("sinf", "Scientific Inferiors"),
    ("size", "Optical size"),
    ("smcp", "Small Capitals"),
    ("smpl", "Simplified Forms"),
    ("ss01", "Stylistic Set 1"),
    ("ss02", "Stylistic Set 2"),
    ("ss03", "Stylistic Set 3"),
    ("ss04", "Stylistic Set 4"),
    ("ss05", "Stylistic Set 5"),
    ("ss06", "Stylistic Set 6"),
    ("ss07", "Stylistic Set 7"),
    ("ss08", "Stylistic Set 8"),
    ("ss09", "Stylistic Set 9"),
    ("ss10", "Stylistic Set 10"),
    ("ss11", "Stylistic Set 11"),
    ("ss12", "Stylistic Set 12"),
    ("ss13", "Stylistic Set 13"),
    ("ss14", "Stylistic Set 14"),
    ("ss15", "Stylistic Set 15"),
    ("ss16", "Stylistic Set 16"),
    ("ss17", "Stylistic Set 17"),
    ("ss18", "Stylistic Set 18"),
    ("ss19", "Stylistic Set 19"),
    ("ss20", "Stylistic Set 20"),
    ("ssty", "Math script style alternates"),
    ("stch", "Stretching Glyph Decomposition"),
    ("subs", "Subscript"),
    ("sups", "Superscript"),
    ("swsh", "Swash"),
    ("titl", "Titling"),
    ("tjmo", "Trailing Jamo Forms"),
    ("tnam", "Traditional Name Forms"),
    ("tnum", "Tabular Figures"),
    ("trad", "Traditional Forms"),
    ("twid", "Third Widths"),
    ("unic", "Unicase"),
    ("valt", "Alternate Vertical Metrics"),
    ("vatu", "Vattu Variants"),
    ("vchw", "Vertical Contextual Half-width Spacing"),
    ("vert", "Vertical Writing"),
    ("vhal", "Alternate Vertical Half Metrics"),
    ("vjmo", "Vowel Jamo Forms"),
    ("vkna", "Vertical Kana Alternates"),
    ("vkrn", "Vertical Kerning"),
    ("vpal", "Proportional Alternate Vertical Metrics"),
    ("vrt2", "Vertical Alternates and Rotation"),
    ("vrtr", "Vertical Alternates for Rotation"),
    ("zero", "Slashed Zero"),
];

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn descriptions_are_sorted() {
        let tags = FEATURE_DESCRIPTIONS.iter().map(|(t, _)| *t).collect::<Vec<_>>();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(sorted, tags);
    }

    #[rstest]
    #[case("liga", Some("Standard Ligatures"))]
    #[case("zero", Some("Slashed Zero"))]
    #[case("cv07", Some("Character variant 7"))]
    #[case("cv00", None)]
    #[case("abcd", None)]
    fn describe(#[case] raw: &str, #[case] expected: Option<&str>) {
        let tag = parse_feature_tag(raw).unwrap();
        assert_eq!(expected.map(String::from), feature_description(tag));
    }

    #[test]
    fn short_tags_are_padded() {
        assert_eq!(Tag::new(b"cv1 "), parse_feature_tag("cv1").unwrap());
    }

    #[test]
    fn overlong_tag_is_rejected() {
        assert!(parse_feature_tag("ligature").is_err());
    }
}
