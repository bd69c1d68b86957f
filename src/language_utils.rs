//! Language utilities for language tag handling
//!
//! This module extracts the primary subtag from BCP 47 style tags
//! (`zh-Hans`, `pt_BR`) and normalizes ISO 639-2/3 (3-letter) codes to
//! ISO 639-1 (2-letter) where one exists.

use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T equivalent
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Lowercased first subtag of a language tag: `"zh-Hans"` -> `"zh"`
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Look up a 2- or 3-letter code in the ISO 639 tables
fn lookup(code: &str) -> Option<Language> {
    match code.len() {
        2 => Language::from_639_1(code),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(bibliographic, _)| *bibliographic == code)
                .map(|(_, terminology)| *terminology)
                .unwrap_or(code);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Primary subtag of `tag`, normalized to ISO 639-1 when possible.
///
/// Unknown codes are returned lowercased as they are, so callers can still
/// match on them.
pub fn normalized_primary_subtag(tag: &str) -> String {
    let primary = primary_subtag(tag);
    lookup(&primary)
        .and_then(|lang| lang.to_639_1())
        .map(str::to_string)
        .unwrap_or(primary)
}

/// English name of the language a tag refers to, if it is a known ISO 639 code
pub fn language_name(tag: &str) -> Option<String> {
    lookup(&primary_subtag(tag)).map(|lang| lang.to_name().to_string())
}
