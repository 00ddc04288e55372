//! Country name resolution
//!
//! Maps the many spellings of a country found across sources onto one
//! canonical key. Resolution is a static alias lookup followed by a
//! deterministic title-casing fallback, and is a fixed point:
//! `resolve(&resolve(x)) == resolve(x)`.

use crate::table::CellValue;
use crate::text::{capitalize, strip_diacritics};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Where an alias spelling comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Common English name
    English,
    /// Spanish name as used by the document store
    Spanish,
    /// Abbreviation or initialism
    Abbreviation,
    /// Formal/official state name
    Official,
    /// Part of a compound name used on its own
    Partial,
    /// The canonical spelling itself
    Canonical,
}

/// One alias table entry, keyed by the lower-cased, accent-free spelling
#[derive(Debug, Clone, Copy)]
pub struct Alias {
    pub variant: &'static str,
    pub canonical: &'static str,
    pub provenance: Provenance,
}

const fn alias(variant: &'static str, canonical: &'static str, provenance: Provenance) -> Alias {
    Alias {
        variant,
        canonical,
        provenance,
    }
}

use Provenance::*;

/// Known spelling variants
pub static ALIASES: &[Alias] = &[
    alias("united states", "USA", English),
    alias("united states of america", "USA", Official),
    alias("estados unidos", "USA", Spanish),
    alias("us", "USA", Abbreviation),
    alias("usa", "USA", Canonical),
    alias("u.s.a.", "USA", Abbreviation),
    alias("u.s.", "USA", Abbreviation),
    alias("south korea", "Korea", English),
    alias("corea del sur", "Korea", Spanish),
    alias("republic of korea", "Korea", Official),
    alias("korea, south", "Korea", English),
    alias("korea, republic of", "Korea", Official),
    alias("korea", "Korea", Canonical),
    alias("north korea", "North Korea", Canonical),
    alias("corea del norte", "North Korea", Spanish),
    alias("russian federation", "Russia", Official),
    alias("federacion rusa", "Russia", Spanish),
    alias("russia", "Russia", Canonical),
    alias("united kingdom", "UK", English),
    alias("reino unido", "UK", Spanish),
    alias("great britain", "UK", English),
    alias("england", "UK", Partial),
    alias("uk", "UK", Canonical),
    alias("u.k.", "UK", Abbreviation),
    alias("bosnia and herzegovina", "Bosnia and Herzegovina", Canonical),
    alias("bosnia & herzegovina", "Bosnia and Herzegovina", English),
    alias("bosnia", "Bosnia and Herzegovina", Partial),
    alias("herzegovina", "Bosnia and Herzegovina", Partial),
    alias("czechia", "Czech Republic", Official),
    alias("czech republic", "Czech Republic", Canonical),
];

/// Words kept lower-case in the fallback formatter unless they lead the name
pub const MINOR_WORDS: &[&str] = &["and", "of", "the", "du", "de", "del", "la", "el"];

fn alias_index() -> &'static HashMap<&'static str, &'static str> {
    static INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    INDEX.get_or_init(|| ALIASES.iter().map(|a| (a.variant, a.canonical)).collect())
}

/// Look up a spelling in the alias table (expects lower-case, accent-free input)
pub fn lookup_alias(variant: &str) -> Option<&'static str> {
    alias_index().get(variant).copied()
}

/// Resolve a raw country name to its canonical key
pub fn resolve(raw: &str) -> String {
    let cleaned = strip_diacritics(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(canonical) = lookup_alias(&cleaned.to_lowercase()) {
        return canonical.to_string();
    }

    let words: Vec<&str> = cleaned.split(' ').collect();
    if words.len() > 1 {
        let formatted: Vec<String> = words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let lower = word.to_lowercase();
                if i > 0 && MINOR_WORDS.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize(word)
                }
            })
            .collect();
        strip_diacritics(&formatted.join(" "))
    } else {
        strip_diacritics(&capitalize(&cleaned))
    }
}

/// Resolve a cell; anything that is not text passes through unchanged
pub fn resolve_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::String(s) => CellValue::String(resolve(s)),
        other => other.clone(),
    }
}
