use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the target language code
///
/// Codes are ISO 639-1 (2-letter) or ISO 639-2 (3-letter), optionally
/// followed by a region subtag (`pt-BR`, `zh_TW`). The normalized code is
/// what keys translations in the store and names the output directory.

/// ISO 639-2/B codes that differ from their ISO 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
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

fn lookup(base: &str) -> Option<Language> {
    match base.len() {
        2 => Language::from_639_1(base),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == base)
                .map(|(_, t)| *t)
                .unwrap_or(base);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

fn split_region(code: &str) -> (String, Option<String>) {
    let code = code.trim();
    match code.split_once(['-', '_']) {
        Some((base, region)) => (base.to_lowercase(), Some(region.to_uppercase())),
        None => (code.to_lowercase(), None),
    }
}

/// Normalize a language code: lowercase base in its shortest ISO form,
/// uppercase region kept (`FR` -> `fr`, `fre` -> `fr`, `pt_br` -> `pt-BR`)
pub fn normalize_language_code(code: &str) -> Result<String> {
    let (base, region) = split_region(code);
    let lang = lookup(&base).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    let base = match lang.to_639_1() {
        Some(part1) => part1.to_string(),
        None => lang.to_639_3().to_string(),
    };
    Ok(match region {
        Some(region) if !region.is_empty() => format!("{}-{}", base, region),
        _ => base,
    })
}

/// Check if two language codes represent the same language, regions included
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_language_code(code1), normalize_language_code(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// English name of a language code, with its region in parentheses
pub fn language_display_name(code: &str) -> Result<String> {
    let (base, region) = split_region(code);
    let lang = lookup(&base).ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(match region {
        Some(region) if !region.is_empty() => format!("{} ({})", lang.to_name(), region),
        _ => lang.to_name().to_string(),
    })
}
