//! Free-text answer helpers
//!
//! Small parsers for the shapes issue-form answers come in: DOIs buried in
//! URLs, comma lists, checkbox ticks and human-readable sizes.

use mate_record::{FieldError, FieldResult, NO_DOI};
use once_cell::sync::Lazy;
use regex::Regex;

static DOI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(10\.[0-9]+/[^ \s]+)").expect("valid DOI regex"));

static DOI_TRAILER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,.:;|/?@&=+$]+$").expect("valid DOI trailer regex"));

static SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)~?([kKmMgGtTpP]?)[iI]?[bB]?").expect("valid size regex"));

/// Find a DOI in free text
///
/// Trailing punctuation and URL query characters are stripped. Returns the
/// [`NO_DOI`] sentinel when nothing DOI-shaped is present.
#[must_use]
pub fn extract_doi(input: &str) -> String {
    DOI.captures(input)
        .and_then(|c| c.get(1))
        .map_or_else(|| NO_DOI.to_string(), |m| DOI_TRAILER.replace(m.as_str(), "").into_owned())
}

/// Whether [`extract_doi`] found something
#[inline]
#[must_use]
pub fn has_doi(extracted: &str) -> bool {
    extracted != NO_DOI
}

/// Checkbox answer: ticked when it contains an `X`
#[inline]
#[must_use]
pub fn parse_yes_no(input: &str) -> bool {
    input.contains('X')
}

/// Comma-separated answer, trimmed, blanks dropped
#[must_use]
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One entry per non-blank line, trimmed
#[must_use]
pub fn split_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Human-readable size to bytes, base 1024
///
/// Spaces are ignored; `k`/`M`/`G`/`T`/`P` prefixes with optional `B`
/// (or `iB`) suffix are accepted in either case.
///
/// # Errors
/// [`FieldError::Malformed`] when no number is present.
pub fn parse_size(input: &str) -> FieldResult<u64> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = SIZE
        .captures(&compact)
        .ok_or_else(|| FieldError::malformed(format!("Invalid size string `{input}`")))?;

    let number: f64 = caps[1]
        .parse()
        .map_err(|_| FieldError::malformed(format!("Invalid size string `{input}`")))?;
    let exponent = match caps[2].to_ascii_uppercase().as_str() {
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        "P" => 5,
        _ => 0,
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bytes = (number * 1024f64.powi(exponent)).round() as u64;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doi_from_url_with_trailing_comma() {
        assert_eq!(
            extract_doi("see https://doi.org/10.1234/abc.def, published 2020"),
            "10.1234/abc.def"
        );
    }

    #[test]
    fn doi_trailing_query_characters_stripped() {
        assert_eq!(extract_doi("https://doi.org/10.5281/zenodo.8124862/?"), "10.5281/zenodo.8124862");
        assert_eq!(extract_doi("doi:10.1029/2019GC008515."), "10.1029/2019GC008515");
    }

    #[test]
    fn no_doi_sentinel() {
        let doi = extract_doi("no doi here");
        assert_eq!(doi, NO_DOI);
        assert!(!has_doi(&doi));
    }

    #[test]
    fn checkbox_ticks() {
        assert!(parse_yes_no("- [X] Yes"));
        assert!(!parse_yes_no("- [ ] Yes"));
    }

    #[test]
    fn lists_drop_blanks() {
        assert_eq!(split_list("mantle, , convection ,"), ["mantle", "convection"]);
        assert_eq!(split_lines("a\r\n\r\n b \n"), ["a", "b"]);
    }

    #[test]
    fn sizes_in_base_1024() {
        assert_eq!(parse_size("10 k").unwrap(), 10 * 1024);
        assert_eq!(parse_size("200GB").unwrap(), 200 * 1024_u64.pow(3));
        assert_eq!(parse_size("1.5 TB").unwrap(), 3 * 1024_u64.pow(4) / 2);
        assert_eq!(parse_size("~3 MiB").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_size("512").unwrap(), 512);
        assert!(matches!(parse_size("lots"), Err(FieldError::Malformed(_))));
    }
}
