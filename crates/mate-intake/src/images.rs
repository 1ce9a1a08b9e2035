//! Image and caption answers
//!
//! Upload questions hold one uploaded asset plus free caption text. The asset
//! line may be a markdown link, an HTML `<img>` tag or a bare URL.

use mate_record::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?P<filename>.*?)\]\((?P<url>.*?)\)").expect("valid markdown link regex"));

static HTML_IMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"alt="(?P<filename>[^"]+)" src="(?P<url>[^"]+)""#).expect("valid img tag regex"));

/// Uploaded media file with its caption
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Name the file is stored under
    pub filename: String,
    /// Upload location
    pub url: String,
    /// Caption lines joined by newlines
    pub caption: String,
}

/// Last path segment of a submitted file name
///
/// Empty when nothing usable is left, e.g. for `..` or a trailing slash.
#[must_use]
pub fn file_name(raw: &str) -> &str {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name == "." || name == ".." {
        ""
    } else {
        name
    }
}

/// Parse an upload answer
///
/// Lines containing one of `asset_prefixes` are the asset; every other
/// non-blank line is caption text. Returns the record and the problems found.
#[must_use]
pub fn parse_image_and_caption(
    block: &str,
    default_filename: &str,
    asset_prefixes: &[String],
) -> (ImageRecord, Vec<FieldError>) {
    let mut image = ImageRecord::default();
    let mut caption = Vec::new();
    let mut problems = Vec::new();

    for line in block.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if !asset_prefixes.iter().any(|p| line.contains(p.as_str())) {
            caption.push(line);
            continue;
        }

        let parsed = MARKDOWN_LINK
            .captures(line)
            .or_else(|| (!line.starts_with("https://")).then(|| HTML_IMG.captures(line)).flatten());
        match parsed {
            Some(caps) => {
                image.filename = match file_name(&caps["filename"]) {
                    "" => default_filename.to_string(),
                    name => name.to_string(),
                };
                image.url = caps["url"].to_string();
            }
            None if line.starts_with("https://") => {
                image.filename = default_filename.to_string();
                image.url = line.to_string();
            }
            None => problems.push(FieldError::malformed("Could not parse image file and caption")),
        }
    }

    if caption.is_empty() {
        problems.push(FieldError::malformed("No caption found for image."));
    }
    image.caption = caption.join("\n");
    (image, problems)
}
