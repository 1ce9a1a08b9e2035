//! YAML front matter rendering

use crate::error::ProjectionResult;
use serde_json::Value;

/// Front matter delimiter line
pub const DELIMITER: &str = "---";

/// Render `document` as a front matter block followed by `body`
///
/// # Errors
/// Fails when the document cannot be serialized to YAML.
pub fn render_front_matter(document: &Value, body: &str) -> ProjectionResult<String> {
    let yaml = serde_yaml::to_string(document)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    if !body.is_empty() {
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}
