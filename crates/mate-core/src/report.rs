//! Submission reports
//!
//! The same markdown summary is posted on the submission issue (below the
//! instructions and the error log) and seeds the model repository's README.

use crate::config::Constants;
use mate_record::identity::{extract_orcid, is_orcid};
use mate_record::{ErrorLog, IdentityRecord, SubmissionRecord};
use serde_json::Value;
use std::fmt::Write as _;

/// Heading above the error log in the issue comment
pub const ERRORS_HEADING: &str = "# Errors and Warnings \n";

/// Heading above the summary in the issue comment
pub const PARSED_HEADING: &str = "# Parsed data \n";

fn text<'a>(record: &'a SubmissionRecord, key: &str) -> Option<&'a str> {
    record.get_str(key).map(str::trim).filter(|s| !s.is_empty())
}

fn nested<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn identities(value: Option<&Value>) -> Vec<IdentityRecord> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(IdentityRecord::from_value).collect(),
        Some(single @ Value::Object(_)) => IdentityRecord::from_value(single).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn person_line(person: &IdentityRecord) -> String {
    let mut line = format!("- {}", person.display_name());
    if let Some(orcid) = person.id.as_deref().filter(|id| is_orcid(id)).and_then(extract_orcid) {
        let _ = write!(line, " ([{orcid}](https://orcid.org/{orcid}))");
    }
    let affiliations: Vec<String> = person.affiliation.iter().map(IdentityRecord::display_name).collect();
    if !affiliations.is_empty() {
        let _ = write!(line, ", {}", affiliations.join("; "));
    }
    line.push('\n');
    line
}

fn link(label: &str, target: &str) -> String {
    if target.starts_with("http") {
        format!("[{label}]({target})")
    } else {
        format!("[{label}](https://doi.org/{target})")
    }
}

fn yes_no(value: Option<&Value>) -> &'static str {
    if value.and_then(Value::as_bool).unwrap_or(false) {
        "yes"
    } else {
        "no"
    }
}

fn list_line(value: Option<&Value>) -> Option<String> {
    let items: Vec<&str> = value?.as_array()?.iter().filter_map(Value::as_str).collect();
    (!items.is_empty()).then(|| items.join(", "))
}

/// Markdown summary of a submission
#[must_use]
pub fn render_report(record: &SubmissionRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## {}\n", text(record, "title").unwrap_or("Untitled model"));
    if let Some(slug) = text(record, "slug") {
        let _ = writeln!(out, "**Slug:** `{slug}`\n");
    }
    if let Some(categories) = list_line(record.get("model_category")) {
        let _ = writeln!(out, "**Category:** {categories}\n");
    }
    if let Some(status) = list_line(record.get("model_status")) {
        let _ = writeln!(out, "**Status:** {status}\n");
    }
    if let Some(keywords) = list_line(record.get("keywords")) {
        let _ = writeln!(out, "**Keywords:** {keywords}\n");
    }
    if let Some(description) = text(record, "description") {
        let _ = writeln!(out, "### Description\n{description}\n");
    }

    out.push_str("### People\n");
    for (role, key) in [("Submitter", "submitter"), ("Creators", "creators"), ("Contributors", "contributors")] {
        let people = identities(record.get(key));
        if people.is_empty() {
            continue;
        }
        let _ = writeln!(out, "**{role}**");
        people.iter().for_each(|p| out.push_str(&person_line(p)));
        out.push('\n');
    }

    let license = record.get("license");
    if let Some(name) = nested(license, "name") {
        let _ = match nested(license, "url") {
            Some(url) => writeln!(out, "### License\n[{name}]({url})\n"),
            None => writeln!(out, "### License\n{name}\n"),
        };
    }

    let publication = record.get("publication");
    if let Some(id) = nested(publication, "@id") {
        let title = nested(publication, "name").unwrap_or(id);
        let _ = writeln!(out, "### Associated publication\n{}\n", link(title, id));
    }

    let software = record.get("software");
    if let Some(id) = nested(software, "@id") {
        let name = nested(software, "name").unwrap_or(id);
        let _ = writeln!(out, "### Software\n{}", link(name, id));
        if let Some(repository) = nested(software, "codeRepository") {
            let _ = writeln!(out, "Source: {repository}");
        }
        out.push('\n');
    }

    let funders = identities(record.get("funder"));
    if !funders.is_empty() {
        out.push_str("### Funding\n");
        let grants = record.get("funding").and_then(Value::as_array);
        for funder in &funders {
            let numbers: Vec<&str> = grants
                .into_iter()
                .flatten()
                .filter(|g| g.get("funder").and_then(IdentityRecord::from_value).as_ref() == Some(funder))
                .filter_map(|g| g.get("identifier").and_then(Value::as_str))
                .collect();
            let _ = if numbers.is_empty() {
                writeln!(out, "- {}", funder.display_name())
            } else {
                writeln!(out, "- {} ({})", funder.display_name(), numbers.join(", "))
            };
        }
        out.push('\n');
    }

    out.push_str("### Model code and output\n");
    let code = record.get("model_code_inputs");
    let _ = writeln!(out, "- Include model code: {}", yes_no(record.get("include_model_code")));
    if let Some(doi) = nested(code, "doi") {
        let _ = writeln!(out, "- Model code/inputs: {}", link(doi, doi));
    }
    let output = record.get("model_output_data");
    let _ = writeln!(out, "- Include model output: {}", yes_no(record.get("include_model_output")));
    if let Some(doi) = nested(output, "doi") {
        let _ = writeln!(out, "- Model output: {}", link(doi, doi));
    }
    if let Some(size) = nested(output, "size") {
        let _ = writeln!(out, "- Output size: {size}");
    }
    if let Some(computer) = text(record, "computer_uri") {
        let _ = writeln!(out, "- Computer: {computer}");
    }
    out.push('\n');

    let images: Vec<(&str, &str, Option<&str>)> = [
        ("Landing image", "landing_image"),
        ("Animation", "animation"),
        ("Graphic abstract", "graphic_abstract"),
        ("Model setup figure", "model_setup_figure"),
    ]
    .into_iter()
    .filter_map(|(label, key)| {
        let image = record.get(key);
        let filename = nested(image, "filename")?;
        Some((label, filename, nested(image, "caption")))
    })
    .collect();
    if !images.is_empty() {
        out.push_str("### Images\n");
        for (label, filename, caption) in images {
            let _ = match caption {
                Some(caption) => writeln!(out, "- {label}: `{filename}`: {caption}"),
                None => writeln!(out, "- {label}: `{filename}`"),
            };
        }
        out.push('\n');
    }

    if let Some(setup) = text(record, "model_setup_description") {
        let _ = writeln!(out, "### Model setup\n{setup}");
    }
    out
}

/// Issue comment: instructions, error log and summary
#[must_use]
pub fn submission_comment(record: &SubmissionRecord, log: &ErrorLog, constants: &Constants) -> String {
    let mut out = format!(
        "Thank you for submitting. \n \n\
         * Using Github actions, we have regenerated a report summarising information about your model \n \n\
         * Please check the report below, particularly the warning and errors section, and website materials \n \n\
         * You can fix any errors, or update fields, by editing the markdown file at the top of the issue \n \n\
         * Edits will trigger the report will be regenerated \n \n\
         * once you are satisfied with the results, please add an {} \n \n\
         * once the `model_reviewers` team has approved the model, we will create a repository for your model \n\n",
        constants.review_label_url
    );
    out.push_str(ERRORS_HEADING);
    out.push_str(&log.render());
    out.push_str("\n\n");
    out.push_str(PARSED_HEADING);
    out.push_str(&render_report(record));
    out
}

/// README for a new model repository
#[must_use]
pub fn readme(record: &SubmissionRecord, constants: &Constants) -> String {
    format!(
        "# New [M@TE]({})!: \n _we have provided a summary of your model as a starting point for the README, feel free to edit_\n{}",
        constants.website,
        render_report(record)
    )
}

/// Closing comment once the repository is populated
#[must_use]
pub fn announcement(owner: &str, repo: &str) -> String {
    format!("Model repository created at https://github.com/{owner}/{repo}")
}

/// Comment explaining why no crate was written
#[must_use]
pub fn crate_failure(error: &str) -> String {
    format!("# M@TE crate \nThe RO-Crate could not be generated and was not written to the repository: {error}")
}
