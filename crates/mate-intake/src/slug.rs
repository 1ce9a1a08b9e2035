//! Model repository slugs
//!
//! Slugs follow `familyname-year-keyword`. A malformed slug is only a warning;
//! the repository name actually used is the first of `slug`, `slug-1`, ...
//! that does not exist yet.

use crate::resolve::RepoExistence;
use mate_record::FieldError;
use tracing::debug;

/// Upper bound on existence probes
pub const MAX_SLUG_PROBES: u32 = 100;

/// Check the `familyname-year-keyword` shape
///
/// Returns one warning per problem; an empty list means the slug is well formed.
#[must_use]
pub fn validate_slug(slug: &str) -> Vec<FieldError> {
    let parts: Vec<&str> = slug.split('-').collect();
    if parts.len() != 3 {
        return vec![FieldError::malformed("slug should be in the format `familyname-year-keyword`")];
    }

    let year = parts[1];
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Vec::new()
    } else {
        vec![FieldError::malformed("year should be in the format `yyyy`")]
    }
}

/// Candidate repository names in probe order
fn candidates(proposed: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(proposed.to_string())
        .chain((1..MAX_SLUG_PROBES).map(move |n| format!("{proposed}-{n}")))
}

/// Outcome of slug probing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugChoice {
    /// Name to create the repository under; empty when probing failed
    pub slug: String,
    /// Problems to report back to the submitter
    pub problems: Vec<FieldError>,
}

/// Find the first free repository name derived from `proposed`
pub async fn choose_repository_slug(proposed: &str, repos: &dyn RepoExistence) -> SlugChoice {
    let mut problems = Vec::new();

    for candidate in candidates(proposed) {
        match repos.exists(&candidate).await {
            Ok(true) => debug!(candidate = %candidate, "repository name taken"),
            Ok(false) => {
                if candidate != proposed {
                    problems.push(FieldError::malformed(format!(
                        "Model repo cannot be created with proposed slug `{proposed}`."
                    )));
                    problems.push(FieldError::malformed(format!(
                        "Either propose a new slug or repo will be created with name `{candidate}`."
                    )));
                }
                return SlugChoice {
                    slug: candidate,
                    problems,
                };
            }
            Err(err) => {
                problems.push(FieldError::resolution_failed(format!(
                    "Unable to create valid repo name with proposed slug `{proposed}`: `{err}`"
                )));
                return SlugChoice {
                    slug: String::new(),
                    problems,
                };
            }
        }
    }

    problems.push(FieldError::resolution_failed(format!(
        "Unable to create valid repo name with proposed slug `{proposed}`: all {MAX_SLUG_PROBES} candidates are taken"
    )));
    SlugChoice {
        slug: String::new(),
        problems,
    }
}
