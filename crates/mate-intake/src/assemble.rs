//! Record assembly
//!
//! [`RecordAssembler::parse_issue`] walks the submission form in dependency
//! order and builds the [`SubmissionRecord`]. The publication and software
//! records come first because later questions fall back on them. Every
//! problem is caught where it happens and written to the [`ErrorLog`]; a
//! question that cannot be answered leaves an empty value behind and never
//! stops the parse.

use crate::entity::{reconcile_roles, EntityResolver};
use crate::extract::{Answer, FieldExtractor, IssueFields};
use crate::form::{FormField, FormLabels};
use crate::funding::parse_funding;
use crate::images::{parse_image_and_caption, ImageRecord};
use crate::license::LicenseTable;
use crate::metadata::{normalize_publication, normalize_software, software_stub};
use crate::resolve::{Collaborators, RecordKind};
use crate::slug::{choose_repository_slug, validate_slug};
use crate::text::{extract_doi, has_doi, parse_size, parse_yes_no, split_list};
use mate_record::{ErrorLog, FieldError, FieldResult, IdentityRecord, Metadata, RecordBuilder, SubmissionRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// Default ANZSRC field-of-research term for every model
fn default_for_codes() -> Value {
    json!({
        "@id": "https://linked.data.gov.au/def/anzsrc-for/2020/370401",
        "@type": "DefinedTerm",
        "name": "Computational modelling and simulation in earth sciences",
        "termCode": "370401"
    })
}

fn default_asset_prefixes() -> Vec<String> {
    vec![
        "https://github.com/ModelAtlasofTheEarth/model_submission/assets/".to_string(),
        "https://github.com/user-attachments/assets/".to_string(),
    ]
}

/// Static inputs of record assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Form heading labels
    #[serde(default)]
    pub labels: FormLabels,
    /// URL prefixes identifying uploaded assets in image answers
    #[serde(default = "default_asset_prefixes")]
    pub asset_prefixes: Vec<String>,
    /// Field-of-research term attached to every record
    #[serde(default = "default_for_codes")]
    pub for_codes: Value,
    /// License lookup table
    pub licenses: LicenseTable,
}

impl IntakeConfig {
    /// Create config around a license table
    #[must_use]
    pub fn new(licenses: LicenseTable) -> Self {
        Self {
            labels: FormLabels::new(),
            asset_prefixes: default_asset_prefixes(),
            for_codes: default_for_codes(),
            licenses,
        }
    }

    /// Config using the embedded license table
    ///
    /// # Errors
    /// Fails only if the embedded license table is corrupt.
    pub fn embedded() -> FieldResult<Self> {
        LicenseTable::embedded().map(Self::new)
    }

    /// With form labels
    #[must_use]
    pub fn with_labels(mut self, labels: FormLabels) -> Self {
        self.labels = labels;
        self
    }

    /// With asset prefixes
    #[must_use]
    pub fn with_asset_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.asset_prefixes = prefixes;
        self
    }

    /// With field-of-research term
    #[must_use]
    pub fn with_for_codes(mut self, for_codes: Value) -> Self {
        self.for_codes = for_codes;
        self
    }
}

/// Result of parsing one issue
#[derive(Debug, Clone)]
pub struct Assembled {
    /// The frozen record
    pub record: SubmissionRecord,
    /// Everything worth telling the submitter
    pub log: ErrorLog,
    /// Raw extracted answers
    pub fields: IssueFields,
}

/// Per-parse working state
struct Pass<'f> {
    fields: &'f IssueFields,
    labels: &'f FormLabels,
    record: RecordBuilder,
    log: ErrorLog,
}

impl<'f> Pass<'f> {
    fn answer(&self, field: FormField) -> Answer<'f> {
        self.fields.answer(self.labels.label(field))
    }

    fn missing(&mut self, field: FormField, message: &str) {
        self.log.warn(field.section(), message);
    }

    fn error(&mut self, field: FormField, message: impl Into<String>) {
        self.log.error(field.section(), message);
    }

    fn notes(&mut self, field: FormField, text: &str) {
        self.log.push_text(field.section(), text);
    }

    fn problem(&mut self, field: FormField, error: &FieldError) {
        self.log.record(field.section(), error);
    }

    /// Non-empty field of the publication record
    fn from_publication(&self, key: &str) -> Option<Value> {
        self.record
            .get("publication")
            .and_then(|p| p.get(key))
            .filter(|v| !mate_record::access::is_vacant(v))
            .cloned()
    }
}

/// Builds submission records from issue bodies
#[derive(Debug, Clone, Copy)]
pub struct RecordAssembler<'a> {
    config: &'a IntakeConfig,
    collaborators: Collaborators<'a>,
}

impl<'a> RecordAssembler<'a> {
    /// Create assembler
    #[must_use]
    pub fn new(config: &'a IntakeConfig, collaborators: Collaborators<'a>) -> Self {
        Self { config, collaborators }
    }

    fn entities(&self) -> EntityResolver<'a> {
        EntityResolver::new(self.collaborators.records, self.collaborators.organizations)
    }

    /// Parse an issue body into a record and its error log
    pub async fn parse_issue(&self, body: &str) -> Assembled {
        let fields = FieldExtractor::new().extract(body);
        info!(questions = fields.len(), "parsing submission issue");

        let (record, log) = {
            let mut pass = Pass {
                fields: &fields,
                labels: &self.config.labels,
                record: RecordBuilder::new(),
                log: ErrorLog::new(),
            };

            self.publication(&mut pass).await;
            self.software(&mut pass).await;
            self.people(&mut pass).await;
            self.slug(&mut pass).await;
            self.descriptive(&mut pass).await;
            self.code_and_output(&mut pass).await;
            self.computer(&mut pass).await;
            self.images(&mut pass);
            self.setup_description(&mut pass);

            (pass.record.build(), pass.log)
        };

        info!(entries = log.entries().len(), "submission parsed");
        Assembled { record, log, fields }
    }

    async fn publication(&self, pass: &mut Pass<'_>) {
        let field = FormField::PublicationDoi;
        let publication = match pass.answer(field) {
            Answer::Missing => {
                pass.missing(field, "No DOI provided.");
                Value::Object(Map::new())
            }
            Answer::Given(text) => self.fetch_publication(pass, text).await,
        };
        pass.record.set("publication", publication);
    }

    async fn fetch_publication(&self, pass: &mut Pass<'_>, text: &str) -> Value {
        let field = FormField::PublicationDoi;
        let doi = extract_doi(text);
        if !has_doi(&doi) {
            pass.error(field, format!("`{text}`: {doi}"));
            return Value::Object(Map::new());
        }

        let fetched = self.collaborators.records.get_record(RecordKind::Publication, &doi).await;
        pass.notes(field, &fetched.log);
        if fetched.is_empty() {
            pass.error(field, format!("unable to obtain metadata for DOI `{doi}`"));
            return Value::Object(Map::new());
        }

        match normalize_publication(Metadata::classify(fetched.metadata)) {
            Ok(publication) => publication,
            Err(err) => {
                pass.problem(field, &err);
                Value::Object(Map::new())
            }
        }
    }

    async fn software(&self, pass: &mut Pass<'_>) {
        let mut software = match pass.answer(FormField::SoftwareDoi) {
            Answer::Missing => {
                pass.missing(FormField::SoftwareDoi, "no DOI/URI provided.");
                software_stub("")
            }
            Answer::Given(text) => self.fetch_software(pass, text).await,
        };

        let field = FormField::SoftwareRepository;
        match pass.answer(field) {
            Answer::Missing => pass.missing(field, "no repository URL provided."),
            Answer::Given(url) => match self.collaborators.uris.check_uri(url).await {
                Ok(()) => {
                    software.insert("codeRepository".into(), json!(url));
                }
                Err(message) => pass.error(field, message),
            },
        }

        let field = FormField::SoftwareName;
        match pass.answer(field) {
            Answer::Given(name) => {
                software.insert("name".into(), json!(name));
            }
            Answer::Missing if software.contains_key("name") => {}
            Answer::Missing => pass.missing(field, "no name found"),
        }

        let field = FormField::SoftwareAuthors;
        match pass.answer(field) {
            Answer::Given(block) => {
                let authors = self.entities().resolve_list(block).await;
                pass.notes(field, &authors.log);
                let authors: Vec<Value> = authors.value.iter().map(IdentityRecord::to_value).collect();
                software.insert("author".into(), Value::Array(authors));
            }
            Answer::Missing if software.contains_key("author") => {}
            Answer::Missing => pass.missing(field, "no authors found"),
        }

        let field = FormField::SoftwareKeywords;
        match pass.answer(field) {
            Answer::Given(text) => {
                software.insert("keywords".into(), json!(split_list(text)));
            }
            Answer::Missing => pass.missing(field, "no keywords given."),
        }

        pass.record.set("software", Value::Object(software));
    }

    async fn fetch_software(&self, pass: &mut Pass<'_>, text: &str) -> Map<String, Value> {
        let field = FormField::SoftwareDoi;
        let doi = extract_doi(text);
        if !has_doi(&doi) {
            pass.problem(
                field,
                &FieldError::unsupported(format!("`{text}` is not a DOI; only DOI records can be looked up")),
            );
            return software_stub(text);
        }

        let fetched = self.collaborators.records.get_record(RecordKind::Software, &doi).await;
        pass.notes(field, &fetched.log);
        if fetched.is_empty() {
            pass.error(field, format!("unable to obtain metadata for DOI `{doi}`"));
            return software_stub(text);
        }

        match normalize_software(Metadata::classify(fetched.metadata), text) {
            Ok(Value::Object(software)) => software,
            Ok(_) => software_stub(text),
            Err(err) => {
                pass.problem(field, &err);
                software_stub(text)
            }
        }
    }

    async fn people(&self, pass: &mut Pass<'_>) {
        let entities = self.entities();

        let field = FormField::Submitter;
        let submitter = match pass.answer(field) {
            Answer::Given(text) => {
                let resolved = entities.resolve_identity(text).await;
                pass.notes(field, &resolved.log);
                resolved.value
            }
            Answer::Missing => {
                pass.missing(field, "No submitter provided.");
                None
            }
        };

        let field = FormField::Creators;
        let creators = match pass.answer(field) {
            Answer::Given(block) => {
                let resolved = entities.resolve_list(block).await;
                pass.notes(field, &resolved.log);
                resolved.value
            }
            Answer::Missing => match pass.from_publication("author") {
                Some(Value::Array(authors)) => authors.iter().filter_map(IdentityRecord::from_value).collect(),
                _ => {
                    pass.missing(field, "no creators found");
                    Vec::new()
                }
            },
        };

        let field = FormField::Contributors;
        let contributors = match pass.answer(field) {
            Answer::Given(block) => {
                let resolved = entities.resolve_list(block).await;
                pass.notes(field, &resolved.log);
                resolved.value
            }
            Answer::Missing => {
                pass.missing(field, "No contributors listed.");
                Vec::new()
            }
        };

        let roles = reconcile_roles(submitter.as_ref(), creators, contributors);
        debug!(
            creators = roles.creators.len(),
            contributors = roles.contributors.len(),
            "roles reconciled"
        );

        let submitter = submitter.map_or_else(|| Value::Object(Map::new()), |s| s.to_value());
        pass.record.set("submitter", submitter);
        pass.record.set_serialized("creators", &roles.creators);
        pass.record.set_serialized("contributors", &roles.contributors);
    }

    async fn slug(&self, pass: &mut Pass<'_>) {
        let field = FormField::Slug;
        let Answer::Given(proposed) = pass.answer(field) else {
            pass.missing(field, "No slug provided.");
            pass.record.set("slug", "");
            return;
        };

        for problem in validate_slug(proposed) {
            pass.missing(field, problem.message());
        }

        let choice = choose_repository_slug(proposed, self.collaborators.repos).await;
        for problem in &choice.problems {
            match problem {
                FieldError::ResolutionFailed(_) => pass.problem(field, problem),
                _ => pass.missing(field, problem.message()),
            }
        }
        pass.record.set("slug", choice.slug);
    }

    async fn descriptive(&self, pass: &mut Pass<'_>) {
        pass.record.set("for_codes", self.config.for_codes.clone());

        let field = FormField::License;
        let license = match pass.answer(field) {
            Answer::Given(choice) => match self.config.licenses.lookup(choice) {
                Ok(license) => serde_json::to_value(license).unwrap_or_else(|_| json!({ "name": choice })),
                Err(err) => {
                    pass.problem(field, &err);
                    json!({ "name": choice })
                }
            },
            Answer::Missing => {
                pass.missing(field, "No license selected.");
                Value::Object(Map::new())
            }
        };
        pass.record.set("license", license);

        for (field, key, message) in [
            (FormField::ModelCategory, "model_category", "No category selected"),
            (FormField::ModelStatus, "model_status", "No status selected"),
        ] {
            let values = match pass.answer(field) {
                Answer::Given(text) => split_list(text),
                Answer::Missing => {
                    pass.missing(field, message);
                    Vec::new()
                }
            };
            pass.record.set(key, json!(values));
        }

        for (field, key, fallback, message) in [
            (FormField::Title, "title", "name", "no title found"),
            (
                FormField::Description,
                "description",
                "abstract",
                "no description found, nor abstract for associated publication",
            ),
        ] {
            let value = match pass.answer(field) {
                Answer::Given(text) => json!(text),
                Answer::Missing => pass.from_publication(fallback).unwrap_or_else(|| {
                    pass.missing(field, message);
                    json!("")
                }),
            };
            pass.record.set(key, value);
        }

        let field = FormField::ScientificKeywords;
        let keywords = match pass.answer(field) {
            Answer::Given(text) => split_list(text),
            Answer::Missing => {
                pass.missing(field, "No keywords given");
                Vec::new()
            }
        };
        pass.record.set("keywords", json!(keywords));

        let field = FormField::Funder;
        let (funders, grants) = match pass.answer(field) {
            Answer::Given(block) => {
                let funding = parse_funding(&self.entities(), block).await;
                pass.notes(field, &funding.log);
                let funders: Vec<Value> = funding.value.funders.iter().map(IdentityRecord::to_value).collect();
                let grants = serde_json::to_value(&funding.value.grants).unwrap_or_else(|_| json!([]));
                (Value::Array(funders), grants)
            }
            Answer::Missing => match pass.from_publication("funder") {
                Some(funders) => (funders, json!([])),
                None => {
                    pass.missing(field, "No funders provided or found in publication.");
                    (json!([]), json!([]))
                }
            },
        };
        pass.record.set("funder", funders);
        pass.record.set("funding", grants);
    }

    async fn checked_uri(&self, pass: &mut Pass<'_>, field: FormField, missing: &str) -> String {
        match pass.answer(field) {
            Answer::Given(uri) => match self.collaborators.uris.check_uri(uri).await {
                Ok(()) => uri.to_string(),
                Err(message) => {
                    pass.error(field, message);
                    String::new()
                }
            },
            Answer::Missing => {
                pass.missing(field, missing);
                String::new()
            }
        }
    }

    fn text_or_warn(pass: &mut Pass<'_>, field: FormField, missing: &str) -> String {
        match pass.answer(field) {
            Answer::Given(text) => text.to_string(),
            Answer::Missing => {
                pass.missing(field, missing);
                String::new()
            }
        }
    }

    fn flag(pass: &mut Pass<'_>, field: FormField) -> bool {
        match pass.answer(field) {
            Answer::Given(text) => parse_yes_no(text),
            Answer::Missing => {
                pass.missing(field, "No choice made.");
                false
            }
        }
    }

    async fn code_and_output(&self, pass: &mut Pass<'_>) {
        let include_code = Self::flag(pass, FormField::IncludeModelCode);
        pass.record.set("include_model_code", include_code);

        let doi = self
            .checked_uri(pass, FormField::ModelCodeDoi, "No DOI/URI provided.")
            .await;
        let notes = Self::text_or_warn(pass, FormField::ModelCodeNotes, "No notes provided.");
        pass.record.set("model_code_inputs", json!({ "doi": doi, "notes": notes }));

        let include_output = Self::flag(pass, FormField::IncludeModelOutput);
        pass.record.set("include_model_output", include_output);

        let doi = self
            .checked_uri(pass, FormField::ModelOutputDoi, "No DOI/URI provided.")
            .await;
        let notes = Self::text_or_warn(pass, FormField::ModelOutputNotes, "No notes provided.");
        let size = Self::text_or_warn(pass, FormField::ModelOutputSize, "No size provided.");

        let mut output = json!({ "doi": doi, "notes": notes, "size": size });
        if !size.is_empty() {
            match parse_size(&size) {
                Ok(bytes) => output["size_bytes"] = json!(bytes),
                // The text is kept, so this is only a warning
                Err(err) => pass.missing(FormField::ModelOutputSize, err.message()),
            }
        }
        pass.record.set("model_output_data", output);
    }

    async fn computer(&self, pass: &mut Pass<'_>) {
        let uri = self
            .checked_uri(pass, FormField::ComputerUri, "No URI/DOI provided.")
            .await;
        pass.record.set("computer_uri", uri);
    }

    fn images(&self, pass: &mut Pass<'_>) {
        for (field, key, default_name) in [
            (FormField::LandingImage, "landing_image", "landing_image"),
            (FormField::Animation, "animation", "animation"),
            (FormField::GraphicAbstract, "graphic_abstract", "graphic_abstract"),
            (FormField::ModelSetupFigure, "model_setup_figure", "model_setup"),
        ] {
            let image = match pass.answer(field) {
                Answer::Given(block) => {
                    let (image, problems) = parse_image_and_caption(block, default_name, &self.config.asset_prefixes);
                    for problem in &problems {
                        pass.problem(field, problem);
                    }
                    image
                }
                Answer::Missing => {
                    let message = if field == FormField::Animation {
                        "No animation uploaded."
                    } else {
                        "No image uploaded."
                    };
                    pass.missing(field, message);
                    ImageRecord::default()
                }
            };
            pass.record.set_serialized(key, &image);
        }
    }

    fn setup_description(&self, pass: &mut Pass<'_>) {
        let text = Self::text_or_warn(pass, FormField::ModelSetupDescription, "No description given");
        pass.record.set("model_setup_description", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = IntakeConfig::embedded().unwrap();
        assert_eq!(config.for_codes["termCode"], "370401");
        assert_eq!(config.asset_prefixes.len(), 2);
        assert_eq!(config.labels.label(FormField::Slug), "-> slug");
    }

    #[test]
    fn config_from_yaml_fills_defaults() {
        let yaml = "licenses:\n  version: 1\n  licenses: {}\n";
        let config: IntakeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.for_codes, default_for_codes());
        assert_eq!(config.asset_prefixes, default_asset_prefixes());
    }
}
