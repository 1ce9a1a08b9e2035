use mate_intake::{Collaborators, FormField, IntakeConfig, RecordAssembler, RecordKind};
use mate_record::Severity;
use mate_test_utils::{
    FakeRegistry, IssueBody, ANU_ROR, ASSET_URL, ORCID_JONES, ORCID_SMITH, PUBLICATION_DOI, SOFTWARE_DOI,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config() -> IntakeConfig {
    IntakeConfig::embedded().unwrap()
}

#[tokio::test]
async fn slug_only_issue_warns_for_every_other_question() {
    let registry = FakeRegistry::new();
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let assembled = assembler.parse_issue("### -> slug\r\nsmith-2024-basalt").await;

    assert_eq!(assembled.record.get_str("slug"), Some("smith-2024-basalt"));
    assert_eq!(assembled.log.count(Severity::Error), 0);
    assert_eq!(assembled.log.count(Severity::Warning), 29);
    assert!(registry.lookups().is_empty());
}

#[tokio::test]
async fn unanswered_form_keeps_record_shape() {
    let registry = FakeRegistry::new();
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let body = IssueBody::new().answer(FormField::Slug, "smith-2024-basalt").build();
    let record = assembler.parse_issue(&body).await.record;

    assert_eq!(record.get("creators"), Some(&json!([])));
    assert_eq!(record.get("contributors"), Some(&json!([])));
    assert_eq!(record.get("keywords"), Some(&json!([])));
    assert_eq!(record.get("publication"), Some(&json!({})));
    assert_eq!(record.get("include_model_code"), Some(&json!(false)));
    assert_eq!(
        record.get("landing_image"),
        Some(&json!({"filename": "", "url": "", "caption": ""}))
    );
    assert_eq!(record.get("for_codes").and_then(|f| f.get("termCode")), Some(&json!("370401")));
}

#[tokio::test]
async fn full_submission_resolves_registries() {
    let registry = FakeRegistry::populated().with_taken_repo("smith-2020-basalt");
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let body = IssueBody::new()
        .answer(FormField::PublicationDoi, &format!("https://doi.org/{PUBLICATION_DOI}"))
        .answer(FormField::SoftwareDoi, &format!("https://doi.org/{SOFTWARE_DOI}"))
        .answer(FormField::SoftwareRepository, "https://github.com/underworldcode/underworld2")
        .answer(FormField::Submitter, ORCID_JONES)
        .answer(FormField::Creators, &format!("{ORCID_SMITH}\r\nhttps://orcid.org/{ORCID_JONES}"))
        .answer(FormField::Contributors, &format!("https://orcid.org/{ORCID_SMITH}"))
        .answer(FormField::Slug, "smith-2020-basalt")
        .answer(FormField::License, "CC BY 4.0")
        .answer(FormField::ModelCategory, "model published in study")
        .answer(FormField::ModelStatus, "completed")
        .answer(FormField::ScientificKeywords, "mantle convection, basalt")
        .answer(FormField::Funder, &format!("{ANU_ROR}, DP200100000\r\nhttps://www.anu.edu.au"))
        .answer(FormField::IncludeModelOutput, "- [X] yes")
        .answer(FormField::ModelOutputSize, "2.5 GB")
        .answer(FormField::LandingImage, &format!("![plume.png]({ASSET_URL})\r\n\r\nPlume head at 40 Myr"))
        .build();

    let assembled = assembler.parse_issue(&body).await;
    let record = &assembled.record;

    assert_eq!(record.get_str("slug"), Some("smith-2020-basalt-1"));
    assert_eq!(record.get_str("title"), Some("Basalt flows on a cooling planet"));
    assert_eq!(record.get_str("description"), Some("Lava spreads and cools."));
    assert_eq!(record.get("software").and_then(|s| s.get("name")), Some(&json!("Underworld2")));
    assert_eq!(
        record.get("software").and_then(|s| s.get("codeRepository")),
        Some(&json!("https://github.com/underworldcode/underworld2"))
    );

    let creators = record.get("creators").and_then(|c| c.as_array()).unwrap();
    assert_eq!(creators.len(), 2);
    assert_eq!(creators[0]["familyName"], "Smith");
    assert_eq!(creators[1]["familyName"], "Jones");
    // Smith is a creator and Jones, the submitter, already listed
    assert_eq!(record.get("contributors"), Some(&json!([])));
    assert_eq!(record.get("submitter").and_then(|s| s.get("givenName")), Some(&json!("Ana")));

    assert_eq!(record.get("keywords"), Some(&json!(["mantle convection", "basalt"])));
    assert_eq!(
        record.get("license").and_then(|l| l.get("url")),
        Some(&json!("https://creativecommons.org/licenses/by/4.0/"))
    );

    let funders = record.get("funder").and_then(|f| f.as_array()).unwrap();
    assert_eq!(funders.len(), 1);
    assert_eq!(funders[0]["@id"], ANU_ROR);
    assert_eq!(record.get("funding").and_then(|f| f[0].get("identifier")), Some(&json!("DP200100000")));

    assert_eq!(record.get("include_model_output"), Some(&json!(true)));
    assert_eq!(
        record.get("model_output_data").and_then(|o| o.get("size")),
        Some(&json!("2.5 GB"))
    );
    assert_eq!(
        record.get("landing_image"),
        Some(&json!({"filename": "plume.png", "url": ASSET_URL, "caption": "Plume head at 40 Myr"}))
    );

    assert_eq!(assembled.log.count(Severity::Error), 0);
    let slug_notes: Vec<_> = assembled.log.section(FormField::Slug.section()).collect();
    assert_eq!(slug_notes.len(), 2);
    assert!(slug_notes[1].message.contains("smith-2020-basalt-1"));

    let lookups = registry.lookups();
    assert_eq!(lookups[0], (RecordKind::Publication, PUBLICATION_DOI.to_string()));
    assert_eq!(lookups[1], (RecordKind::Software, SOFTWARE_DOI.to_string()));
}

#[tokio::test]
async fn creators_fall_back_to_publication_authors() {
    let registry = FakeRegistry::populated();
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let body = IssueBody::new()
        .answer(FormField::PublicationDoi, PUBLICATION_DOI)
        .answer(FormField::Slug, "smith-2020-basalt")
        .build();
    let assembled = assembler.parse_issue(&body).await;

    let creators = assembled.record.get("creators").and_then(|c| c.as_array()).unwrap();
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0]["familyName"], "Smith");
    assert_eq!(assembled.log.section(FormField::Creators.section()).count(), 0);
}

#[tokio::test]
async fn unresolvable_answers_are_errors() {
    let registry = FakeRegistry::new().with_dead_uri("https://example.org/missing");
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let body = IssueBody::new()
        .answer(FormField::PublicationDoi, "https://doi.org/10.1000/unknown")
        .answer(FormField::ComputerUri, "https://example.org/missing")
        .answer(FormField::Slug, "smith-2020-basalt")
        .build();
    let assembled = assembler.parse_issue(&body).await;

    assert_eq!(assembled.record.get("publication"), Some(&json!({})));
    assert_eq!(assembled.record.get_str("computer_uri"), Some(""));
    assert_eq!(assembled.log.count(Severity::Error), 2);
    assert!(assembled.log.render().contains("**Associated Publication**"));
}

#[tokio::test]
async fn repository_lookup_failure_empties_slug() {
    let registry = FakeRegistry::new().with_failing_repo_lookup();
    let config = config();
    let assembler = RecordAssembler::new(&config, Collaborators::from_one(&registry));

    let assembled = assembler.parse_issue("### -> slug\r\nsmith-2024-basalt").await;

    assert_eq!(assembled.record.get_str("slug"), Some(""));
    assert_eq!(assembled.log.count(Severity::Error), 1);
}
