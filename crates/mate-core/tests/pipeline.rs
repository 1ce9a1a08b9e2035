use mate_core::pipeline::{CRATE_FILE, PAGE_FILE, README_FILE, TRAIL_BODY_FILE, TRAIL_DICT_FILE, WEBSITE_CRATE_FILE};
use mate_core::{Crosswalk, Pipeline, PipelineError};
use mate_intake::{Collaborators, FormField};
use mate_test_utils::{
    FakeMedia, FakeRegistry, FakeTemplates, IssueBody, MemorySink, ASSET_URL, ORCID_SMITH, PUBLICATION_DOI,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const TIMESTAMP: &str = "2024-05-01T12:30:05.000Z";
const REPOSITORY: (&str, &str) = ("ModelAtlasofTheEarth", "smith-2020-basalt");

fn issue() -> String {
    IssueBody::new()
        .answer(FormField::PublicationDoi, PUBLICATION_DOI)
        .answer(FormField::Submitter, ORCID_SMITH)
        .answer(FormField::Creators, ORCID_SMITH)
        .answer(FormField::Slug, "smith-2020-basalt")
        .answer(FormField::License, "CC BY 4.0")
        .answer(FormField::ModelCategory, "model published in study")
        .answer(FormField::ScientificKeywords, "Mantle convection, basalt")
        .answer(FormField::LandingImage, &format!("![plume.png]({ASSET_URL})\r\nPlume head at 40 Myr"))
        .answer(FormField::ModelSetupDescription, "A 2D box heated from below.")
        .build()
}

struct Fixture {
    crosswalk: Crosswalk,
    registry: FakeRegistry,
    templates: FakeTemplates,
}

impl Fixture {
    fn new() -> Self {
        Self::with_templates(FakeTemplates::new())
    }

    fn with_templates(templates: FakeTemplates) -> Self {
        Self {
            crosswalk: Crosswalk::embedded().unwrap(),
            registry: FakeRegistry::populated(),
            templates,
        }
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.crosswalk, Collaborators::from_one(&self.registry), &self.templates).unwrap()
    }
}

fn media() -> FakeMedia {
    FakeMedia::new().with_file(ASSET_URL, b"\x89PNG plume")
}

#[tokio::test]
async fn publish_writes_artifacts_in_order() {
    let fixture = Fixture::new();
    let sink = MemorySink::new();

    let summary = fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap();

    let expected = vec![
        CRATE_FILE,
        WEBSITE_CRATE_FILE,
        TRAIL_BODY_FILE,
        TRAIL_DICT_FILE,
        README_FILE,
        PAGE_FILE,
        "website_material/graphics/plume.png",
    ];
    assert_eq!(sink.written_paths(), expected);
    assert_eq!(summary.files, expected);
    assert!(summary.crate_written);

    assert_eq!(
        sink.topics(),
        Some(vec![
            "model-published-in-study".to_string(),
            "mantle-convection".to_string(),
            "basalt".to_string()
        ])
    );
    assert_eq!(
        sink.comments(),
        vec!["Model repository created at https://github.com/ModelAtlasofTheEarth/smith-2020-basalt".to_string()]
    );
    assert_eq!(
        sink.file("website_material/graphics/plume.png").unwrap().content,
        b"\x89PNG plume".to_vec()
    );
}

#[tokio::test]
async fn published_crate_describes_the_model() {
    let fixture = Fixture::new();
    let sink = MemorySink::new();
    fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap();

    let crate_file = sink.file(CRATE_FILE).unwrap();
    assert_eq!(crate_file.message, "add ro-crate");
    assert_eq!(sink.file(WEBSITE_CRATE_FILE).unwrap().content, crate_file.content);

    let document: Value = serde_json::from_slice(&crate_file.content).unwrap();
    let graph = document["@graph"].as_array().unwrap();
    let root = graph.iter().find(|n| n["@id"] == "./").unwrap();
    assert_eq!(root["name"], "smith-2020-basalt");
    assert_eq!(root["datePublished"], TIMESTAMP);
    assert_eq!(root["creator"], json!([{"@id": format!("https://orcid.org/{ORCID_SMITH}")}]));
}

#[tokio::test]
async fn metadata_trail_keeps_the_raw_issue() {
    let fixture = Fixture::new();
    let sink = MemorySink::new();
    let body = issue();
    fixture
        .pipeline()
        .publish(&body, TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap();

    assert_eq!(sink.file(TRAIL_BODY_FILE).unwrap().text(), body);
    let answers: Value = serde_json::from_slice(&sink.file(TRAIL_DICT_FILE).unwrap().content).unwrap();
    assert_eq!(answers["-> slug"].as_str().map(str::trim), Some("smith-2020-basalt"));
    assert_eq!(answers.as_object().unwrap().len(), FormField::ALL.len());
}

#[tokio::test]
async fn existing_readme_is_updated() {
    let fixture = Fixture::new();
    let sink = MemorySink::new().with_file(README_FILE, "# smith-2020-basalt\n");
    fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap();

    let readme = sink.file(README_FILE).unwrap();
    assert_eq!(readme.message, "Updated the README.md");
    assert_eq!(readme.sha.as_deref(), Some("sha-20"));
    assert!(readme.text().starts_with("# New [M@TE](https://mate.science/)!"));
    assert!(readme.text().contains("Basalt flows on a cooling planet"));
}

#[tokio::test]
async fn crate_failure_is_reported_and_publishing_continues() {
    let fixture = Fixture::with_templates(FakeTemplates::unavailable());
    let sink = MemorySink::new();

    let summary = fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap();

    assert!(!summary.crate_written);
    assert!(!sink.written_paths().iter().any(|p| p.ends_with(CRATE_FILE)));
    assert!(sink.written_paths().contains(&PAGE_FILE.to_string()));

    let comments = sink.comments();
    assert_eq!(comments.len(), 2);
    assert!(comments[0].starts_with("# M@TE crate"));
    assert!(comments[1].starts_with("Model repository created at"));
}

#[tokio::test]
async fn failed_download_skips_the_file() {
    let fixture = Fixture::new();
    let sink = MemorySink::new();

    let summary = fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &FakeMedia::new(), REPOSITORY)
        .await
        .unwrap();

    assert!(!summary.files.iter().any(|p| p.contains("graphics")));
    assert_eq!(sink.comments().len(), 1);
}

#[tokio::test]
async fn failed_write_stops_publishing() {
    let fixture = Fixture::new();
    let sink = MemorySink::new().failing_on(PAGE_FILE);

    let err = fixture
        .pipeline()
        .publish(&issue(), TIMESTAMP, &sink, &media(), REPOSITORY)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Sink(_)));
    assert_eq!(sink.written_paths().last().map(String::as_str), Some(README_FILE));
    assert!(sink.comments().is_empty());
    assert_eq!(sink.topics(), None);
}

#[tokio::test]
async fn website_page_follows_the_crosswalk() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let assembled = pipeline.parse(&issue()).await;

    let rendered = pipeline.render_page(&assembled.record, TIMESTAMP).unwrap();
    let page = &rendered.document;

    assert_eq!(page["templateKey"], "model");
    assert_eq!(page["date"], TIMESTAMP);
    assert_eq!(page["slug"], "smith-2020-basalt");
    assert_eq!(page["for_codes"], json!([370401]));
    assert_eq!(page["submitter"]["ORCID"], ORCID_SMITH);
    assert_eq!(page["creators"][0]["family_name"], "Smith");
    assert_eq!(page["creators"][0]["ORCID"], ORCID_SMITH);
    assert_eq!(page["research_tags"], json!(["Mantle convection", "basalt"]));
    assert_eq!(page["images"]["landing_image"]["src"], "./graphics/plume.png");
    assert_eq!(page["images"]["graphic_abstract"]["src"], Value::Null);
    assert_eq!(page["associated_publication"]["title"], "Basalt flows on a cooling planet");
    assert_eq!(page["associated_publication"]["publisher"], "American Geophysical Union");

    assert!(rendered.page.starts_with("---\n"));
    assert!(rendered.page.ends_with("---\nA 2D box heated from below.\n"));
}

#[tokio::test]
async fn report_is_posted_on_the_issue() {
    let fixture = Fixture::new();
    let sink = MemorySink::new();

    let assembled = fixture.pipeline().report(&issue(), &sink).await.unwrap();

    let comments = sink.comments();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].starts_with("Thank you for submitting."));
    assert!(comments[0].contains("# Errors and Warnings"));
    assert!(comments[0].contains("# Parsed data"));
    assert!(comments[0].contains(&assembled.log.render()));
    assert!(sink.writes().is_empty());
}
