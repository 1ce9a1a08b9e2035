//! Submission form questions
//!
//! [`FormField`] enumerates every question of the model submission form. Each
//! question has a heading label (as rendered in the issue body) and a section
//! name used when reporting problems back to the submitter. Labels can be
//! overridden from configuration when the form wording changes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One question of the submission form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    /// Associated publication DOI
    PublicationDoi,
    /// Software framework DOI or URI
    SoftwareDoi,
    /// Software source repository
    SoftwareRepository,
    /// Primary software framework name
    SoftwareName,
    /// Software framework authors
    SoftwareAuthors,
    /// Software and algorithm keywords
    SoftwareKeywords,
    /// Submitter ORCID or name
    Submitter,
    /// Model creators
    Creators,
    /// Model contributors
    Contributors,
    /// Proposed repository slug
    Slug,
    /// License choice
    License,
    /// Model categories
    ModelCategory,
    /// Model status
    ModelStatus,
    /// Model title
    Title,
    /// Model description
    Description,
    /// Scientific keywords
    ScientificKeywords,
    /// Funders with optional grant numbers
    Funder,
    /// Whether model code is included
    IncludeModelCode,
    /// Model code and inputs DOI
    ModelCodeDoi,
    /// Model code notes
    ModelCodeNotes,
    /// Whether output data is included
    IncludeModelOutput,
    /// Output data DOI
    ModelOutputDoi,
    /// Output data notes
    ModelOutputNotes,
    /// Output data size
    ModelOutputSize,
    /// Computer the model ran on
    ComputerUri,
    /// Landing page image and caption
    LandingImage,
    /// Animation and caption
    Animation,
    /// Graphic abstract and caption
    GraphicAbstract,
    /// Model setup figure and caption
    ModelSetupFigure,
    /// Model setup description
    ModelSetupDescription,
}

impl FormField {
    /// Every question, in form order
    pub const ALL: [FormField; 30] = [
        Self::PublicationDoi,
        Self::SoftwareDoi,
        Self::SoftwareRepository,
        Self::SoftwareName,
        Self::SoftwareAuthors,
        Self::SoftwareKeywords,
        Self::Submitter,
        Self::Creators,
        Self::Contributors,
        Self::Slug,
        Self::License,
        Self::ModelCategory,
        Self::ModelStatus,
        Self::Title,
        Self::Description,
        Self::ScientificKeywords,
        Self::Funder,
        Self::IncludeModelCode,
        Self::ModelCodeDoi,
        Self::ModelCodeNotes,
        Self::IncludeModelOutput,
        Self::ModelOutputDoi,
        Self::ModelOutputNotes,
        Self::ModelOutputSize,
        Self::ComputerUri,
        Self::LandingImage,
        Self::Animation,
        Self::GraphicAbstract,
        Self::ModelSetupFigure,
        Self::ModelSetupDescription,
    ];

    /// Heading text the issue form renders
    #[must_use]
    pub fn default_label(self) -> &'static str {
        match self {
            Self::PublicationDoi => "-> associated publication DOI",
            Self::SoftwareDoi => "-> software framework DOI/URI",
            Self::SoftwareRepository => "-> software framework source repository",
            Self::SoftwareName => "-> name of primary software framework (e.g. Underworld, ASPECT, Badlands, OpenFOAM)",
            Self::SoftwareAuthors => "-> software framework authors",
            Self::SoftwareKeywords => "-> software & algorithm keywords",
            Self::Submitter => "-> submitter ORCID (or name)",
            Self::Creators => "-> model creators",
            Self::Contributors => "-> model contributors",
            Self::Slug => "-> slug",
            Self::License => "-> license",
            Self::ModelCategory => "-> model category",
            Self::ModelStatus => "-> model status",
            Self::Title => "-> title",
            Self::Description => "-> description",
            Self::ScientificKeywords => "-> scientific keywords",
            Self::Funder => "-> funder",
            Self::IncludeModelCode => "-> include model code ?",
            Self::ModelCodeDoi => "-> model code/inputs DOI",
            Self::ModelCodeNotes => "-> model code/inputs notes",
            Self::IncludeModelOutput => "-> include model output data?",
            Self::ModelOutputDoi => "-> model output data DOI",
            Self::ModelOutputNotes => "-> model output data notes",
            Self::ModelOutputSize => "-> model output data size",
            Self::ComputerUri => "-> computer URI/DOI",
            Self::LandingImage => "-> add landing page image and caption",
            Self::Animation => "-> add an animation (if relevant)",
            Self::GraphicAbstract => "-> add a graphic abstract figure (if relevant)",
            Self::ModelSetupFigure => "-> add a model setup figure (if relevant)",
            Self::ModelSetupDescription => "-> add a description of your model setup",
        }
    }

    /// Section heading in the error log
    #[must_use]
    pub fn section(self) -> &'static str {
        match self {
            Self::PublicationDoi => "Associated Publication",
            Self::SoftwareDoi => "Software Framework DOI/URI",
            Self::SoftwareRepository => "Software Repository",
            Self::SoftwareName => "Name of primary software framework",
            Self::SoftwareAuthors => "Software framework authors",
            Self::SoftwareKeywords => "Software & algorithm keywords",
            Self::Submitter => "Submitter",
            Self::Creators => "Model creators",
            Self::Contributors => "Model contributors",
            Self::Slug => "Model Repository Slug",
            Self::License => "License",
            Self::ModelCategory => "Model category",
            Self::ModelStatus => "Model status",
            Self::Title => "Title",
            Self::Description => "Description",
            Self::ScientificKeywords => "Scientific keywords",
            Self::Funder => "Funder",
            Self::IncludeModelCode => "Include model code",
            Self::ModelCodeDoi => "Model code/inputs DOI",
            Self::ModelCodeNotes => "Model code/inputs notes",
            Self::IncludeModelOutput => "Include model output data",
            Self::ModelOutputDoi => "Model output DOI",
            Self::ModelOutputNotes => "Model output notes",
            Self::ModelOutputSize => "Model output size",
            Self::ComputerUri => "Computer URI/DOI",
            Self::LandingImage => "Landing page image",
            Self::Animation => "Animation",
            Self::GraphicAbstract => "Graphic abstract",
            Self::ModelSetupFigure => "Model setup figure",
            Self::ModelSetupDescription => "Model setup description",
        }
    }
}

/// Heading labels, with per-field overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormLabels {
    overrides: IndexMap<FormField, String>,
}

impl FormLabels {
    /// Default labels
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a replacement label for one field
    #[must_use]
    pub fn with_label(mut self, field: FormField, label: impl Into<String>) -> Self {
        self.overrides.insert(field, label.into());
        self
    }

    /// Label for a field
    #[must_use]
    pub fn label(&self, field: FormField) -> &str {
        self.overrides
            .get(&field)
            .map_or_else(|| field.default_label(), String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_are_distinct() {
        let labels = FormLabels::new();
        let distinct: HashSet<_> = FormField::ALL.iter().map(|f| labels.label(*f)).collect();
        assert_eq!(distinct.len(), FormField::ALL.len());
    }

    #[test]
    fn override_from_yaml() {
        let labels: FormLabels = serde_yaml::from_str("slug: '-> repository slug'\n").unwrap();
        assert_eq!(labels.label(FormField::Slug), "-> repository slug");
        assert_eq!(labels.label(FormField::Title), "-> title");
    }
}
