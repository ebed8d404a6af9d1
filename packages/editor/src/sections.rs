//! # Résumé Sections
//!
//! Typed section model. Every known section is a variant of [`Section`];
//! free-form sections go through [`Section::Custom`] and are keyed by an
//! arbitrary string in the document's custom section map.
//!
//! Entry structs default every field on deserialization, so partially
//! filled entries coming from forms or older persisted records always
//! load.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a section that can appear in the display order list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionId {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    Interests,
    /// Key into the document's custom section map
    Custom(String),
}

const BUILT_IN: [SectionId; 8] = [
    SectionId::Summary,
    SectionId::Experience,
    SectionId::Education,
    SectionId::Skills,
    SectionId::Projects,
    SectionId::Certifications,
    SectionId::Languages,
    SectionId::Interests,
];

impl SectionId {
    /// Storage key used in the order list
    pub fn key(&self) -> &str {
        match self {
            SectionId::Summary => "summary",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Certifications => "certifications",
            SectionId::Languages => "languages",
            SectionId::Interests => "interests",
            SectionId::Custom(key) => key,
        }
    }

    /// Parse a built-in key. Custom keys need the document to resolve,
    /// see [`crate::Document::resolve_section`].
    pub fn built_in(key: &str) -> Option<SectionId> {
        BUILT_IN.iter().find(|id| id.key() == key).cloned()
    }

    /// Default order list for a fresh document
    pub fn default_order() -> Vec<String> {
        BUILT_IN.iter().map(|id| id.key().to_string()).collect()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Header block. Always rendered, never part of the order list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillEntry {
    pub name: String,
    pub level: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub url: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    pub language: String,
    pub proficiency: String,
}

/// Free-form section with a user supplied title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomSection {
    pub title: String,
    pub items: Vec<CustomItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomItem {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub description: String,
}

/// Wholesale replacement value for one section
///
/// Form collaborators build one of these from their local state and hand it
/// to [`crate::EditSession::update_section`]. The variant names the section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "camelCase")]
pub enum Section {
    PersonalInfo(PersonalInfo),
    Summary(String),
    Experience(Vec<ExperienceEntry>),
    Education(Vec<EducationEntry>),
    Skills(Vec<SkillEntry>),
    Projects(Vec<ProjectEntry>),
    Certifications(Vec<CertificationEntry>),
    Languages(Vec<LanguageEntry>),
    Interests(Vec<String>),
    Custom { key: String, section: CustomSection },
}

impl Section {
    /// Order list identifier, `None` for the header block
    pub fn id(&self) -> Option<SectionId> {
        match self {
            Section::PersonalInfo(_) => None,
            Section::Summary(_) => Some(SectionId::Summary),
            Section::Experience(_) => Some(SectionId::Experience),
            Section::Education(_) => Some(SectionId::Education),
            Section::Skills(_) => Some(SectionId::Skills),
            Section::Projects(_) => Some(SectionId::Projects),
            Section::Certifications(_) => Some(SectionId::Certifications),
            Section::Languages(_) => Some(SectionId::Languages),
            Section::Interests(_) => Some(SectionId::Interests),
            Section::Custom { key, .. } => Some(SectionId::Custom(key.clone())),
        }
    }

    /// Name used in logs and suggestion patches
    pub fn name(&self) -> &str {
        match self {
            Section::PersonalInfo(_) => "personalInfo",
            Section::Summary(_) => "summary",
            Section::Experience(_) => "experience",
            Section::Education(_) => "education",
            Section::Skills(_) => "skills",
            Section::Projects(_) => "projects",
            Section::Certifications(_) => "certifications",
            Section::Languages(_) => "languages",
            Section::Interests(_) => "interests",
            Section::Custom { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_keys_round_trip() {
        for key in SectionId::default_order() {
            let id = SectionId::built_in(&key).unwrap();
            assert_eq!(id.key(), key);
        }
        assert_eq!(SectionId::built_in("hobbies"), None);
    }

    #[test]
    fn test_partial_entry_deserializes() {
        let entry: ExperienceEntry =
            serde_json::from_str(r#"{ "company": "Acme", "highlights": ["shipped"] }"#).unwrap();
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.position, "");
        assert!(!entry.current);
        assert_eq!(entry.highlights, vec!["shipped"]);
    }

    #[test]
    fn test_section_tagged_encoding() {
        let section = Section::Summary("Engineer".to_string());
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["section"], "summary");
        assert_eq!(json["value"], "Engineer");
    }

    #[test]
    fn test_section_names_match_keys() {
        let section = Section::Languages(vec![]);
        assert_eq!(section.name(), SectionId::Languages.key());
        let custom = Section::Custom {
            key: "volunteering".to_string(),
            section: CustomSection::default(),
        };
        assert_eq!(custom.name(), "volunteering");
        assert_eq!(Section::PersonalInfo(PersonalInfo::default()).id(), None);
    }
}
