//! # Document
//!
//! The authoritative résumé record held by an edit session.
//!
//! ## Lifecycle
//!
//! ```text
//! new / hydrate → EditSession mutations → Persistence snapshot → drop
//! ```
//!
//! Hydration never fails: a record missing sections, or carrying sections of
//! the wrong shape, loads with those sections defaulted to empty containers
//! so a new or partial document is always editable.

use crate::sections::{
    CertificationEntry, CustomSection, EducationEntry, ExperienceEntry, LanguageEntry,
    PersonalInfo, ProjectEntry, Section, SectionId, SkillEntry,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted identity assigned by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identity
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Editable résumé document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    /// Persisted identity, `None` until the first successful save
    pub id: Option<DocumentId>,

    pub title: String,

    /// Template reference, resolved by the rendering collaborator
    pub template: String,

    /// Locale tag (BCP 47)
    pub locale: String,

    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub interests: Vec<String>,
    pub custom_sections: BTreeMap<String, CustomSection>,

    /// Display order of section keys. May hold keys this version does not
    /// know; they are kept for storage and skipped by renderers.
    pub section_order: Vec<String>,

    /// User supplied display names, keyed by section key
    pub section_names: BTreeMap<String, String>,

    /// Set by persistence collaborators on write
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const DEFAULT_TEMPLATE: &'static str = "classic";
    pub const DEFAULT_LOCALE: &'static str = "en";

    /// Empty, never persisted document
    pub fn new() -> Self {
        Self {
            id: None,
            title: String::new(),
            template: Self::DEFAULT_TEMPLATE.to_string(),
            locale: Self::DEFAULT_LOCALE.to_string(),
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            languages: Vec::new(),
            interests: Vec::new(),
            custom_sections: BTreeMap::new(),
            section_order: SectionId::default_order(),
            section_names: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Build a document from a persisted (or partial) JSON record
    ///
    /// Each field is read on its own. Missing, `null` or ill-typed fields
    /// fall back to their empty default; list entries that fail to decode
    /// are dropped individually instead of discarding the whole list.
    pub fn hydrate(record: &Value) -> Self {
        let mut doc = Self::new();

        let Some(map) = record.as_object() else {
            tracing::debug!("Hydrating from non-object record, using empty document");
            return doc;
        };

        doc.id = field(map, "id");
        if let Some(title) = field(map, "title") {
            doc.title = title;
        }
        if let Some(template) = field::<String>(map, "template").filter(|t| !t.is_empty()) {
            doc.template = template;
        }
        if let Some(locale) = field::<String>(map, "locale").filter(|l| !l.is_empty()) {
            doc.locale = locale;
        }

        doc.personal_info = object_field(map, "personalInfo").unwrap_or_default();
        doc.summary = field(map, "summary").unwrap_or_default();
        doc.experience = entry_list(map, "experience");
        doc.education = entry_list(map, "education");
        doc.skills = entry_list(map, "skills");
        doc.projects = entry_list(map, "projects");
        doc.certifications = entry_list(map, "certifications");
        doc.languages = entry_list(map, "languages");
        doc.interests = list_field(map, "interests");
        doc.custom_sections = custom_sections(map);
        doc.section_names = field(map, "sectionNames").unwrap_or_default();
        doc.updated_at = field(map, "updatedAt");

        doc.section_order = match field::<Vec<String>>(map, "sectionOrder") {
            Some(order) => order,
            None => {
                let mut order = SectionId::default_order();
                order.extend(doc.custom_sections.keys().cloned());
                order
            }
        };

        doc
    }

    /// Resolve an order list key against this document
    ///
    /// Returns `None` for keys that are neither built-in nor present in the
    /// custom section map.
    pub fn resolve_section(&self, key: &str) -> Option<SectionId> {
        SectionId::built_in(key).or_else(|| {
            self.custom_sections
                .contains_key(key)
                .then(|| SectionId::Custom(key.to_string()))
        })
    }

    /// Replace one section wholesale
    pub fn apply_section(&mut self, section: Section) {
        match section {
            Section::PersonalInfo(info) => self.personal_info = info,
            Section::Summary(text) => self.summary = text,
            Section::Experience(entries) => self.experience = entries,
            Section::Education(entries) => self.education = entries,
            Section::Skills(entries) => self.skills = entries,
            Section::Projects(entries) => self.projects = entries,
            Section::Certifications(entries) => self.certifications = entries,
            Section::Languages(entries) => self.languages = entries,
            Section::Interests(entries) => self.interests = entries,
            Section::Custom { key, section } => {
                self.custom_sections.insert(key, section);
            }
        }
    }

    /// Current value of a section by name (`personalInfo` included)
    pub fn section(&self, name: &str) -> Option<Section> {
        let section = match name {
            "personalInfo" => Section::PersonalInfo(self.personal_info.clone()),
            "summary" => Section::Summary(self.summary.clone()),
            "experience" => Section::Experience(self.experience.clone()),
            "education" => Section::Education(self.education.clone()),
            "skills" => Section::Skills(self.skills.clone()),
            "projects" => Section::Projects(self.projects.clone()),
            "certifications" => Section::Certifications(self.certifications.clone()),
            "languages" => Section::Languages(self.languages.clone()),
            "interests" => Section::Interests(self.interests.clone()),
            key => Section::Custom {
                key: key.to_string(),
                section: self.custom_sections.get(key)?.clone(),
            },
        };
        Some(section)
    }

    /// Whether a section has nothing worth rendering
    pub fn is_section_empty(&self, id: &SectionId) -> bool {
        match id {
            SectionId::Summary => self.summary.trim().is_empty(),
            SectionId::Experience => self.experience.is_empty(),
            SectionId::Education => self.education.is_empty(),
            SectionId::Skills => self.skills.is_empty(),
            SectionId::Projects => self.projects.is_empty(),
            SectionId::Certifications => self.certifications.is_empty(),
            SectionId::Languages => self.languages.is_empty(),
            SectionId::Interests => self.interests.is_empty(),
            SectionId::Custom(key) => self
                .custom_sections
                .get(key)
                .map_or(true, |section| section.items.is_empty()),
        }
    }

    /// Heading shown for a section: custom name, custom section title, or
    /// the built-in default
    pub fn display_name(&self, id: &SectionId) -> String {
        if let Some(name) = self.section_names.get(id.key()).filter(|n| !n.trim().is_empty()) {
            return name.clone();
        }

        match id {
            SectionId::Summary => "Summary".to_string(),
            SectionId::Experience => "Experience".to_string(),
            SectionId::Education => "Education".to_string(),
            SectionId::Skills => "Skills".to_string(),
            SectionId::Projects => "Projects".to_string(),
            SectionId::Certifications => "Certifications".to_string(),
            SectionId::Languages => "Languages".to_string(),
            SectionId::Interests => "Interests".to_string(),
            SectionId::Custom(key) => self
                .custom_sections
                .get(key)
                .map(|section| section.title.clone())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| key.clone()),
        }
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Ignoring malformed field {}: {}", key, e);
            None
        }
    }
}

/// Struct-typed field. Serde accepts the sequence form of a struct, so
/// anything other than a JSON object is rejected up front.
fn object_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key) {
        Some(value) if !value.is_object() && !value.is_null() => {
            tracing::debug!("Ignoring non-object value for {}", key);
            None
        }
        _ => field(map, key),
    }
}

fn list_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    read_list(map, key, false)
}

/// List of struct entries; entries that are not objects are dropped
fn entry_list<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    read_list(map, key, true)
}

fn read_list<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    objects_only: bool,
) -> Vec<T> {
    let Some(items) = map.get(key).and_then(Value::as_array) else {
        if map.get(key).is_some_and(|v| !v.is_null()) {
            tracing::debug!("Ignoring non-list value for {}", key);
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            if objects_only && !item.is_object() {
                tracing::debug!("Dropping non-object {} entry", key);
                return None;
            }
            match serde_json::from_value(item.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Dropping malformed {} entry: {}", key, e);
                    None
                }
            }
        })
        .collect()
}

fn custom_sections(map: &Map<String, Value>) -> BTreeMap<String, CustomSection> {
    let Some(sections) = map.get("customSections").and_then(Value::as_object) else {
        if map.get("customSections").is_some_and(|v| !v.is_null()) {
            tracing::debug!("Ignoring non-object value for customSections");
        }
        return BTreeMap::new();
    };

    sections
        .iter()
        .filter_map(|(key, value)| {
            let Some(section) = value.as_object() else {
                tracing::debug!("Dropping malformed custom section {}", key);
                return None;
            };
            let section = CustomSection {
                title: field(section, "title").unwrap_or_default(),
                items: entry_list(section, "items"),
            };
            Some((key.clone(), section))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new();
        assert!(doc.id.is_none());
        assert_eq!(doc.template, "classic");
        assert_eq!(doc.locale, "en");
        assert_eq!(doc.section_order, SectionId::default_order());
    }

    #[test]
    fn test_hydrate_missing_sections_default_to_empty() {
        let doc = Document::hydrate(&json!({
            "id": "doc-1",
            "title": "Backend résumé",
            "summary": "Rust developer"
        }));

        assert_eq!(doc.id, Some(DocumentId::new("doc-1")));
        assert_eq!(doc.title, "Backend résumé");
        assert_eq!(doc.summary, "Rust developer");
        assert!(doc.experience.is_empty());
        assert!(doc.custom_sections.is_empty());
        assert_eq!(doc.section_order, SectionId::default_order());
    }

    #[test]
    fn test_hydrate_tolerates_wrong_shapes() {
        let doc = Document::hydrate(&json!({
            "experience": null,
            "education": "not a list",
            "skills": [{ "name": "Rust" }, 42, { "name": "SQL" }],
            "personalInfo": ["wrong"],
            "template": ""
        }));

        assert!(doc.experience.is_empty());
        assert!(doc.education.is_empty());
        assert_eq!(doc.skills.len(), 2);
        assert_eq!(doc.personal_info, PersonalInfo::default());
        assert_eq!(doc.template, Document::DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_hydrate_rejects_sequence_form_of_structs() {
        let doc = Document::hydrate(&json!({
            "experience": [["Acme", "Engineer"], { "company": "Initech" }],
            "languages": [["German", "Native"]],
            "customSections": {
                "talks": ["RustConf"],
                "volunteering": {
                    "title": "Volunteering",
                    "items": [["Food bank"], { "title": "Mentor" }]
                }
            }
        }));

        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.experience[0].company, "Initech");
        assert!(doc.languages.is_empty());
        assert!(!doc.custom_sections.contains_key("talks"));
        let volunteering = &doc.custom_sections["volunteering"];
        assert_eq!(volunteering.items.len(), 1);
        assert_eq!(volunteering.items[0].title, "Mentor");
    }

    #[test]
    fn test_hydrate_non_object_is_empty_document() {
        let doc = Document::hydrate(&json!([1, 2, 3]));
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_hydrate_preserves_unknown_order_keys() {
        let doc = Document::hydrate(&json!({
            "sectionOrder": ["skills", "hobbies", "summary"]
        }));
        assert_eq!(doc.section_order, vec!["skills", "hobbies", "summary"]);
        assert_eq!(doc.resolve_section("hobbies"), None);
    }

    #[test]
    fn test_hydrate_appends_custom_keys_to_default_order() {
        let doc = Document::hydrate(&json!({
            "customSections": { "volunteering": { "title": "Volunteering" } }
        }));
        assert_eq!(doc.section_order.last().map(String::as_str), Some("volunteering"));
        assert_eq!(
            doc.resolve_section("volunteering"),
            Some(SectionId::Custom("volunteering".to_string()))
        );
    }

    #[test]
    fn test_apply_section_replaces_wholesale() {
        let mut doc = Document::new();
        doc.apply_section(Section::Interests(vec!["chess".to_string()]));
        doc.apply_section(Section::Interests(vec!["climbing".to_string()]));
        assert_eq!(doc.interests, vec!["climbing"]);
    }

    #[test]
    fn test_display_name_prefers_custom_name() {
        let mut doc = Document::new();
        assert_eq!(doc.display_name(&SectionId::Experience), "Experience");
        doc.section_names
            .insert("experience".to_string(), "Work History".to_string());
        assert_eq!(doc.display_name(&SectionId::Experience), "Work History");
    }

    #[test]
    fn test_serialized_shape_rehydrates() {
        let mut doc = Document::new();
        doc.id = Some(DocumentId::new("abc"));
        doc.summary = "Hello".to_string();
        doc.skills.push(SkillEntry {
            name: "Rust".to_string(),
            ..Default::default()
        });

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(Document::hydrate(&value), doc);
    }
}
