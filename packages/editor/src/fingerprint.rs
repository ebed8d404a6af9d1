//! # Change Fingerprint
//!
//! Cheap digest deciding whether a document changed in a way worth
//! persisting.
//!
//! The fingerprint is a projection, not a content hash: identity fields, a
//! few key scalars, the order list, custom display names and the *length* of
//! every list-valued section. Nested entry content is never serialized, so it
//! is safe to compute on every mutation.
//!
//! ## Known blind spot
//!
//! Editing an entry in place (same list length) leaves the fingerprint
//! unchanged. Section updates therefore mark the session dirty
//! unconditionally and do not rely on the fingerprint.

use crate::Document;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque change-detection digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(String);

#[derive(Serialize)]
struct Projection<'a> {
    id: Option<&'a str>,
    title: &'a str,
    template: &'a str,
    locale: &'a str,
    name: &'a str,
    email: &'a str,
    summary: &'a str,
    counts: [usize; 9],
    order: &'a [String],
    names: &'a BTreeMap<String, String>,
}

impl Fingerprint {
    /// Compute the fingerprint of a document
    pub fn compute(doc: &Document) -> Self {
        let projection = Projection {
            id: doc.id.as_ref().map(|id| id.as_str()),
            title: &doc.title,
            template: &doc.template,
            locale: &doc.locale,
            name: &doc.personal_info.full_name,
            email: &doc.personal_info.email,
            summary: &doc.summary,
            counts: [
                doc.experience.len(),
                doc.education.len(),
                doc.skills.len(),
                doc.projects.len(),
                doc.certifications.len(),
                doc.languages.len(),
                doc.interests.len(),
                doc.custom_sections.len(),
                doc.custom_sections.values().map(|s| s.items.len()).sum(),
            ],
            order: &doc.section_order,
            names: &doc.section_names,
        };

        // Only strings, integers and string maps: serialization cannot fail.
        Self(serde_json::to_string(&projection).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
