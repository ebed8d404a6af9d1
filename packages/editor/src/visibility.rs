//! Visible-section derivation.
//!
//! A pure query over the document: walk the order list, keep keys that
//! resolve to a section with content, and drop sections that the active
//! template renders in its side panel instead of the main flow.

use crate::{Document, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Template layout knowledge needed to decide main-flow visibility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutRules {
    /// Templates of the sidebar family
    pub sidebar_templates: Vec<String>,

    /// Section keys rendered in the side panel by sidebar templates
    pub sidebar_sections: Vec<String>,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            sidebar_templates: vec!["sidebar".to_string(), "modern-sidebar".to_string()],
            sidebar_sections: vec![
                "skills".to_string(),
                "languages".to_string(),
                "interests".to_string(),
            ],
        }
    }
}

impl LayoutRules {
    /// Rules with no sidebar template family
    pub fn single_column() -> Self {
        Self {
            sidebar_templates: Vec::new(),
            sidebar_sections: Vec::new(),
        }
    }

    pub fn is_sidebar_template(&self, template: &str) -> bool {
        self.sidebar_templates.iter().any(|t| t == template)
    }
}

/// Sections to render in the main flow, in order-list order
///
/// Unknown keys and empty sections are skipped, a key listed twice is only
/// rendered at its first position.
pub fn visible_sections(doc: &Document, rules: &LayoutRules) -> Vec<SectionId> {
    let sidebar = rules.is_sidebar_template(&doc.template);
    let mut seen = HashSet::new();

    doc.section_order
        .iter()
        .filter(|key| !(sidebar && rules.sidebar_sections.contains(*key)))
        .filter_map(|key| doc.resolve_section(key))
        .filter(|id| !doc.is_section_empty(id))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{CustomItem, CustomSection, ExperienceEntry, SkillEntry};

    fn order(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_empty_summary_hidden() {
        let mut doc = Document::new();
        doc.summary = "   ".to_string();
        doc.experience.push(ExperienceEntry::default());
        doc.section_order = order(&["summary", "experience", "skills"]);

        let visible = visible_sections(&doc, &LayoutRules::default());
        assert_eq!(visible, vec![SectionId::Experience]);
    }

    #[test]
    fn test_order_preserved_and_unknown_ignored() {
        let mut doc = Document::new();
        doc.summary = "Hi".to_string();
        doc.experience.push(ExperienceEntry::default());
        doc.interests.push("go".to_string());
        doc.section_order = order(&["interests", "hobbies", "experience", "summary"]);

        let visible = visible_sections(&doc, &LayoutRules::single_column());
        assert_eq!(
            visible,
            vec![SectionId::Interests, SectionId::Experience, SectionId::Summary]
        );
    }

    #[test]
    fn test_sidebar_template_suppresses_side_panel_sections() {
        let mut doc = Document::new();
        doc.summary = "Hi".to_string();
        doc.skills.push(SkillEntry::default());
        doc.section_order = order(&["skills", "summary"]);

        let rules = LayoutRules::default();
        assert_eq!(
            visible_sections(&doc, &rules),
            vec![SectionId::Skills, SectionId::Summary]
        );

        doc.template = "sidebar".to_string();
        assert_eq!(visible_sections(&doc, &rules), vec![SectionId::Summary]);
    }

    #[test]
    fn test_custom_sections_need_items() {
        let mut doc = Document::new();
        doc.custom_sections.insert(
            "talks".to_string(),
            CustomSection {
                title: "Talks".to_string(),
                items: Vec::new(),
            },
        );
        doc.section_order = order(&["talks"]);
        assert!(visible_sections(&doc, &LayoutRules::default()).is_empty());

        if let Some(section) = doc.custom_sections.get_mut("talks") {
            section.items.push(CustomItem::default());
        }
        assert_eq!(
            visible_sections(&doc, &LayoutRules::default()),
            vec![SectionId::Custom("talks".to_string())]
        );
    }

    #[test]
    fn test_duplicate_keys_rendered_once() {
        let mut doc = Document::new();
        doc.summary = "Hi".to_string();
        doc.section_order = order(&["summary", "summary"]);
        assert_eq!(
            visible_sections(&doc, &LayoutRules::default()),
            vec![SectionId::Summary]
        );
    }
}
