//! # Suggestion Patches
//!
//! Externally produced edits (e.g. an AI assistant proposing a better bullet
//! point) arrive as `{ section, target, value }`. A patch is resolved against
//! the current document into a wholesale [`Section`] replacement, so it goes
//! through exactly the same path as a form update.
//!
//! ## Target semantics
//!
//! - `Whole`: replace the section value
//! - `Field(name)`: set one field of an object-valued section; on list
//!   sections a numeric name is treated as an index
//! - `Index(i)`: replace entry `i` when in range, append otherwise
//! - `Append`: push a new entry
//!
//! Custom sections address their `items` list for index/append targets.

use crate::errors::SuggestionError;
use crate::sections::Section;
use crate::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPatch {
    /// Section name, `personalInfo` included
    pub section: String,
    pub target: PatchTarget,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "camelCase")]
pub enum PatchTarget {
    Whole,
    Field(String),
    Index(usize),
    Append,
}

impl fmt::Display for PatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchTarget::Whole => f.write_str("whole"),
            PatchTarget::Field(name) => write!(f, "field {}", name),
            PatchTarget::Index(i) => write!(f, "index {}", i),
            PatchTarget::Append => f.write_str("append"),
        }
    }
}

impl SuggestionPatch {
    pub fn new(section: impl Into<String>, target: PatchTarget, value: Value) -> Self {
        Self {
            section: section.into(),
            target,
            value,
        }
    }

    /// Resolve the patch into the replacement value for its section
    pub fn resolve(&self, doc: &Document) -> Result<Section, SuggestionError> {
        let current = doc
            .section(&self.section)
            .ok_or_else(|| SuggestionError::UnknownSection(self.section.clone()))?;

        let mut payload = payload(&current).map_err(|e| self.invalid_value(e))?;
        let is_custom = matches!(current, Section::Custom { .. });

        match &self.target {
            PatchTarget::Whole => payload = self.value.clone(),
            PatchTarget::Field(name) => match &mut payload {
                Value::Object(map) => {
                    map.insert(name.clone(), self.value.clone());
                }
                Value::Array(items) => match name.parse::<usize>() {
                    Ok(index) => replace_or_append(items, index, self.value.clone()),
                    Err(_) => return Err(self.invalid_target()),
                },
                _ => return Err(self.invalid_target()),
            },
            PatchTarget::Index(index) => {
                let items = self.list_mut(&mut payload, is_custom)?;
                replace_or_append(items, *index, self.value.clone());
            }
            PatchTarget::Append => {
                let items = self.list_mut(&mut payload, is_custom)?;
                items.push(self.value.clone());
            }
        }

        from_payload(&current, payload).map_err(|e| self.invalid_value(e))
    }

    fn list_mut<'a>(
        &self,
        payload: &'a mut Value,
        is_custom: bool,
    ) -> Result<&'a mut Vec<Value>, SuggestionError> {
        let list = if is_custom {
            payload.get_mut("items")
        } else {
            Some(payload)
        };

        match list {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(self.invalid_target()),
        }
    }

    fn invalid_target(&self) -> SuggestionError {
        SuggestionError::InvalidTarget {
            section: self.section.clone(),
            target: self.target.to_string(),
        }
    }

    fn invalid_value(&self, e: serde_json::Error) -> SuggestionError {
        SuggestionError::InvalidValue {
            section: self.section.clone(),
            message: e.to_string(),
        }
    }
}

fn replace_or_append(items: &mut Vec<Value>, index: usize, value: Value) {
    match items.get_mut(index) {
        Some(slot) => *slot = value,
        None => items.push(value),
    }
}

fn payload(section: &Section) -> Result<Value, serde_json::Error> {
    match section {
        Section::PersonalInfo(info) => serde_json::to_value(info),
        Section::Summary(text) => serde_json::to_value(text),
        Section::Experience(entries) => serde_json::to_value(entries),
        Section::Education(entries) => serde_json::to_value(entries),
        Section::Skills(entries) => serde_json::to_value(entries),
        Section::Projects(entries) => serde_json::to_value(entries),
        Section::Certifications(entries) => serde_json::to_value(entries),
        Section::Languages(entries) => serde_json::to_value(entries),
        Section::Interests(entries) => serde_json::to_value(entries),
        Section::Custom { section, .. } => serde_json::to_value(section),
    }
}

fn from_payload(current: &Section, value: Value) -> Result<Section, serde_json::Error> {
    Ok(match current {
        Section::PersonalInfo(_) => Section::PersonalInfo(serde_json::from_value(value)?),
        Section::Summary(_) => Section::Summary(serde_json::from_value(value)?),
        Section::Experience(_) => Section::Experience(serde_json::from_value(value)?),
        Section::Education(_) => Section::Education(serde_json::from_value(value)?),
        Section::Skills(_) => Section::Skills(serde_json::from_value(value)?),
        Section::Projects(_) => Section::Projects(serde_json::from_value(value)?),
        Section::Certifications(_) => Section::Certifications(serde_json::from_value(value)?),
        Section::Languages(_) => Section::Languages(serde_json::from_value(value)?),
        Section::Interests(_) => Section::Interests(serde_json::from_value(value)?),
        Section::Custom { key, .. } => Section::Custom {
            key: key.clone(),
            section: serde_json::from_value(value)?,
        },
    })
}
