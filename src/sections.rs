//! Static section membership.
//!
//! A section is a named, ordered group of sensors reported together. The
//! table is built once at startup, either from the built-in defaults or
//! from a JSON file, and only read afterwards.

use std::path::Path;

use serde::Deserialize;

use crate::error::SectionConfigError;

// ---

/// One sensor within a section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionSensor {
    pub id: String,
    pub display_name: String,
}

/// A named, ordered group of sensors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub name: String,
    pub sensors: Vec<SectionSensor>,
}

impl Section {
    // ---
    pub fn sensor_ids(&self) -> Vec<String> {
        self.sensors.iter().map(|s| s.id.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct SectionsFile {
    sections: Vec<Section>,
}

const DEFAULT_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "desk",
        &[
            ("desk-vs40-01-01", "Open space desk 1"),
            ("desk-vs40-01-02", "Open space desk 2"),
            ("desk-vs40-01-03", "Open space desk 3"),
            ("desk-vs40-01-04", "Open space desk 4"),
            ("desk-vs40-01-05", "Open space desk 5"),
            ("desk-vs40-01-06", "Open space desk 6"),
            ("desk-vs40-01-07", "Open space desk 7"),
            ("desk-vs40-01-08", "Open space desk 8"),
            ("desk-vs40-01-09", "Open space desk 9"),
            ("desk-vs40-01-10", "Open space desk 10"),
            ("desk-vs40-01-11", "Open space desk 11"),
            ("desk-vs40-01-12", "Open space desk 12"),
        ],
    ),
    (
        "meeting",
        &[
            ("desk-vs41-04-01", "Meeting room A seat 1"),
            ("desk-vs41-04-02", "Meeting room A seat 2"),
            ("desk-vs41-04-03", "Meeting room A seat 3"),
            ("desk-vs41-04-04", "Meeting room B seat 1"),
            ("desk-vs41-04-05", "Meeting room B seat 2"),
            ("desk-vs41-04-06", "Meeting room B seat 3"),
        ],
    ),
    (
        "phone",
        &[
            ("desk-vs41-02-01", "Phone booth 1"),
            ("desk-vs41-02-02", "Phone booth 2"),
            ("desk-vs41-02-03", "Phone booth 3"),
        ],
    ),
    (
        "interview",
        &[
            ("desk-vs41-03-01", "Interview room 1"),
            ("desk-vs41-03-02", "Interview room 2"),
        ],
    ),
];

/// Immutable lookup from section name to its sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl Default for SectionRegistry {
    fn default() -> Self {
        // ---
        let sections = DEFAULT_SECTIONS
            .iter()
            .map(|(name, sensors)| Section {
                name: name.to_string(),
                sensors: sensors
                    .iter()
                    .map(|(id, display_name)| SectionSensor {
                        id: id.to_string(),
                        display_name: display_name.to_string(),
                    })
                    .collect(),
            })
            .collect();
        SectionRegistry { sections }
    }
}

impl SectionRegistry {
    /// Build a registry, rejecting empty or duplicate section names.
    pub fn new(sections: Vec<Section>) -> Result<Self, SectionConfigError> {
        // ---
        for (i, section) in sections.iter().enumerate() {
            if section.name.trim().is_empty() {
                return Err(SectionConfigError::Invalid(format!(
                    "section #{i} has an empty name"
                )));
            }
            if sections[..i].iter().any(|s| s.name == section.name) {
                return Err(SectionConfigError::Invalid(format!(
                    "duplicate section '{}'",
                    section.name
                )));
            }
        }
        Ok(SectionRegistry { sections })
    }

    /// Parse `{"sections": [{"name": .., "sensors": [{"id": .., "display_name": ..}]}]}`.
    pub fn from_json(contents: &str) -> Result<Self, SectionConfigError> {
        let file: SectionsFile = serde_json::from_str(contents)?;
        SectionRegistry::new(file.sections)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SectionConfigError> {
        let contents = std::fs::read_to_string(path)?;
        SectionRegistry::from_json(&contents)
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Display name of a sensor in any section, falling back to its id.
    pub fn display_name<'a>(&'a self, sensor_id: &'a str) -> &'a str {
        // ---
        self.sections
            .iter()
            .flat_map(|s| s.sensors.iter())
            .find(|s| s.id == sensor_id)
            .map(|s| s.display_name.as_str())
            .unwrap_or(sensor_id)
    }
}
