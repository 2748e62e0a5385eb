// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static syllabus reference data for the Vidya education backend.
//!
//! The syllabus maps a class name to its subjects, and each subject to an
//! ordered list of chapters. Chapter ids are unique only within a subject;
//! `(subject_id, chapter_id)` is the true key everywhere else in the system.
//! A chapter's unlock order is its position in the subject's list, not its id.
//!
//! A default syllabus is embedded in the binary; deployments can replace it
//! with their own TOML file via `syllabus.path`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vidya_core::VidyaError;

/// Default syllabus data compiled into the binary.
const EMBEDDED_SYLLABUS: &str = include_str!("../data/syllabus.toml");

/// The full syllabus: every class with its subjects and chapters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Syllabus {
    #[serde(default)]
    pub classes: Vec<ClassSyllabus>,
}

/// One grade level's subjects.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassSyllabus {
    /// Display name, e.g. "Class 6". Matches the class assigned to users.
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// A subject with its ordered chapter list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// One chapter. Position within `Subject::chapters` determines unlock order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chapter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Syllabus {
    /// Parse a syllabus from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, VidyaError> {
        let syllabus: Syllabus = toml::from_str(content)
            .map_err(|e| VidyaError::Config(format!("invalid syllabus TOML: {e}")))?;
        syllabus.check()?;
        Ok(syllabus)
    }

    /// The syllabus compiled into the binary.
    pub fn embedded() -> Result<Self, VidyaError> {
        Self::from_toml_str(EMBEDDED_SYLLABUS)
    }

    /// Load from `path` when given, otherwise fall back to the embedded data.
    pub fn load(path: Option<&Path>) -> Result<Self, VidyaError> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    VidyaError::Config(format!("cannot read syllabus {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&content)
            }
            None => Self::embedded(),
        }
    }

    /// Structural sanity: subject ids unique per class, chapter ids unique
    /// per subject.
    fn check(&self) -> Result<(), VidyaError> {
        for class in &self.classes {
            let mut subject_ids = std::collections::HashSet::new();
            for subject in &class.subjects {
                if !subject_ids.insert(subject.id) {
                    return Err(VidyaError::Config(format!(
                        "duplicate subject id {} in {}",
                        subject.id, class.name
                    )));
                }
                let mut chapter_ids = std::collections::HashSet::new();
                for chapter in &subject.chapters {
                    if !chapter_ids.insert(chapter.id) {
                        return Err(VidyaError::Config(format!(
                            "duplicate chapter id {} in {}/{}",
                            chapter.id, class.name, subject.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Look up a class by its display name.
    pub fn class(&self, name: &str) -> Option<&ClassSyllabus> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Look up a subject within a class.
    pub fn subject(&self, class_name: &str, subject_id: i64) -> Option<&Subject> {
        self.class(class_name)?
            .subjects
            .iter()
            .find(|s| s.id == subject_id)
    }

    /// All class names, in file order.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Subject {
    /// Position of a chapter within this subject, if present.
    pub fn chapter_position(&self, chapter_id: i64) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == chapter_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_syllabus_parses() {
        let syllabus = Syllabus::embedded().unwrap();
        assert!(syllabus.class("Class 6").is_some());
        assert!(syllabus.class("Class 10").is_some());
        assert!(syllabus.class("Class 11").is_none());
    }

    #[test]
    fn chapter_ids_repeat_across_subjects() {
        // Chapter id 1 exists in both Mathematics and Science of Class 6;
        // only the (subject, chapter) pair is a usable key.
        let syllabus = Syllabus::embedded().unwrap();
        let math = syllabus.subject("Class 6", 1).unwrap();
        let science = syllabus.subject("Class 6", 2).unwrap();
        assert!(math.chapters.iter().any(|c| c.id == 1));
        assert!(science.chapters.iter().any(|c| c.id == 1));
        assert_ne!(math.chapters[0].name, science.chapters[0].name);
    }

    #[test]
    fn chapter_position_follows_file_order() {
        let syllabus = Syllabus::embedded().unwrap();
        let math = syllabus.subject("Class 6", 1).unwrap();
        assert_eq!(math.chapter_position(1), Some(0));
        assert_eq!(math.chapter_position(8), Some(7));
        assert_eq!(math.chapter_position(99), None);
    }

    #[test]
    fn duplicate_chapter_id_is_rejected() {
        let toml = r#"
            [[classes]]
            name = "Class 6"
            [[classes.subjects]]
            id = 1
            name = "Math"
            [[classes.subjects.chapters]]
            id = 1
            name = "A"
            [[classes.subjects.chapters]]
            id = 1
            name = "B"
        "#;
        assert!(Syllabus::from_toml_str(toml).is_err());
    }

    #[test]
    fn load_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.toml");
        std::fs::write(
            &path,
            "[[classes]]\nname = \"Class 6\"\n[[classes.subjects]]\nid = 7\nname = \"Art\"\n",
        )
        .unwrap();

        let syllabus = Syllabus::load(Some(&path)).unwrap();
        assert!(syllabus.subject("Class 6", 7).is_some());
        assert!(syllabus.subject("Class 6", 1).is_none());
    }
}
