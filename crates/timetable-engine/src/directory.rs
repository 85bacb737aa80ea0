//! Reference data the timetable points at: faculty, classrooms and subjects.
//!
//! The engine treats their ids as opaque keys. A [`Directory`] is only
//! consulted to resolve display names and, when the policy asks for it, to
//! reject bookings that name an unknown id.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default = "available_by_default", alias = "isAvailable")]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default = "available_by_default", alias = "isAvailable")]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub credits: u32,
}

fn available_by_default() -> bool {
    true
}

/// Which reference collection an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Faculty,
    Room,
    Subject,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceKind::Faculty => "faculty",
            ReferenceKind::Room => "room",
            ReferenceKind::Subject => "subject",
        })
    }
}

/// Read-only existence checks over the reference collections.
pub trait ReferenceLookup {
    fn faculty_exists(&self, id: &str) -> bool;
    fn room_exists(&self, id: &str) -> bool;
    fn subject_exists(&self, id: &str) -> bool;

    fn exists(&self, kind: ReferenceKind, id: &str) -> bool {
        match kind {
            ReferenceKind::Faculty => self.faculty_exists(id),
            ReferenceKind::Room => self.room_exists(id),
            ReferenceKind::Subject => self.subject_exists(id),
        }
    }
}

/// In-memory faculty, classroom and subject registries keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    faculty: BTreeMap<String, Faculty>,
    classrooms: BTreeMap<String, Classroom>,
    subjects: BTreeMap<String, Subject>,
}

/// Label shown for a reference the directory cannot resolve.
pub const UNKNOWN_NAME: &str = "Unknown";

impl Directory {
    pub fn new(
        faculty: impl IntoIterator<Item = Faculty>,
        classrooms: impl IntoIterator<Item = Classroom>,
        subjects: impl IntoIterator<Item = Subject>,
    ) -> Self {
        Self {
            faculty: faculty.into_iter().map(|f| (f.id.clone(), f)).collect(),
            classrooms: classrooms.into_iter().map(|r| (r.id.clone(), r)).collect(),
            subjects: subjects.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn faculty(&self, id: &str) -> Option<&Faculty> {
        self.faculty.get(id)
    }

    pub fn classroom(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.get(id)
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn faculty_list(&self) -> impl Iterator<Item = &Faculty> {
        self.faculty.values()
    }

    pub fn classroom_list(&self) -> impl Iterator<Item = &Classroom> {
        self.classrooms.values()
    }

    pub fn subject_list(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    /// Display name for an id, or [`UNKNOWN_NAME`] for a dangling reference.
    pub fn name_of(&self, kind: ReferenceKind, id: &str) -> String {
        let name = match kind {
            ReferenceKind::Faculty => self.faculty.get(id).map(|f| f.name.as_str()),
            ReferenceKind::Room => self.classrooms.get(id).map(|r| r.name.as_str()),
            ReferenceKind::Subject => self.subjects.get(id).map(|s| s.name.as_str()),
        };
        name.unwrap_or(UNKNOWN_NAME).to_string()
    }

    /// Returns `false` if no such faculty member exists.
    pub fn set_faculty_available(&mut self, id: &str, available: bool) -> bool {
        match self.faculty.get_mut(id) {
            Some(f) => {
                f.available = available;
                true
            }
            None => false,
        }
    }

    /// Returns `false` if no such classroom exists.
    pub fn set_classroom_available(&mut self, id: &str, available: bool) -> bool {
        match self.classrooms.get_mut(id) {
            Some(r) => {
                r.available = available;
                true
            }
            None => false,
        }
    }

    pub fn unavailable_faculty(&self) -> impl Iterator<Item = &Faculty> {
        self.faculty.values().filter(|f| !f.available)
    }

    pub fn unavailable_rooms(&self) -> impl Iterator<Item = &Classroom> {
        self.classrooms.values().filter(|r| !r.available)
    }
}

impl ReferenceLookup for Directory {
    fn faculty_exists(&self, id: &str) -> bool {
        self.faculty.contains_key(id)
    }

    fn room_exists(&self, id: &str) -> bool {
        self.classrooms.contains_key(id)
    }

    fn subject_exists(&self, id: &str) -> bool {
        self.subjects.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Directory {
        Directory::new(
            [Faculty {
                id: "1".into(),
                name: "Dr. John Smith".into(),
                department: "Computer Science".into(),
                available: true,
            }],
            [Classroom {
                id: "1".into(),
                name: "Room 101".into(),
                capacity: 30,
                available: true,
            }],
            [Subject {
                id: "1".into(),
                name: "Introduction to Programming".into(),
                department: "Computer Science".into(),
                credits: 3,
            }],
        )
    }

    #[test]
    fn dangling_reference_resolves_to_unknown() {
        let dir = directory();
        assert_eq!(dir.name_of(ReferenceKind::Faculty, "1"), "Dr. John Smith");
        assert_eq!(dir.name_of(ReferenceKind::Room, "9"), UNKNOWN_NAME);
        assert!(dir.exists(ReferenceKind::Subject, "1"));
        assert!(!dir.exists(ReferenceKind::Subject, "2"));
    }

    #[test]
    fn availability_toggle() {
        let mut dir = directory();
        assert_eq!(dir.unavailable_faculty().count(), 0);
        assert!(dir.set_faculty_available("1", false));
        assert_eq!(dir.unavailable_faculty().count(), 1);
        assert!(!dir.set_classroom_available("404", false));
        assert!(dir.set_classroom_available("1", false));
        let rooms: Vec<&str> = dir.unavailable_rooms().map(|r| r.id.as_str()).collect();
        assert_eq!(rooms, ["1"]);
    }

    #[test]
    fn reads_reference_app_field_names() {
        let f: Faculty = serde_json::from_str(
            r#"{"id":"3","name":"Dr. Michael Lee","department":"Physics","isAvailable":false}"#,
        )
        .unwrap();
        assert!(!f.available);
        let r: Classroom = serde_json::from_str(r#"{"id":"2","name":"Lab 3"}"#).unwrap();
        assert!(r.available);
        assert_eq!(r.capacity, 0);
    }
}
