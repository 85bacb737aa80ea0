//! The on-disk timetable: policy, reference data and bookings in one JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use timetable_engine::{Booking, Classroom, Directory, Faculty, SchedulingPolicy, SchedulingService, Subject};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableFile {
    pub policy: SchedulingPolicy,
    pub faculty: Vec<Faculty>,
    pub classrooms: Vec<Classroom>,
    pub subjects: Vec<Subject>,
    pub bookings: Vec<Booking>,
}

impl TimetableFile {
    /// Read the file, or start an empty timetable if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "timetable file missing, starting empty");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid timetable file: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            bookings = file.bookings.len(),
            faculty = file.faculty.len(),
            classrooms = file.classrooms.len(),
            subjects = file.subjects.len(),
            "loaded timetable"
        );
        Ok(file)
    }

    /// Build a service holding this file's policy, directory and bookings.
    pub fn into_service(self) -> Result<SchedulingService> {
        let directory = Directory::new(self.faculty, self.classrooms, self.subjects);
        let service = SchedulingService::with_policy(self.policy).with_directory(directory);
        service
            .restore(self.bookings)
            .context("Timetable file contains invalid bookings")?;
        Ok(service)
    }

    /// Capture the service's current state for saving.
    pub fn from_service(service: &SchedulingService) -> Self {
        let directory = service.directory();
        Self {
            policy: service.policy().clone(),
            faculty: directory.faculty_list().cloned().collect(),
            classrooms: directory.classroom_list().cloned().collect(),
            subjects: directory.subject_list().cloned().collect(),
            bookings: service.all(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize timetable")?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), bookings = self.bookings.len(), "saved timetable");
        Ok(())
    }
}
