//! WASM bindings for timetable-engine.
//!
//! Exposes a `Scheduler` object to JavaScript via `wasm-bindgen` so the
//! browser dashboard can keep a conflict-checked timetable in memory. All
//! complex values cross the boundary as JSON strings in the same camelCase
//! shape the timetable file uses.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timetable-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/timetable_engine_wasm.wasm
//! ```
//!
//! ## Example (JavaScript)
//!
//! ```js
//! const scheduler = new Scheduler(null, directoryJson);
//! const booking = JSON.parse(scheduler.create(JSON.stringify({
//!   day: "monday", startTime: "9:00", duration: 1.5,
//!   subjectId: "1", facultyId: "1", roomId: "1",
//! })));
//! scheduler.markNeedsRescheduling(booking.id, "faculty unavailable");
//! ```

use serde::{Deserialize, Serialize};
use timetable_engine::{
    Booking, BookingId, BookingInput, Classroom, Directory, Faculty, Resource, SchedulingPolicy,
    SchedulingService, Subject, ValidationError, Weekday,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON payloads that only exist at the boundary
// ---------------------------------------------------------------------------

/// Reference data handed over by the dashboard.
#[derive(Deserialize, Default)]
#[serde(default)]
struct DirectoryInput {
    faculty: Vec<Faculty>,
    classrooms: Vec<Classroom>,
    subjects: Vec<Subject>,
}

fn parse<'a, T: Deserialize<'a>>(what: &str, json: &'a str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {what} JSON: {e}"))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {e}"))
}

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_ID: u64 = (1 << 53) - 1;

/// Booking ids arrive as JavaScript numbers.
fn booking_id(id: f64) -> Result<BookingId, String> {
    if id.fract() != 0.0 || !(0.0..=MAX_SAFE_ID as f64).contains(&id) {
        return Err(format!("Invalid booking id {id}"));
    }
    Ok(BookingId(id as u64))
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// An in-memory timetable that rejects double-bookings.
#[wasm_bindgen]
pub struct Scheduler {
    service: SchedulingService,
}

#[wasm_bindgen]
impl Scheduler {
    /// Create a scheduler.
    ///
    /// `policy_json` overrides the default start-time and duration limits;
    /// `directory_json` is `{faculty, classrooms, subjects}` and supplies the
    /// names shown by `timetable()`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        policy_json: Option<String>,
        directory_json: Option<String>,
    ) -> Result<Scheduler, JsValue> {
        Self::build(policy_json.as_deref(), directory_json.as_deref()).map_err(to_js)
    }

    /// Replace every booking with a saved JSON array of bookings.
    ///
    /// Throws, keeping the current bookings, if the array holds an invalid
    /// booking or an id JavaScript cannot represent exactly, repeats an id,
    /// or double-books anything.
    #[wasm_bindgen(js_name = "loadBookings")]
    pub fn load_bookings(&self, bookings_json: &str) -> Result<(), JsValue> {
        self.load_bookings_json(bookings_json).map_err(to_js)
    }

    /// Book a session. Returns the stored booking as JSON.
    pub fn create(&self, input_json: &str) -> Result<String, JsValue> {
        self.create_json(input_json).map_err(to_js)
    }

    /// Move booking `id` to a new placement. Returns the updated booking.
    pub fn reschedule(&self, id: f64, input_json: &str) -> Result<String, JsValue> {
        self.reschedule_json(id, input_json).map_err(to_js)
    }

    /// Delete booking `id`. Returns `false` if it did not exist.
    pub fn remove(&self, id: f64) -> bool {
        booking_id(id).is_ok_and(|id| self.service.delete(id).is_ok())
    }

    #[wasm_bindgen(js_name = "markNeedsRescheduling")]
    pub fn mark_needs_rescheduling(&self, id: f64, reason: &str) -> Result<String, JsValue> {
        self.flag_json(id, reason).map_err(to_js)
    }

    /// Conflict report for a placement, without booking it.
    ///
    /// `exclude` names a booking to ignore, for previewing its own move.
    pub fn check(&self, input_json: &str, exclude: Option<f64>) -> Result<String, JsValue> {
        self.check_json(input_json, exclude).map_err(to_js)
    }

    /// Every booking with resolved names, sorted by day and start.
    pub fn timetable(&self) -> Result<String, JsValue> {
        to_json(&self.service.timetable()).map_err(to_js)
    }

    /// Free windows on `day` shared by the given resources.
    ///
    /// `resources_json` is an array like `[{"kind":"faculty","id":"1"}]`.
    #[wasm_bindgen(js_name = "freeWindows")]
    pub fn free_windows(&self, day: &str, resources_json: &str) -> Result<String, JsValue> {
        self.free_windows_json(day, resources_json).map_err(to_js)
    }

    /// Dashboard counts.
    pub fn summary(&self) -> Result<String, JsValue> {
        to_json(&self.service.summary()).map_err(to_js)
    }
}

// Plain-Rust halves of the exports; errors stay as strings until the edge.
impl Scheduler {
    fn build(policy_json: Option<&str>, directory_json: Option<&str>) -> Result<Self, String> {
        let policy: SchedulingPolicy = match policy_json {
            Some(json) => parse("policy", json)?,
            None => SchedulingPolicy::default(),
        };
        let directory: DirectoryInput = match directory_json {
            Some(json) => parse("directory", json)?,
            None => DirectoryInput::default(),
        };
        let directory = Directory::new(directory.faculty, directory.classrooms, directory.subjects);
        Ok(Self {
            service: SchedulingService::with_policy(policy).with_directory(directory),
        })
    }

    fn load_bookings_json(&self, json: &str) -> Result<(), String> {
        let bookings: Vec<Booking> = parse("bookings", json)?;
        if let Some(b) = bookings.iter().find(|b| b.id.0 > MAX_SAFE_ID) {
            return Err(format!("Booking id {} is too large for JavaScript", b.id));
        }
        self.service.restore(bookings).map_err(|e| e.to_string())
    }

    fn create_json(&self, json: &str) -> Result<String, String> {
        let input: BookingInput = parse("booking", json)?;
        let booking = self.service.create(&input).map_err(|e| e.to_string())?;
        to_json(&booking)
    }

    fn reschedule_json(&self, id: f64, json: &str) -> Result<String, String> {
        let id = booking_id(id)?;
        let input: BookingInput = parse("booking", json)?;
        let booking = self
            .service
            .reschedule(id, &input)
            .map_err(|e| e.to_string())?;
        to_json(&booking)
    }

    fn flag_json(&self, id: f64, reason: &str) -> Result<String, String> {
        let booking = self
            .service
            .mark_needs_rescheduling(booking_id(id)?, reason)
            .map_err(|e| e.to_string())?;
        to_json(&booking)
    }

    fn check_json(&self, json: &str, exclude: Option<f64>) -> Result<String, String> {
        let exclude = exclude.map(booking_id).transpose()?;
        let input: BookingInput = parse("booking", json)?;
        let report = self
            .service
            .check(&input, exclude)
            .map_err(|e| e.to_string())?;
        to_json(&report)
    }

    fn free_windows_json(&self, day: &str, json: &str) -> Result<String, String> {
        let day: Weekday = day.parse().map_err(|e: ValidationError| e.to_string())?;
        let resources: Vec<Resource> = parse("resources", json)?;
        to_json(&self.service.free_windows(day, &resources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTORY: &str = r#"{
        "faculty": [{ "id": "1", "name": "Dr. John Smith", "department": "CS" }],
        "classrooms": [{ "id": "1", "name": "Room 101", "capacity": 30 }],
        "subjects": [{ "id": "1", "name": "Intro to Programming", "department": "CS", "credits": 3 }]
    }"#;

    const MONDAY_NINE: &str = r#"{"day":"monday","startTime":"9:00","duration":1.5,
        "subjectId":"1","facultyId":"1","roomId":"1"}"#;

    fn scheduler() -> Scheduler {
        Scheduler::build(None, Some(DIRECTORY)).unwrap()
    }

    #[test]
    fn create_returns_booking_json() {
        let s = scheduler();
        let booking: serde_json::Value = serde_json::from_str(&s.create_json(MONDAY_NINE).unwrap()).unwrap();
        assert_eq!(booking["id"], 1);
        assert_eq!(booking["start"], "9:00");
        assert_eq!(booking["duration"], 1.5);
    }

    #[test]
    fn second_overlapping_create_is_rejected() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let err = s.create_json(MONDAY_NINE).unwrap_err();
        assert!(err.starts_with("Scheduling conflict"), "{err}");
    }

    #[test]
    fn bad_json_is_reported() {
        let err = scheduler().create_json("{").unwrap_err();
        assert!(err.starts_with("Invalid booking JSON"), "{err}");
    }

    #[test]
    fn check_with_exclude_is_clean() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let report: serde_json::Value =
            serde_json::from_str(&s.check_json(MONDAY_NINE, Some(1.0)).unwrap()).unwrap();
        assert_eq!(report["faculty"], false);
        assert_eq!(report["room"], false);
    }

    #[test]
    fn timetable_resolves_names() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&to_json(&s.service.timetable()).unwrap()).unwrap();
        assert_eq!(entries[0]["facultyName"], "Dr. John Smith");
        assert_eq!(entries[0]["roomName"], "Room 101");
    }

    #[test]
    fn flag_and_remove() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let flagged: serde_json::Value = serde_json::from_str(&s.flag_json(1.0, "travel").unwrap()).unwrap();
        assert_eq!(flagged["needsRescheduling"], true);
        assert!(s.remove(1.0));
        assert!(!s.remove(1.0));
    }

    #[test]
    fn free_windows_for_room() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let windows: serde_json::Value = serde_json::from_str(
            &s.free_windows_json("monday", r#"[{"kind":"room","id":"1"}]"#).unwrap(),
        )
        .unwrap();
        assert_eq!(windows[0]["start"], "8:00");
        assert_eq!(windows[0]["end"], "9:00");
        assert_eq!(windows[1]["start"], "10:30");
    }

    #[test]
    fn load_rejects_double_booking_and_keeps_state() {
        let s = scheduler();
        s.create_json(MONDAY_NINE).unwrap();
        let clash = r#"[
            {"id":1,"day":"monday","start":"9:00","duration":1,"facultyId":"1","roomId":"1","subjectId":"1"},
            {"id":2,"day":"monday","start":"9:30","duration":1,"facultyId":"2","roomId":"1","subjectId":"1"}
        ]"#;
        assert!(s.load_bookings_json(clash).is_err());
        assert_eq!(s.service.len(), 1);
    }

    #[test]
    fn ids_beyond_u32_stay_addressable() {
        let s = scheduler();
        let saved = r#"[
            {"id":5000000000,"day":"monday","start":"9:00","duration":1,"facultyId":"1","roomId":"1","subjectId":"1"}
        ]"#;
        s.load_bookings_json(saved).unwrap();

        let flagged: serde_json::Value =
            serde_json::from_str(&s.flag_json(5_000_000_000.0, "travel").unwrap()).unwrap();
        assert_eq!(flagged["id"], 5_000_000_000u64);
        let moved: serde_json::Value =
            serde_json::from_str(&s.reschedule_json(5_000_000_000.0, MONDAY_NINE).unwrap()).unwrap();
        assert_eq!(moved["duration"], 1.5);
        assert!(s.remove(5_000_000_000.0));
    }

    #[test]
    fn ids_javascript_cannot_hold_are_rejected() {
        let s = scheduler();
        let saved = r#"[
            {"id":9007199254740993,"day":"monday","start":"9:00","duration":1,"facultyId":"1","roomId":"1","subjectId":"1"}
        ]"#;
        let err = s.load_bookings_json(saved).unwrap_err();
        assert!(err.contains("too large"), "{err}");
        assert!(s.service.is_empty());

        assert!(s.flag_json(1.5, "x").unwrap_err().starts_with("Invalid booking id"));
        assert!(s.check_json(MONDAY_NINE, Some(-1.0)).is_err());
        assert!(!s.remove(f64::NAN));
    }
}
