//! `timetable` CLI: manage a conflict-checked class timetable stored as JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Schedule a session (creates timetable.json if missing)
//! timetable add --day monday --start 9:00 --duration 1.5 \
//!     --subject 1 --faculty 1 --room 1
//!
//! # Show the week, sorted by day and start time
//! timetable list
//!
//! # Preview a slot without booking it
//! timetable check --day monday --start 9:30 --duration 1 \
//!     --subject 2 --faculty 1 --room 2
//!
//! # Move, flag, or remove a booking
//! timetable reschedule 1 --day tuesday --start 9:00 --duration 1.5 \
//!     --subject 1 --faculty 1 --room 1
//! timetable flag 1 --reason "faculty unavailable"
//! timetable remove 1
//!
//! # Free time for a faculty member and a room on a day
//! timetable free --day monday --faculty 1 --room 2
//!
//! # Use another file
//! TIMETABLE_FILE=fall.json timetable summary
//! ```

mod timetable_file;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use timetable_engine::conflict;
use timetable_engine::{
    BookingId, BookingInput, BookingStore, ConflictReport, Resource, SchedulingService,
    TimetableError, Weekday,
};
use tracing_subscriber::EnvFilter;

use crate::timetable_file::TimetableFile;

#[derive(Parser)]
#[command(name = "timetable", version, about = "Conflict-checked class timetable")]
struct Cli {
    /// Timetable JSON file
    #[arg(short, long, env = "TIMETABLE_FILE", default_value = "timetable.json", global = true)]
    file: PathBuf,

    /// Print output as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log diagnostics to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The full placement of a session.
#[derive(Args)]
struct SlotArgs {
    /// Day of the week (monday..friday)
    #[arg(long)]
    day: String,
    /// Start time, H:MM
    #[arg(long)]
    start: String,
    /// Duration in hours (e.g. 1.5)
    #[arg(long)]
    duration: String,
    /// Subject id
    #[arg(long)]
    subject: String,
    /// Faculty id
    #[arg(long)]
    faculty: String,
    /// Classroom id
    #[arg(long)]
    room: String,
}

impl From<SlotArgs> for BookingInput {
    fn from(args: SlotArgs) -> Self {
        Self {
            day: args.day,
            start: args.start,
            duration: args.duration,
            subject_id: args.subject,
            faculty_id: args.faculty,
            room_id: args.room,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every pair of bookings that double-books a faculty member or room
    Audit,
    #[command(flatten)]
    Timetable(TimetableCommand),
}

/// Commands that run against a loaded, conflict-free timetable.
#[derive(Subcommand)]
enum TimetableCommand {
    /// List all bookings by day and start time
    List {
        /// Only bookings flagged for rescheduling
        #[arg(long)]
        flagged: bool,
    },
    /// Schedule a new session
    Add(SlotArgs),
    /// Move an existing booking to a new placement
    Reschedule {
        id: BookingId,
        #[command(flatten)]
        slot: SlotArgs,
    },
    /// Delete a booking
    Remove { id: BookingId },
    /// Flag a booking as needing rescheduling
    Flag {
        id: BookingId,
        #[arg(long)]
        reason: String,
    },
    /// Report conflicts for a placement without booking it
    Check {
        #[command(flatten)]
        slot: SlotArgs,
        /// Ignore this booking (previewing its own reschedule)
        #[arg(long)]
        exclude: Option<BookingId>,
    },
    /// Show free windows on a day for a faculty member and/or room
    Free {
        #[arg(long)]
        day: String,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        room: Option<String>,
    },
    /// Mark a faculty member or classroom available/unavailable
    Availability {
        #[arg(long, conflicts_with = "room", required_unless_present = "room")]
        faculty: Option<String>,
        #[arg(long)]
        room: Option<String>,
        /// Mark as unavailable and flag affected bookings
        #[arg(long)]
        unavailable: bool,
        #[arg(long, default_value = "resource unavailable")]
        reason: String,
    },
    /// Dashboard counts
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = TimetableFile::load(&cli.file)?;
    let command = match cli.command {
        // A double-booked file cannot be loaded into the service, so audit it raw.
        Commands::Audit => return audit(file, cli.json),
        Commands::Timetable(command) => command,
    };

    let service = file.into_service()?;
    let changed = run(&service, command, cli.json)?;

    if changed {
        TimetableFile::from_service(&service).save(&cli.file)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Execute one command. Returns whether the timetable must be saved.
fn run(service: &SchedulingService, command: TimetableCommand, json: bool) -> Result<bool> {
    match command {
        TimetableCommand::List { flagged } => {
            let mut entries = service.timetable();
            if flagged {
                entries.retain(|e| e.booking.needs_rescheduling);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No classes scheduled.");
            } else {
                for e in &entries {
                    let b = &e.booking;
                    let flag = match &b.reschedule_reason {
                        Some(reason) => format!("  [needs rescheduling: {reason}]"),
                        None if b.needs_rescheduling => "  [needs rescheduling]".to_string(),
                        None => String::new(),
                    };
                    println!(
                        "{:>4}  {:<9} {:<11}  {} | {} | {}{}",
                        b.id.to_string(),
                        b.day.to_string(),
                        b.interval().to_string(),
                        e.subject_name,
                        e.faculty_name,
                        e.room_name,
                        flag
                    );
                }
            }
            Ok(false)
        }
        TimetableCommand::Add(slot) => {
            let input = BookingInput::from(slot);
            let booking = service.create(&input).map_err(explain)?;
            tracing::info!(id = %booking.id, day = %booking.day, start = %booking.start, "booking created");
            if json {
                println!("{}", serde_json::to_string_pretty(&booking)?);
            } else {
                println!("Scheduled booking {}", booking.id);
            }
            Ok(true)
        }
        TimetableCommand::Reschedule { id, slot } => {
            let input = BookingInput::from(slot);
            let booking = service.reschedule(id, &input).map_err(explain)?;
            tracing::info!(id = %booking.id, day = %booking.day, start = %booking.start, "booking rescheduled");
            if json {
                println!("{}", serde_json::to_string_pretty(&booking)?);
            } else {
                println!("Rescheduled booking {}", booking.id);
            }
            Ok(true)
        }
        TimetableCommand::Remove { id } => match service.delete(id) {
            Ok(()) => {
                println!("Removed booking {id}");
                Ok(true)
            }
            Err(TimetableError::NotFound(_)) => {
                tracing::warn!(%id, "booking already gone, nothing to remove");
                println!("Booking {id} does not exist; nothing removed");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        },
        TimetableCommand::Flag { id, reason } => {
            let booking = service
                .mark_needs_rescheduling(id, reason)
                .map_err(explain)?;
            println!(
                "Booking {} needs rescheduling: {}",
                booking.id,
                booking.reschedule_reason.as_deref().unwrap_or_default()
            );
            Ok(true)
        }
        TimetableCommand::Check { slot, exclude } => {
            let input = BookingInput::from(slot);
            let report = service.check(&input, exclude).map_err(explain)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(false)
        }
        TimetableCommand::Free { day, faculty, room } => {
            let day = day.parse::<Weekday>().map_err(TimetableError::from).map_err(explain)?;
            let resources: Vec<Resource> = faculty
                .map(Resource::Faculty)
                .into_iter()
                .chain(room.map(Resource::Room))
                .collect();
            if resources.is_empty() {
                anyhow::bail!("free needs --faculty and/or --room");
            }
            let windows = service.free_windows(day, &resources);
            if json {
                println!("{}", serde_json::to_string_pretty(&windows)?);
            } else if windows.is_empty() {
                println!("No free time on {day}.");
            } else {
                for w in &windows {
                    println!("{day} {}-{} ({} min)", w.start, w.end, w.duration_minutes);
                }
            }
            Ok(false)
        }
        TimetableCommand::Availability {
            faculty,
            room,
            unavailable,
            reason,
        } => {
            let flagged = match (faculty, room) {
                (Some(id), _) => service.set_faculty_available(&id, !unavailable, &reason),
                (None, Some(id)) => service.set_classroom_available(&id, !unavailable, &reason),
                (None, None) => anyhow::bail!("availability needs --faculty or --room"),
            }
            .map_err(explain)?;
            for b in &flagged {
                tracing::info!(id = %b.id, %reason, "booking flagged");
            }
            println!("{} booking(s) flagged for rescheduling", flagged.len());
            Ok(true)
        }
        TimetableCommand::Summary => {
            let summary = service.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Total classes:      {}", summary.total);
                println!("Need rescheduling:  {}", summary.needs_rescheduling);
                for (day, count) in &summary.per_day {
                    println!("{:<19} {count}", format!("{day}:"));
                }
            }
            Ok(false)
        }
    }
}

/// Report every double-booking in the file. Exits non-zero if there is any.
fn audit(file: TimetableFile, json: bool) -> Result<()> {
    let mut store = BookingStore::new();
    for booking in file.bookings {
        store.insert(booking).map_err(explain)?;
    }
    let pairs = conflict::audit(&store);
    if json {
        println!("{}", serde_json::to_string_pretty(&pairs)?);
    } else if pairs.is_empty() {
        println!("No double-bookings.");
    } else {
        for p in &pairs {
            println!(
                "bookings {} and {} overlap on {} for {} min",
                p.first, p.second, p.dimension, p.overlap_minutes
            );
        }
    }
    if !pairs.is_empty() {
        anyhow::bail!("{} double-booking(s) found", pairs.len());
    }
    Ok(())
}

fn print_report(report: &ConflictReport) {
    if !report.has_conflict() {
        println!("No conflicts.");
        return;
    }
    println!("Conflict: {report}");
    for clash in &report.clashes {
        println!(
            "  booking {} ({}, {} min overlap)",
            clash.booking_id, clash.dimension, clash.overlap_minutes
        );
    }
}

/// Attach a hint to engine errors so the message says what to do next.
fn explain(err: TimetableError) -> anyhow::Error {
    let hint = match &err {
        TimetableError::Conflict(_) => "choose a different time, room or faculty member",
        TimetableError::NotFound(_) => "run `timetable list` to see booking ids",
        TimetableError::Validation(_) => "check the booking fields",
        TimetableError::DuplicateId(_) => "the timetable file repeats a booking id",
        TimetableError::IdsExhausted(_) => "renumber the bookings in the timetable file",
    };
    anyhow::Error::new(err).context(hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn audit_is_dispatched_apart_from_timetable_commands() {
        let audit = Cli::try_parse_from(["timetable", "audit"]).unwrap();
        assert!(matches!(audit.command, Commands::Audit));

        let list = Cli::try_parse_from(["timetable", "list", "--flagged"]).unwrap();
        assert!(matches!(
            list.command,
            Commands::Timetable(TimetableCommand::List { flagged: true })
        ));
    }

    #[test]
    fn explain_keeps_engine_error_as_source() {
        let err = explain(TimetableError::NotFound(BookingId(3)));
        assert_eq!(err.to_string(), "run `timetable list` to see booking ids");
        assert_eq!(err.root_cause().to_string(), "Booking not found: 3");
    }
}
