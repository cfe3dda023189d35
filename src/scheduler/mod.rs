//! Batch timetable generation.
//!
//! `BatchScheduler` is the orchestrator: it walks a batch of section
//! requests through the rotating-slot sequence, asks the room engine
//! for a room per section, and stages everything in the occupancy
//! ledger until the caller commits.
//!
//! # Two-phase batches
//!
//! Generation is a dry run over shared state: rows come back to the
//! caller, occupancy keys and the advanced cursor stay in the session
//! layer. `commit_batch` persists them; a batch that is never committed
//! leaves no trace.

mod batch;

pub use batch::{BatchOutcome, BatchScheduler, CommitSummary, SubjectOutcome, SubjectStatus};
