//! Error taxonomy for scheduling operations.
//!
//! Only two conditions are real errors: an empty template catalog and a
//! failed persistence call. Everything else (missing rooms, partially
//! scheduled sections) is encoded as data in the output so a batch can
//! succeed partially.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors surfaced by scheduling operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The backing template dataset parsed to zero usable rows.
    ///
    /// Callers must treat this as "no schedule can be generated",
    /// not as a crash.
    #[error("template catalog has no rows")]
    EmptyCatalog,

    /// A persistence collaborator (occupancy store, cursor store,
    /// room inventory, template source) failed.
    #[error("persistence failure while {context}: {source}")]
    Persistence {
        /// What the core was doing when the collaborator failed.
        context: &'static str,
        /// Underlying collaborator error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ScheduleError {
    /// Wraps a collaborator error with the operation it interrupted.
    pub fn persistence(
        context: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Persistence {
            context,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_message_includes_context() {
        let err = ScheduleError::persistence("saving rotation cursor", "disk full");
        let msg = err.to_string();
        assert!(msg.contains("saving rotation cursor"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_empty_catalog_message() {
        assert_eq!(
            ScheduleError::EmptyCatalog.to_string(),
            "template catalog has no rows"
        );
    }
}
