use chrono::FixedOffset;
use ulid::Ulid;

use crate::model::{format_instant, AppointmentStatus, Span};

#[derive(Debug)]
pub enum EngineError {
    /// Required booking fields that were absent or blank.
    MissingFields(Vec<&'static str>),
    InvalidField {
        field: &'static str,
        reason: String,
    },
    NotFound(&'static str, Ulid),
    AlreadyExists(Ulid),
    /// `offset` is the shop's, used to render the requested span.
    OutsideAvailability {
        barber_id: Ulid,
        requested: Span,
        offset: FixedOffset,
    },
    /// Carries the id of the appointment already holding the slot.
    SlotConflict(Ulid),
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    HasAppointments(Ulid),
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            EngineError::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
            EngineError::NotFound(kind, id) => write!(f, "{kind} not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::OutsideAvailability { barber_id, requested, offset } => write!(
                f,
                "barber {barber_id} is not available from {} to {}",
                format_instant(requested.start, *offset),
                format_instant(requested.end, *offset)
            ),
            EngineError::SlotConflict(id) => {
                write!(f, "time slot is already booked (appointment {id})")
            }
            EngineError::InvalidTransition { from, to } => write!(
                f,
                "cannot change appointment status from {} to {}",
                from.as_str(),
                to.as_str()
            ),
            EngineError::HasAppointments(id) => {
                write!(f, "cannot delete barber {id}: has open appointments")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_availability_uses_shop_offset() {
        let err = EngineError::OutsideAvailability {
            barber_id: Ulid::nil(),
            requested: Span::new(1_736_157_600_000, 1_736_159_400_000),
            offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2025-01-06T12:00:00+02:00"), "{msg}");
        assert!(msg.contains("2025-01-06T12:30:00+02:00"), "{msg}");
    }
}
