use ulid::Ulid;

use crate::model::*;

use super::EngineError;

pub(crate) fn now_ms() -> Ms {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn validate_span(span: &Span) -> Result<(), EngineError> {
    use crate::limits::*;
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    Ok(())
}

// ── Conflict Detector ─────────────────────────────────────────────

/// Two intervals clash on any half-open overlap, and additionally whenever
/// they share a start or an end instant.
pub fn intervals_clash(requested: &Span, existing: &Span) -> bool {
    requested.overlaps(existing)
        || requested.start == existing.start
        || requested.end == existing.end
}

/// First appointment in `existing` whose interval clashes with `requested`.
/// `existing` is expected to be the barber's appointments on the requested
/// day with cancelled ones already filtered out.
pub fn find_conflict<'a>(
    existing: impl IntoIterator<Item = &'a Appointment>,
    requested: &Span,
) -> Option<Ulid> {
    existing
        .into_iter()
        .find(|a| intervals_clash(requested, &a.span))
        .map(|a| a.id)
}

pub fn has_conflict<'a>(
    existing: impl IntoIterator<Item = &'a Appointment>,
    requested: &Span,
) -> bool {
    find_conflict(existing, requested).is_some()
}

/// Check the requested span against the barber's active appointments that
/// start on the same shop-local day.
pub(crate) fn check_no_conflict(
    bs: &BarberState,
    day: &Span,
    requested: &Span,
) -> Result<(), EngineError> {
    let same_day = bs.starting_within(day).filter(|a| a.is_active());
    match find_conflict(same_day, requested) {
        Some(id) => Err(EngineError::SlotConflict(id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: Ms = MINUTE_MS;
    const TEN: Ms = 10 * 60 * M;

    fn appt(start: Ms, minutes: Ms) -> Appointment {
        Appointment {
            id: Ulid::new(),
            customer_id: Ulid::new(),
            barber_id: Ulid::new(),
            service_id: Ulid::new(),
            span: Span::new(start, start + minutes * M),
            price_cents: 0,
            status: AppointmentStatus::Pending,
            notes: None,
            log: Vec::new(),
        }
    }

    fn req(start: Ms, minutes: Ms) -> Span {
        Span::new(start, start + minutes * M)
    }

    #[test]
    fn overlap_conflicts() {
        let existing = vec![appt(TEN, 30)];
        assert!(has_conflict(&existing, &req(TEN + 15 * M, 30)));
        assert!(has_conflict(&existing, &req(TEN - 15 * M, 30)));
    }

    #[test]
    fn containment_conflicts_both_ways() {
        let existing = vec![appt(TEN, 60)];
        assert!(has_conflict(&existing, &req(TEN + 10 * M, 10)));
        assert!(has_conflict(&existing, &req(TEN - 10 * M, 120)));
    }

    #[test]
    fn shared_start_or_end_conflicts() {
        let existing = vec![appt(TEN, 30)];
        assert!(has_conflict(&existing, &req(TEN, 60)));
        assert!(has_conflict(&existing, &req(TEN - 30 * M, 60)));
    }

    #[test]
    fn abutting_intervals_do_not_conflict() {
        let existing = vec![appt(TEN, 30)];
        assert!(!has_conflict(&existing, &req(TEN + 30 * M, 30)));
        assert!(!has_conflict(&existing, &req(TEN - 30 * M, 30)));
    }

    #[test]
    fn disjoint_does_not_conflict() {
        let existing = vec![appt(TEN, 30), appt(TEN + 120 * M, 30)];
        assert!(!has_conflict(&existing, &req(TEN + 45 * M, 60)));
    }

    #[test]
    fn empty_day_never_conflicts() {
        let existing: Vec<Appointment> = Vec::new();
        assert!(!has_conflict(&existing, &req(TEN, 30)));
    }

    #[test]
    fn reports_first_clashing_appointment() {
        let a = appt(TEN, 30);
        let b = appt(TEN + 30 * M, 30);
        let expected = b.id;
        let existing = vec![a, b];
        assert_eq!(find_conflict(&existing, &req(TEN + 40 * M, 10)), Some(expected));
    }

    #[test]
    fn detector_is_pure() {
        let existing = vec![appt(TEN, 30)];
        let r = req(TEN + 15 * M, 30);
        assert_eq!(has_conflict(&existing, &r), has_conflict(&existing, &r));
    }

    #[test]
    fn cancelled_appointments_ignored_by_barber_check() {
        let mut bs = BarberState::new(Ulid::new(), "Sam".into(), None);
        let mut cancelled = appt(TEN, 30);
        cancelled.status = AppointmentStatus::Cancelled;
        bs.insert_appointment(cancelled);
        let day = Span::new(0, DAY_MS);
        assert!(check_no_conflict(&bs, &day, &req(TEN, 30)).is_ok());

        bs.insert_appointment(appt(TEN, 30));
        assert!(matches!(
            check_no_conflict(&bs, &day, &req(TEN, 30)),
            Err(EngineError::SlotConflict(_))
        ));
    }

    #[test]
    fn other_days_are_not_considered() {
        let mut bs = BarberState::new(Ulid::new(), "Sam".into(), None);
        bs.insert_appointment(appt(DAY_MS + TEN, 30));
        let day = Span::new(0, DAY_MS);
        assert!(check_no_conflict(&bs, &day, &req(TEN, 30)).is_ok());
    }
}
