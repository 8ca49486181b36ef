use chrono::{FixedOffset, NaiveDate};

use crate::model::*;

// ── Availability Resolver ─────────────────────────────────────────

/// True if `requested` lies entirely inside one of the barber's weekly blocks
/// for the shop-local weekday of `requested.start`. Both ends are inclusive:
/// an appointment may start at opening and end at closing.
///
/// Blocks are placed on the requested date and never span midnight, so a
/// request running past midnight is never satisfiable.
pub fn is_within_availability(
    blocks: &[AvailabilityBlock],
    requested: &Span,
    offset: FixedOffset,
) -> bool {
    let Some(date) = local_date(requested.start, offset) else {
        return false;
    };
    let day = DayOfWeek::of_date(date);
    blocks
        .iter()
        .filter(|b| b.day == day)
        .any(|b| b.on_date(date, offset).contains_span(requested))
}

/// The barber's blocks for `date`, as sorted disjoint spans.
pub fn open_hours(blocks: &[AvailabilityBlock], date: NaiveDate, offset: FixedOffset) -> Vec<Span> {
    let day = DayOfWeek::of_date(date);
    let mut spans: Vec<Span> = blocks
        .iter()
        .filter(|b| b.day == day)
        .map(|b| b.on_date(date, offset))
        .collect();
    spans.sort_by_key(|s| s.start);
    merge_overlapping(&spans)
}

/// Free time on `date`: open hours minus the spans of active appointments,
/// keeping only gaps of at least `min_duration`.
pub fn open_slots<'a>(
    blocks: &[AvailabilityBlock],
    appointments: impl IntoIterator<Item = &'a Appointment>,
    date: NaiveDate,
    offset: FixedOffset,
    min_duration: Ms,
) -> Vec<Span> {
    let hours = open_hours(blocks, date, offset);
    if hours.is_empty() {
        return hours;
    }
    let mut taken: Vec<Span> = appointments
        .into_iter()
        .filter(|a| a.is_active())
        .map(|a| a.span)
        .collect();
    taken.sort_by_key(|s| s.start);
    let taken = merge_overlapping(&taken);

    let mut free = subtract_intervals(&hours, &taken);
    free.retain(|s| s.duration_ms() >= min_duration);
    free
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end {
                last.end = last.end.max(span.end);
                continue;
            }
        merged.push(span);
    }
    merged
}

/// `base` minus `to_remove`; both sorted by start, `to_remove` disjoint.
pub fn subtract_intervals(base: &[Span], to_remove: &[Span]) -> Vec<Span> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Span::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Span::new(current_start, current_end));
        }
    }

    result
}
