use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds. The only instant type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const DAY_MS: Ms = 24 * 60 * MINUTE_MS;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if `self` fully contains `other`, boundaries included.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// ── Shop-local calendar ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Case-insensitive weekday name, e.g. "monday".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" => Some(DayOfWeek::Monday),
            "tuesday" => Some(DayOfWeek::Tuesday),
            "wednesday" => Some(DayOfWeek::Wednesday),
            "thursday" => Some(DayOfWeek::Thursday),
            "friday" => Some(DayOfWeek::Friday),
            "saturday" => Some(DayOfWeek::Saturday),
            "sunday" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Wall-clock time of day, stored as minutes past local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Parse "HH:MM" (24-hour clock). "24:00" is not accepted: blocks never span midnight.
    pub fn parse(s: &str) -> Option<Self> {
        let (h, m) = s.trim().split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        Self::from_hm(h.parse().ok()?, m.parse().ok()?)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn offset_ms(&self) -> Ms {
        self.0 as Ms * MINUTE_MS
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Local calendar date of an instant.
pub fn local_date(t: Ms, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(t).map(|dt| dt.with_timezone(&offset).date_naive())
}

/// `[local midnight, next local midnight)` for the given date.
pub fn day_span(date: NaiveDate, offset: FixedOffset) -> Span {
    let midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
        - offset.local_minus_utc() as Ms * 1000;
    Span::new(midnight, midnight + DAY_MS)
}

/// Parse an ISO-8601 instant. Strings without an offset are shop-local time.
pub fn parse_instant(s: &str, offset: FixedOffset) -> Option<Ms> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())?;
    Some(naive.and_utc().timestamp_millis() - offset.local_minus_utc() as Ms * 1000)
}

/// RFC 3339 rendering of an instant in shop-local time.
pub fn format_instant(t: Ms, offset: FixedOffset) -> String {
    DateTime::from_timestamp_millis(t)
        .map(|dt| dt.with_timezone(&offset).to_rfc3339())
        .unwrap_or_else(|| t.to_string())
}

// ── Entities ─────────────────────────────────────────────────────

/// A barber's recurring weekly open interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    pub id: Ulid,
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl AvailabilityBlock {
    /// The block placed on a concrete local date.
    pub fn on_date(&self, date: NaiveDate, offset: FixedOffset) -> Span {
        let midnight = day_span(date, offset).start;
        Span::new(midnight + self.start.offset_ms(), midnight + self.end.offset_ms())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" | "canceled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Completed and cancelled are terminal.
    pub fn can_become(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: Ms,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Ulid,
    pub customer_id: Ulid,
    pub barber_id: Ulid,
    pub service_id: Ulid,
    /// `[date_time, date_time + service duration)` as of booking time.
    pub span: Span,
    /// Service price as of booking time.
    pub price_cents: i64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub log: Vec<LogEntry>,
}

impl Appointment {
    /// Everything except cancelled appointments occupies the chair.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Ulid,
    pub name: String,
    pub duration_minutes: u32,
    pub price_cents: i64,
}

impl Service {
    pub fn duration_ms(&self) -> Ms {
        self.duration_minutes as Ms * MINUTE_MS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Ulid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub loyalty_points: i64,
    pub has_account: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Ulid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub received_at: Ms,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Ulid,
    pub at: Ms,
    pub action: String,
    pub entity_id: Option<Ulid>,
    pub detail: String,
}

/// Everything that lives behind one barber's lock: profile, weekly blocks and
/// appointments (sorted by `span.start`).
#[derive(Debug, Clone)]
pub struct BarberState {
    pub id: Ulid,
    pub name: String,
    pub bio: Option<String>,
    pub active: bool,
    pub blocks: Vec<AvailabilityBlock>,
    pub appointments: Vec<Appointment>,
}

impl BarberState {
    pub fn new(id: Ulid, name: String, bio: Option<String>) -> Self {
        Self {
            id,
            name,
            bio,
            active: true,
            blocks: Vec::new(),
            appointments: Vec::new(),
        }
    }

    /// Insert appointment maintaining sort order by span.start.
    pub fn insert_appointment(&mut self, appt: Appointment) {
        let pos = self
            .appointments
            .binary_search_by_key(&appt.span.start, |a| a.span.start)
            .unwrap_or_else(|e| e);
        self.appointments.insert(pos, appt);
    }

    pub fn appointment_mut(&mut self, id: Ulid) -> Option<&mut Appointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }

    /// Appointments starting inside `day`. Uses binary search on the sorted list.
    pub fn starting_within(&self, day: &Span) -> impl Iterator<Item = &Appointment> {
        let lo = self.appointments.partition_point(|a| a.span.start < day.start);
        let hi = self.appointments.partition_point(|a| a.span.start < day.end);
        self.appointments[lo..hi].iter()
    }

    pub fn has_active_appointments(&self) -> bool {
        self.appointments.iter().any(Appointment::is_active)
    }
}

/// Typed booking request, built once at the protocol boundary.
/// Fields stay optional so presence is checked by the booking decision itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub barber_id: Option<Ulid>,
    pub service_id: Option<Ulid>,
    /// ISO-8601 start.
    pub date_time: Option<String>,
    pub notes: Option<String>,
    pub create_account: bool,
}

/// WAL record format. Flat: no nesting beyond entity snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BarberCreated {
        id: Ulid,
        name: String,
        bio: Option<String>,
    },
    BarberUpdated {
        id: Ulid,
        name: String,
        bio: Option<String>,
        active: bool,
    },
    BarberDeleted {
        id: Ulid,
    },
    BlockAdded {
        barber_id: Ulid,
        block: AvailabilityBlock,
    },
    BlockRemoved {
        id: Ulid,
        barber_id: Ulid,
    },
    ServiceSaved(Service),
    ServiceDeleted {
        id: Ulid,
    },
    CustomerSaved(Customer),
    AppointmentBooked(Appointment),
    AppointmentStatusChanged {
        id: Ulid,
        barber_id: Ulid,
        status: AppointmentStatus,
        entry: LogEntry,
    },
    ContactReceived(Contact),
    ContactRead {
        id: Ulid,
    },
    AuditRecorded(AuditRecord),
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarberInfo {
    pub id: Ulid,
    pub name: String,
    pub bio: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub id: Ulid,
    pub barber_id: Ulid,
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub end: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarberStats {
    pub barber_id: Ulid,
    pub name: String,
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub revenue_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn span_contains_span() {
        let outer = Span::new(100, 400);
        let inner = Span::new(150, 300);
        let partial = Span::new(50, 200);
        assert!(outer.contains_span(&inner));
        assert!(outer.contains_span(&outer)); // self-containment
        assert!(!outer.contains_span(&partial));
    }

    #[test]
    fn clock_time_parsing() {
        assert_eq!(ClockTime::parse("09:00").unwrap().minutes(), 540);
        assert_eq!(ClockTime::parse("9:30").unwrap().minutes(), 570);
        assert_eq!(ClockTime::parse("23:59").unwrap().minutes(), 1439);
        assert!(ClockTime::parse("24:00").is_none());
        assert!(ClockTime::parse("12:60").is_none());
        assert!(ClockTime::parse("1200").is_none());
        assert!(ClockTime::parse("12:5").is_none());
        assert_eq!(ClockTime::parse("07:05").unwrap().to_string(), "07:05");
    }

    #[test]
    fn day_names_are_case_insensitive() {
        assert_eq!(DayOfWeek::parse("Monday"), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::parse("SUNDAY"), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::parse("mon"), None);
        assert_eq!(DayOfWeek::Friday.as_str(), "friday");
    }

    #[test]
    fn local_date_respects_offset() {
        // 2025-01-06T23:30:00Z is already Tuesday in UTC+01:00.
        let t = parse_instant("2025-01-06T23:30:00Z", utc()).unwrap();
        let cet = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(DayOfWeek::of_date(local_date(t, utc()).unwrap()), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of_date(local_date(t, cet).unwrap()), DayOfWeek::Tuesday);
    }

    #[test]
    fn naive_instants_are_shop_local() {
        let cet = FixedOffset::east_opt(3600).unwrap();
        let local = parse_instant("2025-01-06T10:00", cet).unwrap();
        let explicit = parse_instant("2025-01-06T09:00:00Z", cet).unwrap();
        assert_eq!(local, explicit);
        assert!(parse_instant("next tuesday", cet).is_none());
    }

    #[test]
    fn block_on_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let block = AvailabilityBlock {
            id: Ulid::new(),
            day: DayOfWeek::Monday,
            start: ClockTime::parse("09:00").unwrap(),
            end: ClockTime::parse("17:00").unwrap(),
        };
        let span = block.on_date(date, utc());
        assert_eq!(span.start, parse_instant("2025-01-06T09:00:00Z", utc()).unwrap());
        assert_eq!(span.duration_ms(), 8 * 60 * MINUTE_MS);
    }

    #[test]
    fn status_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_become(Confirmed));
        assert!(Pending.can_become(Cancelled));
        assert!(Confirmed.can_become(Completed));
        assert!(!Pending.can_become(Completed));
        assert!(!Completed.can_become(Cancelled));
        assert!(!Cancelled.can_become(Pending));
        assert_eq!(AppointmentStatus::parse("Canceled"), Some(Cancelled));
    }

    #[test]
    fn appointments_stay_sorted() {
        let mut bs = BarberState::new(Ulid::new(), "Sam".into(), None);
        for start in [300, 100, 200] {
            bs.insert_appointment(Appointment {
                id: Ulid::new(),
                customer_id: Ulid::new(),
                barber_id: bs.id,
                service_id: Ulid::new(),
                span: Span::new(start, start + 50),
                price_cents: 0,
                status: AppointmentStatus::Pending,
                notes: None,
                log: Vec::new(),
            });
        }
        let starts: Vec<Ms> = bs.appointments.iter().map(|a| a.span.start).collect();
        assert_eq!(starts, vec![100, 200, 300]);
        let within: Vec<Ms> = bs
            .starting_within(&Span::new(150, 300))
            .map(|a| a.span.start)
            .collect();
        assert_eq!(within, vec![200]);
    }
}
