use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::BOOKINGS_TOTAL;

use super::availability::is_within_availability;
use super::conflict::{check_no_conflict, now_ms, validate_span};
use super::{Engine, EngineError};

/// A booking request that passed presence validation.
struct Validated<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    barber_id: Ulid,
    service_id: Ulid,
    start: Ms,
    notes: Option<&'a str>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Engine {
    /// The booking decision. Validates presence, resolves the service and
    /// barber, checks weekly availability and same-day conflicts, then
    /// finds-or-creates the customer and commits a pending appointment.
    ///
    /// Returns the new appointment id.
    pub async fn book_appointment(&self, req: BookingRequest) -> Result<Ulid, EngineError> {
        let _gate = self.commit_gate.read().await;
        let result = self.decide_booking(&req).await;
        let outcome = match &result {
            Ok(_) => "accepted",
            Err(EngineError::MissingFields(_) | EngineError::InvalidField { .. }) => "invalid",
            Err(EngineError::NotFound(..)) => "not_found",
            Err(EngineError::OutsideAvailability { .. }) => "outside_availability",
            Err(EngineError::SlotConflict(_)) => "conflict",
            Err(_) => "error",
        };
        metrics::counter!(BOOKINGS_TOTAL, "outcome" => outcome).increment(1);
        result
    }

    async fn decide_booking(&self, req: &BookingRequest) -> Result<Ulid, EngineError> {
        let v = self.validate_request(req)?;

        let service = self
            .services
            .get(&v.service_id)
            .map(|s| s.value().clone())
            .ok_or(EngineError::NotFound("service", v.service_id))?;
        let barber = self
            .get_barber(&v.barber_id)
            .ok_or(EngineError::NotFound("barber", v.barber_id))?;

        let requested = Span::new(v.start, v.start + service.duration_ms());
        validate_span(&requested)?;

        // Held until the appointment is durable: concurrent requests for the
        // same barber are checked one after another.
        let mut guard = barber.write_owned().await;
        if !self.barbers.contains_key(&v.barber_id) {
            return Err(EngineError::NotFound("barber", v.barber_id));
        }

        if !guard.active || !is_within_availability(&guard.blocks, &requested, self.offset()) {
            debug!(barber_id = %v.barber_id, "booking rejected: outside availability");
            return Err(EngineError::OutsideAvailability {
                barber_id: v.barber_id,
                requested,
                offset: self.offset(),
            });
        }

        let date = local_date(requested.start, self.offset())
            .ok_or(EngineError::LimitExceeded("timestamp out of range"))?;
        let day = day_span(date, self.offset());
        if let Err(e) = check_no_conflict(&guard, &day, &requested) {
            debug!(barber_id = %v.barber_id, "booking rejected: {e}");
            return Err(e);
        }

        if guard.appointments.len() >= MAX_APPOINTMENTS_PER_BARBER {
            return Err(EngineError::LimitExceeded("too many appointments for barber"));
        }

        let customer_id = self
            .find_or_create_customer(v.name, v.email, v.phone, req.create_account)
            .await?;

        let now = now_ms();
        let appointment = Appointment {
            id: Ulid::new(),
            customer_id,
            barber_id: v.barber_id,
            service_id: v.service_id,
            span: requested,
            price_cents: service.price_cents,
            status: AppointmentStatus::Pending,
            notes: v.notes.map(str::to_string),
            log: vec![LogEntry {
                at: now,
                message: format!("Appointment created for {}", service.name),
            }],
        };
        let id = appointment.id;
        self.persist_and_apply(&mut guard, &Event::AppointmentBooked(appointment))
            .await?;
        drop(guard);

        info!(
            appointment_id = %id,
            barber_id = %v.barber_id,
            service = %service.name,
            start = %format_instant(requested.start, self.offset()),
            "appointment booked"
        );
        self.audit(
            "appointment.created",
            Some(id),
            format!("{} booked {} with barber {}", v.email, service.name, v.barber_id),
        )
        .await;

        Ok(id)
    }

    /// Presence first (no lookups on failure), then format and size checks.
    fn validate_request<'a>(&self, req: &'a BookingRequest) -> Result<Validated<'a>, EngineError> {
        let name = present(&req.customer_name);
        let email = present(&req.customer_email);
        let phone = present(&req.customer_phone);
        let date_time = present(&req.date_time);

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("customer_name");
        }
        if email.is_none() {
            missing.push("customer_email");
        }
        if phone.is_none() {
            missing.push("customer_phone");
        }
        if req.barber_id.is_none() {
            missing.push("barber_id");
        }
        if req.service_id.is_none() {
            missing.push("service_id");
        }
        if date_time.is_none() {
            missing.push("date_time");
        }

        let (Some(name), Some(email), Some(phone), Some(barber_id), Some(service_id), Some(date_time)) =
            (name, email, phone, req.barber_id, req.service_id, date_time)
        else {
            return Err(EngineError::MissingFields(missing));
        };

        let start = parse_instant(date_time, self.offset()).ok_or_else(|| EngineError::InvalidField {
            field: "date_time",
            reason: format!("not an ISO-8601 timestamp: {date_time}"),
        })?;
        if name.len() > MAX_NAME_LEN || email.len() > MAX_NAME_LEN || phone.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("customer field too long"));
        }
        let notes = present(&req.notes);
        if notes.is_some_and(|n| n.len() > MAX_NOTES_LEN) {
            return Err(EngineError::LimitExceeded("notes too long"));
        }

        Ok(Validated {
            name,
            email,
            phone,
            barber_id,
            service_id,
            start,
            notes,
        })
    }
}
