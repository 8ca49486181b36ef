use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::*;

use super::availability::open_slots;
use super::{email_key, Engine, EngineError, SharedBarberState};

impl Engine {
    fn all_barbers(&self) -> Vec<SharedBarberState> {
        self.barbers.iter().map(|e| e.value().clone()).collect()
    }

    /// Barbers sorted by name.
    pub async fn list_barbers(&self) -> Vec<BarberInfo> {
        let mut out = Vec::with_capacity(self.barbers.len());
        for bs in self.all_barbers() {
            let guard = bs.read().await;
            out.push(BarberInfo {
                id: guard.id,
                name: guard.name.clone(),
                bio: guard.bio.clone(),
                active: guard.active,
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out
    }

    /// Weekly blocks of one barber, Monday first. Unknown barbers have none.
    pub async fn get_blocks(&self, barber_id: Ulid) -> Vec<BlockInfo> {
        let Some(bs) = self.get_barber(&barber_id) else {
            return Vec::new();
        };
        let guard = bs.read().await;
        let mut blocks: Vec<BlockInfo> = guard
            .blocks
            .iter()
            .map(|b| BlockInfo {
                id: b.id,
                barber_id,
                day: b.day,
                start: b.start,
                end: b.end,
            })
            .collect();
        blocks.sort_by_key(|b| (b.day, b.start));
        blocks
    }

    pub fn list_services(&self) -> Vec<Service> {
        let mut services: Vec<Service> = self.services.iter().map(|e| e.value().clone()).collect();
        services.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        services
    }

    pub fn list_customers(&self) -> Vec<Customer> {
        let mut customers: Vec<Customer> =
            self.customers.iter().map(|e| e.value().clone()).collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        customers
    }

    pub fn find_customer_by_email(&self, email: &str) -> Option<Customer> {
        let id = *self.customer_emails.get(&email_key(email))?.value();
        self.customers.get(&id).map(|c| c.value().clone())
    }

    /// Appointments ordered by start time, optionally narrowed to one barber
    /// and/or one shop-local calendar day.
    pub async fn list_appointments(
        &self,
        barber_id: Option<Ulid>,
        date: Option<NaiveDate>,
    ) -> Vec<Appointment> {
        let barbers = match barber_id {
            Some(id) => self.get_barber(&id).into_iter().collect(),
            None => self.all_barbers(),
        };
        let day = date.map(|d| day_span(d, self.offset()));

        let mut out = Vec::new();
        for bs in barbers {
            let guard = bs.read().await;
            match &day {
                Some(day) => out.extend(guard.starting_within(day).cloned()),
                None => out.extend(guard.appointments.iter().cloned()),
            }
        }
        out.sort_by(|a, b| a.span.start.cmp(&b.span.start).then(a.id.cmp(&b.id)));
        out
    }

    pub async fn get_appointment(&self, id: Ulid) -> Option<Appointment> {
        let barber_id = self.get_barber_for_entity(&id)?;
        let bs = self.get_barber(&barber_id)?;
        let guard = bs.read().await;
        guard.appointments.iter().find(|a| a.id == id).cloned()
    }

    /// Free spans on `date` long enough for the service. An inactive barber
    /// has none.
    pub async fn open_slots(
        &self,
        barber_id: Ulid,
        service_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<Span>, EngineError> {
        let duration = self
            .services
            .get(&service_id)
            .map(|s| s.duration_ms())
            .ok_or(EngineError::NotFound("service", service_id))?;
        let bs = self
            .get_barber(&barber_id)
            .ok_or(EngineError::NotFound("barber", barber_id))?;
        let guard = bs.read().await;
        if !guard.active {
            return Ok(Vec::new());
        }
        let day = day_span(date, self.offset());
        Ok(open_slots(
            &guard.blocks,
            guard.starting_within(&day),
            date,
            self.offset(),
            duration,
        ))
    }

    /// Per-barber counts by status and revenue from completed appointments.
    pub async fn barber_stats(&self) -> Vec<BarberStats> {
        let mut out = Vec::with_capacity(self.barbers.len());
        for bs in self.all_barbers() {
            let guard = bs.read().await;
            let mut stats = BarberStats {
                barber_id: guard.id,
                name: guard.name.clone(),
                ..Default::default()
            };
            for appt in &guard.appointments {
                stats.total += 1;
                match appt.status {
                    AppointmentStatus::Pending => stats.pending += 1,
                    AppointmentStatus::Confirmed => stats.confirmed += 1,
                    AppointmentStatus::Cancelled => stats.cancelled += 1,
                    AppointmentStatus::Completed => {
                        stats.completed += 1;
                        stats.revenue_cents =
                            stats.revenue_cents.saturating_add(appt.price_cents);
                    }
                }
            }
            out.push(stats);
        }
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.barber_id.cmp(&b.barber_id)));
        out
    }

    /// Contact messages, newest first.
    pub fn list_contacts(&self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self.contacts.iter().map(|e| e.value().clone()).collect();
        contacts.sort_by(|a, b| b.received_at.cmp(&a.received_at).then(b.id.cmp(&a.id)));
        contacts
    }
}
