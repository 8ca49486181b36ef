use tokio::sync::oneshot;
use tracing::{info, warn};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::now_ms;
use super::{email_key, Engine, EngineError, WalCommand};

fn check_name(field: &'static str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::MissingFields(vec![field]));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("name too long"));
    }
    Ok(())
}

fn check_duration(duration_minutes: u32) -> Result<(), EngineError> {
    if duration_minutes == 0 || duration_minutes > MAX_SERVICE_DURATION_MINUTES {
        return Err(EngineError::InvalidField {
            field: "duration_minutes",
            reason: format!("must be between 1 and {MAX_SERVICE_DURATION_MINUTES}"),
        });
    }
    Ok(())
}

fn check_price(price_cents: i64) -> Result<(), EngineError> {
    if !(0..=MAX_PRICE_CENTS).contains(&price_cents) {
        return Err(EngineError::InvalidField {
            field: "price_cents",
            reason: format!("must be between 0 and {MAX_PRICE_CENTS}"),
        });
    }
    Ok(())
}

impl Engine {
    // ── Barbers ──────────────────────────────────────────────

    pub async fn create_barber(
        &self,
        id: Ulid,
        name: String,
        bio: Option<String>,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        check_name("name", &name)?;
        if bio.as_ref().is_some_and(|b| b.len() > MAX_NOTES_LEN) {
            return Err(EngineError::LimitExceeded("bio too long"));
        }
        if self.barbers.len() >= MAX_BARBERS_PER_SHOP {
            return Err(EngineError::LimitExceeded("too many barbers"));
        }
        if self.barbers.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let event = Event::BarberCreated { id, name: name.clone(), bio };
        self.persist_shop_event(&event).await?;
        self.audit("barber.created", Some(id), name).await;
        Ok(())
    }

    /// `None` leaves a field unchanged.
    pub async fn update_barber(
        &self,
        id: Ulid,
        name: Option<String>,
        bio: Option<String>,
        active: Option<bool>,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        if let Some(n) = &name {
            check_name("name", n)?;
        }
        let bs = self
            .get_barber(&id)
            .ok_or(EngineError::NotFound("barber", id))?;
        let mut guard = bs.write().await;

        let event = Event::BarberUpdated {
            id,
            name: name.unwrap_or_else(|| guard.name.clone()),
            bio: bio.or_else(|| guard.bio.clone()),
            active: active.unwrap_or(guard.active),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        drop(guard);
        self.audit("barber.updated", Some(id), String::new()).await;
        Ok(())
    }

    /// Barbers with pending or confirmed (or completed) appointments stay.
    pub async fn delete_barber(&self, id: Ulid) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        let bs = self
            .get_barber(&id)
            .ok_or(EngineError::NotFound("barber", id))?;
        let guard = bs.write().await;
        if guard.has_active_appointments() {
            return Err(EngineError::HasAppointments(id));
        }

        self.wal_append(&Event::BarberDeleted { id }).await?;
        // Unmapped while still locked, so a booking queued on this barber
        // sees it gone.
        self.unmap_barber_entities(&guard);
        self.barbers.remove(&id);
        drop(guard);
        self.audit("barber.deleted", Some(id), String::new()).await;
        Ok(())
    }

    // ── Availability blocks ──────────────────────────────────

    pub async fn add_block(
        &self,
        id: Ulid,
        barber_id: Ulid,
        day: DayOfWeek,
        start: ClockTime,
        end: ClockTime,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        if start >= end {
            return Err(EngineError::InvalidField {
                field: "end_time",
                reason: format!("{end} is not after {start}"),
            });
        }
        if self.entity_to_barber.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }
        let bs = self
            .get_barber(&barber_id)
            .ok_or(EngineError::NotFound("barber", barber_id))?;
        let mut guard = bs.write().await;
        if guard.blocks.len() >= MAX_BLOCKS_PER_BARBER {
            return Err(EngineError::LimitExceeded("too many availability blocks"));
        }

        let block = AvailabilityBlock { id, day, start, end };
        let event = Event::BlockAdded { barber_id, block };
        self.persist_and_apply(&mut guard, &event).await?;
        drop(guard);
        self.audit(
            "availability.added",
            Some(id),
            format!("{} {start}-{end}", day.as_str()),
        )
        .await;
        Ok(())
    }

    pub async fn remove_block(&self, id: Ulid) -> Result<Ulid, EngineError> {
        let _gate = self.commit_gate.read().await;
        let (barber_id, mut guard) = self.resolve_entity_write("availability block", &id).await?;
        if !guard.blocks.iter().any(|b| b.id == id) {
            return Err(EngineError::NotFound("availability block", id));
        }
        let event = Event::BlockRemoved { id, barber_id };
        self.persist_and_apply(&mut guard, &event).await?;
        drop(guard);
        self.audit("availability.removed", Some(id), String::new()).await;
        Ok(barber_id)
    }

    // ── Services ─────────────────────────────────────────────

    pub async fn create_service(
        &self,
        id: Ulid,
        name: String,
        duration_minutes: u32,
        price_cents: i64,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        check_name("name", &name)?;
        check_duration(duration_minutes)?;
        check_price(price_cents)?;
        if self.services.len() >= MAX_SERVICES_PER_SHOP {
            return Err(EngineError::LimitExceeded("too many services"));
        }
        if self.services.contains_key(&id) {
            return Err(EngineError::AlreadyExists(id));
        }

        let service = Service { id, name, duration_minutes, price_cents };
        let detail = format!("{} ({} min)", service.name, duration_minutes);
        self.persist_shop_event(&Event::ServiceSaved(service)).await?;
        self.audit("service.created", Some(id), detail).await;
        Ok(())
    }

    /// Changing a duration or price does not touch existing appointments:
    /// they keep the span and price they were booked with.
    pub async fn update_service(
        &self,
        id: Ulid,
        name: Option<String>,
        duration_minutes: Option<u32>,
        price_cents: Option<i64>,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        let mut service = self
            .services
            .get(&id)
            .map(|s| s.value().clone())
            .ok_or(EngineError::NotFound("service", id))?;
        if let Some(n) = name {
            check_name("name", &n)?;
            service.name = n;
        }
        if let Some(d) = duration_minutes {
            check_duration(d)?;
            service.duration_minutes = d;
        }
        if let Some(p) = price_cents {
            check_price(p)?;
            service.price_cents = p;
        }
        self.persist_shop_event(&Event::ServiceSaved(service)).await?;
        self.audit("service.updated", Some(id), String::new()).await;
        Ok(())
    }

    pub async fn delete_service(&self, id: Ulid) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        if !self.services.contains_key(&id) {
            return Err(EngineError::NotFound("service", id));
        }
        self.persist_shop_event(&Event::ServiceDeleted { id }).await?;
        self.audit("service.deleted", Some(id), String::new()).await;
        Ok(())
    }

    // ── Customers ────────────────────────────────────────────

    /// Look the customer up by email (case-insensitive); create them if
    /// absent, otherwise refresh name and phone. Opting in to an account is
    /// sticky.
    pub(super) async fn find_or_create_customer(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        create_account: bool,
    ) -> Result<Ulid, EngineError> {
        let _lock = self.customer_lock.lock().await;
        let existing = self
            .customer_emails
            .get(&email_key(email))
            .map(|e| *e.value())
            .and_then(|id| self.customers.get(&id).map(|c| c.value().clone()));

        let customer = match existing {
            Some(c) if c.name == name && c.phone == phone && (c.has_account || !create_account) => {
                return Ok(c.id);
            }
            Some(mut c) => {
                c.name = name.to_string();
                c.phone = phone.to_string();
                c.has_account |= create_account;
                c
            }
            None => Customer {
                id: Ulid::new(),
                name: name.to_string(),
                email: email.trim().to_string(),
                phone: phone.to_string(),
                loyalty_points: 0,
                has_account: create_account,
            },
        };
        let id = customer.id;
        self.persist_shop_event(&Event::CustomerSaved(customer)).await?;
        Ok(id)
    }

    pub async fn update_customer(
        &self,
        id: Ulid,
        name: Option<String>,
        phone: Option<String>,
        loyalty_points: Option<i64>,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        let customers = self.customer_lock.lock().await;
        let mut customer = self
            .customers
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or(EngineError::NotFound("customer", id))?;
        if let Some(n) = name {
            check_name("name", &n)?;
            customer.name = n;
        }
        if let Some(p) = phone {
            check_name("phone", &p)?;
            customer.phone = p;
        }
        if let Some(points) = loyalty_points {
            if !(0..=MAX_LOYALTY_POINTS).contains(&points) {
                return Err(EngineError::InvalidField {
                    field: "loyalty_points",
                    reason: format!("must be between 0 and {MAX_LOYALTY_POINTS}"),
                });
            }
            customer.loyalty_points = points;
        }
        self.persist_shop_event(&Event::CustomerSaved(customer)).await?;
        drop(customers);
        self.audit("customer.updated", Some(id), String::new()).await;
        Ok(())
    }

    async fn award_loyalty(&self, customer_id: Ulid, points: i64) -> Result<(), EngineError> {
        if points <= 0 {
            return Ok(());
        }
        let _lock = self.customer_lock.lock().await;
        let Some(mut customer) = self.customers.get(&customer_id).map(|c| c.value().clone()) else {
            return Ok(());
        };
        customer.loyalty_points = customer
            .loyalty_points
            .saturating_add(points)
            .min(MAX_LOYALTY_POINTS);
        self.persist_shop_event(&Event::CustomerSaved(customer)).await
    }

    // ── Appointments ─────────────────────────────────────────

    /// Move an appointment along its lifecycle and append a log entry.
    /// Setting the current status again is a no-op. Completing an appointment
    /// earns the customer one loyalty point per whole unit of the price.
    pub async fn update_appointment_status(
        &self,
        id: Ulid,
        status: AppointmentStatus,
    ) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        let (barber_id, mut guard) = self.resolve_entity_write("appointment", &id).await?;
        let (from, customer_id, price_cents) = guard
            .appointments
            .iter()
            .find(|a| a.id == id)
            .map(|a| (a.status, a.customer_id, a.price_cents))
            .ok_or(EngineError::NotFound("appointment", id))?;
        if from == status {
            return Ok(());
        }
        if !from.can_become(status) {
            return Err(EngineError::InvalidTransition { from, to: status });
        }

        let event = Event::AppointmentStatusChanged {
            id,
            barber_id,
            status,
            entry: LogEntry {
                at: now_ms(),
                message: format!("Status changed from {} to {}", from.as_str(), status.as_str()),
            },
        };
        self.persist_and_apply(&mut guard, &event).await?;
        drop(guard);
        info!(appointment_id = %id, status = status.as_str(), "appointment status changed");

        if status == AppointmentStatus::Completed
            && let Err(e) = self.award_loyalty(customer_id, price_cents / 100).await
        {
            warn!(appointment_id = %id, "loyalty points not awarded: {e}");
        }
        self.audit(
            "appointment.status",
            Some(id),
            format!("{} -> {}", from.as_str(), status.as_str()),
        )
        .await;
        Ok(())
    }

    // ── Messages ─────────────────────────────────────────────

    pub async fn receive_contact(
        &self,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        message: Option<String>,
    ) -> Result<Ulid, EngineError> {
        let _gate = self.commit_gate.read().await;
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (name, email, phone, message) = (clean(name), clean(email), clean(phone), clean(message));

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if email.is_none() {
            missing.push("email");
        }
        if message.is_none() {
            missing.push("message");
        }
        let (Some(name), Some(email), Some(message)) = (name, email, message) else {
            return Err(EngineError::MissingFields(missing));
        };
        if name.len() > MAX_NAME_LEN || email.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name too long"));
        }
        if message.len() > MAX_MESSAGE_LEN {
            return Err(EngineError::LimitExceeded("message too long"));
        }

        let contact = Contact {
            id: Ulid::new(),
            name,
            email,
            phone,
            message,
            received_at: now_ms(),
            read: false,
        };
        let id = contact.id;
        self.persist_shop_event(&Event::ContactReceived(contact)).await?;
        self.audit("contact.received", Some(id), String::new()).await;
        Ok(id)
    }

    pub async fn mark_contact_read(&self, id: Ulid) -> Result<(), EngineError> {
        let _gate = self.commit_gate.read().await;
        if !self.contacts.contains_key(&id) {
            return Err(EngineError::NotFound("contact", id));
        }
        self.persist_shop_event(&Event::ContactRead { id }).await
    }

    // ── WAL maintenance ──────────────────────────────────────

    /// Compact the WAL by rewriting it with only the events needed to recreate the current state.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        // No mutation is in flight while this is held, so the snapshot and the
        // swapped-in file describe the same history.
        let _gate = self.commit_gate.write().await;
        self.prune_audit(MAX_AUDIT_RECORDS);
        let mut events: Vec<Event> = Vec::new();

        events.extend(self.services.iter().map(|s| Event::ServiceSaved(s.value().clone())));
        events.extend(self.customers.iter().map(|c| Event::CustomerSaved(c.value().clone())));

        let barbers: Vec<_> = self.barbers.iter().map(|e| e.value().clone()).collect();
        for bs in barbers {
            let guard = bs.read().await;
            events.push(Event::BarberCreated {
                id: guard.id,
                name: guard.name.clone(),
                bio: guard.bio.clone(),
            });
            if !guard.active {
                events.push(Event::BarberUpdated {
                    id: guard.id,
                    name: guard.name.clone(),
                    bio: guard.bio.clone(),
                    active: false,
                });
            }
            for block in &guard.blocks {
                events.push(Event::BlockAdded { barber_id: guard.id, block: block.clone() });
            }
            for appt in &guard.appointments {
                events.push(Event::AppointmentBooked(appt.clone()));
            }
        }

        events.extend(self.contacts.iter().map(|c| Event::ContactReceived(c.value().clone())));
        events.extend(self.audit_log.iter().map(|r| Event::AuditRecorded(r.value().clone())));

        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
