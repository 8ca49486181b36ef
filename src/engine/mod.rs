mod audit;
mod availability;
mod booking;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use availability::{is_within_availability, merge_overlapping, open_hours, open_slots, subtract_intervals};
pub use conflict::{find_conflict, has_conflict, intervals_clash};
pub use error::EngineError;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use ulid::Ulid;

use crate::limits::MAX_AUDIT_RECORDS;
use crate::model::*;
use crate::wal::Wal;

pub type SharedBarberState = Arc<RwLock<BarberState>>;

// ── Group-commit WAL channel ─────────────────────────────

pub(super) enum WalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Owns the shop's WAL. Appends that queue up while one is being written are
/// buffered together and made durable with a single fsync.
async fn wal_writer_loop(mut wal: Wal, mut rx: mpsc::Receiver<WalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];
                let mut pending: Option<WalCommand> = None;

                loop {
                    match rx.try_recv() {
                        Ok(WalCommand::Append { event, response }) => batch.push((event, response)),
                        Ok(other) => {
                            pending = Some(other);
                            break;
                        }
                        Err(_) => break,
                    }
                }

                commit_batch(&mut wal, &mut batch);
                if let Some(other) = pending {
                    handle_non_append(&mut wal, other);
                }
            }
            other => handle_non_append(&mut wal, other),
        }
    }
}

fn commit_batch(wal: &mut Wal, batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>) {
    metrics::histogram!(crate::observability::WAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
    let flush_start = std::time::Instant::now();

    let mut result = Ok(());
    for (event, _) in batch.iter() {
        if let Err(e) = wal.append_buffered(event) {
            result = Err(e);
            break;
        }
    }
    // Flush even after a failed append: buffered bytes must not spill into the next batch.
    let flushed = wal.flush_sync();
    let result = result.and(flushed);

    metrics::histogram!(crate::observability::WAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());

    for (_, tx) in batch.drain(..) {
        let r = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn handle_non_append(wal: &mut Wal, cmd: WalCommand) {
    match cmd {
        WalCommand::Compact { events, response } => {
            let result = Wal::write_compact_file(wal.path(), &events)
                .and_then(|()| wal.swap_compact_file());
            let _ = response.send(result);
        }
        WalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(wal.appends_since_compact());
        }
        WalCommand::Append { event, response } => {
            let mut batch = vec![(event, response)];
            commit_batch(wal, &mut batch);
        }
    }
}

/// One shop's state. Shop-wide collections live in `DashMap`s; everything
/// that the booking decision reads and writes for a barber lives behind that
/// barber's `RwLock`, which is held from the availability check until the
/// appointment is durable.
pub struct Engine {
    pub(super) barbers: DashMap<Ulid, SharedBarberState>,
    pub(super) services: DashMap<Ulid, Service>,
    pub(super) customers: DashMap<Ulid, Customer>,
    /// Lower-cased email → customer id.
    pub(super) customer_emails: DashMap<String, Ulid>,
    /// Serializes customer find-or-create so one email maps to one customer.
    pub(super) customer_lock: Mutex<()>,
    pub(super) contacts: DashMap<Ulid, Contact>,
    pub(super) audit_log: DashMap<Ulid, AuditRecord>,
    /// Reverse lookup: block/appointment id → barber id
    pub(super) entity_to_barber: DashMap<Ulid, Ulid>,
    /// Public mutations hold it shared for their whole duration; compaction
    /// holds it exclusively. Always taken before any barber lock.
    pub(super) commit_gate: RwLock<()>,
    pub(super) wal_tx: mpsc::Sender<WalCommand>,
    offset: FixedOffset,
}

/// Apply a barber-scoped event. The caller holds the barber lock.
fn apply_to_barber(bs: &mut BarberState, event: &Event, entity_map: &DashMap<Ulid, Ulid>) {
    match event {
        Event::BarberUpdated { name, bio, active, .. } => {
            bs.name = name.clone();
            bs.bio = bio.clone();
            bs.active = *active;
        }
        Event::BlockAdded { barber_id, block } => {
            bs.blocks.push(block.clone());
            entity_map.insert(block.id, *barber_id);
        }
        Event::BlockRemoved { id, .. } => {
            bs.blocks.retain(|b| b.id != *id);
            entity_map.remove(id);
        }
        Event::AppointmentBooked(appt) => {
            entity_map.insert(appt.id, appt.barber_id);
            bs.insert_appointment(appt.clone());
        }
        Event::AppointmentStatusChanged { id, status, entry, .. } => {
            if let Some(appt) = bs.appointment_mut(*id) {
                appt.status = *status;
                appt.log.push(entry.clone());
            }
        }
        // Shop-wide events are applied by Engine::apply_shop_event
        _ => {}
    }
}

/// The barber an event belongs to, for barber-scoped events.
fn event_barber_id(event: &Event) -> Option<Ulid> {
    match event {
        Event::BarberUpdated { id, .. } => Some(*id),
        Event::BlockAdded { barber_id, .. }
        | Event::BlockRemoved { barber_id, .. }
        | Event::AppointmentStatusChanged { barber_id, .. } => Some(*barber_id),
        Event::AppointmentBooked(appt) => Some(appt.barber_id),
        Event::BarberCreated { .. }
        | Event::BarberDeleted { .. }
        | Event::ServiceSaved(_)
        | Event::ServiceDeleted { .. }
        | Event::CustomerSaved(_)
        | Event::ContactReceived(_)
        | Event::ContactRead { .. }
        | Event::AuditRecorded(_) => None,
    }
}

impl Engine {
    pub fn new(wal_path: PathBuf, offset: FixedOffset) -> io::Result<Self> {
        let events = Wal::replay(&wal_path)?;
        let wal = Wal::open(&wal_path)?;
        let (wal_tx, wal_rx) = mpsc::channel(4096);
        tokio::spawn(wal_writer_loop(wal, wal_rx));

        let engine = Self {
            barbers: DashMap::new(),
            services: DashMap::new(),
            customers: DashMap::new(),
            customer_emails: DashMap::new(),
            customer_lock: Mutex::new(()),
            contacts: DashMap::new(),
            audit_log: DashMap::new(),
            entity_to_barber: DashMap::new(),
            commit_gate: RwLock::new(()),
            wal_tx,
            offset,
        };

        // Nothing else holds these locks yet; blocking_write would panic when
        // a shop is opened from inside the runtime.
        for event in &events {
            match event_barber_id(event) {
                Some(barber_id) => {
                    if let Some(bs) = engine.get_barber(&barber_id)
                        && let Ok(mut guard) = bs.try_write()
                    {
                        apply_to_barber(&mut guard, event, &engine.entity_to_barber);
                    }
                }
                None => engine.apply_shop_event(event),
            }
        }

        Ok(engine)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Apply a shop-wide event.
    fn apply_shop_event(&self, event: &Event) {
        match event {
            Event::BarberCreated { id, name, bio } => {
                let bs = BarberState::new(*id, name.clone(), bio.clone());
                self.barbers.insert(*id, Arc::new(RwLock::new(bs)));
            }
            Event::BarberDeleted { id } => {
                if let Some((_, bs)) = self.barbers.remove(id)
                    && let Ok(guard) = bs.try_read()
                {
                    self.unmap_barber_entities(&guard);
                }
            }
            Event::ServiceSaved(service) => {
                self.services.insert(service.id, service.clone());
            }
            Event::ServiceDeleted { id } => {
                self.services.remove(id);
            }
            Event::CustomerSaved(customer) => {
                self.customer_emails
                    .insert(email_key(&customer.email), customer.id);
                self.customers.insert(customer.id, customer.clone());
            }
            Event::ContactReceived(contact) => {
                self.contacts.insert(contact.id, contact.clone());
            }
            Event::ContactRead { id } => {
                if let Some(mut contact) = self.contacts.get_mut(id) {
                    contact.read = true;
                }
            }
            Event::AuditRecorded(record) => {
                self.audit_log.insert(record.id, record.clone());
                if self.audit_log.len() > 2 * MAX_AUDIT_RECORDS {
                    self.prune_audit(MAX_AUDIT_RECORDS);
                }
            }
            _ => {}
        }
    }

    /// Keep only the newest `keep` audit records.
    pub(super) fn prune_audit(&self, keep: usize) {
        if self.audit_log.len() <= keep {
            return;
        }
        let mut keys: Vec<(Ms, Ulid)> = self.audit_log.iter().map(|r| (r.at, r.id)).collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        for (_, id) in &keys[keep..] {
            self.audit_log.remove(id);
        }
    }

    pub(super) fn unmap_barber_entities(&self, bs: &BarberState) {
        for block in &bs.blocks {
            self.entity_to_barber.remove(&block.id);
        }
        for appt in &bs.appointments {
            self.entity_to_barber.remove(&appt.id);
        }
    }

    /// Write event to WAL via the background group-commit writer.
    pub(super) async fn wal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub fn get_barber(&self, id: &Ulid) -> Option<SharedBarberState> {
        self.barbers.get(id).map(|e| e.value().clone())
    }

    pub fn get_barber_for_entity(&self, entity_id: &Ulid) -> Option<Ulid> {
        self.entity_to_barber.get(entity_id).map(|e| *e.value())
    }

    /// WAL-append + apply for a barber-scoped event; caller holds the barber's write lock.
    pub(super) async fn persist_and_apply(
        &self,
        bs: &mut BarberState,
        event: &Event,
    ) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        apply_to_barber(bs, event, &self.entity_to_barber);
        Ok(())
    }

    /// WAL-append + apply for a shop-wide event.
    pub(super) async fn persist_shop_event(&self, event: &Event) -> Result<(), EngineError> {
        self.wal_append(event).await?;
        self.apply_shop_event(event);
        Ok(())
    }

    /// Lookup entity → barber, get barber, acquire write lock.
    pub(super) async fn resolve_entity_write(
        &self,
        kind: &'static str,
        entity_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<BarberState>), EngineError> {
        let barber_id = self
            .get_barber_for_entity(entity_id)
            .ok_or(EngineError::NotFound(kind, *entity_id))?;
        let bs = self
            .get_barber(&barber_id)
            .ok_or(EngineError::NotFound(kind, *entity_id))?;
        let guard = bs.write_owned().await;
        Ok((barber_id, guard))
    }
}

pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
