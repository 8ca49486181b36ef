use tracing::warn;
use ulid::Ulid;

use crate::model::*;
use crate::observability::AUDIT_FAILURES_TOTAL;

use super::conflict::now_ms;
use super::Engine;

impl Engine {
    /// Best-effort audit record. Never fails the caller: a write error is
    /// logged and counted, and the operation that triggered it stands.
    pub(super) async fn audit(&self, action: &str, entity_id: Option<Ulid>, detail: String) {
        let event = Event::AuditRecorded(AuditRecord {
            id: Ulid::new(),
            at: now_ms(),
            action: action.to_string(),
            entity_id,
            detail,
        });
        if let Err(e) = self.persist_shop_event(&event).await {
            warn!(action, "audit record dropped: {e}");
            metrics::counter!(AUDIT_FAILURES_TOTAL).increment(1);
        }
    }

    /// Audit records, newest first.
    pub fn list_audit(&self) -> Vec<AuditRecord> {
        let mut records: Vec<AuditRecord> =
            self.audit_log.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| b.at.cmp(&a.at).then(b.id.cmp(&a.id)));
        records
    }
}
