use std::net::SocketAddr;

use crate::sql::Command;

// ── Request metrics ─────────────────────────────────────────────

/// Counter: total queries executed. Labels: command, status.
pub const QUERIES_TOTAL: &str = "salond_queries_total";

/// Histogram: query latency in seconds. Labels: command.
pub const QUERY_DURATION_SECONDS: &str = "salond_query_duration_seconds";

/// Counter: booking decisions. Labels: outcome (accepted, invalid, not_found,
/// outside_availability, conflict, error).
pub const BOOKINGS_TOTAL: &str = "salond_bookings_total";

/// Counter: audit records that could not be written.
pub const AUDIT_FAILURES_TOTAL: &str = "salond_audit_failures_total";

// ── Server metrics ──────────────────────────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "salond_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "salond_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "salond_connections_rejected_total";

/// Gauge: shops with a loaded engine.
pub const SHOPS_ACTIVE: &str = "salond_shops_active";

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "salond_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "salond_wal_flush_batch_size";

/// Counter: WAL compactions. Labels: status.
pub const WAL_COMPACTIONS_TOTAL: &str = "salond_wal_compactions_total";

/// Install the Prometheus exporter on `bind:port`. No-op if port is None.
pub fn init(bind: &str, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://{addr}/metrics");
    Ok(())
}

/// Short metrics label for a command.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::InsertBarber { .. } => "insert_barber",
        Command::UpdateBarber { .. } => "update_barber",
        Command::DeleteBarber { .. } => "delete_barber",
        Command::InsertBlock { .. } => "insert_availability",
        Command::DeleteBlock { .. } => "delete_availability",
        Command::InsertService { .. } => "insert_service",
        Command::UpdateService { .. } => "update_service",
        Command::DeleteService { .. } => "delete_service",
        Command::BookAppointment(_) => "book_appointment",
        Command::UpdateAppointmentStatus { .. } => "update_appointment_status",
        Command::UpdateCustomer { .. } => "update_customer",
        Command::InsertContact { .. } => "insert_contact",
        Command::MarkContactRead { .. } => "mark_contact_read",
        Command::SelectBarbers => "select_barbers",
        Command::SelectAvailability { .. } => "select_availability",
        Command::SelectServices => "select_services",
        Command::SelectCustomers { .. } => "select_customers",
        Command::SelectAppointments { .. } => "select_appointments",
        Command::SelectOpenSlots { .. } => "select_open_slots",
        Command::SelectBarberStats => "select_barber_stats",
        Command::SelectContacts => "select_contacts",
        Command::SelectAuditLog => "select_audit_log",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_snake_case() {
        for cmd in [
            Command::SelectBarbers,
            Command::SelectBarberStats,
            Command::BookAppointment(Default::default()),
            Command::SelectCustomers { email: None },
        ] {
            let label = command_label(&cmd);
            assert!(label.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{label}");
        }
    }

    #[test]
    fn init_without_port_is_noop() {
        assert!(init("127.0.0.1", None).is_ok());
    }
}
