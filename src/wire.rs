use std::fmt::Debug;
use std::io;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::FixedOffset;
use futures::stream;
use futures::Sink;
use pgwire::api::auth::cleartext::CleartextPasswordAuthStartupHandler;
use pgwire::api::auth::{DefaultServerParameterProvider, StartupHandler};
use pgwire::api::copy::CopyHandler;
use pgwire::api::portal::{Format, Portal};
use pgwire::api::query::{ExtendedQueryHandler, SimpleQueryHandler};
use pgwire::api::results::{
    DataRowEncoder, DescribePortalResponse, DescribeStatementResponse, FieldInfo, QueryResponse,
    Response, Tag,
};
use pgwire::api::stmt::{QueryParser, StoredStatement};
use pgwire::api::store::PortalStore;
use pgwire::api::{ClientInfo, ClientPortalStore, NoopHandler, PgWireServerHandlers, Type};
use pgwire::error::{ErrorInfo, PgWireError, PgWireResult};
use pgwire::messages::PgWireBackendMessage;
use pgwire::tokio::TlsAcceptor;
use tokio::net::TcpStream;
use tracing::error;
use ulid::Ulid;

use crate::auth::SalonAuthSource;
use crate::engine::{Engine, EngineError};
use crate::model::*;
use crate::observability::{command_label, QUERIES_TOTAL, QUERY_DURATION_SECONDS};
use crate::shop::ShopManager;
use crate::sql::{self, Command, Relation, SqlError};

pub struct SalonHandler {
    shops: Arc<ShopManager>,
    query_parser: Arc<SalonQueryParser>,
}

impl SalonHandler {
    pub fn new(shops: Arc<ShopManager>) -> Self {
        Self {
            shops,
            query_parser: Arc::new(SalonQueryParser),
        }
    }

    /// The shop is the database name of the connection.
    fn resolve_engine<C: ClientInfo>(&self, client: &C) -> PgWireResult<Arc<Engine>> {
        let db = client
            .metadata()
            .get("database")
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        self.shops.get_or_create(&db).map_err(|e| {
            user_error("08006", format!("shop {db} unavailable: {e}"))
        })
    }

    async fn run(&self, engine: &Engine, cmd: Command, format: &Format) -> PgWireResult<Response> {
        let label = command_label(&cmd);
        let started = Instant::now();
        let result = self.execute_command(engine, cmd, format).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(QUERIES_TOTAL, "command" => label, "status" => status).increment(1);
        metrics::histogram!(QUERY_DURATION_SECONDS, "command" => label)
            .record(started.elapsed().as_secs_f64());
        result
    }

    async fn execute_command(
        &self,
        engine: &Engine,
        cmd: Command,
        format: &Format,
    ) -> PgWireResult<Response> {
        let relation = cmd.relation();
        let offset = engine.offset();
        match cmd {
            Command::InsertBarber { id, name, bio } => {
                engine.create_barber(id, name, bio).await.map_err(engine_err)?;
                Ok(inserted(id, format))
            }
            Command::UpdateBarber { id, name, bio, active } => {
                engine
                    .update_barber(id, name, bio, active)
                    .await
                    .map_err(engine_err)?;
                Ok(executed("UPDATE"))
            }
            Command::DeleteBarber { id } => {
                engine.delete_barber(id).await.map_err(engine_err)?;
                Ok(executed("DELETE"))
            }
            Command::InsertBlock { id, barber_id, day, start, end } => {
                engine
                    .add_block(id, barber_id, day, start, end)
                    .await
                    .map_err(engine_err)?;
                Ok(inserted(id, format))
            }
            Command::DeleteBlock { id } => {
                engine.remove_block(id).await.map_err(engine_err)?;
                Ok(executed("DELETE"))
            }
            Command::InsertService { id, name, duration_minutes, price_cents } => {
                engine
                    .create_service(id, name, duration_minutes, price_cents)
                    .await
                    .map_err(engine_err)?;
                Ok(inserted(id, format))
            }
            Command::UpdateService { id, name, duration_minutes, price_cents } => {
                engine
                    .update_service(id, name, duration_minutes, price_cents)
                    .await
                    .map_err(engine_err)?;
                Ok(executed("UPDATE"))
            }
            Command::DeleteService { id } => {
                engine.delete_service(id).await.map_err(engine_err)?;
                Ok(executed("DELETE"))
            }
            Command::BookAppointment(req) => {
                let id = engine.book_appointment(req).await.map_err(engine_err)?;
                Ok(inserted(id, format))
            }
            Command::UpdateAppointmentStatus { id, status } => {
                engine
                    .update_appointment_status(id, status)
                    .await
                    .map_err(engine_err)?;
                Ok(executed("UPDATE"))
            }
            Command::UpdateCustomer { id, name, phone, loyalty_points } => {
                engine
                    .update_customer(id, name, phone, loyalty_points)
                    .await
                    .map_err(engine_err)?;
                Ok(executed("UPDATE"))
            }
            Command::InsertContact { name, email, phone, message } => {
                let id = engine
                    .receive_contact(name, email, phone, message)
                    .await
                    .map_err(engine_err)?;
                Ok(inserted(id, format))
            }
            Command::MarkContactRead { id } => {
                engine.mark_contact_read(id).await.map_err(engine_err)?;
                Ok(executed("UPDATE"))
            }
            Command::SelectBarbers => {
                let barbers = engine.list_barbers().await;
                rows(relation, format, barbers, |enc, b| {
                    enc.encode_field(&b.id.to_string())?;
                    enc.encode_field(&b.name)?;
                    enc.encode_field(&b.bio)?;
                    enc.encode_field(&b.active)
                })
            }
            Command::SelectAvailability { barber_id } => {
                let blocks = engine.get_blocks(barber_id).await;
                rows(relation, format, blocks, |enc, b| {
                    enc.encode_field(&b.id.to_string())?;
                    enc.encode_field(&b.barber_id.to_string())?;
                    enc.encode_field(&b.day.as_str())?;
                    enc.encode_field(&b.start.to_string())?;
                    enc.encode_field(&b.end.to_string())
                })
            }
            Command::SelectServices => {
                rows(relation, format, engine.list_services(), |enc, s| {
                    enc.encode_field(&s.id.to_string())?;
                    enc.encode_field(&s.name)?;
                    enc.encode_field(&(s.duration_minutes as i64))?;
                    enc.encode_field(&s.price_cents)
                })
            }
            Command::SelectCustomers { email } => {
                let customers = match email {
                    Some(email) => engine.find_customer_by_email(&email).into_iter().collect(),
                    None => engine.list_customers(),
                };
                rows(relation, format, customers, |enc, c| {
                    enc.encode_field(&c.id.to_string())?;
                    enc.encode_field(&c.name)?;
                    enc.encode_field(&c.email)?;
                    enc.encode_field(&c.phone)?;
                    enc.encode_field(&c.loyalty_points)?;
                    enc.encode_field(&c.has_account)
                })
            }
            Command::SelectAppointments { barber_id, date } => {
                let appointments = engine.list_appointments(barber_id, date).await;
                rows(relation, format, appointments, |enc, a| {
                    enc.encode_field(&a.id.to_string())?;
                    enc.encode_field(&a.customer_id.to_string())?;
                    enc.encode_field(&a.barber_id.to_string())?;
                    enc.encode_field(&a.service_id.to_string())?;
                    enc.encode_field(&format_instant(a.span.start, offset))?;
                    enc.encode_field(&format_instant(a.span.end, offset))?;
                    enc.encode_field(&a.status.as_str())?;
                    enc.encode_field(&a.price_cents)?;
                    enc.encode_field(&a.notes)?;
                    enc.encode_field(&log_json(&a.log, offset))
                })
            }
            Command::SelectOpenSlots { barber_id, service_id, date } => {
                let slots = engine
                    .open_slots(barber_id, service_id, date)
                    .await
                    .map_err(engine_err)?;
                let barber = barber_id.to_string();
                rows(relation, format, slots, |enc, s| {
                    enc.encode_field(&barber)?;
                    enc.encode_field(&format_instant(s.start, offset))?;
                    enc.encode_field(&format_instant(s.end, offset))
                })
            }
            Command::SelectBarberStats => {
                let stats = engine.barber_stats().await;
                rows(relation, format, stats, |enc, s| {
                    enc.encode_field(&s.barber_id.to_string())?;
                    enc.encode_field(&s.name)?;
                    enc.encode_field(&(s.total as i64))?;
                    enc.encode_field(&(s.pending as i64))?;
                    enc.encode_field(&(s.confirmed as i64))?;
                    enc.encode_field(&(s.completed as i64))?;
                    enc.encode_field(&(s.cancelled as i64))?;
                    enc.encode_field(&s.revenue_cents)
                })
            }
            Command::SelectContacts => {
                rows(relation, format, engine.list_contacts(), |enc, c| {
                    enc.encode_field(&c.id.to_string())?;
                    enc.encode_field(&c.name)?;
                    enc.encode_field(&c.email)?;
                    enc.encode_field(&c.phone)?;
                    enc.encode_field(&c.message)?;
                    enc.encode_field(&format_instant(c.received_at, offset))?;
                    enc.encode_field(&c.read)
                })
            }
            Command::SelectAuditLog => {
                rows(relation, format, engine.list_audit(), |enc, r| {
                    enc.encode_field(&r.id.to_string())?;
                    enc.encode_field(&format_instant(r.at, offset))?;
                    enc.encode_field(&r.action)?;
                    enc.encode_field(&r.entity_id.map(|id| id.to_string()))?;
                    enc.encode_field(&r.detail)
                })
            }
        }
    }
}

// ── Result sets ──────────────────────────────────────────────────

fn columns(relation: Relation) -> Vec<(&'static str, Type)> {
    match relation {
        Relation::Empty => vec![],
        Relation::InsertedId => vec![("id", Type::VARCHAR)],
        Relation::Barbers => vec![
            ("id", Type::VARCHAR),
            ("name", Type::VARCHAR),
            ("bio", Type::VARCHAR),
            ("active", Type::BOOL),
        ],
        Relation::Availability => vec![
            ("id", Type::VARCHAR),
            ("barber_id", Type::VARCHAR),
            ("day_of_week", Type::VARCHAR),
            ("start_time", Type::VARCHAR),
            ("end_time", Type::VARCHAR),
        ],
        Relation::Services => vec![
            ("id", Type::VARCHAR),
            ("name", Type::VARCHAR),
            ("duration_minutes", Type::INT8),
            ("price_cents", Type::INT8),
        ],
        Relation::Customers => vec![
            ("id", Type::VARCHAR),
            ("name", Type::VARCHAR),
            ("email", Type::VARCHAR),
            ("phone", Type::VARCHAR),
            ("loyalty_points", Type::INT8),
            ("has_account", Type::BOOL),
        ],
        Relation::Appointments => vec![
            ("id", Type::VARCHAR),
            ("customer_id", Type::VARCHAR),
            ("barber_id", Type::VARCHAR),
            ("service_id", Type::VARCHAR),
            ("date_time", Type::VARCHAR),
            ("end_time", Type::VARCHAR),
            ("status", Type::VARCHAR),
            ("price_cents", Type::INT8),
            ("notes", Type::VARCHAR),
            ("log", Type::VARCHAR),
        ],
        Relation::OpenSlots => vec![
            ("barber_id", Type::VARCHAR),
            ("start_time", Type::VARCHAR),
            ("end_time", Type::VARCHAR),
        ],
        Relation::BarberStats => vec![
            ("barber_id", Type::VARCHAR),
            ("name", Type::VARCHAR),
            ("total", Type::INT8),
            ("pending", Type::INT8),
            ("confirmed", Type::INT8),
            ("completed", Type::INT8),
            ("cancelled", Type::INT8),
            ("revenue_cents", Type::INT8),
        ],
        Relation::Contacts => vec![
            ("id", Type::VARCHAR),
            ("name", Type::VARCHAR),
            ("email", Type::VARCHAR),
            ("phone", Type::VARCHAR),
            ("message", Type::VARCHAR),
            ("received_at", Type::VARCHAR),
            ("is_read", Type::BOOL),
        ],
        Relation::AuditLog => vec![
            ("id", Type::VARCHAR),
            ("at", Type::VARCHAR),
            ("action", Type::VARCHAR),
            ("entity_id", Type::VARCHAR),
            ("detail", Type::VARCHAR),
        ],
    }
}

/// Field descriptions honouring the client's requested result formats.
fn schema(relation: Relation, format: &Format) -> Vec<FieldInfo> {
    columns(relation)
        .into_iter()
        .enumerate()
        .map(|(idx, (name, ty))| FieldInfo::new(name.into(), None, None, ty, format.format_for(idx)))
        .collect()
}

fn rows<T>(
    relation: Relation,
    format: &Format,
    items: Vec<T>,
    encode: impl Fn(&mut DataRowEncoder, T) -> PgWireResult<()>,
) -> PgWireResult<Response> {
    let schema = Arc::new(schema(relation, format));
    let rows: Vec<PgWireResult<_>> = items
        .into_iter()
        .map(|item| {
            let mut encoder = DataRowEncoder::new(schema.clone());
            encode(&mut encoder, item)?;
            Ok(encoder.take_row())
        })
        .collect();
    Ok(Response::Query(QueryResponse::new(schema, stream::iter(rows))))
}

fn inserted(id: Ulid, format: &Format) -> Response {
    let schema = Arc::new(schema(Relation::InsertedId, format));
    let mut encoder = DataRowEncoder::new(schema.clone());
    let row = encoder
        .encode_field(&id.to_string())
        .map(|()| encoder.take_row());
    Response::Query(QueryResponse::new(schema, stream::iter(vec![row])))
}

fn executed(tag: &str) -> Response {
    Response::Execution(Tag::new(tag).with_rows(1))
}

fn log_json(log: &[LogEntry], offset: FixedOffset) -> String {
    let entries: Vec<serde_json::Value> = log
        .iter()
        .map(|e| serde_json::json!({ "at": format_instant(e.at, offset), "message": e.message }))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

// ── Simple Query Protocol ────────────────────────────────────────

#[async_trait]
impl SimpleQueryHandler for SalonHandler {
    async fn do_query<C>(
        &self,
        client: &mut C,
        query: &str,
    ) -> PgWireResult<Vec<Response>>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let engine = self.resolve_engine(client)?;
        let cmd = sql::parse_sql(query).map_err(sql_err)?;
        let response = self.run(&engine, cmd, &Format::UnifiedText).await?;
        Ok(vec![response])
    }
}

// ── Extended Query Protocol ──────────────────────────────────────

#[derive(Debug)]
pub struct SalonQueryParser;

#[async_trait]
impl QueryParser for SalonQueryParser {
    type Statement = String;

    async fn parse_sql<C>(
        &self,
        _client: &C,
        sql: &str,
        _types: &[Option<Type>],
    ) -> PgWireResult<String>
    where
        C: ClientInfo + Unpin + Send + Sync,
    {
        Ok(sql.to_string())
    }

    fn get_parameter_types(&self, stmt: &String) -> PgWireResult<Vec<Type>> {
        Ok(vec![Type::VARCHAR; count_params(stmt)])
    }

    fn get_result_schema(
        &self,
        stmt: &String,
        column_format: Option<&Format>,
    ) -> PgWireResult<Vec<FieldInfo>> {
        let relation = sql::describe(stmt).map_err(sql_err)?;
        Ok(schema(relation, column_format.unwrap_or(&Format::UnifiedText)))
    }
}

#[async_trait]
impl ExtendedQueryHandler for SalonHandler {
    type Statement = String;
    type QueryParser = SalonQueryParser;

    fn query_parser(&self) -> Arc<Self::QueryParser> {
        self.query_parser.clone()
    }

    async fn do_query<C>(
        &self,
        client: &mut C,
        portal: &Portal<Self::Statement>,
        _max_rows: usize,
    ) -> PgWireResult<Response>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let engine = self.resolve_engine(client)?;
        let sql = bind_params(&portal.statement.statement, &portal.parameters);
        let cmd = sql::parse_sql(&sql).map_err(sql_err)?;
        self.run(&engine, cmd, &portal.result_column_format).await
    }

    async fn do_describe_statement<C>(
        &self,
        _client: &mut C,
        target: &StoredStatement<Self::Statement>,
    ) -> PgWireResult<DescribeStatementResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let param_types = vec![Type::VARCHAR; count_params(&target.statement)];
        let relation = sql::describe(&target.statement).map_err(sql_err)?;
        Ok(DescribeStatementResponse::new(
            param_types,
            schema(relation, &Format::UnifiedText),
        ))
    }

    async fn do_describe_portal<C>(
        &self,
        _client: &mut C,
        target: &Portal<Self::Statement>,
    ) -> PgWireResult<DescribePortalResponse>
    where
        C: ClientInfo + ClientPortalStore + Sink<PgWireBackendMessage> + Unpin + Send + Sync,
        C::PortalStore: PortalStore<Statement = Self::Statement>,
        C::Error: Debug,
        PgWireError: From<C::Error>,
    {
        let relation = sql::describe(&target.statement.statement).map_err(sql_err)?;
        Ok(DescribePortalResponse::new(schema(
            relation,
            &target.result_column_format,
        )))
    }
}

/// `$N` placeholders outside single-quoted literals: byte range and N.
fn placeholders(sql: &str) -> Vec<(Range<usize>, usize)> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut quoted = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            // A doubled quote inside a literal toggles twice and stays quoted.
            b'\'' => {
                quoted = !quoted;
                i += 1;
            }
            b'$' if !quoted => {
                let start = i;
                i += 1;
                let digits = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i > digits
                    && let Ok(n) = sql[digits..i].parse::<usize>()
                {
                    out.push((start..i, n));
                }
            }
            _ => i += 1,
        }
    }
    out
}

fn count_params(sql: &str) -> usize {
    placeholders(sql).iter().map(|(_, n)| *n).max().unwrap_or(0)
}

/// Inline bound text parameters as quoted literals; unbound or NULL become NULL.
fn bind_params<B: AsRef<[u8]>>(sql: &str, params: &[Option<B>]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for (range, n) in placeholders(sql) {
        out.push_str(&sql[last..range.start]);
        match n.checked_sub(1).and_then(|i| params.get(i)) {
            Some(Some(bytes)) => {
                let text = String::from_utf8_lossy(bytes.as_ref());
                out.push('\'');
                out.push_str(&text.replace('\'', "''"));
                out.push('\'');
            }
            _ => out.push_str("NULL"),
        }
        last = range.end;
    }
    out.push_str(&sql[last..]);
    out
}

// ── Factory ──────────────────────────────────────────────────────

pub struct SalonFactory {
    handler: Arc<SalonHandler>,
    auth_handler:
        Arc<CleartextPasswordAuthStartupHandler<SalonAuthSource, DefaultServerParameterProvider>>,
    noop: Arc<NoopHandler>,
}

impl SalonFactory {
    pub fn new(shops: Arc<ShopManager>, password: String) -> Self {
        let auth_source = SalonAuthSource::new(password);
        let param_provider = DefaultServerParameterProvider::default();
        Self {
            handler: Arc::new(SalonHandler::new(shops)),
            auth_handler: Arc::new(CleartextPasswordAuthStartupHandler::new(
                auth_source,
                param_provider,
            )),
            noop: Arc::new(NoopHandler),
        }
    }
}

impl PgWireServerHandlers for SalonFactory {
    fn simple_query_handler(&self) -> Arc<impl SimpleQueryHandler> {
        self.handler.clone()
    }

    fn extended_query_handler(&self) -> Arc<impl ExtendedQueryHandler> {
        self.handler.clone()
    }

    fn startup_handler(&self) -> Arc<impl StartupHandler> {
        self.auth_handler.clone()
    }

    fn copy_handler(&self) -> Arc<impl CopyHandler> {
        self.noop.clone()
    }
}

/// Serve one client connection until it closes.
pub async fn process_connection(
    socket: TcpStream,
    shops: Arc<ShopManager>,
    password: String,
    tls: Option<TlsAcceptor>,
) -> io::Result<()> {
    let factory = Arc::new(SalonFactory::new(shops, password));
    pgwire::tokio::process_socket(socket, tls, factory).await
}

// ── Errors ───────────────────────────────────────────────────────

fn user_error(code: &str, message: String) -> PgWireError {
    PgWireError::UserError(Box::new(ErrorInfo::new(
        "ERROR".into(),
        code.into(),
        message,
    )))
}

fn engine_sqlstate(e: &EngineError) -> &'static str {
    match e {
        EngineError::MissingFields(_) | EngineError::InvalidField { .. } => "23502",
        EngineError::NotFound(..) => "P0002",
        EngineError::AlreadyExists(_) => "23505",
        EngineError::OutsideAvailability { .. } => "23514",
        EngineError::SlotConflict(_) => "23P01",
        EngineError::InvalidTransition { .. } | EngineError::HasAppointments(_) => "55000",
        EngineError::LimitExceeded(_) => "54000",
        EngineError::WalError(_) => "XX000",
    }
}

fn engine_err(e: EngineError) -> PgWireError {
    if let EngineError::WalError(detail) = &e {
        error!("store failure: {detail}");
        return user_error(engine_sqlstate(&e), "internal storage error".into());
    }
    user_error(engine_sqlstate(&e), e.to_string())
}

fn sql_err(e: SqlError) -> PgWireError {
    user_error(e.sqlstate(), e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_highest_placeholder() {
        assert_eq!(count_params("SELECT * FROM barbers"), 0);
        assert_eq!(count_params("UPDATE barbers SET name = $2 WHERE id = $1"), 2);
        assert_eq!(count_params("SELECT '$5' FROM x WHERE a = $1"), 1);
    }

    #[test]
    fn binds_parameters_as_quoted_text() {
        let params = vec![Some(b"O'Neil".to_vec()), None];
        assert_eq!(
            bind_params("INSERT INTO barbers (name, bio) VALUES ($1, $2)", &params),
            "INSERT INTO barbers (name, bio) VALUES ('O''Neil', NULL)"
        );
    }

    #[test]
    fn two_digit_placeholders_not_clobbered() {
        let params: Vec<Option<Vec<u8>>> = (1..=10).map(|i| Some(i.to_string().into_bytes())).collect();
        let sql = bind_params("VALUES ($1, $10)", &params);
        assert_eq!(sql, "VALUES ('1', '10')");
    }

    #[test]
    fn placeholders_inside_literals_left_alone() {
        let params = vec![Some(b"x".to_vec())];
        assert_eq!(
            bind_params("SELECT '$1 it''s' , $1", &params),
            "SELECT '$1 it''s' , 'x'"
        );
    }

    #[test]
    fn booking_rejections_have_distinct_codes() {
        let codes = [
            engine_sqlstate(&EngineError::MissingFields(vec!["barber_id"])),
            engine_sqlstate(&EngineError::NotFound("service", Ulid::new())),
            engine_sqlstate(&EngineError::OutsideAvailability {
                barber_id: Ulid::new(),
                requested: Span::new(0, 1),
                offset: chrono::FixedOffset::east_opt(0).unwrap(),
            }),
            engine_sqlstate(&EngineError::SlotConflict(Ulid::new())),
            engine_sqlstate(&EngineError::WalError("disk".into())),
        ];
        assert_eq!(codes, ["23502", "P0002", "23514", "23P01", "XX000"]);
    }

    #[test]
    fn schemas_follow_requested_format() {
        let text = schema(Relation::Services, &Format::UnifiedText);
        assert_eq!(text.len(), 4);
        assert_eq!(text[2].name(), "duration_minutes");
        assert!(schema(Relation::Empty, &Format::UnifiedText).is_empty());
    }

    #[test]
    fn log_is_json_array() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let log = vec![LogEntry { at: 0, message: "Appointment created for Haircut".into() }];
        let parsed: serde_json::Value = serde_json::from_str(&log_json(&log, utc)).unwrap();
        assert_eq!(parsed[0]["message"], "Appointment created for Haircut");
        assert_eq!(parsed[0]["at"], "1970-01-01T00:00:00+00:00");
    }
}
