use std::collections::HashMap;

use chrono::NaiveDate;
use sqlparser::ast::{
    self, AssignmentTarget, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor,
    TableObject, Value, ValueWithSpan,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use ulid::Ulid;

use crate::model::*;

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    InsertBarber {
        id: Ulid,
        name: String,
        bio: Option<String>,
    },
    UpdateBarber {
        id: Ulid,
        name: Option<String>,
        bio: Option<String>,
        active: Option<bool>,
    },
    DeleteBarber {
        id: Ulid,
    },
    InsertBlock {
        id: Ulid,
        barber_id: Ulid,
        day: DayOfWeek,
        start: ClockTime,
        end: ClockTime,
    },
    DeleteBlock {
        id: Ulid,
    },
    InsertService {
        id: Ulid,
        name: String,
        duration_minutes: u32,
        price_cents: i64,
    },
    UpdateService {
        id: Ulid,
        name: Option<String>,
        duration_minutes: Option<u32>,
        price_cents: Option<i64>,
    },
    DeleteService {
        id: Ulid,
    },
    /// The booking form. Presence is left to the engine.
    BookAppointment(BookingRequest),
    UpdateAppointmentStatus {
        id: Ulid,
        status: AppointmentStatus,
    },
    UpdateCustomer {
        id: Ulid,
        name: Option<String>,
        phone: Option<String>,
        loyalty_points: Option<i64>,
    },
    InsertContact {
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        message: Option<String>,
    },
    MarkContactRead {
        id: Ulid,
    },
    SelectBarbers,
    SelectAvailability {
        barber_id: Ulid,
    },
    SelectServices,
    SelectCustomers {
        email: Option<String>,
    },
    SelectAppointments {
        barber_id: Option<Ulid>,
        date: Option<NaiveDate>,
    },
    SelectOpenSlots {
        barber_id: Ulid,
        service_id: Ulid,
        date: NaiveDate,
    },
    SelectBarberStats,
    SelectContacts,
    SelectAuditLog,
}

/// The shape of the rows a statement answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Command tag only.
    Empty,
    /// One row holding the id of the inserted entity.
    InsertedId,
    Barbers,
    Availability,
    Services,
    Customers,
    Appointments,
    OpenSlots,
    BarberStats,
    Contacts,
    AuditLog,
}

impl Command {
    pub fn relation(&self) -> Relation {
        match self {
            Command::InsertBarber { .. }
            | Command::InsertBlock { .. }
            | Command::InsertService { .. }
            | Command::BookAppointment(_)
            | Command::InsertContact { .. } => Relation::InsertedId,
            Command::SelectBarbers => Relation::Barbers,
            Command::SelectAvailability { .. } => Relation::Availability,
            Command::SelectServices => Relation::Services,
            Command::SelectCustomers { .. } => Relation::Customers,
            Command::SelectAppointments { .. } => Relation::Appointments,
            Command::SelectOpenSlots { .. } => Relation::OpenSlots,
            Command::SelectBarberStats => Relation::BarberStats,
            Command::SelectContacts => Relation::Contacts,
            Command::SelectAuditLog => Relation::AuditLog,
            _ => Relation::Empty,
        }
    }
}

fn select_relation(table: &str) -> Option<Relation> {
    Some(match table {
        "barbers" => Relation::Barbers,
        "availability" => Relation::Availability,
        "services" => Relation::Services,
        "customers" => Relation::Customers,
        "appointments" => Relation::Appointments,
        "open_slots" => Relation::OpenSlots,
        "barber_stats" => Relation::BarberStats,
        "contacts" => Relation::Contacts,
        "audit_log" => Relation::AuditLog,
        _ => return None,
    })
}

fn parse_statement(sql: &str) -> Result<Statement, SqlError> {
    let dialect = PostgreSqlDialect {};
    let mut stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    match stmts.len() {
        0 => Err(SqlError::Empty),
        1 => Ok(stmts.remove(0)),
        n => Err(SqlError::Unsupported(format!("{n} statements in one query"))),
    }
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    match parse_statement(sql)? {
        Statement::Insert(insert) => parse_insert(&insert),
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => parse_update(&table, &assignments, &selection),
        Statement::Delete(delete) => parse_delete(&delete),
        Statement::Query(query) => parse_select(&query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

/// Row shape of a statement without binding its parameters, for Describe.
pub fn describe(sql: &str) -> Result<Relation, SqlError> {
    match parse_statement(sql)? {
        Statement::Insert(insert) => {
            let table = insert_table_name(&insert)?;
            match table.as_str() {
                "barbers" | "availability" | "services" | "appointments" | "contacts" => {
                    Ok(Relation::InsertedId)
                }
                _ => Err(SqlError::UnknownTable(table)),
            }
        }
        Statement::Query(query) => {
            let table = select_table_name(&query)?;
            select_relation(&table).ok_or(SqlError::UnknownTable(table))
        }
        _ => Ok(Relation::Empty),
    }
}

// ── Literal values ────────────────────────────────────────────

/// A literal from VALUES, SET or WHERE. Bound parameters arrive as text, so
/// every conversion below accepts a quoted string too.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Null,
    Text(String),
    Number(String),
    Bool(bool),
}

fn literal(expr: &Expr) -> Result<Literal, SqlError> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => match value {
            Value::Null => Ok(Literal::Null),
            Value::Boolean(b) => Ok(Literal::Bool(*b)),
            Value::Number(n, _) => Ok(Literal::Number(n.clone())),
            Value::SingleQuotedString(s)
            | Value::DoubleQuotedString(s)
            | Value::EscapedStringLiteral(s) => Ok(Literal::Text(s.clone())),
            other => Err(SqlError::Parse(format!("unsupported literal: {other}"))),
        },
        Expr::UnaryOp {
            op: ast::UnaryOperator::Minus,
            expr,
        } => match literal(expr)? {
            Literal::Number(n) => Ok(Literal::Number(format!("-{n}"))),
            _ => Err(SqlError::Parse(format!("cannot negate {expr}"))),
        },
        other => Err(SqlError::Parse(format!("expected a literal, got {other}"))),
    }
}

fn invalid(column: &str, reason: impl Into<String>) -> SqlError {
    SqlError::InvalidValue {
        column: column.to_string(),
        reason: reason.into(),
    }
}

/// Column → literal for one INSERT row, one UPDATE's SET list or a WHERE
/// conjunction of equalities.
struct Fields {
    table: String,
    values: HashMap<String, Literal>,
}

impl Fields {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: HashMap::new(),
        }
    }

    fn insert(&mut self, column: String, value: Literal) -> Result<(), SqlError> {
        if self.values.insert(column.clone(), value).is_some() {
            return Err(SqlError::Parse(format!("column {column} given twice")));
        }
        Ok(())
    }

    /// Reject columns outside `allowed`.
    fn only(&self, allowed: &[&str]) -> Result<(), SqlError> {
        match self.values.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(col) => Err(SqlError::UnknownColumn(self.table.clone(), col.clone())),
            None => Ok(()),
        }
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text value; NULL and absent are `None`, numbers are taken verbatim.
    fn text(&self, column: &str) -> Result<Option<String>, SqlError> {
        match self.values.get(column) {
            None | Some(Literal::Null) => Ok(None),
            Some(Literal::Text(s)) | Some(Literal::Number(s)) => Ok(Some(s.clone())),
            Some(Literal::Bool(_)) => Err(invalid(column, "expected text")),
        }
    }

    fn required_text(&self, column: &'static str) -> Result<String, SqlError> {
        self.text(column)?.ok_or(SqlError::MissingColumn(column))
    }

    /// Blank text counts as absent.
    fn ulid(&self, column: &str) -> Result<Option<Ulid>, SqlError> {
        match self.text(column)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => Ulid::from_string(s.trim())
                .map(Some)
                .map_err(|e| invalid(column, format!("bad ULID: {e}"))),
        }
    }

    fn required_ulid(&self, column: &'static str) -> Result<Ulid, SqlError> {
        self.ulid(column)?.ok_or(SqlError::MissingColumn(column))
    }

    fn id_or_new(&self) -> Result<Ulid, SqlError> {
        Ok(self.ulid("id")?.unwrap_or_else(Ulid::new))
    }

    fn int(&self, column: &str) -> Result<Option<i64>, SqlError> {
        match self.text(column)? {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| invalid(column, format!("not an integer: {s}"))),
        }
    }

    fn u32(&self, column: &str) -> Result<Option<u32>, SqlError> {
        match self.int(column)? {
            None => Ok(None),
            Some(v) => u32::try_from(v)
                .map(Some)
                .map_err(|_| invalid(column, format!("{v} out of range"))),
        }
    }

    fn bool(&self, column: &str) -> Result<Option<bool>, SqlError> {
        match self.values.get(column) {
            None | Some(Literal::Null) => Ok(None),
            Some(Literal::Bool(b)) => Ok(Some(*b)),
            Some(Literal::Text(s)) | Some(Literal::Number(s)) => {
                match s.trim().to_lowercase().as_str() {
                    "true" | "t" | "yes" | "on" | "1" => Ok(Some(true)),
                    "false" | "f" | "no" | "off" | "0" => Ok(Some(false)),
                    _ => Err(invalid(column, format!("not a boolean: {s}"))),
                }
            }
        }
    }

    fn date(&self, column: &str) -> Result<Option<NaiveDate>, SqlError> {
        match self.text(column)? {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| invalid(column, format!("expected YYYY-MM-DD, got {s}"))),
        }
    }

    fn required_date(&self, column: &'static str) -> Result<NaiveDate, SqlError> {
        self.date(column)?.ok_or(SqlError::MissingFilter(column))
    }

    fn day(&self, column: &'static str) -> Result<DayOfWeek, SqlError> {
        let s = self.required_text(column)?;
        DayOfWeek::parse(&s).ok_or_else(|| invalid(column, format!("not a weekday: {s}")))
    }

    fn clock(&self, column: &'static str) -> Result<ClockTime, SqlError> {
        let s = self.required_text(column)?;
        ClockTime::parse(&s).ok_or_else(|| invalid(column, format!("expected HH:MM, got {s}")))
    }
}

// ── INSERT ────────────────────────────────────────────────────

/// Column order assumed when an INSERT names no columns.
fn default_columns(table: &str) -> Option<&'static [&'static str]> {
    Some(match table {
        "barbers" => &["id", "name", "bio"],
        "availability" => &["id", "barber_id", "day_of_week", "start_time", "end_time"],
        "services" => &["id", "name", "duration_minutes", "price_cents"],
        "appointments" => &[
            "customer_name",
            "customer_email",
            "customer_phone",
            "barber_id",
            "service_id",
            "date_time",
            "notes",
            "create_account",
        ],
        "contacts" => &["name", "email", "phone", "message"],
        _ => return None,
    })
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    let defaults = default_columns(&table).ok_or_else(|| SqlError::UnknownTable(table.clone()))?;
    let row = insert_row(insert)?;

    let columns: Vec<String> = if insert.columns.is_empty() {
        defaults.iter().map(|c| c.to_string()).collect()
    } else {
        insert.columns.iter().map(|c| c.value.to_lowercase()).collect()
    };
    if row.len() != columns.len() {
        return Err(SqlError::WrongArity(table, columns.len(), row.len()));
    }
    let mut f = Fields::new(&table);
    for (column, expr) in columns.into_iter().zip(row) {
        f.insert(column, literal(expr)?)?;
    }
    f.only(defaults)?;

    match table.as_str() {
        "barbers" => Ok(Command::InsertBarber {
            id: f.id_or_new()?,
            name: f.required_text("name")?,
            bio: f.text("bio")?,
        }),
        "availability" => Ok(Command::InsertBlock {
            id: f.id_or_new()?,
            barber_id: f.required_ulid("barber_id")?,
            day: f.day("day_of_week")?,
            start: f.clock("start_time")?,
            end: f.clock("end_time")?,
        }),
        "services" => Ok(Command::InsertService {
            id: f.id_or_new()?,
            name: f.required_text("name")?,
            duration_minutes: f.u32("duration_minutes")?.ok_or(SqlError::MissingColumn("duration_minutes"))?,
            price_cents: f.int("price_cents")?.unwrap_or(0),
        }),
        "appointments" => Ok(Command::BookAppointment(BookingRequest {
            customer_name: f.text("customer_name")?,
            customer_email: f.text("customer_email")?,
            customer_phone: f.text("customer_phone")?,
            barber_id: f.ulid("barber_id")?,
            service_id: f.ulid("service_id")?,
            date_time: f.text("date_time")?,
            notes: f.text("notes")?,
            create_account: f.bool("create_account")?.unwrap_or(false),
        })),
        "contacts" => Ok(Command::InsertContact {
            name: f.text("name")?,
            email: f.text("email")?,
            phone: f.text("phone")?,
            message: f.text("message")?,
        }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn insert_row(insert: &ast::Insert) -> Result<&Vec<Expr>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => match values.rows.as_slice() {
            [] => Err(SqlError::Parse("empty VALUES".into())),
            [row] => Ok(row),
            _ => Err(SqlError::Unsupported("multi-row INSERT".into())),
        },
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

// ── UPDATE ────────────────────────────────────────────────────

fn parse_update(
    table: &ast::TableWithJoins,
    assignments: &[ast::Assignment],
    selection: &Option<Expr>,
) -> Result<Command, SqlError> {
    let table = table_factor_name(&table.relation)?;
    let id = extract_where_id(selection)?;

    let mut f = Fields::new(&table);
    for assignment in assignments {
        let column = match &assignment.target {
            AssignmentTarget::ColumnName(name) => object_name_last(name)
                .ok_or_else(|| SqlError::Parse("empty column name".into()))?,
            AssignmentTarget::Tuple(_) => {
                return Err(SqlError::Unsupported("tuple assignment".into()));
            }
        };
        f.insert(column, literal(&assignment.value)?)?;
    }
    if f.is_empty() {
        return Err(SqlError::Parse("UPDATE without SET".into()));
    }

    match table.as_str() {
        "barbers" => {
            f.only(&["name", "bio", "active"])?;
            Ok(Command::UpdateBarber {
                id,
                name: f.text("name")?,
                bio: f.text("bio")?,
                active: f.bool("active")?,
            })
        }
        "services" => {
            f.only(&["name", "duration_minutes", "price_cents"])?;
            Ok(Command::UpdateService {
                id,
                name: f.text("name")?,
                duration_minutes: f.u32("duration_minutes")?,
                price_cents: f.int("price_cents")?,
            })
        }
        "appointments" => {
            f.only(&["status"])?;
            let raw = f.required_text("status")?;
            let status = AppointmentStatus::parse(&raw)
                .ok_or_else(|| invalid("status", format!("unknown status: {raw}")))?;
            Ok(Command::UpdateAppointmentStatus { id, status })
        }
        "customers" => {
            f.only(&["name", "phone", "loyalty_points"])?;
            Ok(Command::UpdateCustomer {
                id,
                name: f.text("name")?,
                phone: f.text("phone")?,
                loyalty_points: f.int("loyalty_points")?,
            })
        }
        "contacts" => {
            f.only(&["is_read"])?;
            match f.bool("is_read")? {
                Some(true) => Ok(Command::MarkContactRead { id }),
                _ => Err(invalid("is_read", "messages can only be marked read")),
            }
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

// ── DELETE ────────────────────────────────────────────────────

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    let id = extract_where_id(&delete.selection)?;

    match table.as_str() {
        "barbers" => Ok(Command::DeleteBarber { id }),
        "availability" => Ok(Command::DeleteBlock { id }),
        "services" => Ok(Command::DeleteService { id }),
        "appointments" => Err(SqlError::Unsupported(
            "appointments are never deleted; set status = 'cancelled'".into(),
        )),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

// ── SELECT ────────────────────────────────────────────────────

fn select_table_name(query: &ast::Query) -> Result<String, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };
    let first = select
        .from
        .first()
        .ok_or_else(|| SqlError::Parse("SELECT without FROM".into()))?;
    table_factor_name(&first.relation)
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let table = select_table_name(query)?;
    let mut f = Fields::new(&table);
    if let SetExpr::Select(select) = query.body.as_ref()
        && let Some(selection) = &select.selection
    {
        collect_equalities(selection, &mut f)?;
    }

    match table.as_str() {
        "barbers" => {
            f.only(&[])?;
            Ok(Command::SelectBarbers)
        }
        "availability" => {
            f.only(&["barber_id"])?;
            Ok(Command::SelectAvailability {
                barber_id: f.ulid("barber_id")?.ok_or(SqlError::MissingFilter("barber_id"))?,
            })
        }
        "services" => {
            f.only(&[])?;
            Ok(Command::SelectServices)
        }
        "customers" => {
            f.only(&["email"])?;
            Ok(Command::SelectCustomers { email: f.text("email")? })
        }
        "appointments" => {
            f.only(&["barber_id", "on_date"])?;
            Ok(Command::SelectAppointments {
                barber_id: f.ulid("barber_id")?,
                date: f.date("on_date")?,
            })
        }
        "open_slots" => {
            f.only(&["barber_id", "service_id", "on_date"])?;
            Ok(Command::SelectOpenSlots {
                barber_id: f.ulid("barber_id")?.ok_or(SqlError::MissingFilter("barber_id"))?,
                service_id: f.ulid("service_id")?.ok_or(SqlError::MissingFilter("service_id"))?,
                date: f.required_date("on_date")?,
            })
        }
        "barber_stats" => {
            f.only(&[])?;
            Ok(Command::SelectBarberStats)
        }
        "contacts" => {
            f.only(&[])?;
            Ok(Command::SelectContacts)
        }
        "audit_log" => {
            f.only(&[])?;
            Ok(Command::SelectAuditLog)
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

/// `a = 1 AND b = 'x' AND ...`; anything else in WHERE is rejected.
fn collect_equalities(expr: &Expr, f: &mut Fields) -> Result<(), SqlError> {
    match expr {
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::And,
            right,
        } => {
            collect_equalities(left, f)?;
            collect_equalities(right, f)
        }
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } => {
            let column = expr_column_name(left)
                .ok_or_else(|| SqlError::Parse(format!("expected a column, got {left}")))?;
            f.insert(column, literal(right)?)
        }
        Expr::Nested(inner) => collect_equalities(inner, f),
        other => Err(SqlError::Unsupported(format!("filter {other}"))),
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    let first = tables_with_joins
        .first()
        .ok_or_else(|| SqlError::Parse("DELETE without table".into()))?;
    table_factor_name(&first.relation)
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn extract_where_id(selection: &Option<Expr>) -> Result<Ulid, SqlError> {
    let sel = selection.as_ref().ok_or(SqlError::MissingFilter("id"))?;
    match sel {
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } if expr_column_name(left).as_deref() == Some("id") => {
            let mut f = Fields::new("");
            f.insert("id".into(), literal(right)?)?;
            f.ulid("id")?.ok_or(SqlError::MissingFilter("id"))
        }
        _ => Err(SqlError::MissingFilter("id")),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    UnknownColumn(String, String),
    WrongArity(String, usize, usize),
    MissingColumn(&'static str),
    MissingFilter(&'static str),
    InvalidValue { column: String, reason: String },
}

impl SqlError {
    pub fn sqlstate(&self) -> &'static str {
        match self {
            SqlError::UnknownTable(_) => "42P01",
            SqlError::UnknownColumn(..) => "42703",
            SqlError::Unsupported(_) => "0A000",
            SqlError::MissingColumn(_) => "23502",
            SqlError::InvalidValue { .. } => "22P02",
            SqlError::Parse(_) | SqlError::Empty | SqlError::WrongArity(..) | SqlError::MissingFilter(_) => {
                "42601"
            }
        }
    }
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::UnknownColumn(t, c) => write!(f, "unknown column {c} for {t}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected {expected} values, got {got}")
            }
            SqlError::MissingColumn(col) => write!(f, "missing column: {col}"),
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
            SqlError::InvalidValue { column, reason } => write!(f, "invalid {column}: {reason}"),
        }
    }
}

impl std::error::Error for SqlError {}
