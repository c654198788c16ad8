use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};

use crate::query::{FilterKey, QueryDescriptor, TimeRange};

use super::manager::DatabaseError;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

const PAYLOAD_COLUMNS: &str =
    "id, request_id, account, org_id, inventory_id, system_id, created_at, updated_at";

const STATUS_COLUMNS: &str = "ps.id, p.request_id, ps.service, ps.source, ps.status, ps.status_msg, \
     ps.date, ps.created_at, p.inventory_id, p.system_id, p.account, p.org_id";

/// ORDER BY column for a whitelisted payload sort field
pub fn payload_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "created_at" => Some("\"created_at\""),
        "updated_at" => Some("\"updated_at\""),
        "account" => Some("\"account\""),
        "org_id" => Some("\"org_id\""),
        "inventory_id" => Some("\"inventory_id\""),
        "system_id" => Some("\"system_id\""),
        _ => None,
    }
}

/// ORDER BY column for a whitelisted status sort field
pub fn status_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "service" => Some("ps.\"service\""),
        "source" => Some("ps.\"source\""),
        "status" => Some("ps.\"status\""),
        "status_msg" => Some("ps.\"status_msg\""),
        "date" => Some("ps.\"date\""),
        "created_at" => Some("ps.\"created_at\""),
        _ => None,
    }
}

/// Collects AND-ed conditions with positional parameters
#[derive(Default)]
struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl WhereBuilder {
    fn push(&mut self, column: &str, op: &str, param: SqlParam) {
        self.params.push(param);
        self.conditions.push(format!("{} {} ${}", column, op, self.params.len()));
    }

    fn range(&mut self, column: &str, range: TimeRange) {
        if let Some(from) = range.from {
            self.push(column, ">=", SqlParam::Timestamp(from));
        }
        if let Some(to) = range.to {
            self.push(column, "<=", SqlParam::Timestamp(to));
        }
    }

    fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

fn payloads_where(query: &QueryDescriptor) -> WhereBuilder {
    let mut builder = WhereBuilder::default();
    for key in FilterKey::ALL {
        if let Some(value) = query.filter(key) {
            builder.push(&format!("\"{}\"", key.name()), "=", SqlParam::Text(value.to_string()));
        }
    }
    builder.range("\"created_at\"", query.created_at());
    builder
}

fn join(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Windowed SELECT for one page of payloads
pub fn payloads_select(query: &QueryDescriptor) -> Result<SqlResult, DatabaseError> {
    let column = payload_sort_column(query.sort_by())
        .ok_or_else(|| DatabaseError::QueryError(format!("unsupported sort field: {}", query.sort_by())))?;
    let dir = query.sort_dir().to_sql();
    let builder = payloads_where(query);

    let sql = join(vec![
        format!("SELECT {} FROM payloads", PAYLOAD_COLUMNS),
        builder.clause(),
        // id breaks ties so pages never overlap
        format!("ORDER BY {} {}, \"id\" {}", column, dir, dir),
        format!("LIMIT {} OFFSET {}", query.page_size(), query.offset()),
    ]);

    Ok(SqlResult { query: sql, params: builder.params })
}

/// COUNT over the same filters, ignoring pagination
pub fn payloads_count(query: &QueryDescriptor) -> SqlResult {
    let builder = payloads_where(query);
    let sql = join(vec!["SELECT COUNT(*) AS count FROM payloads".to_string(), builder.clause()]);
    SqlResult { query: sql, params: builder.params }
}

/// Every status recorded for `request_id`
pub fn statuses_select(request_id: &str, query: &QueryDescriptor) -> Result<SqlResult, DatabaseError> {
    let column = status_sort_column(query.sort_by())
        .ok_or_else(|| DatabaseError::QueryError(format!("unsupported sort field: {}", query.sort_by())))?;
    let dir = query.sort_dir().to_sql();

    let mut builder = WhereBuilder::default();
    builder.push("p.\"request_id\"", "=", SqlParam::Text(request_id.to_string()));
    builder.range("ps.\"date\"", query.date());
    builder.range("ps.\"created_at\"", query.created_at());

    let sql = join(vec![
        format!(
            "SELECT {} FROM payload_statuses ps JOIN payloads p ON p.id = ps.payload_id",
            STATUS_COLUMNS
        ),
        builder.clause(),
        format!("ORDER BY {} {}, ps.\"id\" {}", column, dir, dir),
    ]);

    Ok(SqlResult { query: sql, params: builder.params })
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match p {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Timestamp(t) => q.bind(*t),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match p {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Timestamp(t) => q.bind(*t),
    }
}
