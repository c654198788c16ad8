use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::query::QueryDescriptor;

use super::manager::{DatabaseError, DatabaseManager};
use super::records::{PayloadRecord, PayloadStatusRecord};
use super::sql::{self, bind_param_query, bind_param_query_as};
use super::{PayloadPage, PayloadStore};

/// `PayloadStore` backed by the payload-tracker PostgreSQL schema
#[derive(Clone)]
pub struct PgPayloadStore {
    pool: PgPool,
}

impl PgPayloadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayloadStore for PgPayloadStore {
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<PayloadPage, DatabaseError> {
        let count_sql = sql::payloads_count(query);
        let select_sql = sql::payloads_select(query)?;

        let mut count_q = sqlx::query(&count_sql.query);
        for p in count_sql.params.iter() {
            count_q = bind_param_query(count_q, p);
        }
        let row = count_q.fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("count")?;

        let mut select_q = sqlx::query_as::<_, PayloadRecord>(&select_sql.query);
        for p in select_sql.params.iter() {
            select_q = bind_param_query_as(select_q, p);
        }
        let records = select_q.fetch_all(&self.pool).await?;

        Ok(PayloadPage { total, records })
    }

    async fn fetch_by_request_id(
        &self,
        request_id: &str,
        query: &QueryDescriptor,
    ) -> Result<Vec<PayloadStatusRecord>, DatabaseError> {
        let select_sql = sql::statuses_select(request_id, query)?;

        let mut q = sqlx::query_as::<_, PayloadStatusRecord>(&select_sql.query);
        for p in select_sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let verbosity = query.verbosity();
        Ok(rows.into_iter().map(|r| r.with_verbosity(verbosity)).collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
