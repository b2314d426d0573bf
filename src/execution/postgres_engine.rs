//! PostgreSQL Execution Engine
//!
//! Renders the plan to parameterized SQL and runs it on a pooled connection.
//! A connection is acquired per request and returned to the pool on drop.

use crate::error::{AnalyticsError, Result};
use crate::execution::engine::{QueryExecutor, ResultRow};
use crate::query_plan::QueryPlan;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

pub struct PostgresEngine {
    pool: PgPool,
}

impl PostgresEngine {
    /// Pool that connects on first use.
    pub fn connect_lazy(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| AnalyticsError::Config(format!("Invalid database URL: {}", e)))?;
        info!("PostgreSQL pool configured (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for PostgresEngine {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<ResultRow>> {
        let mut params = Vec::new();
        let sql = plan.render_sql(Some(&mut params));
        debug!(%sql, params = params.len(), "executing plan on PostgreSQL");

        let mut query = sqlx::query_as::<_, (Option<String>, Option<f64>)>(&sql);
        for param in params {
            query = query.bind(param);
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AnalyticsError::Execution(format!("Failed to acquire connection: {}", e)))?;
        let rows = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| AnalyticsError::Execution(format!("Query failed: {}", e)))?;

        // SUM over zero rows is NULL
        Ok(rows
            .into_iter()
            .filter_map(|(label, value)| value.map(|value| ResultRow { label, value }))
            .collect())
    }
}
