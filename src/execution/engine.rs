//! Query Executor Trait
//!
//! The single seam between the pipeline and a data backend. An executor runs
//! one [`QueryPlan`] and returns `(label, value)` rows; an empty result means
//! no data matched.

use crate::error::Result;
use crate::query_plan::QueryPlan;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One aggregated row. `label` is `None` for an ungrouped total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: Option<String>,
    pub value: f64,
}

impl ResultRow {
    pub fn total(value: f64) -> Self {
        Self { label: None, value }
    }

    pub fn labelled(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: Some(label.into()),
            value,
        }
    }
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Backend name, reported as the response `source`.
    fn name(&self) -> &'static str;

    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<ResultRow>>;
}
