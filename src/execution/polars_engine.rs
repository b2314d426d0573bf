//! CSV Execution Engine
//!
//! Interprets a [`QueryPlan`] over `<table>.csv` files with polars lazy frames.
//! Every column is read as text so region codes keep their leading zeros;
//! the value column is cast to `f64` before summing (unparseable cells are
//! null and do not contribute). A derived measure subtracts a second column
//! per row, with missing cells read as zero.

use crate::error::{AnalyticsError, Result};
use crate::execution::engine::{QueryExecutor, ResultRow};
use crate::query_plan::{FilterPredicate, OrderKey, QueryPlan, SortOrder};
use async_trait::async_trait;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CsvEngine {
    data_dir: PathBuf,
}

impl CsvEngine {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", table_name))
    }
}

#[async_trait]
impl QueryExecutor for CsvEngine {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<ResultRow>> {
        let start_time = std::time::Instant::now();
        let table_path = self.table_path(&plan.table_name);
        if !table_path.exists() {
            return Err(AnalyticsError::Execution(format!(
                "Table file not found: {}",
                plan.table_name
            )));
        }
        info!("Executing plan on {} with polars", table_path.display());

        let owned_plan = plan.clone();
        let rows = tokio::task::spawn_blocking(move || run_plan(&table_path, &owned_plan))
            .await
            .map_err(|e| AnalyticsError::Execution(format!("CSV worker failed: {}", e)))??;

        debug!(
            rows = rows.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "CSV plan finished"
        );
        Ok(rows)
    }
}

fn predicate_expr(predicate: &FilterPredicate) -> Option<Expr> {
    predicate
        .value
        .values()
        .into_iter()
        .map(|v| {
            if predicate.case_insensitive {
                col(&predicate.column)
                    .str()
                    .to_lowercase()
                    .eq(lit(v.to_lowercase()))
            } else {
                col(&predicate.column).eq(lit(v.to_string()))
            }
        })
        .reduce(|acc, e| acc.or(e))
}

fn run_plan(path: &Path, plan: &QueryPlan) -> Result<Vec<ResultRow>> {
    let mut frame = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()
        .map_err(|e| AnalyticsError::Execution(format!("Failed to load CSV: {}", e)))?;

    for predicate in &plan.filter_predicates {
        if let Some(expr) = predicate_expr(predicate) {
            frame = frame.filter(expr);
        }
    }

    let value = match &plan.subtract_column {
        Some(subtract) => {
            col(&plan.value_column).cast(DataType::Float64).fill_null(lit(0.0))
                - col(subtract).cast(DataType::Float64).fill_null(lit(0.0))
        }
        None => col(&plan.value_column).cast(DataType::Float64),
    };

    let Some(group_column) = &plan.group_by_column else {
        let df = frame
            .select([value.sum().alias("value"), len().alias("rows")])
            .collect()
            .map_err(|e| AnalyticsError::Execution(format!("Failed to aggregate: {}", e)))?;
        let rows = df.column("rows")?.cast(&DataType::UInt64)?;
        if rows.u64()?.get(0).unwrap_or(0) == 0 {
            return Ok(Vec::new());
        }
        let total = df.column("value")?.f64()?.get(0).unwrap_or(0.0);
        return Ok(vec![ResultRow::total(total)]);
    };

    let mut grouped = frame
        .select([col(group_column).alias("label"), value.alias("value")])
        .group_by([col("label")])
        .agg([col("value").sum()]);

    if let Some((key, order)) = plan.order_by {
        let by = match key {
            OrderKey::Value => "value",
            OrderKey::Label => "label",
        };
        grouped = grouped.sort(
            [by],
            SortMultipleOptions::default()
                .with_order_descending(order == SortOrder::Descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        );
    }
    if let Some(limit) = plan.limit {
        grouped = grouped.limit(limit as IdxSize);
    }

    let df = grouped
        .collect()
        .map_err(|e| AnalyticsError::Execution(format!("Failed to collect DataFrame: {}", e)))?;

    let labels = df.column("label")?.str()?;
    let values = df.column("value")?.f64()?;
    Ok(labels
        .into_iter()
        .zip(values.into_iter())
        .map(|(label, value)| ResultRow {
            label: label.map(str::to_string),
            value: value.unwrap_or(0.0),
        })
        .collect())
}
