//! Query Plan
//!
//! Backend-neutral description of a single-table aggregate: which value column
//! to sum, the group-by key, an ordered conjunction of predicates, ordering and
//! limit. Built deterministically from a descriptor and an authorization
//! scope; engines either interpret it directly (CSV) or render it to SQL.

use crate::intent::descriptor::{ComparisonType, QueryDescriptor, DEFAULT_TOP_N};
use crate::lexicon::{Dimension, RankOrder};
use crate::region::RegionLevel;
use crate::security::AuthorizationScope;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateValue {
    Text(String),
    List(Vec<String>),
}

impl PredicateValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            PredicateValue::Text(v) => vec![v.as_str()],
            PredicateValue::List(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub column: String,
    pub operator: FilterOperator,
    pub value: PredicateValue,
    /// Compare lower-cased text on both sides.
    #[serde(default)]
    pub case_insensitive: bool,
}

impl FilterPredicate {
    fn eq(column: &str, value: String, case_insensitive: bool) -> Self {
        Self {
            column: column.to_string(),
            operator: FilterOperator::Eq,
            value: PredicateValue::Text(value),
            case_insensitive,
        }
    }

    /// Whether a raw cell value satisfies this predicate.
    pub fn accepts(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.value.values().iter().any(|v| {
            if self.case_insensitive {
                v.eq_ignore_ascii_case(cell)
            } else {
                *v == cell
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKey {
    Value,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub table_name: String,
    pub value_column: String,
    /// Per-row `value_column - subtract_column`, nulls counted as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtract_column: Option<String>,
    pub aggregation: Aggregation,
    pub group_by_column: Option<String>,
    /// Conjunction, in order: region, crop, season, year.
    pub filter_predicates: Vec<FilterPredicate>,
    pub order_by: Option<(OrderKey, SortOrder)>,
    pub limit: Option<u32>,
    /// Filters or groupings dropped because the table lacks the column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl QueryPlan {
    pub fn is_grouped(&self) -> bool {
        self.group_by_column.is_some()
    }

    /// The summed expression, for display.
    pub fn value_expression(&self) -> String {
        match &self.subtract_column {
            Some(subtract) => format!("{} - {}", self.value_column, subtract),
            None => self.value_column.clone(),
        }
    }

    /// Render as SQL. With `params`, predicate values become `$n` placeholders
    /// pushed onto `params`; without, they are inlined as quoted literals.
    pub fn render_sql(&self, mut params: Option<&mut Vec<String>>) -> String {
        let value = match &self.subtract_column {
            Some(subtract) => format!(
                "SUM(COALESCE(CAST({} AS DOUBLE PRECISION), 0) - COALESCE(CAST({} AS DOUBLE PRECISION), 0)) AS value",
                self.value_column, subtract
            ),
            None => format!("SUM(CAST({} AS DOUBLE PRECISION)) AS value", self.value_column),
        };
        let label = match &self.group_by_column {
            Some(column) => format!("CAST({} AS TEXT) AS label", column),
            None => "CAST(NULL AS TEXT) AS label".to_string(),
        };
        let mut sql = format!("SELECT {}, {} FROM {}", label, value, self.table_name);

        let mut clauses = Vec::with_capacity(self.filter_predicates.len());
        for predicate in &self.filter_predicates {
            let mut render_value = |v: &str| -> String {
                let placeholder = match params.as_deref_mut() {
                    Some(params) => {
                        params.push(v.to_string());
                        format!("${}", params.len())
                    }
                    None => format!("'{}'", v.replace('\'', "''")),
                };
                if predicate.case_insensitive {
                    format!("LOWER({})", placeholder)
                } else {
                    placeholder
                }
            };
            let column = if predicate.case_insensitive {
                format!("LOWER(CAST({} AS TEXT))", predicate.column)
            } else {
                format!("CAST({} AS TEXT)", predicate.column)
            };
            let clause = match (&predicate.operator, &predicate.value) {
                (FilterOperator::Eq, PredicateValue::Text(v)) => format!("{} = {}", column, render_value(v.as_str())),
                (_, value) => {
                    let list: Vec<String> = value.values().into_iter().map(&mut render_value).collect();
                    format!("{} IN ({})", column, list.join(", "))
                }
            };
            clauses.push(clause);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(column) = &self.group_by_column {
            sql.push_str(&format!(" GROUP BY {}", column));
        }
        if let Some((key, order)) = self.order_by {
            let key = match key {
                OrderKey::Value => "value",
                OrderKey::Label => "label",
            };
            sql.push_str(&format!(" ORDER BY {} {} NULLS LAST", key, order.sql()));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    pub fn sql_preview(&self) -> String {
        self.render_sql(None)
    }
}

/// One side of a paired comparison and the plan that computes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedLeg {
    pub label: String,
    pub plan: QueryPlan,
}

/// Descriptor + scope → plan. Pure; the same inputs give the same plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanBuilder;

impl QueryPlanBuilder {
    pub fn new() -> Self {
        Self
    }

    /// `None` when the descriptor has no indicator.
    pub fn build(&self, descriptor: &QueryDescriptor, scope: &AuthorizationScope) -> Option<QueryPlan> {
        let meta = descriptor.indicator?.meta();
        let table = meta.table;
        let mut notes = Vec::new();

        let mut filter_predicates = Vec::new();

        // local codes repeat across parents, so every ancestor is pinned
        let region = &scope.effective_region;
        let region_level = region.level();
        for (level, segment) in region.segments() {
            filter_predicates.push(FilterPredicate::eq(level.column(), segment, false));
        }

        if let Some(crop) = &descriptor.crop_filter {
            if table.has_column(Dimension::Crop.column()) {
                filter_predicates.push(FilterPredicate::eq(Dimension::Crop.column(), crop.clone(), true));
            } else {
                notes.push(format!("crop filter '{}' not applied: {} has no crop column", crop, table.table_name()));
            }
        }

        if let Some(season) = descriptor.season_filter {
            filter_predicates.push(FilterPredicate::eq(
                Dimension::Season.column(),
                season.label().to_string(),
                true,
            ));
        }

        if let Some(year) = descriptor.year_filter {
            let mut years = year.agricultural_years();
            let predicate = if years.len() == 1 {
                FilterPredicate::eq(Dimension::Year.column(), years.remove(0), false)
            } else {
                FilterPredicate {
                    column: Dimension::Year.column().to_string(),
                    operator: FilterOperator::In,
                    value: PredicateValue::List(years),
                    case_insensitive: false,
                }
            };
            filter_predicates.push(predicate);
        }

        let group_by_column = descriptor.dimension.and_then(|dimension| {
            let column = match dimension.region_level() {
                Some(level) if level < region_level => {
                    notes.push(format!(
                        "grouping by {} instead of {}: scope is narrower",
                        region_level_title(region_level),
                        dimension.title()
                    ));
                    region_level.column()
                }
                _ => dimension.column(),
            };
            if table.has_column(column) {
                Some(column.to_string())
            } else {
                notes.push(format!(
                    "{} breakdown not applied: {} has no {} column",
                    dimension.title(),
                    table.table_name(),
                    column
                ));
                None
            }
        });

        let (order_by, limit) = match (&group_by_column, descriptor.comparison_type) {
            (None, _) => (None, None),
            (Some(_), ComparisonType::TopN) => {
                let order = match descriptor.rank_order {
                    RankOrder::Highest => SortOrder::Descending,
                    RankOrder::Lowest => SortOrder::Ascending,
                };
                (
                    Some((OrderKey::Value, order)),
                    Some(descriptor.top_n.unwrap_or(DEFAULT_TOP_N)),
                )
            }
            (Some(column), _) if column == Dimension::Year.column() => {
                (Some((OrderKey::Label, SortOrder::Ascending)), None)
            }
            (Some(_), _) => (Some((OrderKey::Value, SortOrder::Descending)), None),
        };

        let plan = QueryPlan {
            table_name: table.table_name().to_string(),
            value_column: meta.column.to_string(),
            subtract_column: meta.subtract.map(str::to_string),
            aggregation: Aggregation::Sum,
            group_by_column,
            filter_predicates,
            order_by,
            limit,
            notes,
        };
        debug!(sql = %plan.sql_preview(), "built query plan");
        Some(plan)
    }

    /// One ungrouped plan per side of the descriptor's paired comparison.
    /// Empty when the descriptor is not paired.
    pub fn build_paired(&self, descriptor: &QueryDescriptor, scope: &AuthorizationScope) -> Vec<PairedLeg> {
        let Some(paired) = descriptor.paired_comparison else {
            return Vec::new();
        };
        paired
            .sides(descriptor.indicator)
            .into_iter()
            .filter_map(|side| {
                let mut leg = descriptor.clone();
                leg.indicator = Some(side.indicator);
                leg.season_filter = side.season.or(descriptor.season_filter);
                leg.dimension = None;
                leg.comparison_type = ComparisonType::None;
                leg.top_n = None;
                leg.paired_comparison = None;
                self.build(&leg, scope).map(|plan| PairedLeg {
                    label: side.label.to_string(),
                    plan,
                })
            })
            .collect()
    }
}

fn region_level_title(level: RegionLevel) -> &'static str {
    match level {
        RegionLevel::State => "state",
        RegionLevel::District => "district",
        RegionLevel::SubDistrict => "sub-district",
    }
}
