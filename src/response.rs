//! Response assembly: the chart payload returned for every utterance.

use crate::execution::ResultRow;
use crate::intent::classifier::IntentCategory;
use crate::intent::descriptor::QueryDescriptor;
use crate::lexicon::Dimension;
use crate::query_plan::QueryPlan;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const ASSISTANT_TITLE: &str = "AgriStack Assistant";

const PIE_MAX_SLICES: usize = 6;
const MULTI_KPI_MAX_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Message,
    Kpi,
    MultiKpi,
    Bar,
    Line,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    pub table: String,
    pub column: String,
    pub group_by: Option<String>,
    pub sql_preview: String,
}

impl DataQuery {
    /// Summary of the plans behind one answer. A paired comparison runs one
    /// plan per side; their fields are joined in side order.
    pub fn from_plans(plans: &[&QueryPlan]) -> Self {
        Self {
            table: plans.iter().map(|p| p.table_name.as_str()).unique().join(", "),
            column: plans.iter().map(|p| p.value_expression()).join(", "),
            group_by: plans.iter().find_map(|p| p.group_by_column.clone()),
            sql_preview: plans.iter().map(|p| p.sql_preview()).join("; "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub intent_type: IntentCategory,
    pub lgd_scope: Option<String>,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_query: Option<QueryDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_query: Option<DataQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub unit: String,
    pub metadata: ChartMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub intent_type: IntentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub state: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub title: String,
    pub narration: String,
    pub chart_data: ChartPayload,
    pub metadata: ResponseMetadata,
}

impl AnalyticsResponse {
    /// A text-only reply with an empty `message` chart.
    pub fn message(
        intent: IntentCategory,
        narration: String,
        state: &str,
        lgd_scope: Option<String>,
    ) -> Self {
        Self {
            title: ASSISTANT_TITLE.to_string(),
            narration,
            chart_data: ChartPayload {
                chart_type: ChartType::Message,
                title: ASSISTANT_TITLE.to_string(),
                labels: Vec::new(),
                values: Vec::new(),
                unit: String::new(),
                metadata: ChartMetadata {
                    intent_type: intent,
                    lgd_scope,
                    record_count: 0,
                    parsed_query: None,
                    data_query: None,
                },
            },
            metadata: ResponseMetadata {
                intent_type: intent,
                source: None,
                state: state.to_string(),
                timestamp: timestamp(),
                error: false,
                suggestions: Vec::new(),
            },
        }
    }

    /// Plain-language reply for a data engine failure. Carries no details.
    pub fn service_error(state: &str) -> Self {
        let mut response = Self::message(
            IntentCategory::Analytics,
            "Sorry, the data service could not answer right now. Please try again in a moment.".to_string(),
            state,
            None,
        );
        response.title = "Error".to_string();
        response.metadata.error = true;
        response
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.metadata.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_parsed_query(mut self, descriptor: &QueryDescriptor) -> Self {
        self.chart_data.metadata.parsed_query = Some(descriptor.clone());
        self
    }
}

pub fn timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Chart type for a result. Rules are checked in order; the first hit wins.
pub fn choose_chart_type(intent: IntentCategory, descriptor: &QueryDescriptor, rows: &[ResultRow]) -> ChartType {
    if intent != IntentCategory::Analytics || rows.is_empty() {
        return ChartType::Message;
    }
    if rows.len() == 1 && rows[0].label.is_none() {
        return ChartType::Kpi;
    }
    if descriptor.paired_comparison.is_some() {
        return ChartType::MultiKpi;
    }
    if descriptor.dimension == Some(Dimension::Year) {
        return ChartType::Line;
    }
    if matches!(descriptor.dimension, Some(Dimension::Season | Dimension::IrrigationSource))
        && rows.len() <= PIE_MAX_SLICES
    {
        return ChartType::Pie;
    }
    if rows.len() <= MULTI_KPI_MAX_ROWS {
        return ChartType::MultiKpi;
    }
    ChartType::Bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::descriptor::ComparisonType;
    use crate::lexicon::{Indicator, PairedComparison};

    fn labelled(n: usize) -> Vec<ResultRow> {
        (0..n).map(|i| ResultRow::labelled(format!("r{}", i), i as f64)).collect()
    }

    #[test]
    fn test_chart_type_rules() {
        let analytics = IntentCategory::Analytics;
        let plain = QueryDescriptor::new(Indicator::FarmerCount);
        let by_district = plain.clone().with_dimension(Dimension::District);
        let by_year = plain.clone().with_dimension(Dimension::Year);
        let by_season = plain.clone().with_dimension(Dimension::Season);

        assert_eq!(choose_chart_type(analytics, &plain, &[]), ChartType::Message);
        assert_eq!(choose_chart_type(IntentCategory::OffTopic, &plain, &labelled(3)), ChartType::Message);
        assert_eq!(choose_chart_type(analytics, &plain, &[ResultRow::total(5.0)]), ChartType::Kpi);
        assert_eq!(choose_chart_type(analytics, &by_year, &labelled(8)), ChartType::Line);
        assert_eq!(choose_chart_type(analytics, &by_season, &labelled(4)), ChartType::Pie);
        assert_eq!(choose_chart_type(analytics, &by_season, &labelled(7)), ChartType::Bar);
        assert_eq!(choose_chart_type(analytics, &by_district, &labelled(2)), ChartType::MultiKpi);
        assert_eq!(choose_chart_type(analytics, &by_district, &labelled(10)), ChartType::Bar);
    }

    #[test]
    fn test_line_chart_only_for_year_series() {
        let analytics = IntentCategory::Analytics;
        let mut trend_by_district = QueryDescriptor::new(Indicator::FallowArea).with_dimension(Dimension::District);
        trend_by_district.comparison_type = ComparisonType::Trend;
        assert_eq!(choose_chart_type(analytics, &trend_by_district, &labelled(8)), ChartType::Bar);

        let paired = QueryDescriptor::new(Indicator::IrrigatedArea).with_paired(PairedComparison::IrrigatedVsUnirrigated);
        assert_eq!(choose_chart_type(analytics, &paired, &labelled(2)), ChartType::MultiKpi);
        assert_eq!(choose_chart_type(analytics, &paired, &[]), ChartType::Message);
    }

    #[test]
    fn test_payload_field_names() {
        let response = AnalyticsResponse::message(
            IntentCategory::OffTopic,
            "hi".to_string(),
            "Maharashtra",
            Some("27".to_string()),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["chart_data"]["type"], "message");
        assert_eq!(json["chart_data"]["metadata"]["intent_type"], "off_topic");
        assert_eq!(json["metadata"]["state"], "Maharashtra");
        assert!(json["metadata"].get("error").is_none());
    }

    #[test]
    fn test_service_error_is_flagged() {
        let response = AnalyticsResponse::service_error("Maharashtra");
        assert!(response.metadata.error);
        assert_eq!(response.chart_data.chart_type, ChartType::Message);
        assert!(!response.narration.contains("Execution"));
    }
}
