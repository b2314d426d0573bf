//! Analytics Assistant
//!
//! Per-utterance pipeline: classify → extract → authorize → plan → execute →
//! narrate → assemble. A paired comparison runs one plan per side. Only
//! execution and narration suspend, and both are bounded by timeouts. Data engine failures are returned as errors; every
//! other outcome (unauthorized, off-topic, no data) is a normal response.

use crate::config::{AppConfig, DataSource};
use crate::error::{AnalyticsError, Result};
use crate::execution::{CsvEngine, PostgresEngine, QueryExecutor, ResultRow};
use crate::intent::classifier::{ConversationKind, IntentCategory, IntentClassifier};
use crate::intent::descriptor::QueryDescriptor;
use crate::intent::extractor::QueryExtractor;
use crate::narration::{Narrator, OllamaNarrator, SUGGESTED_QUERIES};
use crate::query_plan::{QueryPlan, QueryPlanBuilder};
use crate::region::{RegionCode, RegionDirectory, RegionLevel};
use crate::response::{choose_chart_type, AnalyticsResponse, ChartMetadata, ChartPayload, DataQuery, ResponseMetadata};
use crate::security::{authorize, AuthorizationScope, DenialReason, Unauthorized};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

const UNKNOWN_REGION: &str = "your region";

pub struct AnalyticsAssistant {
    classifier: IntentClassifier,
    directory: RegionDirectory,
    planner: QueryPlanBuilder,
    executor: Arc<dyn QueryExecutor>,
    narrator: Narrator,
    execution_timeout: Duration,
}

impl AnalyticsAssistant {
    pub fn new(
        directory: RegionDirectory,
        executor: Arc<dyn QueryExecutor>,
        narrator: Narrator,
        execution_timeout: Duration,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            directory,
            planner: QueryPlanBuilder::new(),
            executor,
            narrator,
            execution_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let directory = RegionDirectory::load(config.state_lgd_csv.as_deref(), config.district_lgd_csv.as_deref())?;

        let executor: Arc<dyn QueryExecutor> = match config.data_source {
            DataSource::Csv => Arc::new(CsvEngine::new(config.data_dir.clone())),
            DataSource::Database => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| AnalyticsError::Config("DATABASE_URL is not set".to_string()))?;
                Arc::new(PostgresEngine::connect_lazy(url, config.max_connections, config.execution_timeout)?)
            }
        };

        let narrator = if config.narration.enabled {
            info!("LLM narration enabled ({})", config.narration.model);
            Narrator::with_service(
                Arc::new(OllamaNarrator::new(config.narration.ollama_url.clone(), config.narration.model.clone())),
                config.narration.timeout,
            )
        } else {
            Narrator::template_only()
        };

        Ok(Self::new(directory, executor, narrator, config.execution_timeout))
    }

    pub fn directory(&self) -> &RegionDirectory {
        &self.directory
    }

    pub fn extractor(&self) -> QueryExtractor<'_> {
        QueryExtractor::new(&self.directory)
    }

    /// Answer one utterance for a user bound to `user_region_code`.
    pub async fn respond(&self, utterance: &str, user_region_code: &str) -> Result<AnalyticsResponse> {
        let request_id = Uuid::new_v4();
        let span = info_span!("respond", %request_id, user_region = %user_region_code);
        self.respond_inner(utterance, user_region_code).instrument(span).await
    }

    /// Like [`respond`](Self::respond), rendering data engine failures as a
    /// plain-language service error.
    pub async fn respond_or_error(&self, utterance: &str, user_region_code: &str) -> Result<AnalyticsResponse> {
        match self.respond(utterance, user_region_code).await {
            Err(e) if e.is_data_engine_failure() => {
                warn!("Data engine failure: {}", e);
                Ok(AnalyticsResponse::service_error(&self.state_name(user_region_code)))
            }
            other => other,
        }
    }

    async fn respond_inner(&self, utterance: &str, user_region_code: &str) -> Result<AnalyticsResponse> {
        let state = self.state_name(user_region_code);
        let intent = self.classifier.classify(utterance);
        info!(category = intent.category.as_str(), rule = intent.rule, "classified utterance");

        match intent.category {
            IntentCategory::Conversation => {
                let kind = intent.conversation_kind.unwrap_or(ConversationKind::General);
                let narration = self.narrator.conversation(kind, utterance).await;
                Ok(AnalyticsResponse::message(intent.category, narration, &state, None))
            }
            IntentCategory::OffTopic => Ok(AnalyticsResponse::message(
                intent.category,
                self.narrator.templates().off_topic(),
                &state,
                None,
            )
            .with_suggestions(SUGGESTED_QUERIES)),
            IntentCategory::UnauthorizedAnalytics => {
                let denied = Unauthorized {
                    reason: DenialReason::OutOfScope,
                    requested: None,
                    user_region: user_region_code.to_string(),
                };
                info!("Denied: {}", denied);
                Ok(self.unauthorized_response(&denied, &state, None))
            }
            IntentCategory::Analytics => self.analytics(utterance, user_region_code, &state).await,
        }
    }

    async fn analytics(&self, utterance: &str, user_region_code: &str, state: &str) -> Result<AnalyticsResponse> {
        let descriptor = self.extractor().extract(utterance);

        let scope = match authorize(&descriptor, user_region_code) {
            Ok(scope) => scope,
            Err(denied) => {
                info!("Denied: {}", denied);
                return Ok(self.unauthorized_response(&denied, state, Some(&descriptor)));
            }
        };
        let lgd_scope = Some(scope.effective_region.to_string());

        if descriptor.paired_comparison.is_some() {
            return self.paired(utterance, &descriptor, &scope, state).await;
        }

        let Some(plan) = self.planner.build(&descriptor, &scope) else {
            info!("No indicator recognised, asking for clarification");
            return Ok(AnalyticsResponse::message(
                IntentCategory::Analytics,
                self.narrator.templates().clarification(),
                state,
                lgd_scope,
            )
            .with_parsed_query(&descriptor)
            .with_suggestions(SUGGESTED_QUERIES));
        };
        for note in &plan.notes {
            warn!("Plan adjusted: {}", note);
        }

        let rows = self.execute(&plan).await?;
        let rows = self.display_rows(&plan, &scope, rows);
        info!(rows = rows.len(), "plan executed");

        let region_name = self
            .directory
            .region_name(&scope.effective_region)
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());
        let narration = self.narrator.narrate(utterance, &descriptor, &region_name, &rows).await;

        Ok(self.assemble(&descriptor, &[&plan], &scope, rows, narration, state))
    }

    async fn paired(
        &self,
        utterance: &str,
        descriptor: &QueryDescriptor,
        scope: &AuthorizationScope,
        state: &str,
    ) -> Result<AnalyticsResponse> {
        let legs = self.planner.build_paired(descriptor, scope);

        let mut found = false;
        let mut rows = Vec::with_capacity(legs.len());
        for leg in &legs {
            for note in &leg.plan.notes {
                warn!("Plan adjusted: {}", note);
            }
            let leg_rows = self.execute(&leg.plan).await?;
            found |= !leg_rows.is_empty();
            let value = leg_rows.iter().map(|row| row.value).sum();
            rows.push(ResultRow::labelled(leg.label.clone(), value));
        }
        // a side with no rows reads as zero unless both are empty
        if !found {
            rows.clear();
        }
        info!(legs = legs.len(), rows = rows.len(), "paired plans executed");

        let region_name = self
            .directory
            .region_name(&scope.effective_region)
            .unwrap_or_else(|| UNKNOWN_REGION.to_string());
        let narration = self.narrator.narrate(utterance, descriptor, &region_name, &rows).await;

        let plans: Vec<&QueryPlan> = legs.iter().map(|leg| &leg.plan).collect();
        Ok(self.assemble(descriptor, &plans, scope, rows, narration, state))
    }

    async fn execute(&self, plan: &QueryPlan) -> Result<Vec<ResultRow>> {
        match tokio::time::timeout(self.execution_timeout, self.executor.execute(plan)).await {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Timeout(
                self.execution_timeout.as_millis() as u64,
                format!("{} query execution", self.executor.name()),
            )),
        }
    }

    /// Replace region codes in group labels with names.
    fn display_rows(&self, plan: &QueryPlan, scope: &AuthorizationScope, rows: Vec<ResultRow>) -> Vec<ResultRow> {
        let level = [RegionLevel::State, RegionLevel::District]
            .into_iter()
            .find(|level| plan.group_by_column.as_deref() == Some(level.column()));
        let Some(level) = level else {
            return rows;
        };
        rows.into_iter()
            .map(|row| ResultRow {
                label: row
                    .label
                    .map(|raw| self.directory.label_for(level, &raw, &scope.effective_region)),
                value: row.value,
            })
            .collect()
    }

    fn assemble(
        &self,
        descriptor: &QueryDescriptor,
        plans: &[&QueryPlan],
        scope: &AuthorizationScope,
        rows: Vec<ResultRow>,
        narration: String,
        state: &str,
    ) -> AnalyticsResponse {
        let intent = IntentCategory::Analytics;
        let chart_type = choose_chart_type(intent, descriptor, &rows);
        let title = chart_title(descriptor, plans.iter().any(|plan| plan.is_grouped()));
        let unit = descriptor
            .indicator
            .map(|i| i.meta().unit.to_string())
            .unwrap_or_default();

        let record_count = rows.len();
        let (labels, values): (Vec<String>, Vec<f64>) = rows
            .into_iter()
            .map(|row| (row.label.unwrap_or_else(|| "Total".to_string()), row.value))
            .unzip();

        AnalyticsResponse {
            title: title.clone(),
            narration,
            chart_data: ChartPayload {
                chart_type,
                title,
                labels,
                values,
                unit,
                metadata: ChartMetadata {
                    intent_type: intent,
                    lgd_scope: Some(scope.effective_region.to_string()),
                    record_count,
                    parsed_query: Some(descriptor.clone()),
                    data_query: Some(DataQuery::from_plans(plans)),
                },
            },
            metadata: ResponseMetadata {
                intent_type: intent,
                source: Some(self.executor.name().to_string()),
                state: state.to_string(),
                timestamp: crate::response::timestamp(),
                error: false,
                suggestions: Vec::new(),
            },
        }
    }

    fn unauthorized_response(
        &self,
        denied: &Unauthorized,
        state: &str,
        descriptor: Option<&QueryDescriptor>,
    ) -> AnalyticsResponse {
        let mut response = AnalyticsResponse::message(
            IntentCategory::UnauthorizedAnalytics,
            self.narrator.templates().unauthorized(denied.message()),
            state,
            RegionCode::parse(user_region_or_empty(denied)).ok().map(|c| c.to_string()),
        );
        if let Some(descriptor) = descriptor {
            response = response.with_parsed_query(descriptor);
        }
        response
    }

    fn state_name(&self, user_region_code: &str) -> String {
        RegionCode::parse(user_region_code)
            .ok()
            .and_then(|code| self.directory.state_name(code.state_code()).map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_REGION.to_string())
    }
}

fn user_region_or_empty(denied: &Unauthorized) -> &str {
    match denied.reason {
        DenialReason::InvalidUserRegion => "",
        DenialReason::OutOfScope => &denied.user_region,
    }
}

fn chart_title(descriptor: &QueryDescriptor, grouped: bool) -> String {
    let Some(indicator) = descriptor.indicator else {
        return crate::response::ASSISTANT_TITLE.to_string();
    };
    let mut title = match descriptor.paired_comparison {
        Some(paired) => paired.title().to_string(),
        None => indicator.meta().title.to_string(),
    };
    if let (Some(dimension), true) = (descriptor.dimension, grouped) {
        title.push_str(&format!(" by {}", dimension.title()));
    }
    if let Some(filters) = descriptor.filter_summary() {
        title.push_str(&format!(" ({})", filters));
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Dimension, Indicator, PairedComparison, Season};

    fn title_for(descriptor: &QueryDescriptor) -> String {
        let scope = authorize(descriptor, "27").unwrap();
        let plan = QueryPlanBuilder::new().build(descriptor, &scope).unwrap();
        chart_title(descriptor, plan.is_grouped())
    }

    #[test]
    fn test_chart_title() {
        let descriptor = QueryDescriptor::new(Indicator::FallowArea)
            .with_dimension(Dimension::District)
            .with_season(Season::Rabi);
        assert_eq!(title_for(&descriptor), "Fallow Area by District (Rabi)");
    }

    #[test]
    fn test_chart_title_omits_dropped_grouping() {
        let descriptor = QueryDescriptor::new(Indicator::FallowArea).with_dimension(Dimension::Crop);
        assert_eq!(title_for(&descriptor), "Fallow Area");
    }

    #[test]
    fn test_paired_chart_title() {
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount)
            .with_paired(PairedComparison::RabiVsKharif)
            .with_year(crate::intent::descriptor::YearFilter::Single { year: 2023 });
        assert!(title_for(&descriptor).starts_with("Rabi vs Kharif ("));
    }
}
