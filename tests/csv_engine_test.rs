use agristack_analytics::execution::{CsvEngine, QueryExecutor, ResultRow};
use agristack_analytics::intent::{QueryDescriptor, YearFilter};
use agristack_analytics::lexicon::{Dimension, Indicator, RankOrder, Season};
use agristack_analytics::narration::Narrator;
use agristack_analytics::query_plan::{QueryPlan, QueryPlanBuilder};
use agristack_analytics::region::{RegionCode, RegionDirectory};
use agristack_analytics::response::ChartType;
use agristack_analytics::security::authorize;
use agristack_analytics::{AnalyticsAssistant, AnalyticsError};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Write crop_area_data.csv into a fresh temp directory.
fn create_test_data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = std::env::temp_dir().join(format!("agristack_csv_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&data_dir)?;

    let mut crop_area = df! [
        "state_lgd_code" => ["27", "27", "27", "27", "27", "09"],
        "district_lgd_code" => ["490", "490", "516", "516", "482", "490"],
        "sub_district_lgd_code" => ["4201", "4202", "4301", "4301", "4101", "900"],
        "village_lgd_code" => ["1", "2", "3", "4", "5", "6"],
        "crop_name_eng" => ["Wheat", "Rice", "Rice", "Wheat", "Rice", "Wheat"],
        "season" => ["Rabi", "Kharif", "Kharif", "Kharif", "Kharif", "Rabi"],
        "year" => ["2023-2024", "2023-2024", "2023-2024", "2022-2023", "2023-2024", "2023-2024"],
        "irrigation_source" => ["Canal", "Well", "Well", "Canal", "Rainfed", "Canal"],
        "crop_area_approved" => [100.5, 200.0, 300.0, 50.0, 80.0, 1000.0],
        "crop_area_closed" => [120.5, 250.0, 300.0, 60.0, 100.0, 1000.0],
        "no_of_farmers" => [10i64, 20, 30, 5, 8, 100]
    ]?;

    let mut file = fs::File::create(data_dir.join("crop_area_data.csv"))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut crop_area)?;
    Ok(data_dir)
}

fn plan_for(descriptor: &QueryDescriptor, user_region: &str) -> QueryPlan {
    let scope = authorize(descriptor, user_region).unwrap();
    QueryPlanBuilder::new().build(descriptor, &scope).unwrap()
}

#[tokio::test]
async fn test_ungrouped_total() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let plan = plan_for(&QueryDescriptor::new(Indicator::FarmerCount), "27");
    let rows = engine.execute(&plan).await.unwrap();
    assert_eq!(rows, vec![ResultRow::total(73.0)]);

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_grouped_ranking_with_filters() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let descriptor = QueryDescriptor::new(Indicator::CultivatedArea)
        .with_dimension(Dimension::District)
        .with_season(Season::Kharif)
        .with_year(YearFilter::Single { year: 2023 })
        .with_top_n(2);
    let rows = engine.execute(&plan_for(&descriptor, "27")).await.unwrap();
    assert_eq!(
        rows,
        vec![ResultRow::labelled("516", 300.0), ResultRow::labelled("490", 200.0)]
    );

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_lowest_ranking() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let mut descriptor = QueryDescriptor::new(Indicator::CultivatedArea)
        .with_dimension(Dimension::District)
        .with_top_n(1);
    descriptor.rank_order = RankOrder::Lowest;
    let rows = engine.execute(&plan_for(&descriptor, "27")).await.unwrap();
    assert_eq!(rows, vec![ResultRow::labelled("482", 80.0)]);

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_crop_filter_is_case_insensitive() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let descriptor = QueryDescriptor::new(Indicator::CultivatedArea).with_crop("WHEAT");
    let rows = engine.execute(&plan_for(&descriptor, "27")).await.unwrap();
    assert_eq!(rows, vec![ResultRow::total(150.5)]);

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_year_range_and_region_codes() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let descriptor = QueryDescriptor::new(Indicator::CultivatedArea)
        .with_year(YearFilter::Range { start: 2022, end: 2024 });
    let rows = engine.execute(&plan_for(&descriptor, "27")).await.unwrap();
    assert_eq!(rows, vec![ResultRow::total(730.5)]);

    // leading zero of the state code survives the CSV read
    let rows = engine
        .execute(&plan_for(&QueryDescriptor::new(Indicator::CultivatedArea), "09"))
        .await
        .unwrap();
    assert_eq!(rows, vec![ResultRow::total(1000.0)]);

    // district 490 also exists in state 09; only the Maharashtra rows count
    let descriptor = QueryDescriptor::new(Indicator::FarmerCount).with_region(RegionCode::parse("27490").unwrap());
    let rows = engine.execute(&plan_for(&descriptor, "27")).await.unwrap();
    assert_eq!(rows, vec![ResultRow::total(30.0)]);
    let rows = engine.execute(&plan_for(&QueryDescriptor::new(Indicator::FarmerCount), "27490")).await.unwrap();
    assert_eq!(rows, vec![ResultRow::total(30.0)]);

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_pending_validation_is_closed_minus_approved() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let rows = engine
        .execute(&plan_for(&QueryDescriptor::new(Indicator::PendingValidation), "27"))
        .await
        .unwrap();
    assert_eq!(rows, vec![ResultRow::total(100.0)]);

    let by_district = QueryDescriptor::new(Indicator::PendingValidation).with_dimension(Dimension::District);
    let rows = engine.execute(&plan_for(&by_district, "27")).await.unwrap();
    assert_eq!(
        rows,
        vec![
            ResultRow::labelled("490", 70.0),
            ResultRow::labelled("482", 20.0),
            ResultRow::labelled("516", 10.0),
        ]
    );

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_no_matching_rows_is_empty() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let descriptor = QueryDescriptor::new(Indicator::CultivatedArea).with_season(Season::Summer);
    assert!(engine.execute(&plan_for(&descriptor, "27")).await.unwrap().is_empty());

    let grouped = descriptor.with_dimension(Dimension::District);
    assert!(engine.execute(&plan_for(&grouped, "27")).await.unwrap().is_empty());

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_missing_table_is_execution_error() {
    let data_dir = create_test_data_dir().unwrap();
    let engine = CsvEngine::new(data_dir.clone());

    let plan = plan_for(&QueryDescriptor::new(Indicator::FallowArea), "27");
    let err = engine.execute(&plan).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::Execution(_)));
    assert!(err.is_data_engine_failure());

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_end_to_end_ranking_over_csv() {
    let data_dir = create_test_data_dir().unwrap();
    let directory = RegionDirectory::builtin()
        .with_district("27", "490", "Pune")
        .unwrap()
        .with_district("27", "516", "Nashik")
        .unwrap()
        .with_district("27", "482", "Mumbai")
        .unwrap();
    let assistant = AnalyticsAssistant::new(
        directory,
        Arc::new(CsvEngine::new(data_dir.clone())),
        Narrator::template_only(),
        Duration::from_secs(30),
    );

    let response = assistant
        .respond("top 2 districts by cultivated area in kharif 2023", "27")
        .await
        .unwrap();
    assert_eq!(response.chart_data.labels, vec!["Nashik", "Pune"]);
    assert_eq!(response.chart_data.values, vec![300.0, 200.0]);
    assert_eq!(response.chart_data.chart_type, ChartType::MultiKpi);
    assert_eq!(response.chart_data.unit, "Hectares");
    assert!(response.narration.contains("Nashik comes first"));
    assert_eq!(response.metadata.source.as_deref(), Some("csv"));
    assert_eq!(response.metadata.state, "Maharashtra");

    let data_query = response.chart_data.metadata.data_query.unwrap();
    assert_eq!(data_query.table, "crop_area_data");
    assert_eq!(data_query.group_by.as_deref(), Some("district_lgd_code"));
    assert!(data_query.sql_preview.contains("LIMIT 2"));

    let response = assistant.respond("How many farmers are there in total?", "27").await.unwrap();
    assert_eq!(response.chart_data.chart_type, ChartType::Kpi);
    assert_eq!(response.chart_data.values, vec![73.0]);
    assert!(response.chart_data.metadata.data_query.unwrap().group_by.is_none());

    fs::remove_dir_all(&data_dir).ok();
}

#[tokio::test]
async fn test_end_to_end_paired_comparison_over_csv() {
    let data_dir = create_test_data_dir().unwrap();
    let assistant = AnalyticsAssistant::new(
        RegionDirectory::builtin(),
        Arc::new(CsvEngine::new(data_dir.clone())),
        Narrator::template_only(),
        Duration::from_secs(30),
    );

    let response = assistant.respond("approved vs closed area", "27").await.unwrap();
    assert_eq!(response.chart_data.chart_type, ChartType::MultiKpi);
    assert_eq!(response.chart_data.labels, vec!["Closed Crop Area", "Approved Crop Area"]);
    assert_eq!(response.chart_data.values, vec![830.5, 730.5]);
    assert_eq!(response.chart_data.title, "Closed vs Approved Crop Area");
    assert!(response.narration.contains("Approved Crop Area covers"));
    let data_query = response.chart_data.metadata.data_query.unwrap();
    assert_eq!(data_query.table, "crop_area_data");
    assert_eq!(data_query.column, "crop_area_closed, crop_area_approved");

    let response = assistant.respond("compare rabi and kharif cultivated area", "27").await.unwrap();
    assert_eq!(response.chart_data.labels, vec!["Rabi", "Kharif"]);
    assert_eq!(response.chart_data.values, vec![100.5, 630.0]);

    fs::remove_dir_all(&data_dir).ok();
}
