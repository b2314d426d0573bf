//! Lexicon / Synonym Tables
//!
//! Static mappings from natural-language terms to canonical domain concepts
//! (indicators, dimensions, crops, seasons, comparison keywords).
//!
//! Every table is built once and is read-only afterwards. Tables are ordered
//! longest-match-first: more words first, then more characters, then
//! registration order. A specific multi-word synonym therefore always shadows
//! a generic single word ("irrigated area" before "area").

use crate::region::RegionLevel;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Normalize an utterance for matching.
///
/// Lower case, apostrophes dropped, punctuation other than `-` and `/`
/// replaced by spaces, whitespace collapsed.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| match c {
            '–' | '—' => '-',
            c if c.is_alphanumeric() || c == '-' || c == '/' => c,
            _ => ' ',
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-term match on a normalized utterance. A term never matches inside a
/// longer word ("gram" does not match "program").
pub fn contains_term(normalized: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let haystack = format!(" {} ", normalized);
    haystack.contains(&format!(" {} ", term))
}

/// Ordered synonym table: the first entry whose term occurs wins.
#[derive(Debug, Clone)]
pub struct SynonymTable<T: Copy> {
    entries: Vec<(&'static str, T)>,
}

impl<T: Copy> SynonymTable<T> {
    pub fn new(entries: &[(&'static str, T)]) -> Self {
        let mut entries = entries.to_vec();
        // sort_by is stable, so equal weights keep registration order
        entries.sort_by(|a, b| term_weight(b.0).cmp(&term_weight(a.0)));
        Self { entries }
    }

    /// First (longest) matching term and its canonical value.
    pub fn resolve(&self, normalized: &str) -> Option<(&'static str, T)> {
        self.entries
            .iter()
            .find(|(term, _)| contains_term(normalized, term))
            .copied()
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.resolve(normalized).is_some()
    }

    pub fn terms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(term, _)| *term)
    }

    pub fn entries(&self) -> &[(&'static str, T)] {
        &self.entries
    }
}

fn term_weight(term: &str) -> (usize, usize) {
    (term.split_whitespace().count(), term.chars().count())
}

/// Backing tables of the survey dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTable {
    CropArea,
    AggregateSummary,
    CultivatedSummary,
}

const COMMON_COLUMNS: &[&str] = &[
    "state_lgd_code",
    "district_lgd_code",
    "sub_district_lgd_code",
    "village_lgd_code",
    "season",
    "year",
];

impl DataTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            DataTable::CropArea => "crop_area_data",
            DataTable::AggregateSummary => "aggregate_summary_data",
            DataTable::CultivatedSummary => "cultivated_summary_data",
        }
    }

    /// Whether this table carries a filter/grouping column.
    pub fn has_column(&self, column: &str) -> bool {
        if COMMON_COLUMNS.contains(&column) {
            return true;
        }
        match self {
            DataTable::CropArea => matches!(column, "crop_name_eng" | "irrigation_source"),
            DataTable::AggregateSummary | DataTable::CultivatedSummary => false,
        }
    }
}

/// Static description of how an indicator is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorMeta {
    pub table: DataTable,
    pub column: &'static str,
    /// Derived measures sum `column - subtract` per row.
    pub subtract: Option<&'static str>,
    pub title: &'static str,
    pub unit: &'static str,
}

/// The numeric quantity a question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    CultivatedArea,
    ClosedCropArea,
    PendingValidation,
    FarmerCount,
    CropPlotCount,
    PlotCount,
    AssignedPlots,
    SurveyedPlots,
    UnsurveyedPlots,
    SurveysApproved,
    SurveysUnderReview,
    SurveyorCount,
    TodaySurveys,
    SurveyedArea,
    SurveyableArea,
    FallowArea,
    NonAgriculturalArea,
    HarvestedArea,
    IrrigatedArea,
    UnirrigatedArea,
    PerennialArea,
    BiennialArea,
    SeasonalArea,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::CultivatedArea => "cultivated_area",
            Indicator::ClosedCropArea => "closed_crop_area",
            Indicator::PendingValidation => "pending_validation",
            Indicator::FarmerCount => "farmer_count",
            Indicator::CropPlotCount => "crop_plot_count",
            Indicator::PlotCount => "plot_count",
            Indicator::AssignedPlots => "assigned_plots",
            Indicator::SurveyedPlots => "surveyed_plots",
            Indicator::UnsurveyedPlots => "unsurveyed_plots",
            Indicator::SurveysApproved => "surveys_approved",
            Indicator::SurveysUnderReview => "surveys_under_review",
            Indicator::SurveyorCount => "surveyor_count",
            Indicator::TodaySurveys => "today_surveys",
            Indicator::SurveyedArea => "surveyed_area",
            Indicator::SurveyableArea => "surveyable_area",
            Indicator::FallowArea => "fallow_area",
            Indicator::NonAgriculturalArea => "na_area",
            Indicator::HarvestedArea => "harvested_area",
            Indicator::IrrigatedArea => "irrigated_area",
            Indicator::UnirrigatedArea => "unirrigated_area",
            Indicator::PerennialArea => "perennial_area",
            Indicator::BiennialArea => "biennial_area",
            Indicator::SeasonalArea => "seasonal_area",
        }
    }

    /// Indicator → (table, value column) lookup. One entry per indicator.
    pub fn meta(&self) -> IndicatorMeta {
        use DataTable::*;
        let (table, column, title, unit) = match self {
            Indicator::CultivatedArea => (CropArea, "crop_area_approved", "Approved Crop Area", "Hectares"),
            Indicator::ClosedCropArea => (CropArea, "crop_area_closed", "Closed Crop Area", "Hectares"),
            Indicator::PendingValidation => (CropArea, "crop_area_closed", "Crop Area Pending Validation", "Hectares"),
            Indicator::FarmerCount => (CropArea, "no_of_farmers", "Registered Farmers", "Farmers"),
            Indicator::CropPlotCount => (CropArea, "no_of_plots", "Crop Plots Recorded", "Plots"),
            Indicator::PlotCount => (AggregateSummary, "total_plots", "Total Plots", "Plots"),
            Indicator::AssignedPlots => (AggregateSummary, "total_assigned_plots", "Plots Assigned for Survey", "Plots"),
            Indicator::SurveyedPlots => (AggregateSummary, "total_plots_surveyed", "Plots Surveyed", "Plots"),
            Indicator::UnsurveyedPlots => (AggregateSummary, "total_plots_unable_to_survey", "Plots Unable to Survey", "Plots"),
            Indicator::SurveysApproved => (AggregateSummary, "total_survey_approved", "Surveys Approved", "Surveys"),
            Indicator::SurveysUnderReview => (AggregateSummary, "total_survey_under_review", "Surveys Under Review", "Surveys"),
            Indicator::SurveyorCount => (AggregateSummary, "total_no_of_surveyors", "Number of Surveyors", "Surveyors"),
            Indicator::TodaySurveys => (AggregateSummary, "total_today_survey", "Today's Survey Count", "Surveys"),
            Indicator::SurveyedArea => (CultivatedSummary, "total_surveyed_area", "Total Surveyed Area", "Hectares"),
            Indicator::SurveyableArea => (CultivatedSummary, "total_surveyable_area", "Total Surveyable Area", "Hectares"),
            Indicator::FallowArea => (CultivatedSummary, "total_fallow_area", "Fallow Area", "Hectares"),
            Indicator::NonAgriculturalArea => (CultivatedSummary, "total_na_area", "NA Area", "Hectares"),
            Indicator::HarvestedArea => (CultivatedSummary, "total_harvested_area", "Harvested Area", "Hectares"),
            Indicator::IrrigatedArea => (CultivatedSummary, "total_irrigated_area", "Irrigated Area", "Hectares"),
            Indicator::UnirrigatedArea => (CultivatedSummary, "total_unirrigated_area", "Unirrigated Area", "Hectares"),
            Indicator::PerennialArea => (CultivatedSummary, "total_perennial_crop_area", "Perennial Crop Area", "Hectares"),
            Indicator::BiennialArea => (CultivatedSummary, "total_biennial_crop_area", "Biennial Crop Area", "Hectares"),
            Indicator::SeasonalArea => (CultivatedSummary, "total_seasonal_crop_area", "Seasonal Crop Area", "Hectares"),
        };
        // closed but not yet approved
        let subtract = match self {
            Indicator::PendingValidation => Some("crop_area_approved"),
            _ => None,
        };
        IndicatorMeta {
            table,
            column,
            subtract,
            title,
            unit,
        }
    }

    /// Count-like indicators are narrated without decimals.
    pub fn is_count(&self) -> bool {
        self.meta().unit != "Hectares"
    }
}

/// The grouping axis of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    State,
    District,
    SubDistrict,
    Village,
    Crop,
    Season,
    Year,
    IrrigationSource,
}

impl Dimension {
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::State => "state_lgd_code",
            Dimension::District => "district_lgd_code",
            Dimension::SubDistrict => "sub_district_lgd_code",
            Dimension::Village => "village_lgd_code",
            Dimension::Crop => "crop_name_eng",
            Dimension::Season => "season",
            Dimension::Year => "year",
            Dimension::IrrigationSource => "irrigation_source",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::State => "State",
            Dimension::District => "District",
            Dimension::SubDistrict => "Sub-District",
            Dimension::Village => "Village",
            Dimension::Crop => "Crop",
            Dimension::Season => "Season",
            Dimension::Year => "Year",
            Dimension::IrrigationSource => "Irrigation Source",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Dimension::State => "states",
            Dimension::District => "districts",
            Dimension::SubDistrict => "sub-districts",
            Dimension::Village => "villages",
            Dimension::Crop => "crops",
            Dimension::Season => "seasons",
            Dimension::Year => "years",
            Dimension::IrrigationSource => "irrigation sources",
        }
    }

    /// Region hierarchy level this dimension groups by, if any. Villages sit
    /// below the coded hierarchy and are treated as plain labels.
    pub fn region_level(&self) -> Option<RegionLevel> {
        match self {
            Dimension::State => Some(RegionLevel::State),
            Dimension::District => Some(RegionLevel::District),
            Dimension::SubDistrict => Some(RegionLevel::SubDistrict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Kharif,
    Rabi,
    Summer,
    Zaid,
}

impl Season {
    /// Value as stored in the `season` column.
    pub fn label(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Summer => "Summer",
            Season::Zaid => "Zaid",
        }
    }
}

/// Direction of a ranking question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Highest,
    Lowest,
}

/// Two measures set side by side ("irrigated vs unirrigated").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairedComparison {
    IrrigatedVsUnirrigated,
    AssignedVsSurveyed,
    ApprovedVsClosed,
    SurveyableVsSurveyed,
    RabiVsKharif,
    FallowVsCultivated,
}

/// One side of a paired comparison: a measure, optionally pinned to a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonSide {
    pub label: &'static str,
    pub indicator: Indicator,
    pub season: Option<Season>,
}

impl ComparisonSide {
    fn of(indicator: Indicator) -> Self {
        Self {
            label: indicator.meta().title,
            indicator,
            season: None,
        }
    }
}

impl PairedComparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairedComparison::IrrigatedVsUnirrigated => "irrigated_vs_unirrigated",
            PairedComparison::AssignedVsSurveyed => "assigned_vs_surveyed",
            PairedComparison::ApprovedVsClosed => "approved_vs_closed",
            PairedComparison::SurveyableVsSurveyed => "surveyable_vs_surveyed",
            PairedComparison::RabiVsKharif => "rabi_vs_kharif",
            PairedComparison::FallowVsCultivated => "fallow_vs_cultivated",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PairedComparison::IrrigatedVsUnirrigated => "Irrigated vs Unirrigated Area",
            PairedComparison::AssignedVsSurveyed => "Assigned vs Surveyed Plots",
            PairedComparison::ApprovedVsClosed => "Closed vs Approved Crop Area",
            PairedComparison::SurveyableVsSurveyed => "Surveyable vs Surveyed Area",
            PairedComparison::RabiVsKharif => "Rabi vs Kharif",
            PairedComparison::FallowVsCultivated => "Fallow vs Cultivated Area",
        }
    }

    /// The second side is a subset of the first (surveyed plots out of
    /// assigned plots); otherwise the two sides split a whole.
    pub fn is_coverage(&self) -> bool {
        matches!(
            self,
            PairedComparison::AssignedVsSurveyed
                | PairedComparison::ApprovedVsClosed
                | PairedComparison::SurveyableVsSurveyed
        )
    }

    /// Both sides. A season comparison measures `indicator` (cultivated area
    /// when none was named); the other pairs fix their own measures.
    pub fn sides(&self, indicator: Option<Indicator>) -> [ComparisonSide; 2] {
        use Indicator::*;
        match self {
            PairedComparison::IrrigatedVsUnirrigated => {
                [ComparisonSide::of(IrrigatedArea), ComparisonSide::of(UnirrigatedArea)]
            }
            PairedComparison::AssignedVsSurveyed => {
                [ComparisonSide::of(AssignedPlots), ComparisonSide::of(SurveyedPlots)]
            }
            PairedComparison::ApprovedVsClosed => {
                [ComparisonSide::of(ClosedCropArea), ComparisonSide::of(CultivatedArea)]
            }
            PairedComparison::SurveyableVsSurveyed => {
                [ComparisonSide::of(SurveyableArea), ComparisonSide::of(SurveyedArea)]
            }
            PairedComparison::FallowVsCultivated => {
                [ComparisonSide::of(FallowArea), ComparisonSide::of(CultivatedArea)]
            }
            PairedComparison::RabiVsKharif => {
                let indicator = indicator.unwrap_or(CultivatedArea);
                [Season::Rabi, Season::Kharif].map(|season| ComparisonSide {
                    label: season.label(),
                    indicator,
                    season: Some(season),
                })
            }
        }
    }
}

/// Comparison keyword kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKeyword {
    Rank(RankOrder),
    Trend,
}

lazy_static! {
    pub static ref INDICATOR_SYNONYMS: SynonymTable<Indicator> = SynonymTable::new(&[
        ("cultivated area", Indicator::CultivatedArea),
        ("cultivation area", Indicator::CultivatedArea),
        ("area under cultivation", Indicator::CultivatedArea),
        ("cultivated land", Indicator::CultivatedArea),
        ("crop area", Indicator::CultivatedArea),
        ("approved crop area", Indicator::CultivatedArea),
        ("approved area", Indicator::CultivatedArea),
        ("sown area", Indicator::CultivatedArea),
        ("area sown", Indicator::CultivatedArea),
        ("closed crop area", Indicator::ClosedCropArea),
        ("crop area closed", Indicator::ClosedCropArea),
        ("closed area", Indicator::ClosedCropArea),
        ("closed crop", Indicator::ClosedCropArea),
        ("pending validation", Indicator::PendingValidation),
        ("validation pending", Indicator::PendingValidation),
        ("under validation", Indicator::PendingValidation),
        ("pending approval", Indicator::PendingValidation),
        ("awaiting approval", Indicator::PendingValidation),
        ("not approved", Indicator::PendingValidation),
        ("not yet approved", Indicator::PendingValidation),
        ("number of farmers", Indicator::FarmerCount),
        ("how many farmers", Indicator::FarmerCount),
        ("registered farmers", Indicator::FarmerCount),
        ("total farmers", Indicator::FarmerCount),
        ("farmer count", Indicator::FarmerCount),
        ("crop plots", Indicator::CropPlotCount),
        ("plots recorded", Indicator::CropPlotCount),
        ("cropped plots", Indicator::CropPlotCount),
        ("total plots", Indicator::PlotCount),
        ("number of plots", Indicator::PlotCount),
        ("plot count", Indicator::PlotCount),
        ("all plots", Indicator::PlotCount),
        ("assigned plots", Indicator::AssignedPlots),
        ("plots assigned", Indicator::AssignedPlots),
        ("assigned for survey", Indicator::AssignedPlots),
        ("plots surveyed", Indicator::SurveyedPlots),
        ("surveyed plots", Indicator::SurveyedPlots),
        ("survey progress", Indicator::SurveyedPlots),
        ("survey status", Indicator::SurveyedPlots),
        ("survey completed", Indicator::SurveyedPlots),
        ("surveys completed", Indicator::SurveyedPlots),
        ("surveyed so far", Indicator::SurveyedPlots),
        ("unable to survey", Indicator::UnsurveyedPlots),
        ("plots not surveyed", Indicator::UnsurveyedPlots),
        ("not surveyed", Indicator::UnsurveyedPlots),
        ("unsurveyed plots", Indicator::UnsurveyedPlots),
        ("approved surveys", Indicator::SurveysApproved),
        ("surveys approved", Indicator::SurveysApproved),
        ("survey approved", Indicator::SurveysApproved),
        ("survey approval", Indicator::SurveysApproved),
        ("under review", Indicator::SurveysUnderReview),
        ("pending review", Indicator::SurveysUnderReview),
        ("surveys pending", Indicator::SurveysUnderReview),
        ("number of surveyors", Indicator::SurveyorCount),
        ("surveyor count", Indicator::SurveyorCount),
        ("today survey", Indicator::TodaySurveys),
        ("todays survey", Indicator::TodaySurveys),
        ("todays surveys", Indicator::TodaySurveys),
        ("surveys today", Indicator::TodaySurveys),
        ("surveyed today", Indicator::TodaySurveys),
        ("todays count", Indicator::TodaySurveys),
        ("daily survey", Indicator::TodaySurveys),
        ("daily surveys", Indicator::TodaySurveys),
        ("total surveyed area", Indicator::SurveyedArea),
        ("surveyed agricultural area", Indicator::SurveyedArea),
        ("surveyed area", Indicator::SurveyedArea),
        ("survey area", Indicator::SurveyedArea),
        ("agricultural area", Indicator::SurveyedArea),
        ("survey summary", Indicator::SurveyedArea),
        ("surveyable area", Indicator::SurveyableArea),
        ("fallow area", Indicator::FallowArea),
        ("fallow land", Indicator::FallowArea),
        ("na area", Indicator::NonAgriculturalArea),
        ("non agricultural area", Indicator::NonAgriculturalArea),
        ("non-agricultural area", Indicator::NonAgriculturalArea),
        ("non agricultural land", Indicator::NonAgriculturalArea),
        ("non-agricultural land", Indicator::NonAgriculturalArea),
        ("harvested area", Indicator::HarvestedArea),
        ("harvest area", Indicator::HarvestedArea),
        ("irrigated area", Indicator::IrrigatedArea),
        ("irrigated land", Indicator::IrrigatedArea),
        ("irrigation area", Indicator::IrrigatedArea),
        ("unirrigated area", Indicator::UnirrigatedArea),
        ("unirrigated land", Indicator::UnirrigatedArea),
        ("rainfed area", Indicator::UnirrigatedArea),
        ("perennial crop area", Indicator::PerennialArea),
        ("perennial crops", Indicator::PerennialArea),
        ("biennial crop area", Indicator::BiennialArea),
        ("biennial crops", Indicator::BiennialArea),
        ("biennial crop", Indicator::BiennialArea),
        ("seasonal crop area", Indicator::SeasonalArea),
        ("seasonal crops", Indicator::SeasonalArea),
        // generic single words, shadowed by everything above
        ("farmers", Indicator::FarmerCount),
        ("farmer", Indicator::FarmerCount),
        ("surveyors", Indicator::SurveyorCount),
        ("surveyor", Indicator::SurveyorCount),
        ("unsurveyed", Indicator::UnsurveyedPlots),
        ("surveyable", Indicator::SurveyableArea),
        ("fallow", Indicator::FallowArea),
        ("uncultivated", Indicator::FallowArea),
        ("harvested", Indicator::HarvestedArea),
        ("unirrigated", Indicator::UnirrigatedArea),
        ("rainfed", Indicator::UnirrigatedArea),
        ("irrigated", Indicator::IrrigatedArea),
        ("irrigation", Indicator::IrrigatedArea),
        ("perennial", Indicator::PerennialArea),
        ("biennial", Indicator::BiennialArea),
        ("seasonal", Indicator::SeasonalArea),
        ("plots", Indicator::PlotCount),
        ("hectares", Indicator::CultivatedArea),
        ("acreage", Indicator::CultivatedArea),
        ("cultivated", Indicator::CultivatedArea),
        ("cultivation", Indicator::CultivatedArea),
        ("area", Indicator::CultivatedArea),
    ]);

    pub static ref DIMENSION_SYNONYMS: SynonymTable<Dimension> = SynonymTable::new(&[
        ("district-wise", Dimension::District),
        ("district wise", Dimension::District),
        ("districtwise", Dimension::District),
        ("by district", Dimension::District),
        ("each district", Dimension::District),
        ("per district", Dimension::District),
        ("which district", Dimension::District),
        ("which districts", Dimension::District),
        ("across districts", Dimension::District),
        ("districts", Dimension::District),
        ("state-wise", Dimension::State),
        ("state wise", Dimension::State),
        ("by state", Dimension::State),
        ("each state", Dimension::State),
        ("per state", Dimension::State),
        ("taluka-wise", Dimension::SubDistrict),
        ("taluka wise", Dimension::SubDistrict),
        ("tehsil-wise", Dimension::SubDistrict),
        ("by taluka", Dimension::SubDistrict),
        ("by tehsil", Dimension::SubDistrict),
        ("by sub-district", Dimension::SubDistrict),
        ("talukas", Dimension::SubDistrict),
        ("tehsils", Dimension::SubDistrict),
        ("sub-districts", Dimension::SubDistrict),
        ("village-wise", Dimension::Village),
        ("village wise", Dimension::Village),
        ("by village", Dimension::Village),
        ("each village", Dimension::Village),
        ("per village", Dimension::Village),
        ("villages", Dimension::Village),
        ("crop-wise", Dimension::Crop),
        ("crop wise", Dimension::Crop),
        ("cropwise", Dimension::Crop),
        ("by crop", Dimension::Crop),
        ("each crop", Dimension::Crop),
        ("per crop", Dimension::Crop),
        ("which crops", Dimension::Crop),
        ("which crop", Dimension::Crop),
        ("top crops", Dimension::Crop),
        ("crops", Dimension::Crop),
        ("season-wise", Dimension::Season),
        ("season wise", Dimension::Season),
        ("seasonwise", Dimension::Season),
        ("by season", Dimension::Season),
        ("each season", Dimension::Season),
        ("per season", Dimension::Season),
        ("which season", Dimension::Season),
        ("seasons", Dimension::Season),
        ("year-wise", Dimension::Year),
        ("year wise", Dimension::Year),
        ("yearwise", Dimension::Year),
        ("by year", Dimension::Year),
        ("each year", Dimension::Year),
        ("per year", Dimension::Year),
        ("which year", Dimension::Year),
        ("yearly", Dimension::Year),
        ("annual", Dimension::Year),
        ("annually", Dimension::Year),
        ("years", Dimension::Year),
        ("irrigation source", Dimension::IrrigationSource),
        ("irrigation sources", Dimension::IrrigationSource),
        ("source of irrigation", Dimension::IrrigationSource),
        ("water source", Dimension::IrrigationSource),
        ("by irrigation", Dimension::IrrigationSource),
        ("irrigation-wise", Dimension::IrrigationSource),
        ("irrigation wise", Dimension::IrrigationSource),
    ]);

    /// Crop synonyms → canonical `crop_name_eng` value.
    pub static ref CROP_SYNONYMS: SynonymTable<&'static str> = SynonymTable::new(&[
        ("wheat", "Wheat"),
        ("rice", "Rice"),
        ("paddy", "Rice"),
        ("maize", "Maize"),
        ("corn", "Maize"),
        ("sorghum", "Jowar"),
        ("jowar", "Jowar"),
        ("bajra", "Bajra"),
        ("pearl millet", "Bajra"),
        ("ragi", "Ragi"),
        ("finger millet", "Ragi"),
        ("barley", "Barley"),
        ("oats", "Oats"),
        ("chickpea", "Gram"),
        ("chana", "Gram"),
        ("gram", "Gram"),
        ("green gram", "Moong"),
        ("moong", "Moong"),
        ("black gram", "Urad"),
        ("urad", "Urad"),
        ("pigeon pea", "Tur"),
        ("arhar", "Tur"),
        ("tur", "Tur"),
        ("lentil", "Lentil"),
        ("sugarcane", "Sugarcane"),
        ("cotton", "Cotton"),
        ("soybean", "Soybean"),
        ("soyabean", "Soybean"),
        ("groundnut", "Groundnut"),
        ("mustard", "Mustard"),
        ("sunflower", "Sunflower"),
        ("safflower", "Safflower"),
        ("sesame", "Sesame"),
        ("castor", "Castor"),
        ("onion", "Onion"),
        ("potato", "Potato"),
        ("tomato", "Tomato"),
        ("brinjal", "Brinjal"),
        ("chilli", "Chilli"),
        ("turmeric", "Turmeric"),
        ("ginger", "Ginger"),
        ("banana", "Banana"),
        ("mango", "Mango"),
        ("orange", "Orange"),
        ("grapes", "Grapes"),
        ("pomegranate", "Pomegranate"),
        ("guava", "Guava"),
        ("papaya", "Papaya"),
    ]);

    pub static ref SEASON_SYNONYMS: SynonymTable<Season> = SynonymTable::new(&[
        ("kharif", Season::Kharif),
        ("monsoon", Season::Kharif),
        ("rabi", Season::Rabi),
        ("winter", Season::Rabi),
        ("summer", Season::Summer),
        ("zaid", Season::Zaid),
        ("zayed", Season::Zaid),
    ]);

    pub static ref COMPARISON_KEYWORDS: SynonymTable<ComparisonKeyword> = SynonymTable::new(&[
        ("over the years", ComparisonKeyword::Trend),
        ("over time", ComparisonKeyword::Trend),
        ("year on year", ComparisonKeyword::Trend),
        ("year-on-year", ComparisonKeyword::Trend),
        ("trend", ComparisonKeyword::Trend),
        ("trends", ComparisonKeyword::Trend),
        ("yoy", ComparisonKeyword::Trend),
        ("growth", ComparisonKeyword::Trend),
        ("top", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("highest", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("most", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("largest", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("biggest", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("maximum", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("leading", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("rank", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("ranking", ComparisonKeyword::Rank(RankOrder::Highest)),
        ("bottom", ComparisonKeyword::Rank(RankOrder::Lowest)),
        ("lowest", ComparisonKeyword::Rank(RankOrder::Lowest)),
        ("least", ComparisonKeyword::Rank(RankOrder::Lowest)),
        ("smallest", ComparisonKeyword::Rank(RankOrder::Lowest)),
        ("minimum", ComparisonKeyword::Rank(RankOrder::Lowest)),
    ]);

    pub static ref PAIRED_COMPARISONS: SynonymTable<PairedComparison> = SynonymTable::new(&[
        ("irrigated vs unirrigated", PairedComparison::IrrigatedVsUnirrigated),
        ("irrigated and unirrigated", PairedComparison::IrrigatedVsUnirrigated),
        ("irrigated versus unirrigated", PairedComparison::IrrigatedVsUnirrigated),
        ("unirrigated vs irrigated", PairedComparison::IrrigatedVsUnirrigated),
        ("compare irrigated", PairedComparison::IrrigatedVsUnirrigated),
        ("assigned vs surveyed", PairedComparison::AssignedVsSurveyed),
        ("assigned and surveyed", PairedComparison::AssignedVsSurveyed),
        ("assigned versus surveyed", PairedComparison::AssignedVsSurveyed),
        ("assign vs survey", PairedComparison::AssignedVsSurveyed),
        ("approved vs closed", PairedComparison::ApprovedVsClosed),
        ("approved and closed", PairedComparison::ApprovedVsClosed),
        ("approved versus closed", PairedComparison::ApprovedVsClosed),
        ("closed vs approved", PairedComparison::ApprovedVsClosed),
        ("surveyable vs surveyed", PairedComparison::SurveyableVsSurveyed),
        ("surveyable and surveyed", PairedComparison::SurveyableVsSurveyed),
        ("surveyable versus surveyed", PairedComparison::SurveyableVsSurveyed),
        ("rabi vs kharif", PairedComparison::RabiVsKharif),
        ("rabi and kharif", PairedComparison::RabiVsKharif),
        ("rabi versus kharif", PairedComparison::RabiVsKharif),
        ("kharif vs rabi", PairedComparison::RabiVsKharif),
        ("kharif and rabi", PairedComparison::RabiVsKharif),
        ("kharif versus rabi", PairedComparison::RabiVsKharif),
        ("compare rabi", PairedComparison::RabiVsKharif),
        ("compare kharif", PairedComparison::RabiVsKharif),
        ("fallow vs cultivated", PairedComparison::FallowVsCultivated),
        ("fallow and cultivated", PairedComparison::FallowVsCultivated),
        ("fallow versus cultivated", PairedComparison::FallowVsCultivated),
        ("cultivated vs fallow", PairedComparison::FallowVsCultivated),
    ]);

    /// National or cross-state scope requests. Users are bound to one region.
    pub static ref ACCESS_DENIED_PHRASES: SynonymTable<()> = SynonymTable::new(&[
        ("all states", ()),
        ("other states", ()),
        ("other state", ()),
        ("another state", ()),
        ("every state", ()),
        ("all india", ()),
        ("across india", ()),
        ("pan india", ()),
        ("whole of india", ()),
        ("entire india", ()),
        ("all over india", ()),
        ("nationwide", ()),
        ("countrywide", ()),
        ("country-wide", ()),
        ("national level", ()),
        ("whole country", ()),
        ("entire country", ()),
    ]);

    pub static ref GREETING_PHRASES: SynonymTable<()> = SynonymTable::new(&[
        ("hi", ()),
        ("hello", ()),
        ("hey", ()),
        ("hii", ()),
        ("hai", ()),
        ("helo", ()),
        ("hellow", ()),
        ("greetings", ()),
        ("namaste", ()),
        ("good morning", ()),
        ("good afternoon", ()),
        ("good evening", ()),
        ("thanks", ()),
        ("thank you", ()),
        ("bye", ()),
    ]);

    pub static ref HELP_PHRASES: SynonymTable<()> = SynonymTable::new(&[
        ("help", ()),
        ("guide", ()),
        ("what can you do", ()),
        ("what can", ()),
        ("how to use", ()),
        ("how do i", ()),
        ("examples", ()),
    ]);

    /// Agricultural-domain vocabulary beyond the synonym tables above.
    static ref DOMAIN_WORDS: SynonymTable<()> = SynonymTable::new(&[
        ("agri", ()),
        ("agristack", ()),
        ("agriculture", ()),
        ("agricultural", ()),
        ("farm", ()),
        ("farms", ()),
        ("farming", ()),
        ("crop", ()),
        ("cropping", ()),
        ("plot", ()),
        ("survey", ()),
        ("surveys", ()),
        ("surveyed", ()),
        ("hectare", ()),
        ("acre", ()),
        ("acres", ()),
        ("land", ()),
        ("district", ()),
        ("state", ()),
        ("taluka", ()),
        ("tehsil", ()),
        ("village", ()),
        ("season", ()),
        ("harvest", ()),
        ("sown", ()),
        ("sowing", ()),
        ("yield", ()),
        ("lgd", ()),
    ]);

    static ref NUMBER_WORDS: Vec<(&'static str, u32)> = vec![
        ("one", 1), ("two", 2), ("three", 3), ("four", 4), ("five", 5),
        ("six", 6), ("seven", 7), ("eight", 8), ("nine", 9), ("ten", 10),
        ("eleven", 11), ("twelve", 12), ("thirteen", 13), ("fourteen", 14), ("fifteen", 15),
        ("sixteen", 16), ("seventeen", 17), ("eighteen", 18), ("nineteen", 19), ("twenty", 20),
    ];
}

/// Whether the utterance mentions anything agricultural.
pub fn has_domain_term(normalized: &str) -> bool {
    DOMAIN_WORDS.matches(normalized)
        || INDICATOR_SYNONYMS.matches(normalized)
        || DIMENSION_SYNONYMS.matches(normalized)
        || CROP_SYNONYMS.matches(normalized)
        || SEASON_SYNONYMS.matches(normalized)
        || PAIRED_COMPARISONS.matches(normalized)
}

pub fn number_word(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
