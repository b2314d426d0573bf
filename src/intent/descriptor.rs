//! Query Descriptor
//!
//! Typed result of query-parameter extraction. Every field is optional except
//! the comparison kind; an absent value means "not mentioned / not
//! recognized", never a guessed default.

use crate::lexicon::{Dimension, Indicator, PairedComparison, RankOrder, Season};
use crate::region::RegionCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    #[default]
    None,
    TopN,
    Trend,
}

/// Year filter: a single year or an inclusive range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum YearFilter {
    Single { year: u16 },
    Range { start: u16, end: u16 },
}

impl YearFilter {
    /// Agricultural-year values ("2023-2024") covered by this filter.
    pub fn agricultural_years(&self) -> Vec<String> {
        match *self {
            YearFilter::Single { year } => vec![format!("{}-{}", year, year + 1)],
            YearFilter::Range { start, end } => (start..end)
                .map(|year| format!("{}-{}", year, year + 1))
                .collect(),
        }
    }

    pub fn label(&self) -> String {
        match *self {
            YearFilter::Single { year } => format!("{}-{}", year, year + 1),
            YearFilter::Range { start, end } => format!("{}-{}", start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QueryDescriptor {
    pub indicator: Option<Indicator>,
    pub dimension: Option<Dimension>,
    pub crop_filter: Option<String>,
    pub season_filter: Option<Season>,
    pub year_filter: Option<YearFilter>,
    pub region_filter: Option<RegionCode>,
    pub comparison_type: ComparisonType,
    pub top_n: Option<u32>,
    #[serde(default)]
    pub rank_order: RankOrder,
    /// Two measures side by side; the result is one value per side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_comparison: Option<PairedComparison>,
}

impl QueryDescriptor {
    pub fn new(indicator: Indicator) -> Self {
        Self {
            indicator: Some(indicator),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn with_crop(mut self, crop: &str) -> Self {
        self.crop_filter = Some(crop.to_string());
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season_filter = Some(season);
        self
    }

    pub fn with_year(mut self, year: YearFilter) -> Self {
        self.year_filter = Some(year);
        self
    }

    pub fn with_region(mut self, region: RegionCode) -> Self {
        self.region_filter = Some(region);
        self
    }

    pub fn with_top_n(mut self, n: u32) -> Self {
        self.comparison_type = ComparisonType::TopN;
        self.top_n = Some(n);
        self
    }

    pub fn with_paired(mut self, paired: PairedComparison) -> Self {
        self.paired_comparison = Some(paired);
        self
    }

    pub fn is_grouped(&self) -> bool {
        self.dimension.is_some()
    }

    /// Short human description of the active filters, e.g. "Wheat, Kharif, 2023-2024".
    pub fn filter_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(ref crop) = self.crop_filter {
            parts.push(crop.clone());
        }
        if let Some(season) = self.season_filter {
            parts.push(season.label().to_string());
        }
        if let Some(year) = self.year_filter {
            parts.push(year.label());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agricultural_years() {
        assert_eq!(YearFilter::Single { year: 2023 }.agricultural_years(), vec!["2023-2024"]);
        assert_eq!(
            YearFilter::Range { start: 2020, end: 2022 }.agricultural_years(),
            vec!["2020-2021", "2021-2022"]
        );
    }

    #[test]
    fn test_filter_summary() {
        let descriptor = QueryDescriptor::new(Indicator::CultivatedArea)
            .with_crop("Wheat")
            .with_season(Season::Rabi);
        assert_eq!(descriptor.filter_summary().as_deref(), Some("Wheat, Rabi"));
        assert_eq!(QueryDescriptor::default().filter_summary(), None);
    }
}
