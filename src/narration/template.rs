//! Template narration.
//!
//! Deterministic text for analytics results (keyed by indicator, grouping and
//! comparison kind) plus canned conversation, off-topic and access replies.
//! Only a year series is told as a trend.

use crate::execution::ResultRow;
use crate::intent::classifier::ConversationKind;
use crate::intent::descriptor::{ComparisonType, QueryDescriptor};
use crate::lexicon::{Dimension, Indicator, PairedComparison, RankOrder};
use crate::narration::format::{format_compact, format_percent};
use itertools::Itertools;
use rand::seq::SliceRandom;

pub const NO_DATA_MESSAGE: &str = "No data found for the given filters";

/// Share of the total above which the leading three entries are called
/// concentrated.
const CONCENTRATION_SHARE: f64 = 60.0;

pub const SUGGESTED_QUERIES: &[&str] = &[
    "How many farmers are there in total?",
    "Top 5 districts by cultivated area in kharif 2023",
    "Show survey progress district wise",
    "Crop wise area for wheat and rice in rabi",
    "Trend of fallow area over the years",
    "Irrigated area by irrigation source",
];

const GREETINGS: &[&str] = &[
    "Hello! I'm your AgriStack Analytics Assistant. Ask me about crop data, survey progress, farmer statistics or land usage.",
    "Namaste! I can answer questions on crop area, farmer registrations, survey status and irrigation for your region.",
];

const HELP_REPLIES: &[&str] = &[
    "I can help with crop area analysis, survey progress, farmer counts, irrigation data, district comparisons and seasonal trends.",
    "Try asking for a figure, a breakdown or a ranking, for example the top 5 districts by cultivated area in kharif.",
];

const GENERAL_REPLIES: &[&str] = &[
    "I answer questions about AgriStack survey data. Ask about a figure such as cultivated area, farmers or surveyed plots.",
    "I'm not sure which figure you're after. You can ask about crop area, farmer counts, survey progress or irrigation.",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    pub fn new() -> Self {
        Self
    }

    /// Narrate an analytics result. `rows` carry display labels.
    pub fn narrate(&self, descriptor: &QueryDescriptor, region_name: &str, rows: &[ResultRow]) -> String {
        let Some(indicator) = descriptor.indicator else {
            return self.clarification();
        };
        if rows.is_empty() {
            return format!("{} in {}.", NO_DATA_MESSAGE, region_name);
        }

        let filters = descriptor
            .filter_summary()
            .map(|f| format!(" ({})", f))
            .unwrap_or_default();
        let grouped = rows.len() > 1 || rows[0].label.is_some();

        if let Some(paired) = descriptor.paired_comparison {
            return self.paired(paired, indicator, region_name, &filters, rows);
        }

        match (grouped, descriptor.comparison_type) {
            (false, _) => self.total(indicator, region_name, &filters, rows[0].value),
            (true, ComparisonType::TopN) => self.ranking(indicator, descriptor, region_name, &filters, rows),
            (true, ComparisonType::Trend) if descriptor.dimension == Some(Dimension::Year) => {
                self.trend(indicator, region_name, &filters, rows)
            }
            (true, _) => self.distribution(indicator, descriptor.dimension, region_name, &filters, rows),
        }
    }

    fn total(&self, indicator: Indicator, region_name: &str, filters: &str, value: f64) -> String {
        let meta = indicator.meta();
        format!(
            "The {} for {}{} stands at {} {}.",
            meta.title.to_lowercase(),
            region_name,
            filters,
            format_compact(value, indicator.is_count()),
            meta.unit.to_lowercase()
        )
    }

    fn ranking(
        &self,
        indicator: Indicator,
        descriptor: &QueryDescriptor,
        region_name: &str,
        filters: &str,
        rows: &[ResultRow],
    ) -> String {
        let meta = indicator.meta();
        let unit = meta.unit.to_lowercase();
        let plural = descriptor.dimension.map_or("entries", |d| d.plural());
        let direction = match descriptor.rank_order {
            RankOrder::Highest => "top",
            RankOrder::Lowest => "bottom",
        };
        let leader = &rows[0];
        let mut text = format!(
            "Among the {} {} {} by {} in {}{}, {} comes first with {} {}.",
            direction,
            rows.len(),
            plural,
            meta.title.to_lowercase(),
            region_name,
            filters,
            label_of(leader),
            format_compact(leader.value, indicator.is_count()),
            unit
        );
        if let Some(last) = rows.last().filter(|_| rows.len() > 1) {
            text.push_str(&format!(
                " {} closes the list at {} {}.",
                label_of(last),
                format_compact(last.value, indicator.is_count()),
                unit
            ));
        }
        let total: f64 = rows.iter().map(|r| r.value).sum();
        if total > 0.0 {
            text.push_str(&format!(
                " Together they account for {} {}, of which {} holds a {} share.",
                format_compact(total, indicator.is_count()),
                unit,
                label_of(leader),
                format_percent(leader.value / total * 100.0)
            ));
        }
        text
    }

    /// Two sides of a paired comparison. Coverage pairs report the second
    /// side as a share of the first; split pairs report the first side's
    /// share of their combined total.
    fn paired(
        &self,
        paired: PairedComparison,
        indicator: Indicator,
        region_name: &str,
        filters: &str,
        rows: &[ResultRow],
    ) -> String {
        let unit = indicator.meta().unit.to_lowercase();
        let count = indicator.is_count();
        let [first, second] = paired.sides(Some(indicator));
        let value_of = |label: &str| {
            rows.iter()
                .find(|row| row.label.as_deref() == Some(label))
                .map_or(0.0, |row| row.value)
        };
        let (a, b) = (value_of(first.label), value_of(second.label));

        let mut text = format!(
            "{} in {}{}: {} at {} {} against {} at {} {}.",
            paired.title(),
            region_name,
            filters,
            first.label,
            format_compact(a, count),
            unit,
            second.label.to_lowercase(),
            format_compact(b, count),
            unit
        );
        if paired.is_coverage() {
            if a > 0.0 {
                text.push_str(&format!(
                    " {} covers {} of {}.",
                    second.label,
                    format_percent(b / a * 100.0),
                    first.label.to_lowercase()
                ));
            }
        } else if a + b > 0.0 {
            text.push_str(&format!(
                " {} makes up {} of the combined {} {}.",
                first.label,
                format_percent(a / (a + b) * 100.0),
                format_compact(a + b, count),
                unit
            ));
        }
        text
    }

    fn trend(&self, indicator: Indicator, region_name: &str, filters: &str, rows: &[ResultRow]) -> String {
        let meta = indicator.meta();
        let unit = meta.unit.to_lowercase();
        let first = &rows[0];
        let last = &rows[rows.len() - 1];
        let mut text = format!(
            "{} in {}{} went from {} {} in {} to {} {} in {}.",
            meta.title,
            region_name,
            filters,
            format_compact(first.value, indicator.is_count()),
            unit,
            label_of(first),
            format_compact(last.value, indicator.is_count()),
            unit,
            label_of(last)
        );
        if first.value > 0.0 {
            let change = (last.value - first.value) / first.value * 100.0;
            let word = if change >= 0.0 { "an increase" } else { "a decrease" };
            text.push_str(&format!(" That is {} of {}.", word, format_percent(change.abs())));
        }
        text
    }

    fn distribution(
        &self,
        indicator: Indicator,
        dimension: Option<Dimension>,
        region_name: &str,
        filters: &str,
        rows: &[ResultRow],
    ) -> String {
        let meta = indicator.meta();
        let unit = meta.unit.to_lowercase();
        let total: f64 = rows.iter().map(|r| r.value).sum();
        let leader = rows
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
            .unwrap_or(&rows[0]);
        let plural = dimension.map_or("categories", |d| d.plural());

        let mut text = format!(
            "Analysis of {} in {}{} shows a total of {} {} across {} {}.",
            meta.title.to_lowercase(),
            region_name,
            filters,
            format_compact(total, indicator.is_count()),
            unit,
            rows.len(),
            plural
        );
        if total > 0.0 {
            text.push_str(&format!(
                " {} leads with {} {} ({} share).",
                label_of(leader),
                format_compact(leader.value, indicator.is_count()),
                unit,
                format_percent(leader.value / total * 100.0)
            ));
            if rows.len() > 3 {
                let mut values: Vec<f64> = rows.iter().map(|r| r.value).collect();
                values.sort_by(|a, b| b.total_cmp(a));
                let top3 = values.iter().take(3).sum::<f64>() / total * 100.0;
                if top3 > CONCENTRATION_SHARE {
                    text.push_str(&format!(
                        " The top 3 {} account for {} of the total, indicating concentration.",
                        plural,
                        format_percent(top3)
                    ));
                } else {
                    text.push_str(&format!(" The distribution is relatively balanced across {}.", plural));
                }
            }
        }
        text
    }

    pub fn conversation(&self, kind: ConversationKind) -> String {
        let replies = match kind {
            ConversationKind::Greeting => GREETINGS,
            ConversationKind::Help => HELP_REPLIES,
            ConversationKind::General => GENERAL_REPLIES,
        };
        pick(replies)
    }

    pub fn off_topic(&self) -> String {
        format!(
            "I can only answer questions about AgriStack agricultural data. You could try: {}",
            suggestions(3)
        )
    }

    pub fn unauthorized(&self, reason: &str) -> String {
        format!("Access restricted. {}", reason)
    }

    /// Reply when the question is analytical but names no figure.
    pub fn clarification(&self) -> String {
        format!(
            "I couldn't tell which figure you want. Please name one, for example: {}",
            suggestions(2)
        )
    }
}

fn pick(replies: &[&str]) -> String {
    replies
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
        .to_string()
}

fn suggestions(count: usize) -> String {
    SUGGESTED_QUERIES
        .iter()
        .take(count)
        .map(|q| format!("\"{}\"", q))
        .join(", ")
}

fn label_of(row: &ResultRow) -> &str {
    row.label.as_deref().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Season;

    fn narrator() -> TemplateNarrator {
        TemplateNarrator::new()
    }

    #[test]
    fn test_total_narration() {
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount);
        let text = narrator().narrate(&descriptor, "Maharashtra", &[ResultRow::total(1_234_567.0)]);
        assert_eq!(
            text,
            "The registered farmers for Maharashtra stands at 12.35 lakh farmers."
        );
    }

    #[test]
    fn test_empty_rows() {
        let descriptor = QueryDescriptor::new(Indicator::FallowArea);
        let text = narrator().narrate(&descriptor, "Pune", &[]);
        assert!(text.starts_with(NO_DATA_MESSAGE));
    }

    #[test]
    fn test_ranking_narration_names_leader() {
        let descriptor = QueryDescriptor::new(Indicator::CultivatedArea)
            .with_dimension(Dimension::District)
            .with_season(Season::Kharif)
            .with_top_n(3);
        let rows = vec![
            ResultRow::labelled("Pune", 5000.0),
            ResultRow::labelled("Nashik", 3000.0),
            ResultRow::labelled("Satara", 2000.0),
        ];
        let text = narrator().narrate(&descriptor, "Maharashtra", &rows);
        assert!(text.contains("top 3 districts"));
        assert!(text.contains("Pune comes first"));
        assert!(text.contains("(Kharif)"));
        assert!(text.contains("50.0% share"));
    }

    #[test]
    fn test_distribution_concentration() {
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount).with_dimension(Dimension::Crop);
        let rows = vec![
            ResultRow::labelled("Wheat", 70.0),
            ResultRow::labelled("Rice", 10.0),
            ResultRow::labelled("Gram", 10.0),
            ResultRow::labelled("Maize", 10.0),
        ];
        let text = narrator().narrate(&descriptor, "Maharashtra", &rows);
        assert!(text.contains("Wheat leads"));
        assert!(text.contains("indicating concentration"));
    }

    #[test]
    fn test_trend_narration() {
        let mut descriptor = QueryDescriptor::new(Indicator::FallowArea).with_dimension(Dimension::Year);
        descriptor.comparison_type = ComparisonType::Trend;
        let rows = vec![
            ResultRow::labelled("2021-2022", 100.0),
            ResultRow::labelled("2022-2023", 150.0),
        ];
        let text = narrator().narrate(&descriptor, "Maharashtra", &rows);
        assert!(text.contains("an increase of 50.0%"));
    }

    #[test]
    fn test_trend_over_districts_is_a_distribution() {
        let mut descriptor = QueryDescriptor::new(Indicator::FallowArea).with_dimension(Dimension::District);
        descriptor.comparison_type = ComparisonType::Trend;
        let rows = vec![ResultRow::labelled("Pune", 300.0), ResultRow::labelled("Nashik", 100.0)];
        let text = narrator().narrate(&descriptor, "Maharashtra", &rows);
        assert!(text.starts_with("Analysis of fallow area"));
        assert!(!text.contains("went from"));
    }

    #[test]
    fn test_paired_narration() {
        let descriptor =
            QueryDescriptor::new(Indicator::AssignedPlots).with_paired(PairedComparison::AssignedVsSurveyed);
        let rows = vec![
            ResultRow::labelled("Plots Assigned for Survey", 200.0),
            ResultRow::labelled("Plots Surveyed", 150.0),
        ];
        let text = narrator().narrate(&descriptor, "Pune", &rows);
        assert!(text.starts_with("Assigned vs Surveyed Plots in Pune:"));
        assert!(text.contains("Plots Surveyed covers 75.0%"));

        let descriptor = QueryDescriptor::new(Indicator::FarmerCount).with_paired(PairedComparison::RabiVsKharif);
        let rows = vec![ResultRow::labelled("Rabi", 100.0), ResultRow::labelled("Kharif", 300.0)];
        let text = narrator().narrate(&descriptor, "Maharashtra", &rows);
        assert!(text.contains("Rabi at 100 farmers against kharif at 300 farmers"));
        assert!(text.contains("Rabi makes up 25.0%"));
    }

    #[test]
    fn test_canned_replies() {
        assert!(GREETINGS.contains(&narrator().conversation(ConversationKind::Greeting).as_str()));
        let off_topic = narrator().off_topic();
        assert!(off_topic.contains(SUGGESTED_QUERIES[0]));
        assert!(narrator().narrate(&QueryDescriptor::default(), "Maharashtra", &[]).contains(SUGGESTED_QUERIES[0]));
    }
}
