//! Query Extractor
//!
//! Turns an analytics utterance into a [`QueryDescriptor`]. Each field has its
//! own resolver over its own synonym table; resolvers run in a fixed order
//! (indicator, dimension, crop, season, year, comparison, region) and a final
//! conflict pass lets a ranking win over a single-entity filter. Region
//! references are never dropped here: they must reach authorization.

use crate::intent::descriptor::{ComparisonType, QueryDescriptor, YearFilter, DEFAULT_TOP_N};
use crate::lexicon::{
    self, normalize, ComparisonKeyword, Dimension, Indicator, PairedComparison, RankOrder, Season,
    COMPARISON_KEYWORDS, CROP_SYNONYMS, DIMENSION_SYNONYMS, INDICATOR_SYNONYMS, PAIRED_COMPARISONS,
    SEASON_SYNONYMS,
};
use crate::region::RegionDirectory;
use lazy_static::lazy_static;
use regex::Regex;
use strsim::jaro_winkler;
use tracing::debug;

const MIN_YEAR: u16 = 1950;
const MAX_YEAR: u16 = 2100;
const CROP_FUZZY_THRESHOLD: f64 = 0.92;

lazy_static! {
    static ref YEAR_RANGE: Regex =
        Regex::new(r"\b(\d{4})\s*(?:-|/|to)\s*(\d{4}|\d{2})\b").expect("valid year range regex");
    static ref SINGLE_YEAR: Regex = Regex::new(r"\b(\d{4})\b").expect("valid year regex");
    static ref RANK_WITH_NUMBER: Regex =
        Regex::new(r"\b(top|bottom)\s*(\d+)\b").expect("valid top-n regex");
    static ref NUMBER_BEFORE_RANK: Regex =
        Regex::new(r"\b(\d{1,3})\s+(highest|largest|biggest|lowest|smallest)\b").expect("valid rank regex");
    static ref RANK_WITH_WORD: Regex =
        Regex::new(r"\b(top|bottom)\s+([a-z]+)\b").expect("valid top-word regex");
}

/// Comparison resolution: kind, explicit N, direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonResolution {
    pub comparison_type: ComparisonType,
    pub top_n: Option<u32>,
    pub rank_order: RankOrder,
}

pub struct QueryExtractor<'a> {
    directory: &'a RegionDirectory,
}

impl<'a> QueryExtractor<'a> {
    pub fn new(directory: &'a RegionDirectory) -> Self {
        Self { directory }
    }

    /// Extract a descriptor. Unrecognized fields stay `None`.
    pub fn extract(&self, utterance: &str) -> QueryDescriptor {
        let normalized = normalize(utterance);

        let indicator = resolve_indicator(&normalized);
        let dimension = resolve_dimension(&normalized);
        let crop_filter = resolve_crop(&normalized);
        let season_filter = resolve_season(&normalized);
        let year_filter = resolve_year(&normalized);
        let comparison = resolve_comparison(&normalized);
        let paired_comparison = resolve_paired_comparison(&normalized);
        let region_filter = self.directory.detect(&normalized);

        let mut descriptor = QueryDescriptor {
            indicator,
            dimension,
            crop_filter,
            season_filter,
            year_filter,
            region_filter,
            comparison_type: comparison.comparison_type,
            top_n: comparison.top_n,
            rank_order: comparison.rank_order,
            paired_comparison,
        };
        apply_conflict_policy(&mut descriptor);

        debug!(?descriptor, "extracted query descriptor");
        descriptor
    }
}

pub fn resolve_indicator(normalized: &str) -> Option<Indicator> {
    INDICATOR_SYNONYMS.resolve(normalized).map(|(_, indicator)| indicator)
}

pub fn resolve_dimension(normalized: &str) -> Option<Dimension> {
    DIMENSION_SYNONYMS.resolve(normalized).map(|(_, dimension)| dimension)
}

/// Exact crop synonym first, then a fuzzy match on longer words.
pub fn resolve_crop(normalized: &str) -> Option<String> {
    if let Some((_, crop)) = CROP_SYNONYMS.resolve(normalized) {
        return Some(crop.to_string());
    }

    let mut best: Option<(&'static str, f64)> = None;
    for word in normalized.split(' ').filter(|w| w.chars().count() >= 5) {
        if lexicon::has_domain_term(word) {
            continue;
        }
        for (term, crop) in CROP_SYNONYMS.entries() {
            if term.contains(' ') || term.len() < 5 {
                continue;
            }
            let score = jaro_winkler(word, term);
            if score >= CROP_FUZZY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                best = Some((crop, score));
            }
        }
    }
    best.map(|(crop, _)| crop.to_string())
}

pub fn resolve_season(normalized: &str) -> Option<Season> {
    SEASON_SYNONYMS.resolve(normalized).map(|(_, season)| season)
}

/// A single 4-digit year, or two years joined by `-`, `/` or `to`. A
/// malformed range or an out-of-range year leaves the field unresolved.
pub fn resolve_year(normalized: &str) -> Option<YearFilter> {
    if let Some(caps) = YEAR_RANGE.captures(normalized) {
        let start: u16 = caps[1].parse().ok()?;
        let second = &caps[2];
        let end: u16 = if second.len() == 2 {
            (start / 100) * 100 + second.parse::<u16>().ok()?
        } else {
            second.parse().ok()?
        };
        if !valid_year(start) || !valid_year(end) || end <= start {
            return None;
        }
        return Some(YearFilter::Range { start, end });
    }

    SINGLE_YEAR
        .captures_iter(normalized)
        .filter_map(|caps| caps[1].parse::<u16>().ok())
        .find(|year| valid_year(*year))
        .map(|year| YearFilter::Single { year })
}

fn valid_year(year: u16) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

pub fn resolve_paired_comparison(normalized: &str) -> Option<PairedComparison> {
    PAIRED_COMPARISONS.resolve(normalized).map(|(_, paired)| paired)
}

/// Ranking and trend detection. An explicit "top N" wins over a trend
/// keyword; a ranking keyword without a number defaults to N = 5.
pub fn resolve_comparison(normalized: &str) -> ComparisonResolution {
    let none = ComparisonResolution {
        comparison_type: ComparisonType::None,
        top_n: None,
        rank_order: RankOrder::Highest,
    };

    if let Some((n, order)) = explicit_rank(normalized) {
        return ComparisonResolution {
            comparison_type: ComparisonType::TopN,
            top_n: Some(n),
            rank_order: order,
        };
    }

    match COMPARISON_KEYWORDS.resolve(normalized) {
        Some((_, ComparisonKeyword::Trend)) => ComparisonResolution {
            comparison_type: ComparisonType::Trend,
            ..none
        },
        Some((_, ComparisonKeyword::Rank(order))) => ComparisonResolution {
            comparison_type: ComparisonType::TopN,
            top_n: Some(DEFAULT_TOP_N),
            rank_order: order,
        },
        None => none,
    }
}

fn explicit_rank(normalized: &str) -> Option<(u32, RankOrder)> {
    let order_of = |word: &str| match word {
        "bottom" | "lowest" | "smallest" => RankOrder::Lowest,
        _ => RankOrder::Highest,
    };

    if let Some(caps) = RANK_WITH_NUMBER.captures(normalized) {
        // zero or an overflowing number still asks for a ranking
        let n = caps[2].parse::<u32>().ok().filter(|n| *n > 0);
        return Some((n.unwrap_or(DEFAULT_TOP_N), order_of(&caps[1])));
    }
    if let Some(caps) = NUMBER_BEFORE_RANK.captures(normalized) {
        let n: u32 = caps[1].parse().ok()?;
        return (n > 0).then(|| (n, order_of(&caps[2])));
    }
    if let Some(caps) = RANK_WITH_WORD.captures(normalized) {
        if let Some(n) = lexicon::number_word(&caps[2]) {
            return Some((n, order_of(&caps[1])));
        }
    }
    None
}

/// Cross-field conflicts: a ranked or trend query keeps its grouping and
/// drops a filter that would collapse it to a single entity. A paired
/// comparison yields one value per side, so it clears grouping and ranking.
fn apply_conflict_policy(descriptor: &mut QueryDescriptor) {
    if let Some(paired) = descriptor.paired_comparison {
        let [first, _] = paired.sides(descriptor.indicator);
        descriptor.indicator = Some(first.indicator);
        descriptor.dimension = None;
        descriptor.comparison_type = ComparisonType::None;
        descriptor.top_n = None;
        descriptor.rank_order = RankOrder::Highest;
        if paired == PairedComparison::RabiVsKharif {
            descriptor.season_filter = None;
        }
        return;
    }

    match descriptor.comparison_type {
        ComparisonType::TopN => {
            let dimension = *descriptor.dimension.get_or_insert(Dimension::District);
            match dimension {
                Dimension::Crop => descriptor.crop_filter = None,
                Dimension::Season => descriptor.season_filter = None,
                Dimension::Year => {
                    if matches!(descriptor.year_filter, Some(YearFilter::Single { .. })) {
                        descriptor.year_filter = None;
                    }
                }
                _ => {}
            }
        }
        ComparisonType::Trend => {
            // a trend is a series over years, whatever breakdown was named
            if let Some(other) = descriptor.dimension.filter(|d| *d != Dimension::Year) {
                debug!(dimension = other.title(), "trend ignores non-year breakdown");
            }
            descriptor.dimension = Some(Dimension::Year);
            if matches!(descriptor.year_filter, Some(YearFilter::Single { .. })) {
                descriptor.year_filter = None;
            }
        }
        ComparisonType::None => {}
    }
}
