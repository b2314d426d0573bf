//! Region hierarchy (LGD codes)
//!
//! Region codes are fixed-width hierarchical numeric codes: a state is 2
//! digits, a district appends 3 digits, a sub-district appends 5 more. A
//! higher level is always a prefix of the levels below it, so subtree
//! membership is a prefix test on validated codes.

use crate::error::{AnalyticsError, Result};
use crate::lexicon::{self, contains_term, normalize, title_case};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use strsim::jaro_winkler;
use tracing::{info, warn};

const STATE_WIDTH: usize = 2;
const DISTRICT_WIDTH: usize = 3;
const SUB_DISTRICT_WIDTH: usize = 5;

/// Minimum Jaro-Winkler similarity for a fuzzy district match.
const FUZZY_THRESHOLD: f64 = 0.92;
const FUZZY_MIN_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    State,
    District,
    SubDistrict,
}

impl RegionLevel {
    /// Coarsest first.
    pub const ALL: [RegionLevel; 3] = [RegionLevel::State, RegionLevel::District, RegionLevel::SubDistrict];

    /// Total code length at this level.
    pub fn code_len(&self) -> usize {
        match self {
            RegionLevel::State => STATE_WIDTH,
            RegionLevel::District => STATE_WIDTH + DISTRICT_WIDTH,
            RegionLevel::SubDistrict => STATE_WIDTH + DISTRICT_WIDTH + SUB_DISTRICT_WIDTH,
        }
    }

    fn from_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code_len() == len)
    }

    fn segment_start(&self) -> usize {
        match self {
            RegionLevel::State => 0,
            RegionLevel::District => RegionLevel::State.code_len(),
            RegionLevel::SubDistrict => RegionLevel::District.code_len(),
        }
    }

    /// Dataset column holding this level's local code.
    pub fn column(&self) -> &'static str {
        match self {
            RegionLevel::State => "state_lgd_code",
            RegionLevel::District => "district_lgd_code",
            RegionLevel::SubDistrict => "sub_district_lgd_code",
        }
    }
}

/// A validated hierarchical region code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode {
    digits: String,
}

impl RegionCode {
    pub fn parse(code: &str) -> Result<Self> {
        let digits = code.trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AnalyticsError::InvalidRegionCode(format!(
                "'{}' is not a numeric region code",
                code
            )));
        }
        if RegionLevel::from_len(digits.len()).is_none() {
            return Err(AnalyticsError::InvalidRegionCode(format!(
                "'{}' has {} digits, expected 2, 5 or 10",
                code,
                digits.len()
            )));
        }
        Ok(Self {
            digits: digits.to_string(),
        })
    }

    /// State code from a local LGD code ("9" and "09" are the same state).
    pub fn state(code: &str) -> Result<Self> {
        Self::parse(&pad(code, STATE_WIDTH)?)
    }

    /// District code from a state code and the district's local LGD code.
    pub fn district(state_code: &str, district_code: &str) -> Result<Self> {
        let state = Self::state(state_code)?;
        Self::parse(&format!("{}{}", state.digits, pad(district_code, DISTRICT_WIDTH)?))
    }

    pub fn level(&self) -> RegionLevel {
        // digits length validated at construction
        RegionLevel::from_len(self.digits.len()).unwrap_or(RegionLevel::State)
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn state_code(&self) -> &str {
        &self.digits[..STATE_WIDTH]
    }

    /// The enclosing code at `level`, if this code is at or below it.
    pub fn truncate(&self, level: RegionLevel) -> Option<RegionCode> {
        if level > self.level() {
            return None;
        }
        Some(RegionCode {
            digits: self.digits[..level.code_len()].to_string(),
        })
    }

    pub fn parent(&self) -> Option<RegionCode> {
        match self.level() {
            RegionLevel::State => None,
            RegionLevel::District => self.truncate(RegionLevel::State),
            RegionLevel::SubDistrict => self.truncate(RegionLevel::District),
        }
    }

    /// True when `self` lies in the subtree rooted at `ancestor`.
    pub fn is_descendant_or_equal(&self, ancestor: &RegionCode) -> bool {
        self.digits.starts_with(&ancestor.digits)
    }

    /// Value of this code's `level` segment as stored in the dataset column.
    /// State codes keep their two digits; lower levels drop leading zeros.
    pub fn segment(&self, level: RegionLevel) -> Option<String> {
        if level > self.level() {
            return None;
        }
        let raw = &self.digits[level.segment_start()..level.code_len()];
        if level == RegionLevel::State {
            return Some(raw.to_string());
        }
        let trimmed = raw.trim_start_matches('0');
        Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
    }

    /// Stored segments from the state down to this code's own level. Local
    /// codes below state level repeat across states, so a row belongs to the
    /// subtree only when every one of these matches.
    pub fn segments(&self) -> Vec<(RegionLevel, String)> {
        RegionLevel::ALL
            .into_iter()
            .filter_map(|level| self.segment(level).map(|segment| (level, segment)))
            .collect()
    }
}

fn pad(code: &str, width: usize) -> Result<String> {
    let code = code.trim();
    if code.is_empty() || code.len() > width || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AnalyticsError::InvalidRegionCode(format!(
            "'{}' does not fit a {}-digit LGD segment",
            code, width
        )));
    }
    Ok(format!("{:0>width$}", code, width = width))
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl FromStr for RegionCode {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.digits
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictEntry {
    pub code: RegionCode,
    pub name: String,
    normalized: String,
}

#[derive(Debug, Deserialize)]
struct StateRecord {
    state_lgd_code: String,
    state_name: String,
}

#[derive(Debug, Deserialize)]
struct DistrictRecord {
    district_lgd_code: String,
    district_name: String,
    state_lgd_code: String,
}

/// Names of states and districts, used to detect region references in
/// utterances and to label grouped results.
#[derive(Debug, Clone, Default)]
pub struct RegionDirectory {
    states: BTreeMap<String, String>,
    /// Longest name first.
    districts: Vec<DistrictEntry>,
}

impl RegionDirectory {
    /// Built-in state table; no district names.
    pub fn builtin() -> Self {
        let mut directory = Self::default();
        for (code, name) in [
            ("27", "Maharashtra"),
            ("09", "Uttar Pradesh"),
            ("24", "Gujarat"),
            ("10", "Bihar"),
            ("33", "Tamil Nadu"),
            ("29", "Karnataka"),
        ] {
            directory.states.insert(code.to_string(), name.to_string());
        }
        directory
    }

    /// Load from LGD CSV exports. Missing files fall back to the built-in
    /// state table (and no districts), with a warning.
    pub fn load(state_csv: Option<&Path>, district_csv: Option<&Path>) -> Result<Self> {
        let mut directory = Self::builtin();

        if let Some(path) = state_csv {
            if path.exists() {
                let mut reader = csv::Reader::from_path(path)?;
                for record in reader.deserialize::<StateRecord>() {
                    let record = record?;
                    let code = RegionCode::state(&record.state_lgd_code).map_err(|e| {
                        AnalyticsError::RegionDirectory(format!("{}: {}", path.display(), e))
                    })?;
                    directory
                        .states
                        .insert(code.as_str().to_string(), title_case(record.state_name.trim()));
                }
            } else {
                warn!("State LGD file {} not found, using built-in states", path.display());
            }
        }

        if let Some(path) = district_csv {
            if path.exists() {
                let mut reader = csv::Reader::from_path(path)?;
                for record in reader.deserialize::<DistrictRecord>() {
                    let record = record?;
                    let code = RegionCode::district(&record.state_lgd_code, &record.district_lgd_code)
                        .map_err(|e| {
                            AnalyticsError::RegionDirectory(format!("{}: {}", path.display(), e))
                        })?;
                    directory.push_district(code, &record.district_name);
                }
            } else {
                warn!("District LGD file {} not found, district detection disabled", path.display());
            }
        }

        directory.sort_districts();
        info!(
            "Region directory loaded: {} states, {} districts",
            directory.states.len(),
            directory.districts.len()
        );
        Ok(directory)
    }

    pub fn with_state(mut self, code: &str, name: &str) -> Result<Self> {
        let code = RegionCode::state(code)?;
        self.states.insert(code.as_str().to_string(), name.to_string());
        Ok(self)
    }

    pub fn with_district(mut self, state_code: &str, district_code: &str, name: &str) -> Result<Self> {
        let code = RegionCode::district(state_code, district_code)?;
        self.push_district(code, name);
        self.sort_districts();
        Ok(self)
    }

    fn push_district(&mut self, code: RegionCode, name: &str) {
        self.districts.push(DistrictEntry {
            code,
            name: title_case(name.trim()),
            normalized: normalize(name),
        });
    }

    fn sort_districts(&mut self) {
        self.districts
            .sort_by(|a, b| b.normalized.len().cmp(&a.normalized.len()).then_with(|| a.code.cmp(&b.code)));
    }

    pub fn state_name(&self, state_code: &str) -> Option<&str> {
        self.states.get(state_code).map(String::as_str)
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    /// Display name of a code, if known.
    pub fn region_name(&self, code: &RegionCode) -> Option<String> {
        match code.level() {
            RegionLevel::State => self.state_name(code.as_str()).map(str::to_string),
            _ => self
                .districts
                .iter()
                .find(|d| code.truncate(RegionLevel::District).as_ref() == Some(&d.code))
                .map(|d| d.name.clone()),
        }
    }

    /// Human label for a grouped result key at `level`, within `scope`'s state.
    pub fn label_for(&self, level: RegionLevel, raw: &str, scope: &RegionCode) -> String {
        let code = match level {
            RegionLevel::State => RegionCode::state(raw),
            RegionLevel::District => RegionCode::district(scope.state_code(), raw),
            RegionLevel::SubDistrict => return raw.to_string(),
        };
        code.ok()
            .and_then(|c| self.region_name(&c))
            .unwrap_or_else(|| raw.to_string())
    }

    /// Detect a region named in a normalized utterance: districts (longest
    /// name first, across all states), then states, then a fuzzy district
    /// match on words outside the domain vocabulary.
    pub fn detect(&self, normalized: &str) -> Option<RegionCode> {
        if let Some(district) = self
            .districts
            .iter()
            .find(|d| contains_term(normalized, &d.normalized))
        {
            return Some(district.code.clone());
        }

        let state = self
            .states
            .iter()
            .filter(|(_, name)| contains_term(normalized, &normalize(name)))
            .max_by_key(|(_, name)| name.len());
        if let Some((code, _)) = state {
            return RegionCode::parse(code).ok();
        }

        self.fuzzy_district(normalized)
    }

    fn fuzzy_district(&self, normalized: &str) -> Option<RegionCode> {
        let vocabulary: HashSet<&str> = normalized
            .split(' ')
            .filter(|w| w.chars().count() >= FUZZY_MIN_LEN)
            .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
            .filter(|w| !lexicon::has_domain_term(w))
            .collect();

        let mut best: Option<(&DistrictEntry, f64)> = None;
        for district in self.districts.iter().filter(|d| !d.normalized.contains(' ')) {
            for word in &vocabulary {
                let score = jaro_winkler(word, &district.normalized);
                if score >= FUZZY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                    best = Some((district, score));
                }
            }
        }
        best.map(|(district, _)| district.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn directory() -> RegionDirectory {
        RegionDirectory::builtin()
            .with_district("27", "490", "Pune")
            .unwrap()
            .with_district("27", "482", "Mumbai")
            .unwrap()
            .with_district("27", "483", "Mumbai Suburban")
            .unwrap()
            .with_district("24", "438", "Ahmedabad")
            .unwrap()
    }

    #[test]
    fn test_parse_and_levels() {
        assert_eq!(RegionCode::parse("27").unwrap().level(), RegionLevel::State);
        assert_eq!(RegionCode::parse("27490").unwrap().level(), RegionLevel::District);
        assert_eq!(RegionCode::parse("2749004123").unwrap().level(), RegionLevel::SubDistrict);
        assert!(RegionCode::parse("274").is_err());
        assert!(RegionCode::parse("27a").is_err());
        assert!(RegionCode::parse("").is_err());
    }

    #[test]
    fn test_constructors_pad_segments() {
        assert_eq!(RegionCode::state("9").unwrap().as_str(), "09");
        assert_eq!(RegionCode::district("27", "37").unwrap().as_str(), "27037");
        assert!(RegionCode::district("27", "4900").is_err());
    }

    #[test]
    fn test_descendant_or_equal() {
        let state = RegionCode::parse("27").unwrap();
        let pune = RegionCode::parse("27490").unwrap();
        let mumbai = RegionCode::parse("27482").unwrap();
        let gujarat = RegionCode::parse("24").unwrap();

        assert!(pune.is_descendant_or_equal(&state));
        assert!(state.is_descendant_or_equal(&state));
        assert!(!state.is_descendant_or_equal(&pune));
        assert!(!mumbai.is_descendant_or_equal(&pune));
        assert!(!pune.is_descendant_or_equal(&gujarat));
    }

    #[test]
    fn test_segments_and_parent() {
        let code = RegionCode::parse("2703700123").unwrap();
        assert_eq!(code.segment(RegionLevel::State).as_deref(), Some("27"));
        assert_eq!(code.segment(RegionLevel::District).as_deref(), Some("37"));
        assert_eq!(code.segment(RegionLevel::SubDistrict).as_deref(), Some("123"));
        assert_eq!(code.parent().unwrap().as_str(), "27037");
        assert_eq!(RegionCode::parse("27").unwrap().segment(RegionLevel::District), None);
    }

    #[test]
    fn test_segments_walk_down_from_state() {
        let code = RegionCode::parse("2703700123").unwrap();
        assert_eq!(
            code.segments(),
            vec![
                (RegionLevel::State, "27".to_string()),
                (RegionLevel::District, "37".to_string()),
                (RegionLevel::SubDistrict, "123".to_string()),
            ]
        );
        assert_eq!(RegionCode::parse("09").unwrap().segments(), vec![(RegionLevel::State, "09".to_string())]);
    }

    #[test]
    fn test_serde_round_trips_through_string() {
        let code: RegionCode = serde_json::from_str("\"27490\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"27490\"");
        assert!(serde_json::from_str::<RegionCode>("\"999\"").is_err());
    }

    #[test]
    fn test_detect_prefers_longest_district_name() {
        let dir = directory();
        let found = dir.detect(&normalize("farmers in Mumbai Suburban")).unwrap();
        assert_eq!(found.as_str(), "27483");
        let found = dir.detect(&normalize("farmers in Mumbai")).unwrap();
        assert_eq!(found.as_str(), "27482");
    }

    #[test]
    fn test_detect_states_and_other_state_districts() {
        let dir = directory();
        assert_eq!(dir.detect("crop area in gujarat").unwrap().as_str(), "24");
        assert_eq!(dir.detect("crop area in ahmedabad").unwrap().as_str(), "24438");
        assert_eq!(dir.detect("crop area in total"), None);
    }

    #[test]
    fn test_detect_fuzzy_district() {
        let dir = directory();
        assert_eq!(dir.detect("farmers in ahmedbad").unwrap().as_str(), "24438");
        assert_eq!(dir.detect("farmers in general"), None);
    }

    #[test]
    fn test_labels_use_names_when_known() {
        let dir = directory();
        let scope = RegionCode::parse("27").unwrap();
        assert_eq!(dir.label_for(RegionLevel::District, "490", &scope), "Pune");
        assert_eq!(dir.label_for(RegionLevel::District, "999", &scope), "999");
        assert_eq!(dir.label_for(RegionLevel::State, "27", &scope), "Maharashtra");
    }

    #[test]
    fn test_load_from_csv() {
        let dir = std::env::temp_dir().join(format!("agristack_region_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let states = dir.join("states.csv");
        let districts = dir.join("districts.csv");
        fs::write(&states, "state_lgd_code,state_name\n27,MAHARASHTRA\n30,goa\n").unwrap();
        fs::write(
            &districts,
            "district_lgd_code,district_name,state_lgd_code\n490,PUNE,27\n2,North Goa,30\n",
        )
        .unwrap();

        let directory = RegionDirectory::load(Some(&states), Some(&districts)).unwrap();
        assert_eq!(directory.state_name("30"), Some("Goa"));
        assert_eq!(directory.district_count(), 2);
        assert_eq!(directory.detect("fallow land in north goa").unwrap().as_str(), "30002");

        fs::remove_dir_all(&dir).ok();
    }
}
