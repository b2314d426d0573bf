//! Access Control
//!
//! Region-scoped authorization. A user is bound to one region code; a request
//! is allowed only when its region filter is absent (the user's own region is
//! used) or lies in the user's subtree. Omission never means unrestricted.
//! A ranking over a level at or above the requested region is widened back to
//! the user's own region once the request itself has been checked.

use crate::intent::descriptor::{ComparisonType, QueryDescriptor};
use crate::region::RegionCode;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// The region a request is allowed to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationScope {
    pub user_region: RegionCode,
    /// Region the plan filters on: the requested region, or the user's own
    /// when no region was named or a ranking needs the whole scope.
    pub effective_region: RegionCode,
}

impl AuthorizationScope {
    pub fn permits(&self, code: &RegionCode) -> bool {
        code.is_descendant_or_equal(&self.user_region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    OutOfScope,
    InvalidUserRegion,
}

/// Authorization failure. A value, not an error: it is rendered as an
/// access-restricted response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unauthorized {
    pub reason: DenialReason,
    pub requested: Option<RegionCode>,
    pub user_region: String,
}

impl Unauthorized {
    /// Plain-language explanation. Carries no codes.
    pub fn message(&self) -> &'static str {
        match self.reason {
            DenialReason::OutOfScope => {
                "You can only view data for your own region. The area you asked about is outside your access."
            }
            DenialReason::InvalidUserRegion => {
                "Your account is not linked to a valid region, so no data can be shown."
            }
        }
    }
}

impl fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, &self.requested) {
            (DenialReason::OutOfScope, Some(requested)) => write!(
                f,
                "region {} is outside user region {}",
                requested, self.user_region
            ),
            (DenialReason::OutOfScope, None) => {
                write!(f, "request is outside user region {}", self.user_region)
            }
            (DenialReason::InvalidUserRegion, _) => {
                write!(f, "user region '{}' is not a valid region code", self.user_region)
            }
        }
    }
}

/// Decide whether `descriptor` may run for a user bound to `user_region_code`.
pub fn authorize(
    descriptor: &QueryDescriptor,
    user_region_code: &str,
) -> std::result::Result<AuthorizationScope, Unauthorized> {
    let user_region = RegionCode::parse(user_region_code).map_err(|_| {
        warn!("Rejecting request: malformed user region '{}'", user_region_code);
        Unauthorized {
            reason: DenialReason::InvalidUserRegion,
            requested: descriptor.region_filter.clone(),
            user_region: user_region_code.to_string(),
        }
    })?;

    match &descriptor.region_filter {
        None => Ok(AuthorizationScope {
            effective_region: user_region.clone(),
            user_region,
        }),
        Some(requested) if requested.is_descendant_or_equal(&user_region) => {
            let effective_region = if ranks_across(descriptor, requested) {
                debug!("Ranking across user region {} instead of {}", user_region, requested);
                user_region.clone()
            } else {
                requested.clone()
            };
            Ok(AuthorizationScope {
                effective_region,
                user_region,
            })
        }
        Some(requested) => {
            warn!("Rejecting request for region {} from user region {}", requested, user_region);
            Err(Unauthorized {
                reason: DenialReason::OutOfScope,
                requested: Some(requested.clone()),
                user_region: user_region.to_string(),
            })
        }
    }
}

/// "top districts like pune": a single district cannot be ranked among
/// districts, so the named region only served as a reference.
fn ranks_across(descriptor: &QueryDescriptor, requested: &RegionCode) -> bool {
    if descriptor.comparison_type != ComparisonType::TopN {
        return false;
    }
    descriptor
        .dimension
        .and_then(|dimension| dimension.region_level())
        .is_some_and(|level| requested.level() >= level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Dimension, Indicator};

    fn code(s: &str) -> RegionCode {
        RegionCode::parse(s).unwrap()
    }

    fn request(region: Option<&str>) -> QueryDescriptor {
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount);
        match region {
            Some(r) => descriptor.with_region(code(r)),
            None => descriptor,
        }
    }

    #[test]
    fn test_absent_filter_uses_user_region() {
        let scope = authorize(&request(None), "27490").unwrap();
        assert_eq!(scope.effective_region, code("27490"));
        assert_eq!(scope.user_region, code("27490"));
    }

    #[test]
    fn test_state_user_can_read_districts() {
        let scope = authorize(&request(Some("27490")), "27").unwrap();
        assert_eq!(scope.effective_region, code("27490"));
        assert!(scope.permits(&code("2749000001")));
    }

    #[test]
    fn test_sibling_district_is_rejected() {
        let denied = authorize(&request(Some("27482")), "27490").unwrap_err();
        assert_eq!(denied.reason, DenialReason::OutOfScope);
        assert_eq!(denied.requested, Some(code("27482")));
        assert!(!denied.message().contains("27482"));
    }

    #[test]
    fn test_parent_and_other_state_are_rejected() {
        assert!(authorize(&request(Some("27")), "27490").is_err());
        assert!(authorize(&request(Some("24")), "27").is_err());
        assert!(authorize(&request(Some("24438")), "27").is_err());
    }

    fn ranking(region: &str) -> QueryDescriptor {
        let mut descriptor = request(Some(region)).with_dimension(Dimension::District);
        descriptor.comparison_type = ComparisonType::TopN;
        descriptor.top_n = Some(5);
        descriptor
    }

    #[test]
    fn test_ranking_widens_in_scope_region() {
        let scope = authorize(&ranking("27490"), "27").unwrap();
        assert_eq!(scope.effective_region, code("27"));

        // a state filter still bounds a district ranking
        let scope = authorize(&ranking("27"), "27").unwrap();
        assert_eq!(scope.effective_region, code("27"));
    }

    #[test]
    fn test_ranking_cannot_reach_out_of_scope_region() {
        let denied = authorize(&ranking("24438"), "27").unwrap_err();
        assert_eq!(denied.reason, DenialReason::OutOfScope);
        assert_eq!(denied.requested, Some(code("24438")));
        assert!(authorize(&ranking("27482"), "27490").is_err());
    }

    #[test]
    fn test_malformed_user_region() {
        let denied = authorize(&request(None), "").unwrap_err();
        assert_eq!(denied.reason, DenialReason::InvalidUserRegion);
        assert!(authorize(&request(None), "2749").is_err());
    }

    #[test]
    fn test_authorization_is_monotonic() {
        let users = ["27", "27490", "2749000001", "24"];
        let requests = [None, Some("27"), Some("27490"), Some("27482"), Some("2749000001"), Some("24438")];
        for user in users {
            for requested in requests {
                if authorize(&request(requested), user).is_err() {
                    continue;
                }
                let narrowed = requested.unwrap_or(user);
                for finer in ["2749000001", "27490"] {
                    if code(finer).is_descendant_or_equal(&code(narrowed)) {
                        assert!(
                            authorize(&request(Some(finer)), user).is_ok(),
                            "{} allowed {:?} but not {}",
                            user,
                            requested,
                            finer
                        );
                    }
                }
            }
        }
    }
}
