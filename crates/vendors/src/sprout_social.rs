//! Sprout Social profile analytics.

use std::collections::BTreeSet;

use beacon_core::metrics::DateRange;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::error::{parse_response, VendorError};
use crate::lenient;
use crate::{env_nonempty, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.sproutsocial.com";

/// Upper bound on report pages fetched per request.
const MAX_REPORT_PAGES: u32 = 50;

const METRIC_FOLLOWERS: &str = "lifetime_snapshot.followers_count";
const METRIC_IMPRESSIONS: &str = "impressions";
const METRIC_ENGAGEMENTS: &str = "engagements";
const METRIC_POSTS: &str = "posts_sent_count";
const METRIC_LINK_CLICKS: &str = "post_link_clicks";

#[derive(Debug, Clone)]
pub struct SproutConfig {
    pub api_token: String,
    pub customer_id: String,
    pub base_url: String,
}

impl SproutConfig {
    pub fn from_env() -> Option<Self> {
        let api_token = env_nonempty("SPROUT_API_TOKEN")?;
        let customer_id = env_nonempty("SPROUT_CUSTOMER_ID")?;
        let base_url = env_nonempty("SPROUT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Some(Self {
            api_token,
            customer_id,
            base_url: trim_base_url(base_url),
        })
    }
}

/// One profile-day of social activity.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialDailyRow {
    pub profile_id: i64,
    pub date: NaiveDate,
    pub impressions: i64,
    pub engagements: i64,
    pub followers: i64,
    pub posts_published: i64,
    pub link_clicks: i64,
}

pub struct SproutClient {
    client: reqwest::Client,
    config: SproutConfig,
}

impl SproutClient {
    pub fn new(config: SproutConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: SproutConfig) -> Self {
        Self { client, config }
    }

    /// Daily metrics for `profile_ids` over `range`, across all report pages.
    pub async fn profile_daily_metrics(
        &self,
        profile_ids: &[i64],
        range: DateRange,
    ) -> Result<Vec<SocialDailyRow>, VendorError> {
        if profile_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: BTreeSet<i64> = profile_ids.iter().copied().collect();
        let id_list = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");

        let mut rows = Vec::new();
        let mut page = 1;
        loop {
            let body = json!({
                "filters": [
                    format!("customer_profile_id.eq({id_list})"),
                    format!("reporting_period.in({}...{})", range.start, range.end),
                ],
                "metrics": [
                    METRIC_FOLLOWERS, METRIC_IMPRESSIONS, METRIC_ENGAGEMENTS,
                    METRIC_POSTS, METRIC_LINK_CLICKS,
                ],
                "page": page,
            });

            let response = self
                .client
                .post(format!(
                    "{}/v1/{}/analytics/profiles",
                    self.config.base_url, self.config.customer_id
                ))
                .bearer_auth(&self.config.api_token)
                .json(&body)
                .send()
                .await?;
            let report: Value = parse_response(response).await?;
            rows.extend(parse_profile_report(&report)?);

            let last_page = total_pages(&report);
            if page >= last_page {
                break;
            }
            if page >= MAX_REPORT_PAGES {
                tracing::warn!(total_pages = last_page, "Sprout report truncated at page cap");
                break;
            }
            page += 1;
        }
        Ok(rows)
    }
}

/// Parse one page of the profile analytics report.
pub fn parse_profile_report(report: &Value) -> Result<Vec<SocialDailyRow>, VendorError> {
    let Some(data) = report.get("data").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    data.iter()
        .map(|entry| {
            let dims = entry
                .get("dimensions")
                .ok_or_else(|| VendorError::Decode("report entry has no dimensions".into()))?;
            let profile_id = dims
                .get("customer_profile_id")
                .map(lenient::number)
                .filter(|id| *id > 0.0)
                .ok_or_else(|| VendorError::Decode("report entry has no profile id".into()))?
                as i64;
            let raw_date = dims
                .get("reporting_period.by(day)")
                .and_then(Value::as_str)
                .ok_or_else(|| VendorError::Decode("report entry has no day".into()))?;
            // Sprout sends either a bare date or a midnight timestamp.
            let date = NaiveDate::parse_from_str(raw_date.get(..10).unwrap_or(raw_date), "%Y-%m-%d")
                .map_err(|e| VendorError::Decode(format!("bad report day '{raw_date}': {e}")))?;

            let metric = |name: &str| -> i64 {
                entry
                    .get("metrics")
                    .and_then(|m| m.get(name))
                    .map(lenient::number)
                    .unwrap_or(0.0)
                    .round() as i64
            };

            Ok(SocialDailyRow {
                profile_id,
                date,
                impressions: metric(METRIC_IMPRESSIONS),
                engagements: metric(METRIC_ENGAGEMENTS),
                followers: metric(METRIC_FOLLOWERS),
                posts_published: metric(METRIC_POSTS),
                link_clicks: metric(METRIC_LINK_CLICKS),
            })
        })
        .collect()
}

/// `paging.total_pages`, saturating at `u32::MAX`; 1 when absent.
fn total_pages(report: &Value) -> u32 {
    report
        .pointer("/paging/total_pages")
        .and_then(Value::as_u64)
        .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn total_pages_saturates_instead_of_wrapping() {
        assert_eq!(total_pages(&json!({})), 1);
        assert_eq!(total_pages(&json!({"paging": {"total_pages": 3}})), 3);
        let huge = u64::from(u32::MAX) + 2;
        assert_eq!(total_pages(&json!({"paging": {"total_pages": huge}})), u32::MAX);
    }

    #[test]
    fn parses_profile_days() {
        let report = json!({
            "data": [{
                "dimensions": {
                    "customer_profile_id": 3301,
                    "reporting_period.by(day)": "2025-03-02T00:00:00Z"
                },
                "metrics": {
                    "lifetime_snapshot.followers_count": 1520,
                    "impressions": "900",
                    "engagements": 44,
                    "post_link_clicks": 7
                }
            }],
            "paging": {"current_page": 1, "total_pages": 1}
        });
        let rows = parse_profile_report(&report).unwrap();
        assert_eq!(
            rows,
            vec![SocialDailyRow {
                profile_id: 3301,
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                impressions: 900,
                engagements: 44,
                followers: 1520,
                posts_published: 0,
                link_clicks: 7,
            }]
        );
    }

    #[test]
    fn entry_without_profile_is_rejected() {
        let report = json!({"data": [{"dimensions": {"reporting_period.by(day)": "2025-03-02"}}]});
        assert_matches!(parse_profile_report(&report), Err(VendorError::Decode(_)));
    }

    #[test]
    fn missing_data_is_empty() {
        assert!(parse_profile_report(&json!({})).unwrap().is_empty());
    }
}
