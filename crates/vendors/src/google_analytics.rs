//! Google Analytics Data API (GA4) daily reports.
//!
//! Authenticates with a pre-issued OAuth access token.

use beacon_core::metrics::{round2, DateRange};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::error::{parse_response, VendorError};
use crate::lenient;
use crate::{env_nonempty, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://analyticsdata.googleapis.com";

/// Report metrics, in request order.
const REPORT_METRICS: [&str; 7] = [
    "sessions",
    "totalUsers",
    "newUsers",
    "screenPageViews",
    "bounceRate",
    "averageSessionDuration",
    "conversions",
];

#[derive(Debug, Clone)]
pub struct GaConfig {
    pub access_token: String,
    pub base_url: String,
}

impl GaConfig {
    pub fn from_env() -> Option<Self> {
        let access_token = env_nonempty("GA_ACCESS_TOKEN")?;
        let base_url = env_nonempty("GA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Some(Self {
            access_token,
            base_url: trim_base_url(base_url),
        })
    }
}

/// One property-day of traffic.
///
/// `bounce_rate` is a percentage (0-100); GA reports a fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct GaDailyRow {
    pub date: NaiveDate,
    pub sessions: i64,
    pub total_users: i64,
    pub new_users: i64,
    pub page_views: i64,
    pub bounce_rate: f64,
    pub avg_session_duration: f64,
    pub conversions: i64,
}

pub struct GaClient {
    client: reqwest::Client,
    config: GaConfig,
}

impl GaClient {
    pub fn new(config: GaConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GaConfig) -> Self {
        Self { client, config }
    }

    /// Run a per-day report for one property over `range`.
    pub async fn run_daily_report(
        &self,
        property_id: &str,
        range: DateRange,
    ) -> Result<Vec<GaDailyRow>, VendorError> {
        let body = json!({
            "dateRanges": [{
                "startDate": range.start.format("%Y-%m-%d").to_string(),
                "endDate": range.end.format("%Y-%m-%d").to_string(),
            }],
            "dimensions": [{"name": "date"}],
            "metrics": REPORT_METRICS.iter().map(|m| json!({"name": m})).collect::<Vec<_>>(),
            "keepEmptyRows": true,
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/properties/{}:runReport",
                self.config.base_url, property_id
            ))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        let report: Value = parse_response(response).await?;
        parse_run_report(&report)
    }
}

/// Turn a `runReport` response into rows.
///
/// Metric values are located by the names in `metricHeaders`, so the
/// column order of the response does not matter. A report with no rows
/// yields an empty list.
pub fn parse_run_report(report: &Value) -> Result<Vec<GaDailyRow>, VendorError> {
    let headers: Vec<&str> = report
        .get("metricHeaders")
        .and_then(Value::as_array)
        .map(|hs| {
            hs.iter()
                .map(|h| h.get("name").and_then(Value::as_str).unwrap_or(""))
                .collect()
        })
        .unwrap_or_else(|| REPORT_METRICS.to_vec());

    let Some(rows) = report.get("rows").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    rows.iter()
        .map(|row| {
            let raw_date = row
                .pointer("/dimensionValues/0/value")
                .and_then(Value::as_str)
                .ok_or_else(|| VendorError::Decode("report row has no date".into()))?;
            let date = NaiveDate::parse_from_str(raw_date, "%Y%m%d")
                .map_err(|e| VendorError::Decode(format!("bad report date '{raw_date}': {e}")))?;

            let values = row
                .get("metricValues")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let metric = |name: &str| -> f64 {
                headers
                    .iter()
                    .position(|h| *h == name)
                    .and_then(|i| values.get(i))
                    .and_then(|v| v.get("value"))
                    .map(lenient::number)
                    .unwrap_or(0.0)
            };

            Ok(GaDailyRow {
                date,
                sessions: metric("sessions").round() as i64,
                total_users: metric("totalUsers").round() as i64,
                new_users: metric("newUsers").round() as i64,
                page_views: metric("screenPageViews").round() as i64,
                bounce_rate: round2(metric("bounceRate") * 100.0),
                avg_session_duration: round2(metric("averageSessionDuration")),
                conversions: metric("conversions").round() as i64,
            })
        })
        .collect()
}
