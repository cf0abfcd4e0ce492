use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use tracing::{info, warn};

use crate::models::RawEarningsRecord;
use crate::service::finance::FinanceServiceError;

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default, rename = "earningsCalendar")]
    earnings_calendar: Option<Vec<RawEarningsRecord>>,
    #[serde(default)]
    error: Option<String>,
}

/// Fetch earnings for an inclusive date range from the Finnhub calendar endpoint.
pub async fn fetch_earnings_range(
    client: &reqwest::Client,
    api_url: &str,
    token: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<RawEarningsRecord>, FinanceServiceError> {
    info!("Fetching earnings from {} to {}", from, to);

    let from_str = from.format("%Y-%m-%d").to_string();
    let to_str = to.format("%Y-%m-%d").to_string();

    let resp = client
        .get(api_url)
        .query(&[
            ("from", from_str.as_str()),
            ("to", to_str.as_str()),
            ("token", token),
        ])
        .send()
        .await
        .map_err(|e| {
            // reqwest errors carry the full URL, token included
            let e = e.without_url();
            warn!("Earnings API request failed: {}", e);
            if e.is_builder() {
                FinanceServiceError::InvalidRequest(format!("earnings request could not be built: {e}"))
            } else {
                FinanceServiceError::Http(format!("earnings request failed: {e}"))
            }
        })?;

    info!("Received response with status: {}", resp.status());

    if !resp.status().is_success() {
        let status = resp.status();
        let retry_after = parse_retry_after(resp.headers().get(RETRY_AFTER));
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "unable to read body".to_string());
        let body = body_preview(&body);
        warn!("Earnings API returned error status {}: {}", status, body);
        return Err(FinanceServiceError::Status {
            status: status.as_u16(),
            body,
            retry_after,
        });
    }

    let raw_bytes = resp.bytes().await.map_err(|e| {
        warn!("Failed to read earnings API body: {}", e);
        FinanceServiceError::Http(format!("earnings body read failed: {}", e.without_url()))
    })?;

    let records = parse_earnings_body(&raw_bytes)?;
    info!("Successfully parsed earnings payload; {} records", records.len());

    Ok(records)
}

/// Decode a Finnhub earnings-calendar response body.
///
/// A body without an `earningsCalendar` array is an empty result unless it
/// carries an `error` message.
pub fn parse_earnings_body(raw_bytes: &[u8]) -> Result<Vec<RawEarningsRecord>, FinanceServiceError> {
    let parsed: ApiResponse = serde_json::from_slice(raw_bytes).map_err(|e| {
        let preview = String::from_utf8_lossy(&raw_bytes[..raw_bytes.len().min(500)]);
        warn!(
            "Failed to parse earnings API response: {}; body preview: {}",
            e, preview
        );
        FinanceServiceError::Parse(e.to_string())
    })?;

    match (parsed.earnings_calendar, parsed.error) {
        (Some(records), _) => Ok(records),
        (None, Some(message)) => Err(FinanceServiceError::Api(message)),
        (None, None) => Ok(Vec::new()),
    }
}

fn parse_retry_after(value: Option<&reqwest::header::HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

// Keeps status diagnostics on one line.
fn body_preview(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = collapsed.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;
    use crate::models::Amount;

    #[test]
    fn parses_calendar_array() {
        let body = br#"{"earningsCalendar":[
            {"date":"2024-05-10","epsEstimate":1.5,"hour":"bmo","quarter":2,"revenueEstimate":456000000,"symbol":"ACME","year":2024},
            {"date":"","symbol":"NODATE"}
        ]}"#;

        let records = parse_earnings_body(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol.as_deref(), Some("ACME"));
        assert_eq!(records[0].revenue_estimate, Some(Amount::Number(456_000_000.0)));
        assert_eq!(records[1].date_str(), None);
    }

    #[test]
    fn missing_array_is_empty() {
        assert!(parse_earnings_body(b"{}").unwrap().is_empty());
        assert!(parse_earnings_body(br#"{"earningsCalendar":null}"#).unwrap().is_empty());
    }

    #[test]
    fn error_message_is_surfaced() {
        let err = parse_earnings_body(br#"{"error":"Invalid API key."}"#).unwrap_err();
        assert!(matches!(err, FinanceServiceError::Api(ref m) if m == "Invalid API key."));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = parse_earnings_body(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, FinanceServiceError::Parse(_)));
    }

    #[tokio::test]
    async fn unbuildable_request_is_invalid_not_transport() {
        let client = reqwest::Client::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let err = fetch_earnings_range(&client, "not a url", "secret", day, day)
            .await
            .unwrap_err();
        assert!(matches!(err, FinanceServiceError::InvalidRequest(_)));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn retry_after_seconds() {
        let value = HeaderValue::from_static("7");
        assert_eq!(parse_retry_after(Some(&value)), Some(Duration::from_secs(7)));

        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn body_preview_is_single_line_and_bounded() {
        assert_eq!(body_preview("line one\n  line two"), "line one line two");

        let long = "x".repeat(BODY_PREVIEW_CHARS + 50);
        let preview = body_preview(&long);
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }
}
