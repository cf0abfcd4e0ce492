use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::RawEarningsRecord;
use crate::service::calendar::numbers::{abbreviate, MISSING};
use crate::service::calendar::text::escape_text;

/// Right-hand side of every event UID.
pub const UID_DOMAIN: &str = "earnings-calendar";
/// Stand-in for records that arrive without a ticker.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const SOURCE_LINE: &str = "Source: Finnhub (non-GAAP)";

const DTSTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const ICS_DATE_FORMAT: &str = "%Y%m%d";

/// One all-day earnings event, ready to be written as a VEVENT.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub start: NaiveDate,
    /// Exclusive end, the day after `start`.
    pub end: NaiveDate,
    pub summary: String,
    pub description: String,
}

impl CalendarEvent {
    /// Build the event for a record, or `None` if its date is missing or
    /// unparseable.
    pub fn from_record(record: &RawEarningsRecord) -> Option<Self> {
        let start = parse_event_date(record.date_str()?)?;
        let end = start.succ_opt()?;
        let symbol = display_symbol(record);

        Some(Self {
            uid: format!("{}-{}@{}", symbol, start.format(ICS_DATE_FORMAT), UID_DOMAIN),
            start,
            end,
            summary: format!("{symbol} Earnings"),
            description: describe(record, symbol),
        })
    }

    /// Unfolded content lines for this event's VEVENT block.
    pub fn content_lines(&self, dtstamp: &str) -> Vec<String> {
        vec![
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", escape_text(&self.uid)),
            format!("DTSTAMP:{dtstamp}"),
            format!("DTSTART;VALUE=DATE:{}", self.start.format(ICS_DATE_FORMAT)),
            format!("DTEND;VALUE=DATE:{}", self.end.format(ICS_DATE_FORMAT)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            "END:VEVENT".to_string(),
        ]
    }
}

/// Encode one record as the unfolded lines of a VEVENT block.
///
/// Returns `None` for records without a usable date; the document builder
/// filters those out before calling this.
pub fn encode_event(record: &RawEarningsRecord, dtstamp: &str) -> Option<Vec<String>> {
    CalendarEvent::from_record(record).map(|event| event.content_lines(dtstamp))
}

/// DTSTAMP value for a UTC instant, e.g. `20240510T143000Z`.
pub fn format_dtstamp(instant: DateTime<Utc>) -> String {
    instant.format(DTSTAMP_FORMAT).to_string()
}

/// Parse a provider date. Plain ISO dates are the norm; a full ISO datetime is
/// accepted and truncated to its date.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()).ok())
}

pub(crate) fn display_symbol(record: &RawEarningsRecord) -> &str {
    record
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SYMBOL)
}

fn describe(record: &RawEarningsRecord, symbol: &str) -> String {
    let quarter = record
        .quarter
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(MISSING);
    let eps = record
        .eps_estimate
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| MISSING.to_string());

    [
        format!("Ticker: {symbol}"),
        format!("Fiscal Qtr: {quarter}"),
        format!("Estimate EPS: {eps}"),
        format!("Est. Revenue: {}", abbreviate(record.revenue_estimate.as_ref())),
        SOURCE_LINE.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;

    const STAMP: &str = "20240501T120000Z";

    #[test]
    fn all_day_span_uses_exclusive_end() {
        let lines = encode_event(&RawEarningsRecord::new("ACME", "2024-05-10"), STAMP).unwrap();
        assert!(lines.contains(&"DTSTART;VALUE=DATE:20240510".to_string()));
        assert!(lines.contains(&"DTEND;VALUE=DATE:20240511".to_string()));
    }

    #[test]
    fn end_rolls_over_month_and_year() {
        let event = CalendarEvent::from_record(&RawEarningsRecord::new("X", "2024-12-31")).unwrap();
        assert_eq!(event.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let leap = CalendarEvent::from_record(&RawEarningsRecord::new("X", "2024-02-28")).unwrap();
        assert_eq!(leap.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn block_layout() {
        let record = RawEarningsRecord {
            quarter: Some("2".into()),
            eps_estimate: Some(Amount::Number(1.52)),
            revenue_estimate: Some(Amount::Number(1_234_567_890.0)),
            ..RawEarningsRecord::new("ACME", "2024-05-10")
        };

        let lines = encode_event(&record, STAMP).unwrap();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VEVENT",
                "UID:ACME-20240510@earnings-calendar",
                "DTSTAMP:20240501T120000Z",
                "DTSTART;VALUE=DATE:20240510",
                "DTEND;VALUE=DATE:20240511",
                "SUMMARY:ACME Earnings",
                "DESCRIPTION:Ticker: ACME\\nFiscal Qtr: 2\\nEstimate EPS: 1.52\\nEst. Revenue: 1.23 B\\nSource: Finnhub (non-GAAP)",
                "END:VEVENT",
            ]
        );
    }

    #[test]
    fn missing_fields_render_dash() {
        let event = CalendarEvent::from_record(&RawEarningsRecord::new("ACME", "2024-05-10")).unwrap();
        assert_eq!(
            event.description,
            "Ticker: ACME\nFiscal Qtr: -\nEstimate EPS: -\nEst. Revenue: -\nSource: Finnhub (non-GAAP)"
        );
    }

    #[test]
    fn missing_symbol_uses_placeholder() {
        let record = RawEarningsRecord {
            date: Some("2024-05-10".into()),
            ..RawEarningsRecord::default()
        };
        let event = CalendarEvent::from_record(&record).unwrap();
        assert_eq!(event.summary, "UNKNOWN Earnings");
        assert_eq!(event.uid, "UNKNOWN-20240510@earnings-calendar");
    }

    #[test]
    fn text_fields_are_escaped() {
        let lines = encode_event(&RawEarningsRecord::new("BRK,B;A", "2024-05-10"), STAMP).unwrap();
        assert_eq!(lines[1], "UID:BRK\\,B\\;A-20240510@earnings-calendar");
        assert_eq!(lines[5], "SUMMARY:BRK\\,B\\;A Earnings");
    }

    #[test]
    fn unusable_dates_are_rejected() {
        assert_eq!(encode_event(&RawEarningsRecord::new("ACME", ""), STAMP), None);
        assert_eq!(encode_event(&RawEarningsRecord::new("ACME", "soon"), STAMP), None);
        assert_eq!(encode_event(&RawEarningsRecord::new("ACME", "2024-13-40"), STAMP), None);
    }

    #[test]
    fn parses_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 10);
        assert_eq!(parse_event_date("2024-05-10"), expected);
        assert_eq!(parse_event_date(" 2024-05-10 "), expected);
        assert_eq!(parse_event_date("2024-05-10T16:30:00"), expected);
        assert_eq!(parse_event_date("2024-05-10T16:30:00-04:00"), expected);
    }

    #[test]
    fn dtstamp_format() {
        let instant = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_dtstamp(instant), STAMP);
    }
}
