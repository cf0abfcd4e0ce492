use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::RawEarningsRecord;
use crate::service::calendar::event::{display_symbol, format_dtstamp, CalendarEvent};
use crate::service::calendar::text::{fold_line, MAX_LINE_OCTETS};

pub const PRODUCT_ID: &str = "-//earnings-calendar//Finnhub Earnings//EN";
pub const CALENDAR_NAME: &str = "Earnings Calendar";

const LINE_BREAK: &str = "\r\n";

/// A full earnings calendar: the events in output order plus the instant the
/// document was generated, shared by every DTSTAMP.
#[derive(Debug, Clone)]
pub struct CalendarDocument {
    generated_at: DateTime<Utc>,
    events: Vec<CalendarEvent>,
}

impl CalendarDocument {
    /// Filter, order and convert raw provider records.
    ///
    /// Records without a usable date are dropped. The rest are ordered by
    /// date string, then by the symbol as it appears in the summary (trimmed,
    /// `UNKNOWN` when missing); ISO dates sort chronologically that way. A later record repeating an earlier UID is dropped.
    pub fn from_records(records: &[RawEarningsRecord], generated_at: DateTime<Utc>) -> Self {
        let mut usable: Vec<&RawEarningsRecord> =
            records.iter().filter(|r| r.date_str().is_some()).collect();

        usable.sort_by(|a, b| {
            a.date_str()
                .cmp(&b.date_str())
                .then_with(|| display_symbol(a).cmp(display_symbol(b)))
        });

        let mut seen = HashSet::new();
        let mut events = Vec::with_capacity(usable.len());

        for record in usable {
            let Some(event) = CalendarEvent::from_record(record) else {
                warn!(
                    "Skipping {} earnings record with unparseable date {:?}",
                    record.symbol.as_deref().unwrap_or("unknown"),
                    record.date
                );
                continue;
            };
            if !seen.insert(event.uid.clone()) {
                debug!("Dropping duplicate earnings event {}", event.uid);
                continue;
            }
            events.push(event);
        }

        Self {
            generated_at,
            events,
        }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Logical content lines of the whole document, before folding.
    pub fn content_lines(&self) -> Vec<String> {
        let dtstamp = format_dtstamp(self.generated_at);

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{PRODUCT_ID}"),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            format!("X-WR-CALNAME:{CALENDAR_NAME}"),
        ];
        for event in &self.events {
            lines.extend(event.content_lines(&dtstamp));
        }
        lines.push("END:VCALENDAR".to_string());

        lines
    }

    /// Serialize to iCalendar text: folded lines joined by CRLF, with a
    /// trailing CRLF.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for line in self.content_lines() {
            for physical in fold_line(&line, MAX_LINE_OCTETS) {
                output.push_str(&physical);
                output.push_str(LINE_BREAK);
            }
        }
        output
    }
}

/// Build the calendar text with an explicit generation instant.
pub fn build_calendar_at(records: &[RawEarningsRecord], generated_at: DateTime<Utc>) -> String {
    CalendarDocument::from_records(records, generated_at).render()
}

/// Build the calendar text stamped with the current time.
pub fn build_calendar(records: &[RawEarningsRecord]) -> String {
    build_calendar_at(records, Utc::now())
}
