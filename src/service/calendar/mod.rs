//! RFC 5545 calendar document construction for earnings announcements.

pub mod document;
pub mod event;
pub mod numbers;
pub mod text;

pub use document::{build_calendar, build_calendar_at, CalendarDocument};
pub use event::{encode_event, CalendarEvent};
pub use numbers::abbreviate;
pub use text::{escape_text, fold_line, unescape_text, MAX_LINE_OCTETS};
