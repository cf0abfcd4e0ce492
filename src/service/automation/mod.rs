pub mod earnings_calendar;
