use chrono::{Days, NaiveDate, Utc};
use chrono_tz::America::New_York;

/// Today's date on the exchange calendar (US Eastern).
pub fn today_et() -> NaiveDate {
    Utc::now().with_timezone(&New_York).date_naive()
}

/// Inclusive `[today - lookbehind, today + lookahead]` fetch window, or
/// `None` if either end falls outside chrono's date range.
pub fn earnings_window(
    today: NaiveDate,
    lookbehind_days: u32,
    lookahead_days: u32,
) -> Option<(NaiveDate, NaiveDate)> {
    let from = today.checked_sub_days(Days::new(u64::from(lookbehind_days)))?;
    let to = today.checked_add_days(Days::new(u64::from(lookahead_days)))?;
    Some((from, to))
}
