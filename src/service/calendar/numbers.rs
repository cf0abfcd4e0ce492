use crate::models::Amount;

/// Placeholder shown for missing or unusable figures.
pub const MISSING: &str = "-";

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Abbreviate a monetary figure for display.
///
/// `1_234_567_890` becomes `"1.23 B"`, `456_000_000` becomes `"456 M"`, smaller
/// values are rounded to whole units. Missing values, zero and anything that
/// isn't a finite number render as `"-"`.
pub fn abbreviate(amount: Option<&Amount>) -> String {
    let value = match amount {
        None => return MISSING.to_string(),
        Some(Amount::Number(n)) if *n == 0.0 => return MISSING.to_string(),
        Some(Amount::Number(n)) => *n,
        Some(Amount::Text(s)) if s == "0" => return MISSING.to_string(),
        Some(Amount::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return MISSING.to_string(),
        },
    };

    if !value.is_finite() {
        return MISSING.to_string();
    }

    let abs = value.abs();
    if abs >= BILLION {
        format!("{:.2} B", value / BILLION)
    } else if abs >= MILLION {
        format!("{:.0} M", value / MILLION)
    } else {
        format!("{:.0}", value)
    }
}
