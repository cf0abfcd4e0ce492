//! Content-line escaping and folding (RFC 5545 §3.1, §3.3.11).

/// Maximum line length in octets, not counting the CRLF.
pub const MAX_LINE_OCTETS: usize = 75;

/// Escapes text for an iCalendar TEXT value.
///
/// Backslash is escaped before the other characters so their own escapes are
/// not doubled. Carriage returns are dropped; the newline escape covers CRLF.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            ',' => result.push_str("\\,"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Reverses [`escape_text`]. Unknown escapes keep their backslash.
pub fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next) if matches!(next, ',' | ';' | '\\') => {
                result.push(next);
                chars.next();
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

/// Folds one logical content line into physical lines of at most `width`
/// octets.
///
/// The first physical line carries up to `width` octets; every continuation
/// starts with a single space followed by up to `width - 1` octets. A split
/// never lands inside a multi-byte character. Widths below 2 are treated as 2.
pub fn fold_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(2);
    if line.len() <= width {
        return vec![line.to_string()];
    }

    let mut physical = Vec::with_capacity(line.len() / (width - 1) + 1);
    let mut rest = line;
    let mut limit = width;

    while !rest.is_empty() {
        let (head, tail) = rest.split_at(split_point(rest, limit));
        if physical.is_empty() {
            physical.push(head.to_string());
        } else {
            physical.push(format!(" {head}"));
        }
        rest = tail;
        limit = width - 1;
    }

    physical
}

fn split_point(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }

    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    if end == 0 {
        // a single character wider than the limit; emit it whole
        end = s.char_indices().nth(1).map_or(s.len(), |(i, _)| i);
    }
    end
}
