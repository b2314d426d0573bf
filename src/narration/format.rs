//! Indian-locale number formatting.
//!
//! Digits are grouped 3 then 2 (`12,34,567`); values of a lakh (1e5) or more
//! are abbreviated to lakh / crore (1e7).

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

/// Group an integer the Indian way: `1234567` → `12,34,567`.
pub fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Full value with Indian grouping and a fixed number of decimals.
pub fn format_indian(value: f64, decimals: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let rendered = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match rendered.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (rendered.as_str(), None),
    };
    let grouped = group_indian(whole.parse().unwrap_or(0));
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Narration-friendly value: "1.25 crore", "3.40 lakh", "12,345" or "845.50".
pub fn format_compact(value: f64, is_count: bool) -> String {
    let magnitude = value.abs();
    if magnitude >= CRORE {
        format!("{:.2} crore", value / CRORE)
    } else if magnitude >= LAKH {
        format!("{:.2} lakh", value / LAKH)
    } else if is_count {
        format_indian(value.round(), 0)
    } else {
        format_indian(value, 2)
    }
}

pub fn format_percent(share: f64) -> String {
    format!("{:.1}%", share)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_indian() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(1000), "1,000");
        assert_eq!(group_indian(123456), "1,23,456");
        assert_eq!(group_indian(12345678), "1,23,45,678");
    }

    #[test]
    fn test_format_indian_keeps_decimals() {
        assert_eq!(format_indian(98765.432, 2), "98,765.43");
        assert_eq!(format_indian(-1500.0, 0), "-1,500");
    }

    #[test]
    fn test_compact_abbreviations() {
        assert_eq!(format_compact(25_000_000.0, false), "2.50 crore");
        assert_eq!(format_compact(340_000.0, true), "3.40 lakh");
        assert_eq!(format_compact(12345.0, true), "12,345");
        assert_eq!(format_compact(845.5, false), "845.50");
    }
}
