use chrono::{Days, NaiveDate};

const ENTITY_PREFIX: &str = "POSTE_TN_REGION_";

/// First day of the trailing window ending on `end`, inclusive.
pub fn window_start(end: NaiveDate, days: u64) -> NaiveDate {
    end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Formats an amount with comma thousands separators and no decimals, e.g. `1,500,000`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Truncates on a char boundary, never splitting a multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn strip_entity_prefix(entity: &str) -> &str {
    entity.strip_prefix(ENTITY_PREFIX).unwrap_or(entity)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentage share, 0 when the whole is zero.
pub fn share_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(window_start(end, 90), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000.0), "1,500,000");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(-12345.6), "-12,346");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("élève", 2), "él");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("مرحبا", 3), "مرح");
    }

    #[test]
    fn test_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138089935).abs() < 1e-6);
        assert_eq!(share_percent(1.0, 0.0), 0.0);
        assert_eq!(strip_entity_prefix("POSTE_TN_REGION_SUD"), "SUD");
        assert_eq!(strip_entity_prefix("NORTH"), "NORTH");
    }
}
