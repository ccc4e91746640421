//! Human-readable value formatting.

/// Insert thousands separators into a string of digits, keeping any
/// leading minus sign.
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Group the integer part of an already-formatted decimal.
fn group_decimal(formatted: String) -> String {
    match formatted.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group_thousands(int), frac),
        None => group_thousands(&formatted),
    }
}

/// Duration in milliseconds: `Nms`, `N.Ns`, `Nm Ns` or `Nh Nm`; `-` for zero.
pub fn fmt_ms(ms: f64) -> String {
    if ms == 0.0 {
        return "-".to_string();
    }
    let ms = ms as i64;
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms < 3_600_000 {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1_000)
    } else {
        format!("{}h {}m", ms / 3_600_000, (ms % 3_600_000) / 60_000)
    }
}

/// Integer count with thousands separators.
pub fn fmt_count(n: i64) -> String {
    group_thousands(&n.to_string())
}

/// Number with thousands separators; non-integral values keep 2 decimals.
pub fn fmt_number(v: f64) -> String {
    if v.fract() == 0.0 {
        fmt_count(v as i64)
    } else {
        group_decimal(format!("{:.2}", v))
    }
}

/// US dollars with 4 decimals; `$0.00` for zero.
pub fn fmt_usd(v: f64) -> String {
    if v == 0.0 {
        return "$0.00".to_string();
    }
    format!("${}", group_decimal(format!("{:.4}", v)))
}

/// Percentage with one decimal.
pub fn fmt_pct(v: f64) -> String {
    format!("{:.1}%", v)
}

/// Ratio with three decimals.
pub fn fmt_ratio(v: f64) -> String {
    format!("{:.3}", v)
}

/// Rate with two decimals.
pub fn fmt_rate(v: f64) -> String {
    format!("{:.2}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_ms() {
        assert_eq!(fmt_ms(0.0), "-");
        assert_eq!(fmt_ms(250.0), "250ms");
        assert_eq!(fmt_ms(1_500.0), "1.5s");
        assert_eq!(fmt_ms(125_000.0), "2m 5s");
        assert_eq!(fmt_ms(7_380_000.0), "2h 3m");
    }

    #[test]
    fn test_fmt_count() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(123), "123");
        assert_eq!(fmt_count(1_234_567), "1,234,567");
        assert_eq!(fmt_count(-4_500), "-4,500");
    }

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(1_000.0), "1,000");
        assert_eq!(fmt_number(1_234.5), "1,234.50");
    }

    #[test]
    fn test_fmt_usd() {
        assert_eq!(fmt_usd(0.0), "$0.00");
        assert_eq!(fmt_usd(2.5), "$2.5000");
        assert_eq!(fmt_usd(12_345.6789), "$12,345.6789");
    }

    #[test]
    fn test_fixed_precision() {
        assert_eq!(fmt_pct(33.3), "33.3%");
        assert_eq!(fmt_ratio(0.25), "0.250");
        assert_eq!(fmt_rate(1.0), "1.00");
    }
}
