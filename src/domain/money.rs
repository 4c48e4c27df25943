use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision
/// issues. $50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a currency string with thousands separators.
/// Example: 5000 -> "$50.00", 102000000 -> "$1,020,000.00"
pub fn format_money(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Parse a money string into cents. Tolerates the loose input the counter
/// staff actually types: currency symbols, spaces, thousands separators and
/// a comma as decimal separator.
/// Example: "50.00" -> 5000, "$ 50,5" -> 5050, "1,000,000" -> 100000000
pub fn parse_money(input: &str) -> Result<Cents, ParseMoneyError> {
    let clean: String = input
        .chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect();

    let negative = clean.starts_with('-');
    let clean = clean.trim_start_matches('-');
    if clean.is_empty() {
        return Err(ParseMoneyError::InvalidFormat);
    }

    // A single comma acts as decimal separator ("50,5") unless it is
    // followed by a group of three digits, which marks thousands
    // separators ("1,000" or "1,000,000").
    let normalized = if clean.matches(',').count() == 1 && !clean.contains('.') {
        let after = clean.split(',').nth(1).unwrap_or("");
        if after.len() == 3 && after.chars().all(|c| c.is_ascii_digit()) {
            clean.replace(',', "")
        } else {
            clean.replace(',', ".")
        }
    } else {
        clean.replace(',', "")
    };

    let parts: Vec<&str> = normalized.split('.').collect();
    let cents = match parts.as_slice() {
        [whole] => {
            let units: i64 = whole.parse().map_err(|_| ParseMoneyError::InvalidFormat)?;
            units * 100
        }
        [whole, decimal] => {
            let units: i64 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| ParseMoneyError::InvalidFormat)?
            };
            // Plain digits only; the byte slice below relies on it.
            if !decimal.chars().all(|c| c.is_ascii_digit()) {
                return Err(ParseMoneyError::InvalidFormat);
            }
            let decimal_cents: i64 = match decimal.len() {
                0 => 0,
                1 => {
                    decimal
                        .parse::<i64>()
                        .map_err(|_| ParseMoneyError::InvalidFormat)?
                        * 10
                }
                // More than 2 decimal places gets truncated
                _ => decimal[..2]
                    .parse()
                    .map_err(|_| ParseMoneyError::InvalidFormat)?,
            };
            units * 100 + decimal_cents
        }
        _ => return Err(ParseMoneyError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    InvalidFormat,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoneyError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseMoneyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(5000), "$50.00");
        assert_eq!(format_money(1234), "$12.34");
        assert_eq!(format_money(1), "$0.01");
        assert_eq!(format_money(0), "$0.00");
        assert_eq!(format_money(-5000), "-$50.00");
        assert_eq!(format_money(102_000_000), "$1,020,000.00");
        assert_eq!(format_money(100_000), "$1,000.00");
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("50.00"), Ok(5000));
        assert_eq!(parse_money("50"), Ok(5000));
        assert_eq!(parse_money("12.34"), Ok(1234));
        assert_eq!(parse_money("12.5"), Ok(1250));
        assert_eq!(parse_money(".50"), Ok(50));
        assert_eq!(parse_money("-50.00"), Ok(-5000));
        assert_eq!(parse_money("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_money_loose_input() {
        assert_eq!(parse_money("$ 50"), Ok(5000));
        assert_eq!(parse_money("$50,5"), Ok(5050));
        assert_eq!(parse_money("50,50"), Ok(5050));
        assert_eq!(parse_money("1,000,000"), Ok(100_000_000));
        assert_eq!(parse_money("1,000"), Ok(100_000));
    }

    #[test]
    fn test_parse_money_invalid() {
        assert!(parse_money("abc").is_err());
        assert!(parse_money("12.34.56").is_err());
        assert!(parse_money("").is_err());
        assert!(parse_money("$").is_err());
    }

    #[test]
    fn test_parse_money_non_digit_decimals_rejected() {
        // Multi-byte characters in the decimal part must error, not panic.
        assert_eq!(parse_money("1.€99"), Err(ParseMoneyError::InvalidFormat));
        assert_eq!(parse_money("1.9€"), Err(ParseMoneyError::InvalidFormat));
        assert_eq!(parse_money("1.9x"), Err(ParseMoneyError::InvalidFormat));
    }
}
