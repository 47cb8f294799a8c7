use std::fmt;

/// Prices are whole shillings; the currency has no fractional unit in use.
pub type Amount = u64;

/// Format an amount with thousands separators.
/// Example: 15000 -> "15,000", 999 -> "999"
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a price cell into whole shillings.
/// Accepts "15000", "15,000" and whole decimals such as "15000.0" (spreadsheet exports
/// tend to write integers that way). Negative or fractional values are rejected.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim().replace(',', "");
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(ParseAmountError::Negative);
    }

    let (units, fraction) = match input.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (input.as_str(), ""),
    };

    if !fraction.chars().all(|c| c == '0') {
        return Err(ParseAmountError::Fractional);
    }

    units
        .trim_start_matches('+')
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    Negative,
    Fractional,
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "price is empty"),
            ParseAmountError::Negative => write!(f, "price cannot be negative"),
            ParseAmountError::Fractional => write!(f, "price must be a whole amount"),
            ParseAmountError::InvalidFormat => write!(f, "invalid price format"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(15000), "15,000");
        assert_eq!(format_amount(1234567), "1,234,567");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("15000"), Ok(15000));
        assert_eq!(parse_amount(" 500 "), Ok(500));
        assert_eq!(parse_amount("15,000"), Ok(15000));
        assert_eq!(parse_amount("15000.0"), Ok(15000));
        assert_eq!(parse_amount("0"), Ok(0));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("-5"), Err(ParseAmountError::Negative));
        assert_eq!(parse_amount("12.5"), Err(ParseAmountError::Fractional));
        assert_eq!(parse_amount("abc"), Err(ParseAmountError::InvalidFormat));
    }
}
