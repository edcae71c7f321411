use ethers::types::U256;

use crate::errors::CustomError;

const SHORT_MESSAGE_LEN: usize = 100;

/// Convert a human decimal amount ("1.5") into base units for a token with `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, CustomError> {
    let invalid = || CustomError::InvalidAmountError(amount.to_string());
    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    // Extra fractional digits are only tolerated when they carry no value
    let fraction = fraction.trim_end_matches('0');
    let decimals = decimals as usize;
    if fraction.len() > decimals {
        return Err(invalid());
    }

    let digits = format!("{whole}{fraction:0<decimals$}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| invalid())
}

/// Helper function to format units with proper decimals
pub fn format_units(amount: U256, decimals: u8) -> String {
    let raw = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }

    let padded = format!("{raw:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);

    // Trim trailing zeros and decimal point if necessary
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// First line of an error message, cut down for display.
pub fn short_message(message: &str) -> String {
    let line = message.lines().next().unwrap_or_default().trim();
    match line.char_indices().nth(SHORT_MESSAGE_LEN) {
        Some((index, _)) => line[..index].to_string(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_amounts_into_base_units() {
        assert_eq!(
            parse_units("1.5", 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(parse_units("0.000001", 6).unwrap(), U256::one());
        assert_eq!(
            parse_units("10", 18).unwrap(),
            U256::exp10(19)
        );
        assert_eq!(parse_units(".5", 1).unwrap(), U256::from(5));
        assert_eq!(parse_units("7.", 0).unwrap(), U256::from(7));
        assert_eq!(parse_units("0", 18).unwrap(), U256::zero());
        assert_eq!(parse_units("1.2000000", 2).unwrap(), U256::from(120));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for input in ["abc", "-1", "", ".", "1.2.3", "+1", "1e18", "0x10", "1,5"] {
            assert_eq!(
                parse_units(input, 18),
                Err(CustomError::InvalidAmountError(input.to_string())),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_amounts_finer_than_decimals() {
        assert!(parse_units("0.0000001", 6).is_err());
        assert!(parse_units("1.5", 0).is_err());
    }

    #[test]
    fn rejects_amounts_that_overflow() {
        let huge = "9".repeat(80);
        assert!(parse_units(&huge, 18).is_err());
    }

    #[test]
    fn formats_base_units() {
        assert_eq!(format_units(U256::exp10(18), 18), "1");
        assert_eq!(
            format_units(U256::from_dec_str("1500000000000000000").unwrap(), 18),
            "1.5"
        );
        assert_eq!(format_units(U256::one(), 6), "0.000001");
        assert_eq!(format_units(U256::zero(), 18), "0");
        assert_eq!(format_units(U256::from(1200), 0), "1200");
    }

    #[test]
    fn short_message_keeps_first_line() {
        assert_eq!(short_message("nonce too low\nbacktrace"), "nonce too low");
        assert_eq!(short_message(&"x".repeat(150)).len(), 100);
        assert_eq!(short_message(""), "");
    }
}
