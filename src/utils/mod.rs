//! Small shared helpers used across the export pipeline.

pub(crate) mod synchronization;

pub use synchronization::CancellationToken;

use crate::Result;

/// Parse a hexadecimal address argument, with or without a `0x` prefix.
///
/// Filter configuration accepts addresses as text; parsing happens when the
/// chain is built, never mid-stream.
///
/// # Errors
/// Returns [`Error::InvalidAddress`](crate::Error::InvalidAddress) if the
/// input is empty or contains a non-hexadecimal digit.
///
/// # Examples
///
/// ```rust
/// use heapscope::utils::parse_hex_address;
///
/// assert_eq!(parse_hex_address("0x1a").unwrap(), 0x1a);
/// assert_eq!(parse_hex_address("DEADBEEF").unwrap(), 0xDEAD_BEEF);
/// assert!(parse_hex_address("0xfoo").is_err());
/// ```
pub fn parse_hex_address(input: &str) -> Result<u64> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if digits.is_empty() {
        return Err(crate::Error::InvalidAddress(input.to_string()));
    }

    u64::from_str_radix(digits, 16).map_err(|_| crate::Error::InvalidAddress(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_address("0").unwrap(), 0);
        assert_eq!(parse_hex_address("0x0").unwrap(), 0);
        assert_eq!(parse_hex_address("0X7fff00a0").unwrap(), 0x7fff_00a0);
        assert_eq!(
            parse_hex_address("ffffffffffffffff").unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(parse_hex_address("").is_err());
        assert!(parse_hex_address("0x").is_err());
        assert!(parse_hex_address("12g4").is_err());
        assert!(parse_hex_address("-4").is_err());
    }
}
