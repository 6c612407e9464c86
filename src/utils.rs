use ethers::types::U256;

pub fn format_ether(wei: U256) -> String {
    ethers::utils::format_units(wei, "ether").unwrap_or_else(|_| "0.0".to_string())
}

/// Format a wei amount in ether without the trailing zero padding that
/// `format_units` produces (1.5 ETH renders as "1.5", zero as "0").
pub fn display_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Shorten an address-like string for display (0x1234...5678).
pub fn short_hex(value: &str) -> String {
    if value.len() > 12 {
        format!("{}...{}", &value[..6], &value[value.len() - 4..])
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ether_one_eth() {
        // 1 ETH = 10^18 wei
        let wei = U256::from(10u64.pow(18));
        assert_eq!(format_ether(wei), "1.000000000000000000");
    }

    #[test]
    fn test_display_ether_fractional() {
        // 1.5 ETH = 15 * 10^17 wei
        let wei = U256::from(15u64) * U256::from(10u64.pow(17));
        assert_eq!(display_ether(wei), "1.5");
    }

    #[test]
    fn test_display_ether_whole() {
        let wei = U256::from(2u64) * U256::from(10u64.pow(18));
        assert_eq!(display_ether(wei), "2");
    }

    #[test]
    fn test_display_ether_zero() {
        assert_eq!(display_ether(U256::zero()), "0");
    }

    #[test]
    fn test_display_ether_single_wei() {
        assert_eq!(display_ether(U256::one()), "0.000000000000000001");
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(
            short_hex("0x1234567890123456789012345678901234567890"),
            "0x1234...7890"
        );
        assert_eq!(short_hex("0x1234"), "0x1234");
    }
}
