use std::net::Ipv4Addr;

use crate::error::CalcError;

/// Number of bits in an IPv4 address.
pub const ADDRESS_BITS: u8 = 32;

/// Mask with the top `prefix_len` bits set. Lengths above 32 give an all-ones mask.
pub fn prefix_to_mask(prefix_len: u8) -> u32 {
    u32::MAX
        .checked_shl(ADDRESS_BITS.saturating_sub(prefix_len) as u32)
        .unwrap_or(0)
}

/// Validate a dotted mask and return its prefix length.
///
/// The mask must be a run of ones followed only by zeros, e.g. `255.255.240.0`.
/// `0.0.0.0` and `255.255.255.255` are both accepted.
pub fn mask_to_prefix(mask: Ipv4Addr) -> Result<u8, CalcError> {
    let bits = u32::from(mask);
    let mut prefix_len = 0;
    let mut seen_zero = false;

    for i in (0..ADDRESS_BITS).rev() {
        let bit_set = bits & (1u32 << i) != 0;
        if seen_zero {
            if bit_set {
                return Err(CalcError::InvalidMask(mask));
            }
        } else if bit_set {
            prefix_len += 1;
        } else {
            seen_zero = true;
        }
    }

    Ok(prefix_len)
}

/// Length of the longest common leading bit run of two addresses.
///
/// Order does not matter, and equal addresses give 32.
pub fn common_prefix_len(one: Ipv4Addr, other: Ipv4Addr) -> u8 {
    (u32::from(one) ^ u32::from(other)).leading_zeros() as u8
}

#[test]
fn test_prefix_to_mask() {
    assert_eq!(prefix_to_mask(0), 0);
    assert_eq!(prefix_to_mask(1), 0x8000_0000);
    assert_eq!(prefix_to_mask(24), 0xFFFF_FF00);
    assert_eq!(prefix_to_mask(31), 0xFFFF_FFFE);
    assert_eq!(prefix_to_mask(32), u32::MAX);
    assert_eq!(prefix_to_mask(40), u32::MAX);
}

#[test]
fn test_mask_prefix_round_trip() -> anyhow::Result<()> {
    for prefix_len in 0..=ADDRESS_BITS {
        let mask = Ipv4Addr::from(prefix_to_mask(prefix_len));
        assert_eq!(mask_to_prefix(mask)?, prefix_len, "mask {mask}");
    }
    Ok(())
}

#[test]
fn test_mask_to_prefix_edges() -> anyhow::Result<()> {
    assert_eq!(mask_to_prefix(Ipv4Addr::new(0, 0, 0, 0))?, 0);
    assert_eq!(mask_to_prefix(Ipv4Addr::new(255, 255, 255, 255))?, 32);
    assert_eq!(mask_to_prefix(Ipv4Addr::new(255, 255, 240, 0))?, 20);
    Ok(())
}

#[test]
fn test_mask_to_prefix_rejects_gaps() {
    for mask in [
        Ipv4Addr::new(255, 0, 255, 0),
        Ipv4Addr::new(0, 0, 0, 1),
        Ipv4Addr::new(255, 255, 255, 253),
        Ipv4Addr::new(127, 255, 255, 255),
    ] {
        assert_eq!(mask_to_prefix(mask), Err(CalcError::InvalidMask(mask)));
    }
}

#[test]
fn test_common_prefix_len() {
    let a = Ipv4Addr::new(192, 168, 1, 0);
    let b = Ipv4Addr::new(192, 168, 1, 255);
    assert_eq!(common_prefix_len(a, b), 24);
    assert_eq!(common_prefix_len(b, a), 24);
    assert_eq!(common_prefix_len(a, a), 32);
    assert_eq!(
        common_prefix_len(Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(128, 0, 0, 0)),
        0
    );
    assert_eq!(
        common_prefix_len(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)),
        30
    );
}
