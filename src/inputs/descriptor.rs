use std::net::Ipv4Addr;

use crate::{error::CalcError, utils::ADDRESS_BITS};

/// One address range descriptor as typed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Descriptor {
    /// `192.168.1.0-192.168.1.255`
    Range { start: Ipv4Addr, end: Ipv4Addr },
    /// `10.0.0.0/24`
    Cidr { address: Ipv4Addr, prefix_len: u8 },
    /// `10.0.0.0%255.255.255.0`
    Mask { address: Ipv4Addr, mask: Ipv4Addr },
}

const SEPARATORS: [char; 3] = ['-', '/', '%'];

/// Split on `sep`, giving an empty second half when it is absent.
fn halves(s: &str, sep: char) -> (&str, &str) {
    s.split_once(sep).unwrap_or((s, ""))
}

fn parse_address(address: &str, token: &str) -> Result<Ipv4Addr, CalcError> {
    address
        .parse::<Ipv4Addr>()
        .map_err(|_| CalcError::InvalidAddress {
            address: address.to_owned(),
            token: token.to_owned(),
        })
}

fn parse_prefix_len(prefix: &str, token: &str) -> Result<u8, CalcError> {
    match prefix.parse::<u8>() {
        Ok(prefix_len) if prefix_len <= ADDRESS_BITS => Ok(prefix_len),
        _ => Err(CalcError::InvalidPrefixLength {
            prefix: prefix.to_owned(),
            token: token.to_owned(),
        }),
    }
}

impl std::str::FromStr for Descriptor {
    type Err = CalcError;

    /// Parse a range, CIDR or mask descriptor
    ///
    /// Range form wins over CIDR form, which wins over mask form. A separator
    /// may appear at most once.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if SEPARATORS
            .iter()
            .any(|&sep| token.matches(sep).count() > 1)
        {
            return Err(CalcError::MalformedDescriptor(token.to_owned()));
        }
        let (start, end) = halves(token, '-');
        let (net_address, prefix) = halves(token, '/');
        let (mask_address, mask) = halves(token, '%');

        if !start.is_empty() && !end.is_empty() && prefix.is_empty() {
            Ok(Descriptor::Range {
                start: parse_address(start, token)?,
                end: parse_address(end, token)?,
            })
        } else if !net_address.is_empty() && !prefix.is_empty() && end.is_empty() {
            Ok(Descriptor::Cidr {
                address: parse_address(net_address, token)?,
                prefix_len: parse_prefix_len(prefix, token)?,
            })
        } else if !mask_address.is_empty() && !mask.is_empty() {
            Ok(Descriptor::Mask {
                address: parse_address(mask_address, token)?,
                mask: parse_address(mask, token)?,
            })
        } else {
            Err(CalcError::MalformedDescriptor(token.to_owned()))
        }
    }
}

#[test]
fn test_parse_range() -> anyhow::Result<()> {
    let descriptor = "192.168.1.0-192.168.1.255".parse::<Descriptor>()?;
    assert_eq!(
        descriptor,
        Descriptor::Range {
            start: Ipv4Addr::new(192, 168, 1, 0),
            end: Ipv4Addr::new(192, 168, 1, 255),
        }
    );
    Ok(())
}

#[test]
fn test_parse_cidr() -> anyhow::Result<()> {
    let descriptor = " 10.0.0.5/24 ".parse::<Descriptor>()?;
    assert_eq!(
        descriptor,
        Descriptor::Cidr {
            address: Ipv4Addr::new(10, 0, 0, 5),
            prefix_len: 24,
        }
    );
    assert_eq!(
        "0.0.0.0/0".parse::<Descriptor>()?,
        Descriptor::Cidr {
            address: Ipv4Addr::UNSPECIFIED,
            prefix_len: 0,
        }
    );
    Ok(())
}

#[test]
fn test_parse_mask() -> anyhow::Result<()> {
    let descriptor = "10.0.0.0%255.255.255.0".parse::<Descriptor>()?;
    assert_eq!(
        descriptor,
        Descriptor::Mask {
            address: Ipv4Addr::new(10, 0, 0, 0),
            mask: Ipv4Addr::new(255, 255, 255, 0),
        }
    );
    Ok(())
}

#[test]
fn test_parse_malformed() {
    for token in ["abc", "10.0.0.1-", "-10.0.0.1", "10.0.0.0/", "%255.0.0.0", "10.0.0.1-10.0.0.9/24"] {
        assert_eq!(
            token.parse::<Descriptor>(),
            Err(CalcError::MalformedDescriptor(token.to_owned())),
            "token {token}"
        );
    }
}

#[test]
fn test_parse_invalid_address() {
    assert_eq!(
        "10.0.0.256/8".parse::<Descriptor>(),
        Err(CalcError::InvalidAddress {
            address: "10.0.0.256".to_owned(),
            token: "10.0.0.256/8".to_owned(),
        })
    );
    assert_eq!(
        "10.0.0.1-10.0.0".parse::<Descriptor>(),
        Err(CalcError::InvalidAddress {
            address: "10.0.0".to_owned(),
            token: "10.0.0.1-10.0.0".to_owned(),
        })
    );
    assert_eq!(
        "10.0.0.0%255.255.x.0".parse::<Descriptor>(),
        Err(CalcError::InvalidAddress {
            address: "255.255.x.0".to_owned(),
            token: "10.0.0.0%255.255.x.0".to_owned(),
        })
    );
}

#[test]
fn test_parse_invalid_prefix_len() {
    for prefix in ["33", "abc", "256", ""] {
        let token = format!("10.0.0.0/{prefix}");
        let expected = if prefix.is_empty() {
            CalcError::MalformedDescriptor(token.clone())
        } else {
            CalcError::InvalidPrefixLength {
                prefix: prefix.to_owned(),
                token: token.clone(),
            }
        };
        assert_eq!(token.parse::<Descriptor>(), Err(expected));
    }
    // a negative length reads as a second '-' half, which no form accepts
    assert_eq!(
        "10.0.0.0/-1".parse::<Descriptor>(),
        Err(CalcError::MalformedDescriptor("10.0.0.0/-1".to_owned()))
    );
}

#[test]
fn test_parse_repeated_separator() {
    for token in [
        "1.2.3.4-5.6.7.8-9",
        "10.0.0.0/24/8",
        "10.0.0.0%255.0.0.0%0",
        "10.0.0.1--10.0.0.2",
    ] {
        assert_eq!(
            token.parse::<Descriptor>(),
            Err(CalcError::MalformedDescriptor(token.to_owned())),
            "token {token}"
        );
    }
}
