use std::{
    fmt::{Display, Formatter},
    net::Ipv4Addr,
};

use log::debug;

use crate::{
    error::CalcError,
    inputs::prelude::Descriptor,
    utils::{self, ADDRESS_BITS},
};

/// The network an address range descriptor resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkDescription {
    /// First address of the network, host bits cleared
    pub network: Ipv4Addr,
    /// Subnet mask with `prefix_len` leading ones
    pub mask: Ipv4Addr,
    /// Last address of the network, host bits set
    pub broadcast: Ipv4Addr,
    pub prefix_len: u8,
}

impl NetworkDescription {
    /// Network of length `prefix_len` containing `address`.
    /// Lengths above 32 are clamped to a single host.
    pub fn from_prefix(address: Ipv4Addr, prefix_len: u8) -> Self {
        let prefix_len = prefix_len.min(ADDRESS_BITS);
        let mask = utils::prefix_to_mask(prefix_len);
        let network = u32::from(address) & mask;
        let broadcast = network | !mask;

        NetworkDescription {
            network: network.into(),
            mask: mask.into(),
            broadcast: broadcast.into(),
            prefix_len,
        }
    }

    /// Network described by `address` and an explicit dotted `mask`.
    pub fn from_mask(address: Ipv4Addr, mask: Ipv4Addr) -> Result<Self, CalcError> {
        let prefix_len = utils::mask_to_prefix(mask)?;
        Ok(Self::from_prefix(address, prefix_len))
    }

    /// Smallest network holding both `start` and `end`, in either order.
    ///
    /// This widens to an aligned block; `10.0.0.1-10.0.0.2` gives `10.0.0.0/30`.
    pub fn from_range(start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self::from_prefix(start, utils::common_prefix_len(start, end))
    }

    pub fn from_descriptor(descriptor: &Descriptor) -> Result<Self, CalcError> {
        match *descriptor {
            Descriptor::Range { start, end } => Ok(Self::from_range(start, end)),
            Descriptor::Cidr {
                address,
                prefix_len,
            } => Ok(Self::from_prefix(address, prefix_len)),
            Descriptor::Mask { address, mask } => Self::from_mask(address, mask),
        }
    }
}

impl std::str::FromStr for NetworkDescription {
    type Err = CalcError;

    /// Calculate the network for a descriptor string
    ///
    /// # Examples
    ///
    /// `192.168.1.0-192.168.1.255`
    ///
    /// `10.0.0.0/24`
    ///
    /// `10.0.0.0%255.255.255.0`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let descriptor = s.parse::<Descriptor>()?;
        debug!(target: "calc", "'{s}' parsed as {descriptor:?}");
        Self::from_descriptor(&descriptor)
    }
}

impl Display for NetworkDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Network: {}/{} - {} mask {}",
            self.network, self.prefix_len, self.broadcast, self.mask
        )
    }
}

#[test]
fn test_network_range_24() -> anyhow::Result<()> {
    let network = "192.168.1.0-192.168.1.255".parse::<NetworkDescription>()?;
    assert_eq!(network.network, Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(network.mask, Ipv4Addr::new(255, 255, 255, 0));
    assert_eq!(network.broadcast, Ipv4Addr::new(192, 168, 1, 255));
    assert_eq!(network.prefix_len, 24);
    assert_eq!(
        network.to_string(),
        "Network: 192.168.1.0/24 - 192.168.1.255 mask 255.255.255.0"
    );
    Ok(())
}

#[test]
fn test_network_range_is_symmetric() -> anyhow::Result<()> {
    let forward = "10.1.2.3-10.1.9.200".parse::<NetworkDescription>()?;
    let backward = "10.1.9.200-10.1.2.3".parse::<NetworkDescription>()?;
    assert_eq!(forward, backward);
    assert_eq!(
        forward.to_string(),
        "Network: 10.1.0.0/20 - 10.1.15.255 mask 255.255.240.0"
    );
    Ok(())
}

#[test]
fn test_network_range_widens() {
    let network =
        NetworkDescription::from_range(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2));
    assert_eq!(
        network.to_string(),
        "Network: 10.0.0.0/30 - 10.0.0.3 mask 255.255.255.252"
    );
    let network =
        NetworkDescription::from_range(Ipv4Addr::new(1, 0, 0, 0), Ipv4Addr::new(200, 0, 0, 0));
    assert_eq!(
        network.to_string(),
        "Network: 0.0.0.0/0 - 255.255.255.255 mask 0.0.0.0"
    );
}

#[test]
fn test_network_single_host_range() {
    let host = Ipv4Addr::new(172, 16, 4, 7);
    let network = NetworkDescription::from_range(host, host);
    assert_eq!(network.prefix_len, 32);
    assert_eq!(network.network, host);
    assert_eq!(network.broadcast, host);
    assert_eq!(network.mask, Ipv4Addr::BROADCAST);
}

#[test]
fn test_network_cidr_masks_host_bits() -> anyhow::Result<()> {
    let network = "10.0.0.5/24".parse::<NetworkDescription>()?;
    assert_eq!(
        network.to_string(),
        "Network: 10.0.0.0/24 - 10.0.0.255 mask 255.255.255.0"
    );
    Ok(())
}

#[test]
fn test_network_mask_matches_cidr() -> anyhow::Result<()> {
    let by_mask = "10.0.0.0%255.255.255.0".parse::<NetworkDescription>()?;
    let by_prefix = "10.0.0.0/24".parse::<NetworkDescription>()?;
    assert_eq!(by_mask, by_prefix);
    Ok(())
}

#[test]
fn test_network_invalid_mask() {
    assert_eq!(
        "10.0.0.0%255.0.255.0".parse::<NetworkDescription>(),
        Err(CalcError::InvalidMask(Ipv4Addr::new(255, 0, 255, 0)))
    );
}

#[test]
fn test_network_malformed() {
    assert_eq!(
        "abc".parse::<NetworkDescription>(),
        Err(CalcError::MalformedDescriptor("abc".to_owned()))
    );
}

#[test]
fn test_network_invariants() {
    let addresses = [
        Ipv4Addr::new(0, 0, 0, 0),
        Ipv4Addr::new(10, 20, 30, 40),
        Ipv4Addr::new(192, 168, 255, 1),
        Ipv4Addr::new(255, 255, 255, 255),
    ];
    for address in addresses {
        for prefix_len in 0..=ADDRESS_BITS {
            let net = NetworkDescription::from_prefix(address, prefix_len);
            let network = u32::from(net.network);
            let mask = u32::from(net.mask);
            let broadcast = u32::from(net.broadcast);
            assert_eq!(network & mask, network);
            assert_eq!(network & !mask, 0);
            assert_eq!(broadcast | !mask, broadcast);
            assert_eq!(broadcast & mask, network);
            assert_eq!(network, u32::from(address) & mask);
            assert_eq!(mask.leading_ones(), prefix_len as u32);
            assert_eq!(mask.count_ones(), prefix_len as u32);
        }
    }
}

#[test]
fn test_network_prefix_clamped() {
    let address = Ipv4Addr::new(10, 0, 0, 9);
    assert_eq!(
        NetworkDescription::from_prefix(address, 40),
        NetworkDescription::from_prefix(address, 32)
    );
}

#[test]
fn test_network_broadcast_sets_host_bits() -> anyhow::Result<()> {
    let net = "10.0.0.0/8".parse::<NetworkDescription>()?;
    let broadcast = u32::from(net.broadcast);
    let mask = u32::from(net.mask);
    assert_eq!(net.broadcast, Ipv4Addr::new(10, 255, 255, 255));
    assert_eq!(broadcast | !mask, broadcast);
    assert_eq!(broadcast & mask, u32::from(net.network));
    Ok(())
}
