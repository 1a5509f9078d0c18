//! IPv4 address lookup for the dashboard interface
//!
//! Enumerates host interfaces with `if-addrs` and reports the first IPv4
//! address bound to the configured interface name.

use async_trait::async_trait;
use if_addrs::{get_if_addrs, IfAddr};
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

use crate::error::SampleError;
use crate::metrics::Sampler;

pub struct InterfaceAddress {
    interface: String,
}

impl InterfaceAddress {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }
}

#[async_trait]
impl Sampler for InterfaceAddress {
    type Value = Ipv4Addr;

    fn name(&self) -> &'static str {
        "address"
    }

    async fn sample(&mut self) -> Result<Ipv4Addr, SampleError> {
        let if_addrs = get_if_addrs().map_err(|e| SampleError::io("network interfaces", e))?;

        let addrs = if_addrs.iter().map(|iface| {
            let ip = match &iface.addr {
                IfAddr::V4(v4) => IpAddr::V4(v4.ip),
                IfAddr::V6(v6) => IpAddr::V6(v6.ip),
            };
            (iface.name.as_str(), ip)
        });

        let addr = select_ipv4(addrs, &self.interface)?;
        debug!("Interface {} has address {}", self.interface, addr);
        Ok(addr)
    }
}

/// First IPv4 address of `interface` among `(name, address)` pairs.
pub(crate) fn select_ipv4<'a, I>(addrs: I, interface: &str) -> Result<Ipv4Addr, SampleError>
where
    I: IntoIterator<Item = (&'a str, IpAddr)>,
{
    addrs
        .into_iter()
        .filter(|(name, _)| *name == interface)
        .find_map(|(_, ip)| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| SampleError::NoAddress(interface.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn table() -> Vec<(&'static str, IpAddr)> {
        vec![
            ("lo", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ("eth0", IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1))),
            ("eth0", IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42))),
            ("wlan0", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))),
        ]
    }

    #[test]
    fn test_selects_ipv4_of_named_interface() {
        assert_eq!(
            select_ipv4(table(), "eth0").unwrap(),
            Ipv4Addr::new(192, 168, 1, 42)
        );
        assert_eq!(
            select_ipv4(table(), "wlan0").unwrap(),
            Ipv4Addr::new(10, 0, 0, 7)
        );
    }

    #[test]
    fn test_missing_interface() {
        assert!(matches!(
            select_ipv4(table(), "eth1"),
            Err(SampleError::NoAddress(name)) if name == "eth1"
        ));
    }

    #[test]
    fn test_ipv6_only_interface() {
        let addrs = vec![("tailscale0", IpAddr::V6(Ipv6Addr::LOCALHOST))];
        assert!(select_ipv4(addrs, "tailscale0").is_err());
    }

    #[tokio::test]
    async fn test_unknown_interface_fails() {
        let mut sampler = InterfaceAddress::new("symbion-does-not-exist0");
        assert!(sampler.sample().await.is_err());
    }
}
