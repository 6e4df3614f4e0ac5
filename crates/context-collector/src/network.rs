//! Built-in network resolver: an RFC1918/loopback/link-local heuristic with
//! no external call, as required by §4.4 ("the network sub-context always
//! computes ... without any external call").

use std::net::IpAddr;

use async_trait::async_trait;

use alertmesh_store::NetworkContext;

use crate::resolver::NetworkResolver;

pub struct HeuristicNetworkResolver;

impl HeuristicNetworkResolver {
    /// Classifies `ip` as internal per RFC1918 (10/8, 172.16/12, 192.168/16),
    /// loopback (127/8, ::1) and link-local (169.254/16, fe80::/10) ranges.
    pub fn classify(ip: &str) -> NetworkContext {
        let parsed: Option<IpAddr> = ip.parse().ok();
        let is_internal = parsed.map(is_internal_address).unwrap_or(false);
        let subnet = parsed.map(|addr| subnet_for(&addr));
        NetworkContext {
            is_internal,
            subnet,
            geolocation: None,
            reputation: None,
        }
    }
}

fn is_internal_address(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_link_local() || v4.is_private(),
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn subnet_for(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!("{}.{}.{}.0/24", octets[0], octets[1], octets[2])
        }
        IpAddr::V6(_) => addr.to_string(),
    }
}

#[async_trait]
impl NetworkResolver for HeuristicNetworkResolver {
    async fn resolve(&self, ip: &str) -> Option<NetworkContext> {
        Some(Self::classify(ip))
    }
}
