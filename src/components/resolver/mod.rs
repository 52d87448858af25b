/*!
The resolver/updater: a stub that forwards logical requests to an
ordered list of configured nameservers over UDP or TCP, retries and
rotates on failure, falls back to TCP on truncation, streams zone
transfers, and applies the TSIG/SIG(0) overlays when credentials are
configured.

```shell
caller ── query/update ──> Resolver ──> nameserver[0]
                              │   retry/rotate
                              └──────> nameserver[n]
```
*/

mod resolver;
mod transport;
mod update;

pub use resolver::{QueryState, Resolver};
pub use transport::{
    Protocol, TcpTransport, Transport, TransportKind, UdpTransport, DEFAULT_TIMEOUT, DNS_PORT,
    MIN_UDP_PAYLOAD,
};
pub use update::Update;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::components::auth::{PrivateKey, TsigKey};
use crate::dns::rdata::EdnsOption;

/// Immutable for the life of a resolver instance.  Built in place:
///
/// ```no_run
/// use rsresolv::resolver::{Resolver, ResolverConfig};
///
/// let mut config = ResolverConfig::new();
/// config
///     .with_nameserver("9.9.9.9".parse().unwrap())
///     .with_timeout(std::time::Duration::from_secs(2));
/// let resolver = Resolver::new(config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub(crate) nameservers: Vec<SocketAddr>,
    pub(crate) port: u16,
    pub(crate) search: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) retries: usize,
    pub(crate) ns_random: bool,
    pub(crate) retry_servfail: bool,
    pub(crate) use_tcp: bool,
    pub(crate) local_addr: Option<IpAddr>,
    pub(crate) edns_payload: Option<u16>,
    pub(crate) dnssec: bool,
    pub(crate) recurse: bool,
    pub(crate) ad_flag: bool,
    pub(crate) cd_flag: bool,
    pub(crate) edns_options: Vec<EdnsOption>,
    pub(crate) tsig: Option<TsigKey>,
    pub(crate) sig0: Option<PrivateKey>,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self {
            nameservers: Vec::new(),
            port: DNS_PORT,
            search: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            retries: 2,
            ns_random: false,
            retry_servfail: true,
            use_tcp: false,
            local_addr: None,
            edns_payload: None,
            dnssec: false,
            recurse: true,
            ad_flag: false,
            cd_flag: false,
            edns_options: Vec::new(),
            tsig: None,
            sig0: None,
        }
    }

    /// Append a nameserver on the configured port; set the port first
    /// when it is not 53.
    pub fn with_nameserver(&mut self, ip: IpAddr) -> &mut Self {
        self.nameservers.push(SocketAddr::new(ip, self.port));
        self
    }

    /// Append a nameserver with an explicit port.
    pub fn with_nameserver_addr(&mut self, addr: SocketAddr) -> &mut Self {
        self.nameservers.push(addr);
        self
    }

    pub fn with_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    /// Append a search-list suffix.  Relative query names (no trailing
    /// dot) are tried against each suffix in order, then as given;
    /// absolute names bypass the list.
    pub fn with_search_domain(&mut self, domain: &str) -> &mut Self {
        self.search.push(domain.to_string());
        self
    }

    pub fn with_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Passes over the whole nameserver list before giving up.
    pub fn with_retries(&mut self, retries: usize) -> &mut Self {
        self.retries = retries;
        self
    }

    /// Shuffle the nameserver order per request.
    pub fn with_ns_random(&mut self, ns_random: bool) -> &mut Self {
        self.ns_random = ns_random;
        self
    }

    /// Whether SERVFAIL/REFUSED advance to the next server (the
    /// default) or complete the request as its final error.
    pub fn with_retry_servfail(&mut self, retry_servfail: bool) -> &mut Self {
        self.retry_servfail = retry_servfail;
        self
    }

    /// Force TCP for every request.
    pub fn with_use_tcp(&mut self, use_tcp: bool) -> &mut Self {
        self.use_tcp = use_tcp;
        self
    }

    /// Local address UDP sockets bind to.
    pub fn with_local_addr(&mut self, local: IpAddr) -> &mut Self {
        self.local_addr = Some(local);
        self
    }

    /// Advertise an EDNS0 UDP payload size with every query.
    pub fn with_edns_payload(&mut self, payload: u16) -> &mut Self {
        self.edns_payload = Some(payload);
        self
    }

    /// Request DNSSEC records (the DO bit; implies EDNS).
    pub fn with_dnssec(&mut self, dnssec: bool) -> &mut Self {
        self.dnssec = dnssec;
        self
    }

    pub fn with_recurse(&mut self, recurse: bool) -> &mut Self {
        self.recurse = recurse;
        self
    }

    pub fn with_ad_flag(&mut self, ad: bool) -> &mut Self {
        self.ad_flag = ad;
        self
    }

    pub fn with_cd_flag(&mut self, cd: bool) -> &mut Self {
        self.cd_flag = cd;
        self
    }

    pub fn with_edns_option(&mut self, option: EdnsOption) -> &mut Self {
        self.edns_options.push(option);
        self
    }

    /// Sign requests (and check responses) with a TSIG key.
    pub fn with_tsig(&mut self, key: TsigKey) -> &mut Self {
        self.tsig = Some(key);
        self
    }

    /// Sign requests with a SIG(0) private key.
    pub fn with_sig0(&mut self, key: PrivateKey) -> &mut Self {
        self.sig0 = Some(key);
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}
