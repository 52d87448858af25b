use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Error;
use rand::seq::SliceRandom;
use rand::Rng;

use super::transport::{
    Protocol, TcpTransport, Transport, TransportKind, UdpTransport, MIN_UDP_PAYLOAD,
};
use super::{ResolverConfig, Update};
use crate::components::auth::{sig0, tsig};
use crate::dns::rdata::RDataType;
use crate::dns::{
    Class, ResourceRecord, Type, CLASS_IN, RCODE_NOERROR, RCODE_NXDOMAIN, RCODE_REFUSED,
    RCODE_SERVFAIL, TYPE_AXFR, TYPE_SOA,
};
use crate::error::DnsError;
use crate::DNS;

/// Where a request currently stands.  `Completed` and `Failed` are the
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Built,
    Sent,
    Awaiting,
    RetryingSameServer,
    SwitchingTransport,
    SwitchingServer,
    Completed,
    Failed,
}

enum UdpOutcome {
    Response(DNS),
    Truncated,
}

/// The resolver/updater state machine.  One instance owns its sockets
/// and serves one request at a time; programs that want concurrency
/// run one resolver per worker.
#[derive(Debug)]
pub struct Resolver {
    config: ResolverConfig,
    pool: HashMap<(SocketAddr, Protocol), TransportKind>,
    used_ids: HashSet<u16>,
    state: QueryState,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Result<Self, Error> {
        if config.nameservers.is_empty() {
            return Err(Error::new(DnsError::Configuration(
                "no nameservers configured".to_string(),
            )));
        }
        if config.tsig.is_some() && config.sig0.is_some() {
            return Err(Error::new(DnsError::Configuration(
                "TSIG and SIG(0) credentials are mutually exclusive".to_string(),
            )));
        }
        Ok(Self {
            config,
            pool: HashMap::new(),
            used_ids: HashSet::new(),
            state: QueryState::Built,
        })
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    /// A plain lookup.  A relative name walks the configured
    /// search-list; each candidate that comes back NXDOMAIN moves on
    /// to the next.
    pub fn query(&mut self, name: &str, qtype: Type, qclass: Class) -> Result<DNS, Error> {
        let mut last_err: Option<Error> = None;
        for qname in self.search_candidates(name) {
            let mut dns = DNS::new();
            dns.head_mut()
                .with_rd(self.config.recurse)
                .with_ad(self.config.ad_flag)
                .with_cd(self.config.cd_flag);
            dns.with_ques(&qname, qtype, qclass)?;
            if self.wants_edns() {
                dns.with_edns(
                    self.config.edns_payload.unwrap_or(1232),
                    self.config.dnssec,
                    self.config.edns_options.clone(),
                )?;
            }
            match self.exchange(dns, false, self.config.use_tcp) {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let nxdomain = matches!(
                        e.downcast_ref::<DnsError>(),
                        Some(DnsError::ResponseInvalid {
                            rcode: RCODE_NXDOMAIN,
                            ..
                        })
                    );
                    if !nxdomain {
                        return Err(e);
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| Error::new(DnsError::Configuration("empty query name".to_string()))))
    }

    /// The names a lookup actually tries: an absolute name as given, a
    /// relative one against each search suffix and then the root.
    fn search_candidates(&self, name: &str) -> Vec<String> {
        if name.ends_with('.') || self.config.search.is_empty() {
            return vec![name.to_string()];
        }
        let mut out: Vec<String> = self
            .config
            .search
            .iter()
            .map(|suffix| format!("{}.{}", name, suffix.trim_end_matches('.')))
            .collect();
        out.push(name.to_string());
        out
    }

    /// A dynamic update; always TCP.
    pub fn update(&mut self, update: Update) -> Result<DNS, Error> {
        self.exchange(update.into_dns(), false, true)
    }

    /// A full zone transfer; always TCP, the concatenated answer
    /// sections come back in one response.
    pub fn axfr(&mut self, zone: &str) -> Result<DNS, Error> {
        let mut dns = DNS::new();
        dns.with_ques(zone, TYPE_AXFR, CLASS_IN)?;
        self.exchange(dns, true, true)
    }

    fn wants_edns(&self) -> bool {
        self.config.edns_payload.is_some()
            || self.config.dnssec
            || !self.config.edns_options.is_empty()
    }

    /// The single rotation decision point: does this RCODE move us to
    /// the next server, or is it the final answer?
    fn should_advance(&self, rcode: u8) -> bool {
        matches!(rcode, RCODE_SERVFAIL | RCODE_REFUSED) && self.config.retry_servfail
    }

    fn fresh_id(&mut self) -> u16 {
        // never hand out the same ID twice over the life of the pool
        if self.used_ids.len() >= u16::MAX as usize {
            self.used_ids.clear();
        }
        let mut rng = rand::thread_rng();
        loop {
            let id: u16 = rng.gen();
            if self.used_ids.insert(id) {
                return id;
            }
        }
    }

    fn exchange(&mut self, mut dns: DNS, axfr: bool, force_tcp: bool) -> Result<DNS, Error> {
        let mut servers = self.config.nameservers.clone();
        if self.config.ns_random {
            servers.shuffle(&mut rand::thread_rng());
        }

        self.state = QueryState::Built;
        let mut last_err = Error::new(DnsError::Network("no nameserver reached".to_string()));

        for _pass in 0..self.config.retries.max(1) {
            for addr in &servers {
                match self.attempt(&mut dns, *addr, axfr, force_tcp) {
                    Ok(resp) => {
                        let rcode = resp.head().rcode();
                        if rcode != RCODE_NOERROR {
                            let err = Error::new(DnsError::rcode(rcode));
                            if self.should_advance(rcode) {
                                self.state = QueryState::SwitchingServer;
                                last_err = err;
                                continue;
                            }
                            self.state = QueryState::Failed;
                            return Err(err);
                        }
                        self.state = QueryState::Completed;
                        return Ok(resp);
                    }
                    Err(e) => {
                        // authentication and configuration problems do
                        // not improve with another server
                        match e.downcast_ref::<DnsError>() {
                            Some(DnsError::Authentication(_))
                            | Some(DnsError::Configuration(_))
                            | Some(DnsError::KeyMaterial(_)) => {
                                self.state = QueryState::Failed;
                                return Err(e);
                            }
                            _ => {
                                self.state = QueryState::SwitchingServer;
                                last_err = e;
                            }
                        }
                    }
                }
            }
            self.state = QueryState::RetryingSameServer;
        }

        self.state = QueryState::Failed;
        Err(last_err)
    }

    /// One try against one server: fresh ID, fresh signature, pick the
    /// transport, send, validate, fall back to TCP on truncation.
    fn attempt(
        &mut self,
        dns: &mut DNS,
        addr: SocketAddr,
        axfr: bool,
        force_tcp: bool,
    ) -> Result<DNS, Error> {
        // the previous attempt's signature covers the previous ID
        dns.pop_tsig();
        dns.pop_sig0();
        let id = self.fresh_id();
        dns.head_mut().with_id(id);

        let mut request_mac = None;
        if let Some(key) = self.config.tsig.clone() {
            request_mac = Some(tsig::sign(dns, &key, unix_now(), tsig::DEFAULT_FUDGE)?);
        } else if let Some(key) = self.config.sig0.clone() {
            sig0::sign_message(dns, &key, unix_now() as u32)?;
        }

        let wire = dns.encode(true)?;
        let udp_max = self.config.edns_payload.unwrap_or(512) as usize;
        let use_tcp = force_tcp || axfr || wire.len() > udp_max;

        self.state = QueryState::Sent;
        if use_tcp {
            return self.attempt_tcp(dns, &wire, addr, axfr, request_mac.as_deref());
        }
        match self.attempt_udp(dns, &wire, addr, request_mac.as_deref())? {
            UdpOutcome::Response(resp) => Ok(resp),
            UdpOutcome::Truncated => {
                // exactly one TCP retry against the same server
                self.state = QueryState::SwitchingTransport;
                self.attempt_tcp(dns, &wire, addr, false, request_mac.as_deref())
            }
        }
    }

    fn udp_transport(&mut self, addr: SocketAddr) -> Result<TransportKind, Error> {
        let key = (addr, Protocol::Udp);
        if let Some(t) = self.pool.remove(&key) {
            return Ok(t);
        }
        let recv_size = self
            .config
            .edns_payload
            .map(|p| p as usize)
            .unwrap_or(MIN_UDP_PAYLOAD);
        Ok(TransportKind::Udp(UdpTransport::open(
            addr,
            self.config.local_addr,
            self.config.timeout,
            recv_size,
        )?))
    }

    fn tcp_transport(&mut self, addr: SocketAddr) -> Result<TransportKind, Error> {
        let key = (addr, Protocol::Tcp);
        if let Some(t) = self.pool.remove(&key) {
            return Ok(t);
        }
        Ok(TransportKind::Tcp(TcpTransport::open(
            addr,
            self.config.timeout,
        )?))
    }

    fn attempt_udp(
        &mut self,
        dns: &DNS,
        wire: &[u8],
        addr: SocketAddr,
        request_mac: Option<&[u8]>,
    ) -> Result<UdpOutcome, Error> {
        let mut transport = self.udp_transport(addr)?;
        transport.send(wire)?;
        self.state = QueryState::Awaiting;

        let deadline = Instant::now() + self.config.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::new(DnsError::Network(format!(
                    "udp receive from {}: timed out",
                    addr
                ))));
            }
            transport.set_deadline(remaining)?;
            let raw = transport.receive()?;

            // anything that does not parse or does not match the
            // request is off-path noise: drop it and keep listening
            // until the attempt deadline
            let resp = match DNS::from(&raw) {
                Ok(resp) => resp,
                Err(_) => continue,
            };
            if !self.response_matches(dns, &resp) {
                continue;
            }

            if resp.head().tc() {
                // the pooled socket stays usable for the next request
                self.pool.insert((addr, Protocol::Udp), transport);
                return Ok(UdpOutcome::Truncated);
            }
            self.verify_response_tsig(&resp, request_mac)?;
            self.pool.insert((addr, Protocol::Udp), transport);
            return Ok(UdpOutcome::Response(resp));
        }
    }

    fn attempt_tcp(
        &mut self,
        dns: &DNS,
        wire: &[u8],
        addr: SocketAddr,
        axfr: bool,
        request_mac: Option<&[u8]>,
    ) -> Result<DNS, Error> {
        let mut transport = self.tcp_transport(addr)?;
        transport.send(wire)?;
        self.state = QueryState::Awaiting;

        let result = if axfr {
            self.receive_axfr(&mut transport, dns, request_mac)
        } else {
            self.receive_tcp_single(&mut transport, dns, request_mac)
        };
        // keep the connection for the next request unless it failed
        if result.is_ok() {
            self.pool.insert((addr, Protocol::Tcp), transport);
        }
        result
    }

    fn receive_tcp_single(
        &mut self,
        transport: &mut TransportKind,
        dns: &DNS,
        request_mac: Option<&[u8]>,
    ) -> Result<DNS, Error> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::new(DnsError::Network(
                    "tcp receive: timed out".to_string(),
                )));
            }
            transport.set_deadline(remaining)?;
            let raw = transport.receive()?;
            let resp = match DNS::from(&raw) {
                Ok(resp) => resp,
                Err(e) => return Err(e),
            };
            if !self.response_matches(dns, &resp) {
                continue;
            }
            self.verify_response_tsig(&resp, request_mac)?;
            return Ok(resp);
        }
    }

    /// Receive the AXFR message stream: the first message must lead
    /// with the zone's SOA, the stream ends with a message whose last
    /// answer is that SOA again (matching serial).  Answer sections
    /// concatenate in arrival order.
    fn receive_axfr(
        &mut self,
        transport: &mut TransportKind,
        dns: &DNS,
        request_mac: Option<&[u8]>,
    ) -> Result<DNS, Error> {
        let deadline = Instant::now() + self.config.timeout;
        let mut first: Option<DNS> = None;
        let mut opening_serial = None;
        let mut records: Vec<ResourceRecord> = Vec::new();
        let mut verified_first = false;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::new(DnsError::Network(
                    "axfr receive: timed out".to_string(),
                )));
            }
            transport.set_deadline(remaining)?;
            let raw = transport.receive()?;
            let resp = DNS::from(&raw)?;

            if resp.head().id() != dns.head().id() || !resp.head().qr() {
                return Err(Error::new(DnsError::invalid(
                    "axfr stream message does not match the request",
                )));
            }
            if resp.head().rcode() != RCODE_NOERROR {
                return Ok(resp);
            }
            if !verified_first {
                // the opening message carries the request-chained MAC;
                // later ones chain off each other and are not checked
                self.verify_response_tsig(&resp, request_mac)?;
                verified_first = true;
            }

            for rr in resp.answers().iter() {
                match (&opening_serial, rr.typ()) {
                    (None, TYPE_SOA) => {
                        if let RDataType::SOA(soa) = rr.rdata() {
                            opening_serial = Some(soa.serial);
                        }
                    }
                    (None, _) => {
                        return Err(Error::new(DnsError::invalid(
                            "axfr stream does not start with SOA",
                        )))
                    }
                    _ => {}
                }
                records.push(rr.clone());
            }
            if first.is_none() {
                first = Some(resp);
            }

            // closed when the trailing SOA repeats the opening serial
            if records.len() > 1 {
                if let Some(last) = records.last() {
                    if last.typ() == TYPE_SOA {
                        if let (RDataType::SOA(soa), Some(serial)) = (last.rdata(), opening_serial)
                        {
                            if soa.serial == serial {
                                if let Some(mut merged) = first.take() {
                                    merged.answers_mut().0 = records;
                                    return Ok(merged);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// ID, QR and the echoed question must match what we sent; the
    /// name comparison is case-insensitive.
    fn response_matches(&self, sent: &DNS, resp: &DNS) -> bool {
        if resp.head().id() != sent.head().id() || !resp.head().qr() {
            return false;
        }
        match (sent.ques().first(), resp.ques().first()) {
            (Some(ours), Some(theirs)) => ours.matches(theirs),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn verify_response_tsig(&self, resp: &DNS, request_mac: Option<&[u8]>) -> Result<(), Error> {
        let key = match &self.config.tsig {
            Some(key) => key,
            None => return Ok(()),
        };
        if resp.tsig().is_none() {
            return Err(Error::new(DnsError::Authentication(
                "response to a signed request carries no TSIG".to_string(),
            )));
        }
        tsig::verify(resp.raw(), key, request_mac, unix_now())
    }
}
