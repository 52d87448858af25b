//! One error kind for every way a request can go wrong: configuration,
//! malformed packets, the network, bad responses, authentication, key
//! material and missing crypto support.
//!
//! Functions all return `anyhow::Error`; the kind travels inside it and can
//! be recovered with `err.downcast_ref::<DnsError>()`.
use std::error;
use std::fmt;

#[derive(Debug)]
pub enum DnsError {
    /// no nameservers, bad address, conflicting options
    Configuration(String),

    /// truncated buffer, bad label length, name-pointer loop
    PacketMalformed(String),

    /// connect refused, timeout, unexpected close, short read/write
    Network(String),

    /// ID mismatch, QR=0, question mismatch, or RCODE != NOERROR.
    /// `rcode` is 0 for the structural mismatches.
    ResponseInvalid { rcode: u8, detail: String },

    /// TSIG MAC mismatch, time outside the fudge window, signature
    /// verification failed, unknown algorithm
    Authentication(String),

    /// key file not found, syntax error, algorithm mismatch with the
    /// filename, unsupported algorithm
    KeyMaterial(String),

    /// underlying crypto backend unavailable
    Resource(String),
}

impl DnsError {
    /// Helper for the RCODE-carrying case.
    pub fn rcode(rcode: u8) -> Self {
        DnsError::ResponseInvalid {
            rcode,
            detail: format!("server returned rcode {}", crate::dns::rcode_name(rcode)),
        }
    }

    pub fn invalid(detail: &str) -> Self {
        DnsError::ResponseInvalid {
            rcode: 0,
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsError::Configuration(s) => write!(f, "configuration: {}", s),
            DnsError::PacketMalformed(s) => write!(f, "packet malformed: {}", s),
            DnsError::Network(s) => write!(f, "network: {}", s),
            DnsError::ResponseInvalid { rcode, detail } => {
                write!(f, "response invalid (rcode {}): {}", rcode, detail)
            }
            DnsError::Authentication(s) => write!(f, "authentication: {}", s),
            DnsError::KeyMaterial(s) => write!(f, "key material: {}", s),
            DnsError::Resource(s) => write!(f, "resource: {}", s),
        }
    }
}

impl error::Error for DnsError {}
