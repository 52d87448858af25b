pub mod dnskey;
pub mod ds;
pub mod key_tag;
pub mod nsec;
pub mod nsec3;
pub mod nsec3param;
pub mod rrsig;

use anyhow::Error;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::dns::{type_name, PacketReader, Type};
use crate::error::DnsError;

/**
Ref: https://www.iana.org/assignments/dns-sec-alg-numbers/dns-sec-alg-numbers.xhtml

The KEY, SIG, DNSKEY, RRSIG, DS, and CERT RRs use an 8-bit number to
identify the security algorithm being used.  Only algorithms usable for
zone signing may appear in DNSKEY, RRSIG, and DS RRs; only those usable
for SIG(0) and TSIG may appear in SIG and KEY RRs.
*/
pub type DnsSecAlgorithm = u8;

/// RSA/MD5 (deprecated, see 5)
///
/// [RFC2537](https://www.rfc-editor.org/rfc/rfc2537)
pub const ALGO_RSAMD5: DnsSecAlgorithm = 1;

/// Diffie-Hellman
///
/// [RFC2539](https://www.rfc-editor.org/rfc/rfc2539)
pub const ALGO_DH: DnsSecAlgorithm = 2;

/// DSA/SHA-1
///
/// [RFC2536](https://www.rfc-editor.org/rfc/rfc2536)
pub const ALGO_DSA: DnsSecAlgorithm = 3;

/// RSA/SHA-1
///
/// [RFC3110](https://www.rfc-editor.org/rfc/rfc3110)
pub const ALGO_RSASHA1: DnsSecAlgorithm = 5;

/// DSA-NSEC3-SHA1
///
/// [RFC5155](https://www.rfc-editor.org/rfc/rfc5155)
pub const ALGO_DSA_NSEC3_SHA1: DnsSecAlgorithm = 6;

/// RSASHA1-NSEC3-SHA1
///
/// [RFC5155](https://www.rfc-editor.org/rfc/rfc5155)
pub const ALGO_RSASHA1_NSEC3_SHA1: DnsSecAlgorithm = 7;

/// RSA/SHA-256
///
/// [RFC5702](https://www.rfc-editor.org/rfc/rfc5702)
pub const ALGO_RSASHA256: DnsSecAlgorithm = 8;

/// RSA/SHA-512
///
/// [RFC5702](https://www.rfc-editor.org/rfc/rfc5702)
pub const ALGO_RSASHA512: DnsSecAlgorithm = 10;

/// ECDSA Curve P-256 with SHA-256
///
/// [RFC6605](https://www.rfc-editor.org/rfc/rfc6605)
pub const ALGO_ECDSAP256SHA256: DnsSecAlgorithm = 13;

/// Ed25519
///
/// [RFC8080](https://www.rfc-editor.org/rfc/rfc8080)
pub const ALGO_ED25519: DnsSecAlgorithm = 15;

/**
DS digest algorithms.

Ref: [RFC3658][RFC4509][RFC6605]

|Value|Description|
|-----|-----------|
|1    |SHA-1      |
|2    |SHA-256    |
|4    |SHA-384    |
*/
pub type DigestAlgorithm = u8;

pub const DIGEST_SHA1: DigestAlgorithm = 1;
pub const DIGEST_SHA256: DigestAlgorithm = 2;
pub const DIGEST_SHA384: DigestAlgorithm = 4;

static ALGORITHM_NAMES: Lazy<HashMap<DnsSecAlgorithm, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (ALGO_RSAMD5, "RSAMD5"),
        (ALGO_DH, "DH"),
        (ALGO_DSA, "DSA"),
        (ALGO_RSASHA1, "RSASHA1"),
        (ALGO_DSA_NSEC3_SHA1, "DSA-NSEC3-SHA1"),
        (ALGO_RSASHA1_NSEC3_SHA1, "RSASHA1-NSEC3-SHA1"),
        (ALGO_RSASHA256, "RSASHA256"),
        (ALGO_RSASHA512, "RSASHA512"),
        (ALGO_ECDSAP256SHA256, "ECDSAP256SHA256"),
        (ALGO_ED25519, "ED25519"),
    ])
});

static DIGEST_NAMES: Lazy<HashMap<DigestAlgorithm, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (DIGEST_SHA1, "SHA-1"),
        (DIGEST_SHA256, "SHA-256"),
        (DIGEST_SHA384, "SHA-384"),
    ])
});

pub fn algorithm_name(algo: DnsSecAlgorithm) -> String {
    match ALGORITHM_NAMES.get(&algo) {
        Some(name) => name.to_string(),
        None => format!("ALG{}", algo),
    }
}

pub fn digest_name(digest: DigestAlgorithm) -> String {
    match DIGEST_NAMES.get(&digest) {
        Some(name) => name.to_string(),
        None => format!("DIGEST{}", digest),
    }
}

/**
The NSEC and NSEC3 type bitmaps: one window block per 256 type codes,
each block `window(1) | length(1) | bitmap(1..32)`, types present have
their bit set MSB-first, trailing zero octets omitted.

ref: https://www.rfc-editor.org/rfc/rfc4034#section-4.1.2
*/
pub fn encode_type_bitmap(types: &[Type]) -> Vec<u8> {
    let mut sorted = types.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = Vec::new();
    let mut window = 0_u8;
    let mut bitmap = [0_u8; 32];
    let mut used = 0_usize;

    let flush = |window: u8, bitmap: &[u8; 32], used: usize, out: &mut Vec<u8>| {
        if used > 0 {
            out.push(window);
            out.push(used as u8);
            out.extend_from_slice(&bitmap[..used]);
        }
    };

    for typ in sorted {
        let w = (typ >> 8) as u8;
        if w != window {
            flush(window, &bitmap, used, &mut out);
            window = w;
            bitmap = [0; 32];
            used = 0;
        }
        let low = (typ & 0xFF) as usize;
        bitmap[low / 8] |= 0x80 >> (low % 8);
        if low / 8 + 1 > used {
            used = low / 8 + 1;
        }
    }
    flush(window, &bitmap, used, &mut out);
    out
}

pub fn decode_type_bitmap(rdr: &mut PacketReader, end: usize) -> Result<Vec<Type>, Error> {
    let mut types = Vec::new();
    while rdr.position() < end {
        let window = rdr.read_u8()?;
        let len = rdr.read_u8()? as usize;
        if len == 0 || len > 32 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "type bitmap block length {} not in 1..32",
                len
            ))));
        }
        if rdr.position() + len > end {
            return Err(Error::new(DnsError::PacketMalformed(
                "type bitmap overruns rdata".to_string(),
            )));
        }
        let bits = rdr.read_bytes(len)?;
        for (i, octet) in bits.iter().enumerate() {
            for bit in 0..8 {
                if octet & (0x80 >> bit) != 0 {
                    types.push(((window as Type) << 8) | (i as Type * 8 + bit as Type));
                }
            }
        }
    }
    Ok(types)
}

pub fn type_bitmap_text(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| type_name(*t))
        .collect::<Vec<String>>()
        .join(" ")
}
