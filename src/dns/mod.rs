mod buffer;
mod compress_list;
pub mod dns;
pub mod header;
mod labels;
pub mod question;
pub mod rdata;
mod rr;

pub use buffer::{PacketReader, PacketWriter};
pub use dns::DNS;
pub use header::Header;
pub use labels::Labels;
pub use question::Question;
pub use rr::{ResourceRecord, RRs};

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub type Type = u16;
pub type Class = u16;

/// a host address
pub const TYPE_A: Type = 1;

/// an authoritative name server
pub const TYPE_NS: Type = 2;

/// the canonical name for an alias
pub const TYPE_CNAME: Type = 5;

/// marks the start of a zone of authority
pub const TYPE_SOA: Type = 6;

/// a domain name pointer
pub const TYPE_PTR: Type = 12;

/// host information
pub const TYPE_HINFO: Type = 13;

/// mail exchange
pub const TYPE_MX: Type = 15;

/// text strings
pub const TYPE_TXT: Type = 16;

/// a transaction signature with an asymmetric key
///
/// ref: https://www.rfc-editor.org/rfc/rfc2931
pub const TYPE_SIG: Type = 24;

/// a host address (IPv6)
///
/// ref: https://www.rfc-editor.org/rfc/rfc3596
pub const TYPE_AAAA: Type = 28;

/// server selection
///
/// ref: https://www.rfc-editor.org/rfc/rfc2782
pub const TYPE_SRV: Type = 33;

/// naming authority pointer
///
/// ref: https://www.rfc-editor.org/rfc/rfc3403
pub const TYPE_NAPTR: Type = 35;

/// EDNS0 pseudo RR
///
/// ref: https://www.rfc-editor.org/rfc/rfc6891
pub const TYPE_OPT: Type = 41;

/// delegation signer
pub const TYPE_DS: Type = 43;

/// SSH key fingerprint
///
/// ref: https://www.rfc-editor.org/rfc/rfc4255
pub const TYPE_SSHFP: Type = 44;

/// RRset signature
pub const TYPE_RRSIG: Type = 46;

/// authenticated denial of existence
pub const TYPE_NSEC: Type = 47;

/// DNS public key
pub const TYPE_DNSKEY: Type = 48;

/// hashed authenticated denial of existence
///
/// ref: https://www.rfc-editor.org/rfc/rfc5155
pub const TYPE_NSEC3: Type = 50;

/// NSEC3 parameters
pub const TYPE_NSEC3PARAM: Type = 51;

/// TLS certificate association
///
/// ref: https://www.rfc-editor.org/rfc/rfc6698
pub const TYPE_TLSA: Type = 52;

/// child copy of DS
///
/// ref: https://www.rfc-editor.org/rfc/rfc7344
pub const TYPE_CDS: Type = 59;

/// child copy of DNSKEY
pub const TYPE_CDNSKEY: Type = 60;

/// transaction signature, meta RR in the additional section
///
/// ref: https://www.rfc-editor.org/rfc/rfc8945
pub const TYPE_TSIG: Type = 250;

/// for QType, incremental zone transfer
pub const TYPE_IXFR: Type = 251;

/// for QType, full zone transfer
pub const TYPE_AXFR: Type = 252;

/// for QType
///
/// ref: https://www.rfc-editor.org/rfc/rfc8482
pub const TYPE_ANY: Type = 255;

/// certification authority authorization
///
/// ref: https://www.rfc-editor.org/rfc/rfc6844
pub const TYPE_CAA: Type = 257;

/// the Internet
pub const CLASS_IN: Class = 1;
/// the CHAOS class
pub const CLASS_CH: Class = 3;
/// Hesiod [Dyer 87]
pub const CLASS_HS: Class = 4;

/// for dynamic update sentinels ("delete this exact RR", "prerequisite:
/// does not exist")
///
/// ref: https://www.rfc-editor.org/rfc/rfc2136#section-2.4
pub const CLASS_NONE: Class = 254;

/// for QClass and dynamic update sentinels
pub const CLASS_ANY: Class = 255;

pub type Opcode = u8;

/// a standard query
pub const OPCODE_QUERY: Opcode = 0;
/// an inverse query (Obsolete)
pub const OPCODE_IQUERY: Opcode = 1;
/// a server status request
pub const OPCODE_STATUS: Opcode = 2;
/// zone change notification
pub const OPCODE_NOTIFY: Opcode = 4;
/// dynamic update
///
/// ref: https://www.rfc-editor.org/rfc/rfc2136
pub const OPCODE_UPDATE: Opcode = 5;

pub type Rcode = u8;

pub const RCODE_NOERROR: Rcode = 0;
pub const RCODE_FORMERR: Rcode = 1;
pub const RCODE_SERVFAIL: Rcode = 2;
pub const RCODE_NXDOMAIN: Rcode = 3;
pub const RCODE_NOTIMP: Rcode = 4;
pub const RCODE_REFUSED: Rcode = 5;
/// some name that ought not to exist, does exist
pub const RCODE_YXDOMAIN: Rcode = 6;
/// some RRset that ought not to exist, does exist
pub const RCODE_YXRRSET: Rcode = 7;
/// some RRset that ought to exist, does not exist
pub const RCODE_NXRRSET: Rcode = 8;
/// the server is not authoritative for the zone, or the TSIG failed
pub const RCODE_NOTAUTH: Rcode = 9;
/// a name used in the prerequisite or update section is not within the zone
pub const RCODE_NOTZONE: Rcode = 10;

/// TSIG error field values, carried in the TSIG rdata rather than the
/// header RCODE.
///
/// ref: https://www.rfc-editor.org/rfc/rfc8945#section-5.3
pub const ERR_BADSIG: u16 = 16;
pub const ERR_BADKEY: u16 = 17;
pub const ERR_BADTIME: u16 = 18;

static TYPE_NAMES: Lazy<HashMap<Type, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (TYPE_A, "A"),
        (TYPE_NS, "NS"),
        (TYPE_CNAME, "CNAME"),
        (TYPE_SOA, "SOA"),
        (TYPE_PTR, "PTR"),
        (TYPE_HINFO, "HINFO"),
        (TYPE_MX, "MX"),
        (TYPE_TXT, "TXT"),
        (TYPE_SIG, "SIG"),
        (TYPE_AAAA, "AAAA"),
        (TYPE_SRV, "SRV"),
        (TYPE_NAPTR, "NAPTR"),
        (TYPE_OPT, "OPT"),
        (TYPE_DS, "DS"),
        (TYPE_SSHFP, "SSHFP"),
        (TYPE_RRSIG, "RRSIG"),
        (TYPE_NSEC, "NSEC"),
        (TYPE_DNSKEY, "DNSKEY"),
        (TYPE_NSEC3, "NSEC3"),
        (TYPE_NSEC3PARAM, "NSEC3PARAM"),
        (TYPE_TLSA, "TLSA"),
        (TYPE_CDS, "CDS"),
        (TYPE_CDNSKEY, "CDNSKEY"),
        (TYPE_TSIG, "TSIG"),
        (TYPE_IXFR, "IXFR"),
        (TYPE_AXFR, "AXFR"),
        (TYPE_ANY, "ANY"),
        (TYPE_CAA, "CAA"),
    ])
});

static TYPE_CODES: Lazy<HashMap<&'static str, Type>> =
    Lazy::new(|| TYPE_NAMES.iter().map(|(k, v)| (*v, *k)).collect());

static CLASS_NAMES: Lazy<HashMap<Class, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (CLASS_IN, "IN"),
        (CLASS_CH, "CH"),
        (CLASS_HS, "HS"),
        (CLASS_NONE, "NONE"),
        (CLASS_ANY, "ANY"),
    ])
});

static OPCODE_NAMES: Lazy<HashMap<Opcode, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (OPCODE_QUERY, "QUERY"),
        (OPCODE_IQUERY, "IQUERY"),
        (OPCODE_STATUS, "STATUS"),
        (OPCODE_NOTIFY, "NOTIFY"),
        (OPCODE_UPDATE, "UPDATE"),
    ])
});

static RCODE_NAMES: Lazy<HashMap<Rcode, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (RCODE_NOERROR, "NOERROR"),
        (RCODE_FORMERR, "FORMERR"),
        (RCODE_SERVFAIL, "SERVFAIL"),
        (RCODE_NXDOMAIN, "NXDOMAIN"),
        (RCODE_NOTIMP, "NOTIMP"),
        (RCODE_REFUSED, "REFUSED"),
        (RCODE_YXDOMAIN, "YXDOMAIN"),
        (RCODE_YXRRSET, "YXRRSET"),
        (RCODE_NXRRSET, "NXRRSET"),
        (RCODE_NOTAUTH, "NOTAUTH"),
        (RCODE_NOTZONE, "NOTZONE"),
    ])
});

/// Presentation name for a type code; unknown codes use the rfc3597
/// "TYPE12345" form.
pub fn type_name(typ: Type) -> String {
    match TYPE_NAMES.get(&typ) {
        Some(name) => name.to_string(),
        None => format!("TYPE{}", typ),
    }
}

/// Reverse of [type_name], accepting the rfc3597 form as well.
pub fn type_code(name: &str) -> Option<Type> {
    let upper = name.to_ascii_uppercase();
    if let Some(code) = TYPE_CODES.get(upper.as_str()) {
        return Some(*code);
    }
    upper.strip_prefix("TYPE")?.parse::<Type>().ok()
}

pub fn class_name(class: Class) -> String {
    match CLASS_NAMES.get(&class) {
        Some(name) => name.to_string(),
        None => format!("CLASS{}", class),
    }
}

pub fn opcode_name(opcode: Opcode) -> String {
    match OPCODE_NAMES.get(&opcode) {
        Some(name) => name.to_string(),
        None => format!("OPCODE{}", opcode),
    }
}

pub fn rcode_name(rcode: Rcode) -> String {
    match RCODE_NAMES.get(&rcode) {
        Some(name) => name.to_string(),
        None => format!("RCODE{}", rcode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_lookup() {
        assert_eq!("MX", type_name(TYPE_MX));
        assert_eq!("TYPE999", type_name(999));
        assert_eq!(Some(TYPE_MX), type_code("MX"));
        assert_eq!(Some(TYPE_MX), type_code("mx"));
        assert_eq!(Some(999), type_code("TYPE999"));
        assert_eq!(None, type_code("NOSUCH"));
    }

    #[test]
    fn test_rcode_name_lookup() {
        assert_eq!("SERVFAIL", rcode_name(RCODE_SERVFAIL));
        assert_eq!("RCODE15", rcode_name(15));
    }
}
