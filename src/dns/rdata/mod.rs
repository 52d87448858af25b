/*!
The RR registry: one module per supported type, each knowing how to
parse its RDATA from wire, serialize it back, and parse/format the
zone-file presentation.

<domain-name> is a domain name represented as a series of labels, and
terminated by a label with zero length.  <character-string> is a single
length octet followed by that number of characters.  <character-string>
is treated as binary information, and can be up to 256 characters in
length (including the length octet).

Unknown type codes decode as [Raw] with the original code preserved on
the record.
 */

mod a;
mod aaaa;
mod caa;
pub mod cname;
mod hinfo;
mod mx;
mod naptr;
mod ns;
pub mod opt;
mod ptr;
mod raw;
pub mod sec;
mod soa;
mod srv;
mod sshfp;
mod tlsa;
pub mod tsig;
mod txt;

pub use self::a::A;
pub use self::aaaa::AAAA;
pub use self::caa::CAA;
pub use self::cname::CName;
pub use self::hinfo::HInfo;
pub use self::mx::MX;
pub use self::naptr::NAPTR;
pub use self::ns::NS;
pub use self::opt::{EdnsOption, OPT};
pub use self::ptr::PTR;
pub use self::raw::Raw;
pub use self::sec::dnskey::DNSKEY;
pub use self::sec::ds::DS;
pub use self::sec::nsec::NSec;
pub use self::sec::nsec3::NSec3;
pub use self::sec::nsec3param::NSec3Param;
pub use self::sec::rrsig::RRSig;
pub use self::soa::SOA;
pub use self::srv::SRV;
pub use self::sshfp::SSHFP;
pub use self::tlsa::TLSA;
pub use self::tsig::TSig;
pub use self::txt::TXT;

use super::{
    PacketReader, PacketWriter, Type, TYPE_A, TYPE_AAAA, TYPE_CAA, TYPE_CDNSKEY, TYPE_CDS,
    TYPE_CNAME, TYPE_DNSKEY, TYPE_DS, TYPE_HINFO, TYPE_MX, TYPE_NAPTR, TYPE_NS, TYPE_NSEC,
    TYPE_NSEC3, TYPE_NSEC3PARAM, TYPE_OPT, TYPE_PTR, TYPE_RRSIG, TYPE_SIG, TYPE_SOA, TYPE_SRV,
    TYPE_SSHFP, TYPE_TLSA, TYPE_TSIG, TYPE_TXT,
};
use crate::error::DnsError;
use anyhow::Error;
use std::fmt::Debug;

/**
RDataOperation contains the wire and presentation operations every
registry entry provides:
- decode: the rdata from the wire into the concrete object; the reader
  sits at the first rdata octet and `rdlength` bounds the span.
- encode: the concrete object back onto the wire.  `compress` only has
  an effect for the rfc1035 types whose names may be compressed.
- text: the zone-file presentation of the rdata.
*/
pub trait RDataOperation: Debug {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error>;

    fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error>;

    fn text(&self) -> String;
}

/**
RDataType unions all the objects that impl the RDataOperation.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RDataType {
    A(A),
    AAAA(AAAA),
    NS(NS),
    CName(CName),
    SOA(SOA),
    PTR(PTR),
    HInfo(HInfo),
    MX(MX),
    TXT(TXT),
    SRV(SRV),
    NAPTR(NAPTR),
    CAA(CAA),
    TLSA(TLSA),
    SSHFP(SSHFP),
    OPT(OPT),
    TSig(TSig),
    /// SIG(0), rfc2931: the RRSIG shape under type code 24
    Sig(RRSig),
    DNSKEY(DNSKEY),
    RRSig(RRSig),
    DS(DS),
    NSec(NSec),
    NSec3(NSec3),
    NSec3Param(NSec3Param),
    Raw(Raw),
}

impl RDataType {
    /// Dispatch on the type code.  A zero rdlength is kept as [Raw] for
    /// every type but OPT, so the dynamic-update sentinel records
    /// (empty rdata under a real type code) survive a round trip.
    pub fn from_wire(rdr: &mut PacketReader, typ: Type, rdlength: u16) -> Result<Self, Error> {
        if rdlength == 0 && typ != TYPE_OPT {
            return Ok(RDataType::Raw(Raw(vec![])));
        }
        match typ {
            TYPE_A => Ok(RDataType::A(A::from_wire(rdr, rdlength)?)),
            TYPE_AAAA => Ok(RDataType::AAAA(AAAA::from_wire(rdr, rdlength)?)),
            TYPE_NS => Ok(RDataType::NS(NS::from_wire(rdr, rdlength)?)),
            TYPE_CNAME => Ok(RDataType::CName(CName::from_wire(rdr, rdlength)?)),
            TYPE_SOA => Ok(RDataType::SOA(SOA::from_wire(rdr, rdlength)?)),
            TYPE_PTR => Ok(RDataType::PTR(PTR::from_wire(rdr, rdlength)?)),
            TYPE_HINFO => Ok(RDataType::HInfo(HInfo::from_wire(rdr, rdlength)?)),
            TYPE_MX => Ok(RDataType::MX(MX::from_wire(rdr, rdlength)?)),
            TYPE_TXT => Ok(RDataType::TXT(TXT::from_wire(rdr, rdlength)?)),
            TYPE_SRV => Ok(RDataType::SRV(SRV::from_wire(rdr, rdlength)?)),
            TYPE_NAPTR => Ok(RDataType::NAPTR(NAPTR::from_wire(rdr, rdlength)?)),
            TYPE_CAA => Ok(RDataType::CAA(CAA::from_wire(rdr, rdlength)?)),
            TYPE_TLSA => Ok(RDataType::TLSA(TLSA::from_wire(rdr, rdlength)?)),
            TYPE_SSHFP => Ok(RDataType::SSHFP(SSHFP::from_wire(rdr, rdlength)?)),
            TYPE_OPT => Ok(RDataType::OPT(OPT::from_wire(rdr, rdlength)?)),
            TYPE_TSIG => Ok(RDataType::TSig(TSig::from_wire(rdr, rdlength)?)),
            TYPE_SIG => Ok(RDataType::Sig(RRSig::from_wire(rdr, rdlength)?)),
            TYPE_DNSKEY | TYPE_CDNSKEY => Ok(RDataType::DNSKEY(DNSKEY::from_wire(rdr, rdlength)?)),
            TYPE_RRSIG => Ok(RDataType::RRSig(RRSig::from_wire(rdr, rdlength)?)),
            TYPE_DS | TYPE_CDS => Ok(RDataType::DS(DS::from_wire(rdr, rdlength)?)),
            TYPE_NSEC => Ok(RDataType::NSec(NSec::from_wire(rdr, rdlength)?)),
            TYPE_NSEC3 => Ok(RDataType::NSec3(NSec3::from_wire(rdr, rdlength)?)),
            TYPE_NSEC3PARAM => Ok(RDataType::NSec3Param(NSec3Param::from_wire(rdr, rdlength)?)),
            _ => Ok(RDataType::Raw(Raw::from_wire(rdr, rdlength)?)),
        }
    }

    /// Build from presentation tokens (the output of [tokenize]).
    pub fn from_text(typ: Type, tokens: &[&str]) -> Result<Self, Error> {
        match typ {
            TYPE_A => Ok(RDataType::A(A::from_text(tokens)?)),
            TYPE_AAAA => Ok(RDataType::AAAA(AAAA::from_text(tokens)?)),
            TYPE_NS => Ok(RDataType::NS(NS::from_text(tokens)?)),
            TYPE_CNAME => Ok(RDataType::CName(CName::from_text(tokens)?)),
            TYPE_SOA => Ok(RDataType::SOA(SOA::from_text(tokens)?)),
            TYPE_PTR => Ok(RDataType::PTR(PTR::from_text(tokens)?)),
            TYPE_HINFO => Ok(RDataType::HInfo(HInfo::from_text(tokens)?)),
            TYPE_MX => Ok(RDataType::MX(MX::from_text(tokens)?)),
            TYPE_TXT => Ok(RDataType::TXT(TXT::from_text(tokens)?)),
            TYPE_SRV => Ok(RDataType::SRV(SRV::from_text(tokens)?)),
            TYPE_NAPTR => Ok(RDataType::NAPTR(NAPTR::from_text(tokens)?)),
            TYPE_CAA => Ok(RDataType::CAA(CAA::from_text(tokens)?)),
            TYPE_TLSA => Ok(RDataType::TLSA(TLSA::from_text(tokens)?)),
            TYPE_SSHFP => Ok(RDataType::SSHFP(SSHFP::from_text(tokens)?)),
            TYPE_SIG => Ok(RDataType::Sig(RRSig::from_text(tokens)?)),
            TYPE_DNSKEY | TYPE_CDNSKEY => Ok(RDataType::DNSKEY(DNSKEY::from_text(tokens)?)),
            TYPE_RRSIG => Ok(RDataType::RRSig(RRSig::from_text(tokens)?)),
            TYPE_DS | TYPE_CDS => Ok(RDataType::DS(DS::from_text(tokens)?)),
            TYPE_NSEC => Ok(RDataType::NSec(NSec::from_text(tokens)?)),
            TYPE_NSEC3 => Ok(RDataType::NSec3(NSec3::from_text(tokens)?)),
            TYPE_NSEC3PARAM => Ok(RDataType::NSec3Param(NSec3Param::from_text(tokens)?)),
            _ => Ok(RDataType::Raw(Raw::from_text(tokens)?)),
        }
    }

    fn op(&self) -> &dyn RDataOperation {
        match self {
            RDataType::A(v) => v,
            RDataType::AAAA(v) => v,
            RDataType::NS(v) => v,
            RDataType::CName(v) => v,
            RDataType::SOA(v) => v,
            RDataType::PTR(v) => v,
            RDataType::HInfo(v) => v,
            RDataType::MX(v) => v,
            RDataType::TXT(v) => v,
            RDataType::SRV(v) => v,
            RDataType::NAPTR(v) => v,
            RDataType::CAA(v) => v,
            RDataType::TLSA(v) => v,
            RDataType::SSHFP(v) => v,
            RDataType::OPT(v) => v,
            RDataType::TSig(v) => v,
            RDataType::Sig(v) => v,
            RDataType::DNSKEY(v) => v,
            RDataType::RRSig(v) => v,
            RDataType::DS(v) => v,
            RDataType::NSec(v) => v,
            RDataType::NSec3(v) => v,
            RDataType::NSec3Param(v) => v,
            RDataType::Raw(v) => v,
        }
    }

    pub fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        self.op().encode(wtr, compress)
    }

    pub fn text(&self) -> String {
        self.op().text()
    }
}

pub(crate) fn expect_tokens(tokens: &[&str], want: usize, what: &str) -> Result<(), Error> {
    if tokens.len() < want {
        return Err(Error::new(DnsError::PacketMalformed(format!(
            "{} rdata needs {} fields, got {}",
            what,
            want,
            tokens.len()
        ))));
    }
    Ok(())
}

pub(crate) fn parse_u8(token: &str, what: &str) -> Result<u8, Error> {
    token
        .parse::<u8>()
        .map_err(|_| Error::new(DnsError::PacketMalformed(format!("bad {} {:?}", what, token))))
}

pub(crate) fn parse_u16(token: &str, what: &str) -> Result<u16, Error> {
    token
        .parse::<u16>()
        .map_err(|_| Error::new(DnsError::PacketMalformed(format!("bad {} {:?}", what, token))))
}

pub(crate) fn parse_u32(token: &str, what: &str) -> Result<u32, Error> {
    token
        .parse::<u32>()
        .map_err(|_| Error::new(DnsError::PacketMalformed(format!("bad {} {:?}", what, token))))
}

/// Quote a character-string for presentation, escaping `"` and `\`.
pub fn quote_string(bts: &[u8]) -> String {
    let mut s = String::with_capacity(bts.len() + 2);
    s.push('"');
    for b in bts {
        match *b {
            b'"' => s.push_str("\\\""),
            b'\\' => s.push_str("\\\\"),
            _ => s.push(*b as char),
        }
    }
    s.push('"');
    s
}

/// Split one zone-file rdata line into tokens.  Double quotes group a
/// token; `\"` and `\\` escape inside and outside quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>, Error> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                has_token = true;
                match chars.next() {
                    // \# introduces the rfc3597 unknown-type form
                    Some('#') => current.push_str("\\#"),
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(Error::new(DnsError::PacketMalformed(
                            "dangling escape at end of rdata".to_string(),
                        )))
                    }
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                has_token = true;
                current.push(c);
            }
        }
    }
    if in_quotes {
        return Err(Error::new(DnsError::PacketMalformed(
            "unterminated quoted string".to_string(),
        )));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}
