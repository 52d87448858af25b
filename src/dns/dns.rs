use anyhow::Error;

use super::header::Header;
use super::question::Question;
use super::rdata::{EdnsOption, RDataType, OPT};
use super::rr::{ResourceRecord, RRs};
use super::{Class, Labels, PacketReader, PacketWriter, Type, TYPE_OPT, TYPE_SIG, TYPE_TSIG};
use crate::error::DnsError;

/**
# DNS Structure:
```shell
+---------------------+
|        Header       |
+---------------------+
|       Question      | the question for the name server
+---------------------+
|        Answer       | RRs answering the question
+---------------------+
|      Authority      | RRs pointing toward an authority
+---------------------+
|      Additional     | RRs holding additional information
```

After a decode the four section lists hold exactly the counts the
header declared, and the original wire image stays available in `raw`
for the MAC computations of TSIG verification.
*/
#[derive(Debug, Clone)]
pub struct DNS {
    raw: Vec<u8>,

    head: Header,
    ques: Vec<Question>,
    answers: RRs,
    authority: RRs,
    additional: RRs,

    /// wire offset of the trailing TSIG RR, when the packet was decoded
    /// and carries one
    tsig_offset: Option<usize>,

    /// likewise for a trailing SIG(0) RR
    sig0_offset: Option<usize>,
}

impl DNS {
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            head: Header::new(),
            ques: Vec::new(),
            answers: RRs::new(),
            authority: RRs::new(),
            additional: RRs::new(),
            tsig_offset: None,
            sig0_offset: None,
        }
    }

    pub fn from(raw: &[u8]) -> Result<Self, Error> {
        let head = Header::decode(raw)?;
        let mut rdr = PacketReader::at(raw, 12);

        let mut ques = Vec::new();
        for _ in 0..head.qdcount() {
            ques.push(Question::decode(&mut rdr)?);
        }

        let read_section = |count: u16,
                                rdr: &mut PacketReader,
                                last_offset: &mut Option<usize>|
         -> Result<RRs, Error> {
            let mut rrs = RRs::new();
            for _ in 0..count {
                *last_offset = Some(rdr.position());
                rrs.push(ResourceRecord::decode(rdr)?);
            }
            Ok(rrs)
        };

        let mut last_offset = None;
        let answers = read_section(head.ancount(), &mut rdr, &mut last_offset)?;
        let authority = read_section(head.nscount(), &mut rdr, &mut last_offset)?;
        last_offset = None;
        let additional = read_section(head.arcount(), &mut rdr, &mut last_offset)?;

        let (tsig_offset, sig0_offset) = match (last_offset, additional.0.last()) {
            (Some(offset), Some(rr)) if rr.typ() == TYPE_TSIG => (Some(offset), None),
            (Some(offset), Some(rr)) if rr.typ() == TYPE_SIG => (None, Some(offset)),
            _ => (None, None),
        };

        Ok(Self {
            raw: raw.to_vec(),
            head,
            ques,
            answers,
            authority,
            additional,
            tsig_offset,
            sig0_offset,
        })
    }

    /// Serialize.  The four count fields are filled from the section
    /// lists first; `compress` controls rfc1035 4.1.4 name compression.
    pub fn encode(&mut self, compress: bool) -> Result<Vec<u8>, Error> {
        self.head
            .with_qdcount(self.ques.len() as u16)
            .with_ancount(self.answers.len() as u16)
            .with_nscount(self.authority.len() as u16)
            .with_arcount(self.additional.len() as u16);

        let mut wtr = PacketWriter::new();
        wtr.write_bytes(&self.head.as_bytes());
        for ques in &self.ques {
            ques.encode(&mut wtr, compress)?;
        }
        self.answers.encode(&mut wtr, compress)?;
        self.authority.encode(&mut wtr, compress)?;
        self.additional.encode(&mut wtr, compress)?;
        Ok(wtr.into_bytes())
    }

    pub fn head(&self) -> &Header {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut Header {
        &mut self.head
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn with_ques(&mut self, qname: &str, qtype: Type, qclass: Class) -> Result<&mut Self, Error> {
        self.ques
            .push(Question::new(Labels::from_str(qname)?, qtype, qclass));
        Ok(self)
    }

    pub fn ques(&self) -> &[Question] {
        &self.ques
    }

    pub fn answers(&self) -> &RRs {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut RRs {
        &mut self.answers
    }

    pub fn authority(&self) -> &RRs {
        &self.authority
    }

    pub fn additional(&self) -> &RRs {
        &self.additional
    }

    pub fn with_answer(&mut self, rr: ResourceRecord) -> &mut Self {
        self.answers.push(rr);
        self
    }

    pub fn with_authority(&mut self, rr: ResourceRecord) -> &mut Self {
        self.authority.push(rr);
        self
    }

    pub fn with_additional(&mut self, rr: ResourceRecord) -> &mut Self {
        self.additional.push(rr);
        self
    }

    /// Attach the EDNS0 pseudo RR: owner is the root, the class carries
    /// the requestor's UDP payload size, the TTL the extended-RCODE,
    /// version and DO bit.  At most one OPT per packet.
    ///
    /// ref: https://www.rfc-editor.org/rfc/rfc6891#section-6.1.2
    pub fn with_edns(
        &mut self,
        payload: u16,
        do_bit: bool,
        options: Vec<EdnsOption>,
    ) -> Result<&mut Self, Error> {
        if self.edns().is_some() {
            return Err(Error::new(DnsError::Configuration(
                "packet already carries an OPT record".to_string(),
            )));
        }
        let mut ttl = 0_u32;
        if do_bit {
            ttl |= 0x0000_8000;
        }
        let mut rr = ResourceRecord::new();
        rr.with_type(TYPE_OPT)
            .with_class(payload)
            .with_ttl(ttl)
            .with_rdata(RDataType::OPT(OPT(options)));
        self.additional.push(rr);
        Ok(self)
    }

    pub fn edns(&self) -> Option<&ResourceRecord> {
        self.additional.iter().find(|rr| rr.typ() == TYPE_OPT)
    }

    /// The 12-bit extended RCODE: the OPT TTL's top octet prepended to
    /// the 4-bit header field.  Without an OPT this is the header RCODE.
    pub fn extended_rcode(&self) -> u16 {
        match self.edns() {
            Some(opt) => ((opt.ttl() >> 24) as u16) << 4 | self.head.rcode() as u16,
            None => self.head.rcode() as u16,
        }
    }

    pub fn edns_version(&self) -> Option<u8> {
        self.edns().map(|opt| (opt.ttl() >> 16) as u8)
    }

    pub fn edns_do(&self) -> bool {
        match self.edns() {
            Some(opt) => opt.ttl() & 0x0000_8000 != 0,
            None => false,
        }
    }

    /// The peer's UDP payload size, clamped below at the 512 octet
    /// rfc1035 default.
    pub fn edns_payload(&self) -> u16 {
        match self.edns() {
            Some(opt) => opt.class().max(512),
            None => 512,
        }
    }

    /// The trailing TSIG of a decoded packet, with its wire offset.
    pub fn tsig(&self) -> Option<(&ResourceRecord, usize)> {
        let offset = self.tsig_offset?;
        self.additional.0.last().map(|rr| (rr, offset))
    }

    /// Strip a TSIG appended by a signer, for re-signing on retry.
    pub fn pop_tsig(&mut self) -> Option<ResourceRecord> {
        match self.additional.0.last() {
            Some(rr) if rr.typ() == TYPE_TSIG => {
                self.tsig_offset = None;
                self.additional.0.pop()
            }
            _ => None,
        }
    }

    /// The trailing SIG(0) of a decoded packet, with its wire offset.
    pub fn sig0(&self) -> Option<(&ResourceRecord, usize)> {
        let offset = self.sig0_offset?;
        self.additional.0.last().map(|rr| (rr, offset))
    }

    /// Strip a SIG(0) appended by a signer, for re-signing on retry.
    pub fn pop_sig0(&mut self) -> Option<ResourceRecord> {
        match self.additional.0.last() {
            Some(rr) if rr.typ() == TYPE_SIG => {
                self.sig0_offset = None;
                self.additional.0.pop()
            }
            _ => None,
        }
    }
}

impl Default for DNS {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::rdata::A;
    use crate::dns::{CLASS_IN, TYPE_A, TYPE_MX};
    use std::net::Ipv4Addr;

    #[test]
    fn test_dns_query_wire_image() {
        // a google.com MX query with RD set and a fixed ID is exactly 28
        // octets
        let mut dns = DNS::new();
        dns.head_mut().with_id(0x1234).with_rd(true);
        dns.with_ques("google.com", TYPE_MX, CLASS_IN).unwrap();
        let raw = dns.encode(true).unwrap();

        let expect: Vec<u8> = vec![
            0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // header
            0x06, 0x67, 0x6F, 0x6F, 0x67, 0x6C, 0x65, 0x03, 0x63, 0x6F, 0x6D, 0x00, // qname
            0x00, 0x0F, 0x00, 0x01, // qtype, qclass
        ];
        assert_eq!(28, raw.len());
        assert_eq!(expect, raw);
    }

    #[test]
    fn test_dns_decode_counts_match_sections() {
        let mut dns = DNS::new();
        dns.head_mut().with_qr(true);
        dns.with_ques("example.com", TYPE_A, CLASS_IN).unwrap();
        let mut rr = ResourceRecord::new();
        rr.with_name("example.com").unwrap();
        rr.with_type(TYPE_A)
            .with_class(CLASS_IN)
            .with_ttl(60)
            .with_rdata(RDataType::A(A(Ipv4Addr::new(93, 184, 216, 34))));
        dns.with_answer(rr.clone());
        dns.with_additional(rr);
        let raw = dns.encode(true).unwrap();

        let decoded = DNS::from(&raw).unwrap();
        assert_eq!(decoded.head().qdcount() as usize, decoded.ques().len());
        assert_eq!(decoded.head().ancount() as usize, decoded.answers().len());
        assert_eq!(decoded.head().nscount() as usize, decoded.authority().len());
        assert_eq!(
            decoded.head().arcount() as usize,
            decoded.additional().len()
        );
        assert_eq!(raw, decoded.raw());
    }

    #[test]
    fn test_dns_decode_truncated_section_fails() {
        let mut dns = DNS::new();
        dns.with_ques("example.com", TYPE_A, CLASS_IN).unwrap();
        let mut raw = dns.encode(true).unwrap();
        // claim an answer that is not there
        raw[7] = 1;
        assert_eq!(true, DNS::from(&raw).is_err());
    }

    #[test]
    fn test_dns_reencode_without_compression_is_identity() {
        // build a packet whose names repeat, encode it compressed,
        // decode, re-encode without compression, decode again: the
        // decoded forms agree and the uncompressed image re-encodes
        // byte-identical
        let mut dns = DNS::new();
        dns.with_ques("a.example.com", TYPE_A, CLASS_IN).unwrap();
        let mut rr = ResourceRecord::new();
        rr.with_name("a.example.com").unwrap();
        rr.with_type(TYPE_A)
            .with_class(CLASS_IN)
            .with_ttl(60)
            .with_rdata(RDataType::A(A(Ipv4Addr::new(10, 0, 0, 1))));
        dns.with_answer(rr);

        let compressed = dns.encode(true).unwrap();
        let mut first = DNS::from(&compressed).unwrap();
        let plain = first.encode(false).unwrap();
        assert_eq!(true, plain.len() >= compressed.len());

        let mut second = DNS::from(&plain).unwrap();
        assert_eq!(plain, second.encode(false).unwrap());
    }

    #[test]
    fn test_dns_edns_accessors() {
        let mut dns = DNS::new();
        dns.with_ques("example.com", TYPE_A, CLASS_IN).unwrap();
        dns.with_edns(4096, true, vec![]).unwrap();
        assert_eq!(true, dns.with_edns(4096, true, vec![]).is_err());

        let raw = dns.encode(true).unwrap();
        let decoded = DNS::from(&raw).unwrap();
        assert_eq!(4096, decoded.edns_payload());
        assert_eq!(Some(0), decoded.edns_version());
        assert_eq!(true, decoded.edns_do());
        assert_eq!(0, decoded.extended_rcode());
    }

    #[test]
    fn test_dns_extended_rcode_assembly() {
        let mut dns = DNS::new();
        dns.head_mut().with_rcode(1);
        let mut opt = ResourceRecord::new();
        // the high 8 bits of the extended rcode live in the OPT TTL top
        // octet
        opt.with_type(TYPE_OPT)
            .with_class(1232)
            .with_ttl(0x0100_0000)
            .with_rdata(RDataType::OPT(OPT(vec![])));
        dns.with_additional(opt);
        assert_eq!((1 << 4) | 1, dns.extended_rcode());
    }
}
