use std::fmt;

use anyhow::Error;

use super::rdata::{Raw, RDataType};
use super::{
    class_name, type_name, Class, Labels, PacketReader, PacketWriter, Type, TYPE_SIG, TYPE_TSIG,
};
use crate::error::DnsError;

/// The answer, authority, and additional sections all share the same
/// format: a variable number of resource records, where the number of
/// records is specified in the corresponding count field in the header.
/// Each resource record has the following format:
/// # Examples:
/// ```shell
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                                               /
///     /                      NAME                     /
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--|
///     /                     RDATA                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
/// The wire RDLENGTH is recomputed on every serialization; on decode it
/// only bounds the rdata span and the consumed octets must match it
/// exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    name: Labels,
    typ: Type,
    class: Class,
    ttl: u32,
    rdata: RDataType,
}

impl ResourceRecord {
    pub fn new() -> Self {
        Self {
            name: Labels::root(),
            typ: 0,
            class: 0,
            ttl: 0,
            rdata: RDataType::Raw(Raw(vec![])),
        }
    }

    pub fn decode(rdr: &mut PacketReader) -> Result<Self, Error> {
        let name = rdr.read_name()?;
        let typ = rdr.read_u16()?;
        let class = rdr.read_u16()?;
        let ttl = rdr.read_u32()?;
        let rdlength = rdr.read_u16()?;

        let end = rdr.position() + rdlength as usize;
        if end > rdr.raw().len() {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "rdlength {} overruns the packet",
                rdlength
            ))));
        }
        let rdata = RDataType::from_wire(rdr, typ, rdlength)?;
        if rdr.position() != end {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "rdata of type {} consumed {} octets, rdlength said {}",
                type_name(typ),
                rdr.position() - (end - rdlength as usize),
                rdlength
            ))));
        }

        Ok(Self {
            name,
            typ,
            class,
            ttl,
            rdata,
        })
    }

    /// Write the record: name, fixed fields, a placeholder rdlength,
    /// the rdata, then back-patch the rdlength.
    pub fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        // the meta RR owner names travel uncompressed
        let compress_name = compress && self.typ != TYPE_TSIG && self.typ != TYPE_SIG;
        wtr.write_name(&self.name, compress_name)?;
        wtr.write_u16(self.typ);
        wtr.write_u16(self.class);
        wtr.write_u32(self.ttl);
        let rdlength_pos = wtr.len();
        wtr.write_u16(0);
        self.rdata.encode(wtr, compress)?;
        let rdlength = wtr.len() - rdlength_pos - 2;
        if rdlength > u16::MAX as usize {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "rdata of type {} exceeds 65535 octets",
                type_name(self.typ)
            ))));
        }
        wtr.patch_u16(rdlength_pos, rdlength as u16);
        Ok(())
    }

    /// The rfc4034 section 6 canonical image used for RRset signing:
    /// owner lowercased and uncompressed, the TTL replaced by the
    /// signature's original TTL, names inside the rdata lowercased.
    pub fn canonical_wire(&self, origin_ttl: u32) -> Result<Vec<u8>, Error> {
        let mut wtr = PacketWriter::canonical();
        wtr.write_name(&self.name, false)?;
        wtr.write_u16(self.typ);
        wtr.write_u16(self.class);
        wtr.write_u32(origin_ttl);
        let rdlength_pos = wtr.len();
        wtr.write_u16(0);
        self.rdata.encode(&mut wtr, false)?;
        let rdlength = wtr.len() - rdlength_pos - 2;
        wtr.patch_u16(rdlength_pos, rdlength as u16);
        Ok(wtr.into_bytes())
    }

    pub fn name(&self) -> &Labels {
        &self.name
    }

    pub fn with_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.name = Labels::from_str(name)?;
        Ok(self)
    }

    pub fn with_labels(&mut self, name: Labels) -> &mut Self {
        self.name = name;
        self
    }

    pub fn typ(&self) -> Type {
        self.typ
    }

    pub fn with_type(&mut self, typ: Type) -> &mut Self {
        self.typ = typ;
        self
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn with_class(&mut self, class: Class) -> &mut Self {
        self.class = class;
        self
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn with_ttl(&mut self, ttl: u32) -> &mut Self {
        self.ttl = ttl;
        self
    }

    pub fn rdata(&self) -> &RDataType {
        &self.rdata
    }

    pub fn with_rdata(&mut self, rdata: RDataType) -> &mut Self {
        self.rdata = rdata;
        self
    }
}

impl Default for ResourceRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name.to_str(),
            self.ttl,
            class_name(self.class),
            type_name(self.typ),
            self.rdata.text()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RRs(pub Vec<ResourceRecord>);

impl RRs {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, rr: ResourceRecord) {
        self.0.push(rr);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.0.iter()
    }

    pub fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        for rr in &self.0 {
            rr.encode(wtr, compress)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::rdata::{A, MX};
    use crate::dns::{CLASS_IN, TYPE_A, TYPE_MX};
    use std::net::Ipv4Addr;

    fn sample_a() -> ResourceRecord {
        let mut rr = ResourceRecord::new();
        rr.with_name("host.example.com").unwrap();
        rr.with_type(TYPE_A)
            .with_class(CLASS_IN)
            .with_ttl(3600)
            .with_rdata(RDataType::A(A(Ipv4Addr::new(192, 0, 2, 1))));
        rr
    }

    #[test]
    fn test_rr_wire_roundtrip() {
        let rr = sample_a();
        let mut wtr = PacketWriter::new();
        rr.encode(&mut wtr, false).unwrap();
        let raw = wtr.into_bytes();
        // rdlength back-patched to 4
        assert_eq!(0x00, raw[raw.len() - 6]);
        assert_eq!(0x04, raw[raw.len() - 5]);

        let mut rdr = PacketReader::new(&raw);
        let decoded = ResourceRecord::decode(&mut rdr).unwrap();
        assert_eq!(rr, decoded);
        assert_eq!(0, rdr.remaining());
    }

    #[test]
    fn test_rr_decode_rdlength_mismatch() {
        let rr = sample_a();
        let mut wtr = PacketWriter::new();
        rr.encode(&mut wtr, false).unwrap();
        let mut raw = wtr.into_bytes();
        // claim 5 octets of rdata where the A parser consumes 4
        let pos = raw.len() - 6;
        raw[pos + 1] = 5;
        raw.push(0xFF);
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(true, ResourceRecord::decode(&mut rdr).is_err());
    }

    #[test]
    fn test_rr_decode_rdlength_overrun() {
        let rr = sample_a();
        let mut wtr = PacketWriter::new();
        rr.encode(&mut wtr, false).unwrap();
        let mut raw = wtr.into_bytes();
        let pos = raw.len() - 6;
        // rdlength larger than the remaining packet
        raw[pos + 1] = 200;
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(true, ResourceRecord::decode(&mut rdr).is_err());
    }

    #[test]
    fn test_rr_display() {
        let rr = sample_a();
        assert_eq!("host.example.com. 3600 IN A 192.0.2.1", format!("{}", rr));
    }

    #[test]
    fn test_rr_canonical_wire() {
        let mut rr = ResourceRecord::new();
        rr.with_name("Mail.Example.ORG").unwrap();
        rr.with_type(TYPE_MX).with_class(CLASS_IN).with_ttl(123);
        rr.with_rdata(RDataType::MX(MX {
            preference: 10,
            exchange: Labels::from_str("MX1.Example.ORG").unwrap(),
        }));

        let bts = rr.canonical_wire(86400).unwrap();
        // owner lowercased
        assert_eq!(b'm', bts[1]);
        // ttl replaced by the original ttl
        let ttl_off = 1 + 4 + 1 + 7 + 1 + 3 + 1 + 2 + 2;
        assert_eq!(
            86400_u32.to_be_bytes().to_vec(),
            bts[ttl_off..ttl_off + 4].to_vec()
        );
        // exchange name inside the rdata lowercased as well
        assert_eq!(true, bts.windows(3).any(|w| w == b"mx1"));
    }
}
