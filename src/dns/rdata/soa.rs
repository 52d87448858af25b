/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.13

# SOA RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                     MNAME                     /
    /                                               /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                     RNAME                     /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                    SERIAL                     |
    |                                               |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                    REFRESH                    |
    |                                               |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                     RETRY                     |
    |                                               |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                    EXPIRE                     |
    |                                               |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                    MINIMUM                    |
    |                                               |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

All times are in units of seconds and all five numerics are unsigned
32 bit values, presented in decimal.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u32, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SOA {
    /// The <domain-name> of the name server that was the original or
    /// primary source of data for this zone.
    pub mname: Labels,

    /// A <domain-name> which specifies the mailbox of the person
    /// responsible for this zone.
    pub rname: Labels,

    /// The unsigned 32 bit version number of the original copy of the
    /// zone.  Zone transfers preserve this value.  This value wraps and
    /// should be compared using sequence space arithmetic.
    pub serial: u32,

    /// A 32 bit time interval before the zone should be refreshed.
    pub refresh: u32,

    /// A 32 bit time interval that should elapse before a failed refresh
    /// should be retried.
    pub retry: u32,

    /// A 32 bit time value that specifies the upper limit on the time
    /// interval that can elapse before the zone is no longer
    /// authoritative.
    pub expire: u32,

    /// The unsigned 32 bit minimum TTL field that should be exported
    /// with any RR from this zone.
    pub minimum: u32,
}

impl SOA {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut soa = Self {
            mname: Labels::root(),
            rname: Labels::root(),
            serial: 0,
            refresh: 0,
            retry: 0,
            expire: 0,
            minimum: 0,
        };
        soa.decode(rdr, rdlength)?;
        Ok(soa)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 7, "SOA")?;
        Ok(Self {
            mname: Labels::from_str(tokens[0])?,
            rname: Labels::from_str(tokens[1])?,
            serial: parse_u32(tokens[2], "SOA serial")?,
            refresh: parse_u32(tokens[3], "SOA refresh")?,
            retry: parse_u32(tokens[4], "SOA retry")?,
            expire: parse_u32(tokens[5], "SOA expire")?,
            minimum: parse_u32(tokens[6], "SOA minimum")?,
        })
    }
}

impl RDataOperation for SOA {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.mname = rdr.read_name()?;
        self.rname = rdr.read_name()?;
        self.serial = rdr.read_u32()?;
        self.refresh = rdr.read_u32()?;
        self.retry = rdr.read_u32()?;
        self.expire = rdr.read_u32()?;
        self.minimum = rdr.read_u32()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.mname, compress)?;
        wtr.write_name(&self.rname, compress)?;
        wtr.write_u32(self.serial);
        wtr.write_u32(self.refresh);
        wtr.write_u32(self.retry);
        wtr.write_u32(self.expire);
        wtr.write_u32(self.minimum);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.mname.to_str(),
            self.rname.to_str(),
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soa_wire_roundtrip() {
        let mut wtr = PacketWriter::new();
        let soa = SOA::from_text(&[
            "ns1.example.com.",
            "hostmaster.example.com.",
            "2024010101",
            "7200",
            "3600",
            "1209600",
            "86400",
        ])
        .unwrap();
        soa.encode(&mut wtr, false).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = SOA::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(soa, decoded);
        assert_eq!(2024010101, decoded.serial);
        assert_eq!(0, rdr.remaining());
    }

    #[test]
    fn test_soa_text() {
        let soa = SOA::from_text(&["a.", "b.", "1", "2", "3", "4", "5"]).unwrap();
        assert_eq!("a. b. 1 2 3 4 5", soa.text());
        // serial is a full unsigned 32 bit value
        let soa = SOA::from_text(&["a.", "b.", "4294967295", "2", "3", "4", "5"]).unwrap();
        assert_eq!(u32::MAX, soa.serial);
        assert_eq!(true, SOA::from_text(&["a.", "b.", "4294967296", "2", "3", "4", "5"]).is_err());
    }
}
