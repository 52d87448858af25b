/*!
ref: https://www.rfc-editor.org/rfc/rfc8945#section-4.2

# TSIG RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                Algorithm Name                 /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                                               |
    |                  Time Signed                  |
    |          (48 bits, seconds since epoch)       |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                     Fudge                     |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                   MAC Size                    |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                      MAC                      /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                  Original ID                  |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                     Error                     |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                  Other Len                    |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                  Other Data                   /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

The TSIG RR is a meta RR: class ANY, TTL 0, last record of the
additional section.  The algorithm name is a domain name and is never
compressed.
 */

use anyhow::Error;

use super::RDataOperation;
use crate::dns::{Labels, PacketReader, PacketWriter};
use crate::util;
use base64::Engine as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TSig {
    pub algorithm_name: Labels,
    pub time_signed: u64,
    pub fudge: u16,
    pub mac: Vec<u8>,
    pub original_id: u16,
    pub error: u16,
    pub other: Vec<u8>,
}

impl TSig {
    pub fn new() -> Self {
        Self {
            algorithm_name: Labels::root(),
            time_signed: 0,
            fudge: 300,
            mac: vec![],
            original_id: 0,
            error: 0,
            other: vec![],
        }
    }

    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut tsig = Self::new();
        tsig.decode(rdr, rdlength)?;
        Ok(tsig)
    }

    pub fn with_algorithm_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        self.algorithm_name = Labels::from_str(name)?;
        Ok(self)
    }

    pub fn with_time_signed(&mut self, time_signed: u64) -> &mut Self {
        // only 48 bits travel on the wire
        self.time_signed = time_signed & 0x0000_FFFF_FFFF_FFFF;
        self
    }

    pub fn with_original_id(&mut self, id: u16) -> &mut Self {
        self.original_id = id;
        self
    }
}

impl Default for TSig {
    fn default() -> Self {
        Self::new()
    }
}

impl RDataOperation for TSig {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.algorithm_name = rdr.read_name()?;
        self.time_signed = rdr.read_u48()?;
        self.fudge = rdr.read_u16()?;
        let mac_size = rdr.read_u16()? as usize;
        self.mac = rdr.read_bytes(mac_size)?.to_vec();
        self.original_id = rdr.read_u16()?;
        self.error = rdr.read_u16()?;
        let other_len = rdr.read_u16()? as usize;
        self.other = rdr.read_bytes(other_len)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.algorithm_name, false)?;
        wtr.write_u48(self.time_signed);
        wtr.write_u16(self.fudge);
        wtr.write_u16(self.mac.len() as u16);
        wtr.write_bytes(&self.mac);
        wtr.write_u16(self.original_id);
        wtr.write_u16(self.error);
        wtr.write_u16(self.other.len() as u16);
        wtr.write_bytes(&self.other);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.algorithm_name.to_str(),
            self.time_signed,
            self.fudge,
            util::BASE64_ENGINE.encode(&self.mac),
            self.original_id,
            self.error,
            util::BASE64_ENGINE.encode(&self.other)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsig_wire_roundtrip() {
        let mut tsig = TSig::new();
        tsig.with_algorithm_name("hmac-sha256")
            .unwrap()
            .with_time_signed(0x0000_1234_5678_9ABC)
            .with_original_id(0x4321);
        tsig.mac = vec![0xAA; 32];
        tsig.error = 18;
        tsig.other = 0x0000_1234_5678_0000_u64.to_be_bytes()[2..].to_vec();

        let mut wtr = PacketWriter::new();
        tsig.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = TSig::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(tsig, decoded);
        assert_eq!(0, rdr.remaining());
    }

    #[test]
    fn test_tsig_time_mask() {
        let mut tsig = TSig::new();
        tsig.with_time_signed(u64::MAX);
        assert_eq!(0x0000_FFFF_FFFF_FFFF, tsig.time_signed);
    }
}
