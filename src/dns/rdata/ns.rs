/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.11

# NS RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                   NSDNAME                     /
    /                                               /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

NSDNAME         A <domain-name> which specifies a host which should be
                authoritative for the specified class and domain.
 */

use anyhow::Error;

use super::{expect_tokens, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NS(pub Labels);

impl NS {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut ns = Self(Labels::root());
        ns.decode(rdr, rdlength)?;
        Ok(ns)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 1, "NS")?;
        Ok(Self(Labels::from_str(tokens[0])?))
    }
}

impl RDataOperation for NS {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.0 = rdr.read_name()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.0, compress)
    }

    fn text(&self) -> String {
        self.0.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_wire_roundtrip() {
        let raw = [0x02, b'n', b's', 0x03, b'c', b'o', b'm', 0x00];
        let mut rdr = PacketReader::new(&raw);
        let ns = NS::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!("ns.com.", ns.text());

        let mut wtr = PacketWriter::new();
        ns.encode(&mut wtr, false).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }
}
