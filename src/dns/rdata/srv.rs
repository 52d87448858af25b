/*!
ref: https://www.rfc-editor.org/rfc/rfc2782

SRV carries { priority, weight, port, target }.  The target is a
<domain-name> and is not compressed on the wire.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u16, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SRV {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: Labels,
}

impl SRV {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut srv = Self {
            priority: 0,
            weight: 0,
            port: 0,
            target: Labels::root(),
        };
        srv.decode(rdr, rdlength)?;
        Ok(srv)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 4, "SRV")?;
        Ok(Self {
            priority: parse_u16(tokens[0], "SRV priority")?,
            weight: parse_u16(tokens[1], "SRV weight")?,
            port: parse_u16(tokens[2], "SRV port")?,
            target: Labels::from_str(tokens[3])?,
        })
    }
}

impl RDataOperation for SRV {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.priority = rdr.read_u16()?;
        self.weight = rdr.read_u16()?;
        self.port = rdr.read_u16()?;
        self.target = rdr.read_name()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.priority);
        wtr.write_u16(self.weight);
        wtr.write_u16(self.port);
        wtr.write_name(&self.target, false)
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.priority,
            self.weight,
            self.port,
            self.target.to_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srv_roundtrip() {
        let srv = SRV::from_text(&["10", "60", "5060", "sip.example.com."]).unwrap();
        let mut wtr = PacketWriter::new();
        srv.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = SRV::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(srv, decoded);
        assert_eq!("10 60 5060 sip.example.com.", decoded.text());
    }
}
