/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.2

# HINFO RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                      CPU                      /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                       OS                      /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

CPU             A <character-string> which specifies the CPU type.

OS              A <character-string> which specifies the operating
                system type.
 */

use anyhow::Error;

use super::{expect_tokens, quote_string, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HInfo {
    pub cpu: Vec<u8>,
    pub os: Vec<u8>,
}

impl HInfo {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut hinfo = Self {
            cpu: vec![],
            os: vec![],
        };
        hinfo.decode(rdr, rdlength)?;
        Ok(hinfo)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 2, "HINFO")?;
        Ok(Self {
            cpu: tokens[0].as_bytes().to_vec(),
            os: tokens[1].as_bytes().to_vec(),
        })
    }
}

impl RDataOperation for HInfo {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.cpu = rdr.read_character_string()?;
        self.os = rdr.read_character_string()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_character_string(&self.cpu)?;
        wtr.write_character_string(&self.os)
    }

    fn text(&self) -> String {
        format!("{} {}", quote_string(&self.cpu), quote_string(&self.os))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hinfo_wire_roundtrip() {
        let raw = [0x03, b'V', b'A', b'X', 0x04, b'U', b'N', b'I', b'X'];
        let mut rdr = PacketReader::new(&raw);
        let hinfo = HInfo::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(b"VAX".to_vec(), hinfo.cpu);
        assert_eq!(b"UNIX".to_vec(), hinfo.os);
        assert_eq!("\"VAX\" \"UNIX\"", hinfo.text());

        let mut wtr = PacketWriter::new();
        hinfo.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }
}
