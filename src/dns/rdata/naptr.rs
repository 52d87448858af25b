/*!
ref: https://www.rfc-editor.org/rfc/rfc3403#section-4.1

# NAPTR RDATA format

     0                   1                   2                   3
     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    |                     ORDER                     |
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    |                   PREFERENCE                  |
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    /                     FLAGS                     /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    /                   SERVICES                    /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    /                    REGEXP                     /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    /                  REPLACEMENT                  /
    /                                               /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

FLAGS, SERVICES and REGEXP are <character-string>s; REPLACEMENT is a
<domain-name> and is not compressed.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u16, quote_string, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NAPTR {
    pub order: u16,
    pub preference: u16,
    pub flags: Vec<u8>,
    pub services: Vec<u8>,
    pub regexp: Vec<u8>,
    pub replacement: Labels,
}

impl NAPTR {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut naptr = Self {
            order: 0,
            preference: 0,
            flags: vec![],
            services: vec![],
            regexp: vec![],
            replacement: Labels::root(),
        };
        naptr.decode(rdr, rdlength)?;
        Ok(naptr)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 6, "NAPTR")?;
        Ok(Self {
            order: parse_u16(tokens[0], "NAPTR order")?,
            preference: parse_u16(tokens[1], "NAPTR preference")?,
            flags: tokens[2].as_bytes().to_vec(),
            services: tokens[3].as_bytes().to_vec(),
            regexp: tokens[4].as_bytes().to_vec(),
            replacement: Labels::from_str(tokens[5])?,
        })
    }
}

impl RDataOperation for NAPTR {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.order = rdr.read_u16()?;
        self.preference = rdr.read_u16()?;
        self.flags = rdr.read_character_string()?;
        self.services = rdr.read_character_string()?;
        self.regexp = rdr.read_character_string()?;
        self.replacement = rdr.read_name()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.order);
        wtr.write_u16(self.preference);
        wtr.write_character_string(&self.flags)?;
        wtr.write_character_string(&self.services)?;
        wtr.write_character_string(&self.regexp)?;
        wtr.write_name(&self.replacement, false)
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.order,
            self.preference,
            quote_string(&self.flags),
            quote_string(&self.services),
            quote_string(&self.regexp),
            self.replacement.to_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naptr_roundtrip() {
        let naptr = NAPTR::from_text(&[
            "100",
            "50",
            "s",
            "SIP+D2U",
            "",
            "_sip._udp.example.com.",
        ])
        .unwrap();
        let mut wtr = PacketWriter::new();
        naptr.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = NAPTR::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(naptr, decoded);
        assert_eq!(0, rdr.remaining());
    }
}
