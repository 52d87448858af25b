/*!
ref: https://www.rfc-editor.org/rfc/rfc6844#section-5.1

# CAA RDATA format

    +0-1-2-3-4-5-6-7-|0-1-2-3-4-5-6-7-|
    | Flags          | Tag Length = n |
    +----------------+----------------+...+---------------+
    | Tag char 0     | Tag char 1     |...| Tag char n-1  |
    +----------------+----------------+...+---------------+
    +----------------+----------------+.....+----------------+
    | Value byte 0   | Value byte 1   |.....| Value byte m-1 |
    +----------------+----------------+.....+----------------+

Flags bit 0 is the critical flag.  The tag is a sequence of ASCII
letters and digits; the value runs to the end of the rdata.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u8, quote_string, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CAA {
    pub flags: u8,
    pub tag: Vec<u8>,
    pub value: Vec<u8>,
}

impl CAA {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut caa = Self {
            flags: 0,
            tag: vec![],
            value: vec![],
        };
        caa.decode(rdr, rdlength)?;
        Ok(caa)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 3, "CAA")?;
        Ok(Self {
            flags: parse_u8(tokens[0], "CAA flags")?,
            tag: tokens[1].as_bytes().to_vec(),
            value: tokens[2].as_bytes().to_vec(),
        })
    }

    pub fn critical(&self) -> bool {
        self.flags & 0b1000_0000 == 0b1000_0000
    }
}

impl RDataOperation for CAA {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        self.flags = rdr.read_u8()?;
        self.tag = rdr.read_character_string()?;
        if self.tag.is_empty() {
            return Err(Error::new(DnsError::PacketMalformed(
                "CAA tag must not be empty".to_string(),
            )));
        }
        if end < rdr.position() {
            return Err(Error::new(DnsError::PacketMalformed(
                "CAA tag overruns rdata".to_string(),
            )));
        }
        self.value = rdr.read_bytes(end - rdr.position())?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u8(self.flags);
        wtr.write_character_string(&self.tag)?;
        wtr.write_bytes(&self.value);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {}",
            self.flags,
            String::from_utf8_lossy(&self.tag),
            quote_string(&self.value)
        )
    }
}
