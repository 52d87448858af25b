/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.14

# TXT RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                   TXT-DATA                    /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

TXT-DATA        One or more <character-string>s, each 0..255 octets.
 */

use anyhow::Error;

use super::{quote_string, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TXT(pub Vec<Vec<u8>>);

impl TXT {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut txt = Self(vec![]);
        txt.decode(rdr, rdlength)?;
        Ok(txt)
    }

    /// Every token is one character-string; the tokenizer has already
    /// stripped quoting and escapes.
    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        if tokens.is_empty() {
            return Err(Error::new(DnsError::PacketMalformed(
                "TXT needs at least one character-string".to_string(),
            )));
        }
        let mut strings = vec![];
        for token in tokens {
            if token.len() > 255 {
                return Err(Error::new(DnsError::PacketMalformed(
                    "TXT character-string exceeds 255 octets".to_string(),
                )));
            }
            strings.push(token.as_bytes().to_vec());
        }
        Ok(Self(strings))
    }
}

impl RDataOperation for TXT {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        self.0.clear();
        while rdr.position() < end {
            self.0.push(rdr.read_character_string()?);
        }
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        for s in &self.0 {
            wtr.write_character_string(s)?;
        }
        Ok(())
    }

    fn text(&self) -> String {
        self.0
            .iter()
            .map(|s| quote_string(s))
            .collect::<Vec<String>>()
            .join(" ")
    }
}
