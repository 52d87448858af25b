/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.9

# MX RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                  PREFERENCE                   |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                   EXCHANGE                    /
    /                                               /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

PREFERENCE      A 16 bit integer which specifies the preference given to
                this RR among others at the same owner.  Lower values
                are preferred.

EXCHANGE        A <domain-name> which specifies a host willing to act as
                a mail exchange for the owner name.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u16, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MX {
    pub preference: u16,
    pub exchange: Labels,
}

impl MX {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut mx = Self {
            preference: 0,
            exchange: Labels::root(),
        };
        mx.decode(rdr, rdlength)?;
        Ok(mx)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 2, "MX")?;
        Ok(Self {
            preference: parse_u16(tokens[0], "MX preference")?,
            exchange: Labels::from_str(tokens[1])?,
        })
    }
}

impl RDataOperation for MX {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.preference = rdr.read_u16()?;
        self.exchange = rdr.read_name()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.preference);
        wtr.write_name(&self.exchange, compress)
    }

    fn text(&self) -> String {
        format!("{} {}", self.preference, self.exchange.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mx_wire_roundtrip() {
        let raw = [
            0x00, 0x0A, 0x04, b'm', b'a', b'i', b'l', 0x02, b'i', b'o', 0x00,
        ];
        let mut rdr = PacketReader::new(&raw);
        let mx = MX::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(10, mx.preference);
        assert_eq!("mail.io.", mx.exchange.to_str());

        let mut wtr = PacketWriter::new();
        mx.encode(&mut wtr, false).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }

    #[test]
    fn test_mx_text() {
        let mx = MX::from_text(&["10", "mail.io"]).unwrap();
        assert_eq!("10 mail.io.", mx.text());
        assert_eq!(true, MX::from_text(&["x", "mail.io"]).is_err());
        assert_eq!(true, MX::from_text(&["10"]).is_err());
    }
}
