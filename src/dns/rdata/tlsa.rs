/*!
ref: https://www.rfc-editor.org/rfc/rfc6698#section-2.1

# TLSA RDATA format

                         1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
    |  Cert. Usage  |   Selector    | Matching Type |               /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+               /
    /                                                               /
    /                 Certificate Association Data                  /
    /                                                               /
    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 */

use anyhow::Error;

use super::{expect_tokens, parse_u8, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TLSA {
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    pub cert_data: Vec<u8>,
}

impl TLSA {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut tlsa = Self {
            usage: 0,
            selector: 0,
            matching_type: 0,
            cert_data: vec![],
        };
        tlsa.decode(rdr, rdlength)?;
        Ok(tlsa)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 4, "TLSA")?;
        Ok(Self {
            usage: parse_u8(tokens[0], "TLSA usage")?,
            selector: parse_u8(tokens[1], "TLSA selector")?,
            matching_type: parse_u8(tokens[2], "TLSA matching type")?,
            cert_data: util::from_hex(tokens[3])?,
        })
    }
}

impl RDataOperation for TLSA {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength < 3 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "TLSA rdata needs at least 3 octets, got {}",
                rdlength
            ))));
        }
        self.usage = rdr.read_u8()?;
        self.selector = rdr.read_u8()?;
        self.matching_type = rdr.read_u8()?;
        self.cert_data = rdr.read_bytes(rdlength as usize - 3)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u8(self.usage);
        wtr.write_u8(self.selector);
        wtr.write_u8(self.matching_type);
        wtr.write_bytes(&self.cert_data);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.usage,
            self.selector,
            self.matching_type,
            util::to_hex(&self.cert_data)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlsa_roundtrip() {
        let tlsa = TLSA::from_text(&["3", "1", "1", "abcdef012345"]).unwrap();
        let mut wtr = PacketWriter::new();
        tlsa.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = TLSA::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(tlsa, decoded);
        assert_eq!("3 1 1 abcdef012345", decoded.text());
    }
}
