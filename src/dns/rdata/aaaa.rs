/*!
ref: https://www.rfc-editor.org/rfc/rfc3596#section-2.2

A 128 bit IPv6 address is encoded in the data portion of an AAAA
resource record in network byte order (high-order byte first).
 */

use std::net::Ipv6Addr;

use anyhow::Error;

use super::{expect_tokens, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AAAA(pub Ipv6Addr);

impl AAAA {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut aaaa = Self(Ipv6Addr::UNSPECIFIED);
        aaaa.decode(rdr, rdlength)?;
        Ok(aaaa)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 1, "AAAA")?;
        let addr = tokens[0]
            .parse::<Ipv6Addr>()
            .map_err(|_| DnsError::PacketMalformed(format!("bad AAAA address {:?}", tokens[0])))?;
        Ok(Self(addr))
    }
}

impl RDataOperation for AAAA {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength != 16 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "AAAA rdata must be 16 octets, got {}",
                rdlength
            ))));
        }
        let bts: [u8; 16] = rdr.read_bytes(16)?.try_into()?;
        self.0 = Ipv6Addr::from(bts);
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_bytes(&self.0.octets());
        Ok(())
    }

    fn text(&self) -> String {
        self.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aaaa_wire_roundtrip() {
        let raw = [
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ];
        let mut rdr = PacketReader::new(&raw);
        let aaaa = AAAA::from_wire(&mut rdr, 16).unwrap();
        assert_eq!("2001:db8::1", aaaa.text());

        let mut wtr = PacketWriter::new();
        aaaa.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }

    #[test]
    fn test_aaaa_text() {
        let aaaa = AAAA::from_text(&["2001:db8::1"]).unwrap();
        assert_eq!("2001:db8::1", aaaa.text());
        assert_eq!(true, AAAA::from_text(&["10.0.0.1:"]).is_err());
    }
}
