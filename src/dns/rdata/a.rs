/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.4.1

# A RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    |                    ADDRESS                    |
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

ADDRESS         A 32 bit Internet address.

Hosts that have multiple Internet addresses will have multiple A
records.  The RDATA section of an A line in a master file is an Internet
address expressed as four decimal numbers separated by dots without any
imbedded spaces (e.g., "10.2.0.52" or "192.0.5.6").
 */

use std::net::Ipv4Addr;

use anyhow::Error;

use super::{expect_tokens, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A(pub Ipv4Addr);

impl A {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut a = Self(Ipv4Addr::UNSPECIFIED);
        a.decode(rdr, rdlength)?;
        Ok(a)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 1, "A")?;
        let addr = tokens[0]
            .parse::<Ipv4Addr>()
            .map_err(|_| DnsError::PacketMalformed(format!("bad A address {:?}", tokens[0])))?;
        Ok(Self(addr))
    }
}

impl RDataOperation for A {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength != 4 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "A rdata must be 4 octets, got {}",
                rdlength
            ))));
        }
        let bts: [u8; 4] = rdr.read_bytes(4)?.try_into()?;
        self.0 = Ipv4Addr::from(bts);
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
    fn test_a_wire_roundtrip() {
        let raw = [10_u8, 2, 0, 52];
        let mut rdr = PacketReader::new(&raw);
        let a = A::from_wire(&mut rdr, 4).unwrap();
        assert_eq!(Ipv4Addr::new(10, 2, 0, 52), a.0);

        let mut wtr = PacketWriter::new();
        a.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }

    #[test]
    fn test_a_text() {
        let a = A::from_text(&["192.0.5.6"]).unwrap();
        assert_eq!("192.0.5.6", a.text());
        assert_eq!(true, A::from_text(&["not-an-address"]).is_err());
        assert_eq!(true, A::from_text(&[]).is_err());
    }

    #[test]
    fn test_a_bad_rdlength() {
        let raw = [10_u8, 2, 0];
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(true, A::from_wire(&mut rdr, 3).is_err());
    }
}
