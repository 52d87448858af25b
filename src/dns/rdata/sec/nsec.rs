/*!
ref: https://www.rfc-editor.org/rfc/rfc4034#section-4.1

# NSEC RDATA format

```shell
                    1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                      Next Domain Name                         /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                       Type Bit Maps                           /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
```

The next domain name is not compressed.
 */

use anyhow::Error;

use super::{decode_type_bitmap, encode_type_bitmap, type_bitmap_text};
use crate::dns::rdata::RDataOperation;
use crate::dns::{type_code, Labels, PacketReader, PacketWriter, Type};
use crate::error::DnsError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NSec {
    pub next_domain: Labels,
    pub types: Vec<Type>,
}

impl NSec {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut nsec = Self::default();
        nsec.decode(rdr, rdlength)?;
        Ok(nsec)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        if tokens.is_empty() {
            return Err(Error::new(DnsError::PacketMalformed(
                "NSEC needs a next domain name".to_string(),
            )));
        }
        let mut types = Vec::new();
        for token in &tokens[1..] {
            types.push(type_code(token).ok_or_else(|| {
                DnsError::PacketMalformed(format!("unknown type {:?} in NSEC bitmap", token))
            })?);
        }
        Ok(Self {
            next_domain: Labels::from_str(tokens[0])?,
            types,
        })
    }
}

impl RDataOperation for NSec {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        self.next_domain = rdr.read_name()?;
        self.types = decode_type_bitmap(rdr, end)?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.next_domain, false)?;
        wtr.write_bytes(&encode_type_bitmap(&self.types));
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {}",
            self.next_domain.to_str(),
            type_bitmap_text(&self.types)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{TYPE_A, TYPE_MX, TYPE_NSEC, TYPE_RRSIG};

    #[test]
    fn test_nsec_roundtrip() {
        // the rfc4034 section 4.3 example: alfa.example.com. NSEC
        // host.example.com. A MX RRSIG NSEC
        let nsec = NSec::from_text(&["host.example.com.", "A", "MX", "RRSIG", "NSEC"]).unwrap();
        let mut wtr = PacketWriter::new();
        nsec.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = NSec::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!("host.example.com.", decoded.next_domain.to_str());
        assert_eq!(vec![TYPE_A, TYPE_MX, TYPE_RRSIG, TYPE_NSEC], decoded.types);
        assert_eq!("host.example.com. A MX RRSIG NSEC", decoded.text());
    }
}
