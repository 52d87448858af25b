/*!
ref: https://www.rfc-editor.org/rfc/rfc5155#section-3.2

# NSEC3 RDATA format

```shell
                    1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|   Hash Alg.   |     Flags     |          Iterations           |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|  Salt Length  |                     Salt                      /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|  Hash Length  |             Next Hashed Owner Name            /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                         Type Bit Maps                         /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
```

Flags bit 7 is Opt-Out.  The salt presents as hex ("-" when empty) and
the next hashed owner name as unpadded base32hex.
 */

use anyhow::Error;

use super::{decode_type_bitmap, encode_type_bitmap, type_bitmap_text};
use crate::dns::rdata::{parse_u16, parse_u8, RDataOperation};
use crate::dns::{type_code, PacketReader, PacketWriter, Type};
use crate::error::DnsError;
use crate::util;

const OPT_OUT_MASK: u8 = 0b0000_0001;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NSec3 {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
    pub next_hashed: Vec<u8>,
    pub types: Vec<Type>,
}

impl NSec3 {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut nsec3 = Self::default();
        nsec3.decode(rdr, rdlength)?;
        Ok(nsec3)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        if tokens.len() < 5 {
            return Err(Error::new(DnsError::PacketMalformed(
                "NSEC3 needs hash-alg flags iterations salt next".to_string(),
            )));
        }
        let salt = match tokens[3] {
            "-" => vec![],
            hex => util::from_hex(hex)?,
        };
        let mut types = Vec::new();
        for token in &tokens[5..] {
            types.push(type_code(token).ok_or_else(|| {
                DnsError::PacketMalformed(format!("unknown type {:?} in NSEC3 bitmap", token))
            })?);
        }
        Ok(Self {
            hash_algorithm: parse_u8(tokens[0], "NSEC3 hash algorithm")?,
            flags: parse_u8(tokens[1], "NSEC3 flags")?,
            iterations: parse_u16(tokens[2], "NSEC3 iterations")?,
            salt,
            next_hashed: util::from_base32hex(tokens[4])?,
            types,
        })
    }

    pub fn opt_out(&self) -> bool {
        self.flags & OPT_OUT_MASK == OPT_OUT_MASK
    }
}

impl RDataOperation for NSec3 {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        if rdlength < 5 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "NSEC3 rdata needs at least 5 octets, got {}",
                rdlength
            ))));
        }
        self.hash_algorithm = rdr.read_u8()?;
        self.flags = rdr.read_u8()?;
        self.iterations = rdr.read_u16()?;
        self.salt = rdr.read_character_string()?;
        self.next_hashed = rdr.read_character_string()?;
        self.types = decode_type_bitmap(rdr, end)?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u8(self.hash_algorithm);
        wtr.write_u8(self.flags);
        wtr.write_u16(self.iterations);
        wtr.write_character_string(&self.salt)?;
        wtr.write_character_string(&self.next_hashed)?;
        wtr.write_bytes(&encode_type_bitmap(&self.types));
        Ok(())
    }

    fn text(&self) -> String {
        let salt = if self.salt.is_empty() {
            "-".to_string()
        } else {
            util::to_hex(&self.salt)
        };
        format!(
            "{} {} {} {} {} {}",
            self.hash_algorithm,
            self.flags,
            self.iterations,
            salt,
            util::to_base32hex(&self.next_hashed),
            type_bitmap_text(&self.types)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{TYPE_A, TYPE_RRSIG, TYPE_SOA};

    #[test]
    fn test_nsec3_roundtrip() {
        let mut nsec3 = NSec3::default();
        nsec3.hash_algorithm = 1;
        nsec3.flags = 1;
        nsec3.iterations = 12;
        nsec3.salt = vec![0xAA, 0xBB, 0xCC, 0xDD];
        nsec3.next_hashed = vec![0x01; 20];
        nsec3.types = vec![TYPE_A, TYPE_SOA, TYPE_RRSIG];

        let mut wtr = PacketWriter::new();
        nsec3.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        let decoded = NSec3::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(nsec3, decoded);
        assert_eq!(true, decoded.opt_out());

        let text = decoded.text();
        let tokens: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(nsec3, NSec3::from_text(&tokens).unwrap());
    }

    #[test]
    fn test_nsec3_empty_salt_text() {
        let mut nsec3 = NSec3::default();
        nsec3.hash_algorithm = 1;
        nsec3.iterations = 0;
        nsec3.next_hashed = vec![0x02; 20];
        assert_eq!(true, nsec3.text().contains(" - "));
    }
}
