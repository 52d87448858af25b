/*!
ref: https://www.rfc-editor.org/rfc/rfc4034#section-5.1

# DS RDATA format

```shell
                     1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|           Key Tag             |  Algorithm    |  Digest Type  |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                                                               /
/                            Digest                             /
/                                                               /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
```

CDS (type 59) carries the same rdata under its own type code.
 */

use anyhow::Error;

use super::{DigestAlgorithm, DnsSecAlgorithm};
use crate::dns::rdata::{expect_tokens, parse_u16, parse_u8, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DS {
    pub key_tag: u16,
    pub algorithm: DnsSecAlgorithm,
    pub digest_type: DigestAlgorithm,
    pub digest: Vec<u8>,
}

impl DS {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut ds = Self {
            key_tag: 0,
            algorithm: 0,
            digest_type: 0,
            digest: vec![],
        };
        ds.decode(rdr, rdlength)?;
        Ok(ds)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 4, "DS")?;
        Ok(Self {
            key_tag: parse_u16(tokens[0], "DS key tag")?,
            algorithm: parse_u8(tokens[1], "DS algorithm")?,
            digest_type: parse_u8(tokens[2], "DS digest type")?,
            digest: util::from_hex(&tokens[3..].concat())?,
        })
    }
}

impl RDataOperation for DS {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength < 4 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "DS rdata needs at least 4 octets, got {}",
                rdlength
            ))));
        }
        self.key_tag = rdr.read_u16()?;
        self.algorithm = rdr.read_u8()?;
        self.digest_type = rdr.read_u8()?;
        self.digest = rdr.read_bytes(rdlength as usize - 4)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.key_tag);
        wtr.write_u8(self.algorithm);
        wtr.write_u8(self.digest_type);
        wtr.write_bytes(&self.digest);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            util::to_hex(&self.digest)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_ds_roundtrip() {
        // rfc4034 section 5.4 example DS for dskey.example.com.
        let raw = hex!(
            "ec45 05 01"
            "2bb183af5f22588179a53b0a98631fad1a292118"
        );
        let mut rdr = PacketReader::new(&raw);
        let ds = DS::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(60485, ds.key_tag);
        assert_eq!(5, ds.algorithm);
        assert_eq!(1, ds.digest_type);
        assert_eq!(
            "60485 5 1 2bb183af5f22588179a53b0a98631fad1a292118",
            ds.text()
        );

        let mut wtr = PacketWriter::new();
        ds.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());

        let parsed = DS::from_text(&[
            "60485",
            "5",
            "1",
            "2BB183AF5F22588179A53B0A98631FAD1A292118",
        ])
        .unwrap();
        assert_eq!(ds, parsed);
    }
}
