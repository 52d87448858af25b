/*!
ref: https://www.rfc-editor.org/rfc/rfc4034#section-2.1

# DNSKEY RDATA format

```shell
                     1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|              Flags            |    Protocol   |   Algorithm   |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                                                               /
/                            Public Key                         /
/                                                               /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
```

Bit 7 of the Flags field is the Zone Key flag; bit 15 is the Secure
Entry Point flag of rfc3757.  The Protocol field MUST have value 3.
The Public Key field holds the raw key material; its shape depends on
the algorithm (rfc3110 for the RSA variants).  CDNSKEY (type 60)
carries the same rdata under its own type code.
 */

use anyhow::Error;

use super::DnsSecAlgorithm;
use crate::dns::rdata::{expect_tokens, parse_u16, parse_u8, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;
use base64::Engine as _;

const ZONE_KEY_MASK: u16 = 0b0000_0001_0000_0000;
const SEP_MASK: u16 = 0b0000_0000_0000_0001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSKEY {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: DnsSecAlgorithm,
    pub pub_key: Vec<u8>,
}

impl DNSKEY {
    pub fn new() -> Self {
        Self {
            flags: 0,
            protocol: 3,
            algorithm: 0,
            pub_key: Vec::new(),
        }
    }

    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut dnskey = Self::new();
        dnskey.decode(rdr, rdlength)?;
        Ok(dnskey)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 4, "DNSKEY")?;
        Ok(Self {
            flags: parse_u16(tokens[0], "DNSKEY flags")?,
            protocol: parse_u8(tokens[1], "DNSKEY protocol")?,
            algorithm: parse_u8(tokens[2], "DNSKEY algorithm")?,
            pub_key: util::BASE64_ENGINE
                .decode(tokens[3..].concat())
                .map_err(|e| DnsError::PacketMalformed(format!("bad DNSKEY base64: {}", e)))?,
        })
    }

    pub fn flag_zone_key(&self) -> bool {
        self.flags & ZONE_KEY_MASK == ZONE_KEY_MASK
    }

    pub fn with_flag_zone_key(&mut self, zone_key: bool) -> &mut Self {
        if zone_key {
            self.flags |= ZONE_KEY_MASK;
        } else {
            self.flags &= !ZONE_KEY_MASK;
        }
        self
    }

    pub fn flag_sec_entry_point(&self) -> bool {
        self.flags & SEP_MASK == SEP_MASK
    }

    pub fn with_flag_sec_entry_point(&mut self, sep: bool) -> &mut Self {
        if sep {
            self.flags |= SEP_MASK;
        } else {
            self.flags &= !SEP_MASK;
        }
        self
    }

    /// The wire rdata image, as the key tag and DS digest computations
    /// want it.
    pub fn rdata_bytes(&self) -> Vec<u8> {
        let mut bts = Vec::with_capacity(4 + self.pub_key.len());
        bts.extend(self.flags.to_be_bytes());
        bts.push(self.protocol);
        bts.push(self.algorithm);
        bts.extend(&self.pub_key);
        bts
    }
}

impl Default for DNSKEY {
    fn default() -> Self {
        Self::new()
    }
}

impl RDataOperation for DNSKEY {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength < 4 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "DNSKEY rdata needs at least 4 octets, got {}",
                rdlength
            ))));
        }
        self.flags = rdr.read_u16()?;
        self.protocol = rdr.read_u8()?;
        self.algorithm = rdr.read_u8()?;
        self.pub_key = rdr.read_bytes(rdlength as usize - 4)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.flags);
        wtr.write_u8(self.protocol);
        wtr.write_u8(self.algorithm);
        wtr.write_bytes(&self.pub_key);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.flags,
            self.protocol,
            self.algorithm,
            util::BASE64_ENGINE.encode(&self.pub_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dnskey_flags() {
        let mut dnskey = DNSKEY::new();
        dnskey.with_flag_zone_key(true);
        assert_eq!(256, dnskey.flags);
        dnskey.with_flag_sec_entry_point(true);
        assert_eq!(257, dnskey.flags);
        assert_eq!(true, dnskey.flag_zone_key());
        assert_eq!(true, dnskey.flag_sec_entry_point());

        dnskey.with_flag_zone_key(false);
        assert_eq!(1, dnskey.flags);
    }

    #[test]
    fn test_dnskey_wire_roundtrip() {
        let raw = [0x01_u8, 0x00, 0x03, 0x08, 0xDE, 0xAD, 0xBE, 0xEF];
        let mut rdr = PacketReader::new(&raw);
        let dnskey = DNSKEY::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(256, dnskey.flags);
        assert_eq!(3, dnskey.protocol);
        assert_eq!(8, dnskey.algorithm);
        assert_eq!(vec![0xDE, 0xAD, 0xBE, 0xEF], dnskey.pub_key);
        assert_eq!(raw.to_vec(), dnskey.rdata_bytes());

        let mut wtr = PacketWriter::new();
        dnskey.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }

    #[test]
    fn test_dnskey_text_roundtrip() {
        let dnskey = DNSKEY::from_text(&["257", "3", "8", "3q2+7w=="]).unwrap();
        assert_eq!(vec![0xDE, 0xAD, 0xBE, 0xEF], dnskey.pub_key);
        assert_eq!("257 3 8 3q2+7w==", dnskey.text());
    }
}
