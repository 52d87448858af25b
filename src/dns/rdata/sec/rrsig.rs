/*!
ref: https://www.rfc-editor.org/rfc/rfc4034#section-3.1

# RRSIG RDATA format

```shell
                    1 1 1 1 1 1 1 1 1 1 2 2 2 2 2 2 2 2 2 2 3 3
0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|        Type Covered           |  Algorithm    |     Labels    |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|                         Original TTL                          |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|                      Signature Expiration                     |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|                      Signature Inception                      |
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
|            Key Tag            |                               /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+         Signer's Name         /
/                                                               /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/                                                               /
/                            Signature                          /
/                                                               /
+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
```

A sender MUST NOT use DNS name compression on the Signer's Name field
when transmitting a RRSIG RR.  The expiration and inception fields are
32-bit epoch seconds compared with rfc1982 serial arithmetic; the
presentation here keeps the plain decimal form.

The SIG RR of rfc2931 (type 24, SIG(0) transaction signatures) carries
this same rdata under its own type code.
 */

use anyhow::Error;

use super::DnsSecAlgorithm;
use crate::dns::rdata::{expect_tokens, parse_u16, parse_u32, parse_u8, RDataOperation};
use crate::dns::{type_code, type_name, Labels, PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;
use base64::Engine as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRSig {
    /// The type of the RRset that is covered by this RRSIG record.
    /// Zero for SIG(0), which covers a whole transaction instead.
    pub type_covered: u16,

    pub algorithm: DnsSecAlgorithm,

    /// The number of labels in the original RRSIG RR owner name, the
    /// root and any wildcard label excluded.  A validator uses it to
    /// recognize answers synthesized from a wildcard.
    pub labels: u8,

    /// The TTL of the covered RRset as it appears in the authoritative
    /// zone; caching resolvers decrement the RR TTL, so the signature
    /// carries the original.
    pub origin_ttl: u32,

    pub sig_expiration: u32,

    pub sig_inception: u32,

    /// The key tag of the DNSKEY RR that validates this signature.
    pub key_tag: u16,

    /// The owner name of that DNSKEY RR; never compressed on the wire.
    pub signer_name: Labels,

    pub signature: Vec<u8>,
}

impl RRSig {
    pub fn new() -> Self {
        Self {
            type_covered: 0,
            algorithm: 0,
            labels: 0,
            origin_ttl: 0,
            sig_expiration: 0,
            sig_inception: 0,
            key_tag: 0,
            signer_name: Labels::root(),
            signature: Vec::new(),
        }
    }

    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut rrsig = Self::new();
        rrsig.decode(rdr, rdlength)?;
        Ok(rrsig)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 9, "RRSIG")?;
        let type_covered = type_code(tokens[0]).ok_or_else(|| {
            DnsError::PacketMalformed(format!("unknown RRSIG type covered {:?}", tokens[0]))
        })?;
        Ok(Self {
            type_covered,
            algorithm: parse_u8(tokens[1], "RRSIG algorithm")?,
            labels: parse_u8(tokens[2], "RRSIG labels")?,
            origin_ttl: parse_u32(tokens[3], "RRSIG original ttl")?,
            sig_expiration: parse_u32(tokens[4], "RRSIG expiration")?,
            sig_inception: parse_u32(tokens[5], "RRSIG inception")?,
            key_tag: parse_u16(tokens[6], "RRSIG key tag")?,
            signer_name: Labels::from_str(tokens[7])?,
            signature: util::BASE64_ENGINE
                .decode(tokens[8..].concat())
                .map_err(|e| DnsError::PacketMalformed(format!("bad RRSIG base64: {}", e)))?,
        })
    }

    /// The rdata with the Signature field excluded and the signer name
    /// canonical, the leading part of the rfc4034 3.1.8.1 signed data.
    pub fn rdata_sans_signature(&self) -> Result<Vec<u8>, Error> {
        let mut wtr = PacketWriter::canonical();
        wtr.write_u16(self.type_covered);
        wtr.write_u8(self.algorithm);
        wtr.write_u8(self.labels);
        wtr.write_u32(self.origin_ttl);
        wtr.write_u32(self.sig_expiration);
        wtr.write_u32(self.sig_inception);
        wtr.write_u16(self.key_tag);
        wtr.write_name(&self.signer_name, false)?;
        Ok(wtr.into_bytes())
    }
}

impl Default for RRSig {
    fn default() -> Self {
        Self::new()
    }
}

impl RDataOperation for RRSig {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        if rdlength < 18 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "RRSIG rdata needs at least 18 octets, got {}",
                rdlength
            ))));
        }
        self.type_covered = rdr.read_u16()?;
        self.algorithm = rdr.read_u8()?;
        self.labels = rdr.read_u8()?;
        self.origin_ttl = rdr.read_u32()?;
        self.sig_expiration = rdr.read_u32()?;
        self.sig_inception = rdr.read_u32()?;
        self.key_tag = rdr.read_u16()?;
        self.signer_name = rdr.read_name()?;
        if end < rdr.position() {
            return Err(Error::new(DnsError::PacketMalformed(
                "RRSIG signer name overruns rdata".to_string(),
            )));
        }
        self.signature = rdr.read_bytes(end - rdr.position())?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u16(self.type_covered);
        wtr.write_u8(self.algorithm);
        wtr.write_u8(self.labels);
        wtr.write_u32(self.origin_ttl);
        wtr.write_u32(self.sig_expiration);
        wtr.write_u32(self.sig_inception);
        wtr.write_u16(self.key_tag);
        wtr.write_name(&self.signer_name, false)?;
        wtr.write_bytes(&self.signature);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {} {}",
            type_name(self.type_covered),
            self.algorithm,
            self.labels,
            self.origin_ttl,
            self.sig_expiration,
            self.sig_inception,
            self.key_tag,
            self.signer_name.to_str(),
            util::BASE64_ENGINE.encode(&self.signature)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::TYPE_A;

    fn sample() -> RRSig {
        let mut rrsig = RRSig::new();
        rrsig.type_covered = TYPE_A;
        rrsig.algorithm = 8;
        rrsig.labels = 3;
        rrsig.origin_ttl = 86400;
        rrsig.sig_expiration = 1048354263;
        rrsig.sig_inception = 1048354263 - 2592000;
        rrsig.key_tag = 2642;
        rrsig.signer_name = Labels::from_str("example.com.").unwrap();
        rrsig.signature = vec![0x01, 0x02, 0x03, 0x04];
        rrsig
    }

    #[test]
    fn test_rrsig_wire_roundtrip() {
        let rrsig = sample();
        let mut wtr = PacketWriter::new();
        rrsig.encode(&mut wtr, true).unwrap();
        let raw = wtr.into_bytes();
        // fixed fields + uncompressed signer + signature
        assert_eq!(18 + 13 + 4, raw.len());

        let mut rdr = PacketReader::new(&raw);
        let decoded = RRSig::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(rrsig, decoded);
    }

    #[test]
    fn test_rrsig_text_roundtrip() {
        let rrsig = sample();
        let text = rrsig.text();
        assert_eq!(true, text.starts_with("A 8 3 86400"));
        let tokens: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rrsig, RRSig::from_text(&tokens).unwrap());
    }

    #[test]
    fn test_rrsig_rdata_sans_signature() {
        let mut rrsig = sample();
        rrsig.signer_name = Labels::from_str("Example.COM.").unwrap();
        let tbs = rrsig.rdata_sans_signature().unwrap();
        // signature excluded, signer lowercased
        assert_eq!(18 + 13, tbs.len());
        assert_eq!(b'e', tbs[19]);
    }
}
