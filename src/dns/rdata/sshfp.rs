/*!
ref: https://www.rfc-editor.org/rfc/rfc4255#section-3.1

SSHFP carries { algorithm, fingerprint type, fingerprint }.  Algorithm
1 is RSA, 2 DSS, 3 ECDSA, 4 Ed25519; fingerprint type 1 is SHA-1 and
2 SHA-256.  The fingerprint is presented in hex.
 */

use anyhow::Error;

use super::{expect_tokens, parse_u8, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SSHFP {
    pub algorithm: u8,
    pub fp_type: u8,
    pub fingerprint: Vec<u8>,
}

impl SSHFP {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut sshfp = Self {
            algorithm: 0,
            fp_type: 0,
            fingerprint: vec![],
        };
        sshfp.decode(rdr, rdlength)?;
        Ok(sshfp)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 3, "SSHFP")?;
        Ok(Self {
            algorithm: parse_u8(tokens[0], "SSHFP algorithm")?,
            fp_type: parse_u8(tokens[1], "SSHFP fingerprint type")?,
            fingerprint: util::from_hex(tokens[2])?,
        })
    }
}

impl RDataOperation for SSHFP {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength < 2 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "SSHFP rdata needs at least 2 octets, got {}",
                rdlength
            ))));
        }
        self.algorithm = rdr.read_u8()?;
        self.fp_type = rdr.read_u8()?;
        self.fingerprint = rdr.read_bytes(rdlength as usize - 2)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u8(self.algorithm);
        wtr.write_u8(self.fp_type);
        wtr.write_bytes(&self.fingerprint);
        Ok(())
    }

    fn text(&self) -> String {
        format!(
            "{} {} {}",
            self.algorithm,
            self.fp_type,
            util::to_hex(&self.fingerprint)
        )
    }
}
