/*!
ref: https://www.rfc-editor.org/rfc/rfc5155#section-4.2

NSEC3PARAM carries the NSEC3 hashing parameters an authoritative server
uses: { hash algorithm, flags, iterations, salt }.  Flags must be zero
on the wire here.
 */

use anyhow::Error;

use crate::dns::rdata::{parse_u16, parse_u8, RDataOperation};
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NSec3Param {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
}

impl NSec3Param {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut param = Self::default();
        param.decode(rdr, rdlength)?;
        Ok(param)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        if tokens.len() < 4 {
            return Err(Error::new(DnsError::PacketMalformed(
                "NSEC3PARAM needs hash-alg flags iterations salt".to_string(),
            )));
        }
        let salt = match tokens[3] {
            "-" => vec![],
            hex => util::from_hex(hex)?,
        };
        Ok(Self {
            hash_algorithm: parse_u8(tokens[0], "NSEC3PARAM hash algorithm")?,
            flags: parse_u8(tokens[1], "NSEC3PARAM flags")?,
            iterations: parse_u16(tokens[2], "NSEC3PARAM iterations")?,
            salt,
        })
    }
}

impl RDataOperation for NSec3Param {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        if rdlength < 5 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "NSEC3PARAM rdata needs at least 5 octets, got {}",
                rdlength
            ))));
        }
        self.hash_algorithm = rdr.read_u8()?;
        self.flags = rdr.read_u8()?;
        self.iterations = rdr.read_u16()?;
        self.salt = rdr.read_character_string()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_u8(self.hash_algorithm);
        wtr.write_u8(self.flags);
        wtr.write_u16(self.iterations);
        wtr.write_character_string(&self.salt)
    }

    fn text(&self) -> String {
        let salt = if self.salt.is_empty() {
            "-".to_string()
        } else {
            util::to_hex(&self.salt)
        };
        format!(
            "{} {} {} {}",
            self.hash_algorithm, self.flags, self.iterations, salt
        )
    }
}
