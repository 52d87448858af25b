/*!
Unknown RR types decode as opaque rdata with the original type code kept
on the record, and present in the rfc3597 `\# <len> <hex>` form.
 */

use anyhow::Error;

use super::RDataOperation;
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raw(pub Vec<u8>);

impl Raw {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut raw = Self(vec![]);
        raw.decode(rdr, rdlength)?;
        Ok(raw)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        // \# <length> <hex...>
        if tokens.first() != Some(&"\\#") {
            return Err(Error::new(DnsError::PacketMalformed(
                "unknown-type rdata must use the \\# form".to_string(),
            )));
        }
        let len = tokens
            .get(1)
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| DnsError::PacketMalformed("bad \\# length".to_string()))?;
        let hex = tokens[2..].concat();
        let bts = util::from_hex(&hex)?;
        if bts.len() != len {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "\\# declares {} octets but carries {}",
                len,
                bts.len()
            ))));
        }
        Ok(Self(bts))
    }
}

impl RDataOperation for Raw {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        self.0 = rdr.read_bytes(rdlength as usize)?.to_vec();
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        wtr.write_bytes(&self.0);
        Ok(())
    }

    fn text(&self) -> String {
        if self.0.is_empty() {
            return "\\# 0".to_string();
        }
        format!("\\# {} {}", self.0.len(), util::to_hex(&self.0))
    }
}
