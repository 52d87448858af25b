/*!
ref: https://www.rfc-editor.org/rfc/rfc1035#section-3.3.1

# CNAME RDATA format

    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /                     CNAME                     /
    /                                               /
    +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+

where:

CNAME           A <domain-name> which specifies the canonical or primary
                name for the owner.  The owner name is an alias.
 */

use anyhow::Error;

use super::{expect_tokens, RDataOperation};
use crate::dns::{Labels, PacketReader, PacketWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CName(pub Labels);

impl CName {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut cname = Self(Labels::root());
        cname.decode(rdr, rdlength)?;
        Ok(cname)
    }

    pub fn from_text(tokens: &[&str]) -> Result<Self, Error> {
        expect_tokens(tokens, 1, "CNAME")?;
        Ok(Self(Labels::from_str(tokens[0])?))
    }
}

impl RDataOperation for CName {
    fn decode(&mut self, rdr: &mut PacketReader, _rdlength: u16) -> Result<(), Error> {
        self.0 = rdr.read_name()?;
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.0, compress)
    }

    fn text(&self) -> String {
        self.0.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cname_text_roundtrip() {
        let cname = CName::from_text(&["www.example.com."]).unwrap();
        assert_eq!("www.example.com.", cname.text());
    }
}
