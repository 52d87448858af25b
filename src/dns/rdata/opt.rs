/*!
ref: https://www.rfc-editor.org/rfc/rfc6891#section-6.1.2

The OPT RR rdata is zero or more of:

```shell
                +0 (MSB)                            +1 (LSB)
     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
  0: |                          OPTION-CODE                          |
     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
  2: |                         OPTION-LENGTH                         |
     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
  4: |                                                               |
     /                          OPTION-DATA                          /
     /                                                               /
     +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
```

The fixed part of the pseudo RR repurposes the class field as the
requestor's UDP payload size and the TTL as extended-RCODE, version and
the DO bit; those accessors live on [crate::dns::DNS].
 */

use anyhow::Error;

use super::RDataOperation;
use crate::dns::{PacketReader, PacketWriter};
use crate::error::DnsError;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

/// OPT has no presentation form; `text` renders a comment-ish summary
/// and `from_text` is not provided.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OPT(pub Vec<EdnsOption>);

impl OPT {
    pub fn from_wire(rdr: &mut PacketReader, rdlength: u16) -> Result<Self, Error> {
        let mut opt = Self(vec![]);
        opt.decode(rdr, rdlength)?;
        Ok(opt)
    }
}

impl RDataOperation for OPT {
    fn decode(&mut self, rdr: &mut PacketReader, rdlength: u16) -> Result<(), Error> {
        let end = rdr.position() + rdlength as usize;
        self.0.clear();
        while rdr.position() < end {
            let code = rdr.read_u16()?;
            let length = rdr.read_u16()? as usize;
            if rdr.position() + length > end {
                return Err(Error::new(DnsError::PacketMalformed(
                    "EDNS option overruns rdata".to_string(),
                )));
            }
            let data = rdr.read_bytes(length)?.to_vec();
            self.0.push(EdnsOption { code, data });
        }
        Ok(())
    }

    fn encode(&self, wtr: &mut PacketWriter, _compress: bool) -> Result<(), Error> {
        for option in &self.0 {
            wtr.write_u16(option.code);
            wtr.write_u16(option.data.len() as u16);
            wtr.write_bytes(&option.data);
        }
        Ok(())
    }

    fn text(&self) -> String {
        self.0
            .iter()
            .map(|o| format!("{}:{}", o.code, util::to_hex(&o.data)))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_empty() {
        let raw: [u8; 0] = [];
        let mut rdr = PacketReader::new(&raw);
        let opt = OPT::from_wire(&mut rdr, 0).unwrap();
        assert_eq!(0, opt.0.len());
    }

    #[test]
    fn test_opt_roundtrip() {
        // an NSID option and an unknown one
        let raw = [
            0x00, 0x03, 0x00, 0x02, 0xAB, 0xCD, 0x00, 0x0A, 0x00, 0x01, 0xFF,
        ];
        let mut rdr = PacketReader::new(&raw);
        let opt = OPT::from_wire(&mut rdr, raw.len() as u16).unwrap();
        assert_eq!(2, opt.0.len());
        assert_eq!(3, opt.0[0].code);
        assert_eq!(vec![0xAB, 0xCD], opt.0[0].data);

        let mut wtr = PacketWriter::new();
        opt.encode(&mut wtr, true).unwrap();
        assert_eq!(raw.to_vec(), wtr.into_bytes());
    }

    #[test]
    fn test_opt_overrun() {
        let raw = [0x00, 0x03, 0x00, 0x05, 0xAB];
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(true, OPT::from_wire(&mut rdr, raw.len() as u16).is_err());
    }
}
