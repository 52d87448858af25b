use anyhow::Error;
use bytes::{BufMut, BytesMut};

use super::compress_list::CompressList;
use super::labels::{Labels, MAX_LABEL_LEN};
use crate::error::DnsError;

/// Bounds-checked cursor over a received message. The whole message stays
/// reachable so compression pointers can jump backwards.
#[derive(Debug)]
pub struct PacketReader<'a> {
    raw: &'a [u8],
    offset: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(raw: &'a [u8]) -> Self {
        Self { raw, offset: 0 }
    }

    pub fn at(raw: &'a [u8], offset: usize) -> Self {
        Self { raw, offset }
    }

    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.raw.len() - self.offset
    }

    fn need(&self, n: usize) -> Result<(), Error> {
        if self.offset + n > self.raw.len() {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "read of {} octets at {} overruns {}-octet packet",
                n,
                self.offset,
                self.raw.len()
            ))));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.need(1)?;
        let v = self.raw[self.offset];
        self.offset += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.need(2)?;
        let v = u16::from_be_bytes(self.raw[self.offset..self.offset + 2].try_into()?);
        self.offset += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.need(4)?;
        let v = u32::from_be_bytes(self.raw[self.offset..self.offset + 4].try_into()?);
        self.offset += 4;
        Ok(v)
    }

    /// 48-bit integer, the TSIG time-signed width.
    pub fn read_u48(&mut self) -> Result<u64, Error> {
        self.need(6)?;
        let mut v = 0_u64;
        for _ in 0..6 {
            v = (v << 8) | self.raw[self.offset] as u64;
            self.offset += 1;
        }
        Ok(v)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.need(n)?;
        let v = &self.raw[self.offset..self.offset + n];
        self.offset += n;
        Ok(v)
    }

    /// <character-string>: a single length octet followed by that many
    /// octets.
    pub fn read_character_string(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_u8()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_name(&mut self) -> Result<Labels, Error> {
        Labels::from_wire(self.raw, &mut self.offset)
    }
}

/// Growable output buffer with the compression table alongside the write
/// cursor.  `canonical` switches name writes to the rfc4034 section 6
/// form: lowercased and never compressed, for signing.
#[derive(Debug)]
pub struct PacketWriter {
    buf: BytesMut,
    cl: CompressList,
    canonical: bool,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(512),
            cl: CompressList::new(),
            canonical: false,
        }
    }

    pub fn canonical() -> Self {
        let mut wtr = Self::new();
        wtr.canonical = true;
        wtr
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn write_u48(&mut self, v: u64) {
        self.buf.put_uint(v, 6);
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    pub fn write_character_string(&mut self, v: &[u8]) -> Result<(), Error> {
        if v.len() > 255 {
            return Err(Error::new(DnsError::PacketMalformed(
                "character-string exceeds 255 octets".to_string(),
            )));
        }
        self.buf.put_u8(v.len() as u8);
        self.buf.put_slice(v);
        Ok(())
    }

    /// Overwrite two octets written earlier; rdlength back-patching.
    pub fn patch_u16(&mut self, pos: usize, v: u16) {
        self.buf[pos..pos + 2].copy_from_slice(&v.to_be_bytes());
    }

    /// Emit a name. With `compress` each label boundary is looked up in
    /// the table; the first suffix already on the wire is replaced by a
    /// 2-octet pointer.  Without it the labels are written out in full,
    /// but still recorded so later names can point at them.
    ///
    /// In canonical mode the name is lowercased and `compress` is
    /// ignored.
    pub fn write_name(&mut self, name: &Labels, compress: bool) -> Result<(), Error> {
        if self.canonical {
            return self.write_labels_out(&name.to_lowercase(), false);
        }
        self.write_labels_out(name, compress)
    }

    fn write_labels_out(&mut self, name: &Labels, compress: bool) -> Result<(), Error> {
        let labels = name.as_slice();
        for i in 0..labels.len() {
            let suffix = labels[i..].join(".").to_ascii_lowercase();
            if compress {
                if let Some(offset) = self.cl.get(&suffix) {
                    self.write_u16(0b1100_0000_0000_0000 | offset as u16);
                    return Ok(());
                }
            }
            // offsets beyond 14 bits can never be pointer targets
            if self.buf.len() <= 0x3FFF {
                self.cl.push(&suffix, self.buf.len());
            }
            let label = labels[i].as_bytes();
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::new(DnsError::PacketMalformed(format!(
                    "label {:?} exceeds 63 octets",
                    labels[i]
                ))));
            }
            self.write_u8(label.len() as u8);
            self.write_bytes(label);
        }
        self.write_u8(0);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_bounds() {
        let raw = [0x12_u8, 0x34, 0x56];
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(0x1234, rdr.read_u16().unwrap());
        assert_eq!(true, rdr.read_u16().is_err());
        assert_eq!(0x56, rdr.read_u8().unwrap());
        assert_eq!(true, rdr.read_u8().is_err());
        assert_eq!(0, rdr.remaining());
    }

    #[test]
    fn test_reader_u48() {
        let raw = [0x00_u8, 0x00, 0x65, 0x43, 0x21, 0x10];
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(0x6543_2110, rdr.read_u48().unwrap());
    }

    #[test]
    fn test_reader_character_string() {
        let raw = [0x03_u8, b'f', b'o', b'o', 0x00];
        let mut rdr = PacketReader::new(&raw);
        assert_eq!(b"foo".to_vec(), rdr.read_character_string().unwrap());
        assert_eq!(Vec::<u8>::new(), rdr.read_character_string().unwrap());
        assert_eq!(true, rdr.read_character_string().is_err());
    }

    #[test]
    fn test_writer_name_compression() {
        let mut wtr = PacketWriter::new();
        wtr.write_name(&Labels::from_str("www.example.com").unwrap(), true)
            .unwrap();
        wtr.write_name(&Labels::from_str("ftp.example.com").unwrap(), true)
            .unwrap();
        assert_eq!(
            vec![
                0x03, 0x77, 0x77, 0x77, 0x07, 0x65, 0x78, 0x61, 0x6D, 0x70, 0x6C, 0x65, 0x03,
                0x63, 0x6F, 0x6D, 0x00, 0x03, 0x66, 0x74, 0x70, 0xC0, 0x04,
            ],
            wtr.into_bytes()
        );
    }

    #[test]
    fn test_writer_name_no_compression() {
        let mut wtr = PacketWriter::new();
        let name = Labels::from_str("a.b").unwrap();
        wtr.write_name(&name, false).unwrap();
        wtr.write_name(&name, false).unwrap();
        assert_eq!(
            vec![0x01, b'a', 0x01, b'b', 0x00, 0x01, b'a', 0x01, b'b', 0x00],
            wtr.into_bytes()
        );
    }

    #[test]
    fn test_writer_canonical_lowercases() {
        let mut wtr = PacketWriter::canonical();
        wtr.write_name(&Labels::from_str("WWW.Example.COM").unwrap(), true)
            .unwrap();
        assert_eq!(
            vec![
                0x03, b'w', b'w', b'w', 0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x03,
                b'c', b'o', b'm', 0x00,
            ],
            wtr.into_bytes()
        );
    }

    #[test]
    fn test_writer_patch_u16() {
        let mut wtr = PacketWriter::new();
        wtr.write_u16(0);
        wtr.write_u8(0xAB);
        wtr.patch_u16(0, 0x1234);
        assert_eq!(vec![0x12, 0x34, 0xAB], wtr.into_bytes());
    }

    #[test]
    fn test_wire_roundtrip_through_reader() {
        let mut wtr = PacketWriter::new();
        wtr.write_name(&Labels::from_str("mail.example.org").unwrap(), true)
            .unwrap();
        wtr.write_name(&Labels::from_str("example.org").unwrap(), true)
            .unwrap();
        let raw = wtr.into_bytes();

        let mut rdr = PacketReader::new(&raw);
        assert_eq!("mail.example.org.", rdr.read_name().unwrap().to_str());
        assert_eq!("example.org.", rdr.read_name().unwrap().to_str());
        assert_eq!(0, rdr.remaining());
    }
}
