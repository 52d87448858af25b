use anyhow::Error;
use rand::Rng;

use crate::error::DnsError;

/**
The header contains the following fields:
# Header Structure:
```shell
                                1  1  1  1  1  1
  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                      ID                       |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                    QDCOUNT                    |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                    ANCOUNT                    |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                    NSCOUNT                    |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                    ARCOUNT                    |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
```
AD and CD are the DNSSEC bits of rfc4035 section 3.2.2/3.2.3, carved out
of the old Z field.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header([u8; 12]);

impl Header {
    /// A fresh header with a random ID and everything else zero.
    pub fn new() -> Self {
        let mut hd = Header([0; 12]);
        let id: u16 = rand::thread_rng().gen();
        hd.with_id(id);
        hd
    }

    pub fn from(raw: [u8; 12]) -> Self {
        Header(raw)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, Error> {
        if raw.len() < 12 {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "header needs 12 octets, got {}",
                raw.len()
            ))));
        }
        Ok(Header(raw[..12].try_into()?))
    }

    fn set_flag(&mut self, index: usize, mask: u8, on: bool) -> &mut Self {
        if on {
            self.0[index] |= mask;
        } else {
            self.0[index] &= !mask;
        }
        self
    }

    /**
    A 16 bit identifier assigned by the program that generates any kind
    of query.  This identifier is copied into the corresponding reply and
    can be used by the requester to match up replies to outstanding
    queries.
    */
    pub fn id(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn with_id(&mut self, id: u16) -> &mut Self {
        let ids = id.to_be_bytes();
        (self.0[0], self.0[1]) = (ids[0], ids[1]);
        self
    }

    /**
    A one bit field that specifies whether this message is a query (0),
    or a response (1).
    */
    pub fn qr(&self) -> bool {
        self.0[2] & 0b1000_0000 == 0b1000_0000
    }

    pub fn with_qr(&mut self, qr: bool) -> &mut Self {
        self.set_flag(2, 0b1000_0000, qr)
    }

    /**
    A four bit field that specifies kind of query in this message.  This
    value is set by the originator of a query and copied into the
    response.
    */
    pub fn opcode(&self) -> u8 {
        (self.0[2] & 0b0111_1000) >> 3
    }

    pub fn with_opcode(&mut self, opcode: u8) -> &mut Self {
        if opcode > 0xF {
            return self;
        }
        self.0[2] = (self.0[2] & !0b0111_1000) | (opcode << 3);
        self
    }

    /**
    Authoritative Answer - this bit is valid in responses, and specifies
    that the responding name server is an authority for the domain name
    in question section.
    */
    pub fn aa(&self) -> bool {
        self.0[2] & 0b0000_0100 == 0b0000_0100
    }

    pub fn with_aa(&mut self, aa: bool) -> &mut Self {
        self.set_flag(2, 0b0000_0100, aa)
    }

    /**
    TrunCation - specifies that this message was truncated due to length
    greater than that permitted on the transmission channel.
    */
    pub fn tc(&self) -> bool {
        self.0[2] & 0b0000_0010 == 0b0000_0010
    }

    pub fn with_tc(&mut self, tc: bool) -> &mut Self {
        self.set_flag(2, 0b0000_0010, tc)
    }

    /**
    Recursion Desired - this bit may be set in a query and is copied into
    the response.  If RD is set, it directs the name server to pursue the
    query recursively.
    */
    pub fn rd(&self) -> bool {
        self.0[2] & 0b0000_0001 == 0b0000_0001
    }

    pub fn with_rd(&mut self, rd: bool) -> &mut Self {
        self.set_flag(2, 0b0000_0001, rd)
    }

    /**
    Recursion Available - this bit is set or cleared in a response, and
    denotes whether recursive query support is available in the name
    server.
    */
    pub fn ra(&self) -> bool {
        self.0[3] & 0b1000_0000 == 0b1000_0000
    }

    pub fn with_ra(&mut self, ra: bool) -> &mut Self {
        self.set_flag(3, 0b1000_0000, ra)
    }

    /**
    Reserved for future use.  Must be zero in all queries and responses.
    */
    pub fn z(&self) -> bool {
        self.0[3] & 0b0100_0000 == 0b0100_0000
    }

    pub fn with_z(&mut self, z: bool) -> &mut Self {
        self.set_flag(3, 0b0100_0000, z)
    }

    /**
    Authentic Data - in a response, all the data included in the answer
    and authority sections has been authenticated by the server according
    to its policies.
    */
    pub fn ad(&self) -> bool {
        self.0[3] & 0b0010_0000 == 0b0010_0000
    }

    pub fn with_ad(&mut self, ad: bool) -> &mut Self {
        self.set_flag(3, 0b0010_0000, ad)
    }

    /**
    Checking Disabled - in a query, pending (non-authenticated) data is
    acceptable to the resolver sending the query.
    */
    pub fn cd(&self) -> bool {
        self.0[3] & 0b0001_0000 == 0b0001_0000
    }

    pub fn with_cd(&mut self, cd: bool) -> &mut Self {
        self.set_flag(3, 0b0001_0000, cd)
    }

    /**
    Response code - this 4 bit field is set as part of responses.
    */
    pub fn rcode(&self) -> u8 {
        self.0[3] & 0b0000_1111
    }

    pub fn with_rcode(&mut self, rcode: u8) -> &mut Self {
        if rcode > 0xF {
            return self;
        }
        self.0[3] = (self.0[3] & !0b0000_1111) | rcode;
        self
    }

    /**
    an unsigned 16 bit integer specifying the number of entries in the
    question section.
    */
    pub fn qdcount(&self) -> u16 {
        u16::from_be_bytes([self.0[4], self.0[5]])
    }

    pub fn with_qdcount(&mut self, qdcount: u16) -> &mut Self {
        let bts = qdcount.to_be_bytes();
        (self.0[4], self.0[5]) = (bts[0], bts[1]);
        self
    }

    /**
    an unsigned 16 bit integer specifying the number of resource records
    in the answer section.
    */
    pub fn ancount(&self) -> u16 {
        u16::from_be_bytes([self.0[6], self.0[7]])
    }

    pub fn with_ancount(&mut self, ancount: u16) -> &mut Self {
        let bts = ancount.to_be_bytes();
        (self.0[6], self.0[7]) = (bts[0], bts[1]);
        self
    }

    /**
    an unsigned 16 bit integer specifying the number of name server
    resource records in the authority records section.
    */
    pub fn nscount(&self) -> u16 {
        u16::from_be_bytes([self.0[8], self.0[9]])
    }

    pub fn with_nscount(&mut self, nscount: u16) -> &mut Self {
        let bts = nscount.to_be_bytes();
        (self.0[8], self.0[9]) = (bts[0], bts[1]);
        self
    }

    /**
    an unsigned 16 bit integer specifying the number of resource records
    in the additional records section.
    */
    pub fn arcount(&self) -> u16 {
        u16::from_be_bytes([self.0[10], self.0[11]])
    }

    pub fn with_arcount(&mut self, arcount: u16) -> &mut Self {
        let bts = arcount.to_be_bytes();
        (self.0[10], self.0[11]) = (bts[0], bts[1]);
        self
    }

    pub fn as_bytes(&self) -> [u8; 12] {
        self.0
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_header_id() {
        let head = Header([1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(258, head.id());
    }

    #[test]
    pub fn test_header_with_id() {
        let mut head = Header([0; 12]);
        head.with_id(0x1234);
        assert_eq!(0x1234, head.id());
        assert_eq!([0x12, 0x34], [head.0[0], head.0[1]]);
    }

    #[test]
    pub fn test_header_qr() {
        let head = Header([0, 0, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(true, head.qr());
        let head = Header([0, 0, 0xF, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(false, head.qr());

        let mut head = Header([0; 12]);
        head.with_qr(true);
        assert_eq!(true, head.qr());
        head.with_qr(false);
        assert_eq!(false, head.qr());
    }

    #[test]
    pub fn test_header_opcode() {
        let mut head = Header([0, 0, 0b0111_1000, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(15, head.opcode());
        head = Header([0, 0, 0b0000_1000, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(1, head.opcode());

        let mut head = Header([0; 12]);
        head.with_opcode(5);
        assert_eq!(5, head.opcode());
        // out of range is ignored
        head.with_opcode(99);
        assert_eq!(5, head.opcode());
        // neighbour bits survive
        head.with_qr(true).with_rd(true);
        head.with_opcode(15);
        assert_eq!(15, head.opcode());
        assert_eq!(true, head.qr());
        assert_eq!(true, head.rd());
    }

    #[test]
    pub fn test_header_flag_bits() {
        let mut head = Header([0; 12]);
        head.with_aa(true).with_tc(true).with_rd(true);
        assert_eq!(true, head.aa());
        assert_eq!(true, head.tc());
        assert_eq!(true, head.rd());
        assert_eq!(0b0000_0111, head.0[2]);

        head.with_tc(false);
        assert_eq!(false, head.tc());
        assert_eq!(0b0000_0101, head.0[2]);
    }

    #[test]
    pub fn test_header_dnssec_bits() {
        let mut head = Header([0; 12]);
        head.with_ra(true).with_ad(true).with_cd(true);
        assert_eq!(true, head.ra());
        assert_eq!(false, head.z());
        assert_eq!(true, head.ad());
        assert_eq!(true, head.cd());
        assert_eq!(0b1011_0000, head.0[3]);

        head.with_ad(false);
        assert_eq!(false, head.ad());
        assert_eq!(true, head.cd());
    }

    #[test]
    pub fn test_header_rcode() {
        let mut head = Header([0, 0, 0, 0b0000_0111, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(7, head.rcode());

        head.with_rcode(9);
        assert_eq!(9, head.rcode());
        head.with_rcode(16);
        assert_eq!(9, head.rcode());
    }

    #[test]
    pub fn test_header_counts() {
        let mut head = Header([0; 12]);
        head.with_qdcount(1)
            .with_ancount(516)
            .with_nscount(2)
            .with_arcount(3);
        assert_eq!(1, head.qdcount());
        assert_eq!(516, head.ancount());
        assert_eq!(2, head.0[6]);
        assert_eq!(4, head.0[7]);
        assert_eq!(2, head.nscount());
        assert_eq!(3, head.arcount());
    }

    #[test]
    pub fn test_header_decode_short() {
        assert_eq!(true, Header::decode(&[0_u8; 11]).is_err());
        assert_eq!(false, Header::decode(&[0_u8; 12]).is_err());
    }
}
