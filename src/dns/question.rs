use anyhow::Error;

use super::{Class, Labels, PacketReader, PacketWriter, Type};

/**
The question section is used to carry the "question" in most queries,
i.e., the parameters that define what is being asked.  The section
contains QDCOUNT (usually 1) entries, each of the following format:
# Question Structure:
```shell
                                1  1  1  1  1  1
  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                                               |
/                     QNAME                     /
/                                               /
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                     QTYPE                     |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
|                     QCLASS                    |
+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
```
*/
#[derive(Debug, Clone)]
pub struct Question {
    qname: Labels,
    qtype: Type,
    qclass: Class,
}

impl Question {
    pub fn new(qname: Labels, qtype: Type, qclass: Class) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    pub fn decode(rdr: &mut PacketReader) -> Result<Self, Error> {
        let qname = rdr.read_name()?;
        let qtype = rdr.read_u16()?;
        let qclass = rdr.read_u16()?;
        Ok(Self {
            qname,
            qtype,
            qclass,
        })
    }

    pub fn encode(&self, wtr: &mut PacketWriter, compress: bool) -> Result<(), Error> {
        wtr.write_name(&self.qname, compress)?;
        wtr.write_u16(self.qtype);
        wtr.write_u16(self.qclass);
        Ok(())
    }

    pub fn qname(&self) -> &Labels {
        &self.qname
    }

    pub fn qtype(&self) -> Type {
        self.qtype
    }

    pub fn qclass(&self) -> Class {
        self.qclass
    }

    /// The echo check of a response question against the one we sent:
    /// name comparison is case-insensitive, type and class exact.
    pub fn matches(&self, other: &Question) -> bool {
        self.qtype == other.qtype
            && self.qclass == other.qclass
            && self.qname.eq_ignore_case(&other.qname)
    }
}
