/*!
Dynamic update packets, rfc2136.

An update reuses the four message sections under different names:
question carries the zone (ZNAME, ZTYPE=SOA, ZCLASS), answer the
prerequisites, authority the update operations, additional whatever
else rides along (ultimately the TSIG).  Prerequisites and deletions
are sentinel RRs: class ANY or NONE, TTL 0, empty rdata unless a value
is part of the condition.
 */

use anyhow::Error;

use crate::dns::rdata::{Raw, RDataType};
use crate::dns::{
    Class, ResourceRecord, Type, CLASS_ANY, CLASS_IN, CLASS_NONE, OPCODE_UPDATE, TYPE_ANY,
    TYPE_SOA,
};
use crate::DNS;

#[derive(Debug, Clone)]
pub struct Update {
    dns: DNS,
    zclass: Class,
}

impl Update {
    /// Start an update for `zone`, class IN.
    pub fn new(zone: &str) -> Result<Self, Error> {
        Self::with_class(zone, CLASS_IN)
    }

    pub fn with_class(zone: &str, zclass: Class) -> Result<Self, Error> {
        let mut dns = DNS::new();
        dns.head_mut().with_opcode(OPCODE_UPDATE);
        dns.with_ques(zone, TYPE_SOA, zclass)?;
        Ok(Self { dns, zclass })
    }

    fn sentinel(name: &str, typ: Type, class: Class) -> Result<ResourceRecord, Error> {
        let mut rr = ResourceRecord::new();
        rr.with_name(name)?;
        rr.with_type(typ)
            .with_class(class)
            .with_ttl(0)
            .with_rdata(RDataType::Raw(Raw(vec![])));
        Ok(rr)
    }

    /// Prerequisite: at least one RR with this name and type exists,
    /// any rdata ("yxrrset", value-independent).
    pub fn require_rrset(&mut self, name: &str, typ: Type) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, typ, CLASS_ANY)?;
        self.dns.with_answer(rr);
        Ok(self)
    }

    /// Prerequisite: this exact RR exists ("yxrrset",
    /// value-dependent).  The record's class is rewritten to the zone
    /// class and its TTL to zero, as the wire form demands.
    pub fn require_rr(&mut self, mut rr: ResourceRecord) -> &mut Self {
        rr.with_class(self.zclass).with_ttl(0);
        self.dns.with_answer(rr);
        self
    }

    /// Prerequisite: no RR with this name and type exists ("nxrrset").
    pub fn require_no_rrset(&mut self, name: &str, typ: Type) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, typ, CLASS_NONE)?;
        self.dns.with_answer(rr);
        Ok(self)
    }

    /// Prerequisite: the name owns at least one RR ("yxdomain").
    pub fn require_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, TYPE_ANY, CLASS_ANY)?;
        self.dns.with_answer(rr);
        Ok(self)
    }

    /// Prerequisite: the name owns no RRs at all ("nxdomain").
    pub fn require_no_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, TYPE_ANY, CLASS_NONE)?;
        self.dns.with_answer(rr);
        Ok(self)
    }

    /// Add this record to the zone.
    pub fn add(&mut self, mut rr: ResourceRecord) -> &mut Self {
        rr.with_class(self.zclass);
        self.dns.with_authority(rr);
        self
    }

    /// Delete exactly this record (name, type and rdata must match).
    pub fn delete_rr(&mut self, mut rr: ResourceRecord) -> &mut Self {
        rr.with_class(CLASS_NONE).with_ttl(0);
        self.dns.with_authority(rr);
        self
    }

    /// Delete every RR of one type at a name.
    pub fn delete_rrset(&mut self, name: &str, typ: Type) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, typ, CLASS_ANY)?;
        self.dns.with_authority(rr);
        Ok(self)
    }

    /// Delete everything at a name.
    pub fn delete_name(&mut self, name: &str) -> Result<&mut Self, Error> {
        let rr = Self::sentinel(name, TYPE_ANY, CLASS_ANY)?;
        self.dns.with_authority(rr);
        Ok(self)
    }

    pub fn into_dns(self) -> DNS {
        self.dns
    }

    pub fn dns(&self) -> &DNS {
        &self.dns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::rdata::A;
    use crate::dns::TYPE_A;
    use std::net::Ipv4Addr;

    fn host_a(ip: Ipv4Addr) -> ResourceRecord {
        let mut rr = ResourceRecord::new();
        rr.with_name("host.example.com").unwrap();
        rr.with_type(TYPE_A)
            .with_class(CLASS_IN)
            .with_ttl(3600)
            .with_rdata(RDataType::A(A(ip)));
        rr
    }

    #[test]
    fn test_update_zone_section() {
        let update = Update::new("example.com").unwrap();
        let dns = update.dns();
        assert_eq!(OPCODE_UPDATE, dns.head().opcode());
        assert_eq!(1, dns.ques().len());
        assert_eq!(TYPE_SOA, dns.ques()[0].qtype());
        assert_eq!(CLASS_IN, dns.ques()[0].qclass());
    }

    #[test]
    fn test_update_sentinel_encodings() {
        let mut update = Update::new("example.com").unwrap();
        update
            .require_no_name("new.example.com")
            .unwrap()
            .require_rrset("host.example.com", TYPE_A)
            .unwrap();
        update.add(host_a(Ipv4Addr::new(192, 0, 2, 1)));
        update.delete_rrset("old.example.com", TYPE_A).unwrap();
        update.delete_name("gone.example.com").unwrap();

        let mut dns = update.into_dns();

        // prerequisites sit in the answer section
        assert_eq!(2, dns.answers().len());
        let nxdomain = &dns.answers().0[0];
        assert_eq!(TYPE_ANY, nxdomain.typ());
        assert_eq!(CLASS_NONE, nxdomain.class());
        assert_eq!(0, nxdomain.ttl());
        let yxrrset = &dns.answers().0[1];
        assert_eq!(TYPE_A, yxrrset.typ());
        assert_eq!(CLASS_ANY, yxrrset.class());

        // updates sit in the authority section
        assert_eq!(3, dns.authority().len());
        assert_eq!(CLASS_IN, dns.authority().0[0].class());
        assert_eq!(CLASS_ANY, dns.authority().0[1].class());
        assert_eq!(TYPE_ANY, dns.authority().0[2].typ());

        // the sentinels survive the wire: empty rdata, rdlength 0
        let raw = dns.encode(true).unwrap();
        let decoded = DNS::from(&raw).unwrap();
        assert_eq!(2, decoded.answers().len());
        assert_eq!(3, decoded.authority().len());
        assert_eq!(
            RDataType::Raw(Raw(vec![])),
            *decoded.answers().0[0].rdata()
        );
    }

    #[test]
    fn test_update_delete_rr_rewrites_class() {
        let mut update = Update::new("example.com").unwrap();
        update.delete_rr(host_a(Ipv4Addr::new(192, 0, 2, 1)));
        let dns = update.dns();
        assert_eq!(CLASS_NONE, dns.authority().0[0].class());
        assert_eq!(0, dns.authority().0[0].ttl());
        // the rdata itself stays: it names the record to delete
        assert_ne!(RDataType::Raw(Raw(vec![])), *dns.authority().0[0].rdata());
    }
}
