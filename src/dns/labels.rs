use anyhow::Error;
use nom::AsChar;

use crate::error::DnsError;
use crate::util;

/// Longest wire form of a whole name, length octets and root included.
pub const MAX_NAME_LEN: usize = 255;

/// Longest single label.
pub const MAX_LABEL_LEN: usize = 63;

/// How many pointers we will chase inside one name before declaring a loop.
const MAX_POINTER_FOLLOWS: usize = 255;

/// A domain name as an ordered sequence of labels.  Labels must be 63
/// octets or less and the whole name must fit in 255 octets of wire form.
/// The empty sequence is the root.  Comparison of names is
/// case-insensitive on ASCII; the [PartialEq] derive is byte-exact, use
/// [Labels::eq_ignore_case] where the RFCs ask for name equality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn root() -> Self {
        Labels(vec![])
    }

    /// Parse the presentation form.  A trailing dot (absolute form) is
    /// accepted and dropped; "" and "." both give the root.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut labels = Labels(vec![]);
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(Error::new(DnsError::PacketMalformed(format!(
                    "empty label in domain name {:?}",
                    s
                ))));
            }
            labels.push(label)?;
        }
        Ok(labels)
    }

    /// Parse the wire form starting at `*offset` in `raw`, following
    /// rfc1035 4.1.4 back pointers.  `offset` ends up just past the name
    /// (past the 2-octet pointer when one closed it).
    ///
    /// Pointers may only point backwards, at most [MAX_POINTER_FOLLOWS]
    /// are chased, and the accumulated name may not exceed
    /// [MAX_NAME_LEN] octets.
    pub fn from_wire(raw: &[u8], offset: &mut usize) -> Result<Self, Error> {
        let mut labels = Labels(vec![]);
        let mut pos = *offset;
        let mut follows = 0_usize;
        // wire length accumulates length octets plus the final root octet
        let mut wire_len = 1_usize;
        // None until the first pointer; afterwards where the caller resumes
        let mut resume: Option<usize> = None;

        loop {
            if pos >= raw.len() {
                return Err(Error::new(DnsError::PacketMalformed(
                    "name runs off the end of the packet".to_string(),
                )));
            }
            let lead = raw[pos];

            if lead & 0b1100_0000 == 0b1100_0000 {
                if pos + 1 >= raw.len() {
                    return Err(Error::new(DnsError::PacketMalformed(
                        "truncated compression pointer".to_string(),
                    )));
                }
                let (target, _) = util::is_compressed([raw[pos], raw[pos + 1]]);
                if target >= pos {
                    return Err(Error::new(DnsError::PacketMalformed(format!(
                        "compression pointer at {} points forward to {}",
                        pos, target
                    ))));
                }
                follows += 1;
                if follows > MAX_POINTER_FOLLOWS {
                    return Err(Error::new(DnsError::PacketMalformed(
                        "compression pointer loop".to_string(),
                    )));
                }
                if resume.is_none() {
                    resume = Some(pos + 2);
                }
                pos = target;
                continue;
            }

            if lead & 0b1100_0000 != 0 {
                return Err(Error::new(DnsError::PacketMalformed(format!(
                    "reserved label type 0b{:02b}",
                    lead >> 6
                ))));
            }

            if lead == 0 {
                pos += 1;
                break;
            }

            let len = lead as usize;
            if pos + 1 + len > raw.len() {
                return Err(Error::new(DnsError::PacketMalformed(
                    "label runs off the end of the packet".to_string(),
                )));
            }
            wire_len += 1 + len;
            if wire_len > MAX_NAME_LEN {
                return Err(Error::new(DnsError::PacketMalformed(
                    "name exceeds 255 octets".to_string(),
                )));
            }
            labels
                .0
                .push(String::from_utf8_lossy(&raw[pos + 1..pos + 1 + len]).into_owned());
            pos += 1 + len;
        }

        *offset = resume.unwrap_or(pos);
        Ok(labels)
    }

    /// Presentation form, always absolute. The root is ".".
    pub fn to_str(&self) -> String {
        if self.0.is_empty() {
            return ".".to_string();
        }
        let mut s = self.0.join(".");
        s.push('.');
        s
    }

    pub fn push(&mut self, label: &str) -> Result<(), Error> {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(Error::new(DnsError::PacketMalformed(format!(
                "label {:?} not in 1..63 octets",
                label
            ))));
        }
        // ARPANET host name rules, relaxed for wildcards and underscore
        // prefixes (SRV, TSIG key names)
        for b in label.bytes() {
            let c = b.as_char();
            if !(c.is_alphanum() || c == '-' || c == '_' || c == '*') {
                return Err(Error::new(DnsError::PacketMalformed(format!(
                    "label {:?} contains {:?}",
                    label, c
                ))));
            }
        }
        if self.wire_len() + 1 + label.len() > MAX_NAME_LEN {
            return Err(Error::new(DnsError::PacketMalformed(
                "name exceeds 255 octets".to_string(),
            )));
        }
        self.0.push(label.to_string());
        Ok(())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of labels, the root excluded; the RRSIG labels field, minus
    /// any wildcard.
    pub fn label_count(&self) -> u8 {
        let mut n = self.0.len();
        if self.0.first().map(|l| l.as_str()) == Some("*") {
            n -= 1;
        }
        n as u8
    }

    /// Length of the uncompressed wire form.
    pub fn wire_len(&self) -> usize {
        self.0.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    pub fn to_lowercase(&self) -> Self {
        Labels(self.0.iter().map(|l| l.to_ascii_lowercase()).collect())
    }
}
