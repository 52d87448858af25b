/*!
Asymmetric signatures: RRset signing (RRSIG, rfc4034 3.1.8.1) and
transaction signatures over whole messages (SIG(0), rfc2931).

The signed data for an RRset is

    RRSIG_RDATA | RR(1) | RR(2)...

where RRSIG_RDATA is the rdata with the Signature field excluded and
the Signer's Name canonical, and each RR is the canonical image: owner
lowercased and uncompressed, the TTL replaced by the original TTL, the
set sorted by canonical rdata.

For SIG(0) the data is the SIG rdata (sans signature) followed by the
message as it stood before the SIG RR was appended.
 */

use anyhow::Error;
use rsa::signature::Verifier;
use rsa::{BigUint, RsaPublicKey};

use super::key_file::PrivateKey;
use crate::dns::rdata::sec::{
    ALGO_DSA, ALGO_DSA_NSEC3_SHA1, ALGO_RSASHA1, ALGO_RSASHA1_NSEC3_SHA1, ALGO_RSASHA256,
    ALGO_RSASHA512,
};
use crate::dns::rdata::{RDataType, DNSKEY, RRSig};
use crate::dns::{Labels, ResourceRecord, CLASS_ANY, TYPE_SIG};
use crate::error::DnsError;
use crate::DNS;

/// SIG(0) validity window around the signing time, seconds.
const SIG0_WINDOW: u32 = 300;

/// Split the rfc3110 public key field into (exponent, modulus).
fn split_rsa_pub_key(encoded: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    let (e_len_len, e_len) = match encoded.first() {
        Some(&0) if encoded.len() >= 3 => (3, ((encoded[1] as usize) << 8) | encoded[2] as usize),
        Some(e_len) if *e_len != 0 => (1, *e_len as usize),
        _ => {
            return Err(Error::new(DnsError::KeyMaterial(
                "empty RSA public key".to_string(),
            )))
        }
    };
    if encoded.len() < e_len_len + e_len {
        return Err(Error::new(DnsError::KeyMaterial(
            "truncated RSA public key".to_string(),
        )));
    }
    let (e, n) = encoded[e_len_len..].split_at(e_len);
    Ok((e, n))
}

fn verify_rsa(
    algorithm: u8,
    pub_key: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    let (e, n) = split_rsa_pub_key(pub_key)?;
    let key = RsaPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))
        .map_err(|e| DnsError::KeyMaterial(format!("bad RSA public key: {}", e)))?;
    let sig = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|e| DnsError::Authentication(format!("bad signature encoding: {}", e)))?;

    let verified = match algorithm {
        ALGO_RSASHA1 | ALGO_RSASHA1_NSEC3_SHA1 => {
            rsa::pkcs1v15::VerifyingKey::<sha1::Sha1>::new(key)
                .verify(data, &sig)
                .is_ok()
        }
        ALGO_RSASHA256 => rsa::pkcs1v15::VerifyingKey::<sha2::Sha256>::new(key)
            .verify(data, &sig)
            .is_ok(),
        ALGO_RSASHA512 => rsa::pkcs1v15::VerifyingKey::<sha2::Sha512>::new(key)
            .verify(data, &sig)
            .is_ok(),
        ALGO_DSA | ALGO_DSA_NSEC3_SHA1 => {
            return Err(Error::new(DnsError::Authentication(
                "unsupported algorithm: DSA verification is not provided".to_string(),
            )))
        }
        other => {
            return Err(Error::new(DnsError::Authentication(format!(
                "unsupported algorithm {}",
                other
            ))))
        }
    };
    if !verified {
        return Err(Error::new(DnsError::Authentication(
            "signature verification failed".to_string(),
        )));
    }
    Ok(())
}

/// The rfc4034 3.1.8.1 signed data for one RRset under `rrsig`.
fn rrset_signed_data(rrsig: &RRSig, rrs: &[ResourceRecord]) -> Result<Vec<u8>, Error> {
    let mut tbs = rrsig.rdata_sans_signature()?;

    let mut images = Vec::with_capacity(rrs.len());
    for rr in rrs {
        images.push(rr.canonical_wire(rrsig.origin_ttl)?);
    }
    // canonical order sorts by the rdata octets; every image shares the
    // owner/type/class/ttl/rdlength prefix length, so sort on the tail
    let prefix = rrs[0].name().wire_len() + 8;
    images.sort_by(|a, b| a[prefix + 2..].cmp(&b[prefix + 2..]));
    for image in images {
        tbs.extend(image);
    }
    Ok(tbs)
}

fn check_rrset(rrs: &[ResourceRecord]) -> Result<(), Error> {
    let first = match rrs.first() {
        Some(rr) => rr,
        None => {
            return Err(Error::new(DnsError::Configuration(
                "cannot sign an empty RRset".to_string(),
            )))
        }
    };
    for rr in rrs {
        if rr.typ() != first.typ()
            || rr.class() != first.class()
            || !rr.name().eq_ignore_case(first.name())
        {
            return Err(Error::new(DnsError::Configuration(
                "RRset members must share owner, type and class".to_string(),
            )));
        }
    }
    Ok(())
}

/// Sign one RRset, returning the covering RRSIG record.
pub fn sign_rrset(
    rrs: &[ResourceRecord],
    key: &PrivateKey,
    inception: u32,
    expiration: u32,
) -> Result<ResourceRecord, Error> {
    check_rrset(rrs)?;
    let first = &rrs[0];

    let mut rrsig = RRSig::new();
    rrsig.type_covered = first.typ();
    rrsig.algorithm = key.algorithm();
    rrsig.labels = first.name().label_count();
    rrsig.origin_ttl = first.ttl();
    rrsig.sig_expiration = expiration;
    rrsig.sig_inception = inception;
    rrsig.key_tag = key.key_tag();
    rrsig.signer_name = Labels::from_str(key.name())?;

    let tbs = rrset_signed_data(&rrsig, rrs)?;
    rrsig.signature = key.sign(&tbs)?;

    let mut rr = ResourceRecord::new();
    rr.with_labels(first.name().clone())
        .with_type(crate::dns::TYPE_RRSIG)
        .with_class(first.class())
        .with_ttl(first.ttl())
        .with_rdata(RDataType::RRSig(rrsig));
    Ok(rr)
}

/// Verify an RRSIG over its RRset with the public key from `dnskey`.
pub fn verify_rrset(
    rrs: &[ResourceRecord],
    rrsig: &RRSig,
    dnskey: &DNSKEY,
) -> Result<(), Error> {
    check_rrset(rrs)?;
    if rrs[0].typ() != rrsig.type_covered {
        return Err(Error::new(DnsError::Authentication(
            "RRSIG covers a different type".to_string(),
        )));
    }
    let tbs = rrset_signed_data(rrsig, rrs)?;
    verify_rsa(rrsig.algorithm, &dnskey.pub_key, &tbs, &rrsig.signature)
}

/// Append a SIG(0) transaction signature to `dns`.  The SIG RR sits
/// last in the additional section with an empty type-covered field.
pub fn sign_message(dns: &mut DNS, key: &PrivateKey, now: u32) -> Result<(), Error> {
    let mut sig = RRSig::new();
    sig.type_covered = 0;
    sig.algorithm = key.algorithm();
    sig.labels = 0;
    sig.origin_ttl = 0;
    sig.sig_expiration = now.wrapping_add(SIG0_WINDOW);
    sig.sig_inception = now.wrapping_sub(SIG0_WINDOW);
    sig.key_tag = key.key_tag();
    sig.signer_name = Labels::from_str(key.name())?;

    let mut tbs = sig.rdata_sans_signature()?;
    tbs.extend(dns.encode(true)?);
    sig.signature = key.sign(&tbs)?;

    let mut rr = ResourceRecord::new();
    rr.with_type(TYPE_SIG)
        .with_class(CLASS_ANY)
        .with_ttl(0)
        .with_rdata(RDataType::Sig(sig));
    dns.with_additional(rr);
    Ok(())
}

/// Verify the SIG(0) on a received message against a DNSKEY.
pub fn verify_message(raw: &[u8], dnskey: &DNSKEY, now: u32) -> Result<(), Error> {
    let dns = DNS::from(raw)?;
    let (rr, offset) = dns.sig0().ok_or_else(|| {
        Error::new(DnsError::Authentication(
            "message carries no SIG(0)".to_string(),
        ))
    })?;
    let sig = match rr.rdata() {
        RDataType::Sig(s) => s,
        _ => {
            return Err(Error::new(DnsError::Authentication(
                "trailing record is not a SIG".to_string(),
            )))
        }
    };

    // rfc1982 serial comparison collapses to plain ordering inside the
    // narrow validity window used here
    if now.wrapping_sub(sig.sig_inception) > u32::MAX / 2 {
        return Err(Error::new(DnsError::Authentication(
            "SIG(0) not yet valid".to_string(),
        )));
    }
    if sig.sig_expiration.wrapping_sub(now) > u32::MAX / 2 {
        return Err(Error::new(DnsError::Authentication(
            "SIG(0) expired".to_string(),
        )));
    }

    // the signed region: everything before the SIG RR, ARCOUNT one less
    let mut msg = raw[..offset].to_vec();
    let arcount = u16::from_be_bytes([msg[10], msg[11]]);
    if arcount == 0 {
        return Err(Error::new(DnsError::PacketMalformed(
            "SIG(0) present but ARCOUNT is zero".to_string(),
        )));
    }
    msg[10..12].copy_from_slice(&(arcount - 1).to_be_bytes());

    let mut tbs = sig.rdata_sans_signature()?;
    tbs.extend(msg);
    verify_rsa(sig.algorithm, &dnskey.pub_key, &tbs, &sig.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::rdata::A;
    use crate::dns::{CLASS_IN, TYPE_A, TYPE_MX};
    use rsa::RsaPrivateKey;
    use std::net::Ipv4Addr;

    fn test_key() -> PrivateKey {
        let mut rng = rand::thread_rng();
        let rsa = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        // align the tag with the key material the way dnssec-keygen does
        let probe = PrivateKey::new("example.com.", ALGO_RSASHA256, 0, rsa.clone());
        PrivateKey::new("example.com.", ALGO_RSASHA256, probe.computed_key_tag(), rsa)
    }

    fn a_rrset() -> Vec<ResourceRecord> {
        let mut one = ResourceRecord::new();
        one.with_name("Host.example.com").unwrap();
        one.with_type(TYPE_A)
            .with_class(CLASS_IN)
            .with_ttl(3600)
            .with_rdata(RDataType::A(A(Ipv4Addr::new(192, 0, 2, 10))));
        let mut two = one.clone();
        two.with_rdata(RDataType::A(A(Ipv4Addr::new(192, 0, 2, 2))));
        vec![one, two]
    }

    #[test]
    fn test_rrset_sign_verify_roundtrip() {
        let key = test_key();
        let rrs = a_rrset();
        let rrsig_rr = sign_rrset(&rrs, &key, 1_700_000_000, 1_702_000_000).unwrap();
        let rrsig = match rrsig_rr.rdata() {
            RDataType::RRSig(s) => s.clone(),
            _ => panic!("not an RRSIG"),
        };
        assert_eq!(TYPE_A, rrsig.type_covered);
        assert_eq!(3, rrsig.labels);
        assert_eq!(key.key_tag(), rrsig.key_tag);

        verify_rrset(&rrs, &rrsig, &key.public_dnskey()).unwrap();

        // record order must not matter: the canonical sort fixes it
        let reversed: Vec<ResourceRecord> = rrs.iter().rev().cloned().collect();
        verify_rrset(&reversed, &rrsig, &key.public_dnskey()).unwrap();
    }

    #[test]
    fn test_rrset_verify_rejects_tamper() {
        let key = test_key();
        let rrs = a_rrset();
        let rrsig_rr = sign_rrset(&rrs, &key, 1_700_000_000, 1_702_000_000).unwrap();
        let rrsig = match rrsig_rr.rdata() {
            RDataType::RRSig(s) => s.clone(),
            _ => panic!("not an RRSIG"),
        };

        let mut tampered = rrs.clone();
        tampered[0].with_rdata(RDataType::A(A(Ipv4Addr::new(192, 0, 2, 99))));
        assert_eq!(
            true,
            verify_rrset(&tampered, &rrsig, &key.public_dnskey()).is_err()
        );

        // a signature bit flip fails too
        let mut broken = rrsig.clone();
        broken.signature[10] ^= 0x01;
        assert_eq!(
            true,
            verify_rrset(&rrs, &broken, &key.public_dnskey()).is_err()
        );
    }

    #[test]
    fn test_rrset_sign_rejects_mixed_set() {
        let key = test_key();
        let mut rrs = a_rrset();
        rrs[1].with_type(TYPE_MX);
        assert_eq!(
            true,
            sign_rrset(&rrs, &key, 1_700_000_000, 1_702_000_000).is_err()
        );
        assert_eq!(true, sign_rrset(&[], &key, 0, 0).is_err());
    }

    #[test]
    fn test_sig0_message_roundtrip() {
        let key = test_key();
        let mut dns = DNS::new();
        dns.with_ques("example.com", TYPE_A, CLASS_IN).unwrap();
        sign_message(&mut dns, &key, 1_700_000_000).unwrap();
        let raw = dns.encode(true).unwrap();

        verify_message(&raw, &key.public_dnskey(), 1_700_000_000).unwrap();

        // outside the validity window
        assert_eq!(
            true,
            verify_message(&raw, &key.public_dnskey(), 1_700_001_000).is_err()
        );

        // tampering with the question breaks the signature
        let mut tampered = raw.clone();
        tampered[13] ^= 0x01;
        assert_eq!(
            true,
            verify_message(&tampered, &key.public_dnskey(), 1_700_000_000).is_err()
        );
    }
}
