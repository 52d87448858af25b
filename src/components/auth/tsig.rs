/*!
Secret Key Transaction Authentication (TSIG), rfc8945.

The MAC covers the message as it stood before the TSIG RR was added
(ARCOUNT one less, the original ID in place) followed by the TSIG
variables: key name, class, TTL, algorithm name, time signed, fudge,
error and other-data, names canonicalized.  A response MAC additionally
chains the length-prefixed request MAC in front.
 */

use anyhow::Error;
use crypto::digest::Digest;
use crypto::hmac::Hmac;
use crypto::mac::Mac;
use crypto::util::fixed_time_eq;

use crate::dns::rdata::{RDataType, TSig};
use crate::dns::{Labels, PacketWriter, ResourceRecord, CLASS_ANY, ERR_BADKEY, ERR_BADSIG, ERR_BADTIME, TYPE_TSIG};
use crate::error::DnsError;
use crate::DNS;

pub const HMAC_MD5: &str = "hmac-md5.sig-alg.reg.int";
pub const HMAC_SHA1: &str = "hmac-sha1";
pub const HMAC_SHA224: &str = "hmac-sha224";
pub const HMAC_SHA256: &str = "hmac-sha256";
pub const HMAC_SHA384: &str = "hmac-sha384";
pub const HMAC_SHA512: &str = "hmac-sha512";

/// The default fudge window, seconds; rfc8945 recommends 300.
pub const DEFAULT_FUDGE: u16 = 300;

/// A shared TSIG secret: the key name, the HMAC algorithm in its
/// presentation form (one of the `HMAC_*` constants) and the raw
/// secret octets.
#[derive(Debug, Clone)]
pub struct TsigKey {
    pub name: String,
    pub algorithm: String,
    secret: Vec<u8>,
}

impl TsigKey {
    pub fn new(name: &str, algorithm: &str, secret: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            algorithm: algorithm.to_string(),
            secret: secret.to_vec(),
        }
    }
}

fn hmac_compute(algorithm: &str, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    fn run<D: Digest>(digest: D, key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut hmac = Hmac::new(digest, key);
        hmac.input(data);
        hmac.result().code().to_vec()
    }

    match algorithm.trim_end_matches('.').to_ascii_lowercase().as_str() {
        HMAC_MD5 => Ok(run(crypto::md5::Md5::new(), key, data)),
        HMAC_SHA1 => Ok(run(crypto::sha1::Sha1::new(), key, data)),
        HMAC_SHA224 => Ok(run(crypto::sha2::Sha224::new(), key, data)),
        HMAC_SHA256 => Ok(run(crypto::sha2::Sha256::new(), key, data)),
        HMAC_SHA384 => Ok(run(crypto::sha2::Sha384::new(), key, data)),
        HMAC_SHA512 => Ok(run(crypto::sha2::Sha512::new(), key, data)),
        other => Err(Error::new(DnsError::Authentication(format!(
            "unknown TSIG algorithm {:?}",
            other
        )))),
    }
}

/// The TSIG variables of rfc8945 4.3.3, appended to the message for MAC
/// computation.  Names go out canonical (lowercased, uncompressed).
fn append_tsig_vars(
    tbs: &mut Vec<u8>,
    key_name: &Labels,
    class: u16,
    ttl: u32,
    tsig: &TSig,
) -> Result<(), Error> {
    let mut wtr = PacketWriter::canonical();
    wtr.write_name(key_name, false)?;
    wtr.write_u16(class);
    wtr.write_u32(ttl);
    wtr.write_name(&tsig.algorithm_name, false)?;
    wtr.write_u48(tsig.time_signed);
    wtr.write_u16(tsig.fudge);
    wtr.write_u16(tsig.error);
    wtr.write_u16(tsig.other.len() as u16);
    wtr.write_bytes(&tsig.other);
    tbs.extend(wtr.into_bytes());
    Ok(())
}

/// Sign `dns` in place: compute the MAC over the current message and
/// append the TSIG RR as the last additional record.  Returns the MAC
/// so a caller verifying the response can chain it.
pub fn sign(dns: &mut DNS, key: &TsigKey, now: u64, fudge: u16) -> Result<Vec<u8>, Error> {
    let key_name = Labels::from_str(&key.name)?;
    let mut tsig = TSig::new();
    tsig.with_algorithm_name(&key.algorithm)?
        .with_time_signed(now)
        .with_original_id(dns.head().id());
    tsig.fudge = fudge;

    let mut tbs = dns.encode(true)?;
    append_tsig_vars(&mut tbs, &key_name, CLASS_ANY, 0, &tsig)?;
    tsig.mac = hmac_compute(&key.algorithm, &key.secret, &tbs)?;
    let mac = tsig.mac.clone();

    let mut rr = ResourceRecord::new();
    rr.with_labels(key_name)
        .with_type(TYPE_TSIG)
        .with_class(CLASS_ANY)
        .with_ttl(0)
        .with_rdata(RDataType::TSig(tsig));
    dns.with_additional(rr);
    Ok(mac)
}

fn tsig_error_name(error: u16) -> String {
    match error {
        ERR_BADSIG => "BADSIG".to_string(),
        ERR_BADKEY => "BADKEY".to_string(),
        ERR_BADTIME => "BADTIME".to_string(),
        other => format!("ERR{}", other),
    }
}

/// Verify the TSIG on a received message.  `request_mac` chains the MAC
/// of the request we sent when `raw` is a response to it.
pub fn verify(
    raw: &[u8],
    key: &TsigKey,
    request_mac: Option<&[u8]>,
    now: u64,
) -> Result<(), Error> {
    let dns = DNS::from(raw)?;
    let (rr, offset) = dns.tsig().ok_or_else(|| {
        Error::new(DnsError::Authentication(
            "message carries no TSIG".to_string(),
        ))
    })?;
    let tsig = match rr.rdata() {
        RDataType::TSig(t) => t,
        _ => {
            return Err(Error::new(DnsError::Authentication(
                "trailing record is not a TSIG".to_string(),
            )))
        }
    };

    let key_name = Labels::from_str(&key.name)?;
    if !rr.name().eq_ignore_case(&key_name) {
        return Err(Error::new(DnsError::Authentication(format!(
            "BADKEY: message signed with {:?}, we hold {:?}",
            rr.name().to_str(),
            key.name
        ))));
    }
    let alg_name = Labels::from_str(&key.algorithm)?;
    if !tsig.algorithm_name.eq_ignore_case(&alg_name) {
        return Err(Error::new(DnsError::Authentication(format!(
            "BADKEY: algorithm {:?} does not match key algorithm {:?}",
            tsig.algorithm_name.to_str(),
            key.algorithm
        ))));
    }
    if tsig.error != 0 {
        return Err(Error::new(DnsError::Authentication(format!(
            "peer reported TSIG error {}",
            tsig_error_name(tsig.error)
        ))));
    }
    if now.abs_diff(tsig.time_signed) > tsig.fudge as u64 {
        return Err(Error::new(DnsError::Authentication(format!(
            "BADTIME: signed at {}, checked at {}, fudge {}",
            tsig.time_signed, now, tsig.fudge
        ))));
    }

    // the signed region: everything before the TSIG RR, with the
    // original ID restored and ARCOUNT decremented by one
    let mut msg = raw[..offset].to_vec();
    msg[0..2].copy_from_slice(&tsig.original_id.to_be_bytes());
    let arcount = u16::from_be_bytes([msg[10], msg[11]]);
    if arcount == 0 {
        return Err(Error::new(DnsError::PacketMalformed(
            "TSIG present but ARCOUNT is zero".to_string(),
        )));
    }
    msg[10..12].copy_from_slice(&(arcount - 1).to_be_bytes());

    let mut tbs = Vec::new();
    if let Some(mac) = request_mac {
        tbs.extend((mac.len() as u16).to_be_bytes());
        tbs.extend_from_slice(mac);
    }
    tbs.extend(msg);
    append_tsig_vars(&mut tbs, rr.name(), rr.class(), rr.ttl(), tsig)?;

    let expect = hmac_compute(&key.algorithm, &key.secret, &tbs)?;
    if !fixed_time_eq(&expect, &tsig.mac) {
        return Err(Error::new(DnsError::Authentication(
            "BADSIG: MAC mismatch".to_string(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{CLASS_IN, OPCODE_UPDATE, TYPE_SOA};

    fn sample_key() -> TsigKey {
        TsigKey::new("mykey", HMAC_SHA256, b"9dnf93asdf39fs")
    }

    fn signed_update(key: &TsigKey, now: u64) -> (Vec<u8>, Vec<u8>) {
        let mut dns = DNS::new();
        dns.head_mut().with_opcode(OPCODE_UPDATE);
        dns.with_ques("example.com", TYPE_SOA, CLASS_IN).unwrap();
        let mac = sign(&mut dns, key, now, DEFAULT_FUDGE).unwrap();
        (dns.encode(true).unwrap(), mac)
    }

    #[test]
    fn test_tsig_sign_verify_roundtrip() {
        let key = sample_key();
        let (raw, _mac) = signed_update(&key, 1_700_000_000);
        verify(&raw, &key, None, 1_700_000_000).unwrap();
        // a few seconds of clock skew stay inside the fudge window
        verify(&raw, &key, None, 1_700_000_000 + 250).unwrap();
    }

    #[test]
    fn test_tsig_verify_wrong_key() {
        let key = sample_key();
        let (raw, _) = signed_update(&key, 1_700_000_000);

        let wrong_secret = TsigKey::new("mykey", HMAC_SHA256, b"someotherkey12");
        let err = verify(&raw, &wrong_secret, None, 1_700_000_000).unwrap_err();
        assert_eq!(true, format!("{}", err).contains("BADSIG"));

        let wrong_name = TsigKey::new("notmykey", HMAC_SHA256, b"9dnf93asdf39fs");
        let err = verify(&raw, &wrong_name, None, 1_700_000_000).unwrap_err();
        assert_eq!(true, format!("{}", err).contains("BADKEY"));
    }

    #[test]
    fn test_tsig_verify_bit_flip() {
        let key = sample_key();
        let (raw, _) = signed_update(&key, 1_700_000_000);

        // flip one bit inside the signed region (the qname)
        let mut tampered = raw.clone();
        tampered[13] ^= 0x01;
        assert_eq!(
            true,
            verify(&tampered, &key, None, 1_700_000_000).is_err()
        );

        // flip one bit of the MAC itself: tsig rdata sits at the tail
        let mut tampered = raw.clone();
        let at = raw.len() - 20;
        tampered[at] ^= 0x01;
        assert_eq!(
            true,
            verify(&tampered, &key, None, 1_700_000_000).is_err()
        );
    }

    #[test]
    fn test_tsig_verify_outside_fudge() {
        let key = sample_key();
        let (raw, _) = signed_update(&key, 1_700_000_000);
        let err = verify(&raw, &key, None, 1_700_000_000 + 301).unwrap_err();
        assert_eq!(true, format!("{}", err).contains("BADTIME"));
    }

    #[test]
    fn test_tsig_request_mac_chaining() {
        let key = sample_key();
        let (_, request_mac) = signed_update(&key, 1_700_000_000);

        // fake a signed response: same exchange but chained on the
        // request MAC
        let mut resp = DNS::new();
        resp.head_mut().with_qr(true);
        resp.with_ques("example.com", TYPE_SOA, CLASS_IN).unwrap();
        let key_name = Labels::from_str(&key.name).unwrap();
        let mut tsig = TSig::new();
        tsig.with_algorithm_name(&key.algorithm)
            .unwrap()
            .with_time_signed(1_700_000_000)
            .with_original_id(resp.head().id());

        let mut tbs = Vec::new();
        tbs.extend((request_mac.len() as u16).to_be_bytes());
        tbs.extend_from_slice(&request_mac);
        tbs.extend(resp.encode(true).unwrap());
        append_tsig_vars(&mut tbs, &key_name, CLASS_ANY, 0, &tsig).unwrap();
        tsig.mac = hmac_compute(&key.algorithm, b"9dnf93asdf39fs", &tbs).unwrap();

        let mut rr = ResourceRecord::new();
        rr.with_labels(key_name)
            .with_type(TYPE_TSIG)
            .with_class(CLASS_ANY)
            .with_rdata(RDataType::TSig(tsig));
        resp.with_additional(rr);
        let raw = resp.encode(true).unwrap();

        verify(&raw, &key, Some(&request_mac), 1_700_000_000).unwrap();
        // without the chained MAC the verification must fail
        assert_eq!(true, verify(&raw, &key, None, 1_700_000_000).is_err());
    }

    #[test]
    fn test_tsig_unknown_algorithm() {
        let key = TsigKey::new("mykey", "hmac-md4", b"sekrit");
        let mut dns = DNS::new();
        dns.with_ques("example.com", TYPE_SOA, CLASS_IN).unwrap();
        let err = sign(&mut dns, &key, 0, DEFAULT_FUDGE).unwrap_err();
        assert_eq!(true, format!("{}", err).contains("unknown TSIG algorithm"));
    }
}
