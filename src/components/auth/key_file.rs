/*!
BIND dnssec-keygen private key files.

A key pair lives in `K<name>.+<algorithm>.+<keytag>.private`, a
line-oriented `Field: value` file:

```text
Private-key-format: v1.2
Algorithm: 8 (RSASHA256)
Modulus: <base64>
PublicExponent: <base64>
PrivateExponent: <base64>
Prime1: <base64>
Prime2: <base64>
Exponent1: <base64>
Exponent2: <base64>
Coefficient: <base64>
```

The algorithm declared inside the file must match the one encoded in
the filename.  DSA keys (algorithms 3 and 6) are not supported and fail
fast with a distinct error rather than mis-signing.
 */

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Error;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey};

use crate::dns::rdata::sec::key_tag::calc_key_tag;
use crate::dns::rdata::sec::{
    algorithm_name, DnsSecAlgorithm, ALGO_DSA, ALGO_DSA_NSEC3_SHA1, ALGO_RSASHA1,
    ALGO_RSASHA1_NSEC3_SHA1, ALGO_RSASHA256, ALGO_RSASHA512,
};
use crate::dns::rdata::DNSKEY;
use crate::error::DnsError;
use crate::util;
use base64::Engine as _;

/// A parsed signing key: the signer name and key tag from the filename,
/// the algorithm cross-checked against the file body, and the RSA
/// backend handle.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    name: String,
    algorithm: DnsSecAlgorithm,
    key_tag: u16,
    rsa: RsaPrivateKey,
}

impl PrivateKey {
    pub fn new(name: &str, algorithm: DnsSecAlgorithm, key_tag: u16, rsa: RsaPrivateKey) -> Self {
        Self {
            name: name.to_string(),
            algorithm,
            key_tag,
            rsa,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DnsError::KeyMaterial(format!("bad key path {:?}", path)))?;
        let content = fs::read_to_string(path)
            .map_err(|e| DnsError::KeyMaterial(format!("cannot read {:?}: {}", path, e)))?;
        Self::parse(filename, &content)
    }

    pub fn parse(filename: &str, content: &str) -> Result<Self, Error> {
        let (name, file_algorithm, key_tag) = parse_filename(filename)?;

        let mut fields: HashMap<String, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let (field, value) = line.split_once(':').ok_or_else(|| {
                DnsError::KeyMaterial(format!("bad key file line {:?}", line))
            })?;
            fields.insert(field.trim().to_string(), value.trim().to_string());
        }

        let format = fields
            .get("Private-key-format")
            .ok_or_else(|| DnsError::KeyMaterial("missing Private-key-format".to_string()))?;
        if !format.starts_with("v1.") {
            return Err(Error::new(DnsError::KeyMaterial(format!(
                "unsupported key format {:?}",
                format
            ))));
        }

        let algorithm_field = fields
            .get("Algorithm")
            .ok_or_else(|| DnsError::KeyMaterial("missing Algorithm".to_string()))?;
        let algorithm = algorithm_field
            .split_whitespace()
            .next()
            .and_then(|t| t.parse::<DnsSecAlgorithm>().ok())
            .ok_or_else(|| {
                DnsError::KeyMaterial(format!("bad Algorithm line {:?}", algorithm_field))
            })?;
        if algorithm != file_algorithm {
            return Err(Error::new(DnsError::KeyMaterial(format!(
                "file declares algorithm {} but the filename says {}",
                algorithm, file_algorithm
            ))));
        }

        match algorithm {
            ALGO_RSASHA1 | ALGO_RSASHA1_NSEC3_SHA1 | ALGO_RSASHA256 | ALGO_RSASHA512 => {}
            ALGO_DSA | ALGO_DSA_NSEC3_SHA1 => {
                return Err(Error::new(DnsError::KeyMaterial(format!(
                    "unsupported algorithm {} ({}): DSA signing is not provided",
                    algorithm,
                    algorithm_name(algorithm)
                ))))
            }
            other => {
                return Err(Error::new(DnsError::KeyMaterial(format!(
                    "unsupported algorithm {} ({})",
                    other,
                    algorithm_name(other)
                ))))
            }
        }

        let int_field = |field: &str| -> Result<BigUint, Error> {
            let value = fields.get(field).ok_or_else(|| {
                DnsError::KeyMaterial(format!("missing {} in RSA key file", field))
            })?;
            let bts = util::BASE64_ENGINE
                .decode(value)
                .map_err(|e| DnsError::KeyMaterial(format!("bad base64 in {}: {}", field, e)))?;
            Ok(BigUint::from_bytes_be(&bts))
        };

        let n = int_field("Modulus")?;
        let e = int_field("PublicExponent")?;
        let d = int_field("PrivateExponent")?;
        let p = int_field("Prime1")?;
        let q = int_field("Prime2")?;
        // Exponent1, Exponent2 and Coefficient are recomputed by the
        // backend

        let rsa = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|e| DnsError::KeyMaterial(format!("inconsistent RSA parameters: {}", e)))?;

        Ok(Self {
            name,
            algorithm,
            key_tag,
            rsa,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> DnsSecAlgorithm {
        self.algorithm
    }

    /// The tag from the filename; see [PrivateKey::computed_key_tag]
    /// for the one derived from the key material.
    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn computed_key_tag(&self) -> u16 {
        calc_key_tag(&self.public_dnskey())
    }

    /// The zone-key DNSKEY for this key, public material in the rfc3110
    /// exponent-length form.
    pub fn public_dnskey(&self) -> DNSKEY {
        let e = self.rsa.e().to_bytes_be();
        let n = self.rsa.n().to_bytes_be();
        let mut pub_key = Vec::with_capacity(3 + e.len() + n.len());
        if e.len() < 256 {
            pub_key.push(e.len() as u8);
        } else {
            pub_key.push(0);
            pub_key.extend((e.len() as u16).to_be_bytes());
        }
        pub_key.extend(e);
        pub_key.extend(n);

        let mut dnskey = DNSKEY::new();
        dnskey.with_flag_zone_key(true);
        dnskey.algorithm = self.algorithm;
        dnskey.pub_key = pub_key;
        dnskey
    }

    /// PKCS#1 v1.5 signature under the digest the algorithm number
    /// declares.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match self.algorithm {
            ALGO_RSASHA1 | ALGO_RSASHA1_NSEC3_SHA1 => {
                let signer = rsa::pkcs1v15::SigningKey::<sha1::Sha1>::new(self.rsa.clone());
                let sig = signer
                    .try_sign(data)
                    .map_err(|e| DnsError::Resource(format!("RSA signing failed: {}", e)))?;
                Ok(sig.to_vec())
            }
            ALGO_RSASHA256 => {
                let signer = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(self.rsa.clone());
                let sig = signer
                    .try_sign(data)
                    .map_err(|e| DnsError::Resource(format!("RSA signing failed: {}", e)))?;
                Ok(sig.to_vec())
            }
            ALGO_RSASHA512 => {
                let signer = rsa::pkcs1v15::SigningKey::<sha2::Sha512>::new(self.rsa.clone());
                let sig = signer
                    .try_sign(data)
                    .map_err(|e| DnsError::Resource(format!("RSA signing failed: {}", e)))?;
                Ok(sig.to_vec())
            }
            other => Err(Error::new(DnsError::KeyMaterial(format!(
                "unsupported algorithm {} ({})",
                other,
                algorithm_name(other)
            )))),
        }
    }
}

/// `K<signer>.+<algorithm>.+<keytag>.private`
fn parse_filename(filename: &str) -> Result<(String, DnsSecAlgorithm, u16), Error> {
    let bad = || DnsError::KeyMaterial(format!("bad key filename {:?}", filename));
    let rest = filename
        .strip_prefix('K')
        .and_then(|r| r.strip_suffix(".private"))
        .ok_or_else(bad)?;
    let parts: Vec<&str> = rest.split('+').collect();
    if parts.len() != 3 {
        return Err(Error::new(bad()));
    }
    let name = parts[0].strip_suffix('.').unwrap_or(parts[0]);
    let algorithm = parts[1].parse::<DnsSecAlgorithm>().map_err(|_| bad())?;
    let key_tag = parts[2].parse::<u16>().map_err(|_| bad())?;
    Ok((format!("{}.", name), algorithm, key_tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated_rsa() -> RsaPrivateKey {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 1024).unwrap()
    }

    fn key_file_content(rsa: &RsaPrivateKey, algorithm: u8) -> String {
        use rsa::traits::PrivateKeyParts;
        let b64 = |n: &BigUint| util::BASE64_ENGINE.encode(n.to_bytes_be());
        format!(
            "Private-key-format: v1.2\n\
             Algorithm: {} ({})\n\
             Modulus: {}\n\
             PublicExponent: {}\n\
             PrivateExponent: {}\n\
             Prime1: {}\n\
             Prime2: {}\n",
            algorithm,
            algorithm_name(algorithm),
            b64(rsa.n()),
            b64(rsa.e()),
            b64(rsa.d()),
            b64(&rsa.primes()[0]),
            b64(&rsa.primes()[1]),
        )
    }

    #[test]
    fn test_key_file_parse() {
        let rsa = generated_rsa();
        let content = key_file_content(&rsa, ALGO_RSASHA256);
        let key = PrivateKey::parse("Kexample.com.+008+12345.private", &content).unwrap();
        assert_eq!("example.com.", key.name());
        assert_eq!(ALGO_RSASHA256, key.algorithm());
        assert_eq!(12345, key.key_tag());

        // the derived public key round-trips through the rfc3110 form
        let dnskey = key.public_dnskey();
        assert_eq!(true, dnskey.flag_zone_key());
        assert_eq!(ALGO_RSASHA256, dnskey.algorithm);
        assert_eq!(key.computed_key_tag(), calc_key_tag(&dnskey));
    }

    #[test]
    fn test_key_file_algorithm_mismatch() {
        let rsa = generated_rsa();
        // the file says RSASHA1 while the filename says 008
        let content = key_file_content(&rsa, ALGO_RSASHA1);
        let err = PrivateKey::parse("Kexample.com.+008+12345.private", &content).unwrap_err();
        match err.downcast_ref::<DnsError>() {
            Some(DnsError::KeyMaterial(msg)) => {
                assert_eq!(true, msg.contains("does not match"))
            }
            other => panic!("wrong error kind: {:?}", other),
        }
    }

    #[test]
    fn test_key_file_dsa_rejected() {
        let content = "Private-key-format: v1.2\nAlgorithm: 3 (DSA)\n";
        let err = PrivateKey::parse("Kexample.com.+003+12345.private", content).unwrap_err();
        match err.downcast_ref::<DnsError>() {
            Some(DnsError::KeyMaterial(msg)) => {
                assert_eq!(true, msg.contains("unsupported algorithm 3"))
            }
            other => panic!("wrong error kind: {:?}", other),
        }
    }

    #[test]
    fn test_key_file_bad_filename() {
        assert_eq!(
            true,
            PrivateKey::parse("example.com.+008+1.private", "").is_err()
        );
        assert_eq!(
            true,
            PrivateKey::parse("Kexample.com.+008+1.key", "").is_err()
        );
        assert_eq!(true, PrivateKey::parse("Kexample.com.+008.private", "").is_err());
    }

    #[test]
    fn test_key_file_missing_field() {
        let rsa = generated_rsa();
        let content = key_file_content(&rsa, ALGO_RSASHA256).replace("Modulus", "Modulu");
        assert_eq!(
            true,
            PrivateKey::parse("Kexample.com.+008+1.private", &content).is_err()
        );
    }

    #[test]
    fn test_key_file_sign_produces_modulus_sized_signature() {
        let rsa = generated_rsa();
        let content = key_file_content(&rsa, ALGO_RSASHA256);
        let key = PrivateKey::parse("Kexample.com.+008+12345.private", &content).unwrap();
        let sig = key.sign(b"to be signed").unwrap();
        assert_eq!(128, sig.len());
    }
}
