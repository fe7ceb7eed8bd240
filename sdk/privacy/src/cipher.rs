//! Note value sealing
//!
//! Encrypts a note value under a shared secret using HKDF-SHA256 +
//! ChaCha20-Poly1305.
//!
//! ```text
//! Flow:
//! 1. Shared secret = HKDF(ECDH(sk, peer_pk), "shroud-shared-v1")   (or caller KDF output)
//! 2. Value key     = HKDF(shared_secret, "shroud-note-value-v1")
//! 3. Ciphertext    = ChaCha20-Poly1305(key, nonce, value_le_bytes, aad = version)
//! 4. Output        = (version, nonce, ciphertext, tag)
//! ```
//!
//! The plaintext is always 8 bytes, so ciphertext length reveals nothing
//! about the magnitude of the value.

use std::fmt;

use chacha20poly1305::aead::rand_core::{OsRng, RngCore};
use chacha20poly1305::{
    ChaCha20Poly1305,
    aead::{Aead, KeyInit, Payload},
};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{PrivacyError, Result};

pub const SEALED_VALUE_VERSION_V1: u8 = 1;

const SHARED_SECRET_INFO: &[u8] = b"shroud-shared-v1";
const VALUE_KEY_INFO: &[u8] = b"shroud-note-value-v1";
const AAD_DOMAIN: &[u8] = b"shroud-note-value";
const TAG_LEN: usize = 16;
const VALUE_LEN: usize = 8;

/// 32 bytes of key-derivation output shared by sender and recipient.
///
/// Never built from a passphrase: either run an X25519 exchange through
/// [`SharedSecret::from_diffie_hellman`] or hand in the output of another KDF.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Wrap bytes that already are the output of a key-derivation function
    pub fn from_kdf_output(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// X25519 + HKDF-SHA256
    pub fn from_diffie_hellman(my_secret: &StaticSecret, their_pub: &PublicKey) -> Result<Self> {
        let shared = my_secret.diffie_hellman(their_pub);
        if !shared.was_contributory() {
            return Err(PrivacyError::KeyDerivation);
        }
        expand(shared.as_bytes(), SHARED_SECRET_INFO).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// An authenticated, encrypted note value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedValue {
    pub version: u8,
    #[serde(with = "hex::serde")]
    pub nonce: [u8; 12],
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub tag: [u8; TAG_LEN],
}

fn expand(ikm: &[u8], info: &[u8]) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm)
        .map_err(|_| PrivacyError::KeyDerivation)?;
    Ok(okm)
}

fn value_cipher(secret: &SharedSecret) -> Result<ChaCha20Poly1305> {
    let key = expand(secret.as_bytes(), VALUE_KEY_INFO)?;
    Ok(ChaCha20Poly1305::new(&key.into()))
}

fn aad(version: u8) -> Vec<u8> {
    let mut aad = Vec::with_capacity(1 + AAD_DOMAIN.len());
    aad.push(version);
    aad.extend_from_slice(AAD_DOMAIN);
    aad
}

/// Encrypt a note value for whoever holds `secret`
pub fn seal_value(value: u64, secret: &SharedSecret) -> Result<SealedValue> {
    let cipher = value_cipher(secret)?;

    let mut nonce = [0u8; 12];
    OsRng.fill_bytes(&mut nonce);

    let aad = aad(SEALED_VALUE_VERSION_V1);
    let encrypted = cipher
        .encrypt(
            &nonce.into(),
            Payload {
                msg: &value.to_le_bytes(),
                aad: &aad,
            },
        )
        .map_err(|_| PrivacyError::Encryption)?;

    let split = encrypted.len() - TAG_LEN;
    let (ciphertext, tag) = encrypted.split_at(split);
    let tag: [u8; TAG_LEN] = tag.try_into().map_err(|_| PrivacyError::Encryption)?;

    Ok(SealedValue {
        version: SEALED_VALUE_VERSION_V1,
        nonce,
        ciphertext: ciphertext.to_vec(),
        tag,
    })
}

/// Decrypt a sealed value.
///
/// Fails with [`PrivacyError::Authentication`] when the tag does not verify;
/// no plaintext is produced in that case.
pub fn open_value(sealed: &SealedValue, secret: &SharedSecret) -> Result<u64> {
    let cipher = value_cipher(secret)?;

    let mut combined = sealed.ciphertext.clone();
    combined.extend_from_slice(&sealed.tag);

    let aad = aad(sealed.version);
    let plaintext = cipher
        .decrypt(
            &sealed.nonce.into(),
            Payload {
                msg: &combined,
                aad: &aad,
            },
        )
        .map_err(|_| {
            tracing::debug!("sealed value rejected: tag mismatch");
            PrivacyError::Authentication
        })?;

    let bytes: [u8; VALUE_LEN] = plaintext.as_slice().try_into().map_err(|_| {
        PrivacyError::validation(format!(
            "sealed value plaintext is {} bytes, expected {VALUE_LEN}",
            plaintext.len()
        ))
    })?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(byte: u8) -> SharedSecret {
        SharedSecret::from_kdf_output([byte; 32])
    }

    #[test]
    fn test_seal_open_boundaries() {
        let k = secret(1);
        for value in [0, 1, 100, u64::MAX] {
            let sealed = seal_value(value, &k).unwrap();
            assert_eq!(open_value(&sealed, &k).unwrap(), value);
        }
    }

    #[test]
    fn test_ciphertext_length_is_constant() {
        let k = secret(1);
        let small = seal_value(0, &k).unwrap();
        let large = seal_value(u64::MAX, &k).unwrap();
        assert_eq!(small.ciphertext.len(), VALUE_LEN);
        assert_eq!(large.ciphertext.len(), VALUE_LEN);
    }

    #[test]
    fn test_nonce_is_fresh() {
        let k = secret(1);
        let a = seal_value(5, &k).unwrap();
        let b = seal_value(5, &k).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal_value(1000, &secret(1)).unwrap();
        assert_eq!(
            open_value(&sealed, &secret(2)),
            Err(PrivacyError::Authentication)
        );
    }

    #[test]
    fn test_tampering_fails() {
        let k = secret(3);
        let sealed = seal_value(42, &k).unwrap();

        let mut flipped = sealed.clone();
        flipped.ciphertext[0] ^= 0x01;
        assert_eq!(open_value(&flipped, &k), Err(PrivacyError::Authentication));

        let mut flipped = sealed.clone();
        flipped.tag[15] ^= 0x80;
        assert_eq!(open_value(&flipped, &k), Err(PrivacyError::Authentication));

        let mut flipped = sealed.clone();
        flipped.nonce[0] ^= 0x01;
        assert_eq!(open_value(&flipped, &k), Err(PrivacyError::Authentication));

        let mut flipped = sealed;
        flipped.version = 2;
        assert_eq!(open_value(&flipped, &k), Err(PrivacyError::Authentication));
    }

    #[test]
    fn test_diffie_hellman_agreement() {
        let alice = StaticSecret::random_from_rng(OsRng);
        let bob = StaticSecret::random_from_rng(OsRng);

        let k1 = SharedSecret::from_diffie_hellman(&alice, &PublicKey::from(&bob)).unwrap();
        let k2 = SharedSecret::from_diffie_hellman(&bob, &PublicKey::from(&alice)).unwrap();
        assert_eq!(k1, k2);

        let sealed = seal_value(77, &k1).unwrap();
        assert_eq!(open_value(&sealed, &k2).unwrap(), 77);
    }

    #[test]
    fn test_low_order_point_rejected() {
        let me = StaticSecret::random_from_rng(OsRng);
        let identity = PublicKey::from([0u8; 32]);
        assert_eq!(
            SharedSecret::from_diffie_hellman(&me, &identity),
            Err(PrivacyError::KeyDerivation)
        );
    }
}
