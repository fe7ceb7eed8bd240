//! Field element encoding
//!
//! Every public value in Shroud is a BN254 scalar carried as 32 little-endian
//! bytes. Text form is `0x`-prefixed lowercase hex; the prefix is optional on
//! input.

use std::fmt;
use std::str::FromStr;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::CanonicalDeserialize;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PrivacyError, Result};

/// Encoded length of a field element
pub const FIELD_BYTES: usize = 32;

/// Encode a field element as 32 little-endian bytes
pub fn fr_to_bytes(f: &Fr) -> [u8; FIELD_BYTES] {
    let bytes = f.into_bigint().to_bytes_le();
    let mut arr = [0u8; FIELD_BYTES];
    arr[..bytes.len()].copy_from_slice(&bytes);
    arr
}

/// Decode 32 little-endian bytes, rejecting values at or above the modulus
pub fn canonical_fr(bytes: &[u8; FIELD_BYTES]) -> Option<Fr> {
    Fr::deserialize_compressed(&bytes[..]).ok()
}

/// Parse hex text (optional `0x` prefix) into exactly 32 bytes
pub fn parse_hex32(text: &str) -> Result<[u8; FIELD_BYTES]> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes = hex::decode(digits)
        .map_err(|e| PrivacyError::validation(format!("invalid hex {text:?}: {e}")))?;
    bytes_to_array(&bytes)
}

fn bytes_to_array(bytes: &[u8]) -> Result<[u8; FIELD_BYTES]> {
    bytes.try_into().map_err(|_| {
        PrivacyError::validation(format!(
            "expected {FIELD_BYTES} bytes, got {}",
            bytes.len()
        ))
    })
}

/// A raw public input.
///
/// Unlike [`Commitment`](crate::Commitment) and [`Nullifier`](crate::Nullifier)
/// this accepts any 32 bytes, so a tampered proof still decodes and is
/// rejected by the verifier instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement(pub [u8; FIELD_BYTES]);

impl FieldElement {
    /// Create from field element
    pub fn from_field(f: Fr) -> Self {
        Self(fr_to_bytes(&f))
    }

    /// Convert to field element, `None` if the encoding is not canonical
    pub fn to_field(&self) -> Option<Fr> {
        canonical_fr(&self.0)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; FIELD_BYTES] {
        &self.0
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({self})")
    }
}

impl FromStr for FieldElement {
    type Err = PrivacyError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex32(s).map(Self)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Declares a 32-byte newtype that always holds a canonical field element.
macro_rules! canonical_field_bytes {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $crate::field::FIELD_BYTES]);

        impl $name {
            /// Create from field element
            pub fn from_field(f: ::ark_bn254::Fr) -> Self {
                Self($crate::field::fr_to_bytes(&f))
            }

            /// Convert to field element
            pub fn to_field(&self) -> ::ark_bn254::Fr {
                ::ark_ff::PrimeField::from_le_bytes_mod_order(&self.0)
            }

            /// Get raw bytes
            pub fn as_bytes(&self) -> &[u8; $crate::field::FIELD_BYTES] {
                &self.0
            }

            /// Create from raw bytes, checking length and canonical encoding
            pub fn from_slice(bytes: &[u8]) -> $crate::error::Result<Self> {
                let arr: [u8; $crate::field::FIELD_BYTES] = bytes.try_into().map_err(|_| {
                    $crate::error::PrivacyError::Validation(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $crate::field::FIELD_BYTES,
                        bytes.len()
                    ))
                })?;
                Self::from_bytes(arr)
            }

            /// Create from a fixed-size array, checking canonical encoding
            pub fn from_bytes(bytes: [u8; $crate::field::FIELD_BYTES]) -> $crate::error::Result<Self> {
                match $crate::field::canonical_fr(&bytes) {
                    Some(_) => Ok(Self(bytes)),
                    None => Err($crate::error::PrivacyError::Validation(format!(
                        "{} is not a canonical field element",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<$name> for $crate::field::FieldElement {
            fn from(value: $name) -> Self {
                $crate::field::FieldElement(value.0)
            }
        }

        impl PartialEq<$crate::field::FieldElement> for $name {
            fn eq(&self, other: &$crate::field::FieldElement) -> bool {
                self.0 == other.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "0x{}", ::hex::encode(self.0))
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::PrivacyError;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                Self::from_bytes($crate::field::parse_hex32(s)?)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let text = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use canonical_field_bytes;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_prefix_optional() {
        let a = parse_hex32(&format!("0x{}", "11".repeat(32))).unwrap();
        let b = parse_hex32(&"11".repeat(32)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, [0x11; 32]);
    }

    #[test]
    fn test_parse_hex_wrong_length() {
        let err = parse_hex32("0xabcd").unwrap_err();
        assert!(matches!(err, PrivacyError::Validation(_)));
    }

    #[test]
    fn test_canonical_check() {
        // 0xff.. is far above the BN254 scalar modulus
        assert!(canonical_fr(&[0xff; 32]).is_none());
        assert!(canonical_fr(&[0x01; 32]).is_some());

        let f = Fr::from(123_456_789u64);
        assert_eq!(canonical_fr(&fr_to_bytes(&f)), Some(f));
    }

    #[test]
    fn test_field_element_accepts_non_canonical() {
        let fe: FieldElement = format!("0x{}", "ff".repeat(32)).parse().unwrap();
        assert!(fe.to_field().is_none());
    }
}
