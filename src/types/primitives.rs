// Primitives GovParam - Types fondamentaux minimaux
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Hash universel (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash des données avec Blake3
    pub fn hash(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Hash(*hash.as_bytes())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

/// Numéro de bloc (u64 = ~584 milliards d'années à 1 bloc/sec)
pub type BlockNumber = u64;

/// Identifiant d'un paramètre, choisi par l'appelant à la création
pub type ParamId = u16;

/// Encoded parameter value.
///
/// The store never interprets these bytes: integers, ratios, addresses and
/// flags are all encoded by the caller before `add_param`/`set_param` and
/// decoded after `get_param`. Human-readable formats carry the value as a
/// `0x`-prefixed hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParamValue(Vec<u8>);

impl ParamValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        ParamValue(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a hex string, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits).map(ParamValue)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(bytes: Vec<u8>) -> Self {
        ParamValue(bytes)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(bytes: &[u8]) -> Self {
        ParamValue(bytes.to_vec())
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            ParamValue::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer).map(ParamValue)
        }
    }
}
