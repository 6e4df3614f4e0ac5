//! Alert fingerprint: a 256-bit digest over the normalized identity tuple,
//! used for deduplication and for per-fingerprint ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::alert::AlertType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(#[serde(with = "hex_bytes")] [u8; 32]);

impl Fingerprint {
    /// Digests `{type, source_ip, destination_ip, file_hash, url, asset_id,
    /// user_name}` with empty fields elided, so two alerts that differ only
    /// in which optional fields are absent still collide if every present
    /// field matches.
    pub fn compute(
        alert_type: AlertType,
        source_ip: Option<&str>,
        destination_ip: Option<&str>,
        file_hash: Option<&str>,
        url: Option<&str>,
        asset_id: Option<&str>,
        user_name: Option<&str>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", alert_type).as_bytes());
        for field in [source_ip, destination_ip, file_hash, url, asset_id, user_name] {
            hasher.update(b"|");
            if let Some(value) = field.filter(|v| !v.is_empty()) {
                hasher.update(value.trim().to_ascii_lowercase().as_bytes());
            }
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Fingerprint(bytes)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let raw = String::deserialize(deserializer)?;
        let decoded = hex::decode(&raw).map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("fingerprint must be 32 bytes"))
    }
}
