//! Binary data payloads carried by `DATA` parameters and commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const METADATA_FILE_NAME: &str = "File-Name";
pub const METADATA_CONTENT_TYPE: &str = "Content-Type";

/// A blob with free-form metadata and an optional SHA-256 digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPayload {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digest: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<u8>,
}

impl DataPayload {
    /// Complete single-message payload for a named file.
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_FILE_NAME.to_string(), file_name.into());
        metadata.insert(METADATA_CONTENT_TYPE.to_string(), content_type.into());
        Self {
            metadata,
            digest: sha256_digest(&payload),
            payload,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get(METADATA_FILE_NAME).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata.get(METADATA_CONTENT_TYPE).map(String::as_str)
    }

    /// True when no digest is attached or the attached one matches the bytes.
    pub fn verify_digest(&self) -> bool {
        self.digest.is_empty() || self.digest == sha256_digest(&self.payload)
    }
}

pub fn sha256_digest(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}
