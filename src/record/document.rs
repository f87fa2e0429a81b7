// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use serde_json::Value;
use uuid::Uuid;

use crate::error::RecordError;

use super::show::ShowRecord;

/// The raw metadata record, kept as a JSON value so that a rewrite preserves
/// every key in its original insertion order (serde_json is built with
/// `preserve_order`). The typed [`ShowRecord`] model is derived from this and
/// never written back; the only mutation that persists is GUID minting.
#[derive(Debug, Clone)]
pub struct RecordDocument {
    path: PathBuf,
    value: Value,
}

impl RecordDocument {
    /// Load and parse the metadata record from disk
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let content = std::fs::read_to_string(path).map_err(|e| RecordError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|e| RecordError::ParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            value,
        })
    }

    /// Deserialize the typed show model from the document
    pub fn show(&self) -> Result<ShowRecord, RecordError> {
        serde_json::from_value(self.value.clone()).map_err(|e| RecordError::ParseFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// The directory the record file lives in, used to resolve relative
    /// source paths (cover image sources, template sources)
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Mint a v4 GUID for every episode that lacks one. Returns the number of
    /// GUIDs added; episodes that already carry a GUID are never touched, so
    /// running this twice is a no-op the second time.
    pub fn add_missing_guids(&mut self) -> Result<usize, RecordError> {
        let episodes = self
            .value
            .get_mut("episodes")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| RecordError::MalformedRecord {
                path: self.path.clone(),
                reason: "'episodes' is missing or not a list".to_string(),
            })?;

        let mut added = 0;
        for episode in episodes {
            let object = episode
                .as_object_mut()
                .ok_or_else(|| RecordError::MalformedRecord {
                    path: self.path.clone(),
                    reason: "episode entry is not an object".to_string(),
                })?;

            if !object.contains_key("guid") {
                object.insert(
                    "guid".to_string(),
                    Value::String(Uuid::new_v4().to_string()),
                );
                added += 1;
            }
        }

        Ok(added)
    }

    /// Persist the document atomically: serialize to a sibling `.partial`
    /// path, then rename over the original. A failure mid-write leaves the
    /// original record untouched.
    pub fn save(&self) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(&self.value)?;

        let mut partial = self.path.clone();
        partial.as_mut_os_string().push(".partial");

        std::fs::write(&partial, json).map_err(|e| RecordError::WriteFailed {
            path: partial.clone(),
            source: e,
        })?;

        if let Err(e) = std::fs::rename(&partial, &self.path) {
            let _ = std::fs::remove_file(&partial);
            return Err(RecordError::WriteFailed {
                path: self.path.clone(),
                source: e,
            });
        }

        Ok(())
    }
}
