//! Filesystem baseline
//!
//! Stores one encoded array per file. Used as the reference path when timing
//! the key-value round trip.

use std::path::Path;

use matkv_codec::{decode, encode, ArrayValue};

use crate::error::{StoreError, StoreResult};

/// Write `value` to `path`, replacing any existing file
pub async fn save_array(path: impl AsRef<Path>, value: &ArrayValue) -> StoreResult<()> {
    let path = path.as_ref();
    let payload = encode(value).map_err(|source| StoreError::InvalidInput {
        key: path.display().to_string(),
        source,
    })?;
    tokio::fs::write(path, payload.as_bytes()).await?;
    Ok(())
}

/// Read and decode the array stored at `path`
pub async fn load_array(path: impl AsRef<Path>) -> StoreResult<ArrayValue> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    decode(&bytes).map_err(|source| StoreError::MalformedPayload {
        key: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matkv_codec::ElementType;

    #[tokio::test]
    async fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame0.mat");
        let value = ArrayValue::filled(5, 4, ElementType::U8C3, 200).unwrap();

        save_array(&path, &value).await.unwrap();
        assert_eq!(load_array(&path).await.unwrap(), value);
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.jpg");
        tokio::fs::write(&path, b"\xff\xd8\xff\xe0").await.unwrap();

        let err = load_array(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_array(dir.path().join("nope.mat")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
