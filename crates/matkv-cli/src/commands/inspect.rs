//! inspect command - describe an encoded array file

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use matkv_codec::{decode, PayloadHeader, HEADER_LEN};

/// Print the header of `file` and whether the payload decodes
pub async fn execute(file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    println!("{}", describe(&bytes)?);

    if let Err(e) = decode(&bytes) {
        println!("{} {}", style("[INVALID]").red(), e);
    } else {
        println!("{} payload decodes", style("[OK]").green());
    }
    Ok(())
}

fn describe(bytes: &[u8]) -> Result<String> {
    let header = PayloadHeader::decode(&mut &bytes[..]).context("Not an encoded array")?;
    let element = match header.element() {
        Ok(element) => element.to_string(),
        Err(_) => format!("unknown ({})", header.element_tag),
    };

    Ok(format!(
        "  Width:        {}\n  Height:       {}\n  Element:      {} (tag {})\n  Declared:     {} bytes\n  Body:         {} bytes",
        header.width,
        header.height,
        element,
        header.element_tag,
        header.size,
        bytes.len() - HEADER_LEN
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matkv_codec::{encode, ArrayValue, ElementType};

    #[test]
    fn test_describe_valid_payload() {
        let value = ArrayValue::zeros(4, 3, ElementType::F32C1).unwrap();
        let payload = encode(&value).unwrap();

        let text = describe(payload.as_bytes()).unwrap();
        assert!(text.contains("Width:        4"));
        assert!(text.contains("Declared:     48 bytes"));
        assert!(text.contains(&format!("tag {}", ElementType::F32C1.tag())));
    }

    #[test]
    fn test_describe_unknown_tag() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[8..12].copy_from_slice(&99i32.to_le_bytes());

        let text = describe(&bytes).unwrap();
        assert!(text.contains("unknown (99)"));
    }

    #[test]
    fn test_describe_short_file() {
        assert!(describe(b"abc").is_err());
    }

    #[tokio::test]
    async fn test_execute_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute(&dir.path().join("nope.mat")).await.is_err());
    }
}
