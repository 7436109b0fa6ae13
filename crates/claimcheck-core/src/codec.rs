//! # Pointer Codec (C1)
//!
//! Encodes/decodes the `{container, key}` pointer record to/from the
//! textual body placed on the wire in place of an offloaded payload. The
//! wire form must stay recognisable to a legacy consumer, so the two field
//! labels (`containerName`, `blobName`) are fixed and extra fields on
//! decode are ignored for forward compatibility.

use shared_types::{PointerCodecError, PointerRecord};

/// Encode a pointer record as its on-wire body.
pub fn encode(pointer: &PointerRecord) -> Vec<u8> {
    // `PointerRecord`'s `Serialize` impl already renames the fields to
    // `containerName`/`blobName`; a plain `serde_json::to_vec` never fails
    // for this type, so unwrap is safe.
    serde_json::to_vec(pointer).expect("PointerRecord serialization cannot fail")
}

/// Decode a pointer record from a wire body.
///
/// Fails if the body is not valid UTF-8 JSON, if either field is missing,
/// or if either field is empty/whitespace-only. Extra fields are ignored.
pub fn decode(body: &[u8]) -> Result<PointerRecord, PointerCodecError> {
    let pointer: PointerRecord =
        serde_json::from_slice(body).map_err(|err| PointerCodecError::Malformed {
            reason: err.to_string(),
        })?;

    if pointer.container.trim().is_empty() {
        return Err(PointerCodecError::EmptyField { field: "container" });
    }
    if pointer.key.trim().is_empty() {
        return Err(PointerCodecError::EmptyField { field: "key" });
    }

    Ok(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_well_formed_pointers() {
        let pointer = PointerRecord::new("payloads", "prefix/abc-123");
        let decoded = decode(&encode(&pointer)).unwrap();
        assert_eq!(decoded, pointer);
    }

    #[test]
    fn ignores_unknown_fields_on_decode() {
        let body = br#"{"containerName":"c","blobName":"k","extra":"ignored"}"#;
        let pointer = decode(body).unwrap();
        assert_eq!(pointer, PointerRecord::new("c", "k"));
    }

    #[test]
    fn rejects_missing_fields() {
        let body = br#"{"containerName":"c"}"#;
        assert!(decode(body).is_err());
    }

    #[test]
    fn rejects_empty_container() {
        let body = br#"{"containerName":"  ","blobName":"k"}"#;
        assert!(matches!(
            decode(body),
            Err(PointerCodecError::EmptyField { field: "container" })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(decode(b"not json").is_err());
    }
}
