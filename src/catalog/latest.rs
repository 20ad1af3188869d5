use serde::Deserialize;

/// Parsed contents of a `latest.json` pointer.
///
/// Only `version` is read; any other fields the publisher writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestPointer {
    pub version: String,
}

impl LatestPointer {
    /// Parse a pointer from raw bytes.
    ///
    /// Fails on malformed JSON, a missing `version`, a non-string `version`
    /// or an empty one.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let pointer: LatestPointer = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        if pointer.version.trim().is_empty() {
            return Err("field `version` is empty".to_string());
        }
        Ok(pointer)
    }
}

/// Build the canonical root-mounted path `/<kind>/<id>/<version>/<file>`.
///
/// `kind`, `id` and `version` are percent-encoded as single segments. `file`
/// keeps its slashes and each of its segments is encoded on its own.
pub fn canonical_path(kind: &str, id: &str, version: &str, file: &str) -> String {
    let file = file
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "/{}/{}/{}/{}",
        urlencoding::encode(kind),
        urlencoding::encode(id),
        urlencoding::encode(version),
        file
    )
}
