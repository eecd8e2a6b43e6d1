//! Reading the JSON error bodies the reset endpoints send back.

use serde_json::Value;

/// Extract the server's `detail` from a rejection body.
///
/// A body that is not JSON at all is an error; JSON without a usable
/// top-level string `detail` yields `None` so the caller falls back to its
/// own message.
pub(crate) fn parse_rejection(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(value
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.trim().is_empty())
        .map(str::to_string))
}
