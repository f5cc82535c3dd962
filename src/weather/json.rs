//! JSON parsing helper for provider payloads.

/// Deserialize `body`, prefixing any error with the serde path that failed
/// (e.g. `at weather[0].main: invalid type`), so a provider schema drift is
/// diagnosable from a single log line.
pub(crate) fn parse_with_path<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        if path.is_empty() || path == "." {
            err.inner().to_string()
        } else {
            format!("at {path}: {}", err.inner())
        }
    })
}
