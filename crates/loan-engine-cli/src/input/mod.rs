pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a JSON request from `--input` if given, otherwise from piped stdin.
///
/// Returns `None` when neither source supplied anything, so the caller can
/// fall back to building the request from flags.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(file::read_json(p)?)),
        None => stdin::read_stdin(),
    }
}
