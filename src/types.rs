use serde::Deserialize;

/// What to do when a download answers with a non-2xx status.
///
/// - `Ignore`: log a warning and keep the body as the binary's content
///   (default, matches the historical behaviour of this tool).
/// - `Fail`: treat the status as a fetch error before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpStatusPolicy {
    #[default]
    Ignore,
    Fail,
}
