//! Rewrite error types.

/// Error for a single tag that could not be rewritten.
///
/// Rewriting never aborts on these: the offending tag is left as-is and the
/// error is reported alongside the rewritten output.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Image tag without the mandatory `src` attribute.
    #[error("Image tag without src attribute: {tag}")]
    MalformedMarkup {
        /// Original tag text.
        tag: String,
    },
    /// Reference value that cannot be resolved (e.g. an empty `src`).
    #[error("Unresolvable reference in: {tag}")]
    InvalidReference {
        /// Original tag text.
        tag: String,
    },
}
