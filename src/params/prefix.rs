/// Namespace prefix handling.
use super::errors::ParamError;
use super::node::PATH_SEP;

/// A prefix normalized to begin and end with the path separator (`/foo/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix(String);

impl Prefix {
    /// Normalize a user-supplied prefix. `foo`, `/foo`, `foo/` and `/foo/` are equal.
    ///
    /// # Errors
    ///
    /// Returns `ParamError::MissingArgument` for an empty (or whitespace-only) prefix.
    pub fn new(raw: &str) -> Result<Self, ParamError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ParamError::MissingArgument("prefix"));
        }
        let mut prefix = String::with_capacity(raw.len() + 2);
        if !raw.starts_with(PATH_SEP) {
            prefix.push(PATH_SEP);
        }
        prefix.push_str(raw);
        if !raw.ends_with(PATH_SEP) {
            prefix.push(PATH_SEP);
        }
        Ok(Self(prefix))
    }

    /// The normalized prefix string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix as a path for `GetParametersByPath`. The root prefix `/` stays `/`,
    /// everything else drops the trailing separator the API does not accept.
    #[must_use]
    pub fn as_query_path(&self) -> &str {
        if self.0.len() > 1 {
            self.0.trim_end_matches(PATH_SEP)
        } else {
            &self.0
        }
    }

    /// Join path segments under this prefix into a fully qualified key.
    #[must_use]
    pub fn key_for<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let mut key = self.0.clone();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                key.push(PATH_SEP);
            }
            key.push_str(segment.as_ref());
        }
        key
    }

    /// Strip this prefix from a fully qualified key, if the key lives under it.
    #[must_use]
    pub fn relative<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.0.as_str())
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
