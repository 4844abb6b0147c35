//! Generation options and configuration.

/// Options for generating documents.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Error handling mode for malformed loop markers
    pub error_mode: ErrorMode,

    /// Whether to mark the output read-only
    pub read_only: bool,

    /// Whether to substitute single values in headers and footers
    pub headers_footers: bool,
}

impl GenerateOptions {
    /// Create new generate options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable strict mode (malformed markers abort generation).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable lenient mode (malformed markers are left as literal text).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable read-only output.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Enable or disable header and footer substitution.
    pub fn with_headers_footers(mut self, enabled: bool) -> Self {
        self.headers_footers = enabled;
        self
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            read_only: false,
            headers_footers: true,
        }
    }
}

/// Error handling mode for malformed templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any malformed marker
    Strict,
    /// Leave malformed markers as literal text and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = GenerateOptions::default();
        assert_eq!(opts.error_mode, ErrorMode::Lenient);
        assert!(!opts.read_only);
        assert!(opts.headers_footers);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = GenerateOptions::new()
            .strict()
            .with_read_only(true)
            .with_headers_footers(false);

        assert_eq!(opts.error_mode, ErrorMode::Strict);
        assert!(opts.read_only);
        assert!(!opts.headers_footers);
    }
}
