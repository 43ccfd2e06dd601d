/// Chunk name used when the caller does not supply one.
pub const DEFAULT_CHUNK_NAME: &str = "<unknown>";

/// Nesting limit for blocks and expressions.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Settings for a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub chunk_name: String,
    pub max_depth: usize,
    pub skip_shebang: bool,
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_name: DEFAULT_CHUNK_NAME.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            skip_shebang: false,
        }
    }

    /// Name attached to every error from this parse.
    #[must_use]
    pub fn chunk_name(mut self, name: impl Into<String>) -> Self {
        self.chunk_name = name.into();
        self
    }

    /// Maximum nesting of blocks and expressions.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Ignore a first line starting with `#`.
    #[must_use]
    pub const fn skip_shebang(mut self, skip: bool) -> Self {
        self.skip_shebang = skip;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
