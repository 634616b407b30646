/// Directories searched, in order, for external programs.
///
/// Candidates are built by plain concatenation (`prefix + name`), so every
/// entry ends with a slash.
pub const DEFAULT_SEARCH_PATH: [&str; 4] = ["/bin/", "/usr/bin/", "/usr/local/bin/", "./"];

/// Longest command line accepted, in characters. Longer lines are truncated.
pub const MAX_COMMAND_SIZE: usize = 255;

/// Most tokens kept from one command line. The rest of the line is dropped.
pub const MAX_NUM_ARGUMENTS: usize = 32;

/// Prompt printed before every read in interactive mode.
pub const PROMPT: &str = "msh> ";

/// Tunables of a shell session.
///
/// `Default` reproduces the fixed table the shell ships with; tests build
/// their own to point the search path at temporary directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Ordered directory prefixes consulted when resolving external programs.
    pub search_path: Vec<String>,
    /// Maximum characters kept from a single input line.
    pub max_line_len: usize,
    /// Maximum number of tokens kept from a single input line.
    pub max_tokens: usize,
    /// Maximum characters kept from a single token.
    pub max_token_len: usize,
    /// Interactive prompt.
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            search_path: DEFAULT_SEARCH_PATH.iter().map(|p| p.to_string()).collect(),
            max_line_len: MAX_COMMAND_SIZE,
            max_tokens: MAX_NUM_ARGUMENTS,
            max_token_len: MAX_COMMAND_SIZE,
            prompt: PROMPT.to_string(),
        }
    }
}

impl ShellConfig {
    /// Default limits and prompt with a custom search path.
    pub fn with_search_path<I, S>(search_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_path: search_path.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
