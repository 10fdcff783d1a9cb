use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Version parsing error: {0}")]
    Version(#[from] semver::Error),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Checksum mismatch for {url}\n\
             Expected: {expected}\n\
             Computed: {actual}\n\n\
             Hint: The download was discarded and nothing was extracted.\n\
             Retry the download; if it keeps failing the manifest or the mirror is stale.")]
    Integrity {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Download of {url} failed: HTTP {status}")]
    Download { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::SchemaViolation`] with a formatted message
    pub fn schema(message: impl Into<String>) -> Self {
        Error::SchemaViolation(message.into())
    }
}
