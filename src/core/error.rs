use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Arity,
    Type,
    Encoding,
    Allocation,
    Engine,
    Contract,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an engine-reported failure. The text is opaque to the adapter
    /// and must survive to the host verbatim.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Engine, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Bare message, without the kind prefix `Display` adds. Embeddings use
    /// this when raising host-native errors so engine text stays byte-exact.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Engine text passes through untouched; everything else is labeled.
        if self.kind == ErrorKind::Engine {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?}: {}", self.kind, self.message)
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Stable kind codes for the exported C surface.
pub fn to_abi_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Arity => 1,
        ErrorKind::Type => 2,
        ErrorKind::Encoding => 3,
        ErrorKind::Allocation => 4,
        ErrorKind::Engine => 5,
        ErrorKind::Contract => 6,
    }
}
