use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Where the bytes of a candidate file live.
#[derive(Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Content already held in memory (drag-and-drop, tests)
    Memory(Bytes),
    /// Content read lazily from disk
    Path(PathBuf),
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            FileContent::Path(path) => write!(f, "Path({})", path.display()),
        }
    }
}

/// A user-selected file not yet confirmed for upload.
///
/// Immutable once selected; [`CandidateFile::renamed`] produces a copy with a new name
/// sharing the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    byte_size: u64,
    mime_type: String,
    content: FileContent,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            byte_size: data.len() as u64,
            mime_type: mime_type.into(),
            content: FileContent::Memory(data),
        }
    }

    /// `byte_size` is taken from file metadata at selection time.
    pub fn from_path(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
        byte_size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            byte_size,
            mime_type: mime_type.into(),
            content: FileContent::Path(path.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Extension after the last `.`, lowercased. Empty when the name has no dot.
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Whether two files share the identity used for collision detection.
    pub fn same_name_and_size(&self, other: &CandidateFile) -> bool {
        self.name == other.name && self.byte_size == other.byte_size
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Lowercase hexadecimal SHA-256 digest of a file's full content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
