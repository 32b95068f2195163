use std::path::Path;
use std::sync::Arc;

use crate::error::SessionError;

const MIDI_EXTENSIONS: [&str; 2] = ["mid", "midi"];

pub fn is_midi_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MIDI_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// A file picked by the user. Immutable once created.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    data: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Reads a `.mid` / `.midi` file from disk.
    pub fn read(path: &Path) -> Result<Self, SessionError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_midi_file_name(&name) {
            return Err(SessionError::UnsupportedFile(name));
        }

        let data = std::fs::read(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn shared_data(&self) -> Arc<[u8]> {
        self.data.clone()
    }
}
