use crate::foundation::error::{SubburnError, SubburnResult};
use crate::model::style::Style;
use crate::model::track::Track;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Persisted editing state: everything needed to re-render or resume editing.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// BCP-47-ish language code of the subtitle text.
    #[serde(default = "default_language")]
    pub language: String,
    /// Global style for every segment.
    #[serde(default)]
    pub style: Style,
    /// Segment track; validated on load.
    pub segments: Track,
}

fn default_language() -> String {
    "en".to_owned()
}

impl Document {
    /// Bundle a track and style.
    pub fn new(language: impl Into<String>, style: Style, segments: Track) -> Self {
        Self {
            language: language.into(),
            style,
            segments,
        }
    }

    /// Load and validate a document from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SubburnResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SubburnError::validation(format!("open document JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load and validate a document from JSON.
    pub fn from_reader(r: impl Read) -> SubburnResult<Self> {
        let doc: Self = serde_json::from_reader(r)
            .map_err(|e| SubburnError::serde(format!("parse document JSON: {e}")))?;
        doc.style.validate()?;
        Ok(doc)
    }

    /// Write the document as pretty JSON.
    pub fn to_writer(&self, w: impl Write) -> SubburnResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| SubburnError::serde(format!("write document JSON: {e}")))
    }

    /// Write the document to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> SubburnResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let f = File::create(path)?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
