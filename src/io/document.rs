//! Read/write the indicators JSON document.
//!
//! The document is the "portable" output of a run: run metadata plus one
//! record per configured indicator. It is written atomically (temp file in
//! the target directory, then rename) so a crashed run never leaves a
//! half-written document for downstream consumers.

use std::fs::{self, File};
use std::path::Path;

use crate::domain::OutputDocument;
use crate::error::{ErrorKind, PipelineError};

/// Write the document atomically.
pub fn write_document(path: &Path, doc: &OutputDocument) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            PipelineError::new(
                ErrorKind::Configuration,
                format!("Failed to create output directory '{}': {e}", parent.display()),
            )
        })?;
    }

    let tmp = path.with_extension("tmp");
    let file = File::create(&tmp).map_err(|e| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Failed to create '{}': {e}", tmp.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, doc).map_err(|e| {
        PipelineError::new(
            ErrorKind::Validation,
            format!("Failed to write document JSON: {e}"),
        )
    })?;

    fs::rename(&tmp, path).map_err(|e| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Failed to move document into place at '{}': {e}", path.display()),
        )
    })
}

/// Read a previously written document.
pub fn read_document(path: &Path) -> Result<OutputDocument, PipelineError> {
    let file = File::open(path).map_err(|e| {
        PipelineError::new(
            ErrorKind::Configuration,
            format!("Failed to open document '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(file).map_err(|e| {
        PipelineError::new(ErrorKind::Parse, format!("Invalid document JSON: {e}"))
    })
}
