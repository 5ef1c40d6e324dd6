//! On-disk layout of a binary export: `<document dir>/animation_export/{base}.bin`
//! and `{base}.js`. Files are only created once the buffer and descriptor text
//! are fully assembled.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::packing::MatrixBuffer;
use crate::serialize::binary::write_matrix_buffer;

pub const EXPORT_DIR_NAME: &str = "animation_export";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePaths {
    pub binary: PathBuf,
    pub script: PathBuf,
}

/// Export directory next to the saved document.
pub fn export_dir(document_path: &Path) -> PathBuf {
    document_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(EXPORT_DIR_NAME)
}

pub fn write_bundle(
    dir: &Path,
    base_filename: &str,
    buffer: &MatrixBuffer,
    script: &str,
) -> Result<BundlePaths> {
    fs::create_dir_all(dir)?;
    let binary = dir.join(format!("{base_filename}.bin"));
    let script_path = dir.join(format!("{base_filename}.js"));

    let bytes = write_matrix_buffer(buffer, BufWriter::new(fs::File::create(&binary)?))?;
    debug!(path = %binary.display(), bytes, "wrote matrix payload");

    let mut out = BufWriter::new(fs::File::create(&script_path)?);
    out.write_all(script.as_bytes())?;
    out.flush()?;
    debug!(path = %script_path.display(), "wrote descriptor script");

    Ok(BundlePaths {
        binary,
        script: script_path,
    })
}
