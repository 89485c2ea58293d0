//! YAML export, the human-readable rendition of [`FullExport`]

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Write the full data set as YAML under a short comment header
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;

    let header = format!(
        "# LedgerNote full export\n# Generated: {}\n# App version: {}\n# Contains notes, budget entries and the passcode hash; store it privately.\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| LedgerError::Export(e.to_string()))
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}
