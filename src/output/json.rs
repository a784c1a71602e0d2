//! JSON config file output.

use crate::processing::RootConfig;
use std::error::Error;
use std::path::Path;

/// Write `root` as pretty JSON to `file`.
///
/// The content goes to a temporary file next to the target first and is then
/// renamed over it, so readers never see a half written config. Missing
/// parent directories are created.
///
/// # Arguments
/// * `file` - Target path, e.g. `output/configMap.json`
/// * `root` - Config in the store layout
pub fn write_root_config(file: &str, root: &RootConfig) -> Result<(), Box<dyn Error>> {
    let path = Path::new(file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating directory {}: {e}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(root)
        .map_err(|e| format!("Error serializing config JSON: {e}"))?;
    let tmp_file = format!("{file}.tmp");
    std::fs::write(&tmp_file, json)
        .map_err(|e| format!("Error writing temp file {tmp_file}: {e}"))?;
    std::fs::rename(&tmp_file, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_file);
        format!("Error moving {tmp_file} to {file}: {e}")
    })?;

    log::info!("Wrote config file: {file}");
    Ok(())
}
