// File: src/persistence.rs
use crate::core::engine::SuggestIndex;
use crate::error::Result;
use crate::proto::SuggestData;
use prost::Message;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Writes the artifact atomically: encode into a temp file next to `path`,
/// then rename it over the destination.
pub fn save_suggest(data: &SuggestData, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let bytes = data.encode_to_vec();
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), bytes = bytes.len(), items = data.items.len(), "saved suggest artifact");
    Ok(())
}

/// Reads and validates an artifact written by [`save_suggest`].
pub fn load_suggest(path: &Path) -> Result<SuggestIndex> {
    let bytes = fs::read(path)?;
    let index = SuggestIndex::from_bytes(&bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), items = index.item_count(), "loaded suggest artifact");
    Ok(index)
}
