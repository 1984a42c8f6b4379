use crate::errors::Result;
use std::path::Path;

/// Write PNG bytes to a path, creating parent directories as needed.
/// An existing file at the path is overwritten.
pub async fn save_to_file(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Byte-level similarity of two same-sized screenshots, 0.0 to 1.0.
/// Rough, but enough to eyeball whether the page actually changed.
pub fn similarity(a: &[u8], b: &[u8]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let different = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
    1.0 - (different as f64 / a.len() as f64)
}
