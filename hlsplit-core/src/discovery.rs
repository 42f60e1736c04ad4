//! File discovery for batch splitting.
//!
//! Only the top level of a directory is scanned. A file qualifies when its
//! extension is one of the recognised video containers, compared without
//! regard to case.

use crate::error::{CoreError, CoreResult};
use crate::media::is_video_path;

use std::path::{Path, PathBuf};

/// Finds video files in `input_dir`, sorted by path.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - the discovered files
/// * `Err(CoreError::Io)` - if the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - if nothing qualifies
///
/// # Examples
///
/// ```rust,no_run
/// use hlsplit_core::find_processable_files;
/// use std::path::Path;
///
/// for file in find_processable_files(Path::new("/srv/uploads"))? {
///     println!("{}", file.display());
/// }
/// # Ok::<(), hlsplit_core::CoreError>(())
/// ```
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && is_video_path(&path)).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }
    files.sort();
    Ok(files)
}
