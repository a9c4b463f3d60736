//! Impulse-response directory loading.

use std::io::Cursor;
use std::path::Path;

use earshot_engine::ImpulseLibrary;
use hound::WavReader;

use crate::Result;

/// Collect every `*.wav` file in `dir` into an [`ImpulseLibrary`] keyed by
/// file stem (`sedan_cabin.wav` becomes `sedan_cabin`).
///
/// Files whose header does not parse are skipped with a warning; the
/// engine would reject them anyway. Subdirectories are not searched.
pub fn load_impulse_library<P: AsRef<Path>>(dir: P) -> Result<ImpulseLibrary> {
    let dir = dir.as_ref();
    let mut library = ImpulseLibrary::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    entries.sort();

    for path in entries {
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping impulse with non-UTF-8 name");
            continue;
        };

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable impulse");
                continue;
            }
        };

        if let Err(err) = WavReader::new(Cursor::new(bytes.as_slice())) {
            tracing::warn!(path = %path.display(), error = %err, "skipping invalid impulse");
            continue;
        }

        tracing::debug!(key, bytes = bytes.len(), "loaded impulse response");
        library.insert(key, bytes);
    }

    Ok(library)
}
