use log::debug;
use std::path::{Path, PathBuf};

use crate::errors::RunError;
use crate::file_utils::FileManager;
use crate::path_tokens::PathResolver;

// @module: Resolving script references to files

/// Resolve a script reference to exactly one file.
///
/// Tried in order: the reference as given, the reference relative to `cwd`,
/// then every existing autoload directory. Autoload directories are all
/// checked and the last one containing the reference wins.
pub fn find_script<'a, I>(
    reference: &str,
    cwd: &Path,
    autoload: I,
    paths: &PathResolver,
) -> Result<PathBuf, RunError>
where
    I: IntoIterator<Item = &'a str>,
{
    let direct = PathBuf::from(reference);
    if FileManager::file_exists(&direct) {
        return Ok(direct);
    }

    let relative = cwd.join(reference);
    if FileManager::file_exists(&relative) {
        return Ok(relative);
    }

    let mut found = None;
    for entry in autoload {
        let dir = paths.decode(entry);
        if !FileManager::dir_exists(&dir) {
            continue;
        }
        let candidate = dir.join(reference);
        if FileManager::file_exists(&candidate) {
            debug!("Found {} in autoload directory {:?}", reference, dir);
            found = Some(candidate);
        }
    }

    found.ok_or_else(|| RunError::ScriptNotFound {
        reference: reference.to_string(),
    })
}
