//! Reading and writing native agent directories.

use std::fs;
use std::path::Path;

use dialogflow_model::NativeFile;
use dialogflow_model::native::{ENTITIES_DIR, INTENTS_DIR};
use tracing::{debug, warn};

/// Collect `intents/*.json` and `entities/*.json` below `root`, sorted by path.
/// Files that are not valid JSON are skipped with a warning.
pub fn read_agent_dir(root: &Path) -> Result<Vec<NativeFile>, String> {
    let mut files = Vec::new();

    for kind in [INTENTS_DIR, ENTITIES_DIR] {
        let pattern = root.join(kind).join("*.json");
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern)
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

        for entry in entries {
            let path = entry.map_err(|e| format!("Cannot read directory entry: {}", e))?;
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let text = fs::read_to_string(&path)
                .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
            match serde_json::from_str(&text) {
                Ok(content) => {
                    debug!(path = %path.display(), "loaded agent file");
                    files.push(NativeFile::new(
                        vec![kind.to_string(), file_name.to_string()],
                        content,
                    ));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping invalid JSON"),
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Write every file below `root`, creating directories as needed.
pub fn write_agent_dir(root: &Path, files: &[NativeFile]) -> Result<(), String> {
    for file in files {
        let path = file
            .path
            .iter()
            .fold(root.to_path_buf(), |path, segment| path.join(segment));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create directory {}: {}", parent.display(), e))?;
        }

        let text = serde_json::to_string_pretty(&file.content)
            .map_err(|e| format!("Cannot serialize {}: {}", file.display_path(), e))?;
        fs::write(&path, text).map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
        debug!(path = %path.display(), "wrote agent file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_then_read_agent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            NativeFile::entity("location", json!({ "name": "location" })),
            NativeFile::intent("BookIntent", json!({ "name": "BookIntent" })),
            NativeFile::user_says("BookIntent", "en", json!([])),
        ];

        write_agent_dir(dir.path(), &files).unwrap();
        let read = read_agent_dir(dir.path()).unwrap();

        let paths = read.iter().map(NativeFile::display_path).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "entities/location.json",
                "intents/BookIntent.json",
                "intents/BookIntent_usersays_en.json",
            ]
        );
    }

    #[test]
    fn test_invalid_json_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("intents")).unwrap();
        fs::write(dir.path().join("intents").join("Broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("intents").join("notes.txt"), "ignored").unwrap();

        let read = read_agent_dir(dir.path()).unwrap();
        assert!(read.is_empty());
    }
}
