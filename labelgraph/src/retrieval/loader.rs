//! Directory loader: one [`Document`] per matching file.

use std::path::Path;

use walkdir::WalkDir;

use super::{Document, RetrievalError};

/// Reads every file under `root` whose extension is in `extensions` (without the dot;
/// an empty slice accepts all files). Results are ordered by path and carry a `source`
/// metadata entry relative to `root`. Files that are not valid UTF-8 are skipped.
pub fn load_directory(root: &Path, extensions: &[&str]) -> Result<Vec<Document>, RetrievalError> {
    if !root.is_dir() {
        return Err(RetrievalError::InvalidInput(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut paths: Vec<_> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            extensions.is_empty()
                || p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        })
        .collect();
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path)?;
        let Ok(content) = String::from_utf8(bytes) else {
            tracing::debug!(path = %path.display(), "skipping non-utf8 file");
            continue;
        };
        let source = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        docs.push(Document::new(content).with_metadata("source", source));
    }
    tracing::debug!(root = %root.display(), count = docs.len(), "loaded documents");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_matching_files_sorted_with_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.md"), "bee").unwrap();
        std::fs::write(dir.path().join("sub/a.md"), "ay").unwrap();
        std::fs::write(dir.path().join("skip.bin"), [0xff, 0xfe]).unwrap();
        std::fs::write(dir.path().join("c.txt"), "see").unwrap();

        let docs = load_directory(dir.path(), &["md"]).unwrap();
        let sources: Vec<_> = docs.iter().map(|d| d.source().unwrap()).collect();
        assert_eq!(sources, vec!["b.md", "sub/a.md"]);
        assert_eq!(docs[0].content, "bee");

        let all = load_directory(dir.path(), &[]).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn missing_directory_is_invalid_input() {
        let err = load_directory(Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidInput(_)));
    }
}
