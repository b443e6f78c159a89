// Merge per-record JSON fragments (`section_001.json`, `student_a.json`,
// ...) into one array file per type (`sections.json`, `students.json`).

use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Types the fragments can be combined into, matched by filename prefix.
pub const COMBINED_TYPES: [&str; 3] = ["section", "student", "teacher"];

#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn type_of(filename: &str) -> Option<&'static str> {
    COMBINED_TYPES
        .into_iter()
        .find(|prefix| filename.starts_with(prefix))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn sorted_json_files(in_dir: &Path) -> Result<Vec<(String, PathBuf)>, CombineError> {
    let read_err = |source| CombineError::Read {
        path: in_dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(in_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_json(&path) {
            debug!("skipping {}", name);
            continue;
        }
        files.push((name, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn read_items(path: &Path) -> Result<Vec<Value>, CombineError> {
    let text = fs::read_to_string(path).map_err(|source| CombineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CombineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pending output group.
struct Group {
    kind: &'static str,
    items: Vec<Value>,
}

fn write_group(out_dir: &Path, group: Group) -> Result<Option<PathBuf>, CombineError> {
    if group.items.is_empty() {
        return Ok(None);
    }
    let path = out_dir.join(format!("{}s.json", group.kind));
    let text = serde_json::to_string_pretty(&group.items)
        .map_err(|e| CombineError::Write {
            path: path.clone(),
            source: e.into(),
        })?;
    fs::write(&path, text).map_err(|source| CombineError::Write {
        path: path.clone(),
        source,
    })?;
    info!("wrote {} items to {}", group.items.len(), path.display());
    Ok(Some(path))
}

/// Combine the fragments in `in_dir` into `out_dir` and return the files
/// written.
///
/// Files are taken in name order and a group is flushed whenever the next
/// file's type prefix differs from the current one. Files with no known
/// prefix are skipped.
pub fn combine_files(in_dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, CombineError> {
    let files = sorted_json_files(in_dir)?;
    fs::create_dir_all(out_dir).map_err(|source| CombineError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    let mut current: Option<Group> = None;
    for (name, path) in files {
        let Some(kind) = type_of(&name) else {
            warn!("skipping {}: no known type prefix", name);
            continue;
        };
        if current.as_ref().map(|g| g.kind) != Some(kind) {
            if let Some(done) = current.take() {
                written.extend(write_group(out_dir, done)?);
            }
            current = Some(Group {
                kind,
                items: Vec::new(),
            });
        }
        if let Some(group) = current.as_mut() {
            group.items.extend(read_items(&path)?);
        }
    }
    if let Some(done) = current {
        written.extend(write_group(out_dir, done)?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, value: Value) {
        fs::write(dir.join(name), value.to_string()).unwrap();
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn merges_sections_and_students() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write(input.path(), "section_b.json", json!([{"id": "s3"}]));
        write(input.path(), "section_a.json", json!([{"id": "s1"}, {"id": "s2"}]));
        write(input.path(), "student_a.json", json!([{"id": "u1"}]));
        fs::write(input.path().join("notes.txt"), "ignore me").unwrap();

        let written = combine_files(input.path(), output.path()).unwrap();

        assert_eq!(
            written,
            vec![output.path().join("sections.json"), output.path().join("students.json")]
        );
        assert_eq!(
            read(&output.path().join("sections.json")),
            json!([{"id": "s1"}, {"id": "s2"}, {"id": "s3"}])
        );
        assert_eq!(read(&output.path().join("students.json")), json!([{"id": "u1"}]));
        assert!(!output.path().join("teachers.json").exists());
    }

    #[test]
    fn empty_directory_writes_nothing() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let written = combine_files(input.path(), output.path()).unwrap();
        assert!(written.is_empty());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn unknown_prefixes_do_not_leak_into_groups() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write(input.path(), "school.json", json!([{"id": "x"}]));
        write(input.path(), "teacher_1.JSON", json!([{"id": "t1"}]));
        let written = combine_files(input.path(), output.path()).unwrap();
        assert_eq!(written, vec![output.path().join("teachers.json")]);
        assert_eq!(read(&written[0]), json!([{"id": "t1"}]));
    }

    #[test]
    fn output_is_pretty_printed() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write(input.path(), "student_1.json", json!([{"id": "u1"}]));
        combine_files(input.path(), output.path()).unwrap();
        let text = fs::read_to_string(output.path().join("students.json")).unwrap();
        assert_eq!(text, "[\n  {\n    \"id\": \"u1\"\n  }\n]");
    }

    #[test]
    fn empty_fragments_write_nothing() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write(input.path(), "teacher_1.json", json!([]));
        let written = combine_files(input.path(), output.path()).unwrap();
        assert!(written.is_empty());
        assert!(!output.path().join("teachers.json").exists());
    }

    #[test]
    fn creates_missing_output_directory() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let nested = output.path().join("combined");
        write(input.path(), "section_1.json", json!([{"id": 1}]));
        write(input.path(), "student_1.json", json!([{"id": 2}]));
        write(input.path(), "teacher_1.json", json!([{"id": 3}]));
        let written = combine_files(input.path(), &nested).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(read(&nested.join("teachers.json")), json!([{"id": 3}]));
    }

    #[test]
    fn malformed_fragment_is_an_error() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("section1.json"), "[1,").unwrap();
        let err = combine_files(input.path(), output.path()).unwrap_err();
        assert!(matches!(err, CombineError::Parse { .. }));
    }
}
