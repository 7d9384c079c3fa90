//! `.env` parsing into a key-value map. Applying to the process env happens in `lib.rs`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Strips one pair of surrounding quotes. Double quotes honour `\"`; single quotes are literal.
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

/// Parses one `KEY=VALUE` line. Blank lines, `#` comments, lines without `=` and empty keys
/// yield `None`. An optional leading `export ` is accepted.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (k, v) = line.split_once('=')?;
    let key = k.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(v.trim())))
}

fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content.lines().filter_map(parse_line).collect()
}

/// Missing file returns an empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse_dotenv(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_skips_noise() {
        let m = parse_dotenv("\n# comment\nOPENAI_API_KEY=sk-1\nNOT_A_PAIR\n=orphan\n");
        assert_eq!(m.get("OPENAI_API_KEY").map(String::as_str), Some("sk-1"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn quoted_values() {
        let m = parse_dotenv("A=\"hello world\"\nB='single'\nC=\"say \\\"hi\\\"\"\nD=\"\"\n");
        assert_eq!(m["A"], "hello world");
        assert_eq!(m["B"], "single");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
    }

    #[test]
    fn export_prefix_and_hash_in_value() {
        let m = parse_dotenv("export LABELGRAPH_MODEL=gpt-4o#mini\n");
        assert_eq!(m["LABELGRAPH_MODEL"], "gpt-4o#mini");
    }

    #[test]
    fn load_env_map_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn load_env_map_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "A=1\nB=2\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["A"], "1");
        assert_eq!(m["B"], "2");
    }
}
