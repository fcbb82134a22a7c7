//! Typed resolution of `KEY=VALUE` environment files.
//!
//! Files are parsed all-or-nothing: the first malformed line aborts with its
//! line number and no mapping is returned. Values are kept verbatim (no
//! interpolation, no trimming); repeated keys keep the last value. A mapping
//! is constructed fresh for every resolution and never cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::error::{Error, Result};
use crate::core::session::Session;
use crate::utils::io;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"))
}

fn int_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?[0-9]+$").expect("static pattern"))
}

#[derive(Debug, Clone)]
pub struct EnvFile {
    values: HashMap<String, String>,
    source: String,
}

/// Parse environment file content. `source` labels errors (a path or
/// `host:path` for fetched files).
pub fn parse(content: &str, source: &str) -> Result<EnvFile> {
    let mut values = HashMap::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| Error::env_malformed_line(source, index + 1, line))?;

        if !key_pattern().is_match(key) {
            return Err(Error::env_malformed_line(source, index + 1, line));
        }

        // Last write wins for repeated keys.
        values.insert(key.to_string(), value.to_string());
    }

    Ok(EnvFile {
        values,
        source: source.to_string(),
    })
}

impl EnvFile {
    /// Read and parse a local environment file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, &format!("read {}", path.display()))?;
        parse(&content, &path.display().to_string())
    }

    /// Copy a remote environment file into a private temporary file, parse
    /// it, and remove the temporary file on every exit path.
    pub fn fetch(session: &mut Session, remote_path: &str) -> Result<Self> {
        let tmp = tempfile::NamedTempFile::new()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create temp file".to_string())))?;

        session.download(remote_path, tmp.path())?;
        let content = io::read_file(tmp.path(), "read fetched environment file")?;
        parse(&content, &format!("{}:{}", session.target_label(), remote_path))
        // `tmp` drops here, deleting the local copy whether parsing succeeded or not
    }

    fn raw(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::env_missing_key(key, &self.source))
    }

    pub fn str(&self, key: &str) -> Result<String> {
        self.raw(key).map(str::to_string)
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Connection URLs are opaque here; downstream consumers parse them.
    pub fn url(&self, key: &str) -> Result<String> {
        self.str(key)
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        let raw = self.raw(key)?;
        if !int_pattern().is_match(raw) {
            return Err(Error::env_type_coercion(key, raw, "integer", &self.source));
        }
        raw.parse::<i64>()
            .map_err(|_| Error::env_type_coercion(key, raw, "integer", &self.source))
    }

    pub fn int_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.values.get(key) {
            Some(_) => self.int(key),
            None => Ok(default),
        }
    }

    /// Booleans accept exactly `True` and `False`.
    pub fn bool(&self, key: &str) -> Result<bool> {
        match self.raw(key)? {
            "True" => Ok(true),
            "False" => Ok(false),
            other => Err(Error::env_type_coercion(key, other, "boolean", &self.source)),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.values.get(key) {
            Some(_) => self.bool(key),
            None => Ok(default),
        }
    }

    /// Lists are bracketed, comma-separated, double-quoted elements:
    /// `["a", "b"]`.
    pub fn list(&self, key: &str) -> Result<Vec<String>> {
        let raw = self.raw(key)?;
        parse_list(raw).ok_or_else(|| Error::env_type_coercion(key, raw, "list", &self.source))
    }

    pub fn list_or(&self, key: &str, default: Vec<String>) -> Result<Vec<String>> {
        match self.values.get(key) {
            Some(_) => self.list(key),
            None => Ok(default),
        }
    }
}

fn parse_list(raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;

    let mut elements = Vec::new();
    let mut rest = inner.trim_start();

    while !rest.is_empty() {
        rest = rest.strip_prefix('"')?;
        let end = rest.find('"')?;
        elements.push(rest[..end].to_string());
        rest = rest[end + 1..].trim_start();

        match rest.strip_prefix(',') {
            Some(after) => {
                rest = after.trim_start();
                // A trailing comma with nothing after it is malformed.
                if rest.is_empty() {
                    return None;
                }
            }
            None if rest.is_empty() => break,
            None => return None,
        }
    }

    Some(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(content: &str) -> EnvFile {
        parse(content, "test.env").unwrap()
    }

    #[test]
    fn parses_values_verbatim() {
        let e = env("KEY=some value  with  spaces\nEMPTY=\n");
        assert_eq!(e.str("KEY").unwrap(), "some value  with  spaces");
        assert_eq!(e.str("EMPTY").unwrap(), "");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let e = env("# comment\n\nA=1\n# CANONICAL_DOMAIN=example.com\n");
        assert_eq!(e.int("A").unwrap(), 1);
        assert!(e.str("CANONICAL_DOMAIN").is_err());
    }

    #[test]
    fn last_write_wins_for_repeated_keys() {
        let e = env("A=1\nA=2\n");
        assert_eq!(e.int("A").unwrap(), 2);
    }

    #[test]
    fn missing_key_fails_without_default() {
        let e = env("A=1\n");
        let err = e.str("MISSING").unwrap_err();
        assert_eq!(err.code.as_str(), "env.missing_key");
    }

    #[test]
    fn defaults_are_returned_verbatim() {
        let e = env("A=1\n");
        assert_eq!(e.str_or("MISSING", "x"), "x");
        assert_eq!(e.int_or("MISSING", 42).unwrap(), 42);
        assert!(e.bool_or("MISSING", true).unwrap());
    }

    #[test]
    fn default_never_masks_a_present_bad_value() {
        let e = env("N=abc\n");
        assert!(e.int_or("N", 1).is_err());
    }

    #[test]
    fn booleans_are_case_sensitive() {
        let e = env("YES=True\nNO=False\nBAD=true\n");
        assert!(e.bool("YES").unwrap());
        assert!(!e.bool("NO").unwrap());
        let err = e.bool("BAD").unwrap_err();
        assert_eq!(err.code.as_str(), "env.type_coercion");
    }

    #[test]
    fn integers_allow_an_optional_sign() {
        let e = env("A=7\nB=-3\nC=+12\nD=1.5\nE=12abc\n");
        assert_eq!(e.int("A").unwrap(), 7);
        assert_eq!(e.int("B").unwrap(), -3);
        assert_eq!(e.int("C").unwrap(), 12);
        assert!(e.int("D").is_err());
        assert!(e.int("E").is_err());
    }

    #[test]
    fn lists_require_bracketed_quoted_elements() {
        let e = env(r#"HOSTS=[".example.com", ".fallback.io"]
EMPTY=[]
BARE=[a, b]
UNCLOSED=["a"
"#);
        assert_eq!(
            e.list("HOSTS").unwrap(),
            vec![".example.com".to_string(), ".fallback.io".to_string()]
        );
        assert_eq!(e.list("EMPTY").unwrap(), Vec::<String>::new());
        assert!(e.list("BARE").is_err());
        assert!(e.list("UNCLOSED").is_err());
    }

    #[test]
    fn connection_urls_pass_through_unvalidated() {
        let e = env("DATABASE_URL=postgres://u:p@localhost:5432/db\n");
        assert_eq!(
            e.url("DATABASE_URL").unwrap(),
            "postgres://u:p@localhost:5432/db"
        );
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = parse("A=1\nnot a pair\n", "bad.env").unwrap_err();
        assert_eq!(err.code.as_str(), "env.malformed_line");
        assert!(err.details["lineNumber"] == 2);
    }

    #[test]
    fn bad_key_shape_is_malformed() {
        assert!(parse("1KEY=x\n", "bad.env").is_err());
        assert!(parse("KE Y=x\n", "bad.env").is_err());
    }

    #[test]
    fn parsing_is_all_or_nothing() {
        // Valid first line must not leak a partial mapping.
        assert!(parse("GOOD=1\nbroken line\nALSO_GOOD=2\n", "bad.env").is_err());
    }
}
