//! INI parsing: `[section]` headers with `key = value` / `key: value` options

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::InterpolationError;

/// Name of the section whose options apply to every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(?P<header>[^\]]+)\]").expect("section regex is valid"));

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^%\((?P<name>[^)]+)\)s").expect("reference regex is valid")
});

/// Maximum nesting of `%(name)s` references within one value.
pub const MAX_INTERPOLATION_DEPTH: usize = 10;

static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<option>[^:=\s][^:=]*)\s*[:=]\s*(?P<value>.*)$")
        .expect("option regex is valid")
});

/// Parsed contents of one or more INI files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IniData {
    pub defaults: BTreeMap<String, String>,
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl IniData {
    pub fn has_section(&self, header: &str) -> bool {
        self.sections.contains_key(header)
    }

    /// Raw value of `key` in `header`, falling back to `[DEFAULT]`.
    ///
    /// Returns `None` if the section itself does not exist.
    pub fn get(&self, header: &str, key: &str) -> Option<&str> {
        let section = self.sections.get(header)?;
        let key = key.to_lowercase();
        section
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .map(String::as_str)
    }

    /// Value of `key` in `header` with `%(name)s` references expanded.
    ///
    /// References are resolved against the same section, then `[DEFAULT]`,
    /// and may nest. `%%` stands for a literal `%`.
    pub fn interpolated(
        &self,
        header: &str,
        key: &str,
    ) -> Option<Result<String, InterpolationError>> {
        let raw = self.get(header, key)?;
        Some(self.interpolate(header, raw, 1))
    }

    fn interpolate(
        &self,
        header: &str,
        raw: &str,
        depth: usize,
    ) -> Result<String, InterpolationError> {
        if !raw.contains('%') {
            return Ok(raw.to_string());
        }
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(InterpolationError::TooDeep {
                depth: MAX_INTERPOLATION_DEPTH,
                value: raw.to_string(),
            });
        }

        let mut expanded = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(pos) = rest.find('%') {
            expanded.push_str(&rest[..pos]);
            rest = &rest[pos..];
            if let Some(after) = rest.strip_prefix("%%") {
                expanded.push('%');
                rest = after;
                continue;
            }
            let caps = REFERENCE_RE
                .captures(rest)
                .ok_or_else(|| InterpolationError::BadSyntax {
                    value: raw.to_string(),
                })?;
            let consumed = caps[0].len();
            let name = caps["name"].to_lowercase();
            let referenced = self
                .get(header, &name)
                .ok_or_else(|| InterpolationError::Missing { name: name.clone() })?;
            expanded.push_str(&self.interpolate(header, referenced, depth + 1)?);
            rest = &rest[consumed..];
        }
        expanded.push_str(rest);
        Ok(expanded)
    }
}

/// Read `path` and merge its contents into `data`.
pub fn read_ini_file(path: &Path, data: &mut IniData) -> io::Result<()> {
    let content = fs::read_to_string(path)?;
    parse_ini(&content, path, data);
    Ok(())
}

/// Parse INI text and merge it into `data`.
///
/// Options repeated across calls override earlier ones, so reading several
/// files in order layers them. Malformed lines are logged and skipped.
pub fn parse_ini(content: &str, origin: &Path, data: &mut IniData) {
    let mut current: Option<String> = None;
    let mut last_option: Option<String> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let lineno = index + 1;
        let line = raw_line.trim();

        // Comments only start in the first column
        if line.is_empty() || raw_line.starts_with(['#', ';']) || is_rem_comment(raw_line) {
            continue;
        }

        // Continuation of the previous value
        if raw_line.starts_with(char::is_whitespace) {
            if let (Some(header), Some(option)) = (&current, &last_option) {
                if let Some(value) = section_mut(data, header).get_mut(option) {
                    value.push('\n');
                    value.push_str(line);
                    continue;
                }
            }
        }
        if line.starts_with(['#', ';']) {
            continue;
        }

        if let Some(caps) = SECTION_RE.captures(line) {
            let header = caps["header"].to_string();
            if header != DEFAULT_SECTION {
                data.sections.entry(header.clone()).or_default();
            }
            current = Some(header);
            last_option = None;
            continue;
        }

        let Some(header) = &current else {
            tracing::warn!(
                system = "configuration",
                path = %origin.display(),
                line = lineno,
                "option before any section header, ignoring"
            );
            continue;
        };

        match OPTION_RE.captures(line) {
            Some(caps) => {
                let option = caps["option"].trim().to_lowercase();
                let value = strip_inline_comment(&caps["value"]).to_string();
                section_mut(data, header).insert(option.clone(), value);
                last_option = Some(option);
            }
            None => {
                tracing::warn!(
                    system = "configuration",
                    path = %origin.display(),
                    line = lineno,
                    content = line,
                    "unparseable line, ignoring"
                );
            }
        }
    }
}

fn section_mut<'a>(data: &'a mut IniData, header: &str) -> &'a mut BTreeMap<String, String> {
    if header == DEFAULT_SECTION {
        &mut data.defaults
    } else {
        data.sections.entry(header.to_string()).or_default()
    }
}

fn is_rem_comment(raw_line: &str) -> bool {
    raw_line.starts_with(['r', 'R'])
        && raw_line
            .split_whitespace()
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("rem"))
}

/// A `;` preceded by whitespace starts an inline comment.
fn strip_inline_comment(value: &str) -> &str {
    let cut = value
        .char_indices()
        .find(|&(i, c)| c == ';' && value[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| i);
    match cut {
        Some(i) => value[..i].trim_end(),
        None => value.trim_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> IniData {
        let mut data = IniData::default();
        parse_ini(content, Path::new("test.ini"), &mut data);
        data
    }

    #[test]
    fn test_parse_sections_and_options() {
        let data = parse(
            r#"
[server]
port = 8080
host: example.com

[client]
retries=3
"#,
        );
        assert_eq!(data.get("server", "port"), Some("8080"));
        assert_eq!(data.get("server", "host"), Some("example.com"));
        assert_eq!(data.get("client", "retries"), Some("3"));
        assert_eq!(data.sections.len(), 2);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let data = parse("[s]\nLogLevel = Debug\n");
        assert_eq!(data.get("s", "loglevel"), Some("Debug"));
        assert_eq!(data.get("s", "LOGLEVEL"), Some("Debug"));
    }

    #[test]
    fn test_section_headers_are_case_sensitive() {
        let data = parse("[Server]\nport = 1\n");
        assert!(data.has_section("Server"));
        assert!(!data.has_section("server"));
    }

    #[test]
    fn test_skip_comments() {
        let data = parse(
            r#"
# comment
; another
[s]
rem not an option
a = 1 ; trailing comment
b = semi;colon
"#,
        );
        assert_eq!(data.get("s", "a"), Some("1"));
        assert_eq!(data.get("s", "b"), Some("semi;colon"));
        assert_eq!(data.get("s", "rem not an option"), None);
    }

    #[test]
    fn test_continuation_lines() {
        let data = parse("[s]\nhosts = a\n  b\n\tc\n");
        assert_eq!(data.get("s", "hosts"), Some("a\nb\nc"));
    }

    #[test]
    fn test_indented_comment_marker_continues_value() {
        let data = parse("[s]\nhosts = a\n  # b\n  ; c\n");
        assert_eq!(data.get("s", "hosts"), Some("a\n# b\n; c"));
    }

    #[test]
    fn test_indented_comment_without_option_is_skipped() {
        let data = parse("[s]\n  # nothing to continue\na = 1\n");
        assert_eq!(data.get("s", "a"), Some("1"));
        assert_eq!(data.sections["s"].len(), 1);
    }

    #[test]
    fn test_default_section_fallback() {
        let data = parse("[DEFAULT]\ntimeout = 5\n[s]\nport = 1\n");
        assert_eq!(data.get("s", "timeout"), Some("5"));
        assert!(!data.has_section(DEFAULT_SECTION));
        assert_eq!(data.get("missing", "timeout"), None);
    }

    #[test]
    fn test_option_before_header_is_ignored() {
        let data = parse("orphan = 1\n[s]\nkept = 2\n");
        assert_eq!(data.get("s", "orphan"), None);
        assert_eq!(data.get("s", "kept"), Some("2"));
    }

    #[test]
    fn test_unparseable_line_is_ignored() {
        let data = parse("[s]\nthis line has no separator\nok = yes\n");
        assert_eq!(data.get("s", "ok"), Some("yes"));
        assert_eq!(data.sections["s"].len(), 1);
    }

    #[test]
    fn test_empty_value() {
        let data = parse("[s]\nempty =\n");
        assert_eq!(data.get("s", "empty"), Some(""));
    }

    #[test]
    fn test_later_content_overrides() {
        let mut data = IniData::default();
        parse_ini("[s]\na = 1\nb = 2\n", Path::new("first.ini"), &mut data);
        parse_ini("[s]\na = 10\n[t]\nc = 3\n", Path::new("second.ini"), &mut data);
        assert_eq!(data.get("s", "a"), Some("10"));
        assert_eq!(data.get("s", "b"), Some("2"));
        assert_eq!(data.get("t", "c"), Some("3"));
    }

    // ===========================================
    // Interpolation
    // ===========================================

    #[test]
    fn test_interpolation_within_section() {
        let data = parse("[paths]\nhome = /srv\nlogs = %(home)s/logs\nold = %(LOGS)s/old\n");
        assert_eq!(data.interpolated("paths", "logs"), Some(Ok("/srv/logs".to_string())));
        assert_eq!(data.interpolated("paths", "old"), Some(Ok("/srv/logs/old".to_string())));
        assert_eq!(data.get("paths", "logs"), Some("%(home)s/logs"));
    }

    #[test]
    fn test_interpolation_from_default_section() {
        let data = parse("[DEFAULT]\nbase = /opt\n[s]\ndir = %(base)s/app\n");
        assert_eq!(data.interpolated("s", "dir"), Some(Ok("/opt/app".to_string())));
    }

    #[test]
    fn test_interpolation_escaped_percent() {
        let data = parse("[s]\nratio = 50%%\n");
        assert_eq!(data.interpolated("s", "ratio"), Some(Ok("50%".to_string())));
    }

    #[test]
    fn test_interpolation_errors() {
        let data = parse("[s]\nmissing = %(nope)s\nbad = 50%\nloop = %(loop)s\n");
        assert_eq!(
            data.interpolated("s", "missing"),
            Some(Err(InterpolationError::Missing { name: "nope".into() }))
        );
        assert!(matches!(
            data.interpolated("s", "bad"),
            Some(Err(InterpolationError::BadSyntax { .. }))
        ));
        assert!(matches!(
            data.interpolated("s", "loop"),
            Some(Err(InterpolationError::TooDeep { depth: 10, .. }))
        ));
        assert_eq!(data.interpolated("s", "absent"), None);
    }

    #[test]
    fn test_read_ini_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[s]\nkey = value\n").unwrap();

        let mut data = IniData::default();
        read_ini_file(&path, &mut data).unwrap();
        assert_eq!(data.get("s", "key"), Some("value"));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut data = IniData::default();
        let result = read_ini_file(&dir.path().join("missing.ini"), &mut data);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
