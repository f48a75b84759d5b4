//! Filesystem shard source.
//!
//! Reads per-letter shard files from a generated-documentation directory.
//! Two on-disk formats are understood:
//!
//! - [`ShardFormat::Doxygen`]: the `var searchData=` JavaScript array that
//!   doxygen writes under `doc/html/search/`: nested arrays with
//!   single-quoted strings and numeric flags, one row per label:
//!
//!   ```text
//!   var searchData=
//!   [
//!     ['mesh_394',['Mesh',['../classlf_1_1mesh_1_1_mesh.html',1,'lf::mesh::Mesh']]],
//!   ];
//!   ```
//!
//!   The numeric id is recovered from the trailing `_<digits>` of the row
//!   key. Rows that do not fit the shape are skipped with a warning.
//!
//! - [`ShardFormat::Json`]: a plain JSON array of entries, the native
//!   format for generators that target this engine directly.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::source::ShardSource;
use crate::{Entry, IndexError, LinkTarget, Shard};

/// On-disk encoding of a shard file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShardFormat {
    /// Doxygen `searchData` JavaScript (`all_<char>.js`).
    #[default]
    Doxygen,
    /// JSON array of entries (`all_<char>.json`).
    Json,
}

impl ShardFormat {
    fn extension(self) -> &'static str {
        match self {
            ShardFormat::Doxygen => "js",
            ShardFormat::Json => "json",
        }
    }
}

/// Shard source reading generated files from a local directory.
///
/// By default shard `m` is expected at `<dir>/<stem>_m.<ext>`. Generators
/// that name files positionally instead of by character can supply an
/// explicit map via [`FsShardSource::with_files`].
pub struct FsShardSource {
    dir: PathBuf,
    stem: String,
    format: ShardFormat,
    files: Option<HashMap<char, PathBuf>>,
}

impl FsShardSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            stem: "all".to_string(),
            format: ShardFormat::default(),
            files: None,
        }
    }

    pub fn with_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.stem = stem.into();
        self
    }

    pub fn with_format(mut self, format: ShardFormat) -> Self {
        self.format = format;
        self
    }

    /// Override per-character file locations, for generators whose file
    /// names do not embed the shard character.
    pub fn with_files(mut self, files: HashMap<char, PathBuf>) -> Self {
        self.files = Some(files);
        self
    }

    fn path_for(&self, key: char) -> Option<PathBuf> {
        if let Some(files) = &self.files {
            return files.get(&key).cloned();
        }
        Some(
            self.dir
                .join(format!("{}_{}.{}", self.stem, key, self.format.extension())),
        )
    }
}

#[async_trait]
impl ShardSource for FsShardSource {
    async fn load(&self, key: char) -> Result<Shard, IndexError> {
        let path = self
            .path_for(key)
            .ok_or(IndexError::ShardNotFound { key })?;

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::ShardNotFound { key });
            }
            Err(err) => return Err(IndexError::load(key, err)),
        };

        let entries = match self.format {
            ShardFormat::Doxygen => parse_search_data(key, &text)?,
            ShardFormat::Json => {
                serde_json::from_str::<Vec<Entry>>(&text).map_err(|e| IndexError::parse(key, e))?
            }
        };

        Ok(Shard::new(key, entries))
    }

    fn describe(&self) -> String {
        format!("fs dir {}", self.dir.display())
    }
}

/// Parse a doxygen `searchData` shard file into raw entries.
///
/// The structural grammar is small: arrays, single-quoted strings, and
/// integers. Structural damage (no top-level array, unterminated string)
/// is a parse error for the whole file; a malformed individual row is
/// skipped with a warning so one bad symbol cannot blank the shard.
pub(crate) fn parse_search_data(key: char, text: &str) -> Result<Vec<Entry>, IndexError> {
    let start = text
        .find('[')
        .ok_or_else(|| IndexError::parse(key, "no top-level array"))?;
    let mut scanner = Scanner::new(&text[start..]);
    let root = scanner.value().map_err(|e| IndexError::parse(key, e))?;

    let rows = match root {
        JsValue::Array(rows) => rows,
        _ => return Err(IndexError::parse(key, "top-level value is not an array")),
    };

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        match entry_from_row(&row) {
            Some(entry) => entries.push(entry),
            None => warn!(shard = %key, "skipping malformed search-data row"),
        }
    }
    Ok(entries)
}

/// One row: `[ '<mangled>_<id>', [ '<label>', [anchor, flag, title]... ] ]`.
fn entry_from_row(row: &JsValue) -> Option<Entry> {
    let row = row.as_array()?;
    let (row_key, payload) = match row {
        [JsValue::Str(row_key), JsValue::Array(payload)] => (row_key, payload),
        _ => return None,
    };

    let id: u64 = row_key.rsplit('_').next()?.parse().ok()?;

    let (label, target_rows) = payload.split_first()?;
    let label = match label {
        JsValue::Str(label) if !label.is_empty() => label,
        _ => return None,
    };

    let mut targets = Vec::with_capacity(target_rows.len());
    for target in target_rows {
        match target.as_array()? {
            [JsValue::Str(anchor), JsValue::Num(_), JsValue::Str(title)] => {
                targets.push(LinkTarget::new(title.clone(), anchor.clone()));
            }
            _ => return None,
        }
    }
    if targets.is_empty() {
        return None;
    }

    Some(Entry::new(label.clone(), id, targets))
}

#[derive(Debug)]
enum JsValue {
    Str(String),
    Num(i64),
    Array(Vec<JsValue>),
}

impl JsValue {
    fn as_array(&self) -> Option<&[JsValue]> {
        match self {
            JsValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Minimal recursive-descent scanner over the searchData literal.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        self.rest = &self.rest[ch.len_utf8()..];
        Some(ch)
    }

    fn value(&mut self) -> Result<JsValue, String> {
        match self.peek() {
            Some('[') => self.array(),
            Some('\'') => self.string(),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.number(),
            Some(ch) => Err(format!("unexpected character {ch:?}")),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn array(&mut self) -> Result<JsValue, String> {
        self.bump(); // consume '['
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(JsValue::Array(items));
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => items.push(self.value()?),
                None => return Err("unterminated array".to_string()),
            }
        }
    }

    fn string(&mut self) -> Result<JsValue, String> {
        self.bump(); // consume opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\'') => return Ok(JsValue::Str(out)),
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err("unterminated escape".to_string()),
                },
                Some(ch) => out.push(ch),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn number(&mut self) -> Result<JsValue, String> {
        self.skip_ws();
        let end = self
            .rest
            .char_indices()
            .find(|(i, ch)| !(ch.is_ascii_digit() || (*i == 0 && *ch == '-')))
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;
        digits
            .parse()
            .map(JsValue::Num)
            .map_err(|e| format!("bad number {digits:?}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Abbreviated from a real doxygen all_m.js shard.
    const SAMPLE: &str = "var searchData=\n[\n\
  ['mesh_394',['Mesh',['../classlf_1_1mesh_1_1_mesh.html',1,'lf::mesh::Mesh'],['../classlf_1_1mesh_1_1hybrid2d_1_1_mesh.html',1,'lf::mesh::hybrid2d::Mesh']]],\n\
  ['meshfactory_402',['MeshFactory',['../classlf_1_1mesh_1_1hybrid2d_1_1_mesh_factory.html',1,'lf::mesh::hybrid2d::MeshFactory']]],\n\
  ['meshhierarchy_413',['MeshHierarchy',['../classlf_1_1refinement_1_1_mesh_hierarchy.html#a148043f4794d7c4f4e71382006bd4708',1,'lf::refinement::MeshHierarchy']]]\n\
];\n";

    #[test]
    fn parses_real_doxygen_rows() {
        let entries = parse_search_data('m', SAMPLE).expect("parses");
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].label, "Mesh");
        assert_eq!(entries[0].id, 394);
        assert_eq!(entries[0].targets.len(), 2);
        assert_eq!(entries[0].targets[0].title, "lf::mesh::Mesh");
        assert_eq!(
            entries[0].targets[0].anchor,
            "../classlf_1_1mesh_1_1_mesh.html"
        );

        assert_eq!(entries[2].id, 413);
        assert_eq!(
            entries[2].targets[0].anchor,
            "../classlf_1_1refinement_1_1_mesh_hierarchy.html#a148043f4794d7c4f4e71382006bd4708"
        );
    }

    #[test]
    fn unescapes_quotes_in_labels() {
        let text = "var searchData=[['op_5',['operator\\'x\\'',['../p.html',1,'t']]]];";
        let entries = parse_search_data('o', text).expect("parses");
        assert_eq!(entries[0].label, "operator'x'");
    }

    #[test]
    fn skips_rows_without_targets() {
        let text = "var searchData=[['good_1',['Good',['../p.html',1,'t']]],['bad_2',['Bad']]];";
        let entries = parse_search_data('g', text).expect("parses");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Good");
    }

    #[test]
    fn skips_rows_with_non_numeric_id() {
        let text = "var searchData=[['nokey',['NoKey',['../p.html',1,'t']]]];";
        let entries = parse_search_data('n', text).expect("parses");
        assert!(entries.is_empty());
    }

    #[test]
    fn rejects_structurally_broken_files() {
        assert!(parse_search_data('x', "var searchData=").is_err());
        assert!(parse_search_data('x', "[['broken_1',['Oops'").is_err());
    }

    #[tokio::test]
    async fn loads_doxygen_file_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("all_m.js"), SAMPLE).expect("write shard");

        let source = FsShardSource::new(dir.path());
        let shard = source.load('m').await.expect("loads");
        assert_eq!(shard.key(), 'm');
        assert_eq!(shard.len(), 3);
        assert_eq!(shard.entries()[0].label, "Mesh");
    }

    #[tokio::test]
    async fn loads_json_file_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = serde_json::json!([
            { "label": "Mesh", "id": 394, "targets": [{ "title": "lf::mesh::Mesh", "anchor": "mesh.html" }] }
        ]);
        std::fs::write(dir.path().join("symbols_m.json"), json.to_string()).expect("write shard");

        let source = FsShardSource::new(dir.path())
            .with_stem("symbols")
            .with_format(ShardFormat::Json);
        let shard = source.load('m').await.expect("loads");
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.entries()[0].search_key(), "mesh");
    }

    #[tokio::test]
    async fn missing_file_maps_to_shard_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = FsShardSource::new(dir.path());
        let err = source.load('x').await.unwrap_err();
        assert!(err.is_not_found());
    }
}
