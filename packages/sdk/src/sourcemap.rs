//! Source Map Builder
//!
//! Accumulates generated-to-original position facts and serializes them
//! into a Source Map v3 document, plus the document type itself and the
//! sourceMappingURL comment plumbing around it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::encoder::{base64, vlq};
use crate::error::{Error, Result};

// https://docs.google.com/document/d/1U1RGAehQwRypUTovF1KRlpiOFze0b-_2gc6fAH0KY0k/edit
const VERSION: &str = "3";
const JS_MAP_PREFIX: &str = "# sourceMappingURL=data:application/json;base64,";

/// Accepted data-URL heads for an inline source map.
const DATA_URL_PREFIXES: &[&str] = &[
    "data:application/json;base64,",
    "data:application/json;charset=utf-8;base64,",
    "data:application/json;charset=utf8;base64,",
];

/// Last sourceMappingURL comment in a generated file.
static MAP_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^//[#@][ \t]*sourceMappingURL=(\S+)").unwrap());

/// One generated-to-original position fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// Column on the single generated line.
    pub offset: u32,
    /// Index into `sources`.
    pub source: u32,
    /// Original line, 1-based.
    pub line: u32,
    /// Original column, 1-based.
    pub column: u32,
    /// Optional index into `names`. `Some(0)` is a real reference,
    /// distinct from no name at all.
    pub name: Option<u32>,
}

/// Previous-value counters for the delta walk. Every field on the wire is
/// relative to the last value emitted for that field.
#[derive(Debug, Default)]
struct DeltaState {
    offset: i64,
    source: i64,
    line: i64,
    column: i64,
    name: i64,
}

/// Collects mapping records and the source/name lists they refer to.
#[derive(Debug)]
pub struct SourceMapBuilder {
    file: Option<String>,
    source_root: Option<String>,
    sources: Vec<String>,
    names: Vec<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    pub fn new(file: Option<&str>) -> Self {
        SourceMapBuilder {
            file: file.map(str::to_string),
            source_root: None,
            sources: Vec::new(),
            names: Vec::new(),
            mappings: Vec::new(),
        }
    }

    pub fn set_source_root(&mut self, root: &str) -> &mut Self {
        self.source_root = Some(root.to_string());
        self
    }

    /// Appends a source path and returns its index. Paths are not
    /// deduplicated; callers reuse the returned index instead.
    pub fn add_source(&mut self, path: &str) -> u32 {
        self.sources.push(path.to_string());
        (self.sources.len() - 1) as u32
    }

    /// Appends an identifier name and returns its index.
    pub fn add_name(&mut self, name: &str) -> u32 {
        self.names.push(name.to_string());
        (self.names.len() - 1) as u32
    }

    /// Records that generated column `offset` came from `line:column` of
    /// `source` (both 1-based). Indices are validated at serialization,
    /// not here.
    pub fn add_mapping(
        &mut self,
        offset: u32,
        source: u32,
        line: u32,
        column: u32,
        name: Option<u32>,
    ) -> &mut Self {
        self.mappings.push(Mapping {
            offset,
            source,
            line,
            column,
            name,
        });
        self
    }

    /// Serializes the collected records into a v3 document.
    ///
    /// Records are stable-sorted by offset, so equal offsets keep their
    /// insertion order. Every index is checked before anything is emitted;
    /// a corrupt document is never produced.
    pub fn serialize(&self, source_content: Option<&str>) -> Result<SourceMap> {
        for mapping in &self.mappings {
            if mapping.source as usize >= self.sources.len() {
                return Err(Error::IndexOutOfRange {
                    kind: "source",
                    index: mapping.source,
                    len: self.sources.len(),
                });
            }
            if let Some(name) = mapping.name {
                if name as usize >= self.names.len() {
                    return Err(Error::IndexOutOfRange {
                        kind: "name",
                        index: name,
                        len: self.names.len(),
                    });
                }
            }
        }

        let mut sorted = self.mappings.clone();
        sorted.sort_by_key(|mapping| mapping.offset);

        let mut previous = DeltaState::default();
        let mut segments: Vec<String> = Vec::with_capacity(sorted.len());

        for mapping in &sorted {
            let mut segment = String::new();

            vlq::encode_into(&mut segment, i64::from(mapping.offset) - previous.offset);
            previous.offset = i64::from(mapping.offset);

            vlq::encode_into(&mut segment, i64::from(mapping.source) - previous.source);
            previous.source = i64::from(mapping.source);

            // 1-based API positions are 0-based on the wire
            let line = i64::from(mapping.line) - 1;
            vlq::encode_into(&mut segment, line - previous.line);
            previous.line = line;

            let column = i64::from(mapping.column) - 1;
            vlq::encode_into(&mut segment, column - previous.column);
            previous.column = column;

            // an absent name leaves the name counter untouched
            if let Some(name) = mapping.name {
                vlq::encode_into(&mut segment, i64::from(name) - previous.name);
                previous.name = i64::from(name);
            }

            segments.push(segment);
        }

        Ok(SourceMap {
            version: VERSION.to_string(),
            file: self.file.clone(),
            source_root: self.source_root.clone(),
            sources: self.sources.clone(),
            names: self.names.clone(),
            mappings: segments.join(","),
            source_content: source_content.map(|content| SourceContent::One(content.to_string())),
        })
    }
}

/// Source Map v3 document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMap {
    #[serde(deserialize_with = "version_compat")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(
        rename = "sourceRoot",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(
        rename = "sourceContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_content: Option<SourceContent>,
}

/// Embedded source content: a single text or one entry per source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceContent {
    One(String),
    Many(Vec<Option<String>>),
}

impl SourceMap {
    /// Parses a document, accepting `version` as either the string `"3"`
    /// or the number `3`.
    pub fn from_json(json: &str) -> Result<SourceMap> {
        let map: SourceMap = serde_json::from_str(json)?;
        if map.version != VERSION {
            return Err(Error::UnsupportedFormat);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses an inline `data:application/json;base64,` URL.
    pub fn from_data_url(url: &str) -> Result<SourceMap> {
        let Some(encoded) = DATA_URL_PREFIXES
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix))
        else {
            return Err(Error::UnsupportedFormat);
        };

        let bytes = base64::decode(encoded)?;
        let json = String::from_utf8(bytes).map_err(|_| Error::UnsupportedFormat)?;
        SourceMap::from_json(&json)
    }

    /// Renders the trailing comment that links generated code to this map.
    pub fn to_comment(&self) -> String {
        format!(
            "//{}{}",
            JS_MAP_PREFIX,
            base64::encode(self.to_json().as_bytes())
        )
    }

    /// Embedded content for one source index, when the document carries any.
    pub fn content_for(&self, source: u32) -> Option<&str> {
        match self.source_content.as_ref()? {
            SourceContent::One(content) => (source == 0).then_some(content.as_str()),
            SourceContent::Many(entries) => entries.get(source as usize)?.as_deref(),
        }
    }
}

/// Finds the URL of the last sourceMappingURL comment in generated code.
pub fn locate_reference(source: &str) -> Option<&str> {
    MAP_REFERENCE
        .captures_iter(source)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn version_compat<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Number(u32),
        Text(String),
    }

    Ok(match Version::deserialize(deserializer)? {
        Version::Number(number) => number.to_string(),
        Version::Text(text) => text,
    })
}
