//! Mapping Resolver
//!
//! Parses a document's mapping string back into absolute records and
//! answers "what original position produced this generated position?".

use serde::{Deserialize, Serialize};

use crate::encoder::vlq;
use crate::error::{Error, Result};
use crate::sourcemap::SourceMap;

/// One parsed mapping with absolute positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRecord {
    /// Generated line, 0-based.
    pub generated_line: u32,
    /// Generated column, 0-based.
    pub generated_column: u32,
    /// Absent for segments that only mark generated output.
    pub original: Option<OriginalPosition>,
}

/// The original side of a mapping record, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: u32,
    pub line: u32,
    pub column: u32,
    pub name: Option<u32>,
}

/// A generated position to look up: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResolveQuery {
    pub line: i64,
    pub column: i64,
}

/// A resolved original position, 1-based, with the source text when the
/// document embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub position: ResolvedPosition,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub source: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Counters that survive group boundaries. Only the generated column
/// resets at a `;`; these four keep running across the whole string.
#[derive(Debug, Default)]
struct RunningState {
    source: i64,
    line: i64,
    column: i64,
    name: i64,
}

/// Read-only view over a parsed document.
#[derive(Debug)]
pub struct SourceMapResolver<'a> {
    map: &'a SourceMap,
    records: Vec<MappingRecord>,
}

impl<'a> SourceMapResolver<'a> {
    /// Decodes the document's mapping string into absolute records.
    ///
    /// Every reconstructed position must be a valid absolute (no negative
    /// state, nothing past `u32`) and every source/name reference must be
    /// inside the document lists; anything else is rejected here so that
    /// lookups never see a corrupt record.
    pub fn parse(map: &'a SourceMap) -> Result<Self> {
        let mut records = Vec::new();
        let mut state = RunningState::default();

        for (group_index, group) in map.mappings.split(';').enumerate() {
            // the generated column is the one counter that resets per line
            let mut generated = 0i64;

            if group.is_empty() {
                continue;
            }

            for segment in group.split(',') {
                let fields = vlq::decode_segment(segment)?;
                if !matches!(fields.len(), 1 | 4 | 5) {
                    return Err(Error::MalformedVlq("segment must have 1, 4 or 5 fields"));
                }

                generated = accumulate(generated, fields[0])?;
                let generated_column = absolute(generated, "generated column out of range")?;

                let original = if fields.len() > 1 {
                    state.source = accumulate(state.source, fields[1])?;
                    state.line = accumulate(state.line, fields[2])?;
                    state.column = accumulate(state.column, fields[3])?;

                    let source = absolute(state.source, "source index out of range")?;
                    if source as usize >= map.sources.len() {
                        return Err(Error::IndexOutOfRange {
                            kind: "source",
                            index: source,
                            len: map.sources.len(),
                        });
                    }

                    let name = if fields.len() == 5 {
                        state.name = accumulate(state.name, fields[4])?;
                        let name = absolute(state.name, "name index out of range")?;
                        if name as usize >= map.names.len() {
                            return Err(Error::IndexOutOfRange {
                                kind: "name",
                                index: name,
                                len: map.names.len(),
                            });
                        }
                        Some(name)
                    } else {
                        None
                    };

                    Some(OriginalPosition {
                        source,
                        line: absolute(state.line, "original line out of range")?,
                        column: absolute(state.column, "original column out of range")?,
                        name,
                    })
                } else {
                    None
                };

                records.push(MappingRecord {
                    generated_line: group_index as u32,
                    generated_column,
                    original,
                });
            }
        }

        records.sort_by_key(|record| (record.generated_line, record.generated_column));

        Ok(SourceMapResolver { map, records })
    }

    /// Parsed records in generated order.
    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    /// Finds the original position for a generated one.
    ///
    /// The match is the record on the queried line with the greatest
    /// column at or before the queried column. `Ok(None)` when the line
    /// has no record there, or when the match carries no original
    /// position.
    pub fn resolve(&self, query: ResolveQuery) -> Result<Option<Resolution>> {
        if query.line < 0 || query.column < 0 {
            return Err(Error::InvalidQuery);
        }
        // queries are 1-based; nothing can match before the first line
        if query.line == 0 {
            return Ok(None);
        }

        let target = (query.line - 1, query.column);
        let upper = self.records.partition_point(|record| {
            (
                i64::from(record.generated_line),
                i64::from(record.generated_column),
            ) <= target
        });
        if upper == 0 {
            return Ok(None);
        }

        let record = &self.records[upper - 1];
        if i64::from(record.generated_line) != target.0 {
            return Ok(None);
        }

        // records without original info mark generated-only output
        let Some(original) = record.original else {
            return Ok(None);
        };

        let position = ResolvedPosition {
            source: self.map.sources[original.source as usize].clone(),
            line: original.line.saturating_add(1),
            column: original.column.saturating_add(1),
            name: original
                .name
                .map(|name| self.map.names[name as usize].clone()),
        };
        let content = self
            .map
            .content_for(original.source)
            .unwrap_or_default()
            .to_string();

        Ok(Some(Resolution { position, content }))
    }
}

fn accumulate(current: i64, delta: i64) -> Result<i64> {
    current
        .checked_add(delta)
        .ok_or(Error::MalformedVlq("absolute position overflows"))
}

fn absolute(value: i64, what: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::MalformedVlq(what))
}
