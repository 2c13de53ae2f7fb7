#![deny(clippy::all)]

//! Position mapping SDK for transformed JavaScript.
//!
//! `SourceMapBuilder` accumulates generated-to-original position facts and
//! serializes them into a Source Map v3 document; `SourceMapResolver`
//! parses a document and answers point queries against it. Both sit on the
//! same signed VLQ codec over the 64-symbol base64 alphabet.
//!
//! ```
//! use mapback::{ResolveQuery, SourceMapBuilder, SourceMapResolver};
//!
//! # fn main() -> mapback::Result<()> {
//! let mut builder = SourceMapBuilder::new(Some("out.js"));
//! let source = builder.add_source("src/a.ts");
//! builder.add_mapping(0, source, 1, 1, None);
//!
//! let map = builder.serialize(None)?;
//! let resolver = SourceMapResolver::parse(&map)?;
//!
//! let hit = resolver.resolve(ResolveQuery { line: 1, column: 0 })?;
//! assert_eq!(hit.unwrap().position.line, 1);
//! # Ok(())
//! # }
//! ```

// Encoding layers (alphabet + VLQ)
pub mod encoder;

// Document generation and resolution
pub mod resolver;
pub mod sourcemap;

// Client-side error report interfaces
pub mod report;

mod error;

// Re-exports
pub use error::{Error, Result};
pub use report::{ErrorReport, InflightReports, ReportKind};
pub use resolver::{
    MappingRecord, OriginalPosition, Resolution, ResolveQuery, ResolvedPosition, SourceMapResolver,
};
pub use sourcemap::{locate_reference, Mapping, SourceContent, SourceMap, SourceMapBuilder};
