//! litfmt: reformats tagged template literals embedded in TypeScript.
//!
//! Template literals preceded by a marker comment (`/*tsx*/` by default) are
//! extracted from a source file, piped through an external code formatter
//! (one concurrent invocation per literal), and spliced back in place; the
//! result is written atomically to an output file.

pub mod error;
pub mod format;
pub mod locate;
pub mod output;
pub mod pipeline;
pub mod splice;
pub mod text;

pub use error::{LitfmtError, OutputErrorCode};
pub use format::{CommandFormatter, FormatError, RegionFormatter, DEFAULT_FORMATTER};
pub use locate::{Dialect, Region, DEFAULT_MARKER};
pub use output::{ErrorEnvelope, FormatReport, RegionReport};
pub use pipeline::{default_output_path, run_pipeline, PipelineOptions};
pub use text::Span;
