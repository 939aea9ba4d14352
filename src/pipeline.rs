//! Pipeline coordinator: read, locate, format concurrently, splice, write.
//!
//! The locate pass is synchronous and finishes before any formatter call is
//! issued, so readiness reduces to draining one `JoinSet`. Each task carries
//! its region index from dispatch time and writes only its own slot in a
//! fixed-size result vector; two regions with identical content can never be
//! confused because nothing is ever matched by content. The spliced output
//! is derived exactly once, after every slot is filled, and written with
//! temp-file-then-rename so a failed run leaves no partial output behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::LitfmtError;
use crate::format::{FormatError, RegionFormatter};
use crate::locate::{locate_regions, parse_source, Dialect, Region, DEFAULT_MARKER};
use crate::output::{FormatReport, RegionReport, SCHEMA_VERSION};
use crate::splice::splice;
use crate::text::byte_offset_to_position;

/// Options controlling a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Marker token looked for in the tagging comment.
    pub marker: String,
    /// Per-region formatter timeout.
    pub timeout: Duration,
    /// Locate and format but write nothing.
    pub check: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            marker: DEFAULT_MARKER.to_string(),
            timeout: Duration::from_secs(30),
            check: false,
        }
    }
}

/// Default output path: `<stem>.fmt.<ext>` beside the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.fmt.{ext}"),
        None => format!("{stem}.fmt"),
    };
    input.with_file_name(name)
}

/// Run the whole pipeline for one file.
///
/// Fails before dispatching any formatter call when the input is missing or
/// unparseable. A failing region aborts the run with that region's index and
/// offsets (the lowest index when several fail) and no output is written.
pub async fn run_pipeline(
    input: &Path,
    output: &Path,
    formatter: Arc<dyn RegionFormatter>,
    opts: &PipelineOptions,
) -> Result<FormatReport, LitfmtError> {
    let started = Instant::now();

    let source = read_source(input)?;
    let tree = parse_source(&source, Dialect::from_path(input), input)?;
    let regions = locate_regions(&source, &tree, &opts.marker)?;
    info!(
        input = %input.display(),
        regions = regions.len(),
        "located marked regions"
    );

    let results = format_all(&source, &regions, formatter, opts.timeout).await?;
    let spliced = splice(&source, &regions, &results)?;
    let changed = spliced != source;

    if !opts.check {
        write_atomic(output, &spliced)?;
        info!(output = %output.display(), changed, "wrote output");
    }

    Ok(build_report(
        input, output, &source, &regions, &results, changed, started, opts,
    ))
}

fn read_source(path: &Path) -> Result<String, LitfmtError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LitfmtError::input_not_found(path.display().to_string()),
        _ => LitfmtError::InputNotFound {
            path: format!("{} ({e})", path.display()),
        },
    })?;
    String::from_utf8(bytes).map_err(|_| LitfmtError::InvalidUtf8 {
        path: path.display().to_string(),
    })
}

/// Dispatch one formatter invocation per region, all in flight at once, and
/// collect the results into index-addressed slots.
async fn format_all(
    source: &str,
    regions: &[Region],
    formatter: Arc<dyn RegionFormatter>,
    timeout: Duration,
) -> Result<Vec<String>, LitfmtError> {
    let mut set = JoinSet::new();
    for region in regions {
        let index = region.index;
        let raw = source
            .get(region.span.start..region.span.end)
            .ok_or_else(|| {
                LitfmtError::internal(format!("region {index} span {} is invalid", region.span))
            })?
            .to_string();
        let formatter = Arc::clone(&formatter);
        set.spawn(async move {
            debug!(index, bytes = raw.len(), "formatting region");
            let result = match tokio::time::timeout(timeout, formatter.format_region(&raw)).await {
                Ok(result) => result,
                Err(_) => Err(FormatError::Timeout {
                    secs: timeout.as_secs(),
                }),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<String>> = vec![None; regions.len()];
    let mut failures: Vec<(usize, FormatError)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(text))) => {
                debug!(index, bytes = text.len(), "region formatted");
                slots[index] = Some(text);
            }
            Ok((index, Err(err))) => failures.push((index, err)),
            Err(err) => {
                return Err(LitfmtError::internal(format!(
                    "formatter task panicked: {err}"
                )))
            }
        }
    }

    // Report the lowest failing index so the outcome is deterministic under
    // any completion order.
    if let Some((index, err)) = failures.into_iter().min_by_key(|(index, _)| *index) {
        let span = regions[index].span;
        return Err(LitfmtError::FormatError {
            index,
            start: span.start,
            end: span.end,
            message: err.to_string(),
        });
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| LitfmtError::internal(format!("region {index} produced no result")))
        })
        .collect()
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), LitfmtError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let display = path.display().to_string();

    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| LitfmtError::write_error(&display, e.to_string()))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| LitfmtError::write_error(&display, e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| LitfmtError::write_error(&display, e.error.to_string()))?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_report(
    input: &Path,
    output: &Path,
    source: &str,
    regions: &[Region],
    results: &[String],
    changed: bool,
    started: Instant,
    opts: &PipelineOptions,
) -> FormatReport {
    let region_reports = regions
        .iter()
        .zip(results)
        .map(|(region, result)| {
            let (line, col) = byte_offset_to_position(source, region.span.start);
            RegionReport {
                index: region.index,
                start: region.span.start,
                end: region.span.end,
                line,
                col,
                old_len: region.span.len(),
                new_len: result.len(),
            }
        })
        .collect();

    FormatReport {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        input: input.display().to_string(),
        output: (!opts.check).then(|| output.display().to_string()),
        region_count: regions.len(),
        changed,
        elapsed_ms: started.elapsed().as_millis() as u64,
        regions: region_reports,
    }
}

// ============================================================================
// Tests
// ============================================================================
