//! Marker locator: finds tagged template literals in a parsed source tree.
//!
//! A template literal is selected when a comment containing the marker token
//! immediately precedes it, with only whitespace between the end of the
//! comment and the start of the literal:
//!
//! ```text
//! const view = /*tsx*/ `<div>{name}</div>`;
//! ```
//!
//! The located span excludes the backtick delimiters, so the transformer
//! only ever sees the raw inner content. Regions come out in ascending
//! document order and never overlap; template literals nested inside another
//! literal's substitutions are not scanned (nested markers are unsupported).

use std::path::Path;

use tree_sitter::{Language, Parser, Tree};

use crate::error::LitfmtError;
use crate::text::{byte_offset_to_position, Span};

/// Default marker token looked for inside the tagging comment.
pub const DEFAULT_MARKER: &str = "tsx";

/// A contiguous span of the original text selected for transformation.
///
/// `index` is the 0-based position in source order; transform results are
/// matched back to their region by this index, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// 0-based index in source order.
    pub index: usize,
    /// Inner content span (delimiters excluded).
    pub span: Span,
}

/// Grammar variant used to parse the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Pick a dialect from the input file extension. `.tsx` and `.jsx`
    /// parse with the TSX grammar; everything else parses as TypeScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    fn language(&self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse source text into a syntax tree.
///
/// Fails with `ParseError` when the source is not valid syntax; the error
/// position points at the first error node the parser produced. `path` is
/// only used for diagnostics.
pub fn parse_source(source: &str, dialect: Dialect, path: &Path) -> Result<Tree, LitfmtError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| LitfmtError::internal(format!("failed to set parser language: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| LitfmtError::internal("parser returned no tree"))?;

    if tree.root_node().has_error() {
        let offset = first_error_offset(tree.root_node()).unwrap_or(0);
        let (line, col) = byte_offset_to_position(source, offset);
        return Err(LitfmtError::ParseError {
            path: path.display().to_string(),
            line,
            col,
        });
    }

    Ok(tree)
}

fn first_error_offset(node: tree_sitter::Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_byte());
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(offset) = first_error_offset(child) {
            return Some(offset);
        }
    }
    None
}

/// Locate marked regions in `source`.
///
/// Pure over `(source, tree)`: one forward pre-order walk, emitting regions
/// in ascending start order. The walk does not descend into template
/// literals, so a literal inside another literal's substitution is never
/// selected.
pub fn locate_regions(
    source: &str,
    tree: &Tree,
    marker: &str,
) -> Result<Vec<Region>, LitfmtError> {
    let mut regions: Vec<Region> = Vec::new();
    // Most recent comment run seen, as (run end offset, run carries marker).
    let mut last_comment: Option<(usize, bool)> = None;

    let mut cursor = tree.walk();
    let mut done = false;
    while !done {
        let node = cursor.node();
        let mut descend = true;

        match node.kind() {
            "comment" => {
                let text = source
                    .get(node.byte_range())
                    .ok_or_else(|| LitfmtError::internal("comment span out of bounds"))?;
                let has_marker = text.contains(marker);
                // A run of comments separated only by whitespace tags as a
                // unit: the marker may sit in any comment of the run.
                last_comment = match last_comment {
                    Some((prev_end, prev_marker))
                        if is_whitespace_gap(source, prev_end, node.start_byte()) =>
                    {
                        Some((node.end_byte(), prev_marker || has_marker))
                    }
                    _ => Some((node.end_byte(), has_marker)),
                };
            }
            "template_string" => {
                descend = false;
                if is_marked(source, last_comment, node.start_byte()) {
                    let (start, end) = (node.start_byte(), node.end_byte());
                    // A well-formed template is at least the two backticks.
                    if end >= start + 2 {
                        let span = Span::new(start + 1, end - 1);
                        tracing::debug!(index = regions.len(), %span, "located marked region");
                        regions.push(Region {
                            index: regions.len(),
                            span,
                        });
                    }
                }
            }
            _ => {}
        }

        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                done = true;
                break;
            }
        }
    }

    debug_assert!(
        regions
            .windows(2)
            .all(|w| w[0].span.end <= w[1].span.start),
        "locator must emit ascending, non-overlapping regions"
    );

    Ok(regions)
}

/// A template at `start` is marked when the comment run ending most recently
/// carries the marker and only whitespace separates it from the template.
fn is_marked(source: &str, last_comment: Option<(usize, bool)>, start: usize) -> bool {
    match last_comment {
        Some((comment_end, true)) => is_whitespace_gap(source, comment_end, start),
        _ => false,
    }
}

fn is_whitespace_gap(source: &str, from: usize, to: usize) -> bool {
    from <= to
        && source
            .get(from..to)
            .is_some_and(|gap| gap.chars().all(char::is_whitespace))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(source: &str) -> Vec<Region> {
        let tree = parse_source(source, Dialect::TypeScript, Path::new("test.ts"))
            .expect("test source should parse");
        locate_regions(source, &tree, DEFAULT_MARKER).expect("locate should succeed")
    }

    fn inner<'a>(source: &'a str, region: &Region) -> &'a str {
        &source[region.span.start..region.span.end]
    }

    mod marker_detection {
        use super::*;

        #[test]
        fn block_comment_marks_following_template() {
            let source = "const a = /*tsx*/ `<x/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(source, &regions[0]), "<x/>");
        }

        #[test]
        fn line_comment_marks_template_on_next_line() {
            let source = "// tsx\nconst a = `<x/>`;";
            // The comment precedes the whole declaration, not the literal.
            assert!(locate(source).is_empty());

            let adjacent = "const a =\n  // tsx\n  `<x/>`;";
            let regions = locate(adjacent);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(adjacent, &regions[0]), "<x/>");
        }

        #[test]
        fn unmarked_template_is_skipped() {
            let source = "const a = `<x/>`; const b = /*tsx*/ `<y/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(source, &regions[0]), "<y/>");
        }

        #[test]
        fn comment_without_marker_is_skipped() {
            let source = "const a = /* html */ `<x/>`;";
            assert!(locate(source).is_empty());
        }

        #[test]
        fn marker_must_be_adjacent() {
            // Code between the comment and the literal breaks the tag.
            let source = "/*tsx*/ const a = 1; const b = `<x/>`;";
            assert!(locate(source).is_empty());
        }

        #[test]
        fn any_comment_in_the_leading_run_may_carry_the_marker() {
            // Marker first, annotation after.
            let source = "const a = /*tsx*/ /*note*/ `<x/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(source, &regions[0]), "<x/>");

            // Marker in the last comment of the run.
            let source = "const a = /*note*/ /*tsx*/ `<x/>`;";
            assert_eq!(locate(source).len(), 1);

            // Marker in the middle, runs spanning lines.
            let source = "const a =\n  // note\n  // tsx\n  // more\n  `<x/>`;";
            assert_eq!(locate(source).len(), 1);
        }

        #[test]
        fn code_between_comments_breaks_the_run() {
            let source = "const a = 1; /*tsx*/ const b = 2; /*note*/ `<x/>`;";
            assert!(locate(source).is_empty());
        }

        #[test]
        fn custom_marker_token() {
            let source = "const a = /*fmt*/ `<x/>`;";
            let tree = parse_source(source, Dialect::TypeScript, Path::new("t.ts")).unwrap();
            let regions = locate_regions(source, &tree, "fmt").unwrap();
            assert_eq!(regions.len(), 1);
            assert!(locate(source).is_empty());
        }
    }

    mod region_shape {
        use super::*;

        #[test]
        fn delimiters_are_excluded() {
            let source = "const a = /*tsx*/ ``;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert!(regions[0].span.is_empty());
        }

        #[test]
        fn regions_come_out_in_ascending_order() {
            let source = "const a = /*tsx*/ `<x/>`;\nconst b = /*tsx*/ `<y/>`;\nconst c = /*tsx*/ `<z/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 3);
            for (i, region) in regions.iter().enumerate() {
                assert_eq!(region.index, i);
            }
            assert!(regions.windows(2).all(|w| w[0].span.end <= w[1].span.start));
        }

        #[test]
        fn substitutions_stay_inside_the_region() {
            let source = "const a = /*tsx*/ `<x attr=${1 + 2}/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(source, &regions[0]), "<x attr=${1 + 2}/>");
        }

        #[test]
        fn same_comment_does_not_mark_a_later_template() {
            let source = "const a = /*tsx*/ `<x/>`; const b = `<y/>`;";
            let regions = locate(source);
            assert_eq!(regions.len(), 1);
            assert_eq!(inner(source, &regions[0]), "<x/>");
        }

        #[test]
        fn no_templates_means_no_regions() {
            assert!(locate("const a = 1;").is_empty());
            assert!(locate("").is_empty());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parse_error_is_reported_with_position() {
            let source = "const a = ;;;}{";
            let err = parse_source(source, Dialect::TypeScript, Path::new("bad.ts"))
                .expect_err("should fail to parse");
            match err {
                LitfmtError::ParseError { path, .. } => assert_eq!(path, "bad.ts"),
                other => panic!("expected ParseError, got {other:?}"),
            }
        }

        #[test]
        fn dialect_from_extension() {
            assert_eq!(Dialect::from_path(Path::new("a.tsx")), Dialect::Tsx);
            assert_eq!(Dialect::from_path(Path::new("a.jsx")), Dialect::Tsx);
            assert_eq!(Dialect::from_path(Path::new("a.ts")), Dialect::TypeScript);
            assert_eq!(Dialect::from_path(Path::new("a")), Dialect::TypeScript);
        }

        #[test]
        fn tsx_dialect_parses_jsx_at_top_level() {
            let source = "const a = /*tsx*/ `<x/>`;\nconst el = <div>hi</div>;";
            let tree = parse_source(source, Dialect::Tsx, Path::new("t.tsx")).unwrap();
            let regions = locate_regions(source, &tree, DEFAULT_MARKER).unwrap();
            assert_eq!(regions.len(), 1);
        }
    }
}
