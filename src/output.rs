//! CLI output formatting for the `apply`, `info` and `shell` commands.
//!
//! # Image-First Display
//!
//! Every report leads with the image it is about, its file name and size,
//! with the operators applied shown as indented, numbered context. Sizes are
//! always printed as `WIDTHxHEIGHT` so a rotate or resize is visible at a
//! glance.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Size: 800x600
//! ```
//!
//! ## Apply
//!
//! ```text
//! photo.jpg (800x600)
//!     001 grayscale
//!     002 rotate:90
//!     003 resize:300x400
//! → out.png (300x400)
//! ```
//!
//! ## Shell
//!
//! Each shell command answers with one line describing the new state:
//!
//! ```text
//! > load photo.jpg
//! Loaded photo.jpg (800x600)
//! > rotate:90
//! rotate:90 → 600x800
//! > undo
//! undo → 800x600
//! > history
//! History (0 undo, 1 redo)
//!   > 001 800x600
//!     002 600x800
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and, where the binary prints it directly, a `print_*` wrapper
//! that writes to stdout. Format functions are pure: no I/O, no side effects.

use crate::history::HistoryStack;
use crate::imaging::{Operator, supported_extensions};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `800x600`
pub fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{width}x{height}")
}

/// File name of `path`, or the whole path when it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// info
// ============================================================================

pub fn format_info(path: &Path, dims: (u32, u32)) -> Vec<String> {
    vec![
        display_name(path),
        format!("{}Size: {}", indent(1), format_dimensions(dims)),
    ]
}

pub fn print_info(path: &Path, dims: (u32, u32)) {
    for line in format_info(path, dims) {
        println!("{}", line);
    }
}

// ============================================================================
// apply
// ============================================================================

/// Summary of a batch edit: input, each operator in order, output.
pub fn format_apply_output(
    input: &Path,
    input_dims: (u32, u32),
    ops: &[Operator],
    output: &Path,
    output_dims: (u32, u32),
) -> Vec<String> {
    let mut lines = Vec::with_capacity(ops.len() + 2);
    lines.push(format!(
        "{} ({})",
        display_name(input),
        format_dimensions(input_dims)
    ));
    for (i, op) in ops.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), op));
    }
    lines.push(format!(
        "→ {} ({})",
        display_name(output),
        format_dimensions(output_dims)
    ));
    lines
}

pub fn print_apply_output(
    input: &Path,
    input_dims: (u32, u32),
    ops: &[Operator],
    output: &Path,
    output_dims: (u32, u32),
) {
    for line in format_apply_output(input, input_dims, ops, output, output_dims) {
        println!("{}", line);
    }
}

// ============================================================================
// shell
// ============================================================================

pub fn format_loaded(path: &Path, dims: (u32, u32)) -> String {
    format!("Loaded {} ({})", path.display(), format_dimensions(dims))
}

pub fn format_saved(path: &Path) -> String {
    format!("Saved {}", path.display())
}

/// One step of the session: what was done and the size it left behind.
pub fn format_step(label: &str, dims: (u32, u32)) -> String {
    format!("{} → {}", label, format_dimensions(dims))
}

/// Snapshot listing, oldest first, with the current one marked by `>`.
pub fn format_history(history: &HistoryStack) -> Vec<String> {
    if history.is_empty() {
        return vec!["History empty".to_string()];
    }
    let mut lines = vec![format!(
        "History ({} undo, {} redo)",
        history.undo_depth(),
        history.redo_depth()
    )];
    for (i, snapshot, current) in history.entries() {
        let marker = if current { "  > " } else { "    " };
        lines.push(format!(
            "{}{} {}",
            marker,
            format_index(i + 1),
            format_dimensions(snapshot.dimensions())
        ));
    }
    lines
}

pub fn format_help() -> Vec<String> {
    let commands: [(&str, &str); 10] = [
        ("load <path>", "Open an image, discarding edits"),
        ("save [path]", "Write the current image (default: where it was loaded)"),
        ("apply <op>", "Apply an operator; the bare operator works too"),
        ("undo", "Step back one edit"),
        ("redo", "Step forward one edit"),
        ("reset", "Return to the loaded image and clear history"),
        ("dims", "Print the current size"),
        ("history", "List undo snapshots"),
        ("help", "Show this help"),
        ("quit", "Leave the shell"),
    ];
    let operators: [(&str, &str); 8] = [
        ("grayscale", "Luma to all three channels"),
        ("blur[:N]", "Gaussian blur, kernel size 1-31"),
        ("edges[:LOW,HIGH]", "Canny edge map"),
        ("brightness:F", "Scale HSV value, 0.5-2.0"),
        ("contrast:F", "Stretch around the channel mean, 0.5-2.0"),
        ("rotate:DEG", "90 (counter-clockwise), 180 or 270"),
        ("flip:DIR", "horizontal or vertical"),
        ("resize:WxH", "Bilinear resample"),
    ];

    let mut lines = vec!["Commands".to_string()];
    lines.extend(
        commands
            .iter()
            .map(|(usage, what)| format!("{}{:<18}{}", indent(1), usage, what)),
    );
    lines.push(String::new());
    lines.push("Operators".to_string());
    lines.extend(
        operators
            .iter()
            .map(|(usage, what)| format!("{}{:<18}{}", indent(1), usage, what)),
    );
    lines.push(String::new());
    lines.push(format!(
        "Formats: {}",
        supported_extensions().collect::<Vec<_>>().join(", ")
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{FlipDirection, PixelBuffer};

    fn snap(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::filled(w, h, [0, 0, 0]).unwrap()
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_single_digit() {
        assert_eq!(format_index(1), "001");
    }

    #[test]
    fn format_index_triple_digit() {
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn dimensions_format() {
        assert_eq!(format_dimensions((800, 600)), "800x600");
        assert_eq!(format_dimensions((0, 0)), "0x0");
    }

    #[test]
    fn display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/tmp/shots/a.png")), "a.png");
        assert_eq!(display_name(Path::new("/")), "/");
    }

    // =========================================================================
    // info / apply
    // =========================================================================

    #[test]
    fn info_output() {
        let lines = format_info(Path::new("dir/photo.jpg"), (800, 600));
        assert_eq!(lines, vec!["photo.jpg", "    Size: 800x600"]);
    }

    #[test]
    fn apply_output_lists_ops_in_order() {
        let ops = vec![
            Operator::Grayscale,
            Operator::rotate(90),
            Operator::flip(FlipDirection::Horizontal),
        ];
        let lines = format_apply_output(
            Path::new("in.jpg"),
            (800, 600),
            &ops,
            Path::new("out/out.png"),
            (600, 800),
        );
        assert_eq!(
            lines,
            vec![
                "in.jpg (800x600)",
                "    001 grayscale",
                "    002 rotate:90",
                "    003 flip:horizontal",
                "→ out.png (600x800)",
            ]
        );
    }

    #[test]
    fn apply_output_without_ops() {
        let lines = format_apply_output(Path::new("a.png"), (1, 1), &[], Path::new("b.bmp"), (1, 1));
        assert_eq!(lines.len(), 2);
    }

    // =========================================================================
    // shell
    // =========================================================================

    #[test]
    fn step_line() {
        assert_eq!(format_step("rotate:90", (6, 8)), "rotate:90 → 6x8");
    }

    #[test]
    fn loaded_and_saved_lines() {
        assert_eq!(format_loaded(Path::new("a.png"), (4, 4)), "Loaded a.png (4x4)");
        assert_eq!(format_saved(Path::new("b.jpg")), "Saved b.jpg");
    }

    #[test]
    fn history_empty() {
        assert_eq!(format_history(&HistoryStack::new()), vec!["History empty"]);
    }

    #[test]
    fn history_marks_current_snapshot() {
        let mut history = HistoryStack::new();
        history.push(snap(8, 6));
        history.push(snap(6, 8));
        history.push(snap(3, 4));
        history.undo().unwrap();

        assert_eq!(
            format_history(&history),
            vec![
                "History (1 undo, 1 redo)",
                "    001 8x6",
                "  > 002 6x8",
                "    003 3x4",
            ]
        );
    }

    #[test]
    fn help_mentions_every_operator() {
        let text = format_help().join("\n");
        for name in Operator::NAMES {
            assert!(text.contains(name), "help is missing {name}");
        }
        assert!(text.contains("jpg, jpeg, png, bmp"));
    }
}
