/*
 * report.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rendering engine diagnostics for the terminal.
//!
//! When the file a diagnostic points at can be read, the failure is shown
//! as an ariadne report with the offending span labelled. Otherwise the
//! location line is printed followed by the extract the engine supplied.

use std::io::IsTerminal;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use less_bridge::Diagnostic;

/// Render `diagnostic`. `input_name`/`input` describe the stylesheet that
/// was compiled, used when the diagnostic points into it.
pub fn render(diagnostic: &Diagnostic, input_name: &str, input: &str) -> String {
    let color = std::io::stderr().is_terminal();
    let name = diagnostic.filename().unwrap_or(input_name);

    let source = if name == input_name {
        Some(input.to_string())
    } else {
        std::fs::read_to_string(name).ok()
    };

    source
        .and_then(|source| render_snippet(diagnostic, name, &source, color))
        .unwrap_or_else(|| render_plain(diagnostic, name))
}

fn render_snippet(diagnostic: &Diagnostic, name: &str, source: &str, color: bool) -> Option<String> {
    let line = usize::try_from(diagnostic.line()?).ok()?;
    let column = usize::try_from(diagnostic.column().unwrap_or(0)).ok()?;
    let start = char_offset(source, line, column)?;
    let end = (start + 1).min(source.chars().count()).max(start);

    let title = if diagnostic.error_type().is_empty() {
        diagnostic.message().to_string()
    } else {
        format!("{}Error: {}", diagnostic.error_type(), diagnostic.message())
    };

    let id = name.to_string();
    let report = Report::build(ReportKind::Error, id.clone(), start)
        .with_config(Config::default().with_color(color))
        .with_message(title)
        .with_label(
            Label::new((id.clone(), start..end))
                .with_message(diagnostic.message())
                .with_color(Color::Red),
        )
        .finish();

    let mut output = Vec::new();
    report.write((id, Source::from(source)), &mut output).ok()?;
    String::from_utf8(output).ok()
}

fn render_plain(diagnostic: &Diagnostic, name: &str) -> String {
    let mut out = String::new();
    out.push_str(name);
    if let Some(line) = diagnostic.line() {
        out.push_str(&format!(":{line}"));
        if let Some(column) = diagnostic.column() {
            out.push_str(&format!(":{column}"));
        }
    }
    out.push_str(": ");
    if !diagnostic.error_type().is_empty() {
        out.push_str(&format!("{}Error: ", diagnostic.error_type()));
    }
    out.push_str(diagnostic.message());
    out.push('\n');

    // The middle extract line is the reported line.
    let first = diagnostic.line().map(|l| l.saturating_sub(1));
    for (i, text) in diagnostic.extract().iter().enumerate() {
        let Some(text) = text else { continue };
        match first {
            Some(first) => out.push_str(&format!("{:>5} | {}\n", first + i as u64, text)),
            None => out.push_str(&format!("      | {}\n", text)),
        }
    }
    out
}

/// Char offset of 1-based `line`, 0-based `column` in `source`.
fn char_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    let mut lines = source.split_inclusive('\n');
    for _ in 1..line {
        offset += lines.next()?.chars().count();
    }
    let target = lines.next().unwrap_or("").trim_end_matches(['\r', '\n']);
    Some(offset + column.min(target.chars().count()))
}
