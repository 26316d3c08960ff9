//! Terminal output formatting.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use repolens_core::analysis::{Report, Suggestions};
use repolens_core::view::{
    method_line, render::MethodView, ViewModel, FETCHING_MESSAGE, IN_PROGRESS_MESSAGE,
};
use repolens_core::{AnalysisResult, RepoHandle, ViewState};

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the handle returned by a submission.
pub fn print_submitted(repo_url: &str, handle: &RepoHandle) {
    println!("{} {}", "Submitted".green().bold(), repo_url);
    println!("{}: {}", "Repo ID".bold(), handle);
}

/// Print a finished analysis.
pub fn print_result(result: &AnalysisResult) {
    println!("{}", "Analysis Summary".cyan().bold());
    println!("{}", result.summary);
    println!();

    if result.methods.is_empty() {
        println!("{}", "No methods analyzed.".dimmed());
        return;
    }

    println!("{}", "Methods:".bold());
    for (name, details) in &result.methods {
        let line = method_line(name, details);
        // Highlight the name, keep the rest of the line as rendered.
        let rest = &line[name.len()..];
        println!("  {} {}{}", "•".dimmed(), name.bold(), rest);
    }
}

/// Print a finished analysis with the methods as a table.
pub fn print_result_table(result: &AnalysisResult) {
    println!("{}", "Analysis Summary".cyan().bold());
    println!("{}", result.summary);
    println!();

    let methods: Vec<MethodView> = result
        .methods
        .iter()
        .map(|(name, details)| MethodView {
            name: name.clone(),
            description: details.description.clone(),
            time_complexity: details.time_complexity.clone(),
            space_complexity: details.space_complexity.clone(),
        })
        .collect();
    print_methods_table(&methods);
}

/// Print the final view of a successful session.
pub fn print_view(view: &ViewModel) {
    if view.summary.is_none() {
        println!("{}", "Analysis not ready yet.".yellow());
        if let Some(handle) = &view.handle {
            println!("{}: {}", "Repo ID".bold(), handle);
        }
        return;
    }

    println!("{}", "Analysis Summary".cyan().bold());
    if let Some(summary) = &view.summary {
        println!("{}", summary);
    }
    println!();
    print_methods_table(&view.methods);
}

/// Print methods as a table sized to the terminal.
pub fn print_methods_table(methods: &[MethodView]) {
    if methods.is_empty() {
        println!("{}", "No methods analyzed.".dimmed());
        return;
    }

    let name_width = column_width(methods.iter().map(|m| m.name.as_str()), "METHOD", 32);
    let time_width = column_width(methods.iter().map(|m| m.time_complexity.as_str()), "TIME", 16);
    let space_width = column_width(methods.iter().map(|m| m.space_complexity.as_str()), "SPACE", 16);
    let fixed = name_width + time_width + space_width + 6;
    let desc_width = term_width().saturating_sub(fixed).max(20);

    println!(
        "{}  {}  {}  {}",
        pad_right("METHOD", name_width).bold(),
        pad_right("TIME", time_width).bold(),
        pad_right("SPACE", space_width).bold(),
        "DESCRIPTION".bold()
    );
    println!("{}", "─".repeat((fixed + desc_width).min(term_width())));

    for method in methods {
        println!(
            "{}  {}  {}  {}",
            pad_right(&truncate_visual(&method.name, name_width), name_width).cyan(),
            pad_right(&truncate_visual(&method.time_complexity, time_width), time_width).yellow(),
            pad_right(&truncate_visual(&method.space_complexity, space_width), space_width).yellow(),
            truncate_visual(&method.description, desc_width)
        );
    }
}

/// Print a repository report from the analysis router.
pub fn print_report(report: &Report) {
    println!("{}", report.repo_name.cyan().bold());
    println!("{}", report.description);
    println!();

    if report.methods.is_empty() {
        println!("{}", "No methods analyzed.".dimmed());
        return;
    }

    let methods: Vec<MethodView> = report
        .methods
        .iter()
        .map(|m| MethodView {
            name: m.method_name.clone(),
            description: m.details.description.clone(),
            time_complexity: m.details.time_complexity.clone(),
            space_complexity: m.details.space_complexity.clone(),
        })
        .collect();
    print_methods_table(&methods);
}

/// Print improvement suggestions for one method.
pub fn print_suggestions(suggestions: &Suggestions) {
    println!(
        "{} {}",
        "Suggestions for".cyan().bold(),
        suggestions.method_name.bold()
    );
    if suggestions.suggestions.is_empty() {
        println!("{}", "No suggestions.".dimmed());
        return;
    }
    for (i, suggestion) in suggestions.suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}

/// Spinner text for a state.
pub fn progress_message(state: &ViewState) -> String {
    match state {
        ViewState::Idle => "Idle".to_string(),
        ViewState::Submitting { repo_url, .. } => format!("Submitting {}", repo_url),
        ViewState::Submitted { handle, attempts, .. } if *attempts > 0 => {
            format!("Analysis of {} not ready yet ({} checks)", handle, attempts)
        }
        ViewState::Submitted { .. } => IN_PROGRESS_MESSAGE.to_string(),
        ViewState::Fetching { attempt, .. } if *attempt > 1 => {
            format!("{} (attempt {})", FETCHING_MESSAGE, attempt)
        }
        ViewState::Fetching { .. } => FETCHING_MESSAGE.to_string(),
        ViewState::Resolved { .. } => "Analysis ready".to_string(),
        ViewState::Failed { .. } => "Analysis failed".to_string(),
    }
}

fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str, max: usize) -> usize {
    values
        .map(UnicodeWidthStr::width)
        .chain(std::iter::once(UnicodeWidthStr::width(header)))
        .max()
        .unwrap_or(0)
        .min(max)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 3 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("...");
    result
}
