//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Number of vector entries shown before eliding.
const VECTOR_PREVIEW_LEN: usize = 8;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print one embedding with a preview of its vector.
    pub fn embedding(text: Option<&str>, vector: &[f32]) {
        let label = text
            .map(|t| content_preview(t, 60))
            .unwrap_or_else(|| "<no text>".to_string());
        println!(
            "  {} {} {}",
            style("*").cyan(),
            style(label).bold(),
            style(format!("({} dims)", vector.len())).dim()
        );
        println!("    {}", vector_preview(vector, VECTOR_PREVIEW_LEN));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Render the first `max` entries of a vector.
pub fn vector_preview(vector: &[f32], max: usize) -> String {
    let shown: Vec<String> = vector.iter().take(max).map(|v| format!("{:.4}", v)).collect();
    if vector.len() > max {
        format!("[{}, ... +{} more]", shown.join(", "), vector.len() - max)
    } else {
        format!("[{}]", shown.join(", "))
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
