// src/utils/log.rs

//! Console formatting helpers for CLI output.
//!
//! Everything goes through the `log` facade so verbosity follows the
//! configured filter.

const WIDTH: usize = 60;

/// Log a separator line
pub fn separator() {
    log::info!("{}", "─".repeat(WIDTH));
}

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(WIDTH);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("{}", indent(message));
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in summary_lines(title, items) {
        log::info!("{}", line);
    }
}

fn indent(message: &str) -> String {
    format!("    {}", message)
}

fn summary_lines(title: &str, items: &[(&str, String)]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(format!("[SUMMARY] {}", title));
    lines.extend(
        items
            .iter()
            .map(|(key, value)| indent(&format!("{}: {}", key, value))),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines() {
        let lines = summary_lines(
            "Fill",
            &[("Status", "success".to_string()), ("Filled", "3".to_string())],
        );
        assert_eq!(
            lines,
            vec![
                "[SUMMARY] Fill".to_string(),
                "    Status: success".to_string(),
                "    Filled: 3".to_string(),
            ]
        );
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("email"), "    email");
    }
}
