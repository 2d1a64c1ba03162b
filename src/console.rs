use std::sync::OnceLock;
use std::time::Instant;

use owo_colors::OwoColorize;

static BUILD_START: OnceLock<Instant> = OnceLock::new();

fn status_style(verb: &str, color: owo_colors::AnsiColors) -> String {
    format!("{:>12}", verb.color(color).bold())
}

pub fn status(verb: &str, message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style(verb, owo_colors::AnsiColors::Green), message);
}

pub fn status_cyan(verb: &str, message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style(verb, owo_colors::AnsiColors::Cyan), message);
}

pub fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style("Warning", owo_colors::AnsiColors::Yellow), message);
}

pub fn start_build() {
    BUILD_START.get_or_init(Instant::now);
}

pub fn finished(summary: impl std::fmt::Display) {
    let elapsed = BUILD_START
        .get()
        .map(|start| start.elapsed())
        .unwrap_or_default();

    eprintln!(
        "{} {} in {:.2}s",
        status_style("Finished", owo_colors::AnsiColors::Green),
        summary,
        elapsed.as_secs_f64()
    );
}

/// "1 page", "3 pages"
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "page", "pages"), "1 page");
        assert_eq!(plural(0, "page", "pages"), "0 pages");
        assert_eq!(plural(12, "asset", "assets"), "12 assets");
    }
}
