//! Terminal output for the end of a run.

use owo_colors::{OwoColorize, Stream, Style};
use std::path::Path;
use tagdex_index::RunStats;

fn styled(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style))
        .to_string()
}

/// One-line summary of a finished run.
pub fn summary(stats: &RunStats, index: &Path) -> String {
    format!(
        "{} {} packages ({} hits, {} misses) into {}",
        styled("Indexed", Style::new().green().bold()),
        stats.num_packages,
        stats.cache_hits,
        stats.cache_misses,
        styled(&index.display().to_string(), Style::new().cyan()),
    )
}

/// Print the run summary to stderr.
pub fn success(stats: &RunStats, index: &Path) {
    eprintln!("{}", summary(stats, index));
}

/// Print an error, including its cause chain, to stderr.
pub fn error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", styled("error:", Style::new().red().bold()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_counts_and_path() {
        let stats = RunStats {
            num_packages: 3,
            cache_hits: 7,
            cache_misses: 2,
        };
        let line = summary(&stats, Path::new("out/index.json"));
        assert!(line.contains("3 packages"));
        assert!(line.contains("7 hits"));
        assert!(line.contains("2 misses"));
        assert!(line.contains("out/index.json"));
    }
}
