//! Display and output formatting utilities

use crate::board::{Board, Cell, PackedCoord};
use crate::config::OutputFormat;
use crate::restore::RestoreOutcome;
use anyhow::{Context, Result};
use std::path::Path;

/// Format restore outcomes for display
pub struct OutcomeFormatter;

impl OutcomeFormatter {
    /// Summary of a restore run for console output
    pub fn format_outcome(outcome: &RestoreOutcome) -> String {
        let stats = &outcome.statistics;
        let mut output = String::new();

        output.push_str("=== Restore Outcome ===\n");
        output.push_str(&format!("Board: {}x{}, {} walls\n", stats.width, stats.height, stats.walls));
        output.push_str(&format!("Balls: {} in {} colours\n", stats.balls, stats.colors));
        output.push_str(&format!("Moves: {}", stats.result_size));
        if outcome.truncated {
            output.push_str(" (truncated)");
        }
        output.push('\n');
        output.push_str(&format!("Score: {:.4}\n", stats.score));
        output.push_str(&format!("Time: {:.3}s", stats.elapsed_seconds));
        if stats.timed_out {
            output.push_str(" (time limit reached)");
        }
        output.push('\n');

        if !stats.generations.is_empty() {
            output.push_str("\nGen | Tasks | Solved | Pattern\n");
            output.push_str("----|-------|--------|--------\n");
            for report in &stats.generations {
                output.push_str(&format!(
                    "{:3} | {:5} | {:6} | {}\n",
                    report.generation, report.tasks, report.solved, report.pattern
                ));
            }
        }

        output
    }

    /// Final board next to the target; cells that differ on a target ball
    /// are highlighted
    pub fn format_board_comparison(board: &Board, target: &Board) -> String {
        let geometry = board.geometry();
        let mut output = String::new();
        output.push_str(&format!("{:width$}   Target\n", "Final", width = geometry.cols()));

        for row in 0..geometry.rows() {
            for col in 0..geometry.cols() {
                let p = geometry.from_row_col(row, col);
                let ch = board[p].to_char().to_string();
                let rendered = match (target[p], board[p]) {
                    (Cell::Ball(_), cell) if cell == target[p] => ColorOutput::colored(&ch, Color::Green),
                    (Cell::Ball(_), cell) if cell.is_ball() => ColorOutput::colored(&ch, Color::Yellow),
                    (Cell::Ball(_), _) => ColorOutput::colored(&ch, Color::Red),
                    _ => ch,
                };
                output.push_str(&rendered);
            }
            output.push_str("   ");
            for col in 0..geometry.cols() {
                output.push(target[geometry.from_row_col(row, col)].to_char());
            }
            output.push('\n');
        }

        output
    }

    /// Basin scores in schedule order
    pub fn format_basin_table(board: &Board, scores: &[(f64, PackedCoord)]) -> String {
        let geometry = board.geometry();
        let mut output = String::new();

        output.push_str("Order | Row | Col | Ball | Basin\n");
        output.push_str("------|-----|-----|------|-------\n");
        for (i, &(score, p)) in scores.iter().enumerate() {
            let (row, col) = geometry.to_row_col(p);
            output.push_str(&format!(
                "{:5} | {:3} | {:3} | {:>4} | {:6.1}\n",
                i + 1,
                row,
                col,
                board[p].to_char(),
                score
            ));
        }

        output
    }

    /// Save an outcome in the requested format
    pub fn save_outcome<P: AsRef<Path>>(outcome: &RestoreOutcome, path: P, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        match format {
            OutputFormat::Text => std::fs::write(path, outcome.to_judge_format())
                .with_context(|| format!("Failed to write moves to {}", path.display()))?,
            OutputFormat::Json => outcome
                .save_to_file(path)
                .with_context(|| format!("Failed to write outcome to {}", path.display()))?,
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::{GenerationReport, RestoreStatistics};
    use tempfile::tempdir;

    fn board(rows: &[&str]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn outcome() -> RestoreOutcome {
        let b = board(&["0.."]);
        let mut outcome = RestoreOutcome::empty(
            &b,
            RestoreStatistics {
                width: 3,
                height: 1,
                balls: 1,
                colors: 1,
                score: 1.0,
                ..Default::default()
            },
        );
        outcome.statistics.generations.push(GenerationReport {
            generation: 0,
            tasks: 1,
            solved: 1,
            pattern: "1".to_string(),
        });
        outcome
    }

    #[test]
    fn test_format_outcome() {
        let text = OutcomeFormatter::format_outcome(&outcome());
        assert!(text.contains("Board: 3x1"));
        assert!(text.contains("Score: 1.0000"));
        assert!(text.contains("| 1\n"));
    }

    #[test]
    fn test_board_comparison_lists_both_boards() {
        let text = OutcomeFormatter::format_board_comparison(&board(&["0.", ".1"]), &board(&["0.", "1."]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("0."));
        assert!(lines[2].ends_with("1."));
    }

    #[test]
    fn test_basin_table() {
        let b = board(&["0.", ".1"]);
        let geo = *b.geometry();
        let text = OutcomeFormatter::format_basin_table(&b, &[(0.5, geo.from_row_col(1, 1))]);
        assert!(text.contains("   1 |   1 |    1 |    0.5"));
    }

    #[test]
    fn test_save_outcome_formats() {
        let dir = tempdir().unwrap();
        let text_path = dir.path().join("out/moves.txt");
        let json_path = dir.path().join("out/outcome.json");

        OutcomeFormatter::save_outcome(&outcome(), &text_path, OutputFormat::Text).unwrap();
        OutcomeFormatter::save_outcome(&outcome(), &json_path, OutputFormat::Json).unwrap();

        assert_eq!(std::fs::read_to_string(text_path).unwrap(), "0\n");
        let json = std::fs::read_to_string(json_path).unwrap();
        assert!(RestoreOutcome::from_json(&json).is_ok());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("OK").contains("OK"));
    }
}
