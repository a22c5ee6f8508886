//! File I/O for boards, problems and move lists

use super::{Board, BoardError, MoveRecord};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Start and target boards of one restore task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub start: Vec<String>,
    pub target: Vec<String>,
}

/// Parse a single board.
///
/// Accepts bare rows, or the judge layout where a line holding the row count
/// precedes the rows. A count line as wide as the rows is itself a valid row
/// of balls and is read as one, so the judge layout needs the count and the
/// rows to differ in width.
pub fn parse_board_from_string(content: &str) -> Result<Board> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let rows = match lines.split_first() {
        Some((header, rest))
            if header.parse::<usize>().ok() == Some(rest.len())
                && rest.first().is_some_and(|row| row.chars().count() != header.chars().count()) =>
        {
            rest
        }
        _ => &lines[..],
    };
    Ok(Board::from_rows(rows)?)
}

/// Parse a problem in judge layout: `H`, `H` start rows, `H`, `H` target rows.
/// Tokens may be separated by any whitespace.
pub fn parse_problem_from_string(content: &str) -> Result<Problem> {
    let mut tokens = content.split_whitespace();
    let mut next_board = |name: &str| -> Result<Vec<String>> {
        let height: usize = tokens
            .next()
            .with_context(|| format!("Missing row count for {} board", name))?
            .parse()
            .with_context(|| format!("Invalid row count for {} board", name))?;
        (0..height)
            .map(|i| {
                tokens
                    .next()
                    .map(str::to_string)
                    .with_context(|| format!("{} board ends after {} of {} rows", name, i, height))
            })
            .collect()
    };

    let start = next_board("start")?;
    let target = next_board("target")?;
    if start.len() != target.len() {
        anyhow::bail!(
            "Start board has {} rows but target board has {}",
            start.len(),
            target.len()
        );
    }
    Ok(Problem { start, target })
}

/// Load a problem file; `-` reads standard input
pub fn load_problem_from_file<P: AsRef<Path>>(path: P) -> Result<Problem> {
    let path = path.as_ref();
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read problem from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read problem file: {}", path.display()))?
    };

    parse_problem_from_string(&content)
        .with_context(|| format!("Failed to parse problem from {}", path.display()))
}

pub fn load_board_from_file<P: AsRef<Path>>(path: P) -> Result<Board> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read board file: {}", path.as_ref().display()))?;

    parse_board_from_string(&content)
        .with_context(|| format!("Failed to parse board from file: {}", path.as_ref().display()))
}

/// Render a problem in judge layout
pub fn problem_to_string(problem: &Problem) -> String {
    let mut result = String::new();
    for rows in [&problem.start, &problem.target] {
        result.push_str(&format!("{}\n", rows.len()));
        for row in rows {
            result.push_str(row);
            result.push('\n');
        }
    }
    result
}

pub fn save_problem_to_file<P: AsRef<Path>>(problem: &Problem, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, problem_to_string(problem))
        .with_context(|| format!("Failed to write problem to file: {}", path.as_ref().display()))?;
    Ok(())
}

/// Parse move records, one per line.
///
/// A leading line with a single number is the judge's record count and is
/// checked against the records that follow.
pub fn parse_moves_from_string(content: &str) -> Result<Vec<MoveRecord>> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let (expected, body) = match lines.split_first() {
        Some((header, rest)) if !header.contains(char::is_whitespace) => {
            let count: usize = header
                .parse()
                .map_err(|_| BoardError::MalformedMove(header.to_string()))?;
            (Some(count), rest)
        }
        _ => (None, &lines[..]),
    };

    let records = body
        .iter()
        .map(|line| line.parse::<MoveRecord>())
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(expected) = expected {
        if expected != records.len() {
            anyhow::bail!("Move list announces {} records but holds {}", expected, records.len());
        }
    }
    Ok(records)
}

pub fn load_moves_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<MoveRecord>> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read move file: {}", path.as_ref().display()))?;
    parse_moves_from_string(&content)
        .with_context(|| format!("Failed to parse moves from file: {}", path.as_ref().display()))
}

/// Render move records in judge layout: count, then one record per line
pub fn moves_to_string(records: &[MoveRecord]) -> String {
    let mut result = format!("{}\n", records.len());
    for record in records {
        result.push_str(&record.to_string());
        result.push('\n');
    }
    result
}

/// Write a handful of small problems for trying the solver out
pub fn create_example_problems<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let examples = [
        ("single_roll.txt", vec!["...", ".0.", "..."], vec!["...", "..0", "..."]),
        ("identical.txt", vec!["0.#", ".1."], vec!["0.#", ".1."]),
        (
            "two_colors.txt",
            vec!["0...", "#...", "...1", "...."],
            vec!["...0", "#...", "....", "1..."],
        ),
        (
            "walled.txt",
            vec!["0.#.", "..#.", "###."],
            vec!["0.#.", "..#.", "###0"],
        ),
    ];

    for (name, start, target) in examples {
        let problem = Problem {
            start: start.into_iter().map(String::from).collect(),
            target: target.into_iter().map(String::from).collect(),
        };
        save_problem_to_file(&problem, dir.join(name))
            .with_context(|| format!("Failed to write {}", name))?;
    }

    Ok(())
}
