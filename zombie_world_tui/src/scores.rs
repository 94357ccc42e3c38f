use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::warn;

/// Name recorded when the winner leaves the prompt empty.
pub const DEFAULT_NAME: &str = "XXX XXX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    /// Time taken to win, lower is better.
    pub seconds: u32,
}

/// Parses `name:seconds` lines. Lines that do not parse are skipped.
pub fn parse_scores(text: &str) -> Vec<ScoreEntry> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| {
            let parsed = line
                .rsplit_once(':')
                .and_then(|(name, seconds)| Some((name, seconds.trim().parse::<u32>().ok()?)));
            match parsed {
                Some((name, seconds)) => Some(ScoreEntry {
                    name: name.trim().to_string(),
                    seconds,
                }),
                None => {
                    warn!("Skipping bad high score line {}: {:?}", number + 1, line);
                    None
                }
            }
        })
        .collect()
}

pub fn format_scores(entries: &[ScoreEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}:{}\n", entry.name, entry.seconds))
        .collect()
}

/// Formats seconds the way the score table shows them, e.g. `1m 5s`.
pub fn format_seconds(seconds: u32) -> String {
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Adds `entry` to a table sorted best first, keeping at most `max_entries`.
///
/// Returns whether the entry made the table. A score equal to the current
/// worst does not displace it.
pub fn insert_score(entries: &mut Vec<ScoreEntry>, entry: ScoreEntry, max_entries: usize) -> bool {
    entries.sort_by_key(|e| e.seconds);
    entries.truncate(max_entries);
    let index = entries.partition_point(|e| e.seconds <= entry.seconds);
    if index >= max_entries {
        return false;
    }
    entries.insert(index, entry);
    entries.truncate(max_entries);
    true
}

fn clean_name(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| *c != ':' && !c.is_control())
        .collect();
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// File-backed high score table.
#[derive(Debug, Clone)]
pub struct HighScores {
    path: PathBuf,
    max_entries: usize,
}

impl HighScores {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        HighScores {
            path: path.into(),
            max_entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the best entries. A missing file is an empty table.
    pub fn load(&self) -> Result<Vec<ScoreEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };
        let mut entries = parse_scores(&text);
        entries.sort_by_key(|e| e.seconds);
        entries.truncate(self.max_entries);
        Ok(entries)
    }

    /// Records a win. Returns whether it made the table.
    pub fn record(&self, name: &str, seconds: u32) -> Result<bool> {
        let mut entries = self.load()?;
        let entry = ScoreEntry {
            name: clean_name(name),
            seconds,
        };
        if !insert_score(&mut entries, entry, self.max_entries) {
            return Ok(false);
        }
        fs::write(&self.path, format_scores(&entries))
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(true)
    }
}
