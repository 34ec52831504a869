//! File-mirrored surfaces
//!
//! The source is a text file holding the darts currently on display
//! (`T20 D16 -`). The sink is a directory:
//!
//! - `remaining.txt` - remaining score per slot (`501 340`)
//! - `active.txt` - slot number currently showing the active-turn cue
//! - `score-input` - the score field; entering a score overwrites it with
//!   the value followed by a newline (the commit)

use std::path::{Path, PathBuf};

use dartbridge_core::prelude::*;
use dartbridge_core::DARTS_PER_ROUND;

use super::{SinkSurface, SourceSurface};

pub const REMAINING_FILE: &str = "remaining.txt";
pub const ACTIVE_FILE: &str = "active.txt";
pub const SCORE_INPUT_FILE: &str = "score-input";

fn tokens(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Source display mirrored into a text file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceSurface for FileSource {
    fn read_darts(&mut self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Err(Error::surface_not_found(format!(
                "source display {}",
                self.path.display()
            )));
        }

        let content = std::fs::read_to_string(&self.path)?;
        Ok(tokens(&content)
            .take(DARTS_PER_ROUND)
            .map(str::to_string)
            .collect())
    }
}

/// Scoreboard mirrored into a directory
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl SinkSurface for FileSink {
    fn remaining_scores(&self) -> Result<Vec<u32>> {
        let path = self.file(REMAINING_FILE);
        if !path.exists() {
            return Err(Error::surface_not_found("remaining scores"));
        }

        let content = std::fs::read_to_string(&path)?;
        // Unreadable slots count as 0, like a blank scoreboard cell
        Ok(tokens(&content).map(|t| t.parse().unwrap_or(0)).collect())
    }

    fn active_turn_slot(&self) -> Option<usize> {
        let content = std::fs::read_to_string(self.file(ACTIVE_FILE)).ok()?;
        content.trim().parse().ok()
    }

    fn enter_score(&mut self, score: u32) -> Result<()> {
        let path = self.file(SCORE_INPUT_FILE);
        if !path.exists() {
            return Err(Error::surface_not_found("score input"));
        }

        std::fs::write(&path, format!("{}\n", score))?;
        Ok(())
    }
}
