use log::debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Result;

/// The saved list of seeds, one per line.
#[derive(Debug, Clone)]
pub struct SeedList {
    path: PathBuf,
    seeds: Vec<String>,
}

impl SeedList {
    /// Reads the list, dropping blank lines and repeats. A missing file is
    /// an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Result<SeedList> {
        let path = path.into();
        let mut seeds: Vec<String> = Vec::new();

        if path.exists() {
            for line in fs::read_to_string(&path)?.lines() {
                let line = line.trim();
                if !line.is_empty() && !seeds.iter().any(|s| s == line) {
                    seeds.push(line.to_string());
                }
            }
        }

        Ok(SeedList { path, seeds })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    pub fn contains(&self, seed: &str) -> bool {
        self.seeds.iter().any(|s| s == seed)
    }

    /// Appends `seed` unless it is already listed. Returns whether it was
    /// written.
    pub fn add(&mut self, seed: &str) -> Result<bool> {
        if self.contains(seed) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Keep the new seed on its own line even if the file was hand-edited.
        let needs_newline = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|&b| b != b'\n'))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{}", seed)?;

        debug!("saved seed {} to {}", seed, self.path.display());
        self.seeds.push(seed.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::SeedList;
    use std::fs;

    #[test]
    fn missing_file_loads_empty_and_is_created_on_add() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("seeds.txt");

        let mut list = SeedList::load(&path).unwrap();
        assert!(list.seeds().is_empty());

        assert!(list.add("aaaaa-bbbbb-ccccc").unwrap());
        assert!(!list.add("aaaaa-bbbbb-ccccc").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "aaaaa-bbbbb-ccccc\n");
    }

    #[test]
    fn load_deduplicates_and_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "one\n\ntwo\none\n  two  \nthree\n").unwrap();

        let list = SeedList::load(&path).unwrap();
        assert_eq!(list.seeds(), &["one", "two", "three"]);
    }

    #[test]
    fn add_appends_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "old\nold\n").unwrap();

        let mut list = SeedList::load(&path).unwrap();
        list.add("new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nold\nnew\n");
    }

    #[test]
    fn add_starts_a_fresh_line_after_a_hand_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "old").unwrap();

        let mut list = SeedList::load(&path).unwrap();
        list.add("new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }
}
