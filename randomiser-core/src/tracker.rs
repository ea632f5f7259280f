use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assign::Assignment;
use crate::catalog::{Catalog, LocationId};
use crate::seed::Seed;
use crate::tags::{Category, Tag, TAG_TABLE};
use crate::Result;

/// How much a hint pickup reveals about a location.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum HintDisplay {
    None,
    #[default]
    Vague,
    Spoiler,
}

/// How far a tracker line is upgraded. Ordered: hints never replace spoilers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Reveal {
    Hint,
    Spoiler,
}

impl Reveal {
    /// Drops always reveal the item; hint pickups follow the display setting.
    pub fn for_event(is_drop: bool, display: HintDisplay) -> Option<Reveal> {
        if is_drop {
            return Some(Reveal::Spoiler);
        }
        match display {
            HintDisplay::None => None,
            HintDisplay::Vague => Some(Reveal::Hint),
            HintDisplay::Spoiler => Some(Reveal::Spoiler),
        }
    }
}

/// What the tracker knows about one placed location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub location: String,
    pub hint: String,
    pub item: String,
}

impl Entry {
    pub fn for_location(catalog: &Catalog, location: LocationId) -> Option<Entry> {
        let loc = catalog.location(location);
        let pool = catalog.pool(loc.item()?);
        Some(Entry {
            location: loc.name().to_string(),
            hint: pool.hint().to_string(),
            item: pool.name().to_string(),
        })
    }

    fn hint_line(&self) -> String {
        format!("{} - {}", self.location, self.hint)
    }

    fn spoiler_line(&self) -> String {
        format!("{} - {}", self.location, self.item)
    }
}

/// The upgraded form of `line`, if `reveal` moves it forward.
///
/// Only blank and hint lines for `entry` are touched; spoiler lines and
/// lines for other locations come back as `None`.
pub fn upgrade_line(line: &str, entry: &Entry, reveal: Reveal) -> Option<String> {
    if line == entry.location {
        return Some(match reveal {
            Reveal::Hint => entry.hint_line(),
            Reveal::Spoiler => entry.spoiler_line(),
        });
    }

    let spoiler = entry.spoiler_line();
    if reveal == Reveal::Spoiler && line == entry.hint_line() && line != spoiler {
        return Some(spoiler);
    }

    None
}

/// Applies every upgrade to a whole file body, matching lines by content.
/// Repeats for one location collapse to the strongest reveal. Returns the
/// new body and how many lines changed.
pub fn upgrade_text(text: &str, upgrades: &[(Entry, Reveal)]) -> (String, usize) {
    let mut merged: HashMap<&str, (&Entry, Reveal)> = HashMap::new();
    for (entry, reveal) in upgrades {
        merged
            .entry(entry.location.as_str())
            .and_modify(|(_, strongest)| *strongest = (*strongest).max(*reveal))
            .or_insert((entry, *reveal));
    }

    let mut by_line: HashMap<String, (&Entry, Reveal)> = HashMap::new();
    for (entry, reveal) in merged.into_values() {
        by_line.insert(entry.location.clone(), (entry, reveal));
        if reveal == Reveal::Spoiler {
            by_line.insert(entry.hint_line(), (entry, reveal));
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut changed = 0;

    for raw in text.split_inclusive('\n') {
        let body = raw.trim_end_matches('\n').trim_end_matches('\r');
        let ending = &raw[body.len()..];

        match by_line
            .get(body)
            .and_then(|(entry, reveal)| upgrade_line(body, entry, *reveal))
        {
            Some(upgraded) => {
                out.push_str(&upgraded);
                out.push_str(ending);
                changed += 1;
            }
            None => out.push_str(raw),
        }
    }

    (out, changed)
}

fn section_of(tags: Tag) -> Option<Tag> {
    (tags & Tag::CONTENT).iter().next()
}

/// The initial tracker body: header, flag states, then one section per
/// active content pack with every retained location on a blank line.
pub fn render(seed: &Seed, catalog: &Catalog, assignment: &Assignment) -> String {
    let mut out = format!("Loot Randomiser Seed: {}\n", seed);
    out.push_str(&format!("Total Locations: {}\n", assignment.location_count()));
    out.push_str(&format!("Total Items: {}\n", assignment.item_count()));
    out.push('\n');

    for info in TAG_TABLE.iter().filter(|i| i.category != Category::Content) {
        let state = if seed.tags().contains(info.tag) { "On" } else { "Off" };
        out.push_str(&format!("{}: {}\n", info.caption, state));
    }

    let mut sections: Vec<(Option<Tag>, Vec<&str>)> = (seed.tags() & Tag::CONTENT)
        .iter()
        .map(|tag| (Some(tag), Vec::new()))
        .collect();
    sections.push((None, Vec::new()));

    for &id in &assignment.locations {
        let location = catalog.location(id);
        let key = section_of(location.tags());
        let slot = sections
            .iter()
            .position(|(k, _)| *k == key)
            .unwrap_or(sections.len() - 1);
        sections[slot].1.push(location.name());
    }

    for (key, names) in sections {
        if names.is_empty() {
            continue;
        }
        let title = key
            .and_then(|tag| tag.info())
            .and_then(|info| info.content)
            .map(|content| content.title)
            .unwrap_or("Other Locations");

        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for name in names {
            out.push_str(name);
            out.push('\n');
        }
    }

    out
}

/// One seed's tracker file on disk.
#[derive(Clone, Debug)]
pub struct Tracker {
    path: PathBuf,
}

impl Tracker {
    pub fn path_for(dir: &Path, seed: &Seed) -> PathBuf {
        dir.join(format!("{}.txt", seed))
    }

    pub fn open(path: impl Into<PathBuf>) -> Tracker {
        Tracker { path: path.into() }
    }

    /// Writes a fresh tracker unless one already exists for this seed, so a
    /// reapplied seed keeps everything revealed so far.
    pub fn create(
        dir: &Path,
        seed: &Seed,
        catalog: &Catalog,
        assignment: &Assignment,
    ) -> Result<Tracker> {
        let tracker = Tracker::open(Tracker::path_for(dir, seed));
        if !tracker.path.exists() {
            fs::create_dir_all(dir)?;
            fs::write(&tracker.path, render(seed, catalog, assignment))?;
            debug!("created tracker {}", tracker.path.display());
        }
        Ok(tracker)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Upgrades the given lines in place. Returns how many lines changed.
    pub fn upgrade(&self, upgrades: &[(Entry, Reveal)]) -> Result<usize> {
        let text = self.contents()?;
        let (updated, changed) = upgrade_text(&text, upgrades);
        if changed > 0 {
            fs::write(&self.path, updated)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> Entry {
        Entry {
            location: "Boom Bewm".to_string(),
            hint: "Legendary Shield".to_string(),
            item: "Bee".to_string(),
        }
    }

    #[test]
    fn blank_line_upgrades_to_either_level() {
        assert_eq!(
            upgrade_line("Boom Bewm", &entry(), Reveal::Hint).as_deref(),
            Some("Boom Bewm - Legendary Shield")
        );
        assert_eq!(
            upgrade_line("Boom Bewm", &entry(), Reveal::Spoiler).as_deref(),
            Some("Boom Bewm - Bee")
        );
    }

    #[test]
    fn hint_upgrades_to_spoiler_but_never_back() {
        assert_eq!(
            upgrade_line("Boom Bewm - Legendary Shield", &entry(), Reveal::Spoiler).as_deref(),
            Some("Boom Bewm - Bee")
        );
        assert_eq!(
            upgrade_line("Boom Bewm - Legendary Shield", &entry(), Reveal::Hint),
            None
        );
        assert_eq!(upgrade_line("Boom Bewm - Bee", &entry(), Reveal::Hint), None);
        assert_eq!(upgrade_line("Boom Bewm - Bee", &entry(), Reveal::Spoiler), None);
    }

    #[test]
    fn other_locations_are_untouched() {
        assert_eq!(upgrade_line("Bad Maw", &entry(), Reveal::Spoiler), None);
        assert_eq!(upgrade_line("Boom Bewm (Fake)", &entry(), Reveal::Spoiler), None);
    }

    #[test]
    fn hint_then_spoiler_ends_at_spoiler() {
        let text = "Header\n\nBoom Bewm\nBad Maw\n";
        let (text, n) = upgrade_text(text, &[(entry(), Reveal::Hint)]);
        assert_eq!(n, 1);
        let (text, n) = upgrade_text(&text, &[(entry(), Reveal::Spoiler)]);
        assert_eq!(n, 1);
        assert_eq!(text, "Header\n\nBoom Bewm - Bee\nBad Maw\n");
    }

    #[test]
    fn spoiler_then_hint_keeps_the_spoiler() {
        let text = "Boom Bewm\n";
        let (text, _) = upgrade_text(text, &[(entry(), Reveal::Spoiler)]);
        let (text, n) = upgrade_text(&text, &[(entry(), Reveal::Hint)]);
        assert_eq!(n, 0);
        assert_eq!(text, "Boom Bewm - Bee\n");
    }

    #[test]
    fn one_batch_with_both_reveals_lands_on_the_spoiler() {
        let batch = [(entry(), Reveal::Spoiler), (entry(), Reveal::Hint)];
        let (text, n) = upgrade_text("Boom Bewm\n", &batch);
        assert_eq!(n, 1);
        assert_eq!(text, "Boom Bewm - Bee\n");

        let batch = [(entry(), Reveal::Hint), (entry(), Reveal::Spoiler)];
        let (text, _) = upgrade_text("Boom Bewm - Legendary Shield\n", &batch);
        assert_eq!(text, "Boom Bewm - Bee\n");
    }

    #[test]
    fn matching_ignores_line_order_and_keeps_crlf() {
        let text = "Bad Maw\r\nBoom Bewm\r\n";
        let (text, n) = upgrade_text(text, &[(entry(), Reveal::Spoiler)]);
        assert_eq!(n, 1);
        assert_eq!(text, "Bad Maw\r\nBoom Bewm - Bee\r\n");
    }

    #[test]
    fn reveal_levels_follow_the_event() {
        assert_eq!(Reveal::for_event(true, HintDisplay::None), Some(Reveal::Spoiler));
        assert_eq!(Reveal::for_event(false, HintDisplay::None), None);
        assert_eq!(Reveal::for_event(false, HintDisplay::Vague), Some(Reveal::Hint));
        assert_eq!(Reveal::for_event(false, HintDisplay::Spoiler), Some(Reveal::Spoiler));
        assert!(Reveal::Hint < Reveal::Spoiler);
    }
}
