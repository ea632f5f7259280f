use std::fmt;
use thiserror::Error;

pub mod assign;
pub mod catalog;
pub mod data;
pub mod schedule;
pub mod seed;
pub mod seedlist;
pub mod session;
pub mod settings;
pub mod tags;
pub mod tracker;

pub use assign::Assignment;
pub use catalog::{
    Catalog, Hint, Item, ItemPool, Kind, Location, LocationHooks, LocationId, Narrowing, PoolId,
    Rarity, SeedEntry, Variant, VersionTable,
};
pub use seed::{Seed, CURRENT_VERSION};
pub use session::{AppliedSeed, Channel, ContentOwnership, OwnedDlc, OwnsEverything, Role, Session};
pub use settings::Settings;
pub use tags::{Category, Tag};
pub use tracker::{HintDisplay, Reveal, Tracker};

/// What kind of catalog entry a seed table refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Location,
    ItemPool,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Location => f.write_str("location"),
            EntryKind::ItemPool => f.write_str("item pool"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("settings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{text}' is not a valid seed: {reason}")]
    Format { text: String, reason: String },
    #[error("seed uses format version {version}, which this version of the randomiser does not support")]
    VersionUnsupported { version: u8 },
    #[error("seed requires content that is not installed: {}", .titles.join(", "))]
    MissingContent { titles: Vec<String> },
    #[error("catalog has no {kind} named '{name}' for seed format version {version}")]
    CatalogResolution {
        kind: EntryKind,
        name: String,
        version: u8,
    },
    #[error("only the host can apply a seed")]
    NotHost,
    #[error("no seed is currently applied")]
    NotApplied,
}

pub type Result<T> = std::result::Result<T, RandomiserError>;
