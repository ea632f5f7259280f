use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Which options page a flag belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
    Content,
    Missions,
    Enemies,
    Other,
    Settings,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Content,
        Category::Missions,
        Category::Enemies,
        Category::Other,
        Category::Settings,
    ];

    pub fn caption(self) -> &'static str {
        match self {
            Category::Content => "Content",
            Category::Missions => "Missions",
            Category::Enemies => "Enemies",
            Category::Other => "Other",
            Category::Settings => "Settings",
        }
    }
}

/// Extra metadata carried only by content-pack flags.
#[derive(Copy, Clone, Debug)]
pub struct ContentInfo {
    pub title: &'static str,
    /// Package identifier used to check local ownership; `None` for the base game.
    pub dlc: Option<&'static str>,
}

#[derive(Copy, Clone, Debug)]
pub struct TagInfo {
    pub tag: Tag,
    pub ident: &'static str,
    pub category: Category,
    pub default: bool,
    pub caption: &'static str,
    pub description: &'static str,
    pub content: Option<ContentInfo>,
}

/// A set of feature flags.
///
/// Each declared flag is a single bit. Unknown bits are retained so that seeds
/// created by newer builds still print back exactly as they were read.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(u64);

impl Tag {
    /// Width of the tag field inside a seed.
    pub const BITS: u32 = 36;
    pub const MASK: u64 = (1 << Self::BITS) - 1;

    pub const NONE: Tag = Tag(0);

    pub const BASE_GAME: Tag = Tag(1 << 0);
    pub const PIRATES_BOOTY: Tag = Tag(1 << 1);
    pub const CAMPAIGN_OF_CARNAGE: Tag = Tag(1 << 2);
    pub const HAMMERLOCKS_HUNT: Tag = Tag(1 << 3);
    pub const DRAGON_KEEP: Tag = Tag(1 << 4);
    pub const FIGHT_FOR_SANCTUARY: Tag = Tag(1 << 5);
    pub const BLOODY_HARVEST: Tag = Tag(1 << 6);
    pub const WATTLE_GOBBLER: Tag = Tag(1 << 7);
    pub const MERCENARY_DAY: Tag = Tag(1 << 8);
    pub const WEDDING_DAY_MASSACRE: Tag = Tag(1 << 9);
    pub const SON_OF_CRAWMERAX: Tag = Tag(1 << 10);
    pub const DIGISTRUCT_PEAK: Tag = Tag(1 << 11);

    pub const SHORT_MISSION: Tag = Tag(1 << 12);
    pub const LONG_MISSION: Tag = Tag(1 << 13);
    pub const VERY_LONG_MISSION: Tag = Tag(1 << 14);
    pub const SLAUGHTER: Tag = Tag(1 << 15);

    pub const UNIQUE_ENEMY: Tag = Tag(1 << 16);
    pub const SLOW_ENEMY: Tag = Tag(1 << 17);
    pub const RARE_ENEMY: Tag = Tag(1 << 18);
    pub const VERY_RARE_ENEMY: Tag = Tag(1 << 19);
    pub const MOB_FARM: Tag = Tag(1 << 20);
    pub const RAID_ENEMY: Tag = Tag(1 << 21);

    pub const VENDOR: Tag = Tag(1 << 22);
    pub const MISCELLANEOUS: Tag = Tag(1 << 23);

    pub const ENABLE_HINTS: Tag = Tag(1 << 24);
    pub const DUPLICATE_ITEMS: Tag = Tag(1 << 25);

    pub const CONTENT: Tag = category_mask(Category::Content);
    pub const MISSIONS: Tag = category_mask(Category::Missions);
    pub const ENEMIES: Tag = category_mask(Category::Enemies);
    pub const OTHER: Tag = category_mask(Category::Other);
    pub const SETTINGS: Tag = category_mask(Category::Settings);

    /// Every declared flag.
    pub const ALL: Tag = all_declared();

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Keeps every bit that fits in the seed's tag field, declared or not.
    pub const fn from_bits_retain(bits: u64) -> Tag {
        Tag(bits & Self::MASK)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Tag) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Tag) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Tag) -> Tag {
        Tag(self.0 | other.0)
    }

    pub const fn difference(self, other: Tag) -> Tag {
        Tag(self.0 & !other.0)
    }

    /// The default-on selection shown on a fresh options page.
    pub fn defaults() -> Tag {
        TAG_TABLE
            .iter()
            .filter(|info| info.default)
            .fold(Tag::NONE, |acc, info| acc | info.tag)
    }

    /// Declared single flags contained in `self`, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Tag> {
        TAG_TABLE
            .iter()
            .map(|info| info.tag)
            .filter(move |tag| self.contains(*tag))
    }

    /// Metadata for a single declared flag.
    pub fn info(self) -> Option<&'static TagInfo> {
        TAG_TABLE.iter().find(|info| info.tag == self)
    }

    pub fn category(self) -> Option<Category> {
        self.info().map(|info| info.category)
    }

    pub fn caption(self) -> &'static str {
        self.info().map(|info| info.caption).unwrap_or("?")
    }

    /// Looks a flag up by its identifier or caption, ignoring case and
    /// separators, so `dragon-keep`, `DragonKeep` and `Dragon Keep` all match.
    pub fn parse_flag(name: &str) -> Option<Tag> {
        let wanted = normalise_name(name);
        TAG_TABLE
            .iter()
            .find(|info| {
                normalise_name(info.ident) == wanted || normalise_name(info.caption) == wanted
            })
            .map(|info| info.tag)
    }
}

fn normalise_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

const fn category_mask(category: Category) -> Tag {
    let mut bits = 0u64;
    let mut i = 0;
    while i < TAG_TABLE.len() {
        if TAG_TABLE[i].category as u8 == category as u8 {
            bits |= TAG_TABLE[i].tag.0;
        }
        i += 1;
    }
    Tag(bits)
}

const fn all_declared() -> Tag {
    let mut bits = 0u64;
    let mut i = 0;
    while i < TAG_TABLE.len() {
        bits |= TAG_TABLE[i].tag.0;
        i += 1;
    }
    Tag(bits)
}

impl BitOr for Tag {
    type Output = Tag;
    fn bitor(self, rhs: Tag) -> Tag {
        Tag(self.0 | rhs.0)
    }
}

impl BitOrAssign for Tag {
    fn bitor_assign(&mut self, rhs: Tag) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Tag {
    type Output = Tag;
    fn bitand(self, rhs: Tag) -> Tag {
        Tag(self.0 & rhs.0)
    }
}

impl BitAndAssign for Tag {
    fn bitand_assign(&mut self, rhs: Tag) {
        self.0 &= rhs.0;
    }
}

impl Not for Tag {
    type Output = Tag;
    fn not(self) -> Tag {
        Tag(!self.0 & Self::MASK)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Tag(NONE)");
        }
        let names: Vec<&str> = TAG_TABLE
            .iter()
            .filter(|info| self.contains(info.tag))
            .map(|info| info.ident)
            .collect();
        let unknown = self.difference(Tag::ALL);
        if unknown.is_empty() {
            write!(f, "Tag({})", names.join(" | "))
        } else {
            write!(f, "Tag({} | {:#x})", names.join(" | "), unknown.0)
        }
    }
}

const fn content(
    tag: Tag,
    ident: &'static str,
    title: &'static str,
    dlc: Option<&'static str>,
    caption: &'static str,
) -> TagInfo {
    TagInfo {
        tag,
        ident,
        category: Category::Content,
        default: true,
        caption,
        description: "Include items and locations from this content pack.",
        content: Some(ContentInfo { title, dlc }),
    }
}

const fn flag(
    tag: Tag,
    ident: &'static str,
    category: Category,
    default: bool,
    caption: &'static str,
    description: &'static str,
) -> TagInfo {
    TagInfo {
        tag,
        ident,
        category,
        default,
        caption,
        description,
        content: None,
    }
}

pub const TAG_TABLE: &[TagInfo] = &[
    content(Tag::BASE_GAME, "BaseGame", "Borderlands 2", None, "Base Game"),
    content(
        Tag::PIRATES_BOOTY,
        "PiratesBooty",
        "Captain Scarlett and her Pirate's Booty",
        Some("Orchid"),
        "Pirate's Booty",
    ),
    content(
        Tag::CAMPAIGN_OF_CARNAGE,
        "CampaignOfCarnage",
        "Mr. Torgue's Campaign of Carnage",
        Some("Iris"),
        "Campaign of Carnage",
    ),
    content(
        Tag::HAMMERLOCKS_HUNT,
        "HammerlocksHunt",
        "Sir Hammerlock's Big Game Hunt",
        Some("Sage"),
        "Hammerlock's Hunt",
    ),
    content(
        Tag::DRAGON_KEEP,
        "DragonKeep",
        "Tiny Tina's Assault on Dragon Keep",
        Some("Aster"),
        "Dragon Keep",
    ),
    content(
        Tag::FIGHT_FOR_SANCTUARY,
        "FightForSanctuary",
        "Commander Lilith & the Fight for Sanctuary",
        Some("Anemone"),
        "Fight for Sanctuary",
    ),
    content(
        Tag::BLOODY_HARVEST,
        "BloodyHarvest",
        "Headhunter 1: Bloody Harvest",
        Some("Flax"),
        "Bloody Harvest",
    ),
    content(
        Tag::WATTLE_GOBBLER,
        "WattleGobbler",
        "Headhunter 2: Wattle Gobbler",
        Some("Nast"),
        "Wattle Gobbler",
    ),
    content(
        Tag::MERCENARY_DAY,
        "MercenaryDay",
        "Headhunter 3: Mercenary Day",
        Some("Xmas"),
        "Mercenary Day",
    ),
    content(
        Tag::WEDDING_DAY_MASSACRE,
        "WeddingDayMassacre",
        "Headhunter 4: Wedding Day Massacre",
        Some("Distillery"),
        "Wedding Day Massacre",
    ),
    content(
        Tag::SON_OF_CRAWMERAX,
        "SonOfCrawmerax",
        "Headhunter 5: Son of Crawmerax",
        Some("Easter"),
        "Son of Crawmerax",
    ),
    content(
        Tag::DIGISTRUCT_PEAK,
        "DigistructPeak",
        "Ultimate Vault Hunter Upgrade Pack 2: Digistruct Peak",
        Some("Lobelia"),
        "Digistruct Peak",
    ),
    flag(
        Tag::SHORT_MISSION,
        "ShortMission",
        Category::Missions,
        true,
        "Short Missions",
        "Assign items to missions that take little time to complete.",
    ),
    flag(
        Tag::LONG_MISSION,
        "LongMission",
        Category::Missions,
        true,
        "Long Missions",
        "Assign items to missions that take a while to complete.",
    ),
    flag(
        Tag::VERY_LONG_MISSION,
        "VeryLongMission",
        Category::Missions,
        false,
        "Very Long Missions",
        "Assign items to missions with very lengthy or grindy objectives.",
    ),
    flag(
        Tag::SLAUGHTER,
        "Slaughter",
        Category::Missions,
        false,
        "Slaughter Missions",
        "Assign items to the arena slaughter challenges.",
    ),
    flag(
        Tag::UNIQUE_ENEMY,
        "UniqueEnemy",
        Category::Enemies,
        true,
        "Unique Enemies",
        "Assign items to bosses and named enemies.",
    ),
    flag(
        Tag::SLOW_ENEMY,
        "SlowEnemy",
        Category::Enemies,
        false,
        "Slow Enemies",
        "Assign items to enemies that take a long time to reach or kill.",
    ),
    flag(
        Tag::RARE_ENEMY,
        "RareEnemy",
        Category::Enemies,
        true,
        "Rare Enemies",
        "Assign items to enemies that only spawn some of the time.",
    ),
    flag(
        Tag::VERY_RARE_ENEMY,
        "VeryRareEnemy",
        Category::Enemies,
        false,
        "Very Rare Enemies",
        "Assign items to enemies that spawn very infrequently.",
    ),
    flag(
        Tag::MOB_FARM,
        "MobFarm",
        Category::Enemies,
        false,
        "Mob Farms",
        "Assign items to common enemy types that must be farmed.",
    ),
    flag(
        Tag::RAID_ENEMY,
        "RaidEnemy",
        Category::Enemies,
        false,
        "Raid Enemies",
        "Assign items to raid bosses.",
    ),
    flag(
        Tag::VENDOR,
        "Vendor",
        Category::Other,
        true,
        "Vendors",
        "Assign items to vending machines and shop stock.",
    ),
    flag(
        Tag::MISCELLANEOUS,
        "Miscellaneous",
        Category::Other,
        true,
        "Miscellaneous",
        "Assign items to chests, challenges and other one-off sources.",
    ),
    flag(
        Tag::ENABLE_HINTS,
        "EnableHints",
        Category::Settings,
        true,
        "Enable Hints",
        "Show vague descriptions of assigned items at their locations.",
    ),
    flag(
        Tag::DUPLICATE_ITEMS,
        "DuplicateItems",
        Category::Settings,
        true,
        "Duplicate Items",
        "Fill surplus locations with repeat copies of items instead of duds.",
    ),
];
