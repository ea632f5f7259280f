use crate::catalog::{Catalog, Hint, Item, ItemPool, Kind, Location, Rarity, SeedEntry, VersionTable};
use crate::seed::CURRENT_VERSION;
use crate::tags::Tag;
use crate::Result;

const BASE: Tag = Tag::BASE_GAME;
const ORCHID: Tag = Tag::PIRATES_BOOTY;
const IRIS: Tag = Tag::CAMPAIGN_OF_CARNAGE;
const SAGE: Tag = Tag::HAMMERLOCKS_HUNT;
const ASTER: Tag = Tag::DRAGON_KEEP;
const ANEMONE: Tag = Tag::FIGHT_FOR_SANCTUARY;
const FLAX: Tag = Tag::BLOODY_HARVEST;
const NAST: Tag = Tag::WATTLE_GOBBLER;
const XMAS: Tag = Tag::MERCENARY_DAY;
const DISTILLERY: Tag = Tag::WEDDING_DAY_MASSACRE;
const EASTER: Tag = Tag::SON_OF_CRAWMERAX;
const LOBELIA: Tag = Tag::DIGISTRUCT_PEAK;

const fn legendary(kind: Kind) -> Hint {
    Hint::Item(Rarity::Legendary, kind)
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct VariantDef {
    pub name: &'static str,
    pub weight: f32,
    pub tags: Tag,
}

const fn v(name: &'static str, tags: Tag) -> VariantDef {
    VariantDef {
        name,
        weight: 1.0,
        tags,
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct PoolDef {
    pub name: &'static str,
    pub hint: Hint,
    pub variants: &'static [VariantDef],
    pub fallback: Option<VariantDef>,
    /// First seed format version the pool appears in.
    pub since: u8,
}

impl PoolDef {
    const fn tags(&self) -> Tag {
        let mut tags = Tag::NONE;
        let mut i = 0;
        while i < self.variants.len() {
            tags = tags.union(self.variants[i].tags);
            i += 1;
        }
        tags
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct LocationDef {
    pub name: &'static str,
    pub tags: Tag,
    pub rarities: &'static [f32],
    pub since: u8,
}

pub(crate) const POOLS: &[PoolDef] = &[
    PoolDef {
        name: "Bee",
        hint: legendary(Kind::Shield),
        variants: &[v("Bee", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Sham",
        hint: legendary(Kind::Shield),
        variants: &[v("Sham", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Conference Call",
        hint: legendary(Kind::Shotgun),
        variants: &[v("Conference Call", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Unkempt Harold",
        hint: legendary(Kind::Pistol),
        variants: &[v("Unkempt Harold", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Infinity",
        hint: legendary(Kind::Pistol),
        variants: &[v("Infinity", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Slagga",
        hint: legendary(Kind::Smg),
        variants: &[v("Slagga", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Norfleet",
        hint: legendary(Kind::RocketLauncher),
        variants: &[v("Norfleet", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Lyuda",
        hint: legendary(Kind::SniperRifle),
        variants: &[v("Lyuda", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Shredifier",
        hint: legendary(Kind::AssaultRifle),
        variants: &[v("Shredifier", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Magic Missile",
        hint: legendary(Kind::GrenadeMod),
        variants: &[v("Magic Missile", BASE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Legendary Class Mod",
        hint: legendary(Kind::ClassMod),
        variants: &[
            v("Legendary Siren", BASE),
            v("Legendary Soldier", BASE),
            v("Legendary Hunter", BASE),
            v("Legendary Berserker", BASE),
            v("Legendary Mechromancer", BASE),
            v("Legendary Psycho", BASE),
        ],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Seraph Shield",
        hint: Hint::Item(Rarity::Seraph, Kind::Shield),
        variants: &[
            VariantDef {
                name: "Antagonist",
                weight: 1.0,
                tags: ORCHID,
            },
            VariantDef {
                name: "Blockade",
                weight: 1.0,
                tags: IRIS,
            },
            VariantDef {
                name: "Big Boom Blaster",
                weight: 0.5,
                tags: ORCHID,
            },
        ],
        fallback: Some(v("Sham", BASE)),
        since: 1,
    },
    PoolDef {
        name: "Grog Nozzle",
        hint: legendary(Kind::Pistol),
        variants: &[v("Grog Nozzle", ASTER)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Sky Rocket",
        hint: Hint::Item(Rarity::Rare, Kind::Pistol),
        variants: &[v("Sky Rocket", ASTER)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Rough Rider",
        hint: legendary(Kind::Shield),
        variants: &[v("Rough Rider", ORCHID)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Rapier",
        hint: Hint::Item(Rarity::Rare, Kind::AssaultRifle),
        variants: &[v("Rapier", ORCHID)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Pounding Unkempt Harold",
        hint: legendary(Kind::Pistol),
        variants: &[v("Unkempt Harold", IRIS)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Hail",
        hint: Hint::Item(Rarity::Seraph, Kind::AssaultRifle),
        variants: &[v("Hail", IRIS)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Bearcat",
        hint: Hint::Item(Rarity::Pearlescent, Kind::AssaultRifle),
        variants: &[v("Bearcat", SAGE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Hive",
        hint: legendary(Kind::RocketLauncher),
        variants: &[v("Hive", SAGE)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Unicornsplosion",
        hint: legendary(Kind::GrenadeMod),
        variants: &[v("Unicornsplosion", ASTER)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Effervescent Relic",
        hint: Hint::Item(Rarity::Effervescent, Kind::Relic),
        variants: &[
            v("Unicorn Relic", ASTER),
            v("Hunter's Relic", SAGE),
            v("Mouthwash", ORCHID),
        ],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Headhunter Rewards",
        hint: Hint::Item(Rarity::Legendary, Kind::Relic),
        variants: &[
            v("Pumpkin Kittehs", FLAX),
            v("Greed", NAST),
            v("Fire Drill", XMAS),
            v("Love Thumper", DISTILLERY),
            v("Hefty Gobber", EASTER),
        ],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Overpower Loot",
        hint: legendary(Kind::Shotgun),
        variants: &[v("Butcher", LOBELIA)],
        fallback: None,
        since: 1,
    },
    PoolDef {
        name: "Easy Mode",
        hint: Hint::Item(Rarity::Uncommon, Kind::Smg),
        variants: &[v("Easy Mode", BASE)],
        fallback: None,
        since: 2,
    },
    PoolDef {
        name: "Legendary Binder",
        hint: legendary(Kind::ClassMod),
        variants: &[v("Legendary Binder", ANEMONE)],
        fallback: Some(v("Legendary Siren", BASE)),
        since: 2,
    },
    PoolDef {
        name: "Chain Lightning",
        hint: legendary(Kind::GrenadeMod),
        variants: &[v("Chain Lightning", ANEMONE)],
        fallback: None,
        since: 2,
    },
    PoolDef {
        name: "Pearl Of Ineffable Knowledge",
        hint: Hint::Item(Rarity::Effervescent, Kind::Relic),
        variants: &[v("Pearl Of Ineffable Knowledge", ANEMONE)],
        fallback: None,
        since: 2,
    },
];

const fn loc(name: &'static str, tags: Tag, rarities: &'static [f32], since: u8) -> LocationDef {
    LocationDef {
        name,
        tags,
        rarities,
        since,
    }
}

const UNIQUE: Tag = Tag::UNIQUE_ENEMY;
const RARE: Tag = Tag::RARE_ENEMY;
const SHORT: Tag = Tag::SHORT_MISSION;
const LONG: Tag = Tag::LONG_MISSION;
const VERY_LONG: Tag = Tag::VERY_LONG_MISSION;

pub(crate) const LOCATIONS: &[LocationDef] = &[
    loc("Knuckle Dragger", BASE.union(UNIQUE), &[0.3], 1),
    loc("Boom Bewm", BASE.union(UNIQUE), &[0.3, 0.3], 1),
    loc("Captain Flynt", BASE.union(UNIQUE), &[0.3], 1),
    loc("Bad Maw", BASE.union(UNIQUE), &[0.3], 1),
    loc("Doc Mercy", BASE.union(UNIQUE), &[0.3], 1),
    loc("Savage Lee", BASE.union(UNIQUE), &[0.3], 1),
    loc("Mick Zaford", BASE.union(UNIQUE), &[0.3], 1),
    loc("Bunker", BASE.union(UNIQUE), &[0.3], 1),
    loc("Saturn", BASE.union(UNIQUE), &[0.3], 1),
    loc("Warrior", BASE.union(UNIQUE), &[0.5, 0.5], 1),
    loc("Madame Von Bartlesby", BASE.union(RARE), &[0.5], 1),
    loc("Doomsday", BASE.union(RARE), &[0.5], 1),
    loc("No Vacancy", BASE.union(SHORT), &[1.0], 1),
    loc("Shoot This Guy in the Face", BASE.union(SHORT), &[1.0], 1),
    loc("Claptrap's Secret Stash", BASE.union(SHORT), &[1.0], 1),
    loc("This Just In", BASE.union(LONG), &[1.0], 1),
    loc("Poetic License", BASE.union(LONG), &[1.0], 1),
    loc("Medical Mystery", BASE.union(VERY_LONG), &[1.0], 1),
    loc("Marcus's Vending Machine", BASE.union(Tag::VENDOR), &[1.0], 1),
    loc("Golden Chest", BASE.union(Tag::MISCELLANEOUS), &[1.0], 1),
    loc("Mr. Bubbles", ORCHID.union(UNIQUE), &[0.4], 1),
    loc("Captain Scarlett", ORCHID.union(UNIQUE), &[0.3], 1),
    loc("Hyperius the Invincible", ORCHID.union(Tag::RAID_ENEMY), &[0.5, 0.5], 1),
    loc("Piston", IRIS.union(UNIQUE), &[0.3], 1),
    loc("Pete the Invincible", IRIS.union(Tag::RAID_ENEMY), &[0.5, 0.5], 1),
    loc("Number Six", IRIS.union(Tag::SLAUGHTER), &[1.0], 1),
    loc("Bulstoss", SAGE.union(UNIQUE), &[0.3], 1),
    loc("Voracidous the Invincible", SAGE.union(Tag::RAID_ENEMY), &[0.5, 0.5], 1),
    loc("Handsome Sorcerer", ASTER.union(UNIQUE), &[0.5], 1),
    loc("Treants", ASTER.union(Tag::MOB_FARM), &[0.05], 1),
    loc("Sorcerer's Daughter", ASTER.union(RARE), &[0.4], 1),
    loc("Pumpkin Kingpin", FLAX.union(UNIQUE), &[0.5], 1),
    loc("Ghost", FLAX.union(Tag::VERY_RARE_ENEMY), &[0.2], 1),
    loc("Gobbler", NAST.union(UNIQUE), &[0.5], 1),
    loc("Rakk Man", XMAS.union(UNIQUE), &[0.5], 1),
    loc("Colin Flanders", DISTILLERY.union(UNIQUE), &[0.5], 1),
    loc("Wattle Gobbler", EASTER.union(UNIQUE), &[0.5], 1),
    loc("Digistruct Peak Level 8", LOBELIA.union(Tag::SLOW_ENEMY), &[1.0], 1),
    loc("Loot Midget", BASE.union(Tag::MOB_FARM), &[0.02], 2),
    loc("Haderax the Invincible", ANEMONE.union(Tag::RAID_ENEMY), &[0.5, 0.5], 2),
    loc("Dr. Benedict", ANEMONE.union(UNIQUE), &[0.3], 2),
    loc("Typhon DeLeon", ANEMONE.union(Tag::VENDOR), &[1.0], 2),
];

fn variant(def: &VariantDef) -> Item {
    Item::new(def.name, def.weight, def.tags)
}

fn pool(def: &PoolDef) -> ItemPool {
    let pool = ItemPool::new(def.name, def.hint, def.variants.iter().map(variant).collect());
    match &def.fallback {
        Some(fallback) => pool.with_fallback(variant(fallback)),
        None => pool,
    }
}

/// The frozen tables for one seed format version.
pub fn version_table(version: u8) -> VersionTable {
    VersionTable {
        locations: LOCATIONS
            .iter()
            .filter(|def| def.since <= version)
            .map(|def| SeedEntry::new(def.name, def.tags))
            .collect(),
        items: POOLS
            .iter()
            .filter(|def| def.since <= version)
            .map(|def| SeedEntry::new(def.name, def.tags()))
            .collect(),
    }
}

/// The built-in Borderlands 2 catalog with every shipped format version.
pub fn catalog() -> Result<Catalog> {
    let pools = POOLS.iter().map(pool).collect();
    let locations = LOCATIONS
        .iter()
        .map(|def| Location::new(def.name, def.tags, def.rarities.to_vec()))
        .collect();

    let mut catalog = Catalog::new(pools, locations)?;
    for version in 1..=CURRENT_VERSION {
        catalog = catalog.with_version(version, version_table(version));
    }
    Ok(catalog)
}
