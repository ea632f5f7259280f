use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::tags::Tag;
use crate::{EntryKind, RandomiserError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PoolId(pub(crate) usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LocationId(pub(crate) usize);

impl PoolId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl LocationId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
    Seraph,
    Pearlescent,
    Effervescent,
}

impl Rarity {
    fn caption(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::VeryRare => "Very Rare",
            Rarity::Legendary => "Legendary",
            Rarity::Seraph => "Seraph",
            Rarity::Pearlescent => "Pearlescent",
            Rarity::Effervescent => "Effervescent",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    Pistol,
    Shotgun,
    Smg,
    AssaultRifle,
    SniperRifle,
    RocketLauncher,
    Shield,
    GrenadeMod,
    ClassMod,
    Relic,
}

impl Kind {
    fn caption(self) -> &'static str {
        match self {
            Kind::Pistol => "Pistol",
            Kind::Shotgun => "Shotgun",
            Kind::Smg => "SMG",
            Kind::AssaultRifle => "Assault Rifle",
            Kind::SniperRifle => "Sniper Rifle",
            Kind::RocketLauncher => "Rocket Launcher",
            Kind::Shield => "Shield",
            Kind::GrenadeMod => "Grenade Mod",
            Kind::ClassMod => "Class Mod",
            Kind::Relic => "Relic",
        }
    }
}

/// Vague description of a pool, shown before the pool itself is revealed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Hint {
    Dud,
    Item(Rarity, Kind),
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Dud => f.write_str("Nothing"),
            Hint::Item(rarity, kind) => write!(f, "{} {}", rarity.caption(), kind.caption()),
        }
    }
}

/// A value living on a game object that the randomiser may temporarily
/// overwrite. Shared with whatever else in the game reads it.
pub type EngineField<T> = Rc<RefCell<T>>;

/// Engine-side behaviour of a single item variant.
///
/// `prepare` narrows the variant's backing objects right before a drop roll;
/// `revert` must restore them exactly, no matter how many times `prepare`
/// ran in between.
pub trait Variant {
    fn prepare(&mut self) {}
    fn revert(&mut self) {}
}

/// A variant with nothing to narrow.
#[derive(Debug, Default)]
pub struct Plain;

impl Variant for Plain {}

/// Narrows one engine field by mapping its original value.
///
/// The original is captured the first time `prepare` runs and is never
/// replaced afterwards, so overlapping prepares still revert to it.
pub struct Narrowing<T: Clone> {
    field: EngineField<T>,
    narrow: Box<dyn Fn(&T) -> T>,
    original: Option<T>,
}

impl<T: Clone> Narrowing<T> {
    pub fn new(field: EngineField<T>, narrow: impl Fn(&T) -> T + 'static) -> Self {
        Self {
            field,
            narrow: Box::new(narrow),
            original: None,
        }
    }

    /// Forces the field to `value` while prepared.
    pub fn set(field: EngineField<T>, value: T) -> Self
    where
        T: 'static,
    {
        Self::new(field, move |_| value.clone())
    }
}

impl<T: Clone + 'static> Narrowing<Vec<T>> {
    /// Keeps only `start..end` of a weighted table while prepared.
    pub fn slice(field: EngineField<Vec<T>>, start: usize, end: usize) -> Self {
        Self::new(field, move |table: &Vec<T>| {
            let end = end.min(table.len());
            let start = start.min(end);
            table[start..end].to_vec()
        })
    }
}

impl<T: Clone> Variant for Narrowing<T> {
    fn prepare(&mut self) {
        let mut field = self.field.borrow_mut();
        let original = self.original.get_or_insert_with(|| (*field).clone());
        *field = (self.narrow)(original);
    }

    fn revert(&mut self) {
        if let Some(original) = &self.original {
            *self.field.borrow_mut() = original.clone();
        }
    }
}

pub struct Item {
    name: String,
    weight: f32,
    tags: Tag,
    variant: Box<dyn Variant>,
}

impl Item {
    pub fn new(name: impl Into<String>, weight: f32, tags: Tag) -> Item {
        Item {
            name: name.into(),
            weight,
            tags,
            variant: Box::new(Plain),
        }
    }

    pub fn with_variant(mut self, variant: impl Variant + 'static) -> Item {
        self.variant = Box::new(variant);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn tags(&self) -> Tag {
        self.tags
    }

    pub(crate) fn available(&self, active: Tag) -> bool {
        self.tags.is_empty() || self.tags.intersects(active)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("tags", &self.tags)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Slot {
    Variant(usize),
    Fallback,
}

/// A reward unit that can be assigned to a location.
pub struct ItemPool {
    name: String,
    hint: Hint,
    items: Vec<Item>,
    fallback: Option<Item>,
    tags: Tag,
    live: Vec<Slot>,
    prepared: Vec<Slot>,
}

impl ItemPool {
    pub fn new(name: impl Into<String>, hint: Hint, items: Vec<Item>) -> ItemPool {
        let tags = items.iter().fold(Tag::NONE, |acc, item| acc | item.tags);
        ItemPool {
            name: name.into(),
            hint,
            items,
            fallback: None,
            tags,
            live: Vec::new(),
            prepared: Vec::new(),
        }
    }

    /// Used when none of the primary variants' content is available, as long
    /// as the fallback's own content is.
    pub fn with_fallback(mut self, fallback: Item) -> ItemPool {
        self.fallback = Some(fallback);
        self
    }

    pub(crate) fn dud() -> ItemPool {
        ItemPool::new("Dud", Hint::Dud, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hint(&self) -> Hint {
        self.hint
    }

    pub fn tags(&self) -> Tag {
        self.tags
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn fallback(&self) -> Option<&Item> {
        self.fallback.as_ref()
    }

    /// Rebuilds the live weighted table for the given active tags.
    pub fn apply(&mut self, tags: Tag) {
        self.live = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.available(tags))
            .map(|(idx, _)| Slot::Variant(idx))
            .collect();

        if self.live.is_empty() && self.fallback.as_ref().is_some_and(|f| f.available(tags)) {
            self.live.push(Slot::Fallback);
        }
    }

    /// The live weighted table as `(variant, weight)` pairs.
    pub fn live_table(&self) -> Vec<(&str, f32)> {
        self.live
            .iter()
            .filter_map(|slot| self.slot(*slot))
            .map(|item| (item.name(), item.weight()))
            .collect()
    }

    /// Picks a variant from the live table the way the game's own loot roll
    /// would.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Item> {
        let candidates: Vec<&Item> = self.live.iter().filter_map(|s| self.slot(*s)).collect();
        let dist = WeightedIndex::new(candidates.iter().map(|item| item.weight)).ok()?;
        Some(candidates[dist.sample(rng)])
    }

    /// Narrows every live variant's engine objects ahead of a drop roll.
    pub fn prepare(&mut self) {
        for slot in self.live.clone() {
            if let Some(item) = self.slot_mut(slot) {
                item.variant.prepare();
            }
            if !self.prepared.contains(&slot) {
                self.prepared.push(slot);
            }
        }
    }

    /// Restores everything touched since the last revert.
    pub fn revert(&mut self) {
        for slot in std::mem::take(&mut self.prepared) {
            if let Some(item) = self.slot_mut(slot) {
                item.variant.revert();
            }
        }
    }

    pub fn is_prepared(&self) -> bool {
        !self.prepared.is_empty()
    }

    fn slot(&self, slot: Slot) -> Option<&Item> {
        match slot {
            Slot::Variant(idx) => self.items.get(idx),
            Slot::Fallback => self.fallback.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> Option<&mut Item> {
        match slot {
            Slot::Variant(idx) => self.items.get_mut(idx),
            Slot::Fallback => self.fallback.as_mut(),
        }
    }
}

impl fmt::Debug for ItemPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPool")
            .field("name", &self.name)
            .field("hint", &self.hint)
            .field("tags", &self.tags)
            .field("items", &self.items)
            .finish()
    }
}

/// Callbacks a location's in-world hint display reacts to.
pub trait LocationHooks {
    /// New hint text for the location, or `None` to clear it.
    fn update_hint(&mut self, _hint: Option<Hint>) {}
    /// `true` brings a dismissed hint back.
    fn toggle_hint(&mut self, _visible: bool) {}
}

#[derive(Debug, Default)]
pub struct NoHooks;

impl LocationHooks for NoHooks {}

/// A loot source that can be assigned one pool.
pub struct Location {
    name: String,
    tags: Tag,
    rarities: Vec<f32>,
    item: Option<PoolId>,
    hooks: Box<dyn LocationHooks>,
}

impl Location {
    pub fn new(name: impl Into<String>, tags: Tag, rarities: Vec<f32>) -> Location {
        Location {
            name: name.into(),
            tags,
            rarities,
            item: None,
            hooks: Box::new(NoHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: impl LocationHooks + 'static) -> Location {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> Tag {
        self.tags
    }

    pub fn rarities(&self) -> &[f32] {
        &self.rarities
    }

    /// Chance that at least one of the rarity rolls produces a drop.
    pub fn drop_chance(&self) -> f32 {
        1.0 - self
            .rarities
            .iter()
            .fold(1.0, |miss, p| miss * (1.0 - p.clamp(0.0, 1.0)))
    }

    pub fn item(&self) -> Option<PoolId> {
        self.item
    }

    pub(crate) fn set_item(&mut self, item: Option<PoolId>) {
        self.item = item;
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut dyn LocationHooks {
        self.hooks.as_mut()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("rarities", &self.rarities)
            .field("item", &self.item)
            .finish()
    }
}

/// A frozen `(name, tags)` row of a seed format version.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeedEntry {
    pub name: Cow<'static, str>,
    pub tags: Tag,
}

impl SeedEntry {
    pub const fn new(name: &'static str, tags: Tag) -> SeedEntry {
        SeedEntry {
            name: Cow::Borrowed(name),
            tags,
        }
    }

    pub fn owned(name: impl Into<String>, tags: Tag) -> SeedEntry {
        SeedEntry {
            name: Cow::Owned(name.into()),
            tags,
        }
    }
}

/// The location and item lists as they stood when a format version shipped.
#[derive(Clone, Debug, Default)]
pub struct VersionTable {
    pub locations: Vec<SeedEntry>,
    pub items: Vec<SeedEntry>,
}

/// A version table resolved against the live catalog.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub locations: Vec<(LocationId, Tag)>,
    pub items: Vec<(PoolId, Tag)>,
}

/// Every pool and location, indexed by name, plus the frozen per-version
/// tables seeds are resolved through.
pub struct Catalog {
    pools: Vec<ItemPool>,
    locations: Vec<Location>,
    pool_index: HashMap<String, PoolId>,
    location_index: HashMap<String, LocationId>,
    versions: BTreeMap<u8, VersionTable>,
}

impl Catalog {
    /// The reserved pool used to pad out surplus locations.
    pub const DUD: PoolId = PoolId(0);

    pub fn new(pools: Vec<ItemPool>, locations: Vec<Location>) -> Result<Catalog> {
        let mut all_pools = Vec::with_capacity(pools.len() + 1);
        all_pools.push(ItemPool::dud());
        all_pools.extend(pools);

        let mut pool_index = HashMap::with_capacity(all_pools.len());
        for (idx, pool) in all_pools.iter().enumerate().skip(1) {
            if pool_index.insert(pool.name.clone(), PoolId(idx)).is_some() {
                return Err(RandomiserError::Config(format!(
                    "duplicate item pool name '{}'",
                    pool.name
                )));
            }
        }

        let mut location_index = HashMap::with_capacity(locations.len());
        for (idx, location) in locations.iter().enumerate() {
            if location_index
                .insert(location.name.clone(), LocationId(idx))
                .is_some()
            {
                return Err(RandomiserError::Config(format!(
                    "duplicate location name '{}'",
                    location.name
                )));
            }
        }

        Ok(Catalog {
            pools: all_pools,
            locations,
            pool_index,
            location_index,
            versions: BTreeMap::new(),
        })
    }

    pub fn with_version(mut self, version: u8, table: VersionTable) -> Catalog {
        self.versions.insert(version, table);
        self
    }

    pub fn supported_versions(&self) -> impl Iterator<Item = u8> + '_ {
        self.versions.keys().copied()
    }

    pub fn supports(&self, version: u8) -> bool {
        self.versions.contains_key(&version)
    }

    pub fn pool(&self, id: PoolId) -> &ItemPool {
        &self.pools[id.0]
    }

    pub fn pool_mut(&mut self, id: PoolId) -> &mut ItemPool {
        &mut self.pools[id.0]
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.0]
    }

    pub fn location_mut(&mut self, id: LocationId) -> &mut Location {
        &mut self.locations[id.0]
    }

    /// Pools in declaration order, not including the dud.
    pub fn pools(&self) -> impl Iterator<Item = (PoolId, &ItemPool)> {
        self.pools
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, pool)| (PoolId(idx), pool))
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(idx, location)| (LocationId(idx), location))
    }

    pub fn find_pool(&self, name: &str) -> Option<PoolId> {
        self.pool_index.get(name).copied()
    }

    pub fn find_location(&self, name: &str) -> Option<LocationId> {
        self.location_index.get(name).copied()
    }

    /// Looks every row of a version's tables up by name.
    ///
    /// A missing version is the caller's problem to report; a missing name
    /// means the catalog lost an entry an old seed still refers to.
    pub fn resolve(&self, version: u8) -> Result<Resolved> {
        let table = self
            .versions
            .get(&version)
            .ok_or(RandomiserError::VersionUnsupported { version })?;

        let locations = table
            .locations
            .iter()
            .map(|entry| {
                self.find_location(&entry.name)
                    .map(|id| (id, entry.tags))
                    .ok_or_else(|| RandomiserError::CatalogResolution {
                        kind: EntryKind::Location,
                        name: entry.name.to_string(),
                        version,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let items = table
            .items
            .iter()
            .map(|entry| {
                self.find_pool(&entry.name)
                    .map(|id| (id, entry.tags))
                    .ok_or_else(|| RandomiserError::CatalogResolution {
                        kind: EntryKind::ItemPool,
                        name: entry.name.to_string(),
                        version,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Resolved { locations, items })
    }
}
