use log::debug;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Catalog, LocationId, PoolId, Resolved};
use crate::seed::Seed;
use crate::tags::Tag;
use crate::Result;

/// The outcome of running a seed against a catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub version: u8,
    pub tags: Tag,
    /// Retained locations, in catalog table order.
    pub locations: Vec<LocationId>,
    /// Retained pools, in catalog table order.
    pub items: Vec<PoolId>,
    /// One entry per retained location; the dud pads surplus locations.
    pub placements: Vec<(LocationId, PoolId)>,
}

impl Assignment {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn item_at(&self, location: LocationId) -> Option<PoolId> {
        self.placements
            .iter()
            .find(|(loc, _)| *loc == location)
            .map(|(_, pool)| *pool)
    }
}

/// The engine RNG. Seeded from the nine seed bytes and nothing else.
pub fn seeded_rng(seed: &Seed) -> ChaCha8Rng {
    let mut key = [0u8; 32];
    key[..seed.data().len()].copy_from_slice(seed.data());
    ChaCha8Rng::from_seed(key)
}

fn location_kept(required: Tag, active: Tag) -> bool {
    active.contains(required)
}

fn pool_kept(required: Tag, active: Tag, fallback_live: bool) -> bool {
    required.is_empty() || required.intersects(active) || fallback_live
}

fn filter(catalog: &Catalog, resolved: &Resolved, active: Tag) -> (Vec<LocationId>, Vec<PoolId>) {
    let locations = resolved
        .locations
        .iter()
        .filter(|(_, tags)| location_kept(*tags, active))
        .map(|(id, _)| *id)
        .collect();

    let items = resolved
        .items
        .iter()
        .filter(|(id, tags)| {
            let fallback_live = catalog
                .pool(*id)
                .fallback()
                .is_some_and(|fallback| fallback.available(active));
            pool_kept(*tags, active, fallback_live)
        })
        .map(|(id, _)| *id)
        .collect();

    (locations, items)
}

/// Stretches or trims `items` to exactly `location_count` entries.
///
/// - more items than locations: a uniform sample without replacement;
/// - equal counts: a shuffle;
/// - more locations, duplicates off: every item once, dud padding, shuffled;
/// - more locations, duplicates on: whole copies of the list plus a fresh
///   sample for the remainder, shuffled.
pub fn arrange<R: Rng + ?Sized>(
    items: &[PoolId],
    location_count: usize,
    duplicates: bool,
    dud: PoolId,
    rng: &mut R,
) -> Vec<PoolId> {
    let item_count = items.len();

    if location_count < item_count {
        return index::sample(rng, item_count, location_count)
            .into_iter()
            .map(|idx| items[idx])
            .collect();
    }

    let mut arranged: Vec<PoolId> = Vec::with_capacity(location_count);

    if location_count == item_count {
        arranged.extend_from_slice(items);
    } else if !duplicates || item_count == 0 {
        arranged.extend_from_slice(items);
        arranged.resize(location_count, dud);
        debug!(
            "padded {} surplus locations with duds",
            location_count - item_count
        );
    } else {
        for _ in 0..location_count / item_count {
            arranged.extend_from_slice(items);
        }
        let remainder = location_count % item_count;
        arranged.extend(
            index::sample(rng, item_count, remainder)
                .into_iter()
                .map(|idx| items[idx]),
        );
    }

    arranged.shuffle(rng);
    arranged
}

/// Works out where every pool goes without touching the catalog.
pub fn plan(catalog: &Catalog, seed: &Seed) -> Result<Assignment> {
    let resolved = catalog.resolve(seed.version())?;
    let tags = seed.tags();
    let (locations, items) = filter(catalog, &resolved, tags);

    let mut rng = seeded_rng(seed);
    let arranged = arrange(
        &items,
        locations.len(),
        tags.contains(Tag::DUPLICATE_ITEMS),
        Catalog::DUD,
        &mut rng,
    );

    debug!(
        "seed {}: {} locations, {} items retained",
        seed,
        locations.len(),
        items.len()
    );

    let placements = locations.iter().copied().zip(arranged).collect();

    Ok(Assignment {
        version: seed.version(),
        tags,
        locations,
        items,
        placements,
    })
}

/// Pushes an assignment into the live pools and locations.
pub fn install(catalog: &mut Catalog, assignment: &Assignment) {
    for &pool in &assignment.items {
        catalog.pool_mut(pool).apply(assignment.tags);
    }

    for &(location, pool) in &assignment.placements {
        catalog.location_mut(location).set_item(Some(pool));
    }

    let hints = assignment.tags.contains(Tag::ENABLE_HINTS);
    for &(location, pool) in &assignment.placements {
        let hint = hints.then(|| catalog.pool(pool).hint());
        let hooks = catalog.location_mut(location).hooks_mut();
        hooks.update_hint(hint);
        hooks.toggle_hint(true);
    }
}
