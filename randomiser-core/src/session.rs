use log::{debug, info, warn};
use std::collections::HashSet;

use crate::assign::{self, Assignment};
use crate::catalog::{Catalog, LocationId, PoolId};
use crate::schedule::NextTick;
use crate::seed::Seed;
use crate::seedlist::SeedList;
use crate::settings::Settings;
use crate::tags::Tag;
use crate::tracker::{Entry, HintDisplay, Reveal, Tracker};
use crate::{RandomiserError, Result};

/// Outbound messages from the host to everyone else. Fire and forget.
pub trait Channel {
    fn send_seed(&mut self, seed: &str);
    fn send_tracker_update(&mut self, location: &str, is_drop: bool);
}

/// Answers whether a content pack's DLC is installed locally.
pub trait ContentOwnership {
    fn owns(&self, dlc: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct OwnsEverything;

impl ContentOwnership for OwnsEverything {
    fn owns(&self, _dlc: &str) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone)]
pub struct OwnedDlc(HashSet<String>);

impl<S: Into<String>> FromIterator<S> for OwnedDlc {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        OwnedDlc(iter.into_iter().map(Into::into).collect())
    }
}

impl ContentOwnership for OwnedDlc {
    fn owns(&self, dlc: &str) -> bool {
        self.0.contains(dlc)
    }
}

/// Whether this process decides which seed is played.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Host,
    Client,
}

/// The seed currently in effect and what it resolved to.
#[derive(Clone, Debug)]
pub struct AppliedSeed {
    pub seed: Seed,
    pub assignment: Assignment,
}

impl AppliedSeed {
    pub fn locations(&self) -> &[LocationId] {
        &self.assignment.locations
    }

    pub fn items(&self) -> &[PoolId] {
        &self.assignment.items
    }

    pub fn item_count(&self) -> usize {
        self.assignment.item_count()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Deferred {
    Revert(PoolId),
}

/// Owns the catalog and the one applied seed.
///
/// Created at startup and handed by reference to whatever reacts to menu
/// input, network messages or game events.
pub struct Session {
    catalog: Catalog,
    settings: Settings,
    role: Role,
    ownership: Box<dyn ContentOwnership>,
    channel: Option<Box<dyn Channel>>,
    current: Option<AppliedSeed>,
    next_tick: NextTick<Deferred>,
}

impl Session {
    pub fn new(catalog: Catalog, settings: Settings) -> Session {
        let ownership: Box<dyn ContentOwnership> = match &settings.owned_dlc {
            Some(owned) => Box::new(owned.iter().cloned().collect::<OwnedDlc>()),
            None => Box::new(OwnsEverything),
        };

        Session {
            catalog,
            settings,
            role: Role::Host,
            ownership,
            channel: None,
            current: None,
            next_tick: NextTick::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Session {
        self.role = role;
        self
    }

    pub fn with_channel(mut self, channel: impl Channel + 'static) -> Session {
        self.channel = Some(Box::new(channel));
        self
    }

    pub fn with_ownership(mut self, ownership: impl ContentOwnership + 'static) -> Session {
        self.ownership = Box::new(ownership);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_hint_display(&mut self, display: HintDisplay) {
        self.settings.hint_display = display;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn current(&self) -> Option<&AppliedSeed> {
        self.current.as_ref()
    }

    /// Titles of every content pack `tags` needs that is not installed.
    pub fn missing_content(&self, tags: Tag) -> Vec<String> {
        (tags & Tag::CONTENT)
            .iter()
            .filter_map(|tag| tag.info())
            .filter_map(|info| info.content)
            .filter(|content| matches!(content.dlc, Some(dlc) if !self.ownership.owns(dlc)))
            .map(|content| content.title.to_string())
            .collect()
    }

    /// Applies a seed chosen on this machine and shares it with clients.
    ///
    /// All checks run before anything changes: on error the previous seed
    /// stays applied. Applying the current seed again redoes everything.
    pub fn apply(&mut self, seed: &Seed) -> Result<()> {
        if self.role == Role::Client {
            return Err(RandomiserError::NotHost);
        }

        self.apply_local(seed)?;

        if let Some(channel) = self.channel.as_mut() {
            channel.send_seed(seed.as_str());
        }
        Ok(())
    }

    /// Applies a seed pushed by the host. Never re-broadcast.
    pub fn receive_seed(&mut self, text: &str) -> Result<()> {
        let seed = Seed::from_string(text)?;
        self.apply_local(&seed)
    }

    fn apply_local(&mut self, seed: &Seed) -> Result<()> {
        if !self.catalog.supports(seed.version()) {
            return Err(RandomiserError::VersionUnsupported {
                version: seed.version(),
            });
        }

        let missing = self.missing_content(seed.tags());
        if !missing.is_empty() {
            return Err(RandomiserError::MissingContent { titles: missing });
        }

        let assignment = assign::plan(&self.catalog, seed)?;

        self.unapply();
        assign::install(&mut self.catalog, &assignment);

        info!(
            "applied seed {} ({} locations, {} items)",
            seed,
            assignment.location_count(),
            assignment.item_count()
        );

        self.persist(seed, &assignment);
        self.current = Some(AppliedSeed {
            seed: seed.clone(),
            assignment,
        });
        Ok(())
    }

    /// File trouble here is logged, never fatal: the seed is already live.
    fn persist(&self, seed: &Seed, assignment: &Assignment) {
        let saved = SeedList::load(self.settings.seed_list_path())
            .and_then(|mut list| list.add(seed.as_str()));
        if let Err(err) = saved {
            warn!("could not save seed {} to the seed list: {}", seed, err);
        }

        if let Err(err) = Tracker::create(&self.settings.seeds_dir, seed, &self.catalog, assignment)
        {
            warn!("could not create tracker for seed {}: {}", seed, err);
        }
    }

    /// Clears every assigned location. Safe to call with nothing applied.
    pub fn unapply(&mut self) {
        self.tick();

        let assigned: Vec<LocationId> = self
            .catalog
            .locations()
            .filter(|(_, location)| location.item().is_some())
            .map(|(id, _)| id)
            .collect();

        for id in assigned {
            let location = self.catalog.location_mut(id);
            location.set_item(None);
            let hooks = location.hooks_mut();
            hooks.update_hint(None);
            hooks.toggle_hint(false);
        }

        if let Some(previous) = self.current.take() {
            info!("unapplied seed {}", previous.seed);
        }
    }

    /// Explicit teardown at shutdown.
    pub fn shutdown(mut self) {
        self.unapply();
    }

    /// Narrows a pool right before the game rolls from it. The matching
    /// revert fires on the next [`Session::tick`] unless
    /// [`Session::end_prepare`] gets there first.
    pub fn prepare_pool(&mut self, pool: PoolId) {
        self.catalog.pool_mut(pool).prepare();
        if self.next_tick.schedule(Deferred::Revert(pool)) {
            debug!("prepare of '{}' superseded a pending revert", self.catalog.pool(pool).name());
        }
    }

    /// Prepares whatever pool is assigned to `location`.
    pub fn prepare_location(&mut self, location: LocationId) -> Option<PoolId> {
        let pool = self.catalog.location(location).item()?;
        self.prepare_pool(pool);
        Some(pool)
    }

    /// Closes the prepared window straight after the roll.
    pub fn end_prepare(&mut self, pool: PoolId) {
        self.next_tick.cancel(&Deferred::Revert(pool));
        self.catalog.pool_mut(pool).revert();
    }

    /// Runs one scheduler tick. Returns how many deferred tasks fired.
    pub fn tick(&mut self) -> usize {
        let due = self.next_tick.take_due();
        let fired = due.len();
        for task in due {
            match task {
                Deferred::Revert(pool) => self.catalog.pool_mut(pool).revert(),
            }
        }
        fired
    }

    pub fn has_pending_revert(&self, pool: PoolId) -> bool {
        self.next_tick.is_pending(&Deferred::Revert(pool))
    }

    pub fn tracker(&self) -> Option<Tracker> {
        let applied = self.current.as_ref()?;
        Some(Tracker::open(Tracker::path_for(
            &self.settings.seeds_dir,
            &applied.seed,
        )))
    }

    /// The location's item actually dropped in play.
    pub fn location_dropped(&mut self, location: LocationId) -> Result<()> {
        self.record(location, true, true)
    }

    /// A hint for the location was picked up.
    pub fn hint_collected(&mut self, location: LocationId) -> Result<()> {
        self.record(location, false, true)
    }

    /// A tracker event relayed from the host.
    pub fn receive_tracker_update(&mut self, location: &str, is_drop: bool) -> Result<()> {
        match self.catalog.find_location(location) {
            Some(id) => self.record(id, is_drop, false),
            None => {
                warn!("tracker update for unknown location '{}'", location);
                Ok(())
            }
        }
    }

    fn record(&mut self, location: LocationId, is_drop: bool, broadcast: bool) -> Result<()> {
        let tracker = self.tracker().ok_or(RandomiserError::NotApplied)?;

        if broadcast && self.role == Role::Host {
            if let Some(channel) = self.channel.as_mut() {
                channel.send_tracker_update(self.catalog.location(location).name(), is_drop);
            }
        }

        let Some(reveal) = Reveal::for_event(is_drop, self.settings.hint_display) else {
            return Ok(());
        };
        let Some(entry) = Entry::for_location(&self.catalog, location) else {
            return Ok(());
        };

        if let Err(err) = tracker.upgrade(&[(entry, reveal)]) {
            warn!("could not update tracker {}: {}", tracker.path().display(), err);
        }
        Ok(())
    }

    /// Reveals a hint for every location of the applied seed.
    pub fn populate_hints(&self) -> Result<usize> {
        self.populate(Reveal::Hint)
    }

    /// Reveals the item at every location of the applied seed.
    pub fn populate_spoilers(&self) -> Result<usize> {
        self.populate(Reveal::Spoiler)
    }

    fn populate(&self, reveal: Reveal) -> Result<usize> {
        let applied = self.current.as_ref().ok_or(RandomiserError::NotApplied)?;
        let tracker = self.tracker().ok_or(RandomiserError::NotApplied)?;

        let upgrades: Vec<(Entry, Reveal)> = applied
            .locations()
            .iter()
            .filter_map(|id| Entry::for_location(&self.catalog, *id))
            .map(|entry| (entry, reveal))
            .collect();

        let changed = tracker.upgrade(&upgrades)?;
        info!("revealed {} tracker lines", changed);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Hint, Item, ItemPool, Kind, Location, LocationHooks, Narrowing, Rarity, SeedEntry,
        VersionTable,
    };
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Seed(String),
        Tracker(String, bool),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Sent>>>);

    impl Channel for Recorder {
        fn send_seed(&mut self, seed: &str) {
            self.0.borrow_mut().push(Sent::Seed(seed.to_string()));
        }

        fn send_tracker_update(&mut self, location: &str, is_drop: bool) {
            self.0
                .borrow_mut()
                .push(Sent::Tracker(location.to_string(), is_drop));
        }
    }

    #[derive(Clone, Default)]
    struct HintLog(Rc<RefCell<Vec<(Option<Hint>, bool)>>>);

    impl LocationHooks for HintLog {
        fn update_hint(&mut self, hint: Option<Hint>) {
            self.0.borrow_mut().push((hint, false));
        }

        fn toggle_hint(&mut self, visible: bool) {
            if let Some(last) = self.0.borrow_mut().last_mut() {
                last.1 = visible;
            }
        }
    }

    const BASE: Tag = Tag::BASE_GAME;

    struct Fixture {
        _dir: tempfile::TempDir,
        session: Session,
        gate: Rc<RefCell<u32>>,
        hints: HintLog,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let gate = Rc::new(RefCell::new(35u32));
        let hints = HintLog::default();

        let pools = vec![
            ItemPool::new(
                "Bee",
                Hint::Item(Rarity::Legendary, Kind::Shield),
                vec![Item::new("Bee", 1.0, BASE).with_variant(Narrowing::set(gate.clone(), 0))],
            ),
            ItemPool::new(
                "Sham",
                Hint::Item(Rarity::Legendary, Kind::Shield),
                vec![Item::new("Sham", 1.0, BASE)],
            ),
            ItemPool::new(
                "Grog Nozzle",
                Hint::Item(Rarity::Legendary, Kind::Pistol),
                vec![Item::new("Grog Nozzle", 1.0, Tag::DRAGON_KEEP)],
            ),
        ];
        let locations = vec![
            Location::new("Boom Bewm", BASE | Tag::UNIQUE_ENEMY, vec![1.0])
                .with_hooks(hints.clone()),
            Location::new("Bad Maw", BASE | Tag::UNIQUE_ENEMY, vec![1.0]),
            Location::new("Captain Flynt", BASE | Tag::UNIQUE_ENEMY, vec![1.0]),
            Location::new("Handsome Sorcerer", Tag::DRAGON_KEEP | Tag::UNIQUE_ENEMY, vec![1.0]),
        ];
        let v1 = VersionTable {
            locations: vec![
                SeedEntry::new("Boom Bewm", BASE | Tag::UNIQUE_ENEMY),
                SeedEntry::new("Bad Maw", BASE | Tag::UNIQUE_ENEMY),
                SeedEntry::new("Captain Flynt", BASE | Tag::UNIQUE_ENEMY),
                SeedEntry::new("Handsome Sorcerer", Tag::DRAGON_KEEP | Tag::UNIQUE_ENEMY),
            ],
            items: vec![
                SeedEntry::new("Bee", BASE),
                SeedEntry::new("Sham", BASE),
                SeedEntry::new("Grog Nozzle", Tag::DRAGON_KEEP),
            ],
        };
        let mut broken = v1.clone();
        broken.items.push(SeedEntry::new("Renamed Pool", BASE));

        let catalog = Catalog::new(pools, locations)
            .unwrap()
            .with_version(1, v1)
            .with_version(2, broken);

        let settings = Settings {
            seeds_dir: dir.path().join("Seeds"),
            ..Settings::default()
        };

        Fixture {
            _dir: dir,
            session: Session::new(catalog, settings),
            gate,
            hints,
        }
    }

    fn assigned(session: &Session) -> Vec<Option<PoolId>> {
        session.catalog().locations().map(|(_, l)| l.item()).collect()
    }

    fn base_seed(salt: u32) -> Seed {
        Seed::new(salt, BASE | Tag::UNIQUE_ENEMY | Tag::ENABLE_HINTS, 1)
    }

    #[test]
    fn apply_assigns_every_retained_location() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(10)).unwrap();

        let applied = fx.session.current().unwrap();
        assert_eq!(applied.locations().len(), 3);
        assert_eq!(applied.item_count(), 2);

        let items = assigned(&fx.session);
        assert!(items[..3].iter().all(Option::is_some));
        assert_eq!(items[3], None);
    }

    #[test]
    fn apply_a_then_b_then_unapply_clears_everything() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(1)).unwrap();
        fx.session
            .apply(&Seed::new(2, BASE | Tag::DRAGON_KEEP | Tag::UNIQUE_ENEMY, 1))
            .unwrap();
        assert!(assigned(&fx.session).iter().all(Option::is_some));

        fx.session.unapply();
        assert!(assigned(&fx.session).iter().all(Option::is_none));
        assert!(fx.session.current().is_none());

        // Nothing applied: still fine.
        fx.session.unapply();
    }

    #[test]
    fn missing_content_fails_without_touching_locations() {
        let mut fx = fixture();
        fx.session = fx.session.with_ownership(OwnedDlc::default());
        fx.session.apply(&base_seed(3)).unwrap();
        let before = assigned(&fx.session);

        let needs_keep = Seed::new(4, BASE | Tag::DRAGON_KEEP | Tag::UNIQUE_ENEMY, 1);
        for _ in 0..2 {
            match fx.session.apply(&needs_keep) {
                Err(RandomiserError::MissingContent { titles }) => {
                    assert_eq!(titles, vec!["Tiny Tina's Assault on Dragon Keep".to_string()]);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(assigned(&fx.session), before);
        }
        assert_eq!(fx.session.current().unwrap().seed, base_seed(3));
    }

    #[test]
    fn unsupported_version_keeps_the_previous_seed() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(5)).unwrap();
        let before = assigned(&fx.session);

        let future = Seed::new(5, BASE | Tag::UNIQUE_ENEMY, 9);
        assert!(matches!(
            fx.session.apply(&future),
            Err(RandomiserError::VersionUnsupported { version: 9 })
        ));
        assert_eq!(assigned(&fx.session), before);
        assert_eq!(fx.session.current().unwrap().seed, base_seed(5));
    }

    #[test]
    fn catalog_faults_surface_and_change_nothing() {
        let mut fx = fixture();
        let seed = Seed::new(6, BASE | Tag::UNIQUE_ENEMY, 2);
        match fx.session.apply(&seed) {
            Err(RandomiserError::CatalogResolution { name, .. }) => assert_eq!(name, "Renamed Pool"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(assigned(&fx.session).iter().all(Option::is_none));
        assert!(fx.session.current().is_none());
    }

    #[test]
    fn reapplying_the_current_seed_restores_reset_objects() {
        let mut fx = fixture();
        let seed = base_seed(7);
        fx.session.apply(&seed).unwrap();
        let before = assigned(&fx.session);

        let (first, _) = fx.session.catalog().locations().next().unwrap();
        fx.session.catalog_mut().location_mut(first).set_item(None);

        fx.session.apply(&seed).unwrap();
        assert_eq!(assigned(&fx.session), before);
    }

    #[test]
    fn hints_are_refreshed_and_cleared() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(8)).unwrap();
        let last = *fx.hints.0.borrow().last().unwrap();
        assert!(matches!(last, (Some(_), true)));

        fx.session.unapply();
        assert_eq!(*fx.hints.0.borrow().last().unwrap(), (None, false));

        fx.session
            .apply(&Seed::new(8, BASE | Tag::UNIQUE_ENEMY, 1))
            .unwrap();
        assert_eq!(*fx.hints.0.borrow().last().unwrap(), (None, true));
    }

    #[test]
    fn prepared_pools_revert_on_the_next_tick() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(9)).unwrap();
        let bee = fx.session.catalog().find_pool("Bee").unwrap();

        fx.session.prepare_pool(bee);
        assert_eq!(*fx.gate.borrow(), 0);
        assert!(fx.session.has_pending_revert(bee));

        // Re-entrant prepare before the revert fires.
        fx.session.prepare_pool(bee);
        assert_eq!(fx.session.tick(), 1);
        assert_eq!(*fx.gate.borrow(), 35);
        assert!(!fx.session.catalog().pool(bee).is_prepared());
        assert_eq!(fx.session.tick(), 0);
    }

    #[test]
    fn end_prepare_reverts_immediately_and_cancels_the_tick() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(11)).unwrap();
        let bee = fx.session.catalog().find_pool("Bee").unwrap();

        fx.session.prepare_pool(bee);
        fx.session.end_prepare(bee);
        assert_eq!(*fx.gate.borrow(), 35);
        assert!(!fx.session.has_pending_revert(bee));
        assert_eq!(fx.session.tick(), 0);
    }

    #[test]
    fn unapply_flushes_pending_reverts() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(12)).unwrap();
        let bee = fx.session.catalog().find_pool("Bee").unwrap();
        fx.session.prepare_pool(bee);
        fx.session.unapply();
        assert_eq!(*fx.gate.borrow(), 35);
    }

    #[test]
    fn prepare_location_uses_the_assigned_pool() {
        let mut fx = fixture();
        assert_eq!(
            fx.session.prepare_location(LocationId(0)),
            None,
            "nothing assigned yet"
        );
        fx.session.apply(&base_seed(13)).unwrap();
        let pool = fx.session.prepare_location(LocationId(0)).unwrap();
        assert_eq!(Some(pool), fx.session.catalog().location(LocationId(0)).item());
        fx.session.tick();
    }

    #[test]
    fn apply_saves_the_seed_and_creates_a_tracker() {
        let mut fx = fixture();
        let seed = base_seed(14);
        fx.session.apply(&seed).unwrap();
        fx.session.apply(&seed).unwrap();

        let list = SeedList::load(fx.session.settings().seed_list_path()).unwrap();
        assert_eq!(list.seeds(), &[seed.to_string()]);

        let text = fx.session.tracker().unwrap().contents().unwrap();
        assert!(text.starts_with(&format!("Loot Randomiser Seed: {}\n", seed)));
        assert!(text.contains("Total Locations: 3\n"));
        assert!(text.contains("Total Items: 2\n"));
        assert!(text.contains("Enable Hints: On\n"));
        assert!(text.contains("\nBorderlands 2\nBoom Bewm\nBad Maw\nCaptain Flynt\n"));
    }

    #[test]
    fn file_trouble_does_not_undo_an_apply() {
        let mut fx = fixture();
        // A plain file where the seeds directory should be.
        let blocker = fx._dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        fx.session.settings.seeds_dir = blocker;

        fx.session.apply(&base_seed(15)).unwrap();
        assert!(fx.session.current().is_some());
        assert!(fx.session.location_dropped(LocationId(0)).is_ok());
    }

    #[test]
    fn drops_and_hints_upgrade_the_tracker() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(16)).unwrap();
        let tracker = fx.session.tracker().unwrap();
        let entry = Entry::for_location(fx.session.catalog(), LocationId(1)).unwrap();

        fx.session.hint_collected(LocationId(1)).unwrap();
        let hint = format!("Bad Maw - {}\n", entry.hint);
        assert!(tracker.contents().unwrap().contains(&hint));

        fx.session.location_dropped(LocationId(1)).unwrap();
        let spoiler = format!("Bad Maw - {}\n", entry.item);
        assert!(tracker.contents().unwrap().contains(&spoiler));

        fx.session.hint_collected(LocationId(1)).unwrap();
        assert!(tracker.contents().unwrap().contains(&spoiler));
    }

    #[test]
    fn hint_display_none_ignores_hint_pickups() {
        let mut fx = fixture();
        fx.session.set_hint_display(HintDisplay::None);
        fx.session.apply(&base_seed(17)).unwrap();
        fx.session.hint_collected(LocationId(0)).unwrap();
        assert!(fx.session.tracker().unwrap().contents().unwrap().contains("\nBoom Bewm\n"));
    }

    #[test]
    fn populate_spoilers_reveals_everything_once() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(18)).unwrap();
        assert_eq!(fx.session.populate_hints().unwrap(), 3);
        assert_eq!(fx.session.populate_spoilers().unwrap(), 3);
        assert_eq!(fx.session.populate_spoilers().unwrap(), 0);
        assert_eq!(fx.session.populate_hints().unwrap(), 0);
    }

    #[test]
    fn tracker_events_need_an_applied_seed() {
        let mut fx = fixture();
        assert!(matches!(
            fx.session.location_dropped(LocationId(0)),
            Err(RandomiserError::NotApplied)
        ));
        assert!(matches!(
            fx.session.populate_hints(),
            Err(RandomiserError::NotApplied)
        ));
    }

    #[test]
    fn host_broadcasts_and_clients_follow() {
        let host_log = Recorder::default();
        let mut host = fixture();
        host.session = host.session.with_channel(host_log.clone());

        let client_log = Recorder::default();
        let mut client = fixture();
        client.session = client
            .session
            .with_role(Role::Client)
            .with_channel(client_log.clone());

        let seed = base_seed(19);
        host.session.apply(&seed).unwrap();
        host.session.location_dropped(LocationId(2)).unwrap();
        assert_eq!(
            *host_log.0.borrow(),
            vec![
                Sent::Seed(seed.to_string()),
                Sent::Tracker("Captain Flynt".to_string(), true),
            ]
        );

        assert!(matches!(
            client.session.apply(&seed),
            Err(RandomiserError::NotHost)
        ));
        client.session.receive_seed(seed.as_str()).unwrap();
        client
            .session
            .receive_tracker_update("Captain Flynt", true)
            .unwrap();
        client.session.location_dropped(LocationId(0)).unwrap();
        assert!(client_log.0.borrow().is_empty());

        assert_eq!(assigned(&client.session), assigned(&host.session));

        let entry = Entry::for_location(client.session.catalog(), LocationId(2)).unwrap();
        let text = client.session.tracker().unwrap().contents().unwrap();
        assert!(text.contains(&format!("Captain Flynt - {}\n", entry.item)));
    }

    #[test]
    fn unknown_locations_from_the_network_are_ignored() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(20)).unwrap();
        assert!(fx.session.receive_tracker_update("Nowhere", true).is_ok());
    }

    #[test]
    fn owned_dlc_from_settings() {
        let mut fx = fixture();
        let catalog = std::mem::replace(
            &mut fx.session.catalog,
            Catalog::new(Vec::new(), Vec::new()).unwrap(),
        );
        let settings = Settings {
            owned_dlc: Some(vec!["Aster".to_string()]),
            ..fx.session.settings().clone()
        };
        let session = Session::new(catalog, settings);
        assert!(session.missing_content(Tag::DRAGON_KEEP).is_empty());
        assert_eq!(
            session.missing_content(Tag::PIRATES_BOOTY | BASE),
            vec!["Captain Scarlett and her Pirate's Booty".to_string()]
        );
    }

    #[test]
    fn shutdown_clears_state() {
        let mut fx = fixture();
        fx.session.apply(&base_seed(21)).unwrap();
        let bee = fx.session.catalog().find_pool("Bee").unwrap();
        fx.session.prepare_pool(bee);
        fx.session.shutdown();
        assert_eq!(*fx.gate.borrow(), 35);
    }
}
