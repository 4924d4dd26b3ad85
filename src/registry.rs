//! Directory of connected players and their profile lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    Database, DbError, HeroCatalog, HeroStore, PlayerProfile, PlayerStore, ProfileError, Settings,
};

/// Transient engine identity of a connection (the game's userid).
pub type SessionId = u32;

/// Engine-side state tied to a session, released when its profile leaves.
pub trait EngineBinding: fmt::Debug {
    /// Releases whatever the engine holds for `session_id`.
    fn release(&mut self, session_id: SessionId);
}

/// Binding that holds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBinding;

impl EngineBinding for NoopBinding {
    fn release(&mut self, _session_id: SessionId) {}
}

/// Attribute to look an active profile up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey<'a> {
    /// Transient session id.
    Session(SessionId),
    /// Stable steamid.
    SteamId(&'a str),
}

/// Active profiles keyed by session, with load-on-create and save-on-remove.
#[derive(Debug)]
pub struct PlayerRegistry {
    store: PlayerStore,
    starting_heroes: Vec<String>,
    profiles: HashMap<SessionId, PlayerProfile>,
    binding: Box<dyn EngineBinding>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    #[instrument(skip(store, binding))]
    pub fn new(
        store: PlayerStore,
        starting_heroes: Vec<String>,
        binding: Box<dyn EngineBinding>,
    ) -> Self {
        info!("Creating PlayerRegistry");
        Self {
            store,
            starting_heroes,
            profiles: HashMap::new(),
            binding,
        }
    }

    /// Opens the configured database, ensures its schema and builds a registry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the schema cannot be created.
    #[instrument(skip(settings, catalog, binding))]
    pub fn open(
        settings: &Settings,
        catalog: Arc<HeroCatalog>,
        binding: Box<dyn EngineBinding>,
    ) -> Result<Self, DbError> {
        let database = Database::new(settings.database_path());
        database.ensure_schema()?;
        let store = PlayerStore::new(HeroStore::new(database), catalog);
        Ok(Self::new(store, settings.starting_heroes().clone(), binding))
    }

    /// Returns the player store.
    #[instrument(skip(self))]
    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Loads a player's profile, grants missing starting heroes and registers it.
    ///
    /// Granted heroes are not written until the next save. If the player owns
    /// heroes but none is current, the first owned hero becomes current.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SessionInUse`] if the session already has a
    /// profile, or [`ProfileError::Store`] if loading fails.
    #[instrument(skip(self, steamid), fields(steamid = %steamid.as_ref()))]
    pub fn create(
        &mut self,
        session_id: SessionId,
        steamid: impl AsRef<str>,
    ) -> Result<&mut PlayerProfile, ProfileError> {
        if self.profiles.contains_key(&session_id) {
            warn!(session_id, "Session already registered");
            return Err(ProfileError::SessionInUse(session_id));
        }

        let mut profile = PlayerProfile::new(session_id, steamid);
        self.store.load(&mut profile)?;

        for cls_id in &self.starting_heroes {
            if profile.owns_hero(cls_id) {
                continue;
            }
            match self.store.catalog().instantiate(cls_id) {
                Some(hero) => {
                    debug!(cls_id = %cls_id, "Granting starting hero");
                    profile.add_hero(hero);
                }
                None => warn!(cls_id = %cls_id, "Unknown starting hero"),
            }
        }

        if profile.current_hero().is_none() {
            let first = profile.heroes().first().map(|h| h.cls_id().to_string());
            if let Some(cls_id) = first {
                debug!(cls_id = %cls_id, "Defaulting current hero");
                profile.restore_current_hero(&cls_id);
            }
        }

        info!(
            session_id,
            gold = profile.gold(),
            heroes = profile.heroes().len(),
            "Player registered"
        );
        Ok(self.profiles.entry(session_id).or_insert(profile))
    }

    /// Saves a profile, unregisters it and releases its engine binding.
    ///
    /// Returns the removed profile, or `None` if the session has none. If the
    /// save fails the profile stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Store`] if the save fails.
    #[instrument(skip(self))]
    pub fn remove(&mut self, session_id: SessionId) -> Result<Option<PlayerProfile>, ProfileError> {
        let Some(profile) = self.profiles.get(&session_id) else {
            warn!(session_id, "No profile to remove");
            return Ok(None);
        };

        self.store.save(profile)?;
        let removed = self.profiles.remove(&session_id);
        self.binding.release(session_id);

        info!(session_id, "Player removed");
        Ok(removed)
    }

    /// Removes every active profile, e.g. at shutdown.
    ///
    /// Returns how many profiles were removed.
    ///
    /// # Errors
    ///
    /// Stops at the first failed save; profiles not yet removed stay
    /// registered.
    #[instrument(skip(self))]
    pub fn remove_all(&mut self) -> Result<usize, ProfileError> {
        let mut sessions: Vec<SessionId> = self.profiles.keys().copied().collect();
        sessions.sort_unstable();

        let mut removed = 0;
        for session_id in sessions {
            if self.remove(session_id)?.is_some() {
                removed += 1;
            }
        }
        info!(removed, "All players removed");
        Ok(removed)
    }

    /// Switches a registered player's hero, saving the outgoing hero.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NoSuchSession`] for an unknown session, or
    /// whatever [`PlayerProfile::set_current_hero`] returns.
    #[instrument(skip(self))]
    pub fn set_current_hero(
        &mut self,
        session_id: SessionId,
        cls_id: &str,
    ) -> Result<(), ProfileError> {
        let profile = self
            .profiles
            .get_mut(&session_id)
            .ok_or(ProfileError::NoSuchSession(session_id))?;
        profile.set_current_hero(cls_id, self.store.hero_store())
    }

    /// Looks up an active profile; `None` if absent.
    #[instrument(skip(self))]
    pub fn find(&self, key: PlayerKey<'_>) -> Option<&PlayerProfile> {
        match key {
            PlayerKey::Session(session_id) => self.profiles.get(&session_id),
            PlayerKey::SteamId(steamid) => self.find_by(|p| p.steamid() == steamid),
        }
    }

    /// Looks up an active profile for mutation; `None` if absent.
    #[instrument(skip(self))]
    pub fn find_mut(&mut self, key: PlayerKey<'_>) -> Option<&mut PlayerProfile> {
        match key {
            PlayerKey::Session(session_id) => self.profiles.get_mut(&session_id),
            PlayerKey::SteamId(steamid) => {
                self.profiles.values_mut().find(|p| p.steamid() == steamid)
            }
        }
    }

    /// Returns the first active profile matching `predicate`.
    #[instrument(skip(self, predicate))]
    pub fn find_by(&self, predicate: impl Fn(&PlayerProfile) -> bool) -> Option<&PlayerProfile> {
        self.profiles.values().find(|p| predicate(p))
    }

    /// Iterates active profiles in no particular order.
    #[instrument(skip(self))]
    pub fn iter(&self) -> impl Iterator<Item = &PlayerProfile> {
        self.profiles.values()
    }

    /// Returns the number of active profiles.
    #[instrument(skip(self))]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if no profiles are active.
    #[instrument(skip(self))]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
