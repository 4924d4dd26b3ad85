//! A connected player's progression state and its validated mutations.

use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::registry::SessionId;
use crate::{Hero, HeroStore, ProfileError};

/// In-memory progression of one connected player.
///
/// The current hero, when set, is always one of the owned heroes. Owned
/// heroes are unique by type id and kept in acquisition order.
#[derive(Debug, Clone, Getters)]
pub struct PlayerProfile {
    /// Transient engine identity of the connection.
    session_id: SessionId,
    /// Stable player identity used as the storage key.
    steamid: String,
    /// Gold, never negative through the public setters.
    gold: i64,
    /// Owned heroes in acquisition order.
    heroes: Vec<Hero>,
    #[getter(skip)]
    current: Option<String>,
}

impl PlayerProfile {
    /// Creates an empty profile: no gold, no heroes.
    #[instrument(skip(steamid), fields(steamid = %steamid.as_ref()))]
    pub fn new(session_id: SessionId, steamid: impl AsRef<str>) -> Self {
        Self {
            session_id,
            steamid: steamid.as_ref().to_string(),
            gold: 0,
            heroes: Vec::new(),
            current: None,
        }
    }

    /// Sets the player's gold.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for a negative amount, leaving
    /// gold unchanged.
    #[instrument(skip(self), fields(steamid = %self.steamid))]
    pub fn set_gold(&mut self, amount: i64) -> Result<(), ProfileError> {
        if amount < 0 {
            warn!(amount, "Rejected negative gold");
            return Err(ProfileError::invalid(format!(
                "Attempt to set negative gold {} for {}",
                amount, self.steamid
            )));
        }
        debug!(from = self.gold, to = amount, "Gold set");
        self.gold = amount;
        Ok(())
    }

    /// Adds gold.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for a negative amount or on
    /// overflow.
    #[instrument(skip(self), fields(steamid = %self.steamid))]
    pub fn give_gold(&mut self, amount: i64) -> Result<(), ProfileError> {
        if amount < 0 {
            return Err(ProfileError::invalid(format!(
                "Attempt to give negative gold {}",
                amount
            )));
        }
        let total = self
            .gold
            .checked_add(amount)
            .ok_or_else(|| ProfileError::invalid("Gold overflow"))?;
        self.set_gold(total)
    }

    /// Removes gold, failing rather than going below zero.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for a negative amount or if
    /// the player cannot afford it.
    #[instrument(skip(self), fields(steamid = %self.steamid))]
    pub fn take_gold(&mut self, amount: i64) -> Result<(), ProfileError> {
        if amount < 0 {
            return Err(ProfileError::invalid(format!(
                "Attempt to take negative gold {}",
                amount
            )));
        }
        let remaining = self
            .gold
            .checked_sub(amount)
            .ok_or_else(|| ProfileError::invalid("Gold underflow"))?;
        self.set_gold(remaining)
    }

    pub(crate) fn restore_gold(&mut self, gold: i64) {
        self.gold = gold;
    }

    /// Returns `true` if the player owns a hero of this type.
    #[instrument(skip(self))]
    pub fn owns_hero(&self, cls_id: &str) -> bool {
        self.hero(cls_id).is_some()
    }

    /// Finds an owned hero by type id.
    #[instrument(skip(self))]
    pub fn hero(&self, cls_id: &str) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.cls_id() == cls_id)
    }

    /// Finds an owned hero by type id for mutation.
    #[instrument(skip(self))]
    pub fn hero_mut(&mut self, cls_id: &str) -> Option<&mut Hero> {
        self.heroes.iter_mut().find(|h| h.cls_id() == cls_id)
    }

    /// Adds a hero to the owned set.
    ///
    /// Returns `false`, leaving the set unchanged, if a hero of the same type
    /// is already owned.
    #[instrument(skip(self, hero), fields(steamid = %self.steamid, cls_id = %hero.cls_id()))]
    pub fn add_hero(&mut self, hero: Hero) -> bool {
        if self.owns_hero(hero.cls_id()) {
            debug!("Hero already owned");
            return false;
        }
        self.heroes.push(hero);
        true
    }

    /// Returns the hero in use, if any.
    #[instrument(skip(self))]
    pub fn current_hero(&self) -> Option<&Hero> {
        self.current.as_deref().and_then(|cls_id| self.hero(cls_id))
    }

    /// Returns the hero in use for mutation, if any.
    #[instrument(skip(self))]
    pub fn current_hero_mut(&mut self) -> Option<&mut Hero> {
        let cls_id = self.current.clone()?;
        self.hero_mut(&cls_id)
    }

    /// Switches to another owned hero.
    ///
    /// When a different hero is current, its progress is saved and its
    /// non-permanent items are discarded before the switch. Switching to the
    /// current hero does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotOwned`] if the hero is not owned, or
    /// [`ProfileError::Store`] if saving the outgoing hero fails. In both
    /// cases the current hero and its items are unchanged.
    #[instrument(skip(self, store), fields(steamid = %self.steamid))]
    pub fn set_current_hero(&mut self, cls_id: &str, store: &HeroStore) -> Result<(), ProfileError> {
        if !self.owns_hero(cls_id) {
            warn!(cls_id, "Attempt to switch to a hero not owned");
            return Err(ProfileError::NotOwned {
                hero: cls_id.to_string(),
                steamid: self.steamid.clone(),
            });
        }

        if self.current.as_deref() == Some(cls_id) {
            debug!(cls_id, "Hero already current");
            return Ok(());
        }

        if let Some(outgoing_id) = self.current.as_deref() {
            if let Some(outgoing) = self.heroes.iter_mut().find(|h| h.cls_id() == outgoing_id) {
                store.save(&self.steamid, outgoing)?;
                let discarded = outgoing.discard_impermanent_items();
                debug!(outgoing = %outgoing_id, discarded, "Outgoing hero saved");
            }
        }

        info!(
            from = self.current.as_deref().unwrap_or("none"),
            to = cls_id,
            "Switched hero"
        );
        self.current = Some(cls_id.to_string());
        Ok(())
    }

    /// Marks an owned hero current without saving anything.
    pub(crate) fn restore_current_hero(&mut self, cls_id: &str) {
        if self.owns_hero(cls_id) {
            self.current = Some(cls_id.to_string());
        }
    }
}
