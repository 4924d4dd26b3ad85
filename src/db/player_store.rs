//! Load and save of a player's gold, current hero and owned heroes.

use std::sync::Arc;

use diesel::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::db::models::{NewPlayerRecord, PlayerRecord};
use crate::db::{DbError, HeroStore, schema};
use crate::{HeroCatalog, PlayerProfile};

/// Persistence for a whole player, delegating hero rows to [`HeroStore`].
#[derive(Debug, Clone)]
pub struct PlayerStore {
    heroes: HeroStore,
    catalog: Arc<HeroCatalog>,
}

impl PlayerStore {
    /// Creates a player store resolving hero rows against `catalog`.
    #[instrument(skip(heroes, catalog))]
    pub fn new(heroes: HeroStore, catalog: Arc<HeroCatalog>) -> Self {
        Self { heroes, catalog }
    }

    /// Returns the hero store used for per-hero rows.
    #[instrument(skip(self))]
    pub fn hero_store(&self) -> &HeroStore {
        &self.heroes
    }

    /// Returns the catalog hero rows are resolved against.
    #[instrument(skip(self))]
    pub fn catalog(&self) -> &Arc<HeroCatalog> {
        &self.catalog
    }

    /// Upserts the player row, then saves the current hero.
    ///
    /// Only the current hero is written. Other owned heroes keep whatever
    /// state they had at their last explicit save.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any write fails.
    #[instrument(skip(self, profile), fields(steamid = %profile.steamid()))]
    pub fn save(&self, profile: &PlayerProfile) -> Result<(), DbError> {
        debug!(gold = profile.gold(), "Saving player");
        let current = profile.current_hero();

        {
            let mut conn = self.heroes.database().connection()?;
            diesel::replace_into(schema::players::table)
                .values(NewPlayerRecord::new(
                    profile.steamid(),
                    *profile.gold(),
                    current.map(|hero| hero.cls_id()),
                ))
                .execute(&mut conn)?;
        }

        if let Some(hero) = current {
            self.heroes.save(profile.steamid(), hero)?;
        }

        info!(
            current_hero = current.map(|hero| hero.cls_id()).unwrap_or("none"),
            "Player saved"
        );
        Ok(())
    }

    /// Writes the profile's gold and nothing else.
    ///
    /// Creates the player row if missing, leaving its current hero NULL. An
    /// existing current-hero pointer and all hero rows are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a write fails.
    #[instrument(skip(self, profile), fields(steamid = %profile.steamid(), gold = profile.gold()))]
    pub fn save_gold(&self, profile: &PlayerProfile) -> Result<(), DbError> {
        debug!("Saving gold");
        let mut conn = self.heroes.database().connection()?;
        let steamid = profile.steamid().as_str();

        diesel::insert_or_ignore_into(schema::players::table)
            .values(NewPlayerRecord::new(steamid, *profile.gold(), None))
            .execute(&mut conn)?;
        diesel::update(schema::players::table.filter(schema::players::steamid.eq(steamid)))
            .set(schema::players::gold.eq(*profile.gold()))
            .execute(&mut conn)?;

        info!("Gold saved");
        Ok(())
    }

    /// Hydrates `profile` with stored gold and every resolvable owned hero.
    ///
    /// Without a player row gold is 0 and no hero is current. Negative or NULL
    /// stored gold reads as 0. Hero rows whose
    /// type id is missing from the catalog are skipped and stay in the store
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a read fails.
    #[instrument(skip(self, profile), fields(steamid = %profile.steamid()))]
    pub fn load(&self, profile: &mut PlayerProfile) -> Result<(), DbError> {
        debug!("Loading player");

        let (record, hero_ids) = {
            let mut conn = self.heroes.database().connection()?;

            let record = schema::players::table
                .filter(schema::players::steamid.eq(profile.steamid().as_str()))
                .select(PlayerRecord::as_select())
                .first::<PlayerRecord>(&mut conn)
                .optional()?;

            let hero_ids: Vec<String> = schema::heroes::table
                .filter(schema::heroes::steamid.eq(profile.steamid().as_str()))
                .select(schema::heroes::cls_id)
                .load(&mut conn)?;

            (record, hero_ids)
        };

        let (stored_gold, current_cls_id) = match record {
            Some(r) => (r.gold().unwrap_or(0), r.hero_cls_id().clone()),
            None => {
                debug!("No player row, using defaults");
                (0, None)
            }
        };
        let gold = if stored_gold < 0 {
            warn!(stored_gold, "Negative stored gold, using 0");
            0
        } else {
            stored_gold
        };
        profile.restore_gold(gold);

        for cls_id in hero_ids {
            let Some(mut hero) = self.catalog.instantiate(&cls_id) else {
                warn!(cls_id = %cls_id, "Skipping hero with unknown type");
                continue;
            };

            self.heroes.load(profile.steamid(), &mut hero)?;
            if !profile.add_hero(hero) {
                continue;
            }
            if current_cls_id.as_deref() == Some(cls_id.as_str()) {
                profile.restore_current_hero(&cls_id);
            }
        }

        info!(
            gold,
            heroes = profile.heroes().len(),
            current_hero = profile.current_hero().map(|hero| hero.cls_id()).unwrap_or("none"),
            "Player loaded"
        );
        Ok(())
    }
}
