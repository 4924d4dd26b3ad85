//! Load and save of a single hero's level, experience and skill levels.

use std::collections::HashMap;

use diesel::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::Hero;
use crate::db::models::{HeroRecord, NewHeroRecord, NewSkillRecord, SkillRecord};
use crate::db::{Database, DbError, schema};

/// Persistence for one hero's progress, keyed by owner steamid and hero type.
#[derive(Debug, Clone)]
pub struct HeroStore {
    database: Database,
}

impl HeroStore {
    /// Creates a hero store on the given database.
    #[instrument(skip(database))]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Returns the underlying database handle.
    #[instrument(skip(self))]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Upserts the hero row, then one row per skill.
    ///
    /// The upserts are independent statements: a failure part way through
    /// can leave skill rows older than the hero row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any write fails.
    #[instrument(skip(self, hero), fields(cls_id = %hero.cls_id(), level = hero.level(), exp = hero.exp()))]
    pub fn save(&self, steamid: &str, hero: &Hero) -> Result<(), DbError> {
        debug!(steamid, "Saving hero");
        let mut conn = self.database.connection()?;

        diesel::replace_into(schema::heroes::table)
            .values(NewHeroRecord::new(
                steamid,
                hero.cls_id(),
                *hero.level(),
                *hero.exp(),
            ))
            .execute(&mut conn)?;

        for skill in hero.skills() {
            diesel::replace_into(schema::skills::table)
                .values(NewSkillRecord::new(
                    steamid,
                    hero.cls_id(),
                    skill.cls_id(),
                    *skill.level(),
                ))
                .execute(&mut conn)?;
        }

        info!(steamid, skills = hero.skills().len(), "Hero saved");
        Ok(())
    }

    /// Hydrates `hero` from its stored row and skill rows.
    ///
    /// A missing hero row means an unplayed hero: level 0, experience 0. A
    /// stored level above the type's cap is clamped to the cap; negative or
    /// NULL levels and experience read as 0. Skills without a usable stored
    /// row keep their current level; stored skills the type no longer defines
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a read fails.
    #[instrument(skip(self, hero), fields(cls_id = %hero.cls_id()))]
    pub fn load(&self, steamid: &str, hero: &mut Hero) -> Result<(), DbError> {
        debug!(steamid, "Loading hero");
        let mut conn = self.database.connection()?;

        let record = schema::heroes::table
            .filter(schema::heroes::steamid.eq(steamid))
            .filter(schema::heroes::cls_id.eq(hero.cls_id()))
            .select(HeroRecord::as_select())
            .first::<HeroRecord>(&mut conn)
            .optional()?;

        let (stored_level, stored_exp) = record
            .map(|r| (r.level().unwrap_or(0), r.exp().unwrap_or(0)))
            .unwrap_or((0, 0));

        let max_level = hero.max_level();
        let level = if stored_level < 0 {
            warn!(steamid, stored_level, "Negative stored level, using 0");
            0
        } else if stored_level > max_level {
            warn!(
                steamid,
                stored_level, max_level, "Stored level exceeds level cap, clamping"
            );
            max_level
        } else {
            stored_level
        };
        let exp = if stored_exp < 0 {
            warn!(steamid, stored_exp, "Negative stored experience, using 0");
            0
        } else {
            stored_exp
        };
        hero.restore(level, exp);

        let stored_skills: HashMap<String, i32> = schema::skills::table
            .filter(schema::skills::steamid.eq(steamid))
            .filter(schema::skills::hero_cls_id.eq(hero.cls_id()))
            .select(SkillRecord::as_select())
            .load::<SkillRecord>(&mut conn)?
            .into_iter()
            .filter_map(|r| match *r.level() {
                Some(level) if level >= 0 => Some((r.cls_id().clone(), level)),
                Some(level) => {
                    warn!(steamid, skill = %r.cls_id(), level, "Ignoring negative skill level");
                    None
                }
                None => None,
            })
            .collect();

        let cls_ids: Vec<String> = hero.skills().iter().map(|s| s.cls_id().clone()).collect();
        let mut restored = 0;
        for cls_id in cls_ids {
            if let (Some(level), Some(skill)) = (stored_skills.get(&cls_id), hero.skill_mut(&cls_id))
            {
                skill.restore(*level);
                restored += 1;
            }
        }

        info!(steamid, level, exp, skills = restored, "Hero loaded");
        Ok(())
    }
}
