//! In-memory heroes, their skills and items.

use std::sync::Arc;

use derive_getters::Getters;
use derive_new::new;
use tracing::{debug, info, instrument};

use crate::{ExpCurve, HeroType, ProfileError};

/// A leveled ability of a hero.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Skill {
    /// Skill type id, matching a catalog [`SkillType`](crate::SkillType).
    cls_id: String,
    /// Current skill level.
    level: i32,
}

impl Skill {
    /// Creates a level-0 skill.
    #[instrument(skip(cls_id))]
    pub fn new(cls_id: impl Into<String>) -> Self {
        Self {
            cls_id: cls_id.into(),
            level: 0,
        }
    }

    /// Sets the skill level.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for a negative level.
    #[instrument(skip(self), fields(cls_id = %self.cls_id))]
    pub fn set_level(&mut self, level: i32) -> Result<(), ProfileError> {
        if level < 0 {
            return Err(ProfileError::invalid(format!(
                "Negative level {} for skill {}",
                level, self.cls_id
            )));
        }
        self.level = level;
        Ok(())
    }

    pub(crate) fn restore(&mut self, level: i32) {
        self.level = level;
    }
}

/// A transient gameplay item carried by a hero. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Item {
    /// Item type id.
    cls_id: String,
    /// Permanent items survive a hero switch.
    permanent: bool,
}

/// A hero owned by a player.
#[derive(Debug, Clone, Getters)]
pub struct Hero {
    #[getter(skip)]
    hero_type: Arc<HeroType>,
    /// Current level, never above the type's cap.
    level: i32,
    /// Experience towards the next level.
    exp: i64,
    /// One entry per catalog skill, in catalog order.
    skills: Vec<Skill>,
    /// Items carried; not persisted.
    items: Vec<Item>,
}

impl Hero {
    /// Creates a level-0 hero with one level-0 skill per catalog skill.
    #[instrument(skip(hero_type), fields(cls_id = %hero_type.cls_id()))]
    pub fn new(hero_type: Arc<HeroType>) -> Self {
        let skills = hero_type
            .skills()
            .iter()
            .map(|s| Skill::new(s.cls_id().as_str()))
            .collect();
        Self {
            hero_type,
            level: 0,
            exp: 0,
            skills,
            items: Vec::new(),
        }
    }

    /// Returns the hero's type id.
    pub fn cls_id(&self) -> &str {
        self.hero_type.cls_id()
    }

    /// Returns the catalog definition this hero was built from.
    pub fn hero_type(&self) -> &Arc<HeroType> {
        &self.hero_type
    }

    /// Returns the level cap of this hero's type.
    pub fn max_level(&self) -> i32 {
        *self.hero_type.max_level()
    }

    /// Sets the level.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] if the level is negative or
    /// above [`Hero::max_level`].
    #[instrument(skip(self), fields(cls_id = %self.cls_id()))]
    pub fn set_level(&mut self, level: i32) -> Result<(), ProfileError> {
        if !(0..=self.max_level()).contains(&level) {
            return Err(ProfileError::invalid(format!(
                "Level {} outside 0..={} for hero {}",
                level,
                self.max_level(),
                self.cls_id()
            )));
        }
        self.level = level;
        Ok(())
    }

    /// Sets the experience.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for negative experience.
    #[instrument(skip(self), fields(cls_id = %self.cls_id()))]
    pub fn set_exp(&mut self, exp: i64) -> Result<(), ProfileError> {
        if exp < 0 {
            return Err(ProfileError::invalid(format!(
                "Negative experience {} for hero {}",
                exp,
                self.cls_id()
            )));
        }
        self.exp = exp;
        Ok(())
    }

    /// Overwrites progress with stored values the caller has already sanitized.
    pub(crate) fn restore(&mut self, level: i32, exp: i64) {
        self.level = level;
        self.exp = exp;
    }

    /// Adds experience and levels up while the curve allows it.
    ///
    /// Experience spent on a level is deducted. At the level cap experience
    /// keeps accumulating. Returns the number of levels gained.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for a negative amount.
    #[instrument(skip(self, curve), fields(cls_id = %self.cls_id()))]
    pub fn give_exp(&mut self, amount: i64, curve: &ExpCurve) -> Result<u32, ProfileError> {
        if amount < 0 {
            return Err(ProfileError::invalid(format!(
                "Negative experience gain {} for hero {}",
                amount,
                self.cls_id()
            )));
        }

        self.exp = self.exp.saturating_add(amount);
        let mut gained = 0;
        while self.level < self.max_level() {
            let required = curve.required_exp(self.level);
            if self.exp < required {
                break;
            }
            self.exp -= required;
            self.level += 1;
            gained += 1;
        }

        if gained > 0 {
            info!(level = self.level, gained, "Hero levelled up");
        } else {
            debug!(exp = self.exp, "Experience added");
        }
        Ok(gained)
    }

    /// Finds a skill by type id.
    #[instrument(skip(self))]
    pub fn skill(&self, cls_id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.cls_id == cls_id)
    }

    /// Finds a skill by type id for mutation.
    #[instrument(skip(self))]
    pub fn skill_mut(&mut self, cls_id: &str) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.cls_id == cls_id)
    }

    /// Gives the hero an item.
    #[instrument(skip(self), fields(cls_id = %self.cls_id()))]
    pub fn give_item(&mut self, item: Item) {
        debug!(item = %item.cls_id, permanent = item.permanent, "Item given");
        self.items.push(item);
    }

    /// Drops every non-permanent item, returning how many were dropped.
    pub(crate) fn discard_impermanent_items(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.permanent);
        before - self.items.len()
    }
}
