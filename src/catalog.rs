//! Hero type catalog: the gameplay definitions heroes are built from.
//!
//! Persisted rows reference hero and skill types by their `cls_id`. The
//! catalog resolves those ids to descriptors carrying the level cap and the
//! ordered skill list, and constructs fresh [`Hero`] instances from them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{ConfigError, Hero};

/// A skill definition belonging to a hero type.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct SkillType {
    /// Type id, unique within its hero type.
    cls_id: String,
    /// Display name.
    name: String,
}

/// A hero definition: level cap and skills.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct HeroType {
    /// Type id, unique within the catalog.
    cls_id: String,
    /// Display name.
    name: String,
    /// Menu category.
    #[serde(default = "default_category")]
    category: String,
    /// Highest level a hero of this type can reach.
    max_level: i32,
    /// Skills every hero of this type has, in display order.
    #[serde(default)]
    skills: Vec<SkillType>,
}

#[instrument]
fn default_category() -> String {
    "Others".to_string()
}

impl HeroType {
    /// Creates a hero type in the default category.
    #[instrument(skip(cls_id, name, skills))]
    pub fn new(
        cls_id: impl Into<String>,
        name: impl Into<String>,
        max_level: i32,
        skills: Vec<SkillType>,
    ) -> Self {
        Self {
            cls_id: cls_id.into(),
            name: name.into(),
            category: default_category(),
            max_level,
            skills,
        }
    }

    /// Sets the menu category.
    #[instrument(skip(self, category))]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    heroes: Vec<HeroType>,
}

/// Registry of known hero types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    heroes: Vec<Arc<HeroType>>,
}

impl HeroCatalog {
    /// Creates an empty catalog.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from hero types, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if two types share a `cls_id`.
    #[instrument(skip(hero_types))]
    pub fn from_types(hero_types: impl IntoIterator<Item = HeroType>) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for hero_type in hero_types {
            catalog.register(hero_type)?;
        }
        Ok(catalog)
    }

    /// Parses a catalog from TOML text with a `[[heroes]]` array.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or duplicate ids.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse hero catalog: {}", e)))?;
        Self::from_types(file.heroes)
    }

    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading hero catalog from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read hero catalog: {}", e)))?;
        let catalog = Self::from_toml_str(&content)?;
        info!(count = catalog.len(), "Hero catalog loaded");
        Ok(catalog)
    }

    /// Adds a hero type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a type with the same `cls_id` exists, the
    /// level cap is negative, or two skills share a `cls_id`.
    #[instrument(skip(self, hero_type), fields(cls_id = %hero_type.cls_id))]
    pub fn register(&mut self, hero_type: HeroType) -> Result<(), ConfigError> {
        if self.get(&hero_type.cls_id).is_some() {
            return Err(ConfigError::new(format!(
                "Duplicate hero type '{}'",
                hero_type.cls_id
            )));
        }
        if hero_type.max_level < 0 {
            return Err(ConfigError::new(format!(
                "Hero type '{}' has negative max_level {}",
                hero_type.cls_id, hero_type.max_level
            )));
        }
        let mut skill_ids = HashSet::new();
        if let Some(dup) = hero_type
            .skills
            .iter()
            .find(|s| !skill_ids.insert(s.cls_id.as_str()))
        {
            return Err(ConfigError::new(format!(
                "Hero type '{}' defines skill '{}' twice",
                hero_type.cls_id, dup.cls_id
            )));
        }
        debug!("Registering hero type");
        self.heroes.push(Arc::new(hero_type));
        Ok(())
    }

    /// Resolves a type id.
    #[instrument(skip(self))]
    pub fn get(&self, cls_id: &str) -> Option<&Arc<HeroType>> {
        self.heroes.iter().find(|h| h.cls_id == cls_id)
    }

    /// Builds a level-0 hero of the given type, or `None` if unknown.
    #[instrument(skip(self))]
    pub fn instantiate(&self, cls_id: &str) -> Option<Hero> {
        self.get(cls_id).map(|hero_type| Hero::new(Arc::clone(hero_type)))
    }

    /// Iterates all hero types in registration order.
    #[instrument(skip(self))]
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HeroType>> {
        self.heroes.iter()
    }

    /// Returns the number of registered hero types.
    #[instrument(skip(self))]
    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    /// Returns `true` if no hero types are registered.
    #[instrument(skip(self))]
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}
