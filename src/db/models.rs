//! Row records for the `players`, `heroes` and `skills` tables.

use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// Persisted player fields, keyed by steamid.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlayerRecord {
    gold: Option<i64>,
    hero_cls_id: Option<String>,
}

/// Upsertable `players` row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayerRecord<'a> {
    steamid: &'a str,
    gold: i64,
    hero_cls_id: Option<&'a str>,
}

/// Persisted hero fields for one (steamid, cls_id) pair.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::heroes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HeroRecord {
    level: Option<i32>,
    exp: Option<i64>,
}

/// Upsertable `heroes` row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::heroes)]
pub struct NewHeroRecord<'a> {
    steamid: &'a str,
    cls_id: &'a str,
    level: i32,
    exp: i64,
}

/// Persisted skill level of one hero's skill.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::skills)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SkillRecord {
    cls_id: String,
    level: Option<i32>,
}

/// Upsertable `skills` row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::skills)]
pub struct NewSkillRecord<'a> {
    steamid: &'a str,
    hero_cls_id: &'a str,
    cls_id: &'a str,
    level: i32,
}
