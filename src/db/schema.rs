// Mirrors the DDL in `database.rs`. Column names and keys are the on-disk
// contract and must not change.

diesel::table! {
    players (steamid) {
        steamid -> Text,
        gold -> Nullable<BigInt>,
        hero_cls_id -> Nullable<Text>,
    }
}

diesel::table! {
    heroes (steamid, cls_id) {
        steamid -> Text,
        cls_id -> Text,
        level -> Nullable<Integer>,
        exp -> Nullable<BigInt>,
    }
}

diesel::table! {
    skills (steamid, hero_cls_id, cls_id) {
        steamid -> Text,
        hero_cls_id -> Text,
        cls_id -> Text,
        level -> Nullable<Integer>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(players, heroes, skills,);
