//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_snapshot_index",
            sql: include_str!("../../migrations/001_snapshot_index.sql"),
        },
        Migration {
            id: "002_refs",
            sql: include_str!("../../migrations/002_refs.sql"),
        },
        Migration {
            id: "003_reflog",
            sql: include_str!("../../migrations/003_reflog.sql"),
        },
    ]
}
