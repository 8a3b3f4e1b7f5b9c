// Integration tests for the migration framework

use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = Connection::open_in_memory().unwrap();

    // When: Migrations are applied
    reword_store::migrations::apply_migrations(&mut conn).unwrap();

    // Then: The expected tables exist
    let tables = table_names(&conn);
    for expected in ["schema_version", "snapshots", "refs", "reflog"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_head_seeded_as_unborn_main() {
    let mut conn = Connection::open_in_memory().unwrap();
    reword_store::migrations::apply_migrations(&mut conn).unwrap();

    let (target, symbolic): (Option<String>, Option<String>) = conn
        .query_row(
            "SELECT target_id, symbolic_target FROM refs WHERE name = 'HEAD'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();

    assert_eq!(target, None);
    assert_eq!(symbolic.as_deref(), Some("refs/heads/main"));
}

#[test]
fn test_ref_rows_need_exactly_one_target() {
    let mut conn = Connection::open_in_memory().unwrap();
    reword_store::migrations::apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO refs (name, target_id, symbolic_target, updated_at) VALUES ('refs/heads/x', NULL, NULL, 0)",
        [],
    );

    assert!(result.is_err());
}

#[test]
fn test_reapply_keeps_data() {
    let mut conn = Connection::open_in_memory().unwrap();
    reword_store::migrations::apply_migrations(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO reflog (ref_name, old_id, new_id, identity_name, identity_email, logged_at, message)
         VALUES ('HEAD', NULL, 'x', 'n', 'e', 0, 'm')",
        [],
    )
    .unwrap();

    reword_store::migrations::apply_migrations(&mut conn).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reflog", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
