#![cfg(feature = "rusqlite")]

use quarry::{Cardinality, EntitySchema, Registry, Result, SqliteStore, ValueType};

/// Registry with the `user`/`team` schema the integration tests share.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            EntitySchema::new("team")
                .field("id", ValueType::Int)
                .field("name", ValueType::Text)
                .relation("members", "user", Cardinality::Many, "id", "team_id"),
        )
        .expect("register team");
    registry
        .register(
            EntitySchema::new("user")
                .field("id", ValueType::Int)
                .field("name", ValueType::Text)
                .field("age", ValueType::Int)
                .field("team_id", ValueType::Int)
                .relation("team", "team", Cardinality::One, "team_id", "id"),
        )
        .expect("register user");
    registry
}

/// In-memory store seeded with two teams and five users: ann(10)/ben(20)
/// in alpha, cal(30)/dee(40) in bravo, and eve with no age and no team.
pub fn seeded_store() -> Result<SqliteStore> {
    let store = SqliteStore::open_in_memory()?;
    store.connection().execute_batch(
        r#"
        CREATE TABLE "team" (
            "id" INTEGER PRIMARY KEY,
            "name" TEXT NOT NULL
        );
        CREATE TABLE "user" (
            "id" INTEGER PRIMARY KEY,
            "name" TEXT NOT NULL,
            "age" INTEGER,
            "team_id" INTEGER REFERENCES "team"("id")
        );
        INSERT INTO "team" ("id", "name") VALUES (1, 'alpha'), (2, 'bravo');
        INSERT INTO "user" ("id", "name", "age", "team_id") VALUES
            (1, 'ann', 10, 1),
            (2, 'ben', 20, 1),
            (3, 'cal', 30, 2),
            (4, 'dee', 40, 2),
            (5, 'eve', NULL, NULL);
        "#,
    )
    .map_err(quarry::Error::from)?;
    Ok(store)
}
