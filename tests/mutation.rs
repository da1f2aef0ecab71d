#![cfg(feature = "rusqlite")]

mod common;

use quarry::{Delete, Error, Query, Result, Store, Update, lit};

#[test]
fn bulk_update_rewrites_matching_rows() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Update::entity(&user)
        .set(user.field("name")?, lit("minor"))
        .filter_expr(user.field("age")?.lt(28)?)
        .execute(&store)?;
    assert_eq!(affected, 2);
    store.invalidate_cache("user");

    let rows = Query::from_entity(&user)
        .filter_expr(user.field("name")?.eq("minor")?)
        .order_by(user.field("age")?.asc())
        .fetch_all(&store)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_named("age")?.as_int()?, 10);
    assert_eq!(rows[1].get_named("age")?.as_int()?, 20);
    Ok(())
}

#[test]
fn update_value_may_reference_current_state() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    // unfiltered: touches every row; eve's null age stays null
    let affected = Update::entity(&user)
        .set(user.field("age")?, user.field("age")?.add(lit(1))?)
        .execute(&store)?;
    assert_eq!(affected, 5);

    let rows = Query::from_entity(&user)
        .order_by(user.field("id")?.asc())
        .fetch_all(&store)?;
    let ages: Vec<Option<i64>> = rows
        .iter()
        .map(|row| row.get_named("age").unwrap().as_int_opt().unwrap())
        .collect();
    assert_eq!(ages, [Some(11), Some(21), Some(31), Some(41), None]);
    Ok(())
}

#[test]
fn multiple_assignments_apply_against_the_old_row() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Update::entity(&user)
        .set(user.field("age")?, user.field("age")?.mul(lit(2))?)
        .set(user.field("name")?, user.field("age")?.to_text()?)
        .filter_expr(user.field("name")?.eq("ann")?)
        .execute(&store)?;
    assert_eq!(affected, 1);

    let row = Query::from_entity(&user)
        .filter_expr(user.field("id")?.eq(1)?)
        .fetch_one(&store)?;
    assert_eq!(row.get_named("age")?.as_int()?, 20);
    // second assignment sees the pre-mutation age, not the doubled one
    assert_eq!(row.get_named("name")?.as_text()?, "10");
    Ok(())
}

#[test]
fn update_matching_nothing_affects_zero_rows() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Update::entity(&user)
        .set(user.field("age")?, lit(99))
        .filter_expr(user.field("name")?.eq("nobody")?)
        .execute(&store)?;
    assert_eq!(affected, 0);
    Ok(())
}

#[test]
fn update_without_assignments_is_rejected() {
    let registry = common::registry();
    let store = common::seeded_store().unwrap();
    let user = registry.source("user").unwrap();

    let err = Update::entity(&user).execute(&store).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
}

#[test]
fn update_target_must_be_a_field_path() {
    let registry = common::registry();
    let store = common::seeded_store().unwrap();
    let user = registry.source("user").unwrap();

    let err = Update::entity(&user)
        .set(lit(1), lit(2))
        .execute(&store)
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
}

#[test]
fn update_assignment_types_are_checked() {
    let registry = common::registry();
    let store = common::seeded_store().unwrap();
    let user = registry.source("user").unwrap();

    let err = Update::entity(&user)
        .set(user.field("age").unwrap(), lit("forty"))
        .execute(&store)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
}

#[test]
fn update_target_must_own_the_path() {
    let registry = common::registry();
    let store = common::seeded_store().unwrap();
    let user = registry.source("user").unwrap();
    let team = registry.source("team").unwrap();

    let err = Update::entity(&user)
        .set(team.field("name").unwrap(), lit("x"))
        .execute(&store)
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
}

#[test]
fn bulk_delete_removes_matching_rows() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Delete::from(&user)
        .filter_expr(user.field("age")?.gt(18)?)
        .execute(&store)?;
    assert_eq!(affected, 3);
    store.invalidate_cache("user");

    let rows = Query::from_entity(&user)
        .order_by(user.field("id")?.asc())
        .fetch_all(&store)?;
    let names: Vec<&str> = rows
        .iter()
        .map(|row| row.get_named("name").unwrap().as_text().unwrap())
        .collect();
    // eve's null age fails the predicate, so she survives
    assert_eq!(names, ["ann", "eve"]);
    Ok(())
}

#[test]
fn delete_matching_nothing_affects_zero_rows() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Delete::from(&user)
        .filter_expr(user.field("age")?.gt(1000)?)
        .execute(&store)?;
    assert_eq!(affected, 0);
    Ok(())
}

#[test]
fn unfiltered_delete_clears_the_entity() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let affected = Delete::from(&user).execute(&store)?;
    assert_eq!(affected, 5);
    assert_eq!(Query::from_entity(&user).fetch_count(&store)?, 0);
    Ok(())
}

#[test]
fn mutation_filters_compose_like_query_filters() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let name_filter: Option<quarry::Expr> = None;
    let affected = Delete::from(&user)
        .filter(name_filter)
        .filter_expr(user.field("age")?.ge(20)?)
        .filter_expr(user.field("age")?.le(30)?)
        .execute(&store)?;
    assert_eq!(affected, 2);
    Ok(())
}
