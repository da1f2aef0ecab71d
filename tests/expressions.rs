#![cfg(feature = "rusqlite")]

mod common;

use quarry::{Error, Query, Result, case, compose, lit};

#[test]
fn comparing_incompatible_types_fails_at_construction() {
    let registry = common::registry();
    let user = registry.source("user").unwrap();

    let err = user.field("age").unwrap().eq("ann").unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");

    let err = user.field("name").unwrap().gt(10).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
}

#[test]
fn unknown_field_is_a_configuration_error() {
    let registry = common::registry();
    let user = registry.source("user").unwrap();
    let err = user.field("salary").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
}

#[test]
fn concat_requires_explicit_conversion() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let err = user.field("name")?.concat(user.field("age")?).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");

    // With an explicit to_text the same composition is fine
    user.field("name")?
        .concat(lit("_"))?
        .concat(user.field("age")?.to_text()?)?;
    Ok(())
}

#[test]
fn arithmetic_rejects_text_operands() {
    let registry = common::registry();
    let user = registry.source("user").unwrap();
    let err = user
        .field("name")
        .unwrap()
        .add(lit(1))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
}

#[test]
fn case_requires_a_branch_and_compatible_results() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;
    let age = user.field("age")?;

    let err = case().otherwise(lit("C")).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");

    let err = case()
        .when(age.clone().eq(10)?, lit("A"))?
        .when(age.clone().eq(20)?, lit(7))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");

    let err = case()
        .when(age.clone().eq(10)?, lit("A"))?
        .otherwise(lit(0))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
    Ok(())
}

#[test]
fn case_condition_must_be_a_predicate() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;
    let err = case().when(user.field("age")?, lit("A")).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
    Ok(())
}

#[test]
fn logical_connectives_require_predicates() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let err = user.field("age")?.and(lit(true)).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");

    let err = user.field("name")?.not().unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "got {err:?}");
    Ok(())
}

#[test]
fn composed_predicate_executes_like_its_present_parts() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    // name filter absent, both age bounds present
    let name: Option<&str> = None;
    let min_age = Some(15_i64);
    let max_age = Some(35_i64);

    let predicate = compose([
        name.map(|n| user.field("name")?.eq(n)).transpose()?,
        min_age.map(|a| user.field("age")?.ge(a)).transpose()?,
        max_age.map(|a| user.field("age")?.le(a)).transpose()?,
    ]);

    let rows = Query::select([user.field("name")?])
        .from(&user)
        .filter(predicate)
        .order_by(user.field("age")?.asc())
        .fetch_all(&store)?;

    let names: Vec<&str> = rows
        .iter()
        .map(|row| row.get(0).unwrap().as_text().unwrap())
        .collect();
    assert_eq!(names, ["ben", "cal"]);
    Ok(())
}

#[test]
fn composing_nothing_means_match_all() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let rows = Query::from_entity(&user)
        .filter(compose([None, None]))
        .fetch_all(&store)?;
    assert_eq!(rows.len(), 5);
    Ok(())
}
