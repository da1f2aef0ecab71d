#![cfg(feature = "rusqlite")]

mod common;

use quarry::{
    Error, Projection, Query, Result, Row, Shape, TupleMapper, Value, ValueType, lit,
};

#[derive(Debug, Clone, PartialEq)]
struct UserDto {
    name: String,
    age: i64,
}

impl Shape for UserDto {
    const NAME: &'static str = "UserDto";

    fn fields() -> &'static [(&'static str, ValueType)] {
        &[("name", ValueType::Text), ("age", ValueType::Int)]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut values = values.into_iter();
        let name = values
            .next()
            .ok_or_else(|| Error::Mapping("missing name".into()))?
            .as_text()?
            .to_owned();
        let age = values
            .next()
            .ok_or_else(|| Error::Mapping("missing age".into()))?
            .as_int()?;
        Ok(Self { name, age })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct UserSummary {
    name: String,
    age: Option<i64>,
}

impl Shape for UserSummary {
    const NAME: &'static str = "UserSummary";

    fn fields() -> &'static [(&'static str, ValueType)] {
        &[("name", ValueType::Text), ("age", ValueType::Int)]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut values = values.into_iter();
        let name = values
            .next()
            .ok_or_else(|| Error::Mapping("missing name".into()))?
            .as_text()?
            .to_owned();
        let age = values
            .next()
            .ok_or_else(|| Error::Mapping("missing age".into()))?
            .as_int_opt()?;
        Ok(Self { name, age })
    }
}

#[test]
fn constructor_strategy_matches_positionally() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?, user.field("age")?])
        .from(&user)
        .filter_expr(user.field("age")?.is_not_null())
        .order_by(user.field("age")?.asc());
    let projection = Projection::<UserDto>::constructor(&query)?;
    let dtos = query.fetch_all_as(&store, &projection)?;

    assert_eq!(dtos.len(), 4);
    assert_eq!(
        dtos[0],
        UserDto {
            name: "ann".into(),
            age: 10
        }
    );
    assert_eq!(dtos[3].name, "dee");
    Ok(())
}

#[test]
fn field_strategy_matches_by_label() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    // selection order differs from the shape's declaration order
    let query = Query::select([user.field("age")?, user.field("name")?])
        .from(&user)
        .filter_expr(user.field("name")?.eq("cal")?);
    let projection = Projection::<UserDto>::fields(&query)?;
    let dtos = query.fetch_all_as(&store, &projection)?;

    assert_eq!(
        dtos,
        [UserDto {
            name: "cal".into(),
            age: 30
        }]
    );
    Ok(())
}

#[test]
fn field_strategy_resolves_computed_columns_via_alias() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let query = Query::select([
        user.field("name")?,
        user.field("age")?.add(lit(1))?.alias("age"),
    ])
    .from(&user)
    .filter_expr(user.field("name")?.eq("ben")?);
    let projection = Projection::<UserDto>::fields(&query)?;
    let dtos = query.fetch_all_as(&store, &projection)?;
    assert_eq!(dtos[0].age, 21);
    Ok(())
}

#[test]
fn constructor_arity_is_checked_up_front() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?]).from(&user);
    let err = Projection::<UserDto>::constructor(&query).unwrap_err();
    assert!(
        matches!(
            err,
            Error::ProjectionArity {
                expected: 2,
                actual: 1
            }
        ),
        "got {err:?}"
    );
    Ok(())
}

#[test]
fn constructor_types_are_checked_up_front() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    // name/age swapped against the shape's declared order
    let query = Query::select([user.field("age")?, user.field("name")?]).from(&user);
    let err = Projection::<UserDto>::constructor(&query).unwrap_err();
    assert!(matches!(err, Error::ProjectionType(_)), "got {err:?}");
    Ok(())
}

#[test]
fn field_strategy_rejects_unresolved_labels() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?, user.field("team_id")?]).from(&user);
    let err = Projection::<UserDto>::fields(&query).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");

    // a computed column with no alias carries no label at all
    let query = Query::select([user.field("name")?, user.field("age")?.add(lit(1))?]).from(&user);
    let err = Projection::<UserDto>::fields(&query).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    Ok(())
}

#[test]
fn field_strategy_rejects_duplicate_labels() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let query = Query::select([user.field("age")?, user.field("id")?.alias("age")]).from(&user);
    let err = Projection::<UserDto>::fields(&query).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    Ok(())
}

#[test]
fn field_strategy_fills_uncovered_fields_with_null() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?])
        .from(&user)
        .filter_expr(user.field("name")?.eq("ann")?);
    let projection = Projection::<UserSummary>::fields(&query)?;
    let summaries = query.fetch_all_as(&store, &projection)?;
    assert_eq!(
        summaries,
        [UserSummary {
            name: "ann".into(),
            age: None
        }]
    );
    Ok(())
}

#[test]
fn optional_fields_absorb_null_cells() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?, user.field("age")?])
        .from(&user)
        .filter_expr(user.field("name")?.eq("eve")?);
    let projection = Projection::<UserSummary>::constructor(&query)?;
    let summaries = query.fetch_all_as(&store, &projection)?;
    assert_eq!(summaries[0].age, None);
    Ok(())
}

#[test]
fn tuple_strategy_is_the_row_itself() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;

    let query = Query::select([user.field("name")?, user.field("age")?.alias("years")])
        .from(&user)
        .filter_expr(user.field("name")?.eq("ben")?);
    let rows: Vec<Row> = query.fetch_all_as(&store, &TupleMapper)?;

    let row = &rows[0];
    assert_eq!(row.get(0)?.as_text()?, "ben");
    assert_eq!(row.get(1)?.as_int()?, 20);
    assert_eq!(row.get_named("years")?.as_int()?, 20);

    let err = row.get_named("missing").unwrap_err();
    assert!(matches!(err, Error::UnknownProjectionKey(_)), "got {err:?}");
    let err = row.get(9).unwrap_err();
    assert!(matches!(err, Error::UnknownProjectionKey(_)), "got {err:?}");
    Ok(())
}

#[test]
fn constructor_strategy_ignores_eager_join_columns() -> Result<()> {
    let registry = common::registry();
    let store = common::seeded_store()?;
    let user = registry.source("user")?;
    let team = registry.source("team")?;

    // eager join appends team columns after the explicit selection; the
    // constructor only consumes the selection prefix
    let query = Query::select([user.field("name")?, user.field("age")?])
        .from(&user)
        .eager_join(&user.relation("team")?, &team)
        .order_by(user.field("id")?.asc());
    let projection = Projection::<UserDto>::constructor(&query)?;
    let dtos = query.fetch_all_as(&store, &projection)?;

    assert_eq!(dtos.len(), 4);
    assert_eq!(
        dtos[0],
        UserDto {
            name: "ann".into(),
            age: 10
        }
    );

    // the eager columns are still in the raw rows
    let rows = query.fetch_all(&store)?;
    assert_eq!(rows[0].get_named("team.name")?.as_text()?, "alpha");
    Ok(())
}

#[test]
fn projection_requires_an_explicit_selection() -> Result<()> {
    let registry = common::registry();
    let user = registry.source("user")?;

    let query = Query::from_entity(&user);
    let err = Projection::<UserDto>::constructor(&query).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    Ok(())
}
