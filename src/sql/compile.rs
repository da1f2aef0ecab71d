//! Translation from the expression model to renderable statements.
//!
//! Every expression kind is matched exhaustively here, so adding a kind is
//! a compile-time-checked, localized change. Mutation statements render
//! paths as bare column names (single-table context); select statements
//! qualify them with their source alias. Subqueries always render
//! qualified, whatever the outer mode.

use crate::builder::select::{Direction, NullPlacement, QuerySpec};
use crate::error::{Error, Result};
use crate::expr::{AggregateKind, ArithOp, CmpOp, Expr, LogicalOp, Path};
use crate::schema::Source;
use crate::sql::{Chunk, Sql};
use crate::store::Statement;
use crate::value::ValueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathMode {
    Qualified,
    Bare,
}

fn path_sql(path: &Path, mode: PathMode) -> Sql {
    match mode {
        PathMode::Qualified => Sql::ident(path.alias.clone())
            .push(Chunk::Raw("."))
            .push(Chunk::Ident(path.field.clone())),
        PathMode::Bare => Sql::ident(path.field.clone()),
    }
}

fn cmp_keyword(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "=",
        CmpOp::Ne => "<>",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
    }
}

fn arith_keyword(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "/",
    }
}

fn cast_keyword(ty: ValueType) -> &'static str {
    match ty {
        ValueType::Int | ValueType::Bool => "INTEGER",
        ValueType::Float => "REAL",
        ValueType::Text => "TEXT",
    }
}

fn expr_sql(expr: &Expr, mode: PathMode) -> Result<Sql> {
    Ok(match expr {
        Expr::Path(path) => path_sql(path, mode),
        Expr::Literal(value) => Sql::param(value.clone()),
        Expr::Cmp { op, left, right } => expr_sql(left, mode)?
            .push(Chunk::Raw(cmp_keyword(*op)))
            .append(expr_sql(right, mode)?),
        Expr::Logical { op, children } => match op {
            LogicalOp::Not => {
                let child = children.first().ok_or_else(|| {
                    Error::Configuration("NOT node without an operand".into())
                })?;
                Sql::raw("NOT").append(expr_sql(child, mode)?.parens())
            }
            LogicalOp::And | LogicalOp::Or => {
                let keyword = if *op == LogicalOp::And { "AND" } else { "OR" };
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    parts.push(expr_sql(child, mode)?);
                }
                Sql::join(parts, keyword).parens()
            }
        },
        Expr::Between { expr, low, high } => expr_sql(expr, mode)?
            .push(Chunk::Raw("BETWEEN"))
            .append(expr_sql(low, mode)?)
            .push(Chunk::Raw("AND"))
            .append(expr_sql(high, mode)?)
            .parens(),
        Expr::InList { expr, items } => {
            let base = expr_sql(expr, mode)?.push(Chunk::Raw("IN ("));
            let list = if items.is_empty() {
                // Never matches, but stays well-formed
                Sql::raw("NULL")
            } else {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(expr_sql(item, mode)?);
                }
                Sql::join(parts, ",")
            };
            base.append(list).push(Chunk::Raw(")"))
        }
        Expr::InSubquery { expr, query } => expr_sql(expr, mode)?
            .push(Chunk::Raw("IN ("))
            .append(select_body(query)?.sql)
            .push(Chunk::Raw(")")),
        Expr::IsNull { expr, negated } => expr_sql(expr, mode)?.push(Chunk::Raw(if *negated {
            "IS NOT NULL"
        } else {
            "IS NULL"
        })),
        Expr::Arith { op, left, right, ty: _ } => expr_sql(left, mode)?
            .push(Chunk::Raw(arith_keyword(*op)))
            .append(expr_sql(right, mode)?)
            .parens(),
        Expr::Concat { parts } => {
            let mut rendered = Vec::with_capacity(parts.len());
            for part in parts {
                rendered.push(expr_sql(part, mode)?);
            }
            Sql::join(rendered, "||")
        }
        Expr::Like { expr, pattern } => expr_sql(expr, mode)?
            .push(Chunk::Raw("LIKE"))
            .append(expr_sql(pattern, mode)?),
        Expr::Cast { expr, to } => Sql::raw("CAST(")
            .append(expr_sql(expr, mode)?)
            .push(Chunk::Raw("AS"))
            .push(Chunk::Raw(cast_keyword(*to)))
            .push(Chunk::Raw(")")),
        Expr::Case {
            branches,
            default,
            ty: _,
        } => {
            let mut sql = Sql::raw("CASE");
            for (condition, result) in branches {
                sql = sql
                    .push(Chunk::Raw("WHEN"))
                    .append(expr_sql(condition, mode)?)
                    .push(Chunk::Raw("THEN"))
                    .append(expr_sql(result, mode)?);
            }
            sql.push(Chunk::Raw("ELSE"))
                .append(expr_sql(default, mode)?)
                .push(Chunk::Raw("END"))
        }
        Expr::Aggregate { kind, expr, ty: _ } => {
            let name = match kind {
                AggregateKind::Count => "COUNT(",
                AggregateKind::Sum => "SUM(",
                AggregateKind::Avg => "AVG(",
                AggregateKind::Min => "MIN(",
                AggregateKind::Max => "MAX(",
            };
            let inner = match expr {
                Some(inner) => expr_sql(inner, mode)?,
                None => Sql::raw("*"),
            };
            Sql::raw(name).append(inner).push(Chunk::Raw(")"))
        }
        Expr::Subquery { query, ty: _ } => {
            Sql::raw("(").append(select_body(query)?.sql).push(Chunk::Raw(")"))
        }
        // The alias applies in selection position only; everywhere else the
        // inner expression stands alone.
        Expr::Aliased { expr, .. } => expr_sql(expr, mode)?,
    })
}

fn source_sql(source: &Source) -> Sql {
    let table = Sql::ident(source.entity());
    if source.alias() == source.entity() {
        table
    } else {
        table
            .push(Chunk::Raw("AS"))
            .push(Chunk::Ident(source.alias().to_owned()))
    }
}

/// The selection the store will actually see: the explicit list, or every
/// field of the root entity when the list is empty, plus the columns of
/// every eager join target.
fn effective_selection(spec: &QuerySpec) -> Result<Vec<(Expr, Option<String>)>> {
    let mut columns: Vec<(Expr, Option<String>)> = Vec::new();
    if spec.selection.is_empty() {
        let root = spec
            .sources
            .first()
            .ok_or_else(|| Error::Configuration("query has no source entity".into()))?;
        for field in root.schema().fields() {
            let expr = root.field(&field.name)?;
            columns.push((expr, Some(field.name.clone())));
        }
    } else {
        for expr in &spec.selection {
            let label = expr.label().map(str::to_owned);
            columns.push((expr.clone(), label));
        }
    }
    for join in spec.joins.iter().filter(|j| j.eager) {
        for field in join.target.schema().fields() {
            let expr = join.target.field(&field.name)?;
            let label = format!("{}.{}", join.target.alias(), field.name);
            columns.push((expr, Some(label)));
        }
    }
    Ok(columns)
}

struct SelectBody {
    sql: Sql,
    labels: Vec<Option<String>>,
}

fn select_body(spec: &QuerySpec) -> Result<SelectBody> {
    let columns = effective_selection(spec)?;
    let labels = columns.iter().map(|(_, label)| label.clone()).collect();

    let mut items = Vec::with_capacity(columns.len());
    for (expr, _) in &columns {
        let mut item = expr_sql(expr, PathMode::Qualified)?;
        if let Expr::Aliased { alias, .. } = expr {
            item = item
                .push(Chunk::Raw("AS"))
                .push(Chunk::Ident(alias.clone()));
        }
        items.push(item);
    }
    let mut sql = Sql::raw("SELECT").append(Sql::join(items, ","));

    sql = sql.push(Chunk::Raw("FROM")).append(Sql::join(
        spec.sources.iter().map(source_sql),
        ",",
    ));

    for join in &spec.joins {
        sql = sql
            .push(Chunk::Raw(join.kind.keyword()))
            .append(source_sql(&join.target));
        if let Some(on) = &join.on {
            sql = sql
                .push(Chunk::Raw("ON"))
                .append(expr_sql(on, PathMode::Qualified)?);
        }
    }

    if let Some(predicate) = &spec.predicate {
        sql = sql
            .push(Chunk::Raw("WHERE"))
            .append(expr_sql(predicate, PathMode::Qualified)?);
    }

    if !spec.group_by.is_empty() {
        let mut keys = Vec::with_capacity(spec.group_by.len());
        for key in &spec.group_by {
            keys.push(expr_sql(key, PathMode::Qualified)?);
        }
        sql = sql.push(Chunk::Raw("GROUP BY")).append(Sql::join(keys, ","));
    }

    if let Some(having) = &spec.having {
        sql = sql
            .push(Chunk::Raw("HAVING"))
            .append(expr_sql(having, PathMode::Qualified)?);
    }

    if !spec.order_by.is_empty() {
        let mut keys = Vec::with_capacity(spec.order_by.len());
        for key in &spec.order_by {
            let mut rendered = expr_sql(&key.expr, PathMode::Qualified)?;
            rendered = rendered.push(Chunk::Raw(match key.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            }));
            rendered = match key.nulls {
                NullPlacement::Default => rendered,
                NullPlacement::First => rendered.push(Chunk::Raw("NULLS FIRST")),
                NullPlacement::Last => rendered.push(Chunk::Raw("NULLS LAST")),
            };
            keys.push(rendered);
        }
        sql = sql.push(Chunk::Raw("ORDER BY")).append(Sql::join(keys, ","));
    }

    match (spec.limit, spec.offset) {
        (Some(limit), offset) => {
            sql = sql.push(Chunk::Raw("LIMIT")).push(Chunk::Number(limit));
            if let Some(offset) = offset {
                sql = sql.push(Chunk::Raw("OFFSET")).push(Chunk::Number(offset));
            }
        }
        (None, Some(offset)) => {
            // A bare OFFSET needs an unbounded LIMIT to stay well-formed
            sql = sql
                .push(Chunk::Raw("LIMIT"))
                .push(Chunk::Raw("-1"))
                .push(Chunk::Raw("OFFSET"))
                .push(Chunk::Number(offset));
        }
        (None, None) => {}
    }

    Ok(SelectBody { sql, labels })
}

/// Render a query spec into an executable statement.
pub(crate) fn select_statement(spec: &QuerySpec) -> Result<Statement> {
    let body = select_body(spec)?;
    let (sql, params) = body.sql.build();
    Ok(Statement {
        sql,
        params,
        labels: body.labels,
    })
}

/// Render the count variant: same predicate and joins, no ordering, offset,
/// or limit; selection replaced by a row-count aggregate. A grouped query
/// counts its groups.
pub(crate) fn count_statement(spec: &QuerySpec) -> Result<Statement> {
    if spec.sources.is_empty() {
        return Err(Error::Configuration("query has no source entity".into()));
    }

    // Grouped queries count groups, not base rows: the grouped select
    // (minus ordering and window) becomes a counted subquery.
    if !spec.group_by.is_empty() || spec.having.is_some() {
        let mut inner = spec.clone();
        inner.order_by.clear();
        inner.offset = None;
        inner.limit = None;
        let body = select_body(&inner)?;
        let sql = Sql::raw("SELECT")
            .push(Chunk::Raw("COUNT("))
            .push(Chunk::Raw("*"))
            .push(Chunk::Raw(")"))
            .push(Chunk::Raw("FROM ("))
            .append(body.sql)
            .push(Chunk::Raw(")"));
        let (sql, params) = sql.build();
        return Ok(Statement {
            sql,
            params,
            labels: vec![Some("count".into())],
        });
    }

    let mut sql = Sql::raw("SELECT")
        .push(Chunk::Raw("COUNT("))
        .push(Chunk::Raw("*"))
        .push(Chunk::Raw(")"));

    sql = sql.push(Chunk::Raw("FROM")).append(Sql::join(
        spec.sources.iter().map(source_sql),
        ",",
    ));

    for join in &spec.joins {
        sql = sql
            .push(Chunk::Raw(join.kind.keyword()))
            .append(source_sql(&join.target));
        if let Some(on) = &join.on {
            sql = sql
                .push(Chunk::Raw("ON"))
                .append(expr_sql(on, PathMode::Qualified)?);
        }
    }

    if let Some(predicate) = &spec.predicate {
        sql = sql
            .push(Chunk::Raw("WHERE"))
            .append(expr_sql(predicate, PathMode::Qualified)?);
    }

    let (sql, params) = sql.build();
    Ok(Statement {
        sql,
        params,
        labels: vec![Some("count".into())],
    })
}

/// Render a bulk update statement.
pub(crate) fn update_statement(
    target: &Source,
    assignments: &[(Path, Expr)],
    predicate: Option<&Expr>,
) -> Result<Statement> {
    let mut sql = Sql::raw("UPDATE")
        .push(Chunk::Ident(target.entity().to_owned()))
        .push(Chunk::Raw("SET"));

    let mut sets = Vec::with_capacity(assignments.len());
    for (path, value) in assignments {
        sets.push(
            path_sql(path, PathMode::Bare)
                .push(Chunk::Raw("="))
                .append(expr_sql(value, PathMode::Bare)?),
        );
    }
    sql = sql.append(Sql::join(sets, ","));

    if let Some(predicate) = predicate {
        sql = sql
            .push(Chunk::Raw("WHERE"))
            .append(expr_sql(predicate, PathMode::Bare)?);
    }

    let (sql, params) = sql.build();
    Ok(Statement {
        sql,
        params,
        labels: Vec::new(),
    })
}

/// Render a bulk delete statement.
pub(crate) fn delete_statement(target: &Source, predicate: Option<&Expr>) -> Result<Statement> {
    let mut sql = Sql::raw("DELETE FROM").push(Chunk::Ident(target.entity().to_owned()));

    if let Some(predicate) = predicate {
        sql = sql
            .push(Chunk::Raw("WHERE"))
            .append(expr_sql(predicate, PathMode::Bare)?);
    }

    let (sql, params) = sql.build();
    Ok(Statement {
        sql,
        params,
        labels: Vec::new(),
    })
}
