//! Entity schema registry.
//!
//! Static description of each entity type: fields with semantic types and
//! named relations with their key columns. Schemas are built at process
//! start, registered once, and shared read-only (via `Arc`) by every
//! component that needs to resolve a typed path.

use crate::error::{Error, Result};
use crate::expr::{Expr, Path};
use crate::value::ValueType;
use std::collections::HashMap;
use std::sync::Arc;

/// A single field on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: ValueType,
}

/// How many rows of the target a relation resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A named relation to another entity, with the key pair used to derive a
/// join on-predicate when no explicit one is given.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    pub name: String,
    pub target_entity: String,
    pub cardinality: Cardinality,
    /// Field on the owning entity
    pub local_field: String,
    /// Field on the target entity
    pub target_field: String,
}

/// Immutable description of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldDescriptor>,
    relations: Vec<RelationDescriptor>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Declare a field. Declaration order is the entity's column order.
    pub fn field(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declare a relation keyed on `local_field = target_field`.
    pub fn relation(
        mut self,
        name: impl Into<String>,
        target_entity: impl Into<String>,
        cardinality: Cardinality,
        local_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        self.relations.push(RelationDescriptor {
            name: name.into(),
            target_entity: target_entity.into(),
            cardinality,
            local_field: local_field.into(),
            target_field: target_field.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation_named(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// Process-wide registry of entity schemas.
#[derive(Debug, Default)]
pub struct Registry {
    entities: HashMap<String, Arc<EntitySchema>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: EntitySchema) -> Result<()> {
        if self.entities.contains_key(schema.name()) {
            return Err(Error::Configuration(format!(
                "entity {:?} is already registered",
                schema.name()
            )));
        }
        self.entities
            .insert(schema.name().to_owned(), Arc::new(schema));
        Ok(())
    }

    pub fn schema(&self, entity: &str) -> Result<&Arc<EntitySchema>> {
        self.entities
            .get(entity)
            .ok_or_else(|| Error::Configuration(format!("unknown entity {entity:?}")))
    }

    /// An aliased reference to an entity, aliased as its own name.
    pub fn source(&self, entity: &str) -> Result<Source> {
        self.source_as(entity, entity)
    }

    /// An aliased reference to an entity under an explicit alias, for
    /// self-joins and correlated subqueries.
    pub fn source_as(&self, entity: &str, alias: &str) -> Result<Source> {
        Ok(Source {
            schema: Arc::clone(self.schema(entity)?),
            alias: alias.to_owned(),
        })
    }
}

/// An entity schema bound to a query alias. The root of every typed path.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    schema: Arc<EntitySchema>,
    alias: String,
}

impl Source {
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn entity(&self) -> &str {
        self.schema.name()
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// A typed path to one of this entity's fields.
    pub fn field(&self, name: &str) -> Result<Expr> {
        let descriptor = self.schema.field_named(name).ok_or_else(|| {
            Error::Configuration(format!(
                "entity {:?} has no field {name:?}",
                self.schema.name()
            ))
        })?;
        Ok(Expr::Path(Path {
            alias: self.alias.clone(),
            field: descriptor.name.clone(),
            ty: descriptor.ty,
        }))
    }

    /// A reference to one of this entity's declared relations, for join
    /// construction against a target source.
    pub fn relation(&self, name: &str) -> Result<RelationRef> {
        let relation = self.schema.relation_named(name).ok_or_else(|| {
            Error::Configuration(format!(
                "entity {:?} has no relation {name:?}",
                self.schema.name()
            ))
        })?;
        let local = self
            .schema
            .field_named(&relation.local_field)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "relation {name:?} names unknown local field {:?}",
                    relation.local_field
                ))
            })?;
        Ok(RelationRef {
            source_alias: self.alias.clone(),
            local_field: local.name.clone(),
            local_ty: local.ty,
            target_entity: relation.target_entity.clone(),
            target_field: relation.target_field.clone(),
            cardinality: relation.cardinality,
        })
    }
}

/// A relation resolved against a concrete source alias, ready to be joined.
#[derive(Debug, Clone)]
pub struct RelationRef {
    pub(crate) source_alias: String,
    pub(crate) local_field: String,
    pub(crate) local_ty: ValueType,
    pub(crate) target_entity: String,
    pub(crate) target_field: String,
    pub(crate) cardinality: Cardinality,
}

impl RelationRef {
    pub fn target_entity(&self) -> &str {
        &self.target_entity
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The schema-declared on-predicate for joining `target`.
    pub(crate) fn key_predicate(&self, target: &Source) -> Result<Expr> {
        let target_field = target.schema().field_named(&self.target_field).ok_or_else(|| {
            Error::Configuration(format!(
                "relation targets unknown field {:?} on entity {:?}",
                self.target_field,
                target.entity()
            ))
        })?;
        if !self.local_ty.comparable_with(target_field.ty) {
            return Err(Error::TypeMismatch(format!(
                "relation key {}:{} is not comparable with {}:{}",
                self.local_field, self.local_ty, target_field.name, target_field.ty
            )));
        }
        let left = Expr::Path(Path {
            alias: self.source_alias.clone(),
            field: self.local_field.clone(),
            ty: self.local_ty,
        });
        let right = Expr::Path(Path {
            alias: target.alias().to_owned(),
            field: target_field.name.clone(),
            ty: target_field.ty,
        });
        left.eq(right)
    }
}
