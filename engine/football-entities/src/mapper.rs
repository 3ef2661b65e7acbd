//! Generic dict <-> entity/record mapper
//!
//! Every mapped type declares its fields once in a static table
//! ([`DictMapped::FIELDS`]) and builds itself from a [`FieldValues`] accessor.
//! [`from_dict`] filters the incoming mapping against that table, so unknown
//! keys are reported and skipped while every declared field is resolved
//! through one of the typed accessors below.

use crate::enums::ClosedEnum;
use crate::error::MapperError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::warn;

/// Generic key-value representation shared by entities, records and stores
pub type Values = serde_json::Map<String, Value>;

/// Foreign-key relationship declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec {
    /// `TYPE_NAME` of the mapped type the relation points at
    pub target: &'static str,
    /// Local foreign-key columns, in declaration order
    pub local_columns: &'static [&'static str],
    /// Column of the target holding its identifier
    pub referenced_column: &'static str,
}

/// Alternative of a union field: the normalized value, or `None` to pass
/// the raw value on to the next alternative
pub type Alternative = fn(&Value) -> Option<Value>;

/// Union alternative accepting a JSON integer
pub fn integer_alternative(value: &Value) -> Option<Value> {
    value.as_i64().map(Value::from)
}

/// Union alternative accepting a string holding an integer
pub fn numeric_string_alternative(value: &Value) -> Option<Value> {
    value.as_str().and_then(|s| s.trim().parse::<i64>().ok()).map(Value::from)
}

/// An integer given either as a number or as a numeric string
pub const INTEGER_ALTERNATIVES: &[Alternative] = &[integer_alternative, numeric_string_alternative];

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Coerced by direct construction from the raw value
    Scalar,
    /// Closed enumeration, checked against [`ClosedEnum::NAME`]
    Enumeration(&'static str),
    /// Another mapped type converted recursively, checked against its `TYPE_NAME`
    Nested(&'static str),
    /// Alternatives tried in order, first success wins
    Union(&'static [Alternative]),
    /// Foreign-key relationship
    Relation(RelationSpec),
    /// Multi-column value; the listed parts are its flattened columns
    Composite(&'static [&'static str]),
}

impl FieldKind {
    fn label(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Enumeration(_) => "enumeration",
            FieldKind::Nested(_) => "nested",
            FieldKind::Union(_) => "union",
            FieldKind::Relation(_) => "relation",
            FieldKind::Composite(_) => "composite",
        }
    }
}

/// One declared field of a mapped type
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn scalar(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Scalar }
    }

    pub const fn enumeration(name: &'static str, enum_name: &'static str) -> Self {
        Self { name, kind: FieldKind::Enumeration(enum_name) }
    }

    pub const fn nested(name: &'static str, type_name: &'static str) -> Self {
        Self { name, kind: FieldKind::Nested(type_name) }
    }

    pub const fn union(name: &'static str, alternatives: &'static [Alternative]) -> Self {
        Self { name, kind: FieldKind::Union(alternatives) }
    }

    pub const fn relation(
        name: &'static str,
        target: &'static str,
        local_columns: &'static [&'static str],
        referenced_column: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(RelationSpec { target, local_columns, referenced_column }),
        }
    }

    pub const fn composite(name: &'static str, parts: &'static [&'static str]) -> Self {
        Self { name, kind: FieldKind::Composite(parts) }
    }

    /// Whether `key` names this field or one of the columns backing it
    fn accepts(&self, key: &str) -> bool {
        if self.name == key {
            return true;
        }
        match self.kind {
            FieldKind::Relation(spec) => spec.local_columns.contains(&key),
            FieldKind::Composite(parts) => parts.contains(&key),
            _ => false,
        }
    }
}

/// Types convertible to and from the generic [`Values`] representation
pub trait DictMapped: Sized {
    /// Name used in diagnostics and relation declarations
    const TYPE_NAME: &'static str;

    /// Declared fields, in declaration order
    const FIELDS: &'static [FieldSpec];

    /// Build the value from already filtered input
    fn from_fields(fields: &FieldValues<'_>) -> Result<Self, MapperError>;

    /// Current field values; composites are flattened into their columns
    fn to_dict(&self) -> Values;
}

/// Whether `key` is a declared field (or backing column) of `T`
pub fn is_declared<T: DictMapped>(key: &str) -> bool {
    T::FIELDS.iter().any(|field| field.accepts(key))
}

/// Convert a generic mapping into `T`
///
/// Unknown keys are logged and skipped; they never fail the conversion.
pub fn from_dict<T: DictMapped>(values: &Values) -> Result<T, MapperError> {
    let mut known = Values::new();
    for (key, value) in values {
        if is_declared::<T>(key) {
            known.insert(key.clone(), value.clone());
        } else {
            warn!(
                "Key: {}, not a recognised field in type: {}. Remove this key from input to avoid this warning.",
                key,
                T::TYPE_NAME
            );
        }
    }

    T::from_fields(&FieldValues { type_name: T::TYPE_NAME, fields: T::FIELDS, values: &known })
}

/// Convert `value` into its generic mapping
pub fn to_dict<T: DictMapped>(value: &T) -> Values {
    value.to_dict()
}

/// Reference to another mapped value through a foreign key
#[derive(Debug, Clone, PartialEq)]
pub enum Related<T> {
    /// Already persisted; only the identifier is carried
    Id(i64),
    /// Not yet persisted; the full nested value is carried
    Pending(Box<T>),
}

impl<T: DictMapped> Related<T> {
    /// Identifier, when the related value is persisted
    pub fn id(&self) -> Option<i64> {
        match self {
            Related::Id(id) => Some(*id),
            Related::Pending(_) => None,
        }
    }

    /// Write the relation into `values`: the id under `column`, or the
    /// nested mapping under `field` when still pending
    pub fn write_into(&self, values: &mut Values, field: &str, column: &str) {
        match self {
            Related::Id(id) => {
                values.insert(column.to_string(), Value::from(*id));
            }
            Related::Pending(value) => {
                values.insert(field.to_string(), Value::Object(value.to_dict()));
            }
        }
    }
}

/// Whether the multi-column relation `type_name.field` is seen for the
/// first time in this process
fn first_report(type_name: &'static str, field: &'static str) -> bool {
    static REPORTED: OnceLock<Mutex<HashSet<(&'static str, &'static str)>>> = OnceLock::new();
    let reported = REPORTED.get_or_init(|| Mutex::new(HashSet::new()));
    match reported.lock() {
        Ok(mut reported) => reported.insert((type_name, field)),
        Err(_) => true,
    }
}

/// Typed access to the declared fields of one conversion
pub struct FieldValues<'a> {
    type_name: &'static str,
    fields: &'static [FieldSpec],
    values: &'a Values,
}

impl<'a> FieldValues<'a> {
    fn spec(&self, name: &'static str) -> Result<&'static FieldSpec, MapperError> {
        self.fields.iter().find(|field| field.name == name).ok_or_else(|| {
            MapperError::UndeclaredField { type_name: self.type_name, field: name.to_string() }
        })
    }

    fn kind_mismatch(&self, field: &'static str, declared: &FieldKind, requested: &'static str) -> MapperError {
        MapperError::KindMismatch { type_name: self.type_name, field, declared: declared.label(), requested }
    }

    fn target_mismatch(&self, field: &'static str, declared: &'static str, requested: &'static str) -> MapperError {
        MapperError::TargetMismatch { type_name: self.type_name, field, declared, requested }
    }

    /// Raw value of a declared field; JSON null counts as absent
    fn raw(&self, name: &'static str) -> Option<&'a Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    fn coercion(&self, field: &'static str, message: impl Into<String>) -> MapperError {
        MapperError::Coercion { type_name: self.type_name, field, message: message.into() }
    }

    fn missing(&self, field: &'static str) -> MapperError {
        MapperError::MissingField { type_name: self.type_name, field }
    }

    fn deserialize<V: DeserializeOwned>(&self, name: &'static str, value: &Value) -> Result<V, MapperError> {
        serde_json::from_value(value.clone()).map_err(|e| self.coercion(name, e.to_string()))
    }

    /// Scalar field coerced by direct construction
    pub fn scalar<V: DeserializeOwned>(&self, name: &'static str) -> Result<Option<V>, MapperError> {
        let spec = self.spec(name)?;
        if !matches!(spec.kind, FieldKind::Scalar) {
            return Err(self.kind_mismatch(name, &spec.kind, "scalar"));
        }
        self.raw(name).map(|value| self.deserialize(name, value)).transpose()
    }

    /// Scalar field that must be present
    pub fn required<V: DeserializeOwned>(&self, name: &'static str) -> Result<V, MapperError> {
        self.scalar(name)?.ok_or_else(|| self.missing(name))
    }

    /// Scalar field falling back to `default` when absent
    pub fn scalar_or<V: DeserializeOwned>(
        &self,
        name: &'static str,
        default: V,
    ) -> Result<V, MapperError> {
        Ok(self.scalar(name)?.unwrap_or(default))
    }

    /// Enumeration field resolved through [`ClosedEnum::lookup`]
    pub fn enumeration<E: ClosedEnum>(&self, name: &'static str) -> Result<Option<E>, MapperError> {
        let spec = self.spec(name)?;
        match spec.kind {
            FieldKind::Enumeration(enum_name) if enum_name == E::NAME => {}
            FieldKind::Enumeration(enum_name) => return Err(self.target_mismatch(name, enum_name, E::NAME)),
            ref other => return Err(self.kind_mismatch(name, other, "enumeration")),
        }

        let Some(value) = self.raw(name) else {
            return Ok(None);
        };
        let text = value
            .as_str()
            .ok_or_else(|| self.coercion(name, format!("expected a {} string", E::NAME)))?;
        E::lookup(text).map(Some).map_err(|source| MapperError::Lookup {
            type_name: self.type_name,
            field: name,
            source,
        })
    }

    /// Enumeration field that must be present
    pub fn required_enumeration<E: ClosedEnum>(&self, name: &'static str) -> Result<E, MapperError> {
        self.enumeration(name)?.ok_or_else(|| self.missing(name))
    }

    /// Nested mapped field converted recursively
    pub fn nested<N: DictMapped>(&self, name: &'static str) -> Result<Option<N>, MapperError> {
        let spec = self.spec(name)?;
        match spec.kind {
            FieldKind::Nested(type_name) if type_name == N::TYPE_NAME => {}
            FieldKind::Nested(type_name) => return Err(self.target_mismatch(name, type_name, N::TYPE_NAME)),
            ref other => return Err(self.kind_mismatch(name, other, "nested")),
        }
        self.nested_mapping(name)
    }

    fn nested_mapping<N: DictMapped>(&self, name: &'static str) -> Result<Option<N>, MapperError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Object(map)) => from_dict::<N>(map).map(Some),
            Some(other) => Err(self.coercion(name, format!("expected a {} mapping, got {other}", N::TYPE_NAME))),
        }
    }

    /// Union field: the declared alternatives are tried in order and the
    /// first match wins
    pub fn union<V: DeserializeOwned>(&self, name: &'static str) -> Result<Option<V>, MapperError> {
        let spec = self.spec(name)?;
        let FieldKind::Union(alternatives) = spec.kind else {
            return Err(self.kind_mismatch(name, &spec.kind, "union"));
        };

        let Some(value) = self.raw(name) else {
            return Ok(None);
        };
        let normalized = alternatives.iter().find_map(|alternative| alternative(value)).ok_or_else(|| {
            MapperError::NoUnionMatch { type_name: self.type_name, field: name, value: value.to_string() }
        })?;
        self.deserialize(name, &normalized).map(Some)
    }

    /// Composite field, given either as one mapping or as its flattened parts
    pub fn composite<C: DictMapped>(&self, name: &'static str) -> Result<Option<C>, MapperError> {
        let spec = self.spec(name)?;
        let FieldKind::Composite(parts) = spec.kind else {
            return Err(self.kind_mismatch(name, &spec.kind, "composite"));
        };

        if let Some(nested) = self.nested_mapping::<C>(name)? {
            return Ok(Some(nested));
        }

        let flattened: Values = parts
            .iter()
            .filter_map(|part| self.values.get(*part).map(|value| (part.to_string(), value.clone())))
            .collect();
        if flattened.is_empty() {
            return Ok(None);
        }
        from_dict::<C>(&flattened).map(Some)
    }

    /// Foreign-key relation to `R`
    ///
    /// A mapping carrying the referenced identifier resolves to
    /// [`Related::Id`] without building the nested value. A mapping without
    /// it is materialized through `R`'s own mapper. A bare id under the local
    /// column is accepted too. When the relation spans more than one local
    /// column the first declared column is used.
    pub fn relation<R: DictMapped>(
        &self,
        name: &'static str,
    ) -> Result<Option<Related<R>>, MapperError> {
        let spec = self.spec(name)?;
        let FieldKind::Relation(relation) = spec.kind else {
            return Err(self.kind_mismatch(name, &spec.kind, "relation"));
        };
        if relation.target != R::TYPE_NAME {
            return Err(MapperError::MissingMapper { type_name: relation.target });
        }

        let column = match relation.local_columns {
            [] => {
                return Err(MapperError::RelationWithoutColumns {
                    type_name: self.type_name,
                    field: name,
                })
            }
            [column] => *column,
            [column, ..] => {
                if first_report(self.type_name, name) {
                    warn!(
                        "More than one local column present for relation: {}.{} ({:?}), using {}",
                        self.type_name, name, relation.local_columns, column
                    );
                }
                *column
            }
        };

        if let Some(value) = self.raw(name) {
            return match value {
                Value::Object(map) => match map.get(relation.referenced_column).and_then(Value::as_i64) {
                    Some(id) => Ok(Some(Related::Id(id))),
                    None => from_dict::<R>(map).map(|nested| Some(Related::Pending(Box::new(nested)))),
                },
                other => Err(MapperError::InvalidRelation {
                    type_name: self.type_name,
                    field: name,
                    value: other.to_string(),
                }),
            };
        }

        match self.raw(column) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(|id| Some(Related::Id(id)))
                .ok_or_else(|| MapperError::InvalidRelation {
                    type_name: self.type_name,
                    field: name,
                    value: value.to_string(),
                }),
        }
    }

    /// Relation that must be present
    pub fn required_relation<R: DictMapped>(&self, name: &'static str) -> Result<Related<R>, MapperError> {
        self.relation(name)?.ok_or_else(|| self.missing(name))
    }
}
