// SPDX-License-Identifier: GPL-3.0-or-later

//! [`TypeStore`]: the registry of record types and their field layouts.

use std::collections::HashMap;

use super::type_name::TypeName;

/// One field of a record type: its name, its type, and its byte offset
/// within the record (fields are laid out in declaration order with no
/// padding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field's name.
    pub name: String,
    /// The field's type.
    pub ty: TypeName,
    /// The field's byte offset from the start of the record.
    pub offset: u64,
}

/// Errors raised while registering or querying types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// `add` was called with a name already registered.
    DuplicateType(String),
    /// A query referenced a record name that was never registered and
    /// isn't a fundamental type.
    UnknownType(TypeName),
    /// A field access named a field the record doesn't have.
    UnknownField {
        /// The record type queried.
        ty: TypeName,
        /// The field name that wasn't found.
        field: String,
    },
}

impl core::fmt::Display for TypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateType(name) => write!(f, "type `{name}` is already registered"),
            Self::UnknownType(ty) => write!(f, "unknown type `{ty}`"),
            Self::UnknownField { ty, field } => {
                write!(f, "type `{ty}` has no field `{field}`")
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// The registry of record types declared by a program.
///
/// Fundamental types (`i32`, `i64`, `u64`, `f64`, `char`, `bool`, `null`)
/// are always known and never need registering; `List` and `Pointer` types
/// are structural and likewise never registered. Only `struct`
/// declarations go through [`TypeStore::add`].
#[derive(Debug, Default, Clone)]
pub struct TypeStore {
    records: HashMap<String, Vec<Field>>,
    sizes: HashMap<String, u64>,
}

impl TypeStore {
    /// An empty type store, holding only the fundamental types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type's fields, computing each field's offset from
    /// the size of the fields before it.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::DuplicateType`] if `name` is already
    /// registered, and [`TypeError::UnknownType`] if any field's type is a
    /// record name not yet registered (forward references aren't
    /// supported: register dependencies first).
    pub fn add(&mut self, name: &str, fields: Vec<(String, TypeName)>) -> Result<(), TypeError> {
        if self.records.contains_key(name) || FUNDAMENTAL_NAME_SET.contains(&name) {
            return Err(TypeError::DuplicateType(name.to_string()));
        }
        let mut laid_out = Vec::with_capacity(fields.len());
        let mut offset = 0u64;
        for (field_name, ty) in fields {
            let size = self.size_of(&ty)?;
            laid_out.push(Field {
                name: field_name,
                ty,
                offset,
            });
            offset += size;
        }
        self.sizes.insert(name.to_string(), offset);
        self.records.insert(name.to_string(), laid_out);
        Ok(())
    }

    /// `true` if `ty` names a type known to this store: a fundamental
    /// type, a registered record, or a structural `List`/`Pointer` built
    /// from known types.
    #[must_use]
    pub fn contains(&self, ty: &TypeName) -> bool {
        match ty {
            TypeName::Simple { name } => {
                FUNDAMENTAL_NAME_SET.contains(&name.as_str()) || self.records.contains_key(name)
            }
            TypeName::List { inner, .. } | TypeName::Pointer { inner } => self.contains(inner),
        }
    }

    /// The fields of a record type, in declaration order. Empty for
    /// fundamental, `List`, and `Pointer` types.
    #[must_use]
    pub fn fields_of(&self, ty: &TypeName) -> &[Field] {
        match ty {
            TypeName::Simple { name } => {
                self.records.get(name).map_or(&[], Vec::as_slice)
            }
            TypeName::List { .. } | TypeName::Pointer { .. } => &[],
        }
    }

    /// Look up a single field of a record type by name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownField`] if `ty` has no such field.
    pub fn field(&self, ty: &TypeName, field: &str) -> Result<&Field, TypeError> {
        self.fields_of(ty)
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| TypeError::UnknownField {
                ty: ty.clone(),
                field: field.to_string(),
            })
    }

    /// The size in bytes of a value of type `ty`.
    ///
    /// Fundamental types have fixed sizes (`bool`/`char`/`null` are 1
    /// byte; `i32` is 4; `i64`/`u64`/`f64` are 8). A pointer is always 8
    /// bytes. A list is `count * size_of(inner)`. A record is the sum of
    /// its fields' sizes (no padding).
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownType`] if `ty` names a record that
    /// hasn't been registered.
    pub fn size_of(&self, ty: &TypeName) -> Result<u64, TypeError> {
        match ty {
            TypeName::Simple { name } => match name.as_str() {
                "bool" | "char" | "null" => Ok(1),
                "i32" => Ok(4),
                "i64" | "u64" | "f64" => Ok(8),
                _ => self
                    .sizes
                    .get(name)
                    .copied()
                    .ok_or_else(|| TypeError::UnknownType(ty.clone())),
            },
            TypeName::Pointer { .. } => Ok(8),
            TypeName::List { inner, count } => Ok(count * self.size_of(inner)?),
        }
    }
}

const FUNDAMENTAL_NAME_SET: [&str; 7] = ["i32", "i64", "u64", "f64", "char", "bool", "null"];
