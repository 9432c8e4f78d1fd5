// SPDX-License-Identifier: GPL-3.0-or-later

//! [`TypeName`]: the structural name of a type.

/// The names recognised for `Simple` types without a record declaration.
pub const FUNDAMENTAL_NAMES: [&str; 6] = ["i32", "i64", "u64", "f64", "char", "bool"];

/// The structural name of a type.
///
/// Two `TypeName`s are equal exactly when they name the same type: `Simple`
/// compares by name, `List` by inner type and count, `Pointer` by inner
/// type. There is no nominal identity beyond this structure, so two
/// independently-built `List { inner: i32, count: 3 }` values are the same
/// type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A fundamental type (`i32`, `bool`, ...) or a record name registered
    /// in a [`super::TypeStore`].
    Simple {
        /// The type's name.
        name: String,
    },
    /// A fixed-length list of `count` elements of type `inner`.
    List {
        /// The element type.
        inner: Box<TypeName>,
        /// The fixed element count.
        count: u64,
    },
    /// A tagged pointer to a value of type `inner`.
    Pointer {
        /// The pointee type.
        inner: Box<TypeName>,
    },
}

impl TypeName {
    /// Build a `Simple` type name.
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple { name: name.into() }
    }

    /// Build a `List` type name.
    #[must_use]
    pub fn list(inner: TypeName, count: u64) -> Self {
        Self::List {
            inner: Box::new(inner),
            count,
        }
    }

    /// Build a `Pointer` type name.
    #[must_use]
    pub fn pointer(inner: TypeName) -> Self {
        Self::Pointer {
            inner: Box::new(inner),
        }
    }

    /// The `i32` fundamental type.
    #[must_use]
    pub fn i32() -> Self {
        Self::simple("i32")
    }

    /// The `i64` fundamental type.
    #[must_use]
    pub fn i64() -> Self {
        Self::simple("i64")
    }

    /// The `u64` fundamental type.
    #[must_use]
    pub fn u64() -> Self {
        Self::simple("u64")
    }

    /// The `f64` fundamental type.
    #[must_use]
    pub fn f64() -> Self {
        Self::simple("f64")
    }

    /// The `char` fundamental type (one byte, ASCII).
    #[must_use]
    pub fn char() -> Self {
        Self::simple("char")
    }

    /// The `bool` fundamental type.
    #[must_use]
    pub fn bool() -> Self {
        Self::simple("bool")
    }

    /// The `null` fundamental type (the type of the null pointer literal).
    #[must_use]
    pub fn null() -> Self {
        Self::simple("null")
    }

    /// `true` if this names one of the built-in fundamental types.
    #[must_use]
    pub fn is_fundamental(&self) -> bool {
        match self {
            Self::Simple { name } => FUNDAMENTAL_NAMES.contains(&name.as_str()) || name == "null",
            Self::List { .. } | Self::Pointer { .. } => false,
        }
    }

    /// `true` if this is a `Simple` type naming a record (i.e. a `Simple`
    /// type that isn't one of the fundamentals).
    #[must_use]
    pub fn is_record_name(&self) -> bool {
        matches!(self, Self::Simple { .. }) && !self.is_fundamental()
    }
}

impl core::fmt::Display for TypeName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Simple { name } => write!(f, "{name}"),
            Self::List { inner, count } => write!(f, "List{{{inner},{count}}}"),
            Self::Pointer { inner } => write!(f, "Ptr{{{inner}}}"),
        }
    }
}
