// SPDX-License-Identifier: GPL-3.0-or-later

use crate::value::TypeName;

/// An expression. Children are owned (`Box`); there is no shared node
/// identity and no visitor trait — dispatch is a `match` on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value with its type and byte encoding already fixed.
    Literal {
        /// The literal's type.
        ty: TypeName,
        /// The literal's encoded bytes (see [`crate::value`]).
        bytes: Vec<u8>,
    },
    /// A variable reference, resolved against the enclosing scope.
    Variable(String),
    /// `base.field`.
    Field {
        /// The record-valued expression being accessed.
        base: Box<Expr>,
        /// The field name.
        field: String,
    },
    /// `base[index]`.
    Subscript {
        /// The list-valued expression being indexed.
        base: Box<Expr>,
        /// The index expression, of type `u64`.
        index: Box<Expr>,
    },
    /// `*pointer`.
    Deref(Box<Expr>),
    /// `&lvalue`.
    AddressOf(Box<Expr>),
    /// A unary operator applied to one operand (`-`, `!`).
    Unary {
        /// The operator's built-in name (`"neg"`, `"not"`).
        op: String,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary operator applied to two operands.
    Binary {
        /// The operator's built-in name (`"+"`, `"<"`, `"&&"`, ...).
        op: String,
        /// The left operand.
        left: Box<Expr>,
        /// The right operand.
        right: Box<Expr>,
    },
    /// `[e1, e2, ..., en]`. Elements must share a type; the list's
    /// element type is the first element's.
    ListLiteral(Vec<Expr>),
    /// `[value; count]`, unrolled by the compiler at lowering time.
    RepeatList {
        /// The value repeated.
        value: Box<Expr>,
        /// The number of repetitions (a compile-time constant).
        count: u64,
    },
    /// `new T[count]`.
    New {
        /// The element type `T`.
        element_type: TypeName,
        /// The element count.
        count: Box<Expr>,
    },
    /// `sizeof(T)`, constant-folded by the compiler.
    SizeOf(TypeName),
    /// `name(args...)`.
    Call {
        /// The function name.
        name: String,
        /// The argument expressions, in declaration order.
        args: Vec<Expr>,
    },
    /// `receiver.name(args...)`, lowered as a free-function call with the
    /// receiver's address prepended as the first argument.
    MethodCall {
        /// The receiver expression.
        receiver: Box<Expr>,
        /// The method name (without the `Struct::` prefix).
        name: String,
        /// The remaining argument expressions.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Build a literal expression from an already-encoded value.
    #[must_use]
    pub fn literal(ty: TypeName, bytes: Vec<u8>) -> Self {
        Self::Literal { ty, bytes }
    }

    /// Build a variable reference.
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Build a binary operator expression.
    #[must_use]
    pub fn binary(op: impl Into<String>, left: Expr, right: Expr) -> Self {
        Self::Binary { op: op.into(), left: Box::new(left), right: Box::new(right) }
    }

    /// Build a unary operator expression.
    #[must_use]
    pub fn unary(op: impl Into<String>, operand: Expr) -> Self {
        Self::Unary { op: op.into(), operand: Box::new(operand) }
    }

    /// Build a free-function call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call { name: name.into(), args }
    }
}
