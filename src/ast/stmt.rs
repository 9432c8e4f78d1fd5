// SPDX-License-Identifier: GPL-3.0-or-later

use super::Expr;
use crate::value::TypeName;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A block of statements, each lowered in order.
    Sequence(Vec<Stmt>),
    /// `let name = value;` — binds a new local to the current scope.
    Let {
        /// The bound variable's name.
        name: String,
        /// The initializing expression.
        value: Expr,
    },
    /// `target = value;`.
    Assign {
        /// The assignment target, lowered as an lvalue.
        target: Expr,
        /// The value expression.
        value: Expr,
    },
    /// `if cond { then_branch } else { else_branch }`.
    If {
        /// The condition.
        cond: Expr,
        /// The taken branch.
        then_branch: Box<Stmt>,
        /// The branch taken when `cond` is false, if any.
        else_branch: Option<Box<Stmt>>,
    },
    /// `while cond { body }`.
    While {
        /// The loop condition, checked before every iteration.
        cond: Expr,
        /// The loop body.
        body: Box<Stmt>,
    },
    /// `for name in list { body }` — indexed iteration over a
    /// fixed-length list, since its element count is known at compile
    /// time from the list's type.
    For {
        /// The per-iteration binding.
        var: String,
        /// The list-valued expression iterated over.
        list: Expr,
        /// The loop body.
        body: Box<Stmt>,
    },
    /// `break;`. Compile error outside a loop.
    Break,
    /// `continue;`. Compile error outside a loop.
    Continue,
    /// `struct Name { fields... } { methods... }`.
    Struct {
        /// The record's name.
        name: String,
        /// The record's fields, in declaration order.
        fields: Vec<(String, TypeName)>,
        /// Member functions, lowered as free functions named
        /// `Name::method`.
        methods: Vec<Stmt>,
    },
    /// `fn name(params...) -> return_type { body }`.
    FunctionDef {
        /// The function's name (already qualified with `Struct::` for
        /// member functions).
        name: String,
        /// Parameters, in declaration order.
        params: Vec<(String, TypeName)>,
        /// The return type.
        return_type: TypeName,
        /// The function body.
        body: Box<Stmt>,
    },
    /// `return value;`.
    Return(Expr),
    /// An expression evaluated for its side effects; its value is
    /// discarded.
    ExprStmt(Expr),
    /// `delete pointer;`.
    Delete(Expr),
}
