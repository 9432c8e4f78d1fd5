// SPDX-License-Identifier: GPL-3.0-or-later

//! The built-in function registry: name + argument types → native routine.
//!
//! The table is a process-wide constant built once, on first use, by
//! [`registry`]. It is a pure lookup, never mutated after construction.

mod routines;

#[cfg(test)]
mod builtins_test;

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::bytecode::{BuiltinFault, BuiltinRoutine};
use crate::value::TypeName;

/// What a name+signature resolves to: the routine to invoke and the type
/// of the value it leaves on the stack.
#[derive(Debug, Clone)]
pub struct BuiltinEntry {
    /// The native routine.
    pub routine: BuiltinRoutine,
    /// The type of value the routine pushes back.
    pub return_type: TypeName,
}

type Key = (&'static str, Vec<TypeName>);

/// The built-in registry: maps `(name, argument_type_list)` to a routine
/// and its return type.
#[derive(Debug)]
pub struct BuiltinRegistry {
    table: HashMap<Key, BuiltinEntry>,
}

impl BuiltinRegistry {
    /// Resolve a call by exact match on name and the full argument type
    /// list. No implicit conversions are attempted.
    ///
    /// The names `print` and `println` have one extra rule, ungoverned by
    /// the static table: called with a single `List{char, n}` argument
    /// for any `n`, they print the `n` characters as a string (`println`
    /// adds a trailing newline) and return `null`. This is how string
    /// literals are printed without a distinct string type.
    #[must_use]
    pub fn resolve(&self, name: &str, arg_types: &[TypeName]) -> Option<BuiltinEntry> {
        if let [TypeName::List { inner, .. }] = arg_types {
            let is_char_list = matches!(inner.as_ref(), TypeName::Simple { name: n } if n == "char");
            if is_char_list && (name == "print" || name == "println") {
                let routine: BuiltinRoutine =
                    if name == "println" { routines::println_string } else { routines::print_string };
                return Some(BuiltinEntry { routine, return_type: TypeName::null() });
            }
        }
        self.table.get(&(name, arg_types.to_vec())).cloned()
    }
}

/// The process-wide built-in registry, built on first access.
pub fn registry() -> &'static BuiltinRegistry {
    static REGISTRY: LazyLock<BuiltinRegistry> = LazyLock::new(build_registry);
    &REGISTRY
}

fn build_registry() -> BuiltinRegistry {
    let mut table = HashMap::new();
    routines::register_arithmetic(&mut table);
    routines::register_logical(&mut table);
    routines::register_print(&mut table);
    routines::register_math(&mut table);
    BuiltinRegistry { table }
}

fn insert(
    table: &mut HashMap<Key, BuiltinEntry>,
    name: &'static str,
    args: Vec<TypeName>,
    routine: BuiltinRoutine,
    return_type: TypeName,
) {
    table.insert((name, args), BuiltinEntry { routine, return_type });
}

pub(crate) use insert as register_entry;
pub(crate) type BuiltinFaultResult = Result<(), BuiltinFault>;
