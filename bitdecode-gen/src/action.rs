//! The action mini-language: per-pattern operand extraction code.
//!
//! Actions are small operator trees (`add`, `shiftright`, `assign`, ...)
//! read from the input document's `deffun` section. The [`Transpiler`]
//! walks a tree, substitutes `$name` placeholders from a binding map and
//! renders target-language fragments through a [`CodeVisitor`]; the
//! emitter calls into it while generating operand extraction code.

mod ast;
mod eval;
mod transpile;

pub use ast::{Action, Expr, SwitchCase};
pub use transpile::{Bindings, CodeVisitor, PythonVisitor, Transpiler};
