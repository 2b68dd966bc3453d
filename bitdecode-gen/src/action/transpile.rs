use indexmap::IndexMap;

use crate::action::ast::{Action, Expr};
use crate::action::eval;
use crate::Error;

/// Placeholder bindings, `name` (without the `$`) to replacement text.
pub type Bindings = IndexMap<String, String>;

/// Renders operator applications in a concrete target dialect.
///
/// The transpiler owns the walk, placeholder resolution and `call`/`eval`
/// semantics; the visitor only turns already-rendered operands into source
/// text. Implementations are expected to be stateless.
pub trait CodeVisitor {
    /// `a + b + ...`
    fn add(&self, args: &[String]) -> String;
    /// `a - b - ...`
    fn sub(&self, args: &[String]) -> String;
    /// `a * b * ...`
    fn mul(&self, args: &[String]) -> String;
    /// `a % b % ...`
    fn modulo(&self, args: &[String]) -> String;
    /// Bitwise conjunction.
    fn bit_and(&self, args: &[String]) -> String;
    /// Bitwise disjunction.
    fn bit_or(&self, args: &[String]) -> String;
    /// Bitwise exclusive or.
    fn bit_xor(&self, args: &[String]) -> String;
    /// Short-circuit conjunction.
    fn logical_and(&self, args: &[String]) -> String;
    /// Short-circuit disjunction.
    fn logical_or(&self, args: &[String]) -> String;
    /// Equality test.
    fn is_equal(&self, left: &str, right: &str) -> String;
    /// Inequality test.
    fn is_not_equal(&self, left: &str, right: &str) -> String;
    /// Less-than test.
    fn is_less(&self, left: &str, right: &str) -> String;
    /// Left shift.
    fn shift_left(&self, left: &str, right: &str) -> String;
    /// Right shift.
    fn shift_right(&self, left: &str, right: &str) -> String;
    /// Parenthesized expression.
    fn braces(&self, expr: &str) -> String;
    /// Bitwise complement.
    fn not(&self, expr: &str) -> String;
    /// Boolean negation.
    fn logical_not(&self, expr: &str) -> String;
    /// Runtime assertion.
    fn assertion(&self, expr: &str) -> String;
    /// Assignment statement with optional trailing comment.
    fn assign(&self, target: &str, expr: &str, comment: Option<&str>) -> String;
    /// Return statement with optional trailing comment.
    fn ret(&self, expr: &str, comment: Option<&str>) -> String;
    /// Already-rendered call result with optional trailing comment.
    fn call(&self, rendered: &str, comment: Option<&str>) -> String;
    /// Two-way conditional.
    fn if_else(&self, cond: &str, then: &str, otherwise: Option<&str>) -> String;
    /// Multi-way dispatch over rendered (value, body) arms.
    fn switch(&self, var: &str, cases: &[(String, String)]) -> String;
}

/// [`CodeVisitor`] for Python, the dialect of the bundled decoder
/// templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonVisitor;

impl PythonVisitor {
    fn indented(block: &str) -> String {
        block
            .split('\n')
            .map(|line| format!("    {line}\n"))
            .collect()
    }

    fn commented(stmt: String, comment: Option<&str>) -> String {
        match comment {
            Some(comment) => format!("{stmt} # {comment}"),
            None => stmt,
        }
    }
}

impl CodeVisitor for PythonVisitor {
    fn add(&self, args: &[String]) -> String {
        args.join(" + ")
    }

    fn sub(&self, args: &[String]) -> String {
        args.join(" - ")
    }

    fn mul(&self, args: &[String]) -> String {
        args.join(" * ")
    }

    fn modulo(&self, args: &[String]) -> String {
        args.join(" % ")
    }

    fn bit_and(&self, args: &[String]) -> String {
        args.join(" & ")
    }

    fn bit_or(&self, args: &[String]) -> String {
        args.join(" | ")
    }

    fn bit_xor(&self, args: &[String]) -> String {
        args.join(" ^ ")
    }

    fn logical_and(&self, args: &[String]) -> String {
        args.join(" and ")
    }

    fn logical_or(&self, args: &[String]) -> String {
        args.join(" or ")
    }

    fn is_equal(&self, left: &str, right: &str) -> String {
        format!("{left} == {right}")
    }

    fn is_not_equal(&self, left: &str, right: &str) -> String {
        format!("{left} != {right}")
    }

    fn is_less(&self, left: &str, right: &str) -> String {
        format!("{left} < {right}")
    }

    fn shift_left(&self, left: &str, right: &str) -> String {
        format!("{left} << {right}")
    }

    fn shift_right(&self, left: &str, right: &str) -> String {
        format!("{left} >> {right}")
    }

    fn braces(&self, expr: &str) -> String {
        format!("({expr})")
    }

    fn not(&self, expr: &str) -> String {
        format!("~{expr}")
    }

    fn logical_not(&self, expr: &str) -> String {
        format!("not {expr}")
    }

    fn assertion(&self, expr: &str) -> String {
        format!("assert({expr})")
    }

    fn assign(&self, target: &str, expr: &str, comment: Option<&str>) -> String {
        Self::commented(format!("{target} = {expr}"), comment)
    }

    fn ret(&self, expr: &str, comment: Option<&str>) -> String {
        Self::commented(format!("return {expr}"), comment)
    }

    fn call(&self, rendered: &str, comment: Option<&str>) -> String {
        Self::commented(rendered.to_owned(), comment)
    }

    fn if_else(&self, cond: &str, then: &str, otherwise: Option<&str>) -> String {
        let mut out = format!("if {cond}:\n");
        out.push_str(&Self::indented(then));
        if let Some(otherwise) = otherwise {
            out.push_str("else:\n");
            out.push_str(&Self::indented(otherwise));
        }
        out
    }

    fn switch(&self, var: &str, cases: &[(String, String)]) -> String {
        let mut out = String::new();
        for (idx, (when, then)) in cases.iter().enumerate() {
            let keyword = if idx == 0 { "if" } else { "elif" };
            out.push_str(&format!("{keyword} {var} == {when}:\n"));
            out.push_str(&Self::indented(then));
        }
        out
    }
}

/// Walks action trees and renders target-language fragments.
pub struct Transpiler<'a> {
    deffun: &'a IndexMap<String, Action>,
    visitor: &'a dyn CodeVisitor,
}

impl<'a> Transpiler<'a> {
    /// A transpiler over the given user-defined functions, rendering
    /// through `visitor`.
    pub fn new(deffun: &'a IndexMap<String, Action>, visitor: &'a dyn CodeVisitor) -> Self {
        Self { deffun, visitor }
    }

    /// Renders one action tree under the given placeholder bindings.
    pub fn transpile(&self, node: &Action, bindings: &Bindings) -> Result<String, Error> {
        let code = match node {
            Action::Add { args } => self.visitor.add(&self.operands(args, bindings)?),
            Action::Sub { args } => self.visitor.sub(&self.operands(args, bindings)?),
            Action::Mul { args } => self.visitor.mul(&self.operands(args, bindings)?),
            Action::Mod { args } => self.visitor.modulo(&self.operands(args, bindings)?),
            Action::And { args } => self.visitor.bit_and(&self.operands(args, bindings)?),
            Action::Or { args } => self.visitor.bit_or(&self.operands(args, bindings)?),
            Action::Xor { args } => self.visitor.bit_xor(&self.operands(args, bindings)?),
            Action::LogicalAnd { args } => {
                self.visitor.logical_and(&self.operands(args, bindings)?)
            }
            Action::LogicalOr { args } => {
                self.visitor.logical_or(&self.operands(args, bindings)?)
            }
            Action::IsEqual { left, right } => {
                let right = self.operand(right, bindings)?;
                let left = self.operand(left, bindings)?;
                self.visitor.is_equal(&left, &right)
            }
            Action::IsNotEqual { left, right } => {
                let right = self.operand(right, bindings)?;
                let left = self.operand(left, bindings)?;
                self.visitor.is_not_equal(&left, &right)
            }
            Action::IsLess { left, right } => {
                let right = self.operand(right, bindings)?;
                let left = self.operand(left, bindings)?;
                self.visitor.is_less(&left, &right)
            }
            Action::ShiftLeft { left, right } => {
                let right = self.operand(right, bindings)?;
                let left = self.operand(left, bindings)?;
                self.visitor.shift_left(&left, &right)
            }
            Action::ShiftRight { left, right } => {
                let right = self.operand(right, bindings)?;
                let left = self.operand(left, bindings)?;
                self.visitor.shift_right(&left, &right)
            }
            Action::Braces { expr } => self.visitor.braces(&self.operand(expr, bindings)?),
            Action::Not { expr } => self.visitor.not(&self.operand(expr, bindings)?),
            Action::LogicalNot { expr } => {
                self.visitor.logical_not(&self.operand(expr, bindings)?)
            }
            Action::Assert { expr } => self.visitor.assertion(&self.operand(expr, bindings)?),
            Action::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.operand(cond, bindings)?;
                let then = self.operand(then, bindings)?;
                let otherwise = otherwise
                    .as_ref()
                    .map(|e| self.operand(e, bindings))
                    .transpose()?;
                self.visitor.if_else(&cond, &then, otherwise.as_deref())
            }
            Action::Switch { var, case } => {
                let var = self.operand(var, bindings)?;
                let mut cases = Vec::with_capacity(case.len());
                for arm in case {
                    let when = self.operand(&arm.when, bindings)?;
                    let then = self.operand(&arm.then, bindings)?;
                    cases.push((when, then));
                }
                self.visitor.switch(&var, &cases)
            }
            Action::Seq { exprs } => self.operands(exprs, bindings)?.join("\n"),
            Action::Assign {
                target,
                expr,
                comment,
            } => {
                let expr = self.operand(expr, bindings)?;
                let target = substitute(target, bindings);
                self.visitor.assign(&target, &expr, comment.as_deref())
            }
            Action::Return { expr, comment } => {
                let expr = self.operand(expr, bindings)?;
                self.visitor.ret(&expr, comment.as_deref())
            }
            Action::Eval { expr } => eval::eval_expr(expr, bindings)?,
            Action::Call { expr, comment } => {
                let rendered = self.call(expr, bindings)?;
                self.visitor.call(&rendered, comment.as_deref())
            }
            Action::Unknown => String::new(),
        };
        Ok(code)
    }

    /// Resolves and renders a call expression `name(k1=v1, k2=v2, ...)`.
    ///
    /// Argument values resolve in order: `$name` takes the caller's
    /// binding for `name` (absent bindings drop the argument), `&fname`
    /// transpiles the user function `fname` under the bindings gathered so
    /// far, anything else stays literal. The named function then renders
    /// under the resolved bindings.
    pub fn call(&self, expr: &str, bindings: &Bindings) -> Result<String, Error> {
        let (fun_name, rest) = expr
            .split_once('(')
            .ok_or_else(|| Error::ActionSyntax(format!("missing `(` in call `{expr}`")))?;
        let fun_name = fun_name.trim();
        let args = rest
            .strip_suffix(')')
            .ok_or_else(|| Error::ActionSyntax(format!("missing `)` in call `{expr}`")))?;

        let mut resolved = Bindings::new();
        for arg in args.split(',') {
            if arg.trim().is_empty() {
                continue;
            }
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                Error::ActionSyntax(format!("missing `=` in call argument `{arg}`"))
            })?;
            let key = key.trim();
            let value = value.trim();

            if let Some(placeholder) = value.strip_prefix('$') {
                if let Some(bound) = bindings.get(placeholder) {
                    resolved.insert(key.to_owned(), bound.clone());
                }
            } else if let Some(fun) = value
                .strip_prefix('&')
                .and_then(|name| self.deffun.get(name))
            {
                let rendered = self.transpile(fun, &resolved)?;
                resolved.insert(key.to_owned(), rendered);
            } else {
                resolved.insert(key.to_owned(), value.to_owned());
            }
        }

        let fun = self
            .deffun
            .get(fun_name)
            .ok_or_else(|| Error::UnknownFunction(fun_name.to_owned()))?;
        self.transpile(fun, &resolved)
    }

    fn operands(&self, exprs: &[Expr], bindings: &Bindings) -> Result<Vec<String>, Error> {
        exprs
            .iter()
            .map(|expr| self.operand(expr, bindings))
            .collect()
    }

    /// Renders an operand: nested nodes recurse, scalar leaves resolve
    /// placeholders.
    fn operand(&self, expr: &Expr, bindings: &Bindings) -> Result<String, Error> {
        match expr {
            Expr::Node(node) => self.transpile(node, bindings),
            Expr::Int(value) => Ok(value.to_string()),
            Expr::Text(text) => Ok(substitute(text, bindings)),
        }
    }
}

/// Resolves a `$name` leaf against the bindings. Unknown placeholders and
/// plain text pass through unchanged.
fn substitute(text: &str, bindings: &Bindings) -> String {
    match text.strip_prefix('$') {
        Some(name) => bindings
            .get(name)
            .cloned()
            .unwrap_or_else(|| text.to_owned()),
        None => text.to_owned(),
    }
}
