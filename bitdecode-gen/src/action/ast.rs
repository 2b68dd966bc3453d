use serde::Deserialize;

/// One node of an action tree, discriminated by its `op` tag.
///
/// Operator families and their arity:
///
/// | family     | operators                                              |
/// |------------|--------------------------------------------------------|
/// | variadic   | `add sub mul mod and or xor logical_and logical_or`    |
/// | binary     | `is_equal is_not_equal is_less shiftleft shiftright`   |
/// | unary      | `braces not logical_not assert`                        |
/// | control    | `if switch`                                            |
/// | sequencing | `seq`                                                  |
/// | binding    | `assign return`                                        |
/// | escape     | `eval`                                                 |
/// | dispatch   | `call`                                                 |
///
/// Unrecognized tags deserialize to [`Action::Unknown`] and render as an
/// empty fragment, so documents written for a newer operator set still
/// load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// `a + b + ...`
    Add {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// `a - b - ...`
    Sub {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// `a * b * ...`
    Mul {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// `a % b % ...`
    Mod {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// Bitwise `a & b & ...`
    And {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// Bitwise `a | b | ...`
    Or {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// Bitwise `a ^ b ^ ...`
    Xor {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// Short-circuit conjunction.
    LogicalAnd {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// Short-circuit disjunction.
    LogicalOr {
        /// Operands, at least one.
        args: Vec<Expr>,
    },
    /// `left == right`
    IsEqual {
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// `left != right`
    IsNotEqual {
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// `left < right`
    IsLess {
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// `left << right`
    #[serde(rename = "shiftleft")]
    ShiftLeft {
        /// Value being shifted.
        left: Expr,
        /// Shift amount.
        right: Expr,
    },
    /// `left >> right`
    #[serde(rename = "shiftright")]
    ShiftRight {
        /// Value being shifted.
        left: Expr,
        /// Shift amount.
        right: Expr,
    },
    /// `(expr)`
    Braces {
        /// Wrapped expression.
        expr: Expr,
    },
    /// Bitwise complement.
    Not {
        /// Operand.
        expr: Expr,
    },
    /// Boolean negation.
    LogicalNot {
        /// Operand.
        expr: Expr,
    },
    /// Runtime assertion on the decoded word.
    Assert {
        /// Asserted condition.
        expr: Expr,
    },
    /// Two-way conditional; the else arm is optional.
    If {
        /// Condition.
        cond: Expr,
        /// Taken arm.
        then: Expr,
        /// Fallback arm.
        #[serde(default, rename = "else")]
        otherwise: Option<Expr>,
    },
    /// Multi-way dispatch on one scrutinee.
    Switch {
        /// Scrutinee.
        var: Expr,
        /// Value/arm pairs, tested in order.
        case: Vec<SwitchCase>,
    },
    /// Statement sequence, rendered newline-separated.
    Seq {
        /// Statements, in order.
        exprs: Vec<Expr>,
    },
    /// `target = expr`, optionally commented.
    Assign {
        /// Assignment target; placeholders resolve.
        target: String,
        /// Assigned expression.
        expr: Expr,
        /// Trailing comment.
        #[serde(default)]
        comment: Option<String>,
    },
    /// `return expr`, optionally commented.
    Return {
        /// Returned expression.
        expr: Expr,
        /// Trailing comment.
        #[serde(default)]
        comment: Option<String>,
    },
    /// Expression evaluated by the generator itself, not the generated
    /// decoder; see the transpiler's closed grammar.
    Eval {
        /// Expression text with `$name` placeholders.
        expr: String,
    },
    /// Invocation of a user-defined `deffun` function, written
    /// `name(k1=v1, k2=v2, ...)`.
    Call {
        /// Call expression text.
        expr: String,
        /// Trailing comment.
        #[serde(default)]
        comment: Option<String>,
    },
    /// Any operator this version does not know; renders empty.
    #[serde(other)]
    Unknown,
}

/// One arm of a [`Action::Switch`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwitchCase {
    /// Value the scrutinee is compared against.
    pub when: Expr,
    /// Arm body.
    pub then: Expr,
}

/// Operand position: either a nested action or a scalar leaf.
///
/// A string leaf starting with `$` names a placeholder; integers render
/// in decimal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    /// Nested action node.
    Node(Box<Action>),
    /// Integer literal.
    Int(i64),
    /// String literal or placeholder reference.
    Text(String),
}
