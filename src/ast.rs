//! Abstract syntax tree for Kin.
//!
//! One tagged variant per syntactic form. Nodes are fully owned (identifier
//! names are copied out of the token buffer at parse time) so the AST can
//! outlive the scanner, and `Serialize` so the CLI can pretty-print a parse
//! as JSON.

use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// A whole source file: an ordered statement list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// Statement-level syntactic forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `reka x = expr` / `ntahinduka x = expr` / `reka x;`
    VariableDeclaration {
        constant: bool,
        identifier: String,
        value: Option<Expr>,
    },

    /// `porogaramu_ntoya name(a, b) { ... }`
    ///
    /// The body is reference-counted so the function value created at
    /// evaluation time shares it with the declaration; function equality is
    /// pointer identity on this allocation.
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Rc<Vec<Stmt>>,
    },

    /// `niba (cond) { ... }` with `nanone_niba` chains nesting into
    /// `alternate` and `niba_byanze` supplying the terminal alternate.
    /// `gereranya` switches desugar to chains of this node at parse time.
    Conditional {
        condition: Expr,
        body: Vec<Stmt>,
        alternate: Vec<Stmt>,
    },

    /// `subiramo_niba (cond) { ... }` - a pre-test loop.
    Loop { condition: Expr, body: Vec<Stmt> },

    /// A bare expression in statement position.
    Expression(Expr),
}

/// Expression-level syntactic forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// `target = value`; the target must evaluate-time resolve to an
    /// identifier or member expression.
    Assignment {
        assigne: Box<Expr>,
        value: Box<Expr>,
    },

    /// `left op right`
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `caller(arg, ...)`, chainable: `f(1)(2)`.
    Call { caller: Box<Expr>, args: Vec<Expr> },

    /// `object.name` (computed = false, property is an Identifier) or
    /// `object[expr]` (computed = true, property is any expression).
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },

    /// A user-defined name.
    Identifier(String),

    /// Integer and float literals, both normalized to f64.
    NumericLiteral(f64),

    StringLiteral(String),

    /// `{key: expr, shorthand, ...}`; arrays are this node with decimal
    /// string-index keys assigned in parse order.
    ObjectLiteral(Vec<Property>),

    /// `tanga expr` / `tanga;` - return is an expression in Kin's grammar.
    Return(Option<Box<Expr>>),
}

/// One `key: value` pair of an object literal. An absent value means
/// shorthand: look up a variable named like the key in the enclosing scope
/// at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub key: String,
    pub value: Option<Expr>,
}

/// Binary operator symbols, split out of the token stream at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// The source spelling of this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
