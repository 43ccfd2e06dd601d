//! Syntax tree produced by the parser.
//!
//! Every node owns its children and carries the [`Span`] it was parsed
//! from. A composite node's span starts where its first child (or leading
//! keyword) starts and ends where its last child ends.

use std::fmt;

use crate::token::Span;

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub span: Span,
}

/// Program root and the body of every compound statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    /// The trailing `return` or `break`, if the block has one.
    #[must_use]
    pub fn last_statement(&self) -> Option<&Statement> {
        self.statements.last().filter(|s| s.is_last_statement())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `a, b.c = x, y`
    Assign {
        targets: Vec<Variable>,
        values: Vec<Expression>,
        span: Span,
    },
    /// `local a, b = x, y`; `values` is empty when there is no `=`.
    LocalAssign {
        names: Vec<Name>,
        values: Vec<Expression>,
        span: Span,
    },
    FunctionCall(FunctionCall),
    Do {
        body: Block,
        span: Span,
    },
    While {
        condition: Expression,
        body: Block,
        span: Span,
    },
    Repeat {
        body: Block,
        condition: Expression,
        span: Span,
    },
    If {
        /// The `if` clause followed by every `elseif` clause.
        clauses: Vec<ConditionalClause>,
        else_block: Option<Block>,
        span: Span,
    },
    /// Numeric `for`.
    For {
        variable: Name,
        start: Expression,
        limit: Expression,
        step: Option<Expression>,
        body: Block,
        span: Span,
    },
    /// Generic `for ... in`.
    ForIn {
        names: Vec<Name>,
        expressions: Vec<Expression>,
        body: Block,
        span: Span,
    },
    Function {
        name: FunctionName,
        body: FunctionBody,
        span: Span,
    },
    LocalFunction {
        name: Name,
        body: FunctionBody,
        span: Span,
    },
    LabelDecl {
        label: Name,
        span: Span,
    },
    Goto {
        label: Name,
        span: Span,
    },
    Return {
        values: Vec<Expression>,
        span: Span,
    },
    Break {
        span: Span,
    },
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::FunctionCall(call) => call.span(),
            Self::Assign { span, .. }
            | Self::LocalAssign { span, .. }
            | Self::Do { span, .. }
            | Self::While { span, .. }
            | Self::Repeat { span, .. }
            | Self::If { span, .. }
            | Self::For { span, .. }
            | Self::ForIn { span, .. }
            | Self::Function { span, .. }
            | Self::LocalFunction { span, .. }
            | Self::LabelDecl { span, .. }
            | Self::Goto { span, .. }
            | Self::Return { span, .. }
            | Self::Break { span } => *span,
        }
    }

    /// `return` and `break` may only close a block.
    #[must_use]
    pub const fn is_last_statement(&self) -> bool {
        matches!(self, Self::Return { .. } | Self::Break { .. })
    }
}

/// One `if`/`elseif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalClause {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Nil {
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Number {
        value: f64,
        span: Span,
    },
    /// Decoded string literal.
    ///
    /// `\ddd` and `\xXX` escapes decode to the code point of that byte
    /// value, not to raw bytes: `"\195\169"` is `"Ã©"`, not `"é"`. Source
    /// text outside escapes is kept as written.
    String {
        value: String,
        span: Span,
    },
    Varargs {
        span: Span,
    },
    Function {
        body: FunctionBody,
        span: Span,
    },
    Prefix(PrefixExpression),
    Table(Table),
    BinaryOp {
        op: BinaryOperator,
        left: Box<Self>,
        right: Box<Self>,
        span: Span,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Self>,
        span: Span,
    },
}

impl Expression {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Prefix(prefix) => prefix.span(),
            Self::Table(table) => table.span,
            Self::Nil { span }
            | Self::Boolean { span, .. }
            | Self::Number { span, .. }
            | Self::String { span, .. }
            | Self::Varargs { span }
            | Self::Function { span, .. }
            | Self::BinaryOp { span, .. }
            | Self::UnaryOp { span, .. } => *span,
        }
    }
}

/// The forms that may precede `.name`, `[expr]`, `:name(...)`, or a call.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefixExpression {
    Variable(Variable),
    FunctionCall(FunctionCall),
    Parenthesized {
        expression: Box<Expression>,
        span: Span,
    },
}

impl PrefixExpression {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Variable(variable) => variable.span(),
            Self::FunctionCall(call) => call.span(),
            Self::Parenthesized { span, .. } => *span,
        }
    }
}

/// Assignable expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Identifier(Name),
    /// `prefix[index]`
    MemberExpr {
        prefix: Box<PrefixExpression>,
        index: Box<Expression>,
        span: Span,
    },
    /// `prefix.name`
    MemberId {
        prefix: Box<PrefixExpression>,
        name: Name,
        span: Span,
    },
}

impl Variable {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Identifier(name) => name.span,
            Self::MemberExpr { span, .. } | Self::MemberId { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCall {
    /// `prefix(args)`
    Normal {
        prefix: Box<PrefixExpression>,
        arguments: Arguments,
        span: Span,
    },
    /// `prefix:method(args)`, with `prefix` passed as the implicit receiver.
    TableMethod {
        prefix: Box<PrefixExpression>,
        method: Name,
        arguments: Arguments,
        span: Span,
    },
}

impl FunctionCall {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Normal { span, .. } | Self::TableMethod { span, .. } => *span,
        }
    }

    #[must_use]
    pub const fn arguments(&self) -> &Arguments {
        match self {
            Self::Normal { arguments, .. } | Self::TableMethod { arguments, .. } => arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// `(a, b)`
    ParenList {
        expressions: Vec<Expression>,
        span: Span,
    },
    /// `f{...}`
    TableLiteral(Table),
    /// `f"..."`
    StringLiteral {
        value: String,
        span: Span,
    },
}

impl Arguments {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::TableLiteral(table) => table.span,
            Self::ParenList { span, .. } | Self::StringLiteral { span, .. } => *span,
        }
    }
}

/// Table constructor `{ ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub fields: Vec<Field>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// `[key] = value`
    MemberExpr {
        key: Expression,
        value: Expression,
        span: Span,
    },
    /// `name = value`
    MemberId {
        key: Name,
        value: Expression,
        span: Span,
    },
    Positional(Expression),
}

impl Field {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::MemberExpr { span, .. } | Self::MemberId { span, .. } => *span,
            Self::Positional(value) => value.span(),
        }
    }
}

/// Parameter list and body shared by every function form.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    pub parameters: Vec<Name>,
    pub has_varargs: bool,
    pub body: Block,
    pub span: Span,
}

/// Target of `function a.b.c()` or `function a.b:c()`.
///
/// `is_method` marks the last path segment as `:` sugar; it implies at
/// least two segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionName {
    pub path: Vec<Name>,
    pub is_method: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Equal,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

/// Binding power of every unary operator's operand.
pub const UNARY_PRIORITY: u8 = 8;

impl BinaryOperator {
    /// `(left, right)` binding powers.
    ///
    /// Equal powers associate left; a left power above the right power
    /// associates right (`..` and `^`).
    #[must_use]
    pub const fn binding_power(self) -> (u8, u8) {
        match self {
            Self::Or => (1, 1),
            Self::And => (2, 2),
            Self::Less
            | Self::Greater
            | Self::LessEqual
            | Self::GreaterEqual
            | Self::NotEqual
            | Self::Equal => (3, 3),
            Self::Concat => (5, 4),
            Self::Add | Self::Subtract => (6, 6),
            Self::Multiply | Self::Divide | Self::Modulo => (7, 7),
            Self::Power => (10, 9),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::NotEqual => "~=",
            Self::Equal => "==",
            Self::Concat => "..",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    Length,
}

impl UnaryOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Negate => "-",
            Self::Length => "#",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
