//! Syntax tree for Nuru source.
//!
//! Every node records the 1-indexed source line of the token that introduced
//! it. Columns are not tracked.
//!
//! `Display` renders each node back to valid Nuru text. Infix and prefix
//! expressions are always parenthesized so the rendering is unambiguous:
//!
//! ```text
//! fanya x = a + b * 2      →   fanya x = (a + (b * 2))
//! ```

use std::fmt;

// =============================================================================
// CONTAINERS
// =============================================================================

/// A parsed Nuru document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A brace-delimited statement list: `{ ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub line: u32,
    pub statements: Vec<Statement>,
}

/// Borrowed view over the node kinds a tree walk can land on.
///
/// Lets a traversal dispatch on one `match` across statements, blocks and
/// expressions alike.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Block(&'a BlockStatement),
    Statement(&'a Statement),
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Import(ImportStatement),
    Break { line: u32 },
    Continue { line: u32 },
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn line(&self) -> u32 {
        match self {
            Statement::Let(s) => s.line,
            Statement::Return(s) => s.line,
            Statement::Import(s) => s.line,
            Statement::Break { line } | Statement::Continue { line } => *line,
            Statement::Expression(s) => s.line,
        }
    }
}

/// `fanya <name> [= <value>]`
#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub line: u32,
    pub name: Identifier,
    pub value: Option<Expression>,
}

/// `rudisha [<value>]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub line: u32,
    pub value: Option<Expression>,
}

/// `tumia <module>, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub line: u32,
    pub modules: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub line: u32,
    pub expression: Expression,
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub line: u32,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer { line: u32, value: i64 },
    Float { line: u32, value: f64 },
    String { line: u32, value: String },
    Boolean { line: u32, value: bool },
    Null { line: u32 },
    /// `@`, the current-instance reference inside a package
    SelfRef { line: u32 },
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    Assign(Assign),
    CompoundAssign(CompoundAssign),
    FieldAssign(FieldAssign),
    If(IfExpression),
    While(WhileExpression),
    For(ForExpression),
    Switch(SwitchExpression),
    Function(FunctionLiteral),
    Call(CallExpression),
    Index(IndexExpression),
    Property(PropertyExpression),
    Array { line: u32, elements: Vec<Expression> },
    Dict { line: u32, pairs: Vec<(Expression, Expression)> },
    Package(Package),
}

impl Expression {
    pub fn line(&self) -> u32 {
        match self {
            Expression::Identifier(ident) => ident.line,
            Expression::Integer { line, .. }
            | Expression::Float { line, .. }
            | Expression::String { line, .. }
            | Expression::Boolean { line, .. }
            | Expression::Null { line }
            | Expression::SelfRef { line }
            | Expression::Array { line, .. }
            | Expression::Dict { line, .. } => *line,
            Expression::Prefix(e) => e.line,
            Expression::Infix(e) => e.line,
            Expression::Assign(e) => e.line,
            Expression::CompoundAssign(e) => e.line,
            Expression::FieldAssign(e) => e.line,
            Expression::If(e) => e.line,
            Expression::While(e) => e.line,
            Expression::For(e) => e.line,
            Expression::Switch(e) => e.line,
            Expression::Function(e) => e.line,
            Expression::Call(e) => e.line,
            Expression::Index(e) => e.line,
            Expression::Property(e) => e.line,
            Expression::Package(e) => e.line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub line: u32,
    pub operator: String,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub line: u32,
    pub left: Box<Expression>,
    pub operator: String,
    pub right: Box<Expression>,
}

/// `<name> = <value>`, rebinding an existing name.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub line: u32,
    pub name: Identifier,
    pub value: Box<Expression>,
}

/// `<name> += <value>` and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssign {
    pub line: u32,
    pub name: Identifier,
    pub operator: String,
    pub value: Box<Expression>,
}

/// `<object>.<field> = <value>` or `<object>[<index>] = <value>`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssign {
    pub line: u32,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
}

/// `kama (<condition>) { ... } sivyo { ... }`
///
/// An `au kama` chain is stored as an alternative block holding the nested
/// `kama` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub line: u32,
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

/// `wakati (<condition>) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileExpression {
    pub line: u32,
    pub condition: Box<Expression>,
    pub body: BlockStatement,
}

/// `kwa <key>[, <value>] ktk <iterable> { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpression {
    pub line: u32,
    pub key: Identifier,
    pub value: Option<Identifier>,
    pub iterable: Box<Expression>,
    pub body: BlockStatement,
}

/// `badili (<value>) { ikiwa ... { } kawaida { } }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchExpression {
    pub line: u32,
    pub value: Box<Expression>,
    pub cases: Vec<SwitchCase>,
    pub default: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub line: u32,
    pub values: Vec<Expression>,
    pub body: BlockStatement,
}

/// `unda(<params>) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub line: u32,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub line: u32,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub line: u32,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

/// `<object>.<property>`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpression {
    pub line: u32,
    pub object: Box<Expression>,
    pub property: Identifier,
}

/// `pakeji <name> { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub line: u32,
    pub name: Identifier,
    pub block: BlockStatement,
}

// =============================================================================
// RENDERING
// =============================================================================

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Parenthesized condition; infix and prefix expressions already carry parens.
fn write_condition(f: &mut fmt::Formatter<'_>, condition: &Expression) -> fmt::Result {
    match condition {
        Expression::Infix(_) | Expression::Prefix(_) => write!(f, "{}", condition),
        other => write!(f, "({})", other),
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", stmt)?;
        }
        f.write_str(" }")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => match &s.value {
                Some(value) => write!(f, "fanya {} = {}", s.name, value),
                None => write!(f, "fanya {}", s.name),
            },
            Statement::Return(s) => match &s.value {
                Some(value) => write!(f, "rudisha {}", value),
                None => f.write_str("rudisha"),
            },
            Statement::Import(s) => {
                f.write_str("tumia ")?;
                write_joined(f, &s.modules)
            }
            Statement::Break { .. } => f.write_str("vunja"),
            Statement::Continue { .. } => f.write_str("endelea"),
            Statement::Expression(s) => write!(f, "{}", s.expression),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::Integer { value, .. } => write!(f, "{}", value),
            Expression::Float { value, .. } => write!(f, "{:?}", value),
            Expression::String { value, .. } => write_string_literal(f, value),
            Expression::Boolean { value: true, .. } => f.write_str("kweli"),
            Expression::Boolean { value: false, .. } => f.write_str("sikweli"),
            Expression::Null { .. } => f.write_str("tupu"),
            Expression::SelfRef { .. } => f.write_str("@"),
            Expression::Prefix(e) => write!(f, "({}{})", e.operator, e.right),
            Expression::Infix(e) => write!(f, "({} {} {})", e.left, e.operator, e.right),
            Expression::Assign(e) => write!(f, "{} = {}", e.name, e.value),
            Expression::CompoundAssign(e) => {
                write!(f, "{} {} {}", e.name, e.operator, e.value)
            }
            Expression::FieldAssign(e) => write!(f, "{} = {}", e.target, e.value),
            Expression::If(e) => {
                f.write_str("kama ")?;
                write_condition(f, &e.condition)?;
                write!(f, " {}", e.consequence)?;
                if let Some(alternative) = &e.alternative {
                    write!(f, " sivyo {}", alternative)?;
                }
                Ok(())
            }
            Expression::While(e) => {
                f.write_str("wakati ")?;
                write_condition(f, &e.condition)?;
                write!(f, " {}", e.body)
            }
            Expression::For(e) => {
                write!(f, "kwa {}", e.key)?;
                if let Some(value) = &e.value {
                    write!(f, ", {}", value)?;
                }
                write!(f, " ktk {} {}", e.iterable, e.body)
            }
            Expression::Switch(e) => {
                f.write_str("badili ")?;
                write_condition(f, &e.value)?;
                f.write_str(" {")?;
                for case in &e.cases {
                    f.write_str(" ikiwa ")?;
                    write_joined(f, &case.values)?;
                    write!(f, " {}", case.body)?;
                }
                if let Some(default) = &e.default {
                    write!(f, " kawaida {}", default)?;
                }
                f.write_str(" }")
            }
            Expression::Function(e) => {
                f.write_str("unda(")?;
                write_joined(f, &e.parameters)?;
                write!(f, ") {}", e.body)
            }
            Expression::Call(e) => {
                write!(f, "{}(", e.function)?;
                write_joined(f, &e.arguments)?;
                f.write_str(")")
            }
            Expression::Index(e) => write!(f, "{}[{}]", e.left, e.index),
            Expression::Property(e) => write!(f, "{}.{}", e.object, e.property),
            Expression::Array { elements, .. } => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            }
            Expression::Dict { pairs, .. } => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Expression::Package(e) => write!(f, "pakeji {} {}", e.name, e.block),
        }
    }
}
