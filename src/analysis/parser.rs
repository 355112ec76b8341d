//! Parser for Nuru source text.
//!
//! Built from nom combinators over `nom_locate::LocatedSpan`, so every node
//! picks up the 1-indexed line of the token that introduced it. The span's
//! extra field carries the current expression nesting depth; input nested
//! deeper than [`MAX_NESTING`] is rejected instead of exhausting the stack.
//!
//! ## Precedence (lowest first)
//!
//! ```text
//! =  +=  -=  *=  /=      assignment (`+=` family on identifiers only)
//! &&  ||
//! ==  !=
//! <  >  <=  >=
//! +  -
//! *  /  %
//! **                     right associative
//! !  -                   prefix
//! f(x)  a[i]  a.b        postfix
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{anychar, char, digit1, multispace1, satisfy},
    combinator::{cut, map, map_res, not, opt, peek, recognize, value},
    error::ErrorKind,
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use nom_locate::LocatedSpan;
use thiserror::Error;

use super::ast::*;

/// Source slice tagged with the expression nesting depth.
pub type Span<'a> = LocatedSpan<&'a str, u32>;

type PResult<'a, T> = IResult<Span<'a>, T>;

/// Deepest expression nesting accepted before parsing fails.
pub const MAX_NESTING: u32 = 32;

/// Words that never parse as identifiers.
pub const KEYWORDS: &[&str] = &[
    "fanya", "unda", "kama", "sivyo", "au", "wakati", "kwa", "ktk", "rudisha", "vunja",
    "endelea", "kweli", "sikweli", "tupu", "badili", "ikiwa", "kawaida", "tumia", "pakeji",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected input near `{near}`")]
    Syntax { line: u32, near: String },
    #[error("line {line}: unexpected end of input")]
    UnexpectedEof { line: u32 },
    #[error("line {line}: expressions nested more than {} levels deep", MAX_NESTING)]
    TooDeep { line: u32 },
}

impl ParseError {
    /// 1-indexed line the error was detected on.
    pub fn line(&self) -> u32 {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::UnexpectedEof { line }
            | ParseError::TooDeep { line } => *line,
        }
    }

    fn at(input: Span<'_>) -> Self {
        let line = input.location_line();
        let near: String = input
            .fragment()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(24)
            .collect();
        if input.fragment().trim().is_empty() {
            ParseError::UnexpectedEof { line }
        } else {
            ParseError::Syntax { line, near }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a complete Nuru document.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let input = Span::new_extra(source, 0);
    let (rest, statements) = many0(statement)(input).map_err(from_nom)?;
    let (rest, _) = ws(rest).map_err(from_nom)?;
    if !rest.fragment().is_empty() {
        return Err(ParseError::at(rest));
    }
    Ok(Program { statements })
}

fn from_nom(err: nom::Err<nom::error::Error<Span<'_>>>) -> ParseError {
    match err {
        nom::Err::Failure(e) if e.code == ErrorKind::TooLarge => ParseError::TooDeep {
            line: e.input.location_line(),
        },
        nom::Err::Error(e) | nom::Err::Failure(e) => ParseError::at(e.input),
        nom::Err::Incomplete(_) => ParseError::UnexpectedEof { line: 0 },
    }
}

// ============================================================================
// Lexical helpers
// ============================================================================

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn line_comment(input: Span) -> PResult<()> {
    value((), pair(tag("//"), take_while(|c: char| c != '\n')))(input)
}

fn block_comment(input: Span) -> PResult<()> {
    value((), tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Whitespace and comments.
fn ws(input: Span) -> PResult<()> {
    value(
        (),
        many0(alt((value((), multispace1), line_comment, block_comment))),
    )(input)
}

/// Punctuation token; yields the line it sits on.
fn sym<'a>(token: &'static str) -> impl FnMut(Span<'a>) -> PResult<'a, u32> {
    move |input| {
        let (input, _) = ws(input)?;
        let line = input.location_line();
        let (input, _) = tag(token)(input)?;
        Ok((input, line))
    }
}

/// Reserved word, not followed by an identifier character.
fn keyword<'a>(word: &'static str) -> impl FnMut(Span<'a>) -> PResult<'a, u32> {
    move |input| {
        let (input, _) = ws(input)?;
        let line = input.location_line();
        let (input, _) = terminated(tag(word), not(peek(satisfy(is_ident_char))))(input)?;
        Ok((input, line))
    }
}

fn identifier(input: Span) -> PResult<Identifier> {
    let (input, _) = ws(input)?;
    let line = input.location_line();
    let (rest, name) = recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)?;
    if KEYWORDS.contains(name.fragment()) {
        return Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Tag)));
    }
    Ok((
        rest,
        Identifier {
            line,
            value: name.fragment().to_string(),
        },
    ))
}

/// `=` that is not the start of `==`.
fn assign_operator(input: Span) -> PResult<u32> {
    let (input, line) = sym("=")(input)?;
    let (input, _) = not(peek(char('=')))(input)?;
    Ok((input, line))
}

// ============================================================================
// Statements
// ============================================================================

fn statement(input: Span) -> PResult<Statement> {
    terminated(
        alt((
            let_statement,
            return_statement,
            import_statement,
            map(keyword("vunja"), |line| Statement::Break { line }),
            map(keyword("endelea"), |line| Statement::Continue { line }),
            expression_statement,
        )),
        opt(sym(";")),
    )(input)
}

fn let_statement(input: Span) -> PResult<Statement> {
    let (input, line) = keyword("fanya")(input)?;
    let (input, name) = cut(identifier)(input)?;
    let (input, value) = opt(preceded(assign_operator, cut(expression)))(input)?;
    Ok((input, Statement::Let(LetStatement { line, name, value })))
}

fn return_statement(input: Span) -> PResult<Statement> {
    let (input, line) = keyword("rudisha")(input)?;
    let (input, value) = opt(expression)(input)?;
    Ok((input, Statement::Return(ReturnStatement { line, value })))
}

fn import_statement(input: Span) -> PResult<Statement> {
    let (input, line) = keyword("tumia")(input)?;
    let (input, modules) = cut(separated_list1(sym(","), identifier))(input)?;
    Ok((input, Statement::Import(ImportStatement { line, modules })))
}

fn expression_statement(input: Span) -> PResult<Statement> {
    let (input, expression) = expression(input)?;
    Ok((
        input,
        Statement::Expression(ExpressionStatement {
            line: expression.line(),
            expression,
        }),
    ))
}

fn block(input: Span) -> PResult<BlockStatement> {
    let (input, line) = sym("{")(input)?;
    let (input, statements) = many0(statement)(input)?;
    let (input, _) = cut(sym("}"))(input)?;
    Ok((input, BlockStatement { line, statements }))
}

// ============================================================================
// Expressions
// ============================================================================

fn expression(input: Span) -> PResult<Expression> {
    nested(alt((assignment, compound_assignment, field_assignment)))(input)
}

/// Run `parser` one nesting level deeper, failing hard past [`MAX_NESTING`].
fn nested<'a, O>(
    mut parser: impl FnMut(Span<'a>) -> PResult<'a, O>,
) -> impl FnMut(Span<'a>) -> PResult<'a, O> {
    move |mut input: Span<'a>| {
        let depth = input.extra;
        if depth >= MAX_NESTING {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                ErrorKind::TooLarge,
            )));
        }
        input.extra = depth + 1;
        let (mut rest, output) = parser(input)?;
        rest.extra = depth;
        Ok((rest, output))
    }
}

/// Property or index target on the left of `=`; anything else is returned as is.
fn field_assignment(input: Span) -> PResult<Expression> {
    let (input, target) = logical(input)?;
    if !matches!(target, Expression::Property(_) | Expression::Index(_)) {
        return Ok((input, target));
    }
    match assign_operator(input) {
        Ok((rest, _)) => {
            let (rest, value) = cut(expression)(rest)?;
            Ok((
                rest,
                Expression::FieldAssign(FieldAssign {
                    line: target.line(),
                    target: Box::new(target),
                    value: Box::new(value),
                }),
            ))
        }
        Err(nom::Err::Error(_)) => Ok((input, target)),
        Err(e) => Err(e),
    }
}

fn assignment(input: Span) -> PResult<Expression> {
    let (input, name) = identifier(input)?;
    let (input, _) = assign_operator(input)?;
    let (input, value) = cut(expression)(input)?;
    Ok((
        input,
        Expression::Assign(Assign {
            line: name.line,
            name,
            value: Box::new(value),
        }),
    ))
}

fn compound_assignment(input: Span) -> PResult<Expression> {
    let (input, name) = identifier(input)?;
    let (input, operator) = preceded(
        ws,
        alt((tag("+="), tag("-="), tag("*="), tag("/="))),
    )(input)?;
    let (input, value) = cut(expression)(input)?;
    Ok((
        input,
        Expression::CompoundAssign(CompoundAssign {
            line: name.line,
            name,
            operator: operator.fragment().to_string(),
            value: Box::new(value),
        }),
    ))
}

/// Match one of `operators` without swallowing a longer operator (`<=`, `**`, `+=`).
fn binary_operator<'a>(input: Span<'a>, operators: &[&'static str]) -> PResult<'a, &'static str> {
    let (input, _) = ws(input)?;
    for op in operators {
        if let Some(rest) = input.fragment().strip_prefix(op) {
            let next = rest.chars().next();
            let swallows = next == Some('=') || (*op == "*" && next == Some('*'));
            if !swallows {
                let (input, _) = tag(*op)(input)?;
                return Ok((input, *op));
            }
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Tag)))
}

/// Left-associative binary level.
fn binary<'a>(
    input: Span<'a>,
    operators: &[&'static str],
    operand: fn(Span<'a>) -> PResult<'a, Expression>,
) -> PResult<'a, Expression> {
    let (mut input, mut left) = operand(input)?;
    loop {
        match binary_operator(input, operators) {
            Ok((rest, operator)) => {
                let (rest, right) = cut(operand)(rest)?;
                left = Expression::Infix(InfixExpression {
                    line: left.line(),
                    left: Box::new(left),
                    operator: operator.to_string(),
                    right: Box::new(right),
                });
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, left)),
            Err(e) => return Err(e),
        }
    }
}

fn logical(input: Span) -> PResult<Expression> {
    binary(input, &["&&", "||"], equality)
}

fn equality(input: Span) -> PResult<Expression> {
    binary(input, &["==", "!="], comparison)
}

fn comparison(input: Span) -> PResult<Expression> {
    binary(input, &["<=", ">=", "<", ">"], sum)
}

fn sum(input: Span) -> PResult<Expression> {
    binary(input, &["+", "-"], product)
}

fn product(input: Span) -> PResult<Expression> {
    binary(input, &["*", "/", "%"], power)
}

fn power(input: Span) -> PResult<Expression> {
    let (mut input, base) = prefix(input)?;
    let mut exponents = Vec::new();
    loop {
        match binary_operator(input, &["**"]) {
            Ok((rest, _)) => {
                let (rest, exponent) = cut(prefix)(rest)?;
                exponents.push(exponent);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    // a ** b ** c == a ** (b ** c)
    let expr = match exponents
        .into_iter()
        .rev()
        .reduce(|right, left| raise(left, right))
    {
        Some(exponent) => raise(base, exponent),
        None => base,
    };
    Ok((input, expr))
}

fn raise(base: Expression, exponent: Expression) -> Expression {
    Expression::Infix(InfixExpression {
        line: base.line(),
        left: Box::new(base),
        operator: "**".to_string(),
        right: Box::new(exponent),
    })
}

fn prefix_operator(input: Span) -> PResult<(u32, String)> {
    let (input, _) = ws(input)?;
    let line = input.location_line();
    let (input, operator) = alt((tag("!"), tag("-")))(input)?;
    Ok((input, (line, operator.fragment().to_string())))
}

fn prefix(input: Span) -> PResult<Expression> {
    let (input, operators) = many0(prefix_operator)(input)?;
    if operators.is_empty() {
        return postfix(input);
    }
    let (input, operand) = cut(postfix)(input)?;
    let expr = operators
        .into_iter()
        .rev()
        .fold(operand, |right, (line, operator)| {
            Expression::Prefix(PrefixExpression {
                line,
                operator,
                right: Box::new(right),
            })
        });
    Ok((input, expr))
}

fn call_arguments(input: Span) -> PResult<Vec<Expression>> {
    let (input, _) = sym("(")(input)?;
    let (input, arguments) = separated_list0(sym(","), expression)(input)?;
    let (input, _) = opt(sym(","))(input)?;
    let (input, _) = cut(sym(")"))(input)?;
    Ok((input, arguments))
}

fn index_suffix(input: Span) -> PResult<Expression> {
    let (input, _) = sym("[")(input)?;
    let (input, index) = cut(expression)(input)?;
    let (input, _) = cut(sym("]"))(input)?;
    Ok((input, index))
}

fn property_suffix(input: Span) -> PResult<Identifier> {
    preceded(sym("."), cut(identifier))(input)
}

enum Suffix {
    Call(Vec<Expression>),
    Index(Expression),
    Property(Identifier),
}

impl Suffix {
    fn apply(self, expr: Expression) -> Expression {
        let line = expr.line();
        match self {
            Suffix::Call(arguments) => Expression::Call(CallExpression {
                line,
                function: Box::new(expr),
                arguments,
            }),
            Suffix::Index(index) => Expression::Index(IndexExpression {
                line,
                left: Box::new(expr),
                index: Box::new(index),
            }),
            Suffix::Property(property) => Expression::Property(PropertyExpression {
                line,
                object: Box::new(expr),
                property,
            }),
        }
    }
}

fn suffix(input: Span) -> PResult<Suffix> {
    alt((
        map(call_arguments, Suffix::Call),
        map(index_suffix, Suffix::Index),
        map(property_suffix, Suffix::Property),
    ))(input)
}

fn postfix(input: Span) -> PResult<Expression> {
    let (mut input, mut expr) = primary(input)?;
    loop {
        match suffix(input) {
            Ok((rest, suffix)) => {
                expr = suffix.apply(expr);
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, expr)),
            Err(e) => return Err(e),
        }
    }
}

fn primary(input: Span) -> PResult<Expression> {
    alt((
        function_literal,
        if_expression,
        while_expression,
        for_expression,
        switch_expression,
        package,
        delimited(sym("("), expression, cut(sym(")"))),
        array,
        dict,
        string_literal,
        float,
        integer,
        map(keyword("kweli"), |line| Expression::Boolean { line, value: true }),
        map(keyword("sikweli"), |line| Expression::Boolean { line, value: false }),
        map(keyword("tupu"), |line| Expression::Null { line }),
        map(sym("@"), |line| Expression::SelfRef { line }),
        map(identifier, Expression::Identifier),
    ))(input)
}

// ============================================================================
// Literals
// ============================================================================

fn integer(input: Span) -> PResult<Expression> {
    let (input, _) = ws(input)?;
    let line = input.location_line();
    let (input, value) = map_res(digit1, |digits: Span| digits.fragment().parse::<i64>())(input)?;
    Ok((input, Expression::Integer { line, value }))
}

fn float(input: Span) -> PResult<Expression> {
    let (input, _) = ws(input)?;
    let line = input.location_line();
    let (input, value) = map_res(
        recognize(tuple((digit1, char('.'), digit1))),
        |text: Span| text.fragment().parse::<f64>(),
    )(input)?;
    Ok((input, Expression::Float { line, value }))
}

/// Body of a string literal delimited by `quote`, with escapes resolved.
fn quoted<'a>(quote: char) -> impl FnMut(Span<'a>) -> PResult<'a, String> {
    move |input| {
        let (mut input, _) = char(quote)(input)?;
        let mut value = String::new();
        loop {
            let (rest, c) = anychar(input)?;
            input = rest;
            if c == quote {
                return Ok((input, value));
            }
            if c == '\\' {
                let (rest, escaped) = anychar(input)?;
                input = rest;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            } else {
                value.push(c);
            }
        }
    }
}

fn string_literal(input: Span) -> PResult<Expression> {
    let (input, _) = ws(input)?;
    let line = input.location_line();
    let (input, value) = alt((quoted('"'), quoted('\'')))(input)?;
    Ok((input, Expression::String { line, value }))
}

fn array(input: Span) -> PResult<Expression> {
    let (input, line) = sym("[")(input)?;
    let (input, elements) = separated_list0(sym(","), expression)(input)?;
    let (input, _) = opt(sym(","))(input)?;
    let (input, _) = cut(sym("]"))(input)?;
    Ok((input, Expression::Array { line, elements }))
}

fn dict(input: Span) -> PResult<Expression> {
    let (input, line) = sym("{")(input)?;
    let (input, pairs) =
        separated_list0(sym(","), separated_pair(expression, sym(":"), expression))(input)?;
    let (input, _) = opt(sym(","))(input)?;
    let (input, _) = sym("}")(input)?;
    Ok((input, Expression::Dict { line, pairs }))
}

// ============================================================================
// Compound expressions
// ============================================================================

fn condition(input: Span) -> PResult<Expression> {
    delimited(sym("("), cut(expression), cut(sym(")")))(input)
}

fn function_literal(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("unda")(input)?;
    let (input, _) = cut(sym("("))(input)?;
    let (input, parameters) = separated_list0(sym(","), identifier)(input)?;
    let (input, _) = opt(sym(","))(input)?;
    let (input, _) = cut(sym(")"))(input)?;
    let (input, body) = cut(block)(input)?;
    Ok((
        input,
        Expression::Function(FunctionLiteral {
            line,
            parameters,
            body,
        }),
    ))
}

fn if_expression(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("kama")(input)?;
    let (input, condition) = cut(condition)(input)?;
    let (input, consequence) = cut(block)(input)?;
    let (input, alternative) = opt(alt((else_if, preceded(keyword("sivyo"), cut(block)))))(input)?;
    Ok((
        input,
        Expression::If(IfExpression {
            line,
            condition: Box::new(condition),
            consequence,
            alternative,
        }),
    ))
}

/// `au kama (...) { ... }`, folded into a single-statement alternative block.
fn else_if(input: Span) -> PResult<BlockStatement> {
    let (input, line) = keyword("au")(input)?;
    let (input, nested) = cut(if_expression)(input)?;
    Ok((
        input,
        BlockStatement {
            line,
            statements: vec![Statement::Expression(ExpressionStatement {
                line: nested.line(),
                expression: nested,
            })],
        },
    ))
}

fn while_expression(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("wakati")(input)?;
    let (input, condition) = cut(condition)(input)?;
    let (input, body) = cut(block)(input)?;
    Ok((
        input,
        Expression::While(WhileExpression {
            line,
            condition: Box::new(condition),
            body,
        }),
    ))
}

fn for_expression(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("kwa")(input)?;
    let (input, key) = cut(identifier)(input)?;
    let (input, value) = opt(preceded(sym(","), cut(identifier)))(input)?;
    let (input, _) = cut(keyword("ktk"))(input)?;
    let (input, iterable) = cut(expression)(input)?;
    let (input, body) = cut(block)(input)?;
    Ok((
        input,
        Expression::For(ForExpression {
            line,
            key,
            value,
            iterable: Box::new(iterable),
            body,
        }),
    ))
}

fn switch_case(input: Span) -> PResult<SwitchCase> {
    let (input, line) = keyword("ikiwa")(input)?;
    let (input, values) = cut(separated_list1(sym(","), expression))(input)?;
    let (input, body) = cut(block)(input)?;
    Ok((input, SwitchCase { line, values, body }))
}

fn switch_expression(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("badili")(input)?;
    let (input, value) = cut(condition)(input)?;
    let (input, _) = cut(sym("{"))(input)?;
    let (input, cases) = many0(switch_case)(input)?;
    let (input, default) = opt(preceded(keyword("kawaida"), cut(block)))(input)?;
    let (input, _) = cut(sym("}"))(input)?;
    Ok((
        input,
        Expression::Switch(SwitchExpression {
            line,
            value: Box::new(value),
            cases,
            default,
        }),
    ))
}

fn package(input: Span) -> PResult<Expression> {
    let (input, line) = keyword("pakeji")(input)?;
    let (input, name) = cut(identifier)(input)?;
    let (input, block) = cut(block)(input)?;
    Ok((input, Expression::Package(Package { line, name, block })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        parse_program(source).expect("source should parse")
    }

    #[test]
    fn test_let_statement_records_line() {
        let program = parse("\n\nfanya jumla = 10");
        match &program.statements[0] {
            Statement::Let(stmt) => {
                assert_eq!(stmt.line, 3);
                assert_eq!(stmt.name.value, "jumla");
                assert_eq!(stmt.value.as_ref().map(|v| v.to_string()), Some("10".into()));
            }
            other => panic!("Expected let statement, got {:?}", other),
        }
    }

    #[test]
    fn test_let_without_value() {
        let program = parse("fanya x;");
        assert_eq!(program.to_string(), "fanya x");
    }

    #[test]
    fn test_precedence_rendering() {
        let program = parse("fanya x = 1 + 2 * 3 ** 2 ** 1 == 19 && !kweli");
        assert_eq!(
            program.to_string(),
            "fanya x = (((1 + (2 * (3 ** (2 ** 1)))) == 19) && (!kweli))"
        );
    }

    #[test]
    fn test_comparison_does_not_split_compound_operator() {
        let program = parse("a <= b");
        assert_eq!(program.to_string(), "(a <= b)");
    }

    #[test]
    fn test_assign_and_compound_assign() {
        let program = parse("x = 5\ny += 2");
        assert!(matches!(
            &program.statements[0],
            Statement::Expression(ExpressionStatement {
                expression: Expression::Assign(_),
                ..
            })
        ));
        assert!(matches!(
            &program.statements[1],
            Statement::Expression(ExpressionStatement {
                expression: Expression::CompoundAssign(_),
                ..
            })
        ));
        assert_eq!(program.statements[1].line(), 2);
    }

    #[test]
    fn test_equality_is_not_assignment() {
        let program = parse("x == 5");
        assert_eq!(program.to_string(), "(x == 5)");
    }

    #[test]
    fn test_function_literal_parameters_lines() {
        let program = parse("fanya jumlisha = unda(a,\n  b) {\n  rudisha a + b\n}");
        let Statement::Let(stmt) = &program.statements[0] else {
            panic!("Expected let statement");
        };
        let Some(Expression::Function(func)) = &stmt.value else {
            panic!("Expected function literal");
        };
        assert_eq!(func.parameters[0].line, 1);
        assert_eq!(func.parameters[1].line, 2);
        assert_eq!(func.body.statements[0].line(), 3);
    }

    #[test]
    fn test_control_flow() {
        let source = r#"
kama (x > 5) {
    andika("kubwa")
} au kama (x > 3) {
    andika("wastani")
} sivyo {
    andika("ndogo")
}
wakati (i < 10) { i += 1 }
kwa k, v ktk kamusi { andika(k, v) }
badili (x) {
    ikiwa 1, 2 { andika("moja") }
    kawaida { vunja }
}
"#;
        let program = parse(source);
        assert_eq!(program.statements.len(), 4);
        assert_eq!(program.statements[0].line(), 2);
        assert_eq!(program.statements[1].line(), 9);
        assert_eq!(
            program.statements[2].to_string(),
            "kwa k, v ktk kamusi { andika(k, v) }"
        );
    }

    #[test]
    fn test_package_and_self_reference() {
        let program = parse("pakeji Gari {\n  andaa = unda(jina) { @.jina = jina }\n}");
        let Statement::Expression(stmt) = &program.statements[0] else {
            panic!("Expected expression statement");
        };
        let Expression::Package(pkg) = &stmt.expression else {
            panic!("Expected package");
        };
        assert_eq!(pkg.name.value, "Gari");
        assert_eq!(pkg.block.statements.len(), 1);
    }

    #[test]
    fn test_collections_and_postfix() {
        let program = parse(r#"orodha[0].tungo()
fanya d = {"a": 1, 'b': [1, 2,],}"#);
        assert_eq!(program.statements[0].to_string(), "orodha[0].tungo()");
        assert_eq!(
            program.statements[1].to_string(),
            r#"fanya d = {"a": 1, "b": [1, 2]}"#
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let program = parse("// maoni\nfanya x = 1 /* ndani */ + 2\n");
        assert_eq!(program.to_string(), "fanya x = (1 + 2)");
    }

    #[test]
    fn test_imports() {
        let program = parse("tumia hisabati, muda");
        assert_eq!(program.to_string(), "tumia hisabati, muda");
    }

    #[test]
    fn test_keyword_is_not_identifier() {
        let err = parse_program("fanya kama = 5").unwrap_err();
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_error_reports_failing_line() {
        let err = parse_program("fanya x = 1\nfanya y = (2 +\n").unwrap_err();
        assert!(err.line() >= 2, "unexpected error line: {}", err);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_program("kama (x) {\n andika(x)\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_stacked_prefix_operators() {
        let program = parse("fanya x = !-y ** 2");
        assert_eq!(program.to_string(), "fanya x = ((!(-y)) ** 2)");
    }

    #[test]
    fn test_broken_call_arguments_are_reported() {
        let err = parse_program("andika(1, 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { line: 1 }));
    }

    /// Parse on a thread with a tokio worker sized stack.
    fn parse_on_small_stack(source: String) -> Result<Program, ParseError> {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || parse_program(&source))
            .expect("spawn parser thread")
            .join()
            .expect("parser thread panicked")
    }

    #[test]
    fn test_deep_grouping_is_rejected() {
        let err = parse_on_small_stack("(".repeat(1000)).unwrap_err();
        assert_eq!(err, ParseError::TooDeep { line: 1 });

        let source = format!("fanya x = {}1{}", "(".repeat(1000), ")".repeat(1000));
        let err = parse_on_small_stack(source).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { .. }));
    }

    #[test]
    fn test_deep_blocks_are_rejected() {
        let source = "kama (kweli) {\n".repeat(1000);
        let err = parse_on_small_stack(source).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { line } if line > 1));
    }

    #[test]
    fn test_nesting_below_limit_parses() {
        let depth = MAX_NESTING as usize - 2;
        let source = format!("fanya x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_on_small_stack(source).is_ok());

        let source = format!("{}andika(1){}", "kama (kweli) {\n".repeat(depth), "}".repeat(depth));
        assert!(parse_on_small_stack(source).is_ok());
    }

    #[test]
    fn test_long_operator_chains_do_not_nest_parsing() {
        let source = format!("fanya x = {}y", "!".repeat(1000));
        assert!(parse_on_small_stack(source).is_ok());

        let source = format!("fanya x = 2{}", " ** 2".repeat(1000));
        assert!(parse_on_small_stack(source).is_ok());
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(parse(""), Program::default());
        assert_eq!(parse("  // tupu\n"), Program::default());
    }
}
