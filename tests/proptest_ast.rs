//! Property-based tests with proptest.
//!
//! Generate random syntax trees, format them, parse them back, and verify
//! the round-trip produces a stable (idempotent) output with well-formed
//! spans.
//!
//! We check `format(parse(format(ast))) == format(ast)` rather than
//! `ast == parse(format(ast))` because generated trees carry no spans and
//! the formatter adds parentheses that come back as explicit
//! `Parenthesized` nodes.

mod common;

use common::SpanChecker;
use luaparse_rs::ast::{
    Arguments, BinaryOperator, Block, Expression, Field, FunctionBody, FunctionCall, FunctionName,
    Name, PrefixExpression, Statement, Table, UnaryOperator, Variable,
};
use luaparse_rs::token::KEYWORDS;
use luaparse_rs::{Span, Symbol, format, parse, tokenize};
use proptest::prelude::*;

fn sp() -> Span {
    Span::default()
}

// -- Leaf strategies --

/// Identifier-shaped word that is not reserved.
fn identifier_text() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,7}".prop_filter("keywords are reserved", |s| {
        Symbol::keyword(s).is_none()
    })
}

fn name() -> impl Strategy<Value = Name> {
    identifier_text().prop_map(|value| Name { value, span: sp() })
}

/// Non-negative values that print exactly: integers and eighths.
fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u32..1_000_000).prop_map(f64::from),
        (0u32..64).prop_map(|n| f64::from(n) / 8.0),
    ]
}

/// Short strings drawn from characters that need escaping.
fn string_value() -> impl Strategy<Value = String> {
    let alphabet = vec![
        'a', 'z', ' ', '"', '\'', '\\', '\n', '\t', '\0', '\u{7F}', 'é', '[', ']', '-',
    ];
    prop::collection::vec(prop::sample::select(alphabet), 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn binary_operator() -> impl Strategy<Value = BinaryOperator> {
    prop::sample::select(vec![
        BinaryOperator::Or,
        BinaryOperator::And,
        BinaryOperator::Less,
        BinaryOperator::Greater,
        BinaryOperator::LessEqual,
        BinaryOperator::GreaterEqual,
        BinaryOperator::NotEqual,
        BinaryOperator::Equal,
        BinaryOperator::Concat,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Modulo,
        BinaryOperator::Power,
    ])
}

fn unary_operator() -> impl Strategy<Value = UnaryOperator> {
    prop::sample::select(vec![
        UnaryOperator::Not,
        UnaryOperator::Negate,
        UnaryOperator::Length,
    ])
}

fn identifier(name: Name) -> Expression {
    Expression::Prefix(PrefixExpression::Variable(Variable::Identifier(name)))
}

// -- Expressions --

#[derive(Debug, Clone)]
enum Suffix {
    Member(Name),
    Index(Expression),
    Call(Arguments),
    Method(Name, Arguments),
}

fn apply(prefix: PrefixExpression, suffix: Suffix) -> PrefixExpression {
    let prefix = Box::new(prefix);
    match suffix {
        Suffix::Member(name) => PrefixExpression::Variable(Variable::MemberId {
            prefix,
            name,
            span: sp(),
        }),
        Suffix::Index(index) => PrefixExpression::Variable(Variable::MemberExpr {
            prefix,
            index: Box::new(index),
            span: sp(),
        }),
        Suffix::Call(arguments) => PrefixExpression::FunctionCall(FunctionCall::Normal {
            prefix,
            arguments,
            span: sp(),
        }),
        Suffix::Method(method, arguments) => {
            PrefixExpression::FunctionCall(FunctionCall::TableMethod {
                prefix,
                method,
                arguments,
                span: sp(),
            })
        }
    }
}

fn table(inner: BoxedStrategy<Expression>) -> impl Strategy<Value = Table> {
    let field = prop_oneof![
        (inner.clone(), inner.clone()).prop_map(|(key, value)| Field::MemberExpr {
            key,
            value,
            span: sp(),
        }),
        (name(), inner.clone()).prop_map(|(key, value)| Field::MemberId {
            key,
            value,
            span: sp(),
        }),
        inner.prop_map(Field::Positional),
    ];
    prop::collection::vec(field, 0..3).prop_map(|fields| Table { fields, span: sp() })
}

fn arguments(inner: BoxedStrategy<Expression>) -> impl Strategy<Value = Arguments> {
    prop_oneof![
        prop::collection::vec(inner.clone(), 0..3).prop_map(|expressions| Arguments::ParenList {
            expressions,
            span: sp(),
        }),
        table(inner).prop_map(Arguments::TableLiteral),
        string_value().prop_map(|value| Arguments::StringLiteral { value, span: sp() }),
    ]
}

fn suffix(inner: BoxedStrategy<Expression>) -> impl Strategy<Value = Suffix> {
    prop_oneof![
        name().prop_map(Suffix::Member),
        inner.clone().prop_map(Suffix::Index),
        arguments(inner.clone()).prop_map(Suffix::Call),
        (name(), arguments(inner)).prop_map(|(method, args)| Suffix::Method(method, args)),
    ]
}

/// A name or parenthesized expression followed by up to two suffixes.
fn prefix(inner: BoxedStrategy<Expression>) -> impl Strategy<Value = PrefixExpression> {
    let base = prop_oneof![
        3 => name().prop_map(|n| PrefixExpression::Variable(Variable::Identifier(n))),
        1 => inner.clone().prop_map(|e| PrefixExpression::Parenthesized {
            expression: Box::new(e),
            span: sp(),
        }),
    ];
    (base, prop::collection::vec(suffix(inner), 0..3))
        .prop_map(|(base, suffixes)| suffixes.into_iter().fold(base, apply))
}

fn expression() -> BoxedStrategy<Expression> {
    let leaf = prop_oneof![
        Just(Expression::Nil { span: sp() }),
        any::<bool>().prop_map(|value| Expression::Boolean { value, span: sp() }),
        number().prop_map(|value| Expression::Number { value, span: sp() }),
        string_value().prop_map(|value| Expression::String { value, span: sp() }),
        Just(Expression::Varargs { span: sp() }),
        name().prop_map(identifier),
    ];

    leaf.prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            3 => (binary_operator(), inner.clone(), inner.clone()).prop_map(|(op, l, r)| {
                Expression::BinaryOp {
                    op,
                    left: Box::new(l),
                    right: Box::new(r),
                    span: sp(),
                }
            }),
            2 => (unary_operator(), inner.clone()).prop_map(|(op, operand)| {
                Expression::UnaryOp {
                    op,
                    operand: Box::new(operand),
                    span: sp(),
                }
            }),
            2 => prefix(inner.clone()).prop_map(Expression::Prefix),
            1 => table(inner).prop_map(Expression::Table),
        ]
    })
    .boxed()
}

fn variable() -> impl Strategy<Value = Variable> {
    let inner = expression();
    prop_oneof![
        2 => name().prop_map(Variable::Identifier),
        1 => (prefix(inner.clone()), name()).prop_map(|(p, name)| Variable::MemberId {
            prefix: Box::new(p),
            name,
            span: sp(),
        }),
        1 => (prefix(inner.clone()), inner).prop_map(|(p, index)| Variable::MemberExpr {
            prefix: Box::new(p),
            index: Box::new(index),
            span: sp(),
        }),
    ]
}

fn call() -> impl Strategy<Value = FunctionCall> {
    let inner = expression();
    prop_oneof![
        (prefix(inner.clone()), arguments(inner.clone())).prop_map(|(p, arguments)| {
            FunctionCall::Normal {
                prefix: Box::new(p),
                arguments,
                span: sp(),
            }
        }),
        (prefix(inner.clone()), name(), arguments(inner)).prop_map(|(p, method, arguments)| {
            FunctionCall::TableMethod {
                prefix: Box::new(p),
                method,
                arguments,
                span: sp(),
            }
        }),
    ]
}

fn expressions(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Expression>> {
    prop::collection::vec(expression(), range)
}

// -- Statements --

fn simple_statement() -> impl Strategy<Value = Statement> {
    prop_oneof![
        3 => (prop::collection::vec(variable(), 1..3), expressions(1..3)).prop_map(
            |(targets, values)| Statement::Assign {
                targets,
                values,
                span: sp(),
            }
        ),
        2 => (prop::collection::vec(name(), 1..3), expressions(0..3)).prop_map(
            |(names, values)| Statement::LocalAssign {
                names,
                values,
                span: sp(),
            }
        ),
        3 => call().prop_map(Statement::FunctionCall),
        1 => name().prop_map(|label| Statement::LabelDecl { label, span: sp() }),
        1 => name().prop_map(|label| Statement::Goto { label, span: sp() }),
    ]
}

fn last_statement() -> impl Strategy<Value = Statement> {
    prop_oneof![
        expressions(0..3).prop_map(|values| Statement::Return { values, span: sp() }),
        Just(Statement::Break { span: sp() }),
    ]
}

fn function_body(depth: u32) -> impl Strategy<Value = FunctionBody> {
    (
        prop::collection::vec(name(), 0..3),
        any::<bool>(),
        block(depth),
    )
        .prop_map(|(parameters, has_varargs, body)| FunctionBody {
            parameters,
            has_varargs,
            body,
            span: sp(),
        })
}

fn function_name() -> impl Strategy<Value = FunctionName> {
    (prop::collection::vec(name(), 1..4), any::<bool>()).prop_map(|(path, method)| {
        FunctionName {
            is_method: method && path.len() > 1,
            path,
            span: sp(),
        }
    })
}

fn compound_statement(depth: u32) -> impl Strategy<Value = Statement> {
    let body = block(depth);
    prop_oneof![
        body.clone().prop_map(|body| Statement::Do { body, span: sp() }),
        (expression(), body.clone()).prop_map(|(condition, body)| Statement::While {
            condition,
            body,
            span: sp(),
        }),
        (body.clone(), expression()).prop_map(|(body, condition)| Statement::Repeat {
            body,
            condition,
            span: sp(),
        }),
        (
            prop::collection::vec((expression(), body.clone()), 1..3),
            prop::option::of(body.clone()),
        )
            .prop_map(|(arms, else_block)| Statement::If {
                clauses: arms
                    .into_iter()
                    .map(|(condition, body)| luaparse_rs::ast::ConditionalClause {
                        condition,
                        body,
                        span: sp(),
                    })
                    .collect(),
                else_block,
                span: sp(),
            }),
        (
            name(),
            expression(),
            expression(),
            prop::option::of(expression()),
            body.clone(),
        )
            .prop_map(|(variable, start, limit, step, body)| Statement::For {
                variable,
                start,
                limit,
                step,
                body,
                span: sp(),
            }),
        (
            prop::collection::vec(name(), 1..3),
            expressions(1..3),
            body,
        )
            .prop_map(|(names, expressions, body)| Statement::ForIn {
                names,
                expressions,
                body,
                span: sp(),
            }),
        (function_name(), function_body(depth)).prop_map(|(name, body)| Statement::Function {
            name,
            body,
            span: sp(),
        }),
        (name(), function_body(depth)).prop_map(|(name, body)| Statement::LocalFunction {
            name,
            body,
            span: sp(),
        }),
        (name(), function_body(depth)).prop_map(|(name, body)| Statement::LocalAssign {
            names: vec![name],
            values: vec![Expression::Function { body, span: sp() }],
            span: sp(),
        }),
    ]
}

/// Block nested at most `depth` compound statements deep, with an
/// optional trailing `return`/`break`.
fn block(depth: u32) -> BoxedStrategy<Block> {
    let statement = if depth == 0 {
        simple_statement().boxed()
    } else {
        prop_oneof![
            3 => simple_statement(),
            1 => compound_statement(depth - 1),
        ]
        .boxed()
    };

    (
        prop::collection::vec(statement, 0..4),
        prop::option::of(last_statement()),
    )
        .prop_map(|(mut statements, last)| {
            statements.extend(last);
            Block {
                statements,
                span: sp(),
            }
        })
        .boxed()
}

// -- Property tests --

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Formatting is idempotent: format(parse(format(x))) == format(x).
    /// This is the core round-trip property.
    #[test]
    fn format_idempotent(tree in block(2)) {
        let r1 = format(&tree);
        let parsed = parse(&r1)
            .map_err(|e| {
                TestCaseError::fail(
                    std::format!("parse error: {e}\n--- output ---\n{r1}"))
            })?;
        let r2 = format(&parsed);
        prop_assert_eq!(r1, r2);
    }

    /// A formatted tree never produces a lex error.
    #[test]
    fn format_never_produces_lex_error(tree in block(2)) {
        let formatted = format(&tree);
        tokenize(&formatted).map_err(|e| {
            TestCaseError::fail(
                std::format!("lex error: {e}\n--- output ---\n{formatted}"))
        })?;
    }

    /// Top-level statement count survives the round-trip.
    #[test]
    fn statement_count_preserved(tree in block(1)) {
        let formatted = format(&tree);
        let parsed = parse(&formatted).unwrap();
        prop_assert_eq!(tree.statements.len(), parsed.statements.len());
    }

    /// Every parsed node sits inside its parent and composite nodes span
    /// exactly from their first child to their last.
    #[test]
    fn parsed_spans_compose(tree in block(2)) {
        let formatted = format(&tree);
        let parsed = parse(&formatted).unwrap();
        let violations = SpanChecker::check(&parsed);
        prop_assert!(
            violations.is_empty(),
            "{:#?}\n--- source ---\n{}",
            violations,
            formatted
        );
    }

    /// Identifier-shaped words lex to a single identifier carrying the word.
    #[test]
    fn identifiers_lex_to_themselves(word in identifier_text()) {
        let tokens = tokenize(&word).unwrap();
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].symbol, Symbol::Identifier);
        prop_assert_eq!(tokens[0].lexeme.as_deref(), Some(word.as_str()));
    }

    /// String literals survive formatting byte for byte.
    #[test]
    fn string_values_preserved(value in string_value()) {
        let tree = Block {
            statements: vec![Statement::Return {
                values: vec![Expression::String { value: value.clone(), span: sp() }],
                span: sp(),
            }],
            span: sp(),
        };
        let parsed = parse(&format(&tree)).unwrap();
        let Some(Statement::Return { values, .. }) = parsed.statements.first() else {
            return Err(TestCaseError::fail("expected return"));
        };
        prop_assert!(
            matches!(&values[0], Expression::String { value: v, .. } if *v == value),
            "string not preserved: {:?}",
            values[0]
        );
    }

    /// Arbitrary input yields a tree or an error, never a panic.
    #[test]
    fn arbitrary_input_never_panics(source in "\\PC{0,64}") {
        let _ = parse(&source);
    }

    /// Lua-flavoured noise exercises the grammar's error paths.
    #[test]
    fn token_soup_never_panics(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "local", "function", "end", "if", "then", "else", "return", "(", ")",
                "{", "}", "[", "]", "=", ",", ";", ".", ":", "..", "...", "x", "1",
                "'s'", "-", "not", "for", "in", "do", "while", "repeat", "until",
            ]),
            0..24,
        )
    ) {
        let _ = parse(&words.join(" "));
    }
}

#[test]
fn keywords_lex_without_lexeme() {
    for (text, symbol) in KEYWORDS {
        let tokens = tokenize(text).unwrap();
        assert_eq!(tokens[0].symbol, symbol, "keyword {text}");
        assert_eq!(tokens[0].lexeme, None, "keyword {text}");
        assert_eq!(tokens[1].symbol, Symbol::Eof);
    }
}
