#![allow(dead_code)]

use luaparse_rs::ast::{
    Arguments, Block, Expression, Field, FunctionBody, FunctionCall, Name, PrefixExpression,
    Statement, Variable,
};
use luaparse_rs::visit::{
    Visitor, walk_arguments, walk_block, walk_call, walk_expression, walk_field,
    walk_function_body, walk_prefix, walk_statement, walk_variable,
};
use luaparse_rs::{Span, format, parse};

/// Parse `input`, panicking with the error text on failure.
pub fn parse_ok(input: &str) -> Block {
    parse(input).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// The position-qualified message of the error `input` produces.
pub fn error_message(input: &str) -> String {
    match parse(input) {
        Ok(block) => panic!("expected an error, got {block:?}"),
        Err(err) => err.message(),
    }
}

/// The single expression of `return <input>`.
pub fn expression(input: &str) -> Expression {
    let block = parse_ok(&format!("return {input}"));
    match block.statements.into_iter().next() {
        Some(Statement::Return { mut values, .. }) if values.len() == 1 => values.remove(0),
        other => panic!("expected a single-value return, got {other:?}"),
    }
}

/// Format `input` and check that formatting the re-parsed output is
/// stable. Returns the formatted text.
pub fn assert_format_stable(input: &str) -> String {
    let first = format(&parse_ok(input));
    let reparsed = parse(&first).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{first}"
        )
    });
    let second = format(&reparsed);
    assert_eq!(
        first, second,
        "format not idempotent\n--- first ---\n{first}\n--- second ---\n{second}"
    );
    first
}

/// Checks that every node lies inside its parent and that composite
/// nodes start and end exactly where their outer children do.
#[derive(Default)]
pub struct SpanChecker {
    parents: Vec<Span>,
    pub violations: Vec<String>,
}

impl SpanChecker {
    pub fn check(block: &Block) -> Vec<String> {
        let mut checker = Self::default();
        checker.visit_block(block);
        checker.violations
    }

    fn contained(&mut self, what: &str, span: Span) {
        if let Some(parent) = self.parents.last() {
            if span.start.offset < parent.start.offset || span.end.offset > parent.end.offset {
                self.violations
                    .push(format!("{what} {span:?} escapes parent {parent:?}"));
            }
        }
    }

    fn same_start(&mut self, what: &str, node: Span, child: Span) {
        if node.start != child.start {
            self.violations
                .push(format!("{what} starts at {} but child at {}", node.start, child.start));
        }
    }

    fn same_end(&mut self, what: &str, node: Span, child: Span) {
        if node.end != child.end {
            self.violations
                .push(format!("{what} ends at {} but child at {}", node.end, child.end));
        }
    }

    fn descend(&mut self, what: &str, span: Span, walk: impl FnOnce(&mut Self)) {
        self.contained(what, span);
        self.parents.push(span);
        walk(self);
        self.parents.pop();
    }
}

impl Visitor for SpanChecker {
    fn visit_block(&mut self, block: &Block) {
        if let (Some(first), Some(last)) = (block.statements.first(), block.statements.last()) {
            self.same_start("block", block.span, first.span());
            self.same_end("block", block.span, last.span());
        }
        self.descend("block", block.span, |v| walk_block(v, block));
    }

    fn visit_statement(&mut self, statement: &Statement) {
        if let Statement::Assign {
            targets,
            values,
            span,
        } = statement
        {
            self.same_start("assignment", *span, targets[0].span());
            self.same_end("assignment", *span, values[values.len() - 1].span());
        }
        self.descend("statement", statement.span(), |v| walk_statement(v, statement));
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::BinaryOp {
                left, right, span, ..
            } => {
                self.same_start("binary op", *span, left.span());
                self.same_end("binary op", *span, right.span());
            }
            Expression::UnaryOp { operand, span, .. } => {
                self.same_end("unary op", *span, operand.span());
            }
            _ => {}
        }
        self.descend("expression", expression.span(), |v| {
            walk_expression(v, expression);
        });
    }

    fn visit_prefix(&mut self, prefix: &PrefixExpression) {
        self.descend("prefix", prefix.span(), |v| walk_prefix(v, prefix));
    }

    fn visit_variable(&mut self, variable: &Variable) {
        match variable {
            Variable::Identifier(_) => {}
            Variable::MemberExpr { prefix, span, .. } => {
                self.same_start("index", *span, prefix.span());
            }
            Variable::MemberId { prefix, name, span } => {
                self.same_start("member", *span, prefix.span());
                self.same_end("member", *span, name.span);
            }
        }
        self.descend("variable", variable.span(), |v| walk_variable(v, variable));
    }

    fn visit_call(&mut self, call: &FunctionCall) {
        let (FunctionCall::Normal {
            prefix,
            arguments,
            span,
        }
        | FunctionCall::TableMethod {
            prefix,
            arguments,
            span,
            ..
        }) = call;
        self.same_start("call", *span, prefix.span());
        self.same_end("call", *span, arguments.span());
        self.descend("call", call.span(), |v| walk_call(v, call));
    }

    fn visit_arguments(&mut self, arguments: &Arguments) {
        self.descend("arguments", arguments.span(), |v| {
            walk_arguments(v, arguments);
        });
    }

    fn visit_field(&mut self, field: &Field) {
        if let Field::MemberId { key, value, span } = field {
            self.same_start("field", *span, key.span);
            self.same_end("field", *span, value.span());
        }
        self.descend("field", field.span(), |v| walk_field(v, field));
    }

    fn visit_function_body(&mut self, body: &FunctionBody) {
        self.descend("function body", body.span, |v| walk_function_body(v, body));
    }

    fn visit_name(&mut self, name: &Name) {
        self.contained("name", name.span);
    }
}
