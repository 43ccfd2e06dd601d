//! Pretty-printer that serializes a syntax tree back into source text.
//!
//! Produces two-space indentation with one statement per line. Binary
//! operands are parenthesized only where precedence or associativity would
//! otherwise regroup them, so re-parsing the output yields the same tree
//! shape.

use std::fmt::Write as _;

use crate::ast::{
    Arguments, Block, Expression, Field, FunctionBody, FunctionCall, Name,
    PrefixExpression, Statement, Table, UNARY_PRIORITY, UnaryOperator, Variable,
};

const INDENT: &str = "  ";

/// Format a `Block` as a complete source unit.
///
/// The output ends with a newline unless the block is empty.
#[must_use]
pub fn format(block: &Block) -> String {
    let mut out = String::new();
    format_block(&mut out, block, 0);
    out
}

fn format_block(out: &mut String, block: &Block, indent: usize) {
    for (i, statement) in block.statements.iter().enumerate() {
        push_indent(out, indent);
        // A line opening with `(` would otherwise read as call arguments
        // for the previous statement.
        if i > 0 && starts_with_paren(statement) {
            out.push(';');
        }
        format_statement(out, statement, indent);
        out.push('\n');
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

fn format_statement(out: &mut String, statement: &Statement, indent: usize) {
    match statement {
        Statement::Assign {
            targets, values, ..
        } => {
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                format_variable(out, target, indent);
            }
            out.push_str(" = ");
            format_expression_list(out, values, indent);
        }
        Statement::LocalAssign { names, values, .. } => {
            out.push_str("local ");
            format_names(out, names);
            if !values.is_empty() {
                out.push_str(" = ");
                format_expression_list(out, values, indent);
            }
        }
        Statement::FunctionCall(call) => format_call(out, call, indent),
        Statement::Do { body, .. } => {
            out.push_str("do\n");
            format_body(out, body, indent);
            out.push_str("end");
        }
        Statement::While {
            condition, body, ..
        } => {
            out.push_str("while ");
            format_expression(out, condition, indent);
            out.push_str(" do\n");
            format_body(out, body, indent);
            out.push_str("end");
        }
        Statement::Repeat {
            body, condition, ..
        } => {
            out.push_str("repeat\n");
            format_body(out, body, indent);
            out.push_str("until ");
            format_expression(out, condition, indent);
        }
        Statement::If {
            clauses,
            else_block,
            ..
        } => {
            for (i, clause) in clauses.iter().enumerate() {
                out.push_str(if i == 0 { "if " } else { "elseif " });
                format_expression(out, &clause.condition, indent);
                out.push_str(" then\n");
                format_body(out, &clause.body, indent);
            }
            if let Some(block) = else_block {
                out.push_str("else\n");
                format_body(out, block, indent);
            }
            out.push_str("end");
        }
        Statement::For {
            variable,
            start,
            limit,
            step,
            body,
            ..
        } => {
            let _ = write!(out, "for {} = ", variable.value);
            format_expression(out, start, indent);
            out.push_str(", ");
            format_expression(out, limit, indent);
            if let Some(step) = step {
                out.push_str(", ");
                format_expression(out, step, indent);
            }
            out.push_str(" do\n");
            format_body(out, body, indent);
            out.push_str("end");
        }
        Statement::ForIn {
            names,
            expressions,
            body,
            ..
        } => {
            out.push_str("for ");
            format_names(out, names);
            out.push_str(" in ");
            format_expression_list(out, expressions, indent);
            out.push_str(" do\n");
            format_body(out, body, indent);
            out.push_str("end");
        }
        Statement::Function { name, body, .. } => {
            out.push_str("function ");
            let last = name.path.len() - 1;
            for (i, segment) in name.path.iter().enumerate() {
                if i > 0 {
                    out.push(if name.is_method && i == last { ':' } else { '.' });
                }
                out.push_str(&segment.value);
            }
            format_function_body(out, body, indent);
        }
        Statement::LocalFunction { name, body, .. } => {
            let _ = write!(out, "local function {}", name.value);
            format_function_body(out, body, indent);
        }
        Statement::LabelDecl { label, .. } => {
            let _ = write!(out, "::{}::", label.value);
        }
        Statement::Goto { label, .. } => {
            let _ = write!(out, "goto {}", label.value);
        }
        Statement::Return { values, .. } => {
            out.push_str("return");
            if !values.is_empty() {
                out.push(' ');
                format_expression_list(out, values, indent);
            }
        }
        Statement::Break { .. } => out.push_str("break"),
    }
}

/// Nested block lines, leaving `out` indented for the closing keyword.
fn format_body(out: &mut String, block: &Block, indent: usize) {
    format_block(out, block, indent + 1);
    push_indent(out, indent);
}

fn format_function_body(out: &mut String, body: &FunctionBody, indent: usize) {
    out.push('(');
    format_names(out, &body.parameters);
    if body.has_varargs {
        if !body.parameters.is_empty() {
            out.push_str(", ");
        }
        out.push_str("...");
    }
    out.push_str(")\n");
    format_body(out, &body.body, indent);
    out.push_str("end");
}

fn format_names(out: &mut String, names: &[Name]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&name.value);
    }
}

fn format_expression_list(out: &mut String, expressions: &[Expression], indent: usize) {
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        format_expression(out, expression, indent);
    }
}

fn format_expression(out: &mut String, expression: &Expression, indent: usize) {
    match expression {
        Expression::Nil { .. } => out.push_str("nil"),
        Expression::Boolean { value, .. } => out.push_str(if *value { "true" } else { "false" }),
        Expression::Number { value, .. } => format_number(out, *value),
        Expression::String { value, .. } => format_string(out, value),
        Expression::Varargs { .. } => out.push_str("..."),
        Expression::Function { body, .. } => {
            out.push_str("function");
            format_function_body(out, body, indent);
        }
        Expression::Prefix(prefix) => format_prefix(out, prefix, indent),
        Expression::Table(table) => format_table(out, table, indent),
        Expression::BinaryOp {
            op, left, right, ..
        } => {
            let (left_power, right_power) = op.binding_power();
            format_operand(out, left, indent, |child| match child {
                Expression::BinaryOp { op: inner, .. } => left_power > inner.binding_power().1,
                Expression::UnaryOp { .. } => left_power > UNARY_PRIORITY,
                _ => false,
            });
            let _ = write!(out, " {op} ");
            format_operand(out, right, indent, |child| match child {
                Expression::BinaryOp { op: inner, .. } => inner.binding_power().0 <= right_power,
                _ => false,
            });
        }
        Expression::UnaryOp { op, operand, .. } => {
            let start = out.len();
            out.push_str(op.as_str());
            if *op == UnaryOperator::Not {
                out.push(' ');
            }
            let operand_start = out.len();
            format_operand(out, operand, indent, |child| match child {
                Expression::BinaryOp { op: inner, .. } => {
                    inner.binding_power().0 <= UNARY_PRIORITY
                }
                _ => false,
            });
            // `--` would start a comment.
            if *op == UnaryOperator::Negate && out[operand_start..].starts_with('-') {
                out.insert(start + 1, ' ');
            }
        }
    }
}

fn format_operand(
    out: &mut String,
    operand: &Expression,
    indent: usize,
    needs_parens: impl Fn(&Expression) -> bool,
) {
    if needs_parens(operand) {
        out.push('(');
        format_expression(out, operand, indent);
        out.push(')');
    } else {
        format_expression(out, operand, indent);
    }
}

fn format_prefix(out: &mut String, prefix: &PrefixExpression, indent: usize) {
    match prefix {
        PrefixExpression::Variable(variable) => format_variable(out, variable, indent),
        PrefixExpression::FunctionCall(call) => format_call(out, call, indent),
        PrefixExpression::Parenthesized { expression, .. } => {
            out.push('(');
            format_expression(out, expression, indent);
            out.push(')');
        }
    }
}

fn format_variable(out: &mut String, variable: &Variable, indent: usize) {
    match variable {
        Variable::Identifier(name) => out.push_str(&name.value),
        Variable::MemberExpr { prefix, index, .. } => {
            format_prefix(out, prefix, indent);
            out.push('[');
            format_expression(out, index, indent);
            out.push(']');
        }
        Variable::MemberId { prefix, name, .. } => {
            format_prefix(out, prefix, indent);
            out.push('.');
            out.push_str(&name.value);
        }
    }
}

fn format_call(out: &mut String, call: &FunctionCall, indent: usize) {
    match call {
        FunctionCall::Normal {
            prefix, arguments, ..
        } => {
            format_prefix(out, prefix, indent);
            format_arguments(out, arguments, indent);
        }
        FunctionCall::TableMethod {
            prefix,
            method,
            arguments,
            ..
        } => {
            format_prefix(out, prefix, indent);
            out.push(':');
            out.push_str(&method.value);
            format_arguments(out, arguments, indent);
        }
    }
}

fn format_arguments(out: &mut String, arguments: &Arguments, indent: usize) {
    match arguments {
        Arguments::ParenList { expressions, .. } => {
            out.push('(');
            format_expression_list(out, expressions, indent);
            out.push(')');
        }
        Arguments::TableLiteral(table) => format_table(out, table, indent),
        Arguments::StringLiteral { value, .. } => format_string(out, value),
    }
}

fn format_table(out: &mut String, table: &Table, indent: usize) {
    if table.fields.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{ ");
    for (i, field) in table.fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match field {
            Field::MemberExpr { key, value, .. } => {
                out.push('[');
                format_expression(out, key, indent);
                out.push_str("] = ");
                format_expression(out, value, indent);
            }
            Field::MemberId { key, value, .. } => {
                out.push_str(&key.value);
                out.push_str(" = ");
                format_expression(out, value, indent);
            }
            Field::Positional(value) => format_expression(out, value, indent),
        }
    }
    out.push_str(" }");
}

/// Print a number so that it lexes back to the same value.
fn format_number(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("(0 / 0)");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "1e999" } else { "-1e999" });
    } else if value != 0.0 && !(1e-5..1e16).contains(&value.abs()) {
        let _ = write!(out, "{value:e}");
    } else {
        let _ = write!(out, "{value}");
    }
}

/// Double-quoted literal with every non-printable character escaped.
fn format_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn starts_with_paren(statement: &Statement) -> bool {
    match statement {
        Statement::Assign { targets, .. } => targets.first().is_some_and(variable_starts_with_paren),
        Statement::FunctionCall(call) => call_starts_with_paren(call),
        _ => false,
    }
}

fn prefix_starts_with_paren(prefix: &PrefixExpression) -> bool {
    match prefix {
        PrefixExpression::Parenthesized { .. } => true,
        PrefixExpression::Variable(variable) => variable_starts_with_paren(variable),
        PrefixExpression::FunctionCall(call) => call_starts_with_paren(call),
    }
}

fn variable_starts_with_paren(variable: &Variable) -> bool {
    match variable {
        Variable::Identifier(_) => false,
        Variable::MemberExpr { prefix, .. } | Variable::MemberId { prefix, .. } => {
            prefix_starts_with_paren(prefix)
        }
    }
}

fn call_starts_with_paren(call: &FunctionCall) -> bool {
    match call {
        FunctionCall::Normal { prefix, .. } | FunctionCall::TableMethod { prefix, .. } => {
            prefix_starts_with_paren(prefix)
        }
    }
}
