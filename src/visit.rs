//! Read-only traversal of the syntax tree.
//!
//! Implement [`Visitor`] and override the hooks you care about. Every hook
//! defaults to the matching `walk_*` function, which recurses into children
//! in source order; call it from an override to keep descending.

use crate::ast::{
    Arguments, Block, Expression, Field, FunctionBody, FunctionCall, Name, PrefixExpression,
    Statement, Variable,
};

pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression);
    }

    fn visit_prefix(&mut self, prefix: &PrefixExpression) {
        walk_prefix(self, prefix);
    }

    fn visit_variable(&mut self, variable: &Variable) {
        walk_variable(self, variable);
    }

    fn visit_call(&mut self, call: &FunctionCall) {
        walk_call(self, call);
    }

    fn visit_arguments(&mut self, arguments: &Arguments) {
        walk_arguments(self, arguments);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_function_body(&mut self, body: &FunctionBody) {
        walk_function_body(self, body);
    }

    /// Called for every identifier occurrence: locals, parameters, labels,
    /// member names, and function name segments.
    fn visit_name(&mut self, _name: &Name) {}
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Assign {
            targets, values, ..
        } => {
            for target in targets {
                visitor.visit_variable(target);
            }
            walk_expressions(visitor, values);
        }
        Statement::LocalAssign { names, values, .. } => {
            for name in names {
                visitor.visit_name(name);
            }
            walk_expressions(visitor, values);
        }
        Statement::FunctionCall(call) => visitor.visit_call(call),
        Statement::Do { body, .. } => visitor.visit_block(body),
        Statement::While {
            condition, body, ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_block(body);
        }
        Statement::Repeat {
            body, condition, ..
        } => {
            visitor.visit_block(body);
            visitor.visit_expression(condition);
        }
        Statement::If {
            clauses,
            else_block,
            ..
        } => {
            for clause in clauses {
                visitor.visit_expression(&clause.condition);
                visitor.visit_block(&clause.body);
            }
            if let Some(block) = else_block {
                visitor.visit_block(block);
            }
        }
        Statement::For {
            variable,
            start,
            limit,
            step,
            body,
            ..
        } => {
            visitor.visit_name(variable);
            visitor.visit_expression(start);
            visitor.visit_expression(limit);
            if let Some(step) = step {
                visitor.visit_expression(step);
            }
            visitor.visit_block(body);
        }
        Statement::ForIn {
            names,
            expressions,
            body,
            ..
        } => {
            for name in names {
                visitor.visit_name(name);
            }
            walk_expressions(visitor, expressions);
            visitor.visit_block(body);
        }
        Statement::Function { name, body, .. } => {
            for segment in &name.path {
                visitor.visit_name(segment);
            }
            visitor.visit_function_body(body);
        }
        Statement::LocalFunction { name, body, .. } => {
            visitor.visit_name(name);
            visitor.visit_function_body(body);
        }
        Statement::LabelDecl { label, .. } | Statement::Goto { label, .. } => {
            visitor.visit_name(label);
        }
        Statement::Return { values, .. } => walk_expressions(visitor, values),
        Statement::Break { .. } => {}
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expression: &Expression) {
    match expression {
        Expression::Nil { .. }
        | Expression::Boolean { .. }
        | Expression::Number { .. }
        | Expression::String { .. }
        | Expression::Varargs { .. } => {}
        Expression::Function { body, .. } => visitor.visit_function_body(body),
        Expression::Prefix(prefix) => visitor.visit_prefix(prefix),
        Expression::Table(table) => {
            for field in &table.fields {
                visitor.visit_field(field);
            }
        }
        Expression::BinaryOp { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        Expression::UnaryOp { operand, .. } => visitor.visit_expression(operand),
    }
}

pub fn walk_prefix<V: Visitor + ?Sized>(visitor: &mut V, prefix: &PrefixExpression) {
    match prefix {
        PrefixExpression::Variable(variable) => visitor.visit_variable(variable),
        PrefixExpression::FunctionCall(call) => visitor.visit_call(call),
        PrefixExpression::Parenthesized { expression, .. } => visitor.visit_expression(expression),
    }
}

pub fn walk_variable<V: Visitor + ?Sized>(visitor: &mut V, variable: &Variable) {
    match variable {
        Variable::Identifier(name) => visitor.visit_name(name),
        Variable::MemberExpr { prefix, index, .. } => {
            visitor.visit_prefix(prefix);
            visitor.visit_expression(index);
        }
        Variable::MemberId { prefix, name, .. } => {
            visitor.visit_prefix(prefix);
            visitor.visit_name(name);
        }
    }
}

pub fn walk_call<V: Visitor + ?Sized>(visitor: &mut V, call: &FunctionCall) {
    match call {
        FunctionCall::Normal {
            prefix, arguments, ..
        } => {
            visitor.visit_prefix(prefix);
            visitor.visit_arguments(arguments);
        }
        FunctionCall::TableMethod {
            prefix,
            method,
            arguments,
            ..
        } => {
            visitor.visit_prefix(prefix);
            visitor.visit_name(method);
            visitor.visit_arguments(arguments);
        }
    }
}

pub fn walk_arguments<V: Visitor + ?Sized>(visitor: &mut V, arguments: &Arguments) {
    match arguments {
        Arguments::ParenList { expressions, .. } => walk_expressions(visitor, expressions),
        Arguments::TableLiteral(table) => {
            for field in &table.fields {
                visitor.visit_field(field);
            }
        }
        Arguments::StringLiteral { .. } => {}
    }
}

pub fn walk_field<V: Visitor + ?Sized>(visitor: &mut V, field: &Field) {
    match field {
        Field::MemberExpr { key, value, .. } => {
            visitor.visit_expression(key);
            visitor.visit_expression(value);
        }
        Field::MemberId { key, value, .. } => {
            visitor.visit_name(key);
            visitor.visit_expression(value);
        }
        Field::Positional(value) => visitor.visit_expression(value),
    }
}

pub fn walk_function_body<V: Visitor + ?Sized>(visitor: &mut V, body: &FunctionBody) {
    for parameter in &body.parameters {
        visitor.visit_name(parameter);
    }
    visitor.visit_block(&body.body);
}

fn walk_expressions<V: Visitor + ?Sized>(visitor: &mut V, expressions: &[Expression]) {
    for expression in expressions {
        visitor.visit_expression(expression);
    }
}
