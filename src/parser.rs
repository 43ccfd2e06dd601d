//! Recursive-descent parser with precedence climbing for binary operators.
//!
//! The parser pulls tokens from the [`Lexer`] on demand through a two-token
//! window (`current`, `next`). The first error aborts the parse.

use crate::ast::{
    Arguments, BinaryOperator, Block, ConditionalClause, Expression, Field, FunctionBody,
    FunctionCall, FunctionName, Name, PrefixExpression, Statement, Table, UNARY_PRIORITY,
    UnaryOperator, Variable,
};
use crate::diagnostic::{SyntaxError, SyntaxErrorKind};
use crate::lexer::{LexError, Lexer};
use crate::options::ParseOptions;
use crate::token::{Position, Span, Symbol, Token};

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Symbols that end a block in any context.
const BLOCK_FOLLOW: [Symbol; 5] = [
    Symbol::Else,
    Symbol::Elseif,
    Symbol::End,
    Symbol::Until,
    Symbol::Eof,
];

const IF_BODY_END: [Symbol; 3] = [Symbol::Else, Symbol::Elseif, Symbol::End];

/// Parser over one source unit.
///
/// Runs on the caller's stack. Deep nesting needs roughly `max_depth`
/// times a few hundred KiB in unoptimized builds; [`crate::parse_with_options`]
/// provides that on its own thread.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    next: Token,
    previous_end: Position,
    chunk_name: String,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Prime the lookahead window over `source`.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` if either of the first two tokens fails to lex.
    pub fn new(source: &'a str, options: &ParseOptions) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        if options.skip_shebang {
            lexer = lexer.skip_shebang();
        }
        let chunk_name = options.chunk_name.clone();
        let current = lexer
            .next_token()
            .map_err(|e| SyntaxError::from_lex(e, chunk_name.as_str()))?;
        let next = lexer
            .next_token()
            .map_err(|e| SyntaxError::from_lex(e, chunk_name.as_str()))?;

        Ok(Self {
            lexer,
            current,
            next,
            previous_end: Position::START,
            chunk_name,
            max_depth: options.max_depth,
            depth: 0,
        })
    }

    /// Parse the whole source unit.
    ///
    /// # Errors
    ///
    /// Returns the first lex or syntax error encountered.
    pub fn parse_chunk(mut self) -> ParseResult<Block> {
        let block = self.block(&[])?;
        if self.current.symbol != Symbol::Eof {
            return Err(self.expected(Symbol::Eof));
        }
        Ok(block)
    }

    // -- Token window --

    fn consume(&mut self) -> ParseResult<Token> {
        let incoming = self.lexer.next_token().map_err(|e| self.lex_error(e))?;
        let next = std::mem::replace(&mut self.next, incoming);
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous_end = consumed.span.end;
        Ok(consumed)
    }

    fn check(&self, symbol: Symbol) -> bool {
        self.current.symbol == symbol
    }

    fn accept(&mut self, symbol: Symbol) -> ParseResult<Option<Token>> {
        if self.check(symbol) {
            self.consume().map(Some)
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, symbol: Symbol) -> ParseResult<Token> {
        if self.check(symbol) {
            self.consume()
        } else {
            Err(self.expected(symbol))
        }
    }

    /// Expect a closing delimiter, naming the opener when it sits on an
    /// earlier line.
    fn expect_match(
        &mut self,
        closer: Symbol,
        opener: Symbol,
        opener_line: usize,
    ) -> ParseResult<Token> {
        if self.check(closer) {
            return self.consume();
        }
        if self.current.span.start.line == opener_line {
            return Err(self.expected(closer));
        }
        Err(self.error(SyntaxErrorKind::ExpectedToClose {
            expected: closer.as_str().to_string(),
            opener: opener.as_str().to_string(),
            opener_line,
            near: self.near(),
        }))
    }

    fn expect_name(&mut self) -> ParseResult<Name> {
        let token = self.expect(Symbol::Identifier)?;
        Ok(Name {
            value: token.lexeme.unwrap_or_default(),
            span: token.span,
        })
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(SyntaxErrorKind::TooManySyntaxLevels { near: self.near() }));
        }
        Ok(())
    }

    const fn leave(&mut self) {
        self.depth -= 1;
    }

    // -- Errors --

    fn near(&self) -> String {
        self.current.text().to_string()
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.current.span, self.chunk_name.as_str())
    }

    fn expected(&self, symbol: Symbol) -> SyntaxError {
        self.error(SyntaxErrorKind::Expected {
            expected: symbol.as_str().to_string(),
            near: self.near(),
        })
    }

    fn lex_error(&self, error: LexError) -> SyntaxError {
        SyntaxError::from_lex(error, self.chunk_name.as_str())
    }

    // -- Blocks and statements --

    /// Parse statements until end of input or one of `terminators`.
    ///
    /// `return` and `break` close the block early; the caller's closing
    /// check reports anything that follows them.
    fn block(&mut self, terminators: &[Symbol]) -> ParseResult<Block> {
        self.enter()?;
        let start = self.current.span.start;
        let mut statements = Vec::new();

        loop {
            let symbol = self.current.symbol;
            if symbol == Symbol::Eof || terminators.contains(&symbol) {
                break;
            }
            match symbol {
                Symbol::Semicolon => {
                    self.consume()?;
                }
                Symbol::Return => {
                    statements.push(self.return_statement()?);
                    break;
                }
                Symbol::Break => {
                    let keyword = self.consume()?;
                    self.accept(Symbol::Semicolon)?;
                    statements.push(Statement::Break { span: keyword.span });
                    break;
                }
                _ => statements.push(self.statement()?),
            }
        }

        self.leave();
        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => Span::between(first.span(), last.span()),
            _ => Span::empty(start),
        };
        Ok(Block { statements, span })
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        match self.current.symbol {
            Symbol::If => self.if_statement(),
            Symbol::While => self.while_statement(),
            Symbol::Do => self.do_statement(),
            Symbol::For => self.for_statement(),
            Symbol::Repeat => self.repeat_statement(),
            Symbol::Function => self.function_statement(),
            Symbol::Local => self.local_statement(),
            Symbol::DoubleColon => self.label_statement(),
            Symbol::Goto => self.goto_statement(),
            _ => self.assign_or_call(),
        }
    }

    fn return_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume()?;
        let values = if BLOCK_FOLLOW.contains(&self.current.symbol) || self.check(Symbol::Semicolon)
        {
            Vec::new()
        } else {
            self.expression_list()?
        };
        self.accept(Symbol::Semicolon)?;
        let end = values.last().map_or(keyword.span, Expression::span);
        Ok(Statement::Return {
            values,
            span: Span::between(keyword.span, end),
        })
    }

    fn do_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let body = self.block(&[Symbol::End])?;
        let close = self.expect_match(Symbol::End, Symbol::Do, open.span.start.line)?;
        Ok(Statement::Do {
            body,
            span: Span::between(open.span, close.span),
        })
    }

    fn while_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let condition = self.expression()?;
        self.expect(Symbol::Do)?;
        let body = self.block(&[Symbol::End])?;
        let close = self.expect_match(Symbol::End, Symbol::While, open.span.start.line)?;
        Ok(Statement::While {
            condition,
            body,
            span: Span::between(open.span, close.span),
        })
    }

    fn repeat_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let body = self.block(&[Symbol::Until])?;
        self.expect_match(Symbol::Until, Symbol::Repeat, open.span.start.line)?;
        let condition = self.expression()?;
        let span = Span::between(open.span, condition.span());
        Ok(Statement::Repeat {
            body,
            condition,
            span,
        })
    }

    fn if_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let mut clauses = vec![self.conditional_clause(open.span)?];

        while self.check(Symbol::Elseif) {
            let keyword = self.consume()?;
            clauses.push(self.conditional_clause(keyword.span)?);
        }

        let else_block = if self.accept(Symbol::Else)?.is_some() {
            Some(self.block(&[Symbol::End])?)
        } else {
            None
        };

        let close = self.expect_match(Symbol::End, Symbol::If, open.span.start.line)?;
        Ok(Statement::If {
            clauses,
            else_block,
            span: Span::between(open.span, close.span),
        })
    }

    /// `<cond> then <block>`, after the `if`/`elseif` keyword.
    fn conditional_clause(&mut self, keyword: Span) -> ParseResult<ConditionalClause> {
        let condition = self.expression()?;
        let then = self.expect(Symbol::Then)?;
        let body = self.block(&IF_BODY_END)?;
        let end = if body.statements.is_empty() {
            then.span
        } else {
            body.span
        };
        Ok(ConditionalClause {
            condition,
            body,
            span: Span::between(keyword, end),
        })
    }

    fn for_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        if !self.check(Symbol::Identifier) {
            return Err(self.expected(Symbol::Identifier));
        }
        match self.next.symbol {
            Symbol::Assign => self.numeric_for(open),
            Symbol::Comma | Symbol::In => self.generic_for(open),
            _ => {
                self.consume()?;
                Err(self.error(SyntaxErrorKind::ExpectedEither {
                    first: Symbol::Assign.as_str().to_string(),
                    second: Symbol::In.as_str().to_string(),
                    near: self.near(),
                }))
            }
        }
    }

    fn numeric_for(&mut self, open: Token) -> ParseResult<Statement> {
        let variable = self.expect_name()?;
        self.expect(Symbol::Assign)?;
        let start = self.expression()?;
        self.expect(Symbol::Comma)?;
        let limit = self.expression()?;
        let step = if self.accept(Symbol::Comma)?.is_some() {
            Some(self.expression()?)
        } else {
            None
        };
        let (body, close) = self.loop_body(open.span.start.line)?;
        Ok(Statement::For {
            variable,
            start,
            limit,
            step,
            body,
            span: Span::between(open.span, close.span),
        })
    }

    fn generic_for(&mut self, open: Token) -> ParseResult<Statement> {
        let mut names = vec![self.expect_name()?];
        while self.accept(Symbol::Comma)?.is_some() {
            names.push(self.expect_name()?);
        }
        self.expect(Symbol::In)?;
        let expressions = self.expression_list()?;
        let (body, close) = self.loop_body(open.span.start.line)?;
        Ok(Statement::ForIn {
            names,
            expressions,
            body,
            span: Span::between(open.span, close.span),
        })
    }

    /// `do <block> end` of a `for` loop.
    fn loop_body(&mut self, for_line: usize) -> ParseResult<(Block, Token)> {
        self.expect(Symbol::Do)?;
        let body = self.block(&[Symbol::End])?;
        let close = self.expect_match(Symbol::End, Symbol::For, for_line)?;
        Ok((body, close))
    }

    fn function_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let name = self.function_name()?;
        let body = self.function_body(open.span.start.line)?;
        Ok(Statement::Function {
            name,
            span: Span::between(open.span, body.span),
            body,
        })
    }

    fn function_name(&mut self) -> ParseResult<FunctionName> {
        let mut path = vec![self.expect_name()?];
        while self.accept(Symbol::Dot)?.is_some() {
            path.push(self.expect_name()?);
        }
        let is_method = self.accept(Symbol::Colon)?.is_some();
        if is_method {
            path.push(self.expect_name()?);
        }
        let span = Span::between(path[0].span, path[path.len() - 1].span);
        Ok(FunctionName {
            path,
            is_method,
            span,
        })
    }

    /// `(params) <block> end`, after the `function` keyword and name.
    fn function_body(&mut self, function_line: usize) -> ParseResult<FunctionBody> {
        let open = self.expect(Symbol::LeftParen)?;
        let mut parameters = Vec::new();
        let mut has_varargs = false;

        if !self.check(Symbol::RightParen) {
            loop {
                if self.accept(Symbol::Ellipsis)?.is_some() {
                    has_varargs = true;
                    break;
                }
                parameters.push(self.expect_name()?);
                if self.accept(Symbol::Comma)?.is_none() {
                    break;
                }
            }
        }
        self.expect(Symbol::RightParen)?;

        let body = self.block(&[Symbol::End])?;
        let close = self.expect_match(Symbol::End, Symbol::Function, function_line)?;
        Ok(FunctionBody {
            parameters,
            has_varargs,
            body,
            span: Span::between(open.span, close.span),
        })
    }

    fn local_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;

        if let Some(keyword) = self.accept(Symbol::Function)? {
            let name = self.expect_name()?;
            let body = self.function_body(keyword.span.start.line)?;
            return Ok(Statement::LocalFunction {
                name,
                span: Span::between(open.span, body.span),
                body,
            });
        }

        let mut names = vec![self.expect_name()?];
        while self.accept(Symbol::Comma)?.is_some() {
            names.push(self.expect_name()?);
        }
        let values = if self.accept(Symbol::Assign)?.is_some() {
            self.expression_list()?
        } else {
            Vec::new()
        };

        let end = values
            .last()
            .map_or_else(|| names[names.len() - 1].span, Expression::span);
        Ok(Statement::LocalAssign {
            names,
            values,
            span: Span::between(open.span, end),
        })
    }

    fn label_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let label = self.expect_name()?;
        let close = self.expect(Symbol::DoubleColon)?;
        Ok(Statement::LabelDecl {
            label,
            span: Span::between(open.span, close.span),
        })
    }

    fn goto_statement(&mut self) -> ParseResult<Statement> {
        let open = self.consume()?;
        let label = self.expect_name()?;
        let span = Span::between(open.span, label.span);
        Ok(Statement::Goto { label, span })
    }

    /// A statement starting with a prefix expression: either an assignment
    /// or a bare call.
    fn assign_or_call(&mut self) -> ParseResult<Statement> {
        let prefix = self.prefix_expression()?;

        if self.check(Symbol::Assign) || self.check(Symbol::Comma) {
            let mut targets = vec![self.lift_variable(prefix)?];
            while self.accept(Symbol::Comma)?.is_some() {
                let next = self.prefix_expression()?;
                targets.push(self.lift_variable(next)?);
            }
            self.expect(Symbol::Assign)?;
            let values = self.expression_list()?;
            let span = Span::between(targets[0].span(), values[values.len() - 1].span());
            return Ok(Statement::Assign {
                targets,
                values,
                span,
            });
        }

        match prefix {
            PrefixExpression::FunctionCall(call) => Ok(Statement::FunctionCall(call)),
            // A lone variable reads as an assignment missing its `=`.
            PrefixExpression::Variable(_) => Err(self.expected(Symbol::Assign)),
            PrefixExpression::Parenthesized { .. } => {
                Err(self.error(SyntaxErrorKind::InvalidCallStatement { near: self.near() }))
            }
        }
    }

    fn lift_variable(&self, prefix: PrefixExpression) -> ParseResult<Variable> {
        match prefix {
            PrefixExpression::Variable(variable) => Ok(variable),
            _ => Err(self.error(SyntaxErrorKind::InvalidAssignmentTarget { near: self.near() })),
        }
    }

    // -- Prefix expressions --

    /// `Name` or `( expr )`, followed by any run of `.name`, `[expr]`,
    /// `:name args`, or `args`.
    fn prefix_expression(&mut self) -> ParseResult<PrefixExpression> {
        let mut prefix = match self.current.symbol {
            Symbol::Identifier => PrefixExpression::Variable(Variable::Identifier(self.expect_name()?)),
            Symbol::LeftParen => {
                let open = self.consume()?;
                let expression = self.expression()?;
                let close =
                    self.expect_match(Symbol::RightParen, Symbol::LeftParen, open.span.start.line)?;
                PrefixExpression::Parenthesized {
                    expression: Box::new(expression),
                    span: Span::between(open.span, close.span),
                }
            }
            _ => {
                return Err(self.error(SyntaxErrorKind::UnexpectedSymbol { near: self.near() }));
            }
        };

        loop {
            prefix = match self.current.symbol {
                Symbol::Dot => {
                    self.consume()?;
                    let name = self.expect_name()?;
                    let span = Span::between(prefix.span(), name.span);
                    PrefixExpression::Variable(Variable::MemberId {
                        prefix: Box::new(prefix),
                        name,
                        span,
                    })
                }
                Symbol::LeftBracket => {
                    self.consume()?;
                    let index = self.expression()?;
                    let close = self.expect(Symbol::RightBracket)?;
                    let span = Span::between(prefix.span(), close.span);
                    PrefixExpression::Variable(Variable::MemberExpr {
                        prefix: Box::new(prefix),
                        index: Box::new(index),
                        span,
                    })
                }
                Symbol::Colon => {
                    self.consume()?;
                    let method = self.expect_name()?;
                    let arguments = self.call_arguments()?;
                    let span = Span::between(prefix.span(), arguments.span());
                    PrefixExpression::FunctionCall(FunctionCall::TableMethod {
                        prefix: Box::new(prefix),
                        method,
                        arguments,
                        span,
                    })
                }
                Symbol::LeftParen | Symbol::String | Symbol::LeftBrace => {
                    let arguments = self.call_arguments()?;
                    let span = Span::between(prefix.span(), arguments.span());
                    PrefixExpression::FunctionCall(FunctionCall::Normal {
                        prefix: Box::new(prefix),
                        arguments,
                        span,
                    })
                }
                _ => return Ok(prefix),
            };
        }
    }

    fn call_arguments(&mut self) -> ParseResult<Arguments> {
        match self.current.symbol {
            Symbol::LeftParen => {
                if self.current.span.start.line != self.previous_end.line {
                    return Err(self.error(SyntaxErrorKind::AmbiguousSyntax { near: self.near() }));
                }
                let open = self.consume()?;
                let expressions = if self.check(Symbol::RightParen) {
                    Vec::new()
                } else {
                    self.expression_list()?
                };
                let close =
                    self.expect_match(Symbol::RightParen, Symbol::LeftParen, open.span.start.line)?;
                Ok(Arguments::ParenList {
                    expressions,
                    span: Span::between(open.span, close.span),
                })
            }
            Symbol::LeftBrace => Ok(Arguments::TableLiteral(self.table_constructor()?)),
            Symbol::String => {
                let token = self.consume()?;
                Ok(Arguments::StringLiteral {
                    value: token.lexeme.unwrap_or_default(),
                    span: token.span,
                })
            }
            _ => Err(self.error(SyntaxErrorKind::FunctionArgumentsExpected { near: self.near() })),
        }
    }

    fn table_constructor(&mut self) -> ParseResult<Table> {
        let open = self.expect(Symbol::LeftBrace)?;
        let mut fields = Vec::new();

        while !self.check(Symbol::RightBrace) {
            fields.push(self.field()?);
            if self.accept(Symbol::Comma)?.is_none() && self.accept(Symbol::Semicolon)?.is_none() {
                break;
            }
        }

        let close = self.expect_match(Symbol::RightBrace, Symbol::LeftBrace, open.span.start.line)?;
        Ok(Table {
            fields,
            span: Span::between(open.span, close.span),
        })
    }

    fn field(&mut self) -> ParseResult<Field> {
        match self.current.symbol {
            Symbol::LeftBracket => {
                let open = self.consume()?;
                let key = self.expression()?;
                self.expect(Symbol::RightBracket)?;
                self.expect(Symbol::Assign)?;
                let value = self.expression()?;
                let span = Span::between(open.span, value.span());
                Ok(Field::MemberExpr { key, value, span })
            }
            Symbol::Identifier if self.next.symbol == Symbol::Assign => {
                let key = self.expect_name()?;
                self.consume()?;
                let value = self.expression()?;
                let span = Span::between(key.span, value.span());
                Ok(Field::MemberId { key, value, span })
            }
            _ => Ok(Field::Positional(self.expression()?)),
        }
    }

    // -- Expressions --

    fn expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut expressions = vec![self.expression()?];
        while self.accept(Symbol::Comma)?.is_some() {
            expressions.push(self.expression()?);
        }
        Ok(expressions)
    }

    fn expression(&mut self) -> ParseResult<Expression> {
        self.enter()?;
        let left = self.simple_expression()?;
        let expression = self.binary_expression(left, 0)?;
        self.leave();
        Ok(expression)
    }

    /// Fold binary operators onto `left` while their left power exceeds
    /// `limit`; the right operand is climbed at the operator's right power.
    fn binary_expression(&mut self, mut left: Expression, limit: u8) -> ParseResult<Expression> {
        while let Some(op) = binary_operator(self.current.symbol) {
            let (left_power, right_power) = op.binding_power();
            if left_power <= limit {
                break;
            }
            self.consume()?;
            self.enter()?;
            let operand = self.simple_expression()?;
            let right = self.binary_expression(operand, right_power)?;
            self.leave();

            let span = Span::between(left.span(), right.span());
            left = Expression::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn simple_expression(&mut self) -> ParseResult<Expression> {
        if let Some(op) = unary_operator(self.current.symbol) {
            let token = self.consume()?;
            self.enter()?;
            let operand = self.simple_expression()?;
            let operand = self.binary_expression(operand, UNARY_PRIORITY)?;
            self.leave();
            let span = Span::between(token.span, operand.span());
            return Ok(Expression::UnaryOp {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        let expression = match self.current.symbol {
            Symbol::Nil => Expression::Nil {
                span: self.consume()?.span,
            },
            Symbol::True => Expression::Boolean {
                value: true,
                span: self.consume()?.span,
            },
            Symbol::False => Expression::Boolean {
                value: false,
                span: self.consume()?.span,
            },
            Symbol::Ellipsis => Expression::Varargs {
                span: self.consume()?.span,
            },
            Symbol::Number => self.number_literal()?,
            Symbol::String => {
                let token = self.consume()?;
                Expression::String {
                    value: token.lexeme.unwrap_or_default(),
                    span: token.span,
                }
            }
            Symbol::Function => {
                let keyword = self.consume()?;
                let body = self.function_body(keyword.span.start.line)?;
                Expression::Function {
                    span: Span::between(keyword.span, body.span),
                    body,
                }
            }
            Symbol::LeftBrace => Expression::Table(self.table_constructor()?),
            Symbol::Identifier | Symbol::LeftParen => Expression::Prefix(self.prefix_expression()?),
            _ => {
                return Err(self.error(SyntaxErrorKind::UnexpectedSymbol { near: self.near() }));
            }
        };
        Ok(expression)
    }

    fn number_literal(&mut self) -> ParseResult<Expression> {
        let lexeme = self.current.lexeme.clone().unwrap_or_default();
        let Some(value) = parse_number(&lexeme) else {
            return Err(self.error(SyntaxErrorKind::MalformedNumber { near: lexeme }));
        };
        let token = self.consume()?;
        Ok(Expression::Number {
            value,
            span: token.span,
        })
    }
}

const fn binary_operator(symbol: Symbol) -> Option<BinaryOperator> {
    let op = match symbol {
        Symbol::Or => BinaryOperator::Or,
        Symbol::And => BinaryOperator::And,
        Symbol::Less => BinaryOperator::Less,
        Symbol::Greater => BinaryOperator::Greater,
        Symbol::LessEqual => BinaryOperator::LessEqual,
        Symbol::GreaterEqual => BinaryOperator::GreaterEqual,
        Symbol::NotEqual => BinaryOperator::NotEqual,
        Symbol::Equal => BinaryOperator::Equal,
        Symbol::Concat => BinaryOperator::Concat,
        Symbol::Plus => BinaryOperator::Add,
        Symbol::Minus => BinaryOperator::Subtract,
        Symbol::Star => BinaryOperator::Multiply,
        Symbol::Slash => BinaryOperator::Divide,
        Symbol::Percent => BinaryOperator::Modulo,
        Symbol::Caret => BinaryOperator::Power,
        _ => return None,
    };
    Some(op)
}

const fn unary_operator(symbol: Symbol) -> Option<UnaryOperator> {
    match symbol {
        Symbol::Not => Some(UnaryOperator::Not),
        Symbol::Minus => Some(UnaryOperator::Negate),
        Symbol::Hash => Some(UnaryOperator::Length),
        _ => None,
    }
}

/// Decode a numeric lexeme in either radix.
///
/// Decimal overflow (`1e999`) yields infinity. Returns `None` for
/// malformed lexemes.
#[must_use]
pub fn parse_number(lexeme: &str) -> Option<f64> {
    if let Some(hex) = lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        return parse_hex(hex);
    }
    lexeme.parse::<f64>().ok()
}

/// `mantissa × 2^exponent`, mantissa in hex with an optional fraction.
fn parse_hex(text: &str) -> Option<f64> {
    let (mantissa, exponent) = match text.find(['p', 'P']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };

    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut value = 0.0_f64;
    for c in integer.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in fraction.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }

    let Some(exponent) = exponent else {
        return Some(value);
    };
    let digits = exponent.trim_start_matches(['+', '-']);
    if digits.is_empty() || exponent.len() - digits.len() > 1 {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Anything past this range is already 0 or infinity.
    let magnitude = digits.parse::<i32>().unwrap_or(i32::MAX).min(4096);
    let exponent = if exponent.starts_with('-') {
        -magnitude
    } else {
        magnitude
    };
    Some(value * 2.0_f64.powi(exponent))
}
