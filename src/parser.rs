//! Parser for MicroScala.
//!
//! This module provides a recursive descent parser that transforms a
//! stream of tokens into an Abstract Syntax Tree. The parser owns a
//! one-token lookahead over the lexer; every grammar mismatch is fatal and
//! reported as an `"X expected"` diagnostic carrying the offending token's
//! position within its line.
//!
//! # Grammar
//!
//! ```text
//! compilationUnit ::= object id { {def} mainDef } EOF
//! mainDef         ::= def main ( args : Array [ String ] )
//!                       { {varDef} statement {statement} }
//! def             ::= def id ( [id : Type {, id : Type}] ) : Type =
//!                       { {varDef} {statement} return listExpr ; }
//!                    | varDef
//! varDef          ::= var id : Type = literal ;
//! Type            ::= Int | List [ Int ]
//! statement       ::= if ( expr ) statement [else statement]
//!                    | while ( expr ) statement
//!                    | id = listExpr ;
//!                    | println ( listExpr ) ;
//!                    | { statement {statement} }
//! expr            ::= andExpr {|| andExpr}
//! andExpr         ::= relExpr {&& relExpr}
//! relExpr         ::= [!] listExpr [relOper listExpr]
//! listExpr        ::= addExpr [:: listExpr]
//! addExpr         ::= mulExpr {(+|-) mulExpr}
//! mulExpr         ::= prefixExpr {(*|/) prefixExpr}
//! prefixExpr      ::= [+|-] simpleExpr {. (head|tail|isEmpty)}
//! simpleExpr      ::= literal | ( expr ) | id [ ( [listExpr {, listExpr}] ) ]
//! literal         ::= integer | Nil
//! ```
//!
//! `::` is right-associative; the other binary operators are
//! left-associative; relational operators do not chain. A leading `!`
//! wraps the whole relational production, and a prefix sign wraps after
//! any `.head`/`.tail`/`.isEmpty` chain completes.
//!
//! # Example
//!
//! ```rust
//! use microscala::parser::Parser;
//!
//! let input = "object P { def main(args : Array[String]) { println(42); } }";
//!
//! let mut parser = Parser::new(input);
//! let program = parser.parse().unwrap();
//! assert_eq!(program.name, "P");
//! ```

use crate::ast::{
    BinaryOp, DecVar, Expr, Function, Literal, Program, Stmt, Type, UnaryOp, UNDEFINED,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};

/// The recursive descent parser for MicroScala source text.
///
/// Pulls one token at a time from the lexer and keeps a single token of
/// lookahead (plus a lazily filled peek slot for the `def main`
/// classification at the top level).
pub struct Parser<'a> {
    /// The underlying lexer
    lexer: Lexer<'a>,

    /// The source text (for diagnostic line echo)
    source: &'a str,

    /// Current token
    current: Token,

    /// Peeked token for lookahead (if any)
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source text.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();

        Parser {
            lexer,
            source,
            current,
            peeked: None,
        }
    }

    /// Parses a complete compilation unit.
    ///
    /// # Returns
    ///
    /// The parsed [`Program`] on success, or the first [`ParseError`] on
    /// failure; the parser does not recover.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        self.expect(TokenKind::Object, "object")?;

        let name = self.expect_identifier()?;

        self.expect(TokenKind::LeftBrace, "{")?;

        let mut globals = Vec::new();
        let mut functions = Vec::new();

        // Top-level classification: `var` opens a global declaration and
        // `def` a function, except `def main`, which ends the list.
        loop {
            match self.current.kind {
                TokenKind::Var => globals.push(self.parse_var_def()?),
                TokenKind::Def => {
                    if self.peek().kind == TokenKind::Main {
                        break;
                    }
                    functions.push(self.parse_function()?);
                }
                _ => return Err(self.expected("main")),
            }
        }

        let main = self.parse_main()?;

        self.expect(TokenKind::RightBrace, "}")?;
        self.expect(TokenKind::Eof, "EOF")?;

        Ok(Program {
            name,
            globals,
            functions,
            main,
        })
    }

    /// Parses `mainDef`.
    ///
    /// The `args : Array[String]` formal is required and inert: no string
    /// values exist at runtime, so it can never be read.
    fn parse_main(&mut self) -> Result<Function, ParseError> {
        self.expect(TokenKind::Def, "def")?;
        self.expect(TokenKind::Main, "main")?;

        self.expect(TokenKind::LeftParen, "(")?;
        let args_name = self.expect_kind_lexeme(TokenKind::Args, "args")?;
        self.expect(TokenKind::Colon, ":")?;
        self.expect(TokenKind::Array, "Array")?;
        self.expect(TokenKind::LeftBracket, "[")?;
        self.expect(TokenKind::String, "String")?;
        self.expect(TokenKind::RightBracket, "]")?;
        self.expect(TokenKind::RightParen, ")")?;

        self.expect(TokenKind::LeftBrace, "{")?;

        let locals = self.parse_var_defs()?;

        let mut body = Vec::new();
        while self.starts_statement() {
            body.push(self.parse_statement()?);
        }

        self.expect(TokenKind::RightBrace, "}")?;

        Ok(Function {
            name: "main".to_string(),
            params: vec![DecVar {
                name: args_name,
                ty: Type::StringArray,
                value: Literal::Nil,
            }],
            return_type: None,
            locals,
            body,
        })
    }

    /// Parses a non-`main` function definition.
    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.expect(TokenKind::Def, "def")?;
        let name = self.expect_identifier()?;

        self.expect(TokenKind::LeftParen, "(")?;
        let mut params = Vec::new();
        if self.current.kind == TokenKind::Identifier {
            loop {
                let param_name = self.expect_identifier()?;
                self.expect(TokenKind::Colon, ":")?;
                let ty = self.parse_type()?;
                params.push(DecVar {
                    name: param_name,
                    ty,
                    value: parameter_default(ty),
                });

                if self.current.kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightParen, ")")?;

        self.expect(TokenKind::Colon, ":")?;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Assign, "=")?;

        self.expect(TokenKind::LeftBrace, "{")?;
        let locals = self.parse_var_defs()?;

        let mut body = Vec::new();
        while self.starts_statement() {
            body.push(self.parse_statement()?);
        }

        self.expect(TokenKind::Return, "return")?;
        let expr = self.parse_list_expr()?;
        body.push(Stmt::Return(expr));
        self.expect(TokenKind::Semicolon, ";")?;

        self.expect(TokenKind::RightBrace, "}")?;

        Ok(Function {
            name,
            params,
            return_type: Some(return_type),
            locals,
            body,
        })
    }

    /// Parses zero or more `varDef`s.
    fn parse_var_defs(&mut self) -> Result<Vec<DecVar>, ParseError> {
        let mut vars = Vec::new();
        while self.current.kind == TokenKind::Var {
            vars.push(self.parse_var_def()?);
        }
        Ok(vars)
    }

    /// Parses `varDef ::= var id : Type = literal ;`.
    fn parse_var_def(&mut self) -> Result<DecVar, ParseError> {
        self.expect(TokenKind::Var, "var")?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Colon, ":")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Assign, "=")?;
        let value = self.parse_literal()?;
        self.expect(TokenKind::Semicolon, ";")?;

        Ok(DecVar { name, ty, value })
    }

    /// Parses `Type ::= Int | List [ Int ]`.
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.current.kind {
            TokenKind::Int => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::List => {
                self.advance();
                self.expect(TokenKind::LeftBracket, "[")?;
                self.expect(TokenKind::Int, "Int")?;
                self.expect(TokenKind::RightBracket, "]")?;
                Ok(Type::IntList)
            }
            _ => Err(self.expected("type")),
        }
    }

    /// Returns true if the current token can start a statement.
    fn starts_statement(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::If
                | TokenKind::While
                | TokenKind::Identifier
                | TokenKind::Println
                | TokenKind::LeftBrace
        )
    }

    /// Parses one statement.
    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.kind {
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::LeftParen, "(")?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RightParen, ")")?;

                let then_branch = Box::new(self.parse_statement()?);
                let else_branch = if self.current.kind == TokenKind::Else {
                    self.advance();
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };

                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }

            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::LeftParen, "(")?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RightParen, ")")?;
                let body = Box::new(self.parse_statement()?);

                Ok(Stmt::While { cond, body })
            }

            TokenKind::Identifier => {
                let name = self.expect_identifier()?;
                self.expect(TokenKind::Assign, "=")?;
                let value = self.parse_list_expr()?;
                self.expect(TokenKind::Semicolon, ";")?;

                Ok(Stmt::Assign { name, value })
            }

            TokenKind::Println => {
                self.advance();
                self.expect(TokenKind::LeftParen, "(")?;
                let expr = self.parse_list_expr()?;
                self.expect(TokenKind::RightParen, ")")?;
                self.expect(TokenKind::Semicolon, ";")?;

                Ok(Stmt::Println { expr })
            }

            TokenKind::LeftBrace => {
                self.advance();

                let mut stmts = vec![self.parse_statement()?];
                while self.current.kind != TokenKind::RightBrace && self.starts_statement() {
                    stmts.push(self.parse_statement()?);
                }
                self.expect(TokenKind::RightBrace, "}")?;

                // A single braced statement is that statement.
                if stmts.len() == 1 {
                    Ok(stmts.remove(0))
                } else {
                    Ok(Stmt::Block(stmts))
                }
            }

            _ => Err(self.expected("statement")),
        }
    }

    /// Parses `expr ::= andExpr {|| andExpr}`.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_and_expr()?;

        while self.current.kind == TokenKind::Or {
            self.advance();
            let rhs = self.parse_and_expr()?;
            expr = binary(BinaryOp::Or, expr, rhs);
        }

        Ok(expr)
    }

    /// Parses `andExpr ::= relExpr {&& relExpr}`.
    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_rel_expr()?;

        while self.current.kind == TokenKind::And {
            self.advance();
            let rhs = self.parse_rel_expr()?;
            expr = binary(BinaryOp::And, expr, rhs);
        }

        Ok(expr)
    }

    /// Parses `relExpr ::= [!] listExpr [relOper listExpr]`.
    ///
    /// The leading `!` wraps the whole production, comparison included.
    fn parse_rel_expr(&mut self) -> Result<Expr, ParseError> {
        let negated = if self.current.kind == TokenKind::Not {
            self.advance();
            true
        } else {
            false
        };

        let mut expr = self.parse_list_expr()?;

        if self.current.kind.is_relop() {
            let op = relop(self.current.kind);
            self.advance();
            let rhs = self.parse_list_expr()?;
            expr = binary(op, expr, rhs);
        }

        if negated {
            expr = unary(UnaryOp::Not, expr);
        }

        Ok(expr)
    }

    /// Parses `listExpr ::= addExpr [:: listExpr]`; `::` is
    /// right-associative through the recursion.
    fn parse_list_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_add_expr()?;

        if self.current.kind == TokenKind::Cons {
            self.advance();
            let rhs = self.parse_list_expr()?;
            return Ok(binary(BinaryOp::Cons, expr, rhs));
        }

        Ok(expr)
    }

    /// Parses `addExpr ::= mulExpr {(+|-) mulExpr}`.
    fn parse_add_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_mul_expr()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul_expr()?;
            expr = binary(op, expr, rhs);
        }

        Ok(expr)
    }

    /// Parses `mulExpr ::= prefixExpr {(*|/) prefixExpr}`.
    fn parse_mul_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_prefix_expr()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_prefix_expr()?;
            expr = binary(op, expr, rhs);
        }

        Ok(expr)
    }

    /// Parses `prefixExpr ::= [+|-] simpleExpr {. (head|tail|isEmpty)}`.
    ///
    /// A prefix `-` wraps after the method-call chain completes, so
    /// `-xs.head` negates the head. A prefix `+` is the identity and
    /// produces no node.
    fn parse_prefix_expr(&mut self) -> Result<Expr, ParseError> {
        let negated = match self.current.kind {
            TokenKind::Plus => {
                self.advance();
                false
            }
            TokenKind::Minus => {
                self.advance();
                true
            }
            _ => false,
        };

        let mut expr = self.parse_simple_expr()?;

        while self.current.kind == TokenKind::Dot {
            self.advance();
            let op = match self.current.kind {
                TokenKind::Head => UnaryOp::Head,
                TokenKind::Tail => UnaryOp::Tail,
                TokenKind::IsEmpty => UnaryOp::IsEmpty,
                _ => return Err(self.expected("(head | tail | isEmpty)")),
            };
            self.advance();
            expr = unary(op, expr);
        }

        if negated {
            expr = unary(UnaryOp::Neg, expr);
        }

        Ok(expr)
    }

    /// Parses `simpleExpr ::= literal | ( expr ) | id [ ( args ) ]`.
    fn parse_simple_expr(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => {
                let name = self.expect_identifier()?;

                if self.current.kind != TokenKind::LeftParen {
                    return Ok(Expr::Var(name));
                }

                self.advance();
                let mut args = Vec::new();
                if self.current.kind != TokenKind::RightParen {
                    args.push(self.parse_list_expr()?);
                    while self.current.kind == TokenKind::Comma {
                        self.advance();
                        args.push(self.parse_list_expr()?);
                    }
                }
                self.expect(TokenKind::RightParen, ")")?;

                Ok(Expr::Call { name, args })
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RightParen, ")")?;
                Ok(expr)
            }

            _ => {
                let literal = self.parse_literal()?;
                Ok(match literal {
                    Literal::Int(n) => Expr::Int(n),
                    Literal::Nil => Expr::Nil,
                })
            }
        }
    }

    /// Parses `literal ::= integer | Nil`.
    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        match self.current.kind {
            TokenKind::Integer => {
                let value = match self.current.lexeme.parse::<i64>() {
                    Ok(value) => value,
                    Err(_) => {
                        return Err(ParseError::IntegerOutOfRange {
                            lexeme: self.current.lexeme.clone(),
                            position: self.current.span.column.saturating_sub(1),
                            line: self.line_of(self.current.span.line),
                        })
                    }
                };
                self.advance();
                Ok(Literal::Int(value))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Literal::Nil)
            }
            _ => Err(self.expected("literal")),
        }
    }

    /// Advances to the next token, draining the peek slot first.
    fn advance(&mut self) {
        self.current = self
            .peeked
            .take()
            .unwrap_or_else(|| self.lexer.next_token());
    }

    /// Peeks at the next token without consuming it.
    fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token());
        }
        self.peeked.as_ref().expect("peek slot just filled")
    }

    /// Expects the current token to be of a specific kind, reporting
    /// `"{what} expected"` otherwise.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    /// Expects an identifier and returns its lexeme.
    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        self.expect_kind_lexeme(TokenKind::Identifier, "id")
    }

    /// Expects a token of the given kind and returns its lexeme.
    fn expect_kind_lexeme(&mut self, kind: TokenKind, what: &str) -> Result<String, ParseError> {
        if self.current.kind == kind {
            let lexeme = self.current.lexeme.clone();
            self.advance();
            Ok(lexeme)
        } else {
            Err(self.expected(what))
        }
    }

    /// Builds an `"X expected"` error at the current token.
    fn expected(&self, what: &str) -> ParseError {
        ParseError::Expected {
            expected: what.to_string(),
            position: self.current.span.column.saturating_sub(1),
            line: self.line_of(self.current.span.line),
        }
    }

    /// Returns the text of the given 1-indexed source line.
    fn line_of(&self, line: usize) -> String {
        self.source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or("")
            .to_string()
    }
}

/// Builds a binary expression node.
fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Builds a unary expression node.
fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

/// Maps a relational token to its operator.
fn relop(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Eq => BinaryOp::Eq,
        _ => BinaryOp::Ne,
    }
}

/// The placeholder default stored for a declared formal: [`UNDEFINED`] for
/// `Int`, `Nil` otherwise. Never observable; binding overwrites it before
/// the body runs.
fn parameter_default(ty: Type) -> Literal {
    match ty {
        Type::Int => Literal::Int(UNDEFINED),
        _ => Literal::Nil,
    }
}
