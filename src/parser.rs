/*!
Recursive-descent parser producing Kin's AST.

Grammar (EBNF, condensed)
-------------------------

```text
program        → statement* EOF ;
statement      → varDecl | funDecl | ifStmt | loopStmt | switchStmt | expression ;
varDecl        → ( "reka" | "ntahinduka" ) IDENT ( "=" expression | ";" ) ;
funDecl        → "porogaramu_ntoya" IDENT "(" parameters? ")" block ;
ifStmt         → ( "niba" | "nanone_niba" ) "(" expression ")" block
                 ( ifStmt-as-nanone_niba | "niba_byanze" block )? ;
loopStmt       → "subiramo_niba" "(" expression ")" block ;
switchStmt     → "gereranya" "(" expression ")" "{"
                 ( "usanze" expression ":" statement* )*
                 ( "ibindi" ":" statement* )? "}" ;
block          → "{" statement* "}" ;
parameters     → IDENT ( "," IDENT )* ;
expression     → assignment ;
assignment     → objectLit ( "=" assignment )? ;
objectLit      → "{" ( IDENT ( ":" expression )? ( "," )? )* "}" | arrayLit ;
arrayLit       → "[" ( expression ( "," expression )* )? "]" | logical ;
logical        → additive ( ( "&&" | "||" ) additive )? ;          // single pair
additive       → multiplicative ( ( "+" | "-" | "==" | "!=" | "<"
                 | ">" | "<=" | ">=" ) multiplicative )* ;
multiplicative → postfix ( ( "*" | "/" | "%" | "^" ) postfix )* ;
postfix        → primary ( "." IDENT | "[" expression "]"
                 | "(" arguments? ")" )* ;
primary        → INTEGER | FLOAT | STRING | IDENT | "(" expression ")"
                 | "tanga" ( ";" | expression ) ;
```

A `gereranya` switch never reaches the evaluator: it desugars at parse time
into a chain of `Stmt::Conditional` nodes whose conditions are synthesized
`subject == case` comparisons, with a trailing `ibindi` block supplying the
deepest alternate directly.

One token of lookahead (`peek`) with explicit consumption (`advance`);
parsing fails on the first error, reported with the offending line.
*/

use crate::ast::{BinaryOp, Expr, Program, Property, Stmt};
use crate::error::{KinError, Result};
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};

use log::{debug, info};
use std::rc::Rc;

/// Top-level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self { tokens, current: 0 }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Scan and parse a whole source file into a [`Program`].
    pub fn produce_ast(source: &str) -> Result<Program> {
        let tokens: Vec<Token<'_>> = Scanner::new(source).tokenize()?;
        let mut parser = Parser::new(&tokens);

        parser.parse()
    }

    /// Parse the token stream into a [`Program`].
    pub fn parse(&mut self) -> Result<Program> {
        info!("Beginning parse phase");

        let mut body: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            body.push(self.statement()?);
        }

        Ok(Program { body })
    }

    // ──────────────────────── statement rules ─────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        debug!("Entering statement, next={:?}", self.peek().token_type);

        match self.peek().token_type {
            TokenType::REKA | TokenType::NTAHINDUKA => self.var_declaration(),
            TokenType::NIBA => self.if_statement(),
            TokenType::SUBIRAMO_NIBA => self.loop_statement(),
            TokenType::POROGARAMU_NTOYA => self.function_declaration(),
            TokenType::GERERANYA => self.switch_statement(),
            _ => Ok(Stmt::Expression(self.expression()?)),
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let constant: bool = self.advance().token_type == TokenType::NTAHINDUKA;

        let name: &Token<'_> = self.consume(
            TokenType::IDENTIFIER,
            "Variable name expected following 'reka' / 'ntahinduka'",
        )?;
        let identifier: String = name.lexeme.to_string();
        let line: usize = name.line;

        // Uninitialized declaration: `reka x;` is fine, `ntahinduka x;` is not.
        if self.matches(TokenType::SEMICOLON) {
            if constant {
                return Err(KinError::parse(
                    line,
                    "Constant variables must be assigned a value",
                ));
            }

            return Ok(Stmt::VariableDeclaration {
                constant: false,
                identifier,
                value: None,
            });
        }

        self.consume(TokenType::EQUAL, "Expected '=' after variable name")?;

        Ok(Stmt::VariableDeclaration {
            constant,
            identifier,
            value: Some(self.expression()?),
        })
    }

    fn function_declaration(&mut self) -> Result<Stmt> {
        self.advance(); // porogaramu_ntoya

        let name: String = self
            .consume(
                TokenType::IDENTIFIER,
                "Expected function name following 'porogaramu_ntoya'",
            )?
            .lexeme
            .to_string();

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after function name")?;

        let mut parameters: Vec<String> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                let param: &Token<'_> = self.consume(
                    TokenType::IDENTIFIER,
                    "Expected identifier for function parameter",
                )?;

                parameters.push(param.lexeme.to_string());

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Stmt::FunctionDeclaration {
            name,
            parameters,
            body: Rc::new(body),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.advance(); // niba or nanone_niba

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'niba'")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;

        let body: Vec<Stmt> = self.block()?;

        // 'nanone_niba' chains nest as a single-statement alternate; a
        // terminal 'niba_byanze' supplies the alternate block directly.
        let alternate: Vec<Stmt> = if self.check(TokenType::NANONE_NIBA) {
            vec![self.if_statement()?]
        } else if self.matches(TokenType::NIBA_BYANZE) {
            self.block()?
        } else {
            Vec::new()
        };

        Ok(Stmt::Conditional {
            condition,
            body,
            alternate,
        })
    }

    fn loop_statement(&mut self) -> Result<Stmt> {
        self.advance(); // subiramo_niba

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'subiramo_niba'")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Stmt::Loop { condition, body })
    }

    /// Parse a `gereranya` switch and desugar it into a conditional chain.
    ///
    /// The subject expression is reused as the left operand of a synthesized
    /// `==` comparison against each case expression; every later case nests
    /// in the previous case's alternate and an `ibindi` block becomes the
    /// deepest alternate with no comparison. An empty switch (or one with
    /// only `ibindi`) yields a degenerate conditional with a constant-true
    /// `1 == 1` condition and empty body and alternate; a default block
    /// without any cases is discarded.
    fn switch_statement(&mut self) -> Result<Stmt> {
        self.advance(); // gereranya

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'gereranya'")?;
        let subject: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after switch subject")?;

        self.consume(TokenType::LEFT_BRACE, "Expected '{' starting a switch body")?;

        let mut cases: Vec<(Expr, Vec<Stmt>)> = Vec::new();

        while self.matches(TokenType::USANZE) {
            let case_value: Expr = self.expression()?;
            self.consume(TokenType::COLON, "Expected ':' after 'usanze' value")?;

            let mut case_body: Vec<Stmt> = Vec::new();

            while !self.check(TokenType::USANZE)
                && !self.check(TokenType::IBINDI)
                && !self.check(TokenType::RIGHT_BRACE)
                && !self.is_at_end()
            {
                case_body.push(self.statement()?);
            }

            cases.push((case_value, case_body));
        }

        let mut default_body: Vec<Stmt> = Vec::new();

        if self.matches(TokenType::IBINDI) {
            self.consume(TokenType::COLON, "Expected ':' after 'ibindi'")?;

            while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
                default_body.push(self.statement()?);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after switch body")?;

        debug!(
            "Desugaring switch: {} cases, default={}",
            cases.len(),
            !default_body.is_empty()
        );

        // Fold the cases back to front so each one nests in the previous
        // alternate, with the default block at the very bottom.
        let mut chain: Option<Stmt> = None;
        let mut default_body: Option<Vec<Stmt>> = Some(default_body);

        for (case_value, case_body) in cases.into_iter().rev() {
            let alternate: Vec<Stmt> = match chain.take() {
                Some(stmt) => vec![stmt],
                None => default_body.take().unwrap_or_default(),
            };

            chain = Some(Stmt::Conditional {
                condition: Expr::Binary {
                    operator: BinaryOp::Eq,
                    left: Box::new(subject.clone()),
                    right: Box::new(case_value),
                },
                body: case_body,
                alternate,
            });
        }

        match chain {
            Some(stmt) => Ok(stmt),

            // No 'usanze' cases at all: the whole switch degenerates to an
            // always-true conditional with empty body and alternate. A
            // default block needs a case chain to hang off of, so without
            // one it is discarded.
            None => Ok(Stmt::Conditional {
                condition: Expr::Binary {
                    operator: BinaryOp::Eq,
                    left: Box::new(Expr::NumericLiteral(1.0)),
                    right: Box::new(Expr::NumericLiteral(1.0)),
                },
                body: Vec::new(),
                alternate: Vec::new(),
            }),
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.consume(TokenType::LEFT_BRACE, "Expected '{' starting a code block")?;

        let mut body: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            body.push(self.statement()?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' closing a code block")?;

        Ok(body)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let left: Expr = self.object_literal()?;

        if self.matches(TokenType::EQUAL) {
            let value: Expr = self.assignment()?;

            return Ok(Expr::Assignment {
                assigne: Box::new(left),
                value: Box::new(value),
            });
        }

        Ok(left)
    }

    fn object_literal(&mut self) -> Result<Expr> {
        if !self.check(TokenType::LEFT_BRACE) {
            return self.array_literal();
        }

        self.advance(); // {

        let mut properties: Vec<Property> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            let key: String = self
                .consume(TokenType::IDENTIFIER, "Identifier expected for object key")?
                .lexeme
                .to_string();

            // Shorthand pair: `{key}` or `{key, ...}` looks up a variable
            // named like the key at evaluation time.
            if self.matches(TokenType::COMMA) {
                properties.push(Property { key, value: None });
                continue;
            } else if self.check(TokenType::RIGHT_BRACE) {
                properties.push(Property { key, value: None });
                continue;
            }

            self.consume(TokenType::COLON, "Expected ':' after object key")?;

            let value: Expr = self.expression()?;
            properties.push(Property {
                key,
                value: Some(value),
            });

            if !self.check(TokenType::RIGHT_BRACE) {
                self.consume(
                    TokenType::COMMA,
                    "Expected ',' or '}' after object property",
                )?;
            }
        }

        self.consume(
            TokenType::RIGHT_BRACE,
            "Closing brace '}' expected at the end of object expression",
        )?;

        Ok(Expr::ObjectLiteral(properties))
    }

    fn array_literal(&mut self) -> Result<Expr> {
        if !self.check(TokenType::LEFT_BRACKET) {
            return self.logical();
        }

        self.advance(); // [

        // Arrays are object literals whose keys are the decimal string
        // forms of their positional index, assigned in parse order.
        let mut properties: Vec<Property> = Vec::new();
        let mut index: usize = 0;

        while !self.check(TokenType::RIGHT_BRACKET) && !self.is_at_end() {
            let value: Expr = self.expression()?;

            properties.push(Property {
                key: index.to_string(),
                value: Some(value),
            });

            index += 1;

            if !self.check(TokenType::RIGHT_BRACKET) {
                self.consume(
                    TokenType::COMMA,
                    "Expected ',' or ']' after array element",
                )?;
            }
        }

        self.consume(
            TokenType::RIGHT_BRACKET,
            "Closing bracket ']' expected at the end of array expression",
        )?;

        Ok(Expr::ObjectLiteral(properties))
    }

    /// `&&` / `||` accept a single, non-associative operand pair.
    fn logical(&mut self) -> Result<Expr> {
        let left: Expr = self.additive()?;

        let operator = match self.peek().token_type {
            TokenType::AND => BinaryOp::And,
            TokenType::OR => BinaryOp::Or,
            _ => return Ok(left),
        };

        self.advance();

        let right: Expr = self.additive()?;

        Ok(Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Additive tier, which in Kin also hosts the comparison operators;
    /// all of them are left-associative at equal precedence.
    fn additive(&mut self) -> Result<Expr> {
        let mut left: Expr = self.multiplicative()?;

        loop {
            let operator = match self.peek().token_type {
                TokenType::PLUS => BinaryOp::Add,
                TokenType::MINUS => BinaryOp::Sub,
                TokenType::EQUAL_EQUAL => BinaryOp::Eq,
                TokenType::BANG_EQUAL => BinaryOp::Ne,
                TokenType::LESS => BinaryOp::Lt,
                TokenType::GREATER => BinaryOp::Gt,
                TokenType::LESS_EQUAL => BinaryOp::Le,
                TokenType::GREATER_EQUAL => BinaryOp::Ge,
                _ => break,
            };

            self.advance();

            let right: Expr = self.multiplicative()?;

            left = Expr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut left: Expr = self.postfix()?;

        loop {
            let operator = match self.peek().token_type {
                TokenType::STAR => BinaryOp::Mul,
                TokenType::SLASH => BinaryOp::Div,
                TokenType::PERCENT => BinaryOp::Mod,
                TokenType::CARET => BinaryOp::Pow,
                _ => break,
            };

            self.advance();

            let right: Expr = self.postfix()?;

            left = Expr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Call and member postfixes: `.name`, `[expr]` and `(args)` chain in
    /// any order (`a.b[0](x).c`).
    fn postfix(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::DOT) {
                let name: &Token<'_> = self.consume(
                    TokenType::IDENTIFIER,
                    "Dot operator ('.') requires an identifier property",
                )?;

                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Identifier(name.lexeme.to_string())),
                    computed: false,
                };
            } else if self.matches(TokenType::LEFT_BRACKET) {
                let property: Expr = self.expression()?;

                self.consume(
                    TokenType::RIGHT_BRACKET,
                    "Closing bracket ']' expected following computed member value",
                )?;

                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(property),
                    computed: true,
                };
            } else if self.matches(TokenType::LEFT_PAREN) {
                expr = Expr::Call {
                    caller: Box::new(expr),
                    args: self.arguments()?,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Argument list; the opening '(' has already been consumed.
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args: Vec<Expr> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                args.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.peek().token_type.clone() {
            TokenType::IDENTIFIER => {
                let symbol: String = self.advance().lexeme.to_string();

                Ok(Expr::Identifier(symbol))
            }

            TokenType::INTEGER(n) | TokenType::FLOAT(n) => {
                self.advance();

                Ok(Expr::NumericLiteral(n))
            }

            TokenType::STRING(s) => {
                self.advance();

                Ok(Expr::StringLiteral(s))
            }

            TokenType::LEFT_PAREN => {
                self.advance();

                let expr: Expr = self.expression()?;

                self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

                Ok(expr)
            }

            TokenType::TANGA => self.return_expression(),

            _ => Err(KinError::parse(
                self.peek().line,
                format!("Unexpected token '{}'", self.peek().lexeme),
            )),
        }
    }

    fn return_expression(&mut self) -> Result<Expr> {
        self.advance(); // tanga

        // `tanga;` returns null to the nearest enclosing call.
        if self.matches(TokenType::SEMICOLON) {
            return Ok(Expr::Return(None));
        }

        let value: Expr = self.expression()?;

        Ok(Expr::Return(Some(Box::new(value))))
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        Err(KinError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current - 1]
    }
}
