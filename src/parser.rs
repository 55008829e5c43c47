/*!
Recursive‑descent parser for Rox.

Time & Space Complexity
-----------------------
* **n** = number of tokens (including the sole EOF).

| Phase / function              | Cost | Rationale                                                  |
|-------------------------------|-----:|------------------------------------------------------------|
| `Parser::parse` main loop     | Θ(n) | Each token is consumed once via `advance()`.               |
| Error recovery `synchronize()`| O(k) | Discards tokens up to the next statement boundary (k ≤ n). |

Call‑stack depth grows with syntactic nesting.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `statement`   | `debug`| High‑level descent into grammar branches. |
| Error paths                  | `debug`| Context before recording the error.       |

--------------------------------------------------------------------------------
Grammar
-------

```text
program      → declaration* EOF ;
declaration  → classDecl | traitDecl | funDecl | varDecl | statement ;
classDecl    → "class" IDENT ( "<" IDENT )? classBody ;
traitDecl    → "trait" IDENT classBody ;
classBody    → "{" member* "}" ;
member       → "use" IDENT ( "," IDENT )* ";"
             | "class" method
             | method ;
method       → IDENT block                       // getter
             | function ;
funDecl      → "fun" function ;
function     → IDENT "(" parameters? ")" block ;
varDecl      → "var" IDENT ( "=" expression )? ";" ;
statement    → exprStmt | printStmt | ifStmt | whileStmt | forStmt
             | returnStmt | "break" ";" | "continue" ";" | block ;
expression   → comma ;
comma        → assignment ( "," assignment )* ;
assignment   → conditional ( "=" assignment )? ;
conditional  → logic_or ( "?" expression ":" conditional )? ;
logic_or     → logic_and ( "or" logic_and )* ;
logic_and    → equality ( "and" equality )* ;
equality     → comparison ( ( "!=" | "==" ) comparison )* ;
comparison   → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term         → factor ( ( "-" | "+" ) factor )* ;
factor       → unary ( ( "/" | "*" ) unary )* ;
unary        → ( "!" | "-" ) unary | call ;
call         → primary ( "(" arguments? ")" | "." IDENT )* ;
arguments    → assignment ( "," assignment )* ;
primary      → NUMBER | STRING | "true" | "false" | "nil" | "this"
             | IDENT | "(" expression ")" | "super" "." IDENT
             | "fun" "(" parameters? ")" block ;
```
*/

use crate::ast::{ClassBody, ControlFlow, Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

use log::{debug, info};

const MAX_ARGS: usize = 255;

/// Operand parser for one left‑associative precedence level.
type Operand<'a> = fn(&mut Parser<'a>) -> Result<Expr<'a>>;

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,

    /// One loop‑nesting counter per function body being parsed; the bottom
    /// entry belongs to top‑level code.
    loop_depths: Vec<usize>,

    errors: Vec<LoxError>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.  `tokens` must end with `EOF`.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            loop_depths: vec![0],
            errors: Vec::new(),
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.  Declarations that fail to parse are dropped
    /// after recovery, so the result may be partial; see [`Parser::errors`].
    pub fn parse(&mut self) -> Vec<Stmt<'a>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!(
            "Parsed {} statement(s) with {} error(s)",
            statements.len(),
            self.errors.len()
        );

        statements
    }

    /// Parse a single expression followed by EOF (REPL convenience).
    pub fn parse_expression(&mut self) -> Option<Expr<'a>> {
        let result = self
            .expression()
            .and_then(|expr| match self.peek().token_type {
                TokenType::EOF => Ok(expr),
                _ => Err(LoxError::parse(self.peek(), "Expected end of expression.")),
            });

        match result {
            Ok(expr) => Some(expr),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<LoxError> {
        self.errors
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Option<Stmt<'a>> {
        debug!("Entering declaration at line {}", self.peek().line);

        let result = if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenType::TRAIT) {
            self.trait_declaration()
        } else if self.check(TokenType::FUN) && self.check_next(TokenType::IDENTIFIER) {
            self.advance();
            self.function("function").map(Stmt::Function)
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                debug!("Parse error, synchronizing: {}", e);

                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &'a Token<'a> = self.consume(TokenType::IDENTIFIER, "Expected class name.")?;

        let superclass: Option<Expr<'a>> = if self.matches(TokenType::LESS) {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expected superclass name.")?;

            Some(Expr::Variable {
                id: ExprId::fresh(),
                name: super_name,
            })
        } else {
            None
        };

        let body: ClassBody<'a> = self.class_body("class")?;

        debug!(
            "Parsed class '{}' with {} method(s)",
            name.lexeme,
            body.methods.len()
        );

        Ok(Stmt::Class {
            name,
            superclass,
            body,
        })
    }

    fn trait_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &'a Token<'a> = self.consume(TokenType::IDENTIFIER, "Expected trait name.")?;
        let body: ClassBody<'a> = self.class_body("trait")?;

        Ok(Stmt::Trait { name, body })
    }

    /// Members of a class or trait body, braces included.
    fn class_body(&mut self, kind: &str) -> Result<ClassBody<'a>> {
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body.", kind),
        )?;

        let mut body: ClassBody<'a> = ClassBody::default();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if self.matches(TokenType::USE) {
                loop {
                    let trait_name = self.consume(TokenType::IDENTIFIER, "Expected trait name.")?;

                    body.traits.push(Expr::Variable {
                        id: ExprId::fresh(),
                        name: trait_name,
                    });

                    if !self.matches(TokenType::COMMA) {
                        break;
                    }
                }

                self.consume(TokenType::SEMICOLON, "Expected ';' after trait list.")?;
            } else if self.matches(TokenType::CLASS) {
                body.class_methods.push(self.method()?);
            } else {
                body.methods.push(self.method()?);
            }
        }

        self.consume(
            TokenType::RIGHT_BRACE,
            &format!("Expected '}}' after {} body.", kind),
        )?;

        Ok(body)
    }

    /// A method, or a getter when the name is followed directly by `{`.
    fn method(&mut self) -> Result<FunctionDecl<'a>> {
        let name: &'a Token<'a> = self.consume(TokenType::IDENTIFIER, "Expected method name.")?;

        if self.matches(TokenType::LEFT_BRACE) {
            let body: Vec<Stmt<'a>> = self.function_body()?;

            return Ok(FunctionDecl {
                name: Some(name),
                params: Vec::new(),
                body,
                is_getter: true,
            });
        }

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after method name.")?;
        self.function_tail(Some(name), "method")
    }

    fn function(&mut self, kind: &str) -> Result<FunctionDecl<'a>> {
        let name: &'a Token<'a> =
            self.consume(TokenType::IDENTIFIER, &format!("Expected {} name.", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expected '(' after {} name.", kind),
        )?;

        self.function_tail(Some(name), kind)
    }

    /// Parameter list and body; the opening `(` is already consumed.
    fn function_tail(
        &mut self,
        name: Option<&'a Token<'a>>,
        kind: &str,
    ) -> Result<FunctionDecl<'a>> {
        let mut params: Vec<&'a Token<'a>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARGS {
                    let token = self.peek();
                    self.report(token, "Can't have more than 255 parameters.");
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expected parameter name.")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters.")?;
        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expected '{{' before {} body.", kind),
        )?;

        let body: Vec<Stmt<'a>> = self.function_body()?;

        Ok(FunctionDecl {
            name,
            params,
            body,
            is_getter: false,
        })
    }

    /// A block parsed with a fresh loop‑nesting counter, so `break` inside a
    /// function never binds to a loop around the function.
    fn function_body(&mut self) -> Result<Vec<Stmt<'a>>> {
        self.loop_depths.push(0);
        let body = self.block();
        self.loop_depths.pop();

        body
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name: &'a Token<'a> = self.consume(TokenType::IDENTIFIER, "Expected variable name.")?;

        let initializer: Option<Expr<'a>> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt<'a>> {
        debug!("Entering statement at line {}", self.peek().line);

        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::BREAK) {
            self.control_flow_statement(ControlFlow::Break)
        } else if self.matches(TokenType::CONTINUE) {
            self.control_flow_statement(ControlFlow::Continue)
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    fn for_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let body = Box::new(self.loop_body()?);

        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let expr: Expr<'a> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after if condition.")?;

        let then_branch: Box<Stmt<'a>> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt<'a>>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition: Expr<'a> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition.")?;

        let body: Box<Stmt<'a>> = Box::new(self.loop_body()?);

        Ok(Stmt::While { condition, body })
    }

    /// A statement parsed one loop level deeper.
    fn loop_body(&mut self) -> Result<Stmt<'a>> {
        self.adjust_loop_depth(1);
        let body = self.statement();
        self.adjust_loop_depth(-1);

        body
    }

    fn adjust_loop_depth(&mut self, delta: isize) {
        if let Some(depth) = self.loop_depths.last_mut() {
            *depth = depth.saturating_add_signed(delta);
        }
    }

    fn control_flow_statement(&mut self, kind: ControlFlow) -> Result<Stmt<'a>> {
        let keyword: &'a Token<'a> = self.previous();

        if self.loop_depths.last().copied().unwrap_or(0) == 0 {
            return Err(LoxError::parse(
                keyword,
                format!("Can't use '{}' outside of a loop.", keyword.lexeme),
            ));
        }

        self.consume(
            TokenType::SEMICOLON,
            &format!("Expected ';' after '{}'.", keyword.lexeme),
        )?;

        Ok(Stmt::ControlFlow { keyword, kind })
    }

    fn return_statement(&mut self) -> Result<Stmt<'a>> {
        let keyword: &'a Token<'a> = self.previous();
        let value: Option<Expr<'a>> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    /// Declarations up to the closing `}`; the opening `{` is already consumed.
    fn block(&mut self) -> Result<Vec<Stmt<'a>>> {
        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr<'a>> {
        self.comma()
    }

    fn comma(&mut self) -> Result<Expr<'a>> {
        self.left_binary(Self::assignment, &[TokenType::COMMA], false)
    }

    fn assignment(&mut self) -> Result<Expr<'a>> {
        let expr: Expr<'a> = self.conditional()?;

        if self.matches(TokenType::EQUAL) {
            let equals: &'a Token<'a> = self.previous();
            let value: Expr<'a> = self.assignment()?;

            return match expr {
                Expr::Variable { id, name } => Ok(Expr::Assign {
                    id,
                    name,
                    value: Box::new(value),
                }),

                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                }),

                other => {
                    // Reported, not thrown: the surrounding statement still parses.
                    self.report(equals, "Invalid assignment target.");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn conditional(&mut self) -> Result<Expr<'a>> {
        let condition: Expr<'a> = self.logical_or()?;

        if self.matches(TokenType::QUESTION) {
            let then_branch: Expr<'a> = self.expression()?;

            self.consume(
                TokenType::COLON,
                "Expected ':' after then branch of conditional expression.",
            )?;

            let else_branch: Expr<'a> = self.conditional()?;

            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(condition)
    }

    fn logical_or(&mut self) -> Result<Expr<'a>> {
        self.left_binary(Self::logical_and, &[TokenType::OR], true)
    }

    fn logical_and(&mut self) -> Result<Expr<'a>> {
        self.left_binary(Self::equality, &[TokenType::AND], true)
    }

    fn equality(&mut self) -> Result<Expr<'a>> {
        self.left_binary(
            Self::comparison,
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            false,
        )
    }

    fn comparison(&mut self) -> Result<Expr<'a>> {
        self.left_binary(
            Self::term,
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            false,
        )
    }

    fn term(&mut self) -> Result<Expr<'a>> {
        self.left_binary(Self::factor, &[TokenType::MINUS, TokenType::PLUS], false)
    }

    fn factor(&mut self) -> Result<Expr<'a>> {
        self.left_binary(Self::unary, &[TokenType::SLASH, TokenType::STAR], false)
    }

    /// One left‑associative level: `operand ( op operand )*`.
    fn left_binary(
        &mut self,
        operand: Operand<'a>,
        operators: &[TokenType],
        logical: bool,
    ) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = operand(self)?;

        while self.matches_any(operators) {
            let operator: &'a Token<'a> = self.previous();
            let right: Expr<'a> = operand(self)?;

            expr = if logical {
                Expr::Logical {
                    left: Box::new(expr),
                    operator,
                    right: Box::new(right),
                }
            } else {
                Expr::Binary {
                    left: Box::new(expr),
                    operator,
                    right: Box::new(right),
                }
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'a>> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: &'a Token<'a> = self.previous();
            let right: Expr<'a> = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr<'a>> {
        let mut expr: Expr<'a> = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: &'a Token<'a> =
                    self.consume(TokenType::IDENTIFIER, "Expected property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr<'a>) -> Result<Expr<'a>> {
        let mut arguments: Vec<Expr<'a>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    let token = self.peek();
                    self.report(token, "Can't have more than 255 arguments.");
                }

                // `assignment`, not `expression`: a comma separates arguments here.
                arguments.push(self.assignment()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: &'a Token<'a> =
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }
        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }
        if self.matches(TokenType::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if let TokenType::NUMBER(n) = self.peek().token_type {
            self.advance();
            return Ok(Expr::Literal(LiteralValue::Number(n)));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let s: String = s.clone();
            self.advance();
            return Ok(Expr::Literal(LiteralValue::Str(s)));
        }

        if self.matches(TokenType::THIS) {
            return Ok(Expr::This {
                id: ExprId::fresh(),
                keyword: self.previous(),
            });
        }

        if self.matches(TokenType::SUPER) {
            let keyword: &'a Token<'a> = self.previous();
            self.consume(TokenType::DOT, "Expected '.' after 'super'.")?;
            let method: &'a Token<'a> =
                self.consume(TokenType::IDENTIFIER, "Expected superclass method name.")?;

            return Ok(Expr::Super {
                id: ExprId::fresh(),
                keyword,
                method,
            });
        }

        if self.matches(TokenType::IDENTIFIER) {
            return Ok(Expr::Variable {
                id: ExprId::fresh(),
                name: self.previous(),
            });
        }

        if self.matches(TokenType::FUN) {
            let keyword: &'a Token<'a> = self.previous();
            self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'fun'.")?;
            let decl: FunctionDecl<'a> = self.function_tail(None, "function")?;

            return Ok(Expr::Function { keyword, decl });
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr<'a> = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        // Error productions: a binary operator with its left operand missing.
        // Report it, parse and discard the right operand, and carry on.
        let productions: [(&[TokenType], Operand<'a>); 5] = [
            (
                &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
                Self::comparison,
            ),
            (
                &[
                    TokenType::GREATER,
                    TokenType::GREATER_EQUAL,
                    TokenType::LESS,
                    TokenType::LESS_EQUAL,
                ],
                Self::term,
            ),
            (&[TokenType::PLUS], Self::factor),
            (&[TokenType::SLASH, TokenType::STAR], Self::unary),
            (&[TokenType::COMMA], Self::assignment),
        ];

        for (operators, operand) in productions {
            if self.matches_any(operators) {
                let operator: &'a Token<'a> = self.previous();
                self.report(operator, "Expected expression before operator.");
                operand(self)?;

                return Ok(Expr::Literal(LiteralValue::Nil));
            }
        }

        Err(LoxError::parse(self.peek(), "Expected expression."))
    }

    // ────────────────────── utility helpers ───────────────────────

    fn report(&mut self, token: &Token<'_>, message: &str) {
        debug!("Recording parse error at line {}: {}", token.line, message);

        self.errors.push(LoxError::parse(token, message));
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    fn matches_any(&mut self, types: &[TokenType]) -> bool {
        for ttype in types {
            if self.check(ttype.clone()) {
                self.advance();

                return true;
            }
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        Err(LoxError::parse(self.peek(), message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    fn check_next(&self, ttype: TokenType) -> bool {
        match self.tokens.get(self.current + 1) {
            Some(token) => token.token_type == ttype,
            None => false,
        }
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
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::TRAIT
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN
                | TokenType::BREAK
                | TokenType::CONTINUE => return,
                _ => {}
            }

            self.advance();
        }
    }
}
