//! Static resolver pass for the **Rox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of name → [`Local`] maps tracking
//!    declared / defined / read).
//! 2. Report static errors (redeclaration, read in own initializer, invalid
//!    `return`, `this`/`super` misuse, unused locals).  Errors are collected
//!    and the walk continues, so one pass reports all of them.
//! 3. Tell the interpreter, for *each* local variable occurrence, how many
//!    scopes separate it from its binding.  Occurrences left unrecorded are
//!    globals.

use crate::ast::{ClassBody, ControlFlow, Expr, ExprId, FunctionDecl, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::mem;

/// What kind of function body we are in.  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body we are in.  Used to validate `this` and `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VarState {
    Declared,
    Defined,
    Read,
}

#[derive(Debug)]
struct Local<'a> {
    /// `None` for the implicit `this` / `super` bindings.
    token: Option<&'a Token<'a>>,
    state: VarState,

    /// Report the binding if it goes out of scope unread.
    must_be_read: bool,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'a, 'interp> {
    interpreter: &'interp mut Interpreter<'a>,
    scopes: Vec<HashMap<&'a str, Local<'a>>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
    errors: Vec<LoxError>,
}

impl<'a, 'interp> Resolver<'a, 'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter<'a>) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements.  Returns every static error found.
    pub fn resolve(&mut self, statements: &'a [Stmt<'a>]) -> Result<(), Vec<LoxError>> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            info!("Resolve pass found {} error(s)", self.errors.len());
            Err(mem::take(&mut self.errors))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'a Stmt<'a>) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name, true);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // name is visible *inside* its own body
                if let Some(name) = decl.name {
                    self.declare(name, true);
                    self.define(name);
                }
                self.resolve_function(decl, FunctionType::Function);
            }

            Stmt::Class {
                name,
                superclass,
                body,
            } => self.resolve_class(name, superclass.as_ref(), body),

            Stmt::Trait { name, body } => {
                self.declare(name, true);
                self.define(name);

                let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);
                for used in &body.traits {
                    self.resolve_expr(used);
                }
                self.resolve_methods(body);
                self.current_class = enclosing_class;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_loop_body(body);
            }

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                // one scope shared by the initializer, condition, increment and body
                self.begin_scope();
                if let Some(init) = initializer {
                    self.resolve_stmt(init);
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition);
                }
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.resolve_loop_body(body);
                self.end_scope();
            }

            Stmt::ControlFlow { keyword, kind } => {
                if self.loop_depth == 0 {
                    let word = match kind {
                        ControlFlow::Break => "break",
                        ControlFlow::Continue => "continue",
                    };
                    self.error(keyword, format!("Can't use '{}' outside of a loop.", word));
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_stmts(&mut self, statements: &'a [Stmt<'a>]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_loop_body(&mut self, body: &'a Stmt<'a>) {
        self.loop_depth += 1;
        self.resolve_stmt(body);
        self.loop_depth -= 1;
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        body: &'a ClassBody<'a>,
    ) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(name, true);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);
        }

        // `use` clauses are evaluated before the `super` frame exists
        for used in &body.traits {
            self.resolve_expr(used);
        }

        if superclass.is_some() {
            self.begin_scope();
            self.bind_implicit("super");
        }

        self.resolve_methods(body);

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    /// Methods and class methods, in a scope binding `this`.
    fn resolve_methods(&mut self, body: &'a ClassBody<'a>) {
        self.begin_scope();
        self.bind_implicit("this");

        for method in &body.methods {
            let kind = match method.name {
                Some(name) if name.lexeme == "init" => FunctionType::Initializer,
                _ => FunctionType::Method,
            };
            self.resolve_function(method, kind);
        }

        for method in &body.class_methods {
            self.resolve_function(method, FunctionType::Method);
        }

        self.end_scope();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'a Expr<'a>) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(name.lexeme))
                    .is_some_and(|local| local.state == VarState::Declared);

                if in_own_initializer {
                    self.error(name, "Can't read local variable in its own initializer.");
                }

                self.resolve_local(*id, name, true);
            }

            Expr::Assign { id, name, value } => {
                // RHS first, then bind LHS; a write does not count as a read
                self.resolve_expr(value);
                self.resolve_local(*id, name, false);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }

            Expr::Function { decl, .. } => self.resolve_function(decl, FunctionType::Function),

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, keyword, true);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassType::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(*id, keyword, true);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.  Loops
    /// enclosing the declaration do not extend into the body.
    fn resolve_function(&mut self, decl: &'a FunctionDecl<'a>, kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);
        let enclosing_loops = mem::replace(&mut self.loop_depth, 0);

        self.begin_scope();
        for &param in &decl.params {
            self.declare(param, false);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.loop_depth = enclosing_loops;
        self.current_function = enclosing_function;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope, reporting locals that were never read.
    fn end_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };

        let mut unused: Vec<&'a Token<'a>> = scope
            .values()
            .filter(|local| local.must_be_read && local.state != VarState::Read)
            .filter_map(|local| local.token)
            .collect();
        unused.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.lexeme.cmp(b.lexeme)));

        for token in unused {
            self.error(
                token,
                format!("Local variable '{}' is never used.", token.lexeme),
            );
        }
    }

    fn declare(&mut self, name: &'a Token<'a>, must_be_read: bool) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(name.lexeme) {
            self.error(name, "Already a variable with this name in this scope.");
            return;
        }

        scope.insert(
            name.lexeme,
            Local {
                token: Some(name),
                state: VarState::Declared,
                must_be_read,
            },
        );
    }

    fn define(&mut self, name: &Token<'a>) {
        if let Some(local) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(name.lexeme))
        {
            if local.state == VarState::Declared {
                local.state = VarState::Defined;
            }
        }
    }

    /// Bind `this` or `super` in the innermost scope.
    fn bind_implicit(&mut self, name: &'static str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name,
                Local {
                    token: None,
                    state: VarState::Read,
                    must_be_read: false,
                },
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d`, or leave it global if
    /// no enclosing scope binds the name.
    fn resolve_local(&mut self, id: ExprId, name: &Token<'a>, is_read: bool) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(local) = scope.get_mut(name.lexeme) {
                if is_read {
                    local.state = VarState::Read;
                }
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }

    fn error<S: Into<String>>(&mut self, token: &Token<'_>, message: S) {
        let error = LoxError::resolve(token, message);
        debug!("Resolve error: {}", error);
        self.errors.push(error);
    }
}
