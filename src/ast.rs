//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Both node families are closed enums; the resolver, interpreter and AST
//! printer each match them exhaustively.  Nodes borrow their tokens from the
//! scanner's output, so an AST lives exactly as long as its token buffer.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a name‑resolving expression, independent of its structure.
///
/// Ids come from a process‑wide counter so that separate parses (e.g. REPL
/// lines feeding one interpreter) never collide in the resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// Parameters and body shared by function declarations, function literals,
/// methods and getters.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    /// `None` for anonymous function literals.
    pub name: Option<&'a Token<'a>>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<&'a Token<'a>>,

    pub body: Vec<Stmt<'a>>,

    /// Declared without a parameter list: `area { … }`.
    pub is_getter: bool,
}

/// Members shared by `class` and `trait` bodies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassBody<'a> {
    /// `use A, B;` clauses, each an [`Expr::Variable`].
    pub traits: Vec<Expr<'a>>,

    /// Instance methods and getters.
    pub methods: Vec<FunctionDecl<'a>>,

    /// Methods declared with the `class` prefix.
    pub class_methods: Vec<FunctionDecl<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// `!isReady` or `-42`
    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Arithmetic, comparison, equality and the comma operator.
    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// `condition ? then_branch : else_branch`
    Conditional {
        condition: Box<Expr<'a>>,
        then_branch: Box<Expr<'a>>,
        else_branch: Box<Expr<'a>>,
    },

    Variable {
        id: ExprId,
        name: &'a Token<'a>,
    },

    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// Anonymous `fun (params) { body }`.
    Function {
        keyword: &'a Token<'a>,
        decl: FunctionDecl<'a>,
    },

    /// object.property
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// object.property = value
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    This {
        id: ExprId,
        keyword: &'a Token<'a>,
    },

    /// super.method
    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    Expression(Expr<'a>),

    Print(Expr<'a>),

    /// `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// Kept structured so `continue` can still run the increment.
    For {
        initializer: Option<Box<Stmt<'a>>>,
        condition: Option<Expr<'a>>,
        increment: Option<Expr<'a>>,
        body: Box<Stmt<'a>>,
    },

    /// `break;` or `continue;`
    ControlFlow {
        keyword: &'a Token<'a>,
        kind: ControlFlow,
    },

    Function(FunctionDecl<'a>),

    Return {
        keyword: &'a Token<'a>,
        value: Option<Expr<'a>>,
    },

    Class {
        name: &'a Token<'a>,
        /// Always an [`Expr::Variable`] when present.
        superclass: Option<Expr<'a>>,
        body: ClassBody<'a>,
    },

    Trait {
        name: &'a Token<'a>,
        body: ClassBody<'a>,
    },
}
