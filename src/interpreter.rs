//! Tree-walking evaluator for resolved Rox programs.
//!
//! Variable lookups use the binding distances recorded by the
//! [`Resolver`](crate::resolver::Resolver) through [`Interpreter::note_local`];
//! an expression without a recorded distance is global.  Non-local control
//! flow (`return`, `break`, `continue`) travels as a [`Flow`] value, never as
//! an error.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ClassBody, ControlFlow, Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{Function, NativeFunction};
use crate::class::{Class, Instance, MethodTable, Trait};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::natives;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
    Break,
    Continue,
}

pub struct Interpreter<'a> {
    globals: EnvRef<'a>,
    environment: EnvRef<'a>,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    /// Interpreter printing to stdout, with the standard natives installed.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Interpreter printing to `output`, with the standard natives installed.
    pub fn with_output(output: Box<dyn Write + 'a>) -> Self {
        let mut interpreter = Self::bare(output);
        natives::install(&mut interpreter);
        interpreter
    }

    /// Interpreter with an empty global scope.
    pub fn bare(output: Box<dyn Write + 'a>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef<'a> = Rc::new(RefCell::new(Environment::new()));

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Register a host function under a global name.
    pub fn define_native<F>(&mut self, name: &'a str, arity: usize, func: F)
    where
        F: Fn(&mut Interpreter<'a>, &[Value<'a>]) -> Result<Value<'a>> + 'a,
    {
        debug!("Defining native function '{}' ({} params)", name, arity);

        let native = NativeFunction::new(name, arity, Box::new(func));
        self.globals
            .borrow_mut()
            .define(name, Value::NativeFunction(Rc::new(native)));
    }

    /// Called by the resolver: `id` refers to a binding `depth` frames up.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {:?} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Sink for `print` and the `input` prompt.
    pub fn output(&mut self) -> &mut (dyn Write + 'a) {
        self.output.as_mut()
    }

    /// Execute a resolved program.  Stops at the first runtime error; the
    /// interpreter is left usable with the global scope current.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                self.environment = Rc::clone(&self.globals);
                return Err(e);
            }
        }

        self.output.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    fn execute(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                match initializer {
                    Some(expr) => {
                        let value = self.evaluate(expr)?;
                        debug!("Variable '{}' defined with value: {}", name.lexeme, value);
                        self.environment.borrow_mut().define(name.lexeme, value);
                    }
                    None => {
                        debug!("Variable '{}' declared uninitialized", name.lexeme);
                        self.environment.borrow_mut().declare(name.lexeme);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let block = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, Rc::new(RefCell::new(block)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                let loop_env = Environment::with_enclosing(Rc::clone(&self.environment));
                let previous = mem::replace(&mut self.environment, Rc::new(RefCell::new(loop_env)));

                let result = self.execute_for(initializer.as_deref(), condition, increment, body);

                self.environment = previous;
                result
            }

            Stmt::ControlFlow { kind, .. } => Ok(match kind {
                ControlFlow::Break => Flow::Break,
                ControlFlow::Continue => Flow::Continue,
            }),

            Stmt::Function(decl) => {
                let function = Function::new(decl, Rc::clone(&self.environment), false);
                if let Some(name) = decl.name {
                    debug!("Defining function '{}'", name.lexeme);
                    self.environment
                        .borrow_mut()
                        .define(name.lexeme, Value::Function(Rc::new(function)));
                }
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                body,
            } => self.declare_class(name, superclass.as_ref(), body),

            Stmt::Trait { name, body } => self.declare_trait(name, body),
        }
    }

    /// Run `statements` with `environment` current, restoring the previous
    /// environment on every exit path.
    pub(crate) fn execute_block(
        &mut self,
        statements: &'a [Stmt<'a>],
        environment: EnvRef<'a>,
    ) -> Result<Flow<'a>> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    /// Loop part of a `for`; the caller has already pushed the loop scope.
    /// Each iteration's closures keep the frame they saw: after the body, the
    /// loop continues in a fresh copy of that frame before the increment.
    fn execute_for(
        &mut self,
        initializer: Option<&'a Stmt<'a>>,
        condition: &'a Option<Expr<'a>>,
        increment: &'a Option<Expr<'a>>,
        body: &'a Stmt<'a>,
    ) -> Result<Flow<'a>> {
        if let Some(init) = initializer {
            self.execute(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute(body)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }

            let next = self.environment.borrow().snapshot();
            self.environment = Rc::new(RefCell::new(next));

            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }

        Ok(Flow::Normal)
    }

    fn declare_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        body: &'a ClassBody<'a>,
    ) -> Result<Flow<'a>> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<Rc<Class<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    return Err(LoxError::runtime(
                        Some(name_of(expr).unwrap_or(name)),
                        "Superclass must be a class.",
                    ))
                }
            },
            None => None,
        };

        let (mut methods, mut class_methods) = self.use_traits(&body.traits)?;

        let enclosing = Rc::clone(&self.environment);
        if let Some(superclass) = &superclass {
            let mut env = Environment::with_enclosing(Rc::clone(&enclosing));
            env.define("super", Value::Class(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(env));
        }

        for decl in &body.class_methods {
            class_methods.insert(method_name(decl), self.method(decl, false));
        }

        let metaclass = Class::new(
            format!("{} meta", name.lexeme),
            None,
            superclass
                .as_ref()
                .and_then(|superclass| superclass.metaclass().cloned()),
            class_methods,
        );

        for decl in &body.methods {
            let name = method_name(decl);
            methods.insert(name, self.method(decl, name == "init"));
        }

        let class = Class::new(name.lexeme, Some(Rc::new(metaclass)), superclass, methods);

        self.environment = enclosing;
        self.environment
            .borrow_mut()
            .define(name.lexeme, Value::Class(Rc::new(class)));

        info!("Class '{}' defined", name.lexeme);
        Ok(Flow::Normal)
    }

    fn declare_trait(&mut self, name: &'a Token<'a>, body: &'a ClassBody<'a>) -> Result<Flow<'a>> {
        debug!("Declaring trait '{}'", name.lexeme);

        let (mut methods, mut class_methods) = self.use_traits(&body.traits)?;

        for decl in &body.class_methods {
            let method = method_name(decl);
            if class_methods.contains_key(method) {
                return Err(LoxError::runtime(
                    decl.name.or(Some(name)),
                    format!(
                        "A previously used trait already provides class method '{}'.",
                        method
                    ),
                ));
            }
            class_methods.insert(method, self.method(decl, false));
        }

        for decl in &body.methods {
            let method = method_name(decl);
            if methods.contains_key(method) {
                return Err(LoxError::runtime(
                    decl.name.or(Some(name)),
                    format!(
                        "A previously used trait already provides method '{}'.",
                        method
                    ),
                ));
            }
            methods.insert(method, self.method(decl, method == "init"));
        }

        let t = Trait::new(name.lexeme, methods, class_methods);
        self.environment
            .borrow_mut()
            .define(name.lexeme, Value::Trait(Rc::new(t)));

        info!("Trait '{}' defined", name.lexeme);
        Ok(Flow::Normal)
    }

    /// Merge the methods of every trait in a `use` clause.  Two traits that
    /// provide the same name are a conflict.
    fn use_traits(&mut self, traits: &'a [Expr<'a>]) -> Result<(MethodTable<'a>, MethodTable<'a>)> {
        let mut methods: MethodTable<'a> = HashMap::new();
        let mut class_methods: MethodTable<'a> = HashMap::new();

        for expr in traits {
            let token: Option<&Token<'_>> = name_of(expr);

            let t = match self.evaluate(expr)? {
                Value::Trait(t) => t,
                other => {
                    let shown = token.map_or_else(|| other.to_string(), |t| t.lexeme.to_string());
                    return Err(LoxError::runtime(
                        token,
                        format!("'{}' is not a trait.", shown),
                    ));
                }
            };

            for (&method, function) in t.methods() {
                if methods.insert(method, Rc::clone(function)).is_some() {
                    return Err(LoxError::runtime(
                        token,
                        format!(
                            "A previously used trait already provides method '{}'.",
                            method
                        ),
                    ));
                }
            }

            for (&method, function) in t.class_methods() {
                if class_methods.insert(method, Rc::clone(function)).is_some() {
                    return Err(LoxError::runtime(
                        token,
                        format!(
                            "A previously used trait already provides class method '{}'.",
                            method
                        ),
                    ));
                }
            }
        }

        Ok((methods, class_methods))
    }

    fn method(&self, decl: &'a FunctionDecl<'a>, is_initializer: bool) -> Rc<Function<'a>> {
        Rc::new(Function::new(
            decl,
            Rc::clone(&self.environment),
            is_initializer,
        ))
    }

    /// Evaluate an expression to a value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                self.evaluate_unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.evaluate_binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let decided = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                let assigned = match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name.lexeme, value.clone())
                    }
                    None => self.globals.borrow_mut().assign(name.lexeme, value.clone()),
                };
                assigned.map_err(|e| LoxError::runtime(Some(name), e.to_string()))?;

                debug!("Assigned value {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.invoke_callable(callee, paren, values)
            }

            Expr::Function { decl, .. } => Ok(Value::Function(Rc::new(Function::new(
                decl,
                Rc::clone(&self.environment),
                false,
            )))),

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                self.get_property(object, name)
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                let holder: &Instance<'a> = object
                    .as_instance()
                    .ok_or_else(|| LoxError::runtime(Some(name), "Only instances have fields."))?;

                let value = self.evaluate(value)?;
                holder.set_field(name.lexeme, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token<'_>, right: Value<'a>) -> Result<Value<'a>> {
        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(Some(operator), "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(Some(operator), "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(
        &mut self,
        operator: &Token<'_>,
        left: Value<'a>,
        right: Value<'a>,
    ) -> Result<Value<'a>> {
        match operator.token_type {
            TokenType::COMMA => Ok(right),

            TokenType::PLUS => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::from(format!("{}{}", left, right)))
                }
                _ => Err(LoxError::runtime(
                    Some(operator),
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                if b == 0.0 {
                    return Err(LoxError::runtime(Some(operator), "Division by zero."));
                }
                Ok(Value::Number(a / b))
            }

            TokenType::GREATER
            | TokenType::GREATER_EQUAL
            | TokenType::LESS
            | TokenType::LESS_EQUAL => {
                let ordering = compare(operator, &left, &right)?;
                let result = match operator.token_type {
                    TokenType::GREATER => ordering == Some(Ordering::Greater),
                    TokenType::GREATER_EQUAL => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                    TokenType::LESS => ordering == Some(Ordering::Less),
                    _ => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                };
                Ok(Value::Bool(result))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(Some(operator), "Invalid binary operator.")),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token<'_>) -> Result<Value<'a>> {
        let value = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name.lexeme),
            None => self.globals.borrow().get(name.lexeme),
        };

        value.map_err(|e| LoxError::runtime(Some(name), e.to_string()))
    }

    /// Fields shadow methods.  Methods come back bound to `object`; getters
    /// run immediately.
    fn get_property(&mut self, object: Value<'a>, name: &Token<'_>) -> Result<Value<'a>> {
        let holder: &Instance<'a> = object
            .as_instance()
            .ok_or_else(|| LoxError::runtime(Some(name), "Only instances have properties."))?;

        if let Some(value) = holder.get_field(name.lexeme) {
            return Ok(value);
        }

        let method = holder.find_method(name.lexeme).ok_or_else(|| {
            LoxError::runtime(
                Some(name),
                format!("Undefined property '{}'.", name.lexeme),
            )
        })?;

        let bound = method.bind(object.clone());
        self.finish_binding(bound)
    }

    /// `super.m` from an instance method looks in the superclass; from a
    /// class method it looks in the superclass's metaclass.
    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token<'_>,
        method: &Token<'_>,
    ) -> Result<Value<'a>> {
        let distance = *self
            .locals
            .get(&id)
            .expect("'super' expression was not resolved");

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Ok(Value::Class(class)) => class,
            _ => panic!("'super' is not bound to a class"),
        };

        let receiver = Environment::get_at(&self.environment, distance - 1, "this")
            .map_err(|e| LoxError::runtime(Some(keyword), e.to_string()))?;

        let lookup: Option<Rc<Class<'a>>> = match receiver {
            Value::Class(_) => superclass.metaclass().cloned(),
            _ => Some(superclass),
        };

        let found = lookup
            .and_then(|class| class.find_method(method.lexeme))
            .ok_or_else(|| {
                LoxError::runtime(
                    Some(method),
                    format!("Undefined property '{}'.", method.lexeme),
                )
            })?;

        self.finish_binding(found.bind(receiver))
    }

    fn finish_binding(&mut self, bound: Function<'a>) -> Result<Value<'a>> {
        if bound.is_getter() {
            bound.call(self, Vec::new())
        } else {
            Ok(Value::Function(Rc::new(bound)))
        }
    }

    /// Call a function, native or class (construction) with evaluated
    /// arguments.
    pub fn invoke_callable(
        &mut self,
        callee: Value<'a>,
        paren: &Token<'_>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        match callee {
            Value::Function(function) => {
                check_arity(paren, function.arity(), arguments.len())?;
                function.call(self, arguments)
            }

            Value::NativeFunction(native) => {
                check_arity(paren, native.arity(), arguments.len())?;
                native.call(self, &arguments)
            }

            Value::Class(class) => {
                check_arity(paren, class.arity(), arguments.len())?;

                let instance = Value::Instance(Rc::new(Instance::new(Some(Rc::clone(&class)))));
                if let Some(init) = class.find_method("init") {
                    init.bind(instance.clone()).call(self, arguments)?;
                }

                debug!("Constructed {}", instance);
                Ok(instance)
            }

            _ => Err(LoxError::runtime(
                Some(paren),
                "Can only call functions and classes.",
            )),
        }
    }
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arity(paren: &Token<'_>, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(LoxError::runtime(
            Some(paren),
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }
    Ok(())
}

fn number_operands(operator: &Token<'_>, left: &Value<'_>, right: &Value<'_>) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(Some(operator), "Operands must be numbers.")),
    }
}

/// Numbers, strings and booleans order among themselves; `None` means the
/// numbers were unordered (NaN).
fn compare<'v>(
    operator: &Token<'_>,
    left: &Value<'v>,
    right: &Value<'v>,
) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        _ if mem::discriminant(left) == mem::discriminant(right) => Err(LoxError::runtime(
            Some(operator),
            "Operands of this type cannot be ordered.",
        )),
        _ => Err(LoxError::runtime(
            Some(operator),
            "Operands must be of the same type to compare.",
        )),
    }
}

fn method_name<'a>(decl: &FunctionDecl<'a>) -> &'a str {
    decl.name.map_or("", |token| token.lexeme)
}

/// The token of a `Variable` expression, for error locations.
fn name_of<'a>(expr: &'a Expr<'a>) -> Option<&'a Token<'a>> {
    match expr {
        Expr::Variable { name, .. } => Some(*name),
        _ => None,
    }
}
