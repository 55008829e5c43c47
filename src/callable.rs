//! Callable runtime objects: user functions (closures, methods, getters) and
//! host-provided native functions.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// A user-defined function value: its declaration plus the environment that
/// was current when the declaration executed.
#[derive(Clone)]
pub struct Function<'a> {
    decl: &'a FunctionDecl<'a>,
    closure: EnvRef<'a>,
    is_initializer: bool,
}

impl<'a> Function<'a> {
    pub fn new(decl: &'a FunctionDecl<'a>, closure: EnvRef<'a>, is_initializer: bool) -> Self {
        Function {
            decl,
            closure,
            is_initializer,
        }
    }

    /// `None` for anonymous function literals.
    pub fn name(&self) -> Option<&'a str> {
        self.decl.name.map(|token| token.lexeme)
    }

    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    pub fn is_getter(&self) -> bool {
        self.decl.is_getter
    }

    /// A copy of this function whose closure has one extra frame binding
    /// `this` to `receiver`.
    pub fn bind(&self, receiver: Value<'a>) -> Function<'a> {
        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));
        env.define("this", receiver);

        Function {
            decl: self.decl,
            closure: Rc::new(RefCell::new(env)),
            is_initializer: self.is_initializer,
        }
    }

    /// Run the body in a fresh frame holding the parameters.
    ///
    /// Arity is checked by the caller.  An initializer always yields the
    /// bound receiver, including on a bare `return;`.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!(
            "Calling function '{}' with {} argument(s)",
            self.name().unwrap_or("<anonymous>"),
            arguments.len()
        );

        let decl: &'a FunctionDecl<'a> = self.decl;

        let mut frame = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in decl.params.iter().zip(arguments) {
            frame.define(param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&decl.body, Rc::new(RefCell::new(frame)))?;

        if self.is_initializer {
            return Environment::get_at(&self.closure, 0, "this")
                .map_err(|e| LoxError::runtime(None, e.to_string()));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
            Flow::Break | Flow::Continue => {
                unreachable!("loop control escaped a function body")
            }
        }
    }
}

impl<'a> fmt::Debug for Function<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("is_initializer", &self.is_initializer)
            .field("is_getter", &self.is_getter())
            .finish()
    }
}

/// Host callback signature for native functions.
pub type NativeFn<'a> = dyn Fn(&mut Interpreter<'a>, &[Value<'a>]) -> Result<Value<'a>> + 'a;

pub struct NativeFunction<'a> {
    name: &'a str,
    arity: usize,
    func: Box<NativeFn<'a>>,
}

impl<'a> NativeFunction<'a> {
    pub fn new(name: &'a str, arity: usize, func: Box<NativeFn<'a>>) -> Self {
        NativeFunction { name, arity, func }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: &[Value<'a>],
    ) -> Result<Value<'a>> {
        debug!("Calling native function '{}'", self.name);
        (self.func)(interpreter, arguments)
    }
}

impl<'a> fmt::Debug for NativeFunction<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
