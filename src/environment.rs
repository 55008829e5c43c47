use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Shared handle to a scope frame.  Closures and call frames that capture
/// the same frame observe each other's writes.
pub type EnvRef<'a> = Rc<RefCell<Environment<'a>>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Undefined variable '{0}'.")]
    Undefined(String),

    #[error("Access of uninitialized variable '{0}'.")]
    Uninitialized(String),
}

/// One lexical scope frame.  A binding of `None` was declared without an
/// initializer (`var a;`) and may be assigned but not read.
#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Option<Value<'a>>>,
    enclosing: Option<EnvRef<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef<'a>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn enclosing(&self) -> Option<&EnvRef<'a>> {
        self.enclosing.as_ref()
    }

    /// Introduce or overwrite `name` in this frame.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, Some(value));
    }

    /// Introduce `name` in this frame without a value.
    pub fn declare(&mut self, name: &'a str) {
        self.values.insert(name, None);
    }

    pub fn get(&self, name: &str) -> Result<Value<'a>, EnvError> {
        match self.values.get(name) {
            Some(binding) => Self::read(name, binding),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(EnvError::Undefined(name.to_string())),
            },
        }
    }

    pub fn assign(&mut self, name: &str, value: Value<'a>) -> Result<(), EnvError> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = Some(value);
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    /// Read `name` from the frame exactly `distance` hops up, without
    /// searching further.
    pub fn get_at(env: &EnvRef<'a>, distance: usize, name: &str) -> Result<Value<'a>, EnvError> {
        let target: EnvRef<'a> = Self::ancestor(env, distance);
        let frame = target.borrow();

        match frame.values.get(name) {
            Some(binding) => Self::read(name, binding),
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    pub fn assign_at(
        env: &EnvRef<'a>,
        distance: usize,
        name: &str,
        value: Value<'a>,
    ) -> Result<(), EnvError> {
        let target: EnvRef<'a> = Self::ancestor(env, distance);
        let mut frame = target.borrow_mut();

        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(EnvError::Undefined(name.to_string())),
        }
    }

    /// A detached copy of this frame's bindings with the same parent.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// The frame `distance` hops up the chain.
    ///
    /// # Panics
    ///
    /// If the chain is shorter than `distance`: the resolver and the
    /// interpreter disagree about scope nesting.
    fn ancestor(env: &EnvRef<'a>, distance: usize) -> EnvRef<'a> {
        let mut current: EnvRef<'a> = Rc::clone(env);

        for hop in 0..distance {
            let next: EnvRef<'a> = match current.borrow().enclosing.as_ref() {
                Some(enclosing) => Rc::clone(enclosing),
                None => panic!(
                    "scope chain ended after {} of {} hops: resolver and interpreter disagree",
                    hop, distance
                ),
            };
            current = next;
        }

        current
    }

    fn read(name: &str, binding: &Option<Value<'a>>) -> Result<Value<'a>, EnvError> {
        binding
            .clone()
            .ok_or_else(|| EnvError::Uninitialized(name.to_string()))
    }
}
