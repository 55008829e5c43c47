use std::fmt;
use std::rc::Rc;

use crate::callable::{Function, NativeFunction};
use crate::class::{Class, Instance, Trait};

/// Every value a Rox program can observe.
///
/// Heap objects are reference counted; cloning a `Value` never deep‑copies.
#[derive(Clone)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function<'a>>),
    NativeFunction(Rc<NativeFunction<'a>>),
    Class(Rc<Class<'a>>),
    Instance(Rc<Instance<'a>>),
    Trait(Rc<Trait<'a>>),
}

impl<'a> Value<'a> {
    /// `nil` and `false` are falsey; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The field/method holder behind a property access: an instance, or the
    /// static part of a class.
    pub fn as_instance(&self) -> Option<&Instance<'a>> {
        match self {
            Value::Instance(instance) => Some(instance),
            Value::Class(class) => Some(class.statics()),
            _ => None,
        }
    }
}

impl<'a> From<&str> for Value<'a> {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl<'a> From<String> for Value<'a> {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl<'a> PartialEq for Value<'a> {
    /// Plain value equality without coercion; objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Trait(a), Value::Trait(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    // `-0` prints as `0`
                    write!(f, "{:.0}", n + 0.0)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Function(function) => match function.name() {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name()),

            Value::Class(class) => write!(f, "<class {}>", class.name()),

            Value::Instance(instance) => match instance.class() {
                Some(class) => write!(f, "<instance {}>", class.name()),
                None => write!(f, "<instance>"),
            },

            Value::Trait(t) => write!(f, "<trait {}>", t.name()),
        }
    }
}

impl<'a> fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}
