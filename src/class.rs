//! Classes, instances and traits.
//!
//! Static members are modelled by composition: every class owns a `statics`
//! instance whose class is the *metaclass* (`"Name meta"`).  Static methods
//! live on the metaclass, static fields in the `statics` field map, and the
//! metaclass's superclass is the superclass's metaclass, so class methods
//! are inherited the same way instance methods are.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::callable::Function;
use crate::value::Value;

/// Method name → function, as stored on classes and traits.
pub type MethodTable<'a> = HashMap<&'a str, Rc<Function<'a>>>;

#[derive(Debug)]
pub struct Class<'a> {
    name: String,
    superclass: Option<Rc<Class<'a>>>,
    methods: MethodTable<'a>,
    statics: Instance<'a>,
}

impl<'a> Class<'a> {
    pub fn new(
        name: impl Into<String>,
        metaclass: Option<Rc<Class<'a>>>,
        superclass: Option<Rc<Class<'a>>>,
        methods: MethodTable<'a>,
    ) -> Self {
        Class {
            name: name.into(),
            superclass,
            methods,
            statics: Instance::new(metaclass),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metaclass(&self) -> Option<&Rc<Class<'a>>> {
        self.statics.class()
    }

    /// Holder of static fields; its class is the metaclass.
    pub fn statics(&self) -> &Instance<'a> {
        &self.statics
    }

    /// Own methods first, then the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function<'a>>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Arity of `init` (inherited or own), or 0.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

#[derive(Debug)]
pub struct Instance<'a> {
    class: Option<Rc<Class<'a>>>,
    fields: RefCell<HashMap<&'a str, Value<'a>>>,
}

impl<'a> Instance<'a> {
    pub fn new(class: Option<Rc<Class<'a>>>) -> Self {
        Instance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> Option<&Rc<Class<'a>>> {
        self.class.as_ref()
    }

    pub fn get_field(&self, name: &str) -> Option<Value<'a>> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: &'a str, value: Value<'a>) {
        self.fields.borrow_mut().insert(name, value);
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<Function<'a>>> {
        self.class.as_ref().and_then(|class| class.find_method(name))
    }
}

/// A named bundle of methods and class methods, mixed into classes with
/// `use`.
#[derive(Debug)]
pub struct Trait<'a> {
    name: &'a str,
    methods: MethodTable<'a>,
    class_methods: MethodTable<'a>,
}

impl<'a> Trait<'a> {
    pub fn new(name: &'a str, methods: MethodTable<'a>, class_methods: MethodTable<'a>) -> Self {
        Trait {
            name,
            methods,
            class_methods,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn methods(&self) -> &MethodTable<'a> {
        &self.methods
    }

    pub fn class_methods(&self) -> &MethodTable<'a> {
        &self.class_methods
    }
}
