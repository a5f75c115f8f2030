use crate::eval::object::Object;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Shared handle to a scope. Closures keep their defining scope alive through it.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            outer: None,
        }
    }

    pub fn new_with_outer(outer: Env) -> Self {
        Self {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    pub fn into_shared(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    /// Looks `name` up in this scope, then in each enclosing scope outward.
    pub fn get(&self, name: &str) -> Option<Object> {
        self.store.get(name).cloned().or_else(|| {
            self.outer
                .as_ref()
                .and_then(|outer| outer.borrow().get(name))
        })
    }

    /// Binds in this scope only; an outer binding of the same name is shadowed.
    pub fn set(&mut self, name: &str, value: Object) {
        self.store.insert(name.to_string(), value);
    }
}
