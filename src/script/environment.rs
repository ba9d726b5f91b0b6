//! Named-binding environments
//!
//! An [`Environment`] is a handle to a shared table of bindings: functions
//! defined in it keep a [`WeakEnvironment`] back to it so they can resolve
//! globals at call time without keeping a discarded environment alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::builtins::BaseScope;
use super::value::{Module, Value};

#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: Rc<RefCell<HashMap<String, Value>>>,
}

impl Environment {
    /// An environment with no bindings at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh environment holding a copy of the base scope
    pub fn from_base(base: &BaseScope) -> Self {
        let env = Self::empty();
        for (name, value) in base.iter() {
            env.set(name, value.clone());
        }
        env
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// All bound names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Rebind every name holding `old` to `new`, returning how many changed
    pub fn replace_module(&self, old: &Rc<Module>, new: &Rc<Module>) -> usize {
        let mut replaced = 0;
        for value in self.bindings.borrow_mut().values_mut() {
            if matches!(value, Value::Module(m) if Rc::ptr_eq(m, old)) {
                *value = Value::Module(Rc::clone(new));
                replaced += 1;
            }
        }
        replaced
    }

    pub fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment {
            bindings: Rc::downgrade(&self.bindings),
        }
    }

    /// Whether two handles refer to the same bindings
    pub fn same_as(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }
}

/// Non-owning handle to an [`Environment`]
#[derive(Debug, Clone)]
pub struct WeakEnvironment {
    bindings: Weak<RefCell<HashMap<String, Value>>>,
}

impl WeakEnvironment {
    pub fn upgrade(&self) -> Option<Environment> {
        self.bindings
            .upgrade()
            .map(|bindings| Environment { bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_base_copies_rather_than_aliases() {
        let base = BaseScope::capture();
        let first = Environment::from_base(&base);
        let second = Environment::from_base(&base);

        first.set("x", Value::Int(1));
        assert!(first.contains("print"));
        assert!(!second.contains("x"));
        assert!(!first.same_as(&second));
    }

    #[test]
    fn weak_handle_dies_with_environment() {
        let env = Environment::empty();
        let weak = env.downgrade();
        assert!(weak.upgrade().is_some());
        drop(env);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn names_are_sorted() {
        let env = Environment::empty();
        env.set("b", Value::Nil);
        env.set("a", Value::Nil);
        assert_eq!(env.names(), vec!["a".to_string(), "b".to_string()]);
    }
}
