//! Lexical-scope environments.
//!
//! An environment is a node in a parent-linked tree mapping names to values,
//! with a set of names flagged constant. Nodes are shared via
//! `Rc<RefCell<..>>` because closures created inside a scope keep that scope
//! alive after its creator returns, and the same scope is legitimately
//! reachable from multiple closures and stack frames at once. Parents never
//! point back at children, so the `Rc` graph stays acyclic along the scope
//! chain itself.

use crate::error::{KinError, Result};
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    constants: HashSet<String>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            constants: HashSet::new(),
            parent: None,
        }
    }

    /// A child scope delegating resolution to `parent`.
    pub fn with_parent(parent: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            constants: HashSet::new(),
            parent: Some(parent),
        }
    }

    /// Convenience: a fresh shared child of an already-shared scope.
    pub fn child_of(parent: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::with_parent(Rc::clone(parent))))
    }

    /// Declare a new binding in **this** scope. Re-declaring a name that
    /// already exists in the same node is an error; shadowing a parent's
    /// binding from a child scope is fine.
    pub fn declare(&mut self, name: &str, value: Value, constant: bool) -> Result<()> {
        if self.values.contains_key(name) {
            return Err(KinError::resolution(format!(
                "Cannot declare variable '{}' as it is already defined",
                name
            )));
        }

        debug!("Declaring '{}' (constant={})", name, constant);

        self.values.insert(name.to_string(), value);

        if constant {
            self.constants.insert(name.to_string());
        }

        Ok(())
    }

    /// Resolve `name` up the parent chain and return its current value.
    pub fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().lookup(name)
        } else {
            Err(KinError::resolution(format!(
                "Cannot resolve '{}' as it does not exist",
                name
            )))
        }
    }

    /// Resolve `name` up the parent chain and mutate it in place. Fails if
    /// the name is unresolved or the owning scope marked it constant.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<Value> {
        if self.values.contains_key(name) {
            if self.constants.contains(name) {
                return Err(KinError::resolution(format!(
                    "Cannot reassign to variable '{}' as it is constant",
                    name
                )));
            }

            self.values.insert(name.to_string(), value.clone());

            Ok(value)
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            Err(KinError::resolution(format!(
                "Cannot resolve '{}' as it does not exist",
                name
            )))
        }
    }
}
