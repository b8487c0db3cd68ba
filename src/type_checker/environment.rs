use std::collections::HashMap;

use thiserror::Error;

use crate::ast::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("duplicate definition: {name}")]
    Duplicate { name: String },
    #[error("undefined identifier: {name}")]
    Undefined { name: String },
    #[error("no {kind:?} scope is open")]
    NoFrame { kind: ScopeKind },
}

#[derive(Debug)]
pub struct Frame<V> {
    pub kind: ScopeKind,
    pub variable_lookup: HashMap<String, V>,
}

impl<V> Frame<V> {
    pub fn new(kind: ScopeKind) -> Self {
        Frame {
            kind,
            variable_lookup: HashMap::new(),
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&V> {
        self.variable_lookup.get(name)
    }
}

/// Scope chain from the module root to the innermost function body.
///
/// `V` is whatever a binding carries; the code generator stores its type
/// together with the IR handle.
#[derive(Debug)]
pub struct Environment<V> {
    frames: Vec<Frame<V>>,
    /// User defined types, visible everywhere.
    pub type_lookup: HashMap<String, Type>,
}

impl<V> Default for Environment<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Environment<V> {
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::new(ScopeKind::Global)],
            type_lookup: HashMap::new(),
        }
    }

    /// Declares `name` in the innermost frame of the given kind.
    pub fn declare(&mut self, name: &str, value: V, kind: ScopeKind) -> Result<(), ScopeError> {
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find(|frame| frame.kind == kind)
            .ok_or(ScopeError::NoFrame { kind })?;

        if frame.variable_lookup.contains_key(name) {
            return Err(ScopeError::Duplicate {
                name: name.to_string(),
            });
        }

        frame.variable_lookup.insert(name.to_string(), value);
        Ok(())
    }

    /// Finds the innermost binding for `name`.
    pub fn resolve(&self, name: &str) -> Result<&V, ScopeError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get_variable(name))
            .ok_or_else(|| ScopeError::Undefined {
                name: name.to_string(),
            })
    }

    /// Whether the innermost frame of `kind` already binds `name`.
    pub fn declared_in(&self, name: &str, kind: ScopeKind) -> bool {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.kind == kind)
            .is_some_and(|frame| frame.variable_lookup.contains_key(name))
    }

    pub fn push_frame(&mut self, kind: ScopeKind) {
        self.frames.push(Frame::new(kind));
    }

    /// Pops the innermost frame. The root frame stays.
    pub fn pop_frame(&mut self) -> Option<Frame<V>> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.frames
            .last()
            .map(|frame| frame.kind)
            .unwrap_or(ScopeKind::Global)
    }

    pub fn declare_type(&mut self, name: &str, ty: Type) -> Result<(), ScopeError> {
        if self.type_lookup.contains_key(name) {
            return Err(ScopeError::Duplicate {
                name: name.to_string(),
            });
        }
        self.type_lookup.insert(name.to_string(), ty);
        Ok(())
    }

    /// Built-in names first, then user defined types.
    pub fn get_type(&self, name: &str) -> Option<Type> {
        Type::builtin(name).or_else(|| self.type_lookup.get(name).cloned())
    }
}
