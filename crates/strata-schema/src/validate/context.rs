//! Validation context and output types
//!
//! `ValidationContext` manages state during validation:
//! - The schema set being validated against
//! - Current path for error reporting
//! - Accumulated errors
//! - Reference hops taken at the current value
//! - Errors of union alternatives already tried, shared by every fork

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use strata_node::NodePath;

use crate::registry::SchemaSet;
use crate::shape::Shape;

use super::error::ValidationError;

/// Final validation output returned to callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutput {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Internal mutable state during validation.
#[derive(Debug, Default)]
pub struct ValidationState {
    pub path: NodePath,
    pub errors: Vec<ValidationError>,
    /// Union types entered without descending into a child value
    pub hops: usize,
}

impl ValidationState {
    pub fn at(path: NodePath) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// Clone for fork (trial validation).
    pub fn fork(&self) -> Self {
        Self {
            path: self.path.clone(),
            errors: Vec::new(),
            hops: self.hops,
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    pub fn finish(self) -> ValidationOutput {
        ValidationOutput {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
        }
    }
}

/// Identifies one union alternative tried at one value.
///
/// The validated tree does not change during a run, so the path stands for
/// the value. Shapes are borrowed for the whole run, so their address
/// identifies them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TrialKey {
    path: NodePath,
    shape: *const Shape,
    hops: usize,
}

type TrialCache = Rc<RefCell<AHashMap<TrialKey, Vec<ValidationError>>>>;

/// Validation context combining the schema set and mutable state.
///
/// Validators take `&ValidationContext` and record errors through the
/// `RefCell`, so nested validators can share one context.
pub struct ValidationContext<'s> {
    pub schemas: &'s SchemaSet,
    pub state: RefCell<ValidationState>,
    trials: TrialCache,
}

impl<'s> ValidationContext<'s> {
    pub fn new(schemas: &'s SchemaSet, path: NodePath) -> Self {
        Self::with_state(schemas, ValidationState::at(path))
    }

    pub fn with_state(schemas: &'s SchemaSet, state: ValidationState) -> Self {
        Self {
            schemas,
            state: RefCell::new(state),
            trials: TrialCache::default(),
        }
    }

    pub fn record_error(&self, error: ValidationError) {
        self.state.borrow_mut().errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.state.borrow().errors.is_empty()
    }

    pub fn path(&self) -> NodePath {
        self.state.borrow().path.clone()
    }

    pub fn depth(&self) -> usize {
        self.state.borrow().path.depth()
    }

    /// Push a property segment; hops are counted afresh below it.
    /// Returns the hop count to hand back to [`Self::pop_path`].
    pub fn push_property(&self, name: &str) -> usize {
        let mut state = self.state.borrow_mut();
        state.path.push_property(name);
        core::mem::take(&mut state.hops)
    }

    pub fn push_index(&self, index: usize) -> usize {
        let mut state = self.state.borrow_mut();
        state.path.push_index(index);
        core::mem::take(&mut state.hops)
    }

    pub fn pop_path(&self, hops: usize) {
        let mut state = self.state.borrow_mut();
        state.path.pop();
        state.hops = hops;
    }

    /// Count one more hop through a union type. Returns false once the
    /// schema set's limit is exceeded.
    pub fn enter_hop(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.hops += 1;
        state.hops <= self.schemas.reference_limit()
    }

    pub fn leave_hop(&self) {
        let mut state = self.state.borrow_mut();
        state.hops = state.hops.saturating_sub(1);
    }

    /// Validate with `run` in a fork of this context and return the errors it
    /// recorded, without recording them here.
    ///
    /// Nested unions see the same value under every alternative of an
    /// enclosing union, so results are cached per value and alternative;
    /// otherwise the work grows exponentially with nesting depth.
    pub fn trial(
        &self,
        shape: &Shape,
        run: impl FnOnce(&ValidationContext<'s>),
    ) -> Vec<ValidationError> {
        let state = self.fork_state();
        let key = TrialKey {
            path: state.path.clone(),
            shape: core::ptr::from_ref(shape),
            hops: state.hops,
        };
        let cached = self.trials.borrow().get(&key).cloned();
        if let Some(errors) = cached {
            return errors;
        }
        let trial = ValidationContext {
            schemas: self.schemas,
            state: RefCell::new(state),
            trials: self.trials.clone(),
        };
        run(&trial);
        let errors = trial.state.into_inner().errors;
        self.trials.borrow_mut().insert(key, errors.clone());
        errors
    }

    pub fn fork_state(&self) -> ValidationState {
        self.state.borrow().fork()
    }

    pub fn merge_state(&self, other: ValidationState) {
        self.state.borrow_mut().merge(other);
    }

    pub fn finish(self) -> ValidationOutput {
        self.state.into_inner().finish()
    }
}
