//! C5: runtime values and the malingering store.
//!
//! An `Rc<RefCell<..>>`-based object model for mutable, aliasable runtime state: a `:=`
//! assignment shares a handle to the same store (`Value::Store` clones cheaply and both
//! names observe later firings), while `*` (`CopyOf`) deep-copies the `assignments` map so
//! the two stores diverge from that point on, matching §4.4's aliasing rules.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use num_bigint::BigUint;

use crate::ast::Block;

/// A runtime value: either an unbounded non-negative integer or a handle to a store.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigUint),
    Store(Rc<RefCell<StoreData>>),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "Integer",
            Self::Store(_) => "Store",
        }
    }
}

/// The outcome of a write, per §4.4's store write table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// `n ∉ variables`.
    Undefined,
    /// `n ∉ pending` while `pending ≠ ∅`: the store still has other outstanding holes.
    Unresolved,
    /// The write was recorded; `fires` is `true` iff this write drained the last pending
    /// name and the caller must now run the store's deferred body.
    Written { fires: bool },
}

/// The block body a store keeps around until it fires: the statement list plus the store it
/// closes over (for `^` resolution) and a handle to the program's global store (for `$name`).
#[derive(Debug, Clone)]
pub struct DeferredBody {
    pub block: Block,
    pub enclosing: Option<Rc<RefCell<StoreData>>>,
    pub global: Option<Rc<RefCell<StoreData>>>,
}

/// A store: the malingering-store model from §4.3/§4.4.
///
/// `variables` is the block's static name set (`used ∪ assigned`, computed once at creation);
/// `assignments` holds whatever has actually been written so far; `pending` starts as
/// `used \ assigned` and shrinks as each pending name is supplied from outside, firing the
/// deferred body the instant it reaches empty.
#[derive(Debug, Clone)]
pub struct StoreData {
    pub variables: IndexSet<String>,
    pub assignments: IndexMap<String, Value>,
    pub pending: IndexSet<String>,
    pub body: Option<DeferredBody>,
    pub fired: bool,
}

impl StoreData {
    #[must_use]
    pub fn new(variables: IndexSet<String>, pending: IndexSet<String>, body: DeferredBody) -> Self {
        let fired = pending.is_empty();
        Self {
            variables,
            assignments: IndexMap::new(),
            pending,
            body: Some(body),
            fired,
        }
    }

    /// An empty store with no deferred body, e.g. one produced by `CopyOf` of an integer-only
    /// value or used as scratch state by the evaluator.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            variables: IndexSet::new(),
            assignments: IndexMap::new(),
            pending: IndexSet::new(),
            body: None,
            fired: true,
        }
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    #[must_use]
    pub fn is_assigned(&self, name: &str) -> bool {
        self.assignments.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignments.get(name)
    }

    /// A saturated store for an eager block (or the top-level program store): `variables` is
    /// the block's `assigned` set per §4.4's saturated-block rule, `pending` is empty, and
    /// there is no deferred body to fire.
    #[must_use]
    pub fn saturated(variables: IndexSet<String>) -> Self {
        Self {
            variables,
            assignments: IndexMap::new(),
            pending: IndexSet::new(),
            body: None,
            fired: true,
        }
    }

    /// Applies the write rules from §4.4's store write table to `s[name] := value`.
    pub fn try_assign(&mut self, name: &str, value: Value) -> AssignOutcome {
        if !self.variables.contains(name) {
            return AssignOutcome::Undefined;
        }
        if self.pending.shift_remove(name) {
            self.assignments.insert(name.to_owned(), value);
            let fired = !self.fired && self.pending.is_empty() && self.body.is_some();
            if fired {
                self.fired = true;
            }
            return AssignOutcome::Written { fires: fired };
        }
        if !self.pending.is_empty() {
            return AssignOutcome::Unresolved;
        }
        self.assignments.insert(name.to_owned(), value);
        AssignOutcome::Written { fires: false }
    }

    /// A deep-enough copy for `*`: a fresh store with the same declared/pending shape, and a
    /// value-level clone of every already-made assignment. Nested `Value::Store` assignments
    /// are cloned as handles (not recursively deep-copied) per §4.4: `*` only detaches the
    /// store being copied from its aliases, not every store reachable through it.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            variables: self.variables.clone(),
            assignments: self.assignments.clone(),
            pending: self.pending.clone(),
            body: self.body.clone(),
            fired: self.fired,
        }
    }
}

/// Renders a store as `[name=value,...]` in declaration order, with `?` standing in for a
/// pending (not yet assigned) name. This is the resolved store-print format from §9.
#[must_use]
pub fn render(store: &StoreData) -> String {
    let mut out = String::from("[");
    for (i, name) in store.variables.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(name);
        out.push('=');
        match store.assignments.get(name) {
            Some(Value::Integer(n)) => out.push_str(&n.to_string()),
            Some(Value::Store(inner)) => out.push_str(&render(&inner.borrow())),
            None => out.push('?'),
        }
    }
    out.push(']');
    out
}

impl fmt::Display for StoreData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> DeferredBody {
        DeferredBody {
            block: Block { statements: Rc::from(Vec::new()), position: crate::lexer::Position { line: 1, column: 1, offset: 0 } },
            enclosing: None,
            global: None,
        }
    }

    #[test]
    fn fresh_store_with_pending_names_has_not_fired() {
        let store = StoreData::new(
            IndexSet::from(["a".to_owned(), "b".to_owned()]),
            IndexSet::from(["b".to_owned()]),
            sample_body(),
        );
        assert!(!store.fired);
    }

    #[test]
    fn store_with_no_pending_names_fires_immediately() {
        let store = StoreData::new(IndexSet::from(["a".to_owned()]), IndexSet::new(), sample_body());
        assert!(store.fired);
    }

    #[test]
    fn assigning_the_last_pending_name_fires() {
        let mut store = StoreData::new(
            IndexSet::from(["a".to_owned()]),
            IndexSet::from(["a".to_owned()]),
            sample_body(),
        );
        let outcome = store.try_assign("a", Value::Integer(BigUint::from(7u32)));
        assert_eq!(outcome, AssignOutcome::Written { fires: true });
        assert!(store.fired);
    }

    #[test]
    fn deep_copy_detaches_assignments_map() {
        let mut store = StoreData::new(IndexSet::from(["a".to_owned()]), IndexSet::new(), sample_body());
        store.try_assign("a", Value::Integer(BigUint::from(1u32)));
        let mut copy = store.deep_copy();
        copy.try_assign("a", Value::Integer(BigUint::from(2u32)));
        match store.get("a") {
            Some(Value::Integer(n)) => assert_eq!(*n, BigUint::from(1u32)),
            _ => panic!("expected an integer"),
        }
        match copy.get("a") {
            Some(Value::Integer(n)) => assert_eq!(*n, BigUint::from(2u32)),
            _ => panic!("expected an integer"),
        }
    }

    #[test]
    fn writing_an_undeclared_name_is_rejected() {
        let mut store = StoreData::new(IndexSet::from(["a".to_owned()]), IndexSet::new(), sample_body());
        let outcome = store.try_assign("z", Value::Integer(BigUint::from(1u32)));
        assert_eq!(outcome, AssignOutcome::Undefined);
    }

    #[test]
    fn writing_a_non_pending_name_while_other_holes_remain_is_unresolved() {
        let mut store = StoreData::new(
            IndexSet::from(["a".to_owned(), "b".to_owned()]),
            IndexSet::from(["a".to_owned(), "b".to_owned()]),
            sample_body(),
        );
        let outcome = store.try_assign("a", Value::Integer(BigUint::from(1u32)));
        assert_eq!(outcome, AssignOutcome::Written { fires: false });
        let blocked = store.try_assign("a", Value::Integer(BigUint::from(2u32)));
        assert_eq!(blocked, AssignOutcome::Unresolved);
    }

    #[test]
    fn render_marks_pending_names_with_question_mark() {
        let mut store = StoreData::new(
            IndexSet::from(["a".to_owned(), "b".to_owned()]),
            IndexSet::from(["b".to_owned()]),
            sample_body(),
        );
        store.try_assign("a", Value::Integer(BigUint::from(3u32)));
        assert_eq!(render(&store), "[a=3,b=?]");
    }
}
