//! C4: static `used`/`assigned` analysis for a block's statement list.
//!
//! A block's pending set is `used(B) \ assigned(B)` (§4.3's resolved over-counting policy:
//! a plain set difference over every name mentioned anywhere in the block's own statements,
//! including inside nested blocks, with no order-awareness and no attempt to track whether a
//! use happens before or after an assignment in sequence). Adapted from a closure's free-
//! variable capture analysis to the block-literal scoping rule that a block's own nested
//! blocks contribute their free names but not their bound names.

use indexmap::IndexSet;

use crate::ast::{Block, Expr, NamePart, PrintKind, Ref, Stmt};

/// The result of analysing a block: every name read, and every name this block itself binds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSets {
    pub used: IndexSet<String>,
    pub assigned: IndexSet<String>,
}

impl VariableSets {
    /// Names used but never assigned by this block: the store's initial pending set.
    #[must_use]
    pub fn pending(&self) -> IndexSet<String> {
        self.used.difference(&self.assigned).cloned().collect()
    }
}

/// Computes the used/assigned sets for a block's direct statement list.
///
/// Nested blocks contribute the free names their own bodies mention (via `^`/`$name` this
/// block doesn't shadow, or plain identifiers resolved through this block), but never their
/// own locally assigned names: those are bound inside the nested block's own scope.
#[must_use]
pub fn analyse(block: &Block) -> VariableSets {
    analyse_stmts(&block.statements)
}

/// Same computation as [`analyse`], taken directly over a statement list. The top-level
/// program is evaluated as one big eager block (§4.4's `Program` rule), so the evaluator
/// reuses this to compute its `assigned` set without needing a `Block` wrapper.
#[must_use]
pub fn analyse_stmts(statements: &[Stmt]) -> VariableSets {
    let mut sets = VariableSets::default();
    for stmt in statements {
        analyse_stmt(stmt, &mut sets);
    }
    sets
}

fn analyse_stmt(stmt: &Stmt, sets: &mut VariableSets) {
    match stmt {
        // `name := ^` (a bare upvalue with no dotted tail) is a pending-import declaration,
        // not a normal assignment: it marks `name` as a name this block needs supplied from
        // outside rather than one it assigns itself, so it contributes to `used` instead of
        // `assigned`. See the evaluator's matching treatment of this exact statement shape.
        Stmt::Assignment { target, value, .. } if value.is_bare_upvalue() => {
            record_ref(target, sets, false);
        }
        Stmt::Assignment { target, value, .. } => {
            record_ref(target, sets, true);
            analyse_expr(value, sets);
        }
        Stmt::Print { print, .. } => match print {
            PrintKind::Value(expr) | PrintKind::Char(expr) => analyse_expr(expr, sets),
            PrintKind::String(..) => {}
        },
    }
}

fn analyse_expr(expr: &Expr, sets: &mut VariableSets) {
    match expr {
        Expr::IntLit(..) => {}
        Expr::Ref(r) => record_ref(r, sets, false),
        Expr::CopyOf(inner, _) => analyse_expr(inner, sets),
        Expr::Block(block) => {
            let nested = analyse(block);
            sets.used.extend(nested.pending());
        }
    }
}

/// A reference's own head name is what this block reads or binds; `^` and `$name` heads
/// resolve outside this block's scope entirely, so they never contribute to this block's own
/// `used`/`assigned` sets (they name the enclosing store or the global store, not a local).
fn record_ref(r: &Ref, sets: &mut VariableSets, is_assignment_target: bool) {
    if let NamePart::Identifier(name) = r.head() {
        if is_assignment_target {
            sets.assigned.insert(name.clone());
        } else {
            sets.used.insert(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::ast::Expr;

    fn only_block(source: &str) -> Block {
        let program = parse(source).unwrap();
        match &program.statements[0] {
            Stmt::Assignment { value: Expr::Block(block), .. } => block.clone(),
            _ => panic!("expected a block-literal assignment"),
        }
    }

    #[test]
    fn pending_is_used_minus_assigned() {
        let block = only_block("r := { a := b b := 1 }");
        let sets = analyse(&block);
        assert!(sets.used.contains("b"));
        assert!(sets.assigned.contains("a"));
        assert!(sets.assigned.contains("b"));
        assert!(sets.pending().is_empty());
    }

    #[test]
    fn unassigned_use_is_pending() {
        let block = only_block("r := { a := x }");
        let sets = analyse(&block);
        assert_eq!(sets.pending(), IndexSet::from(["x".to_owned()]));
    }

    #[test]
    fn nested_block_contributes_only_its_own_pending_names() {
        let block = only_block("r := { a := { c := x } }");
        let sets = analyse(&block);
        assert!(sets.used.contains("x"));
        assert!(!sets.used.contains("c"));
        assert!(sets.assigned.contains("a"));
    }

    #[test]
    fn dollar_head_does_not_count_as_a_local_name() {
        let block = only_block("r := { b := $g }");
        let sets = analyse(&block);
        assert!(sets.used.is_empty());
        assert_eq!(sets.assigned, IndexSet::from(["b".to_owned()]));
    }

    #[test]
    fn bare_upvalue_assignment_is_a_pending_import_not_a_local_assignment() {
        let block = only_block("r := { a := ^ b := a }");
        let sets = analyse(&block);
        assert_eq!(sets.used, IndexSet::from(["a".to_owned()]));
        assert_eq!(sets.assigned, IndexSet::from(["b".to_owned()]));
        assert_eq!(sets.pending(), IndexSet::from(["a".to_owned()]));
    }

    #[test]
    fn dotted_upvalue_head_is_a_normal_read_not_an_import() {
        // `^.foo` (a dotted path headed by `^`) is unaffected: it's an immediate read of the
        // enclosing store's `foo` field, not the bare-`^` import-declaration idiom.
        let block = only_block("r := { a := ^.foo }");
        let sets = analyse(&block);
        assert!(sets.used.is_empty());
        assert_eq!(sets.assigned, IndexSet::from(["a".to_owned()]));
    }
}
