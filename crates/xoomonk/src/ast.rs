//! C1: the passive AST.
//!
//! A typed sum-of-variants tree with explicit per-variant fields (never a generic
//! "node + children list"), so a malformed tree (e.g. an `Assignment` missing its
//! right-hand side) cannot be constructed. The closed kind set from the design document's
//! §3 is reproduced exactly by each node's `kind()` for `--show-ast` dumps and the
//! idempotence test in §8, even though the Rust shape below is a family of purpose-built
//! enums rather than one flat node type.

use num_bigint::BigUint;

use crate::lexer::Position;

/// Mirrors the closed AST kind set, used only for structural dumps and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Program,
    Assignment,
    Block,
    Ref,
    Identifier,
    Upvalue,
    Dollar,
    IntLit,
    CopyOf,
    Print,
    PrintChar,
    PrintString,
    Newline,
}

/// One component of a dotted reference: `ref := name ("." name)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePart {
    Identifier(String),
    Upvalue,
    Dollar(String),
}

impl NamePart {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Identifier(_) => Kind::Identifier,
            Self::Upvalue => Kind::Upvalue,
            Self::Dollar(_) => Kind::Dollar,
        }
    }
}

/// A (possibly dotted) reference: `n.m1.m2...mk`. Always has at least one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub parts: Vec<NamePart>,
    pub position: Position,
}

impl Ref {
    #[must_use]
    pub fn head(&self) -> &NamePart {
        &self.parts[0]
    }

    #[must_use]
    pub fn tail(&self) -> &[NamePart] {
        &self.parts[1..]
    }
}

/// An expression: `expr := (block | INTLIT | ref) ["*"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    IntLit(BigUint, Position),
    Ref(Ref),
    Block(Block),
    /// `*` suffix: clone the store an inner expression evaluates to.
    CopyOf(Box<Expr>, Position),
}

impl Expr {
    /// `true` for a bare `^` with no dotted tail, i.e. the sole RHS of `name := ^`.
    ///
    /// A dotted reference headed by `^` (e.g. `^.foo`) is a normal, immediately-resolvable
    /// read of the enclosing store's `foo` field and is unaffected by this check; only a
    /// standalone `^` used as a whole assignment's RHS gets the special import-declaration
    /// treatment described in the analyser and evaluator (see `SPEC_FULL.md`'s resolved
    /// Upvalue ambiguity).
    #[must_use]
    pub fn is_bare_upvalue(&self) -> bool {
        matches!(self, Self::Ref(r) if r.parts.len() == 1 && matches!(r.parts[0], NamePart::Upvalue))
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::IntLit(..) => Kind::IntLit,
            Self::Ref(_) => Kind::Ref,
            Self::Block(_) => Kind::Block,
            Self::CopyOf(..) => Kind::CopyOf,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::IntLit(_, position) | Self::CopyOf(_, position) => *position,
            Self::Ref(r) => r.position,
            Self::Block(block) => block.position,
        }
    }
}

/// A `{ stmt* }` block literal. Shared (`Rc`-backed) because a malingering store keeps a
/// handle to it for later firing while the enclosing evaluation continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub statements: std::rc::Rc<[Stmt]>,
    pub position: Position,
}

/// What a `print` statement writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintKind {
    Value(Expr),
    Char(Expr),
    String(String, Position),
}

impl PrintKind {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Value(_) => Kind::Print,
            Self::Char(_) => Kind::PrintChar,
            Self::String(..) => Kind::PrintString,
        }
    }
}

/// A single statement. `newline` records whether the statement lacked a trailing `;`
/// (the grammar's `Newline` wrapper, represented as a flag rather than a one-child node —
/// see SPEC_FULL.md's Data Model section for the rationale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assignment { target: Ref, value: Expr, position: Position },
    Print { print: PrintKind, newline: bool },
}

impl Stmt {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Assignment { .. } => Kind::Assignment,
            Self::Print { .. } => Kind::Print,
        }
    }

    /// `true` when this statement's `Print`/`PrintChar`/`PrintString` node is wrapped in
    /// the grammar's implicit `Newline` node (i.e. it lacked a trailing `;`).
    #[must_use]
    pub fn has_newline_wrapper(&self) -> bool {
        matches!(self, Self::Print { newline: true, .. })
    }
}

/// The root of a parsed program: `program := stmt*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// Renders a structural dump of a program using the closed kind names from §3, one node
/// per line, indented by nesting depth. Used by `--show-ast` and by the idempotence test.
#[must_use]
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    for stmt in &program.statements {
        dump_stmt(stmt, 1, &mut out);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_stmt(stmt: &Stmt, depth: usize, out: &mut String) {
    match stmt {
        Stmt::Assignment { target, value, .. } => {
            indent(out, depth);
            out.push_str("Assignment\n");
            dump_ref(target, depth + 1, out);
            dump_expr(value, depth + 1, out);
        }
        Stmt::Print { print, newline } => {
            let wrapped_depth = if *newline {
                indent(out, depth);
                out.push_str("Newline\n");
                depth + 1
            } else {
                depth
            };
            match print {
                PrintKind::Value(expr) => {
                    indent(out, wrapped_depth);
                    out.push_str("Print\n");
                    dump_expr(expr, wrapped_depth + 1, out);
                }
                PrintKind::Char(expr) => {
                    indent(out, wrapped_depth);
                    out.push_str("PrintChar\n");
                    dump_expr(expr, wrapped_depth + 1, out);
                }
                PrintKind::String(literal, _) => {
                    indent(out, wrapped_depth);
                    out.push_str("PrintString ");
                    out.push_str(literal);
                    out.push('\n');
                }
            }
        }
    }
}

fn dump_expr(expr: &Expr, depth: usize, out: &mut String) {
    match expr {
        Expr::IntLit(value, _) => {
            indent(out, depth);
            out.push_str("IntLit ");
            out.push_str(&value.to_string());
            out.push('\n');
        }
        Expr::Ref(r) => dump_ref(r, depth, out),
        Expr::Block(block) => {
            indent(out, depth);
            out.push_str("Block\n");
            for stmt in block.statements.iter() {
                dump_stmt(stmt, depth + 1, out);
            }
        }
        Expr::CopyOf(inner, _) => {
            indent(out, depth);
            out.push_str("CopyOf\n");
            dump_expr(inner, depth + 1, out);
        }
    }
}

fn dump_ref(r: &Ref, depth: usize, out: &mut String) {
    indent(out, depth);
    out.push_str("Ref\n");
    for part in &r.parts {
        indent(out, depth + 1);
        match part {
            NamePart::Identifier(name) => {
                out.push_str("Identifier ");
                out.push_str(name);
            }
            NamePart::Upvalue => out.push_str("Upvalue"),
            NamePart::Dollar(name) => {
                out.push_str("Dollar ");
                out.push_str(name);
            }
        }
        out.push('\n');
    }
}
