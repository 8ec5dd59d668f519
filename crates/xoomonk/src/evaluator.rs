//! C6: the tree-walking evaluator.
//!
//! Ties the AST, the analyser, and the store together. An environment-threading evaluator:
//! a small context struct carries the frames a lookup can resolve against, passed by value
//! down the recursion rather than mutated in place, with the `Rc<RefCell<..>>` store graph
//! underneath it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::analyser::{self, VariableSets};
use crate::ast::{Block, Expr, NamePart, PrintKind, Program, Ref, Stmt};
use crate::error::{ErrorKind, XoomonkError, XoomonkResult};
use crate::io::PrintWriter;
use crate::lexer::Position;
use crate::resource::RecursionTracker;
use crate::store::{AssignOutcome, DeferredBody, StoreData, Value};

/// The frames a name lookup can resolve against while evaluating some AST node.
#[derive(Clone)]
struct EvalContext {
    /// The lexical frame the node is evaluated in: what a plain `Ref` name resolves against.
    current: Rc<RefCell<StoreData>>,
    /// The frame immediately enclosing `current`, i.e. what `^` resolves to. `None` only at
    /// the top level, which has no lexical parent.
    enclosing: Option<Rc<RefCell<StoreData>>>,
    /// The program's single top-level store, i.e. what `$name` resolves against.
    global: Rc<RefCell<StoreData>>,
}

impl EvalContext {
    fn nested_in(&self, current: Rc<RefCell<StoreData>>) -> Self {
        Self {
            current,
            enclosing: Some(self.current.clone()),
            global: self.global.clone(),
        }
    }
}

/// Evaluates a whole program against a fresh top-level store, writing `print` output to
/// `sink`. The top level is itself an eager block (§4.4's `Program` rule): there is no
/// enclosing frame and no mechanism to leave a name pending.
///
/// # Errors
/// Propagates the first runtime error encountered, per the kinds in §7.
pub fn evaluate(program: &Program, sink: &mut dyn PrintWriter) -> XoomonkResult<()> {
    let sets = analyser::analyse_stmts(&program.statements);
    // Unlike a nested saturated block, the top level has no external supplier for a name
    // that is read but never assigned, so its declared domain is `used ∪ assigned` (every
    // name the program ever mentions) rather than `assigned` alone: a name that is only
    // ever read stays a legitimately declared, permanently unassigned slot.
    let variables: indexmap::IndexSet<String> = sets.used.union(&sets.assigned).cloned().collect();
    let global = Rc::new(RefCell::new(StoreData::saturated(variables)));
    let ctx = EvalContext {
        current: global.clone(),
        enclosing: None,
        global,
    };
    let mut recursion = RecursionTracker::with_default_limit();
    for stmt in &program.statements {
        eval_stmt(&ctx, stmt, sink, &mut recursion)?;
    }
    Ok(())
}

fn eval_stmt(ctx: &EvalContext, stmt: &Stmt, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<()> {
    match stmt {
        // `name := ^` never actually runs: the analyser turned it into a pending-import
        // requirement (see `analyser::analyse_stmt`), so by the time this statement is
        // reached — whether because the block was malingering and just fired, or because
        // some other assignment in the same block happened to supply `name` too — the name
        // it names has already been written by whatever external assignment satisfied that
        // requirement. Running it for real would overwrite that value with the enclosing
        // store itself, which is exactly what the import declaration was standing in for.
        Stmt::Assignment { value, .. } if value.is_bare_upvalue() => Ok(()),
        Stmt::Assignment { target, value, position } => {
            let rhs = eval_expr(ctx, value, sink, recursion)?;
            write_ref(ctx, target, *position, rhs, sink, recursion)
        }
        Stmt::Print { print, newline } => {
            eval_print(ctx, print, sink, recursion)?;
            if *newline {
                sink.write_newline();
            }
            Ok(())
        }
    }
}

fn eval_print(ctx: &EvalContext, print: &PrintKind, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<()> {
    match print {
        PrintKind::Value(expr) => {
            let value = eval_expr(ctx, expr, sink, recursion)?;
            sink.write_str(&render_value(&value));
        }
        PrintKind::Char(expr) => {
            let position = expr.position();
            let value = eval_expr(ctx, expr, sink, recursion)?;
            let Value::Integer(code) = value else {
                return Err(XoomonkError::type_error("'print char' requires an Integer", position));
            };
            let scalar = match code.to_u32_digits().as_slice() {
                [] => 0,
                [single] => *single,
                _ => {
                    return Err(XoomonkError::type_error(format!("{code} is too large to be a character code point"), position));
                }
            };
            let ch = char::from_u32(scalar)
                .ok_or_else(|| XoomonkError::type_error(format!("{code} is not a valid Unicode code point"), position))?;
            let mut buf = [0u8; 4];
            sink.write_str(ch.encode_utf8(&mut buf));
        }
        PrintKind::String(text, _) => sink.write_str(text),
    }
    Ok(())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::Store(store) => crate::store::render(&store.borrow()),
    }
}

fn eval_expr(ctx: &EvalContext, expr: &Expr, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<Value> {
    match expr {
        Expr::IntLit(n, _) => Ok(Value::Integer(n.clone())),
        Expr::Ref(r) => resolve_ref_value(ctx, r),
        Expr::CopyOf(inner, _) => {
            let value = eval_expr(ctx, inner, sink, recursion)?;
            Ok(copy_of(&value))
        }
        Expr::Block(block) => eval_block(ctx, block, sink, recursion),
    }
}

fn copy_of(value: &Value) -> Value {
    match value {
        Value::Integer(n) => Value::Integer(n.clone()),
        Value::Store(store) => Value::Store(Rc::new(RefCell::new(store.borrow().deep_copy()))),
    }
}

/// Enters a `Block` expression: computes its variable sets, then either runs it eagerly (a
/// saturated block) or attaches it as a deferred body (a malingering block), per §4.4.
fn eval_block(ctx: &EvalContext, block: &Block, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<Value> {
    recursion
        .enter()
        .map_err(|(limit, _)| XoomonkError::resource(format!("block nesting exceeded the recursion limit of {limit}"), block.position))?;
    let result = eval_block_inner(ctx, block, sink, recursion);
    recursion.leave();
    result
}

fn eval_block_inner(ctx: &EvalContext, block: &Block, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<Value> {
    let VariableSets { used, assigned } = analyser::analyse(block);
    let pending: indexmap::IndexSet<String> = used.difference(&assigned).cloned().collect();

    if pending.is_empty() {
        let store = Rc::new(RefCell::new(StoreData::saturated(assigned)));
        let inner_ctx = ctx.nested_in(store.clone());
        for stmt in block.statements.iter() {
            eval_stmt(&inner_ctx, stmt, sink, recursion)?;
        }
        Ok(Value::Store(store))
    } else {
        let variables: indexmap::IndexSet<String> = used.union(&assigned).cloned().collect();
        let body = DeferredBody {
            block: block.clone(),
            enclosing: Some(ctx.current.clone()),
            global: Some(ctx.global.clone()),
        };
        let store = Rc::new(RefCell::new(StoreData::new(variables, pending, body)));
        Ok(Value::Store(store))
    }
}

/// Runs a malingering store's deferred body, using the store itself as the current frame so
/// that statements inside it observe the values that just drained `pending`.
fn fire(store: &Rc<RefCell<StoreData>>, ctx: &EvalContext, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<()> {
    recursion
        .enter()
        .map_err(|(limit, _)| XoomonkError::resource(format!("store firing exceeded the recursion limit of {limit}"), Position { line: 0, column: 0, offset: 0 }))?;
    let result = fire_inner(store, ctx, sink, recursion);
    recursion.leave();
    result
}

fn fire_inner(store: &Rc<RefCell<StoreData>>, ctx: &EvalContext, sink: &mut dyn PrintWriter, recursion: &mut RecursionTracker) -> XoomonkResult<()> {
    let body = store.borrow_mut().body.take().expect("fire is only called when a body is attached");
    let fire_ctx = EvalContext {
        current: store.clone(),
        enclosing: body.enclosing.clone().or_else(|| ctx.enclosing.clone()),
        global: body.global.clone().unwrap_or_else(|| ctx.global.clone()),
    };
    for stmt in body.block.statements.iter() {
        eval_stmt(&fire_ctx, stmt, sink, recursion)?;
    }
    Ok(())
}

/// Resolves a `Ref` to the value it denotes (the read path of §4.4's `Ref` rules).
fn resolve_ref_value(ctx: &EvalContext, r: &Ref) -> XoomonkResult<Value> {
    let mut value = resolve_head(ctx, r.head(), r.position)?;
    for part in r.tail() {
        let name = tail_identifier(part)?;
        let store = expect_store(&value, r.position)?;
        value = read_store(&store, name, r.position)?;
    }
    Ok(value)
}

fn resolve_head(ctx: &EvalContext, part: &NamePart, position: Position) -> XoomonkResult<Value> {
    match part {
        NamePart::Identifier(name) => read_store(&ctx.current, name, position),
        NamePart::Upvalue => ctx
            .enclosing
            .clone()
            .map(Value::Store)
            .ok_or_else(|| XoomonkError::new(ErrorKind::UndefinedVariable, "'^' has no enclosing store at the top level", Some(position))),
        NamePart::Dollar(name) => read_store(&ctx.global, name, position),
    }
}

fn read_store(store: &Rc<RefCell<StoreData>>, name: &str, position: Position) -> XoomonkResult<Value> {
    let borrowed = store.borrow();
    if !borrowed.is_declared(name) {
        return Err(XoomonkError::undefined_variable(name, position));
    }
    match borrowed.get(name) {
        Some(value) => Ok(value.clone()),
        None => Err(XoomonkError::unassigned_variable(name, position)),
    }
}

fn expect_store(value: &Value, position: Position) -> XoomonkResult<Rc<RefCell<StoreData>>> {
    match value {
        Value::Store(store) => Ok(store.clone()),
        Value::Integer(_) => Err(XoomonkError::type_error("dotted-path member access requires a Store", position)),
    }
}

/// A non-goal beyond §4.3: `^`/`$name` are only resolved in the head position of a dotted
/// reference; elsewhere they name no member and are rejected rather than given ad hoc meaning.
fn tail_identifier(part: &NamePart) -> XoomonkResult<&str> {
    match part {
        NamePart::Identifier(name) => Ok(name.as_str()),
        NamePart::Upvalue | NamePart::Dollar(_) => {
            Err(XoomonkError::unimplemented("'^'/'$name' are only supported as the head of a dotted reference"))
        }
    }
}

/// Resolves an assignment's target `Ref` to `(store, field)`: the store to write into, and
/// the name to write within it.
fn resolve_target(ctx: &EvalContext, r: &Ref) -> XoomonkResult<(Rc<RefCell<StoreData>>, String)> {
    if r.parts.len() == 1 {
        return match r.head() {
            NamePart::Identifier(name) => Ok((ctx.current.clone(), name.clone())),
            NamePart::Dollar(name) => Ok((ctx.global.clone(), name.clone())),
            NamePart::Upvalue => Err(XoomonkError::type_error("'^' alone cannot be an assignment target", r.position)),
        };
    }

    let mut value = resolve_head(ctx, r.head(), r.position)?;
    let last = r.parts.len() - 1;
    for part in &r.parts[1..last] {
        let name = tail_identifier(part)?;
        let store = expect_store(&value, r.position)?;
        value = read_store(&store, name, r.position)?;
    }
    let store = expect_store(&value, r.position)?;
    let field = tail_identifier(&r.parts[last])?.to_owned();
    Ok((store, field))
}

fn write_ref(
    ctx: &EvalContext,
    target: &Ref,
    position: Position,
    value: Value,
    sink: &mut dyn PrintWriter,
    recursion: &mut RecursionTracker,
) -> XoomonkResult<()> {
    let (store, field) = resolve_target(ctx, target)?;
    let outcome = store.borrow_mut().try_assign(&field, value);
    match outcome {
        AssignOutcome::Undefined => Err(XoomonkError::undefined_variable(&field, position)),
        AssignOutcome::Unresolved => Err(XoomonkError::unresolved_store(&field, position)),
        AssignOutcome::Written { fires: false } => Ok(()),
        AssignOutcome::Written { fires: true } => fire(&store, ctx, sink, recursion),
    }
}
