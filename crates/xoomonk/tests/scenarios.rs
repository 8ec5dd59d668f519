//! End-to-end coverage of the scenarios and invariants against the crate's public API,
//! rather than its internal modules (see the unit tests alongside each module for
//! component-level coverage).

use xoomonk::{CollectStringPrint, ErrorKind, evaluate, parse};

fn run(source: &str) -> Result<String, xoomonk::XoomonkError> {
    let program = parse(source)?;
    let mut sink = CollectStringPrint::new();
    evaluate(&program, &mut sink)?;
    Ok(sink.into_output())
}

#[test]
fn all_stdout_scenarios_from_the_design_document() {
    assert_eq!(run("print 42").unwrap(), "42\n");
    assert_eq!(run("a := 5 b := a print b;").unwrap(), "5");
    assert_eq!(run("print char 65").unwrap(), "A\n");
    assert_eq!(run("print string \"hi\";print string \"!\"").unwrap(), "hi!\n");
    assert_eq!(run("r := { a := 1 b := a } print r.b").unwrap(), "1\n");
    assert_eq!(run("r := { x := ^ y := x } r.x := 7 print r.y").unwrap(), "7\n");
}

#[test]
fn all_error_scenarios_from_the_design_document() {
    assert_eq!(run("a := b").unwrap_err().kind, ErrorKind::UnassignedVariable);
    assert_eq!(run("r := { a := 1 } r.c := 2").unwrap_err().kind, ErrorKind::UndefinedVariable);
    assert_eq!(run("r := { a := b c := b } r.a := 1").unwrap_err().kind, ErrorKind::UnresolvedStore);
}

#[test]
fn nested_malingering_stores_chain_their_firing() {
    // `outer`'s own pending set picks up `w` too (the analyser bubbles a nested block's
    // free names into its enclosing scope's `used` set regardless of whether the enclosing
    // block's own body later supplies them internally — see the analyser's resolved
    // over-counting policy), so `outer.w := 0` is a formality that only exists to drain
    // `outer`'s pending set and trigger its firing; the value doesn't flow anywhere. Once
    // `outer` fires, its body builds a fresh, independently-pending `inner` store and
    // supplies `inner`'s own (unrelated) `w` slot directly, chaining the second firing
    // synchronously within the same top-level write.
    let output = run(
        "outer := {
             inner := { v := w }
             inner.w := 3
             passthrough := inner.v
         }
         outer.w := 0
         print outer.passthrough",
    )
    .unwrap();
    assert_eq!(output, "3\n");
}

#[test]
fn copy_of_an_integer_is_identity() {
    assert_eq!(run("a := 5 b := a* print b").unwrap(), "5\n");
}

#[test]
fn copy_of_a_malingering_store_preserves_its_pending_shape() {
    // Copying before the original fires produces an independent store with the same
    // pending slots; supplying the copy's slot does not fire the original (and vice versa).
    let output = run(
        "r := { x := ^ y := x }
         s := r*
         s.x := 3
         print s.y; print string \" \"; print r",
    )
    .unwrap();
    assert_eq!(output, "3 [x=?,y=?]\n");
}

#[test]
fn dollar_reference_reads_the_top_level_slot_from_any_depth() {
    let output = run("g := 11 r := { a := { b := $g } }  print r.a.b").unwrap();
    assert_eq!(output, "11\n");
}

#[test]
fn upvalue_with_no_enclosing_store_is_an_error() {
    // `a := ^` is the bare-upvalue import idiom, so it's a no-op rather than an immediate
    // read (see the analyser's and evaluator's matching treatment of this statement shape);
    // the error instead comes from `^` used directly as a value, where the top level has no
    // enclosing store to resolve it against.
    let err = run("print ^").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
}

#[test]
fn syntax_error_reports_the_offending_lexeme() {
    let err = parse("a := ").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert!(err.to_string().contains("unexpected token"));
}

#[test]
fn unbounded_integer_literal_round_trips() {
    let huge = "123456789012345678901234567890";
    let output = run(&format!("print {huge}")).unwrap();
    assert_eq!(output.trim_end(), huge);
}
