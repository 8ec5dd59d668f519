use std::{env, fs, process::ExitCode};

use xoomonk::{CollectStringPrint, ErrorKind, StdPrint, XoomonkError, dump, evaluate, parse};

struct Args {
    path: Option<String>,
    show_ast: bool,
    raise_exceptions: bool,
    run_tests: bool,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut args = Args {
        path: None,
        show_ast: false,
        raise_exceptions: false,
        run_tests: false,
    };
    for arg in raw {
        match arg.as_str() {
            "--show-ast" => args.show_ast = true,
            "--raise-exceptions" => args.raise_exceptions = true,
            "--test" => args.run_tests = true,
            flag if flag.starts_with("--") => return Err(format!("unrecognised flag '{flag}'")),
            path if args.path.is_none() => args.path = Some(path.to_owned()),
            extra => return Err(format!("unexpected extra argument '{extra}'")),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    if args.run_tests {
        return if self_test::run() { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    let Some(path) = args.path else {
        eprintln!("usage: xoomonk [--show-ast] [--raise-exceptions] <path>");
        return ExitCode::FAILURE;
    };

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    run_source(&source, &args)
}

fn run_source(source: &str, args: &Args) -> ExitCode {
    let program = match parse(source) {
        Ok(program) => program,
        Err(err) => return report(&err, args.raise_exceptions),
    };

    if args.show_ast {
        print!("{}", dump(&program));
    }

    let mut sink = StdPrint;
    match evaluate(&program, &mut sink) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, args.raise_exceptions),
    }
}

fn report(err: &XoomonkError, raise_exceptions: bool) -> ExitCode {
    if raise_exceptions {
        eprintln!("{}", err.diagnostic());
    } else {
        eprintln!("{err}");
    }
    ExitCode::FAILURE
}

/// `--test`: runs the scenarios from the design document's §8 against the library's public
/// API and reports pass/fail, without needing a separate test harness or input file.
mod self_test {
    use super::{CollectStringPrint, ErrorKind, evaluate, parse};

    struct Case {
        name: &'static str,
        source: &'static str,
        expected: Expected,
    }

    enum Expected {
        Output(&'static str),
        Error(ErrorKind),
    }

    const CASES: &[Case] = &[
        Case { name: "S1 print integer", source: "print 42", expected: Expected::Output("42\n") },
        Case {
            name: "S2 semicolon suppresses newline",
            source: "a := 5 b := a print b;",
            expected: Expected::Output("5"),
        },
        Case { name: "S3 print char", source: "print char 65", expected: Expected::Output("A\n") },
        Case {
            name: "S4 print string sequence",
            source: "print string \"hi\";print string \"!\"",
            expected: Expected::Output("hi!\n"),
        },
        Case {
            name: "S5 saturated block fires immediately",
            source: "r := { a := 1 b := a } print r.b",
            expected: Expected::Output("1\n"),
        },
        Case {
            name: "S6 malingering block fires on drain",
            source: "r := { x := ^ y := x } r.x := 7 print r.y",
            expected: Expected::Output("7\n"),
        },
        Case {
            name: "unassigned read is an error",
            source: "a := b",
            expected: Expected::Error(ErrorKind::UnassignedVariable),
        },
        Case {
            name: "writing an undeclared member is undefined",
            source: "r := { a := 1 } r.c := 2",
            expected: Expected::Error(ErrorKind::UndefinedVariable),
        },
        Case {
            name: "writing a non-pending member while a hole remains is unresolved",
            source: "r := { a := b c := b } r.a := 1",
            expected: Expected::Error(ErrorKind::UnresolvedStore),
        },
    ];

    pub fn run() -> bool {
        let mut all_passed = true;
        for case in CASES {
            let outcome = parse(case.source).and_then(|program| {
                let mut sink = CollectStringPrint::new();
                evaluate(&program, &mut sink).map(|()| sink.into_output())
            });
            let passed = match (&outcome, &case.expected) {
                (Ok(output), Expected::Output(expected)) => output == expected,
                (Err(err), Expected::Error(kind)) => err.kind == *kind,
                _ => false,
            };
            all_passed &= passed;
            println!("{} ... {}", case.name, if passed { "ok" } else { "FAILED" });
            if !passed {
                println!("  got: {outcome:?}");
            }
        }
        if all_passed {
            println!("all {} self-tests passed", CASES.len());
        } else {
            println!("self-tests failed");
        }
        all_passed
    }
}
