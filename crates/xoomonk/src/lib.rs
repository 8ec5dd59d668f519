#![doc = include_str!("../../../README.md")]

pub mod analyser;
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod lexer;
pub mod parser;
pub mod resource;
pub mod store;

pub use crate::{
    ast::{Program, dump},
    error::{ErrorKind, XoomonkError, XoomonkResult},
    evaluator::evaluate,
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    lexer::Position,
    parser::parse,
    resource::{DEFAULT_MAX_RECURSION_DEPTH, RecursionTracker},
    store::{StoreData, Value},
};
