//! Compiling core of a minimal Forth.  Word definitions, literals and structured control flow are
//! turned into threaded code inside one flat image of cells that also holds the dictionary.

/// Module for the instructions and the compilers that emit them.
pub mod lang;

/// Module for the image, the dictionary, error reporting and the interpreter that runs compiled
/// words.
pub mod runtime;

pub use lang::{
    code::{Instruction, OpCode},
    compilation::Compiler,
};
pub use runtime::{
    config::Config,
    data_structures::cell::Address,
    error::{Result, ScriptError},
    interpreter::{Interpreter, InterpreterStack},
};
