/// The image and the data structures that live in it.
pub mod data_structures;

/// Module for defining the built-in primitive words the interpreter dispatches by name.
pub mod built_ins;

/// Module for defining the error reporting of the compiler and interpreter.
pub mod error;

/// Session settings.
pub mod config;

/// Module for executing compiled words straight out of the image.
pub mod interpreter;
