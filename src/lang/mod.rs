/// Module for defining the threaded-code instructions and their diagnostic formatting.
pub mod code;

/// Module for packing word names into the bounded name field of a dictionary header.
pub mod counted_string;

/// Module for compiling words, literals, variables, constants and colon definitions into the
/// image.
pub mod compilation;

/// Module for the structured control-flow constructs, `BEGIN/AGAIN` and `IF/ELSE/ENDIF`, and the
/// branch patching they need.
pub mod control_flow;
