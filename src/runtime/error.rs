use std::{ fmt::{ self, Debug, Formatter },
           process::{ ExitCode, Termination } };
use thiserror::Error;
use crate::runtime::data_structures::cell::{ Address, CellKind };



pub type Result<T> = std::result::Result<T, ScriptError>;



/// Any error raised while compiling into, or executing from, the image.  None of these are
/// transient.  The operation that raised it has not been partially applied and the caller decides
/// whether to abandon the session or skip ahead to the next definition.
#[derive(Error, Clone, PartialEq, Eq)]
pub enum ScriptError
{
    /// The word name does not fit in the bounded name field of a dictionary header.
    #[error("Word name '{name}' is {length} bytes long, the limit is {max} bytes.")]
    NameTooLong { name: String, length: usize, max: usize },

    /// A call was compiled to a word that is not in the dictionary at that point.
    #[error("Word '{0}' has not been defined.")]
    UnresolvedWord(String),

    /// A control-flow directive found no matching mark, or marks were left pending.
    #[error("Unbalanced control flow: {0}")]
    UnbalancedControlFlow(String),

    /// The image has a hard size limit and the allocation would cross it.
    #[error("Allocating {requested} cell(s) at {frontier} exceeds the image limit of {limit} cells.")]
    OutOfAddressSpace { frontier: Address, requested: usize, limit: usize },

    /// An access to a cell that has never been allocated.
    #[error("Address {0} is outside of the image.")]
    AddressOutOfBounds(Address),

    /// A typed cell access found a different kind of content than it asked for.
    #[error("Cell at {address} holds {found}, expected {expected}.")]
    CellTypeMismatch { address: Address, expected: CellKind, found: CellKind },

    /// An instruction operand that should hold an address is negative.
    #[error("Operand {0} is not a valid address.")]
    InvalidAddress(i64),

    /// An address too large to be carried in an instruction operand or data cell.
    #[error("Address {0} does not fit in an operand.")]
    OperandOverflow(Address),

    /// The executor popped from an empty stack.
    #[error("Stack underflow.")]
    StackUnderflow,

    /// A primitive word has no handler in the built-in table.
    #[error("No built-in handler for primitive '{0}'.")]
    UnknownPrimitive(String),

    /// The executor reached an instruction it can not run in that position.
    #[error("Can not execute {instruction} at {address}.")]
    InvalidInstruction { address: Address, instruction: String },

    /// Execution ran for longer than the configured step limit.
    #[error("Execution stopped after {0} steps.")]
    StepLimitExceeded(usize),

    /// A configuration value could not be understood.
    #[error("Invalid configuration value for {key}: '{value}'.")]
    InvalidConfig { key: String, value: String }
}


/// When returned from main, convert the error result to an operating system exit code.
impl Termination for ScriptError
{
    /// Because this type represents an error, the exit code is always FAILURE.
    fn report(self) -> ExitCode
    {
        eprintln!("Error: {}", self);
        ExitCode::FAILURE
    }
}


/// Errors returned from main are reported through Debug, so keep it as readable as Display.
impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    /// Is this one of the compile-time structural errors, as opposed to a storage or execution
    /// failure?
    pub fn is_compile_error(&self) -> bool
    {
        matches!(self,
                 ScriptError::NameTooLong { .. }
                 | ScriptError::UnresolvedWord(_)
                 | ScriptError::UnbalancedControlFlow(_)
                 | ScriptError::OutOfAddressSpace { .. })
    }
}



/// Convenience for building an UnbalancedControlFlow error wrapped in a Result::Err.
pub fn unbalanced<T>(message: &str) -> Result<T>
{
    Err(ScriptError::UnbalancedControlFlow(message.to_string()))
}
