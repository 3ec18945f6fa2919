use crate::runtime::{
    data_structures::{cell::Address, image::Image},
    error::{self, ScriptError},
};
use std::fmt::{self, Display, Formatter};

/// Operand written into a branch before its target is known.  The compiler always patches it
/// before a well formed construct is complete.
pub const UNRESOLVED_TARGET: i64 = -1;

/// The operations of the threaded code.  Every instruction is one of these tags paired with a
/// single integer operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpCode {
    /// Placeholder.  As a dictionary reference it marks a primitive word that the executor
    /// dispatches by name.
    #[default]
    Invalid,

    /// Push the operand as a value.
    DoLiteral,

    /// The operand is the address of the variable's data cell.  Executing it pushes that address.
    DoVariable,

    /// The operand is the constant's value, carried inline.
    DoConstant,

    /// Enter a word.  As a reference the operand is the word's body address, inside a body the
    /// operand is the address of the called word's dictionary entry.
    DoColon,

    /// Return from a word body.
    DoSemicolon,

    /// Pop a value.  If it is zero jump to the operand address, otherwise fall through.
    ZeroBranch,

    /// Jump to the operand address.
    Branch,
}

impl OpCode {
    /// Does this opcode carry a jump target as its operand?
    pub fn is_branch(self) -> bool {
        matches!(self, OpCode::ZeroBranch | OpCode::Branch)
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            OpCode::Invalid => "Invalid",
            OpCode::DoLiteral => "DoLiteral",
            OpCode::DoVariable => "DoVariable",
            OpCode::DoConstant => "DoConstant",
            OpCode::DoColon => "DoColon",
            OpCode::DoSemicolon => "DoSemicolon",
            OpCode::ZeroBranch => "ZeroBranch",
            OpCode::Branch => "Branch",
        };

        f.pad(name)
    }
}

/// A single fixed width instruction of the threaded code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: OpCode,

    /// The one operand, interpreted according to the opcode.
    pub operand: i64,
}

/// Allow for pretty printing of the instruction and it's operand.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.opcode {
            OpCode::Invalid | OpCode::DoSemicolon if self.operand == 0 => {
                write!(f, "{}", self.opcode)
            }
            _ if self.opcode.is_branch() && self.operand == UNRESOLVED_TARGET => {
                write!(f, "{:<12} ?", self.opcode)
            }
            _ => write!(f, "{:<12} {}", self.opcode, self.operand),
        }
    }
}

impl Instruction {
    /// Create a new instruction from an opcode and operand.
    pub fn new(opcode: OpCode, operand: i64) -> Instruction {
        Instruction { opcode, operand }
    }

    /// An instruction whose operand is not used.
    pub fn op(opcode: OpCode) -> Instruction {
        Instruction::new(opcode, 0)
    }

    /// An instruction whose operand is an image address.
    pub fn with_target(opcode: OpCode, address: Address) -> error::Result<Instruction> {
        Ok(Instruction::new(opcode, address.as_operand()?))
    }

    /// Interpret the operand as an address.  Unresolved branches and other negative operands are
    /// rejected.
    pub fn target(&self) -> error::Result<Address> {
        Address::from_operand(self.operand).ok_or(ScriptError::InvalidAddress(self.operand))
    }

    /// Is this a branch still waiting for its target?
    pub fn is_unresolved(&self) -> bool {
        self.opcode.is_branch() && self.operand == UNRESOLVED_TARGET
    }
}

/// Pretty print every cell of the image, one per line, for debugging purposes.
pub fn pretty_print_image(image: &Image) -> String {
    use std::fmt::Write;

    let mut result = String::with_capacity(image.len() * 24);

    for (address, cell) in image.iter() {
        writeln!(&mut result, "{:6}: {}", address, cell)
            .expect("Writing to String should never fail.");
    }

    result
}
