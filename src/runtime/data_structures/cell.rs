use crate::{
    lang::code::Instruction,
    runtime::error::{self, ScriptError},
};
use std::fmt::{self, Display, Formatter};

/// The number of bytes of a word name packed into one name cell.
pub const NAME_BYTES_PER_CELL: usize = 8;

/// Index of a cell within the image.  Address zero holds the allocation frontier, so a zero link
/// can never point at a real dictionary entry and doubles as the end of list marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
    /// The end of the dictionary list.
    pub const NULL: Address = Address(0);

    pub const fn new(index: usize) -> Address {
        Address(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The address `cells` cells further into the image.
    pub fn offset(self, cells: usize) -> Address {
        Address(self.0 + cells)
    }

    /// The address as it is stored in an instruction operand or data cell.
    pub fn as_operand(self) -> error::Result<i64> {
        i64::try_from(self.0).map_err(|_| ScriptError::OperandOverflow(self))
    }

    /// Convert an operand back into an address, if it is one.
    pub fn from_operand(operand: i64) -> Option<Address> {
        usize::try_from(operand).ok().map(Address)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The kind of content a cell holds.  Used for checked access and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Data,
    Instruction,
    Link,
    Name,
    Reference,
    Frontier,
    LastEntry,
}

impl Display for CellKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            CellKind::Empty => "an empty cell",
            CellKind::Data => "data",
            CellKind::Instruction => "an instruction",
            CellKind::Link => "a dictionary link",
            CellKind::Name => "name bytes",
            CellKind::Reference => "a reference instruction",
            CellKind::Frontier => "the allocation frontier",
            CellKind::LastEntry => "the last entry link",
        };

        write!(f, "{}", name)
    }
}

/// One addressable unit of the image.  The same storage is shared by dictionary headers, code and
/// data, so every cell carries a tag saying which of those it currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    /// Allocated but never written.
    #[default]
    Empty,

    /// A raw integer.
    Data(i64),

    /// One instruction of a word body.
    Instruction(Instruction),

    /// The `previous` field of a dictionary header.
    Link(Address),

    /// Part of the bounded name field of a dictionary header.
    Name([u8; NAME_BYTES_PER_CELL]),

    /// The reference instruction of a dictionary header, how the word is invoked.
    Reference(Instruction),

    /// The next free address.  Only the allocator moves it.
    Frontier(Address),

    /// The newest dictionary entry.  Only the dictionary moves it.
    LastEntry(Address),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Empty => CellKind::Empty,
            Cell::Data(_) => CellKind::Data,
            Cell::Instruction(_) => CellKind::Instruction,
            Cell::Link(_) => CellKind::Link,
            Cell::Name(_) => CellKind::Name,
            Cell::Reference(_) => CellKind::Reference,
            Cell::Frontier(_) => CellKind::Frontier,
            Cell::LastEntry(_) => CellKind::LastEntry,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Cell::Empty => write!(f, "-"),
            Cell::Data(value) => write!(f, "data         {}", value),
            Cell::Instruction(instruction) => write!(f, "{}", instruction),
            Cell::Link(previous) => write!(f, "link         {}", previous),
            Cell::Name(bytes) => {
                let text: String = bytes
                    .iter()
                    .map(|&byte| {
                        if byte.is_ascii_graphic() {
                            byte as char
                        } else {
                            '.'
                        }
                    })
                    .collect();
                write!(f, "name         {}", text)
            }
            Cell::Reference(instruction) => write!(f, "ref          {}", instruction),
            Cell::Frontier(address) => write!(f, "frontier     {}", address),
            Cell::LastEntry(address) => write!(f, "last entry   {}", address),
        }
    }
}
