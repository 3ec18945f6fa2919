use crate::{
    lang::code::Instruction,
    runtime::{
        data_structures::cell::{Address, Cell, CellKind, NAME_BYTES_PER_CELL},
        error::{self, ScriptError},
    },
};
/// The flat cell storage shared by the dictionary, compiled code and data.  Cells are never moved
/// once written, the image only ever grows at its end.
///
/// All access is checked twice: the address must have been allocated, and typed reads and writes
/// must find the kind of cell they expect.
pub struct Image {
    cells: Vec<Cell>,
    max_cells: Option<usize>,
}

impl Default for Image {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Image {
    /// Create an empty image, optionally with a hard limit on the number of cells.
    pub fn new(max_cells: Option<usize>) -> Image {
        Image {
            cells: Vec::new(),
            max_cells,
        }
    }

    /// The number of cells currently backed by storage.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn max_cells(&self) -> Option<usize> {
        self.max_cells
    }

    /// Drop every cell, used when a session is reset.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Iterate over every cell along with it's address.
    pub fn iter(&self) -> impl Iterator<Item = (Address, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (Address::new(index), cell))
    }

    /// Make sure storage exists for every address below `length`.  New cells start out empty.
    pub fn grow_to(&mut self, length: usize) -> error::Result<()> {
        if let Some(limit) = self.max_cells {
            if length > limit {
                return Err(ScriptError::OutOfAddressSpace {
                    frontier: Address::new(self.cells.len()),
                    requested: length.saturating_sub(self.cells.len()),
                    limit,
                });
            }
        }

        if length > self.cells.len() {
            self.cells.resize(length, Cell::Empty);
        }

        Ok(())
    }

    /// Checked access to a cell of any kind.
    pub fn cell(&self, address: Address) -> error::Result<&Cell> {
        self.cells
            .get(address.index())
            .ok_or(ScriptError::AddressOutOfBounds(address))
    }

    /// Fill a freshly allocated cell.  Cells are written once this way, anything already written
    /// is refused rather than overwritten.
    pub fn initialize(&mut self, address: Address, cell: Cell) -> error::Result<()> {
        match self.cell(address)? {
            Cell::Empty => self.write(address, cell),
            other => Err(mismatch(address, CellKind::Empty, other)),
        }
    }

    fn write(&mut self, address: Address, cell: Cell) -> error::Result<()> {
        let slot = self
            .cells
            .get_mut(address.index())
            .ok_or(ScriptError::AddressOutOfBounds(address))?;

        *slot = cell;
        Ok(())
    }

    /// Read a data cell as an integer.  The frontier and last entry cells read as the address they
    /// hold, but can not be stored into.
    pub fn get_cell(&self, address: Address) -> error::Result<i64> {
        match self.cell(address)? {
            Cell::Data(value) => Ok(*value),
            Cell::Frontier(held) | Cell::LastEntry(held) => held.as_operand(),
            other => Err(mismatch(address, CellKind::Data, other)),
        }
    }

    /// Store an integer.  Only empty or data cells may be written this way, code, headers and the
    /// bootstrap cells are never silently turned into data.
    pub fn set_cell(&mut self, address: Address, value: i64) -> error::Result<()> {
        match self.cell(address)? {
            Cell::Empty | Cell::Data(_) => self.write(address, Cell::Data(value)),
            other => Err(mismatch(address, CellKind::Data, other)),
        }
    }

    /// Read an instruction from a word body.
    pub fn read_instruction(&self, address: Address) -> error::Result<Instruction> {
        match self.cell(address)? {
            Cell::Instruction(instruction) => Ok(*instruction),
            other => Err(mismatch(address, CellKind::Instruction, other)),
        }
    }

    /// Replace the operand of an instruction already in the image, keeping it's opcode.
    pub fn patch_operand(&mut self, address: Address, operand: i64) -> error::Result<Instruction> {
        let mut instruction = self.read_instruction(address)?;

        instruction.operand = operand;
        self.write(address, Cell::Instruction(instruction))?;

        Ok(instruction)
    }

    /// Read the previous link of a dictionary header.
    pub fn read_link(&self, address: Address) -> error::Result<Address> {
        match self.cell(address)? {
            Cell::Link(previous) => Ok(*previous),
            other => Err(mismatch(address, CellKind::Link, other)),
        }
    }

    /// Read one cell worth of a dictionary header's name field.
    pub fn read_name(&self, address: Address) -> error::Result<[u8; NAME_BYTES_PER_CELL]> {
        match self.cell(address)? {
            Cell::Name(bytes) => Ok(*bytes),
            other => Err(mismatch(address, CellKind::Name, other)),
        }
    }

    /// Read the reference instruction of a dictionary header.
    pub fn read_reference(&self, address: Address) -> error::Result<Instruction> {
        match self.cell(address)? {
            Cell::Reference(instruction) => Ok(*instruction),
            other => Err(mismatch(address, CellKind::Reference, other)),
        }
    }

    /// Read the allocation frontier.
    pub fn read_frontier(&self, address: Address) -> error::Result<Address> {
        match self.cell(address)? {
            Cell::Frontier(frontier) => Ok(*frontier),
            other => Err(mismatch(address, CellKind::Frontier, other)),
        }
    }

    /// Move the allocation frontier.  The cell must be fresh or already hold the frontier.
    pub fn write_frontier(&mut self, address: Address, frontier: Address) -> error::Result<()> {
        match self.cell(address)? {
            Cell::Empty | Cell::Frontier(_) => self.write(address, Cell::Frontier(frontier)),
            other => Err(mismatch(address, CellKind::Frontier, other)),
        }
    }

    /// Read the address of the newest dictionary entry.
    pub fn read_last_entry(&self, address: Address) -> error::Result<Address> {
        match self.cell(address)? {
            Cell::LastEntry(last) => Ok(*last),
            other => Err(mismatch(address, CellKind::LastEntry, other)),
        }
    }

    /// Point the last entry cell at a new header.  The cell must be fresh or already hold the link.
    pub fn write_last_entry(&mut self, address: Address, last: Address) -> error::Result<()> {
        match self.cell(address)? {
            Cell::Empty | Cell::LastEntry(_) => self.write(address, Cell::LastEntry(last)),
            other => Err(mismatch(address, CellKind::LastEntry, other)),
        }
    }

    /// Replace the reference instruction of a dictionary header in place.
    pub fn write_reference(
        &mut self,
        address: Address,
        instruction: Instruction,
    ) -> error::Result<()> {
        match self.cell(address)? {
            Cell::Reference(_) => self.write(address, Cell::Reference(instruction)),
            other => Err(mismatch(address, CellKind::Reference, other)),
        }
    }
}

fn mismatch(address: Address, expected: CellKind, found: &Cell) -> ScriptError {
    ScriptError::CellTypeMismatch {
        address,
        expected,
        found: found.kind(),
    }
}
