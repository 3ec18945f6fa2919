use crate::{
    lang::{
        code::{Instruction, OpCode},
        control_flow::PatchMark,
    },
    runtime::{
        config::Config,
        data_structures::{
            allocator::Allocator,
            cell::{Address, Cell},
            dictionary::{Dictionary, EntryHandle, HEADER_CELLS},
            image::Image,
        },
        error::{self, ScriptError, unbalanced},
    },
};
use log::debug;

/// The compiler of a single session.  It owns the image and appends dictionary entries, code and
/// data to it in source order.  Every operation returns the address of what it produced.
///
/// Operations either complete or fail without changing the image, the dictionary or the pending
/// control-flow marks.
pub struct Compiler {
    pub(crate) image: Image,
    pub(crate) allocator: Allocator,
    pub(crate) dictionary: Dictionary,
    pub(crate) marks: Vec<PatchMark>,
}

impl Compiler {
    /// Create a compiler with a freshly bootstrapped image.
    pub fn new(config: &Config) -> error::Result<Compiler> {
        let mut image = Image::new(config.max_cells);
        let mut allocator = Allocator::bootstrap(&mut image)?;
        let dictionary = Dictionary::bootstrap(&mut image, &mut allocator)?;

        Ok(Compiler {
            image,
            allocator,
            dictionary,
            marks: Vec::new(),
        })
    }

    /// Throw away everything compiled so far and start a fresh session on the same settings.
    pub fn reset(&mut self) -> error::Result<()> {
        self.allocator = Allocator::bootstrap(&mut self.image)?;
        self.dictionary = Dictionary::bootstrap(&mut self.image, &mut self.allocator)?;
        self.marks.clear();

        debug!("reset, frontier at {}", self.frontier()?);

        Ok(())
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The next address that will be allocated.
    pub fn frontier(&self) -> error::Result<Address> {
        self.allocator.frontier(&self.image)
    }

    /// Bump allocate `size` cells.
    pub fn allocate(&mut self, size: usize) -> error::Result<Address> {
        self.allocator.allocate(&mut self.image, size)
    }

    /// Most recent entry for the name, if any.
    pub fn resolve(&self, name: &str) -> Option<Address> {
        self.dictionary.resolve(name)
    }

    /// Create an entry for a primitive.  The placeholder reference tells the executor to look the
    /// word up in it's built-in table.
    pub fn compile_primitive(&mut self, name: &str) -> error::Result<Address> {
        let address = self.create_entry(name, Instruction::op(OpCode::Invalid))?;

        log_cell(address, &format!(": {}", name));
        Ok(address)
    }

    /// Create an entry whose whole behavior is the given instruction.
    pub fn compile_word(
        &mut self,
        name: &str,
        opcode: OpCode,
        operand: i64,
    ) -> error::Result<Address> {
        self.compile_word_with(name, Instruction::new(opcode, operand))
    }

    /// Create an entry with a ready made reference instruction.
    pub fn compile_word_with(
        &mut self,
        name: &str,
        reference: Instruction,
    ) -> error::Result<Address> {
        let address = self.create_entry(name, reference)?;

        log_cell(address, &format!(": {} {}", name, reference));
        Ok(address)
    }

    /// Append one instruction at the frontier.
    pub fn compile_instruction(&mut self, instruction: Instruction) -> error::Result<Address> {
        let address = self.allocate(1)?;
        self.image.initialize(address, Cell::Instruction(instruction))?;

        log_cell(address, &instruction.to_string());
        Ok(address)
    }

    /// Append an instruction that pushes the value.
    pub fn compile_literal(&mut self, value: i64) -> error::Result<Address> {
        self.compile_instruction(Instruction::new(OpCode::DoLiteral, value))
    }

    /// Append one raw data cell.
    pub fn compile_data(&mut self, value: i64) -> error::Result<Address> {
        let address = self.allocate(1)?;
        self.image.initialize(address, Cell::Data(value))?;

        log_cell(address, &value.to_string());
        Ok(address)
    }

    /// Define a variable.  The header comes first and the variable's storage cell immediately
    /// after it, then the header's reference is pointed at that cell.
    pub fn compile_variable(&mut self, name: &str, initial_value: i64) -> error::Result<Address> {
        self.ensure_room(HEADER_CELLS + 1)?;

        let handle = self.create_handle(name, Instruction::op(OpCode::Invalid))?;
        let data = self.compile_data(initial_value)?;
        let reference = Instruction::with_target(OpCode::DoVariable, data)?;

        self.dictionary.set_reference(&mut self.image, handle, reference)?;

        log_cell(handle.address(), &format!(": {} {}", name, reference));
        Ok(handle.address())
    }

    /// Define a constant.  The value travels in the reference instruction, there is no body.
    pub fn compile_constant(&mut self, name: &str, value: i64) -> error::Result<Address> {
        self.compile_word(name, OpCode::DoConstant, value)
    }

    /// Start a colon definition.  Its body begins right after its own header, which is where the
    /// following instructions will be appended.
    pub fn compile_colon_start(&mut self, name: &str) -> error::Result<Address> {
        let handle = self.create_handle(name, Instruction::op(OpCode::Invalid))?;
        let reference = Instruction::with_target(OpCode::DoColon, handle.body_address())?;

        self.dictionary.set_reference(&mut self.image, handle, reference)?;

        log_cell(handle.address(), &format!(": {} {}", name, reference));
        Ok(handle.address())
    }

    /// Terminate the current colon body.  Any control-flow construct still open is an error.
    pub fn compile_colon_end(&mut self) -> error::Result<Address> {
        if let Some(mark) = self.marks.last() {
            return unbalanced(&format!(
                "{} still open at the end of the definition.",
                mark
            ));
        }

        self.compile_instruction(Instruction::op(OpCode::DoSemicolon))
    }

    /// Append a call to the named word.  The name is bound now, to whatever entry is newest at
    /// this point of the compilation.
    pub fn compile_call_by_name(&mut self, name: &str) -> error::Result<Address> {
        let target = self
            .resolve(name)
            .ok_or_else(|| ScriptError::UnresolvedWord(name.to_string()))?;
        let address = self.compile_instruction(Instruction::with_target(OpCode::DoColon, target)?)?;

        debug!("{:6}: call {}", address, name);
        Ok(address)
    }

    /// Fail with OutOfAddressSpace up front when a multi step operation could not finish.
    fn ensure_room(&self, cells: usize) -> error::Result<()> {
        if let Some(limit) = self.image.max_cells() {
            let frontier = self.frontier()?;

            if frontier.index() + cells > limit {
                return Err(ScriptError::OutOfAddressSpace {
                    frontier,
                    requested: cells,
                    limit,
                });
            }
        }

        Ok(())
    }

    fn create_handle(&mut self, name: &str, reference: Instruction) -> error::Result<EntryHandle> {
        self.dictionary
            .create_entry(&mut self.image, &mut self.allocator, name, reference)
    }

    fn create_entry(&mut self, name: &str, reference: Instruction) -> error::Result<Address> {
        self.create_handle(name, reference).map(EntryHandle::address)
    }
}

/// Trace every cell the compiler produces.
pub(crate) fn log_cell(address: Address, text: &str) {
    debug!("{:6}: {}", address, text);
}
