use crate::{
    lang::{
        code::{Instruction, OpCode, UNRESOLVED_TARGET},
        compilation::{Compiler, log_cell},
    },
    runtime::{
        data_structures::cell::Address,
        error::{self, unbalanced},
    },
};
use std::fmt::{self, Display, Formatter};

/// An address recorded while a control-flow construct is open.  The tag records which directive
/// pushed it so mismatched constructs are caught instead of patching the wrong instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchMark {
    /// Start of a `BEGIN` loop, the target of the closing backward branch.
    Loop(Address),

    /// The `ZeroBranch` emitted by `IF`, waiting for it's target.
    If(Address),

    /// The `Branch` emitted by `ELSE`, waiting for it's target.
    Else(Address),
}

impl Display for PatchMark {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PatchMark::Loop(address) => write!(f, "BEGIN at {}", address),
            PatchMark::If(address) => write!(f, "IF at {}", address),
            PatchMark::Else(address) => write!(f, "ELSE at {}", address),
        }
    }
}

/// Structured control flow.  Marks are pushed and popped in strict last in first out order that
/// follows the nesting of the constructs.
impl Compiler {
    /// How many constructs are currently open.
    pub fn pending_marks(&self) -> usize {
        self.marks.len()
    }

    /// Check that every construct has been closed.
    pub fn finish(&self) -> error::Result<()> {
        match self.marks.last() {
            Some(mark) => unbalanced(&format!("{} was never closed.", mark)),
            None => Ok(()),
        }
    }

    /// `BEGIN`: remember the loop's re-entry point.  Nothing is emitted.
    pub fn compile_begin(&mut self) -> error::Result<Address> {
        let address = self.frontier()?;

        self.marks.push(PatchMark::Loop(address));
        Ok(address)
    }

    /// `AGAIN`: unconditional backward branch to the matching `BEGIN`.
    pub fn compile_again(&mut self) -> error::Result<Address> {
        let target = match self.marks.last() {
            Some(PatchMark::Loop(address)) => *address,
            Some(mark) => return unbalanced(&format!("AGAIN does not close {}.", mark)),
            None => return unbalanced("AGAIN without a matching BEGIN."),
        };

        let address = self.compile_instruction(Instruction::with_target(OpCode::Branch, target)?)?;

        let _ = self.marks.pop();
        Ok(address)
    }

    /// `IF`: emit a conditional branch with it's target left open.
    pub fn compile_if(&mut self) -> error::Result<Address> {
        let address =
            self.compile_instruction(Instruction::new(OpCode::ZeroBranch, UNRESOLVED_TARGET))?;

        self.marks.push(PatchMark::If(address));
        Ok(address)
    }

    /// `ELSE`: close the true branch with a jump over the false branch, then point the `IF` at
    /// the first instruction of the false branch.
    pub fn compile_else(&mut self) -> error::Result<Address> {
        let if_address = match self.marks.last() {
            Some(PatchMark::If(address)) => *address,
            Some(mark) => return unbalanced(&format!("ELSE does not continue {}.", mark)),
            None => return unbalanced("ELSE without a matching IF."),
        };

        let address =
            self.compile_instruction(Instruction::new(OpCode::Branch, UNRESOLVED_TARGET))?;

        let _ = self.marks.pop();
        self.marks.push(PatchMark::Else(address));

        self.patch(if_address)?;
        Ok(address)
    }

    /// `ENDIF`: point the open branch, from `IF` or `ELSE`, at the join point.  Returns the
    /// address of the patched branch.
    pub fn compile_endif(&mut self) -> error::Result<Address> {
        let address = match self.marks.last() {
            Some(PatchMark::If(address)) | Some(PatchMark::Else(address)) => *address,
            Some(mark) => return unbalanced(&format!("ENDIF does not close {}.", mark)),
            None => return unbalanced("ENDIF without a matching IF."),
        };

        self.patch(address)?;

        let _ = self.marks.pop();
        Ok(address)
    }

    /// Point the branch at `address` to the current frontier.
    fn patch(&mut self, address: Address) -> error::Result<()> {
        let target = self.frontier()?;
        let instruction = self.image.patch_operand(address, target.as_operand()?)?;

        log_cell(address, &instruction.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{config::Config, error::ScriptError};

    fn compiler() -> Compiler {
        Compiler::new(&Config::default()).unwrap()
    }

    fn instruction(compiler: &Compiler, address: Address) -> Instruction {
        compiler.image().read_instruction(address).unwrap()
    }

    #[test]
    fn begin_emits_nothing() {
        let mut compiler = compiler();
        let before = compiler.frontier().unwrap();

        assert_eq!(compiler.compile_begin(), Ok(before));
        assert_eq!(compiler.frontier(), Ok(before));
        assert_eq!(compiler.pending_marks(), 1);
    }

    #[test]
    fn if_without_else_lands_after_the_body() {
        let mut compiler = compiler();

        let branch = compiler.compile_if().unwrap();
        let _ = compiler.compile_literal(1).unwrap();
        let patched = compiler.compile_endif().unwrap();

        assert_eq!(patched, branch);
        assert_eq!(
            instruction(&compiler, branch),
            Instruction::with_target(OpCode::ZeroBranch, branch.offset(2)).unwrap()
        );
        assert_eq!(compiler.finish(), Ok(()));
    }

    #[test]
    fn else_patches_the_if_past_its_own_branch() {
        let mut compiler = compiler();

        let zero_branch = compiler.compile_if().unwrap();
        let _ = compiler.compile_literal(1).unwrap();
        let branch = compiler.compile_else().unwrap();
        let false_start = compiler.compile_literal(2).unwrap();
        let _ = compiler.compile_endif().unwrap();
        let join = compiler.frontier().unwrap();

        assert_eq!(false_start, branch.offset(1));
        assert_eq!(
            instruction(&compiler, zero_branch),
            Instruction::with_target(OpCode::ZeroBranch, false_start).unwrap()
        );
        assert_eq!(
            instruction(&compiler, branch),
            Instruction::with_target(OpCode::Branch, join).unwrap()
        );
    }

    #[test]
    fn again_branches_back_to_begin() {
        let mut compiler = compiler();

        let start = compiler.compile_begin().unwrap();
        let _ = compiler.compile_literal(7).unwrap();
        let branch = compiler.compile_again().unwrap();

        assert_eq!(
            instruction(&compiler, branch),
            Instruction::with_target(OpCode::Branch, start).unwrap()
        );
        assert_eq!(compiler.pending_marks(), 0);
    }

    #[test]
    fn mismatched_directives_leave_the_marks_alone() {
        let mut compiler = compiler();

        let _ = compiler.compile_begin().unwrap();
        let before = compiler.frontier().unwrap();

        assert!(matches!(
            compiler.compile_else(),
            Err(ScriptError::UnbalancedControlFlow(_))
        ));
        assert!(matches!(
            compiler.compile_endif(),
            Err(ScriptError::UnbalancedControlFlow(_))
        ));
        assert_eq!(compiler.frontier(), Ok(before));
        assert_eq!(compiler.pending_marks(), 1);

        let _ = compiler.compile_if().unwrap();

        assert!(matches!(
            compiler.compile_again(),
            Err(ScriptError::UnbalancedControlFlow(_))
        ));
        assert_eq!(compiler.pending_marks(), 2);
    }

    #[test]
    fn colon_end_rejects_open_constructs() {
        let mut compiler = compiler();

        let _ = compiler.compile_colon_start("w").unwrap();
        let _ = compiler.compile_if().unwrap();

        assert!(matches!(
            compiler.compile_colon_end(),
            Err(ScriptError::UnbalancedControlFlow(_))
        ));
        assert!(compiler.finish().is_err());
    }
}
