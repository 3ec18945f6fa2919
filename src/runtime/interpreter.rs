use crate::{
    lang::{code::OpCode, compilation::Compiler},
    runtime::{
        built_ins::find_primitive,
        config::Config,
        data_structures::{
            cell::Address,
            dictionary::{Dictionary, DictionaryEntry},
            image::Image,
        },
        error::{self, ScriptError},
    },
};
use log::trace;

/// The data stack of values managed by the interpreter.
pub type ValueStack = Vec<i64>;

/// Trait for managing the interpreter's data stack.  This is the view of the interpreter the
/// built-in primitives get.
pub trait InterpreterStack {
    /// The full data stack, bottom first.
    fn stack(&self) -> &ValueStack;

    /// Push a value onto the stack.
    fn push(&mut self, value: i64);

    /// Pop a value from the stack.  If the stack is empty a stack underflow error is returned.
    fn pop(&mut self) -> error::Result<i64>;

    /// Pop the top value and interpret it as an image address.
    fn pop_as_address(&mut self) -> error::Result<Address> {
        let value = self.pop()?;
        Address::from_operand(value).ok_or(ScriptError::InvalidAddress(value))
    }

    /// Pop the top value as a flag, anything but zero is true.
    fn pop_as_bool(&mut self) -> error::Result<bool> {
        Ok(self.pop()? != 0)
    }
}

/// Runs compiled words straight out of the image.  Colon words are entered through the return
/// stack rather than by recursion, so deep call chains only cost return stack entries.
pub struct Interpreter {
    stack: ValueStack,
    return_stack: Vec<Address>,
    step_limit: usize,
    steps: usize,
}

impl InterpreterStack for Interpreter {
    fn stack(&self) -> &ValueStack {
        &self.stack
    }

    fn push(&mut self, value: i64) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<i64> {
        self.stack.pop().ok_or(ScriptError::StackUnderflow)
    }
}

impl Interpreter {
    pub fn new(config: &Config) -> Interpreter {
        Interpreter {
            stack: ValueStack::new(),
            return_stack: Vec::new(),
            step_limit: config.step_limit,
            steps: 0,
        }
    }

    /// Look up a word by name and execute it.
    pub fn execute_word(&mut self, compiler: &mut Compiler, name: &str) -> error::Result<()> {
        let address = compiler
            .resolve(name)
            .ok_or_else(|| ScriptError::UnresolvedWord(name.to_string()))?;

        self.execute_entry(compiler, address)
    }

    /// Execute the word whose dictionary entry is at `address`.
    pub fn execute_entry(&mut self, compiler: &mut Compiler, address: Address) -> error::Result<()> {
        self.steps = 0;
        self.return_stack.clear();

        let entry = compiler.dictionary.entry(&compiler.image, address)?;

        trace!("execute '{}' at {}", entry.name, address);
        self.invoke(&mut compiler.image, &compiler.dictionary, &entry)
    }

    /// Run a word according to it's reference instruction.
    fn invoke(
        &mut self,
        image: &mut Image,
        dictionary: &Dictionary,
        entry: &DictionaryEntry,
    ) -> error::Result<()> {
        let reference = entry.reference;

        match reference.opcode {
            OpCode::Invalid => {
                let handler = find_primitive(&entry.name)
                    .ok_or_else(|| ScriptError::UnknownPrimitive(entry.name.clone()))?;
                handler(self, image)
            }

            OpCode::DoLiteral | OpCode::DoVariable | OpCode::DoConstant => {
                self.push(reference.operand);
                Ok(())
            }

            OpCode::DoColon => self.run_body(image, dictionary, reference.target()?),

            _ => Err(ScriptError::InvalidInstruction {
                address: entry.address,
                instruction: reference.to_string(),
            }),
        }
    }

    /// The inner interpreter.  Runs threaded code from `start` until the matching DoSemicolon.
    fn run_body(
        &mut self,
        image: &mut Image,
        dictionary: &Dictionary,
        start: Address,
    ) -> error::Result<()> {
        let base = self.return_stack.len();
        let mut ip = start;

        loop {
            self.steps += 1;

            if self.steps > self.step_limit {
                return Err(ScriptError::StepLimitExceeded(self.step_limit));
            }

            let instruction = image.read_instruction(ip)?;

            trace!("{:6}: {}  {:?}", ip, instruction, self.stack);

            ip = match instruction.opcode {
                OpCode::DoLiteral | OpCode::DoVariable | OpCode::DoConstant => {
                    self.push(instruction.operand);
                    ip.offset(1)
                }

                OpCode::DoColon => {
                    let entry = dictionary.entry(image, instruction.target()?)?;

                    if entry.reference.opcode == OpCode::DoColon {
                        self.return_stack.push(ip.offset(1));
                        entry.reference.target()?
                    } else {
                        self.invoke(image, dictionary, &entry)?;
                        ip.offset(1)
                    }
                }

                OpCode::DoSemicolon => {
                    if self.return_stack.len() == base {
                        return Ok(());
                    }

                    match self.return_stack.pop() {
                        Some(address) => address,
                        None => return Ok(()),
                    }
                }

                OpCode::ZeroBranch => {
                    if self.pop_as_bool()? {
                        ip.offset(1)
                    } else {
                        instruction.target()?
                    }
                }

                OpCode::Branch => instruction.target()?,

                OpCode::Invalid => {
                    return Err(ScriptError::InvalidInstruction {
                        address: ip,
                        instruction: instruction.to_string(),
                    });
                }
            };
        }
    }
}
