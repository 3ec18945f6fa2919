use crate::{
    lang::compilation::Compiler,
    runtime::{data_structures::image::Image, error, interpreter::InterpreterStack},
};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Words that manipulate the data stack.
mod stack_words;

/// Integer arithmetic and comparison words.
mod arithmetic_words;

/// Words that read and write image cells.
mod memory_words;

/// Handler for a primitive word.  Primitives see the data stack and the image, nothing else.
pub type WordHandler = fn(&mut dyn InterpreterStack, &mut Image) -> error::Result<()>;

lazy_static! {
    // Built-in handlers keyed by word name.  Primitive dictionary entries carry no code of their
    // own, the executor finds their behavior here.
    static ref PRIMITIVES: HashMap<&'static str, WordHandler> = {
        let mut table = HashMap::new();

        for (name, handler) in stack_words::get_words()
            .into_iter()
            .chain(arithmetic_words::get_words())
            .chain(memory_words::get_words())
        {
            let _ = table.insert(name, handler);
        }

        table
    };
}

/// Look up the handler of a primitive by name.
pub fn find_primitive(name: &str) -> Option<WordHandler> {
    PRIMITIVES.get(name).copied()
}

/// Names of every built-in primitive, sorted.
pub fn primitive_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PRIMITIVES.keys().copied().collect();

    names.sort_unstable();
    names
}

/// Define a dictionary entry for every built-in primitive so compiled code can call them by name.
pub fn register_primitives(compiler: &mut Compiler) -> error::Result<()> {
    for name in primitive_names() {
        let _ = compiler.compile_primitive(name)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{config::Config, interpreter::Interpreter};

    fn run(name: &str, input: &[i64]) -> error::Result<Vec<i64>> {
        let mut interpreter = Interpreter::new(&Config::default());
        let mut image = Image::default();

        for value in input {
            interpreter.push(*value);
        }

        let handler = find_primitive(name).expect("primitive should be registered");
        handler(&mut interpreter, &mut image)?;

        Ok(interpreter.stack().clone())
    }

    #[test]
    fn table_holds_every_group() {
        let names = primitive_names();

        for name in ["dup", "swap", "+", "0=", "@", "!"] {
            assert!(names.contains(&name), "missing {}", name);
        }
    }

    #[test]
    fn primitives_follow_forth_stack_order() {
        assert_eq!(run("-", &[10, 3]), Ok(vec![7]));
        assert_eq!(run("swap", &[1, 2]), Ok(vec![2, 1]));
        assert_eq!(run("over", &[1, 2]), Ok(vec![1, 2, 1]));
        assert_eq!(run("<", &[1, 2]), Ok(vec![-1]));
        assert_eq!(run("0=", &[5]), Ok(vec![0]));
        assert_eq!(run("drop", &[]), Err(crate::runtime::error::ScriptError::StackUnderflow));
    }

    #[test]
    fn registration_defines_every_primitive() {
        let mut compiler = Compiler::new(&Config::default()).unwrap();

        register_primitives(&mut compiler).unwrap();

        assert_eq!(compiler.dictionary().len(), primitive_names().len());
        assert!(compiler.resolve("1+").is_some());
    }
}
