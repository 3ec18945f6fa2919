use crate::runtime::{
    built_ins::WordHandler,
    data_structures::image::Image,
    error,
    interpreter::InterpreterStack,
};

/// Read the data cell at an address.
///
/// Signature: `address -- value`
fn word_fetch(interpreter: &mut dyn InterpreterStack, image: &mut Image) -> error::Result<()> {
    let address = interpreter.pop_as_address()?;
    let value = image.get_cell(address)?;

    interpreter.push(value);
    Ok(())
}

/// Write a value into the data cell at an address.
///
/// Signature: `value address -- `
fn word_store(interpreter: &mut dyn InterpreterStack, image: &mut Image) -> error::Result<()> {
    let address = interpreter.pop_as_address()?;
    let value = interpreter.pop()?;

    image.set_cell(address, value)
}

pub fn get_words() -> Vec<(&'static str, WordHandler)> {
    let words: [(&'static str, WordHandler); 2] = [("@", word_fetch), ("!", word_store)];

    words.to_vec()
}
