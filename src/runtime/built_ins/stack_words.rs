use crate::runtime::{
    built_ins::WordHandler,
    data_structures::image::Image,
    error,
    interpreter::InterpreterStack,
};

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(value);
    interpreter.push(value);

    Ok(())
}

/// Drop the top value on the data stack.
///
/// Signature: `value -- `
fn word_drop(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let _ = interpreter.pop()?;

    Ok(())
}

/// Swap the top 2 values on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b);
    interpreter.push(a);

    Ok(())
}

/// Copy the second value over the top one.
///
/// Signature: `a b -- a b a`
fn word_over(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a);
    interpreter.push(b);
    interpreter.push(a);

    Ok(())
}

pub fn get_words() -> Vec<(&'static str, WordHandler)> {
    let words: [(&'static str, WordHandler); 4] = [
        ("dup", word_dup),
        ("drop", word_drop),
        ("swap", word_swap),
        ("over", word_over),
    ];

    words.to_vec()
}
