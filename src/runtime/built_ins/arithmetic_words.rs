use crate::runtime::{
    built_ins::WordHandler,
    data_structures::image::Image,
    error,
    interpreter::InterpreterStack,
};

/// Forth's true flag, all bits set.
const TRUE: i64 = -1;

fn flag(value: bool) -> i64 {
    if value { TRUE } else { 0 }
}

/// Pop two values and push the result of combining them.
fn binary(
    interpreter: &mut dyn InterpreterStack,
    operation: fn(i64, i64) -> i64,
) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(operation(a, b));
    Ok(())
}

/// Signature: `a b -- a+b`
fn word_add(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, i64::wrapping_add)
}

/// Signature: `a b -- a-b`
fn word_subtract(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, i64::wrapping_sub)
}

/// Signature: `a b -- a*b`
fn word_multiply(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, i64::wrapping_mul)
}

/// Signature: `n -- n+1`
fn word_increment(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let n = interpreter.pop()?;
    interpreter.push(n.wrapping_add(1));
    Ok(())
}

/// Signature: `n -- n-1`
fn word_decrement(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let n = interpreter.pop()?;
    interpreter.push(n.wrapping_sub(1));
    Ok(())
}

/// Signature: `a b -- flag`
fn word_equal(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, |a, b| flag(a == b))
}

/// Signature: `n -- flag`
fn word_zero_equal(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    let n = interpreter.pop()?;
    interpreter.push(flag(n == 0));
    Ok(())
}

/// Signature: `a b -- flag`
fn word_less(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, |a, b| flag(a < b))
}

/// Signature: `a b -- flag`
fn word_greater(interpreter: &mut dyn InterpreterStack, _image: &mut Image) -> error::Result<()> {
    binary(interpreter, |a, b| flag(a > b))
}

pub fn get_words() -> Vec<(&'static str, WordHandler)> {
    let words: [(&'static str, WordHandler); 9] = [
        ("+", word_add),
        ("-", word_subtract),
        ("*", word_multiply),
        ("1+", word_increment),
        ("1-", word_decrement),
        ("=", word_equal),
        ("0=", word_zero_equal),
        ("<", word_less),
        (">", word_greater),
    ];

    words.to_vec()
}
