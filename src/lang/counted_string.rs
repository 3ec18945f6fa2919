use crate::runtime::{
    data_structures::cell::NAME_BYTES_PER_CELL,
    error::{self, ScriptError},
};

/// How many cells a dictionary header reserves for the word's name.
pub const NAME_CELLS: usize = 4;

/// The longest name that fits.  One byte of the field is taken by the length count.
pub const MAX_NAME_LENGTH: usize = NAME_CELLS * NAME_BYTES_PER_CELL - 1;

/// The name field exactly as it is laid out across the header's name cells.
pub type NameField = [[u8; NAME_BYTES_PER_CELL]; NAME_CELLS];

/// Pack a name into a counted string field: a length byte followed by the name's bytes, padded
/// with zeros.  Names that do not fit are rejected, never truncated.
pub fn encode(name: &str) -> error::Result<NameField> {
    let bytes = name.as_bytes();

    if bytes.len() > MAX_NAME_LENGTH {
        return Err(ScriptError::NameTooLong {
            name: name.to_string(),
            length: bytes.len(),
            max: MAX_NAME_LENGTH,
        });
    }

    let mut flat = [0u8; NAME_CELLS * NAME_BYTES_PER_CELL];

    flat[0] = bytes.len() as u8;
    flat[1..=bytes.len()].copy_from_slice(bytes);

    let mut field: NameField = [[0; NAME_BYTES_PER_CELL]; NAME_CELLS];

    for (cell, chunk) in field.iter_mut().zip(flat.chunks(NAME_BYTES_PER_CELL)) {
        cell.copy_from_slice(chunk);
    }

    Ok(field)
}

/// Unpack a counted string field back into the name.  A count larger than the field is clamped,
/// and bytes that are not valid UTF-8 are replaced.
pub fn decode(field: &NameField) -> String {
    let flat: Vec<u8> = field.iter().flatten().copied().collect();
    let length = (flat[0] as usize).min(MAX_NAME_LENGTH);

    String::from_utf8_lossy(&flat[1..=length]).into_owned()
}
