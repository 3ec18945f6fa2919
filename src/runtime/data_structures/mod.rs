/// The tagged cell and the address type used throughout the image.
pub mod cell;

/// The flat, growable cell storage shared by the dictionary, code and data.
pub mod image;

/// The bump allocator and it's frontier cell.
pub mod allocator;

/// The dictionary module provides the word dictionary: headers linked through the image and the
/// name index kept beside them.
pub mod dictionary;
