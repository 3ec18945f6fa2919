use crate::{
    lang::{
        code::Instruction,
        counted_string::{self, NAME_CELLS, NameField},
    },
    runtime::{
        data_structures::{
            allocator::Allocator,
            cell::{Address, Cell},
            image::Image,
        },
        error,
    },
};
use log::trace;
use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Display, Formatter},
};

/// Where the address of the most recently defined entry lives.  It is the second bootstrap
/// allocation, right after the frontier cell.
pub const LAST_ENTRY_ADDRESS: Address = Address::new(1);

/// Offset of the name field within a header.
const NAME_OFFSET: usize = 1;

/// Offset of the reference instruction within a header.
const REFERENCE_OFFSET: usize = NAME_OFFSET + NAME_CELLS;

/// Size of a dictionary header: the previous link, the name field and the reference instruction.
/// A word's body, if it has one, starts immediately after.
pub const HEADER_CELLS: usize = REFERENCE_OFFSET + 1;

/// Returned when an entry is created.  The handle is what allows the entry's reference to be
/// written once the data it depends on has been compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryHandle(Address);

impl EntryHandle {
    /// Address of the entry's header.
    pub fn address(self) -> Address {
        self.0
    }

    /// The address directly after the header.
    pub fn body_address(self) -> Address {
        self.0.offset(HEADER_CELLS)
    }

    fn reference_address(self) -> Address {
        self.0.offset(REFERENCE_OFFSET)
    }
}

/// A dictionary header as decoded from the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Where the header starts.
    pub address: Address,

    /// The entry defined before this one, null at the end of the list.
    pub previous: Address,

    /// The name of the word.
    pub name: String,

    /// How the word is invoked.
    pub reference: Instruction,
}

impl DictionaryEntry {
    pub fn body_address(&self) -> Address {
        self.address.offset(HEADER_CELLS)
    }
}

/// The word dictionary.  The authoritative list lives in the image as headers linked most recent
/// first.  Alongside it we keep an index from each name to it's newest entry, so lookups do not
/// have to walk the image, and a count of every entry created.
///
/// Redefining a name adds a new entry that shadows the old one.  Nothing is ever removed.
pub struct Dictionary {
    last_entry_cell: Address,
    latest: HashMap<String, Address>,
    count: usize,
}

impl Dictionary {
    /// Allocate and clear the last entry cell.  Expects a freshly bootstrapped allocator so the
    /// cell lands at `LAST_ENTRY_ADDRESS`.
    pub fn bootstrap(image: &mut Image, allocator: &mut Allocator) -> error::Result<Dictionary> {
        let last_entry_cell = allocator.allocate(image, 1)?;
        image.write_last_entry(last_entry_cell, Address::NULL)?;

        Ok(Dictionary {
            last_entry_cell,
            latest: HashMap::new(),
            count: 0,
        })
    }

    /// The cell holding the address of the newest entry.
    pub fn last_entry_cell(&self) -> Address {
        self.last_entry_cell
    }

    /// Address of the newest entry, null if nothing has been defined.
    pub fn last_entry(&self, image: &Image) -> error::Result<Address> {
        image.read_last_entry(self.last_entry_cell)
    }

    /// How many entries have been created, shadowed ones included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Find the most recent entry with exactly this name.
    pub fn resolve(&self, name: &str) -> Option<Address> {
        self.latest.get(name).copied()
    }

    /// Allocate a header, link it in front of the list and make it the newest entry.  The name is
    /// checked before anything is allocated.
    pub fn create_entry(
        &mut self,
        image: &mut Image,
        allocator: &mut Allocator,
        name: &str,
        reference: Instruction,
    ) -> error::Result<EntryHandle> {
        let field = counted_string::encode(name)?;
        let previous = self.last_entry(image)?;
        let handle = EntryHandle(allocator.allocate(image, HEADER_CELLS)?);
        let address = handle.address();

        image.initialize(address, Cell::Link(previous))?;

        for (index, bytes) in field.iter().enumerate() {
            image.initialize(address.offset(NAME_OFFSET + index), Cell::Name(*bytes))?;
        }

        image.initialize(handle.reference_address(), Cell::Reference(reference))?;
        image.write_last_entry(self.last_entry_cell, address)?;

        let _ = self.latest.insert(name.to_string(), address);
        self.count += 1;

        trace!("link {} -> {} '{}'", address, previous, name);

        Ok(handle)
    }

    /// Second phase of building an entry: replace it's reference instruction in place.
    pub fn set_reference(
        &self,
        image: &mut Image,
        handle: EntryHandle,
        reference: Instruction,
    ) -> error::Result<()> {
        image.write_reference(handle.reference_address(), reference)
    }

    /// Decode the header at the given address.
    pub fn entry(&self, image: &Image, address: Address) -> error::Result<DictionaryEntry> {
        let previous = image.read_link(address)?;

        let mut field: NameField = Default::default();

        for (index, bytes) in field.iter_mut().enumerate() {
            *bytes = image.read_name(address.offset(NAME_OFFSET + index))?;
        }

        let reference = image.read_reference(address.offset(REFERENCE_OFFSET))?;

        Ok(DictionaryEntry {
            address,
            previous,
            name: counted_string::decode(&field),
            reference,
        })
    }

    /// Walk the list in the image from the newest entry back to the oldest.
    pub fn iter<'a>(&'a self, image: &'a Image) -> DictionaryIter<'a> {
        DictionaryIter {
            dictionary: self,
            image,
            next: self.last_entry(image),
        }
    }

    /// A printable listing of the visible words.
    pub fn words<'a>(&'a self, image: &'a Image) -> WordListing<'a> {
        WordListing {
            dictionary: self,
            image,
        }
    }
}

/// Iterator over the image resident list.  Stops after the first decoding error.
pub struct DictionaryIter<'a> {
    dictionary: &'a Dictionary,
    image: &'a Image,
    next: error::Result<Address>,
}

impl Iterator for DictionaryIter<'_> {
    type Item = error::Result<DictionaryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let address = match &self.next {
            Ok(address) if address.is_null() => return None,
            Ok(address) => *address,
            Err(error) => {
                let error = error.clone();
                self.next = Ok(Address::NULL);
                return Some(Err(error));
            }
        };

        match self.dictionary.entry(self.image, address) {
            Ok(entry) => {
                self.next = Ok(entry.previous);
                Some(Ok(entry))
            }
            Err(error) => {
                self.next = Ok(Address::NULL);
                Some(Err(error))
            }
        }
    }
}

/// Pretty print the dictionary.  Words appear once, if a word is redefined only the newest
/// version is shown.
pub struct WordListing<'a> {
    dictionary: &'a Dictionary,
    image: &'a Image,
}

impl Display for WordListing<'_> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let mut seen = HashSet::new();
        let mut visible = Vec::new();

        for entry in self.dictionary.iter(self.image) {
            let entry = entry.map_err(|_| fmt::Error)?;

            if seen.insert(entry.name.clone()) {
                visible.push(entry);
            }
        }

        let max_size = visible.iter().map(|entry| entry.name.len()).max().unwrap_or(0);

        writeln!(formatter, "{} words defined.\n", visible.len())?;

        for entry in visible.iter().rev() {
            writeln!(
                formatter,
                "{:6}  {:width$}  {}",
                entry.address,
                entry.name,
                entry.reference,
                width = max_size
            )?;
        }

        Ok(())
    }
}
