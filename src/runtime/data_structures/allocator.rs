use crate::runtime::{
    data_structures::{cell::Address, image::Image},
    error::{self, ScriptError},
};
use log::trace;

/// Where the allocation frontier lives.  The frontier cell is bootstrapped at address zero and is
/// then claimed by the very first allocation, so it stays there.
pub const FRONTIER_ADDRESS: Address = Address::new(0);

/// Monotonic bump allocator over the image.  The allocator itself holds no state besides the
/// location of the frontier cell, the frontier value is read from and written back to the image
/// on every allocation.
#[derive(Clone, Copy, Debug)]
pub struct Allocator {
    frontier_cell: Address,
}

impl Allocator {
    /// Wipe the image and bootstrap the frontier cell.  On return the frontier cell is allocated
    /// and the next free address is the one just after it.
    pub fn bootstrap(image: &mut Image) -> error::Result<Allocator> {
        image.clear();
        image.grow_to(FRONTIER_ADDRESS.index() + 1)?;
        image.write_frontier(FRONTIER_ADDRESS, FRONTIER_ADDRESS)?;

        let mut allocator = Allocator {
            frontier_cell: FRONTIER_ADDRESS,
        };

        // The first allocation is the frontier cell itself.
        allocator.frontier_cell = allocator.allocate(image, 1)?;

        Ok(allocator)
    }

    /// The address of the cell that holds the frontier.
    pub fn frontier_cell(&self) -> Address {
        self.frontier_cell
    }

    /// The next address that will be handed out.
    pub fn frontier(&self, image: &Image) -> error::Result<Address> {
        image.read_frontier(self.frontier_cell)
    }

    /// Hand out `size` cells at the frontier and advance it.  The frontier is left untouched if
    /// the image can not grow that far.
    pub fn allocate(&mut self, image: &mut Image, size: usize) -> error::Result<Address> {
        let start = self.frontier(image)?;
        let end = start.offset(size);

        image.grow_to(end.index()).map_err(|error| match error {
            ScriptError::OutOfAddressSpace { limit, .. } => ScriptError::OutOfAddressSpace {
                frontier: start,
                requested: size,
                limit,
            },
            other => other,
        })?;
        image.write_frontier(self.frontier_cell, end)?;

        trace!("allocate {} cell(s) at {}", size, start);

        Ok(start)
    }
}
