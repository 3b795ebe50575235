//! Item model and enumeration.
//!
//! An [`AudioItem`] describes one playable entry or a folder of entries.
//! [`classify`] derives a coarse [`TypeTag`] from the item name, [`scan`]
//! builds an item tree from disk and [`flatten_items`] turns a tree into the
//! flat playlist the player navigates.

mod classify;
mod model;
mod scan;

pub use classify::{TypeTag, classify};
pub use model::{AudioItem, ItemKind};
pub use scan::{flatten_items, scan};
