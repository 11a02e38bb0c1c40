//! Scroll synchronization between the editor and preview panes

mod animate;
mod scroll;
mod section;

pub use scroll::{ScrollFactors, ScrollOrigin, ScrollSync, SyncConfig, SyncPane};
pub use section::SectionManager;
