//! Entity store: SQLite persistence, record mapping and the VLAN pool.

mod error;
mod records;
mod sqlite;
pub mod vlan;

pub use error::{Result, StoreError};
pub use records::{Labelled, Record};
pub use sqlite::{Store, Tx};
pub use vlan::{VlanPool, VlanRange, VlanRangeError};
