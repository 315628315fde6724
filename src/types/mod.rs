//! Core input types: the port list and the resolved scan target.

mod port;
mod target;

pub use port::{PortError, PortList};
pub use target::{select_address, ScanTarget, TargetError};
