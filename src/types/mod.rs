//! Core value types: address ranges, work items, port lists and run IDs.

mod port;
mod run_id;
mod target;
mod work_item;

pub use port::{PortList, PortListError, DEFAULT_PORTS};
pub use run_id::RunId;
pub use target::{parse_ipv4, AddressRange, RangeWarning, TargetError};
pub use work_item::WorkItem;
