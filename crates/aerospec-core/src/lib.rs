pub mod devices;
pub mod roster;
pub mod schema;

pub use devices::{lookup, DeviceInfo, Placement, PUBLIC_REFERENCE_OWNER, REFERENCE_STATIONS};
pub use roster::{DevicePair, RosterError, UserRoster};
