mod beta_station;
mod breakout_station;
mod common;
mod reference_station;
pub mod schema;

pub use beta_station::BetaStationParser;
pub use breakout_station::BreakoutStationParser;
pub use reference_station::ReferenceStationParser;

pub(crate) use common::{frame_from_columns, parse_fixed_station};
