mod climate_data;
mod sqlite;

pub use climate_data::*;
pub use sqlite::*;
