pub mod categories;
pub mod coerce;
pub mod config;
pub mod entities;
pub mod error;
pub mod flatten;
pub mod logging;
pub mod mapping;
pub mod pipeline;
pub mod raw_table;
pub mod reference_data;
pub mod sink;
pub mod sqlite_sink;
pub mod transform;
