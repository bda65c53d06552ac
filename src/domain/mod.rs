// Domain layer: typed records, static catalogs and ports. No I/O here.

pub mod groups;
pub mod indicators;
pub mod model;
pub mod ports;
