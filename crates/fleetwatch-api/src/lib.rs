// fleetwatch-api: Async Rust client for the vehicle tracking API and the REST key-value store

pub mod error;
pub mod kv;
pub mod tracker;
pub mod transport;

pub use error::Error;
pub use kv::RestKv;
pub use tracker::models::{AlarmRaw, DriverInfo, IgnitionInfo, UnitRaw, parse_datetime};
pub use tracker::TrackerClient;
pub use transport::{TlsMode, TransportConfig};
