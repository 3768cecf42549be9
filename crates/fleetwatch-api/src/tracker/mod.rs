// Tracking API client modules
//
// Hand-written client for the Mapon-style REST API: `unit/list.json` for
// live device state and `alert/list.json` for time-windowed alerts. Both
// answer with a `{ "data": { ... } }` envelope or an `{ "error": { ... } }`
// object.

pub mod alarms;
pub mod client;
pub mod models;
mod normalize;
pub mod units;

pub use client::TrackerClient;
