pub mod config;
pub mod error;
pub mod handle_map;
pub mod params;

pub use config::BridgeConfig;
pub use error::CoreError;
pub use handle_map::{Handle, HandleRegistry};
pub use params::Parameters;
