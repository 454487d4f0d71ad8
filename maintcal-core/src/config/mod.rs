//! Configuration and bootstrap data for maintcal.

mod maintcal_config;
mod seed;

pub use maintcal_config::MaintCalConfig;
pub use seed::SeedData;
