pub mod cleaning;
pub mod config;
pub mod features;
pub mod impute;
pub mod model;
pub mod normalize;
pub mod record;
pub mod store;
