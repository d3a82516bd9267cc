pub mod market;

pub use market::{MarketData, RequiredColumn};
