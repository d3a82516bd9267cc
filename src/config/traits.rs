use crate::error::TradegridError;

/// Implemented by every config section so the manager can validate them
/// uniformly after a TOML load.
pub trait ConfigSection {
    fn section_name() -> &'static str;

    fn validate(&self) -> Result<(), TradegridError>;
}
