//! NEP-297 event logging.

mod builder;
mod hub_event;

pub(crate) use builder::EventBuilder;
pub use hub_event::HubEvent;

pub const PREFIX: &str = "EVENT_JSON:";
pub const STANDARD: &str = "onsocial";
pub const VERSION: &str = "1.0.0";

pub const RELAY_UPDATE: &str = "RELAY_UPDATE";
pub const BALANCE_UPDATE: &str = "BALANCE_UPDATE";
pub const RELAY_CALL: &str = "RELAY_CALL";
