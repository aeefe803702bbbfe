//! Data models for parsed business cards and parser configuration.

pub mod card;
pub mod config;

pub use card::{BilingualText, ContactRecord, PhoneSlot};
pub use config::{CardTemplate, MingpianConfig, ParserConfig, RuleStoreConfig};
