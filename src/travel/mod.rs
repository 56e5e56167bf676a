//! Travel-assistant request handling: preference parsing, advisory rules,
//! intent classification, prompt assembly and response shaping.

pub mod advisory;
pub mod chat;
pub mod guard;
pub mod intent;
pub mod preferences;
pub mod prompt;

pub use advisory::{PackingCategory, SafetyAlert};
pub use chat::{ChatAnswer, ChatService};
pub use guard::ResponseGuard;
pub use intent::QueryIntent;
pub use preferences::TravelPreferences;
