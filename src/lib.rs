#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the passkey-inspect library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod settings;
pub mod utils;
pub mod webauthn;

/// Re-export commonly used items
pub use settings::InspectSettings;
pub use webauthn::{inspect_json, CeremonyInspector, CeremonyReport, WebAuthnError};
