// ecovacs-core: Domain layer for Ecovacs domestic robot vacuums
//
// Sits between the wire client (`ecovacs-api`) and hosts (the CLI, a home
// automation bridge). Provides:
// - `CloudClient`: authenticate / list_devices / send_command
// - `Coordinator`: cached session and a polled, published `Snapshot`
// - `entity`: sensor and button adapters hosts register per robot
// - The error taxonomy hosts act on (`AuthError`, `TransportError`, `CommandError`)

pub mod cloud;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────
pub use cloud::{CloudClient, Session};
pub use config::{AccountConfig, CapabilityTable};
pub use coordinator::{Coordinator, Snapshot};
pub use entity::{
    ButtonEntity, ButtonKind, CommandTarget, DeviceEntities, SensorEntity, SensorKind,
    StatusProvider, entities_for,
};
pub use error::{AuthError, CommandError, Error, TransportError};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Ack, Capabilities, Capability, CleanState, Command, Device, DeviceId, DeviceInfo, DeviceStatus,
};

// The credential lives in the wire crate; hosts should not need to depend on it.
pub use ecovacs_api::Credential;
