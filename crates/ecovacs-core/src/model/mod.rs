pub mod command;
pub mod device;

pub use command::{Ack, Capabilities, Capability, Command};
pub use device::{CleanState, Device, DeviceId, DeviceInfo, DeviceStatus};
