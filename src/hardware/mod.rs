/// ハードウェア境界とセンサー検出
pub mod bus;
pub mod chip;
pub mod detect;
pub mod dispatch;
pub mod driver;
pub mod port;

#[cfg(feature = "mock")]
pub mod mock;

pub use bus::{BusError, BusSpeed, I2cSensorBus, Sccb, SensorBus};
pub use chip::{ChipId, SensorFamily};
pub use detect::{Detection, DetectionMethod, Prober};
pub use dispatch::{dispatch, DispatchedDriver};
pub use driver::{DriverError, DriverRegistry, IoctlCommand, IoctlResponse, SensorDriver};
pub use port::{Clock, CsiPort, FramePool, NoPin, PoolError};
