/// センサー非依存の値型と計算
pub mod autocrop;
pub mod config;
pub mod config_validation;
pub mod frame;
pub mod line_copy;
pub mod palette;
pub mod pixformat;
pub mod resolution;
pub mod throttle;
pub mod types;

pub use autocrop::{crop_window, CropWindow};
pub use config::{ConfigError, SensorConfig, XclkTable};
pub use frame::FrameDescriptor;
pub use line_copy::{LineCopyRequest, LineLayout};
pub use palette::{MIN_PALETTE_LEN, RAINBOW_TABLE};
pub use pixformat::{OutputTraits, PixFormat};
pub use resolution::{FrameSize, RESOLUTION};
pub use throttle::FrameThrottle;
pub use types::{BufferCount, ConfigKind, GainCeiling, Polarity, SpecialEffect};
