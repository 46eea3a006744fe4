/*!
 * # Camera Sensor Control Library
 *
 * イメージセンサーの検出・ドライバ選択・撮像設定を行う制御層
 *
 * ## モジュール構成
 * - `core`: 解像度表、画素フォーマット、フレームレイアウト、自動クロップ、ライン変換、設定
 * - `hardware`: バス・キャプチャポート・フレームバッファの抽象、チップ検出とドライバ選択
 * - `sensor`: センサーの状態と設定操作（[`Sensor`]）
 * - `error`: エラーコードとメッセージ
 */

// 公開モジュール
pub mod core;
pub mod error;
pub mod hardware;
pub mod sensor;

// よく使う型をまとめてエクスポート
pub use self::core::{
    BufferCount, ConfigError, ConfigKind, FrameDescriptor, FrameSize, GainCeiling, PixFormat,
    Polarity, SensorConfig, SpecialEffect,
};
pub use error::{strerror, SensorError, SensorResult};
pub use hardware::{
    BusSpeed, ChipId, CsiPort, DriverRegistry, FramePool, SensorBus, SensorDriver, SensorFamily,
};
pub use sensor::{Sensor, SensorHal, SensorState};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
