use crate::core::config_validation::{
    parse_max_scan_devices, validate_delay_ms, validate_xclk_hz, ValidationError,
};

/// ボード設定
///
/// この構造体はビルド時に`cfg.toml`ファイルの `[camera-sensor-control]` セクションから
/// 読み込まれた設定を保持します。
#[toml_cfg::toml_config]
pub struct Config {
    // 検出
    #[default(5)]
    max_scan_devices: u8,

    #[default(10)]
    reset_delay_ms: u32,

    #[default(10)]
    power_delay_ms: u32,

    #[default(10)] // バス初期化後の待ち
    bus_settle_delay_ms: u32,

    // 設定変更後のセンサー安定待ち
    #[default(100)]
    settle_delay_ms: u32,

    #[default(10)]
    shutdown_delay_ms: u32,

    // ポート機能
    #[default(true)]
    hw_crop_enabled: bool,

    #[default(false)]
    hw_swap_enabled: bool,

    #[default(false)] // IMU 搭載ボードのみ
    imu_auto_rotation: bool,

    // 外部クロック周波数（Hz）
    #[default(12000000)]
    ov2640_xclk_hz: u32,

    #[default(24000000)]
    ov5640_xclk_hz: u32,

    #[default(12000000)]
    ov5640_rev_y_xclk_hz: u32,

    #[default(12000000)]
    ov7670_xclk_hz: u32,

    #[default(12000000)]
    ov7690_xclk_hz: u32,

    #[default(27000000)]
    mt9v0xx_xclk_hz: u32,

    #[default(24000000)]
    mt9m114_xclk_hz: u32,

    #[default(24000000)]
    lepton_xclk_hz: u32,

    #[default(6000000)]
    hm01b0_xclk_hz: u32,

    #[default(24000000)]
    hm0360_xclk_hz: u32,

    #[default(12000000)]
    gc2145_xclk_hz: u32,

    #[default(24000000)]
    pag7920_xclk_hz: u32,

    #[default(6000000)]
    paj6100_xclk_hz: u32,

    #[default(6000000)]
    frogeye2020_xclk_hz: u32,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_scan_devices の値が無効です (1-16): {0}")]
    InvalidMaxScanDevices(u8),
    #[error("{name} の値が無効です (0-1000ms): {value}")]
    InvalidDelay { name: &'static str, value: u32 },
    #[error("{family} の外部クロック周波数が無効です: {hz}Hz")]
    InvalidXclkFrequency { family: &'static str, hz: u32 },
}

/// センサーファミリーごとの外部クロック周波数（Hz）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XclkTable {
    pub ov2640: u32,
    pub ov5640: u32,
    pub ov5640_rev_y: u32,
    pub ov7670: u32,
    pub ov7690: u32,
    pub mt9v0xx: u32,
    pub mt9m114: u32,
    pub lepton: u32,
    pub hm01b0: u32,
    pub hm0360: u32,
    pub gc2145: u32,
    pub pag7920: u32,
    pub paj6100: u32,
    pub frogeye2020: u32,
}

/// 検証済みのセンサー制御設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    /// 1回のスキャンで調べるデバイス数
    pub max_scan_devices: usize,

    /// リセットパルス後の待ち時間（ミリ秒）
    pub reset_delay_ms: u32,

    /// 電源切り替え後の待ち時間（ミリ秒）
    pub power_delay_ms: u32,

    /// バス初期化後の待ち時間（ミリ秒）
    pub bus_settle_delay_ms: u32,

    /// 設定変更後のセンサー安定待ち（ミリ秒）
    pub settle_delay_ms: u32,

    /// シャットダウン切り替え後の待ち時間（ミリ秒）
    pub shutdown_delay_ms: u32,

    /// ポートがウィンドウ単位でクロップできる
    pub hw_crop_enabled: bool,

    /// ポートがバイト入れ替えを行う
    pub hw_swap_enabled: bool,

    /// IMU による自動回転を OV7690 で既定有効にする
    pub imu_auto_rotation: bool,

    pub xclk: XclkTable,
}

impl Default for XclkTable {
    fn default() -> Self {
        Self {
            ov2640: 12_000_000,
            ov5640: 24_000_000,
            ov5640_rev_y: 12_000_000,
            ov7670: 12_000_000,
            ov7690: 12_000_000,
            mt9v0xx: 27_000_000,
            mt9m114: 24_000_000,
            lepton: 24_000_000,
            hm01b0: 6_000_000,
            hm0360: 24_000_000,
            gc2145: 12_000_000,
            pag7920: 24_000_000,
            paj6100: 6_000_000,
            frogeye2020: 6_000_000,
        }
    }
}

/// cfg.toml を使わない場合の既定値
impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_scan_devices: 5,
            reset_delay_ms: 10,
            power_delay_ms: 10,
            bus_settle_delay_ms: 10,
            settle_delay_ms: 100,
            shutdown_delay_ms: 10,
            hw_crop_enabled: true,
            hw_swap_enabled: false,
            imu_auto_rotation: false,
            xclk: XclkTable::default(),
        }
    }
}

impl SensorConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        // toml_cfg によって生成された定数
        Self::from_config(&CONFIG)
    }

    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let max_scan_devices =
            parse_max_scan_devices(config.max_scan_devices).map_err(map_validation_error)?;

        let reset_delay_ms =
            validate_delay_ms("reset_delay_ms", config.reset_delay_ms).map_err(map_validation_error)?;
        let power_delay_ms =
            validate_delay_ms("power_delay_ms", config.power_delay_ms).map_err(map_validation_error)?;
        let bus_settle_delay_ms = validate_delay_ms("bus_settle_delay_ms", config.bus_settle_delay_ms)
            .map_err(map_validation_error)?;
        let settle_delay_ms = validate_delay_ms("settle_delay_ms", config.settle_delay_ms)
            .map_err(map_validation_error)?;
        let shutdown_delay_ms = validate_delay_ms("shutdown_delay_ms", config.shutdown_delay_ms)
            .map_err(map_validation_error)?;

        let xclk = XclkTable {
            ov2640: xclk("ov2640", config.ov2640_xclk_hz)?,
            ov5640: xclk("ov5640", config.ov5640_xclk_hz)?,
            ov5640_rev_y: xclk("ov5640_rev_y", config.ov5640_rev_y_xclk_hz)?,
            ov7670: xclk("ov7670", config.ov7670_xclk_hz)?,
            ov7690: xclk("ov7690", config.ov7690_xclk_hz)?,
            mt9v0xx: xclk("mt9v0xx", config.mt9v0xx_xclk_hz)?,
            mt9m114: xclk("mt9m114", config.mt9m114_xclk_hz)?,
            lepton: xclk("lepton", config.lepton_xclk_hz)?,
            hm01b0: xclk("hm01b0", config.hm01b0_xclk_hz)?,
            hm0360: xclk("hm0360", config.hm0360_xclk_hz)?,
            gc2145: xclk("gc2145", config.gc2145_xclk_hz)?,
            pag7920: xclk("pag7920", config.pag7920_xclk_hz)?,
            paj6100: xclk("paj6100", config.paj6100_xclk_hz)?,
            frogeye2020: xclk("frogeye2020", config.frogeye2020_xclk_hz)?,
        };

        Ok(SensorConfig {
            max_scan_devices,
            reset_delay_ms,
            power_delay_ms,
            bus_settle_delay_ms,
            settle_delay_ms,
            shutdown_delay_ms,
            hw_crop_enabled: config.hw_crop_enabled,
            hw_swap_enabled: config.hw_swap_enabled,
            imu_auto_rotation: config.imu_auto_rotation,
            xclk,
        })
    }

    pub fn with_settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    pub fn with_hw_crop(mut self, enabled: bool) -> Self {
        self.hw_crop_enabled = enabled;
        self
    }

    pub fn with_hw_swap(mut self, enabled: bool) -> Self {
        self.hw_swap_enabled = enabled;
        self
    }

    pub fn with_imu_auto_rotation(mut self, enabled: bool) -> Self {
        self.imu_auto_rotation = enabled;
        self
    }

    pub fn with_max_scan_devices(mut self, count: usize) -> Self {
        self.max_scan_devices = count;
        self
    }
}

fn xclk(family: &'static str, hz: u32) -> Result<u32, ConfigError> {
    validate_xclk_hz(family, hz).map_err(map_validation_error)
}

fn map_validation_error(error: ValidationError) -> ConfigError {
    match error {
        ValidationError::InvalidMaxScanDevices(value) => ConfigError::InvalidMaxScanDevices(value),
        ValidationError::InvalidDelay { name, value } => ConfigError::InvalidDelay { name, value },
        ValidationError::InvalidXclkFrequency { family, hz } => {
            ConfigError::InvalidXclkFrequency { family, hz }
        }
    }
}
