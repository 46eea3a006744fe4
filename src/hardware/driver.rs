//! ベンダードライバとの境界
//!
//! [`SensorDriver`] の各メソッドは既定で [`DriverError::Unsupported`] を返します。
//! ドライバは対応する機能だけを実装し、未実装の機能は呼び出し側で
//! 「このセンサーでは非対応」として扱われます。

use crate::core::pixformat::{OutputTraits, PixFormat};
use crate::core::resolution::FrameSize;
use crate::core::types::{GainCeiling, SpecialEffect};
use crate::hardware::bus::{BusError, Sccb};
use crate::hardware::chip::{ChipId, SensorFamily};
use thiserror::Error;

/// ドライバエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("この機能はドライバでサポートされていません")]
    Unsupported,
    #[error("ドライバ処理に失敗しました: {0}")]
    Failed(String),
    #[error(transparent)]
    Bus(#[from] BusError),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// 汎用の ioctl
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenericIoctl {
    SetReadoutWindow { x: u32, y: u32, w: u32, h: u32 },
    GetReadoutWindow,
    SetTriggeredMode(bool),
    GetTriggeredMode,
    SetFovWide(bool),
    GetFovWide,
    TriggerAutoFocus,
    PauseAutoFocus,
    ResetAutoFocus,
    WaitOnAutoFocus { timeout_ms: u32 },
    SetNightMode(bool),
    GetNightMode,
}

/// Lepton（サーマルカメラ）向け ioctl
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeptonIoctl {
    GetWidth,
    GetHeight,
    GetRadiometry,
    GetRefresh,
    GetResolution,
    GetFpaTemperature,
    GetAuxTemperature,
    SetMeasurementMode { enable: bool, high_temp: bool },
    GetMeasurementMode,
    SetMeasurementRange { min_celsius: f32, max_celsius: f32 },
    GetMeasurementRange,
}

/// Himax 向け ioctl（モーション検出・発振器）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HimaxIoctl {
    MotionDetectEnable(bool),
    MotionDetectWindow { x: u32, y: u32, w: u32, h: u32 },
    MotionDetectThreshold(u32),
    MotionDetectClear,
    OscillatorEnable(bool),
}

/// ファミリー別の拡張操作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IoctlCommand {
    Generic(GenericIoctl),
    Lepton(LeptonIoctl),
    Himax(HimaxIoctl),
}

/// ioctl の応答
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IoctlResponse {
    None,
    Bool(bool),
    Int(i32),
    Float(f32),
    Window { x: u32, y: u32, w: u32, h: u32 },
    Range { min: f32, max: f32 },
}

/// ベンダードライバ（機能テーブル）
///
/// ドライバ固有の状態はドライバ自身が持ち、レジスタアクセスは引数の [`Sccb`] で行います。
#[allow(unused_variables)]
pub trait SensorDriver {
    /// 現在の出力特性
    fn output_traits(&self) -> OutputTraits {
        OutputTraits::default()
    }

    fn reset(&mut self, sccb: &mut Sccb<'_>) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn sleep(&mut self, sccb: &mut Sccb<'_>, enable: bool) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn read_reg(&mut self, sccb: &mut Sccb<'_>, reg: u16) -> DriverResult<u16> {
        Err(DriverError::Unsupported)
    }

    fn write_reg(&mut self, sccb: &mut Sccb<'_>, reg: u16, value: u16) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_pixformat(&mut self, sccb: &mut Sccb<'_>, pixformat: PixFormat) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_framesize(&mut self, sccb: &mut Sccb<'_>, framesize: FrameSize) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_framerate(&mut self, sccb: &mut Sccb<'_>, framerate: u32) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_contrast(&mut self, sccb: &mut Sccb<'_>, level: i32) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_brightness(&mut self, sccb: &mut Sccb<'_>, level: i32) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_saturation(&mut self, sccb: &mut Sccb<'_>, level: i32) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_gainceiling(&mut self, sccb: &mut Sccb<'_>, ceiling: GainCeiling) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_quality(&mut self, sccb: &mut Sccb<'_>, quality: i32) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_colorbar(&mut self, sccb: &mut Sccb<'_>, enable: bool) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_auto_gain(
        &mut self,
        sccb: &mut Sccb<'_>,
        enable: bool,
        gain_db: f32,
        gain_db_ceiling: f32,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn get_gain_db(&mut self, sccb: &mut Sccb<'_>) -> DriverResult<f32> {
        Err(DriverError::Unsupported)
    }

    fn set_auto_exposure(
        &mut self,
        sccb: &mut Sccb<'_>,
        enable: bool,
        exposure_us: i32,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn get_exposure_us(&mut self, sccb: &mut Sccb<'_>) -> DriverResult<i32> {
        Err(DriverError::Unsupported)
    }

    fn set_auto_whitebal(
        &mut self,
        sccb: &mut Sccb<'_>,
        enable: bool,
        r_gain_db: f32,
        g_gain_db: f32,
        b_gain_db: f32,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    /// (R, G, B) のゲイン（dB）
    fn get_rgb_gain_db(&mut self, sccb: &mut Sccb<'_>) -> DriverResult<(f32, f32, f32)> {
        Err(DriverError::Unsupported)
    }

    fn set_auto_blc(
        &mut self,
        sccb: &mut Sccb<'_>,
        enable: bool,
        regs: Option<&[i32]>,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    /// BLC レジスタ値を `regs` に書き込みます
    fn get_blc_regs(&mut self, sccb: &mut Sccb<'_>, regs: &mut [i32]) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_hmirror(&mut self, sccb: &mut Sccb<'_>, enable: bool) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_vflip(&mut self, sccb: &mut Sccb<'_>, enable: bool) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_special_effect(&mut self, sccb: &mut Sccb<'_>, effect: SpecialEffect) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn set_lens_correction(
        &mut self,
        sccb: &mut Sccb<'_>,
        enable: bool,
        radius: i32,
        coefficient: i32,
    ) -> DriverResult<()> {
        Err(DriverError::Unsupported)
    }

    fn ioctl(&mut self, sccb: &mut Sccb<'_>, command: IoctlCommand) -> DriverResult<IoctlResponse> {
        Err(DriverError::Unsupported)
    }
}

/// 利用可能なドライバの集合
///
/// 対応ファミリーの集合が検出対象のアドレスを決めます。
pub trait DriverRegistry {
    /// このファミリーのドライバを持っているか
    fn supports(&self, family: SensorFamily) -> bool;

    /// ファミリーのドライバを初期化します
    fn init_driver(
        &mut self,
        family: SensorFamily,
        chip_id: ChipId,
        sccb: &mut Sccb<'_>,
    ) -> DriverResult<Box<dyn SensorDriver>>;

    /// バスに現れないセンサー（SPI 接続など）の存在を確認します
    fn probe_direct(&mut self) -> Option<ChipId> {
        None
    }
}
