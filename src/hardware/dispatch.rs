//! 検出したチップ ID からドライバを初期化する

use crate::core::config::XclkTable;
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::{Sccb, SensorBus};
use crate::hardware::chip::{ChipId, SensorFamily};
use crate::hardware::driver::{DriverRegistry, SensorDriver};
use crate::hardware::port::CsiPort;
use log::{error, info};

/// 初期化済みのドライバ
pub struct DispatchedDriver {
    pub family: SensorFamily,
    /// 読み替え後のチップ ID
    pub chip_id: ChipId,
    pub driver: Box<dyn SensorDriver>,
}

impl core::fmt::Debug for DispatchedDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchedDriver")
            .field("family", &self.family)
            .field("chip_id", &self.chip_id)
            .finish_non_exhaustive()
    }
}

/// チップ ID に対応し、かつドライバがあるファミリーを選びます
pub fn resolve_family(chip_id: ChipId, registry: &dyn DriverRegistry) -> Option<SensorFamily> {
    SensorFamily::candidates(chip_id.canonical())
        .iter()
        .copied()
        .find(|family| registry.supports(*family))
}

/// 外部クロックを設定してからファミリーのドライバを初期化します
///
/// # エラー
/// - 対応ファミリーが無い: `IscUnsupported`
/// - クロック設定失敗: `TimInitFailed`
/// - ドライバ初期化失敗: `IscInitFailed`
pub fn dispatch<B: SensorBus, P: CsiPort>(
    chip_id: ChipId,
    slave_addr: u8,
    registry: &mut dyn DriverRegistry,
    bus: &mut B,
    port: &mut P,
    xclk: &XclkTable,
) -> SensorResult<DispatchedDriver> {
    let chip_id = chip_id.canonical();
    let family = resolve_family(chip_id, registry).ok_or_else(|| {
        error!("未対応のセンサーです: id={}", chip_id);
        SensorError::IscUnsupported
    })?;

    if let Some(hz) = family.xclk_hz(xclk, port.silicon_revision()) {
        port.set_xclk_frequency(hz).map_err(|e| {
            error!("{}: 外部クロック {}Hz を設定できません: {}", family, hz, e);
            SensorError::TimInitFailed
        })?;
    }

    let mut sccb = Sccb::new(bus, slave_addr);
    let driver = registry
        .init_driver(family, chip_id, &mut sccb)
        .map_err(|e| {
            error!("{}: 初期化に失敗しました: {}", family, e);
            SensorError::IscInitFailed
        })?;

    info!("✓ {} ドライバを初期化しました (id={})", family, chip_id);
    Ok(DispatchedDriver {
        family,
        chip_id,
        driver,
    })
}
