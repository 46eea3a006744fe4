//! センサー検出プロトコル
//!
//! リセット/パワーダウンピンの極性はボードごとに異なり、事前には分かりません。
//! そこで極性の組み合わせを順に試しながらバスをスキャンし、既知のアドレスで
//! 応答したデバイスのチップ ID を読み出します。

use crate::core::config::SensorConfig;
use crate::core::types::Polarity;
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::{BusSpeed, SensorBus};
use crate::hardware::chip::{addr, reg, ChipId, SensorFamily};
use crate::hardware::driver::DriverRegistry;
use crate::hardware::port::Clock;
use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, info, warn};

/// パルス幅（ミリ秒）
const PULSE_MS: u32 = 10;

/// 検出方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// バススキャンで検出
    Bus,
    /// バス外の存在確認で検出
    Direct,
}

/// 検出結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// 7bit アドレス（バス外の検出では 0）
    pub slave_addr: u8,
    pub chip_id: ChipId,
    pub reset_pol: Polarity,
    pub power_pol: Polarity,
    pub method: DetectionMethod,
}

/// スキャン前に行うピン操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    None,
    Reset(bool),
    Power(bool),
}

/// 極性の組み合わせ1つ分の試行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStep {
    pub reset_pol: Polarity,
    pub power_pol: Polarity,
    pub action: PinAction,
}

/// 試行順序
///
/// 各手順は直前の状態にピン操作を1つ加えるだけなので、4回で全組み合わせを網羅します。
pub const PROBE_SEQUENCE: [ProbeStep; 4] = [
    ProbeStep {
        reset_pol: Polarity::ActiveHigh,
        power_pol: Polarity::ActiveHigh,
        action: PinAction::None,
    },
    ProbeStep {
        reset_pol: Polarity::ActiveLow,
        power_pol: Polarity::ActiveHigh,
        action: PinAction::Reset(true),
    },
    ProbeStep {
        reset_pol: Polarity::ActiveLow,
        power_pol: Polarity::ActiveLow,
        action: PinAction::Power(true),
    },
    ProbeStep {
        reset_pol: Polarity::ActiveHigh,
        power_pol: Polarity::ActiveLow,
        action: PinAction::Reset(false),
    },
];

/// アドレスに該当するファミリーのうち、ドライバがあるものが1つでもあるか
pub fn address_enabled(slave_addr: u8, registry: &dyn DriverRegistry) -> bool {
    SensorFamily::ALL
        .iter()
        .any(|family| family.slave_addr() == Some(slave_addr) && registry.supports(*family))
}

/// 既知のアドレスで応答したデバイスのチップ ID を読み出します
///
/// 未知のアドレス、対応ドライバが無いアドレス、読み出しに失敗したアドレスは `None`。
pub fn identify<B: SensorBus + ?Sized>(
    bus: &mut B,
    slave_addr: u8,
    registry: &dyn DriverRegistry,
) -> Option<ChipId> {
    if !address_enabled(slave_addr, registry) {
        return None;
    }

    let result = match slave_addr {
        addr::OV2640 | addr::OV7725 => bus.read_byte(slave_addr, reg::OV_CHIP_ID).map(ChipId::from_byte),
        addr::OV5640 => {
            // GC2145 と同じアドレスなので GC2145 を先に確認する
            if registry.supports(SensorFamily::Gc2145) {
                match bus.read_byte(slave_addr, reg::GC_CHIP_ID) {
                    Ok(id) if ChipId::from_byte(id) == ChipId::GC2145 => return Some(ChipId::GC2145),
                    Ok(id) => debug!("0x{:02X}: GC2145 ではありません (0x{:02X})", slave_addr, id),
                    Err(e) => debug!("0x{:02X}: GC2145 ID 読み出し失敗: {}", slave_addr, e),
                }
            }
            if !registry.supports(SensorFamily::Ov5640) {
                return None;
            }
            bus.read_byte_wide(slave_addr, reg::OV5640_CHIP_ID)
                .map(ChipId::from_byte)
        }
        addr::MT9V0XX => bus.read_word(slave_addr, reg::ON_CHIP_ID).map(ChipId::from_word),
        addr::MT9M114 => bus
            .read_word_wide(slave_addr, reg::ON_CHIP_ID_WIDE)
            .map(ChipId::from_word),
        addr::LEPTON => Ok(ChipId::LEPTON),
        addr::HM0XX0 => bus
            .read_byte_wide(slave_addr, reg::HIMAX_CHIP_ID)
            .map(ChipId::from_byte),
        addr::FROGEYE2020 => Ok(ChipId::FROGEYE2020),
        addr::PAG7920 => bus
            .read_word(slave_addr, reg::ON_CHIP_ID)
            .map(|id| ChipId::from_word(id.swap_bytes())),
        _ => return None,
    };

    match result {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("0x{:02X}: チップ ID を読み出せません: {}", slave_addr, e);
            None
        }
    }
}

/// バスを1回スキャンし、最初に識別できたデバイスを返します
pub fn detect<B: SensorBus + ?Sized>(
    bus: &mut B,
    registry: &dyn DriverRegistry,
    max_devices: usize,
) -> Option<(u8, ChipId)> {
    let devices = match bus.scan() {
        Ok(devices) => devices,
        Err(e) => {
            warn!("バススキャンに失敗しました: {}", e);
            return None;
        }
    };
    debug!("スキャン結果: {:02X?}", devices.as_slice());

    devices
        .iter()
        .take(max_devices)
        .find_map(|&slave_addr| identify(bus, slave_addr, registry).map(|id| (slave_addr, id)))
}

/// 検出手順の実行器
pub struct Prober<'a, B, RST, PWR, C> {
    bus: &'a mut B,
    reset_pin: &'a mut RST,
    power_pin: &'a mut PWR,
    clock: &'a mut C,
    config: &'a SensorConfig,
}

impl<'a, B, RST, PWR, C> Prober<'a, B, RST, PWR, C>
where
    B: SensorBus,
    RST: OutputPin,
    PWR: OutputPin,
    C: Clock,
{
    pub fn new(
        bus: &'a mut B,
        reset_pin: &'a mut RST,
        power_pin: &'a mut PWR,
        clock: &'a mut C,
        config: &'a SensorConfig,
    ) -> Self {
        Self {
            bus,
            reset_pin,
            power_pin,
            clock,
            config,
        }
    }

    /// 電源投入・リセット・バス初期化を行い、極性を変えながらセンサーを探します
    pub fn run(
        &mut self,
        registry: &mut dyn DriverRegistry,
        bus_id: u32,
        speed: BusSpeed,
    ) -> SensorResult<Detection> {
        // 電源を入れ直す（アクティブハイ想定）
        write_pin(self.power_pin, true, "power");
        self.clock.delay_ms(PULSE_MS);
        write_pin(self.power_pin, false, "power");
        self.clock.delay_ms(self.config.power_delay_ms);

        // リセットパルス（アクティブハイ想定）
        write_pin(self.reset_pin, true, "reset");
        self.clock.delay_ms(PULSE_MS);
        write_pin(self.reset_pin, false, "reset");
        self.clock.delay_ms(self.config.reset_delay_ms);

        if let Err(e) = self.bus.init(bus_id, speed) {
            warn!("バス初期化に失敗しました: {}", e);
            return Err(SensorError::CsiInitFailed);
        }
        self.clock.delay_ms(self.config.bus_settle_delay_ms);

        for step in PROBE_SEQUENCE.iter() {
            match step.action {
                PinAction::None => {}
                PinAction::Reset(level) => {
                    write_pin(self.reset_pin, level, "reset");
                    self.clock.delay_ms(self.config.reset_delay_ms);
                }
                PinAction::Power(level) => {
                    write_pin(self.power_pin, level, "power");
                    self.clock.delay_ms(self.config.power_delay_ms);
                }
            }

            if let Some((slave_addr, chip_id)) =
                detect(self.bus, registry, self.config.max_scan_devices)
            {
                info!(
                    "✓ センサー検出: addr=0x{:02X} id={} (reset={:?}, power={:?})",
                    slave_addr, chip_id, step.reset_pol, step.power_pol
                );
                return Ok(Detection {
                    slave_addr,
                    chip_id,
                    reset_pol: step.reset_pol,
                    power_pol: step.power_pol,
                    method: DetectionMethod::Bus,
                });
            }
            debug!(
                "検出なし (reset={:?}, power={:?})",
                step.reset_pol, step.power_pol
            );
        }

        // バス上に見つからなければバス外のセンサーを確認する
        if let Some(chip_id) = registry.probe_direct() {
            info!("✓ バス外センサー検出: id={}", chip_id);
            return Ok(Detection {
                slave_addr: 0,
                chip_id,
                reset_pol: Polarity::ActiveLow,
                power_pol: Polarity::ActiveLow,
                method: DetectionMethod::Direct,
            });
        }

        warn!("センサーが見つかりません");
        Err(SensorError::IscUndetected)
    }
}

/// 制御ピンを駆動します（失敗は記録のみ）
pub(crate) fn write_pin<P: OutputPin + ?Sized>(pin: &mut P, level: bool, name: &str) {
    if let Err(e) = pin.set_state(PinState::from(level)) {
        warn!("{} ピンを駆動できません: {:?}", name, e);
    }
}
