//! 検出・初期化・リセット・電源制御

use super::{io_error, Sensor};
use crate::core::frame::FrameDescriptor;
use crate::core::palette::RAINBOW_TABLE;
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::{BusSpeed, SensorBus};
use crate::hardware::chip::SensorFamily;
use crate::hardware::detect::{write_pin, Prober};
use crate::hardware::dispatch::dispatch;
use crate::hardware::driver::{DriverError, DriverRegistry};
use crate::hardware::port::{Clock, CsiPort, FramePool};
use embedded_hal::digital::OutputPin;
use log::{info, warn};

/// リセットパルス幅（ミリ秒）
const RESET_PULSE_MS: u32 = 10;

impl<B, P, F, C, RST, PWR> Sensor<B, P, F, C, RST, PWR>
where
    B: SensorBus,
    P: CsiPort,
    F: FramePool,
    C: Clock,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// センサーを検出し、対応するドライバを初期化します
    ///
    /// 以前の状態はすべて破棄されます。
    ///
    /// # エラー
    /// - バス初期化失敗: `CsiInitFailed`
    /// - センサーが見つからない: `IscUndetected`
    /// - ドライバが無い: `IscUnsupported`
    /// - 外部クロック設定失敗: `TimInitFailed`
    /// - ドライバ初期化失敗: `IscInitFailed`
    pub fn probe_init(
        &mut self,
        registry: &mut dyn DriverRegistry,
        bus_id: u32,
        speed: BusSpeed,
    ) -> SensorResult<SensorFamily> {
        let disable_delays = self.state.disable_delays;
        self.state = Default::default();
        self.state.disable_delays = disable_delays;
        self.fb = FrameDescriptor::default();
        self.throttle.reset();
        self.driver = None;

        let detection = Prober::new(
            &mut self.hal.bus,
            &mut self.hal.reset_pin,
            &mut self.hal.power_pin,
            &mut self.hal.clock,
            &self.config,
        )
        .run(registry, bus_id, speed)?;

        self.state.slave_addr = detection.slave_addr;
        self.state.chip_id = detection.chip_id;
        self.state.reset_pol = detection.reset_pol;
        self.state.power_pol = detection.power_pol;

        let dispatched = dispatch(
            detection.chip_id,
            detection.slave_addr,
            registry,
            &mut self.hal.bus,
            &mut self.hal.port,
            &self.config.xclk,
        )?;

        self.state.chip_id = dispatched.chip_id;
        self.state.family = Some(dispatched.family);
        self.state.detected = true;
        self.driver = Some(dispatched.driver);
        info!("✓ センサー初期化完了: {} (addr=0x{:02X})", dispatched.family, detection.slave_addr);
        Ok(dispatched.family)
    }

    /// センサーをリセットし、設定を既定値に戻します
    ///
    /// 検出結果（アドレス・ID・極性）は保持されます。
    ///
    /// # エラー
    /// ドライバのリセット失敗は `ControlFailed`（非対応の場合は省略）
    pub fn reset(&mut self) -> SensorResult<()> {
        self.abort_capture();

        self.state.restore_defaults();
        self.state.auto_rotation =
            self.config.imu_auto_rotation && self.state.family == Some(SensorFamily::Ov7690);
        self.fb = FrameDescriptor::default();
        self.throttle.reset();
        self.vsync_callback = None;
        self.frame_callback = None;
        self.palette = &RAINBOW_TABLE;

        self.shutdown(false)?;

        if let Err(e) = self.hal.bus.enable(false) {
            warn!("バスを停止できません: {}", e);
        }

        let reset_pol = self.state.reset_pol;
        write_pin(&mut self.hal.reset_pin, reset_pol.asserted_level(), "reset");
        self.hal.clock.delay_ms(RESET_PULSE_MS);
        write_pin(&mut self.hal.reset_pin, reset_pol.deasserted_level(), "reset");
        self.hal.clock.delay_ms(self.config.reset_delay_ms);

        if let Err(e) = self.hal.bus.enable(true) {
            warn!("バスを再開できません: {}", e);
        }

        match self.call_driver(|driver, sccb| driver.reset(sccb)) {
            Ok(()) | Err(DriverError::Unsupported) => {}
            Err(e) => {
                warn!("ドライバのリセットに失敗しました: {}", e);
                return Err(SensorError::ControlFailed);
            }
        }

        self.hal.pool.flush_buffers(true);
        info!("✓ センサーをリセットしました");
        Ok(())
    }

    /// スリープの切り替え
    pub fn sleep(&mut self, enable: bool) -> SensorResult<()> {
        self.abort_capture();
        self.control("sleep", |driver, sccb| driver.sleep(sccb, enable))
    }

    /// パワーダウンピンでセンサーを停止/再開します
    ///
    /// `enable` が `true` のとき、検出した極性でパワーダウンをアサートします。
    pub fn shutdown(&mut self, enable: bool) -> SensorResult<()> {
        self.abort_capture();
        let level = self.state.power_pol.level(enable);
        write_pin(&mut self.hal.power_pin, level, "power");
        self.hal.clock.delay_ms(self.config.shutdown_delay_ms);
        Ok(())
    }

    /// センサーのレジスタを読み出します
    pub fn read_reg(&mut self, reg: u16) -> SensorResult<u16> {
        self.call_driver(|driver, sccb| driver.read_reg(sccb, reg))
            .map_err(|e| io_error("read_reg", e))
    }

    /// センサーのレジスタへ書き込みます
    pub fn write_reg(&mut self, reg: u16, value: u16) -> SensorResult<()> {
        self.call_driver(|driver, sccb| driver.write_reg(sccb, reg, value))
            .map_err(|e| io_error("write_reg", e))
    }

    /// 外部クロック周波数を設定します
    pub fn set_xclk_frequency(&mut self, hz: u32) -> SensorResult<()> {
        self.hal.port.set_xclk_frequency(hz)
    }

    pub fn get_xclk_frequency(&self) -> SensorResult<u32> {
        self.hal.port.xclk_frequency()
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::super::test_support::fixture;
    use super::*;
    use crate::core::config::SensorConfig;
    use crate::core::pixformat::PixFormat;
    use crate::core::resolution::FrameSize;
    use crate::core::types::{GainCeiling, Polarity};
    use crate::hardware::mock::{
        MockBoard, MockClock, MockDevice, MockDriver, MockFramePool, MockPort, MockRegistry,
        PinKind, Wiring,
    };
    use crate::sensor::SensorHal;

    #[test]
    fn test_reset_restores_defaults() {
        let mut f = fixture(1_000_000);
        f.sensor.set_pixformat(PixFormat::Rgb565).unwrap();
        f.sensor.set_framesize(FrameSize::Qvga).unwrap();
        f.sensor.set_hmirror(true).unwrap();
        f.sensor.set_gainceiling(GainCeiling::X16).unwrap();
        f.sensor.set_frame_callback(Some(Box::new(|| {})));

        f.sensor.reset().unwrap();

        let state = f.sensor.state();
        assert_eq!(state.pixformat, None);
        assert_eq!(state.framesize, None);
        assert_eq!(state.framerate, 0);
        assert_eq!(state.gainceiling, GainCeiling::X2);
        assert!(!state.hmirror);
        assert!(state.detected);
        assert!(!f.sensor.has_frame_callback());
        assert_eq!(f.driver.call_count("reset"), 1);
        assert_eq!(f.pool.flushes(), 1);
    }

    #[test]
    fn test_reset_skips_unsupported_driver_reset() {
        let mut f = fixture(1_000_000);
        f.driver.set_unsupported("reset");
        assert_eq!(f.sensor.reset(), Ok(()));

        f.driver.set_failing("sleep");
        assert_eq!(f.sensor.sleep(true), Err(SensorError::ControlFailed));
    }

    #[test]
    fn test_reset_failure_is_reported() {
        let mut f = fixture(1_000_000);
        f.driver.set_failing("reset");
        assert_eq!(f.sensor.reset(), Err(SensorError::ControlFailed));
    }

    #[test]
    fn test_reset_pulses_with_detected_polarity() {
        // Given: リセットがアクティブローのボードで検出済み
        let board = MockBoard::new();
        let wiring = Wiring::new(Polarity::ActiveLow, Polarity::ActiveHigh);
        board.add_device(MockDevice::ov7725(wiring));
        let driver = MockDriver::new();
        let mut registry = MockRegistry::new(driver.clone());
        let hal = SensorHal::new(
            board.bus(),
            MockPort::new(),
            MockFramePool::new(100_000),
            MockClock::new(),
        )
        .with_pins(board.reset_pin(), board.power_pin());
        let mut sensor = Sensor::new(hal, SensorConfig::default());
        sensor.probe_init(&mut registry, 0, BusSpeed::Standard).unwrap();
        assert_eq!(sensor.state().reset_pol, Polarity::ActiveLow);

        // When
        board.clear_pin_log();
        sensor.reset().unwrap();

        // Then: パワーダウン解除 → リセットをローでアサート → ハイで解除
        assert_eq!(
            board.pin_log(),
            vec![(PinKind::Power, false), (PinKind::Reset, false), (PinKind::Reset, true)]
        );
        assert_eq!(board.bus_enable_log(), vec![false, true]);
        assert_eq!(sensor.read_reg(0x12), Err(SensorError::IoError));
        sensor.write_reg(0x12, 0x80).unwrap();
        assert_eq!(sensor.read_reg(0x12), Ok(0x80));
    }

    #[test]
    fn test_shutdown_follows_power_polarity() {
        let board = MockBoard::new();
        let hal = SensorHal::new(
            board.bus(),
            MockPort::new(),
            MockFramePool::new(100_000),
            MockClock::new(),
        )
        .with_pins(board.reset_pin(), board.power_pin());
        let mut sensor = Sensor::new(hal, SensorConfig::default());

        sensor.shutdown(true).unwrap();
        sensor.shutdown(false).unwrap();

        assert_eq!(board.pin_log(), vec![(PinKind::Power, true), (PinKind::Power, false)]);
    }

    #[test]
    fn test_xclk_passthrough() {
        let mut f = fixture(100_000);
        f.sensor.set_xclk_frequency(24_000_000).unwrap();
        assert_eq!(f.sensor.get_xclk_frequency(), Ok(24_000_000));
        assert_eq!(f.port.xclk_hz(), Some(24_000_000));
    }
}
