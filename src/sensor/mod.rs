//! センサー制御コンテキスト
//!
//! [`Sensor`] は検出したセンサー1台の状態・フレームレイアウト・ドライバ・
//! ハードウェアハンドルをまとめて所有します。設定操作は
//! 「冪等チェック → 検証 → キャプチャ停止 → ドライバ呼び出し → 確定」の順に進み、
//! 検証やドライバで失敗した場合は状態を変更しません。

mod capture;
mod controls;
mod framebuffer;
mod probe;
pub mod state;

pub use state::SensorState;

use crate::core::config::SensorConfig;
use crate::core::frame::FrameDescriptor;
use crate::core::palette::{MIN_PALETTE_LEN, RAINBOW_TABLE};
use crate::core::pixformat::OutputTraits;
use crate::core::throttle::FrameThrottle;
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::{Sccb, SensorBus};
use crate::hardware::chip::{ChipId, SensorFamily};
use crate::hardware::driver::{DriverError, DriverResult, SensorDriver};
use crate::hardware::port::{Clock, CsiPort, FramePool, NoPin};
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

/// VSYNC ごとに呼ばれるコールバック（引数はピンレベル）
pub type VsyncCallback = Box<dyn FnMut(u32) + Send>;

/// フレーム完了ごとに呼ばれるコールバック
pub type FrameCallback = Box<dyn FnMut() + Send>;

/// センサーが接続されているハードウェア
#[derive(Debug)]
pub struct SensorHal<B, P, F, C, RST = NoPin, PWR = NoPin> {
    pub bus: B,
    pub port: P,
    pub pool: F,
    pub clock: C,
    pub reset_pin: RST,
    pub power_pin: PWR,
}

impl<B, P, F, C> SensorHal<B, P, F, C> {
    /// 制御ピンが配線されていない構成
    pub fn new(bus: B, port: P, pool: F, clock: C) -> Self {
        Self {
            bus,
            port,
            pool,
            clock,
            reset_pin: NoPin,
            power_pin: NoPin,
        }
    }
}

impl<B, P, F, C, RST, PWR> SensorHal<B, P, F, C, RST, PWR> {
    /// リセットピンとパワーダウンピンを差し替えます
    pub fn with_pins<R2, P2>(self, reset_pin: R2, power_pin: P2) -> SensorHal<B, P, F, C, R2, P2> {
        SensorHal {
            bus: self.bus,
            port: self.port,
            pool: self.pool,
            clock: self.clock,
            reset_pin,
            power_pin,
        }
    }
}

/// センサー制御コンテキスト
pub struct Sensor<B, P, F, C, RST = NoPin, PWR = NoPin> {
    hal: SensorHal<B, P, F, C, RST, PWR>,
    config: SensorConfig,
    state: SensorState,
    fb: FrameDescriptor,
    throttle: FrameThrottle,
    driver: Option<Box<dyn SensorDriver>>,
    palette: &'static [u16],
    vsync_callback: Option<VsyncCallback>,
    frame_callback: Option<FrameCallback>,
}

impl<B, P, F, C, RST, PWR> core::fmt::Debug for Sensor<B, P, F, C, RST, PWR> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sensor")
            .field("state", &self.state)
            .field("fb", &self.fb)
            .field("throttle", &self.throttle)
            .field("driver", &self.driver.is_some())
            .finish_non_exhaustive()
    }
}

impl<B, P, F, C, RST, PWR> Sensor<B, P, F, C, RST, PWR>
where
    B: SensorBus,
    P: CsiPort,
    F: FramePool,
    C: Clock,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// 未検出状態のコンテキストを作成します
    pub fn new(hal: SensorHal<B, P, F, C, RST, PWR>, config: SensorConfig) -> Self {
        Self {
            hal,
            config,
            state: SensorState::default(),
            fb: FrameDescriptor::default(),
            throttle: FrameThrottle::new(),
            driver: None,
            palette: &RAINBOW_TABLE,
            vsync_callback: None,
            frame_callback: None,
        }
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn frame(&self) -> &FrameDescriptor {
        &self.fb
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn throttle(&self) -> &FrameThrottle {
        &self.throttle
    }

    pub fn hal(&self) -> &SensorHal<B, P, F, C, RST, PWR> {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut SensorHal<B, P, F, C, RST, PWR> {
        &mut self.hal
    }

    /// ハードウェアハンドルを取り出してコンテキストを破棄します
    pub fn release(self) -> SensorHal<B, P, F, C, RST, PWR> {
        self.hal
    }

    /// 検出済みのチップ ID
    pub fn get_id(&self) -> ChipId {
        self.state.chip_id
    }

    pub fn is_detected(&self) -> bool {
        self.state.detected
    }

    pub fn family(&self) -> Option<SensorFamily> {
        self.state.family
    }

    pub fn slave_addr(&self) -> u8 {
        self.state.slave_addr
    }

    /// ドライバの出力特性（未初期化時は既定値）
    pub fn output_traits(&self) -> OutputTraits {
        self.driver
            .as_ref()
            .map(|driver| driver.output_traits())
            .unwrap_or_default()
    }

    pub fn set_disable_delays(&mut self, disable: bool) {
        self.state.disable_delays = disable;
    }

    pub fn disable_delays(&self) -> bool {
        self.state.disable_delays
    }

    pub fn set_disable_full_flush(&mut self, disable: bool) {
        self.state.disable_full_flush = disable;
    }

    pub fn disable_full_flush(&self) -> bool {
        self.state.disable_full_flush
    }

    /// 疑似カラー表示用のパレットを設定します
    ///
    /// # エラー
    /// エントリが足りない場合は `InvalidArgument`
    pub fn set_color_palette(&mut self, palette: &'static [u16]) -> SensorResult<()> {
        if palette.len() < MIN_PALETTE_LEN {
            warn!("パレットが短すぎます: {} エントリ", palette.len());
            return Err(SensorError::InvalidArgument);
        }
        self.palette = palette;
        Ok(())
    }

    pub fn color_palette(&self) -> &'static [u16] {
        self.palette
    }

    pub fn set_vsync_callback(&mut self, callback: Option<VsyncCallback>) {
        self.vsync_callback = callback;
    }

    pub fn set_frame_callback(&mut self, callback: Option<FrameCallback>) {
        self.frame_callback = callback;
    }

    pub fn has_vsync_callback(&self) -> bool {
        self.vsync_callback.is_some()
    }

    pub fn has_frame_callback(&self) -> bool {
        self.frame_callback.is_some()
    }

    /// ドライバを直接取り付けます（検出手順を経ない構成向け）
    pub fn install_driver(&mut self, family: SensorFamily, chip_id: ChipId, driver: Box<dyn SensorDriver>) {
        self.state.family = Some(family);
        self.state.chip_id = chip_id;
        self.state.detected = true;
        self.driver = Some(driver);
        debug!("{} ドライバを取り付けました", family);
    }

    // -----------------------------------------------------------------------
    // 内部ヘルパー
    // -----------------------------------------------------------------------

    /// ドライバを呼び出します（未初期化なら `Unsupported`）
    fn call_driver<T>(
        &mut self,
        f: impl FnOnce(&mut dyn SensorDriver, &mut Sccb<'_>) -> DriverResult<T>,
    ) -> DriverResult<T> {
        let driver = self.driver.as_deref_mut().ok_or(DriverError::Unsupported)?;
        let mut sccb = Sccb::new(&mut self.hal.bus, self.state.slave_addr);
        f(driver, &mut sccb)
    }

    /// 設定系のドライバ呼び出し
    fn control<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn SensorDriver, &mut Sccb<'_>) -> DriverResult<T>,
    ) -> SensorResult<T> {
        self.call_driver(f).map_err(|e| control_error(name, e))
    }

    /// 進行中のキャプチャを止めます
    fn abort_capture(&mut self) {
        self.hal.port.abort(true, false);
    }

    /// 設定変更後の安定待ち
    fn settle(&mut self) {
        if !self.state.disable_delays {
            self.hal.clock.delay_ms(self.config.settle_delay_ms);
        }
    }
}

/// ドライバエラーを設定操作のエラーに変換します
fn control_error(name: &str, error: DriverError) -> SensorError {
    match error {
        DriverError::Unsupported => {
            debug!("{}: 非対応", name);
            SensorError::ControlUnsupported
        }
        other => {
            warn!("{}: {}", name, other);
            SensorError::ControlFailed
        }
    }
}

/// ドライバエラーをレジスタアクセスのエラーに変換します
fn io_error(name: &str, error: DriverError) -> SensorError {
    match error {
        DriverError::Unsupported => SensorError::ControlUnsupported,
        other => {
            warn!("{}: {}", name, other);
            SensorError::IoError
        }
    }
}
