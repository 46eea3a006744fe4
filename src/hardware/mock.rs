//! テスト用のモックハードウェア
//!
//! 実際のセンサーやバスを使わずに検出・設定・ライン転送をシミュレートします。
//! どのモックも `Arc<Mutex<..>>` で状態を共有するハンドルなので、`Sensor` に
//! 所有権を渡した後でもクローンから記録を検証できます。

use crate::core::line_copy::LineCopyRequest;
use crate::core::pixformat::{OutputTraits, PixFormat};
use crate::core::resolution::FrameSize;
use crate::core::types::{BufferCount, ConfigKind, GainCeiling, Polarity, SpecialEffect};
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::{BusError, BusResult, BusSpeed, Sccb, ScanList, SensorBus};
use crate::hardware::chip::{addr, ChipId, SensorFamily};
use crate::hardware::driver::{
    DriverError, DriverRegistry, DriverResult, IoctlCommand, IoctlResponse, SensorDriver,
};
use crate::hardware::port::{Clock, CsiPort, FramePool, PoolError};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ボード（バス・制御ピン）
// ---------------------------------------------------------------------------

/// センサーの制御ピン配線
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wiring {
    pub reset_pol: Polarity,
    pub power_pol: Polarity,
}

impl Wiring {
    pub const fn new(reset_pol: Polarity, power_pol: Polarity) -> Self {
        Self {
            reset_pol,
            power_pol,
        }
    }

    /// 4通りすべての配線
    pub const ALL: [Wiring; 4] = [
        Wiring::new(Polarity::ActiveHigh, Polarity::ActiveHigh),
        Wiring::new(Polarity::ActiveLow, Polarity::ActiveHigh),
        Wiring::new(Polarity::ActiveLow, Polarity::ActiveLow),
        Wiring::new(Polarity::ActiveHigh, Polarity::ActiveLow),
    ];
}

impl Default for Wiring {
    fn default() -> Self {
        Wiring::new(Polarity::ActiveHigh, Polarity::ActiveHigh)
    }
}

/// バス上の模擬センサー
///
/// レジスタはアドレスのバイト列をキーに、読み出されるデータのバイト列を保持します。
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub addr: u8,
    pub wiring: Wiring,
    registers: HashMap<Vec<u8>, Vec<u8>>,
}

impl MockDevice {
    pub fn new(addr: u8, wiring: Wiring) -> Self {
        Self {
            addr,
            wiring,
            registers: HashMap::new(),
        }
    }

    pub fn with_register(mut self, reg: &[u8], data: &[u8]) -> Self {
        self.registers.insert(reg.to_vec(), data.to_vec());
        self
    }

    pub fn ov2640(wiring: Wiring) -> Self {
        Self::new(addr::OV2640, wiring).with_register(&[0x0A], &[0x26])
    }

    pub fn ov7725(wiring: Wiring) -> Self {
        Self::new(addr::OV7725, wiring).with_register(&[0x0A], &[0x77])
    }

    pub fn ov5640(wiring: Wiring) -> Self {
        Self::new(addr::OV5640, wiring)
            .with_register(&[0xF0], &[0x00])
            .with_register(&[0x30, 0x0A], &[0x56])
    }

    pub fn gc2145(wiring: Wiring) -> Self {
        Self::new(addr::OV5640, wiring).with_register(&[0xF0], &[0x21])
    }

    /// MT9V034（ワード ID 0x1324）
    pub fn mt9v034(wiring: Wiring) -> Self {
        Self::new(addr::MT9V0XX, wiring).with_register(&[0x00], &[0x13, 0x24])
    }

    /// 旧リビジョンの MT9V032（ワード ID 0x1311）
    pub fn mt9v032_rev1(wiring: Wiring) -> Self {
        Self::new(addr::MT9V0XX, wiring).with_register(&[0x00], &[0x13, 0x11])
    }

    pub fn mt9m114(wiring: Wiring) -> Self {
        Self::new(addr::MT9M114, wiring).with_register(&[0x00, 0x00], &[0x24, 0x81])
    }

    pub fn hm01b0(wiring: Wiring) -> Self {
        Self::new(addr::HM0XX0, wiring).with_register(&[0x00, 0x01], &[0xB0])
    }

    /// PAG7920（ID をリトルエンディアンで返す）
    pub fn pag7920(wiring: Wiring) -> Self {
        Self::new(addr::PAG7920, wiring).with_register(&[0x00], &[0x20, 0x79])
    }

    pub fn lepton(wiring: Wiring) -> Self {
        Self::new(addr::LEPTON, wiring)
    }
}

/// ピンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    Reset,
    Power,
}

/// ボード全体の状態
#[derive(Debug, Default)]
pub struct BoardState {
    pub reset_level: bool,
    pub power_level: bool,
    pub bus_enabled: bool,
    pub bus_config: Option<(u32, BusSpeed)>,
    pub devices: Vec<MockDevice>,
    pub pin_log: Vec<(PinKind, bool)>,
    pub bus_enable_log: Vec<bool>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub scan_count: usize,
    pub simulate_read_error: bool,
    pub simulate_init_error: bool,
}

impl BoardState {
    fn responds(&self, device: &MockDevice) -> bool {
        let in_reset = self.reset_level == device.wiring.reset_pol.asserted_level();
        let powered_down = self.power_level == device.wiring.power_pol.asserted_level();
        self.bus_enabled && !in_reset && !powered_down
    }

    fn responding(&self, slave_addr: u8) -> Option<&MockDevice> {
        self.devices
            .iter()
            .find(|d| d.addr == slave_addr && self.responds(d))
    }
}

/// 模擬ボード（バスと制御ピンのハンドルを払い出す）
#[derive(Debug, Clone, Default)]
pub struct MockBoard {
    pub state: Arc<Mutex<BoardState>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: デバイスを接続
    pub fn add_device(&self, device: MockDevice) {
        lock(&self.state).devices.push(device);
    }

    pub fn bus(&self) -> MockBus {
        MockBus {
            state: Arc::clone(&self.state),
        }
    }

    pub fn reset_pin(&self) -> MockPin {
        MockPin {
            kind: PinKind::Reset,
            state: Arc::clone(&self.state),
        }
    }

    pub fn power_pin(&self) -> MockPin {
        MockPin {
            kind: PinKind::Power,
            state: Arc::clone(&self.state),
        }
    }

    /// テスト用: 読み出しエラーをシミュレート
    pub fn set_read_error(&self, enable: bool) {
        lock(&self.state).simulate_read_error = enable;
    }

    /// テスト用: バス初期化エラーをシミュレート
    pub fn set_bus_init_error(&self, enable: bool) {
        lock(&self.state).simulate_init_error = enable;
    }

    pub fn pin_log(&self) -> Vec<(PinKind, bool)> {
        lock(&self.state).pin_log.clone()
    }

    pub fn clear_pin_log(&self) {
        lock(&self.state).pin_log.clear();
    }

    pub fn bus_enable_log(&self) -> Vec<bool> {
        lock(&self.state).bus_enable_log.clone()
    }

    pub fn bus_config(&self) -> Option<(u32, BusSpeed)> {
        lock(&self.state).bus_config
    }

    pub fn scan_count(&self) -> usize {
        lock(&self.state).scan_count
    }

    pub fn levels(&self) -> (bool, bool) {
        let state = lock(&self.state);
        (state.reset_level, state.power_level)
    }
}

/// 模擬バス
#[derive(Debug, Clone)]
pub struct MockBus {
    state: Arc<Mutex<BoardState>>,
}

impl SensorBus for MockBus {
    fn init(&mut self, bus_id: u32, speed: BusSpeed) -> BusResult<()> {
        let mut state = lock(&self.state);
        if state.simulate_init_error {
            return Err(BusError::Other("Simulated init error".to_string()));
        }
        state.bus_config = Some((bus_id, speed));
        state.bus_enabled = true;
        Ok(())
    }

    fn enable(&mut self, enable: bool) -> BusResult<()> {
        let mut state = lock(&self.state);
        state.bus_enabled = enable;
        state.bus_enable_log.push(enable);
        Ok(())
    }

    fn scan(&mut self) -> BusResult<ScanList> {
        let mut state = lock(&self.state);
        state.scan_count += 1;
        if !state.bus_enabled {
            return Err(BusError::Disabled);
        }
        let mut found = ScanList::new();
        for device in state.devices.iter().filter(|d| state.responds(d)) {
            if !found.contains(&device.addr) && found.push(device.addr).is_err() {
                break;
            }
        }
        Ok(found)
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> BusResult<()> {
        let mut state = lock(&self.state);
        if state.responding(addr).is_none() {
            return Err(BusError::Nack(addr));
        }
        state.writes.push((addr, bytes.to_vec()));
        Ok(())
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> BusResult<()> {
        let state = lock(&self.state);
        if state.simulate_read_error {
            return Err(BusError::Other("Simulated read error".to_string()));
        }
        let device = state.responding(addr).ok_or(BusError::Nack(addr))?;
        let data = device
            .registers
            .get(bytes)
            .ok_or_else(|| BusError::Other(format!("未定義レジスタ {bytes:02X?}")))?;
        let len = data.len().min(buffer.len());
        buffer[..len].copy_from_slice(&data[..len]);
        Ok(())
    }
}

/// 模擬制御ピン
#[derive(Debug, Clone)]
pub struct MockPin {
    kind: PinKind,
    state: Arc<Mutex<BoardState>>,
}

impl MockPin {
    fn drive(&mut self, level: bool) {
        let mut state = lock(&self.state);
        match self.kind {
            PinKind::Reset => state.reset_level = level,
            PinKind::Power => state.power_level = level,
        }
        state.pin_log.push((self.kind, level));
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 時計
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ClockState {
    pub now_ns: u64,
    pub delays_ms: Vec<u32>,
}

/// 模擬時計（待ち時間の分だけ時刻が進む）
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    pub state: Arc<Mutex<ClockState>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 時刻を進める
    pub fn advance_ms(&self, ms: u32) {
        lock(&self.state).now_ns += u64::from(ms) * 1_000_000;
    }

    pub fn delays_ms(&self) -> Vec<u32> {
        lock(&self.state).delays_ms.clone()
    }

    pub fn clear_delays(&self) {
        lock(&self.state).delays_ms.clear();
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        lock(&self.state).now_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut state = lock(&self.state);
        state.now_ns += u64::from(ms) * 1_000_000;
        state.delays_ms.push(ms);
    }
}

impl Clock for MockClock {
    fn ticks_ms(&self) -> u32 {
        (lock(&self.state).now_ns / 1_000_000) as u32
    }
}

// ---------------------------------------------------------------------------
// ポート
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PortState {
    pub abort_count: usize,
    pub xclk_hz: Option<u32>,
    pub silicon_revision: Option<u32>,
    pub config_calls: Vec<ConfigKind>,
    pub accelerate: bool,
    pub accelerated_lines: usize,
    pub simulate_xclk_error: bool,
}

/// 模擬キャプチャポート
#[derive(Debug, Clone, Default)]
pub struct MockPort {
    pub state: Arc<Mutex<PortState>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort_count(&self) -> usize {
        lock(&self.state).abort_count
    }

    pub fn config_calls(&self) -> Vec<ConfigKind> {
        lock(&self.state).config_calls.clone()
    }

    pub fn xclk_hz(&self) -> Option<u32> {
        lock(&self.state).xclk_hz
    }

    pub fn accelerated_lines(&self) -> usize {
        lock(&self.state).accelerated_lines
    }

    /// テスト用: クロック設定エラーをシミュレート
    pub fn set_xclk_error(&self, enable: bool) {
        lock(&self.state).simulate_xclk_error = enable;
    }

    /// テスト用: ライン転送をアクセラレータに任せる
    pub fn set_accelerate(&self, enable: bool) {
        lock(&self.state).accelerate = enable;
    }

    pub fn set_silicon_revision(&self, revision: Option<u32>) {
        lock(&self.state).silicon_revision = revision;
    }
}

impl CsiPort for MockPort {
    fn abort(&mut self, _fifo_flush: bool, _in_irq: bool) {
        lock(&self.state).abort_count += 1;
    }

    fn set_xclk_frequency(&mut self, hz: u32) -> SensorResult<()> {
        let mut state = lock(&self.state);
        if state.simulate_xclk_error {
            return Err(SensorError::ControlFailed);
        }
        state.xclk_hz = Some(hz);
        Ok(())
    }

    fn xclk_frequency(&self) -> SensorResult<u32> {
        lock(&self.state).xclk_hz.ok_or(SensorError::ControlUnsupported)
    }

    fn silicon_revision(&self) -> Option<u32> {
        lock(&self.state).silicon_revision
    }

    fn config(&mut self, kind: ConfigKind) -> SensorResult<()> {
        lock(&self.state).config_calls.push(kind);
        Ok(())
    }

    fn copy_line_accelerated(&mut self, request: &LineCopyRequest, src: &[u8], dst: &mut [u8]) -> bool {
        let mut state = lock(&self.state);
        if !state.accelerate || request.transpose || request.src_bpp != request.dst_bpp {
            return false;
        }
        let len = request.width * request.dst_bpp;
        if src.len() < len || dst.len() < len {
            return false;
        }
        dst[..len].copy_from_slice(&src[..len]);
        state.accelerated_lines += 1;
        true
    }
}

// ---------------------------------------------------------------------------
// フレームバッファプール
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PoolState {
    pub capacity: u32,
    pub max_buffers: u32,
    pub count: u32,
    pub frame_size: u32,
    pub jpeg_updates: usize,
    pub flushes: usize,
}

/// 模擬フレームバッファプール
///
/// 総容量を `count` 枚で等分します。`Auto` は収まる範囲で最大 `max_buffers` 枚まで確保します。
#[derive(Debug, Clone)]
pub struct MockFramePool {
    pub state: Arc<Mutex<PoolState>>,
}

impl MockFramePool {
    pub fn new(capacity: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                capacity,
                max_buffers: 3,
                count: 1,
                frame_size: 0,
                jpeg_updates: 0,
                flushes: 0,
            })),
        }
    }

    /// テスト用: 総容量を変更（メモリ圧迫のシミュレーション）
    pub fn set_capacity(&self, capacity: u32) {
        lock(&self.state).capacity = capacity;
    }

    pub fn count(&self) -> u32 {
        lock(&self.state).count
    }

    pub fn frame_size(&self) -> u32 {
        lock(&self.state).frame_size
    }

    pub fn jpeg_updates(&self) -> usize {
        lock(&self.state).jpeg_updates
    }

    pub fn flushes(&self) -> usize {
        lock(&self.state).flushes
    }
}

impl FramePool for MockFramePool {
    fn capacity(&self) -> u32 {
        lock(&self.state).capacity
    }

    fn buffer_size(&self) -> u32 {
        let state = lock(&self.state);
        state.capacity / state.count.max(1)
    }

    fn set_buffers(&mut self, frame_size: u32, count: BufferCount) -> Result<u32, PoolError> {
        let mut state = lock(&self.state);
        let count = match count {
            BufferCount::Exact(0) => return Err(PoolError::InvalidCount(0)),
            BufferCount::Exact(n) => n,
            BufferCount::Auto => {
                if frame_size > state.capacity {
                    return Err(PoolError::Overflow {
                        frame_size,
                        capacity: state.capacity,
                    });
                }
                match state.capacity.checked_div(frame_size) {
                    Some(fit) => fit.clamp(1, state.max_buffers),
                    None => 1,
                }
            }
        };
        state.count = count;
        state.frame_size = frame_size;
        Ok(count)
    }

    fn update_jpeg_buffer(&mut self) {
        lock(&self.state).jpeg_updates += 1;
    }

    fn flush_buffers(&mut self, _fifo_flush: bool) {
        lock(&self.state).flushes += 1;
    }
}

// ---------------------------------------------------------------------------
// ドライバ
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DriverState {
    /// 呼び出されたメソッド名の記録
    pub calls: Vec<&'static str>,
    pub unsupported: HashSet<&'static str>,
    pub failing: HashSet<&'static str>,
    pub traits: OutputTraits,
    pub registers: HashMap<u16, u16>,
    pub pixformat: Option<PixFormat>,
    pub framesize: Option<FrameSize>,
    pub framerate: Option<u32>,
    pub gain_db: f32,
    pub exposure_us: i32,
    pub rgb_gain_db: (f32, f32, f32),
    pub blc_regs: Vec<i32>,
    pub last_ioctl: Option<IoctlCommand>,
}

/// 模擬ドライバ（既定ではすべての機能に対応）
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    pub state: Arc<Mutex<DriverState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 機能を非対応にする
    pub fn set_unsupported(&self, method: &'static str) {
        lock(&self.state).unsupported.insert(method);
    }

    /// テスト用: 機能を失敗させる
    pub fn set_failing(&self, method: &'static str) {
        lock(&self.state).failing.insert(method);
    }

    pub fn clear_failing(&self) {
        lock(&self.state).failing.clear();
    }

    pub fn set_output_traits(&self, traits: OutputTraits) {
        lock(&self.state).traits = traits;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.state).calls.iter().filter(|&&c| c == method).count()
    }

    pub fn last_ioctl(&self) -> Option<IoctlCommand> {
        lock(&self.state).last_ioctl
    }

    fn enter(&self, method: &'static str) -> DriverResult<MutexGuard<'_, DriverState>> {
        let mut state = lock(&self.state);
        state.calls.push(method);
        if state.unsupported.contains(method) {
            return Err(DriverError::Unsupported);
        }
        if state.failing.contains(method) {
            return Err(DriverError::Failed(format!("Simulated {method} error")));
        }
        Ok(state)
    }
}

impl SensorDriver for MockDriver {
    fn output_traits(&self) -> OutputTraits {
        lock(&self.state).traits
    }

    fn reset(&mut self, _sccb: &mut Sccb<'_>) -> DriverResult<()> {
        self.enter("reset").map(|_| ())
    }

    fn sleep(&mut self, _sccb: &mut Sccb<'_>, _enable: bool) -> DriverResult<()> {
        self.enter("sleep").map(|_| ())
    }

    fn read_reg(&mut self, _sccb: &mut Sccb<'_>, reg: u16) -> DriverResult<u16> {
        let state = self.enter("read_reg")?;
        state
            .registers
            .get(&reg)
            .copied()
            .ok_or_else(|| DriverError::Failed(format!("未定義レジスタ 0x{reg:04X}")))
    }

    fn write_reg(&mut self, _sccb: &mut Sccb<'_>, reg: u16, value: u16) -> DriverResult<()> {
        self.enter("write_reg")?.registers.insert(reg, value);
        Ok(())
    }

    fn set_pixformat(&mut self, _sccb: &mut Sccb<'_>, pixformat: PixFormat) -> DriverResult<()> {
        self.enter("set_pixformat")?.pixformat = Some(pixformat);
        Ok(())
    }

    fn set_framesize(&mut self, _sccb: &mut Sccb<'_>, framesize: FrameSize) -> DriverResult<()> {
        self.enter("set_framesize")?.framesize = Some(framesize);
        Ok(())
    }

    fn set_framerate(&mut self, _sccb: &mut Sccb<'_>, framerate: u32) -> DriverResult<()> {
        self.enter("set_framerate")?.framerate = Some(framerate);
        Ok(())
    }

    fn set_contrast(&mut self, _sccb: &mut Sccb<'_>, _level: i32) -> DriverResult<()> {
        self.enter("set_contrast").map(|_| ())
    }

    fn set_brightness(&mut self, _sccb: &mut Sccb<'_>, _level: i32) -> DriverResult<()> {
        self.enter("set_brightness").map(|_| ())
    }

    fn set_saturation(&mut self, _sccb: &mut Sccb<'_>, _level: i32) -> DriverResult<()> {
        self.enter("set_saturation").map(|_| ())
    }

    fn set_gainceiling(&mut self, _sccb: &mut Sccb<'_>, _ceiling: GainCeiling) -> DriverResult<()> {
        self.enter("set_gainceiling").map(|_| ())
    }

    fn set_quality(&mut self, _sccb: &mut Sccb<'_>, _quality: i32) -> DriverResult<()> {
        self.enter("set_quality").map(|_| ())
    }

    fn set_colorbar(&mut self, _sccb: &mut Sccb<'_>, _enable: bool) -> DriverResult<()> {
        self.enter("set_colorbar").map(|_| ())
    }

    fn set_auto_gain(
        &mut self,
        _sccb: &mut Sccb<'_>,
        _enable: bool,
        gain_db: f32,
        _gain_db_ceiling: f32,
    ) -> DriverResult<()> {
        self.enter("set_auto_gain")?.gain_db = gain_db;
        Ok(())
    }

    fn get_gain_db(&mut self, _sccb: &mut Sccb<'_>) -> DriverResult<f32> {
        Ok(self.enter("get_gain_db")?.gain_db)
    }

    fn set_auto_exposure(
        &mut self,
        _sccb: &mut Sccb<'_>,
        _enable: bool,
        exposure_us: i32,
    ) -> DriverResult<()> {
        self.enter("set_auto_exposure")?.exposure_us = exposure_us;
        Ok(())
    }

    fn get_exposure_us(&mut self, _sccb: &mut Sccb<'_>) -> DriverResult<i32> {
        Ok(self.enter("get_exposure_us")?.exposure_us)
    }

    fn set_auto_whitebal(
        &mut self,
        _sccb: &mut Sccb<'_>,
        _enable: bool,
        r_gain_db: f32,
        g_gain_db: f32,
        b_gain_db: f32,
    ) -> DriverResult<()> {
        self.enter("set_auto_whitebal")?.rgb_gain_db = (r_gain_db, g_gain_db, b_gain_db);
        Ok(())
    }

    fn get_rgb_gain_db(&mut self, _sccb: &mut Sccb<'_>) -> DriverResult<(f32, f32, f32)> {
        Ok(self.enter("get_rgb_gain_db")?.rgb_gain_db)
    }

    fn set_auto_blc(
        &mut self,
        _sccb: &mut Sccb<'_>,
        _enable: bool,
        regs: Option<&[i32]>,
    ) -> DriverResult<()> {
        let mut state = self.enter("set_auto_blc")?;
        if let Some(regs) = regs {
            state.blc_regs = regs.to_vec();
        }
        Ok(())
    }

    fn get_blc_regs(&mut self, _sccb: &mut Sccb<'_>, regs: &mut [i32]) -> DriverResult<()> {
        let state = self.enter("get_blc_regs")?;
        for (dst, src) in regs.iter_mut().zip(state.blc_regs.iter()) {
            *dst = *src;
        }
        Ok(())
    }

    fn set_hmirror(&mut self, _sccb: &mut Sccb<'_>, _enable: bool) -> DriverResult<()> {
        self.enter("set_hmirror").map(|_| ())
    }

    fn set_vflip(&mut self, _sccb: &mut Sccb<'_>, _enable: bool) -> DriverResult<()> {
        self.enter("set_vflip").map(|_| ())
    }

    fn set_special_effect(&mut self, _sccb: &mut Sccb<'_>, _effect: SpecialEffect) -> DriverResult<()> {
        self.enter("set_special_effect").map(|_| ())
    }

    fn set_lens_correction(
        &mut self,
        _sccb: &mut Sccb<'_>,
        _enable: bool,
        _radius: i32,
        _coefficient: i32,
    ) -> DriverResult<()> {
        self.enter("set_lens_correction").map(|_| ())
    }

    fn ioctl(&mut self, _sccb: &mut Sccb<'_>, command: IoctlCommand) -> DriverResult<IoctlResponse> {
        self.enter("ioctl")?.last_ioctl = Some(command);
        Ok(IoctlResponse::None)
    }
}

// ---------------------------------------------------------------------------
// ドライバレジストリ
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RegistryState {
    pub supported: Vec<SensorFamily>,
    pub direct: Option<ChipId>,
    pub simulate_init_error: bool,
    /// (ファミリー, チップ ID, アドレス)
    pub initialized: Vec<(SensorFamily, ChipId, u8)>,
}

/// 模擬ドライバレジストリ（どのファミリーにも同じ [`MockDriver`] を返す）
#[derive(Debug, Clone)]
pub struct MockRegistry {
    pub state: Arc<Mutex<RegistryState>>,
    driver: MockDriver,
}

impl MockRegistry {
    /// すべてのファミリーに対応するレジストリ
    pub fn new(driver: MockDriver) -> Self {
        Self::with_families(driver, &SensorFamily::ALL)
    }

    pub fn with_families(driver: MockDriver, families: &[SensorFamily]) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState {
                supported: families.to_vec(),
                ..RegistryState::default()
            })),
            driver,
        }
    }

    /// テスト用: バス外センサーの存在を設定
    pub fn set_direct(&self, chip_id: Option<ChipId>) {
        lock(&self.state).direct = chip_id;
    }

    /// テスト用: 初期化エラーをシミュレート
    pub fn set_init_error(&self, enable: bool) {
        lock(&self.state).simulate_init_error = enable;
    }

    pub fn initialized(&self) -> Vec<(SensorFamily, ChipId, u8)> {
        lock(&self.state).initialized.clone()
    }
}

impl DriverRegistry for MockRegistry {
    fn supports(&self, family: SensorFamily) -> bool {
        lock(&self.state).supported.contains(&family)
    }

    fn init_driver(
        &mut self,
        family: SensorFamily,
        chip_id: ChipId,
        sccb: &mut Sccb<'_>,
    ) -> DriverResult<Box<dyn SensorDriver>> {
        let mut state = lock(&self.state);
        if state.simulate_init_error {
            return Err(DriverError::Failed("Simulated init error".to_string()));
        }
        state.initialized.push((family, chip_id, sccb.slave_addr()));
        Ok(Box::new(self.driver.clone()))
    }

    fn probe_direct(&mut self) -> Option<ChipId> {
        lock(&self.state).direct
    }
}
