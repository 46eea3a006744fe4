//! センサー制御バス（SCCB/I2C）の抽象化
//!
//! レジスタアドレスは 8bit と 16bit の2種類、データは 1バイトと 1ワード（ビッグエンディアン）
//! の組み合わせで読み書きします。アドレスはすべて 7bit 表記です。

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;
use log::debug;
use thiserror::Error;

/// 1回のスキャンで保持できるデバイス数の上限
pub const MAX_SCAN_DEVICES: usize = 16;

/// スキャン結果（見つかった 7bit アドレス）
pub type ScanList = Vec<u8, MAX_SCAN_DEVICES>;

/// 7bit アドレスの有効範囲（予約アドレスを除く）
const SCAN_RANGE: core::ops::Range<u8> = 0x08..0x78;

/// バスエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("アドレス 0x{0:02X} から応答がありません")]
    Nack(u8),
    #[error("バスが無効化されています")]
    Disabled,
    #[error("バスエラー: {0}")]
    Other(String),
}

pub type BusResult<T> = Result<T, BusError>;

/// バス速度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusSpeed {
    /// 100kHz
    #[default]
    Standard,
    /// 400kHz
    Full,
    /// 1MHz
    Fast,
}

impl BusSpeed {
    pub fn hz(self) -> u32 {
        match self {
            BusSpeed::Standard => 100_000,
            BusSpeed::Full => 400_000,
            BusSpeed::Fast => 1_000_000,
        }
    }
}

/// センサー制御バス
///
/// 実装が必要なのは初期化・有効化・スキャンと2つの転送プリミティブのみで、
/// レジスタアクセスは既定実装が転送プリミティブから組み立てます。
pub trait SensorBus {
    /// バスを初期化します
    fn init(&mut self, bus_id: u32, speed: BusSpeed) -> BusResult<()>;

    /// バスの有効/無効を切り替えます
    fn enable(&mut self, enable: bool) -> BusResult<()>;

    /// 応答したデバイスのアドレスを列挙します
    fn scan(&mut self) -> BusResult<ScanList>;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> BusResult<()>;

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> BusResult<()>;

    /// 8bit レジスタから 1 バイト読みます
    fn read_byte(&mut self, addr: u8, reg: u8) -> BusResult<u8> {
        let mut buf = [0u8; 1];
        self.write_read(addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// 16bit レジスタから 1 バイト読みます
    fn read_byte_wide(&mut self, addr: u8, reg: u16) -> BusResult<u8> {
        let mut buf = [0u8; 1];
        self.write_read(addr, &reg.to_be_bytes(), &mut buf)?;
        Ok(buf[0])
    }

    /// 8bit レジスタから 1 ワード読みます
    fn read_word(&mut self, addr: u8, reg: u8) -> BusResult<u16> {
        let mut buf = [0u8; 2];
        self.write_read(addr, &[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// 16bit レジスタから 1 ワード読みます
    fn read_word_wide(&mut self, addr: u8, reg: u16) -> BusResult<u16> {
        let mut buf = [0u8; 2];
        self.write_read(addr, &reg.to_be_bytes(), &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_byte(&mut self, addr: u8, reg: u8, value: u8) -> BusResult<()> {
        self.write(addr, &[reg, value])
    }

    fn write_byte_wide(&mut self, addr: u8, reg: u16, value: u8) -> BusResult<()> {
        let [hi, lo] = reg.to_be_bytes();
        self.write(addr, &[hi, lo, value])
    }

    fn write_word(&mut self, addr: u8, reg: u8, value: u16) -> BusResult<()> {
        let [hi, lo] = value.to_be_bytes();
        self.write(addr, &[reg, hi, lo])
    }

    fn write_word_wide(&mut self, addr: u8, reg: u16, value: u16) -> BusResult<()> {
        let [rh, rl] = reg.to_be_bytes();
        let [vh, vl] = value.to_be_bytes();
        self.write(addr, &[rh, rl, vh, vl])
    }
}

/// 検出したセンサーへのレジスタアクセス
///
/// ドライバはこのハンドル経由でのみバスに触れます。
pub struct Sccb<'a> {
    bus: &'a mut dyn SensorBus,
    slave_addr: u8,
}

impl<'a> Sccb<'a> {
    pub fn new(bus: &'a mut dyn SensorBus, slave_addr: u8) -> Self {
        Self { bus, slave_addr }
    }

    pub fn slave_addr(&self) -> u8 {
        self.slave_addr
    }

    pub fn read_byte(&mut self, reg: u8) -> BusResult<u8> {
        self.bus.read_byte(self.slave_addr, reg)
    }

    pub fn read_byte_wide(&mut self, reg: u16) -> BusResult<u8> {
        self.bus.read_byte_wide(self.slave_addr, reg)
    }

    pub fn read_word(&mut self, reg: u8) -> BusResult<u16> {
        self.bus.read_word(self.slave_addr, reg)
    }

    pub fn read_word_wide(&mut self, reg: u16) -> BusResult<u16> {
        self.bus.read_word_wide(self.slave_addr, reg)
    }

    pub fn write_byte(&mut self, reg: u8, value: u8) -> BusResult<()> {
        self.bus.write_byte(self.slave_addr, reg, value)
    }

    pub fn write_byte_wide(&mut self, reg: u16, value: u8) -> BusResult<()> {
        self.bus.write_byte_wide(self.slave_addr, reg, value)
    }

    pub fn write_word(&mut self, reg: u8, value: u16) -> BusResult<()> {
        self.bus.write_word(self.slave_addr, reg, value)
    }

    pub fn write_word_wide(&mut self, reg: u16, value: u16) -> BusResult<()> {
        self.bus.write_word_wide(self.slave_addr, reg, value)
    }
}

/// `embedded-hal` の I2C を [`SensorBus`] として使うアダプタ
///
/// バス番号と速度はペリフェラル生成時に決まるため、`init` は記録のみ行います。
pub struct I2cSensorBus<I2C> {
    i2c: I2C,
    enabled: bool,
    bus_id: Option<u32>,
    speed: BusSpeed,
}

impl<I2C: I2c> I2cSensorBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            enabled: true,
            bus_id: None,
            speed: BusSpeed::default(),
        }
    }

    pub fn bus_id(&self) -> Option<u32> {
        self.bus_id
    }

    pub fn speed(&self) -> BusSpeed {
        self.speed
    }

    /// 内部の I2C ペリフェラルを取り出します
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn ensure_enabled(&self) -> BusResult<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(BusError::Disabled)
        }
    }

    fn map_error(addr: u8, error: I2C::Error) -> BusError {
        match error.kind() {
            ErrorKind::NoAcknowledge(_) => BusError::Nack(addr),
            kind => BusError::Other(format!("{kind:?}")),
        }
    }
}

impl<I2C: I2c> SensorBus for I2cSensorBus<I2C> {
    fn init(&mut self, bus_id: u32, speed: BusSpeed) -> BusResult<()> {
        debug!("I2C バス {} を {}Hz で使用", bus_id, speed.hz());
        self.bus_id = Some(bus_id);
        self.speed = speed;
        self.enabled = true;
        Ok(())
    }

    fn enable(&mut self, enable: bool) -> BusResult<()> {
        self.enabled = enable;
        Ok(())
    }

    fn scan(&mut self) -> BusResult<ScanList> {
        self.ensure_enabled()?;
        let mut found = ScanList::new();
        for addr in SCAN_RANGE {
            if self.i2c.write(addr, &[]).is_ok() && found.push(addr).is_err() {
                break;
            }
        }
        Ok(found)
    }

    fn write(&mut self, addr: u8, bytes: &[u8]) -> BusResult<()> {
        self.ensure_enabled()?;
        self.i2c
            .write(addr, bytes)
            .map_err(|e| Self::map_error(addr, e))
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> BusResult<()> {
        self.ensure_enabled()?;
        self.i2c
            .write_read(addr, bytes, buffer)
            .map_err(|e| Self::map_error(addr, e))
    }
}
