//! ポート層（キャプチャインターフェース・フレームバッファ・時計・制御ピン）

use crate::core::line_copy::LineCopyRequest;
use crate::core::types::{BufferCount, ConfigKind};
use crate::error::{SensorError, SensorResult};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use thiserror::Error;

/// キャプチャインターフェース（CSI/DCMI 等）
#[allow(unused_variables)]
pub trait CsiPort {
    /// 進行中のキャプチャを止めます
    ///
    /// キャプチャしていない場合は何もせず、何度呼ばれても安全でなければなりません。
    fn abort(&mut self, fifo_flush: bool, in_irq: bool);

    /// センサーへ供給する外部クロックを設定します
    fn set_xclk_frequency(&mut self, hz: u32) -> SensorResult<()> {
        Err(SensorError::ControlUnsupported)
    }

    fn xclk_frequency(&self) -> SensorResult<u32> {
        Err(SensorError::ControlUnsupported)
    }

    /// MCU のシリコンリビジョン（分かる場合）
    fn silicon_revision(&self) -> Option<u32> {
        None
    }

    /// 設定変更後にポート側を再構成します
    fn config(&mut self, kind: ConfigKind) -> SensorResult<()> {
        Ok(())
    }

    /// DMA 等でラインを転送できた場合は `true`
    fn copy_line_accelerated(&mut self, request: &LineCopyRequest, src: &[u8], dst: &mut [u8]) -> bool {
        false
    }
}

/// フレームバッファプールのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("フレーム ({frame_size} バイト) がバッファ容量 ({capacity} バイト) を超えています")]
    Overflow { frame_size: u32, capacity: u32 },
    #[error("無効なバッファ数: {0}")]
    InvalidCount(u32),
}

impl From<PoolError> for SensorError {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Overflow { .. } => SensorError::FramebufferOverflow,
            PoolError::InvalidCount(_) => SensorError::InvalidArgument,
        }
    }
}

/// フレームバッファプール
pub trait FramePool {
    /// バッファ1枚で使える最大バイト数
    fn capacity(&self) -> u32;

    /// 現在のバッファ1枚あたりのバイト数
    fn buffer_size(&self) -> u32;

    /// フレームサイズとバッファ数を設定し、確定したバッファ数を返します
    fn set_buffers(&mut self, frame_size: u32, count: BufferCount) -> Result<u32, PoolError>;

    /// 前フレームの JPEG バッファを確定させます
    fn update_jpeg_buffer(&mut self);

    fn flush_buffers(&mut self, fifo_flush: bool);
}

/// 待ち時間とミリ秒単位の時刻
pub trait Clock: DelayNs {
    fn ticks_ms(&self) -> u32;
}

/// 配線されていない制御ピン
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
