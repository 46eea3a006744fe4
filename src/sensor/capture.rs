//! キャプチャ中に呼ばれる処理（間引き・ライン転送・コールバック）

use super::Sensor;
use crate::core::line_copy::{self, LineLayout};
use crate::core::pixformat::PixFormat;
use crate::error::SensorResult;
use crate::hardware::bus::SensorBus;
use crate::hardware::port::{Clock, CsiPort, FramePool};
use embedded_hal::digital::OutputPin;

impl<B, P, F, C, RST, PWR> Sensor<B, P, F, C, RST, PWR>
where
    B: SensorBus,
    P: CsiPort,
    F: FramePool,
    C: Clock,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// 新しいフレームの受信を始めます
    pub fn begin_frame(&mut self) {
        self.throttle.begin_frame();
    }

    /// ラインごとに呼び出し、ソフトウェア間引きの判定を行います
    ///
    /// ドライバがフレームレートを制御している場合は何もしません。
    pub fn throttle_framerate(&mut self) {
        if self.state.native_framerate {
            return;
        }
        let now = self.hal.clock.ticks_ms();
        self.throttle.on_first_line(now, self.state.framerate);
    }

    /// 現在のフレームを捨てるか
    pub fn frame_dropped(&self) -> bool {
        self.throttle.should_drop()
    }

    /// 現在の設定でのライン変換条件（画素フォーマット未設定なら `None`）
    pub fn line_layout(&self) -> Option<LineLayout> {
        let pixformat = self.state.pixformat?;
        let traits = self.output_traits();
        let swap = match pixformat {
            PixFormat::Rgb565 => traits.rgb_swap,
            PixFormat::Yuv422 => traits.yuv_swap,
            _ => false,
        };
        Some(LineLayout {
            pixformat,
            width: self.fb.u,
            height: self.fb.v,
            transpose: self.state.transpose,
            mono_bpp: traits.mono_bpp,
            byte_swap: swap && !self.config.hw_swap_enabled,
        })
    }

    /// 1ライン分をフレームバッファへ書き込みます
    ///
    /// 間引き対象のフレーム、JPEG、画素フォーマット未設定の場合は書き込まずに
    /// `Ok(false)` を返します。ポートのアクセラレータが使えればそちらを優先します。
    pub fn copy_line(&mut self, src: &[u8], dst: &mut [u8]) -> SensorResult<bool> {
        if self.throttle.should_drop() {
            return Ok(false);
        }
        let Some(layout) = self.line_layout() else {
            return Ok(false);
        };
        if layout.pixformat == PixFormat::Jpeg {
            return Ok(false);
        }

        if self.hal.port.copy_line_accelerated(&layout.request(), src, dst) {
            return Ok(true);
        }
        line_copy::copy_line(&layout, src, dst)?;
        Ok(true)
    }

    /// VSYNC コールバックを呼び出します
    pub fn notify_vsync(&mut self, level: u32) {
        if let Some(callback) = self.vsync_callback.as_mut() {
            callback(level);
        }
    }

    /// フレーム完了コールバックを呼び出します
    pub fn notify_frame(&mut self) {
        if let Some(callback) = self.frame_callback.as_mut() {
            callback();
        }
    }
}
