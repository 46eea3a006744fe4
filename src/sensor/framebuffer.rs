//! フレームバッファの割り当てと自動クロップ

use super::Sensor;
use crate::core::autocrop::{crop_window, CropWindow};
use crate::core::pixformat::{dst_bpp, footprint_bpp, src_bpp, PixFormat};
use crate::core::resolution::FrameSize;
use crate::core::types::BufferCount;
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::SensorBus;
use crate::hardware::port::{Clock, CsiPort, FramePool};
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

impl<B, P, F, C, RST, PWR> Sensor<B, P, F, C, RST, PWR>
where
    B: SensorBus,
    P: CsiPort,
    F: FramePool,
    C: Clock,
    RST: OutputPin,
    PWR: OutputPin,
{
    /// フレームサイズとバッファ数をプールに設定します
    ///
    /// # エラー
    /// - 画素フォーマット未設定: `InvalidPixformat`
    /// - フレームサイズ未設定: `InvalidFramesize`
    /// - バッファ数 0: `InvalidArgument`
    /// - 容量不足: `FramebufferOverflow`
    pub fn set_framebuffers(&mut self, count: BufferCount) -> SensorResult<()> {
        self.abort_capture();
        self.hal.pool.update_jpeg_buffer();

        if self.state.pixformat.is_none() {
            return Err(SensorError::InvalidPixformat);
        }
        let framesize = self.state.framesize.ok_or(SensorError::InvalidFramesize)?;
        if count == BufferCount::Exact(0) {
            return Err(SensorError::InvalidArgument);
        }

        let bytes = self.footprint_bytes(self.state.pixformat, framesize, self.fb.u, self.fb.v);
        let frame_size = u32::try_from(bytes).map_err(|_| SensorError::FramebufferOverflow)?;

        let buffers = self.hal.pool.set_buffers(frame_size, count)?;
        self.fb.frame_size = frame_size;
        debug!("フレームバッファ: {} バイト x {}", frame_size, buffers);
        Ok(())
    }

    /// 現在のウィンドウが出力形式でバッファ1枚に収まるか確認します
    ///
    /// # エラー
    /// 収まらない場合は `FramebufferOverflow`
    pub fn check_framebuffer_size(&self) -> SensorResult<()> {
        let bytes = self.fb.window_bytes(dst_bpp(self.state.pixformat));
        if bytes <= u64::from(self.hal.pool.buffer_size()) {
            Ok(())
        } else {
            Err(SensorError::FramebufferOverflow)
        }
    }

    /// ウィンドウがバッファに収まらない場合に、収まる形へ調整します
    ///
    /// 2バイトカラーはまず Bayer（1バイト）に切り替え、それでも収まらなければ
    /// 縦横比を保ったままウィンドウを中央に縮めます。切り替えと縮小の結果は
    /// 状態を変更する前に決めます。
    ///
    /// # エラー
    /// 縮めても収まらない場合、またはハードウェアクロップが無く縮小で容量を
    /// 減らせない場合は `FramebufferOverflow`（フォーマットとウィンドウは変更しません）
    pub fn auto_crop_framebuffer(&mut self) -> SensorResult<()> {
        let current = self.state.pixformat;
        let bpp = dst_bpp(current);
        if bpp == 0 || self.fb.window_bytes(bpp) <= u64::from(self.hal.pool.buffer_size()) {
            return Ok(());
        }
        let Some(framesize) = self.state.framesize else {
            return Ok(());
        };

        let target = if current.is_some_and(PixFormat::is_two_byte_color) {
            Some(PixFormat::Bayer)
        } else {
            current
        };
        let capacity = u64::from(self.hal.pool.capacity());
        let window = CropWindow {
            x: self.fb.x,
            y: self.fb.y,
            u: self.fb.u,
            v: self.fb.v,
        };

        let cropped = if self.footprint_bytes(target, framesize, window.u, window.v) <= capacity {
            None
        } else if !self.config.hw_crop_enabled {
            warn!("ハードウェアクロップが無いため {}x{} を縮小できません", window.u, window.v);
            return Err(SensorError::FramebufferOverflow);
        } else {
            let footprint = footprint_bpp(target, &self.output_traits());
            let cropped = crop_window(window, footprint, capacity).ok_or_else(|| {
                warn!("{}x{} をバッファ ({} バイト) に収められません", window.u, window.v, capacity);
                SensorError::FramebufferOverflow
            })?;
            Some(cropped)
        };

        let switched = match target {
            Some(pixformat) if target != current => {
                info!("バッファ不足のため {:?} に切り替えます", pixformat);
                self.apply_pixformat(pixformat, false)?;
                true
            }
            _ => false,
        };

        let Some(cropped) = cropped else {
            // 切り替え時はバッファも割り当て直し済み
            return if switched { Ok(()) } else { self.set_framebuffers(BufferCount::Auto) };
        };

        self.abort_capture();
        let saved = self.fb;
        self.fb.set_window(cropped.x, cropped.y, cropped.u, cropped.v);
        if let Err(e) = self.set_framebuffers(BufferCount::Auto) {
            self.fb = saved;
            return Err(e);
        }
        info!(
            "✓ ウィンドウを {}x{} -> {}x{} ({}, {}) に縮小しました",
            window.u, window.v, cropped.u, cropped.v, cropped.x, cropped.y
        );
        Ok(())
    }

    /// ウィンドウがフレームサイズ全体より小さいか
    pub fn get_cropped(&self) -> bool {
        self.fb.is_cropped(self.state.framesize)
    }

    /// 入力側のバイト/ピクセル（未設定は 0）
    pub fn get_src_bpp(&self) -> u32 {
        src_bpp(self.state.pixformat, &self.output_traits())
    }

    /// 出力側のバイト/ピクセル（未設定・JPEG は 0）
    pub fn get_dst_bpp(&self) -> u32 {
        dst_bpp(self.state.pixformat)
    }

    /// 指定した設定で1フレームが占めるバイト数
    ///
    /// ハードウェアクロップが無い場合はフレームサイズ全体を受け取ります。
    pub(super) fn footprint_bytes(
        &self,
        pixformat: Option<PixFormat>,
        framesize: FrameSize,
        u: u32,
        v: u32,
    ) -> u64 {
        let bpp = u64::from(footprint_bpp(pixformat, &self.output_traits()));
        let (width, height) = if self.config.hw_crop_enabled {
            (u, v)
        } else {
            framesize.resolution()
        };
        u64::from(width) * u64::from(height) * bpp
    }

    /// 変更後の設定がプールの容量に収まるか事前に確認します
    ///
    /// どちらかが未設定の場合は確認しません。
    pub(super) fn ensure_fits(
        &self,
        pixformat: Option<PixFormat>,
        framesize: Option<FrameSize>,
        u: u32,
        v: u32,
    ) -> SensorResult<()> {
        let (Some(_), Some(framesize)) = (pixformat, framesize) else {
            return Ok(());
        };
        let bytes = self.footprint_bytes(pixformat, framesize, u, v);
        let capacity = u64::from(self.hal.pool.capacity());
        if bytes > capacity {
            warn!("フレーム ({} バイト) がバッファ容量 ({} バイト) を超えます", bytes, capacity);
            return Err(SensorError::FramebufferOverflow);
        }
        Ok(())
    }

    /// 設定変更後にバッファを割り当て直します
    ///
    /// 設定が揃っていない間のエラーは無視します。
    pub(super) fn refresh_framebuffers(&mut self) -> SensorResult<()> {
        match self.set_framebuffers(BufferCount::Auto) {
            Ok(()) | Err(SensorError::InvalidPixformat) | Err(SensorError::InvalidFramesize) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::super::test_support::fixture;
    use super::*;
    use crate::core::pixformat::OutputTraits;

    #[test]
    fn test_set_framebuffers_requires_configuration() {
        let mut f = fixture(100_000);
        assert_eq!(f.sensor.set_framebuffers(BufferCount::Auto), Err(SensorError::InvalidPixformat));

        f.sensor.set_pixformat(PixFormat::Grayscale).unwrap();
        assert_eq!(f.sensor.set_framebuffers(BufferCount::Auto), Err(SensorError::InvalidFramesize));

        f.sensor.set_framesize(FrameSize::Qvga).unwrap();
        assert_eq!(f.sensor.set_framebuffers(BufferCount::Exact(0)), Err(SensorError::InvalidArgument));
        assert_eq!(f.sensor.set_framebuffers(BufferCount::Exact(1)), Ok(()));
        assert_eq!(f.pool.count(), 1);
        assert_eq!(f.sensor.frame().frame_size, 320 * 240);
    }

    #[test]
    fn test_footprint_uses_wider_of_src_and_dst() {
        // Given: 16bit グレースケールを出力するセンサー
        let mut f = fixture(1_000_000);
        f.driver.set_output_traits(OutputTraits {
            mono_bpp: 2,
            ..OutputTraits::default()
        });

        // When
        f.sensor.set_pixformat(PixFormat::Grayscale).unwrap();
        f.sensor.set_framesize(FrameSize::Qvga).unwrap();

        // Then
        assert_eq!(f.sensor.get_src_bpp(), 2);
        assert_eq!(f.sensor.get_dst_bpp(), 1);
        assert_eq!(f.pool.frame_size(), 320 * 240 * 2);
    }

    #[test]
    fn test_check_framebuffer_size() {
        let mut f = fixture(100_000);
        f.sensor.set_pixformat(PixFormat::Grayscale).unwrap();
        f.sensor.set_framesize(FrameSize::Qvga).unwrap();
        assert_eq!(f.sensor.check_framebuffer_size(), Ok(()));

        f.pool.set_capacity(50_000);
        assert_eq!(f.sensor.check_framebuffer_size(), Err(SensorError::FramebufferOverflow));
    }

    #[test]
    fn test_cropped_window() {
        let mut f = fixture(1_000_000);
        f.sensor.set_pixformat(PixFormat::Rgb565).unwrap();
        f.sensor.set_framesize(FrameSize::Qvga).unwrap();
        assert!(!f.sensor.get_cropped());

        f.sensor.set_windowing(10, 10, 100, 100).unwrap();
        assert!(f.sensor.get_cropped());
    }

    #[test]
    fn test_full_frame_without_hardware_crop() {
        // Given: ポートがクロップできない構成
        let mut f = fixture(1_000_000);
        f.sensor.config.hw_crop_enabled = false;
        f.sensor.set_pixformat(PixFormat::Grayscale).unwrap();
        f.sensor.set_framesize(FrameSize::Qvga).unwrap();

        // When
        f.sensor.set_windowing(0, 0, 64, 64).unwrap();

        // Then: フレーム全体を受け取るサイズで割り当てる
        assert_eq!(f.pool.frame_size(), 320 * 240);
    }
}
