//! 撮像設定と画質調整

use super::Sensor;
use crate::core::pixformat::PixFormat;
use crate::core::resolution::FrameSize;
use crate::core::types::{ConfigKind, GainCeiling, SpecialEffect};
use crate::error::{SensorError, SensorResult};
use crate::hardware::bus::SensorBus;
use crate::hardware::driver::{DriverError, IoctlCommand, IoctlResponse};
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
    /// 画素フォーマットを設定します
    ///
    /// Bayer から 2バイトカラーへ戻す要求で、ウィンドウが 2バイトでは収まらず
    /// 1バイトなら収まる場合は、自動クロップとの往復を避けるため何もしません。
    ///
    /// # エラー
    /// - 転置・自動回転と YUV422、クロップ・転置・自動回転と JPEG: `PixformatUnsupported`
    /// - 容量不足: `FramebufferOverflow`
    /// - ドライバ: `ControlUnsupported` / `ControlFailed`
    pub fn set_pixformat(&mut self, pixformat: PixFormat) -> SensorResult<()> {
        if self.state.pixformat == Some(pixformat) {
            return Ok(());
        }

        let available = u64::from(self.hal.pool.buffer_size());
        if self.state.pixformat == Some(PixFormat::Bayer)
            && pixformat.is_two_byte_color()
            && self.fb.window_bytes(2) > available
            && self.fb.window_bytes(1) <= available
        {
            debug!("{:?}: Bayer のまま維持します", pixformat);
            return Ok(());
        }

        let rotated = self.state.transpose || self.state.auto_rotation;
        let incompatible = match pixformat {
            PixFormat::Yuv422 => rotated,
            PixFormat::Jpeg => rotated || self.get_cropped(),
            _ => false,
        };
        if incompatible {
            warn!("{:?} は現在の設定と併用できません", pixformat);
            return Err(SensorError::PixformatUnsupported);
        }

        self.apply_pixformat(pixformat, true)
    }

    /// 検証済みの画素フォーマットを適用します
    ///
    /// `enforce_fit` が `false` の場合は容量の事前確認とバッファ不足を無視します
    /// （直後にウィンドウを縮める自動クロップ向け）。
    pub(super) fn apply_pixformat(&mut self, pixformat: PixFormat, enforce_fit: bool) -> SensorResult<()> {
        if enforce_fit {
            self.ensure_fits(Some(pixformat), self.state.framesize, self.fb.u, self.fb.v)?;
        }

        self.abort_capture();
        self.hal.pool.update_jpeg_buffer();

        self.control("set_pixformat", |driver, sccb| driver.set_pixformat(sccb, pixformat))?;
        self.settle();

        self.state.pixformat = Some(pixformat);
        self.fb.pixfmt = None;
        match self.refresh_framebuffers() {
            Err(SensorError::FramebufferOverflow) if !enforce_fit => {}
            other => other?,
        }
        self.hal.port.config(ConfigKind::Pixformat)?;
        info!("✓ 画素フォーマット: {:?}", pixformat);
        Ok(())
    }

    /// フレームサイズを設定し、ウィンドウをフレーム全体に戻します
    ///
    /// # エラー
    /// - 容量不足: `FramebufferOverflow`
    /// - ドライバ: `ControlUnsupported` / `ControlFailed`
    pub fn set_framesize(&mut self, framesize: FrameSize) -> SensorResult<()> {
        if self.state.framesize == Some(framesize) {
            return Ok(());
        }

        let (width, height) = framesize.resolution();
        self.ensure_fits(self.state.pixformat, Some(framesize), width, height)?;

        self.abort_capture();
        self.hal.pool.update_jpeg_buffer();

        self.control("set_framesize", |driver, sccb| driver.set_framesize(sccb, framesize))?;
        self.settle();

        self.state.framesize = Some(framesize);
        self.fb.reset_to(framesize);
        self.refresh_framebuffers()?;
        self.hal.port.config(ConfigKind::Framesize)?;
        info!("✓ フレームサイズ: {:?} ({}x{})", framesize, width, height);
        Ok(())
    }

    /// フレームサイズ内のウィンドウを設定します
    ///
    /// # エラー
    /// - JPEG: `PixformatUnsupported`
    /// - フレームサイズ未設定: `InvalidFramesize`
    /// - 空またははみ出すウィンドウ: `InvalidWindow`
    /// - 容量不足: `FramebufferOverflow`
    pub fn set_windowing(&mut self, x: u32, y: u32, w: u32, h: u32) -> SensorResult<()> {
        if self.fb.x == x && self.fb.y == y && self.fb.u == w && self.fb.v == h {
            return Ok(());
        }
        if self.state.pixformat == Some(PixFormat::Jpeg) {
            return Err(SensorError::PixformatUnsupported);
        }
        let framesize = self.state.framesize.ok_or(SensorError::InvalidFramesize)?;
        let (width, height) = framesize.resolution();
        let inside = |origin: u32, len: u32, limit: u32| {
            origin.checked_add(len).is_some_and(|end| end <= limit)
        };
        if w == 0 || h == 0 || !inside(x, w, width) || !inside(y, h, height) {
            warn!("ウィンドウ ({}, {}, {}, {}) が {}x{} に収まりません", x, y, w, h, width, height);
            return Err(SensorError::InvalidWindow);
        }
        self.ensure_fits(self.state.pixformat, Some(framesize), w, h)?;

        self.abort_capture();
        self.hal.pool.update_jpeg_buffer();

        self.fb.set_window(x, y, w, h);
        self.refresh_framebuffers()?;
        self.hal.port.config(ConfigKind::Windowing)?;
        debug!("ウィンドウ: ({}, {}) {}x{}", x, y, w, h);
        Ok(())
    }

    /// 目標フレームレートを設定します
    ///
    /// ドライバが対応していない場合は、キャプチャ側でフレームを間引いて合わせます。
    ///
    /// # エラー
    /// - 負の値: `InvalidArgument`
    /// - ドライバ失敗: `ControlFailed`
    pub fn set_framerate(&mut self, framerate: i32) -> SensorResult<()> {
        let Ok(framerate) = u32::try_from(framerate) else {
            return Err(SensorError::InvalidArgument);
        };
        if self.state.framerate == framerate {
            return Ok(());
        }

        match self.call_driver(|driver, sccb| driver.set_framerate(sccb, framerate)) {
            Ok(()) => self.state.native_framerate = true,
            Err(DriverError::Unsupported) => {
                debug!("{} fps をソフトウェアで間引きます", framerate);
                self.state.native_framerate = false;
            }
            Err(e) => {
                warn!("set_framerate: {}", e);
                return Err(SensorError::ControlFailed);
            }
        }

        self.state.framerate = framerate;
        Ok(())
    }

    pub fn get_framerate(&self) -> u32 {
        self.state.framerate
    }

    pub fn get_pixformat(&self) -> Option<PixFormat> {
        self.state.pixformat
    }

    pub fn get_framesize(&self) -> Option<FrameSize> {
        self.state.framesize
    }

    pub fn set_hmirror(&mut self, enable: bool) -> SensorResult<()> {
        if self.state.hmirror == enable {
            return Ok(());
        }
        self.abort_capture();
        self.control("set_hmirror", |driver, sccb| driver.set_hmirror(sccb, enable))?;
        self.state.hmirror = enable;
        self.settle();
        Ok(())
    }

    pub fn get_hmirror(&self) -> bool {
        self.state.hmirror
    }

    pub fn set_vflip(&mut self, enable: bool) -> SensorResult<()> {
        if self.state.vflip == enable {
            return Ok(());
        }
        self.abort_capture();
        self.control("set_vflip", |driver, sccb| driver.set_vflip(sccb, enable))?;
        self.state.vflip = enable;
        self.settle();
        Ok(())
    }

    pub fn get_vflip(&self) -> bool {
        self.state.vflip
    }

    /// 転置の切り替え（YUV422・JPEG では不可）
    pub fn set_transpose(&mut self, enable: bool) -> SensorResult<()> {
        if self.state.transpose == enable {
            return Ok(());
        }
        self.reject_rotation_format()?;
        self.abort_capture();
        self.state.transpose = enable;
        Ok(())
    }

    pub fn get_transpose(&self) -> bool {
        self.state.transpose
    }

    /// IMU による自動回転の切り替え（YUV422・JPEG では不可）
    pub fn set_auto_rotation(&mut self, enable: bool) -> SensorResult<()> {
        if self.state.auto_rotation == enable {
            return Ok(());
        }
        self.reject_rotation_format()?;
        self.abort_capture();
        self.state.auto_rotation = enable;
        Ok(())
    }

    pub fn get_auto_rotation(&self) -> bool {
        self.state.auto_rotation
    }

    fn reject_rotation_format(&self) -> SensorResult<()> {
        match self.state.pixformat {
            Some(PixFormat::Yuv422) | Some(PixFormat::Jpeg) => Err(SensorError::PixformatUnsupported),
            _ => Ok(()),
        }
    }

    pub fn set_gainceiling(&mut self, ceiling: GainCeiling) -> SensorResult<()> {
        if self.state.gainceiling == ceiling {
            return Ok(());
        }
        self.control("set_gainceiling", |driver, sccb| driver.set_gainceiling(sccb, ceiling))?;
        self.state.gainceiling = ceiling;
        Ok(())
    }

    pub fn set_special_effect(&mut self, effect: SpecialEffect) -> SensorResult<()> {
        if self.state.special_effect == effect {
            return Ok(());
        }
        self.control("set_special_effect", |driver, sccb| driver.set_special_effect(sccb, effect))?;
        self.state.special_effect = effect;
        Ok(())
    }

    pub fn set_contrast(&mut self, level: i32) -> SensorResult<()> {
        self.control("set_contrast", |driver, sccb| driver.set_contrast(sccb, level))
    }

    pub fn set_brightness(&mut self, level: i32) -> SensorResult<()> {
        self.control("set_brightness", |driver, sccb| driver.set_brightness(sccb, level))
    }

    pub fn set_saturation(&mut self, level: i32) -> SensorResult<()> {
        self.control("set_saturation", |driver, sccb| driver.set_saturation(sccb, level))
    }

    /// JPEG 品質
    pub fn set_quality(&mut self, quality: i32) -> SensorResult<()> {
        self.control("set_quality", |driver, sccb| driver.set_quality(sccb, quality))
    }

    pub fn set_colorbar(&mut self, enable: bool) -> SensorResult<()> {
        self.control("set_colorbar", |driver, sccb| driver.set_colorbar(sccb, enable))
    }

    pub fn set_auto_gain(&mut self, enable: bool, gain_db: f32, gain_db_ceiling: f32) -> SensorResult<()> {
        self.control("set_auto_gain", |driver, sccb| {
            driver.set_auto_gain(sccb, enable, gain_db, gain_db_ceiling)
        })
    }

    pub fn get_gain_db(&mut self) -> SensorResult<f32> {
        self.control("get_gain_db", |driver, sccb| driver.get_gain_db(sccb))
    }

    pub fn set_auto_exposure(&mut self, enable: bool, exposure_us: i32) -> SensorResult<()> {
        self.control("set_auto_exposure", |driver, sccb| {
            driver.set_auto_exposure(sccb, enable, exposure_us)
        })
    }

    pub fn get_exposure_us(&mut self) -> SensorResult<i32> {
        self.control("get_exposure_us", |driver, sccb| driver.get_exposure_us(sccb))
    }

    pub fn set_auto_whitebal(
        &mut self,
        enable: bool,
        r_gain_db: f32,
        g_gain_db: f32,
        b_gain_db: f32,
    ) -> SensorResult<()> {
        self.control("set_auto_whitebal", |driver, sccb| {
            driver.set_auto_whitebal(sccb, enable, r_gain_db, g_gain_db, b_gain_db)
        })
    }

    /// (R, G, B) のゲイン（dB）
    pub fn get_rgb_gain_db(&mut self) -> SensorResult<(f32, f32, f32)> {
        self.control("get_rgb_gain_db", |driver, sccb| driver.get_rgb_gain_db(sccb))
    }

    pub fn set_auto_blc(&mut self, enable: bool, regs: Option<&[i32]>) -> SensorResult<()> {
        self.control("set_auto_blc", |driver, sccb| driver.set_auto_blc(sccb, enable, regs))
    }

    pub fn get_blc_regs(&mut self, regs: &mut [i32]) -> SensorResult<()> {
        self.control("get_blc_regs", |driver, sccb| driver.get_blc_regs(sccb, regs))
    }

    pub fn set_lens_correction(&mut self, enable: bool, radius: i32, coefficient: i32) -> SensorResult<()> {
        self.control("set_lens_correction", |driver, sccb| {
            driver.set_lens_correction(sccb, enable, radius, coefficient)
        })
    }

    /// ファミリー固有の拡張操作
    pub fn ioctl(&mut self, command: IoctlCommand) -> SensorResult<IoctlResponse> {
        self.abort_capture();
        self.control("ioctl", |driver, sccb| driver.ioctl(sccb, command))
    }
}
