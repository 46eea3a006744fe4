//! 1ライン分の画素をフレームバッファへ写す変換
//!
//! 転置時は出力の1行が1列になるため、書き込み位置をウィンドウ高さ `v` ずつ進めます。
//! 呼び出し側は転置時、`dst` を現在の行に対応する列の先頭から渡します。

use crate::core::pixformat::PixFormat;
use crate::error::{SensorError, SensorResult};

/// ライン変換の条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    pub pixformat: PixFormat,
    /// ウィンドウ幅（1ラインの画素数）
    pub width: u32,
    /// ウィンドウ高さ（転置時の書き込み間隔）
    pub height: u32,
    pub transpose: bool,
    /// グレースケール入力のバイト/ピクセル
    pub mono_bpp: u8,
    /// 16bit 単位でバイトを入れ替える
    pub byte_swap: bool,
}

/// 外部のアクセラレータへ渡す要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCopyRequest {
    pub pixformat: PixFormat,
    /// 入力側のバイト/ピクセル
    pub src_bpp: usize,
    /// 出力側の要素サイズ（バイト）
    pub dst_bpp: usize,
    pub width: usize,
    pub stride: usize,
    pub transpose: bool,
}

impl LineLayout {
    /// 入力ラインのバイト/ピクセル（JPEG は対象外で 0）
    pub fn src_bpp(&self) -> usize {
        match self.pixformat {
            PixFormat::Bayer => 1,
            PixFormat::Grayscale => usize::from(self.mono_bpp.max(1)),
            PixFormat::Rgb565 | PixFormat::Yuv422 => 2,
            PixFormat::Jpeg => 0,
        }
    }

    /// 出力のバイト/ピクセル
    pub fn dst_bpp(&self) -> usize {
        match self.pixformat {
            PixFormat::Bayer | PixFormat::Grayscale => 1,
            PixFormat::Rgb565 | PixFormat::Yuv422 => 2,
            PixFormat::Jpeg => 0,
        }
    }

    /// アクセラレータ向けの要求
    pub fn request(&self) -> LineCopyRequest {
        LineCopyRequest {
            pixformat: self.pixformat,
            src_bpp: self.src_bpp(),
            dst_bpp: self.dst_bpp(),
            width: self.width as usize,
            stride: self.height as usize,
            transpose: self.transpose,
        }
    }

    /// 必要な入力バイト数
    pub fn src_len(&self) -> usize {
        self.width as usize * self.src_bpp()
    }

    /// 必要な出力バイト数
    pub fn dst_len(&self) -> usize {
        let width = self.width as usize;
        let bpp = self.dst_bpp();
        if width == 0 {
            0
        } else if self.transpose {
            ((width - 1) * self.height as usize + 1) * bpp
        } else {
            width * bpp
        }
    }
}

/// 1ライン分を変換して書き込みます
///
/// JPEG は何もしません。バッファが足りない場合は `FramebufferError`。
pub fn copy_line(layout: &LineLayout, src: &[u8], dst: &mut [u8]) -> SensorResult<()> {
    if layout.pixformat == PixFormat::Jpeg {
        return Ok(());
    }
    if src.len() < layout.src_len() || dst.len() < layout.dst_len() {
        return Err(SensorError::FramebufferError);
    }

    let width = layout.width as usize;
    let stride = if layout.transpose {
        layout.height as usize
    } else {
        1
    };

    match layout.pixformat {
        PixFormat::Bayer => copy_bytes(&src[..width], dst, stride),
        PixFormat::Grayscale if layout.mono_bpp <= 1 => copy_bytes(&src[..width], dst, stride),
        PixFormat::Grayscale => {
            // YUYV の Y だけを取り出す
            for (i, pixel) in src.chunks_exact(2).take(width).enumerate() {
                dst[i * stride] = pixel[0];
            }
        }
        PixFormat::Rgb565 | PixFormat::Yuv422 => {
            for (i, pixel) in src.chunks_exact(2).take(width).enumerate() {
                let at = i * stride * 2;
                if layout.byte_swap {
                    dst[at] = pixel[1];
                    dst[at + 1] = pixel[0];
                } else {
                    dst[at..at + 2].copy_from_slice(pixel);
                }
            }
        }
        PixFormat::Jpeg => {}
    }

    Ok(())
}

fn copy_bytes(src: &[u8], dst: &mut [u8], stride: usize) {
    if stride == 1 {
        dst[..src.len()].copy_from_slice(src);
    } else {
        for (i, byte) in src.iter().enumerate() {
            dst[i * stride] = *byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(pixformat: PixFormat, width: u32, height: u32) -> LineLayout {
        LineLayout {
            pixformat,
            width,
            height,
            transpose: false,
            mono_bpp: 1,
            byte_swap: false,
        }
    }

    #[test]
    fn test_bayer_verbatim() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 4];
        copy_line(&layout(PixFormat::Bayer, 4, 2), &src, &mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_bayer_transposed_uses_height_stride() {
        // Given: 幅3, 高さ2 のウィンドウ
        let mut l = layout(PixFormat::Bayer, 3, 2);
        l.transpose = true;
        let src = [7u8, 8, 9];
        let mut dst = [0u8; 6];

        // When
        copy_line(&l, &src, &mut dst).unwrap();

        // Then
        assert_eq!(dst, [7, 0, 8, 0, 9, 0]);
    }

    #[test]
    fn test_grayscale_from_yuv_takes_every_other_byte() {
        let mut l = layout(PixFormat::Grayscale, 3, 1);
        l.mono_bpp = 2;
        let src = [10u8, 0x80, 20, 0x80, 30, 0x80];
        let mut dst = [0u8; 3];
        copy_line(&l, &src, &mut dst).unwrap();
        assert_eq!(dst, [10, 20, 30]);
    }

    #[test]
    fn test_rgb565_byte_swap() {
        let mut l = layout(PixFormat::Rgb565, 2, 1);
        l.byte_swap = true;
        let src = [0x12u8, 0x34, 0x56, 0x78];
        let mut dst = [0u8; 4];
        copy_line(&l, &src, &mut dst).unwrap();
        assert_eq!(dst, [0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn test_yuv_transposed_16bit_units() {
        let mut l = layout(PixFormat::Yuv422, 2, 3);
        l.transpose = true;
        let src = [1u8, 2, 3, 4];
        let mut dst = [0u8; 8];
        copy_line(&l, &src, &mut dst).unwrap();
        assert_eq!(dst, [1, 2, 0, 0, 0, 0, 3, 4]);
    }

    #[test]
    fn test_short_destination_is_rejected() {
        let src = [0u8; 8];
        let mut dst = [0u8; 7];
        let result = copy_line(&layout(PixFormat::Rgb565, 4, 1), &src, &mut dst);
        assert_eq!(result, Err(SensorError::FramebufferError));
    }

    #[test]
    fn test_jpeg_is_untouched() {
        let mut dst = [0xAAu8; 4];
        copy_line(&layout(PixFormat::Jpeg, 4, 1), &[1, 2, 3, 4], &mut dst).unwrap();
        assert_eq!(dst, [0xAA; 4]);
    }
}
