use crate::core::pixformat::PixFormat;
use crate::core::resolution::FrameSize;

/// アクティブなフレームバッファのレイアウト
///
/// `(x, y)` はセンサー座標上のウィンドウ原点、`(u, v)` は要求されたウィンドウサイズ、
/// `(w, h)` は現在の出力サイズです。`pixfmt` が `None` の間は次のフレームを捨てます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameDescriptor {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub u: u32,
    pub v: u32,
    pub pixfmt: Option<PixFormat>,
    /// 1フレームに必要なバイト数
    pub frame_size: u32,
}

impl FrameDescriptor {
    /// フレームサイズ全体をウィンドウとするレイアウトにします
    pub fn reset_to(&mut self, framesize: FrameSize) {
        let (width, height) = framesize.resolution();
        self.set_window(0, 0, width, height);
    }

    /// ウィンドウを設定します（出力サイズも同じ値になります）
    pub fn set_window(&mut self, x: u32, y: u32, w: u32, h: u32) {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
        self.u = w;
        self.v = h;
        self.pixfmt = None;
    }

    /// ウィンドウの面積（ピクセル数）
    pub fn window_area(&self) -> u64 {
        u64::from(self.u) * u64::from(self.v)
    }

    /// ウィンドウを指定バイト/ピクセルで格納したときのバイト数
    pub fn window_bytes(&self, bpp: u32) -> u64 {
        self.window_area() * u64::from(bpp)
    }

    /// 指定フレームサイズに対してクロップされているか
    pub fn is_cropped(&self, framesize: Option<FrameSize>) -> bool {
        match framesize {
            Some(fs) => {
                let (width, height) = fs.resolution();
                self.x != 0 || self.y != 0 || self.u != width || self.v != height
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_to_framesize() {
        // Given
        let mut fb = FrameDescriptor {
            x: 10,
            y: 8,
            pixfmt: Some(PixFormat::Rgb565),
            ..FrameDescriptor::default()
        };

        // When
        fb.reset_to(FrameSize::Qvga);

        // Then
        assert_eq!((fb.x, fb.y, fb.w, fb.h, fb.u, fb.v), (0, 0, 320, 240, 320, 240));
        assert_eq!(fb.pixfmt, None);
        assert!(!fb.is_cropped(Some(FrameSize::Qvga)));
    }

    #[test]
    fn test_cropped_detection() {
        let mut fb = FrameDescriptor::default();
        fb.set_window(0, 0, 320, 240);
        assert!(fb.is_cropped(Some(FrameSize::Vga)));
        assert!(!fb.is_cropped(None));

        fb.set_window(2, 0, 640, 480);
        assert!(fb.is_cropped(Some(FrameSize::Vga)));
    }

    #[test]
    fn test_window_bytes_does_not_overflow() {
        let mut fb = FrameDescriptor::default();
        fb.set_window(0, 0, 2592, 1944);
        assert_eq!(fb.window_bytes(2), 2592 * 1944 * 2);
    }
}
