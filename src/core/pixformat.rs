//! ピクセルフォーマットとバイト/ピクセル規則

/// センサーが出力するピクセルフォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixFormat {
    Grayscale,
    Rgb565,
    Bayer,
    Yuv422,
    Jpeg,
}

impl PixFormat {
    /// 1ピクセル2バイトのカラーフォーマットか
    pub fn is_two_byte_color(self) -> bool {
        matches!(self, PixFormat::Rgb565 | PixFormat::Yuv422)
    }
}

/// ドライバが報告する出力特性
///
/// ドライバの状態（フォーマット切り替え等）で変わり得るため、必要な都度問い合わせます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTraits {
    /// フォーマットに関わらず 1 バイト/ピクセルの生データを出力する
    pub raw_output: bool,
    /// グレースケール出力時のバイト/ピクセル（1 または 2）
    pub mono_bpp: u8,
    /// RGB565 のバイト順が入れ替わっている
    pub rgb_swap: bool,
    /// YUV422 のバイト順が入れ替わっている
    pub yuv_swap: bool,
}

impl Default for OutputTraits {
    fn default() -> Self {
        Self {
            raw_output: false,
            mono_bpp: 1,
            rgb_swap: false,
            yuv_swap: false,
        }
    }
}

/// センサーが1ピクセルあたり出力するバイト数
pub fn src_bpp(pixformat: Option<PixFormat>, traits: &OutputTraits) -> u32 {
    if traits.raw_output {
        return 1;
    }
    match pixformat {
        Some(PixFormat::Bayer) | Some(PixFormat::Jpeg) => 1,
        Some(PixFormat::Rgb565) | Some(PixFormat::Yuv422) => 2,
        Some(PixFormat::Grayscale) => u32::from(traits.mono_bpp),
        None => 0,
    }
}

/// フレームバッファに格納される1ピクセルあたりのバイト数（可変長は 0）
pub fn dst_bpp(pixformat: Option<PixFormat>) -> u32 {
    match pixformat {
        Some(PixFormat::Grayscale) | Some(PixFormat::Bayer) => 1,
        Some(PixFormat::Rgb565) | Some(PixFormat::Yuv422) => 2,
        Some(PixFormat::Jpeg) | None => 0,
    }
}

/// メモリ見積もりに使うバイト数（src と dst の大きい方）
pub fn footprint_bpp(pixformat: Option<PixFormat>, traits: &OutputTraits) -> u32 {
    src_bpp(pixformat, traits).max(dst_bpp(pixformat))
}
