//! 標準フレームサイズと解像度テーブル

/// 解像度テーブル（幅, 高さ）
///
/// インデックス 0 は「未設定」を表す番兵で、以降は [`FrameSize`] の判別値で引きます。
pub const RESOLUTION: [(u32, u32); 39] = [
    (0, 0),
    // C/SIF
    (88, 72),   // QQCIF
    (176, 144), // QCIF
    (352, 288), // CIF
    (88, 60),   // QQSIF
    (176, 120), // QSIF
    (352, 240), // SIF
    // VGA
    (40, 30),   // QQQQVGA
    (80, 60),   // QQQVGA
    (160, 120), // QQVGA
    (320, 240), // QVGA
    (640, 480), // VGA
    (30, 20),   // HQQQQVGA
    (60, 40),   // HQQQVGA
    (120, 80),  // HQQVGA
    (240, 160), // HQVGA
    (480, 320), // HVGA
    // FFT
    (64, 32),
    (64, 64),
    (128, 64),
    (128, 128),
    // Himax
    (160, 160),
    (320, 320),
    // その他
    (128, 160),   // LCD
    (128, 160),   // QQVGA2
    (720, 480),   // WVGA
    (752, 480),   // WVGA2
    (800, 600),   // SVGA
    (1024, 768),  // XGA
    (1280, 768),  // WXGA
    (1280, 1024), // SXGA
    (1280, 960),  // SXGAM
    (1600, 1200), // UXGA
    (1280, 720),  // HD
    (1920, 1080), // FHD
    (2560, 1440), // QHD
    (2048, 1536), // QXGA
    (2560, 1600), // WQXGA
    (2592, 1944), // WQXGA2
];

/// 標準フレームサイズ
///
/// 判別値は [`RESOLUTION`] のインデックスと一致します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameSize {
    Qqcif = 1,
    Qcif,
    Cif,
    Qqsif,
    Qsif,
    Sif,
    Qqqqvga,
    Qqqvga,
    Qqvga,
    Qvga,
    Vga,
    Hqqqqvga,
    Hqqqvga,
    Hqqvga,
    Hqvga,
    Hvga,
    W64xH32,
    W64xH64,
    W128xH64,
    W128xH128,
    W160xH160,
    W320xH320,
    Lcd,
    Qqvga2,
    Wvga,
    Wvga2,
    Svga,
    Xga,
    Wxga,
    Sxga,
    Sxgam,
    Uxga,
    Hd,
    Fhd,
    Qhd,
    Qxga,
    Wqxga,
    Wqxga2,
}

impl FrameSize {
    /// テーブル順の全フレームサイズ
    pub const ALL: [FrameSize; 38] = [
        FrameSize::Qqcif,
        FrameSize::Qcif,
        FrameSize::Cif,
        FrameSize::Qqsif,
        FrameSize::Qsif,
        FrameSize::Sif,
        FrameSize::Qqqqvga,
        FrameSize::Qqqvga,
        FrameSize::Qqvga,
        FrameSize::Qvga,
        FrameSize::Vga,
        FrameSize::Hqqqqvga,
        FrameSize::Hqqqvga,
        FrameSize::Hqqvga,
        FrameSize::Hqvga,
        FrameSize::Hvga,
        FrameSize::W64xH32,
        FrameSize::W64xH64,
        FrameSize::W128xH64,
        FrameSize::W128xH128,
        FrameSize::W160xH160,
        FrameSize::W320xH320,
        FrameSize::Lcd,
        FrameSize::Qqvga2,
        FrameSize::Wvga,
        FrameSize::Wvga2,
        FrameSize::Svga,
        FrameSize::Xga,
        FrameSize::Wxga,
        FrameSize::Sxga,
        FrameSize::Sxgam,
        FrameSize::Uxga,
        FrameSize::Hd,
        FrameSize::Fhd,
        FrameSize::Qhd,
        FrameSize::Qxga,
        FrameSize::Wqxga,
        FrameSize::Wqxga2,
    ];

    /// テーブルインデックス
    pub fn index(self) -> usize {
        self as usize
    }

    /// (幅, 高さ)
    pub fn resolution(self) -> (u32, u32) {
        RESOLUTION[self.index()]
    }

    pub fn width(self) -> u32 {
        self.resolution().0
    }

    pub fn height(self) -> u32 {
        self.resolution().1
    }

    /// テーブルインデックスから変換します（0 と範囲外は `None`）
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// 未設定を含むフレームサイズの解像度（未設定は (0, 0)）
pub fn resolution_of(framesize: Option<FrameSize>) -> (u32, u32) {
    framesize.map_or(RESOLUTION[0], FrameSize::resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indices_match_discriminants() {
        for (i, fs) in FrameSize::ALL.iter().enumerate() {
            assert_eq!(fs.index(), i + 1);
            assert_eq!(FrameSize::from_index(i + 1), Some(*fs));
        }
        assert_eq!(FrameSize::from_index(0), None);
        assert_eq!(FrameSize::from_index(RESOLUTION.len()), None);
    }

    #[test]
    fn test_known_resolutions() {
        assert_eq!(FrameSize::Qqcif.resolution(), (88, 72));
        assert_eq!(FrameSize::Vga.resolution(), (640, 480));
        assert_eq!(FrameSize::Wvga2.resolution(), (752, 480));
        assert_eq!(FrameSize::W320xH320.resolution(), (320, 320));
        assert_eq!(FrameSize::Wqxga2.resolution(), (2592, 1944));
        assert_eq!(resolution_of(None), (0, 0));
    }
}
