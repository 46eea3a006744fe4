//! 疑似カラー表示用のパレット

/// パレットに必要な最小エントリ数
pub const MIN_PALETTE_LEN: usize = 16;

/// 既定の虹色パレット（RGB565、青から赤へ）
pub static RAINBOW_TABLE: [u16; 256] = build_rainbow();

const fn rgb565(r: u32, g: u32, b: u32) -> u16 {
    (((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)) as u16
}

/// 色相 240°(青) から 0°(赤) までを 256 段階で並べます
const fn build_rainbow() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        // 0..=1020 の色相（4区間 x 255）
        let hue = (255 - i as u32) * 4;
        let segment = hue / 255;
        let f = hue % 255;
        let (r, g, b) = match segment {
            0 => (255, f, 0),
            1 => (255 - f, 255, 0),
            2 => (0, 255, f),
            3 => (0, 255 - f, 255),
            _ => (0, 0, 255),
        };
        table[i] = rgb565(r, g, b);
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainbow_endpoints() {
        assert_eq!(RAINBOW_TABLE[0], rgb565(0, 0, 255));
        assert_eq!(RAINBOW_TABLE[255], rgb565(255, 0, 0));
        assert!(RAINBOW_TABLE.len() >= MIN_PALETTE_LEN);
    }
}
