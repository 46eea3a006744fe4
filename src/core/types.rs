//! センサー制御で共有する小さな値型

/// 制御ピンの極性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// アサート時に出力するレベル
    pub fn asserted_level(self) -> bool {
        matches!(self, Polarity::ActiveHigh)
    }

    /// デアサート時に出力するレベル
    pub fn deasserted_level(self) -> bool {
        !self.asserted_level()
    }

    /// 指定した論理状態に対応するピンレベル
    pub fn level(self, asserted: bool) -> bool {
        if asserted {
            self.asserted_level()
        } else {
            self.deasserted_level()
        }
    }
}

/// ゲイン上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GainCeiling {
    #[default]
    X2,
    X4,
    X8,
    X16,
    X32,
    X64,
    X128,
}

/// 特殊効果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialEffect {
    #[default]
    Normal,
    Negative,
}

/// ハードウェア再構成フックに渡す変更種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Pixformat,
    Framesize,
    Windowing,
}

/// フレームバッファ数の指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferCount {
    /// 収まる範囲で最大の数をプールに選ばせる
    Auto,
    /// 固定数
    Exact(u32),
}
