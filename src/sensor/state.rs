use crate::core::pixformat::PixFormat;
use crate::core::resolution::FrameSize;
use crate::core::types::{GainCeiling, Polarity, SpecialEffect};
use crate::hardware::chip::{ChipId, SensorFamily};

/// 検出したセンサーと現在の設定
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensorState {
    /// 7bit アドレス（バス外のセンサーは 0）
    pub slave_addr: u8,
    pub chip_id: ChipId,
    pub family: Option<SensorFamily>,
    pub detected: bool,

    pub pixformat: Option<PixFormat>,
    pub framesize: Option<FrameSize>,
    pub framerate: u32,
    /// ドライバがフレームレートを制御している
    pub native_framerate: bool,

    pub gainceiling: GainCeiling,
    pub special_effect: SpecialEffect,
    pub hmirror: bool,
    pub vflip: bool,
    pub transpose: bool,
    pub auto_rotation: bool,

    /// 設定変更後の安定待ちを省略する
    pub disable_delays: bool,
    /// キャプチャ側で FIFO 全体のフラッシュを省略する
    pub disable_full_flush: bool,

    pub reset_pol: Polarity,
    pub power_pol: Polarity,
}

impl SensorState {
    /// リセットで既定値に戻る設定項目を戻します
    ///
    /// 検出結果（アドレス・ID・極性）と遅延設定は保持します。
    pub(crate) fn restore_defaults(&mut self) {
        self.pixformat = None;
        self.framesize = None;
        self.framerate = 0;
        self.native_framerate = false;
        self.gainceiling = GainCeiling::default();
        self.special_effect = SpecialEffect::default();
        self.hmirror = false;
        self.vflip = false;
        self.transpose = false;
        self.auto_rotation = false;
        self.disable_full_flush = false;
    }
}
