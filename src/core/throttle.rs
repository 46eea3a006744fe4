//! ソフトウェアによるフレームレート制御
//!
//! センサー側にフレームレート設定が無い場合、各フレームの最初のラインで
//! [`FrameThrottle::on_first_line`] を呼び、目標周期より早く届いたフレームを捨てます。

/// 目標フレームレートから周期（ミリ秒）を求めます（0 fps は 0）
pub fn frame_period_ms(framerate: u32) -> u32 {
    1000u32.checked_div(framerate).unwrap_or(0)
}

/// フレーム間引きの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameThrottle {
    first_line: bool,
    drop_frame: bool,
    last_frame_ms: u32,
    last_frame_ms_valid: bool,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// フレームの最初のラインで呼び出します
    ///
    /// 同じフレーム内の2回目以降の呼び出しは何もしません。
    /// 周期より早い場合はフレームを捨て、そうでなければ予定時刻を周期分だけ進めます。
    pub fn on_first_line(&mut self, tick_ms: u32, framerate: u32) {
        if self.first_line {
            return;
        }
        self.first_line = true;

        let period = frame_period_ms(framerate);
        if self.last_frame_ms_valid && tick_ms.wrapping_sub(self.last_frame_ms) < period {
            self.drop_frame = true;
        } else if self.last_frame_ms_valid {
            self.last_frame_ms = self.last_frame_ms.wrapping_add(period);
        } else {
            self.last_frame_ms = tick_ms;
            self.last_frame_ms_valid = true;
        }
    }

    /// 次のフレームに備えてライン単位の状態を戻します
    pub fn begin_frame(&mut self) {
        self.first_line = false;
        self.drop_frame = false;
    }

    /// 現在のフレームを捨てるべきか
    pub fn should_drop(&self) -> bool {
        self.drop_frame
    }

    /// 予定時刻（有効な場合のみ）
    pub fn last_frame_ms(&self) -> Option<u32> {
        self.last_frame_ms_valid.then_some(self.last_frame_ms)
    }

    /// すべての記録を消去します
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
