//! センサー制御のエラー分類
//!
//! すべての操作は [`SensorError`] のいずれかを返します。各エラーは固定の負の
//! ステータスコードを持ち、[`strerror`] で対応するメッセージを引けます。

use thiserror::Error;

/// エラーコードの絶対値で引くメッセージテーブル（0 は成功）
const ERROR_MESSAGES: [&str; 21] = [
    "No error.",
    "Sensor control failed.",
    "The requested operation is not supported by the image sensor.",
    "Failed to detect the image sensor or image sensor is detached.",
    "The detected image sensor is not supported.",
    "Failed to initialize the image sensor.",
    "Failed to initialize the external clock.",
    "Failed to initialize the CSI DMA.",
    "Failed to initialize the CSI interface.",
    "An low level I/O error has occurred.",
    "Frame capture has failed.",
    "Frame capture has timed out.",
    "Frame size is not supported or is not set.",
    "Pixel format is not supported or is not set.",
    "Window is not supported or is not set.",
    "Frame rate is not supported or is not set.",
    "An invalid argument is used.",
    "The requested operation is not supported on the current pixel format.",
    "Frame buffer error.",
    "Frame buffer overflow, try reducing the frame size.",
    "JPEG frame buffer overflow.",
];

const UNKNOWN_ERROR: &str = "Unknown error.";

/// センサー制御エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("Sensor control failed.")]
    ControlFailed,
    #[error("The requested operation is not supported by the image sensor.")]
    ControlUnsupported,
    #[error("Failed to detect the image sensor or image sensor is detached.")]
    IscUndetected,
    #[error("The detected image sensor is not supported.")]
    IscUnsupported,
    #[error("Failed to initialize the image sensor.")]
    IscInitFailed,
    #[error("Failed to initialize the external clock.")]
    TimInitFailed,
    #[error("Failed to initialize the CSI DMA.")]
    DmaInitFailed,
    #[error("Failed to initialize the CSI interface.")]
    CsiInitFailed,
    #[error("An low level I/O error has occurred.")]
    IoError,
    #[error("Frame capture has failed.")]
    CaptureFailed,
    #[error("Frame capture has timed out.")]
    CaptureTimeout,
    #[error("Frame size is not supported or is not set.")]
    InvalidFramesize,
    #[error("Pixel format is not supported or is not set.")]
    InvalidPixformat,
    #[error("Window is not supported or is not set.")]
    InvalidWindow,
    #[error("Frame rate is not supported or is not set.")]
    InvalidFramerate,
    #[error("An invalid argument is used.")]
    InvalidArgument,
    #[error("The requested operation is not supported on the current pixel format.")]
    PixformatUnsupported,
    #[error("Frame buffer error.")]
    FramebufferError,
    #[error("Frame buffer overflow, try reducing the frame size.")]
    FramebufferOverflow,
    #[error("JPEG frame buffer overflow.")]
    JpegOverflow,
}

/// センサー制御の結果型
pub type SensorResult<T> = Result<T, SensorError>;

impl SensorError {
    /// コード順に並べた全エラー
    pub const ALL: [SensorError; 20] = [
        SensorError::ControlFailed,
        SensorError::ControlUnsupported,
        SensorError::IscUndetected,
        SensorError::IscUnsupported,
        SensorError::IscInitFailed,
        SensorError::TimInitFailed,
        SensorError::DmaInitFailed,
        SensorError::CsiInitFailed,
        SensorError::IoError,
        SensorError::CaptureFailed,
        SensorError::CaptureTimeout,
        SensorError::InvalidFramesize,
        SensorError::InvalidPixformat,
        SensorError::InvalidWindow,
        SensorError::InvalidFramerate,
        SensorError::InvalidArgument,
        SensorError::PixformatUnsupported,
        SensorError::FramebufferError,
        SensorError::FramebufferOverflow,
        SensorError::JpegOverflow,
    ];

    /// 負のステータスコードを返します
    pub fn code(self) -> i32 {
        match self {
            SensorError::ControlFailed => -1,
            SensorError::ControlUnsupported => -2,
            SensorError::IscUndetected => -3,
            SensorError::IscUnsupported => -4,
            SensorError::IscInitFailed => -5,
            SensorError::TimInitFailed => -6,
            SensorError::DmaInitFailed => -7,
            SensorError::CsiInitFailed => -8,
            SensorError::IoError => -9,
            SensorError::CaptureFailed => -10,
            SensorError::CaptureTimeout => -11,
            SensorError::InvalidFramesize => -12,
            SensorError::InvalidPixformat => -13,
            SensorError::InvalidWindow => -14,
            SensorError::InvalidFramerate => -15,
            SensorError::InvalidArgument => -16,
            SensorError::PixformatUnsupported => -17,
            SensorError::FramebufferError => -18,
            SensorError::FramebufferOverflow => -19,
            SensorError::JpegOverflow => -20,
        }
    }

    /// ステータスコードからエラーを復元します（0 や範囲外は `None`）
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }
}

/// ステータスコードに対応するメッセージを返します
///
/// 符号は無視され、絶対値でテーブルを引きます。範囲外は `"Unknown error."`。
pub fn strerror(code: i32) -> &'static str {
    let index = code.unsigned_abs() as usize;
    ERROR_MESSAGES.get(index).copied().unwrap_or(UNKNOWN_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_message_table() {
        for error in SensorError::ALL {
            assert_eq!(error.to_string(), strerror(error.code()));
        }
    }

    #[test]
    fn test_from_code_round_trip() {
        for error in SensorError::ALL {
            assert_eq!(SensorError::from_code(error.code()), Some(error));
        }
        assert_eq!(SensorError::from_code(0), None);
        assert_eq!(SensorError::from_code(-21), None);
    }

    #[test]
    fn test_strerror_bounds() {
        assert_eq!(strerror(0), "No error.");
        assert_eq!(strerror(-20), "JPEG frame buffer overflow.");
        // 最終エントリの直後は範囲外
        assert_eq!(strerror(-21), "Unknown error.");
        assert_eq!(strerror(i32::MIN), "Unknown error.");
    }
}
