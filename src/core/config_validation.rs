use crate::hardware::bus::MAX_SCAN_DEVICES;

/// 設定値の上限（ミリ秒）
pub const MAX_DELAY_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidMaxScanDevices(u8),
    InvalidDelay { name: &'static str, value: u32 },
    InvalidXclkFrequency { family: &'static str, hz: u32 },
}

pub fn parse_max_scan_devices(value: u8) -> Result<usize, ValidationError> {
    if value == 0 || usize::from(value) > MAX_SCAN_DEVICES {
        return Err(ValidationError::InvalidMaxScanDevices(value));
    }
    Ok(usize::from(value))
}

pub fn validate_delay_ms(name: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value > MAX_DELAY_MS {
        Err(ValidationError::InvalidDelay { name, value })
    } else {
        Ok(value)
    }
}

/// 外部クロック周波数（0 は不可、上限 100MHz）
pub fn validate_xclk_hz(family: &'static str, hz: u32) -> Result<u32, ValidationError> {
    if hz == 0 || hz > 100_000_000 {
        Err(ValidationError::InvalidXclkFrequency { family, hz })
    } else {
        Ok(hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_scan_devices() {
        assert_eq!(parse_max_scan_devices(5), Ok(5));
        assert_eq!(
            parse_max_scan_devices(0),
            Err(ValidationError::InvalidMaxScanDevices(0))
        );
        assert!(parse_max_scan_devices(200).is_err());
    }

    #[test]
    fn test_validate_delay() {
        assert_eq!(validate_delay_ms("reset_delay_ms", 10), Ok(10));
        assert!(validate_delay_ms("reset_delay_ms", 5000).is_err());
    }

    #[test]
    fn test_validate_xclk() {
        assert_eq!(validate_xclk_hz("ov2640", 12_000_000), Ok(12_000_000));
        assert!(validate_xclk_hz("ov2640", 0).is_err());
    }
}
