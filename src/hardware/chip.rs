//! 既知のセンサーチップ（ID・バスアドレス・ファミリー）

use crate::core::config::XclkTable;

/// チップ識別子
///
/// 1バイトで読むチップと 1ワードで読むチップがあり、バイト値はワードの下位バイトです。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChipId(u16);

impl ChipId {
    pub const OV2640: ChipId = ChipId(0x26);
    pub const OV5640: ChipId = ChipId(0x56);
    /// OV7670 と OV7690 は同じ ID を返す
    pub const OV76X0: ChipId = ChipId(0x76);
    pub const OV7725: ChipId = ChipId(0x77);
    pub const OV9650: ChipId = ChipId(0x96);
    pub const MT9V0X2_V1: ChipId = ChipId(0x1311);
    pub const MT9V0X2_V2: ChipId = ChipId(0x1312);
    pub const MT9V0X2: ChipId = ChipId(0x1313);
    pub const MT9V0X4: ChipId = ChipId(0x1324);
    pub const MT9M114: ChipId = ChipId(0x2481);
    pub const LEPTON: ChipId = ChipId(0x54);
    pub const HM01B0: ChipId = ChipId(0xB0);
    pub const HM0360: ChipId = ChipId(0x60);
    pub const GC2145: ChipId = ChipId(0x21);
    pub const PAJ6100: ChipId = ChipId(0x6100);
    pub const FROGEYE2020: ChipId = ChipId(0x2020);
    pub const PAG7920: ChipId = ChipId(0x7920);

    pub const fn from_byte(id: u8) -> Self {
        ChipId(id as u16)
    }

    pub const fn from_word(id: u16) -> Self {
        ChipId(id)
    }

    /// バイト表現（下位バイト）
    pub const fn byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// ワード表現
    pub const fn word(self) -> u16 {
        self.0
    }

    /// 旧リビジョンの ID を現行の ID へ読み替えます
    pub fn canonical(self) -> Self {
        match self {
            ChipId::MT9V0X2_V1 | ChipId::MT9V0X2_V2 => ChipId::MT9V0X2,
            other => other,
        }
    }
}

impl core::fmt::Display for ChipId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// 7bit スレーブアドレス
pub mod addr {
    /// OV2640 / OV9650
    pub const OV2640: u8 = 0x30;
    /// OV5640 / GC2145
    pub const OV5640: u8 = 0x3C;
    /// OV7725 / OV7670 / OV7690
    pub const OV7725: u8 = 0x21;
    pub const MT9V0XX: u8 = 0x5C;
    pub const MT9M114: u8 = 0x48;
    pub const LEPTON: u8 = 0x2A;
    /// HM01B0 / HM0360
    pub const HM0XX0: u8 = 0x24;
    pub const FROGEYE2020: u8 = 0x37;
    pub const PAG7920: u8 = 0x40;
}

/// チップ ID レジスタ
pub mod reg {
    /// OmniVision 共通（8bit アドレス）
    pub const OV_CHIP_ID: u8 = 0x0A;
    /// OV5640（16bit アドレス）
    pub const OV5640_CHIP_ID: u16 = 0x300A;
    /// ON Semiconductor / PixArt
    pub const ON_CHIP_ID: u8 = 0x00;
    pub const ON_CHIP_ID_WIDE: u16 = 0x0000;
    /// Himax（16bit アドレス）
    pub const HIMAX_CHIP_ID: u16 = 0x0001;
    /// GalaxyCore
    pub const GC_CHIP_ID: u8 = 0xF0;
}

/// センサーファミリー（ドライバの初期化単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    Ov2640,
    Ov5640,
    Ov7670,
    Ov7690,
    Ov7725,
    Ov9650,
    Mt9v0xx,
    Mt9m114,
    Lepton,
    Hm01b0,
    Hm0360,
    Gc2145,
    Pag7920,
    Paj6100,
    Frogeye2020,
}

impl SensorFamily {
    pub const ALL: [SensorFamily; 15] = [
        SensorFamily::Ov2640,
        SensorFamily::Ov5640,
        SensorFamily::Ov7670,
        SensorFamily::Ov7690,
        SensorFamily::Ov7725,
        SensorFamily::Ov9650,
        SensorFamily::Mt9v0xx,
        SensorFamily::Mt9m114,
        SensorFamily::Lepton,
        SensorFamily::Hm01b0,
        SensorFamily::Hm0360,
        SensorFamily::Gc2145,
        SensorFamily::Pag7920,
        SensorFamily::Paj6100,
        SensorFamily::Frogeye2020,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SensorFamily::Ov2640 => "OV2640",
            SensorFamily::Ov5640 => "OV5640",
            SensorFamily::Ov7670 => "OV7670",
            SensorFamily::Ov7690 => "OV7690",
            SensorFamily::Ov7725 => "OV7725",
            SensorFamily::Ov9650 => "OV9650",
            SensorFamily::Mt9v0xx => "MT9V0XX",
            SensorFamily::Mt9m114 => "MT9M114",
            SensorFamily::Lepton => "LEPTON",
            SensorFamily::Hm01b0 => "HM01B0",
            SensorFamily::Hm0360 => "HM0360",
            SensorFamily::Gc2145 => "GC2145",
            SensorFamily::Pag7920 => "PAG7920",
            SensorFamily::Paj6100 => "PAJ6100",
            SensorFamily::Frogeye2020 => "FROGEYE2020",
        }
    }

    /// チップ ID に該当するファミリー候補（優先順）
    ///
    /// 旧リビジョン ID は [`ChipId::canonical`] を通してから渡します。
    pub fn candidates(id: ChipId) -> &'static [SensorFamily] {
        match id {
            ChipId::OV2640 => &[SensorFamily::Ov2640],
            ChipId::OV5640 => &[SensorFamily::Ov5640],
            ChipId::OV76X0 => &[SensorFamily::Ov7690, SensorFamily::Ov7670],
            ChipId::OV7725 => &[SensorFamily::Ov7725],
            ChipId::OV9650 => &[SensorFamily::Ov9650],
            ChipId::MT9V0X2 | ChipId::MT9V0X4 => &[SensorFamily::Mt9v0xx],
            ChipId::MT9M114 => &[SensorFamily::Mt9m114],
            ChipId::LEPTON => &[SensorFamily::Lepton],
            ChipId::HM01B0 => &[SensorFamily::Hm01b0],
            ChipId::HM0360 => &[SensorFamily::Hm0360],
            ChipId::GC2145 => &[SensorFamily::Gc2145],
            ChipId::PAG7920 => &[SensorFamily::Pag7920],
            ChipId::PAJ6100 => &[SensorFamily::Paj6100],
            ChipId::FROGEYE2020 => &[SensorFamily::Frogeye2020],
            _ => &[],
        }
    }

    /// 初期化前に必要な外部クロック周波数（不要なファミリーは `None`）
    pub fn xclk_hz(self, table: &XclkTable, silicon_revision: Option<u32>) -> Option<u32> {
        match self {
            SensorFamily::Ov2640 => Some(table.ov2640),
            SensorFamily::Ov5640 => match silicon_revision {
                Some(rev) if rev < 0x2003 => Some(table.ov5640_rev_y),
                _ => Some(table.ov5640),
            },
            SensorFamily::Ov7670 => Some(table.ov7670),
            SensorFamily::Ov7690 => Some(table.ov7690),
            SensorFamily::Ov7725 | SensorFamily::Ov9650 => None,
            SensorFamily::Mt9v0xx => Some(table.mt9v0xx),
            SensorFamily::Mt9m114 => Some(table.mt9m114),
            SensorFamily::Lepton => Some(table.lepton),
            SensorFamily::Hm01b0 => Some(table.hm01b0),
            SensorFamily::Hm0360 => Some(table.hm0360),
            SensorFamily::Gc2145 => Some(table.gc2145),
            SensorFamily::Pag7920 => Some(table.pag7920),
            SensorFamily::Paj6100 => Some(table.paj6100),
            SensorFamily::Frogeye2020 => Some(table.frogeye2020),
        }
    }

    /// バス上で応答するアドレス（バス外のファミリーは `None`）
    pub fn slave_addr(self) -> Option<u8> {
        match self {
            SensorFamily::Ov2640 | SensorFamily::Ov9650 => Some(addr::OV2640),
            SensorFamily::Ov5640 | SensorFamily::Gc2145 => Some(addr::OV5640),
            SensorFamily::Ov7725 | SensorFamily::Ov7670 | SensorFamily::Ov7690 => {
                Some(addr::OV7725)
            }
            SensorFamily::Mt9v0xx => Some(addr::MT9V0XX),
            SensorFamily::Mt9m114 => Some(addr::MT9M114),
            SensorFamily::Lepton => Some(addr::LEPTON),
            SensorFamily::Hm01b0 | SensorFamily::Hm0360 => Some(addr::HM0XX0),
            SensorFamily::Frogeye2020 => Some(addr::FROGEYE2020),
            SensorFamily::Pag7920 => Some(addr::PAG7920),
            SensorFamily::Paj6100 => None,
        }
    }
}

impl core::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_and_word_views() {
        let id = ChipId::from_byte(0x26);
        assert_eq!(id.byte(), 0x26);
        assert_eq!(id.word(), 0x0026);
        assert_eq!(id, ChipId::OV2640);
        assert_eq!(ChipId::from_word(0x1324).byte(), 0x24);
    }

    #[test]
    fn test_legacy_mt9v0x2_is_remapped() {
        assert_eq!(ChipId::MT9V0X2_V1.canonical(), ChipId::MT9V0X2);
        assert_eq!(ChipId::MT9V0X2_V2.canonical(), ChipId::MT9V0X2);
        assert_eq!(ChipId::MT9V0X4.canonical(), ChipId::MT9V0X4);
    }

    #[test]
    fn test_shared_id_candidates() {
        assert_eq!(
            SensorFamily::candidates(ChipId::OV76X0),
            &[SensorFamily::Ov7690, SensorFamily::Ov7670]
        );
        assert!(SensorFamily::candidates(ChipId::from_word(0xBEEF)).is_empty());
    }

    #[test]
    fn test_ov5640_rev_y_clock() {
        let table = crate::core::config::SensorConfig::load().unwrap().xclk;
        assert_eq!(
            SensorFamily::Ov5640.xclk_hz(&table, Some(0x2001)),
            Some(table.ov5640_rev_y)
        );
        assert_eq!(SensorFamily::Ov5640.xclk_hz(&table, None), Some(table.ov5640));
        assert_eq!(SensorFamily::Ov7725.xclk_hz(&table, None), None);
    }
}
