use crate::{
    error::McMapError,
    packed::{words_from_longs, PackedArray},
    CHUNK_WIDTH,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 高度图每个值的位宽
pub const HEIGHTMAP_BITS: u32 = 9;

/// 存储值 = 实际高度 + 65
pub const HEIGHT_BIAS: i32 = 65;

const COLUMN_COUNT: usize = CHUNK_WIDTH * CHUNK_WIDTH;

/// 区块 `Heightmaps` 下可选的高度图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightmapKind {
    #[default]
    WorldSurface,
    MotionBlocking,
    OceanFloor,
}

impl HeightmapKind {
    /// NBT中的字段名
    pub fn key(&self) -> &'static str {
        match self {
            HeightmapKind::WorldSurface => "WORLD_SURFACE",
            HeightmapKind::MotionBlocking => "MOTION_BLOCKING",
            HeightmapKind::OceanFloor => "OCEAN_FLOOR",
        }
    }
}

impl FromStr for HeightmapKind {
    type Err = McMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "world-surface" => Ok(HeightmapKind::WorldSurface),
            "motion-blocking" => Ok(HeightmapKind::MotionBlocking),
            "ocean-floor" => Ok(HeightmapKind::OceanFloor),
            _ => Err(McMapError::FormatError(format!("未知的高度图类型: {}", s))),
        }
    }
}

/// 一个区块16x16列的地表高度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightMap {
    /// 下标为 z*16 + x
    heights: [i32; COLUMN_COUNT],
}

impl HeightMap {
    /// 从NBT的LongArray解码
    pub fn decode(longs: &[i64]) -> Result<Self, McMapError> {
        let needed = PackedArray::words_needed(COLUMN_COUNT, HEIGHTMAP_BITS);
        if longs.len() < needed {
            return Err(McMapError::FormatError(format!(
                "高度图数据过短: {} 个字，至少需要 {}",
                longs.len(),
                needed
            )));
        }

        let words = words_from_longs(longs);
        let packed = PackedArray::new(&words, HEIGHTMAP_BITS)?;

        let mut heights = [0i32; COLUMN_COUNT];
        for (i, height) in heights.iter_mut().enumerate() {
            *height = packed.get(i)? as i32 - HEIGHT_BIAS;
        }

        Ok(Self { heights })
    }

    /// 直接由高度构造，下标为 z*16 + x
    pub fn from_heights(heights: [i32; COLUMN_COUNT]) -> Self {
        Self { heights }
    }

    pub fn get(&self, x: usize, z: usize) -> Result<i32, McMapError> {
        if x >= CHUNK_WIDTH || z >= CHUNK_WIDTH {
            return Err(McMapError::CoordinateOutOfRange);
        }
        Ok(self.heights[z * CHUNK_WIDTH + x])
    }

    pub fn min(&self) -> i32 {
        self.heights.iter().copied().min().unwrap_or_default()
    }

    pub fn max(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or_default()
    }
}
