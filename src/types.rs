use serde::Serialize;

use crate::{REGION_WIDTH, SECTOR_SIZE};

/// 区域坐标，对应文件名 `r.<x>.<z>.mca`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    /// 单个区域渲染结果的图片名
    pub fn image_name(&self) -> String {
        format!("region.{}.{}.png", self.x, self.z)
    }
}

/// 区域内的区块坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// 偏移表中的下标，z优先
    pub fn table_index(&self) -> usize {
        let width = REGION_WIDTH as i32;
        (self.x.rem_euclid(width) + self.z.rem_euclid(width) * width) as usize
    }

    /// 按偏移表顺序遍历区域内所有区块坐标
    pub fn all_in_region() -> impl Iterator<Item = ChunkPos> {
        let width = REGION_WIDTH as i32;
        (0..width).flat_map(move |z| (0..width).map(move |x| ChunkPos::new(x, z)))
    }
}

/// 偏移表条目，单位已经换算为字节
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkLocation {
    pub offset: u64,
    pub length: u64,
}

impl ChunkLocation {
    /// 由4字节表项构造：高24位为扇区偏移，低8位为扇区数
    pub fn from_entry(entry: u32) -> Self {
        Self {
            offset: (entry >> 8) as u64 * SECTOR_SIZE,
            length: (entry & 0xFF) as u64 * SECTOR_SIZE,
        }
    }

    /// (0,0) 表示区块尚未生成
    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}
