pub mod chunk;
pub mod colors;
pub mod compression;
pub mod error;
pub mod heightmap;
pub mod nbt;
pub mod packed;
pub mod region;
pub mod render;
pub mod section;
pub mod types;
pub mod window;

#[cfg(test)]
mod testutil;

pub use crate::chunk::Chunk;
pub use crate::colors::ColorTable;
pub use crate::error::McMapError;
pub use crate::heightmap::{HeightMap, HeightmapKind};
pub use crate::region::RegionFile;
pub use crate::section::Section;
pub use crate::types::{ChunkPos, RegionPos};
pub use crate::window::SectionWindow;

/// 区域文件的扇区大小
pub const SECTOR_SIZE: u64 = 4096;

/// 偏移表 + 时间戳表
pub const REGION_HEADER_SIZE: u64 = 2 * SECTOR_SIZE;

/// 区域每边的区块数
pub const REGION_WIDTH: usize = 32;

pub const REGION_CHUNK_COUNT: usize = REGION_WIDTH * REGION_WIDTH;

/// 区块每边的方块数
pub const CHUNK_WIDTH: usize = 16;

/// 子区块高度
pub const SECTION_HEIGHT: i32 = 16;

/// 区块记录的压缩类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    Gzip = 1,
    Zlib = 2,
    None = 3,
    LZ4 = 4,
}
