use crate::{
    error::McMapError,
    heightmap::{HeightMap, HeightmapKind},
    nbt::TagNode,
    window::SectionWindow,
    SECTION_HEIGHT,
};

/// 完全生成的区块状态
pub const FULL_STATUS: &str = "minecraft:full";

/// 验证区块的生成状态
pub fn validate_status<T: TagNode>(root: &T) -> Result<(), McMapError> {
    let status = root
        .field("Status")?
        .as_str()
        .ok_or_else(|| McMapError::FormatError("Status不是字符串".to_string()))?;

    if status != FULL_STATUS {
        return Err(McMapError::NotFullyGenerated(status.to_string()));
    }
    Ok(())
}

/// 解码后的区块：高度图加上裁剪后的子区块窗口
#[derive(Debug, Clone)]
pub struct Chunk {
    heightmap: HeightMap,
    window: SectionWindow,
}

impl Chunk {
    /// 使用 `WORLD_SURFACE` 高度图构造
    pub fn from_tag<T: TagNode>(root: &T) -> Result<Self, McMapError> {
        Self::with_heightmap(root, HeightmapKind::default())
    }

    pub fn with_heightmap<T: TagNode>(root: &T, kind: HeightmapKind) -> Result<Self, McMapError> {
        let longs = root
            .field("Heightmaps")?
            .field(kind.key())?
            .as_long_array()
            .ok_or_else(|| McMapError::FormatError(format!("{} 不是LongArray", kind.key())))?;
        let heightmap = HeightMap::decode(longs)?;

        let sections = root
            .field("sections")?
            .as_list()
            .ok_or_else(|| McMapError::FormatError("sections不是列表".to_string()))?;
        let window = SectionWindow::select(sections, &heightmap)?;

        Ok(Self { heightmap, window })
    }

    /// 列 (x, z) 地表处的方块ID
    pub fn top_block_at(&self, x: usize, z: usize) -> Result<&str, McMapError> {
        let y = self.heightmap.get(x, z)?;
        let section = self.window.get(y.div_euclid(SECTION_HEIGHT))?;
        section.block_at(x, y, z)
    }

    pub fn heightmap(&self) -> &HeightMap {
        &self.heightmap
    }

    pub fn window(&self) -> &SectionWindow {
        &self.window
    }
}
