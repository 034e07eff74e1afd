use crate::{
    error::McMapError,
    heightmap::HeightMap,
    nbt::TagNode,
    section::Section,
    SECTION_HEIGHT,
};

/// 按高度图裁剪后的连续子区块窗口
///
/// 只有 `[min_section, max_section]` 内的子区块会被解码，窗口外的子区块
/// 在查询地表方块时永远用不到
#[derive(Debug, Clone)]
pub struct SectionWindow {
    /// 文件中第一个子区块的Y
    first_stored: i32,
    min_section: i32,
    sections: Vec<Section>,
}

impl SectionWindow {
    /// `sections` 为区块NBT中按Y升序连续存放的子区块列表
    pub fn select<T: TagNode>(sections: &[T], heightmap: &HeightMap) -> Result<Self, McMapError> {
        let first = sections
            .first()
            .ok_or_else(|| McMapError::LogicError("区块没有子区块".to_string()))?;
        let first_stored = first
            .field("Y")?
            .as_int()
            .ok_or_else(|| McMapError::FormatError("子区块Y不是整数".to_string()))? as i32;
        let last_stored = first_stored + sections.len() as i32 - 1;

        let min_section = heightmap.min().div_euclid(SECTION_HEIGHT);
        let max_section = heightmap.max().div_euclid(SECTION_HEIGHT);

        if min_section < first_stored || max_section > last_stored {
            return Err(McMapError::LogicError(format!(
                "窗口 [{}, {}] 超出已存储的子区块范围 [{}, {}]",
                min_section, max_section, first_stored, last_stored
            )));
        }

        let mut window = Vec::with_capacity((max_section - min_section + 1) as usize);
        for y in min_section..=max_section {
            let section = Section::from_tag(&sections[(y - first_stored) as usize])?;
            if section.y() != y {
                return Err(McMapError::FormatError(format!(
                    "子区块不连续: 位置 {} 期望Y={}，实际Y={}",
                    y - first_stored,
                    y,
                    section.y()
                )));
            }
            window.push(section);
        }

        Ok(Self {
            first_stored,
            min_section,
            sections: window,
        })
    }

    /// 按世界子区块索引取窗口内的子区块
    pub fn get(&self, section_y: i32) -> Result<&Section, McMapError> {
        usize::try_from(section_y - self.min_section)
            .ok()
            .and_then(|pos| self.sections.get(pos))
            .ok_or_else(|| McMapError::LogicError(format!(
                "子区块 {} 不在窗口 [{}, {}] 内",
                section_y,
                self.min_section,
                self.max_section()
            )))
    }

    pub fn first_stored(&self) -> i32 {
        self.first_stored
    }

    pub fn min_section(&self) -> i32 {
        self.min_section
    }

    pub fn max_section(&self) -> i32 {
        self.min_section + self.sections.len() as i32 - 1
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
