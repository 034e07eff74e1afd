use crate::{
    error::McMapError,
    nbt::TagNode,
    packed::{words_from_longs, PackedArray},
    CHUNK_WIDTH, SECTION_HEIGHT,
};

/// 调色板索引的最小位宽，小调色板也按4位存放
pub const MIN_PALETTE_BITS: u32 = 4;

/// 调色板大小对应的索引位宽: max(ceil(log2(n)), 4)
pub fn palette_bits(palette_len: usize) -> u32 {
    let needed = usize::BITS - palette_len.saturating_sub(1).leading_zeros();
    needed.max(MIN_PALETTE_BITS)
}

#[derive(Debug, Clone)]
enum BlockStates {
    /// 整个子区块都是 palette[0]
    Uniform,
    Packed { bits: u32, words: Vec<u64> },
}

/// 16x16x16 的子区块
#[derive(Debug, Clone)]
pub struct Section {
    y: i32,
    palette: Vec<String>,
    states: BlockStates,
}

impl Section {
    /// 从 `sections` 列表中的一个元素解码
    pub fn from_tag<T: TagNode>(node: &T) -> Result<Self, McMapError> {
        let y = node
            .field("Y")?
            .as_int()
            .ok_or_else(|| McMapError::FormatError("子区块Y不是整数".to_string()))?;

        let block_states = node.field("block_states")?;
        let palette = block_states
            .field("palette")?
            .as_list()
            .ok_or_else(|| McMapError::FormatError("palette不是列表".to_string()))?
            .iter()
            .map(|entry| {
                entry
                    .field("Name")?
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| McMapError::FormatError("方块Name不是字符串".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = block_states.get("data").and_then(T::as_long_array);

        Self::new(y as i32, palette, data)
    }

    pub fn new(y: i32, palette: Vec<String>, data: Option<&[i64]>) -> Result<Self, McMapError> {
        if palette.is_empty() {
            return Err(McMapError::FormatError(format!("子区块 {} 的调色板为空", y)));
        }

        let states = match data {
            _ if palette.len() == 1 => BlockStates::Uniform,
            Some(longs) if !longs.is_empty() => BlockStates::Packed {
                bits: palette_bits(palette.len()),
                words: words_from_longs(longs),
            },
            _ => {
                log::debug!("子区块 {} 有 {} 个调色板条目但没有data，按palette[0]处理", y, palette.len());
                BlockStates::Uniform
            }
        };

        Ok(Self { y, palette, states })
    }

    /// 子区块的纵向索引
    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// 取世界高度 `y_world` 处的方块ID，x/z为区块内坐标
    pub fn block_at(&self, x: usize, y_world: i32, z: usize) -> Result<&str, McMapError> {
        let bits_and_words = match &self.states {
            BlockStates::Uniform => return Ok(&self.palette[0]),
            BlockStates::Packed { bits, words } => (*bits, words),
        };

        let local_y = y_world - self.y * SECTION_HEIGHT;
        if !(0..SECTION_HEIGHT).contains(&local_y) || x >= CHUNK_WIDTH || z >= CHUNK_WIDTH {
            return Err(McMapError::CoordinateOutOfRange);
        }

        let (bits, words) = bits_and_words;
        let pos = local_y as usize * CHUNK_WIDTH * CHUNK_WIDTH + z * CHUNK_WIDTH + x;
        let index = PackedArray::new(words, bits)?
            .get(pos)
            .map_err(|e| McMapError::FormatError(format!("子区块 {} 的data过短: {}", self.y, e)))?
            as usize;

        self.palette
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| McMapError::FormatError(format!(
                "调色板索引 {} 超出范围 (调色板大小 {})",
                index,
                self.palette.len()
            )))
    }
}
