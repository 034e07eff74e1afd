use crate::error::McMapError;

/// 定宽无符号整数紧凑数组
///
/// 每个64位字内存放 `64 / bits` 个值，值不会跨字存放，字内剩余的高位是填充
#[derive(Debug, Clone, Copy)]
pub struct PackedArray<'a> {
    words: &'a [u64],
    bits: u32,
    values_per_word: usize,
    mask: u64,
}

impl<'a> PackedArray<'a> {
    pub fn new(words: &'a [u64], bits: u32) -> Result<Self, McMapError> {
        if bits == 0 || bits > 64 {
            return Err(McMapError::FormatError(format!("无效的位宽: {}", bits)));
        }

        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };

        Ok(Self {
            words,
            bits,
            values_per_word: (64 / bits) as usize,
            mask,
        })
    }

    /// 读取逻辑位置 `index` 上的值
    pub fn get(&self, index: usize) -> Result<u64, McMapError> {
        let word_index = index / self.values_per_word;
        let word = self.words.get(word_index).ok_or(McMapError::IndexOutOfRange {
            index: word_index,
            len: self.words.len(),
        })?;

        let bit_offset = (index % self.values_per_word) as u32 * self.bits;
        Ok((word >> bit_offset) & self.mask)
    }

    /// 容纳 `count` 个值需要的字数
    pub fn words_needed(count: usize, bits: u32) -> usize {
        let values_per_word = (64 / bits.clamp(1, 64)) as usize;
        count.div_ceil(values_per_word)
    }
}

/// NBT中的LongArray是有符号的，按位转换为无符号字
pub fn words_from_longs(longs: &[i64]) -> Vec<u64> {
    longs.iter().map(|&long| long as u64).collect()
}
