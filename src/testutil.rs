// 单元测试用的标签树构造工具

use crate::heightmap::{HEIGHTMAP_BITS, HEIGHT_BIAS};
use crate::nbt::Tag;
use std::collections::HashMap;

pub fn compound(fields: Vec<(&str, Tag)>) -> Tag {
    Tag::Compound(
        fields
            .into_iter()
            .map(|(name, tag)| (name.to_string(), tag))
            .collect::<HashMap<_, _>>(),
    )
}

/// 按紧凑数组布局打包，返回NBT中的有符号字
pub fn pack(values: &[u64], bits: u32) -> Vec<i64> {
    let per_word = (64 / bits) as usize;
    let mut words = vec![0u64; values.len().div_ceil(per_word)];
    for (i, value) in values.iter().enumerate() {
        words[i / per_word] |= value << ((i % per_word) as u32 * bits);
    }
    words.into_iter().map(|w| w as i64).collect()
}

/// 高度下标为 z*16 + x
pub fn heightmap_longs(heights: &[i32; 256]) -> Vec<i64> {
    let stored: Vec<u64> = heights.iter().map(|h| (h + HEIGHT_BIAS) as u64).collect();
    pack(&stored, HEIGHTMAP_BITS)
}

pub fn section_tag(y: i8, palette: &[&str], data: Option<Vec<i64>>) -> Tag {
    let palette = palette
        .iter()
        .map(|name| compound(vec![("Name", Tag::String(name.to_string()))]))
        .collect();

    let mut block_states = vec![("palette", Tag::List(palette))];
    if let Some(data) = data {
        block_states.push(("data", Tag::LongArray(data)));
    }

    compound(vec![("Y", Tag::Byte(y)), ("block_states", compound(block_states))])
}

pub fn uniform_sections(from: i8, to: i8, name: &str) -> Vec<Tag> {
    (from..=to).map(|y| section_tag(y, &[name], None)).collect()
}

pub fn chunk_tag(status: &str, heights: &[i32; 256], sections: Vec<Tag>) -> Tag {
    compound(vec![
        ("Status", Tag::String(status.to_string())),
        (
            "Heightmaps",
            compound(vec![("WORLD_SURFACE", Tag::LongArray(heightmap_longs(heights)))]),
        ),
        ("sections", Tag::List(sections)),
    ])
}
