#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 测试用的最小NBT写入器，字段按插入顺序写出
pub enum Nbt {
    Byte(i8),
    String(String),
    List(u8, Vec<Nbt>),
    Compound(Vec<(String, Nbt)>),
    LongArray(Vec<i64>),
}

impl Nbt {
    fn type_id(&self) -> u8 {
        match self {
            Nbt::Byte(_) => 1,
            Nbt::String(_) => 8,
            Nbt::List(..) => 9,
            Nbt::Compound(_) => 10,
            Nbt::LongArray(_) => 12,
        }
    }

    fn write_payload(&self, out: &mut Vec<u8>) {
        match self {
            Nbt::Byte(v) => out.push(*v as u8),
            Nbt::String(s) => {
                out.extend_from_slice(&(s.len() as u16).to_be_bytes());
                out.extend_from_slice(s.as_bytes());
            }
            Nbt::List(element_type, items) => {
                out.push(*element_type);
                out.extend_from_slice(&(items.len() as i32).to_be_bytes());
                for item in items {
                    item.write_payload(out);
                }
            }
            Nbt::Compound(fields) => {
                for (name, value) in fields {
                    out.push(value.type_id());
                    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
                    out.extend_from_slice(name.as_bytes());
                    value.write_payload(out);
                }
                out.push(0);
            }
            Nbt::LongArray(longs) => {
                out.extend_from_slice(&(longs.len() as i32).to_be_bytes());
                for long in longs {
                    out.extend_from_slice(&long.to_be_bytes());
                }
            }
        }
    }

    /// 以空名称的根复合标签写出
    pub fn to_root_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.type_id(), 0, 0];
        self.write_payload(&mut out);
        out
    }
}

fn compound(fields: Vec<(&str, Nbt)>) -> Nbt {
    Nbt::Compound(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

pub fn pack(values: &[u64], bits: u32) -> Vec<i64> {
    let per_word = (64 / bits) as usize;
    let mut words = vec![0u64; values.len().div_ceil(per_word)];
    for (i, value) in values.iter().enumerate() {
        words[i / per_word] |= value << ((i % per_word) as u32 * bits);
    }
    words.into_iter().map(|w| w as i64).collect()
}

pub fn section(y: i8, palette: &[&str], indices: Option<&[u64]>) -> Nbt {
    let entries = palette
        .iter()
        .map(|name| compound(vec![("Name", Nbt::String(name.to_string()))]))
        .collect();

    let mut block_states = vec![("palette", Nbt::List(10, entries))];
    if let Some(indices) = indices {
        let bits = (usize::BITS - (palette.len() - 1).leading_zeros()).max(4);
        block_states.push(("data", Nbt::LongArray(pack(indices, bits))));
    }

    compound(vec![("Y", Nbt::Byte(y)), ("block_states", compound(block_states))])
}

/// 区块根标签，高度下标为 z*16 + x
pub fn chunk(status: &str, heights: &[i32; 256], sections: Vec<Nbt>) -> Nbt {
    let stored: Vec<u64> = heights.iter().map(|h| (h + 65) as u64).collect();
    compound(vec![
        ("DataVersion", Nbt::Byte(0)),
        ("Status", Nbt::String(status.to_string())),
        (
            "Heightmaps",
            compound(vec![("WORLD_SURFACE", Nbt::LongArray(pack(&stored, 9)))]),
        ),
        ("sections", Nbt::List(10, sections)),
    ])
}

/// 区域文件中的一条记录
pub enum Record {
    Chunk(Nbt),
    /// 原样写入的字节（压缩类型2）
    Raw(Vec<u8>),
}

/// 写出区域文件，每个区块按顺序占用若干扇区
pub fn write_region(dir: &Path, rx: i32, rz: i32, chunks: Vec<((usize, usize), Record)>) -> PathBuf {
    let mut header = vec![0u8; 8192];
    let mut body = Vec::new();
    let mut sector = 2u32;

    for ((x, z), record) in chunks {
        let payload = match record {
            Record::Chunk(nbt) => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&nbt.to_root_bytes()).unwrap();
                encoder.finish().unwrap()
            }
            Record::Raw(bytes) => bytes,
        };

        let mut data = Vec::new();
        data.extend_from_slice(&(payload.len() as u32 + 1).to_be_bytes());
        data.push(2);
        data.extend_from_slice(&payload);
        let sectors = data.len().div_ceil(4096) as u32;
        data.resize(sectors as usize * 4096, 0);

        let index = (x + z * 32) * 4;
        header[index..index + 4].copy_from_slice(&((sector << 8) | sectors).to_be_bytes());
        sector += sectors;
        body.extend(data);
    }

    let path = dir.join(format!("r.{}.{}.mca", rx, rz));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&header).unwrap();
    file.write_all(&body).unwrap();
    path
}

pub const COLORS: &str = "stone\n(125, 125, 125)\ngrass_block\n(91, 139, 57)\nwater\n(63, 118, 228)\n";
