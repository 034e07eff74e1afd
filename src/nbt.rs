// 只读的NBT解析器
// 区块数据解压后是一棵NBT标签树，这里只负责把字节解析成树并提供按名称导航的接口，
// 不支持写回

use crate::error::McMapError;
use byteorder::{BigEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// 预分配上限，防止损坏的长度字段导致巨量分配
const MAX_PREALLOC: usize = 4096;

/// 列表和复合标签的最大嵌套深度
pub const MAX_DEPTH: usize = 512;

/// NBT标签类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NbtTagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TryFrom<u8> for NbtTagType {
    type Error = McMapError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NbtTagType::End),
            1 => Ok(NbtTagType::Byte),
            2 => Ok(NbtTagType::Short),
            3 => Ok(NbtTagType::Int),
            4 => Ok(NbtTagType::Long),
            5 => Ok(NbtTagType::Float),
            6 => Ok(NbtTagType::Double),
            7 => Ok(NbtTagType::ByteArray),
            8 => Ok(NbtTagType::String),
            9 => Ok(NbtTagType::List),
            10 => Ok(NbtTagType::Compound),
            11 => Ok(NbtTagType::IntArray),
            12 => Ok(NbtTagType::LongArray),
            _ => Err(McMapError::FormatError(format!(
                "无效的NBT标签类型: {}",
                value
            ))),
        }
    }
}

/// NBT标签值
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(HashMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// 标签树的导航能力
///
/// 区块解码只依赖这组操作，任何满足它的树结构都可以替换 [`Tag`]
pub trait TagNode: Sized {
    /// 按名称取复合标签的子节点
    fn get(&self, name: &str) -> Option<&Self>;

    /// 整数标量（Byte/Short/Int/Long）的有符号值
    fn as_int(&self) -> Option<i64>;

    fn as_str(&self) -> Option<&str>;

    fn as_list(&self) -> Option<&[Self]>;

    fn as_long_array(&self) -> Option<&[i64]>;

    /// 取必需字段，缺失时返回格式错误
    fn field(&self, name: &str) -> Result<&Self, McMapError> {
        self.get(name)
            .ok_or_else(|| McMapError::FormatError(format!("缺少字段: {}", name)))
    }
}

impl TagNode for Tag {
    fn get(&self, name: &str) -> Option<&Tag> {
        match self {
            Tag::Compound(map) => map.get(name),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Tag::Byte(n) => Some(*n as i64),
            Tag::Short(n) => Some(*n as i64),
            Tag::Int(n) => Some(*n as i64),
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(longs) => Some(longs),
            _ => None,
        }
    }
}

fn truncated(err: io::Error) -> McMapError {
    McMapError::FormatError(format!("NBT数据被截断: {}", err))
}

/// 解析根标签，根标签必须是复合标签
pub fn read_root(data: &[u8]) -> Result<Tag, McMapError> {
    if data.is_empty() {
        return Err(McMapError::FormatError("NBT数据为空".to_string()));
    }

    let mut cursor = Cursor::new(data);
    let tag_type = NbtTagType::try_from(cursor.read_u8().map_err(truncated)?)?;
    if tag_type != NbtTagType::Compound {
        return Err(McMapError::FormatError(format!(
            "根标签不是复合标签: {:?}",
            tag_type
        )));
    }

    // 根标签名称在区块数据中总是空的，直接丢弃
    read_string(&mut cursor)?;
    read_payload(&mut cursor, tag_type, 0)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, McMapError> {
    let length = reader.read_u16::<BigEndian>().map_err(truncated)?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes).map_err(truncated)?;

    // 游戏使用Modified UTF-8，普通方块ID都是ASCII，这里宽松处理
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_length<R: Read>(reader: &mut R) -> Result<usize, McMapError> {
    let length = reader.read_i32::<BigEndian>().map_err(truncated)?;
    if length < 0 {
        return Err(McMapError::FormatError(format!("负数长度: {}", length)));
    }
    Ok(length as usize)
}

fn read_payload<R: Read>(
    reader: &mut R,
    tag_type: NbtTagType,
    depth: usize,
) -> Result<Tag, McMapError> {
    if depth > MAX_DEPTH {
        return Err(McMapError::FormatError(format!("NBT嵌套深度超过 {}", MAX_DEPTH)));
    }

    let tag = match tag_type {
        NbtTagType::End => {
            return Err(McMapError::FormatError("意外的End标签".to_string()));
        }
        NbtTagType::Byte => Tag::Byte(reader.read_i8().map_err(truncated)?),
        NbtTagType::Short => Tag::Short(reader.read_i16::<BigEndian>().map_err(truncated)?),
        NbtTagType::Int => Tag::Int(reader.read_i32::<BigEndian>().map_err(truncated)?),
        NbtTagType::Long => Tag::Long(reader.read_i64::<BigEndian>().map_err(truncated)?),
        NbtTagType::Float => Tag::Float(reader.read_f32::<BigEndian>().map_err(truncated)?),
        NbtTagType::Double => Tag::Double(reader.read_f64::<BigEndian>().map_err(truncated)?),
        NbtTagType::ByteArray => {
            let length = read_length(reader)?;
            let mut bytes = Vec::with_capacity(length.min(MAX_PREALLOC));
            for _ in 0..length {
                bytes.push(reader.read_i8().map_err(truncated)?);
            }
            Tag::ByteArray(bytes)
        }
        NbtTagType::String => Tag::String(read_string(reader)?),
        NbtTagType::List => {
            let element_type = reader.read_u8().map_err(truncated)?;
            let length = read_length(reader)?;
            let mut list = Vec::with_capacity(length.min(MAX_PREALLOC));
            if length > 0 {
                let element_type = NbtTagType::try_from(element_type)?;
                for _ in 0..length {
                    list.push(read_payload(reader, element_type, depth + 1)?);
                }
            }
            Tag::List(list)
        }
        NbtTagType::Compound => {
            let mut compound = HashMap::new();
            loop {
                let field_type = NbtTagType::try_from(reader.read_u8().map_err(truncated)?)?;
                if field_type == NbtTagType::End {
                    break;
                }
                let name = read_string(reader)?;
                let value = read_payload(reader, field_type, depth + 1)?;
                compound.insert(name, value);
            }
            Tag::Compound(compound)
        }
        NbtTagType::IntArray => {
            let length = read_length(reader)?;
            let mut ints = Vec::with_capacity(length.min(MAX_PREALLOC));
            for _ in 0..length {
                ints.push(reader.read_i32::<BigEndian>().map_err(truncated)?);
            }
            Tag::IntArray(ints)
        }
        NbtTagType::LongArray => {
            let length = read_length(reader)?;
            let mut longs = Vec::with_capacity(length.min(MAX_PREALLOC));
            for _ in 0..length {
                longs.push(reader.read_i64::<BigEndian>().map_err(truncated)?);
            }
            Tag::LongArray(longs)
        }
    };

    Ok(tag)
}
