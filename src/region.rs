use crate::{
    chunk::validate_status,
    compression::{compression_type_from_u8, decompress_data},
    error::McMapError,
    nbt::{self, Tag},
    types::{ChunkLocation, ChunkPos, RegionPos},
    REGION_CHUNK_COUNT, REGION_HEADER_SIZE, SECTOR_SIZE,
};
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// 区块记录头：4字节长度 + 1字节压缩类型
const CHUNK_HEADER_SIZE: usize = 5;

/// 读取偏移表，并跳过随后的时间戳表
pub fn read_table<R: Read>(reader: &mut R) -> Result<Vec<ChunkLocation>, McMapError> {
    let mut header = vec![0u8; REGION_HEADER_SIZE as usize];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            McMapError::FormatError("区域文件头不完整".to_string())
        }
        _ => McMapError::Io(e),
    })?;

    let mut cursor = Cursor::new(&header[..SECTOR_SIZE as usize]);
    let mut locations = Vec::with_capacity(REGION_CHUNK_COUNT);
    for _ in 0..REGION_CHUNK_COUNT {
        locations.push(ChunkLocation::from_entry(cursor.read_u32::<BigEndian>()?));
    }

    Ok(locations)
}

/// 一个打开的区域文件，独占其字节源
pub struct RegionFile<R> {
    pos: RegionPos,
    reader: R,
    locations: Vec<ChunkLocation>,
}

impl RegionFile<BufReader<File>> {
    /// 打开区域文件并读取偏移表
    pub fn open<P: AsRef<Path>>(path: P, pos: RegionPos) -> Result<Self, McMapError> {
        let file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len();

        if file_size < REGION_HEADER_SIZE {
            return Err(McMapError::FormatError(format!(
                "区域文件过小，大小为 {} 字节",
                file_size
            )));
        }

        Self::from_reader(BufReader::new(file), pos)
    }
}

impl<R: Read + Seek> RegionFile<R> {
    pub fn from_reader(mut reader: R, pos: RegionPos) -> Result<Self, McMapError> {
        reader.seek(SeekFrom::Start(0))?;
        let locations = read_table(&mut reader)?;

        Ok(Self {
            pos,
            reader,
            locations,
        })
    }

    pub fn pos(&self) -> RegionPos {
        self.pos
    }

    /// 区块 (x, z) 的偏移表条目，坐标按32取模
    pub fn location(&self, x: i32, z: i32) -> ChunkLocation {
        self.locations[ChunkPos::new(x, z).table_index()]
    }

    /// 偏移表中非空条目的数量
    pub fn generated_chunks(&self) -> usize {
        self.locations.iter().filter(|l| !l.is_empty()).count()
    }

    /// 读取、解压并解析区块 (x, z)，并验证其已完全生成
    pub fn read_chunk(&mut self, x: i32, z: i32) -> Result<Tag, McMapError> {
        let root = self.read_chunk_nbt(x, z)?;
        validate_status(&root)?;
        Ok(root)
    }

    /// 读取区块的NBT，不检查生成状态
    pub fn read_chunk_nbt(&mut self, x: i32, z: i32) -> Result<Tag, McMapError> {
        let location = self.location(x, z);
        if location.is_empty() {
            return Err(McMapError::NotGenerated);
        }

        self.reader.seek(SeekFrom::Start(location.offset))?;
        let mut record = Vec::with_capacity(location.length as usize);
        (&mut self.reader).take(location.length).read_to_end(&mut record)?;

        if record.len() < CHUNK_HEADER_SIZE {
            return Err(McMapError::FormatError(format!(
                "区块 ({}, {}) 的记录被截断: {} 字节",
                x,
                z,
                record.len()
            )));
        }

        let mut cursor = Cursor::new(&record);
        // 长度包含压缩类型字节
        let declared = cursor.read_u32::<BigEndian>()? as usize;
        let compression = cursor.read_u8()?;

        if declared == 0 || declared + 4 > record.len() {
            return Err(McMapError::FormatError(format!(
                "区块 ({}, {}) 的声明长度 {} 超出记录长度 {}",
                x,
                z,
                declared,
                record.len()
            )));
        }

        let compression = compression_type_from_u8(compression)?;
        let data = decompress_data(&record[CHUNK_HEADER_SIZE..declared + 4], compression)?;

        nbt::read_root(&data)
    }
}

/// 解析 `r.<x>.<z>.mca` 形式的文件名
pub fn parse_region_file_name(name: &str) -> Result<RegionPos, McMapError> {
    let invalid = || McMapError::InvalidRegionName(name.to_string());

    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() != 4 || parts[0] != "r" || parts[3] != "mca" {
        return Err(invalid());
    }

    let x = parts[1].parse::<i32>().map_err(|_| invalid())?;
    let z = parts[2].parse::<i32>().map_err(|_| invalid())?;
    Ok(RegionPos::new(x, z))
}

/// 列出目录中的所有区域文件，按坐标排序，忽略其他文件
pub fn list_region_files<P: AsRef<Path>>(dir: P) -> Result<Vec<(RegionPos, PathBuf)>, McMapError> {
    let mut regions = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match parse_region_file_name(name) {
            Ok(pos) => regions.push((pos, path)),
            Err(_) => log::debug!("跳过非区域文件: {}", path.display()),
        }
    }

    regions.sort_by_key(|(pos, _)| *pos);
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::FULL_STATUS;
    use crate::nbt::TagNode;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn status_nbt(status: &str) -> Vec<u8> {
        let mut data = vec![10, 0, 0, 8];
        data.extend_from_slice(&6u16.to_be_bytes());
        data.extend_from_slice(b"Status");
        data.extend_from_slice(&(status.len() as u16).to_be_bytes());
        data.extend_from_slice(status.as_bytes());
        data.push(0);
        data
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// 构造内存中的区域文件，每个区块占一个扇区
    fn region_bytes(chunks: &[((i32, i32), u8, Vec<u8>)]) -> Vec<u8> {
        let mut out = vec![0u8; REGION_HEADER_SIZE as usize];
        for (n, ((x, z), compression, payload)) in chunks.iter().enumerate() {
            let sector = 2 + n as u32;
            let index = ChunkPos::new(*x, *z).table_index();
            out[index * 4..index * 4 + 4].copy_from_slice(&((sector << 8) | 1).to_be_bytes());

            let mut record = Vec::new();
            record.extend_from_slice(&(payload.len() as u32 + 1).to_be_bytes());
            record.push(*compression);
            record.extend_from_slice(payload);
            record.resize(SECTOR_SIZE as usize, 0);
            out.extend(record);
        }
        out
    }

    #[test]
    fn empty_entry_is_not_generated() {
        let bytes = region_bytes(&[((1, 0), 2, zlib(&status_nbt(FULL_STATUS)))]);
        let mut region = RegionFile::from_reader(Cursor::new(bytes), RegionPos::new(0, 0)).unwrap();

        assert_eq!(region.generated_chunks(), 1);
        assert!(matches!(region.read_chunk(0, 0), Err(McMapError::NotGenerated)));
        assert!(matches!(region.read_chunk(5, 31), Err(McMapError::NotGenerated)));

        let root = region.read_chunk(1, 0).unwrap();
        assert_eq!(root.get("Status").and_then(Tag::as_str), Some(FULL_STATUS));
        // 坐标按32取模
        assert!(region.read_chunk(33, 32).is_ok());
    }

    #[test]
    fn partial_status_is_not_fully_generated() {
        let bytes = region_bytes(&[
            ((0, 0), 2, zlib(&status_nbt("minecraft:noise"))),
            ((2, 3), 2, zlib(&status_nbt(FULL_STATUS))),
        ]);
        let mut region = RegionFile::from_reader(Cursor::new(bytes), RegionPos::new(0, 0)).unwrap();

        assert!(matches!(region.read_chunk(0, 0), Err(McMapError::NotFullyGenerated(_))));
        assert!(region.read_chunk_nbt(0, 0).is_ok());
        assert!(region.read_chunk(2, 3).is_ok());
    }

    #[test]
    fn bad_payloads_fail_only_their_chunk() {
        let bytes = region_bytes(&[
            ((0, 0), 2, vec![1, 2, 3, 4]),
            ((1, 0), 1, zlib(&status_nbt(FULL_STATUS))),
            ((2, 0), 2, zlib(&[10, 0, 0, 3])),
            ((3, 0), 2, zlib(&status_nbt(FULL_STATUS))),
        ]);
        let mut region = RegionFile::from_reader(Cursor::new(bytes), RegionPos::new(0, 0)).unwrap();

        assert!(matches!(region.read_chunk(0, 0), Err(McMapError::DecompressionError(_))));
        assert!(matches!(region.read_chunk(1, 0), Err(McMapError::UnsupportedCompression(1))));
        assert!(matches!(region.read_chunk(2, 0), Err(McMapError::FormatError(_))));
        assert!(region.read_chunk(3, 0).is_ok());
    }

    #[test]
    fn declared_length_past_record_is_a_format_error() {
        let mut bytes = region_bytes(&[((0, 0), 2, zlib(&status_nbt(FULL_STATUS)))]);
        let start = REGION_HEADER_SIZE as usize;
        bytes[start..start + 4].copy_from_slice(&5000u32.to_be_bytes());
        let mut region = RegionFile::from_reader(Cursor::new(bytes), RegionPos::new(0, 0)).unwrap();

        assert!(matches!(region.read_chunk(0, 0), Err(McMapError::FormatError(_))));
    }

    #[test]
    fn short_header_is_a_format_error() {
        let result = RegionFile::from_reader(Cursor::new(vec![0u8; 100]), RegionPos::new(0, 0));
        assert!(matches!(result, Err(McMapError::FormatError(_))));
    }

    #[test]
    fn region_file_names() {
        assert_eq!(parse_region_file_name("r.0.0.mca").unwrap(), RegionPos::new(0, 0));
        assert_eq!(parse_region_file_name("r.-3.12.mca").unwrap(), RegionPos::new(-3, 12));
        assert!(parse_region_file_name("r.0.0.mcr").is_err());
        assert!(parse_region_file_name("r.a.0.mca").is_err());
        assert!(parse_region_file_name("region.0.0.png").is_err());
    }

    #[test]
    fn lists_only_region_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["r.1.0.mca", "r.-1.0.mca", "notes.txt", "r.0.0.mca.bak"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let regions = list_region_files(dir.path()).unwrap();
        let positions: Vec<_> = regions.iter().map(|(pos, _)| *pos).collect();
        assert_eq!(positions, vec![RegionPos::new(-1, 0), RegionPos::new(1, 0)]);
    }
}
