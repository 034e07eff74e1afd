use crate::{error::McMapError, CompressionType};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// 解压后的区块数据上限，超过即视为损坏
pub const MAX_DECOMPRESSED_SIZE: u64 = 32 * 1024 * 1024;

/// 解压区块数据
///
/// 只支持zlib，其他已知的压缩类型同样返回 `UnsupportedCompression`
pub fn decompress_data(
    compressed_data: &[u8],
    compression_type: CompressionType,
) -> Result<Vec<u8>, McMapError> {
    decompress_with_limit(compressed_data, compression_type, MAX_DECOMPRESSED_SIZE)
}

/// 解压区块数据，输出超过 `limit` 字节时返回 `DecompressionError`
pub fn decompress_with_limit(
    compressed_data: &[u8],
    compression_type: CompressionType,
    limit: u64,
) -> Result<Vec<u8>, McMapError> {
    match compression_type {
        CompressionType::Zlib => {
            let mut decompressed = Vec::new();
            ZlibDecoder::new(compressed_data)
                .take(limit + 1)
                .read_to_end(&mut decompressed)
                .map_err(|e| McMapError::DecompressionError(e.to_string()))?;

            if decompressed.len() as u64 > limit {
                return Err(McMapError::DecompressionError(format!(
                    "解压后的数据超过 {} 字节",
                    limit
                )));
            }
            Ok(decompressed)
        }

        other => Err(McMapError::UnsupportedCompression(other as u8)),
    }
}

/// 将压缩类型值转换为枚举
pub fn compression_type_from_u8(value: u8) -> Result<CompressionType, McMapError> {
    match value {
        1 => Ok(CompressionType::Gzip),
        2 => Ok(CompressionType::Zlib),
        3 => Ok(CompressionType::None),
        4 => Ok(CompressionType::LZ4),
        _ => Err(McMapError::UnsupportedCompression(value)),
    }
}
