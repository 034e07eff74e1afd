use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum McMapError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("区块尚未生成")]
    NotGenerated,

    #[error("区块未完全生成，状态为: {0}")]
    NotFullyGenerated(String),

    #[error("不支持的压缩类型: {0}")]
    UnsupportedCompression(u8),

    #[error("解压错误: {0}")]
    DecompressionError(String),

    #[error("格式错误: {0}")]
    FormatError(String),

    #[error("索引越界: {index} (长度 {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("逻辑错误: {0}")]
    LogicError(String),

    #[error("坐标超出范围")]
    CoordinateOutOfRange,

    #[error("颜色表错误: {0}")]
    ColorTableError(String),

    #[error("图像错误: {0}")]
    ImageError(String),

    #[error("无效的区域文件名: {0}")]
    InvalidRegionName(String),
}

impl McMapError {
    /// 单个区块的失败只跳过该区块，不影响同一区域内的其他区块
    pub fn is_chunk_skippable(&self) -> bool {
        !matches!(self, McMapError::Io(_) | McMapError::ImageError(_) | McMapError::ColorTableError(_))
    }
}

impl From<png::EncodingError> for McMapError {
    fn from(err: png::EncodingError) -> Self {
        McMapError::ImageError(err.to_string())
    }
}
