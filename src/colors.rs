use crate::error::McMapError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 查找时去掉的命名空间前缀
const DEFAULT_NAMESPACE: &str = "minecraft:";

pub type Rgb = [u8; 3];

/// 方块ID到颜色的映射
///
/// 文本格式为两行一组：第一行是不带命名空间的方块名，第二行是 `(r, g, b)`。
/// 空行会被忽略
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: HashMap<String, Rgb>,
}

impl ColorTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, McMapError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            McMapError::ColorTableError(format!("无法读取 {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, McMapError> {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        if lines.len() % 2 != 0 {
            let (line_no, name) = lines[lines.len() - 1];
            return Err(McMapError::ColorTableError(format!(
                "第 {} 行的 {} 缺少颜色",
                line_no, name
            )));
        }

        let mut colors = HashMap::with_capacity(lines.len() / 2);
        for pair in lines.chunks_exact(2) {
            let (_, name) = pair[0];
            let (line_no, color) = pair[1];
            colors.insert(name.to_string(), parse_color(color, line_no)?);
        }

        Ok(Self { colors })
    }

    /// 按方块ID查找颜色，`minecraft:` 前缀可有可无
    pub fn get(&self, identifier: &str) -> Option<Rgb> {
        let name = identifier.strip_prefix(DEFAULT_NAMESPACE).unwrap_or(identifier);
        self.colors.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// 解析 `(r, g, b)`，括号种类不限
fn parse_color(text: &str, line_no: usize) -> Result<Rgb, McMapError> {
    let invalid = || McMapError::ColorTableError(format!("第 {} 行的颜色无效: {}", line_no, text));

    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    let channels: Vec<&str> = chars.as_str().split(',').map(str::trim).collect();
    if channels.len() != 3 {
        return Err(invalid());
    }

    let mut rgb = [0u8; 3];
    for (slot, channel) in rgb.iter_mut().zip(channels) {
        *slot = channel.parse::<u8>().map_err(|_| invalid())?;
    }
    Ok(rgb)
}
