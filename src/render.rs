use crate::{
    chunk::Chunk,
    colors::{ColorTable, Rgb},
    error::McMapError,
    heightmap::HeightmapKind,
    region::RegionFile,
    types::{ChunkPos, RegionPos},
    CHUNK_WIDTH, REGION_WIDTH,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// 一个区域渲染后的边长（像素）
pub const REGION_PIXELS: usize = REGION_WIDTH * CHUNK_WIDTH;

/// RGB8 图像，背景为黑色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn set(&mut self, x: usize, y: usize, rgb: Rgb) {
        let i = (y * self.width + x) * 3;
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    /// 把 `other` 整体复制到 (x, y) 处，超出部分丢弃
    pub fn paste(&mut self, other: &RgbImage, x: usize, y: usize) {
        let copy_width = other.width.min(self.width.saturating_sub(x));
        for row in 0..other.height.min(self.height.saturating_sub(y)) {
            let src = row * other.width * 3;
            let dst = ((y + row) * self.width + x) * 3;
            self.pixels[dst..dst + copy_width * 3]
                .copy_from_slice(&other.pixels[src..src + copy_width * 3]);
        }
    }

    pub fn encode_png<W: Write>(&self, writer: W) -> Result<(), McMapError> {
        let mut encoder = png::Encoder::new(writer, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<(), McMapError> {
        let file = File::create(path.as_ref())?;
        self.encode_png(BufWriter::new(file))
    }
}

/// 单个区域的渲染统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub rendered_chunks: usize,
    pub not_generated: usize,
    pub not_fully_generated: usize,
    pub failed_chunks: usize,
    pub failed_columns: usize,
    pub uncolored_columns: usize,
}

impl RenderStats {
    pub fn merge(&mut self, other: &RenderStats) {
        self.rendered_chunks += other.rendered_chunks;
        self.not_generated += other.not_generated;
        self.not_fully_generated += other.not_fully_generated;
        self.failed_chunks += other.failed_chunks;
        self.failed_columns += other.failed_columns;
        self.uncolored_columns += other.uncolored_columns;
    }
}

/// 渲染一个区域的俯视图
///
/// 单个区块或单列的失败只会跳过对应部分，只有I/O错误会中止整个区域
pub fn render_region<R: Read + Seek>(
    region: &mut RegionFile<R>,
    colors: &ColorTable,
    heightmap: HeightmapKind,
) -> Result<(RgbImage, RenderStats), McMapError> {
    let mut image = RgbImage::new(REGION_PIXELS, REGION_PIXELS);
    let mut stats = RenderStats::default();

    for pos in ChunkPos::all_in_region() {
        let chunk = match region
            .read_chunk(pos.x, pos.z)
            .and_then(|root| Chunk::with_heightmap(&root, heightmap))
        {
            Ok(chunk) => chunk,
            Err(McMapError::NotGenerated) => {
                stats.not_generated += 1;
                continue;
            }
            Err(McMapError::NotFullyGenerated(status)) => {
                log::debug!("区域 {:?} 区块 ({}, {}) 未完全生成: {}", region.pos(), pos.x, pos.z, status);
                stats.not_fully_generated += 1;
                continue;
            }
            Err(e) if e.is_chunk_skippable() => {
                log::warn!("区域 {:?} 区块 ({}, {}) 已跳过: {}", region.pos(), pos.x, pos.z, e);
                stats.failed_chunks += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        for bz in 0..CHUNK_WIDTH {
            for bx in 0..CHUNK_WIDTH {
                match chunk.top_block_at(bx, bz) {
                    Ok(identifier) => match colors.get(identifier) {
                        Some(rgb) => image.set(
                            pos.x as usize * CHUNK_WIDTH + bx,
                            pos.z as usize * CHUNK_WIDTH + bz,
                            rgb,
                        ),
                        None => stats.uncolored_columns += 1,
                    },
                    Err(e) => {
                        log::debug!("区块 ({}, {}) 列 ({}, {}) 已跳过: {}", pos.x, pos.z, bx, bz, e);
                        stats.failed_columns += 1;
                    }
                }
            }
        }
        stats.rendered_chunks += 1;
    }

    Ok((image, stats))
}

/// 打开并渲染一个区域文件
pub fn render_region_file<P: AsRef<Path>>(
    path: P,
    pos: RegionPos,
    colors: &ColorTable,
    heightmap: HeightmapKind,
) -> Result<(RgbImage, RenderStats), McMapError> {
    let mut region = RegionFile::open(path, pos)?;
    render_region(&mut region, colors, heightmap)
}

/// 一个区域的渲染结果
#[derive(Debug)]
pub struct RegionRender {
    pub pos: RegionPos,
    pub image: RgbImage,
    pub stats: RenderStats,
}

/// 并行渲染多个区域，每个区域的图片写入 `out_dir`
///
/// 失败的区域会被记录并从结果中剔除，不影响其他区域
pub fn render_regions(
    regions: &[(RegionPos, PathBuf)],
    colors: &ColorTable,
    heightmap: HeightmapKind,
    out_dir: Option<&Path>,
) -> Vec<RegionRender> {
    regions
        .par_iter()
        .filter_map(|(pos, path)| {
            log::info!("开始渲染区域 {} {}", pos.x, pos.z);
            let result = render_region_file(path, *pos, colors, heightmap).and_then(|(image, stats)| {
                if let Some(dir) = out_dir {
                    image.write_png(dir.join(pos.image_name()))?;
                }
                Ok(RegionRender { pos: *pos, image, stats })
            });

            match result {
                Ok(render) => {
                    log::info!("区域 {} {} 完成，渲染 {} 个区块", pos.x, pos.z, render.stats.rendered_chunks);
                    Some(render)
                }
                Err(e) => {
                    log::error!("区域 {} ({}) 渲染失败: {}", pos.file_name(), path.display(), e);
                    None
                }
            }
        })
        .collect()
}

/// 把各区域图片按坐标拼接成整个世界的图片
pub fn stitch(regions: &[RegionRender]) -> Result<RgbImage, McMapError> {
    let min_x = regions.iter().map(|r| r.pos.x).min();
    let max_x = regions.iter().map(|r| r.pos.x).max();
    let min_z = regions.iter().map(|r| r.pos.z).min();
    let max_z = regions.iter().map(|r| r.pos.z).max();

    let (Some(min_x), Some(max_x), Some(min_z), Some(max_z)) = (min_x, max_x, min_z, max_z) else {
        return Err(McMapError::ImageError("没有可拼接的区域".to_string()));
    };

    let width = (max_x - min_x + 1) as usize * REGION_PIXELS;
    let height = (max_z - min_z + 1) as usize * REGION_PIXELS;
    let mut world = RgbImage::new(width, height);

    for region in regions {
        world.paste(
            &region.image,
            (region.pos.x - min_x) as usize * REGION_PIXELS,
            (region.pos.z - min_z) as usize * REGION_PIXELS,
        );
    }

    Ok(world)
}
