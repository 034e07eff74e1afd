use clap::{Parser, Subcommand};
use mcmap::{
    heightmap::HeightmapKind,
    region::{list_region_files, parse_region_file_name},
    render::{render_regions, stitch, RenderStats},
    types::ChunkLocation,
    Chunk, ChunkPos, ColorTable, McMapError, RegionFile,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// mcmap命令行工具 - 把Minecraft区域文件渲染成俯视彩色地图
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染目录中所有区域文件并拼接成世界地图
    Render {
        /// 区域文件目录（包含 r.X.Z.mca）
        #[arg(short, long)]
        regions: PathBuf,

        /// 颜色表文件
        #[arg(short, long, default_value = "colors.txt")]
        colors: PathBuf,

        /// 单个区域图片的输出目录
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// 拼接后的世界图片
        #[arg(short, long, default_value = "world.png")]
        world: PathBuf,

        /// 并行处理的区域数，0表示使用全部CPU
        #[arg(short, long, default_value_t = 0)]
        jobs: usize,

        /// 高度图: world-surface, motion-blocking, ocean-floor
        #[arg(long, default_value = "world-surface")]
        heightmap: String,

        /// 只输出单个区域图片，不拼接
        #[arg(long)]
        no_stitch: bool,
    },

    /// 查看区域文件信息
    Info {
        /// 区域文件路径
        #[arg(short, long)]
        file: PathBuf,

        /// 是否详细输出
        #[arg(short, long)]
        verbose: bool,

        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), McMapError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { regions, colors, out_dir, world, jobs, heightmap, no_stitch } => {
            if !regions.is_dir() {
                return Err(McMapError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("区域目录不存在: {}", regions.display())
                )));
            }

            let heightmap = match heightmap.parse::<HeightmapKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    println!("不支持的高度图: {}，使用默认的world-surface", heightmap);
                    HeightmapKind::WorldSurface
                }
            };

            if *jobs > 0 {
                if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(*jobs).build_global() {
                    log::warn!("无法设置线程数: {}", e);
                }
            }

            std::fs::create_dir_all(out_dir)?;

            match render_world(regions, colors, out_dir, world, heightmap, *no_stitch) {
                Ok(_) => Ok(()),
                Err(e) => {
                    eprintln!("渲染失败: {}", e);
                    Err(e)
                }
            }
        },

        Commands::Info { file, verbose, json } => {
            if !file.exists() {
                return Err(McMapError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("文件不存在: {}", file.display())
                )));
            }

            match print_region_info(file, *verbose, *json) {
                Ok(_) => Ok(()),
                Err(e) => {
                    eprintln!("获取文件信息失败: {}", e);
                    Err(e)
                }
            }
        },
    }
}

/// 渲染所有区域并拼接
fn render_world(
    regions_dir: &Path,
    colors_path: &Path,
    out_dir: &Path,
    world_path: &Path,
    heightmap: HeightmapKind,
    no_stitch: bool,
) -> Result<(), McMapError> {
    let colors = ColorTable::load(colors_path)?;
    log::info!("已加载 {} 种方块颜色", colors.len());

    let regions = list_region_files(regions_dir)?;
    println!("找到 {} 个区域文件", regions.len());

    let renders = render_regions(&regions, &colors, heightmap, Some(out_dir));

    let mut total = RenderStats::default();
    for render in &renders {
        total.merge(&render.stats);
    }
    println!(
        "完成 {}/{} 个区域: 渲染区块 {}，未生成 {}，未完全生成 {}，失败 {}",
        renders.len(),
        regions.len(),
        total.rendered_chunks,
        total.not_generated,
        total.not_fully_generated,
        total.failed_chunks
    );
    if total.uncolored_columns > 0 {
        println!("{} 列的方块没有颜色", total.uncolored_columns);
    }

    if no_stitch {
        return Ok(());
    }

    println!("拼接图片...");
    let world = stitch(&renders)?;
    world.write_png(world_path)?;
    println!("拼接完成: {} ({}x{})", world_path.display(), world.width(), world.height());

    Ok(())
}

/// 单个区块的读取结果
#[derive(Serialize)]
struct ChunkInfo {
    x: i32,
    z: i32,
    location: ChunkLocation,
    outcome: String,
    min_section: Option<i32>,
    max_section: Option<i32>,
}

#[derive(Serialize)]
struct RegionInfo {
    file: String,
    region_x: Option<i32>,
    region_z: Option<i32>,
    generated: usize,
    fully_generated: usize,
    chunks: Vec<ChunkInfo>,
}

/// 打印区域文件信息
fn print_region_info(file: &Path, verbose: bool, json: bool) -> Result<(), McMapError> {
    let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let pos = parse_region_file_name(name).ok();
    let mut region = RegionFile::open(file, pos.unwrap_or_default())?;

    let mut chunks = Vec::new();
    for chunk_pos in ChunkPos::all_in_region() {
        let location = region.location(chunk_pos.x, chunk_pos.z);
        if location.is_empty() {
            continue;
        }

        let decoded = region
            .read_chunk(chunk_pos.x, chunk_pos.z)
            .and_then(|root| Chunk::from_tag(&root));
        let (outcome, window) = match decoded {
            Ok(chunk) => (
                "ok".to_string(),
                Some((chunk.window().min_section(), chunk.window().max_section())),
            ),
            Err(e) => (e.to_string(), None),
        };

        chunks.push(ChunkInfo {
            x: chunk_pos.x,
            z: chunk_pos.z,
            location,
            outcome,
            min_section: window.map(|(min, _)| min),
            max_section: window.map(|(_, max)| max),
        });
    }

    let info = RegionInfo {
        file: file.display().to_string(),
        region_x: pos.map(|p| p.x),
        region_z: pos.map(|p| p.z),
        generated: region.generated_chunks(),
        fully_generated: chunks.iter().filter(|c| c.outcome == "ok").count(),
        chunks,
    };

    if json {
        let text = serde_json::to_string_pretty(&info)
            .map_err(|e| McMapError::FormatError(format!("JSON写入错误: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("=== 区域文件信息 ===");
    println!("文件: {}", info.file);
    match pos {
        Some(pos) => println!("区域坐标: ({}, {})", pos.x, pos.z),
        None => println!("区域坐标: 未知（文件名不是 r.X.Z.mca）"),
    }
    println!("已生成区块: {}", info.generated);
    println!("可渲染区块: {}", info.fully_generated);

    if verbose {
        println!("\n=== 详细信息 ===");
        for chunk in &info.chunks {
            match (chunk.min_section, chunk.max_section) {
                (Some(min), Some(max)) => println!(
                    "区块 ({}, {}) 偏移 {} 长度 {}: 子区块 {}..={}",
                    chunk.x, chunk.z, chunk.location.offset, chunk.location.length, min, max
                ),
                _ => println!(
                    "区块 ({}, {}) 偏移 {} 长度 {}: {}",
                    chunk.x, chunk.z, chunk.location.offset, chunk.location.length, chunk.outcome
                ),
            }
        }
    }

    Ok(())
}
