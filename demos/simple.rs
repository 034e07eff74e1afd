use mcmap::{
    region::parse_region_file_name, render::render_region, Chunk, ColorTable, HeightmapKind,
    McMapError, RegionFile,
};
use std::path::Path;

fn main() -> Result<(), McMapError> {
    let mut args = std::env::args().skip(1);
    let (Some(region_path), Some(colors_path)) = (args.next(), args.next()) else {
        println!("用法: simple <r.X.Z.mca> <colors.txt>");
        return Ok(());
    };
    let region_path = Path::new(&region_path);

    // 从文件名得到区域坐标
    let name = region_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let pos = parse_region_file_name(name)?;

    println!("读取文件: {}", region_path.display());
    let mut region = RegionFile::open(region_path, pos)?;
    println!("已生成区块: {}", region.generated_chunks());

    // 找到第一个可渲染的区块，输出它左上角的顶部方块
    for z in 0..32 {
        for x in 0..32 {
            let chunk = match region.read_chunk(x, z).and_then(|root| Chunk::from_tag(&root)) {
                Ok(chunk) => chunk,
                Err(_) => continue,
            };

            let window = chunk.window();
            println!(
                "区块 [{}, {}] 子区块 {}..={}，高度 {}..={}",
                x,
                z,
                window.min_section(),
                window.max_section(),
                chunk.heightmap().min(),
                chunk.heightmap().max()
            );
            for bx in 0..4 {
                match chunk.top_block_at(bx, 0) {
                    Ok(block) => println!("  ({}, 0): {}", bx, block),
                    Err(e) => println!("  ({}, 0): 已跳过 ({})", bx, e),
                }
            }

            // 渲染整个区域
            let colors = ColorTable::load(&colors_path)?;
            let (image, stats) = render_region(&mut region, &colors, HeightmapKind::WorldSurface)?;
            let output_path = Path::new(".").join(pos.image_name());
            image.write_png(&output_path)?;
            println!("\n保存到文件: {}", output_path.display());
            println!("渲染区块: {}，失败: {}", stats.rendered_chunks, stats.failed_chunks);

            return Ok(());
        }
    }

    println!("没有完全生成的区块");
    Ok(())
}
