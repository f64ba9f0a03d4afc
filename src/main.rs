//! # 截图探针 — 命令行入口
//!
//! 本文件仅负责日志初始化与子命令分发。
//! 解码、采样与监视器逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use screen_probe::error::AppError;
use screen_probe::harness::HarnessConfig;
use screen_probe::raster::{self, ColorTypePolicy, Rgb};
use screen_probe::sampler::{PixelSampler, approximately_equals};

#[derive(Debug, Parser)]
#[command(name = "screen-probe", version, about = "Decode VM captures and query pixels")]
struct Cli {
    /// JSON 配置文件（缺失字段使用默认值）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的颜色类型策略：permissive | strict
    #[arg(long, global = true)]
    color_policy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 打印容器格式、尺寸与每像素字节数
    Info { path: PathBuf },

    /// 读取一个像素，可选地与期望颜色比较
    Pixel {
        path: PathBuf,
        x: u32,
        y: u32,
        /// 期望颜色：RRGGBB、#RRGGBB 或 r,g,b
        #[arg(long)]
        expect: Option<String>,
        /// 每通道容差，默认取配置中的 default_tolerance
        #[arg(long)]
        tolerance: Option<u8>,
    },

    /// 通过 QEMU 监视器截图
    #[cfg(unix)]
    Capture {
        /// 截图输出路径，默认取配置中的 screenshot_path
        #[arg(long)]
        out: Option<PathBuf>,
        /// 截图后打印该坐标的颜色
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        at: Option<Vec<u32>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("❌ {}", err);
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> Result<HarnessConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load_from_path(path),
        None => HarnessConfig::default(),
    };

    if let Some(policy) = &cli.color_policy {
        config.decoder.color_type_policy = ColorTypePolicy::from_str(policy)?;
    }

    Ok(config)
}

/// 返回 `Ok(false)` 表示查询完成但结果不满足期望。
async fn run(cli: Cli) -> Result<bool, AppError> {
    let config = load_config(&cli)?;

    match cli.command {
        Command::Info { path } => {
            print_info(&path, &config)?;
            Ok(true)
        }
        Command::Pixel {
            path,
            x,
            y,
            expect,
            tolerance,
        } => {
            let expected = expect.as_deref().map(parse_color).transpose()?;
            let tolerance = tolerance.unwrap_or(config.default_tolerance);
            let sampler = PixelSampler::new(config.decoder);
            Ok(report_pixel(&sampler, &path, x, y, expected, tolerance))
        }
        #[cfg(unix)]
        Command::Capture { out, at } => capture(config, out, at).await,
    }
}

fn print_info(path: &Path, config: &HarnessConfig) -> Result<(), AppError> {
    let bytes = std::fs::read(path)?;
    let format = raster::sniff(&bytes)?;
    let image = raster::decode_bytes(&bytes, &config.decoder)?;

    println!(
        "{}: {} {}x{} bpp={}",
        path.display(),
        format,
        image.width(),
        image.height(),
        image.bytes_per_pixel()
    );
    Ok(())
}

fn parse_color(text: &str) -> Result<Rgb, AppError> {
    Rgb::parse(text).ok_or_else(|| AppError::Config(format!("无法解析颜色: {text}")))
}

fn report_pixel(
    sampler: &PixelSampler,
    path: &Path,
    x: u32,
    y: u32,
    expected: Option<Rgb>,
    tolerance: u8,
) -> bool {
    let actual = sampler.pixel_at(path, x, y);
    match actual {
        Some(rgb) => println!("({},{}) = {}", x, y, rgb),
        None => println!("({},{}) unavailable", x, y),
    }

    match expected {
        Some(expected) => {
            let matched = approximately_equals(actual, expected, tolerance);
            println!(
                "{} expected {} tolerance {}",
                if matched { "MATCH" } else { "MISMATCH" },
                expected,
                tolerance
            );
            matched
        }
        None => actual.is_some(),
    }
}

#[cfg(unix)]
async fn capture(
    config: HarnessConfig,
    out: Option<PathBuf>,
    at: Option<Vec<u32>>,
) -> Result<bool, AppError> {
    use screen_probe::harness::QemuMonitor;

    let path = out.unwrap_or_else(|| config.screenshot_path.clone());
    let sampler = PixelSampler::new(config.decoder.clone());
    let mut monitor = QemuMonitor::connect(config).await?;
    monitor.screendump(&path, &sampler).await?;
    println!("{}", path.display());

    match at.as_deref() {
        Some(&[x, y]) => Ok(report_pixel(&sampler, &path, x, y, None, 0)),
        _ => Ok(true),
    }
}
