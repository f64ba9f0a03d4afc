//! # 截图解码模块（raster）
//!
//! ## 设计思路
//!
//! 虚拟机截图只会以两种容器落盘：QEMU 无显示模式输出的二进制 PPM（P6），
//! 以及带显示后端时输出的 PNG。模块按职责拆分，避免单文件膨胀：
//!
//! - `sniff`：魔数识别 + 分发
//! - `ppm`：P6 头部 token 化与样本拷贝
//! - `png`：chunk 遍历、IHDR/IDAT 提取、inflate
//! - `filter`：五种扫描线过滤的正反变换（含 Paeth）
//! - `image`：统一输出模型 `Image` 与 `Rgb`
//! - `config/error`：配置与错误
//!
//! ## 调用链
//!
//! ```text
//! decode_file(path)
//!    ↓ std::fs::read
//! sniff(bytes) ──┬─ ppm::decode
//!                └─ png::decode ─ ChunkReader → inflate → filter::unfilter_rows
//!    ↓
//! Image { width, height, bytes_per_pixel, bytes }
//! ```
//!
//! 解码要么完整成功，要么不产出 `Image`；所有越界读取都以具名错误返回。

mod config;
mod error;
pub mod filter;
mod image;
pub mod png;
pub mod ppm;
mod sniff;

pub use config::{ColorTypePolicy, DecoderConfig};
pub use error::DecodeError;
pub use filter::FilterType;
pub use image::{Image, Rgb};
pub use sniff::{ContainerFormat, decode_bytes, decode_file, sniff};
