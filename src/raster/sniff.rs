//! # 容器识别与分发
//!
//! 通过魔数选择解析器：`P6` → PPM，PNG 八字节签名 → PNG，其余报 `UnrecognizedFormat`。
//! 无法识别时借助 `infer` 给出实际类型，便于诊断（例如误存成 JPEG 的截图）。

use std::fmt;
use std::path::Path;
use std::time::Instant;

use super::png::PNG_SIGNATURE;
use super::{DecodeError, DecoderConfig, Image, png, ppm};

/// 支持的容器格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Ppm,
    Png,
}

impl ContainerFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ppm => "ppm",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 检查文件头魔数。
pub fn sniff(bytes: &[u8]) -> Result<ContainerFormat, DecodeError> {
    if bytes.starts_with(b"P6") {
        return Ok(ContainerFormat::Ppm);
    }
    if bytes.starts_with(&PNG_SIGNATURE) {
        return Ok(ContainerFormat::Png);
    }

    if bytes.is_empty() {
        return Err(DecodeError::UnrecognizedFormat("文件内容为空".to_string()));
    }

    let detail = match infer::get(bytes) {
        Some(kind) => format!("检测到 {}，仅支持 PPM(P6) 与 PNG", kind.mime_type()),
        None => format!("文件头 {:02x?} 不是 PPM(P6) 或 PNG", &bytes[..bytes.len().min(8)]),
    };
    Err(DecodeError::UnrecognizedFormat(detail))
}

/// 识别格式并解码内存中的字节。
pub fn decode_bytes(bytes: &[u8], config: &DecoderConfig) -> Result<Image, DecodeError> {
    match sniff(bytes)? {
        ContainerFormat::Ppm => ppm::decode(bytes, config),
        ContainerFormat::Png => png::decode(bytes, config),
    }
}

/// 读取文件并解码。
pub fn decode_file(path: &Path, config: &DecoderConfig) -> Result<Image, DecodeError> {
    let started = Instant::now();
    let bytes = std::fs::read(path)?;
    let format = sniff(&bytes)?;

    let image = match format {
        ContainerFormat::Ppm => ppm::decode(&bytes, config)?,
        ContainerFormat::Png => png::decode(&bytes, config)?,
    };

    log::info!(
        "✅ 截图解码成功 - {} 格式: {} 尺寸: {}x{} bpp: {} 耗时: {}ms",
        path.display(),
        format,
        image.width(),
        image.height(),
        image.bytes_per_pixel(),
        started.elapsed().as_millis()
    );

    Ok(image)
}
