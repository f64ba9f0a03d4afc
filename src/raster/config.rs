//! # 解码配置
//!
//! ## 设计思路
//!
//! 把“可调策略”集中到 `DecoderConfig`：像素/内存上限在分配缓冲之前生效，
//! 颜色类型策略决定遇到未知 PNG 颜色类型时是按 3 字节兜底还是直接报错。
//!
//! ## 实现思路
//!
//! - `Default` 提供与截图场景匹配的宽松配置。
//! - `ColorTypePolicy` 负责策略字符串解析与反向输出，便于写进 JSON 配置。
//! - `check_dimensions` 在解析出宽高后、分配像素缓冲前调用。

use serde::{Deserialize, Serialize};

use super::DecodeError;

/// 解码配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码缓冲允许的最大字节数（按输出 bpp 估算）。
    pub max_decoded_bytes: u64,
    /// 未知 PNG 颜色类型的处理策略。
    pub color_type_policy: ColorTypePolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            color_type_policy: ColorTypePolicy::Permissive,
        }
    }
}

/// PNG 颜色类型策略。
///
/// - `Permissive`：只识别 2（RGB）与 6（RGBA），其余按 3 字节/像素兜底
/// - `Strict`：除 2 与 6 外一律报 `Unsupported`
///
/// 索引色（类型 3）在两种策略下都会被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTypePolicy {
    #[default]
    Permissive,
    Strict,
}

impl ColorTypePolicy {
    /// 从外部字符串解析策略。
    ///
    /// # 示例
    /// ```
    /// use screen_probe::raster::ColorTypePolicy;
    ///
    /// let p = ColorTypePolicy::from_str("strict")?;
    /// assert_eq!(p.as_str(), "strict");
    /// # Ok::<(), screen_probe::raster::DecodeError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(policy: &str) -> Result<Self, DecodeError> {
        match policy.trim().to_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(DecodeError::Unsupported(format!(
                "未知颜色类型策略：{}（可选：permissive / strict）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }
}

impl DecoderConfig {
    /// 校验宽高与输出缓冲大小，返回输出缓冲长度（字节）。
    pub(crate) fn check_dimensions(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<usize, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::MalformedHeader(format!(
                "宽高必须为正数：{}x{}",
                width, height
            )));
        }

        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| DecodeError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(DecodeError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_decoded_pixels
            )));
        }

        let bytes = pixels
            .checked_mul(bytes_per_pixel as u64)
            .ok_or_else(|| DecodeError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if bytes > self.max_decoded_bytes {
            return Err(DecodeError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                bytes as f64 / 1024.0 / 1024.0,
                self.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        usize::try_from(bytes)
            .map_err(|_| DecodeError::ResourceLimit("图片缓冲超出地址空间".to_string()))
    }
}
