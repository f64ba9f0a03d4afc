//! # 像素采样模块（sampler）
//!
//! ## 设计思路
//!
//! 测试脚本只关心“某张截图某个坐标大概是什么颜色”。本模块把
//! 缓存（`PixelCache`）与查询原语（`pixel_at` / `approximately_equals`）组合成
//! `PixelSampler`，对外暴露以路径为入口的查询接口。
//!
//! ## 实现思路
//!
//! - 查询接口不向上抛错：任何解码失败都降级为 `None` 并记 `warn` 日志，
//!   断言层据此报告“像素不可用”，而不是中断整轮测试。
//! - 需要区分失败原因的调用方可以直接使用 `cache().get()`。

mod cache;
mod query;

use std::path::Path;
use std::sync::Arc;

use crate::raster::{DecodeError, DecoderConfig, Image, Rgb};

pub use cache::PixelCache;
pub use query::{approximately_equals, pixel_at};

/// 以路径为入口的像素查询服务。
#[derive(Debug, Default)]
pub struct PixelSampler {
    cache: PixelCache,
}

impl PixelSampler {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            cache: PixelCache::new(config),
        }
    }

    pub fn cache(&self) -> &PixelCache {
        &self.cache
    }

    pub fn image(&self, path: impl AsRef<Path>) -> Result<Arc<Image>, DecodeError> {
        self.cache.get(path)
    }

    /// 读取截图中 `(x, y)` 的颜色；文件不可用或坐标越界时返回 `None`。
    pub fn pixel_at(&self, path: impl AsRef<Path>, x: u32, y: u32) -> Option<Rgb> {
        let path = path.as_ref();
        match self.cache.get(path) {
            Ok(image) => pixel_at(&image, x, y),
            Err(err) => {
                log::warn!(
                    "⚠️ 截图读取失败 ({},{}) {}: [{}] {}",
                    x,
                    y,
                    path.display(),
                    err.code(),
                    err
                );
                None
            }
        }
    }

    /// `(x, y)` 处颜色是否在容差内接近 `expected`。
    pub fn pixel_near(
        &self,
        path: impl AsRef<Path>,
        x: u32,
        y: u32,
        expected: Rgb,
        tolerance: u8,
    ) -> bool {
        approximately_equals(self.pixel_at(path, x, y), expected, tolerance)
    }

    /// 截图被覆盖后必须立即调用。
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        self.cache.invalidate(path)
    }
}
