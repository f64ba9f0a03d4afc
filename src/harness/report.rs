//! # 检查结果汇总
//!
//! 每条检查记录名称、是否通过与诊断信息；像素检查会把实际读到的颜色写进诊断，
//! 失败时不用翻截图也能看出偏差多大。

use std::path::Path;

use crate::raster::Rgb;
use crate::sampler::{PixelSampler, approximately_equals};

/// 单条检查结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

/// 一轮测试的检查记录。
#[derive(Debug, Default)]
pub struct CheckReport {
    outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条检查并原样返回 `passed`，便于调用方链式判断。
    pub fn check(&mut self, name: &str, passed: bool, detail: Option<String>) -> bool {
        let detail_str = detail
            .as_deref()
            .map(|d| format!("  ({d})"))
            .unwrap_or_default();

        if passed {
            log::info!("[PASS] {}{}", name, detail_str);
        } else {
            log::warn!("[FAIL] {}{}", name, detail_str);
        }

        self.outcomes.push(CheckOutcome {
            name: name.to_string(),
            passed,
            detail,
        });
        passed
    }

    /// 不计入结果的说明信息。
    pub fn info(&self, message: &str) {
        log::info!("[INFO] {}", message);
    }

    /// 像素检查：`(x, y)` 处颜色在 `tolerance` 内接近 `expected`。
    pub fn check_pixel(
        &mut self,
        sampler: &PixelSampler,
        name: &str,
        path: &Path,
        (x, y): (u32, u32),
        expected: Rgb,
        tolerance: u8,
    ) -> bool {
        let actual = sampler.pixel_at(path, x, y);
        let passed = approximately_equals(actual, expected, tolerance);
        let detail = match actual {
            Some(rgb) => format!("got {} at ({},{}), expected {}", rgb, x, y, expected),
            None => format!("pixel unavailable at ({},{})", x, y),
        };
        self.check(name, passed, Some(detail))
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    /// `(通过数, 总数)`。
    pub fn summary(&self) -> (usize, usize) {
        let passed = self.outcomes.iter().filter(|o| o.passed).count();
        (passed, self.outcomes.len())
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}
