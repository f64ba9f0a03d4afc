//! # 截图解码缓存
//!
//! ## 设计思路
//!
//! 同一张截图通常会被连续查询几十个坐标，按路径缓存解码结果，避免重复解析。
//! 缓存是显式对象而不是全局单例，失效时机完全由调用方掌握：
//!
//! ```text
//! 请求新截图写入 P → invalidate(P) → 查询 P 的像素
//! ```
//!
//! 颠倒这个顺序会读到旧像素，这是调用方的错误，缓存本身从不比对 mtime 或内容哈希。
//!
//! ## 实现思路
//!
//! - `Mutex<HashMap<PathBuf, Arc<Image>>>`：解码 + 插入在同一个临界区内完成，
//!   多线程下同一路径不会被并发重复解码。
//! - 返回 `Arc<Image>`，调用方只能只读访问。
//! - 锁中毒时直接取回内部数据继续使用，映射本身不会处于半更新状态。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::raster::{self, DecodeError, DecoderConfig, Image};

/// 按路径缓存的截图解码结果。
#[derive(Debug, Default)]
pub struct PixelCache {
    config: DecoderConfig,
    entries: Mutex<HashMap<PathBuf, Arc<Image>>>,
}

impl PixelCache {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Image>>> {
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// 获取路径对应的图像；首次访问时读取并解码，之后直接返回缓存。
    ///
    /// 解码失败不会写入缓存，下次访问会重新尝试。
    pub fn get(&self, path: impl AsRef<Path>) -> Result<Arc<Image>, DecodeError> {
        let path = path.as_ref();
        let mut entries = self.lock();

        if let Some(image) = entries.get(path) {
            log::debug!("缓存命中：{}", path.display());
            return Ok(Arc::clone(image));
        }

        log::debug!("缓存未命中，开始解码：{}", path.display());
        let image = Arc::new(raster::decode_file(path, &self.config)?);
        entries.insert(path.to_path_buf(), Arc::clone(&image));
        Ok(image)
    }

    /// 移除路径对应的缓存项，返回是否真的移除了内容。
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let removed = self.lock().remove(path).is_some();
        if removed {
            log::debug!("缓存已失效：{}", path.display());
        }
        removed
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("screen-probe-cache-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_ppm(path: &Path, rgb: [u8; 3]) {
        let mut data = b"P6\n1 1\n255\n".to_vec();
        data.extend_from_slice(&rgb);
        std::fs::write(path, data).expect("write ppm");
    }

    #[test]
    fn get_memoizes_until_invalidated() {
        let dir = unique_temp_dir();
        let path = dir.join("shot.ppm");
        write_ppm(&path, [1, 2, 3]);

        let cache = PixelCache::default();
        let first = cache.get(&path).expect("first decode");
        write_ppm(&path, [9, 9, 9]);
        let second = cache.get(&path).expect("cached decode");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.as_bytes(), &[1, 2, 3]);

        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        let third = cache.get(&path).expect("fresh decode");
        assert_eq!(third.as_bytes(), &[9, 9, 9]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_decode_is_not_cached() {
        let dir = unique_temp_dir();
        let path = dir.join("broken.ppm");
        std::fs::write(&path, b"GIF89a").expect("write junk");

        let cache = PixelCache::default();
        assert!(matches!(cache.get(&path), Err(DecodeError::UnrecognizedFormat(_))));
        assert!(cache.is_empty());

        write_ppm(&path, [4, 5, 6]);
        assert_eq!(cache.get(&path).expect("decode after fix").as_bytes(), &[4, 5, 6]);
        assert_eq!(cache.len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn entries_are_keyed_by_path() {
        let dir = unique_temp_dir();
        let a = dir.join("a.ppm");
        let b = dir.join("b.ppm");
        write_ppm(&a, [10, 0, 0]);
        write_ppm(&b, [0, 20, 0]);

        let cache = PixelCache::default();
        cache.get(&a).expect("decode a");
        cache.get(&b).expect("decode b");
        assert!(cache.contains(&a) && cache.contains(&b));

        cache.invalidate(&a);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));

        cache.clear();
        assert!(cache.is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }
}
