//! # 截图探针 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              QEMU 客户机 (1024x768 桌面)                  │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ human monitor (Unix socket, 按行文本协议)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            screen_probe (Rust)                   │
//! │                                                          │
//! │  ┌─ harness ──── QemuMonitor (screendump/sendkey/mouse)  │
//! │  │   ├─ cursor         相对位移 ↔ 绝对坐标               │
//! │  │   └─ report         PASS/FAIL 汇总                    │
//! │  │                                                       │
//! │  ├─ sampler ──── PixelSampler (路径 → 像素)              │
//! │  │   └─ cache          Mutex<HashMap<路径, Arc<Image>>>  │
//! │  │                                                       │
//! │  ├─ raster ───── PPM(P6) / PNG 解码                      │
//! │  │   └─ filter         None/Sub/Up/Average/Paeth         │
//! │  │                                                       │
//! │  └─ error ────── AppError (统一错误类型)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，命令行入口的返回类型 |
//! | [`raster`] | 格式识别、PPM/PNG 解码、扫描线过滤 |
//! | [`sampler`] | 解码结果缓存、像素查询与容差比较 |
//! | [`harness`] | 监视器客户端、光标跟踪、检查结果汇总、配置 |

pub mod error;
pub mod harness;
pub mod raster;
pub mod sampler;
