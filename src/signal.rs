// 该文件是 Haixun （海巡） 项目的一部分。
// src/signal.rs - 停止信号
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  thread,
  time::{Duration, Instant},
};

use tracing::{info, warn};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// 进程内共享的停止标志
///
/// 采样循环在每轮落盘后、轮间等待期间以及等待定位时检查该标志。
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
  raised: Arc<AtomicBool>,
}

impl StopSignal {
  pub fn new() -> Self {
    Self::default()
  }

  /// 注册 Ctrl-C 处理函数；收到信号后 `grace` 时间内仍未退出则强制结束进程
  pub fn install_ctrlc(&self, grace: Duration) -> Result<(), ctrlc::Error> {
    let signal = self.clone();
    ctrlc::set_handler(move || {
      if signal.raised.swap(true, Ordering::SeqCst) {
        return;
      }
      info!("收到中断信号，准备退出...");
      thread::spawn(move || {
        thread::sleep(grace);
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })
  }

  pub fn raise(&self) {
    self.raised.store(true, Ordering::SeqCst);
  }

  pub fn is_raised(&self) -> bool {
    self.raised.load(Ordering::SeqCst)
  }

  /// 可被打断的等待；完整等待结束返回 `true`，期间收到停止信号返回 `false`
  pub fn sleep(&self, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    loop {
      if self.is_raised() {
        return false;
      }
      let now = Instant::now();
      if now >= deadline {
        return true;
      }
      thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
  }
}
