// 该文件是 Haixun （海巡） 项目的一部分。
// src/output/directory_record.rs - 采样会话目录
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

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

const SESSION_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 一次运行的输出目录: `<parent>/<prefix>_<%Y-%m-%d_%H-%M-%S>/`
#[derive(Debug, Clone)]
pub struct SessionDirectory {
  directory: PathBuf,
}

impl SessionDirectory {
  pub fn create(
    parent: impl AsRef<Path>,
    prefix: &str,
    started: DateTime<Local>,
  ) -> Result<Self, std::io::Error> {
    let directory = parent
      .as_ref()
      .join(format!("{}_{}", prefix, started.format(SESSION_FORMAT)));
    std::fs::create_dir_all(&directory)?;
    info!("输出目录: {}", directory.display());
    Ok(Self { directory })
  }

  pub fn path(&self) -> &Path {
    &self.directory
  }

  pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
    self.directory.join(name)
  }
}
