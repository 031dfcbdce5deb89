// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/libcamera_still.rs - libcamera 静态图拍摄
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
  path::{Path, PathBuf},
  process::Command,
};

use tracing::{debug, error};
use url::Url;

use super::{Camera, CaptureError, InputError, decode_still, query_param};
use crate::{FromUrl, FromUrlWithScheme, frame::BgrFrame, url_path, url_query};

const LIBCAMERA_STILL: &str = "libcamera-still";
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// 调用 `libcamera-still` 拍摄一张照片并解码
///
/// URL 格式: `libcamera:///data/frames?width=640&height=480&timeout=1000`，
/// 照片保存为目录下的 `frame_NNN.jpg`。
#[derive(Debug, Clone)]
pub struct LibcameraStill {
  directory: PathBuf,
  program: String,
  width: u32,
  height: u32,
  timeout_ms: u32,
}

impl FromUrlWithScheme for LibcameraStill {
  const SCHEME: &'static str = "libcamera";
}

impl FromUrl for LibcameraStill {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch);
    }

    let query = url_query(url);
    Ok(Self {
      directory: url_path(url),
      program: query
        .get("program")
        .cloned()
        .unwrap_or_else(|| LIBCAMERA_STILL.to_string()),
      width: query_param(&query, "width", DEFAULT_WIDTH)?,
      height: query_param(&query, "height", DEFAULT_HEIGHT)?,
      timeout_ms: query_param(&query, "timeout", DEFAULT_TIMEOUT_MS)?,
    })
  }
}

impl LibcameraStill {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      program: LIBCAMERA_STILL.to_string(),
      width: DEFAULT_WIDTH,
      height: DEFAULT_HEIGHT,
      timeout_ms: DEFAULT_TIMEOUT_MS,
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn frame_path(&self, index: usize) -> PathBuf {
    self.directory.join(format!("frame_{:03}.jpg", index))
  }
}

impl Camera for LibcameraStill {
  fn capture(&mut self, index: usize) -> Result<BgrFrame, CaptureError> {
    let path = self.frame_path(index);
    debug!("拍摄照片: {}", path.display());

    let status = Command::new(&self.program)
      .arg("-o")
      .arg(&path)
      .arg("--width")
      .arg(self.width.to_string())
      .arg("--height")
      .arg(self.height.to_string())
      .arg("--timeout")
      .arg(self.timeout_ms.to_string())
      .status()?;

    if !status.success() {
      return Err(CaptureError::CommandFailed {
        program: self.program.clone(),
        status,
      });
    }

    decode_still(&path)
  }
}
