// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::PathBuf;

use tracing::error;
use url::Url;

use super::{Camera, CaptureError, InputError, decode_still};
use crate::{FromUrl, FromUrlWithScheme, frame::BgrFrame, url_path};

/// 每次拍摄都重新读取同一图像文件
///
/// 适合由外部程序定期覆盖写入的静态图，URL 格式: `image:///path/to/still.jpg`
#[derive(Debug, Clone)]
pub struct ImageFileInput {
  path: PathBuf,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
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

    Ok(ImageFileInput {
      path: url_path(url),
    })
  }
}

impl Camera for ImageFileInput {
  fn capture(&mut self, _index: usize) -> Result<BgrFrame, CaptureError> {
    decode_still(&self.path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn reads_still_as_bgr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    RgbImage::from_pixel(3, 2, Rgb([200, 10, 40])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap();
    let frame = input.capture(0).unwrap();
    assert_eq!((frame.width(), frame.height()), (3, 2));
    assert_eq!(frame.pixel(0, 0), Some([40, 10, 200]));
  }

  #[test]
  fn missing_file_is_no_image() {
    let mut input = ImageFileInput {
      path: PathBuf::from("/nonexistent/haixun/still.jpg"),
    };
    assert!(matches!(input.capture(0), Err(CaptureError::NoImage(_))));
  }

  #[test]
  fn undecodable_file_is_a_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"not a jpeg").unwrap();
    let mut input = ImageFileInput { path };
    assert!(matches!(
      input.capture(0),
      Err(CaptureError::DecodeError(_))
    ));
  }
}
