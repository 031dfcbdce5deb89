// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/v4l_input.rs - V4L 单帧拍摄
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

use tracing::{debug, error, info};
use url::Url;
use v4l::{FourCC, io::traits::CaptureStream, video::Capture};

use super::{Camera, CaptureError, InputError, query_param};
use crate::{FromUrl, FromUrlWithScheme, frame::BgrFrame, url_path, url_query};

const RGB3: &[u8; 4] = b"RGB3";
const DEFAULT_DEVICE: &str = "/dev/video0";
const DEFAULT_SKIP_FRAMES: usize = 2;

/// 从 V4L2 设备抓取一帧 RGB24 图像
///
/// URL 格式: `v4l:///dev/video0?width=640&height=480&skip=2`，
/// `skip` 为丢弃的预热帧数，让自动曝光先稳定下来。
pub struct V4lInput {
  device_path: String,
  width: u32,
  height: u32,
  skip_frames: usize,
}

impl FromUrlWithScheme for V4lInput {
  const SCHEME: &'static str = "v4l";
}

impl FromUrl for V4lInput {
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

    let device_path = match url.path() {
      "" | "/" => DEFAULT_DEVICE.to_string(),
      _ => url_path(url).to_string_lossy().into_owned(),
    };

    let query = url_query(url);
    let width = query_param(&query, "width", 640u32)?;
    let height = query_param(&query, "height", 480u32)?;
    let skip_frames = query_param(&query, "skip", DEFAULT_SKIP_FRAMES)?;

    info!("使用 V4L2 设备: {} ({}x{})", device_path, width, height);

    Ok(V4lInput {
      device_path,
      width,
      height,
      skip_frames,
    })
  }
}

impl V4lInput {
  fn open_device(&self) -> Result<v4l::Device, CaptureError> {
    let device = v4l::Device::with_path(&self.device_path)?;

    let mut format = device.format()?;
    format.width = self.width;
    format.height = self.height;
    format.fourcc = FourCC::new(RGB3);
    let format = device.set_format(&format)?;

    if format.fourcc != FourCC::new(RGB3) {
      return Err(CaptureError::UnsupportedFormat(format.fourcc.to_string()));
    }
    debug!("V4L2 格式: {}x{} {}", format.width, format.height, format.fourcc);

    Ok(device)
  }
}

impl Camera for V4lInput {
  fn capture(&mut self, _index: usize) -> Result<BgrFrame, CaptureError> {
    let mut device = self.open_device()?;
    let format = device.format()?;
    let (width, height) = (format.width as usize, format.height as usize);

    let mut stream =
      v4l::io::mmap::Stream::with_buffers(&mut device, v4l::buffer::Type::VideoCapture, 4)?;
    for _ in 0..self.skip_frames {
      stream.next()?;
    }
    let (buf, _meta) = stream.next()?;

    let size = width * height * 3;
    if buf.len() < size {
      return Err(CaptureError::BufferSizeMismatch {
        expected: size,
        actual: buf.len(),
      });
    }

    let mut data = buf[..size].to_vec();
    for pixel in data.chunks_exact_mut(3) {
      pixel.swap(0, 2);
    }
    BgrFrame::from_raw(height, width, data).ok_or(CaptureError::BufferSizeMismatch {
      expected: size,
      actual: buf.len(),
    })
  }
}
