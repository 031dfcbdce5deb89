// 该文件是 Haixun （海巡） 项目的一部分。
// src/frame.rs - BGR 帧定义
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

use image::RgbImage;

const BGR_CHANNELS: usize = 3;

/// 交错存储（H × W × C）的 BGR 帧
///
/// 通道 0 为蓝色、通道 2 为红色，与相机静态图解码后的通道顺序一致。
/// 叶绿素回归系数就是按照这一顺序标定的，不要改成 RGB。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrFrame {
  width: usize,
  height: usize,
  data: Box<[u8]>,
}

impl BgrFrame {
  /// 使用交错的 BGR 数据创建帧，长度不匹配时返回 `None`
  pub fn from_raw(height: usize, width: usize, data: Vec<u8>) -> Option<Self> {
    if data.len() != BGR_CHANNELS * width * height {
      return None;
    }
    Some(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  /// 所有像素取同一 BGR 值
  pub fn filled(height: usize, width: usize, bgr: [u8; 3]) -> Self {
    let data = bgr
      .iter()
      .copied()
      .cycle()
      .take(BGR_CHANNELS * width * height)
      .collect::<Vec<u8>>();
    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn pixel_count(&self) -> usize {
    self.width * self.height
  }

  pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let index = (y * self.width + x) * BGR_CHANNELS;
    Some([self.data[index], self.data[index + 1], self.data[index + 2]])
  }

  /// 按行优先顺序遍历像素
  pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
    self
      .data
      .chunks_exact(BGR_CHANNELS)
      .map(|p| [p[0], p[1], p[2]])
  }
}

impl AsRef<[u8]> for BgrFrame {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

impl AsMut<[u8]> for BgrFrame {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

impl From<RgbImage> for BgrFrame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut data = image.into_raw();
    for pixel in data.chunks_exact_mut(BGR_CHANNELS) {
      pixel.swap(0, 2);
    }
    Self {
      width: width as usize,
      height: height as usize,
      data: data.into_boxed_slice(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn rgb_image_is_stored_as_bgr() {
    let mut image = RgbImage::new(2, 1);
    image.put_pixel(0, 0, Rgb([10, 20, 30]));
    image.put_pixel(1, 0, Rgb([200, 100, 0]));

    let frame = BgrFrame::from(image);
    assert_eq!(frame.width(), 2);
    assert_eq!(frame.height(), 1);
    assert_eq!(frame.pixel(0, 0), Some([30, 20, 10]));
    assert_eq!(frame.pixel(1, 0), Some([0, 100, 200]));
    assert_eq!(frame.pixel(2, 0), None);
  }

  #[test]
  fn from_raw_rejects_wrong_length() {
    assert!(BgrFrame::from_raw(2, 2, vec![0; 11]).is_none());
    assert!(BgrFrame::from_raw(2, 2, vec![0; 12]).is_some());
  }

  #[test]
  fn filled_frame_has_uniform_pixels() {
    let frame = BgrFrame::filled(4, 5, [7, 8, 9]);
    assert_eq!(frame.pixel_count(), 20);
    assert!(frame.pixels().all(|p| p == [7, 8, 9]));
  }
}
