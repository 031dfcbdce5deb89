// 该文件是 Haixun （海巡） 项目的一部分。
// src/output/ndvi_map.rs - NDVI 伪彩色图
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

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::model::NdviField;

const INVALID_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

// 红-黄-绿色带，覆盖 NDVI [-1, 1]
const RAMP: [(f64, [u8; 3]); 5] = [
  (-1.0, [165, 0, 38]),
  (-0.5, [244, 109, 67]),
  (0.0, [255, 255, 191]),
  (0.5, [102, 189, 99]),
  (1.0, [0, 104, 55]),
];

fn ramp_color(ndvi: f64) -> Rgb<u8> {
  let ndvi = ndvi.clamp(-1.0, 1.0);
  for pair in RAMP.windows(2) {
    let (lo, lo_color) = pair[0];
    let (hi, hi_color) = pair[1];
    if ndvi <= hi {
      let t = (ndvi - lo) / (hi - lo);
      let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
      return Rgb([
        mix(lo_color[0], hi_color[0]),
        mix(lo_color[1], hi_color[1]),
        mix(lo_color[2], hi_color[2]),
      ]);
    }
  }
  Rgb(RAMP[RAMP.len() - 1].1)
}

/// 把 NDVI 场渲染为伪彩色图，无效像素为白色
pub fn render_ndvi(field: &NdviField) -> RgbImage {
  RgbImage::from_fn(field.width() as u32, field.height() as u32, |x, y| {
    field
      .get(x as usize, y as usize)
      .map(ramp_color)
      .unwrap_or(INVALID_COLOR)
  })
}

/// 按采样序号保存 `ndvi_map_NNN.png`
#[derive(Debug, Clone)]
pub struct NdviMapWriter {
  directory: PathBuf,
}

impl NdviMapWriter {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
    }
  }

  pub fn map_path(&self, index: usize) -> PathBuf {
    self.directory.join(format!("ndvi_map_{:03}.png", index))
  }

  pub fn save(&self, index: usize, field: &NdviField) -> Result<PathBuf, image::ImageError> {
    let path = self.map_path(index);
    render_ndvi(field).save(&path)?;
    debug!("保存 NDVI 图: {}", path.display());
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::BgrFrame;

  #[test]
  fn ramp_endpoints_and_midpoint() {
    assert_eq!(ramp_color(-1.0), Rgb([165, 0, 38]));
    assert_eq!(ramp_color(0.0), Rgb([255, 255, 191]));
    assert_eq!(ramp_color(1.0), Rgb([0, 104, 55]));
    assert_eq!(ramp_color(7.0), Rgb([0, 104, 55]));
  }

  #[test]
  fn invalid_pixels_are_white() {
    // 第一行 NDVI = 0，第二行全部低于下限
    let mut frame = BgrFrame::filled(2, 3, [80, 80, 80]);
    for pixel in frame.as_mut()[9..].chunks_exact_mut(3) {
      pixel.copy_from_slice(&[0, 0, 200]);
    }
    let image = render_ndvi(&NdviField::from_frame(&frame));
    assert_eq!(image.dimensions(), (3, 2));
    assert_eq!(*image.get_pixel(1, 0), Rgb([255, 255, 191]));
    assert_eq!(*image.get_pixel(2, 1), INVALID_COLOR);
  }

  #[test]
  fn map_is_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let writer = NdviMapWriter::new(dir.path());
    let field = NdviField::from_frame(&BgrFrame::filled(4, 4, [10, 10, 10]));
    let path = writer.save(3, &field).unwrap();
    assert_eq!(path, dir.path().join("ndvi_map_003.png"));
    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (4, 4));
  }
}
