// 该文件是 Haixun （海巡） 项目的一部分。
// src/model/ndvi.rs - NDVI 与叶绿素 a 估计
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

//! # NDVI 与叶绿素 a
//!
//! 相机没有真正的近红外波段。这里用通道 0（蓝色）代替近红外、通道 2（红色）
//! 作为红光，属于已知的近似处理。回归系数正是针对这一映射拟合的，
//! 调整通道映射会使系数失效。

use crate::frame::BgrFrame;

/// 分母修正项，避免两个通道同为 0 时除零
pub const NDVI_EPSILON: f64 = 1e-5;

/// 低于该值的 NDVI 视为无数据
pub const NDVI_VALID_FLOOR: f64 = -0.2;

/// 二次回归系数 `(a, b, c)`：`chl = a·ndvi² + b·ndvi + c`
pub const CHLOROPHYLL_COEFFICIENTS: (f64, f64, f64) = (3.5106, 8.3298, 0.601);

const PSEUDO_NIR_CHANNEL: usize = 0;
const RED_CHANNEL: usize = 2;

/// 逐像素 NDVI，`None` 表示该像素无效
#[derive(Debug, Clone, PartialEq)]
pub struct NdviField {
  width: usize,
  height: usize,
  values: Box<[Option<f64>]>,
}

impl NdviField {
  pub fn from_frame(frame: &BgrFrame) -> Self {
    let values = frame
      .pixels()
      .map(|pixel| {
        let nir = f64::from(pixel[PSEUDO_NIR_CHANNEL]);
        let red = f64::from(pixel[RED_CHANNEL]);
        pixel_ndvi(nir, red)
      })
      .collect::<Vec<_>>();

    Self {
      width: frame.width(),
      height: frame.height(),
      values: values.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn get(&self, x: usize, y: usize) -> Option<f64> {
    if x >= self.width || y >= self.height {
      return None;
    }
    self.values[y * self.width + x]
  }

  pub fn valid_count(&self) -> usize {
    self.values.iter().filter(|v| v.is_some()).count()
  }

  pub fn total_count(&self) -> usize {
    self.values.len()
  }

  /// 有效像素的平均 NDVI，没有有效像素时返回 `None`
  pub fn mean(&self) -> Option<f64> {
    let (sum, count) = self
      .values
      .iter()
      .flatten()
      .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
      None
    } else {
      Some(sum / count as f64)
    }
  }

  /// 由平均 NDVI 推算叶绿素 a
  pub fn chlorophyll_a(&self) -> Option<f64> {
    self.mean().map(chlorophyll_from_ndvi)
  }
}

fn pixel_ndvi(nir: f64, red: f64) -> Option<f64> {
  let denominator = nir + red + NDVI_EPSILON;
  if denominator.abs() < f64::MIN_POSITIVE {
    return None;
  }
  let ndvi = (nir - red) / denominator;
  if !ndvi.is_finite() || ndvi < NDVI_VALID_FLOOR {
    None
  } else {
    Some(ndvi)
  }
}

fn chlorophyll_from_ndvi(ndvi: f64) -> f64 {
  let (a, b, c) = CHLOROPHYLL_COEFFICIENTS;
  a * ndvi * ndvi + b * ndvi + c
}

/// 由整幅图像估计叶绿素 a，全部像素无效时返回 `None`
pub fn estimate_chlorophyll(frame: &BgrFrame) -> Option<f64> {
  NdviField::from_frame(frame).chlorophyll_a()
}
