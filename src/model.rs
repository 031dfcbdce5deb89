// 该文件是 Haixun （海巡） 项目的一部分。
// src/model.rs - 估算模型
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

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
}

/// 单次采样的环境估计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentalEstimate {
  /// 海表温度（°C）
  pub sst: f64,
  /// 叶绿素 a 浓度；图像中没有有效 NDVI 像素时为 `None`
  pub chlorophyll_a: Option<f64>,
}

/// 鱼类估计结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub species: Option<FishSpecies>,
  pub estimated_quantity: u32,
}

impl Classification {
  pub const fn none() -> Self {
    Self {
      species: None,
      estimated_quantity: 0,
    }
  }

  /// 写入日志的物种名，未命中时为 `None`
  pub fn label(&self) -> String {
    self
      .species
      .as_ref()
      .map(WithLabel::to_label_str)
      .unwrap_or_else(|| String::from("None"))
  }
}

mod fish;
mod ndvi;
mod sst;
mod survey;

pub use self::fish::{FISH_RULES, FishRule, FishSpecies, classify};
pub use self::ndvi::{
  CHLOROPHYLL_COEFFICIENTS, NDVI_EPSILON, NDVI_VALID_FLOOR, NdviField, estimate_chlorophyll,
};
pub use self::sst::{SST_REGIME_THRESHOLD, estimate_sst};
pub use self::survey::{Observation, SurveyEstimate, SurveyModel};

/// 按小数位数四舍五入，仅用于展示与记录
pub fn round_to(value: f64, digits: i32) -> f64 {
  let scale = 10f64.powi(digits);
  (value * scale).round() / scale
}
