// 该文件是 Haixun （海巡） 项目的一部分。
// src/model/survey.rs - 单次采样的估算流程
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

use std::convert::Infallible;

use tracing::debug;

use crate::{
  frame::BgrFrame,
  model::{
    Classification, EnvironmentalEstimate, Model, NdviField, classify, estimate_sst, round_to,
  },
};

const SST_DIGITS: i32 = 2;
const CHLOROPHYLL_DIGITS: i32 = 4;

/// 一轮采样获得的原始观测
#[derive(Debug, Clone)]
pub struct Observation {
  pub air_temperature: f64,
  pub frame: BgrFrame,
}

#[derive(Debug, Clone)]
pub struct SurveyEstimate {
  pub estimate: EnvironmentalEstimate,
  pub classification: Classification,
  pub ndvi: NdviField,
}

/// 依次运行海温、叶绿素和鱼类三个估计器
///
/// 海温保留 2 位、叶绿素保留 4 位小数后再分类，使日志中的数值能复现同一分类结果。
#[derive(Debug, Default, Clone, Copy)]
pub struct SurveyModel;

impl Model for SurveyModel {
  type Input = Observation;
  type Output = SurveyEstimate;
  type Error = Infallible;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let sst = round_to(estimate_sst(input.air_temperature), SST_DIGITS);

    let ndvi = NdviField::from_frame(&input.frame);
    debug!(
      "NDVI 有效像素: {}/{}",
      ndvi.valid_count(),
      ndvi.total_count()
    );
    let chlorophyll_a = ndvi
      .chlorophyll_a()
      .map(|chl| round_to(chl, CHLOROPHYLL_DIGITS));

    let classification = match chlorophyll_a {
      Some(chl) => classify(sst, chl),
      None => Classification::none(),
    };

    Ok(SurveyEstimate {
      estimate: EnvironmentalEstimate { sst, chlorophyll_a },
      classification,
      ndvi,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::FishSpecies;

  #[test]
  fn uniform_frame_runs_full_pipeline() {
    let observation = Observation {
      air_temperature: 20.0,
      frame: BgrFrame::filled(8, 8, [90, 90, 90]),
    };
    let result = SurveyModel.infer(&observation).unwrap();

    // 0.3832 * 20 + 12.154 = 19.818 -> 19.82
    assert_eq!(result.estimate.sst, 19.82);
    assert_eq!(result.estimate.chlorophyll_a, Some(0.601));
    // (19.82, 0.601) 不在任何规则区间内
    assert_eq!(result.classification, Classification::none());
  }

  #[test]
  fn no_valid_pixels_degrades_to_none() {
    let observation = Observation {
      air_temperature: 30.0,
      frame: BgrFrame::filled(4, 4, [0, 0, 255]),
    };
    let result = SurveyModel.infer(&observation).unwrap();
    assert_eq!(result.estimate.chlorophyll_a, None);
    assert_eq!(result.classification, Classification::none());
    assert_eq!(result.ndvi.valid_count(), 0);
  }

  #[test]
  fn matching_observation_is_classified() {
    // 气温 28 → 海温 23.81；NDVI 约 0.0345 → 叶绿素约 0.89
    let observation = Observation {
      air_temperature: 28.0,
      frame: BgrFrame::filled(2, 2, [60, 0, 56]),
    };
    let result = SurveyModel.infer(&observation).unwrap();
    assert_eq!(result.estimate.sst, 23.81);
    let chl = result.estimate.chlorophyll_a.unwrap();
    assert!(chl > 0.8 && chl < 1.0);
    assert_eq!(result.classification.species, Some(FishSpecies::Sardine));
  }
}
