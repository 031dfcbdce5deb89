// 该文件是 Haixun （海巡） 项目的一部分。
// src/model/sst.rs - 海表温度估计
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

/// 冬季/夏季回归分界（°C），恰好等于分界值时按夏季计算
pub const SST_REGIME_THRESHOLD: f64 = 24.0;

// (斜率, 截距)，El-Geziry 等 2023 年的经验回归
const WINTER_REGRESSION: (f64, f64) = (0.3832, 12.154);
const SUMMER_REGRESSION: (f64, f64) = (0.6567, 5.4271);

/// 由近地面气温估计海表温度
///
/// 两段线性模型，分界处不要求连续。
pub fn estimate_sst(air_temperature: f64) -> f64 {
  let (slope, intercept) = if air_temperature < SST_REGIME_THRESHOLD {
    WINTER_REGRESSION
  } else {
    SUMMER_REGRESSION
  };
  slope * air_temperature + intercept
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case(-5.0)]
  #[case(0.0)]
  #[case(18.2)]
  #[case(23.999)]
  fn winter_regime(#[case] t: f64) {
    assert!((estimate_sst(t) - (0.3832 * t + 12.154)).abs() < 1e-12);
  }

  #[rstest]
  #[case(24.0)]
  #[case(24.001)]
  #[case(31.5)]
  #[case(45.0)]
  fn summer_regime(#[case] t: f64) {
    assert!((estimate_sst(t) - (0.6567 * t + 5.4271)).abs() < 1e-12);
  }

  #[test]
  fn boundary_uses_summer_branch() {
    assert!((estimate_sst(24.0) - 21.1879).abs() < 1e-9);
    // 分界两侧不连续
    let below = estimate_sst(24.0 - 1e-9);
    assert!((below - 21.3508).abs() < 1e-6);
  }
}
