// 该文件是 Haixun （海巡） 项目的一部分。
// src/model/fish.rs - 鱼类规则分类
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

use super::{Classification, WithLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FishSpecies {
  Sardine,
  Tuna,
  Mackerel,
  Shrimp,
  Baga,
  Mullets,
  Anchovy,
  Grouper,
  SeaBream,
  Barracuda,
  Snapper,
  Trevally,
  Rabbitfish,
  Emperor,
  Jackfish,
  Spadefish,
  Marlin,
  Grunt,
  Needlefish,
  Parrotfish,
}

impl WithLabel for FishSpecies {
  fn to_label_str(&self) -> String {
    let label = match self {
      FishSpecies::Sardine => "Sardine",
      FishSpecies::Tuna => "Tuna",
      FishSpecies::Mackerel => "Mackerel",
      FishSpecies::Shrimp => "Shrimp",
      FishSpecies::Baga => "Baga",
      FishSpecies::Mullets => "Mullets",
      FishSpecies::Anchovy => "Anchovy",
      FishSpecies::Grouper => "Grouper",
      FishSpecies::SeaBream => "Sea Bream",
      FishSpecies::Barracuda => "Barracuda",
      FishSpecies::Snapper => "Snapper",
      FishSpecies::Trevally => "Trevally",
      FishSpecies::Rabbitfish => "Rabbitfish",
      FishSpecies::Emperor => "Emperor",
      FishSpecies::Jackfish => "Jackfish",
      FishSpecies::Spadefish => "Spadefish",
      FishSpecies::Marlin => "Marlin",
      FishSpecies::Grunt => "Grunt",
      FishSpecies::Needlefish => "Needlefish",
      FishSpecies::Parrotfish => "Parrotfish",
    };
    label.to_string()
  }
}

/// 一条规则：温度与叶绿素区间（均为闭区间）及最大数量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FishRule {
  pub species: FishSpecies,
  pub t_min: f64,
  pub t_max: f64,
  pub c_min: f64,
  pub c_max: f64,
  pub max_quantity: u32,
}

impl FishRule {
  const fn new(
    species: FishSpecies,
    t_min: f64,
    t_max: f64,
    c_min: f64,
    c_max: f64,
    max_quantity: u32,
  ) -> Self {
    Self {
      species,
      t_min,
      t_max,
      c_min,
      c_max,
      max_quantity,
    }
  }

  pub fn matches(&self, temperature: f64, chlorophyll_a: f64) -> bool {
    self.t_min <= temperature
      && temperature <= self.t_max
      && self.c_min <= chlorophyll_a
      && chlorophyll_a <= self.c_max
  }

  /// 两个轴上离区间中心的归一化接近度的平均，下限为 0
  pub fn score(&self, temperature: f64, chlorophyll_a: f64) -> f64 {
    let t_score = closeness(temperature, self.t_min, self.t_max);
    let c_score = closeness(chlorophyll_a, self.c_min, self.c_max);
    ((t_score + c_score) / 2.0).max(0.0)
  }

  pub fn estimate_quantity(&self, temperature: f64, chlorophyll_a: f64) -> u32 {
    let quantity = (self.score(temperature, chlorophyll_a) * f64::from(self.max_quantity)).floor();
    (quantity as u32).min(self.max_quantity)
  }
}

fn closeness(value: f64, min: f64, max: f64) -> f64 {
  let center = (min + max) / 2.0;
  let half_width = (max - min) / 2.0;
  1.0 - (value - center).abs() / half_width
}

/// 规则表。区间互有重叠，按声明顺序取第一条命中的规则，顺序本身就是规则的一部分。
pub const FISH_RULES: [FishRule; 20] = [
  FishRule::new(FishSpecies::Sardine, 22.0, 27.0, 0.5, 1.5, 500),
  FishRule::new(FishSpecies::Tuna, 24.0, 30.0, 0.0, 0.7, 300),
  FishRule::new(FishSpecies::Mackerel, 18.0, 24.0, 0.8, 2.0, 400),
  FishRule::new(FishSpecies::Shrimp, 25.0, 30.0, 1.0, 3.0, 350),
  FishRule::new(FishSpecies::Baga, 20.0, 26.0, 0.6, 1.8, 200),
  FishRule::new(FishSpecies::Mullets, 21.0, 25.0, 1.5, 3.0, 250),
  FishRule::new(FishSpecies::Anchovy, 23.0, 28.0, 0.3, 1.0, 450),
  FishRule::new(FishSpecies::Grouper, 26.0, 31.0, 0.4, 1.2, 180),
  FishRule::new(FishSpecies::SeaBream, 19.0, 23.0, 2.0, 3.5, 300),
  FishRule::new(FishSpecies::Barracuda, 28.0, 32.0, 0.0, 0.5, 100),
  FishRule::new(FishSpecies::Snapper, 26.0, 29.0, 1.2, 2.5, 280),
  FishRule::new(FishSpecies::Trevally, 25.0, 28.0, 0.8, 1.5, 320),
  FishRule::new(FishSpecies::Rabbitfish, 22.0, 26.0, 0.9, 2.2, 260),
  FishRule::new(FishSpecies::Emperor, 27.0, 31.0, 0.6, 1.3, 220),
  FishRule::new(FishSpecies::Jackfish, 24.0, 29.0, 0.5, 1.1, 270),
  FishRule::new(FishSpecies::Spadefish, 20.0, 25.0, 1.2, 2.8, 210),
  FishRule::new(FishSpecies::Marlin, 29.0, 33.0, 0.0, 0.4, 90),
  FishRule::new(FishSpecies::Grunt, 18.0, 22.0, 1.5, 3.0, 150),
  FishRule::new(FishSpecies::Needlefish, 21.0, 26.0, 0.4, 1.0, 130),
  FishRule::new(FishSpecies::Parrotfish, 24.0, 30.0, 0.9, 2.0, 200),
];

/// 按规则表估计鱼种与数量
///
/// 全函数：任一输入为 NaN 时所有区间比较都不成立，结果为 `None`/0。
pub fn classify(temperature: f64, chlorophyll_a: f64) -> Classification {
  FISH_RULES
    .iter()
    .find(|rule| rule.matches(temperature, chlorophyll_a))
    .map(|rule| Classification {
      species: Some(rule.species),
      estimated_quantity: rule.estimate_quantity(temperature, chlorophyll_a),
    })
    .unwrap_or(Classification::none())
}
