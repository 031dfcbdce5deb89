// 该文件是 Haixun （海巡） 项目的一部分。
// src/record.rs - 日志记录行
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

use chrono::{DateTime, Local};
use serde_json::{Value, json};

use crate::{
  input::PositionFix,
  model::{Classification, EnvironmentalEstimate},
};

/// 日志中时间戳的格式（本地时间）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 可写入表格日志的一行
pub trait LogRow {
  /// 表头，列数与 `fields` 一致
  const HEADER: &'static [&'static str];

  fn fields(&self) -> Vec<String>;

  fn to_json(&self) -> Value;
}

fn timestamp_field(timestamp: &DateTime<Local>) -> String {
  timestamp.format(TIMESTAMP_FORMAT).to_string()
}

// 缺失的叶绿素在 CSV 里写作 nan
fn optional_field(value: Option<f64>) -> String {
  value
    .map(|v| v.to_string())
    .unwrap_or_else(|| String::from("nan"))
}

/// 一轮完整采样的记录，落盘后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
  pub timestamp: DateTime<Local>,
  pub fix: PositionFix,
  pub estimate: EnvironmentalEstimate,
  pub classification: Classification,
}

impl LogRow for SampleRecord {
  const HEADER: &'static [&'static str] = &[
    "Date",
    "Latitude",
    "Longitude",
    "SST",
    "Chlor-a",
    "Fish_Type",
    "Est_Quantity",
  ];

  fn fields(&self) -> Vec<String> {
    vec![
      timestamp_field(&self.timestamp),
      self.fix.latitude.to_string(),
      self.fix.longitude.to_string(),
      self.estimate.sst.to_string(),
      optional_field(self.estimate.chlorophyll_a),
      self.classification.label(),
      self.classification.estimated_quantity.to_string(),
    ]
  }

  fn to_json(&self) -> Value {
    json!({
      "date": timestamp_field(&self.timestamp),
      "latitude": self.fix.latitude,
      "longitude": self.fix.longitude,
      "sst": self.estimate.sst,
      "chlorophyll_a": self.estimate.chlorophyll_a,
      "fish_type": self.classification.label(),
      "estimated_quantity": self.classification.estimated_quantity,
    })
  }
}

/// `gps-logger` 的一行
#[derive(Debug, Clone, PartialEq)]
pub struct GpsRecord {
  pub timestamp: DateTime<Local>,
  pub fix: PositionFix,
}

impl LogRow for GpsRecord {
  const HEADER: &'static [&'static str] = &["Timestamp", "Latitude", "Longitude"];

  fn fields(&self) -> Vec<String> {
    vec![
      timestamp_field(&self.timestamp),
      self.fix.latitude.to_string(),
      self.fix.longitude.to_string(),
    ]
  }

  fn to_json(&self) -> Value {
    json!({
      "timestamp": timestamp_field(&self.timestamp),
      "latitude": self.fix.latitude,
      "longitude": self.fix.longitude,
    })
  }
}

/// `sst-logger` 的一行，温度保留 2 位小数
#[derive(Debug, Clone, PartialEq)]
pub struct SstRecord {
  pub timestamp: DateTime<Local>,
  pub air_temperature: f64,
  pub sst: f64,
}

impl LogRow for SstRecord {
  const HEADER: &'static [&'static str] = &["Timestamp", "Air_Temperature_C", "Estimated_SST_C"];

  fn fields(&self) -> Vec<String> {
    vec![
      timestamp_field(&self.timestamp),
      format!("{:.2}", self.air_temperature),
      format!("{:.2}", self.sst),
    ]
  }

  fn to_json(&self) -> Value {
    json!({
      "timestamp": timestamp_field(&self.timestamp),
      "air_temperature_c": self.air_temperature,
      "estimated_sst_c": self.sst,
    })
  }
}

/// `ndvi-logger` 的一行
#[derive(Debug, Clone, PartialEq)]
pub struct ChlorophyllRecord {
  pub timestamp: DateTime<Local>,
  pub chlorophyll_a: Option<f64>,
}

impl LogRow for ChlorophyllRecord {
  const HEADER: &'static [&'static str] = &["Date", "Chlor-a"];

  fn fields(&self) -> Vec<String> {
    vec![
      timestamp_field(&self.timestamp),
      optional_field(self.chlorophyll_a),
    ]
  }

  fn to_json(&self) -> Value {
    json!({
      "date": timestamp_field(&self.timestamp),
      "chlorophyll_a": self.chlorophyll_a,
    })
  }
}
