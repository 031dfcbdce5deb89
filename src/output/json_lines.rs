// 该文件是 Haixun （海巡） 项目的一部分。
// src/output/json_lines.rs - JSON Lines 日志
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

use std::{
  fs::{File, OpenOptions},
  io::Write,
  marker::PhantomData,
  path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, output::Persist, record::LogRow, url_path};

pub(crate) const JSONL_SCHEME: &str = "jsonl";

#[derive(Error, Debug)]
pub enum JsonLinesLogError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 每行一个 JSON 对象的日志，与 CSV 日志一样按行追加
///
/// URL 格式: `jsonl:///data/survey/fish_estimation_log.jsonl`
pub struct JsonLinesLog<R> {
  path: PathBuf,
  _record: PhantomData<fn(&R)>,
}

impl<R: LogRow> FromUrlWithScheme for JsonLinesLog<R> {
  const SCHEME: &'static str = JSONL_SCHEME;
}

impl<R: LogRow> FromUrl for JsonLinesLog<R> {
  type Error = JsonLinesLogError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonLinesLogError::SchemeMismatch);
    }
    Self::create(url_path(url))
  }
}

impl<R: LogRow> JsonLinesLog<R> {
  pub fn create(path: impl AsRef<Path>) -> Result<Self, JsonLinesLogError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    File::create(&path)?;
    info!("创建 JSON Lines 日志: {}", path.display());

    Ok(Self {
      path,
      _record: PhantomData,
    })
  }
}

impl<R> JsonLinesLog<R> {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl<R: LogRow> Persist<R> for JsonLinesLog<R> {
  type Error = JsonLinesLogError;

  fn persist(&self, record: &R) -> Result<(), Self::Error> {
    let line = serde_json::to_string(&record.to_json())?;
    let mut file = OpenOptions::new().append(true).open(&self.path)?;
    writeln!(file, "{}", line)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::ChlorophyllRecord;
  use chrono::{Local, TimeZone};

  #[test]
  fn one_object_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chlorophyll_table.jsonl");
    let log = JsonLinesLog::<ChlorophyllRecord>::create(&path).unwrap();
    let timestamp = Local.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    log
      .persist(&ChlorophyllRecord {
        timestamp,
        chlorophyll_a: Some(0.601),
      })
      .unwrap();
    log
      .persist(&ChlorophyllRecord {
        timestamp,
        chlorophyll_a: None,
      })
      .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<serde_json::Value> = content
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["chlorophyll_a"], 0.601);
    assert!(rows[1]["chlorophyll_a"].is_null());
    assert_eq!(rows[1]["date"], "2026-05-01 09:00:00");
  }
}
