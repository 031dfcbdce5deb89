// 该文件是 Haixun （海巡） 项目的一部分。
// src/output/csv_log.rs - CSV 日志
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
use tracing::{debug, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, output::Persist, record::LogRow, url_path};

pub(crate) const CSV_SCHEME: &str = "csv";

#[derive(Error, Debug)]
pub enum CsvLogError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 只追加的 CSV 日志
///
/// 创建时写入表头；每写一行都重新以追加方式打开文件，进程中途被杀也不会留下半截的缓冲。
/// URL 格式: `csv:///data/survey/fish_estimation_log.csv`
pub struct CsvLog<R> {
  path: PathBuf,
  _record: PhantomData<fn(&R)>,
}

impl<R: LogRow> FromUrlWithScheme for CsvLog<R> {
  const SCHEME: &'static str = CSV_SCHEME;
}

impl<R: LogRow> FromUrl for CsvLog<R> {
  type Error = CsvLogError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(CsvLogError::SchemeMismatch);
    }
    Self::create(url_path(url))
  }
}

impl<R: LogRow> CsvLog<R> {
  /// 新建（或截断）日志文件并写入表头
  pub fn create(path: impl AsRef<Path>) -> Result<Self, CsvLogError> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&path)?;
    writeln!(file, "{}", join_row(R::HEADER.iter().copied()))?;
    info!("创建 CSV 日志: {}", path.display());

    Ok(Self {
      path,
      _record: PhantomData,
    })
  }
}

impl<R> CsvLog<R> {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl<R: LogRow> Persist<R> for CsvLog<R> {
  type Error = CsvLogError;

  fn persist(&self, record: &R) -> Result<(), Self::Error> {
    let fields = record.fields();
    let row = join_row(fields.iter().map(String::as_str));
    let mut file = OpenOptions::new().append(true).open(&self.path)?;
    writeln!(file, "{}", row)?;
    debug!("写入 CSV: {}", row);
    Ok(())
  }
}

fn join_row<'a>(fields: impl Iterator<Item = &'a str>) -> String {
  fields.map(escape_field).collect::<Vec<_>>().join(",")
}

fn escape_field(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{input::PositionFix, record::GpsRecord};
  use chrono::{Local, TimeZone};

  fn record(second: u32, latitude: f64) -> GpsRecord {
    GpsRecord {
      timestamp: Local.with_ymd_and_hms(2026, 5, 1, 8, 0, second).unwrap(),
      fix: PositionFix::new(latitude, 120.5),
    }
  }

  #[test]
  fn header_once_rows_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("gps_data.csv");
    let log = CsvLog::<GpsRecord>::create(&path).unwrap();
    log.persist(&record(1, 10.0)).unwrap();
    log.persist(&record(2, 10.5)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
      lines,
      vec![
        "Timestamp,Latitude,Longitude",
        "2026-05-01 08:00:01,10,120.5",
        "2026-05-01 08:00:02,10.5,120.5",
      ]
    );
  }

  #[test]
  fn file_is_reopened_for_each_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gps_data.csv");
    let log = CsvLog::<GpsRecord>::create(&path).unwrap();
    log.persist(&record(1, 10.0)).unwrap();

    // 外部写入的内容不会被后续追加覆盖
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "# marker").unwrap();
    drop(file);

    log.persist(&record(2, 11.0)).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert_eq!(content.lines().nth(2), Some("# marker"));
  }

  #[test]
  fn fields_with_separators_are_quoted() {
    assert_eq!(escape_field("Sea Bream"), "Sea Bream");
    assert_eq!(escape_field("a,b"), "\"a,b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
  }

  #[test]
  fn removed_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gps_data.csv");
    let log = CsvLog::<GpsRecord>::create(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
      log.persist(&record(1, 10.0)),
      Err(CsvLogError::IoError(_))
    ));
  }
}
