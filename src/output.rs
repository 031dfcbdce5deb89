// 该文件是 Haixun （海巡） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, record::LogRow};

/// 追加式记录输出
pub trait Persist<Record> {
  type Error;
  fn persist(&self, record: &Record) -> Result<(), Self::Error>;
}

impl<R, P: Persist<R> + ?Sized> Persist<R> for &P {
  type Error = P::Error;

  fn persist(&self, record: &R) -> Result<(), Self::Error> {
    (**self).persist(record)
  }
}

mod csv_log;
mod directory_record;
mod json_lines;
mod ndvi_map;

pub use self::csv_log::{CsvLog, CsvLogError};
use self::csv_log::CSV_SCHEME;
pub use self::directory_record::SessionDirectory;
pub use self::json_lines::{JsonLinesLog, JsonLinesLogError};
use self::json_lines::JSONL_SCHEME;
pub use self::ndvi_map::{NdviMapWriter, render_ndvi};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("CSV 日志错误: {0}")]
  CsvLogError(#[from] CsvLogError),
  #[error("JSON Lines 日志错误: {0}")]
  JsonLinesLogError(#[from] JsonLinesLogError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 日志文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Csv,
  JsonLines,
}

impl LogFormat {
  pub fn extension(&self) -> &'static str {
    match self {
      LogFormat::Csv => "csv",
      LogFormat::JsonLines => "jsonl",
    }
  }
}

pub enum OutputWrapper<R> {
  Csv(CsvLog<R>),
  JsonLines(JsonLinesLog<R>),
}

impl<R: LogRow> OutputWrapper<R> {
  /// 在 `path` 新建日志，扩展名由格式决定
  pub fn create(path: impl AsRef<Path>, format: LogFormat) -> Result<Self, OutputError> {
    let path = path.as_ref().with_extension(format.extension());
    match format {
      LogFormat::Csv => Ok(OutputWrapper::Csv(CsvLog::create(path)?)),
      LogFormat::JsonLines => Ok(OutputWrapper::JsonLines(JsonLinesLog::create(path)?)),
    }
  }

  pub fn path(&self) -> &Path {
    match self {
      OutputWrapper::Csv(output) => output.path(),
      OutputWrapper::JsonLines(output) => output.path(),
    }
  }
}

impl<R: LogRow> FromUrl for OutputWrapper<R> {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      CSV_SCHEME => Ok(OutputWrapper::Csv(CsvLog::from_url(url)?)),
      JSONL_SCHEME => Ok(OutputWrapper::JsonLines(JsonLinesLog::from_url(url)?)),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl<R: LogRow> Persist<R> for OutputWrapper<R> {
  type Error = OutputError;

  fn persist(&self, record: &R) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Csv(output) => output.persist(record).map_err(OutputError::from),
      OutputWrapper::JsonLines(output) => output.persist(record).map_err(OutputError::from),
    }
  }
}
