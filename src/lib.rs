// 该文件是 Haixun （海巡） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod record;
pub mod signal;
pub mod task;

use std::{borrow::Cow, collections::HashMap, path::PathBuf};

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 取出 URL 中的本地路径（解码百分号转义）
pub fn url_path(url: &url::Url) -> PathBuf {
  let raw = url.path();
  let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
  PathBuf::from(decoded.as_ref())
}

/// 将 URL 查询参数收集为键值表
pub fn url_query(url: &url::Url) -> HashMap<String, String> {
  url
    .query_pairs()
    .map(|(k, v)| (String::from(k), String::from(v)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_path_decodes_escapes() {
    let url = url::Url::parse("csv:///data/survey%20run/log.csv").unwrap();
    assert_eq!(url_path(&url), PathBuf::from("/data/survey run/log.csv"));
  }

  #[test]
  fn url_query_collects_pairs() {
    let url = url::Url::parse("serial:///dev/ttyUSB0?baud=9600&read_timeout_ms=500").unwrap();
    let query = url_query(&url);
    assert_eq!(query.get("baud").map(String::as_str), Some("9600"));
    assert_eq!(query.get("read_timeout_ms").map(String::as_str), Some("500"));
  }
}
