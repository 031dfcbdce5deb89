// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/replay_nmea.rs - NMEA 记录回放
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
  fs::File,
  io::{BufRead, BufReader, Seek},
  path::{Path, PathBuf},
};

use tracing::{error, info};
use url::Url;

use super::{
  InputError, query_param,
  gps::{NmeaSource, NmeaSourceError},
};
use crate::{FromUrl, FromUrlWithScheme, url_path, url_query};

/// 回放事先录制的 NMEA 文本，用于台架调试
///
/// URL 格式: `nmea-file:///path/to/track.nmea?loop=true`
pub struct ReplayNmeaSource {
  path: PathBuf,
  reader: BufReader<File>,
  looping: bool,
}

impl FromUrlWithScheme for ReplayNmeaSource {
  const SCHEME: &'static str = "nmea-file";
}

impl FromUrl for ReplayNmeaSource {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch);
    }

    let looping = query_param(&url_query(url), "loop", false)?;
    Self::open(url_path(url), looping)
  }
}

impl ReplayNmeaSource {
  pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self, InputError> {
    let path = path.as_ref().to_path_buf();
    info!("回放 NMEA 记录: {}", path.display());
    let file = File::open(&path)?;
    Ok(Self {
      path,
      reader: BufReader::new(file),
      looping,
    })
  }
}

impl ReplayNmeaSource {
  // 按字节读到换行，非 UTF-8 内容按有损方式解码，交给语句解析丢弃
  fn next_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    let mut buf = Vec::new();
    if self.reader.read_until(b'\n', &mut buf)? == 0 {
      return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
  }
}

impl NmeaSource for ReplayNmeaSource {
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    if let Some(line) = self.next_line()? {
      return Ok(Some(line));
    }
    if !self.looping {
      return Err(NmeaSourceError::Closed);
    }

    self.reader.rewind()?;
    self.next_line()?.map(Some).ok_or(NmeaSourceError::Closed)
  }
}

impl Drop for ReplayNmeaSource {
  fn drop(&mut self) {
    info!("NMEA 回放已关闭: {}", self.path.display());
  }
}
