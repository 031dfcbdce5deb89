// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/serial_nmea.rs - 串口 NMEA 输入
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
  io::{BufRead, BufReader, ErrorKind},
  time::Duration,
};

use serialport::SerialPort;
use tracing::{error, info};
use url::Url;

use super::{
  InputError, query_param,
  gps::{NmeaSource, NmeaSourceError},
};
use crate::{FromUrl, FromUrlWithScheme, url_path, url_query};

const DEFAULT_BAUD_RATE: u32 = 9600;
const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
// NMEA 语句最长 82 字节，超过该长度仍无换行的数据视为噪声
const MAX_LINE_LEN: usize = 1024;

/// 串口上的 NMEA 文本流
///
/// URL 格式: `serial:///dev/ttyUSB0?baud=9600&read_timeout_ms=1000`
pub struct SerialNmeaSource {
  port_name: String,
  reader: BufReader<Box<dyn SerialPort>>,
  pending: Vec<u8>,
}

impl FromUrlWithScheme for SerialNmeaSource {
  const SCHEME: &'static str = "serial";
}

impl FromUrl for SerialNmeaSource {
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

    let query = url_query(url);
    let baud_rate = query_param(&query, "baud", DEFAULT_BAUD_RATE)?;
    let read_timeout = query_param(&query, "read_timeout_ms", DEFAULT_READ_TIMEOUT_MS)?;
    let port_name = url_path(url).to_string_lossy().into_owned();

    Self::open(&port_name, baud_rate, Duration::from_millis(read_timeout))
  }
}

impl SerialNmeaSource {
  pub fn open(port_name: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self, InputError> {
    info!("打开串口: {} ({} baud)", port_name, baud_rate);
    let port = serialport::new(port_name, baud_rate)
      .timeout(read_timeout)
      .open()?;

    Ok(Self {
      port_name: port_name.to_string(),
      reader: BufReader::new(port),
      pending: Vec::with_capacity(128),
    })
  }
}

impl NmeaSource for SerialNmeaSource {
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    match self.reader.read_until(b'\n', &mut self.pending) {
      Ok(0) => Err(NmeaSourceError::Closed),
      Ok(_) if self.pending.last() == Some(&b'\n') => {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Ok(Some(line))
      }
      Ok(_) => Ok(None),
      Err(e)
        if matches!(
          e.kind(),
          ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
        ) =>
      {
        if self.pending.len() > MAX_LINE_LEN {
          self.pending.clear();
        }
        Ok(None)
      }
      Err(e) => Err(e.into()),
    }
  }
}

impl Drop for SerialNmeaSource {
  fn drop(&mut self) {
    info!("串口已关闭: {}", self.port_name);
  }
}
