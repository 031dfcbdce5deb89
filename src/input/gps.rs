// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/gps.rs - GPS 定位获取
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

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use super::nmea::parse_position;
use crate::{model::round_to, signal::StopSignal};

const FIX_DIGITS: i32 = 6;

#[derive(Error, Debug)]
pub enum NmeaSourceError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[cfg(feature = "serial_input")]
  #[error("串口错误: {0}")]
  SerialError(#[from] serialport::Error),
  #[error("数据源已关闭")]
  Closed,
}

/// 定位模块的文本传输
pub trait NmeaSource {
  /// 读取下一行；在一次读超时内没有完整的行时返回 `Ok(None)`
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError>;
}

impl<S: NmeaSource + ?Sized> NmeaSource for Box<S> {
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    (**self).read_line()
  }
}

/// 一次定位，经纬度保留 6 位小数（约 0.11 m）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
  pub latitude: f64,
  pub longitude: f64,
}

impl PositionFix {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self {
      latitude: round_to(latitude, FIX_DIGITS),
      longitude: round_to(longitude, FIX_DIGITS),
    }
  }
}

#[derive(Error, Debug)]
pub enum GpsError {
  #[error("等待定位超时 ({0:?})")]
  Timeout(Duration),
  #[error("定位被停止信号取消")]
  Cancelled,
  #[error("定位数据源错误: {0}")]
  SourceError(#[from] NmeaSourceError),
}

/// 从 NMEA 文本流中取出下一个有效定位
pub struct GpsFixAcquirer<S> {
  source: S,
  timeout: Option<Duration>,
  last_fix: Option<PositionFix>,
}

impl<S: NmeaSource> GpsFixAcquirer<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      timeout: None,
      last_fix: None,
    }
  }

  /// 设置单次定位的最长等待时间，`None` 表示一直等待（仍可被停止信号取消）
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn last_fix(&self) -> Option<PositionFix> {
    self.last_fix
  }

  /// 阻塞直到读到一条带经纬度的 GGA/RMC 语句
  ///
  /// 无法解析或缺少经纬度的语句直接丢弃并继续读取。
  pub fn acquire(&mut self, stop: &StopSignal) -> Result<PositionFix, GpsError> {
    let started = Instant::now();
    loop {
      if stop.is_raised() {
        return Err(GpsError::Cancelled);
      }
      if let Some(timeout) = self.timeout
        && started.elapsed() >= timeout
      {
        return Err(GpsError::Timeout(timeout));
      }

      let Some(line) = self.source.read_line()? else {
        continue;
      };

      match parse_position(&line) {
        Ok(Some(sentence)) => match sentence.position() {
          Some((latitude, longitude)) => {
            let fix = PositionFix::new(latitude, longitude);
            self.last_fix = Some(fix);
            return Ok(fix);
          }
          None => debug!("语句缺少经纬度，丢弃: {}", line.trim_end()),
        },
        Ok(None) => {}
        Err(e) => debug!("语句解析失败 ({}), 丢弃: {}", e, line.trim_end()),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::VecDeque;

  struct ScriptedSource {
    lines: VecDeque<Option<String>>,
  }

  impl ScriptedSource {
    fn new(lines: &[Option<&str>]) -> Self {
      Self {
        lines: lines.iter().map(|l| l.map(String::from)).collect(),
      }
    }
  }

  impl NmeaSource for ScriptedSource {
    fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
      self.lines.pop_front().ok_or(NmeaSourceError::Closed)
    }
  }

  const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

  #[test]
  fn skips_noise_until_valid_sentence() {
    let source = ScriptedSource::new(&[
      Some("\u{fffd}\u{fffd}garbage"),
      None,
      Some("$GPGSV,3,1,11,03,03,111,00*74"),
      Some("$GPGGA,002153.000,,,,,0,00,99.99,,,,,,"),
      Some("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*00"),
      Some(GGA),
    ]);
    let mut gps = GpsFixAcquirer::new(source);
    let fix = gps.acquire(&StopSignal::new()).unwrap();
    assert_eq!(fix, PositionFix::new(48.1173, 11.516667));
    assert_eq!(gps.last_fix(), Some(fix));
  }

  #[test]
  fn fix_is_rounded_to_six_decimals() {
    let fix = PositionFix::new(48.117300004, -11.5166666666);
    assert_eq!(fix.latitude, 48.1173);
    assert_eq!(fix.longitude, -11.516667);
  }

  struct SilentSource;

  impl NmeaSource for SilentSource {
    fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
      std::thread::sleep(Duration::from_millis(1));
      Ok(None)
    }
  }

  #[test]
  fn silent_source_times_out() {
    let mut gps = GpsFixAcquirer::new(SilentSource).with_timeout(Some(Duration::from_millis(5)));
    assert!(matches!(
      gps.acquire(&StopSignal::new()),
      Err(GpsError::Timeout(_))
    ));
    assert_eq!(gps.last_fix(), None);
  }

  #[test]
  fn raised_signal_cancels_acquisition() {
    let stop = StopSignal::new();
    stop.raise();
    let mut gps = GpsFixAcquirer::new(ScriptedSource::new(&[Some(GGA)]));
    assert!(matches!(gps.acquire(&stop), Err(GpsError::Cancelled)));
  }

  #[test]
  fn closed_source_is_reported() {
    let mut gps = GpsFixAcquirer::new(ScriptedSource::new(&[]));
    assert!(matches!(
      gps.acquire(&StopSignal::new()),
      Err(GpsError::SourceError(NmeaSourceError::Closed))
    ));
  }
}
