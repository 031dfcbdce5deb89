// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/nmea.rs - NMEA 定位语句解析
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

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NmeaParseError {
  #[error("校验和不匹配: 期望 {expected:02X}, 实际 {actual:02X}")]
  ChecksumMismatch { expected: u8, actual: u8 },
  #[error("校验和格式错误: {0}")]
  MalformedChecksum(String),
  #[error("{kind:?} 语句字段不足: {fields}")]
  Truncated { kind: SentenceKind, fields: usize },
  #[error("坐标格式错误: {0}")]
  InvalidCoordinate(String),
  #[error("未知半球标识: {0}")]
  InvalidHemisphere(String),
}

/// 参与定位的两类语句
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
  Gga,
  Rmc,
}

impl SentenceKind {
  const fn prefix(self) -> &'static str {
    match self {
      SentenceKind::Gga => "$GPGGA",
      SentenceKind::Rmc => "$GPRMC",
    }
  }

  // (纬度字段, 经度字段) 的下标，半球标识紧随其后
  const fn coordinate_fields(self) -> (usize, usize) {
    match self {
      SentenceKind::Gga => (2, 4),
      SentenceKind::Rmc => (3, 5),
    }
  }

  /// 识别语句类型，非候选语句返回 `None`
  pub fn of(line: &str) -> Option<Self> {
    [SentenceKind::Gga, SentenceKind::Rmc]
      .into_iter()
      .find(|kind| line.starts_with(kind.prefix()))
  }
}

/// 解析出的定位语句，经纬度字段为空时对应值为 `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSentence {
  pub kind: SentenceKind,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
}

impl PositionSentence {
  pub fn position(&self) -> Option<(f64, f64)> {
    Some((self.latitude?, self.longitude?))
  }
}

/// 按语句类型的语法解析一行文本
///
/// 不是候选语句时返回 `Ok(None)`。
pub fn parse_position(line: &str) -> Result<Option<PositionSentence>, NmeaParseError> {
  let line = line.trim_end_matches(['\r', '\n']);
  let Some(kind) = SentenceKind::of(line) else {
    return Ok(None);
  };

  let body = verify_checksum(line)?;
  let fields = body.split(',').collect::<Vec<&str>>();

  let (lat_index, lon_index) = kind.coordinate_fields();
  if fields.len() <= lon_index + 1 {
    return Err(NmeaParseError::Truncated {
      kind,
      fields: fields.len(),
    });
  }

  let latitude = parse_coordinate(fields[lat_index], fields[lat_index + 1], ['N', 'S'])?;
  let longitude = parse_coordinate(fields[lon_index], fields[lon_index + 1], ['E', 'W'])?;

  Ok(Some(PositionSentence {
    kind,
    latitude,
    longitude,
  }))
}

// 返回 `$` 与 `*` 之间的语句主体；没有 `*hh` 后缀时不做校验
fn verify_checksum(line: &str) -> Result<&str, NmeaParseError> {
  let without_dollar = line.strip_prefix('$').unwrap_or(line);
  let Some((body, checksum)) = without_dollar.split_once('*') else {
    return Ok(without_dollar);
  };

  let checksum = checksum.trim();
  if checksum.len() != 2 {
    return Err(NmeaParseError::MalformedChecksum(checksum.to_string()));
  }
  let expected = u8::from_str_radix(checksum, 16)
    .map_err(|_| NmeaParseError::MalformedChecksum(checksum.to_string()))?;
  let actual = body.bytes().fold(0u8, |acc, b| acc ^ b);

  if expected != actual {
    return Err(NmeaParseError::ChecksumMismatch { expected, actual });
  }
  Ok(body)
}

/// 解析 `ddmm.mmmm` / `dddmm.mmmm` 坐标；任一字段为空表示没有定位
fn parse_coordinate(
  value: &str,
  hemisphere: &str,
  [positive, negative]: [char; 2],
) -> Result<Option<f64>, NmeaParseError> {
  if value.is_empty() || hemisphere.is_empty() {
    return Ok(None);
  }

  let raw = value
    .parse::<f64>()
    .map_err(|_| NmeaParseError::InvalidCoordinate(value.to_string()))?;
  if !raw.is_finite() || raw < 0.0 {
    return Err(NmeaParseError::InvalidCoordinate(value.to_string()));
  }

  let degrees = (raw / 100.0).floor();
  let minutes = raw - degrees * 100.0;
  let decimal = degrees + minutes / 60.0;

  let mut chars = hemisphere.chars();
  match (chars.next(), chars.next()) {
    (Some(c), None) if c == positive => Ok(Some(decimal)),
    (Some(c), None) if c == negative => Ok(Some(-decimal)),
    _ => Err(NmeaParseError::InvalidHemisphere(hemisphere.to_string())),
  }
}
