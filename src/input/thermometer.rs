// 该文件是 Haixun （海巡） 项目的一部分。
// src/input/thermometer.rs - 气温传感器输入
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
  io::{Read, Seek},
  path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use super::{InputError, query_param};
use crate::{FromUrl, FromUrlWithScheme, url_path, url_query};

#[derive(Error, Debug)]
pub enum ThermometerError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("传感器没有返回温度值")]
  Undefined,
  #[error("无法解析温度读数: {0:?}")]
  Malformed(String),
}

pub trait Thermometer {
  /// 读取当前气温（°C）
  fn read_celsius(&mut self) -> Result<f64, ThermometerError>;
}

impl<T: Thermometer + ?Sized> Thermometer for Box<T> {
  fn read_celsius(&mut self) -> Result<f64, ThermometerError> {
    (**self).read_celsius()
  }
}

// dht11 内核驱动（同时支持 DHT22）的 in_temp_input 单位为千分之一摄氏度
const DEFAULT_IIO_SCALE: f64 = 0.001;

/// Linux IIO sysfs 温度通道
///
/// URL 格式: `iio:///sys/bus/iio/devices/iio:device0/in_temp_input?scale=0.001`
///
/// 驱动在总线时序出错时会让读操作返回 EIO，这类错误按单次读数失败处理。
pub struct IioThermometer {
  path: PathBuf,
  file: File,
  scale: f64,
}

impl FromUrlWithScheme for IioThermometer {
  const SCHEME: &'static str = "iio";
}

impl FromUrl for IioThermometer {
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

    let scale = query_param(&url_query(url), "scale", DEFAULT_IIO_SCALE)?;
    Self::open(url_path(url), scale)
  }
}

impl IioThermometer {
  pub fn open(path: impl AsRef<Path>, scale: f64) -> Result<Self, InputError> {
    let path = path.as_ref().to_path_buf();
    info!("打开温度传感器: {}", path.display());
    let file = File::open(&path)?;
    Ok(Self { path, file, scale })
  }
}

impl Thermometer for IioThermometer {
  fn read_celsius(&mut self) -> Result<f64, ThermometerError> {
    self.file.rewind()?;
    let mut text = String::new();
    self.file.read_to_string(&mut text)?;

    let text = text.trim();
    if text.is_empty() {
      return Err(ThermometerError::Undefined);
    }
    let raw = text
      .parse::<f64>()
      .map_err(|_| ThermometerError::Malformed(text.to_string()))?;

    let celsius = raw * self.scale;
    if celsius.is_finite() {
      Ok(celsius)
    } else {
      Err(ThermometerError::Undefined)
    }
  }
}

impl Drop for IioThermometer {
  fn drop(&mut self) {
    info!("温度传感器已释放: {}", self.path.display());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn channel(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
  }

  #[test]
  fn reads_millidegrees() {
    let file = channel("23400\n");
    let mut sensor = IioThermometer::open(file.path(), DEFAULT_IIO_SCALE).unwrap();
    assert!((sensor.read_celsius().unwrap() - 23.4).abs() < 1e-9);
    // 同一句柄可重复读取
    assert!((sensor.read_celsius().unwrap() - 23.4).abs() < 1e-9);
  }

  #[test]
  fn scale_comes_from_url() {
    let file = channel("-3.5");
    let url = Url::parse(&format!("iio://{}?scale=1", file.path().display())).unwrap();
    let mut sensor = IioThermometer::from_url(&url).unwrap();
    assert_eq!(sensor.read_celsius().unwrap(), -3.5);
  }

  #[test]
  fn empty_reading_is_undefined() {
    let file = channel("  \n");
    let mut sensor = IioThermometer::open(file.path(), DEFAULT_IIO_SCALE).unwrap();
    assert!(matches!(
      sensor.read_celsius(),
      Err(ThermometerError::Undefined)
    ));
  }

  #[test]
  fn garbage_reading_is_malformed() {
    let file = channel("nope");
    let mut sensor = IioThermometer::open(file.path(), DEFAULT_IIO_SCALE).unwrap();
    assert!(matches!(
      sensor.read_celsius(),
      Err(ThermometerError::Malformed(_))
    ));
  }

  #[test]
  fn nan_reading_is_undefined() {
    let file = channel("NaN");
    let mut sensor = IioThermometer::open(file.path(), 1.0).unwrap();
    assert!(matches!(
      sensor.read_celsius(),
      Err(ThermometerError::Undefined)
    ));
  }
}
