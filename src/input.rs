// 该文件是 Haixun （海巡） 项目的一部分。
// src/input.rs - 传感器输入
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
  collections::HashMap,
  path::{Path, PathBuf},
  process::ExitStatus,
  str::FromStr,
};

use image::ImageReader;
use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::BgrFrame};

mod gps;
mod libcamera_still;
mod nmea;
mod read_image_file;
mod replay_nmea;
mod thermometer;

pub use self::gps::{GpsError, GpsFixAcquirer, NmeaSource, NmeaSourceError, PositionFix};
pub use self::libcamera_still::LibcameraStill;
pub use self::nmea::{NmeaParseError, PositionSentence, SentenceKind, parse_position};
pub use self::read_image_file::ImageFileInput;
pub use self::replay_nmea::ReplayNmeaSource;
pub use self::thermometer::{IioThermometer, Thermometer, ThermometerError};

#[cfg(feature = "serial_input")]
mod serial_nmea;
#[cfg(feature = "serial_input")]
pub use self::serial_nmea::SerialNmeaSource;

#[cfg(feature = "v4l_input")]
mod v4l_input;
#[cfg(feature = "v4l_input")]
pub use self::v4l_input::V4lInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI scheme mismatch")]
  SchemeMismatch,
  #[error("Invalid parameter {name}={value}")]
  InvalidParameter { name: String, value: String },
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[cfg(feature = "serial_input")]
  #[error("Serial port error: {0}")]
  SerialError(#[from] serialport::Error),
}

/// 读取查询参数，缺省时使用默认值
pub(crate) fn query_param<T: FromStr>(
  query: &HashMap<String, String>,
  name: &str,
  default: T,
) -> Result<T, InputError> {
  match query.get(name) {
    Some(value) => value.parse::<T>().map_err(|_| InputError::InvalidParameter {
      name: name.to_string(),
      value: value.clone(),
    }),
    None => Ok(default),
  }
}

#[derive(Error, Debug)]
pub enum CaptureError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("{program} exited with {status}")]
  CommandFailed { program: String, status: ExitStatus },
  #[error("No image produced at {0}")]
  NoImage(PathBuf),
  #[error("Image decoding error: {0}")]
  DecodeError(#[from] image::ImageError),
  #[error("Unsupported pixel format: {0}")]
  UnsupportedFormat(String),
  #[error("Buffer size mismatch: expected {expected} bytes, got {actual} bytes")]
  BufferSizeMismatch { expected: usize, actual: usize },
}

/// 图像来源：拍摄一张静态图，失败时不产生图像
pub trait Camera {
  /// `index` 为本轮采样的序号，用于命名拍摄产物
  fn capture(&mut self, index: usize) -> Result<BgrFrame, CaptureError>;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
  fn capture(&mut self, index: usize) -> Result<BgrFrame, CaptureError> {
    (**self).capture(index)
  }
}

pub(crate) fn decode_still(path: &Path) -> Result<BgrFrame, CaptureError> {
  if !path.is_file() {
    return Err(CaptureError::NoImage(path.to_path_buf()));
  }
  let image = ImageReader::open(path)?
    .with_guessed_format()?
    .decode()?
    .to_rgb8();
  Ok(BgrFrame::from(image))
}

/// 按 URL 方案选择的定位文本来源
pub enum NmeaInput {
  #[cfg(feature = "serial_input")]
  Serial(SerialNmeaSource),
  Replay(ReplayNmeaSource),
}

impl FromUrl for NmeaInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "serial_input")]
      SerialNmeaSource::SCHEME => Ok(NmeaInput::Serial(SerialNmeaSource::from_url(url)?)),
      ReplayNmeaSource::SCHEME => Ok(NmeaInput::Replay(ReplayNmeaSource::from_url(url)?)),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl NmeaSource for NmeaInput {
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    match self {
      #[cfg(feature = "serial_input")]
      NmeaInput::Serial(source) => source.read_line(),
      NmeaInput::Replay(source) => source.read_line(),
    }
  }
}

/// 按 URL 方案选择的图像来源
pub enum CameraInput {
  Libcamera(LibcameraStill),
  ImageFile(ImageFileInput),
  #[cfg(feature = "v4l_input")]
  V4l(V4lInput),
}

impl FromUrl for CameraInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      LibcameraStill::SCHEME => Ok(CameraInput::Libcamera(LibcameraStill::from_url(url)?)),
      ImageFileInput::SCHEME => Ok(CameraInput::ImageFile(ImageFileInput::from_url(url)?)),
      #[cfg(feature = "v4l_input")]
      V4lInput::SCHEME => Ok(CameraInput::V4l(V4lInput::from_url(url)?)),
      _ => Err(InputError::SchemeMismatch),
    }
  }
}

impl Camera for CameraInput {
  fn capture(&mut self, index: usize) -> Result<BgrFrame, CaptureError> {
    match self {
      CameraInput::Libcamera(camera) => camera.capture(index),
      CameraInput::ImageFile(camera) => camera.capture(index),
      #[cfg(feature = "v4l_input")]
      CameraInput::V4l(camera) => camera.capture(index),
    }
  }
}
