// 该文件是 Haixun （海巡） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use url::Url;

use haixun::{output::LogFormat, task::FixFallback};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FallbackArg {
  LastKnown,
  SkipCycle,
}

impl From<FallbackArg> for FixFallback {
  fn from(value: FallbackArg) -> Self {
    match value {
      FallbackArg::LastKnown => FixFallback::LastKnown,
      FallbackArg::SkipCycle => FixFallback::SkipCycle,
    }
  }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
  Csv,
  Jsonl,
}

impl From<FormatArg> for LogFormat {
  fn from(value: FormatArg) -> Self {
    match value {
      FormatArg::Csv => LogFormat::Csv,
      FormatArg::Jsonl => LogFormat::JsonLines,
    }
  }
}

/// Haixun 海面调查记录仪参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 定位模块
  /// - 串口: serial:///dev/ttyUSB0?baud=9600&read_timeout_ms=1000
  /// - 回放: nmea-file:///path/to/track.nmea?loop=true
  #[arg(
    long,
    value_name = "GPS",
    default_value = "serial:///dev/ttyUSB0?baud=9600"
  )]
  pub gps: Url,

  /// 气温传感器: iio:///sys/bus/iio/devices/iio:device0/in_temp_input?scale=0.001
  #[arg(
    long,
    value_name = "THERMOMETER",
    default_value = "iio:///sys/bus/iio/devices/iio:device0/in_temp_input"
  )]
  pub thermometer: Url,

  /// 相机，缺省时用 libcamera-still 拍摄到输出目录
  /// - libcamera:///dir?width=640&height=480&timeout=1000
  /// - image:///path/to/still.jpg
  /// - v4l:///dev/video0 (需要 v4l_input 特性)
  #[arg(long, value_name = "CAMERA")]
  pub camera: Option<Url>,

  /// 日志输出（csv:// 或 jsonl://），缺省时写入输出目录
  #[arg(long, value_name = "LOG")]
  pub log: Option<Url>,

  /// 输出目录的上级目录
  #[arg(long, value_name = "DIR", default_value = ".")]
  pub output_dir: PathBuf,

  /// 输出目录名前缀
  #[arg(long, value_name = "PREFIX", default_value = "fish_estimation")]
  pub prefix: String,

  /// 日志格式
  #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
  pub format: FormatArg,

  /// 采样轮数，0 表示一直运行直到中断
  #[arg(long, value_name = "COUNT", default_value_t = 20)]
  pub cycles: usize,

  /// 两轮采样之间的间隔（毫秒）
  #[arg(long, value_name = "MILLIS", default_value_t = 2000)]
  pub interval_ms: u64,

  /// 单次定位的最长等待时间（秒），0 表示不限
  #[arg(long, value_name = "SECONDS", default_value_t = 30)]
  pub fix_timeout_secs: u64,

  /// 定位超时后的处理方式
  #[arg(long, value_enum, default_value_t = FallbackArg::LastKnown)]
  pub fix_fallback: FallbackArg,

  /// 同时保存每轮的 NDVI 伪彩色图
  #[arg(long, default_value_t = false)]
  pub ndvi_map: bool,
}

impl Args {
  pub fn cycles(&self) -> Option<usize> {
    (self.cycles > 0).then_some(self.cycles)
  }

  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }

  pub fn fix_timeout(&self) -> Option<Duration> {
    (self.fix_timeout_secs > 0).then(|| Duration::from_secs(self.fix_timeout_secs))
  }
}
