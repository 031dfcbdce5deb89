// 该文件是 Haixun （海巡） 项目的一部分。
// src/bin/ndvi_logger.rs - 叶绿素记录程序
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

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use haixun::{
  FromUrl,
  input::{Camera, CameraInput, LibcameraStill},
  model::{NdviField, round_to},
  output::{CsvLog, NdviMapWriter, Persist, SessionDirectory},
  record::ChlorophyllRecord,
  signal::StopSignal,
};

/// 连续拍摄若干帧，计算 NDVI 与叶绿素 a
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 相机，缺省时用 libcamera-still 拍摄到输出目录
  #[arg(long, value_name = "CAMERA")]
  pub camera: Option<Url>,

  /// 输出目录的上级目录
  #[arg(long, value_name = "DIR", default_value = ".")]
  pub output_dir: PathBuf,

  /// 拍摄帧数
  #[arg(long, value_name = "COUNT", default_value_t = 20)]
  pub frames: usize,

  /// 拍摄间隔（毫秒）
  #[arg(long, value_name = "MILLIS", default_value_t = 2000)]
  pub interval_ms: u64,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("拍摄帧数: {}, 间隔: {} 毫秒", args.frames, args.interval_ms);

  let stop = StopSignal::new();
  stop.install_ctrlc(Duration::from_secs(10))?;

  let session = SessionDirectory::create(&args.output_dir, "ndvi_video_results", Local::now())?;
  let output = CsvLog::<ChlorophyllRecord>::create(session.join("chlorophyll_table.csv"))?;
  let maps = NdviMapWriter::new(session.path());
  let mut camera = match &args.camera {
    Some(url) => CameraInput::from_url(url)?,
    None => CameraInput::Libcamera(LibcameraStill::new(session.path())),
  };
  let interval = Duration::from_millis(args.interval_ms);

  for index in 0..args.frames {
    let frame = match camera.capture(index) {
      Ok(frame) => frame,
      Err(e) => {
        warn!("第 {} 帧拍摄失败: {}", index + 1, e);
        if !stop.sleep(interval) {
          break;
        }
        continue;
      }
    };

    let field = NdviField::from_frame(&frame);
    let record = ChlorophyllRecord {
      timestamp: Local::now(),
      chlorophyll_a: field.chlorophyll_a().map(|chl| round_to(chl, 4)),
    };
    output.persist(&record)?;
    if let Err(e) = maps.save(index, &field) {
      warn!("保存 NDVI 图失败: {}", e);
    }
    info!(
      "第 {} 帧: 有效像素 {}/{}, Chl-a={:?}",
      index + 1,
      field.valid_count(),
      field.total_count(),
      record.chlorophyll_a
    );

    if index + 1 < args.frames && !stop.sleep(interval) {
      warn!("中断信号接收，停止拍摄");
      break;
    }
  }

  info!("记录结束，结果保存在 {}", session.path().display());
  Ok(())
}
