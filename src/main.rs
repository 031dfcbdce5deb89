// 该文件是 Haixun （海巡） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::info;
use url::Url;

use haixun::{
  FromUrl,
  input::{CameraInput, GpsFixAcquirer, IioThermometer, LibcameraStill, NmeaInput},
  model::SurveyModel,
  output::{NdviMapWriter, OutputWrapper, SessionDirectory},
  record::SampleRecord,
  signal::StopSignal,
  task::{Sensors, SurveyTask, Task},
};

const LOG_STEM: &str = "fish_estimation_log";
const FORCE_EXIT_GRACE: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("Haixun 海面调查记录仪");
  info!("定位模块: {}", args.gps);
  info!("气温传感器: {}", args.thermometer);
  info!(
    "相机: {}",
    args
      .camera
      .as_ref()
      .map(Url::to_string)
      .unwrap_or_else(|| String::from("libcamera-still (输出目录)"))
  );
  info!(
    "采样轮数: {}, 间隔: {:?}, 定位超时: {:?}, 超时处理: {:?}",
    args.cycles, args.interval(), args.fix_timeout(), args.fix_fallback
  );

  let stop = StopSignal::new();
  stop.install_ctrlc(FORCE_EXIT_GRACE)?;

  let session = SessionDirectory::create(&args.output_dir, &args.prefix, Local::now())?;
  let output = match &args.log {
    Some(url) => OutputWrapper::<SampleRecord>::from_url(url)?,
    None => OutputWrapper::create(session.join(LOG_STEM), args.format.into())?,
  };
  info!("日志文件: {}", output.path().display());

  let gps = GpsFixAcquirer::new(NmeaInput::from_url(&args.gps)?).with_timeout(args.fix_timeout());
  let thermometer = IioThermometer::from_url(&args.thermometer)?;
  let camera = match &args.camera {
    Some(url) => CameraInput::from_url(url)?,
    None => CameraInput::Libcamera(LibcameraStill::new(session.path())),
  };
  let ndvi_map = args.ndvi_map.then(|| NdviMapWriter::new(session.path()));

  let summary = SurveyTask::new(stop)
    .with_cycles(args.cycles())
    .with_interval(args.interval())
    .with_fix_fallback(args.fix_fallback.into())
    .with_ndvi_map(ndvi_map)
    .run_task(
      Sensors::new(gps, thermometer, camera),
      SurveyModel,
      output,
    )?;

  info!(
    "完成: 落盘 {} / {} 轮，结果保存在 {}",
    summary.persisted,
    summary.attempted,
    session.path().display()
  );

  Ok(())
}
