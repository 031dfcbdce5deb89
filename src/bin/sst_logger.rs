// 该文件是 Haixun （海巡） 项目的一部分。
// src/bin/sst_logger.rs - 海温记录程序
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
  input::{IioThermometer, Thermometer},
  model::{estimate_sst, round_to},
  output::{CsvLog, Persist, SessionDirectory},
  record::SstRecord,
  signal::StopSignal,
};

/// 定时读取气温并换算为海表温度
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 气温传感器
  #[arg(
    long,
    value_name = "THERMOMETER",
    default_value = "iio:///sys/bus/iio/devices/iio:device0/in_temp_input"
  )]
  pub thermometer: Url,

  /// 输出目录的上级目录
  #[arg(long, value_name = "DIR", default_value = ".")]
  pub output_dir: PathBuf,

  /// 读数间隔（毫秒）
  #[arg(long, value_name = "MILLIS", default_value_t = 5000)]
  pub interval_ms: u64,

  /// 读数次数，0 表示一直运行直到中断
  #[arg(long, value_name = "COUNT", default_value_t = 0)]
  pub count: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("气温传感器: {}", args.thermometer);
  info!("读数间隔: {} 毫秒", args.interval_ms);

  let stop = StopSignal::new();
  stop.install_ctrlc(Duration::from_secs(10))?;

  let session = SessionDirectory::create(&args.output_dir, "SST_log", Local::now())?;
  let output = CsvLog::<SstRecord>::create(session.join("sst_readings.csv"))?;
  let mut thermometer = IioThermometer::from_url(&args.thermometer)?;
  let interval = Duration::from_millis(args.interval_ms);

  let mut index = 0usize;
  while args.count == 0 || index < args.count {
    index += 1;
    match thermometer.read_celsius() {
      Ok(air_temperature) => {
        let record = SstRecord {
          timestamp: Local::now(),
          air_temperature: round_to(air_temperature, 2),
          sst: round_to(estimate_sst(air_temperature), 2),
        };
        output.persist(&record)?;
        info!(
          "读数 {}: 气温 {:.2} °C, 海温 {:.2} °C",
          index, record.air_temperature, record.sst
        );
      }
      Err(e) => warn!("读数 {} 失败: {}", index, e),
    }

    if !stop.sleep(interval) {
      warn!("中断信号接收，停止记录");
      break;
    }
  }

  info!("记录结束，保存在 {}", output.path().display());
  Ok(())
}
