// 该文件是 Haixun （海巡） 项目的一部分。
// src/bin/gps_logger.rs - 定位记录程序
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
  input::{GpsError, GpsFixAcquirer, NmeaInput, NmeaSourceError},
  output::{CsvLog, Persist, SessionDirectory},
  record::GpsRecord,
  signal::StopSignal,
};

/// 持续记录每一次定位
///
/// 经纬度保留 6 位小数（约 0.1 米），与采样任务日志一致。
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 定位模块（serial:// 或 nmea-file://）
  #[arg(
    long,
    value_name = "GPS",
    default_value = "serial:///dev/ttyUSB0?baud=9600"
  )]
  pub gps: Url,

  /// 输出目录的上级目录
  #[arg(long, value_name = "DIR", default_value = ".")]
  pub output_dir: PathBuf,

  /// 单次定位的最长等待时间（秒），0 表示不限
  #[arg(long, value_name = "SECONDS", default_value_t = 30)]
  pub fix_timeout_secs: u64,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("定位模块: {}", args.gps);
  info!("定位超时: {} 秒", args.fix_timeout_secs);

  let stop = StopSignal::new();
  stop.install_ctrlc(Duration::from_secs(10))?;

  let session = SessionDirectory::create(&args.output_dir, "gps_log", Local::now())?;
  let output = CsvLog::<GpsRecord>::create(session.join("gps_data.csv"))?;
  let timeout = (args.fix_timeout_secs > 0).then(|| Duration::from_secs(args.fix_timeout_secs));
  let mut gps = GpsFixAcquirer::new(NmeaInput::from_url(&args.gps)?).with_timeout(timeout);

  info!("开始记录定位...");
  let mut count = 0usize;
  loop {
    match gps.acquire(&stop) {
      Ok(fix) => {
        let record = GpsRecord {
          timestamp: Local::now(),
          fix,
        };
        output.persist(&record)?;
        count += 1;
        info!("定位 {}: {}, {}", count, fix.latitude, fix.longitude);
      }
      Err(GpsError::Timeout(timeout)) => warn!("{:?} 内没有收到定位，继续等待", timeout),
      Err(GpsError::Cancelled) => {
        warn!("中断信号接收，停止记录");
        break;
      }
      Err(GpsError::SourceError(NmeaSourceError::Closed)) => {
        info!("定位数据源已结束");
        break;
      }
      Err(e) => return Err(e.into()),
    }
  }

  info!("共记录 {} 条定位，保存在 {}", count, output.path().display());
  Ok(())
}
