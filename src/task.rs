// 该文件是 Haixun （海巡） 项目的一部分。
// src/task.rs - 采样任务
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

use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  input::{
    Camera, CaptureError, GpsError, GpsFixAcquirer, NmeaSource, PositionFix, Thermometer,
    ThermometerError,
  },
  model::{Model, NdviField, Observation, SurveyEstimate},
  output::{NdviMapWriter, Persist},
  record::{SampleRecord, TIMESTAMP_FORMAT},
  signal::StopSignal,
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 一次运行独占的三个传感器
///
/// 启动时构造一次并移交给任务，任务结束（包括出错返回）时随之释放。
pub struct Sensors<S, T, C> {
  pub gps: GpsFixAcquirer<S>,
  pub thermometer: T,
  pub camera: C,
}

impl<S, T, C> Sensors<S, T, C> {
  pub fn new(gps: GpsFixAcquirer<S>, thermometer: T, camera: C) -> Self {
    Self {
      gps,
      thermometer,
      camera,
    }
  }
}

impl<S, T, C> Drop for Sensors<S, T, C> {
  fn drop(&mut self) {
    info!("释放传感器");
  }
}

/// 定位超时或数据源出错时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixFallback {
  /// 沿用上一次定位；还没有定位过则跳过本轮
  #[default]
  LastKnown,
  /// 直接跳过本轮
  SkipCycle,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurveySummary {
  pub attempted: usize,
  pub persisted: usize,
  pub skipped: usize,
}

/// 单轮采样失败的原因；除定位被取消外都只放弃当前这一轮
#[derive(Error, Debug)]
pub enum CycleError {
  #[error("定位失败: {0}")]
  Fix(#[from] GpsError),
  #[error("读取气温失败: {0}")]
  Temperature(#[from] ThermometerError),
  #[error("拍摄失败: {0}")]
  Capture(#[from] CaptureError),
  #[error("估计失败: {0}")]
  Model(Box<dyn std::error::Error + Send + Sync>),
}

impl CycleError {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, CycleError::Fix(GpsError::Cancelled))
  }
}

/// 定位、测温、拍照、估计、落盘，按固定间隔重复
#[derive(Debug)]
pub struct SurveyTask {
  stop: StopSignal,
  cycles: Option<usize>,
  interval: Duration,
  fix_fallback: FixFallback,
  ndvi_map: Option<NdviMapWriter>,
}

impl SurveyTask {
  pub fn new(stop: StopSignal) -> Self {
    Self {
      stop,
      cycles: None,
      interval: Duration::from_secs(2),
      fix_fallback: FixFallback::default(),
      ndvi_map: None,
    }
  }

  /// `None` 表示一直运行直到收到停止信号
  pub fn with_cycles(mut self, cycles: Option<usize>) -> Self {
    self.cycles = cycles;
    self
  }

  pub fn with_interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  pub fn with_fix_fallback(mut self, fix_fallback: FixFallback) -> Self {
    self.fix_fallback = fix_fallback;
    self
  }

  pub fn with_ndvi_map(mut self, ndvi_map: Option<NdviMapWriter>) -> Self {
    self.ndvi_map = ndvi_map;
    self
  }

  fn has_more(&self, index: usize) -> bool {
    self.cycles.is_none_or(|n| index < n)
  }

  fn acquire_fix<S: NmeaSource>(
    &self,
    gps: &mut GpsFixAcquirer<S>,
  ) -> Result<PositionFix, CycleError> {
    match gps.acquire(&self.stop) {
      Ok(fix) => Ok(fix),
      Err(GpsError::Cancelled) => Err(CycleError::Fix(GpsError::Cancelled)),
      Err(e) => match (self.fix_fallback, gps.last_fix()) {
        (FixFallback::LastKnown, Some(fix)) => {
          warn!("定位失败 ({}), 沿用上一次定位", e);
          Ok(fix)
        }
        _ => Err(CycleError::Fix(e)),
      },
    }
  }

  fn run_cycle<S, T, C, M>(
    &self,
    index: usize,
    sensors: &mut Sensors<S, T, C>,
    model: &M,
  ) -> Result<(SampleRecord, NdviField), CycleError>
  where
    S: NmeaSource,
    T: Thermometer,
    C: Camera,
    M: Model<Input = Observation, Output = SurveyEstimate>,
    M::Error: std::error::Error + Send + Sync + 'static,
  {
    let timestamp = Local::now();
    let fix = self.acquire_fix(&mut sensors.gps)?;
    let air_temperature = sensors.thermometer.read_celsius()?;
    let frame = sensors.camera.capture(index)?;

    let result = model
      .infer(&Observation {
        air_temperature,
        frame,
      })
      .map_err(|e| CycleError::Model(Box::new(e)))?;

    let record = SampleRecord {
      timestamp,
      fix,
      estimate: result.estimate,
      classification: result.classification,
    };
    Ok((record, result.ndvi))
  }
}

impl<S, T, C, M, O> Task<Sensors<S, T, C>, M, O> for SurveyTask
where
  S: NmeaSource,
  T: Thermometer,
  C: Camera,
  M: Model<Input = Observation, Output = SurveyEstimate>,
  M::Error: std::error::Error + Send + Sync + 'static,
  O: Persist<SampleRecord>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Output = SurveySummary;
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut sensors: Sensors<S, T, C>,
    model: M,
    output: O,
  ) -> Result<Self::Output, Self::Error> {
    info!("开始采样任务...");
    let mut summary = SurveySummary::default();
    let mut index = 0;

    while self.has_more(index) {
      summary.attempted += 1;
      match self.run_cycle(index, &mut sensors, &model) {
        Ok((record, ndvi)) => {
          output.persist(&record)?;
          summary.persisted += 1;
          info!(
            "第 {} 轮: {} ({}, {}) SST={} Chl-a={:?} {} x{}",
            index + 1,
            record.timestamp.format(TIMESTAMP_FORMAT),
            record.fix.latitude,
            record.fix.longitude,
            record.estimate.sst,
            record.estimate.chlorophyll_a,
            record.classification.label(),
            record.classification.estimated_quantity
          );
          if let Some(maps) = &self.ndvi_map
            && let Err(e) = maps.save(index, &ndvi)
          {
            warn!("保存 NDVI 图失败: {}", e);
          }
        }
        Err(e) if e.is_cancelled() => {
          summary.skipped += 1;
          warn!("第 {} 轮定位被停止信号取消", index + 1);
          break;
        }
        Err(e) => {
          summary.skipped += 1;
          warn!("第 {} 轮采样跳过: {}", index + 1, e);
        }
      }

      index += 1;
      if self.stop.is_raised() {
        warn!("中断信号接收，退出采样循环");
        break;
      }
      if self.has_more(index) && !self.stop.sleep(self.interval) {
        warn!("等待期间收到中断信号，退出采样循环");
        break;
      }
    }

    info!(
      "采样结束: 共 {} 轮，落盘 {} 轮，跳过 {} 轮",
      summary.attempted, summary.persisted, summary.skipped
    );
    Ok(summary)
  }
}
