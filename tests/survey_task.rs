// 该文件是 Haixun （海巡） 项目的一部分。
// tests/survey_task.rs - 采样任务集成测试
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
  cell::Cell,
  collections::VecDeque,
  path::{Path, PathBuf},
  rc::Rc,
  time::Duration,
};

use haixun::{
  frame::BgrFrame,
  input::{
    Camera, CaptureError, GpsFixAcquirer, NmeaSource, NmeaSourceError, Thermometer,
    ThermometerError,
  },
  model::SurveyModel,
  output::{CsvLog, NdviMapWriter},
  record::SampleRecord,
  signal::StopSignal,
  task::{FixFallback, Sensors, SurveySummary, SurveyTask, Task},
};

const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

/// 先按顺序给出脚本中的行，之后一直没有数据
struct ScriptedNmea {
  lines: VecDeque<String>,
}

impl ScriptedNmea {
  fn new(lines: &[&str]) -> Self {
    Self {
      lines: lines.iter().map(|l| l.to_string()).collect(),
    }
  }
}

impl NmeaSource for ScriptedNmea {
  fn read_line(&mut self) -> Result<Option<String>, NmeaSourceError> {
    match self.lines.pop_front() {
      Some(line) => Ok(Some(line)),
      None => {
        std::thread::sleep(Duration::from_millis(1));
        Ok(None)
      }
    }
  }
}

struct ScriptedThermometer {
  readings: VecDeque<Result<f64, ThermometerError>>,
  reads: Rc<Cell<usize>>,
}

impl Thermometer for ScriptedThermometer {
  fn read_celsius(&mut self) -> Result<f64, ThermometerError> {
    self.reads.set(self.reads.get() + 1);
    self
      .readings
      .pop_front()
      .unwrap_or(Err(ThermometerError::Undefined))
  }
}

struct ScriptedCamera {
  frames: VecDeque<Result<BgrFrame, CaptureError>>,
}

impl Camera for ScriptedCamera {
  fn capture(&mut self, index: usize) -> Result<BgrFrame, CaptureError> {
    self.frames.pop_front().unwrap_or_else(|| {
      Err(CaptureError::NoImage(PathBuf::from(format!(
        "frame_{index:03}.jpg"
      ))))
    })
  }
}

fn grey() -> Result<BgrFrame, CaptureError> {
  Ok(BgrFrame::filled(4, 4, [90, 90, 90]))
}

fn no_image() -> Result<BgrFrame, CaptureError> {
  Err(CaptureError::NoImage(PathBuf::from("frame_001.jpg")))
}

fn sensors(
  gps_lines: &[&str],
  readings: Vec<Result<f64, ThermometerError>>,
  frames: Vec<Result<BgrFrame, CaptureError>>,
) -> (
  Sensors<ScriptedNmea, ScriptedThermometer, ScriptedCamera>,
  Rc<Cell<usize>>,
) {
  let reads = Rc::new(Cell::new(0));
  let sensors = Sensors::new(
    GpsFixAcquirer::new(ScriptedNmea::new(gps_lines))
      .with_timeout(Some(Duration::from_millis(20))),
    ScriptedThermometer {
      readings: readings.into(),
      reads: reads.clone(),
    },
    ScriptedCamera {
      frames: frames.into(),
    },
  );
  (sensors, reads)
}

fn task(cycles: usize) -> SurveyTask {
  SurveyTask::new(StopSignal::new())
    .with_cycles(Some(cycles))
    .with_interval(Duration::ZERO)
}

fn rows(path: &Path) -> Vec<Vec<String>> {
  std::fs::read_to_string(path)
    .unwrap()
    .lines()
    .skip(1)
    .map(|line| line.split(',').map(String::from).collect())
    .collect()
}

#[test]
fn temperature_failure_skips_only_that_cycle() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fish_estimation_log.csv");
  let log = CsvLog::<SampleRecord>::create(&path).unwrap();
  let (sensors, reads) = sensors(
    &[GGA, GGA, GGA],
    vec![Ok(20.0), Err(ThermometerError::Undefined), Ok(20.0)],
    vec![grey(), grey(), grey()],
  );

  let summary = task(3).run_task(sensors, SurveyModel, &log).unwrap();

  assert_eq!(
    summary,
    SurveySummary {
      attempted: 3,
      persisted: 2,
      skipped: 1
    }
  );
  // 第 3 轮仍然读取了气温
  assert_eq!(reads.get(), 3);
  assert_eq!(rows(&path).len(), 2);
}

#[test]
fn failed_capture_leaves_two_rows_in_order() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fish_estimation_log.csv");
  let log = CsvLog::<SampleRecord>::create(&path).unwrap();
  let (sensors, _) = sensors(
    &[GGA, RMC, GGA],
    vec![Ok(20.0), Ok(22.0), Ok(26.0)],
    vec![grey(), no_image(), grey()],
  );

  let summary = task(3).run_task(sensors, SurveyModel, &log).unwrap();
  assert_eq!(summary.persisted, 2);

  let header = std::fs::read_to_string(&path).unwrap();
  assert!(header.starts_with("Date,Latitude,Longitude,SST,Chlor-a,Fish_Type,Est_Quantity\n"));

  let rows = rows(&path);
  assert_eq!(rows.len(), 2);
  // 第 1 轮气温 20 → 19.82，第 3 轮气温 26 → 22.5
  assert_eq!(rows[0][3], "19.82");
  assert_eq!(rows[1][3], "22.5");
  assert!(rows[0][0] <= rows[1][0]);
  for row in &rows {
    assert_eq!(row.len(), 7);
    assert_eq!(row[1], "48.1173");
    assert_eq!(row[2], "11.516667");
    assert_eq!(row[4], "0.601");
  }
}

#[test]
fn gps_timeout_reuses_last_known_fix() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fish_estimation_log.csv");
  let log = CsvLog::<SampleRecord>::create(&path).unwrap();
  let (sensors, _) = sensors(&[GGA], vec![Ok(20.0), Ok(20.0)], vec![grey(), grey()]);

  let summary = task(2).run_task(sensors, SurveyModel, &log).unwrap();

  assert_eq!(summary.persisted, 2);
  let rows = rows(&path);
  assert_eq!(rows[0][1..3], rows[1][1..3]);
}

#[test]
fn gps_timeout_with_skip_cycle_fallback() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fish_estimation_log.csv");
  let log = CsvLog::<SampleRecord>::create(&path).unwrap();
  let (sensors, reads) = sensors(&[GGA], vec![Ok(20.0), Ok(20.0)], vec![grey(), grey()]);

  let summary = task(2)
    .with_fix_fallback(FixFallback::SkipCycle)
    .run_task(sensors, SurveyModel, &log)
    .unwrap();

  assert_eq!(
    summary,
    SurveySummary {
      attempted: 2,
      persisted: 1,
      skipped: 1
    }
  );
  // 没有定位的一轮不会读取气温
  assert_eq!(reads.get(), 1);
  assert_eq!(rows(&path).len(), 1);
}

#[test]
fn image_without_valid_pixels_is_logged_as_no_match() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("fish_estimation_log.csv");
  let log = CsvLog::<SampleRecord>::create(&path).unwrap();
  let maps = NdviMapWriter::new(dir.path());
  let (sensors, _) = sensors(
    &[GGA],
    vec![Ok(28.0)],
    vec![Ok(BgrFrame::filled(3, 3, [0, 0, 255]))],
  );

  task(1)
    .with_ndvi_map(Some(maps))
    .run_task(sensors, SurveyModel, &log)
    .unwrap();

  let rows = rows(&path);
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0][4], "nan");
  assert_eq!(rows[0][5], "None");
  assert_eq!(rows[0][6], "0");
  assert!(dir.path().join("ndvi_map_000.png").is_file());
}
