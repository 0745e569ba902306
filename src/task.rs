// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/task.rs - 标注任务
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

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::{
  annotate::{Annotation, Annotator},
  config::DetectionParams,
  frame::BgrFrame,
  model::{DetectionTensor, Model},
  output::Render,
};

/// 模型以引用传入，任务本身不负责加载
pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: &M, output: O) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct OneShotTask {
  params: DetectionParams,
}

impl OneShotTask {
  pub fn new(params: DetectionParams) -> Self {
    Self { params }
  }
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = BgrFrame>,
  M: Model<Input = BgrFrame, Output = DetectionTensor, Error = ME>,
  O: Render<BgrFrame, Annotation, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = Annotation;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: &M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功: {}x{}，开始推理...", frame.width(), frame.height());

    let annotator = Annotator::new(model, self.params);
    let now = Instant::now();
    let annotation = annotator.annotate(&frame)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    let now = Instant::now();
    output.render_result(&frame, &annotation)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(annotation)
  }
}

/// 同一模型重复推理，用于测量平均耗时
#[derive(Debug, Clone)]
pub struct RepeatShotTask {
  params: DetectionParams,
  repeat: usize,
}

pub const DEFAULT_REPEAT_TIMES: usize = 100;
const WARMUP_TIMES: usize = 2;

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self {
      params: DetectionParams::default(),
      repeat: DEFAULT_REPEAT_TIMES,
    }
  }
}

impl RepeatShotTask {
  pub fn new(params: DetectionParams) -> Self {
    Self {
      params,
      ..Self::default()
    }
  }

  pub fn with_repeat(mut self, repeat: usize) -> Self {
    self.repeat = repeat.max(1);
    self
  }
}

/// 重复任务的统计结果
#[derive(Debug, Clone)]
pub struct RepeatReport {
  pub runs: usize,
  pub mean: Duration,
  pub faces: usize,
  /// 所有轮次的检测结果是否一致
  pub stable: bool,
}

/// 跳过前几次预热后的平均耗时
fn mean_duration(times: &[Duration]) -> Duration {
  let measured = if times.len() > WARMUP_TIMES {
    &times[WARMUP_TIMES..]
  } else {
    times
  };
  if measured.is_empty() {
    return Duration::ZERO;
  }
  measured.iter().sum::<Duration>() / measured.len() as u32
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = BgrFrame>,
  M: Model<Input = BgrFrame, Output = DetectionTensor, Error = ME>,
  O: Render<BgrFrame, Annotation, Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Output = RepeatReport;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: &M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");

    let annotator = Annotator::new(model, self.params);
    let mut times = Vec::with_capacity(self.repeat);
    let mut first: Option<Annotation> = None;
    let mut stable = true;
    for i in 0..self.repeat {
      let now = Instant::now();
      let annotation = annotator.annotate(&frame)?;
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);

      if first.is_none() {
        first = Some(annotation);
      } else if first.as_ref().is_some_and(|f| f.boxes != annotation.boxes) {
        warn!("({})检测结果与首次不一致", i);
        stable = false;
      }
    }

    let mean = mean_duration(&times);
    warn!("平均推理时间: {:.2?}", mean);

    let annotation = first.ok_or_else(|| anyhow::anyhow!("没有推理结果"))?;
    output.render_result(&frame, &annotation)?;

    Ok(RepeatReport {
      runs: times.len(),
      mean,
      faces: annotation.boxes.len(),
      stable,
    })
  }
}
