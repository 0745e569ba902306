// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/bin/face_benchmark_repeatshot.rs - 重复推理基准测试
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use renlian::{
  FromUrl,
  config::DetectionParams,
  input::{InputWrapper, NO_INPUT_PROMPT},
  model::SsdFaceBuilder,
  output::OutputWrapper,
  task::{DEFAULT_REPEAT_TIMES, RepeatShotTask, Task},
};
use tracing::info;

/// Renlian 基准测试参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// SSD 人脸检测模型路径
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Option<Url>,
  /// 可选的输出路径（只渲染首次结果）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<Url>,
  /// 重复次数
  #[arg(long, default_value_t = DEFAULT_REPEAT_TIMES, value_name = "TIMES")]
  pub repeat: usize,

  #[command(flatten)]
  pub params: DetectionParams,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  args.params.validate()?;

  info!("模型文件路径: {}", args.model);
  info!("重复次数: {}", args.repeat);

  let Some(input) = InputWrapper::resolve(args.input.as_ref())? else {
    println!("{}", NO_INPUT_PROMPT);
    return Ok(());
  };

  let outputs = args
    .output
    .as_ref()
    .map(OutputWrapper::from_url)
    .transpose()?
    .into_iter()
    .collect::<Vec<_>>();

  let model = SsdFaceBuilder::from_url(&args.model)?.build()?;

  let report = RepeatShotTask::new(args.params)
    .with_repeat(args.repeat)
    .run_task(input.into_frames(), &model, outputs)?;

  println!("运行次数: {}", report.runs);
  println!("平均推理时间: {:.2?}", report.mean);
  println!("人脸数量: {}", report.faces);
  println!("结果稳定: {}", if report.stable { "是" } else { "否" });

  Ok(())
}
