// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/bin/face_oneshot.rs - 单张图像人脸标注
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
  task::{OneShotTask, Task},
};
use tracing::info;

/// Renlian 人脸标注参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// SSD 人脸检测模型路径，例如 ssd:///models/res10_300x300_ssd.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源: image:///path/to.jpg、stdin: 或 example://faces
  #[arg(long, value_name = "SOURCE")]
  pub input: Option<Url>,
  /// 标注图像输出路径
  #[arg(long, value_name = "OUTPUT", default_value = "image:face_output.jpg")]
  pub output: Url,
  /// 同时保存送入检测器的预处理图像
  #[arg(long, value_name = "PATH")]
  pub processed: Option<String>,
  /// 检测记录输出路径，例如 record:///tmp/boxes.json
  #[arg(long, value_name = "RECORD")]
  pub record: Option<Url>,

  #[command(flatten)]
  pub params: DetectionParams,
}

/// 把 `--processed` 并入标注图像输出的 `?processed=` 查询参数
fn annotated_output_url(args: &Args) -> Url {
  let mut url = args.output.clone();
  if let Some(processed) = &args.processed {
    url.query_pairs_mut().append_pair("processed", processed);
  }
  url
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  args.params.validate()?;

  info!("模型文件路径: {}", args.model);
  info!("输出路径: {}", args.output);
  info!("检测参数: {:?}", args.params);

  let Some(input) = InputWrapper::resolve(args.input.as_ref())? else {
    println!("{}", NO_INPUT_PROMPT);
    return Ok(());
  };

  let mut outputs = vec![OutputWrapper::from_url(&annotated_output_url(&args))?];
  if let Some(record) = &args.record {
    outputs.push(OutputWrapper::from_url(record)?);
  }

  // 模型只加载一次，以引用传给任务
  let model = SsdFaceBuilder::from_url(&args.model)?.build()?;

  let annotation = OneShotTask::new(args.params).run_task(input.into_frames(), &model, outputs)?;

  println!("检测到 {} 张人脸", annotation.boxes.len());
  for bbox in &annotation.boxes {
    println!(
      "  - {:.2}% at [{}, {}, {}, {}]",
      bbox.score * 100.0,
      bbox.x1,
      bbox.y1,
      bbox.x2,
      bbox.y2
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn processed_query(url: &Url) -> Option<String> {
    url
      .query_pairs()
      .find(|(k, _)| k == "processed")
      .map(|(_, v)| v.into_owned())
  }

  #[test]
  fn processed_flag_is_forwarded_to_image_output() {
    let args = Args::try_parse_from([
      "face-oneshot",
      "--model",
      "ssd:///models/face.onnx",
      "--output",
      "image:///tmp/out.jpg",
      "--processed",
      "/tmp/my input.png",
    ])
    .unwrap();

    let url = annotated_output_url(&args);
    assert_eq!(url.path(), "/tmp/out.jpg");
    assert_eq!(processed_query(&url).as_deref(), Some("/tmp/my input.png"));
  }

  #[test]
  fn output_is_untouched_without_processed_flag() {
    let args = Args::try_parse_from(["face-oneshot", "--model", "ssd:///models/face.onnx"]).unwrap();
    let url = annotated_output_url(&args);
    assert_eq!(url.path(), "face_output.jpg");
    assert_eq!(processed_query(&url), None);
  }
}
