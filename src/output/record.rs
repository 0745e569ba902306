// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/output/record.rs - 检测结果记录
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

use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, annotate::Annotation, frame::BgrFrame, output::Render,
  url_file_path,
};

#[derive(Error, Debug)]
pub enum RecordOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 人脸框的 JSON 记录
pub fn annotation_record(frame: &BgrFrame, result: &Annotation) -> Value {
  let faces = result
    .boxes
    .iter()
    .map(|b| {
      json!({
        "x1": b.x1,
        "y1": b.y1,
        "x2": b.x2,
        "y2": b.y2,
        "confidence": b.score,
      })
    })
    .collect::<Vec<_>>();

  json!({
    "width": frame.width(),
    "height": frame.height(),
    "threshold": result.threshold,
    "faces": faces,
  })
}

/// `record:///out/boxes.json`
pub struct RecordOutput {
  path: String,
}

impl FromUrlWithScheme for RecordOutput {
  const SCHEME: &'static str = "record";
}

impl FromUrl for RecordOutput {
  type Error = RecordOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(RecordOutputError::SchemeMismatch(uri.scheme().to_string()));
    }

    Ok(RecordOutput {
      path: url_file_path(uri),
    })
  }
}

impl Render<BgrFrame, Annotation> for RecordOutput {
  type Error = RecordOutputError;

  fn render_result(&self, frame: &BgrFrame, result: &Annotation) -> Result<(), Self::Error> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let record = annotation_record(frame, result);
    std::fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;
    info!("保存检测记录到文件: {}", self.path);
    Ok(())
  }
}
