// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::{io::Cursor, path::Path};

use image::ImageFormat;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  annotate::Annotation,
  frame::{BgrFrame, ToRgbImage},
  output::Render,
  url_file_path,
};

/// 将标注后的图像编码为可供下载的 JPEG 字节流
pub fn encode_jpeg(frame: &BgrFrame) -> Result<Vec<u8>, image::ImageError> {
  let mut bytes = Cursor::new(Vec::new());
  frame.to_rgb_image().write_to(&mut bytes, ImageFormat::Jpeg)?;
  Ok(bytes.into_inner())
}

/// `image:///out/face_output.jpg?processed=/out/processed.jpg`
///
/// 保存标注图像；可选地同时保存送入检测器的预处理图像。
pub struct SaveImageFileOutput {
  path: String,
  processed_path: Option<String>,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let processed_path = uri
      .query_pairs()
      .find(|(k, _)| k == "processed")
      .map(|(_, v)| v.into_owned());

    Ok(SaveImageFileOutput {
      path: url_file_path(uri),
      processed_path,
    })
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      processed_path: None,
    }
  }

  pub fn with_processed(mut self, path: impl Into<String>) -> Self {
    self.processed_path = Some(path.into());
    self
  }

  fn save_image(&self, path: &str, frame: &BgrFrame) -> Result<(), SaveImageFileError> {
    if let Some(parent) = Path::new(path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    // 无法从扩展名判断格式时按 JPEG 保存
    let format = ImageFormat::from_path(path)
      .ok()
      .filter(|f| matches!(f, ImageFormat::Jpeg | ImageFormat::Png))
      .unwrap_or(ImageFormat::Jpeg);

    if format == ImageFormat::Jpeg {
      std::fs::write(path, encode_jpeg(frame)?)?;
    } else {
      frame.to_rgb_image().save_with_format(path, format)?;
    }

    info!("保存图像到文件: {}", path);
    Ok(())
  }
}

impl Render<BgrFrame, Annotation> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, _frame: &BgrFrame, result: &Annotation) -> Result<(), Self::Error> {
    if let Some(processed_path) = &self.processed_path {
      self.save_image(processed_path, &result.processed)?;
    }
    self.save_image(&self.path, &result.annotated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn annotation() -> Annotation {
    Annotation {
      processed: BgrFrame::filled(8, 6, [10, 10, 10]),
      annotated: BgrFrame::filled(8, 6, [0, 255, 0]),
      boxes: Vec::new(),
      threshold: 0.5,
    }
  }

  #[test]
  fn encodes_decodable_jpeg() {
    let frame = BgrFrame::filled(16, 9, [0, 0, 255]);
    let bytes = encode_jpeg(&frame).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 9));
  }

  #[test]
  fn saves_annotated_and_processed_images() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested/face_output.jpg");
    let processed = dir.path().join("processed.png");
    let output = SaveImageFileOutput::new(out.to_string_lossy())
      .with_processed(processed.to_string_lossy());

    let result = annotation();
    output.render_result(&result.processed, &result).unwrap();

    let saved = image::open(&out).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (8, 6));
    let saved = image::open(&processed).unwrap().to_rgb8();
    assert_eq!(saved.get_pixel(3, 3).0, [10, 10, 10]);
  }

  #[test]
  fn parses_processed_query() {
    let url = Url::parse("image:///tmp/out.jpg?processed=/tmp/in.jpg").unwrap();
    let output = SaveImageFileOutput::from_url(&url).unwrap();
    assert_eq!(output.path, "/tmp/out.jpg");
    assert_eq!(output.processed_path.as_deref(), Some("/tmp/in.jpg"));
  }
}
