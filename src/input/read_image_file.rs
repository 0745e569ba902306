// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{BgrFrame, FromRgbImage},
  url_file_path,
};

/// 只接受 JPEG 与 PNG
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配: {0}")]
  SchemaMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("无效图像: {0}")]
  InvalidImage(#[from] image::ImageError),
  #[error("不支持的图像格式: {0}")]
  UnsupportedFormat(String),
}

/// 已解码的单张图像
#[derive(Debug)]
pub struct ImageFileInput {
  image: Option<BgrFrame>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch(url.scheme().to_string()));
    }

    Self::from_path(url_file_path(url))
  }
}

impl ImageFileInput {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    debug!("读取图像文件: {}", path.display());
    let bytes = std::fs::read(path)?;
    Self::from_bytes(&bytes)
  }

  /// 解码 JPEG/PNG 字节流。无法解码时返回 `InvalidImage`，不会产生空白帧。
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageFileInputError> {
    let format = image::guess_format(bytes)?;
    if !ALLOWED_FORMATS.contains(&format) {
      return Err(ImageFileInputError::UnsupportedFormat(format!("{format:?}")));
    }

    let image = image::load_from_memory_with_format(bytes, format)?.to_rgb8();
    debug!("图像尺寸: {}x{}", image.width(), image.height());

    Ok(ImageFileInput {
      image: Some(BgrFrame::from_rgb_image(&image)),
    })
  }

  pub fn into_frames(self) -> ImageFileFrames {
    ImageFileFrames { inner: self }
  }
}

pub struct ImageFileFrames {
  inner: ImageFileInput,
}

impl Iterator for ImageFileFrames {
  type Item = BgrFrame;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.image.take()
  }
}
