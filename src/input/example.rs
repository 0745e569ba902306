// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/input/example.rs - 内置示例图片
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

use std::{path::PathBuf, str::FromStr};

use tracing::info;
use url::Url;

use super::{ImageFileInput, InputError};
use crate::{FromUrl, FromUrlWithScheme};

pub const DEFAULT_SAMPLE_DIR: &str = "sample";

/// 可供选择的示例图片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleImage {
  Faces,
  Dog,
  TamarindoBeach,
}

impl ExampleImage {
  pub const ALL: [ExampleImage; 3] = [
    ExampleImage::Faces,
    ExampleImage::Dog,
    ExampleImage::TamarindoBeach,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      ExampleImage::Faces => "faces",
      ExampleImage::Dog => "dog",
      ExampleImage::TamarindoBeach => "tamarindo-beach",
    }
  }

  pub fn file_name(&self) -> &'static str {
    match self {
      ExampleImage::Faces => "faces.jpg",
      ExampleImage::Dog => "dog.jpg",
      ExampleImage::TamarindoBeach => "Tamarindo_Beach.jpg",
    }
  }
}

impl FromStr for ExampleImage {
  type Err = InputError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|example| example.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| InputError::UnknownExample(s.to_string()))
  }
}

/// `example://faces?dir=sample`
pub struct ExampleInput {
  inner: ImageFileInput,
}

impl FromUrlWithScheme for ExampleInput {
  const SCHEME: &'static str = "example";
}

impl FromUrl for ExampleInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    let name = url.host_str().unwrap_or_default();
    let example = name.parse::<ExampleImage>()?;
    let dir = url
      .query_pairs()
      .find(|(k, _)| k == "dir")
      .map(|(_, v)| PathBuf::from(v.into_owned()))
      .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DIR));

    let path = dir.join(example.file_name());
    info!("使用示例图片 {}: {}", example.name(), path.display());
    let inner = ImageFileInput::from_path(&path)?;

    Ok(ExampleInput { inner })
  }
}

impl ExampleInput {
  pub fn into_inner(self) -> ImageFileInput {
    self.inner
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn parses_example_names() {
    assert_eq!("faces".parse::<ExampleImage>().unwrap(), ExampleImage::Faces);
    assert_eq!(
      "Tamarindo-Beach".parse::<ExampleImage>().unwrap(),
      ExampleImage::TamarindoBeach
    );
    assert!(matches!(
      "cat".parse::<ExampleImage>(),
      Err(InputError::UnknownExample(name)) if name == "cat"
    ));
  }

  #[test]
  fn loads_example_from_sample_dir() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(6, 4, Rgb([1, 2, 3]))
      .save(dir.path().join("dog.jpg"))
      .unwrap();

    let url = Url::parse(&format!(
      "example://dog?dir={}",
      urlencoding::encode(&dir.path().to_string_lossy())
    ))
    .unwrap();
    let input = ExampleInput::from_url(&url).unwrap();
    let frame = input.into_inner().into_frames().next().unwrap();
    assert_eq!((frame.width(), frame.height()), (6, 4));
  }

  #[test]
  fn missing_example_file_is_reported() {
    let url = Url::parse("example://faces?dir=/nonexistent").unwrap();
    assert!(matches!(
      ExampleInput::from_url(&url),
      Err(InputError::ImageFileInputError(_))
    ));
  }
}
