// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/input/upload.rs - 标准输入上传的图像字节流
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

use std::io::Read;

use tracing::debug;
use url::Url;

use super::{ImageFileInput, ImageFileInputError};
use crate::{FromUrl, FromUrlWithScheme};

/// `stdin:`，从标准输入读取上传的 JPEG/PNG 字节流
pub struct UploadInput {
  inner: ImageFileInput,
}

impl FromUrlWithScheme for UploadInput {
  const SCHEME: &'static str = "stdin";
}

impl FromUrl for UploadInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ImageFileInputError::SchemaMismatch(url.scheme().to_string()));
    }

    Self::from_reader(std::io::stdin().lock())
  }
}

impl UploadInput {
  pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ImageFileInputError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!("收到上传数据 {} 字节", bytes.len());

    Ok(UploadInput {
      inner: ImageFileInput::from_bytes(&bytes)?,
    })
  }

  pub fn into_inner(self) -> ImageFileInput {
    self.inner
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageFormat, Rgb, RgbImage};
  use std::io::Cursor;

  #[test]
  fn reads_uploaded_bytes() {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::from_pixel(3, 5, Rgb([9, 9, 9]))
      .write_to(&mut bytes, ImageFormat::Png)
      .unwrap();

    let upload = UploadInput::from_reader(Cursor::new(bytes.into_inner())).unwrap();
    let frame = upload.into_inner().into_frames().next().unwrap();
    assert_eq!((frame.width(), frame.height()), (3, 5));
  }

  #[test]
  fn empty_upload_is_invalid() {
    let result = UploadInput::from_reader(Cursor::new(Vec::new()));
    assert!(matches!(result, Err(ImageFileInputError::InvalidImage(_))));
  }
}
