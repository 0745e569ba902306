// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/input.rs - 图像输入
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

use thiserror::Error;

use crate::FromUrl;
#[cfg(feature = "read_image_file")]
use crate::FromUrlWithScheme;

/// 既没有上传图片也没有选择示例时给出的提示
pub const NO_INPUT_PROMPT: &str = "Please upload an image or select an example.";

#[cfg(feature = "read_image_file")]
mod example;
#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
mod upload;

#[cfg(feature = "read_image_file")]
pub use self::example::{DEFAULT_SAMPLE_DIR, ExampleImage, ExampleInput};
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ImageFileFrames, ImageFileInput, ImageFileInputError};
#[cfg(feature = "read_image_file")]
pub use self::upload::UploadInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_image_file")]
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("未知的示例图片: {0}")]
  UnknownExample(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  #[cfg(feature = "read_image_file")]
  ReadImageFile(ImageFileInput),
  #[cfg(feature = "read_image_file")]
  Upload(UploadInput),
  #[cfg(feature = "read_image_file")]
  Example(ExampleInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "read_image_file")]
    {
      if url.scheme() == ImageFileInput::SCHEME {
        return Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?));
      }
      if url.scheme() == UploadInput::SCHEME {
        return Ok(InputWrapper::Upload(UploadInput::from_url(url)?));
      }
      if url.scheme() == ExampleInput::SCHEME {
        return Ok(InputWrapper::Example(ExampleInput::from_url(url)?));
      }
    }
    Err(InputError::SchemeMismatch(url.scheme().to_string()))
  }
}

impl InputWrapper {
  /// 没有任何输入时返回 `Ok(None)`，由调用方输出 [`NO_INPUT_PROMPT`] 并正常结束
  pub fn resolve(url: Option<&url::Url>) -> Result<Option<Self>, InputError> {
    url.map(Self::from_url).transpose()
  }

  #[cfg(feature = "read_image_file")]
  pub fn into_frames(self) -> ImageFileFrames {
    match self {
      InputWrapper::ReadImageFile(input) => input.into_frames(),
      InputWrapper::Upload(input) => input.into_inner().into_frames(),
      InputWrapper::Example(input) => input.into_inner().into_frames(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_input_is_not_an_error() {
    assert!(InputWrapper::resolve(None).unwrap().is_none());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = url::Url::parse("v4l2:///dev/video0").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(s)) if s == "v4l2"
    ));
  }
}
