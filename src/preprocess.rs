// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/preprocess.rs - 检测前的图像预处理
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
use tracing::debug;

use crate::{config::DetectionParams, frame::BgrFrame};

mod blur;
mod equalize;
mod gamma;

pub use self::blur::{BLUR_SKIP_MAX_KERNEL, blur};
pub use self::equalize::normalize_brightness;
pub use self::gamma::{apply_gamma, gamma_table};

#[derive(Error, Debug, PartialEq)]
pub enum PreprocessError {
  #[error("伽马值必须为正的有限数, 实际为 {0}")]
  InvalidGamma(f32),
}

/// 按参数依次执行 亮度均衡 -> 伽马校正 -> 模糊，返回新的帧。
pub fn preprocess(source: &BgrFrame, params: &DetectionParams) -> Result<BgrFrame, PreprocessError> {
  let image = if params.equalize_brightness {
    debug!("执行亮度直方图均衡化");
    normalize_brightness(source)
  } else {
    source.clone()
  };

  debug!("执行伽马校正: {}", params.gamma);
  let image = apply_gamma(&image, params.gamma)?;

  if params.blur_kernel_size > BLUR_SKIP_MAX_KERNEL {
    debug!("执行均值模糊, 核大小: {}", params.blur_kernel_size);
  }
  Ok(blur(&image, params.blur_kernel_size))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_params_leave_image_untouched() {
    let frame = BgrFrame::new(2, 1, vec![0, 64, 128, 200, 250, 255]).unwrap();
    let out = preprocess(&frame, &DetectionParams::default()).unwrap();
    assert_eq!(out, frame);
  }

  #[test]
  fn invalid_gamma_is_reported() {
    let frame = BgrFrame::filled(1, 1, [1, 2, 3]);
    let params = DetectionParams {
      gamma: 0.0,
      ..DetectionParams::default()
    };
    assert_eq!(
      preprocess(&frame, &params),
      Err(PreprocessError::InvalidGamma(0.0))
    );
  }

  #[test]
  fn all_steps_preserve_dimensions() {
    let data = (0..(8 * 6 * 3)).map(|v| (v * 5 % 256) as u8).collect();
    let frame = BgrFrame::new(8, 6, data).unwrap();
    let params = DetectionParams {
      equalize_brightness: true,
      gamma: 1.4,
      blur_kernel_size: 5,
      confidence: 0.5,
    };
    let out = preprocess(&frame, &params).unwrap();
    assert_eq!((out.width(), out.height()), (8, 6));
    assert_eq!(out.channels(), 3);
  }
}
