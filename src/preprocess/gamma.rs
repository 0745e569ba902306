// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/preprocess/gamma.rs - 伽马校正
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

use super::PreprocessError;
use crate::frame::BgrFrame;

/// 计算伽马查找表: `table[i] = round(255 * (i / 255) ^ (1 / gamma))`。
///
/// gamma 小于 1 时图像变暗，大于 1 时变亮，等于 1 时为恒等映射。
pub fn gamma_table(gamma: f32) -> Result<[u8; 256], PreprocessError> {
  if !gamma.is_finite() || gamma <= 0.0 {
    return Err(PreprocessError::InvalidGamma(gamma));
  }

  let inv_gamma = 1.0 / gamma as f64;
  let mut table = [0u8; 256];
  for (i, entry) in table.iter_mut().enumerate() {
    let value = (i as f64 / 255.0).powf(inv_gamma) * 255.0;
    *entry = value.round().clamp(0.0, 255.0) as u8;
  }
  Ok(table)
}

/// 对每个通道值查表，返回新的帧
pub fn apply_gamma(image: &BgrFrame, gamma: f32) -> Result<BgrFrame, PreprocessError> {
  let table = gamma_table(gamma)?;
  let mut output = image.clone();
  for value in output.as_mut() {
    *value = table[*value as usize];
  }
  Ok(output)
}
