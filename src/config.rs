// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/config.rs - 检测参数配置
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

use clap::Args;
use thiserror::Error;

pub const DEFAULT_GAMMA: f32 = 1.0;
pub const MAX_GAMMA: f32 = 2.0;
pub const MAX_BLUR_KERNEL_SIZE: u32 = 100;
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
  #[error("无法解析数值: {0}")]
  NotANumber(String),
  #[error("伽马值必须在 (0, {MAX_GAMMA}] 之间, 实际为 {0}")]
  GammaOutOfRange(f32),
  #[error("置信度阈值必须在 [0, 1] 之间, 实际为 {0}")]
  ConfidenceOutOfRange(f32),
  #[error("模糊核大小必须在 [0, {MAX_BLUR_KERNEL_SIZE}] 之间, 实际为 {0}")]
  KernelSizeOutOfRange(u32),
}

/// 预处理与检测参数
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DetectionParams {
  /// 直方图均衡化亮度（拉伸亮度分布以增加对比度）
  #[arg(long, default_value_t = false)]
  pub equalize_brightness: bool,

  /// 伽马/曝光校正 (0.0, 2.0]，1.0 表示不变
  #[arg(long, default_value_t = DEFAULT_GAMMA, value_parser = parse_gamma, value_name = "GAMMA")]
  pub gamma: f32,

  /// 模糊核大小 (0 - 100)，不大于 3 时不进行模糊
  #[arg(long, default_value_t = 0, value_parser = parse_kernel_size, value_name = "SIZE")]
  pub blur_kernel_size: u32,

  /// 置信度阈值 (0.0 - 1.0)，只保留置信度严格大于阈值的人脸
  #[arg(long, default_value_t = DEFAULT_CONFIDENCE, value_parser = parse_confidence, value_name = "THRESHOLD")]
  pub confidence: f32,
}

impl Default for DetectionParams {
  fn default() -> Self {
    Self {
      equalize_brightness: false,
      gamma: DEFAULT_GAMMA,
      blur_kernel_size: 0,
      confidence: DEFAULT_CONFIDENCE,
    }
  }
}

impl DetectionParams {
  pub fn validate(&self) -> Result<(), ConfigError> {
    check_gamma(self.gamma)?;
    check_confidence(self.confidence)?;
    check_kernel_size(self.blur_kernel_size)?;
    Ok(())
  }
}

fn parse_f32(s: &str) -> Result<f32, ConfigError> {
  s.trim()
    .parse::<f32>()
    .map_err(|_| ConfigError::NotANumber(s.to_string()))
}

fn check_gamma(gamma: f32) -> Result<f32, ConfigError> {
  if gamma.is_finite() && gamma > 0.0 && gamma <= MAX_GAMMA {
    Ok(gamma)
  } else {
    Err(ConfigError::GammaOutOfRange(gamma))
  }
}

fn check_confidence(confidence: f32) -> Result<f32, ConfigError> {
  if (0.0..=1.0).contains(&confidence) {
    Ok(confidence)
  } else {
    Err(ConfigError::ConfidenceOutOfRange(confidence))
  }
}

fn check_kernel_size(size: u32) -> Result<u32, ConfigError> {
  if size <= MAX_BLUR_KERNEL_SIZE {
    Ok(size)
  } else {
    Err(ConfigError::KernelSizeOutOfRange(size))
  }
}

pub fn parse_gamma(s: &str) -> Result<f32, ConfigError> {
  check_gamma(parse_f32(s)?)
}

pub fn parse_confidence(s: &str) -> Result<f32, ConfigError> {
  check_confidence(parse_f32(s)?)
}

pub fn parse_kernel_size(s: &str) -> Result<u32, ConfigError> {
  let size = s
    .trim()
    .parse::<u32>()
    .map_err(|_| ConfigError::NotANumber(s.to_string()))?;
  check_kernel_size(size)
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[derive(Parser, Debug)]
  struct TestArgs {
    #[command(flatten)]
    params: DetectionParams,
  }

  #[test]
  fn defaults_match_the_tool_defaults() {
    let args = TestArgs::try_parse_from(["test"]).unwrap();
    assert_eq!(args.params, DetectionParams::default());
    assert!(args.params.validate().is_ok());
  }

  #[test]
  fn parses_all_parameters() {
    let args = TestArgs::try_parse_from([
      "test",
      "--equalize-brightness",
      "--gamma",
      "1.5",
      "--blur-kernel-size",
      "9",
      "--confidence",
      "0.9",
    ])
    .unwrap();
    assert!(args.params.equalize_brightness);
    assert_eq!(args.params.gamma, 1.5);
    assert_eq!(args.params.blur_kernel_size, 9);
    assert_eq!(args.params.confidence, 0.9);
  }

  #[test]
  fn rejects_out_of_range_values() {
    assert!(TestArgs::try_parse_from(["test", "--gamma", "0"]).is_err());
    assert!(TestArgs::try_parse_from(["test", "--gamma", "2.5"]).is_err());
    assert!(TestArgs::try_parse_from(["test", "--confidence", "1.01"]).is_err());
    assert!(TestArgs::try_parse_from(["test", "--blur-kernel-size", "101"]).is_err());
    assert_eq!(
      parse_gamma("abc"),
      Err(ConfigError::NotANumber("abc".to_string()))
    );
  }

  #[test]
  fn boundary_values_are_accepted() {
    assert_eq!(parse_gamma("2.0"), Ok(2.0));
    assert_eq!(parse_confidence("0"), Ok(0.0));
    assert_eq!(parse_confidence("1"), Ok(1.0));
    assert_eq!(parse_kernel_size("100"), Ok(100));
  }
}
