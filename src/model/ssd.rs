// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/model/ssd.rs - SSD 人脸检测模型
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

use image::imageops::{self, FilterType};
use thiserror::Error;
use tracing::{debug, error, info};
use tract_onnx::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::BgrFrame,
  model::{DetectionError, DetectionTensor, Model},
  url_file_path,
};

const SSD_NUM_INPUTS: usize = 1;
const SSD_NUM_OUTPUTS: usize = 1;
pub(crate) const SSD_INPUT_W: u32 = 300;
pub(crate) const SSD_INPUT_H: u32 = 300;
/// 按 B, G, R 顺序减去的均值
pub(crate) const SSD_MEAN_BGR: [f32; 3] = [104.0, 117.0, 123.0];

type SsdPlan = TypedRunnableModel<TypedModel>;

/// 已加载的 res10 SSD 人脸检测器。加载开销大，应在进程启动时构建一次并以引用传递。
pub struct SsdFaceModel {
  plan: SsdPlan,
}

#[derive(Error, Debug)]
pub enum SsdError {
  #[error("模型文件读取错误: {0}")]
  ModelIoError(#[from] std::io::Error),
  #[error("模型加载错误: {0}")]
  ModelLoadError(String),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("推理错误: {0}")]
  InferenceError(String),
  #[error("模型输出错误: {0}")]
  MalformedOutput(#[from] DetectionError),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

pub struct SsdFaceBuilder {
  model_path: String,
}

impl FromUrlWithScheme for SsdFaceBuilder {
  const SCHEME: &'static str = "ssd";
}

impl FromUrl for SsdFaceBuilder {
  type Error = SsdError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(SsdError::ModelPathError(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(SsdFaceBuilder {
      model_path: url_file_path(url),
    })
  }
}

impl SsdFaceBuilder {
  pub fn with_path(path: impl Into<String>) -> Self {
    Self {
      model_path: path.into(),
    }
  }

  pub fn build(self) -> Result<SsdFaceModel, SsdError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let model = tract_onnx::onnx()
      .model_for_read(&mut model_data.as_slice())
      .map_err(|e| {
        error!("无法解析模型: {:#}", e);
        SsdError::ModelLoadError(format!("{e:#}"))
      })?;

    let num_inputs = model.inputs.len();
    let num_outputs = model.outputs.len();
    debug!("模型输入数量: {}, 输出数量: {}", num_inputs, num_outputs);
    if num_inputs != SSD_NUM_INPUTS || num_outputs != SSD_NUM_OUTPUTS {
      error!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        SSD_NUM_INPUTS, SSD_NUM_OUTPUTS, num_inputs, num_outputs
      );
      return Err(SsdError::ModelInvalid(format!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        SSD_NUM_INPUTS, SSD_NUM_OUTPUTS, num_inputs, num_outputs
      )));
    }

    info!("优化计算图");
    let plan = model
      .with_input_fact(
        0,
        f32::fact([1, 3, SSD_INPUT_H as usize, SSD_INPUT_W as usize]).into(),
      )
      .and_then(|model| model.into_optimized())
      .and_then(|model| model.into_runnable())
      .map_err(|e| {
        error!("无法构建推理计划: {:#}", e);
        SsdError::ModelLoadError(format!("{e:#}"))
      })?;
    info!("模型加载完成");

    Ok(SsdFaceModel { plan })
  }
}

/// 生成 NCHW 输入: 缩放到 300x300，按通道减均值，不交换 R/B，不裁剪
pub(crate) fn blob_from_frame(frame: &BgrFrame) -> tract_ndarray::Array4<f32> {
  let resized = imageops::resize(
    &frame.to_bgr_buffer(),
    SSD_INPUT_W,
    SSD_INPUT_H,
    FilterType::Triangle,
  );

  tract_ndarray::Array4::from_shape_fn(
    (1, 3, SSD_INPUT_H as usize, SSD_INPUT_W as usize),
    |(_, c, y, x)| resized.get_pixel(x as u32, y as u32)[c] as f32 - SSD_MEAN_BGR[c],
  )
}

impl Model for SsdFaceModel {
  type Input = BgrFrame;
  type Output = DetectionTensor;
  type Error = SsdError;

  fn infer(&self, input: &BgrFrame) -> Result<DetectionTensor, SsdError> {
    let blob: Tensor = blob_from_frame(input).into();

    let outputs = self.plan.run(tvec!(blob.into())).map_err(|e| {
      error!("推理失败: {:#}", e);
      SsdError::InferenceError(format!("{e:#}"))
    })?;

    let output = outputs
      .first()
      .ok_or_else(|| SsdError::ModelInvalid("模型没有输出".to_string()))?
      .to_array_view::<f32>()
      .map_err(|e| SsdError::InferenceError(format!("{e:#}")))?;

    let shape = output.shape().to_vec();
    debug!("模型输出形状: {:?}", shape);
    let data = output.iter().copied().collect::<Vec<_>>();
    Ok(DetectionTensor::new(&shape, data)?)
  }
}
