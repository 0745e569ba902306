// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/model.rs - 模型
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

use crate::frame::BgrFrame;

/// 检测张量每行的元素个数: [batch, class, confidence, x1, y1, x2, y2]
pub const DETECTION_ROW_LEN: usize = 7;

const CONFIDENCE_INDEX: usize = 2;
const BOX_INDEX: usize = 3;

/// 推理模型。推理只读取模型，不修改权重，因此只需 `&self`。
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 在（可能经过预处理的）图像上运行一次人脸检测
pub fn detect<M>(model: &M, image: &BgrFrame) -> Result<DetectionTensor, M::Error>
where
  M: Model<Input = BgrFrame, Output = DetectionTensor>,
{
  model.infer(image)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DetectionError {
  #[error("检测张量形状错误: 期望 [1, 1, N, {DETECTION_ROW_LEN}], 实际 {0:?}")]
  MalformedShape(Vec<usize>),
  #[error("检测张量数据长度不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 形状为 [1, 1, N, 7] 的检测输出，坐标归一化到 [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionTensor {
  data: Box<[f32]>,
}

impl DetectionTensor {
  pub fn new(shape: &[usize], data: Vec<f32>) -> Result<Self, DetectionError> {
    if shape.len() != 4 || shape[0] != 1 || shape[1] != 1 || shape[3] != DETECTION_ROW_LEN {
      return Err(DetectionError::MalformedShape(shape.to_vec()));
    }

    let expected = shape[2] * DETECTION_ROW_LEN;
    if data.len() != expected {
      return Err(DetectionError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }

  /// 由若干行构造，便于测试与桩模型使用
  pub fn from_rows(rows: &[[f32; DETECTION_ROW_LEN]]) -> Self {
    Self {
      data: rows.iter().flatten().copied().collect(),
    }
  }

  pub fn shape(&self) -> [usize; 4] {
    [1, 1, self.len(), DETECTION_ROW_LEN]
  }

  pub fn len(&self) -> usize {
    self.data.len() / DETECTION_ROW_LEN
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn rows(&self) -> impl Iterator<Item = DetectionRow<'_>> {
    self.data.chunks_exact(DETECTION_ROW_LEN).map(DetectionRow)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionRow<'a>(&'a [f32]);

impl DetectionRow<'_> {
  pub fn confidence(&self) -> f32 {
    self.0[CONFIDENCE_INDEX]
  }

  /// 归一化坐标 [x1, y1, x2, y2]
  pub fn bbox(&self) -> [f32; 4] {
    [
      self.0[BOX_INDEX],
      self.0[BOX_INDEX + 1],
      self.0[BOX_INDEX + 2],
      self.0[BOX_INDEX + 3],
    ]
  }
}

/// 像素坐标下的人脸框。不保证 x1 < x2、y1 < y2，也不保证在图像范围内。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
  pub score: f32,
}

impl BoundingBox {
  pub fn corners(&self) -> [i32; 4] {
    [self.x1, self.y1, self.x2, self.y2]
  }
}

#[cfg(feature = "model_ssd")]
mod ssd;
#[cfg(feature = "model_ssd")]
pub use self::ssd::{SsdError, SsdFaceBuilder, SsdFaceModel};
