// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/annotate.rs - 检测结果过滤与标注
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
use tracing::{debug, info};

use crate::{
  config::DetectionParams,
  frame::BgrFrame,
  model::{BoundingBox, DetectionRow, DetectionTensor, Model, detect},
  output::draw::{Draw, line_thickness},
  preprocess::{PreprocessError, preprocess},
};

/// 归一化坐标乘以帧宽高后向零截断为整数像素坐标，不做越界截断
pub fn to_pixel_box(row: &DetectionRow<'_>, frame_width: u32, frame_height: u32) -> BoundingBox {
  let [x1, y1, x2, y2] = row.bbox();
  let (w, h) = (frame_width as f32, frame_height as f32);
  BoundingBox {
    x1: (x1 * w) as i32,
    y1: (y1 * h) as i32,
    x2: (x2 * w) as i32,
    y2: (y2 * h) as i32,
    score: row.confidence(),
  }
}

/// 保留置信度严格大于阈值的检测，按原始顺序返回像素坐标框
pub fn filter_detections(
  detections: &DetectionTensor,
  frame_width: u32,
  frame_height: u32,
  threshold: f32,
) -> Vec<BoundingBox> {
  detections
    .rows()
    .filter(|row| row.confidence() > threshold)
    .map(|row| to_pixel_box(&row, frame_width, frame_height))
    .collect()
}

/// 过滤检测结果并绘制到 `original` 的副本上。
///
/// `original` 是用于展示的未处理图像，检测可以在另一张经过预处理的图像上完成；
/// 两者尺寸相同时坐标一致。`original` 本身不会被修改。
pub fn filter_and_draw(
  original: &BgrFrame,
  detections: &DetectionTensor,
  threshold: f32,
) -> (BgrFrame, Vec<BoundingBox>) {
  let boxes = filter_detections(detections, original.width(), original.height(), threshold);
  let thickness = line_thickness(original.height());
  let annotated = Draw::default().draw_boxes(original, &boxes, thickness);
  (annotated, boxes)
}

#[derive(Error, Debug)]
pub enum AnnotateError {
  #[error("预处理错误: {0}")]
  Preprocess(#[from] PreprocessError),
  #[error("检测错误: {0}")]
  Detect(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// 一次标注的全部产物
#[derive(Debug, Clone)]
pub struct Annotation {
  /// 实际送入检测器的预处理后图像
  pub processed: BgrFrame,
  /// 画有人脸框的原图副本
  pub annotated: BgrFrame,
  pub boxes: Vec<BoundingBox>,
  pub threshold: f32,
}

/// 预处理 -> 检测 -> 在原图上标注。模型由调用方构建一次后以引用注入。
pub struct Annotator<'m, M> {
  model: &'m M,
  params: DetectionParams,
}

impl<'m, M, E> Annotator<'m, M>
where
  M: Model<Input = BgrFrame, Output = DetectionTensor, Error = E>,
  E: std::error::Error + Send + Sync + 'static,
{
  pub fn new(model: &'m M, params: DetectionParams) -> Self {
    Self { model, params }
  }

  pub fn annotate(&self, source: &BgrFrame) -> Result<Annotation, AnnotateError> {
    let processed = preprocess(source, &self.params)?;
    let detections =
      detect(self.model, &processed).map_err(|e| AnnotateError::Detect(Box::new(e)))?;
    debug!("模型返回 {} 条候选检测", detections.len());

    let (annotated, boxes) = filter_and_draw(source, &detections, self.params.confidence);
    info!(
      "置信度阈值 {:.2} 下检测到 {} 张人脸",
      self.params.confidence,
      boxes.len()
    );

    Ok(Annotation {
      processed,
      annotated,
      boxes,
      threshold: self.params.confidence,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn single(confidence: f32) -> DetectionTensor {
    DetectionTensor::from_rows(&[[0.0, 1.0, confidence, 0.1, 0.1, 0.5, 0.5]])
  }

  #[test]
  fn threshold_keeps_or_drops_a_single_detection() {
    let frame = BgrFrame::filled(200, 100, [0, 0, 0]);
    assert_eq!(filter_and_draw(&frame, &single(0.9), 0.5).1.len(), 1);
    assert_eq!(filter_and_draw(&frame, &single(0.9), 0.95).1.len(), 0);
  }

  #[test]
  fn confidence_equal_to_threshold_is_excluded() {
    let frame = BgrFrame::filled(200, 100, [0, 0, 0]);
    let (annotated, boxes) = filter_and_draw(&frame, &single(0.5), 0.5);
    assert!(boxes.is_empty());
    assert_eq!(annotated, frame);
  }

  #[test]
  fn normalized_coordinates_map_to_pixels() {
    let frame = BgrFrame::filled(200, 100, [0, 0, 0]);
    let (_, boxes) = filter_and_draw(&frame, &single(0.9), 0.5);
    assert_eq!(boxes[0].corners(), [20, 10, 100, 50]);
    assert_eq!(boxes[0].score, 0.9);
  }

  #[test]
  fn out_of_range_coordinates_pass_through() {
    let tensor = DetectionTensor::from_rows(&[[0.0, 1.0, 0.99, -0.25, 0.5, 1.5, 1.2]]);
    let boxes = filter_detections(&tensor, 100, 40, 0.5);
    assert_eq!(boxes[0].corners(), [-25, 20, 150, 48]);
  }

  #[test]
  fn keeps_detection_order() {
    let tensor = DetectionTensor::from_rows(&[
      [0.0, 1.0, 0.7, 0.0, 0.0, 0.1, 0.1],
      [0.0, 1.0, 0.2, 0.2, 0.2, 0.3, 0.3],
      [0.0, 1.0, 0.95, 0.5, 0.5, 0.9, 0.9],
    ]);
    let boxes = filter_detections(&tensor, 10, 10, 0.5);
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].corners(), [0, 0, 1, 1]);
    assert_eq!(boxes[1].corners(), [5, 5, 9, 9]);
  }

  #[test]
  fn original_frame_is_not_modified() {
    let frame = BgrFrame::filled(200, 100, [7, 7, 7]);
    let before = frame.clone();
    let (annotated, _) = filter_and_draw(&frame, &single(0.9), 0.5);
    assert_eq!(frame, before);
    assert_ne!(annotated, frame);
    assert_eq!(annotated.pixel(20, 10), [0, 255, 0]);
  }
}
