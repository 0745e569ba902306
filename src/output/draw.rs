// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/output/draw.rs - 人脸框绘制
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

use image::Rgb;
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{frame::BgrFrame, model::BoundingBox};

/// 边框颜色，按 [B, G, R] 给出（绿色）
pub const BOX_COLOR_BGR: [u8; 3] = [0, 255, 0];

/// 线宽随图像高度缩放: `max(1, round(height / 200))`，取整时 .5 向偶数舍入
pub fn line_thickness(frame_height: u32) -> u32 {
  ((frame_height as f64 / 200.0).round_ties_even() as u32).max(1)
}

pub struct Draw {
  color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      color: BOX_COLOR_BGR,
    }
  }
}

impl Draw {
  /// 在帧的副本上绘制全部人脸框。
  ///
  /// 坐标不做截断，超出画布的像素由 imageproc 的绘制函数逐像素裁剪丢弃。
  /// 左上/右下顺序颠倒的框按两个角点所张成的矩形绘制。
  pub fn draw_boxes(&self, frame: &BgrFrame, boxes: &[BoundingBox], thickness: u32) -> BgrFrame {
    let mut canvas = frame.to_bgr_buffer();
    for bbox in boxes {
      self.draw_bbox(&mut canvas, bbox, thickness);
    }
    BgrFrame::from_bgr_buffer(canvas)
  }

  fn draw_bbox(
    &self,
    canvas: &mut image::ImageBuffer<Rgb<u8>, Vec<u8>>,
    bbox: &BoundingBox,
    thickness: u32,
  ) {
    let left = bbox.x1.min(bbox.x2) as i64;
    let right = bbox.x1.max(bbox.x2) as i64;
    let top = bbox.y1.min(bbox.y2) as i64;
    let bottom = bbox.y1.max(bbox.y2) as i64;

    // 线宽以边线为中心向内外两侧展开
    let thickness = thickness.max(1) as i64;
    let outer = (thickness - 1) / 2;
    for offset in -outer..(thickness - outer) {
      let (x0, y0) = (left + offset, top + offset);
      let (x1, y1) = (right - offset, bottom - offset);
      if x1 < x0 || y1 < y0 {
        break;
      }
      let width = (x1 - x0 + 1).min(u32::MAX as i64) as u32;
      let height = (y1 - y0 + 1).min(u32::MAX as i64) as u32;
      let (Ok(x0), Ok(y0)) = (i32::try_from(x0), i32::try_from(y0)) else {
        continue;
      };
      let rect = Rect::at(x0, y0).of_size(width, height);
      draw_hollow_rect_mut(canvas, rect, Rgb(self.color));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bbox(x1: i32, y1: i32, x2: i32, y2: i32) -> BoundingBox {
    BoundingBox {
      x1,
      y1,
      x2,
      y2,
      score: 1.0,
    }
  }

  #[test]
  fn thickness_scales_with_height() {
    assert_eq!(line_thickness(50), 1);
    assert_eq!(line_thickness(100), 1);
    assert_eq!(line_thickness(299), 1);
    assert_eq!(line_thickness(300), 2);
    assert_eq!(line_thickness(500), 2);
    assert_eq!(line_thickness(1000), 5);
  }

  #[test]
  fn draws_outline_on_a_copy() {
    let frame = BgrFrame::filled(20, 20, [0, 0, 0]);
    let out = Draw::default().draw_boxes(&frame, &[bbox(2, 3, 10, 12)], 1);

    assert_eq!(frame.pixel(2, 3), [0, 0, 0]);
    assert_eq!(out.pixel(2, 3), BOX_COLOR_BGR);
    assert_eq!(out.pixel(10, 12), BOX_COLOR_BGR);
    assert_eq!(out.pixel(6, 3), BOX_COLOR_BGR);
    assert_eq!(out.pixel(6, 7), [0, 0, 0]);
    assert_eq!(out.pixel(11, 12), [0, 0, 0]);
  }

  #[test]
  fn thick_lines_grow_both_ways() {
    let frame = BgrFrame::filled(30, 30, [0, 0, 0]);
    let out = Draw::default().draw_boxes(&frame, &[bbox(10, 10, 20, 20)], 3);
    assert_eq!(out.pixel(9, 15), BOX_COLOR_BGR);
    assert_eq!(out.pixel(11, 15), BOX_COLOR_BGR);
    assert_eq!(out.pixel(8, 15), [0, 0, 0]);
    assert_eq!(out.pixel(12, 15), [0, 0, 0]);
  }

  #[test]
  fn out_of_bounds_boxes_are_clipped_by_the_canvas() {
    let frame = BgrFrame::filled(10, 10, [0, 0, 0]);
    let out = Draw::default().draw_boxes(&frame, &[bbox(-5, 2, 15, 7)], 1);
    assert_eq!((out.width(), out.height()), (10, 10));
    // 上下边跨越整幅图像，左右边落在画布外
    assert_eq!(out.pixel(0, 2), BOX_COLOR_BGR);
    assert_eq!(out.pixel(9, 7), BOX_COLOR_BGR);
    assert_eq!(out.pixel(0, 4), [0, 0, 0]);
    assert_eq!(out.pixel(9, 4), [0, 0, 0]);
  }

  #[test]
  fn swapped_corners_still_draw() {
    let frame = BgrFrame::filled(10, 10, [0, 0, 0]);
    let out = Draw::default().draw_boxes(&frame, &[bbox(8, 8, 1, 1)], 1);
    assert_eq!(out.pixel(1, 1), BOX_COLOR_BGR);
    assert_eq!(out.pixel(8, 8), BOX_COLOR_BGR);
  }
}
