// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/preprocess/blur.rs - 均值模糊
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

use crate::frame::{BGR_CHANNELS, BgrFrame};

/// 核大小不超过该值时跳过模糊
pub const BLUR_SKIP_MAX_KERNEL: u32 = 3;

/// k x k 均值模糊。
///
/// `kernel_size <= 3` 时原样返回。窗口锚点为 `(k / 2, k / 2)`，偶数核向左上多延伸一个像素；
/// 边界采用复制边缘像素的方式扩展。结果四舍五入。
pub fn blur(image: &BgrFrame, kernel_size: u32) -> BgrFrame {
  if kernel_size <= BLUR_SKIP_MAX_KERNEL {
    return image.clone();
  }

  let width = image.width() as usize;
  let height = image.height() as usize;
  if width == 0 || height == 0 {
    return image.clone();
  }

  let k = kernel_size as i64;
  let before = k / 2;
  let after = k - 1 - before;
  let src = image.as_bgr();

  // 先水平方向求和，再竖直方向求和
  let mut rows = vec![0u32; src.len()];
  for y in 0..height {
    let line = &src[y * width * BGR_CHANNELS..(y + 1) * width * BGR_CHANNELS];
    for x in 0..width {
      for c in 0..BGR_CHANNELS {
        let mut sum = 0u32;
        for dx in -before..=after {
          let sx = clamp_index(x as i64 + dx, width);
          sum += line[sx * BGR_CHANNELS + c] as u32;
        }
        rows[(y * width + x) * BGR_CHANNELS + c] = sum;
      }
    }
  }

  let area = (k * k) as u32;
  let mut output = image.clone();
  let dst = output.as_mut();
  for y in 0..height {
    for x in 0..width {
      for c in 0..BGR_CHANNELS {
        let mut sum = 0u32;
        for dy in -before..=after {
          let sy = clamp_index(y as i64 + dy, height);
          sum += rows[(sy * width + x) * BGR_CHANNELS + c];
        }
        dst[(y * width + x) * BGR_CHANNELS + c] = ((sum + area / 2) / area) as u8;
      }
    }
  }

  output
}

fn clamp_index(i: i64, len: usize) -> usize {
  i.clamp(0, len as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
  use super::*;

  fn checkerboard(width: u32, height: u32) -> BgrFrame {
    let mut data = Vec::new();
    for y in 0..height {
      for x in 0..width {
        let v = if (x + y) % 2 == 0 { 0 } else { 255 };
        data.extend_from_slice(&[v, v / 2, 255 - v]);
      }
    }
    BgrFrame::new(width, height, data).unwrap()
  }

  #[test]
  fn small_kernels_are_skipped() {
    let image = checkerboard(7, 5);
    for k in 0..=3 {
      assert_eq!(blur(&image, k).as_bgr(), image.as_bgr());
    }
  }

  #[test]
  fn uniform_image_stays_uniform() {
    let image = BgrFrame::filled(9, 7, [12, 99, 201]);
    assert_eq!(blur(&image, 5), image);
    assert_eq!(blur(&image, 8), image);
  }

  #[test]
  fn blur_smooths_and_keeps_shape() {
    let image = checkerboard(10, 10);
    let out = blur(&image, 5);
    assert_eq!((out.width(), out.height()), (10, 10));
    // 5x5 窗口内 13 个 0 与 12 个 255（或相反），中心像素趋近中值
    let [b, _, r] = out.pixel(5, 5);
    assert!((100..=155).contains(&b), "b = {b}");
    assert!((100..=155).contains(&r), "r = {r}");
  }

  #[test]
  fn edges_replicate_border_pixels() {
    // 左半 0，右半 200 的竖直分界
    let mut data = Vec::new();
    for _y in 0..4 {
      for x in 0..8 {
        let v = if x < 4 { 0 } else { 200 };
        data.extend_from_slice(&[v, v, v]);
      }
    }
    let image = BgrFrame::new(8, 4, data).unwrap();
    let out = blur(&image, 5);
    // 远离分界的边缘列只看到复制出来的同色像素
    assert_eq!(out.pixel(0, 0), [0, 0, 0]);
    assert_eq!(out.pixel(7, 3), [200, 200, 200]);
    // 分界左侧列: 窗口 x in [1, 5]，两列为 200
    assert_eq!(out.pixel(3, 0), [80, 80, 80]);
  }
}
