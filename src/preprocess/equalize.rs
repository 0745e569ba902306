// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/preprocess/equalize.rs - 亮度直方图均衡化
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

use image::GrayImage;
use imageproc::stats::cumulative_histogram;

use crate::frame::{BGR_CHANNELS, BgrFrame};

// BT.601 全范围 YCrCb 系数
const KR: f32 = 0.299;
const KG: f32 = 0.587;
const KB: f32 = 0.114;
const CR_SCALE: f32 = 0.713;
const CB_SCALE: f32 = 0.564;
const CHROMA_OFFSET: f32 = 128.0;

fn saturate(v: f32) -> u8 {
  v.round().clamp(0.0, 255.0) as u8
}

fn bgr_to_ycrcb([b, g, r]: [u8; 3]) -> [u8; 3] {
  let (b, g, r) = (b as f32, g as f32, r as f32);
  let y = KR * r + KG * g + KB * b;
  let cr = (r - y) * CR_SCALE + CHROMA_OFFSET;
  let cb = (b - y) * CB_SCALE + CHROMA_OFFSET;
  [saturate(y), saturate(cr), saturate(cb)]
}

fn ycrcb_to_bgr([y, cr, cb]: [u8; 3]) -> [u8; 3] {
  let y = y as f32;
  let cr = cr as f32 - CHROMA_OFFSET;
  let cb = cb as f32 - CHROMA_OFFSET;
  let r = y + 1.403 * cr;
  let g = y - 0.714 * cr - 0.344 * cb;
  let b = y + 1.773 * cb;
  [saturate(b), saturate(g), saturate(r)]
}

/// 由累积直方图生成均衡化查找表: 最暗的已占用灰度映射到 0，最亮的映射到 255。
/// 只有一种灰度时返回恒等表。
fn equalize_table(luma: &GrayImage) -> [u8; 256] {
  let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);

  let Some(cdf) = cumulative_histogram(luma).channels.into_iter().next() else {
    return table;
  };
  let total = cdf[255];
  let Some(&cdf_min) = cdf.iter().find(|&&c| c > 0) else {
    return table;
  };
  if total == cdf_min {
    return table;
  }

  let scale = 255.0 / (total - cdf_min) as f64;
  for (v, &c) in table.iter_mut().zip(cdf.iter()) {
    *v = ((c.saturating_sub(cdf_min)) as f64 * scale)
      .round()
      .clamp(0.0, 255.0) as u8;
  }
  table
}

/// 只对亮度通道做直方图均衡化，色度保持不变，尺寸与通道数不变。
pub fn normalize_brightness(image: &BgrFrame) -> BgrFrame {
  let ycrcb = image
    .as_bgr()
    .chunks_exact(BGR_CHANNELS)
    .map(|p| bgr_to_ycrcb([p[0], p[1], p[2]]))
    .collect::<Vec<_>>();

  let luma = GrayImage::from_fn(image.width(), image.height(), |x, y| {
    image::Luma([ycrcb[(y * image.width() + x) as usize][0]])
  });
  let table = equalize_table(&luma);

  let mut output = image.clone();
  for ((dst, [_, cr, cb]), y) in output
    .as_mut()
    .chunks_exact_mut(BGR_CHANNELS)
    .zip(ycrcb)
    .zip(luma.into_raw())
  {
    dst.copy_from_slice(&ycrcb_to_bgr([table[y as usize], cr, cb]));
  }
  output
}
