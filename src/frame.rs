// 该文件是 Renlian （人脸标注） 项目的一部分。
// src/frame.rs - BGR 帧定义
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

use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

pub const BGR_CHANNELS: usize = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
  #[error("通道数不匹配: 期望 {BGR_CHANNELS}, 实际 {0}")]
  ChannelMismatch(usize),
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 交错排列（HWC）的 8 位 BGR 图像。
///
/// 所有变换都以 `&BgrFrame` 为输入并返回新的帧，不会原地修改调用方的数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrFrame {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl BgrFrame {
  pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
    Self::from_raw(width, height, BGR_CHANNELS, data)
  }

  /// 由任意通道数的原始数据构造，只接受 3 通道。
  pub fn from_raw(
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
  ) -> Result<Self, FrameError> {
    if channels != BGR_CHANNELS {
      return Err(FrameError::ChannelMismatch(channels));
    }

    let expected = BGR_CHANNELS * width as usize * height as usize;
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  /// 以单一颜色填充的帧，颜色按 [B, G, R] 给出
  pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
    let data = bgr
      .iter()
      .copied()
      .cycle()
      .take(BGR_CHANNELS * width as usize * height as usize)
      .collect::<Vec<_>>();
    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    BGR_CHANNELS
  }

  pub fn as_bgr(&self) -> &[u8] {
    &self.data
  }

  pub fn into_raw(self) -> Vec<u8> {
    self.data.into_vec()
  }

  pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
    let idx = (y as usize * self.width as usize + x as usize) * BGR_CHANNELS;
    [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
  }

  /// 以 `ImageBuffer` 形式查看原始字节，通道顺序保持 BGR 不变，
  /// 用于只关心几何而不关心通道含义的操作（缩放、绘制）。
  pub(crate) fn to_bgr_buffer(&self) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    ImageBuffer::from_raw(self.width, self.height, self.data.to_vec())
      .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
  }

  pub(crate) fn from_bgr_buffer(buffer: ImageBuffer<Rgb<u8>, Vec<u8>>) -> Self {
    let (width, height) = buffer.dimensions();
    Self {
      width,
      height,
      data: buffer.into_raw().into_boxed_slice(),
    }
  }
}

impl AsMut<[u8]> for BgrFrame {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

pub trait FromRgbImage {
  fn from_rgb_image(image: &RgbImage) -> Self;
}

impl ToRgbImage for BgrFrame {
  fn to_rgb_image(&self) -> RgbImage {
    // 将 BGR 转为 RGB 图像
    ImageBuffer::from_fn(self.width, self.height, |x, y| {
      let [b, g, r] = self.pixel(x, y);
      Rgb([r, g, b])
    })
  }
}

impl FromRgbImage for BgrFrame {
  fn from_rgb_image(image: &RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut data = vec![0u8; width as usize * height as usize * BGR_CHANNELS];

    for (x, y, pixel) in image.enumerate_pixels() {
      let idx = (y as usize * width as usize + x as usize) * BGR_CHANNELS;
      data[idx] = pixel[2];
      data[idx + 1] = pixel[1];
      data[idx + 2] = pixel[0];
    }

    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }
}
