// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/frame.rs - 帧定义与 NCHW 张量转换
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

use std::path::Path;

use image::{ImageReader, RgbImage, imageops::FilterType};
use ndarray::Array4;

use crate::bbox::BoundingBox;

const RGB_CHANNELS: usize = 3;

/// ImageNet 均值与标准差
const NORMALIZE_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const NORMALIZE_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// 原始分辨率的单帧图像，写出后即丢弃
#[derive(Debug, Clone)]
pub struct Frame {
  /// 文件名，输出时沿用
  pub name: String,
  pub image: RgbImage,
}

impl Frame {
  pub fn new(name: impl Into<String>, image: RgbImage) -> Self {
    Self {
      name: name.into(),
      image,
    }
  }

  /// 读取并解码图像文件，统一转换为 RGB8
  ///
  /// 格式按文件内容识别，扩展名与内容不符的帧同样可以加载。
  pub fn load(path: &Path) -> Result<Self, image::ImageError> {
    let image = ImageReader::open(path)?
      .with_guessed_format()?
      .decode()?
      .to_rgb8();
    let name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    Ok(Self { name, image })
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}

/// 一个待处理样本：帧与（已按类别过滤的）真值框
#[derive(Debug, Clone)]
pub struct Sample {
  pub frame: Frame,
  pub ground_truth: Option<Vec<BoundingBox>>,
}

/// 缩放到 `size x size` 后转为 `1x3xHxW` 的归一化浮点张量
pub fn to_normalized_nchw(image: &RgbImage, size: u32) -> Array4<f32> {
  let resized = image::imageops::resize(image, size, size, FilterType::Triangle);
  let side = size as usize;

  let mut tensor = Array4::<f32>::zeros((1, RGB_CHANNELS, side, side));
  for (x, y, pixel) in resized.enumerate_pixels() {
    for c in 0..RGB_CHANNELS {
      let value = pixel[c] as f32 / 255.0;
      tensor[[0, c, y as usize, x as usize]] = (value - NORMALIZE_MEAN[c]) / NORMALIZE_STD[c];
    }
  }
  tensor
}
