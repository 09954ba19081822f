// 该文件是 Kongdong （空洞检测） 项目的一部分。
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

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;

  /// 模型要求的正方形输入边长
  fn input_size(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem {
  pub class_id: i32,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]，模型输入尺寸下的像素坐标
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl DetectResult {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn boxes(&self) -> Vec<[f32; 4]> {
    self.items.iter().map(|item| item.bbox).collect()
  }

  pub fn labels(&self) -> Vec<i32> {
    self.items.iter().map(|item| item.class_id).collect()
  }
}

impl From<Vec<DetectItem>> for DetectResult {
  fn from(items: Vec<DetectItem>) -> Self {
    Self {
      items: items.into_boxed_slice(),
    }
  }
}

mod box_coder;
mod device;
mod fpnssd;

pub use self::box_coder::{AnchorConfig, SsdBoxCoder};
pub use self::device::Accelerator;
pub use self::fpnssd::{FpnSsd, FpnSsdBuilder, FpnSsdError};
