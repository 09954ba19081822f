// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/context.rs - 推理上下文
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

use image::RgbImage;
use tracing::debug;

use crate::{
  bbox::{BoundingBox, filter_by_class, rescale},
  frame::Frame,
  model::{DetectResult, Model},
};

/// 模型与目标类别，程序启动时创建一次，贯穿所有视频
pub struct InferenceContext<M> {
  model: M,
  class_id: i32,
}

impl<M> InferenceContext<M>
where
  M: Model<Input = RgbImage, Output = DetectResult>,
{
  pub fn new(model: M, class_id: i32) -> Self {
    Self { model, class_id }
  }

  pub fn class_id(&self) -> i32 {
    self.class_id
  }

  pub fn input_size(&self) -> u32 {
    self.model.input_size()
  }

  /// 推理、按目标类别过滤，并映射回原图坐标
  pub fn predict(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, M::Error> {
    let result = self.model.infer(&frame.image)?;
    let boxes = filter_by_class(&result.boxes(), &result.labels(), self.class_id);
    debug!(
      "{}: 检测 {} 个，目标类别 {} 个",
      frame.name,
      result.len(),
      boxes.len()
    );
    Ok(rescale(
      &boxes,
      self.model.input_size(),
      frame.height(),
      frame.width(),
    ))
  }
}
