// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/bbox.rs - 边界框、类别过滤与坐标缩放
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

/// 像素坐标系下的轴对齐边界框，原点在左上角
///
/// 不强制 `xmin <= xmax`、`ymin <= ymax`，绘制时会自行归一化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
  pub xmin: i32,
  pub ymin: i32,
  pub xmax: i32,
  pub ymax: i32,
}

impl BoundingBox {
  pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
    Self {
      xmin,
      ymin,
      xmax,
      ymax,
    }
  }

  /// 以 `[xmin, ymin, xmax, ymax]` 形式返回
  pub fn to_array(&self) -> [i32; 4] {
    [self.xmin, self.ymin, self.xmax, self.ymax]
  }
}

impl From<[i32; 4]> for BoundingBox {
  fn from([xmin, ymin, xmax, ymax]: [i32; 4]) -> Self {
    Self::new(xmin, ymin, xmax, ymax)
  }
}

impl From<BoundingBox> for [f32; 4] {
  fn from(bbox: BoundingBox) -> Self {
    [
      bbox.xmin as f32,
      bbox.ymin as f32,
      bbox.xmax as f32,
      bbox.ymax as f32,
    ]
  }
}

/// 从 (框, 类别) 并列序列中挑出指定类别的框，保持原有顺序
///
/// 两个序列长度不一致时按较短者配对。
pub fn filter_by_class<B: Clone>(boxes: &[B], labels: &[i32], class_id: i32) -> Vec<B> {
  boxes
    .iter()
    .zip(labels)
    .filter(|(_, label)| **label == class_id)
    .map(|(bbox, _)| bbox.clone())
    .collect()
}

/// 将模型输入尺寸下的坐标映射回原图尺寸
///
/// 横纵两个方向分别按 `width / model_size`、`height / model_size` 缩放，
/// 结果四舍六入五成双取整。不做越界裁剪。
pub fn rescale(boxes: &[[f32; 4]], model_size: u32, height: u32, width: u32) -> Vec<BoundingBox> {
  let x_ratio = width as f64 / model_size as f64;
  let y_ratio = height as f64 / model_size as f64;

  boxes
    .iter()
    .map(|&[x1, y1, x2, y2]| BoundingBox {
      xmin: scale_coord(x1, x_ratio),
      ymin: scale_coord(y1, y_ratio),
      xmax: scale_coord(x2, x_ratio),
      ymax: scale_coord(y2, y_ratio),
    })
    .collect()
}

fn scale_coord(value: f32, ratio: f64) -> i32 {
  (value as f64 * ratio).round_ties_even() as i32
}
