// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/model/box_coder.rs - SSD 默认框生成与解码
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

use tracing::debug;

use crate::model::{DetectItem, DetectResult};

/// 位置偏移的方差 (中心, 宽高)
const SSD_VARIANCES: (f32, f32) = (0.1, 0.2);
pub const SSD_SCORE_THRESH: f32 = 0.6;
pub const SSD_NMS_THRESH: f32 = 0.45;

/// 各特征图上的默认框配置
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorConfig {
  pub steps: Vec<f32>,
  /// 比特征图数量多一个，相邻两项用于计算额外的正方形框
  pub box_sizes: Vec<f32>,
  pub aspect_ratios: Vec<Vec<f32>>,
  pub fm_sizes: Vec<usize>,
}

impl AnchorConfig {
  /// 512x512 输入的 SSD 配置
  pub fn ssd512() -> Self {
    Self {
      steps: vec![8.0, 16.0, 32.0, 64.0, 128.0, 256.0, 512.0],
      box_sizes: vec![35.84, 76.8, 153.6, 230.4, 307.2, 384.0, 460.8, 537.6],
      aspect_ratios: vec![
        vec![2.0],
        vec![2.0, 3.0],
        vec![2.0, 3.0],
        vec![2.0, 3.0],
        vec![2.0, 3.0],
        vec![2.0],
        vec![2.0],
      ],
      fm_sizes: vec![64, 32, 16, 8, 4, 2, 1],
    }
  }

  /// 默认框覆盖的输入边长，即最后一层特征图尺寸乘以步长
  pub fn input_size(&self) -> u32 {
    match (self.fm_sizes.last(), self.steps.last()) {
      (Some(&fm_size), Some(&step)) => (fm_size as f32 * step).round() as u32,
      _ => 0,
    }
  }

  /// 生成默认框，格式为 (cx, cy, w, h)
  ///
  /// 每个格点依次为：边长 s 的正方形、边长 sqrt(s_k * s_k+1) 的正方形、
  /// 每个宽高比 r 对应的 (s*sqrt(r), s/sqrt(r)) 与 (s/sqrt(r), s*sqrt(r))。
  pub fn default_boxes(&self) -> Vec<[f32; 4]> {
    let mut boxes = Vec::new();
    for (i, &fm_size) in self.fm_sizes.iter().enumerate() {
      let step = self.steps[i];
      let size = self.box_sizes[i];
      let next_size = (self.box_sizes[i] * self.box_sizes[i + 1]).sqrt();

      for h in 0..fm_size {
        for w in 0..fm_size {
          let cx = (w as f32 + 0.5) * step;
          let cy = (h as f32 + 0.5) * step;

          boxes.push([cx, cy, size, size]);
          boxes.push([cx, cy, next_size, next_size]);
          for &ratio in &self.aspect_ratios[i] {
            let r = ratio.sqrt();
            boxes.push([cx, cy, size * r, size / r]);
            boxes.push([cx, cy, size / r, size * r]);
          }
        }
      }
    }
    boxes
  }
}

/// 将网络输出的位置偏移与类别分数解码为检测框
pub struct SsdBoxCoder {
  default_boxes: Vec<[f32; 4]>,
  score_thresh: f32,
  nms_thresh: f32,
}

impl SsdBoxCoder {
  pub fn new(config: &AnchorConfig) -> Self {
    Self {
      default_boxes: config.default_boxes(),
      score_thresh: SSD_SCORE_THRESH,
      nms_thresh: SSD_NMS_THRESH,
    }
  }

  pub fn with_score_thresh(mut self, score_thresh: f32) -> Self {
    self.score_thresh = score_thresh;
    self
  }

  pub fn with_nms_thresh(mut self, nms_thresh: f32) -> Self {
    self.nms_thresh = nms_thresh;
    self
  }

  pub fn num_anchors(&self) -> usize {
    self.default_boxes.len()
  }

  /// 解码
  ///
  /// `loc` 为 `A x 4` 的位置偏移，`cls_logits` 为 `A x C` 的原始分数，
  /// 第 0 列是背景。第 i+1 列对应类别 i。
  /// 结果按类别升序排列，同一类别内按分数降序。
  pub fn decode(&self, loc: &[f32], cls_logits: &[f32], num_classes: usize) -> DetectResult {
    let num_anchors = self.num_anchors();
    debug_assert_eq!(loc.len(), num_anchors * 4);
    debug_assert_eq!(cls_logits.len(), num_anchors * num_classes);

    let (var_xy, var_wh) = SSD_VARIANCES;
    let boxes: Vec<[f32; 4]> = self
      .default_boxes
      .iter()
      .zip(loc.chunks_exact(4))
      .map(|(&[cx, cy, w, h], offset)| {
        let x = offset[0] * var_xy * w + cx;
        let y = offset[1] * var_xy * h + cy;
        let bw = (offset[2] * var_wh).exp() * w;
        let bh = (offset[3] * var_wh).exp() * h;
        [x - bw / 2.0, y - bh / 2.0, x + bw / 2.0, y + bh / 2.0]
      })
      .collect();

    let scores: Vec<f32> = cls_logits
      .chunks_exact(num_classes)
      .flat_map(softmax)
      .collect();

    let mut items = Vec::new();
    for class_id in 0..num_classes.saturating_sub(1) {
      let column = class_id + 1;
      let candidates: Vec<(usize, f32)> = (0..num_anchors)
        .map(|anchor| (anchor, scores[anchor * num_classes + column]))
        .filter(|&(_, score)| score > self.score_thresh)
        .collect();
      if candidates.is_empty() {
        continue;
      }

      let kept = nms(&boxes, candidates, self.nms_thresh);
      debug!("类别 {}: 保留 {} 个检测框", class_id, kept.len());
      items.extend(kept.into_iter().map(|(anchor, score)| DetectItem {
        class_id: class_id as i32,
        score,
        bbox: boxes[anchor],
      }));
    }

    DetectResult::from(items)
  }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
  let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
  let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
  let sum: f32 = exps.iter().sum();
  exps.into_iter().map(|v| v / sum).collect()
}

fn area(b: &[f32; 4]) -> f32 {
  (b[2] - b[0]) * (b[3] - b[1])
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
  let w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
  let h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
  let inter = w * h;
  inter / (area(a) + area(b) - inter)
}

/// 非极大值抑制，返回按分数降序保留的 (框索引, 分数)
fn nms(boxes: &[[f32; 4]], mut candidates: Vec<(usize, f32)>, thresh: f32) -> Vec<(usize, f32)> {
  candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

  let mut kept: Vec<(usize, f32)> = Vec::new();
  for (index, score) in candidates {
    // 与已保留框的重叠不超过阈值才保留
    if kept
      .iter()
      .all(|&(k, _)| iou(&boxes[k], &boxes[index]) <= thresh)
    {
      kept.push((index, score));
    }
  }
  kept
}
