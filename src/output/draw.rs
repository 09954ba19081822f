// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/output/draw.rs - 检测框与真值框可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{bbox::BoundingBox, output::Annotations};

const PREDICTION_COLOR: [u8; 3] = [255, 0, 0]; // 红色
const GROUND_TRUTH_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const LINE_THICKNESS: u32 = 2;

pub struct Draw {
  prediction_color: Rgb<u8>,
  ground_truth_color: Rgb<u8>,
  thickness: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      prediction_color: Rgb(PREDICTION_COLOR),
      ground_truth_color: Rgb(GROUND_TRUTH_COLOR),
      thickness: LINE_THICKNESS,
    }
  }
}

impl Draw {
  /// 先画真值，再画预测，预测框压在上层
  pub fn draw_annotations(&self, image: &mut RgbImage, annotations: &Annotations) {
    if let Some(ground_truth) = &annotations.ground_truth {
      self.draw_boxes(image, ground_truth, self.ground_truth_color);
    }
    self.draw_boxes(image, &annotations.predictions, self.prediction_color);
  }

  pub fn draw_boxes(&self, image: &mut RgbImage, boxes: &[BoundingBox], color: Rgb<u8>) {
    for bbox in boxes {
      self.draw_bbox(image, bbox, color);
    }
  }

  // 框可以部分或完全越界，先收缩到图像外一圈，越界的边仍落在图像外
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    let margin = self.thickness as i64 + 1;
    let (w, h) = (image.width() as i64, image.height() as i64);
    let clamp_x = |v: i32| (v as i64).clamp(-margin, w + margin);
    let clamp_y = |v: i32| (v as i64).clamp(-margin, h + margin);

    let x0 = clamp_x(bbox.xmin.min(bbox.xmax));
    let x1 = clamp_x(bbox.xmin.max(bbox.xmax));
    let y0 = clamp_y(bbox.ymin.min(bbox.ymax));
    let y1 = clamp_y(bbox.ymin.max(bbox.ymax));

    // 向内逐像素加粗
    for t in 0..self.thickness as i64 {
      let (left, right, top, bottom) = (x0 + t, x1 - t, y0 + t, y1 - t);
      if left > right || top > bottom {
        break;
      }
      let rect = Rect::at(left as i32, top as i32)
        .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
      draw_hollow_rect_mut(image, rect, color);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

  #[test]
  fn prediction_outline_is_two_pixels_thick() {
    let mut image = RgbImage::new(20, 20);
    let annotations = Annotations {
      predictions: vec![BoundingBox::new(2, 2, 12, 12)],
      ground_truth: None,
    };
    Draw::default().draw_annotations(&mut image, &annotations);

    let red = Rgb(PREDICTION_COLOR);
    assert_eq!(*image.get_pixel(2, 2), red);
    assert_eq!(*image.get_pixel(12, 12), red);
    assert_eq!(*image.get_pixel(3, 7), red);
    assert_eq!(*image.get_pixel(11, 7), red);
    assert_eq!(*image.get_pixel(4, 7), BLACK);
    assert_eq!(*image.get_pixel(1, 1), BLACK);
    assert_eq!(*image.get_pixel(13, 13), BLACK);
  }

  #[test]
  fn predictions_are_drawn_over_ground_truth() {
    let mut image = RgbImage::new(20, 20);
    let annotations = Annotations {
      predictions: vec![BoundingBox::new(5, 5, 15, 15)],
      ground_truth: Some(vec![
        BoundingBox::new(5, 5, 15, 15),
        BoundingBox::new(0, 0, 3, 3),
      ]),
    };
    Draw::default().draw_annotations(&mut image, &annotations);

    assert_eq!(*image.get_pixel(5, 5), Rgb(PREDICTION_COLOR));
    assert_eq!(*image.get_pixel(0, 0), Rgb(GROUND_TRUTH_COLOR));
  }

  #[test]
  fn out_of_bounds_and_swapped_boxes_do_not_panic() {
    let mut image = RgbImage::new(10, 10);
    let boxes = [
      BoundingBox::new(-20, -20, 30, 30),
      BoundingBox::new(100, 100, 200, 200),
      BoundingBox::new(8, 8, 2, 2),
      BoundingBox::new(4, 4, 4, 4),
      BoundingBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX),
    ];
    Draw::default().draw_boxes(&mut image, &boxes, Rgb(PREDICTION_COLOR));

    // 交换了角点的框按归一化后的矩形绘制
    assert_eq!(*image.get_pixel(2, 2), Rgb(PREDICTION_COLOR));
    assert_eq!(*image.get_pixel(8, 8), Rgb(PREDICTION_COLOR));
    assert_eq!(*image.get_pixel(4, 4), Rgb(PREDICTION_COLOR));
  }
}
