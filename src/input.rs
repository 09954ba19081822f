// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/input.rs - 图像目录与标注文件输入
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

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  bbox::filter_by_class,
  frame::{Frame, Sample},
  label::{GroundTruthRecord, LabelError, LabelFile, LabelRecords},
};

/// 图像目录中参与推理的文件扩展名
pub const IMAGE_EXTENSION: &str = "jpg";

#[derive(Error, Debug)]
pub enum InputError {
  #[error("读取目录 {0} 失败: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("图像 {0} 加载失败: {1}")]
  ImageLoadError(PathBuf, image::ImageError),
  #[error("标注错误: {0}")]
  LabelError(#[from] LabelError),
}

/// 顺序产出样本的输入源
pub trait FrameInput: Iterator<Item = Result<Sample, InputError>> {
  /// 本次运行将产出的样本数
  fn total(&self) -> usize;
}

fn load_frame(path: &Path) -> Result<Frame, InputError> {
  Frame::load(path).map_err(|e| InputError::ImageLoadError(path.to_path_buf(), e))
}

/// 仅预测模式：按文件名字典序遍历目录下的图像
pub struct ImageDirectoryInput {
  files: std::vec::IntoIter<PathBuf>,
  total: usize,
}

impl ImageDirectoryInput {
  pub fn open<P: AsRef<Path>>(
    directory: P,
    extension: &str,
    limit: Option<usize>,
  ) -> Result<Self, InputError> {
    let directory = directory.as_ref();
    let io_error = |e| InputError::IoError(directory.to_path_buf(), e);

    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory).map_err(io_error)? {
      let path = entry.map_err(io_error)?.path();
      if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
        files.push(path);
      }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if let Some(limit) = limit {
      files.truncate(limit);
    }

    info!(
      "输入目录 {} 中共 {} 张 {} 图像",
      directory.display(),
      files.len(),
      extension
    );
    let total = files.len();
    Ok(Self {
      files: files.into_iter(),
      total,
    })
  }
}

impl Iterator for ImageDirectoryInput {
  type Item = Result<Sample, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.files.next()?;
    debug!("读取图像: {}", path.display());
    Some(load_frame(&path).map(|frame| Sample {
      frame,
      ground_truth: None,
    }))
  }
}

impl FrameInput for ImageDirectoryInput {
  fn total(&self) -> usize {
    self.total
  }
}

/// 真值模式：逐行读取标注，加载对应图像并保留目标类别的真值框
pub struct GroundTruthInput {
  image_dir: PathBuf,
  class_id: i32,
  records: LabelRecords,
  total: usize,
}

impl GroundTruthInput {
  pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
    label_path: P,
    image_dir: Q,
    class_id: i32,
    limit: Option<usize>,
  ) -> Result<Self, InputError> {
    let label_file = LabelFile::open(label_path.as_ref(), limit)?;
    info!(
      "标注文件 {} 中共 {} 条记录",
      label_path.as_ref().display(),
      label_file.len()
    );
    let total = label_file.len();
    Ok(Self {
      image_dir: image_dir.as_ref().to_path_buf(),
      class_id,
      records: label_file.into_iter(),
      total,
    })
  }

  fn read_sample(&self, record: GroundTruthRecord) -> Result<Sample, InputError> {
    let ground_truth = filter_by_class(&record.boxes, &record.labels, self.class_id);

    let path = self.image_dir.join(&record.filename);
    debug!("读取图像: {}，真值框 {} 个", path.display(), ground_truth.len());
    let mut frame = load_frame(&path)?;
    // 输出沿用标注中的文件名
    frame.name = record.filename;

    Ok(Sample {
      frame,
      ground_truth: Some(ground_truth),
    })
  }
}

impl Iterator for GroundTruthInput {
  type Item = Result<Sample, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    let record = self.records.next()?;
    Some(record.map_err(InputError::from).and_then(|r| self.read_sample(r)))
  }
}

impl FrameInput for GroundTruthInput {
  fn total(&self) -> usize {
    self.total
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bbox::BoundingBox;
  use image::{Rgb, RgbImage};

  fn write_image(dir: &Path, name: &str) {
    RgbImage::from_pixel(16, 8, Rgb([1, 2, 3]))
      .save(dir.join(name))
      .unwrap();
  }

  #[test]
  fn lists_only_matching_extension_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "b.jpg");
    write_image(dir.path(), "a.jpg");
    write_image(dir.path(), "c.png");
    std::fs::create_dir(dir.path().join("d.jpg")).unwrap();

    let input = ImageDirectoryInput::open(dir.path(), IMAGE_EXTENSION, None).unwrap();
    assert_eq!(input.total(), 2);

    let names: Vec<String> = input.map(|s| s.unwrap().frame.name).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
  }

  #[test]
  fn directory_limit_truncates() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
      write_image(dir.path(), &format!("{:02}.jpg", i));
    }

    let input = ImageDirectoryInput::open(dir.path(), IMAGE_EXTENSION, Some(3)).unwrap();
    assert_eq!(input.total(), 3);
    let samples: Vec<Sample> = input.map(Result::unwrap).collect();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[2].frame.name, "02.jpg");
    assert!(samples.iter().all(|s| s.ground_truth.is_none()));
    assert_eq!(samples[0].frame.width(), 16);
  }

  #[test]
  fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ImageDirectoryInput::open(dir.path().join("missing"), IMAGE_EXTENSION, None);
    assert!(matches!(result, Err(InputError::IoError(..))));
  }

  #[test]
  fn ground_truth_is_filtered_to_target_class() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "frame1.jpg");
    let label_path = dir.path().join("video.txt");
    std::fs::write(&label_path, "frame1.jpg 10 10 50 50 0 20 20 30 30 1\n").unwrap();

    let mut input = GroundTruthInput::open(&label_path, dir.path(), 0, None).unwrap();
    assert_eq!(input.total(), 1);

    let sample = input.next().unwrap().unwrap();
    assert_eq!(sample.frame.name, "frame1.jpg");
    assert_eq!(
      sample.ground_truth,
      Some(vec![BoundingBox::new(9, 9, 49, 49)])
    );
    assert!(input.next().is_none());
  }

  #[test]
  fn missing_image_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let label_path = dir.path().join("video.txt");
    std::fs::write(&label_path, "absent.jpg 10 10 50 50 0\n").unwrap();

    let mut input = GroundTruthInput::open(&label_path, dir.path(), 0, None).unwrap();
    assert!(matches!(
      input.next(),
      Some(Err(InputError::ImageLoadError(..)))
    ));
  }

  #[test]
  fn malformed_label_line_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let label_path = dir.path().join("video.txt");
    std::fs::write(&label_path, "frame1.jpg 10 10 50\n").unwrap();

    let mut input = GroundTruthInput::open(&label_path, dir.path(), 0, None).unwrap();
    assert!(matches!(
      input.next(),
      Some(Err(InputError::LabelError(LabelError::FieldCount { .. })))
    ));
  }
}
