// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/label.rs - 真值标注解析
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
use tracing::debug;

use crate::bbox::BoundingBox;

/// 每个标注框占用的字段数: xmin ymin xmax ymax class
const FIELDS_PER_BOX: usize = 5;

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("无法读取标注文件 {0}: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("第 {line} 行: 缺少文件名")]
  MissingFilename { line: usize },
  #[error("第 {line} 行: 字段数 {count} 不是 5 的整数倍")]
  FieldCount { line: usize, count: usize },
  #[error("第 {line} 行: 无效坐标 '{value}'")]
  InvalidCoordinate { line: usize, value: String },
  #[error("第 {line} 行: 无效类别 '{value}'")]
  InvalidClass { line: usize, value: String },
}

/// 单张图像的真值标注
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthRecord {
  pub filename: String,
  pub boxes: Vec<BoundingBox>,
  pub labels: Vec<i32>,
}

impl GroundTruthRecord {
  /// 解析一行标注: `<文件名> x1 y1 x2 y2 c ...`
  ///
  /// 坐标按浮点数解析，就近取整（五成双）后减一，
  /// 从标注文件的 1 起始坐标转为 0 起始的像素坐标。
  /// `line` 为 1 起始行号，只用于错误信息。
  pub fn parse(text: &str, line: usize) -> Result<Self, LabelError> {
    let mut tokens = text.split_whitespace();
    let filename = tokens
      .next()
      .ok_or(LabelError::MissingFilename { line })?
      .to_string();

    let fields: Vec<&str> = tokens.collect();
    if fields.len() % FIELDS_PER_BOX != 0 {
      return Err(LabelError::FieldCount {
        line,
        count: fields.len(),
      });
    }

    let mut boxes = Vec::with_capacity(fields.len() / FIELDS_PER_BOX);
    let mut labels = Vec::with_capacity(fields.len() / FIELDS_PER_BOX);
    for group in fields.chunks_exact(FIELDS_PER_BOX) {
      let coord = |value: &str| parse_coordinate(value, line);
      boxes.push(BoundingBox::new(
        coord(group[0])?,
        coord(group[1])?,
        coord(group[2])?,
        coord(group[3])?,
      ));
      labels.push(
        group[4]
          .parse::<i32>()
          .map_err(|_| LabelError::InvalidClass {
            line,
            value: group[4].to_string(),
          })?,
      );
    }

    Ok(Self {
      filename,
      boxes,
      labels,
    })
  }
}

fn parse_coordinate(value: &str, line: usize) -> Result<i32, LabelError> {
  let invalid = || LabelError::InvalidCoordinate {
    line,
    value: value.to_string(),
  };
  let parsed = value.parse::<f64>().map_err(|_| invalid())?;
  if !parsed.is_finite() {
    return Err(invalid());
  }
  // 减一在浮点中完成，超出 i32 范围的坐标视为无效
  let shifted = parsed.round_ties_even() - 1.0;
  if shifted < i32::MIN as f64 || shifted > i32::MAX as f64 {
    return Err(invalid());
  }
  Ok(shifted as i32)
}

/// 单个视频的标注文件，每行对应一张图像
pub struct LabelFile {
  lines: Vec<String>,
}

impl LabelFile {
  /// 读取标注文件，`limit` 为 `Some(n)` 时只保留前 n 行
  pub fn open<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Self, LabelError> {
    let path = path.as_ref();
    let content =
      std::fs::read_to_string(path).map_err(|e| LabelError::IoError(path.to_path_buf(), e))?;

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    if let Some(limit) = limit {
      lines.truncate(limit);
    }
    debug!("标注文件 {} 共 {} 行", path.display(), lines.len());

    Ok(Self { lines })
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

impl IntoIterator for LabelFile {
  type Item = Result<GroundTruthRecord, LabelError>;
  type IntoIter = LabelRecords;

  fn into_iter(self) -> Self::IntoIter {
    LabelRecords {
      lines: self.lines.into_iter().enumerate(),
    }
  }
}

pub struct LabelRecords {
  lines: std::iter::Enumerate<std::vec::IntoIter<String>>,
}

impl Iterator for LabelRecords {
  type Item = Result<GroundTruthRecord, LabelError>;

  fn next(&mut self) -> Option<Self::Item> {
    self
      .lines
      .next()
      .map(|(index, text)| GroundTruthRecord::parse(&text, index + 1))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.lines.size_hint()
  }
}

impl ExactSizeIterator for LabelRecords {}
