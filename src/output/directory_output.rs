// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/output/directory_output.rs - 目录输出
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

use crate::{
  frame::Frame,
  output::{Annotations, Render, draw::Draw},
};

#[derive(Error, Debug)]
pub enum DirectoryOutputError {
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 将标注后的帧按原文件名写入输出目录
pub struct DirectoryOutput {
  directory: PathBuf,
  draw: Draw,
  test_mode: bool,
}

impl DirectoryOutput {
  pub fn new<P: AsRef<Path>>(directory: P) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      draw: Draw::default(),
      test_mode: false,
    }
  }

  /// 测试模式下写出后立即删除，只验证写入路径
  pub fn with_test_mode(mut self, test_mode: bool) -> Self {
    self.test_mode = test_mode;
    self
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn frame_path(&self, frame: &Frame) -> PathBuf {
    self.directory.join(&frame.name)
  }
}

impl Render<Frame> for DirectoryOutput {
  type Error = DirectoryOutputError;

  fn render_result(&self, frame: Frame, annotations: &Annotations) -> Result<(), Self::Error> {
    let path = self.frame_path(&frame);
    let mut image = frame.image;
    self.draw.draw_annotations(&mut image, annotations);

    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }
    image.save(&path)?;
    debug!("保存图像到文件: {}", path.display());

    if self.test_mode {
      std::fs::remove_file(&path)?;
      debug!("测试模式，已删除: {}", path.display());
    }

    Ok(())
  }
}
