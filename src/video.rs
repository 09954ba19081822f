// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/video.rs - 视频选择
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

/// 已标注的视频，按编号排列
pub const VIDEO_NAMES: [&str; 2] = ["20180215_185312", "20180215_190227"];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("未知的视频编号 {0}，可选值为 -1（全部）、0、1")]
pub struct UnknownVideoId(pub i8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSelector {
  All,
  Single(usize),
}

impl TryFrom<i8> for VideoSelector {
  type Error = UnknownVideoId;

  fn try_from(id: i8) -> Result<Self, Self::Error> {
    match id {
      -1 => Ok(VideoSelector::All),
      id if id >= 0 && (id as usize) < VIDEO_NAMES.len() => Ok(VideoSelector::Single(id as usize)),
      id => Err(UnknownVideoId(id)),
    }
  }
}

impl VideoSelector {
  pub fn names(&self) -> &'static [&'static str] {
    match *self {
      VideoSelector::All => &VIDEO_NAMES,
      VideoSelector::Single(index) => &VIDEO_NAMES[index..=index],
    }
  }
}

/// 单个视频的输入、输出与标注路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPaths {
  pub name: &'static str,
  pub input_dir: PathBuf,
  pub output_dir: PathBuf,
  pub label_path: PathBuf,
}

impl VideoPaths {
  /// 输出目录为 `<output>/<video>[_gt][_<suffix>]`
  pub fn new(
    name: &'static str,
    input_root: &Path,
    output_root: &Path,
    labels_root: &Path,
    with_ground_truth: bool,
    suffix: &str,
  ) -> Self {
    let mut output_name = name.to_string();
    if with_ground_truth {
      output_name.push_str("_gt");
    }
    if !suffix.is_empty() {
      output_name.push('_');
      output_name.push_str(suffix);
    }

    Self {
      name,
      input_dir: input_root.join(name),
      output_dir: output_root.join(output_name),
      label_path: labels_root.join(format!("{}.txt", name)),
    }
  }
}
