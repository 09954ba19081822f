// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use kongdong::model::Accelerator;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
  Cuda,
  Cpu,
}

/// Kongdong 空洞检测结果绘制
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 视频帧图像根目录，每个视频一个子目录
  #[arg(long, default_value = "../../data/voids/", value_name = "DIR")]
  pub input: PathBuf,

  /// 输出根目录
  #[arg(long, default_value = "outputs", value_name = "DIR")]
  pub output: PathBuf,

  /// 导出的 ONNX 模型文件
  #[arg(
    long,
    default_value = "checkpoints/2018-02-16_first-model.onnx",
    value_name = "FILE"
  )]
  pub checkpoint: PathBuf,

  /// 视频编号: -1 全部, 0 为 20180215_185312, 1 为 20180215_190227
  #[arg(
    long,
    default_value_t = -1,
    allow_hyphen_values = true,
    value_parser = clap::value_parser!(i8).range(-1..=1),
    value_name = "ID"
  )]
  pub video_id: i8,

  /// 同时绘制真值框（绿色）
  #[arg(long)]
  pub draw_ground_truth: bool,

  /// GPU 编号
  #[arg(long, default_value_t = 0, value_name = "ID")]
  pub gpu: u32,

  /// 冒烟测试：每个视频只处理前 10 个样本，写出后立即删除
  #[arg(long)]
  pub test_code: bool,

  /// 推理设备，默认使用 GPU，不自动回退
  #[arg(long, value_enum, default_value_t = Device::Cuda)]
  pub device: Device,

  /// 目标类别编号（0 为空洞）
  #[arg(long, default_value_t = 0, allow_hyphen_values = true, value_name = "ID")]
  pub class_id: i32,

  /// 标注文件目录
  #[arg(long, default_value = "labels", value_name = "DIR")]
  pub labels: PathBuf,

  /// 模型输入边长
  #[arg(long, default_value_t = 512, value_name = "PIXELS")]
  pub img_size: u32,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = 0.6, value_name = "THRESHOLD")]
  pub score_threshold: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = 0.45, value_name = "THRESHOLD")]
  pub nms_threshold: f32,

  /// 输出目录名后缀
  #[arg(long, default_value = "", value_name = "SUFFIX")]
  pub output_suffix: String,
}

impl Args {
  pub fn accelerator(&self) -> Accelerator {
    match self.device {
      Device::Cuda => Accelerator::Cuda(self.gpu),
      Device::Cpu => Accelerator::Cpu,
    }
  }
}
