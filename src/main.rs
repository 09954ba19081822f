// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use kongdong::{
  TEST_SAMPLE_SIZE,
  context::InferenceContext,
  input::{GroundTruthInput, IMAGE_EXTENSION, ImageDirectoryInput},
  model::FpnSsdBuilder,
  output::DirectoryOutput,
  task::{SequentialTask, Task},
  video::{VideoPaths, VideoSelector},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.checkpoint.display());
  info!("输入根目录: {}", args.input.display());
  info!("输出根目录: {}", args.output.display());
  info!("目标类别: {}", args.class_id);

  let selector = VideoSelector::try_from(args.video_id)?;
  let limit = args.test_code.then_some(TEST_SAMPLE_SIZE);
  if args.test_code {
    warn!("测试模式: 每个视频只处理 {} 个样本，输出不保留", TEST_SAMPLE_SIZE);
  }

  let model = FpnSsdBuilder::new(&args.checkpoint)
    .accelerator(args.accelerator())
    .input_size(args.img_size)
    .score_thresh(args.score_threshold)
    .nms_thresh(args.nms_threshold)
    .build()?;
  let mut context = InferenceContext::new(model, args.class_id);

  for &name in selector.names() {
    let paths = VideoPaths::new(
      name,
      &args.input,
      &args.output,
      &args.labels,
      args.draw_ground_truth,
      &args.output_suffix,
    );
    info!("处理视频 {}", paths.name);
    info!("输入目录: {}", paths.input_dir.display());
    info!("输出目录: {}", paths.output_dir.display());
    std::fs::create_dir_all(&paths.output_dir)?;

    let output = DirectoryOutput::new(&paths.output_dir).with_test_mode(args.test_code);
    let summary = if args.draw_ground_truth {
      info!("标注文件: {}", paths.label_path.display());
      let input = GroundTruthInput::open(&paths.label_path, &paths.input_dir, args.class_id, limit)?;
      SequentialTask::default().run_task(input, &mut context, output)?
    } else {
      let input = ImageDirectoryInput::open(&paths.input_dir, IMAGE_EXTENSION, limit)?;
      SequentialTask::default().run_task(input, &mut context, output)?
    };

    info!(
      "视频 {} 完成: {} 帧，预测框 {} 个，真值框 {} 个",
      paths.name, summary.frames, summary.predicted_boxes, summary.ground_truth_boxes
    );
  }

  info!("全部完成");
  Ok(())
}
