// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/task.rs - 推理任务
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
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
  context::InferenceContext,
  frame::Frame,
  input::FrameInput,
  model::{DetectResult, Model},
  output::{Annotations, Render},
};

pub trait Task<I, C, O>: Sized {
  type Error;
  fn run_task(self, input: I, context: C, output: O) -> Result<TaskSummary, Self::Error>;
}

/// 单个视频的处理统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
  pub frames: usize,
  pub predicted_boxes: usize,
  pub ground_truth_boxes: usize,
}

/// 逐帧顺序处理，任何错误立即中止，已写出的结果保留
#[derive(Default, Debug)]
pub struct SequentialTask {
  hide_progress: bool,
}

impl SequentialTask {
  pub fn with_hidden_progress(mut self, hide_progress: bool) -> Self {
    self.hide_progress = hide_progress;
    self
  }

  fn progress_bar(&self, total: usize) -> anyhow::Result<ProgressBar> {
    if self.hide_progress {
      return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
      ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}] {msg}")?
        .progress_chars("##-"),
    );
    Ok(pb)
  }
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: FrameInput,
  M: Model<Input = RgbImage, Output = DetectResult, Error = ME>,
  O: Render<Frame, Error = RE>,
> Task<I, &mut InferenceContext<M>, O> for SequentialTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    context: &mut InferenceContext<M>,
    output: O,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务，共 {} 帧", input.total());
    let pb = self.progress_bar(input.total())?;
    let mut summary = TaskSummary::default();

    for sample in input {
      let sample = sample?;
      pb.set_message(sample.frame.name.clone());

      let predictions = context.predict(&sample.frame)?;
      debug!("{}: 预测框 {} 个", sample.frame.name, predictions.len());

      summary.frames += 1;
      summary.predicted_boxes += predictions.len();
      summary.ground_truth_boxes += sample.ground_truth.as_ref().map_or(0, Vec::len);

      let annotations = Annotations {
        predictions,
        ground_truth: sample.ground_truth,
      };
      output.render_result(sample.frame, &annotations)?;
      pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
      "任务完成: {} 帧，预测框 {} 个，真值框 {} 个",
      summary.frames, summary.predicted_boxes, summary.ground_truth_boxes
    );
    Ok(summary)
  }
}
