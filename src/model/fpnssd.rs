// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/model/fpnssd.rs - FPN-SSD 模型
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

use image::RgbImage;
use ndarray::Array4;
use ort::{
  session::{Session, builder::GraphOptimizationLevel},
  value::TensorRef,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  frame::to_normalized_nchw,
  model::{
    Accelerator, AnchorConfig, DetectResult, Model, SsdBoxCoder,
    box_coder::{SSD_NMS_THRESH, SSD_SCORE_THRESH},
  },
};

pub const FPNSSD_INPUT_SIZE: u32 = 512;
const FPNSSD_LOC_OUTPUT: &str = "loc_preds";
const FPNSSD_CLS_OUTPUT: &str = "cls_preds";

#[derive(Error, Debug)]
pub enum FpnSsdError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(#[from] ort::Error),
  #[error("模型输出不匹配: {0}")]
  OutputMismatch(String),
  #[error("输入尺寸 {input_size} 与默认框配置的 {anchor_size} 不一致")]
  InputSizeMismatch { input_size: u32, anchor_size: u32 },
}

pub struct FpnSsdBuilder {
  model_path: PathBuf,
  accelerator: Accelerator,
  input_size: u32,
  anchors: AnchorConfig,
  score_thresh: f32,
  nms_thresh: f32,
}

impl FpnSsdBuilder {
  pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
    Self {
      model_path: model_path.as_ref().to_path_buf(),
      accelerator: Accelerator::default(),
      input_size: FPNSSD_INPUT_SIZE,
      anchors: AnchorConfig::ssd512(),
      score_thresh: SSD_SCORE_THRESH,
      nms_thresh: SSD_NMS_THRESH,
    }
  }

  pub fn accelerator(mut self, accelerator: Accelerator) -> Self {
    self.accelerator = accelerator;
    self
  }

  pub fn input_size(mut self, input_size: u32) -> Self {
    self.input_size = input_size;
    self
  }

  pub fn anchors(mut self, anchors: AnchorConfig) -> Self {
    self.anchors = anchors;
    self
  }

  pub fn score_thresh(mut self, score_thresh: f32) -> Self {
    self.score_thresh = score_thresh;
    self
  }

  pub fn nms_thresh(mut self, nms_thresh: f32) -> Self {
    self.nms_thresh = nms_thresh;
    self
  }

  pub fn build(self) -> Result<FpnSsd, FpnSsdError> {
    let anchor_size = self.anchors.input_size();
    if self.input_size != anchor_size {
      return Err(FpnSsdError::InputSizeMismatch {
        input_size: self.input_size,
        anchor_size,
      });
    }

    info!("加载模型文件: {}", self.model_path.display());
    let model_size = std::fs::metadata(&self.model_path)?.len();
    debug!(
      "模型文件大小: {:.2} MB",
      model_size as f64 / (1024.0 * 1024.0)
    );

    info!("创建 ONNX Runtime 推理会话 ({})", self.accelerator);
    let session = create_session(&self.model_path, self.accelerator)?;

    let box_coder = SsdBoxCoder::new(&self.anchors)
      .with_score_thresh(self.score_thresh)
      .with_nms_thresh(self.nms_thresh);
    debug!("默认框数量: {}", box_coder.num_anchors());

    let mut model = FpnSsd {
      session,
      box_coder,
      input_size: self.input_size,
      num_classes: 0,
    };

    // 用全黑帧试跑一次，校验输出尺寸并确定类别数
    let blank = Array4::<f32>::zeros((1, 3, self.input_size as usize, self.input_size as usize));
    let (loc, cls) = model.forward(&blank)?;
    model.num_classes = check_output_sizes(model.box_coder.num_anchors(), loc.len(), cls.len())?;
    info!("模型加载完成，类别数 (含背景): {}", model.num_classes);

    Ok(model)
  }
}

/// 校验输出与默认框数量一致，返回类别数（含背景）
fn check_output_sizes(
  num_anchors: usize,
  loc_len: usize,
  cls_len: usize,
) -> Result<usize, FpnSsdError> {
  if loc_len != num_anchors * 4 {
    return Err(FpnSsdError::OutputMismatch(format!(
      "{} 大小为 {}, 期望 {} x 4",
      FPNSSD_LOC_OUTPUT, loc_len, num_anchors
    )));
  }
  if num_anchors == 0 || cls_len % num_anchors != 0 || cls_len / num_anchors < 2 {
    return Err(FpnSsdError::OutputMismatch(format!(
      "{} 大小为 {}, 无法按 {} 个默认框划分类别",
      FPNSSD_CLS_OUTPUT, cls_len, num_anchors
    )));
  }
  Ok(cls_len / num_anchors)
}

fn create_session(model_path: &Path, accelerator: Accelerator) -> ort::Result<Session> {
  Session::builder()?
    .with_execution_providers([accelerator.execution_provider()])?
    .with_optimization_level(GraphOptimizationLevel::Level3)?
    .commit_from_file(model_path)
}

/// FPN-SSD 检测器，输入为原始分辨率 RGB 图像，输出为模型输入尺寸下的检测框
pub struct FpnSsd {
  session: Session,
  box_coder: SsdBoxCoder,
  input_size: u32,
  num_classes: usize,
}

impl FpnSsd {
  fn forward(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<f32>), FpnSsdError> {
    let tensor_ref = TensorRef::from_array_view(input.view())?;
    let outputs = self.session.run(ort::inputs![tensor_ref])?;

    let (_, loc) = outputs[FPNSSD_LOC_OUTPUT].try_extract_tensor::<f32>()?;
    let (_, cls) = outputs[FPNSSD_CLS_OUTPUT].try_extract_tensor::<f32>()?;
    Ok((loc.to_vec(), cls.to_vec()))
  }
}

impl Model for FpnSsd {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = FpnSsdError;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("预处理输入 {}x{}", input.width(), input.height());
    let tensor = to_normalized_nchw(input, self.input_size);

    debug!("执行模型推理");
    let (loc, cls) = self.forward(&tensor)?;
    let num_classes = check_output_sizes(self.box_coder.num_anchors(), loc.len(), cls.len())?;
    if num_classes != self.num_classes {
      return Err(FpnSsdError::OutputMismatch(format!(
        "类别数由 {} 变为 {}",
        self.num_classes, num_classes
      )));
    }

    let result = self.box_coder.decode(&loc, &cls, num_classes);
    debug!("检测到 {} 个物体", result.len());
    Ok(result)
  }

  fn input_size(&self) -> u32 {
    self.input_size
  }
}
