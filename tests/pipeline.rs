// 该文件是 Kongdong （空洞检测） 项目的一部分。
// tests/pipeline.rs - 端到端流程测试
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

use std::path::Path;

use image::{Rgb, RgbImage};
use kongdong::{
  TEST_SAMPLE_SIZE,
  context::InferenceContext,
  input::{GroundTruthInput, IMAGE_EXTENSION, ImageDirectoryInput},
  model::{DetectItem, DetectResult, Model},
  output::DirectoryOutput,
  task::{SequentialTask, Task, TaskSummary},
};

/// 每帧返回固定结果的模型
struct StubModel {
  items: Vec<DetectItem>,
}

impl StubModel {
  fn new(items: Vec<DetectItem>) -> Self {
    Self { items }
  }
}

impl Model for StubModel {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = std::convert::Infallible;

  fn infer(&mut self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(DetectResult::from(self.items.clone()))
  }

  fn input_size(&self) -> u32 {
    512
  }
}

fn void_at(bbox: [f32; 4]) -> DetectItem {
  DetectItem {
    class_id: 0,
    score: 0.9,
    bbox,
  }
}

fn write_frames(dir: &Path, count: usize, width: u32, height: u32) {
  std::fs::create_dir_all(dir).unwrap();
  for i in 0..count {
    RgbImage::from_pixel(width, height, Rgb([128, 128, 128]))
      .save(dir.join(format!("frame_{:04}.jpg", i)))
      .unwrap();
  }
}

fn list_files(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}

#[test]
fn prediction_only_writes_one_file_per_image() {
  let root = tempfile::tempdir().unwrap();
  let input_dir = root.path().join("input");
  let output_dir = root.path().join("output");
  write_frames(&input_dir, 1, 512, 512);

  let mut context = InferenceContext::new(StubModel::new(Vec::new()), 0);
  let input = ImageDirectoryInput::open(&input_dir, IMAGE_EXTENSION, None).unwrap();
  let output = DirectoryOutput::new(&output_dir);

  let summary = SequentialTask::default()
    .with_hidden_progress(true)
    .run_task(input, &mut context, output)
    .unwrap();

  assert_eq!(
    summary,
    TaskSummary {
      frames: 1,
      predicted_boxes: 0,
      ground_truth_boxes: 0,
    }
  );
  assert_eq!(list_files(&output_dir), vec!["frame_0000.jpg"]);
  let written = image::open(output_dir.join("frame_0000.jpg")).unwrap();
  assert_eq!((written.width(), written.height()), (512, 512));
}

#[test]
fn ground_truth_mode_counts_target_class_only() {
  let root = tempfile::tempdir().unwrap();
  let input_dir = root.path().join("input");
  let output_dir = root.path().join("output_gt");
  write_frames(&input_dir, 2, 1024, 512);

  let label_path = root.path().join("video.txt");
  std::fs::write(
    &label_path,
    "frame_0000.jpg 10 10 50 50 0 60 60 90 90 1\nframe_0001.jpg\n",
  )
  .unwrap();

  let model = StubModel::new(vec![
    void_at([100.0, 100.0, 200.0, 200.0]),
    DetectItem {
      class_id: 1,
      score: 0.8,
      bbox: [0.0, 0.0, 10.0, 10.0],
    },
  ]);
  let mut context = InferenceContext::new(model, 0);
  let input = GroundTruthInput::open(&label_path, &input_dir, 0, None).unwrap();
  let output = DirectoryOutput::new(&output_dir);

  let summary = SequentialTask::default()
    .with_hidden_progress(true)
    .run_task(input, &mut context, output)
    .unwrap();

  assert_eq!(summary.frames, 2);
  assert_eq!(summary.predicted_boxes, 2);
  assert_eq!(summary.ground_truth_boxes, 1);
  assert_eq!(
    list_files(&output_dir),
    vec!["frame_0000.jpg", "frame_0001.jpg"]
  );

  // 预测框横向放大 2 倍，上边 y=100 在 x 200..400 之间为红色（JPEG 有损，只比较通道）
  let written = image::open(output_dir.join("frame_0000.jpg"))
    .unwrap()
    .to_rgb8();
  let pixel = written.get_pixel(300, 100);
  assert!(pixel[0] > 150 && pixel[1] < 110, "{:?}", pixel);
}

#[test]
fn test_mode_processes_limited_samples_and_leaves_nothing() {
  let root = tempfile::tempdir().unwrap();
  let input_dir = root.path().join("input");
  let output_dir = root.path().join("output");
  write_frames(&input_dir, TEST_SAMPLE_SIZE + 3, 64, 48);
  std::fs::create_dir_all(&output_dir).unwrap();

  let model = StubModel::new(vec![void_at([0.0, 0.0, 256.0, 256.0])]);
  let mut context = InferenceContext::new(model, 0);
  let input =
    ImageDirectoryInput::open(&input_dir, IMAGE_EXTENSION, Some(TEST_SAMPLE_SIZE)).unwrap();
  let output = DirectoryOutput::new(&output_dir).with_test_mode(true);

  let summary = SequentialTask::default()
    .with_hidden_progress(true)
    .run_task(input, &mut context, output)
    .unwrap();

  assert_eq!(summary.frames, TEST_SAMPLE_SIZE);
  assert_eq!(summary.predicted_boxes, TEST_SAMPLE_SIZE);
  assert!(list_files(&output_dir).is_empty());
}

#[test]
fn failure_aborts_but_keeps_earlier_outputs() {
  let root = tempfile::tempdir().unwrap();
  let input_dir = root.path().join("input");
  let output_dir = root.path().join("output");
  write_frames(&input_dir, 1, 32, 32);

  let label_path = root.path().join("video.txt");
  std::fs::write(&label_path, "frame_0000.jpg\nmissing.jpg\nframe_0000.jpg\n").unwrap();

  let mut context = InferenceContext::new(StubModel::new(Vec::new()), 0);
  let input = GroundTruthInput::open(&label_path, &input_dir, 0, None).unwrap();
  let output = DirectoryOutput::new(&output_dir);

  let result = SequentialTask::default()
    .with_hidden_progress(true)
    .run_task(input, &mut context, output);

  assert!(result.is_err());
  assert_eq!(list_files(&output_dir), vec!["frame_0000.jpg"]);
}
