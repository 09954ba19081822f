// 该文件是 Kongdong （空洞检测） 项目的一部分。
// src/model/device.rs - 推理设备
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

use std::fmt;

use ort::execution_providers::{
  CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};

/// 推理设备选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
  /// 指定编号的 CUDA GPU
  Cuda(u32),
  /// 仅在显式要求时使用
  Cpu,
}

impl Default for Accelerator {
  fn default() -> Self {
    Accelerator::Cuda(0)
  }
}

impl fmt::Display for Accelerator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Accelerator::Cuda(id) => write!(f, "CUDA:{}", id),
      Accelerator::Cpu => write!(f, "CPU"),
    }
  }
}

impl Accelerator {
  /// 对应的执行后端。GPU 注册失败时直接报错，不回退到 CPU。
  pub(crate) fn execution_provider(&self) -> ExecutionProviderDispatch {
    match self {
      Accelerator::Cuda(id) => CUDAExecutionProvider::default()
        .with_device_id(*id as i32)
        .build()
        .error_on_failure(),
      Accelerator::Cpu => CPUExecutionProvider::default().build().error_on_failure(),
    }
  }
}
