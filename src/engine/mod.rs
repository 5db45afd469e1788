// Translation engine abstraction
//
// The model itself is an external black box. This module defines:
// - TranslationEngine: a constructed, reusable engine accepting (text, src, tgt)
// - EngineFactory: builds engines for a model on a device
// - EngineCache: memoizes construction per (model, device, alternate) key
// - http: the default backend talking to an inference endpoint

pub mod cache;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub use cache::EngineCache;
pub use http::{HttpEngine, HttpEngineFactory};

use crate::error::{PolyglotError, Result};

/// A loaded model ready to accept translation calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate text between two FLORES-200 codes, returning the raw engine output
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Value>;
}

/// Builds translation engines; construction is expected to be expensive
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self, model: &str, device: Device) -> Result<Arc<dyn TranslationEngine>>;
}

/// Compute device an engine is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl Device {
    pub fn is_accelerated(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }

    /// Pick the first CUDA device when an NVIDIA driver is visible, else the CPU
    pub fn detect() -> Self {
        let hidden = std::env::var("CUDA_VISIBLE_DEVICES")
            .map(|v| v.trim().is_empty() || v.trim() == "-1")
            .unwrap_or(false);

        if !hidden && Path::new("/proc/driver/nvidia/version").exists() {
            Device::Cuda(0)
        } else {
            Device::Cpu
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

/// Device choice as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelector {
    Auto,
    Fixed(Device),
}

impl DeviceSelector {
    pub fn resolve(&self) -> Device {
        match self {
            DeviceSelector::Auto => Device::detect(),
            DeviceSelector::Fixed(device) => *device,
        }
    }
}

impl FromStr for DeviceSelector {
    type Err = PolyglotError;

    /// Accepts auto, cpu, cuda, cuda:N, or a bare ordinal where -1 means cpu
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        let invalid = || {
            PolyglotError::Config(format!(
                "Invalid device '{}'. Valid devices: auto, cpu, cuda, cuda:N",
                s
            ))
        };

        match value.as_str() {
            "auto" => Ok(DeviceSelector::Auto),
            "cpu" | "-1" => Ok(DeviceSelector::Fixed(Device::Cpu)),
            "cuda" | "gpu" => Ok(DeviceSelector::Fixed(Device::Cuda(0))),
            other => {
                let ordinal = other.strip_prefix("cuda:").unwrap_or(other);
                ordinal
                    .parse::<u32>()
                    .map(|n| DeviceSelector::Fixed(Device::Cuda(n)))
                    .map_err(|_| invalid())
            }
        }
    }
}

/// Memoization key for engine construction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub model: String,
    pub device: Device,
    pub use_alternate: bool,
}

/// A constructed engine, or the recorded reason its construction failed
#[derive(Clone)]
pub enum EngineHandle {
    Ready(Arc<dyn TranslationEngine>),
    Failed(String),
}

impl EngineHandle {
    pub fn is_ready(&self) -> bool {
        matches!(self, EngineHandle::Ready(_))
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineHandle::Ready(_) => f.write_str("EngineHandle::Ready"),
            EngineHandle::Failed(reason) => f.debug_tuple("EngineHandle::Failed").field(reason).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_selector() {
        assert_eq!("auto".parse::<DeviceSelector>().unwrap(), DeviceSelector::Auto);
        assert_eq!("CPU".parse::<DeviceSelector>().unwrap(), DeviceSelector::Fixed(Device::Cpu));
        assert_eq!("-1".parse::<DeviceSelector>().unwrap(), DeviceSelector::Fixed(Device::Cpu));
        assert_eq!("cuda".parse::<DeviceSelector>().unwrap(), DeviceSelector::Fixed(Device::Cuda(0)));
        assert_eq!("cuda:2".parse::<DeviceSelector>().unwrap(), DeviceSelector::Fixed(Device::Cuda(2)));
        assert_eq!("1".parse::<DeviceSelector>().unwrap(), DeviceSelector::Fixed(Device::Cuda(1)));
        assert!("tpu".parse::<DeviceSelector>().is_err());
        assert!("cuda:x".parse::<DeviceSelector>().is_err());
    }

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
        assert!(Device::Cuda(0).is_accelerated());
        assert!(!Device::Cpu.is_accelerated());
    }
}
