//! Host inspection for local inference: memory headroom and accelerator choice

use candle_core::Device;
use sysinfo::System;
use tracing::{debug, info, warn};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone)]
pub struct HostResources {
    pub total_ram_bytes: u64,
    pub available_ram_bytes: u64,
    pub cpu_cores: usize,
    pub cuda_available: bool,
    pub metal_available: bool,
}

impl HostResources {
    /// Probe the running machine
    pub fn probe() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let resources = Self {
            total_ram_bytes: sys.total_memory(),
            available_ram_bytes: sys.available_memory(),
            cpu_cores: sys.cpus().len(),
            cuda_available: cuda_present(),
            metal_available: metal_present(),
        };

        info!(
            "Host: {:.1}GB RAM free of {:.1}GB, {} cores, accelerator: {}",
            resources.available_ram_gb(),
            resources.total_ram_gb(),
            resources.cpu_cores,
            resources.accelerator()
        );
        resources
    }

    pub fn available_ram_gb(&self) -> f64 {
        self.available_ram_bytes as f64 / GIB
    }

    pub fn total_ram_gb(&self) -> f64 {
        self.total_ram_bytes as f64 / GIB
    }

    pub fn accelerator(&self) -> Accelerator {
        if self.cuda_available {
            Accelerator::Cuda
        } else if self.metal_available {
            Accelerator::Metal
        } else {
            Accelerator::Cpu
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    Cpu,
    Cuda,
    Metal,
}

impl Accelerator {
    /// Build the candle device, dropping back to CPU when the accelerator
    /// refuses to initialize.
    pub fn device(self) -> Device {
        let attempt = match self {
            Accelerator::Cpu => return Device::Cpu,
            Accelerator::Cuda => Device::new_cuda(0),
            Accelerator::Metal => Device::new_metal(0),
        };
        attempt.unwrap_or_else(|e| {
            warn!("{} device unavailable ({}), using CPU", self, e);
            Device::Cpu
        })
    }
}

impl std::fmt::Display for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accelerator::Cpu => write!(f, "CPU"),
            Accelerator::Cuda => write!(f, "CUDA"),
            Accelerator::Metal => write!(f, "Metal"),
        }
    }
}

#[cfg(feature = "cuda")]
fn cuda_present() -> bool {
    match Device::new_cuda(0) {
        Ok(_) => true,
        Err(e) => {
            debug!("CUDA not available: {}", e);
            false
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn cuda_present() -> bool {
    debug!("built without the cuda feature");
    false
}

#[cfg(feature = "metal")]
fn metal_present() -> bool {
    match Device::new_metal(0) {
        Ok(_) => true,
        Err(e) => {
            debug!("Metal not available: {}", e);
            false
        }
    }
}

#[cfg(not(feature = "metal"))]
fn metal_present() -> bool {
    debug!("built without the metal feature");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_only() -> HostResources {
        HostResources {
            total_ram_bytes: 16 * 1024 * 1024 * 1024,
            available_ram_bytes: 8 * 1024 * 1024 * 1024,
            cpu_cores: 8,
            cuda_available: false,
            metal_available: false,
        }
    }

    #[test]
    fn test_probe_reports_memory() {
        let host = HostResources::probe();
        assert!(host.total_ram_bytes > 0);
        assert!(host.available_ram_bytes <= host.total_ram_bytes);
    }

    #[test]
    fn test_gib_conversion() {
        let host = cpu_only();
        assert!((host.total_ram_gb() - 16.0).abs() < 0.1);
        assert!((host.available_ram_gb() - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_accelerator_preference() {
        assert_eq!(cpu_only().accelerator(), Accelerator::Cpu);

        let cuda = HostResources {
            cuda_available: true,
            metal_available: true,
            ..cpu_only()
        };
        assert_eq!(cuda.accelerator(), Accelerator::Cuda);

        let metal = HostResources {
            metal_available: true,
            ..cpu_only()
        };
        assert_eq!(metal.accelerator(), Accelerator::Metal);
    }

    #[test]
    fn test_cpu_device() {
        assert!(matches!(Accelerator::Cpu.device(), Device::Cpu));
    }
}
