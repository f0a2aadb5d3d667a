//! Static hardware inventory, probed once at startup from structured files.

use std::path::Path;

use tracing::debug;

use super::procfs::{parse_cpuinfo, FileSystem};

/// What the dashboard knows about the machine. Every field may be unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareInfo {
    pub cpu_model: Option<String>,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub cpu_mhz: Option<f64>,
    pub gpu: Option<String>,
    pub ram_type: Option<String>,
    pub hostname: Option<String>,
    pub kernel: Option<String>,
}

impl HardwareInfo {
    pub fn cpu_model_or_unknown(&self) -> &str {
        self.cpu_model.as_deref().unwrap_or("Unknown CPU")
    }

    /// One-line summary, e.g. `4 cores, 8 threads | GPU: NVIDIA [10de:1c82] | RAM: DDR4`
    pub fn summary(&self) -> String {
        let cores = match self.physical_cores {
            Some(physical) => format!("{} cores, {} threads", physical, self.logical_cores),
            None => format!("{} threads", self.logical_cores),
        };
        format!(
            "{} | GPU: {} | RAM: {}",
            cores,
            self.gpu.as_deref().unwrap_or("Not detected"),
            self.ram_type.as_deref().unwrap_or("Unknown"),
        )
    }
}

/// Source of hardware facts
pub trait HardwareInventory {
    fn probe(&self) -> HardwareInfo;
}

/// Reads `/proc/cpuinfo`, `/proc/sys/kernel/*`, PCI devices from sysfs and
/// the SMBIOS memory-device table when it is readable.
pub struct SysfsInventory<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> SysfsInventory<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    fn read_trimmed(&self, path: &str) -> Option<String> {
        match self.fs.read_to_string(Path::new(path)) {
            Ok(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Err(e) => {
                debug!("cannot read {}: {}", path, e);
                None
            }
        }
    }

    /// First PCI device with a display controller class (0x03xxxx).
    fn probe_gpu(&self) -> Option<String> {
        let mut devices = self.fs.read_dir(Path::new("/sys/bus/pci/devices")).ok()?;
        devices.sort();
        devices.into_iter().find_map(|dev| {
            let dir = dev.to_str()?;
            let class = self.read_trimmed(&format!("{dir}/class"))?;
            if !class.starts_with("0x03") {
                return None;
            }
            let vendor = self.read_trimmed(&format!("{dir}/vendor"))?;
            let device = self.read_trimmed(&format!("{dir}/device")).unwrap_or_default();
            Some(describe_pci_display(&vendor, &device))
        })
    }

    /// Memory type from SMBIOS type 17 entries; needs root on most systems.
    fn probe_ram_type(&self) -> Option<String> {
        let raw = self
            .fs
            .read_bytes(Path::new("/sys/firmware/dmi/entries/17-0/raw"))
            .ok()?;
        smbios_memory_type(&raw)
    }
}

impl<F: FileSystem> HardwareInventory for SysfsInventory<'_, F> {
    fn probe(&self) -> HardwareInfo {
        let facts = self
            .read_trimmed("/proc/cpuinfo")
            .map(|c| parse_cpuinfo(&c))
            .unwrap_or_default();

        HardwareInfo {
            cpu_model: facts.model,
            physical_cores: facts.physical_cores,
            logical_cores: facts.logical_cores,
            cpu_mhz: facts.mhz,
            gpu: self.probe_gpu(),
            ram_type: self.probe_ram_type(),
            hostname: self.read_trimmed("/proc/sys/kernel/hostname"),
            kernel: self.read_trimmed("/proc/sys/kernel/osrelease"),
        }
    }
}

fn describe_pci_display(vendor: &str, device: &str) -> String {
    let vendor_id = vendor.trim_start_matches("0x").to_ascii_lowercase();
    let device_id = device.trim_start_matches("0x").to_ascii_lowercase();
    let name = match vendor_id.as_str() {
        "10de" => "NVIDIA",
        "1002" => "AMD",
        "8086" => "Intel",
        "1af4" => "Virtio",
        "15ad" => "VMware",
        "1234" => "QEMU",
        _ => "Display controller",
    };
    format!("{name} [{vendor_id}:{device_id}]")
}

/// Decode the Memory Type byte (offset 0x12) of an SMBIOS type 17 structure.
fn smbios_memory_type(raw: &[u8]) -> Option<String> {
    if raw.first() != Some(&17) {
        return None;
    }
    let name = match raw.get(0x12)? {
        0x12 => "DDR",
        0x13 => "DDR2",
        0x18 => "DDR3",
        0x1A => "DDR4",
        0x1B => "LPDDR",
        0x1C => "LPDDR2",
        0x1D => "LPDDR3",
        0x1E => "LPDDR4",
        0x22 => "DDR5",
        0x23 => "LPDDR5",
        _ => return None,
    };
    Some(name.to_string())
}
