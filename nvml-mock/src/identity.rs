//! Identifier strings for simulated devices.

use uuid::Uuid;

use crate::spec::PciBusLayout;

/// A fresh `GPU-<uuid>` identifier.
pub fn gpu_uuid() -> String {
    format!("GPU-{}", Uuid::new_v4())
}

/// PCI bus address of the device at `index`.
pub fn pci_bus_id(layout: PciBusLayout, index: u32) -> String {
    match layout {
        PciBusLayout::Flat => format!("0000:{:02x}:00.0", index),
        PciBusLayout::Segmented { bus } => format!("0000:{:02x}:{:02x}:00.0", bus, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_uuid_format() {
        let a = gpu_uuid();
        let b = gpu_uuid();
        assert!(a.starts_with("GPU-"));
        assert_eq!(a.len(), 40);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pci_bus_id() {
        assert_eq!(pci_bus_id(PciBusLayout::Flat, 3), "0000:03:00.0");
        assert_eq!(pci_bus_id(PciBusLayout::Flat, 10), "0000:0a:00.0");
        assert_eq!(
            pci_bus_id(PciBusLayout::Segmented { bus: 0x4b }, 7),
            "0000:4b:07:00.0"
        );
    }
}
