//! UIO-backed register window and device enumeration
//!
//! The mux is a small AXI platform device; Linux exposes its register
//! region through the UIO subsystem as `/dev/uioN` plus metadata under
//! `/sys/class/uio/uioN/`. Mapping keeps unsafe confined to this module:
//! volatile, bounds-checked 32-bit access behind the [`RegisterWindow`]
//! seam.

use crate::error::{MuxError, Result};
use crate::window::RegisterWindow;
use aximux_chip::regs;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

const UIO_SYSFS: &str = "/sys/class/uio";

/// Memory-mapped register window over a `/dev/uioN` node.
#[derive(Debug)]
pub struct UioWindow {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    path: PathBuf,
}

impl UioWindow {
    /// Map the register region of a UIO node.
    ///
    /// The map size comes from `/sys/class/uio/uioN/maps/map0/size`; the
    /// node is opened read-write and mapped shared, so register writes
    /// reach the hardware.
    ///
    /// # Errors
    ///
    /// Returns [`MuxError::DeviceNotFound`] if the node does not exist and
    /// [`MuxError::Resource`] if the sysfs metadata is unreadable or the
    /// mapping fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MuxError::device_not_found(path));
        }

        let uio_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MuxError::resource(format!("not a UIO node: {}", path.display())))?;

        let size = read_map_size(uio_name)?;
        if size == 0 {
            return Err(MuxError::resource(format!(
                "{uio_name} reports a zero-sized register region"
            )));
        }

        tracing::debug!("Mapping {} ({size:#x} bytes)", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| MuxError::resource(format!("cannot open {}: {e}", path.display())))?;

        // SAFETY: the fd was just opened and stays open for the mapping's
        // lifetime (held in the struct); size is non-zero and comes from the
        // kernel's own map0/size; READ|WRITE + SHARED is the required mode
        // for device memory; the mapping is released in Drop.
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
            .map_err(|e| MuxError::resource(format!("mmap of {uio_name} failed: {e}")))?;

            NonNull::new(addr.cast::<u8>())
                .ok_or_else(|| MuxError::resource("mmap returned a null mapping"))?
        };

        tracing::info!("Mapped {} ({size:#x} bytes at {ptr:p})", path.display());

        Ok(Self {
            ptr,
            size,
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the mapped UIO node.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mapped region size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    fn check_bounds(&self, word: usize) -> Result<usize> {
        let offset = regs::reg_offset(word);
        if offset + 4 > self.size {
            return Err(MuxError::OutOfBounds {
                word,
                words: self.size / 4,
            });
        }
        Ok(offset)
    }
}

impl RegisterWindow for UioWindow {
    fn read_u32(&self, word: usize) -> Result<u32> {
        let offset = self.check_bounds(word)?;

        // SAFETY: offset + 4 <= size was checked above; ptr comes from a
        // successful mmap; registers are word-aligned by construction
        // (offset is a word index shifted left by two). Volatile because
        // the hardware changes register values behind the compiler's back.
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };

        tracing::trace!("read  word {word:#x} = {value:#010x}");
        Ok(value)
    }

    fn write_u32(&mut self, word: usize, value: u32) -> Result<()> {
        let offset = self.check_bounds(word)?;

        tracing::trace!("write word {word:#x} = {value:#010x}");

        // SAFETY: same bounds and alignment argument as read_u32; volatile
        // because register writes have side effects the compiler must not
        // elide or reorder.
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }

        Ok(())
    }

    fn words(&self) -> usize {
        self.size / 4
    }
}

impl Drop for UioWindow {
    fn drop(&mut self) {
        tracing::debug!("Unmapping {} ({:#x} bytes)", self.path.display(), self.size);

        // SAFETY: ptr and size are exactly what mmap returned in open();
        // Drop runs once, so no double unmap.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap of {} failed: {e}", self.path.display());
            }
        }
    }
}

// SAFETY: UioWindow exclusively owns its mapping (created in open, released
// in Drop, fd kept open alongside), so moving it to another thread moves the
// only handle. Writes require &mut self; callers serialize read-modify-write
// sequences behind a lock.
unsafe impl Send for UioWindow {}

// ── Enumeration ──────────────────────────────────────────────────────────────

/// One UIO node whose device name matches the mux.
#[derive(Debug, Clone)]
pub struct UioDevice {
    /// UIO node name (`uio0`, `uio1`, ...).
    pub uio_name: String,
    /// Device node path (`/dev/uio0`, ...).
    pub path: PathBuf,
    /// Device name reported by the kernel driver.
    pub device_name: String,
}

impl UioDevice {
    /// Map this device's register window.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`UioWindow::open`].
    pub fn open(&self) -> Result<UioWindow> {
        UioWindow::open(&self.path)
    }
}

/// Scan the UIO namespace for mux devices.
///
/// A node matches when its `name` attribute is the platform device name or
/// the device-tree compatible string. Sorted by node name for stable
/// ordering.
///
/// # Errors
///
/// Returns [`MuxError::NoDevicesFound`] if the scan finds nothing.
pub fn enumerate() -> Result<Vec<UioDevice>> {
    tracing::debug!("Scanning {UIO_SYSFS} for mux devices");

    let mut found = Vec::new();

    let entries = match std::fs::read_dir(UIO_SYSFS) {
        Ok(entries) => entries,
        // No UIO subsystem at all reads the same as no devices.
        Err(e) => {
            tracing::debug!("cannot read {UIO_SYSFS}: {e}");
            return Err(MuxError::NoDevicesFound);
        }
    };

    for entry in entries.flatten() {
        let uio_name = entry.file_name().to_string_lossy().to_string();

        let device_name = match read_sysfs_string(&format!("{UIO_SYSFS}/{uio_name}/name")) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("skipping {uio_name}: {e}");
                continue;
            }
        };

        if device_name != regs::DEVICE_NAME && device_name != regs::COMPATIBLE {
            continue;
        }

        found.push(UioDevice {
            path: PathBuf::from(format!("/dev/{uio_name}")),
            uio_name,
            device_name,
        });
    }

    if found.is_empty() {
        return Err(MuxError::NoDevicesFound);
    }

    found.sort_by(|a, b| a.uio_name.cmp(&b.uio_name));
    tracing::info!("Found {} mux UIO node(s)", found.len());

    Ok(found)
}

fn read_map_size(uio_name: &str) -> Result<usize> {
    let path = format!("{UIO_SYSFS}/{uio_name}/maps/map0/size");
    let text = read_sysfs_string(&path)?;

    let parsed = match text.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => text.parse(),
    };

    parsed.map_err(|e| MuxError::resource(format!("bad map size in {path}: {e}")))
}

fn read_sysfs_string(path: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| MuxError::resource(format!("cannot read {path}: {e}")))
}
