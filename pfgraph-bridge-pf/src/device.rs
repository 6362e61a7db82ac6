//! Access to the pf control device.

use std::path::{Path, PathBuf};

use pfgraph_bridge_framework::BridgeError;
use thiserror::Error;

/// Default pf control device.
pub const DEFAULT_DEVICE: &str = "/dev/pf";

/// `_IOWR('D', 21, struct pf_status)`.
pub const DIOCGETSTATUS: u64 = 3_249_030_165;

const IOCPARM_MASK: u64 = 0x1fff;

/// Parameter length encoded in an ioctl request number.
pub fn ioctl_param_len(request: u64) -> usize {
    ((request >> 16) & IOCPARM_MASK) as usize
}

/// Errors from the status device.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ioctl {request:#x} on {path} failed: {source}")]
    Ioctl {
        path: String,
        request: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Status device is not supported on this platform")]
    Unsupported,
}

impl From<DeviceError> for BridgeError {
    fn from(err: DeviceError) -> Self {
        BridgeError::device(err.to_string())
    }
}

/// Something that can answer a status request with raw bytes.
pub trait DeviceStatusSource {
    /// Issue `request` and return the first `len` bytes of the reply.
    fn read_status(&self, request: u64, len: usize) -> Result<Vec<u8>, DeviceError>;
}

impl<S: DeviceStatusSource + ?Sized> DeviceStatusSource for &S {
    fn read_status(&self, request: u64, len: usize) -> Result<Vec<u8>, DeviceError> {
        (**self).read_status(request, len)
    }
}

/// The kernel pf device, opened read-only per request.
#[derive(Debug, Clone)]
pub struct PfDevice {
    path: PathBuf,
}

impl Default for PfDevice {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl PfDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
impl DeviceStatusSource for PfDevice {
    fn read_status(&self, request: u64, len: usize) -> Result<Vec<u8>, DeviceError> {
        use std::os::unix::io::AsRawFd;

        let file = std::fs::File::open(&self.path).map_err(|source| DeviceError::Open {
            path: self.path.display().to_string(),
            source,
        })?;

        // The kernel copies out as many bytes as the request encodes.
        let mut buf = vec![0u8; len.max(ioctl_param_len(request))];

        // SAFETY: `buf` is live for the call and at least as large as the
        // parameter size carried in `request`.
        let ret = unsafe { libc::ioctl(file.as_raw_fd(), request as _, buf.as_mut_ptr()) };
        if ret < 0 {
            return Err(DeviceError::Ioctl {
                path: self.path.display().to_string(),
                request,
                source: std::io::Error::last_os_error(),
            });
        }

        tracing::debug!(path = %self.path.display(), request, len, "Read device status");

        buf.truncate(len);
        Ok(buf)
    }
}

#[cfg(not(unix))]
impl DeviceStatusSource for PfDevice {
    fn read_status(&self, _request: u64, _len: usize) -> Result<Vec<u8>, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}
