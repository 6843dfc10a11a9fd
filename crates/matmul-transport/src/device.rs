use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TransportError};

/// Default rpmsg character device exposed by the remote processor driver.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/rpmsg0";

/// A bidirectional byte-stream handle to the remote context.
///
/// On target hardware this is an rpmsg character device opened read-write.
/// When the path names a Unix domain socket the handle connects to it
/// instead, which is how a simulated remote is reached.
pub struct Device {
    inner: DeviceInner,
    path: PathBuf,
}

enum DeviceInner {
    File(File),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for Device {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceInner::File(file) => file.read(buf),
            #[cfg(unix)]
            DeviceInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Device {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceInner::File(file) => file.write(buf),
            #[cfg(unix)]
            DeviceInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DeviceInner::File(file) => file.flush(),
            #[cfg(unix)]
            DeviceInner::Unix(stream) => stream.flush(),
        }
    }
}

impl Device {
    /// Open the device at `path` for reading and writing.
    ///
    /// Unix sockets are connected to; anything else is opened as a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| TransportError::Open {
            path: path.clone(),
            source,
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;

            let metadata = std::fs::metadata(&path).map_err(open_err)?;
            if metadata.file_type().is_socket() {
                let stream = std::os::unix::net::UnixStream::connect(&path).map_err(|source| {
                    TransportError::Connect {
                        path: path.clone(),
                        source,
                    }
                })?;
                debug!(?path, "connected to socket device");
                return Ok(Self {
                    inner: DeviceInner::Unix(stream),
                    path,
                });
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(open_err)?;
        debug!(?path, "opened device");
        Ok(Self {
            inner: DeviceInner::File(file),
            path,
        })
    }

    /// Wrap an already connected Unix stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: DeviceInner::Unix(stream),
            path: path.into(),
        }
    }

    /// Duplicate the handle so reader and writer can live on different threads.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            DeviceInner::File(file) => DeviceInner::File(file.try_clone()?),
            #[cfg(unix)]
            DeviceInner::Unix(stream) => DeviceInner::Unix(stream.try_clone()?),
        };
        Ok(Self {
            inner,
            path: self.path.clone(),
        })
    }

    /// The path this device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.inner {
            DeviceInner::File(_) => "char-device",
            #[cfg(unix)]
            DeviceInner::Unix(_) => "unix-socket",
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("type", &self.kind_name())
            .field("path", &self.path)
            .finish()
    }
}
