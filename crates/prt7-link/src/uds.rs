use std::io::ErrorKind;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{LinkError, Result};
use crate::stream::LinkStream;

/// Unix domain socket that frame emitters connect to.
///
/// Each accepted connection is an independent line source. The socket file
/// is removed on drop, unless something else has replaced it in the
/// meantime.
pub struct LineSocket {
    listener: UnixListener,
    path: PathBuf,
    /// (dev, inode) of the socket file this instance created.
    identity: (u64, u64),
}

impl LineSocket {
    /// Permission mode applied to the socket file.
    pub const DEFAULT_MODE: u32 = 0o600;

    /// `sockaddr_un.sun_path` capacity.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen at `path`, replacing a stale socket file if present.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(LinkError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        remove_stale_socket(&path)?;

        let bind_err = |source| LinkError::Bind {
            path: path.clone(),
            source,
        };
        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(Self::DEFAULT_MODE))
            .map_err(bind_err)?;
        let metadata = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(?path, "listening for frame sources");
        Ok(Self {
            listener,
            path,
            identity: (metadata.dev(), metadata.ino()),
        })
    }

    /// Accept the next frame source (blocking).
    pub fn accept(&self) -> Result<LinkStream> {
        self.listener
            .set_nonblocking(false)
            .map_err(LinkError::Accept)?;
        let (stream, _addr) = self.listener.accept().map_err(LinkError::Accept)?;
        debug!(path = ?self.path, "frame source connected");
        Ok(LinkStream::from_unix(stream))
    }

    /// Accept a frame source if one is already waiting.
    ///
    /// Returns `Ok(None)` instead of blocking. Accepted streams are always
    /// in blocking mode.
    pub fn try_accept(&self) -> Result<Option<LinkStream>> {
        self.listener
            .set_nonblocking(true)
            .map_err(LinkError::Accept)?;
        let stream = match self.listener.accept() {
            Ok((stream, _addr)) => stream,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(err) => return Err(LinkError::Accept(err)),
        };
        // Some platforms hand out accepted sockets with the listener's
        // O_NONBLOCK set.
        stream.set_nonblocking(false).map_err(LinkError::Accept)?;
        debug!(path = ?self.path, "frame source connected");
        Ok(Some(LinkStream::from_unix(stream)))
    }

    /// Connect to a listening socket, as an emitter would.
    pub fn connect(path: impl AsRef<Path>) -> Result<LinkStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| LinkError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LinkStream::from_unix(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LineSocket {
    fn drop(&mut self) {
        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        if metadata.file_type().is_socket() && (metadata.dev(), metadata.ino()) == self.identity {
            debug!(path = ?self.path, "removing socket file");
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Remove a leftover socket at `path`. Never touches non-socket files.
fn remove_stale_socket(path: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(LinkError::Bind {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.file_type().is_socket() {
        return Err(LinkError::Bind {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "existing path is not a unix socket",
            ),
        });
    }

    debug!(?path, "removing stale socket");
    std::fs::remove_file(path).map_err(|source| LinkError::Bind {
        path: path.to_path_buf(),
        source,
    })
}
