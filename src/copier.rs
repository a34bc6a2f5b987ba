use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Copies one track file into the export folder.
///
/// The destination is overwritten when it already exists.
pub trait TrackCopier {
    fn copy(&self, source: &Path, destination: &Path) -> io::Result<()>;
}

/// Filesystem copy keeping contents, permissions and modification time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCopier;

impl TrackCopier for FsCopier {
    fn copy(&self, source: &Path, destination: &Path) -> io::Result<()> {
        fs::copy(source, destination)?;

        // fs::copy carries permissions only, mirror the timestamp as well.
        // Read-only handle: the destination may have inherited mode 0444.
        let modified = fs::metadata(source)?.modified()?;
        File::open(destination)?.set_modified(modified)?;
        Ok(())
    }
}

impl<T: TrackCopier + ?Sized> TrackCopier for &T {
    fn copy(&self, source: &Path, destination: &Path) -> io::Result<()> {
        (**self).copy(source, destination)
    }
}
