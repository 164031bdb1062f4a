use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CombinerError, Result};

/// How a pending resource can be modified after its first write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkCapability {
    /// Independent reads, writes and seeks on one handle.
    #[default]
    RandomAccess,
    /// Bytes can only be read back and replaced wholesale.
    WriteOnce,
}

/// A resource created by an [`OutputSink`] that is not yet visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingResource {
    /// Sink-private key identifying the pending bytes.
    pub key: String,
    /// Name the resource becomes visible under once finalized.
    pub display_name: String,
    pub mime_type: String,
    pub capability: SinkCapability,
}

/// Identifier of a finalized resource (a path for directory sinks).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub String);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A seekable handle that can also shrink the underlying resource.
pub trait RandomAccess: Read + Write + Seek {
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl RandomAccess for File {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

impl RandomAccess for Cursor<&mut Vec<u8>> {
    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}

/// Storage for composite results.
///
/// Resources are created pending, written, optionally edited, then either
/// finalized (made visible) or deleted.
pub trait OutputSink {
    fn create_pending(&mut self, display_name: &str, mime_type: &str) -> Result<PendingResource>;

    /// Append bytes to a pending resource.
    fn write(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()>;

    /// Random-access handle; only for `SinkCapability::RandomAccess` resources.
    fn open_random_access<'a>(
        &'a mut self,
        resource: &PendingResource,
    ) -> Result<Box<dyn RandomAccess + 'a>>;

    /// Everything written to the resource so far.
    fn read_back(&mut self, resource: &PendingResource) -> Result<Vec<u8>>;

    /// Replace the resource's contents in full.
    fn overwrite(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()>;

    /// Clear the pending state and make the resource visible.
    fn finalize(&mut self, resource: PendingResource) -> Result<ResourceId>;

    /// Discard a pending resource so no partial output is left behind.
    fn delete_pending(&mut self, resource: PendingResource) -> Result<()>;
}

fn sink_err(action: &str, target: &Path, err: std::io::Error) -> CombinerError {
    CombinerError::OutputSink(format!("{action} {}: {err}", target.display()))
}

fn require_random_access(resource: &PendingResource) -> Result<()> {
    if resource.capability != SinkCapability::RandomAccess {
        return Err(CombinerError::OutputSink(format!(
            "{} does not support random access",
            resource.display_name
        )));
    }
    Ok(())
}

/// Writes results into a directory, optionally under a sub-folder.
///
/// Pending resources are hidden `.pending-<name>` files renamed into place
/// on finalize. Finalize never replaces an existing file.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    directory: PathBuf,
    capability: SinkCapability,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, subfolder: Option<&str>) -> Self {
        let mut directory = root.into();
        if let Some(sub) = subfolder.filter(|s| !s.is_empty()) {
            directory.push(sub);
        }
        Self {
            directory,
            capability: SinkCapability::RandomAccess,
        }
    }

    pub fn with_capability(mut self, capability: SinkCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn pending_path(&self, resource: &PendingResource) -> PathBuf {
        self.directory.join(&resource.key)
    }
}

impl OutputSink for DirectorySink {
    fn create_pending(&mut self, display_name: &str, mime_type: &str) -> Result<PendingResource> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| sink_err("creating", &self.directory, e))?;

        let key = format!(".pending-{display_name}");
        let path = self.directory.join(&key);
        File::create(&path).map_err(|e| sink_err("creating", &path, e))?;
        debug!(path = %path.display(), "Created pending resource");

        Ok(PendingResource {
            key,
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            capability: self.capability,
        })
    }

    fn write(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()> {
        let path = self.pending_path(resource);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| sink_err("opening", &path, e))?;
        file.write_all(bytes)
            .map_err(|e| sink_err("writing", &path, e))
    }

    fn open_random_access<'a>(
        &'a mut self,
        resource: &PendingResource,
    ) -> Result<Box<dyn RandomAccess + 'a>> {
        require_random_access(resource)?;
        let path = self.pending_path(resource);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| sink_err("opening", &path, e))?;
        Ok(Box::new(file))
    }

    fn read_back(&mut self, resource: &PendingResource) -> Result<Vec<u8>> {
        let path = self.pending_path(resource);
        fs::read(&path).map_err(|e| sink_err("reading", &path, e))
    }

    fn overwrite(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()> {
        let path = self.pending_path(resource);
        fs::write(&path, bytes).map_err(|e| sink_err("overwriting", &path, e))
    }

    fn finalize(&mut self, resource: PendingResource) -> Result<ResourceId> {
        let pending = self.pending_path(&resource);
        let target = self.directory.join(&resource.display_name);
        if target.exists() {
            return Err(CombinerError::OutputSink(format!(
                "{} already exists",
                target.display()
            )));
        }
        fs::rename(&pending, &target).map_err(|e| sink_err("finalizing", &target, e))?;
        Ok(ResourceId(target.display().to_string()))
    }

    fn delete_pending(&mut self, resource: PendingResource) -> Result<()> {
        let path = self.pending_path(&resource);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(sink_err("deleting", &path, e)),
        }
    }
}

/// A stored resource in a [`MemorySink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryResource {
    pub display_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub pending: bool,
}

/// In-process output sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    capability: SinkCapability,
    next_key: u64,
    resources: BTreeMap<String, MemoryResource>,
}

impl MemorySink {
    pub fn new(capability: SinkCapability) -> Self {
        Self {
            capability,
            ..Default::default()
        }
    }

    /// Finalized resources, keyed by display name.
    pub fn finalized(&self) -> BTreeMap<String, &MemoryResource> {
        self.resources
            .values()
            .filter(|r| !r.pending)
            .map(|r| (r.display_name.clone(), r))
            .collect()
    }

    /// Number of resources still pending.
    pub fn pending_count(&self) -> usize {
        self.resources.values().filter(|r| r.pending).count()
    }

    fn entry(&mut self, resource: &PendingResource) -> Result<&mut MemoryResource> {
        self.resources
            .get_mut(&resource.key)
            .filter(|r| r.pending)
            .ok_or_else(|| {
                CombinerError::OutputSink(format!("no pending resource {}", resource.key))
            })
    }
}

impl OutputSink for MemorySink {
    fn create_pending(&mut self, display_name: &str, mime_type: &str) -> Result<PendingResource> {
        let key = format!("mem-{}", self.next_key);
        self.next_key += 1;
        self.resources.insert(
            key.clone(),
            MemoryResource {
                display_name: display_name.to_string(),
                mime_type: mime_type.to_string(),
                bytes: Vec::new(),
                pending: true,
            },
        );
        Ok(PendingResource {
            key,
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            capability: self.capability,
        })
    }

    fn write(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()> {
        self.entry(resource)?.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn open_random_access<'a>(
        &'a mut self,
        resource: &PendingResource,
    ) -> Result<Box<dyn RandomAccess + 'a>> {
        require_random_access(resource)?;
        let entry = self.entry(resource)?;
        Ok(Box::new(Cursor::new(&mut entry.bytes)))
    }

    fn read_back(&mut self, resource: &PendingResource) -> Result<Vec<u8>> {
        Ok(self.entry(resource)?.bytes.clone())
    }

    fn overwrite(&mut self, resource: &PendingResource, bytes: &[u8]) -> Result<()> {
        let entry = self.entry(resource)?;
        entry.bytes.clear();
        entry.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn finalize(&mut self, resource: PendingResource) -> Result<ResourceId> {
        self.entry(&resource)?.pending = false;
        Ok(ResourceId(resource.display_name))
    }

    fn delete_pending(&mut self, resource: PendingResource) -> Result<()> {
        self.entry(&resource)?;
        self.resources.remove(&resource.key);
        Ok(())
    }
}
