// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host boundary: scoped mesh edit sessions and object linking.
//!
//! A feature build never owns persistent mesh storage. It asks the host for
//! the active mesh through [`MeshHost::begin_edit`], mutates it, and either
//! commits it back with the generated objects or lets the [`EditSession`]
//! guard abort the edit when it is dropped on an error path.

use archgen_mesh::Mesh;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::objects::ObjectArena;

/// Services a host application provides to feature builds.
pub trait MeshHost {
    /// Hands out the active mesh for editing.
    fn begin_edit(&mut self) -> Result<Mesh>;

    /// Stores an edited mesh back as the active mesh.
    fn end_edit(&mut self, mesh: Mesh) -> Result<()>;

    /// Discards an edit. The host keeps its previous mesh.
    fn abort_edit(&mut self, mesh: Mesh);

    /// Attaches generated sub-objects to the scene.
    fn link_objects(&mut self, objects: ObjectArena) -> Result<()>;

    /// Resolves a named external model into geometry, if the host has one.
    fn import_asset(&mut self, name: &str) -> Option<Mesh> {
        let _ = name;
        None
    }
}

/// Scoped edit of the host's active mesh.
///
/// Dropping the session without [`EditSession::commit`] aborts the edit.
pub struct EditSession<'h, H: MeshHost + ?Sized> {
    host: &'h mut H,
    mesh: Option<Mesh>,
}

impl<'h, H: MeshHost + ?Sized> EditSession<'h, H> {
    pub fn begin(host: &'h mut H) -> Result<Self> {
        let mesh = host.begin_edit()?;
        Ok(Self { host, mesh: Some(mesh) })
    }

    /// The working mesh.
    pub fn mesh(&mut self) -> &mut Mesh {
        // Only `commit` takes the mesh, and it consumes the session
        self.mesh.get_or_insert_with(Mesh::new)
    }

    /// The working mesh together with the host, for asset imports mid-build.
    pub fn parts(&mut self) -> (&mut Mesh, &mut H) {
        let mesh = self.mesh.get_or_insert_with(Mesh::new);
        (mesh, &mut *self.host)
    }

    /// Flushes the mesh back to the host, then links the objects.
    pub fn commit(mut self, objects: ObjectArena) -> Result<()> {
        let mesh = self.mesh.take().unwrap_or_default();
        self.host.end_edit(mesh)?;
        if !objects.is_empty() {
            self.host.link_objects(objects)?;
        }
        Ok(())
    }
}

impl<H: MeshHost + ?Sized> Drop for EditSession<'_, H> {
    fn drop(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            tracing::debug!(faces = mesh.face_count(), "Edit session dropped, aborting");
            self.host.abort_edit(mesh);
        }
    }
}

/// In-process host keeping the mesh and linked objects in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub mesh: Mesh,
    pub linked: Vec<ObjectArena>,
    pub assets: FxHashMap<String, Mesh>,
    pub commits: usize,
    pub aborts: usize,
}

impl MemoryHost {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            ..Self::default()
        }
    }

    /// Registers geometry returned by [`MeshHost::import_asset`].
    pub fn with_asset(mut self, name: &str, mesh: Mesh) -> Self {
        self.assets.insert(name.to_string(), mesh);
        self
    }

    /// Every linked object across all commits.
    pub fn objects(&self) -> ObjectArena {
        let mut all = ObjectArena::new();
        for arena in &self.linked {
            all.extend(arena.clone());
        }
        all
    }
}

impl MeshHost for MemoryHost {
    fn begin_edit(&mut self) -> Result<Mesh> {
        Ok(self.mesh.clone())
    }

    fn end_edit(&mut self, mesh: Mesh) -> Result<()> {
        self.mesh = mesh;
        self.commits += 1;
        Ok(())
    }

    fn abort_edit(&mut self, _mesh: Mesh) {
        self.aborts += 1;
    }

    fn link_objects(&mut self, objects: ObjectArena) -> Result<()> {
        self.linked.push(objects);
        Ok(())
    }

    fn import_asset(&mut self, name: &str) -> Option<Mesh> {
        self.assets.get(name).cloned()
    }
}
