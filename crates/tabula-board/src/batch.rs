//! Growable geometry batches over fixed-capacity GPU buffers.
//!
//! A `Batch` accumulates vertex floats and indices on the CPU between frames
//! and uploads them to the next free offset of its backing buffers on
//! `flush`. Write cursors only advance; geometry lives for the process
//! lifetime (no deletion or compaction).

use anyhow::{bail, Result};

/// CPU-side staging and cursor bookkeeping for one batch.
///
/// Kept separate from the GPU buffers so the upload arithmetic is testable
/// without a device.
#[derive(Debug)]
struct Staging {
    floats_per_vertex: usize,
    vertex_capacity: u64, // bytes
    index_capacity: u64,  // bytes

    vertex_cursor: u64, // bytes uploaded so far
    index_cursor: u64,

    /// Indices uploaded so far; the drawable range each frame.
    index_count: u32,

    vertices: Vec<f32>,
    indices: Vec<u32>,
}

/// One pending upload: staged data plus the byte offsets it lands at.
#[derive(Debug, PartialEq)]
struct Upload {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    vertex_offset: u64,
    index_offset: u64,
}

impl Staging {
    fn new(floats_per_vertex: usize, max_vertices: u64, max_indices: u64) -> Self {
        Self {
            floats_per_vertex,
            vertex_capacity: max_vertices * (floats_per_vertex as u64) * 4,
            index_capacity: max_indices * 4,
            vertex_cursor: 0,
            index_cursor: 0,
            index_count: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Total vertices in the batch: uploaded plus staged.
    ///
    /// This is the rebase offset for incoming local indices.
    fn vertex_count(&self) -> u32 {
        let uploaded = self.vertex_cursor / (self.floats_per_vertex as u64 * 4);
        uploaded as u32 + (self.vertices.len() / self.floats_per_vertex) as u32
    }

    /// Stages geometry. `indices` are local (0-based within `vertices`) and
    /// are rebased against the batch's current vertex count.
    fn append(&mut self, vertices: &[f32], indices: &[u32]) {
        debug_assert_eq!(vertices.len() % self.floats_per_vertex, 0);

        let base = self.vertex_count();
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
    }

    /// Takes the staged data as an `Upload` and advances the cursors.
    ///
    /// Returns `Ok(None)` when nothing is staged (cursors untouched), and an
    /// error when the staged bytes would overrun either buffer's capacity.
    fn take_upload(&mut self, label: &str) -> Result<Option<Upload>> {
        if self.vertices.is_empty() && self.indices.is_empty() {
            return Ok(None);
        }

        let vertex_bytes = self.vertices.len() as u64 * 4;
        let index_bytes = self.indices.len() as u64 * 4;

        if self.vertex_cursor + vertex_bytes > self.vertex_capacity {
            bail!(
                "batch '{label}' vertex buffer overflow: {} + {} > {} bytes",
                self.vertex_cursor,
                vertex_bytes,
                self.vertex_capacity
            );
        }
        if self.index_cursor + index_bytes > self.index_capacity {
            bail!(
                "batch '{label}' index buffer overflow: {} + {} > {} bytes",
                self.index_cursor,
                index_bytes,
                self.index_capacity
            );
        }

        let upload = Upload {
            vertices: std::mem::take(&mut self.vertices),
            indices: std::mem::take(&mut self.indices),
            vertex_offset: self.vertex_cursor,
            index_offset: self.index_cursor,
        };

        self.vertex_cursor += vertex_bytes;
        self.index_cursor += index_bytes;
        self.index_count += upload.indices.len() as u32;

        Ok(Some(upload))
    }
}

/// A batch bound to its pair of device buffers.
pub struct Batch {
    label: String,
    staging: Staging,
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

impl Batch {
    /// Allocates the backing buffers at their full fixed capacity.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        floats_per_vertex: usize,
        max_vertices: u64,
        max_indices: u64,
    ) -> Self {
        let staging = Staging::new(floats_per_vertex, max_vertices, max_indices);

        let vbo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} vbo")),
            size: staging.vertex_capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ibo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} ibo")),
            size: staging.index_capacity,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            label: label.to_string(),
            staging,
            vbo,
            ibo,
        }
    }

    /// Stages geometry for the next flush. Indices are local to `vertices`.
    pub fn append(&mut self, vertices: &[f32], indices: &[u32]) {
        self.staging.append(vertices, indices);
    }

    /// Uploads staged geometry at the write cursors and advances them.
    ///
    /// A flush with nothing staged is a no-op. Exceeding either buffer's
    /// capacity is an error, not silent corruption.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> Result<()> {
        let Some(upload) = self.staging.take_upload(&self.label)? else {
            return Ok(());
        };

        queue.write_buffer(
            &self.vbo,
            upload.vertex_offset,
            bytemuck::cast_slice(&upload.vertices),
        );
        queue.write_buffer(
            &self.ibo,
            upload.index_offset,
            bytemuck::cast_slice(&upload.indices),
        );

        Ok(())
    }

    /// Indices uploaded so far; the draw range for this batch.
    pub fn index_count(&self) -> u32 {
        self.staging.index_count
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vbo
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.ibo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging() -> Staging {
        // 2 floats per vertex, room for 8 vertices / 12 indices.
        Staging::new(2, 8, 12)
    }

    // ── append / rebase ──────────────────────────────────────────────────

    #[test]
    fn append_rebases_local_indices() {
        let mut s = staging();
        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);

        // Second quad's indices point past the first quad's 4 vertices.
        assert_eq!(&s.indices[6..], &[4, 5, 6, 6, 5, 7]);
    }

    #[test]
    fn rebase_spans_flushes() {
        let mut s = staging();
        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        s.take_upload("t").unwrap();

        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        assert_eq!(&s.indices[..], &[4, 5, 6, 6, 5, 7]);
    }

    // ── flush ────────────────────────────────────────────────────────────

    #[test]
    fn empty_flush_is_idempotent() {
        let mut s = staging();
        assert!(s.take_upload("t").unwrap().is_none());
        assert_eq!(s.vertex_cursor, 0);
        assert_eq!(s.index_cursor, 0);
        assert_eq!(s.index_count, 0);
    }

    #[test]
    fn flush_advances_cursors_by_staged_bytes() {
        let mut s = staging();
        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);

        let up = s.take_upload("t").unwrap().unwrap();
        assert_eq!(up.vertex_offset, 0);
        assert_eq!(up.index_offset, 0);

        // 8 floats and 6 indices, 4 bytes each.
        assert_eq!(s.vertex_cursor, 32);
        assert_eq!(s.index_cursor, 24);
        assert_eq!(s.index_count, 6);
        assert!(s.vertices.is_empty());
        assert!(s.indices.is_empty());
    }

    #[test]
    fn second_flush_lands_at_next_free_offset() {
        let mut s = staging();
        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        s.take_upload("t").unwrap();

        s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        let up = s.take_upload("t").unwrap().unwrap();
        assert_eq!(up.vertex_offset, 32);
        assert_eq!(up.index_offset, 24);
    }

    #[test]
    fn overflow_fails_loudly_and_leaves_cursors() {
        let mut s = staging();
        // 3 quads of 4 vertices exceed the 8-vertex capacity.
        for _ in 0..3 {
            s.append(&[0.0; 8], &[0, 1, 2, 2, 1, 3]);
        }

        assert!(s.take_upload("t").is_err());
        assert_eq!(s.vertex_cursor, 0);
        assert_eq!(s.index_count, 0);
    }
}
