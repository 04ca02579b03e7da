//! Per-pipeline renderer: a list of (bind group, batch) pairs drawn in
//! insertion order, one render pass and one indexed draw per pair.

use anyhow::Result;

use tabula_engine::paint::Color;
use tabula_engine::render::{RenderCtx, RenderTarget};

use crate::batch::Batch;

/// Load behavior for a renderer's passes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PassLoad {
    /// Clear the target to this color (the first pass of a frame).
    Clear(Color),
    /// Composite over the previous pass's contents.
    Load,
}

/// A bind group paired with the batch it draws.
///
/// Replaces the index-aligned parallel lists of the original design; the
/// pairing is structural, not an invariant to remember.
pub struct DrawGroup {
    /// Bound at group 1 when present (group 0 is always the camera).
    pub bind_group: Option<wgpu::BindGroup>,
    pub batch: Batch,
}

/// One pipeline plus its draw groups.
///
/// Draw-call count scales linearly with group count: every group gets its
/// own pass. The whiteboard keeps group counts small (one for strokes, one
/// per placed picture).
pub struct Renderer {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    pass_load: PassLoad,
    groups: Vec<DrawGroup>,
}

impl Renderer {
    pub fn new(label: &'static str, pipeline: wgpu::RenderPipeline, pass_load: PassLoad) -> Self {
        Self {
            label,
            pipeline,
            pass_load,
            groups: Vec::new(),
        }
    }

    /// Appends a (bind group, batch) pair; returns its index.
    pub fn add_group(&mut self, bind_group: Option<wgpu::BindGroup>, batch: Batch) -> usize {
        self.groups.push(DrawGroup { bind_group, batch });
        self.groups.len() - 1
    }

    pub fn group_mut(&mut self, index: usize) -> &mut DrawGroup {
        &mut self.groups[index]
    }

    /// Flushes and draws every group in insertion order.
    ///
    /// A clearing renderer clears only on its first pass; later groups load,
    /// so they composite instead of erasing each other.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera_bind_group: &wgpu::BindGroup,
    ) -> Result<()> {
        for (i, group) in self.groups.iter_mut().enumerate() {
            group.batch.flush(ctx.queue)?;

            let load = match self.pass_load {
                PassLoad::Clear(c) if i == 0 => wgpu::LoadOp::Clear(c.into()),
                _ => wgpu::LoadOp::Load,
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(self.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let index_count = group.batch.index_count();
            if index_count == 0 {
                // The pass still ran (a clear must happen even with no
                // geometry); only the draw is skipped.
                continue;
            }

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, camera_bind_group, &[]);
            if let Some(bg) = &group.bind_group {
                rpass.set_bind_group(1, bg, &[]);
            }
            rpass.set_vertex_buffer(0, group.batch.vertex_buffer().slice(..));
            rpass.set_index_buffer(group.batch.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..index_count, 0, 0..1);
        }

        Ok(())
    }
}
