//! Picture placement: decode, texture upload, and quad geometry.
//!
//! Pictures arrive by dropping a file onto the window or pasting from the
//! clipboard. Each one gets its own texture bind group and batch pair on the
//! picture renderer, plus a single quad anchored at the pointer.

use std::path::Path;

use anyhow::{Context, Result};

use tabula_engine::coords::Vec2;

/// Decoded RGBA8 pixels.
pub struct Pixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decodes an image file to RGBA8.
pub fn decode_file(path: &Path) -> Result<Pixels> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?
        .to_rgba8();

    let (width, height) = img.dimensions();
    Ok(Pixels {
        width,
        height,
        data: img.into_raw(),
    })
}

/// Grabs an image from the system clipboard.
pub fn decode_clipboard() -> Result<Pixels> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    let img = clipboard
        .get_image()
        .context("no image on the clipboard")?;

    Ok(Pixels {
        width: img.width as u32,
        height: img.height as u32,
        data: img.bytes.into_owned(),
    })
}

/// Uploads pixels to a new texture and returns its bind group.
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    pixels: &Pixels,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: pixels.width,
        height: pixels.height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("tabula picture texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels.data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * pixels.width),
            rows_per_image: Some(pixels.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("tabula picture sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    });

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("tabula picture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}

/// Picture quad geometry: position + uv floats and local indices.
///
/// `top_left`/`bottom_right` are world-space corners; texture coordinates
/// map corner-to-corner, (0,0) at `top_left` through (1,1) at
/// `bottom_right`.
pub fn picture_quad(top_left: Vec2, bottom_right: Vec2) -> ([f32; 16], [u32; 6]) {
    let (tl, br) = (top_left, bottom_right);
    let tr = Vec2::new(br.x, tl.y);
    let bl = Vec2::new(tl.x, br.y);

    #[rustfmt::skip]
    let vertices = [
        tl.x, tl.y, 0.0, 0.0,
        bl.x, bl.y, 0.0, 1.0,
        tr.x, tr.y, 1.0, 0.0,
        br.x, br.y, 1.0, 1.0,
    ];

    (vertices, [0, 1, 2, 1, 3, 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_maps_uv_corner_to_corner() {
        let (v, _) = picture_quad(Vec2::new(-1.0, 1.0), Vec2::new(1.0, -1.0));

        // (pos.x, pos.y, u, v) per vertex.
        assert_eq!(&v[0..4], &[-1.0, 1.0, 0.0, 0.0]); // top-left
        assert_eq!(&v[4..8], &[-1.0, -1.0, 0.0, 1.0]); // bottom-left
        assert_eq!(&v[8..12], &[1.0, 1.0, 1.0, 0.0]); // top-right
        assert_eq!(&v[12..16], &[1.0, -1.0, 1.0, 1.0]); // bottom-right
    }

    #[test]
    fn quad_indices_cover_two_triangles() {
        let (_, idx) = picture_quad(Vec2::zero(), Vec2::new(1.0, 1.0));
        assert_eq!(idx.len(), 6);
        // Every corner is referenced.
        for corner in 0..4 {
            assert!(idx.contains(&corner));
        }
    }
}
