//! Readback of the presented frame into a PNG.

use std::path::Path;
use std::sync::mpsc;

use image::RgbaImage;
use wgpu::{Buffer, CommandEncoder, Device, Texture, TextureFormat};

use super::{RenderError, Result};

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of a texture-to-buffer copy (multiple of 256 bytes).
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

/// Strip row padding and reorder BGRA to RGBA if needed.
pub fn tight_rgba(data: &[u8], width: u32, height: u32, padded_bpr: u32, bgra: bool) -> Vec<u8> {
    let tight_bpr = (width * BYTES_PER_PIXEL) as usize;
    let mut out = Vec::with_capacity(tight_bpr * height as usize);
    for row in data.chunks(padded_bpr as usize).take(height as usize) {
        out.extend_from_slice(&row[..tight_bpr]);
    }
    if bgra {
        for pixel in out.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
    out
}

/// A pending copy of a surface texture into a mappable buffer.
pub struct FrameCapture {
    staging: Buffer,
    width: u32,
    height: u32,
    padded_bpr: u32,
    bgra: bool,
}

impl FrameCapture {
    /// Record a copy of `texture` into `encoder`. The texture needs `COPY_SRC`.
    pub fn encode(device: &Device, encoder: &mut CommandEncoder, texture: &Texture) -> Self {
        let width = texture.width();
        let height = texture.height();
        let padded_bpr = padded_bytes_per_row(width);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture_staging"),
            size: (padded_bpr * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bpr),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );

        Self {
            staging,
            width,
            height,
            padded_bpr,
            bgra: matches!(
                texture.format(),
                TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb
            ),
        }
    }

    /// Block until the copy lands and return it as an image. Call after submit.
    pub fn read(self, device: &Device) -> Result<RgbaImage> {
        let slice = self.staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| RenderError::Capture(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| RenderError::Capture(e.to_string()))?
            .map_err(|e| RenderError::Capture(e.to_string()))?;

        let pixels = {
            let data = slice.get_mapped_range();
            tight_rgba(&data, self.width, self.height, self.padded_bpr, self.bgra)
        };
        self.staging.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| RenderError::Capture("pixel buffer size mismatch".into()))
    }
}

pub fn write_png(path: &Path, image: &RgbaImage) -> Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| RenderError::WriteImage {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_row_pitch() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1024), 4096);
    }

    #[test]
    fn test_tight_rgba_strips_padding_and_swizzles() {
        // 2x2 BGRA image with 8 bytes of padding per row.
        let padded_bpr = 16;
        let mut data = vec![0u8; 32];
        data[0..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[16..24].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

        let rgba = tight_rgba(&data, 2, 2, padded_bpr, true);
        assert_eq!(
            rgba,
            vec![3, 2, 1, 4, 7, 6, 5, 8, 11, 10, 9, 12, 15, 14, 13, 16]
        );

        let untouched = tight_rgba(&data, 2, 2, padded_bpr, false);
        assert_eq!(&untouched[..4], &[1, 2, 3, 4]);
        assert_eq!(untouched.len(), 16);
    }
}
