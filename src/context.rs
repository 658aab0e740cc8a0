use std::time::Duration;

use anyhow::Context as _;
use image::RgbaImage;

use crate::{
    data_structures::texture::Texture,
    renderer::WgpuRenderer,
};

/// GPU device plus an offscreen colour and depth target.
///
/// Frames rendered through [`Context::render`] can be copied back with
/// [`Context::read_target`].
#[derive(Debug)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub(crate) target: Texture,
    pub(crate) depth_texture: Texture,
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn headless(width: u32, height: u32) -> anyhow::Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "render target must not be empty");

        log::info!("wgpu setup for a {}x{} offscreen target", width, height);
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("desk scene device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("failed to open the graphics device")?;

        let target = Texture::create_render_target(
            &device,
            [width, height],
            Texture::COLOR_FORMAT,
            "render_target",
        );
        let depth_texture = Texture::create_depth_texture(&device, [width, height], "depth_texture");

        Ok(Self {
            device,
            queue,
            target,
            depth_texture,
            width,
            height,
            clear_colour: wgpu::Color::WHITE,
        })
    }

    /// A renderer whose pipeline targets this context's colour format.
    pub fn renderer(&self) -> WgpuRenderer {
        WgpuRenderer::new(&self.device, &self.queue, Texture::COLOR_FORMAT)
    }

    /// Flush the draws recorded by `renderer` into the offscreen target.
    pub fn render(&self, renderer: &mut WgpuRenderer) -> usize {
        renderer.render(&self.target.view, &self.depth_texture.view, self.clear_colour)
    }

    /// Copy the colour target back to the CPU.
    pub async fn read_target(&self) -> anyhow::Result<RgbaImage> {
        let u32_size = std::mem::size_of::<u32>() as u32;
        let unpadded_bytes_per_row = u32_size * self.width;
        let padded_bytes_per_row = unpadded_bytes_per_row
            .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            size: (padded_bytes_per_row * self.height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: Some("readback buffer"),
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        let submission = self.queue.submit(std::iter::once(encoder.finish()));

        // The mapping has to be requested before polling, otherwise the wait never resolves.
        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: Some(Duration::from_secs(3)),
            })
            .context("waiting for the readback copy")?;
        rx.receive()
            .await
            .context("readback channel closed")?
            .context("failed to map the readback buffer")?;

        let pixels = {
            let data = buffer_slice.get_mapped_range();
            let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * self.height) as usize);
            for row in data.chunks(padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
            }
            pixels
        };
        output_buffer.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .context("readback size does not match the target")
    }
}
