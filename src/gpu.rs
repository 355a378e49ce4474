//! Host/device transfer of packed tensors using WGPU.
//!
//! A layer's `wba` tensor is one contiguous buffer, so moving a whole layer
//! to the device is a single storage-buffer upload. This module owns the
//! device context and the two transfers; it launches no kernels.
//!
//! The context is created once, lazily, on first use. If no adapter or
//! device can be acquired, every transfer returns
//! [`GpuFailure::Unavailable`] instead of panicking.

use std::sync::mpsc;

use thiserror::Error;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::error::TensorError;
use crate::tensor::{DIMS, Tensor4};

const F32_BYTES: usize = core::mem::size_of::<f32>();

/// Failures while acquiring the GPU.
#[derive(Error, Debug)]
pub enum GpuError {
    /// No suitable adapter.
    #[error("adapter error: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to open a device.
    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Failures while moving tensors across the host/device boundary.
#[derive(Error, Debug)]
pub enum GpuFailure {
    /// The global context could not be created.
    #[error("GPU unavailable: {0}")]
    Unavailable(String),
    /// Storage buffers cannot be empty.
    #[error("cannot upload an empty tensor")]
    EmptyTensor,
    /// Waiting on the device failed.
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
    /// The staging buffer could not be mapped.
    #[error("buffer mapping failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    /// The mapping callback was dropped without reporting.
    #[error("buffer mapping was abandoned")]
    MapAbandoned,
    /// The downloaded bytes do not fit the recorded extents.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// Holds the WGPU device and queue used for transfers.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// The device's submission queue.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Selects the default adapter and opens a device with default limits.
    ///
    /// # Errors
    ///
    /// [`GpuError`] if adapter or device acquisition fails.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("curnn"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))?;
        debug!(adapter = ?adapter.get_info().name, "opened GPU device");

        Ok(Self { device, queue })
    }
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: Result<GpuContext, String> = GpuContext::new().map_err(|err| err.to_string());
}

/// The shared device context, created on first call.
///
/// # Errors
///
/// [`GpuFailure::Unavailable`] if the context could not be created.
pub fn context() -> Result<&'static GpuContext, GpuFailure> {
    GPU_CONTEXT.as_ref().map_err(|err| {
        warn!(%err, "GPU context unavailable");
        GpuFailure::Unavailable(err.clone())
    })
}

/// An `f32` tensor resident in a device storage buffer.
#[derive(Debug)]
pub struct DeviceTensor {
    buffer: wgpu::Buffer,
    extents: [usize; DIMS],
}

impl DeviceTensor {
    /// Copies `tensor` into a new storage buffer.
    ///
    /// # Errors
    ///
    /// - [`GpuFailure::EmptyTensor`] if `tensor` holds no elements
    /// - [`GpuFailure::Unavailable`] if there is no device
    pub fn upload(tensor: &Tensor4<f32>) -> Result<Self, GpuFailure> {
        if tensor.is_empty() {
            return Err(GpuFailure::EmptyTensor);
        }
        let ctx = context()?;

        let bytes: Vec<u8> = tensor.as_slice().iter().flat_map(|v| v.to_le_bytes()).collect();
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("wba"),
            contents: &bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });
        debug!(bytes = bytes.len(), extents = ?tensor.extents(), "uploaded tensor");

        Ok(Self {
            buffer,
            extents: tensor.extents(),
        })
    }

    /// The device buffer, for binding into compute passes.
    #[must_use]
    pub const fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Extents of the uploaded tensor.
    #[must_use]
    pub const fn extents(&self) -> [usize; DIMS] {
        self.extents
    }

    /// Copies the buffer back into a host tensor.
    ///
    /// # Errors
    ///
    /// [`GpuFailure`] if the device is lost, mapping fails, or the buffer no
    /// longer matches the recorded extents.
    pub fn download(&self) -> Result<Tensor4<f32>, GpuFailure> {
        let ctx = context()?;
        let size = self.buffer.size();

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wba_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("wba_download"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        ctx.queue.submit(Some(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::PollType::Wait)?;
        rx.recv().map_err(|_| GpuFailure::MapAbandoned)??;

        let data: Vec<f32> = {
            let view = staging.slice(..).get_mapped_range();
            view.chunks_exact(F32_BYTES)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        };
        staging.unmap();
        debug!(bytes = size, "downloaded tensor");

        Ok(Tensor4::from_raw_parts(self.extents, data)?)
    }
}
