//! Per-frame recording state.
//!
//! A [`Frame`] owns the command encoder for one iteration of the frame loop and
//! tracks which surface is currently the render destination. The destination
//! only changes through a [`DestinationScope`], which puts the previous value
//! back when it is dropped, whether the scoped code returned normally, returned
//! an error or unwound.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an offscreen render target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    /// The window surface.
    #[default]
    Screen,
    Offscreen(TargetId),
}

#[derive(Debug, Default)]
pub struct Bindings {
    active: Destination,
}

impl Bindings {
    pub fn active(&self) -> Destination {
        self.active
    }

    /// Makes `destination` active until the returned scope is dropped.
    pub fn bind(&mut self, destination: Destination) -> DestinationScope<'_> {
        let previous = std::mem::replace(&mut self.active, destination);
        DestinationScope {
            bindings: self,
            previous,
        }
    }
}

pub struct DestinationScope<'a> {
    bindings: &'a mut Bindings,
    previous: Destination,
}

impl DestinationScope<'_> {
    pub fn previous(&self) -> Destination {
        self.previous
    }
}

impl Deref for DestinationScope<'_> {
    type Target = Bindings;

    fn deref(&self) -> &Bindings {
        self.bindings
    }
}

impl DerefMut for DestinationScope<'_> {
    fn deref_mut(&mut self) -> &mut Bindings {
        self.bindings
    }
}

impl Drop for DestinationScope<'_> {
    fn drop(&mut self) {
        self.bindings.active = self.previous;
    }
}

pub struct Frame {
    encoder: wgpu::CommandEncoder,
    bindings: Bindings,
}

impl Frame {
    pub fn new(device: &wgpu::Device) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        Self {
            encoder,
            bindings: Bindings::default(),
        }
    }

    pub fn active_destination(&self) -> Destination {
        self.bindings.active()
    }

    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    /// Binds `destination` and hands out the encoder alongside the scope so
    /// a render pass can be recorded while the binding is held.
    pub fn bind(
        &mut self,
        destination: Destination,
    ) -> (&mut wgpu::CommandEncoder, DestinationScope<'_>) {
        (&mut self.encoder, self.bindings.bind(destination))
    }

    pub fn finish(self) -> wgpu::CommandBuffer {
        debug_assert_eq!(
            self.bindings.active(),
            Destination::Screen,
            "frame finished with an offscreen target still bound"
        );
        self.encoder.finish()
    }
}
