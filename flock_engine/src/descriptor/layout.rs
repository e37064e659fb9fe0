/// Descriptor set tiers and their layouts
///
/// | Set | Tier     | Binding 0                       | Copies   |
/// |-----|----------|---------------------------------|----------|
/// | 0   | Dynamic  | instance transforms (storage)   | per slot |
/// | 1   | PerFrame | view/projection (uniform)       | per slot |
/// | 2   | Shared   | material textures (sampler[])   | one      |
///
/// The compute pipeline has its own single set with the instance and
/// velocity storage buffers and the simulation parameters.

use bitflags::bitflags;

use crate::config::PENDING_FRAMES;
use crate::error::Result;
use crate::engine_bail_warn;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX   = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE  = 1 << 2;
    }
}

/// Graphics descriptor set tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetTier {
    Dynamic,
    PerFrame,
    Shared,
}

impl SetTier {
    pub const ALL: [SetTier; 3] = [SetTier::Dynamic, SetTier::PerFrame, SetTier::Shared];

    pub fn set_index(&self) -> u32 {
        match self {
            SetTier::Dynamic => 0,
            SetTier::PerFrame => 1,
            SetTier::Shared => 2,
        }
    }

    /// Whether the tier keeps one set per frame slot
    pub fn per_slot(&self) -> bool {
        self.update_frequency().requires_per_slot_copy()
    }

    pub fn update_frequency(&self) -> UpdateFrequency {
        match self {
            SetTier::Dynamic | SetTier::PerFrame => UpdateFrequency::EveryFrame,
            SetTier::Shared => UpdateFrequency::LoadTime,
        }
    }
}

/// How often a bound resource is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFrequency {
    EveryFrame,
    EveryNFrames(u32),
    /// Written once before the first frame
    LoadTime,
}

impl UpdateFrequency {
    /// More than one update per `PENDING_FRAMES` cycle means an in-flight
    /// frame could still read the old contents.
    pub fn requires_per_slot_copy(&self) -> bool {
        match *self {
            UpdateFrequency::EveryFrame => true,
            UpdateFrequency::EveryNFrames(n) => (n as usize) < PENDING_FRAMES,
            UpdateFrequency::LoadTime => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    StorageBuffer,
    CombinedImageSampler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub kind: BindingKind,
    /// Array length (1 for a single descriptor)
    pub count: u32,
    pub stages: ShaderStages,
}

impl DescriptorBinding {
    pub const fn new(binding: u32, kind: BindingKind, count: u32, stages: ShaderStages) -> Self {
        Self { binding, kind, count, stages }
    }
}

/// Layout of one descriptor set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLayoutDesc {
    pub name: &'static str,
    pub set: u32,
    /// `None` for the compute set
    pub tier: Option<SetTier>,
    pub bindings: Vec<DescriptorBinding>,
}

impl SetLayoutDesc {
    /// Set 0: instance transforms read by the vertex shader
    pub fn dynamic() -> Self {
        Self {
            name: "dynamic",
            set: SetTier::Dynamic.set_index(),
            tier: Some(SetTier::Dynamic),
            bindings: vec![DescriptorBinding::new(0, BindingKind::StorageBuffer, 1, ShaderStages::VERTEX)],
        }
    }

    /// Set 1: view and projection matrices
    pub fn per_frame() -> Self {
        Self {
            name: "per_frame",
            set: SetTier::PerFrame.set_index(),
            tier: Some(SetTier::PerFrame),
            bindings: vec![DescriptorBinding::new(0, BindingKind::UniformBuffer, 1, ShaderStages::VERTEX)],
        }
    }

    /// Set 2: sampler array sized to the texture table
    pub fn shared(texture_count: u32) -> Self {
        Self {
            name: "shared",
            set: SetTier::Shared.set_index(),
            tier: Some(SetTier::Shared),
            bindings: vec![DescriptorBinding::new(
                0,
                BindingKind::CombinedImageSampler,
                texture_count.max(1),
                ShaderStages::FRAGMENT,
            )],
        }
    }

    /// Compute set: instances, velocities, parameters
    pub fn compute() -> Self {
        Self {
            name: "compute",
            set: 0,
            tier: None,
            bindings: vec![
                DescriptorBinding::new(0, BindingKind::StorageBuffer, 1, ShaderStages::COMPUTE),
                DescriptorBinding::new(1, BindingKind::StorageBuffer, 1, ShaderStages::COMPUTE),
                DescriptorBinding::new(2, BindingKind::UniformBuffer, 1, ShaderStages::COMPUTE),
            ],
        }
    }

    /// Sets 0, 1 and 2 in set order
    pub fn graphics(texture_count: u32) -> Vec<SetLayoutDesc> {
        vec![Self::dynamic(), Self::per_frame(), Self::shared(texture_count)]
    }

    /// Number of sets allocated for this layout
    pub fn copies(&self, pending_frames: usize) -> u32 {
        match self.tier {
            Some(tier) if !tier.per_slot() => 1,
            _ => pending_frames as u32,
        }
    }

    pub fn binding(&self, binding: u32) -> Option<&DescriptorBinding> {
        self.bindings.iter().find(|b| b.binding == binding)
    }
}

/// Check a binding a shader declares against the pipeline's layouts
pub fn check_shader_binding(layouts: &[SetLayoutDesc], set: u32, binding: u32, kind: BindingKind) -> Result<()> {
    let Some(layout) = layouts.iter().find(|l| l.set == set) else {
        engine_bail_warn!("flock::descriptor", "Shader uses set {} which the pipeline layout lacks", set);
    };
    let Some(declared) = layout.binding(binding) else {
        engine_bail_warn!("flock::descriptor",
            "Shader uses set {} binding {} which the {} layout lacks", set, binding, layout.name);
    };
    if declared.kind != kind {
        engine_bail_warn!("flock::descriptor",
            "Set {} binding {} is {:?} in the {} layout but {:?} in the shader",
            set, binding, declared.kind, layout.name, kind);
    }
    Ok(())
}

/// Descriptor counts for the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorPoolSizing {
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
    pub combined_image_samplers: u32,
    pub max_sets: u32,
}

impl DescriptorPoolSizing {
    pub fn for_layouts(layouts: &[SetLayoutDesc], pending_frames: usize) -> Self {
        let mut sizing = Self::default();
        for layout in layouts {
            let copies = layout.copies(pending_frames);
            sizing.max_sets += copies;
            for binding in &layout.bindings {
                let total = binding.count * copies;
                match binding.kind {
                    BindingKind::UniformBuffer => sizing.uniform_buffers += total,
                    BindingKind::StorageBuffer => sizing.storage_buffers += total,
                    BindingKind::CombinedImageSampler => sizing.combined_image_samplers += total,
                }
            }
        }
        sizing
    }

    /// Graphics tiers plus the compute set
    pub fn for_scene(pending_frames: usize, texture_count: u32) -> Self {
        let mut layouts = SetLayoutDesc::graphics(texture_count);
        layouts.push(SetLayoutDesc::compute());
        Self::for_layouts(&layouts, pending_frames)
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
