/// Descriptor set tiers, layouts and pool sizing

pub mod layout;

pub use layout::{
    check_shader_binding, BindingKind, DescriptorBinding, DescriptorPoolSizing, SetLayoutDesc, SetTier,
    ShaderStages, UpdateFrequency,
};
