/// VulkanShader - SPIR-V loading, reflection and shader modules
///
/// Every descriptor a shader declares is checked against the pipeline's set
/// layouts before the module is created, so a mismatch between GLSL and the
/// layout tables fails at load time instead of in the validation layer.

use ash::vk;
use flock_engine::flock::descriptor::{check_shader_binding, BindingKind, SetLayoutDesc, ShaderStages};
use flock_engine::flock::{Error, Result};
use flock_engine::{engine_bail, engine_bail_warn, engine_debug, engine_err, engine_error};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_convert::shader_stages_to_vk;

/// Descriptor or push-constant block found in a SPIR-V module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectedResource {
    Descriptor { set: u32, binding: u32, kind: BindingKind },
    PushConstant { size: Option<u32> },
}

pub struct ShaderModule {
    ctx: Arc<GpuContext>,
    module: vk::ShaderModule,
    stage: ShaderStages,
}

impl ShaderModule {
    /// Load `path`, validate it against `layouts` and create the module
    pub fn load(ctx: Arc<GpuContext>, path: &Path, stage: ShaderStages, layouts: &[SetLayoutDesc]) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            engine_error!("flock::vulkan", "Cannot read shader {}: {}", path.display(), e);
            Error::InvalidResource(format!("Cannot read shader {}: {}", path.display(), e))
        })?;
        let code = ash::util::read_spv(&mut Cursor::new(&bytes)).map_err(|e| {
            engine_error!("flock::vulkan", "Shader {} is not valid SPIR-V: {}", path.display(), e);
            Error::InvalidResource(format!("Shader {} is not valid SPIR-V: {}", path.display(), e))
        })?;

        for resource in reflect(&code)? {
            match resource {
                ReflectedResource::Descriptor { set, binding, kind } => {
                    check_shader_binding(layouts, set, binding, kind)?;
                }
                ReflectedResource::PushConstant { size: Some(size) } if size > 128 => {
                    engine_bail_warn!("flock::vulkan",
                        "Shader {} declares {} bytes of push constants", path.display(), size);
                }
                ReflectedResource::PushConstant { .. } => {}
            }
        }

        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
        let module = unsafe { ctx.device.create_shader_module(&create_info, None) }
            .map_err(|e| map_vk_error("vkCreateShaderModule", e))?;

        engine_debug!("flock::vulkan", "Loaded shader {} ({} words)", path.display(), code.len());
        Ok(Self { ctx, module, stage })
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    /// Stage create info with the `main` entry point
    pub fn stage_info(&self) -> vk::PipelineShaderStageCreateInfo<'static> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(shader_stages_to_vk(self.stage))
            .module(self.module)
            .name(c"main")
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Descriptors and push-constant blocks used by any entry point of `code`
pub fn reflect(code: &[u32]) -> Result<Vec<ReflectedResource>> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| engine_err!("flock::vulkan", "SPIR-V reflection failed: {:?}", e))?;

    let mut resources = Vec::new();
    for entry_point in &entry_points {
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { desc_bind, desc_ty, .. } => {
                    resources.push(ReflectedResource::Descriptor {
                        set: desc_bind.set(),
                        binding: desc_bind.bind(),
                        kind: binding_kind(desc_ty)?,
                    });
                }
                spirq::var::Variable::PushConstant { ty, .. } => {
                    resources.push(ReflectedResource::PushConstant {
                        size: ty.nbyte().map(|s| s as u32),
                    });
                }
                _ => {}
            }
        }
    }
    Ok(resources)
}

fn binding_kind(desc_ty: &spirq::ty::DescriptorType) -> Result<BindingKind> {
    use spirq::ty::DescriptorType;
    match desc_ty {
        DescriptorType::UniformBuffer() => Ok(BindingKind::UniformBuffer),
        DescriptorType::StorageBuffer(..) => Ok(BindingKind::StorageBuffer),
        DescriptorType::CombinedImageSampler() => Ok(BindingKind::CombinedImageSampler),
        other => {
            engine_bail!("flock::vulkan", "Unsupported SPIR-V descriptor type: {:?}", other);
        }
    }
}
