/// VulkanPipelines - Pipeline layouts and the opaque, env-map and boids pipelines
///
/// Both graphics pipelines share one layout (sets 0..2 plus the material
/// push-constant range) and use dynamic viewport and scissor so a swapchain
/// rebuild does not invalidate them.

use ash::vk;
use flock_engine::flock::config::Config;
use flock_engine::flock::descriptor::ShaderStages;
use flock_engine::flock::pipeline::{ComputePipelineDesc, GraphicsPipelineDesc, PushConstantRange};
use flock_engine::flock::Result;
use flock_engine::{engine_err, engine_info};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_convert::{
    compare_op_to_vk, cull_mode_to_vk, front_face_to_vk, shader_stages_to_vk, topology_to_vk, vertex_format_to_vk,
};
use crate::vulkan_descriptors::VulkanDescriptors;
use crate::vulkan_shader::ShaderModule;

pub struct VulkanPipelines {
    ctx: Arc<GpuContext>,
    graphics_layout: vk::PipelineLayout,
    compute_layout: vk::PipelineLayout,
    opaque: vk::Pipeline,
    env_map: Option<vk::Pipeline>,
    boids: vk::Pipeline,
}

impl VulkanPipelines {
    /// Build every pipeline; the env-map pipeline only when `with_env_map`
    pub fn new(
        ctx: Arc<GpuContext>,
        config: &Config,
        render_pass: vk::RenderPass,
        descriptors: &VulkanDescriptors,
        with_env_map: bool,
    ) -> Result<Self> {
        let mut this = Self {
            ctx,
            graphics_layout: vk::PipelineLayout::null(),
            compute_layout: vk::PipelineLayout::null(),
            opaque: vk::Pipeline::null(),
            env_map: None,
            boids: vk::Pipeline::null(),
        };

        let push_constants = PushConstantRange::material();
        let ranges = [vk::PushConstantRange {
            stage_flags: shader_stages_to_vk(push_constants.stages),
            offset: 0,
            size: push_constants.size,
        }];
        let create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(descriptors.graphics_layouts())
            .push_constant_ranges(&ranges);
        this.graphics_layout = unsafe { this.ctx.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| map_vk_error("vkCreatePipelineLayout", e))?;

        let compute_set_layouts = [descriptors.compute_layout()];
        let create_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&compute_set_layouts);
        this.compute_layout = unsafe { this.ctx.device.create_pipeline_layout(&create_info, None) }
            .map_err(|e| map_vk_error("vkCreatePipelineLayout", e))?;

        this.opaque = this.create_graphics(config, &GraphicsPipelineDesc::opaque(), render_pass, descriptors)?;
        if with_env_map {
            let env_map = this.create_graphics(config, &GraphicsPipelineDesc::env_map(), render_pass, descriptors)?;
            this.env_map = Some(env_map);
        }
        this.boids = this.create_compute(config, &ComputePipelineDesc::boids(), descriptors)?;

        engine_info!("flock::vulkan", "Pipelines ready (env map: {})", with_env_map);
        Ok(this)
    }

    pub fn graphics_layout(&self) -> vk::PipelineLayout {
        self.graphics_layout
    }

    pub fn compute_layout(&self) -> vk::PipelineLayout {
        self.compute_layout
    }

    pub fn opaque(&self) -> vk::Pipeline {
        self.opaque
    }

    pub fn env_map(&self) -> Option<vk::Pipeline> {
        self.env_map
    }

    pub fn boids(&self) -> vk::Pipeline {
        self.boids
    }

    fn create_graphics(
        &self,
        config: &Config,
        desc: &GraphicsPipelineDesc,
        render_pass: vk::RenderPass,
        descriptors: &VulkanDescriptors,
    ) -> Result<vk::Pipeline> {
        let layouts = descriptors.graphics_descs();
        let vertex = ShaderModule::load(
            Arc::clone(&self.ctx),
            &config.shader_path(desc.vertex_shader),
            ShaderStages::VERTEX,
            layouts,
        )?;
        let fragment = ShaderModule::load(
            Arc::clone(&self.ctx),
            &config.shader_path(desc.fragment_shader),
            ShaderStages::FRAGMENT,
            layouts,
        )?;
        let stages = [vertex.stage_info(), fragment.stage_info()];

        // Vertex input (empty when the shader generates positions)
        let mut bindings = Vec::new();
        let mut attributes = Vec::new();
        if let Some(layout) = &desc.vertex_layout {
            bindings.push(
                vk::VertexInputBindingDescription::default()
                    .binding(0)
                    .stride(layout.stride)
                    .input_rate(vk::VertexInputRate::VERTEX),
            );
            attributes.extend(layout.attributes.iter().map(|attribute| {
                vk::VertexInputAttributeDescription::default()
                    .location(attribute.location)
                    .binding(0)
                    .format(vertex_format_to_vk(attribute.format))
                    .offset(attribute.offset)
            }));
        }
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology_to_vk(desc.topology))
            .primitive_restart_enable(false);

        // Counts only; viewport and scissor are dynamic
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(cull_mode_to_vk(desc.cull_mode))
            .front_face(front_face_to_vk(desc.front_face))
            .depth_bias_enable(false);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth.test)
            .depth_write_enable(desc.depth.write)
            .depth_compare_op(compare_op_to_vk(desc.depth.compare))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let mut color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(desc.blend);
        if desc.blend {
            color_blend_attachment = color_blend_attachment
                .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                .color_blend_op(vk::BlendOp::ADD)
                .src_alpha_blend_factor(vk::BlendFactor::ONE)
                .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
                .alpha_blend_op(vk::BlendOp::ADD);
        }
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&color_blend_attachment));

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(self.graphics_layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = unsafe {
            self.ctx
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
        }
        .map_err(|(_, e)| map_vk_error("vkCreateGraphicsPipelines", e))?;

        // Shader modules drop here; the pipeline keeps its own copy
        pipelines
            .first()
            .copied()
            .ok_or_else(|| engine_err!("flock::vulkan", "No pipeline returned for {}", desc.name))
    }

    fn create_compute(
        &self,
        config: &Config,
        desc: &ComputePipelineDesc,
        descriptors: &VulkanDescriptors,
    ) -> Result<vk::Pipeline> {
        let shader = ShaderModule::load(
            Arc::clone(&self.ctx),
            &config.shader_path(desc.shader),
            ShaderStages::COMPUTE,
            std::slice::from_ref(descriptors.compute_desc()),
        )?;

        let create_info = vk::ComputePipelineCreateInfo::default()
            .stage(shader.stage_info())
            .layout(self.compute_layout);

        let pipelines = unsafe {
            self.ctx
                .device
                .create_compute_pipelines(vk::PipelineCache::null(), &[create_info], None)
        }
        .map_err(|(_, e)| map_vk_error("vkCreateComputePipelines", e))?;

        pipelines
            .first()
            .copied()
            .ok_or_else(|| engine_err!("flock::vulkan", "No pipeline returned for {}", desc.name))
    }
}

impl Drop for VulkanPipelines {
    fn drop(&mut self) {
        unsafe {
            let device = &self.ctx.device;
            for pipeline in [self.opaque, self.boids].into_iter().chain(self.env_map) {
                if pipeline != vk::Pipeline::null() {
                    device.destroy_pipeline(pipeline, None);
                }
            }
            for layout in [self.graphics_layout, self.compute_layout] {
                if layout != vk::PipelineLayout::null() {
                    device.destroy_pipeline_layout(layout, None);
                }
            }
        }
    }
}
