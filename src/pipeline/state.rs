//! Cached mirror of the device's fixed-function state.
//!
//! The pipeline diffs incoming values against these structs before touching
//! the device, so their defaults match the device's boot state. A freshly
//! created pipeline overwrites them with values fetched from the live device
//! rather than trusting the defaults.

use crate::pipeline::types::{
    BlendFactor, BlendOp, ColorWrites, CompareOp, CullMode, FillMode, FrontFace, LogicOp,
    PrimitiveTopology, ProvokingVertexMode, StencilOp, VertexBufferHandle,
};

/// Viewport rectangle with depth range, in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One slot of the vertex buffer binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputBinding {
    pub buffer: Option<VertexBufferHandle>,
    pub offset: usize,
    pub stride: usize,
}

impl Default for VertexInputBinding {
    fn default() -> Self {
        Self {
            buffer: None,
            offset: 0,
            stride: 0,
        }
    }
}

/// Mirror of the vertex buffer binding table of the bound vertex array.
///
/// Binding slots are recorded for introspection only; buffer binds are never
/// diffed because the table belongs to whichever vertex array is bound.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexInputState {
    pub bindings: Vec<VertexInputBinding>,
}

impl VertexInputState {
    /// Records a span of bindings starting at `first_binding`, growing the
    /// table as needed.
    pub fn record(
        &mut self,
        first_binding: usize,
        buffers: &[VertexBufferHandle],
        offsets: &[usize],
        strides: &[usize],
    ) {
        let end = first_binding + buffers.len();
        if self.bindings.len() < end {
            self.bindings.resize(end, VertexInputBinding::default());
        }
        for (i, buffer) in buffers.iter().enumerate() {
            self.bindings[first_binding + i] = VertexInputBinding {
                buffer: Some(*buffer),
                offset: offsets[i],
                stride: strides[i],
            };
        }
    }
}

/// Primitive assembly state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputAssemblyState {
    pub topology: PrimitiveTopology,
    pub primitive_restart_enabled: bool,
}

impl Default for InputAssemblyState {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            primitive_restart_enabled: false,
        }
    }
}

/// All viewport and scissor rectangles. Both vectors are sized to the
/// device's viewport limit at pipeline construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewportState {
    pub viewports: Vec<Viewport>,
    pub scissors: Vec<ScissorRect>,
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationState {
    pub rasterizer_discard_enabled: bool,
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias_enabled: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_slope_factor: f32,
    pub depth_clamp_enabled: bool,
    pub scissor_test_enabled: bool,
    pub provoking_vertex_mode: ProvokingVertexMode,
    pub point_size: f32,
    pub line_width: f32,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            rasterizer_discard_enabled: false,
            fill_mode: FillMode::Fill,
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            depth_bias_enabled: false,
            depth_bias_constant_factor: 0.0,
            depth_bias_slope_factor: 0.0,
            depth_clamp_enabled: false,
            scissor_test_enabled: false,
            provoking_vertex_mode: ProvokingVertexMode::Last,
            point_size: 1.0,
            line_width: 1.0,
        }
    }
}

/// Stencil parameters for one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceState {
    pub fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub compare_op: CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
            compare_mask: u32::MAX,
            write_mask: u32::MAX,
            reference: 0,
        }
    }
}

/// Depth test and dual-face stencil state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enabled: bool,
    pub stencil_front: StencilFaceState,
    pub stencil_back: StencilFaceState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enabled: false,
            depth_write_enabled: true,
            depth_compare_op: CompareOp::Less,
            stencil_test_enabled: false,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
        }
    }
}

/// Blend factors and operations for the color and alpha channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBlendEquation {
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
}

impl Default for ColorBlendEquation {
    fn default() -> Self {
        Self {
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
        }
    }
}

/// Color blending and logical operation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBlendState {
    pub logic_op_enabled: bool,
    pub logic_op: LogicOp,
    pub blend_enabled: bool,
    pub color_blend_equation: ColorBlendEquation,
    pub color_write_mask: ColorWrites,
    pub blend_constants: [f32; 4],
}

impl Default for ColorBlendState {
    fn default() -> Self {
        Self {
            logic_op_enabled: false,
            logic_op: LogicOp::Copy,
            blend_enabled: false,
            color_blend_equation: ColorBlendEquation::default(),
            color_write_mask: ColorWrites::ALL,
            blend_constants: [0.0; 4],
        }
    }
}

/// Values applied when clearing framebuffer attachments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValue {
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl Default for ClearValue {
    fn default() -> Self {
        Self {
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Complete fixed-function state snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineState {
    pub vertex_input: VertexInputState,
    pub input_assembly: InputAssemblyState,
    pub viewport: ViewportState,
    pub rasterization: RasterizationState,
    pub depth_stencil: DepthStencilState,
    pub color_blend: ColorBlendState,
    pub clear_value: ClearValue,
}
