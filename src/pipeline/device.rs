//! Abstraction over the immediate-mode rendering device.
//!
//! [`RenderDevice`] exposes one method per raw device entry point the
//! pipeline cache can emit. Methods that take enum-like parameters take the
//! device's native `u32` tokens so the token tables in
//! [`types`](crate::pipeline::types) stay the single translation layer.
//!
//! [`RecordingDevice`] is the in-memory backend used by the test suite. It
//! stores every call it receives, which lets tests assert that redundant
//! state changes never reach the device.

use crate::pipeline::state::PipelineState;

/// Device limits and default framebuffer properties, queried once at
/// pipeline construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCaps {
    pub max_viewports: u32,
    pub max_sampler_anisotropy: f32,
    pub default_framebuffer_dimensions: [u32; 2],
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            max_viewports: 16,
            max_sampler_anisotropy: 16.0,
            default_framebuffer_dimensions: [1280, 720],
        }
    }
}

/// Toggleable device capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cap {
    CullFace,
    DepthTest,
    StencilTest,
    Blend,
    ScissorTest,
    ColorLogicOp,
    PolygonOffsetFill,
    PolygonOffsetLine,
    PolygonOffsetPoint,
    DepthClamp,
    PrimitiveRestartFixedIndex,
    RasterizerDiscard,
    Multisample,
    SeamlessCubemap,
}

/// One recorded device call, mirroring the mutating methods of
/// [`RenderDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Enable(Cap),
    Disable(Cap),
    ClipControl { origin: u32, depth: u32 },
    PixelStoreAlignment { pack: i32, unpack: i32 },
    PolygonMode(u32),
    CullFace(u32),
    FrontFace(u32),
    PolygonOffset { slope_factor: f32, constant_factor: f32 },
    ProvokingVertex(u32),
    PointSize(f32),
    LineWidth(f32),
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    DepthRange { min_depth: f64, max_depth: f64 },
    Scissor { x: i32, y: i32, width: i32, height: i32 },
    DepthMask(bool),
    DepthFunc(u32),
    StencilOpSeparate { face: u32, fail: u32, depth_fail: u32, pass: u32 },
    StencilFuncSeparate { face: u32, func: u32, reference: i32, mask: u32 },
    StencilMaskSeparate { face: u32, mask: u32 },
    LogicOp(u32),
    BlendFuncSeparate { src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32 },
    BlendEquationSeparate { mode_rgb: u32, mode_alpha: u32 },
    ColorMask { r: bool, g: bool, b: bool, a: bool },
    BlendColor([f32; 4]),
    BindFramebuffer(u32),
    UseProgram(u32),
    BindVertexArray(u32),
    BindVertexBuffer { array: u32, binding: u32, buffer: u32, offset: usize, stride: usize },
    DrawArrays { topology: u32, first_vertex: i32, vertex_count: i32, instance_count: i32, first_instance: u32 },
    DrawElements { topology: u32, index_count: i32, index_offset: usize, instance_count: i32, first_instance: u32 },
    Clear(u32),
    ClearColor([f32; 4]),
    ClearDepth(f64),
    ClearStencil(i32),
}

/// Raw device entry points the pipeline cache drives.
pub trait RenderDevice {
    /// Device limits, queried once.
    fn caps(&self) -> DeviceCaps;

    /// Reads back the device's current fixed-function state.
    fn fetch_state(&self) -> PipelineState;

    fn enable(&mut self, cap: Cap);
    fn disable(&mut self, cap: Cap);
    fn clip_control(&mut self, origin: u32, depth: u32);
    fn pixel_store_alignment(&mut self, pack: i32, unpack: i32);

    fn polygon_mode(&mut self, mode: u32);
    fn cull_face(&mut self, face: u32);
    fn front_face(&mut self, winding: u32);
    fn polygon_offset(&mut self, slope_factor: f32, constant_factor: f32);
    fn provoking_vertex(&mut self, mode: u32);
    fn point_size(&mut self, size: f32);
    fn line_width(&mut self, width: f32);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn depth_range(&mut self, min_depth: f64, max_depth: f64);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn depth_mask(&mut self, enabled: bool);
    fn depth_func(&mut self, op: u32);
    fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, pass: u32);
    fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32);
    fn stencil_mask_separate(&mut self, face: u32, mask: u32);

    fn logic_op(&mut self, op: u32);
    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32);
    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);
    fn blend_color(&mut self, constants: [f32; 4]);

    fn bind_framebuffer(&mut self, framebuffer: u32);
    fn use_program(&mut self, program: u32);
    fn bind_vertex_array(&mut self, array: u32);
    fn bind_vertex_buffer(&mut self, array: u32, binding: u32, buffer: u32, offset: usize, stride: usize);

    fn draw_arrays(
        &mut self,
        topology: u32,
        first_vertex: i32,
        vertex_count: i32,
        instance_count: i32,
        first_instance: u32,
    );
    fn draw_elements(
        &mut self,
        topology: u32,
        index_count: i32,
        index_offset: usize,
        instance_count: i32,
        first_instance: u32,
    );

    fn clear(&mut self, mask: u32);
    fn clear_color(&mut self, color: [f32; 4]);
    fn clear_depth(&mut self, depth: f64);
    fn clear_stencil(&mut self, stencil: i32);
}

/// In-memory [`RenderDevice`] that records every call issued to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    caps: DeviceCaps,
    state: PipelineState,
    calls: Vec<DeviceCall>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder whose [`fetch_state`](RenderDevice::fetch_state) reports the
    /// given state, simulating a device with prior mutations.
    pub fn with_state(state: PipelineState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn with_caps(caps: DeviceCaps) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    /// Calls recorded so far, in issue order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Drains and returns the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: DeviceCall) {
        self.calls.push(call);
    }
}

impl RenderDevice for RecordingDevice {
    fn caps(&self) -> DeviceCaps {
        self.caps
    }

    fn fetch_state(&self) -> PipelineState {
        self.state.clone()
    }

    fn enable(&mut self, cap: Cap) {
        self.record(DeviceCall::Enable(cap));
    }

    fn disable(&mut self, cap: Cap) {
        self.record(DeviceCall::Disable(cap));
    }

    fn clip_control(&mut self, origin: u32, depth: u32) {
        self.record(DeviceCall::ClipControl { origin, depth });
    }

    fn pixel_store_alignment(&mut self, pack: i32, unpack: i32) {
        self.record(DeviceCall::PixelStoreAlignment { pack, unpack });
    }

    fn polygon_mode(&mut self, mode: u32) {
        self.record(DeviceCall::PolygonMode(mode));
    }

    fn cull_face(&mut self, face: u32) {
        self.record(DeviceCall::CullFace(face));
    }

    fn front_face(&mut self, winding: u32) {
        self.record(DeviceCall::FrontFace(winding));
    }

    fn polygon_offset(&mut self, slope_factor: f32, constant_factor: f32) {
        self.record(DeviceCall::PolygonOffset {
            slope_factor,
            constant_factor,
        });
    }

    fn provoking_vertex(&mut self, mode: u32) {
        self.record(DeviceCall::ProvokingVertex(mode));
    }

    fn point_size(&mut self, size: f32) {
        self.record(DeviceCall::PointSize(size));
    }

    fn line_width(&mut self, width: f32) {
        self.record(DeviceCall::LineWidth(width));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(DeviceCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn depth_range(&mut self, min_depth: f64, max_depth: f64) {
        self.record(DeviceCall::DepthRange {
            min_depth,
            max_depth,
        });
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(DeviceCall::Scissor {
            x,
            y,
            width,
            height,
        });
    }

    fn depth_mask(&mut self, enabled: bool) {
        self.record(DeviceCall::DepthMask(enabled));
    }

    fn depth_func(&mut self, op: u32) {
        self.record(DeviceCall::DepthFunc(op));
    }

    fn stencil_op_separate(&mut self, face: u32, fail: u32, depth_fail: u32, pass: u32) {
        self.record(DeviceCall::StencilOpSeparate {
            face,
            fail,
            depth_fail,
            pass,
        });
    }

    fn stencil_func_separate(&mut self, face: u32, func: u32, reference: i32, mask: u32) {
        self.record(DeviceCall::StencilFuncSeparate {
            face,
            func,
            reference,
            mask,
        });
    }

    fn stencil_mask_separate(&mut self, face: u32, mask: u32) {
        self.record(DeviceCall::StencilMaskSeparate { face, mask });
    }

    fn logic_op(&mut self, op: u32) {
        self.record(DeviceCall::LogicOp(op));
    }

    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.record(DeviceCall::BlendFuncSeparate {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        });
    }

    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32) {
        self.record(DeviceCall::BlendEquationSeparate {
            mode_rgb,
            mode_alpha,
        });
    }

    fn color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.record(DeviceCall::ColorMask { r, g, b, a });
    }

    fn blend_color(&mut self, constants: [f32; 4]) {
        self.record(DeviceCall::BlendColor(constants));
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        self.record(DeviceCall::BindFramebuffer(framebuffer));
    }

    fn use_program(&mut self, program: u32) {
        self.record(DeviceCall::UseProgram(program));
    }

    fn bind_vertex_array(&mut self, array: u32) {
        self.record(DeviceCall::BindVertexArray(array));
    }

    fn bind_vertex_buffer(&mut self, array: u32, binding: u32, buffer: u32, offset: usize, stride: usize) {
        self.record(DeviceCall::BindVertexBuffer {
            array,
            binding,
            buffer,
            offset,
            stride,
        });
    }

    fn draw_arrays(
        &mut self,
        topology: u32,
        first_vertex: i32,
        vertex_count: i32,
        instance_count: i32,
        first_instance: u32,
    ) {
        self.record(DeviceCall::DrawArrays {
            topology,
            first_vertex,
            vertex_count,
            instance_count,
            first_instance,
        });
    }

    fn draw_elements(
        &mut self,
        topology: u32,
        index_count: i32,
        index_offset: usize,
        instance_count: i32,
        first_instance: u32,
    ) {
        self.record(DeviceCall::DrawElements {
            topology,
            index_count,
            index_offset,
            instance_count,
            first_instance,
        });
    }

    fn clear(&mut self, mask: u32) {
        self.record(DeviceCall::Clear(mask));
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.record(DeviceCall::ClearColor(color));
    }

    fn clear_depth(&mut self, depth: f64) {
        self.record(DeviceCall::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.record(DeviceCall::ClearStencil(stencil));
    }
}
