//! Retained-state cache over an immediate-mode rendering device.
//!
//! [`Pipeline`] mirrors the device's fixed-function state and elides every
//! redundant state change before it reaches the device. The cache is seeded
//! from the live device at construction, so a pipeline can be layered over a
//! context that already has state mutations applied.
//!
//! Setters are infallible unless they validate a span against a device limit
//! or require a prior binding, in which case they return [`RenderResult`].

pub mod debug;
pub mod device;
pub mod state;
pub mod types;

use crate::error::{RenderError, RenderResult};
use crate::pipeline::debug::DebugMessage;
use crate::pipeline::device::{Cap, DeviceCaps, RenderDevice};
use crate::pipeline::state::{
    ClearValue, ColorBlendEquation, PipelineState, ScissorRect, Viewport,
};
use crate::pipeline::types::{
    ClearFlags, ColorWrites, CompareOp, CullMode, FillMode, FramebufferHandle, FrontFace, LogicOp,
    PrimitiveTopology, ProvokingVertexMode, ShaderProgramHandle, StencilFaces, StencilOp,
    VertexArrayHandle, VertexBufferHandle, CLIP_DEPTH_ZERO_TO_ONE, CLIP_ORIGIN_LOWER_LEFT,
    COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT, STENCIL_BUFFER_BIT,
};

pub use debug::{classify, DebugKind, DebugSeverity, DebugSource};
pub use device::{DeviceCall, RecordingDevice};
pub use state::StencilFaceState;

/// Diff-before-write state cache over a rendering device.
pub struct Pipeline<D: RenderDevice> {
    device: D,
    caps: DeviceCaps,
    default_framebuffer_dimensions: [u32; 2],
    state: PipelineState,
    bound_framebuffer: Option<FramebufferHandle>,
    bound_shader_program: Option<ShaderProgramHandle>,
    bound_vertex_array: Option<VertexArrayHandle>,
}

impl<D: RenderDevice> Pipeline<D> {
    /// Wraps a device, forces the invariants the cache relies on, and seeds
    /// the cache from the device's actual state.
    ///
    /// The forced invariants are seamless cubemap filtering, lower-left
    /// zero-to-one clip conventions, multisampling off, and byte-tight pixel
    /// pack alignment. Everything else is fetched, not assumed.
    pub fn new(mut device: D) -> Self {
        let caps = device.caps();

        device.enable(Cap::SeamlessCubemap);
        device.clip_control(CLIP_ORIGIN_LOWER_LEFT, CLIP_DEPTH_ZERO_TO_ONE);
        device.disable(Cap::Multisample);
        device.pixel_store_alignment(1, 1);

        let mut state = device.fetch_state();
        state
            .viewport
            .viewports
            .resize(caps.max_viewports as usize, Viewport::default());
        state
            .viewport
            .scissors
            .resize(caps.max_viewports as usize, ScissorRect::default());

        log::debug!(
            "pipeline initialized: {} viewports, {}x{} default framebuffer",
            caps.max_viewports,
            caps.default_framebuffer_dimensions[0],
            caps.default_framebuffer_dimensions[1],
        );

        Self {
            device,
            caps,
            default_framebuffer_dimensions: caps.default_framebuffer_dimensions,
            state,
            bound_framebuffer: None,
            bound_shader_program: None,
            bound_vertex_array: None,
        }
    }

    /// Cached state mirror.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn max_viewports(&self) -> u32 {
        self.caps.max_viewports
    }

    pub fn max_sampler_anisotropy(&self) -> f32 {
        self.caps.max_sampler_anisotropy
    }

    pub fn default_framebuffer_dimensions(&self) -> [u32; 2] {
        self.default_framebuffer_dimensions
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.bound_framebuffer
    }

    pub fn bound_shader_program(&self) -> Option<ShaderProgramHandle> {
        self.bound_shader_program
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.bound_vertex_array
    }

    /// Records new default framebuffer dimensions after a window resize.
    /// Cache bookkeeping only, no device call.
    pub fn notify_default_framebuffer_resized(&mut self, width: u32, height: u32) {
        self.default_framebuffer_dimensions = [width, height];
    }

    /// Routes a device diagnostic through [`debug::classify`].
    pub fn report_debug_message(&self, message: &DebugMessage) -> RenderResult<()> {
        debug::classify(message)
    }

    /// Binds a framebuffer, or the default framebuffer for `None`.
    pub fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        if self.bound_framebuffer != framebuffer {
            self.device
                .bind_framebuffer(framebuffer.map_or(0, FramebufferHandle::get));
            self.bound_framebuffer = framebuffer;
        }
    }

    /// Binds a shader program, or unbinds for `None`.
    pub fn bind_shader_program(&mut self, shader_program: Option<ShaderProgramHandle>) {
        if self.bound_shader_program != shader_program {
            self.device
                .use_program(shader_program.map_or(0, ShaderProgramHandle::get));
            self.bound_shader_program = shader_program;
        }
    }

    /// Binds a vertex array, or unbinds for `None`.
    ///
    /// The bind is issued even when the array is already bound. Skipping the
    /// redundant bind causes missed attribute updates on some drivers.
    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.device
            .bind_vertex_array(vertex_array.map_or(0, VertexArrayHandle::get));
        self.bound_vertex_array = vertex_array;
    }

    /// Attaches vertex buffers to binding slots of the bound vertex array,
    /// starting at `first_binding`.
    ///
    /// Buffer binds are never elided; the binding table belongs to the vertex
    /// array object, not the context, so the cache cannot vouch for it.
    pub fn bind_vertex_buffers(
        &mut self,
        first_binding: u32,
        buffers: &[VertexBufferHandle],
        offsets: &[usize],
        strides: &[usize],
    ) -> RenderResult<()> {
        let vertex_array = self
            .bound_vertex_array
            .ok_or_else(|| RenderError::invalid_state("no vertex array bound"))?;

        if offsets.len() < buffers.len() {
            return Err(RenderError::out_of_range(format!(
                "vertex buffer offset span ({}) shorter than buffer span ({})",
                offsets.len(),
                buffers.len()
            )));
        }
        if strides.len() < buffers.len() {
            return Err(RenderError::out_of_range(format!(
                "vertex buffer stride span ({}) shorter than buffer span ({})",
                strides.len(),
                buffers.len()
            )));
        }

        for (i, buffer) in buffers.iter().enumerate() {
            self.device.bind_vertex_buffer(
                vertex_array.get(),
                first_binding + i as u32,
                buffer.get(),
                offsets[i],
                strides[i],
            );
        }
        self.state
            .vertex_input
            .record(first_binding as usize, buffers, offsets, strides);
        Ok(())
    }

    /// Selects the topology used by subsequent draws. The device has no
    /// corresponding state; the topology is passed with each draw call.
    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.state.input_assembly.topology = topology;
    }

    pub fn set_primitive_restart_enabled(&mut self, enabled: bool) {
        if self.state.input_assembly.primitive_restart_enabled != enabled {
            self.state.input_assembly.primitive_restart_enabled = enabled;
            if enabled {
                self.device.enable(Cap::PrimitiveRestartFixedIndex);
            } else {
                self.device.disable(Cap::PrimitiveRestartFixedIndex);
            }
        }
    }

    /// Sets a span of viewports starting at `first_viewport`.
    ///
    /// Only the first viewport of the span is diffed against the cache; the
    /// device call targets viewport index zero. The full span is still copied
    /// into the cache. An empty span is a no-op.
    pub fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]) -> RenderResult<()> {
        let first = first_viewport as usize;
        let end = first + viewports.len();
        if end > self.state.viewport.viewports.len() {
            return Err(RenderError::out_of_range(format!(
                "viewport span {}..{} exceeds device limit {}",
                first,
                end,
                self.state.viewport.viewports.len()
            )));
        }

        let Some(front) = viewports.first() else {
            return Ok(());
        };

        let cached = self.state.viewport.viewports[first];
        if cached.x != front.x
            || cached.y != front.y
            || cached.width != front.width
            || cached.height != front.height
        {
            self.device.viewport(
                front.x as i32,
                front.y as i32,
                (front.width as i32).max(0),
                (front.height as i32).max(0),
            );
        }
        if cached.min_depth != front.min_depth || cached.max_depth != front.max_depth {
            self.device
                .depth_range(front.min_depth as f64, front.max_depth as f64);
        }

        self.state.viewport.viewports[first..end].copy_from_slice(viewports);
        Ok(())
    }

    /// Sets a span of scissor rectangles starting at `first_scissor`.
    ///
    /// Mirrors [`set_viewport`](Self::set_viewport): first element diffed,
    /// full span cached, empty span is a no-op.
    pub fn set_scissor(&mut self, first_scissor: u32, scissors: &[ScissorRect]) -> RenderResult<()> {
        let first = first_scissor as usize;
        let end = first + scissors.len();
        if end > self.state.viewport.scissors.len() {
            return Err(RenderError::out_of_range(format!(
                "scissor span {}..{} exceeds device limit {}",
                first,
                end,
                self.state.viewport.scissors.len()
            )));
        }

        let Some(front) = scissors.first() else {
            return Ok(());
        };

        let cached = self.state.viewport.scissors[first];
        if cached != *front {
            self.device.scissor(
                front.x,
                front.y,
                front.width.min(i32::MAX as u32) as i32,
                front.height.min(i32::MAX as u32) as i32,
            );
        }

        self.state.viewport.scissors[first..end].copy_from_slice(scissors);
        Ok(())
    }

    pub fn set_rasterizer_discard_enabled(&mut self, enabled: bool) {
        if self.state.rasterization.rasterizer_discard_enabled != enabled {
            self.state.rasterization.rasterizer_discard_enabled = enabled;
            if enabled {
                self.device.enable(Cap::RasterizerDiscard);
            } else {
                self.device.disable(Cap::RasterizerDiscard);
            }
        }
    }

    pub fn set_fill_mode(&mut self, fill_mode: FillMode) {
        if self.state.rasterization.fill_mode != fill_mode {
            self.state.rasterization.fill_mode = fill_mode;
            self.device.polygon_mode(fill_mode.token());
        }
    }

    /// Sets face culling. The cull-face capability toggles along with the
    /// mode; the face selector is only updated for non-`None` modes.
    pub fn set_cull_mode(&mut self, cull_mode: CullMode) {
        if self.state.rasterization.cull_mode != cull_mode {
            if cull_mode == CullMode::None {
                self.device.disable(Cap::CullFace);
            } else {
                if self.state.rasterization.cull_mode == CullMode::None {
                    self.device.enable(Cap::CullFace);
                }
                self.device.cull_face(cull_mode.token());
            }
            self.state.rasterization.cull_mode = cull_mode;
        }
    }

    pub fn set_front_face(&mut self, front_face: FrontFace) {
        if self.state.rasterization.front_face != front_face {
            self.state.rasterization.front_face = front_face;
            self.device.front_face(front_face.token());
        }
    }

    /// Toggles depth bias for all three polygon rasterization modes at once.
    pub fn set_depth_bias_enabled(&mut self, enabled: bool) {
        if self.state.rasterization.depth_bias_enabled != enabled {
            self.state.rasterization.depth_bias_enabled = enabled;
            if enabled {
                self.device.enable(Cap::PolygonOffsetFill);
                self.device.enable(Cap::PolygonOffsetLine);
                self.device.enable(Cap::PolygonOffsetPoint);
            } else {
                self.device.disable(Cap::PolygonOffsetFill);
                self.device.disable(Cap::PolygonOffsetLine);
                self.device.disable(Cap::PolygonOffsetPoint);
            }
        }
    }

    pub fn set_depth_bias_factors(&mut self, constant_factor: f32, slope_factor: f32) {
        if self.state.rasterization.depth_bias_constant_factor != constant_factor
            || self.state.rasterization.depth_bias_slope_factor != slope_factor
        {
            self.state.rasterization.depth_bias_constant_factor = constant_factor;
            self.state.rasterization.depth_bias_slope_factor = slope_factor;
            self.device.polygon_offset(slope_factor, constant_factor);
        }
    }

    pub fn set_depth_clamp_enabled(&mut self, enabled: bool) {
        if self.state.rasterization.depth_clamp_enabled != enabled {
            self.state.rasterization.depth_clamp_enabled = enabled;
            if enabled {
                self.device.enable(Cap::DepthClamp);
            } else {
                self.device.disable(Cap::DepthClamp);
            }
        }
    }

    pub fn set_scissor_test_enabled(&mut self, enabled: bool) {
        if self.state.rasterization.scissor_test_enabled != enabled {
            self.state.rasterization.scissor_test_enabled = enabled;
            if enabled {
                self.device.enable(Cap::ScissorTest);
            } else {
                self.device.disable(Cap::ScissorTest);
            }
        }
    }

    pub fn set_provoking_vertex_mode(&mut self, mode: ProvokingVertexMode) {
        if self.state.rasterization.provoking_vertex_mode != mode {
            self.state.rasterization.provoking_vertex_mode = mode;
            self.device.provoking_vertex(mode.token());
        }
    }

    pub fn set_point_size(&mut self, point_size: f32) {
        if self.state.rasterization.point_size != point_size {
            self.state.rasterization.point_size = point_size;
            self.device.point_size(point_size);
        }
    }

    pub fn set_line_width(&mut self, line_width: f32) {
        if self.state.rasterization.line_width != line_width {
            self.state.rasterization.line_width = line_width;
            self.device.line_width(line_width);
        }
    }

    pub fn set_depth_test_enabled(&mut self, enabled: bool) {
        if self.state.depth_stencil.depth_test_enabled != enabled {
            self.state.depth_stencil.depth_test_enabled = enabled;
            if enabled {
                self.device.enable(Cap::DepthTest);
            } else {
                self.device.disable(Cap::DepthTest);
            }
        }
    }

    pub fn set_depth_write_enabled(&mut self, enabled: bool) {
        if self.state.depth_stencil.depth_write_enabled != enabled {
            self.state.depth_stencil.depth_write_enabled = enabled;
            self.device.depth_mask(enabled);
        }
    }

    pub fn set_depth_compare_op(&mut self, compare_op: CompareOp) {
        if self.state.depth_stencil.depth_compare_op != compare_op {
            self.state.depth_stencil.depth_compare_op = compare_op;
            self.device.depth_func(compare_op.token());
        }
    }

    pub fn set_stencil_test_enabled(&mut self, enabled: bool) {
        if self.state.depth_stencil.stencil_test_enabled != enabled {
            self.state.depth_stencil.stencil_test_enabled = enabled;
            if enabled {
                self.device.enable(Cap::StencilTest);
            } else {
                self.device.disable(Cap::StencilTest);
            }
        }
    }

    /// Sets the stencil actions and compare predicate for the faces in
    /// `faces`.
    ///
    /// The device splits this state across two entry points: one for the
    /// three actions and one for the compare predicate, which travels with
    /// the reference and compare mask. When both faces update but their
    /// cached reference or compare mask differ, the predicate is re-issued
    /// per face so the untouched parameters keep their face-specific values.
    pub fn set_stencil_op(
        &mut self,
        faces: StencilFaces,
        fail_op: StencilOp,
        pass_op: StencilOp,
        depth_fail_op: StencilOp,
        compare_op: CompareOp,
    ) {
        let mut op_updated = false;
        let mut compare_updated = false;

        if faces.contains(StencilFaces::FRONT) {
            let front = &mut self.state.depth_stencil.stencil_front;
            if front.fail_op != fail_op
                || front.pass_op != pass_op
                || front.depth_fail_op != depth_fail_op
            {
                front.fail_op = fail_op;
                front.pass_op = pass_op;
                front.depth_fail_op = depth_fail_op;
                op_updated = true;
            }
            if front.compare_op != compare_op {
                front.compare_op = compare_op;
                compare_updated = true;
            }
        }

        if faces.contains(StencilFaces::BACK) {
            let back = &mut self.state.depth_stencil.stencil_back;
            if back.fail_op != fail_op
                || back.pass_op != pass_op
                || back.depth_fail_op != depth_fail_op
            {
                back.fail_op = fail_op;
                back.pass_op = pass_op;
                back.depth_fail_op = depth_fail_op;
                op_updated = true;
            }
            if back.compare_op != compare_op {
                back.compare_op = compare_op;
                compare_updated = true;
            }
        }

        if !op_updated && !compare_updated {
            return;
        }

        let face = faces.token();

        if op_updated {
            self.device.stencil_op_separate(
                face,
                fail_op.token(),
                depth_fail_op.token(),
                pass_op.token(),
            );
        }

        if compare_updated {
            let front = self.state.depth_stencil.stencil_front;
            let back = self.state.depth_stencil.stencil_back;
            let op = compare_op.token();

            if faces == StencilFaces::FRONT_AND_BACK {
                if front.reference == back.reference && front.compare_mask == back.compare_mask {
                    self.device.stencil_func_separate(
                        face,
                        op,
                        front.reference as i32,
                        front.compare_mask,
                    );
                } else {
                    self.device.stencil_func_separate(
                        StencilFaces::FRONT.token(),
                        op,
                        front.reference as i32,
                        front.compare_mask,
                    );
                    self.device.stencil_func_separate(
                        StencilFaces::BACK.token(),
                        op,
                        back.reference as i32,
                        back.compare_mask,
                    );
                }
            } else if faces == StencilFaces::FRONT {
                self.device
                    .stencil_func_separate(face, op, front.reference as i32, front.compare_mask);
            } else {
                self.device
                    .stencil_func_separate(face, op, back.reference as i32, back.compare_mask);
            }
        }
    }

    /// Sets the stencil compare mask for the faces in `faces`.
    ///
    /// The mask shares a device entry point with the compare predicate and
    /// reference, so those are re-sent from the cache. A unified
    /// front-and-back call is only possible when the cached predicate and
    /// reference agree across faces.
    pub fn set_stencil_compare_mask(&mut self, faces: StencilFaces, compare_mask: u32) {
        let mut updated = false;

        if faces.contains(StencilFaces::FRONT)
            && self.state.depth_stencil.stencil_front.compare_mask != compare_mask
        {
            self.state.depth_stencil.stencil_front.compare_mask = compare_mask;
            updated = true;
        }
        if faces.contains(StencilFaces::BACK)
            && self.state.depth_stencil.stencil_back.compare_mask != compare_mask
        {
            self.state.depth_stencil.stencil_back.compare_mask = compare_mask;
            updated = true;
        }

        if !updated {
            return;
        }

        let face = faces.token();
        let front = self.state.depth_stencil.stencil_front;
        let back = self.state.depth_stencil.stencil_back;

        if faces == StencilFaces::FRONT_AND_BACK {
            if front.reference == back.reference && front.compare_op == back.compare_op {
                self.device.stencil_func_separate(
                    face,
                    front.compare_op.token(),
                    front.reference as i32,
                    compare_mask,
                );
            } else {
                self.device.stencil_func_separate(
                    StencilFaces::FRONT.token(),
                    front.compare_op.token(),
                    front.reference as i32,
                    compare_mask,
                );
                self.device.stencil_func_separate(
                    StencilFaces::BACK.token(),
                    back.compare_op.token(),
                    back.reference as i32,
                    compare_mask,
                );
            }
        } else if faces == StencilFaces::FRONT {
            self.device.stencil_func_separate(
                face,
                front.compare_op.token(),
                front.reference as i32,
                compare_mask,
            );
        } else {
            self.device.stencil_func_separate(
                face,
                back.compare_op.token(),
                back.reference as i32,
                compare_mask,
            );
        }
    }

    /// Sets the stencil reference value for the faces in `faces`. Same
    /// unification rule as [`set_stencil_compare_mask`](Self::set_stencil_compare_mask).
    pub fn set_stencil_reference(&mut self, faces: StencilFaces, reference: u32) {
        let mut updated = false;

        if faces.contains(StencilFaces::FRONT)
            && self.state.depth_stencil.stencil_front.reference != reference
        {
            self.state.depth_stencil.stencil_front.reference = reference;
            updated = true;
        }
        if faces.contains(StencilFaces::BACK)
            && self.state.depth_stencil.stencil_back.reference != reference
        {
            self.state.depth_stencil.stencil_back.reference = reference;
            updated = true;
        }

        if !updated {
            return;
        }

        let face = faces.token();
        let front = self.state.depth_stencil.stencil_front;
        let back = self.state.depth_stencil.stencil_back;

        if faces == StencilFaces::FRONT_AND_BACK {
            if front.compare_mask == back.compare_mask && front.compare_op == back.compare_op {
                self.device.stencil_func_separate(
                    face,
                    front.compare_op.token(),
                    reference as i32,
                    front.compare_mask,
                );
            } else {
                self.device.stencil_func_separate(
                    StencilFaces::FRONT.token(),
                    front.compare_op.token(),
                    reference as i32,
                    front.compare_mask,
                );
                self.device.stencil_func_separate(
                    StencilFaces::BACK.token(),
                    back.compare_op.token(),
                    reference as i32,
                    back.compare_mask,
                );
            }
        } else if faces == StencilFaces::FRONT {
            self.device.stencil_func_separate(
                face,
                front.compare_op.token(),
                reference as i32,
                front.compare_mask,
            );
        } else {
            self.device.stencil_func_separate(
                face,
                back.compare_op.token(),
                reference as i32,
                back.compare_mask,
            );
        }
    }

    /// Sets the stencil write mask for the faces in `faces`. The write mask
    /// has a dedicated device entry point, so one call always suffices.
    pub fn set_stencil_write_mask(&mut self, faces: StencilFaces, write_mask: u32) {
        let mut updated = false;

        if faces.contains(StencilFaces::FRONT)
            && self.state.depth_stencil.stencil_front.write_mask != write_mask
        {
            self.state.depth_stencil.stencil_front.write_mask = write_mask;
            updated = true;
        }
        if faces.contains(StencilFaces::BACK)
            && self.state.depth_stencil.stencil_back.write_mask != write_mask
        {
            self.state.depth_stencil.stencil_back.write_mask = write_mask;
            updated = true;
        }

        if updated {
            self.device.stencil_mask_separate(faces.token(), write_mask);
        }
    }

    pub fn set_logic_op_enabled(&mut self, enabled: bool) {
        if self.state.color_blend.logic_op_enabled != enabled {
            self.state.color_blend.logic_op_enabled = enabled;
            if enabled {
                self.device.enable(Cap::ColorLogicOp);
            } else {
                self.device.disable(Cap::ColorLogicOp);
            }
        }
    }

    pub fn set_logic_op(&mut self, logic_op: LogicOp) {
        if self.state.color_blend.logic_op != logic_op {
            self.state.color_blend.logic_op = logic_op;
            self.device.logic_op(logic_op.token());
        }
    }

    pub fn set_color_blend_enabled(&mut self, enabled: bool) {
        if self.state.color_blend.blend_enabled != enabled {
            self.state.color_blend.blend_enabled = enabled;
            if enabled {
                self.device.enable(Cap::Blend);
            } else {
                self.device.disable(Cap::Blend);
            }
        }
    }

    /// Sets the blend equation. Factors and operations are diffed and issued
    /// independently; a change to one does not re-send the other.
    pub fn set_color_blend_equation(&mut self, equation: &ColorBlendEquation) {
        let cached = &mut self.state.color_blend.color_blend_equation;

        if cached.src_color_blend_factor != equation.src_color_blend_factor
            || cached.dst_color_blend_factor != equation.dst_color_blend_factor
            || cached.src_alpha_blend_factor != equation.src_alpha_blend_factor
            || cached.dst_alpha_blend_factor != equation.dst_alpha_blend_factor
        {
            cached.src_color_blend_factor = equation.src_color_blend_factor;
            cached.dst_color_blend_factor = equation.dst_color_blend_factor;
            cached.src_alpha_blend_factor = equation.src_alpha_blend_factor;
            cached.dst_alpha_blend_factor = equation.dst_alpha_blend_factor;

            self.device.blend_func_separate(
                equation.src_color_blend_factor.token(),
                equation.dst_color_blend_factor.token(),
                equation.src_alpha_blend_factor.token(),
                equation.dst_alpha_blend_factor.token(),
            );
        }

        let cached = &mut self.state.color_blend.color_blend_equation;
        if cached.color_blend_op != equation.color_blend_op
            || cached.alpha_blend_op != equation.alpha_blend_op
        {
            cached.color_blend_op = equation.color_blend_op;
            cached.alpha_blend_op = equation.alpha_blend_op;

            self.device.blend_equation_separate(
                equation.color_blend_op.token(),
                equation.alpha_blend_op.token(),
            );
        }
    }

    pub fn set_color_write_mask(&mut self, mask: ColorWrites) {
        if self.state.color_blend.color_write_mask != mask {
            self.state.color_blend.color_write_mask = mask;
            self.device.color_mask(
                mask.contains(ColorWrites::R),
                mask.contains(ColorWrites::G),
                mask.contains(ColorWrites::B),
                mask.contains(ColorWrites::A),
            );
        }
    }

    pub fn set_blend_constants(&mut self, blend_constants: [f32; 4]) {
        if self.state.color_blend.blend_constants != blend_constants {
            self.state.color_blend.blend_constants = blend_constants;
            self.device.blend_color(blend_constants);
        }
    }

    /// Issues a non-indexed instanced draw using the cached topology.
    pub fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        self.device.draw_arrays(
            self.state.input_assembly.topology.token(),
            first_vertex as i32,
            vertex_count as i32,
            instance_count as i32,
            first_instance,
        );
    }

    /// Issues an indexed instanced draw using the cached topology. Indices
    /// are 32-bit; `vertex_offset` is accepted for call-site symmetry but not
    /// yet supported.
    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        _vertex_offset: i32,
        first_instance: u32,
    ) {
        self.device.draw_elements(
            self.state.input_assembly.topology.token(),
            index_count as i32,
            first_index as usize * std::mem::size_of::<u32>(),
            instance_count as i32,
            first_instance,
        );
    }

    /// Clears the selected attachments of the bound framebuffer.
    ///
    /// Clear values are diffed per component; the clear itself is issued
    /// unconditionally, including for an empty mask.
    pub fn clear_attachments(&mut self, mask: ClearFlags, value: &ClearValue) {
        let mut clear_mask = 0u32;

        if mask.contains(ClearFlags::COLOR) {
            clear_mask |= COLOR_BUFFER_BIT;
            if self.state.clear_value.color != value.color {
                self.device.clear_color(value.color);
                self.state.clear_value.color = value.color;
            }
        }

        if mask.contains(ClearFlags::DEPTH) {
            clear_mask |= DEPTH_BUFFER_BIT;
            if self.state.clear_value.depth != value.depth {
                self.device.clear_depth(value.depth as f64);
                self.state.clear_value.depth = value.depth;
            }
        }

        if mask.contains(ClearFlags::STENCIL) {
            clear_mask |= STENCIL_BUFFER_BIT;
            if self.state.clear_value.stencil != value.stencil {
                self.device.clear_stencil(value.stencil as i32);
                self.state.clear_value.stencil = value.stencil;
            }
        }

        self.device.clear(clear_mask);
    }
}
