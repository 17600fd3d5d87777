//! State cache behavior over a recording device.

use groundworks::pipeline::device::{Cap, DeviceCall, RecordingDevice};
use groundworks::pipeline::state::{
    ClearValue, ColorBlendEquation, PipelineState, ScissorRect, Viewport,
};
use groundworks::pipeline::types::{
    BlendFactor, BlendOp, ClearFlags, ColorWrites, CompareOp, CullMode, FramebufferHandle,
    StencilFaces, StencilOp, VertexArrayHandle, VertexBufferHandle,
};
use groundworks::pipeline::Pipeline;
use groundworks::RenderError;

fn pipeline() -> Pipeline<RecordingDevice> {
    let mut pipeline = Pipeline::new(RecordingDevice::new());
    pipeline.device_mut().clear_calls();
    pipeline
}

fn pipeline_with_state(state: PipelineState) -> Pipeline<RecordingDevice> {
    let mut pipeline = Pipeline::new(RecordingDevice::with_state(state));
    pipeline.device_mut().clear_calls();
    pipeline
}

#[test]
fn redundant_sets_are_elided() {
    let mut pipeline = pipeline();

    pipeline.set_depth_test_enabled(true);
    pipeline.set_depth_test_enabled(true);
    assert_eq!(pipeline.device().calls(), &[DeviceCall::Enable(Cap::DepthTest)]);

    pipeline.device_mut().clear_calls();
    pipeline.set_line_width(2.5);
    pipeline.set_line_width(2.5);
    pipeline.set_blend_constants([0.5, 0.5, 0.5, 1.0]);
    pipeline.set_blend_constants([0.5, 0.5, 0.5, 1.0]);
    pipeline.set_color_write_mask(ColorWrites::R | ColorWrites::G);
    pipeline.set_color_write_mask(ColorWrites::R | ColorWrites::G);
    assert_eq!(pipeline.device().call_count(), 3);
}

#[test]
fn initial_state_is_fetched_not_assumed() {
    let mut seeded = PipelineState::default();
    seeded.depth_stencil.depth_test_enabled = true;
    seeded.rasterization.cull_mode = CullMode::Front;

    let mut pipeline = pipeline_with_state(seeded);

    // Setting the values the device already has must not touch it.
    pipeline.set_depth_test_enabled(true);
    pipeline.set_cull_mode(CullMode::Front);
    assert_eq!(pipeline.device().call_count(), 0);

    pipeline.set_depth_test_enabled(false);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::Disable(Cap::DepthTest)]
    );
}

#[test]
fn minimal_frame_issues_exactly_two_state_calls() {
    let mut seeded = PipelineState::default();
    seeded.rasterization.cull_mode = CullMode::Back;
    let mut pipeline = pipeline_with_state(seeded);

    pipeline.set_depth_test_enabled(true);
    pipeline.set_depth_test_enabled(true);
    pipeline.set_cull_mode(CullMode::Front);

    assert_eq!(
        pipeline.device().calls(),
        &[
            DeviceCall::Enable(Cap::DepthTest),
            DeviceCall::CullFace(0x0404),
        ]
    );
    assert!(pipeline.state().depth_stencil.depth_test_enabled);
    assert_eq!(pipeline.state().rasterization.cull_mode, CullMode::Front);
}

#[test]
fn cull_mode_none_only_toggles_the_capability() {
    let mut pipeline = pipeline();

    pipeline.set_cull_mode(CullMode::Back);
    pipeline.device_mut().clear_calls();

    pipeline.set_cull_mode(CullMode::None);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::Disable(Cap::CullFace)]
    );

    // Front while disabled re-enables and selects the face.
    pipeline.device_mut().clear_calls();
    pipeline.set_cull_mode(CullMode::Front);
    assert_eq!(
        pipeline.device().calls(),
        &[
            DeviceCall::Enable(Cap::CullFace),
            DeviceCall::CullFace(0x0404),
        ]
    );
}

#[test]
fn depth_bias_toggles_all_three_polygon_modes() {
    let mut pipeline = pipeline();
    pipeline.set_depth_bias_enabled(true);
    assert_eq!(
        pipeline.device().calls(),
        &[
            DeviceCall::Enable(Cap::PolygonOffsetFill),
            DeviceCall::Enable(Cap::PolygonOffsetLine),
            DeviceCall::Enable(Cap::PolygonOffsetPoint),
        ]
    );

    pipeline.device_mut().clear_calls();
    pipeline.set_depth_bias_factors(1.25, 0.5);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::PolygonOffset {
            slope_factor: 0.5,
            constant_factor: 1.25,
        }]
    );
}

#[test]
fn framebuffer_bind_is_diffed_and_none_is_default() {
    let mut pipeline = pipeline();
    let framebuffer = FramebufferHandle::new(4).unwrap();

    pipeline.bind_framebuffer(Some(framebuffer));
    pipeline.bind_framebuffer(Some(framebuffer));
    assert_eq!(pipeline.device().calls(), &[DeviceCall::BindFramebuffer(4)]);

    pipeline.device_mut().clear_calls();
    pipeline.bind_framebuffer(None);
    assert_eq!(pipeline.device().calls(), &[DeviceCall::BindFramebuffer(0)]);
}

#[test]
fn vertex_array_bind_is_never_elided() {
    let mut pipeline = pipeline();
    let array = VertexArrayHandle::new(9).unwrap();

    pipeline.bind_vertex_array(Some(array));
    pipeline.bind_vertex_array(Some(array));
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::BindVertexArray(9), DeviceCall::BindVertexArray(9)]
    );
}

#[test]
fn vertex_buffers_require_a_bound_array() {
    let mut pipeline = pipeline();
    let buffer = VertexBufferHandle::new(2).unwrap();

    let result = pipeline.bind_vertex_buffers(0, &[buffer], &[0], &[16]);
    assert!(matches!(result, Err(RenderError::InvalidState(_))));

    pipeline.bind_vertex_array(VertexArrayHandle::new(1));
    pipeline.device_mut().clear_calls();

    // Spans shorter than the buffer list are rejected.
    let result = pipeline.bind_vertex_buffers(0, &[buffer, buffer], &[0], &[16, 16]);
    assert!(matches!(result, Err(RenderError::OutOfRange(_))));
    let result = pipeline.bind_vertex_buffers(0, &[buffer, buffer], &[0, 0], &[16]);
    assert!(matches!(result, Err(RenderError::OutOfRange(_))));
    assert_eq!(pipeline.device().call_count(), 0);

    pipeline
        .bind_vertex_buffers(1, &[buffer], &[64], &[32])
        .unwrap();
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::BindVertexBuffer {
            array: 1,
            binding: 1,
            buffer: 2,
            offset: 64,
            stride: 32,
        }]
    );
    assert_eq!(
        pipeline.state().vertex_input.bindings[1].buffer,
        Some(buffer)
    );
}

#[test]
fn viewport_span_bounds_are_validated() {
    let mut pipeline = pipeline();
    let limit = pipeline.max_viewports();
    let viewports = vec![Viewport::default(); 2];

    let result = pipeline.set_viewport(limit - 1, &viewports);
    assert!(matches!(result, Err(RenderError::OutOfRange(_))));

    // Empty spans are a no-op, not an error.
    pipeline.set_viewport(limit, &[]).unwrap();
    assert_eq!(pipeline.device().call_count(), 0);
}

#[test]
fn viewport_diffs_only_the_first_element_but_caches_the_span() {
    let mut pipeline = pipeline();

    let a = Viewport {
        x: 0.0,
        y: 0.0,
        width: 800.0,
        height: 600.0,
        min_depth: 0.0,
        max_depth: 1.0,
    };
    let b = Viewport {
        x: 10.0,
        y: 10.0,
        width: 400.0,
        height: 300.0,
        min_depth: 0.1,
        max_depth: 0.9,
    };

    pipeline.set_viewport(0, &[a, b]).unwrap();
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::Viewport {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
        }]
    );
    assert_eq!(pipeline.state().viewport.viewports[1], b);

    // First element unchanged: no device call even though the second
    // element changes.
    pipeline.device_mut().clear_calls();
    pipeline.set_viewport(0, &[a, a]).unwrap();
    assert_eq!(pipeline.device().call_count(), 0);
    assert_eq!(pipeline.state().viewport.viewports[1], a);

    // Depth range change alone issues only the depth range call.
    let mut c = a;
    c.min_depth = 0.25;
    pipeline.set_viewport(0, &[c]).unwrap();
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::DepthRange {
            min_depth: 0.25,
            max_depth: 1.0,
        }]
    );
}

#[test]
fn scissor_span_follows_the_same_rules() {
    let mut pipeline = pipeline();
    let limit = pipeline.max_viewports();

    let rect = ScissorRect {
        x: 0,
        y: 0,
        width: 256,
        height: 256,
    };
    let result = pipeline.set_scissor(limit, &[rect]);
    assert!(matches!(result, Err(RenderError::OutOfRange(_))));

    pipeline.set_scissor(0, &[rect]).unwrap();
    pipeline.set_scissor(0, &[rect]).unwrap();
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::Scissor {
            x: 0,
            y: 0,
            width: 256,
            height: 256,
        }]
    );
}

#[test]
fn stencil_setters_update_both_faces_with_one_call_when_unified() {
    let mut pipeline = pipeline();

    pipeline.set_stencil_reference(StencilFaces::FRONT_AND_BACK, 7);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::StencilFuncSeparate {
            face: 0x0408,
            func: 0x0207,
            reference: 7,
            mask: u32::MAX,
        }]
    );
    assert_eq!(pipeline.state().depth_stencil.stencil_front.reference, 7);
    assert_eq!(pipeline.state().depth_stencil.stencil_back.reference, 7);

    // Redundant update touches nothing.
    pipeline.device_mut().clear_calls();
    pipeline.set_stencil_reference(StencilFaces::FRONT_AND_BACK, 7);
    assert_eq!(pipeline.device().call_count(), 0);
}

#[test]
fn stencil_reference_splits_when_cached_faces_disagree() {
    let mut pipeline = pipeline();

    // Give the faces different compare masks, then update both references.
    pipeline.set_stencil_compare_mask(StencilFaces::FRONT, 0xFF);
    pipeline.device_mut().clear_calls();

    pipeline.set_stencil_reference(StencilFaces::FRONT_AND_BACK, 3);
    assert_eq!(
        pipeline.device().calls(),
        &[
            DeviceCall::StencilFuncSeparate {
                face: 0x0404,
                func: 0x0207,
                reference: 3,
                mask: 0xFF,
            },
            DeviceCall::StencilFuncSeparate {
                face: 0x0405,
                func: 0x0207,
                reference: 3,
                mask: u32::MAX,
            },
        ]
    );
}

#[test]
fn stencil_single_face_updates_leave_the_other_face_cached() {
    let mut pipeline = pipeline();

    pipeline.set_stencil_compare_mask(StencilFaces::BACK, 0x0F);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::StencilFuncSeparate {
            face: 0x0405,
            func: 0x0207,
            reference: 0,
            mask: 0x0F,
        }]
    );
    assert_eq!(
        pipeline.state().depth_stencil.stencil_front.compare_mask,
        u32::MAX
    );
    assert_eq!(pipeline.state().depth_stencil.stencil_back.compare_mask, 0x0F);
}

#[test]
fn stencil_op_issues_ops_and_compare_independently() {
    let mut pipeline = pipeline();

    // Ops change, compare predicate stays at its cached value.
    pipeline.set_stencil_op(
        StencilFaces::FRONT_AND_BACK,
        StencilOp::Keep,
        StencilOp::Replace,
        StencilOp::Keep,
        CompareOp::Always,
    );
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::StencilOpSeparate {
            face: 0x0408,
            fail: 0x1E00,
            depth_fail: 0x1E00,
            pass: 0x1E01,
        }]
    );

    // Compare predicate change alone re-issues the func call with cached
    // reference and mask.
    pipeline.device_mut().clear_calls();
    pipeline.set_stencil_op(
        StencilFaces::FRONT_AND_BACK,
        StencilOp::Keep,
        StencilOp::Replace,
        StencilOp::Keep,
        CompareOp::Equal,
    );
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::StencilFuncSeparate {
            face: 0x0408,
            func: 0x0202,
            reference: 0,
            mask: u32::MAX,
        }]
    );
}

#[test]
fn stencil_write_mask_is_a_single_call() {
    let mut pipeline = pipeline();

    pipeline.set_stencil_write_mask(StencilFaces::FRONT_AND_BACK, 0xF0);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::StencilMaskSeparate {
            face: 0x0408,
            mask: 0xF0,
        }]
    );

    pipeline.device_mut().clear_calls();
    pipeline.set_stencil_write_mask(StencilFaces::FRONT_AND_BACK, 0xF0);
    assert_eq!(pipeline.device().call_count(), 0);
}

#[test]
fn blend_equation_diffs_factors_and_ops_separately() {
    let mut pipeline = pipeline();

    let equation = ColorBlendEquation {
        src_color_blend_factor: BlendFactor::SrcAlpha,
        dst_color_blend_factor: BlendFactor::OneMinusSrcAlpha,
        color_blend_op: BlendOp::Add,
        src_alpha_blend_factor: BlendFactor::One,
        dst_alpha_blend_factor: BlendFactor::Zero,
        alpha_blend_op: BlendOp::Add,
    };

    // Ops match the cached defaults, so only the factor call goes out.
    pipeline.set_color_blend_equation(&equation);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::BlendFuncSeparate {
            src_rgb: 0x0302,
            dst_rgb: 0x0303,
            src_alpha: 0x0001,
            dst_alpha: 0x0000,
        }]
    );

    // Now only the ops change.
    pipeline.device_mut().clear_calls();
    let equation = ColorBlendEquation {
        color_blend_op: BlendOp::ReverseSubtract,
        alpha_blend_op: BlendOp::Max,
        ..equation
    };
    pipeline.set_color_blend_equation(&equation);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::BlendEquationSeparate {
            mode_rgb: 0x800B,
            mode_alpha: 0x8008,
        }]
    );
}

#[test]
fn clear_diffs_values_but_always_clears() {
    let mut pipeline = pipeline();

    let value = ClearValue {
        color: [0.2, 0.3, 0.4, 1.0],
        depth: 0.0,
        stencil: 1,
    };

    pipeline.clear_attachments(ClearFlags::COLOR | ClearFlags::DEPTH, &value);
    assert_eq!(
        pipeline.device().calls(),
        &[
            DeviceCall::ClearColor([0.2, 0.3, 0.4, 1.0]),
            DeviceCall::ClearDepth(0.0),
            DeviceCall::Clear(0x4000 | 0x0100),
        ]
    );

    // Same values again: only the clear itself.
    pipeline.device_mut().clear_calls();
    pipeline.clear_attachments(ClearFlags::COLOR | ClearFlags::DEPTH, &value);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::Clear(0x4000 | 0x0100)]
    );

    // Empty mask still issues a clear with no bits set.
    pipeline.device_mut().clear_calls();
    pipeline.clear_attachments(ClearFlags::empty(), &value);
    assert_eq!(pipeline.device().calls(), &[DeviceCall::Clear(0)]);

    // Stencil-only clear touches neither color nor depth values.
    pipeline.device_mut().clear_calls();
    pipeline.clear_attachments(ClearFlags::STENCIL, &value);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::ClearStencil(1), DeviceCall::Clear(0x0400)]
    );
}

#[test]
fn draw_indexed_offsets_by_index_size() {
    let mut pipeline = pipeline();
    pipeline.draw_indexed(36, 2, 6, 0, 1);
    assert_eq!(
        pipeline.device().calls(),
        &[DeviceCall::DrawElements {
            topology: 0x0004,
            index_count: 36,
            index_offset: 6 * 4,
            instance_count: 2,
            first_instance: 1,
        }]
    );
}
