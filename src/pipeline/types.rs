//! Pipeline state enumerations, resource handles, and device token tables.
//!
//! Every enum here is deliberately `#[repr(u32)]` with stable ordinals so the
//! positional lookup tables below can translate it to the device's native
//! token with a single index. The table orders must match the enum orders.

use std::num::NonZeroU32;

use bitflags::bitflags;

/// How vertex streams are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PrimitiveTopology {
    PointList = 0,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleFan,
    LineListWithAdjacency,
    LineStripWithAdjacency,
    TriangleListWithAdjacency,
    TriangleStripWithAdjacency,
    PatchList,
}

/// Polygon rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FillMode {
    Fill = 0,
    Line,
    Point,
}

/// Which polygon faces are discarded by culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CullMode {
    None = 0,
    Front,
    Back,
    FrontAndBack,
}

/// Winding order that identifies a front-facing polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FrontFace {
    CounterClockwise = 0,
    Clockwise,
}

/// Comparison predicate for depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CompareOp {
    Never = 0,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Action applied to a stencil value when a test passes or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StencilOp {
    Keep = 0,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

/// Bitwise operation applied between fragment and framebuffer color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LogicOp {
    Clear = 0,
    And,
    AndReverse,
    Copy,
    AndInverted,
    NoOp,
    Xor,
    Or,
    Nor,
    Equivalent,
    Invert,
    OrReverse,
    CopyInverted,
    OrInverted,
    Nand,
    Set,
}

/// Source/destination weighting factor for color blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendFactor {
    Zero = 0,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
    Src1Color,
    OneMinusSrc1Color,
    Src1Alpha,
    OneMinusSrc1Alpha,
}

/// Arithmetic combining weighted source and destination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendOp {
    Add = 0,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Which vertex of a primitive carries flat-interpolated outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ProvokingVertexMode {
    First = 0,
    Last,
}

bitflags! {
    /// Framebuffer aspects selected by a clear operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

bitflags! {
    /// Stencil faces targeted by a dual-face stencil setter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StencilFaces: u8 {
        const FRONT = 1 << 0;
        const BACK = 1 << 1;
        const FRONT_AND_BACK = Self::FRONT.bits() | Self::BACK.bits();
    }
}

bitflags! {
    /// Per-channel color write enables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWrites: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

macro_rules! resource_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw device name. Zero is the unbound sentinel and is
            /// rejected.
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// Raw device name.
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

resource_handle!(
    /// Handle to a device framebuffer object.
    FramebufferHandle
);
resource_handle!(
    /// Handle to a linked shader program.
    ShaderProgramHandle
);
resource_handle!(
    /// Handle to a vertex array object.
    VertexArrayHandle
);
resource_handle!(
    /// Handle to a vertex buffer object.
    VertexBufferHandle
);

// Device token tables, indexed by enum ordinal.

pub const PRIMITIVE_TOPOLOGY_TOKENS: [u32; 11] = [
    0x0000, // points
    0x0001, // lines
    0x0003, // line strip
    0x0004, // triangles
    0x0005, // triangle strip
    0x0006, // triangle fan
    0x000A, // lines with adjacency
    0x000B, // line strip with adjacency
    0x000C, // triangles with adjacency
    0x000D, // triangle strip with adjacency
    0x000E, // patches
];

pub const FILL_MODE_TOKENS: [u32; 3] = [
    0x1B02, // fill
    0x1B01, // line
    0x1B00, // point
];

pub const FRONT_FACE_TOKENS: [u32; 2] = [
    0x0901, // counter-clockwise
    0x0900, // clockwise
];

pub const COMPARE_OP_TOKENS: [u32; 8] = [
    0x0200, // never
    0x0201, // less
    0x0202, // equal
    0x0203, // less or equal
    0x0204, // greater
    0x0205, // not equal
    0x0206, // greater or equal
    0x0207, // always
];

pub const STENCIL_OP_TOKENS: [u32; 8] = [
    0x1E00, // keep
    0x0000, // zero
    0x1E01, // replace
    0x1E02, // increment and clamp
    0x1E03, // decrement and clamp
    0x150A, // invert
    0x8507, // increment and wrap
    0x8508, // decrement and wrap
];

pub const LOGIC_OP_TOKENS: [u32; 16] = [
    0x1500, // clear
    0x1501, // and
    0x1502, // and reverse
    0x1503, // copy
    0x1504, // and inverted
    0x1505, // no-op
    0x1506, // xor
    0x1507, // or
    0x1508, // nor
    0x1509, // equivalent
    0x150A, // invert
    0x150B, // or reverse
    0x150C, // copy inverted
    0x150D, // or inverted
    0x150E, // nand
    0x150F, // set
];

pub const BLEND_FACTOR_TOKENS: [u32; 19] = [
    0x0000, // zero
    0x0001, // one
    0x0300, // src color
    0x0301, // one minus src color
    0x0306, // dst color
    0x0307, // one minus dst color
    0x0302, // src alpha
    0x0303, // one minus src alpha
    0x0304, // dst alpha
    0x0305, // one minus dst alpha
    0x8001, // constant color
    0x8002, // one minus constant color
    0x8003, // constant alpha
    0x8004, // one minus constant alpha
    0x0308, // src alpha saturate
    0x88F9, // src1 color
    0x88FA, // one minus src1 color
    0x8589, // src1 alpha
    0x88FB, // one minus src1 alpha
];

pub const BLEND_OP_TOKENS: [u32; 5] = [
    0x8006, // add
    0x800A, // subtract
    0x800B, // reverse subtract
    0x8007, // min
    0x8008, // max
];

pub const PROVOKING_VERTEX_TOKENS: [u32; 2] = [
    0x8E4D, // first vertex
    0x8E4E, // last vertex
];

/// Face tokens indexed by [`StencilFaces`] bits. Index 0 is unused.
pub const STENCIL_FACE_TOKENS: [u32; 4] = [
    0x0000,
    0x0404, // front
    0x0405, // back
    0x0408, // front and back
];

pub const CULL_MODE_TOKENS: [u32; 4] = [
    0x0000,
    0x0404, // front
    0x0405, // back
    0x0408, // front and back
];

// Clear bitfield tokens.
pub const DEPTH_BUFFER_BIT: u32 = 0x0000_0100;
pub const STENCIL_BUFFER_BIT: u32 = 0x0000_0400;
pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;

// Clip control tokens.
pub const CLIP_ORIGIN_LOWER_LEFT: u32 = 0x8CA1;
pub const CLIP_DEPTH_ZERO_TO_ONE: u32 = 0x935F;

impl BlendFactor {
    // BLEND_FACTOR_TOKENS is ordinal-indexed but the device tokens are not
    // contiguous; keep the mapping here so the variant order stays the single
    // source of truth.
    pub fn token(self) -> u32 {
        BLEND_FACTOR_TOKENS[self as usize]
    }
}

impl BlendOp {
    pub fn token(self) -> u32 {
        BLEND_OP_TOKENS[self as usize]
    }
}

impl CompareOp {
    pub fn token(self) -> u32 {
        COMPARE_OP_TOKENS[self as usize]
    }
}

impl StencilOp {
    pub fn token(self) -> u32 {
        STENCIL_OP_TOKENS[self as usize]
    }
}

impl StencilFaces {
    pub fn token(self) -> u32 {
        STENCIL_FACE_TOKENS[self.bits() as usize]
    }
}

impl PrimitiveTopology {
    pub fn token(self) -> u32 {
        PRIMITIVE_TOPOLOGY_TOKENS[self as usize]
    }
}

impl LogicOp {
    pub fn token(self) -> u32 {
        LOGIC_OP_TOKENS[self as usize]
    }
}

impl FillMode {
    pub fn token(self) -> u32 {
        FILL_MODE_TOKENS[self as usize]
    }
}

impl FrontFace {
    pub fn token(self) -> u32 {
        FRONT_FACE_TOKENS[self as usize]
    }
}

impl CullMode {
    pub fn token(self) -> u32 {
        CULL_MODE_TOKENS[self as usize]
    }
}

impl ProvokingVertexMode {
    pub fn token(self) -> u32 {
        PROVOKING_VERTEX_TOKENS[self as usize]
    }
}
