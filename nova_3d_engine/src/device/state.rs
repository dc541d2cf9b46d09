/// Fixed-function pipeline state descriptors.
///
/// These plain-data descriptors are recorded into command lists by the
/// render passes and translated to native state objects by backends.

// ===== TEXTURE FORMATS =====

/// Texture / render target formats supported by the engine core.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    R16G16B16A16_FLOAT,
    D24_UNORM_S8_UINT,
}

// ===== PRIMITIVES =====

/// Primitive topology for draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    LineList,
}

/// Index element type for indexed draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

// ===== BLEND STATE =====

/// Output-merger blend configuration.
///
/// `Additive` is the accumulation mode of the light buffer (ONE + ONE,
/// no clamping at this stage). `Premultiplied` is used by the transparent
/// composer, `Alpha` by forward / UI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendState {
    /// Blending disabled (opaque writes)
    Disabled,
    /// Standard source-alpha blending
    Alpha,
    /// Premultiplied-alpha blending
    Premultiplied,
    /// Additive accumulation (src ONE, dst ONE)
    Additive,
}

// ===== RASTERIZER STATE =====

/// Triangle face culling mode.
///
/// The winding convention follows the rasterizer: `CounterClockwise` is the
/// engine default; the light accumulation pass flips to `Clockwise` when the
/// camera sits inside a light volume proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No face culling (two-sided rasterization)
    None,
    /// Cull clockwise-wound faces
    Clockwise,
    /// Cull counter-clockwise-wound faces (engine default)
    CounterClockwise,
}

// ===== DEPTH / STENCIL STATE =====

/// Comparison function for depth and stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    Always,
}

/// Stencil buffer operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
}

/// Stencil test configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilState {
    /// Comparison against the reference value
    pub compare: CompareOp,
    /// Reference value for the comparison
    pub reference: u32,
    /// Operation when the stencil test fails
    pub fail_op: StencilOp,
    /// Operation when the stencil test passes but the depth test fails
    pub depth_fail_op: StencilOp,
    /// Operation when both tests pass
    pub pass_op: StencilOp,
}

/// Depth / stencil configuration for a draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    /// Enable the depth test
    pub depth_test: bool,
    /// Enable depth writes
    pub depth_write: bool,
    /// Depth comparison function
    pub depth_compare: CompareOp,
    /// Optional stencil test configuration
    pub stencil: Option<StencilState>,
}

impl DepthStencilState {
    /// Standard geometry configuration: depth test + write, no stencil.
    pub fn geometry(depth_write: bool) -> Self {
        Self {
            depth_test: true,
            depth_write,
            depth_compare: CompareOp::LessEqual,
            stencil: None,
        }
    }

    /// Depth/stencil fully disabled (fullscreen composition draws).
    pub fn disabled() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            depth_compare: CompareOp::Always,
            stencil: None,
        }
    }

    /// Light volume marking pass.
    ///
    /// Depth test on, writes off: the stencil is incremented wherever the
    /// proxy fails the depth test, marking pixels whose scene depth lies
    /// inside the light volume.
    pub fn volume_mark() -> Self {
        Self {
            depth_test: true,
            depth_write: false,
            depth_compare: CompareOp::LessEqual,
            stencil: Some(StencilState {
                compare: CompareOp::Always,
                reference: 0,
                fail_op: StencilOp::Keep,
                depth_fail_op: StencilOp::Increment,
                pass_op: StencilOp::Keep,
            }),
        }
    }

    /// Light volume lighting pass.
    ///
    /// Depth test off; only pixels marked by `volume_mark` pass the
    /// stencil comparison. The stencil is zeroed as it is consumed so the
    /// next light starts from a clean buffer.
    pub fn volume_lit() -> Self {
        Self {
            depth_test: false,
            depth_write: false,
            depth_compare: CompareOp::Always,
            stencil: Some(StencilState {
                compare: CompareOp::NotEqual,
                reference: 0,
                fail_op: StencilOp::Keep,
                depth_fail_op: StencilOp::Keep,
                pass_op: StencilOp::Zero,
            }),
        }
    }
}
