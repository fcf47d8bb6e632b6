/// Resource handles
///
/// A handle is a plain index into one of the resource registries. `-1`
/// (`INVALID`) means "unset". A released slot may be handed out again by a
/// later creation call, so handles must not outlive an explicit release.

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i32);

        impl $name {
            /// The "unset" handle
            pub const INVALID: Self = Self(-1);

            /// Build a handle from a registry index
            pub fn from_index(index: usize) -> Self {
                Self(index as i32)
            }

            /// Registry index, or None for `INVALID`
            pub fn index(self) -> Option<usize> {
                if self.0 >= 0 { Some(self.0 as usize) } else { None }
            }

            /// True for any non-negative handle
            pub fn is_valid(self) -> bool {
                self.0 >= 0
            }

            /// Raw integer value
            pub fn raw(self) -> i32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// Handle into the texture registry
    TextureId
);
define_handle!(
    /// Handle into one of the three buffer registries (the kind is tracked by the caller)
    BufferId
);
define_handle!(
    /// Handle into the sampler registry
    SamplerId
);
define_handle!(
    /// Handle into the render target registry
    RenderTargetId
);
define_handle!(
    /// Handle into the depth target registry
    DepthTargetId
);
define_handle!(
    /// Handle into the rasterizer state registry
    RasterizerStateId
);
define_handle!(
    /// Handle into the blend state registry
    BlendStateId
);
define_handle!(
    /// Handle into the depth-stencil state registry
    DepthStencilStateId
);
define_handle!(
    /// Handle into the renderer's shader list
    ShaderId
);
