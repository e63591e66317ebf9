/// Typed pool handles
///
/// A handle is a slot index plus the generation the slot had when the handle
/// was issued. Handles are plain `Copy` values; they never own the slot.

/// Operations a [`Pool`](super::Pool) needs from its key type.
///
/// Implemented by every type declared with [`define_handle!`](crate::define_handle).
pub trait PoolHandle: Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display {
    /// Short kind name used in log and error messages ("buffer", "texture", ...)
    const KIND: &'static str;

    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> u32;
    fn generation(self) -> u32;

    /// Whether the handle is anything other than the invalid sentinel
    fn is_valid(self) -> bool {
        self.index() != u32::MAX
    }
}

/// Declare a nominal handle type.
///
/// Each generated type carries `index` and `generation`, an `INVALID`
/// sentinel (also its `Default`), and implements [`PoolHandle`].
///
/// # Example
///
/// ```
/// use celeritas_engine::define_handle;
///
/// define_handle! {
///     /// Handle to a sound clip
///     pub struct ClipHandle => "clip";
/// }
///
/// assert!(!ClipHandle::INVALID.is_valid());
/// ```
#[macro_export]
macro_rules! define_handle {
    ($( $(#[$meta:meta])* $vis:vis struct $name:ident => $kind:literal; )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            $vis struct $name {
                index: u32,
                generation: u32,
            }

            impl $name {
                /// Sentinel that never refers to a live slot
                pub const INVALID: Self = Self { index: u32::MAX, generation: 0 };

                pub const fn raw_index(self) -> u32 {
                    self.index
                }

                pub const fn raw_generation(self) -> u32 {
                    self.generation
                }

                pub const fn is_valid(self) -> bool {
                    self.index != u32::MAX
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::INVALID
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}#{}v{}", $kind, self.index, self.generation)
                }
            }

            impl $crate::memory::PoolHandle for $name {
                const KIND: &'static str = $kind;

                fn from_parts(index: u32, generation: u32) -> Self {
                    Self { index, generation }
                }

                fn index(self) -> u32 {
                    self.index
                }

                fn generation(self) -> u32 {
                    self.generation
                }
            }
        )+
    };
}
