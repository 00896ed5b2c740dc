//! Material (shader) handles and the registry seam.

/// Opaque renderer material handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Resolves material names to handles.
pub trait ShaderRegistry {
    /// Registers (or looks up) a material by name. Returns `None` when the
    /// material does not exist.
    fn register_shader(&mut self, name: &str) -> Option<ShaderHandle>;
}

/// A fixed table of known material names.
///
/// Handles are assigned in table order starting at 1.
#[derive(Debug, Clone, Default)]
pub struct ShaderTable {
    names: Vec<String>,
}

impl ShaderTable {
    /// Creates a table that knows exactly `names`.
    #[must_use]
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the name behind a handle.
    #[must_use]
    pub fn name(&self, handle: ShaderHandle) -> Option<&str> {
        let index = usize::try_from(handle.0).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }
}

impl ShaderRegistry for ShaderTable {
    fn register_shader(&mut self, name: &str) -> Option<ShaderHandle> {
        let index = self.names.iter().position(|known| known == name)?;
        u32::try_from(index + 1).ok().map(ShaderHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        let mut table = ShaderTable::with_names(["gfx/misc/raindrop", "gfx/misc/raindrop1"]);
        let h = table.register_shader("gfx/misc/raindrop1").unwrap();
        assert_eq!(h, ShaderHandle(2));
        assert_eq!(table.name(h), Some("gfx/misc/raindrop1"));
        assert!(table.register_shader("gfx/misc/snow").is_none());
        assert!(table.name(ShaderHandle(0)).is_none());
    }
}
