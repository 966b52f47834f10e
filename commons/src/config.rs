//! Configuration merging.
//!
//! Settings are assembled by overlaying option fragments (the JSON `source`
//! block, CLI flags) on top of defaults.

#[macro_export]
/// Assign to destination if source value is `Some`.
macro_rules! assign_if_some {
    ( $dst:expr, $src:expr ) => {{
        if let Some(x) = $src {
            $dst = x.into();
        };
    }};
}

#[macro_export]
/// Fill an `Option` destination from source only if the destination is unset.
macro_rules! fill_if_none {
    ( $dst:expr, $src:expr ) => {{
        if $dst.is_none() {
            $dst = $src;
        };
    }};
}

/// Try to merge configuration options into runtime settings.
///
/// This consumes a generic configuration object, trying to merge its options
/// into runtime settings. It only overlays populated values from config,
/// leaving unset ones preserved as-is from existing settings.
pub trait MergeOptions<T> {
    /// Merge values from `options` into current settings.
    fn try_merge(&mut self, options: T) -> crate::Fallible<()>;
}

#[cfg(test)]
mod tests {
    #[test]
    fn assign_and_fill() {
        let mut port = 80u16;
        assign_if_some!(port, Some(8080u16));
        assign_if_some!(port, None::<u16>);
        assert_eq!(port, 8080);

        let mut name: Option<String> = None;
        fill_if_none!(name, Some("first".to_string()));
        fill_if_none!(name, Some("second".to_string()));
        assert_eq!(name.as_deref(), Some("first"));
    }
}
