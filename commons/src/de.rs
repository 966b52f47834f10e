//! Deserializers.

/// Deserialize an optional string, treating an empty or blank string as unset.
///
/// Pipeline configurations commonly interpolate unset variables as `""`.
pub fn de_nonempty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = Option::<String>::deserialize(deserializer)?;

    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Deserialize an optional boolean, treating `null` as `false`.
pub fn de_null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = Option::<bool>::deserialize(deserializer)?;

    Ok(value.unwrap_or(false))
}
