/// A mod's unique ID.
///
/// IDs are compared and hashed case-insensitively so that `Pathoschild.Foo`
/// and `pathoschild.foo` refer to the same mod everywhere in the pipeline,
/// while the author's original casing is preserved for display. Leading and
/// trailing whitespace is trimmed on construction.
///
/// # Example
///
/// ```
/// use modloom::types::ModId;
///
/// let a = ModId::new("Example.Mod");
/// let b = ModId::new("example.MOD");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "Example.Mod");
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModId(String);

impl<'de> serde::Deserialize<'de> for ModId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

impl ModId {
    /// Create a new mod ID, trimming surrounding whitespace.
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_string())
    }

    /// Get the ID as written by the author (trimmed).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the lowercased form used as a lookup key.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether the ID is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ModId {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl Eq for ModId {}

impl std::hash::Hash for ModId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl std::fmt::Display for ModId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl PartialEq<str> for ModId {
    fn eq(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }
}

impl PartialEq<&str> for ModId {
    fn eq(&self, other: &&str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }
}
