//! ID generator port for producing unique identifiers.

/// Generates unique identifiers.
///
/// Abstracting ID generation allows deterministic tests by substituting
/// a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;

    /// Generates a short public label of the form `v{8 chars}`.
    fn generate_label(&self) -> String {
        let id: String =
            self.generate_id().chars().filter(char::is_ascii_alphanumeric).take(8).collect();
        format!("v{id}")
    }
}
