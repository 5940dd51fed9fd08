/// Convention switches read once at schema-build time.
///
/// Every switch defaults to on; construct with struct-update syntax to
/// turn individual conventions off:
///
/// ```
/// use arbor_model::ConventionOptions;
///
/// let options = ConventionOptions {
///     callbacks: false,
///     ..Default::default()
/// };
/// assert!(options.timestamps);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConventionOptions {
    /// Derive snake_case physical table names from type names
    pub snake_case_tables: bool,
    /// Derive snake_case physical column names from property names
    pub snake_case_columns: bool,
    /// Pluralize physical table names
    pub plural_tables: bool,
    /// Stamp created_at/updated_at at commit time and mark the columns
    /// with a database-side now() default
    pub timestamps: bool,
    /// Filter soft-deleted rows out of every read and turn entity deletes
    /// into deleted_at updates
    pub soft_deletes: bool,
    /// Run the before/after lifecycle callback protocol around commits
    pub callbacks: bool,
}

impl Default for ConventionOptions {
    fn default() -> Self {
        Self {
            snake_case_tables: true,
            snake_case_columns: true,
            plural_tables: true,
            timestamps: true,
            soft_deletes: true,
            callbacks: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_on() {
        let options = ConventionOptions::default();
        assert!(options.snake_case_tables);
        assert!(options.snake_case_columns);
        assert!(options.plural_tables);
        assert!(options.timestamps);
        assert!(options.soft_deletes);
        assert!(options.callbacks);
    }

    #[test]
    fn test_struct_update_construction() {
        let options = ConventionOptions {
            soft_deletes: false,
            ..Default::default()
        };
        assert!(!options.soft_deletes);
        assert!(options.callbacks);
    }
}
