// Run ID Provider Port

/// Generates the identifier attached to every log line of one run
pub trait IdProvider: Send + Sync {
    fn generate_id(&self) -> String;
}

/// UUID v4 run ids (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Always returns the same id
pub struct StaticIdProvider(pub String);

impl IdProvider for StaticIdProvider {
    fn generate_id(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique() {
        let provider = UuidProvider;
        assert_ne!(provider.generate_id(), provider.generate_id());
    }
}
