use sketchlink_core::config::RootConfig;
use sketchlink_core::csp::CspPolicy;

/// Policy used when the host has none of its own.
const BASE_POLICY: &str = "default-src 'self'";

/// Extends `header` (or the base policy) so the editor frame can load.
pub fn merged_header(config: &RootConfig, header: Option<&str>) -> String {
    let mut policy = CspPolicy::parse(header.unwrap_or(BASE_POLICY));
    policy.allow_editor(&config.editor);
    policy.to_header()
}

pub fn run(config: &RootConfig, header: Option<&str>) {
    println!("{}", merged_header(config, header));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_policy_is_extended() {
        let header = merged_header(&RootConfig::default(), None);
        assert!(header.contains("default-src 'self'"));
        assert!(header.contains("frame-src https://embed.diagrams.net"));
        assert!(header.contains("img-src data:"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let config = RootConfig::default();
        let once = merged_header(&config, Some("img-src 'self'"));
        assert_eq!(merged_header(&config, Some(&once)), once);
    }
}
