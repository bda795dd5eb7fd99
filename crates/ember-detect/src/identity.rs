//! Device identity filtering
//!
//! A peripheral is accepted as the controlled device only when its
//! self-reported product description contains the configured substring.
//! Vendor/product numeric IDs are logged for the operator but are never
//! filtering criteria.

use tracing::{debug, info};

use crate::scanner::PortDescriptor;

/// Product-description substring filter
#[derive(Debug, Clone)]
pub struct IdentityFilter {
    match_substring: String,
}

impl IdentityFilter {
    /// Create a filter that requires the product string to contain
    /// `match_substring`
    ///
    /// An empty substring matches any peripheral, which disables the
    /// filter.
    pub fn new(match_substring: impl Into<String>) -> Self {
        Self {
            match_substring: match_substring.into(),
        }
    }

    /// The configured substring
    pub fn match_substring(&self) -> &str {
        &self.match_substring
    }

    /// Check the peripheral's identity
    pub fn matches(&self, descriptor: &PortDescriptor) -> bool {
        if let (Some(vid), Some(pid)) = (descriptor.vid, descriptor.pid) {
            debug!(
                "identity check for {} ({:04x}:{:04x})",
                descriptor.port, vid, pid
            );
        }

        if self.match_substring.is_empty() {
            return true;
        }

        let matched = descriptor
            .product
            .as_deref()
            .is_some_and(|product| product.contains(&self.match_substring));

        if matched {
            info!(
                "device {} identified as \"{}\"",
                descriptor.port,
                descriptor.label()
            );
        } else {
            info!(
                "device {} reports \"{}\", wanted substring \"{}\"",
                descriptor.port,
                descriptor.label(),
                self.match_substring
            );
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(product: Option<&str>) -> PortDescriptor {
        PortDescriptor {
            port: "/dev/ttyUSB0".to_string(),
            vid: Some(0x1A86),
            pid: Some(0x7523),
            serial_number: None,
            manufacturer: None,
            product: product.map(str::to_string),
        }
    }

    #[test]
    fn test_substring_match() {
        let filter = IdentityFilter::new("EMBER");

        assert!(filter.matches(&descriptor(Some("EMBER HEATER v2"))));
        assert!(!filter.matches(&descriptor(Some("USB2.0-Serial"))));
    }

    #[test]
    fn test_missing_product_never_matches() {
        let filter = IdentityFilter::new("EMBER");
        assert!(!filter.matches(&descriptor(None)));
    }

    #[test]
    fn test_empty_substring_matches_any() {
        let filter = IdentityFilter::new("");

        assert!(filter.matches(&descriptor(Some("anything"))));
        assert!(filter.matches(&descriptor(None)));
    }

    #[test]
    fn test_vid_pid_are_not_criteria() {
        let filter = IdentityFilter::new("EMBER");
        let mut desc = descriptor(Some("EMBER HEATER"));
        desc.vid = None;
        desc.pid = None;

        assert!(filter.matches(&desc));
    }
}
