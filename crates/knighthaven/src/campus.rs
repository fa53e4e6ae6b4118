//! Campus membership derived from email addresses.

/// The university email domain used to mark users and reviewers as verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusDomain {
    domain: String,
}

impl CampusDomain {
    pub fn new(domain: impl AsRef<str>) -> Self {
        let domain = domain
            .as_ref()
            .trim()
            .trim_start_matches('@')
            .to_ascii_lowercase();
        Self { domain }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// True when the part after the last `@` equals the campus domain, ignoring case.
    pub fn verifies(&self, email: &str) -> bool {
        match email.trim().rsplit_once('@') {
            Some((local, host)) => !local.is_empty() && host.eq_ignore_ascii_case(&self.domain),
            None => false,
        }
    }
}

impl Default for CampusDomain {
    fn default() -> Self {
        Self::new("ucf.edu")
    }
}
