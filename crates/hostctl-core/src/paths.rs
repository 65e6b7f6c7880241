use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Filesystem layout the provisioning workflows write into.
///
/// Every path is absolute on a real host; tests point these at a temp
/// directory instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemPaths {
    /// Base directory for per-tenant web roots, e.g. `/var/www`.
    pub web_root_base: PathBuf,
    /// Directory holding one vhost file per domain.
    pub vhost_dir: PathBuf,
    /// Mailbox map consumed by the mail server (postmap format).
    pub mailbox_map: PathBuf,
    /// Base directory for maildirs, e.g. `/var/vmail`.
    pub maildir_base: PathBuf,
    /// Directory holding installed TLS keys and chains.
    pub tls_dir: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            web_root_base: PathBuf::from("/var/www"),
            vhost_dir: PathBuf::from("/etc/apache2/sites-available"),
            mailbox_map: PathBuf::from("/etc/postfix/vmailbox"),
            maildir_base: PathBuf::from("/var/vmail"),
            tls_dir: PathBuf::from("/etc/ssl/hostctl"),
        }
    }
}

impl SystemPaths {
    /// Layout rooted under a single directory, used by tests and dry runs.
    #[must_use]
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            web_root_base: base.join("www"),
            vhost_dir: base.join("sites-available"),
            mailbox_map: base.join("postfix/vmailbox"),
            maildir_base: base.join("vmail"),
            tls_dir: base.join("ssl"),
        }
    }

    #[must_use]
    pub fn web_root(&self, domain: &str) -> PathBuf {
        self.web_root_base.join(domain)
    }

    #[must_use]
    pub fn vhost_file(&self, domain: &str) -> PathBuf {
        self.vhost_dir.join(format!("{domain}.conf"))
    }

    #[must_use]
    pub fn maildir(&self, address: &str) -> PathBuf {
        // `user@example.org` becomes `example.org/user/` per Postfix convention.
        match address.split_once('@') {
            Some((local, domain)) => self.maildir_base.join(domain).join(local),
            None => self.maildir_base.join(address),
        }
    }

    #[must_use]
    pub fn tls_key(&self, domain: &str) -> PathBuf {
        self.tls_dir.join(format!("{domain}.key"))
    }

    #[must_use]
    pub fn tls_chain(&self, domain: &str) -> PathBuf {
        self.tls_dir.join(format!("{domain}.pem"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_uses_system_directories() {
        let paths = SystemPaths::default();

        assert_eq!(paths.web_root("example.org"), PathBuf::from("/var/www/example.org"));
        assert_eq!(
            paths.vhost_file("example.org"),
            PathBuf::from("/etc/apache2/sites-available/example.org.conf")
        );
    }

    #[test]
    fn rooted_layout_stays_under_base() {
        let paths = SystemPaths::rooted_at(Path::new("/tmp/panel"));

        assert_eq!(paths.web_root("a.test"), PathBuf::from("/tmp/panel/www/a.test"));
        assert_eq!(paths.tls_key("a.test"), PathBuf::from("/tmp/panel/ssl/a.test.key"));
    }

    #[test]
    fn maildir_splits_address_at_domain() {
        let paths = SystemPaths::rooted_at(Path::new("/t"));

        assert_eq!(
            paths.maildir("info@example.org"),
            PathBuf::from("/t/vmail/example.org/info")
        );
    }

    #[test]
    fn maildir_without_at_sign_uses_whole_address() {
        let paths = SystemPaths::rooted_at(Path::new("/t"));

        assert_eq!(paths.maildir("postmaster"), PathBuf::from("/t/vmail/postmaster"));
    }
}
