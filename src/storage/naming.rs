//! Remote file naming for randomized uploads.

use uuid::Uuid;

pub trait NamingStrategy: Send + Sync {
    fn rename(&self, remote_path: &str) -> String;
}

/// Stores the file under the path it was given.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepName;

impl NamingStrategy for KeepName {
    fn rename(&self, remote_path: &str) -> String {
        remote_path.to_string()
    }
}

/// Replaces the basename with `{md5(basename)}-{uuid}.{ext}`, leaving the
/// directory alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedName;

impl NamingStrategy for HashedName {
    fn rename(&self, remote_path: &str) -> String {
        let (dir, basename) = match remote_path.rfind('/') {
            Some(idx) => remote_path.split_at(idx + 1),
            None => ("", remote_path),
        };

        // A leading dot marks a hidden file, not an extension.
        let extension = match basename.rfind('.') {
            Some(idx) if idx > 0 => &basename[idx..],
            _ => "",
        };

        format!(
            "{}{:x}-{}{}",
            dir,
            md5::compute(basename.as_bytes()),
            Uuid::new_v4().simple(),
            extension
        )
    }
}
