//! Avatar helpers

use digest::Digest;
use md5::Md5;
use profiles_core::config::AvatarConfig;

pub fn md5_hash(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Address a member is reachable at on the house mail domain
pub fn member_mail(uid: &str, config: &AvatarConfig) -> String {
    format!("{}@{}", uid, config.mail_domain)
}

/// Fallback avatar URL derived from the member's house address
pub fn gravatar_url(uid: &str, config: &AvatarConfig) -> String {
    let hash = md5_hash(member_mail(uid, config).as_bytes());
    format!(
        "{}{}.jpg?d={}&s={}",
        config.gravatar_url, hash, config.default_image, config.size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_hash() {
        assert_eq!(md5_hash(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hash(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_gravatar_url() {
        let config = AvatarConfig::default();
        let url = gravatar_url("jdoe", &config);

        assert!(url.starts_with("https://gravatar.com/avatar/"));
        assert!(url.contains(&md5_hash(b"jdoe@csh.rit.edu")));
        assert!(url.ends_with("?d=mm&s=250"));
        assert_eq!(url, gravatar_url("jdoe", &config));
    }

    #[test]
    fn test_custom_domain() {
        let config = AvatarConfig {
            mail_domain: "example.com".to_string(),
            size: 80,
            ..Default::default()
        };

        assert_eq!(member_mail("jdoe", &config), "jdoe@example.com");
        assert!(gravatar_url("jdoe", &config).ends_with("?d=mm&s=80"));
    }
}
