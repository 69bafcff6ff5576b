use rand::{distributions::Alphanumeric, Rng};

const GENERATED_PREFIX: &str = "user_";
const GENERATED_SUFFIX_LEN: usize = 10;

/// Nickname derived from an identity: display name, else the email local part,
/// else a generated `user_<suffix>`.
pub fn candidate(display_name: Option<&str>, email: Option<&str>) -> String {
    if let Some(name) = display_name.filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    if let Some((local, _)) = email.and_then(|email| email.split_once('@')) {
        return local.to_string();
    }
    generated()
}

pub fn generated() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{GENERATED_PREFIX}{suffix}")
}
