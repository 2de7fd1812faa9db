use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn generate_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Opaque public certificate id, e.g. `CERT-9F2KQ7XA31BMDZ4W`.
pub fn generate_certificate_id() -> String {
    format!("CERT-{}", generate_token(16).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_requested_length() {
        assert_eq!(generate_token(32).len(), 32);
    }

    #[test]
    fn certificate_ids_are_prefixed_and_unique() {
        let a = generate_certificate_id();
        let b = generate_certificate_id();
        assert!(a.starts_with("CERT-"));
        assert_eq!(a.len(), 5 + 16);
        assert_ne!(a, b);
    }
}
