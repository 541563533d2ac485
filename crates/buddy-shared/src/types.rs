use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

static LAST_TOKEN: AtomicI64 = AtomicI64::new(0);

/// Milliseconds since the epoch, strictly increasing within the process.
///
/// Two calls in the same millisecond get consecutive values, so ids built
/// from the token stay unique and still sort by creation time.
pub fn time_token() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_TOKEN.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh id derived from the creation time.
            pub fn generate() -> Self {
                Self(format!("{}{}", $prefix, time_token()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Opaque, stable user identifier (`u_<millis>` for registered accounts).
    UserId,
    "u_"
);

string_id!(
    /// Listing identifier (`i<millis>`).
    ItemId,
    "i"
);

string_id!(
    /// Message identifier (`msg_<millis>`).
    MessageId,
    "msg_"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_token_strictly_increasing() {
        let mut prev = time_token();
        for _ in 0..1000 {
            let next = time_token();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = MessageId::generate();
        let b = MessageId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("msg_"));
        assert!(ItemId::generate().as_str().starts_with('i'));
        assert!(UserId::generate().as_str().starts_with("u_"));
    }
}
