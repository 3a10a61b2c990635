use chrono::{Datelike, Utc};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod auth;
pub use auth::{AuthToken, NewSession, Provider, Session, SessionStatus};

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod post;
pub use post::{Post, PostId};

mod query;
pub use query::{FeedMessage, LiveQuery, SnapshotData, StoreRequest, SubscriptionId};

mod user;
pub use user::{User, UserId};

mod widgets;
pub use widgets::{BootstrapData, FollowSuggestion, Trend};

/// Strings are stored and relayed as-is, except that null bytes are rejected
/// everywhere: they do not survive all the layers data goes through.
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(s.to_string())),
        false => Ok(()),
    }
}

/// Timestamps must stay within years 0..=9999, the range that survives an
/// RFC3339 round-trip.
pub fn validate_time(t: &Time) -> Result<(), Error> {
    match t.year() {
        0..=9999 => Ok(()),
        _ => Err(Error::InvalidTime(*t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_null_bytes() {
        assert_eq!(validate_string("hello"), Ok(()));
        assert_eq!(
            validate_string("he\0llo"),
            Err(Error::NullByteInString(String::from("he\0llo"))),
        );
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(validate_time(&Utc::now()), Ok(()));
        let too_old = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_time(&too_old).is_err());
    }
}
