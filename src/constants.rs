/// Exponent applied to the age term of the hot score
pub const HOT_GRAVITY: f64 = 1.8;

/// Hours added to a post's age before decay is applied
/// Keeps brand new posts from dividing by a near-zero denominator
pub const HOT_AGE_OFFSET_HOURS: f64 = 2.0;

/// Feed size when the client does not ask for one
pub const DEFAULT_FEED_LIMIT: usize = 25;

/// Upper bound on feed size per request
pub const MAX_FEED_LIMIT: usize = 100;

/// Maximum post title length (characters, after trimming)
pub const MAX_TITLE_CHARS: usize = 300;

/// Maximum post body length (characters)
pub const MAX_CONTENT_CHARS: usize = 40_000;

/// Maximum length of an opaque id supplied by a client (community, user)
pub const MAX_ID_CHARS: usize = 128;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an unknown vote type
pub const ERR_INVALID_VOTE_TYPE: &str = "voteType must be 'up' or 'down'";

/// Error message for a missing or oversized title
pub const ERR_INVALID_TITLE: &str = "Title must be between 1 and 300 characters";

/// Error message for an oversized body
pub const ERR_CONTENT_TOO_LONG: &str = "Content exceeds maximum length";

/// Error message for an unknown post kind
pub const ERR_INVALID_POST_KIND: &str = "kind must be one of 'text', 'link', 'image', 'note'";

/// Error message for a malformed community id
pub const ERR_INVALID_COMMUNITY_ID: &str = "Invalid community ID format";

/// Error message for a malformed post id
pub const ERR_INVALID_POST_ID: &str = "Invalid post ID format";
