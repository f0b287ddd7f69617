use redb::TableDefinition;

/// Posts table: post_id (UUIDv7) -> PostRecord (serialized)
pub const POSTS: TableDefinition<&str, &[u8]> = TableDefinition::new("posts");

/// Vote ledger: (post_id, user_id) -> VoteRecord (serialized)
/// Keyed post-first so every vote on a post is one contiguous range,
/// which is what the cascade delete walks
pub const VOTES: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("votes");
