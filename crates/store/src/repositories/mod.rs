//! Typed access to the store's collections.

pub mod pinned_memo_repo;
pub mod record_repo;
pub mod user_repo;

pub use pinned_memo_repo::PinnedMemoRepo;
pub use record_repo::RecordRepo;
pub use user_repo::UserRepo;
