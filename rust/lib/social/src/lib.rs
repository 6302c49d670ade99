//! Likes, notifications and post deletion over the realtime tree.
//!
//! A like is stored five times over: the actor's `user-likes` index, the
//! post's `post-likes` index, the post's `likes` counter, a notification
//! in the owner's feed, and the client-side `Post` value. No transaction
//! spans them. [`InteractionLedger`] applies like/unlike transitions in a
//! fixed order so the projections converge, and [`CascadingDeletion`]
//! removes every trace of a post.

pub mod cascade;
pub mod gate;
pub mod hashtag;
pub mod inbox;
pub mod ledger;
pub mod model;
pub mod paths;

pub use cascade::CascadingDeletion;
pub use hashtag::hashtags;
pub use inbox::{NotificationFeed, NotificationInbox};
pub use ledger::{InteractionLedger, LikeOutcome, Skip};
pub use model::{LIKE_MARKER, Notification, NotificationKind, Post};
pub use paths::StorePaths;
