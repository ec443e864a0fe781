pub mod media;
pub mod oauth;
pub mod timeline;

pub use media::MediaLinkExtractor;
pub use oauth::OAuthSigner;
pub use timeline::{RateLimitStatus, TimelineSource};
