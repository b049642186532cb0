pub mod builder;
pub mod decoder;
pub mod encoding;
pub mod encryption;
pub mod error;
pub mod payload;
pub mod signer;
pub mod token;

mod codec;

pub use builder::EnqueueTokenBuilder;
pub use decoder::EnqueueTokenDecoder;
pub use error::TokenError;
pub use payload::{EnqueueTokenPayload, EnqueueTokenPayloadBuilder};
pub use token::{EncryptionType, EnqueueToken, TokenVersion};
