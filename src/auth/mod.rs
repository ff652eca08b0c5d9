//! Challenge Protocol
//!
//! Gates decryption on a wallet signature over a canonical challenge.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CHALLENGE PROTOCOL                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  challenge.rs  - Canonical challenge text, validity window  │
//! │  wallet.rs     - Wallet / chain collaborators               │
//! │  signature.rs  - EIP-191 signer recovery                    │
//! │  gate.rs       - Authorize, then decode                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod challenge;
pub mod gate;
pub mod signature;
pub mod wallet;

pub use challenge::{
    build_challenge, generate_public_key, ChallengeError, DecryptionChallenge, SECONDS_PER_DAY,
};
pub use gate::{request_authorization, DecryptionGate};
pub use signature::{
    addresses_match, recover_signer, PersonalSignVerifier, SignatureVerifier, TrustWallet,
    WalletSignature,
};
pub use wallet::{ChainProvider, FixedChain, LocalWallet, Wallet, WalletError};
