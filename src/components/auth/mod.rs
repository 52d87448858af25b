/*!
The authentication overlays: TSIG shared-secret MACs over whole
messages, SIG(0)/RRSIG asymmetric signatures, and the BIND private key
file reader that feeds them.
 */

mod key_file;
pub mod sig0;
pub mod tsig;

pub use key_file::PrivateKey;
pub use tsig::TsigKey;
