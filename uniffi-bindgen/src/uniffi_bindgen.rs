//! Generates Swift and Kotlin bindings for `keychain-store`.
//!
//! ```sh
//! cargo run -p uniffi-bindgen -- generate --library target/release/libkeychain_store.dylib \
//!     --language swift --out-dir swift/Sources/KeychainStore
//! ```

fn main() {
    uniffi::uniffi_bindgen_main();
}
