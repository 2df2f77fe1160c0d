//! Compile-time configuration.
//!
//! `trouble-ancs` has some configuration settings that are set at compile time.
//!
//! They can be set in two ways:
//!
//! - Via Cargo features: enable a feature like `<name>-<value>`. `name` must be in lowercase and
//!   use dashes instead of underscores. For example `command-queue-size-16`. Only a selection of values
//!   is available, check `Cargo.toml` for the list.
//! - Via environment variables at build time: set the variable named `TROUBLE_ANCS_<value>`. For example
//!   `TROUBLE_ANCS_ATTRIBUTE_MAX_LEN=100 cargo build`. You can also set them in the `[env]` section of `.cargo/config.toml`.
//!   Any value can be set, unlike with Cargo features.
//!
//! Environment variables take precedence over Cargo features. If two Cargo features are enabled for the same setting
//! with different values, compilation fails.

mod raw {
    #![allow(unused)]
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

/// Outbound command queue size
///
/// Number of requests (subscription toggles, attribute fetches, actions) that can wait
/// for the single outstanding ATT request slot of a connection.
///
/// Must be a power of two, the build fails otherwise.
///
/// Default: 8.
pub const COMMAND_QUEUE_SIZE: usize = raw::COMMAND_QUEUE_SIZE;

/// Maximum attribute length
///
/// Upper bound for the length passed when registering an attribute. It is also the
/// length requested from the notification provider for Title, Subtitle and Message.
///
/// Default: 32.
pub const ATTRIBUTE_MAX_LEN: usize = raw::ATTRIBUTE_MAX_LEN;
